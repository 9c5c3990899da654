//! Shared order-history substrate for the analyzers.
//!
//! Built once per report request from a snapshot slice of orders and
//! dropped afterwards; nothing here is incrementally maintained.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::order::Order;
use crate::normalize::{self, LineItem};

pub struct OrderHistoryIndex<'a> {
    /// Orders per customer, chronologically ascending.
    by_customer: HashMap<&'a str, Vec<&'a Order>>,
    /// Every order with its canonical line items.
    normalized: Vec<(&'a Order, Vec<LineItem>)>,
}

impl<'a> OrderHistoryIndex<'a> {
    pub fn build(orders: &'a [Order]) -> Self {
        let mut by_customer: HashMap<&str, Vec<&Order>> = HashMap::new();
        let mut normalized = Vec::with_capacity(orders.len());

        for order in orders {
            by_customer.entry(order.customer_phone.as_str()).or_default().push(order);
            normalized.push((order, normalize::normalize(&order.items)));
        }

        for customer_orders in by_customer.values_mut() {
            customer_orders.sort_by_key(|order| order.order_date);
        }

        Self { by_customer, normalized }
    }

    /// A customer's orders oldest-first; empty for unknown customers.
    pub fn orders_for(&self, phone: &str) -> &[&'a Order] {
        self.by_customer.get(phone).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn customers(&self) -> impl Iterator<Item = (&'a str, &[&'a Order])> + '_ {
        self.by_customer.iter().map(|(phone, orders)| (*phone, orders.as_slice()))
    }

    /// Every order paired with its normalized line items.
    pub fn normalized_orders(&self) -> &[(&'a Order, Vec<LineItem>)] {
        &self.normalized
    }

    /// Units sold per product identifier across orders dated within
    /// `(cutoff, as_of]`.
    pub fn units_sold_between(
        &self,
        cutoff: DateTime<Utc>,
        as_of: DateTime<Utc>,
    ) -> HashMap<String, u64> {
        let mut units: HashMap<String, u64> = HashMap::new();
        for (order, items) in &self.normalized {
            if order.order_date <= cutoff || order.order_date > as_of {
                continue;
            }
            for item in items {
                *units.entry(item.product_id.clone()).or_default() += u64::from(item.quantity);
            }
        }
        units
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::domain::order::{FulfillmentStatus, LineItems, Order, OrderId};

    use super::OrderHistoryIndex;

    fn order(id: &str, phone: &str, days_ago: i64, items: &str) -> Order {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Order {
            id: OrderId(id.to_string()),
            order_date: base - Duration::days(days_ago),
            customer_phone: phone.to_string(),
            items: LineItems::Encoded(items.to_string()),
            grand_total: Decimal::from(100),
            net_profit: Decimal::from(20),
            discount: Decimal::ZERO,
            status: FulfillmentStatus::Delivered,
        }
    }

    #[test]
    fn customer_orders_are_sorted_oldest_first() {
        let orders = vec![
            order("O-2", "+1555", 5, "Honey (x1)"),
            order("O-1", "+1555", 30, "Honey (x1)"),
            order("O-3", "+1555", 1, "Honey (x1)"),
        ];
        let index = OrderHistoryIndex::build(&orders);

        let ids: Vec<&str> =
            index.orders_for("+1555").iter().map(|order| order.id.0.as_str()).collect();
        assert_eq!(ids, vec!["O-1", "O-2", "O-3"]);
    }

    #[test]
    fn unknown_customer_has_no_orders() {
        let orders = vec![order("O-1", "+1555", 5, "Honey (x1)")];
        let index = OrderHistoryIndex::build(&orders);
        assert!(index.orders_for("+1999").is_empty());
    }

    #[test]
    fn units_sold_respects_the_window() {
        let as_of = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let orders = vec![
            order("O-1", "+1555", 10, "Honey (x2)"),
            order("O-2", "+1666", 59, "Honey (x3), Oil (x1)"),
            order("O-3", "+1777", 61, "Honey (x5)"),
        ];
        let index = OrderHistoryIndex::build(&orders);

        let units = index.units_sold_between(as_of - chrono::Duration::days(60), as_of);
        assert_eq!(units.get("Honey").copied(), Some(5));
        assert_eq!(units.get("Oil").copied(), Some(1));
    }
}
