//! Demo dataset for local evaluation.
//!
//! Order dates are relative to the caller's `as_of` so the dataset stays
//! meaningful whenever it is seeded, while tests that fix `as_of` stay
//! deterministic. The data is shaped to light up every report section:
//! a customer due to reorder, a lapsed high-spend customer, a repeated
//! product pair, a thin-margin product, a discount-heavy stretch of
//! orders, and a product with stock but no recent sales.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use shoplens_core::{
    Customer, FulfillmentStatus, LineItems, Order, OrderId, Product, ProductId, RawLineItem,
    Snapshot,
};

use crate::sqlite::SqliteRecordStore;
use crate::StoreError;

#[derive(Clone, Copy, Debug)]
pub struct SeedSummary {
    pub orders: usize,
    pub customers: usize,
    pub products: usize,
}

/// Writes the demo dataset through `store`, replacing rows with the same
/// keys. Returns counts for operator feedback.
pub async fn seed(
    store: &SqliteRecordStore,
    as_of: DateTime<Utc>,
) -> Result<SeedSummary, StoreError> {
    let snapshot = demo_snapshot(as_of);
    for order in &snapshot.orders {
        store.insert_order(order).await?;
    }
    for customer in &snapshot.customers {
        store.insert_customer(customer).await?;
    }
    for product in &snapshot.products {
        store.insert_product(product).await?;
    }
    Ok(SeedSummary {
        orders: snapshot.orders.len(),
        customers: snapshot.customers.len(),
        products: snapshot.products.len(),
    })
}

pub fn demo_snapshot(as_of: DateTime<Utc>) -> Snapshot {
    let honey_oil = LineItems::Structured(vec![
        item("SKU-HONEY", "Honey", 1, 120),
        item("SKU-OIL", "Oil", 1, 180),
    ]);

    let mut orders = vec![
        // Asha reorders every ~10 days and is due again around `as_of`.
        order("O-1001", "+15550001", as_of - Duration::days(30), honey_oil.clone(), 300, 90, 0),
        order("O-1002", "+15550001", as_of - Duration::days(20), honey_oil.clone(), 300, 90, 0),
        order("O-1003", "+15550001", as_of - Duration::days(10), honey_oil.clone(), 300, 90, 0),
        // Bina used to order every ~14 days, then went quiet.
        order(
            "O-2001",
            "+15550002",
            as_of - Duration::days(80),
            LineItems::Encoded("Rice (x2), Oil (x1)".to_string()),
            950,
            140,
            0,
        ),
        order(
            "O-2002",
            "+15550002",
            as_of - Duration::days(66),
            LineItems::Encoded("Rice (x2)".to_string()),
            700,
            100,
            0,
        ),
        order(
            "O-2003",
            "+15550002",
            as_of - Duration::days(52),
            LineItems::Structured(vec![
                item("SKU-RICE", "Rice", 2, 700),
                item("SKU-HONEY", "Honey", 1, 120),
            ]),
            820,
            160,
            0,
        ),
    ];

    // A discount-heavy stretch inside the trailing month.
    for (idx, days_ago) in [3_i64, 6, 9, 12].into_iter().enumerate() {
        orders.push(order(
            &format!("O-3{:03}", idx + 1),
            "+15550003",
            as_of - Duration::days(days_ago),
            LineItems::Structured(vec![item("SKU-GHEE", "Ghee", 1, 95)]),
            95,
            5,
            if idx < 3 { 25 } else { 0 },
        ));
    }

    Snapshot {
        orders,
        customers: vec![
            Customer {
                phone: "+15550001".to_string(),
                name: "Asha".to_string(),
                lifetime_spend: Decimal::from(12_400),
                tier: Some("VIP".to_string()),
            },
            Customer {
                phone: "+15550002".to_string(),
                name: "Bina".to_string(),
                lifetime_spend: Decimal::from(8_600),
                tier: None,
            },
            Customer {
                phone: "+15550003".to_string(),
                name: "Chandra".to_string(),
                lifetime_spend: Decimal::from(640),
                tier: None,
            },
        ],
        products: vec![
            product("SKU-HONEY", "Honey", 80, 120, 40),
            product("SKU-OIL", "Oil", 150, 180, 25),
            product("SKU-RICE", "Rice", 280, 350, 60),
            // Thin margin: sells for barely above cost.
            product("SKU-GHEE", "Ghee", 88, 95, 30),
            // Stock on the shelf, no sales in the trailing window.
            product("SKU-CANDLE", "Candles", 20, 55, 48),
        ],
    }
}

fn item(sku: &str, name: &str, qty: u32, total: i64) -> RawLineItem {
    RawLineItem {
        sku: Some(sku.to_string()),
        name: Some(name.to_string()),
        qty: Some(qty),
        line_total: Some(Decimal::from(total)),
    }
}

fn order(
    id: &str,
    phone: &str,
    date: DateTime<Utc>,
    items: LineItems,
    total: i64,
    profit: i64,
    discount: i64,
) -> Order {
    Order {
        id: OrderId(id.to_string()),
        order_date: date,
        customer_phone: phone.to_string(),
        items,
        grand_total: Decimal::from(total),
        net_profit: Decimal::from(profit),
        discount: Decimal::from(discount),
        status: FulfillmentStatus::Delivered,
    }
}

fn product(sku: &str, name: &str, cost: i64, selling: i64, stock: u32) -> Product {
    Product {
        id: ProductId(sku.to_string()),
        name: name.to_string(),
        cost_price: Decimal::from(cost),
        selling_price: Decimal::from(selling),
        stock_qty: stock,
        expiry: None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use shoplens_core::{AnalyticsEngine, FindingKind};

    use super::demo_snapshot;

    #[test]
    fn demo_data_populates_every_report_section() {
        let as_of = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let report = AnalyticsEngine::default().analyze(&demo_snapshot(as_of), as_of);

        assert!(!report.due_customers.is_empty(), "expected a due customer");
        assert!(!report.churn_risks.is_empty(), "expected a churn risk");
        assert!(!report.bundles.is_empty(), "expected a bundle opportunity");
        assert!(
            report.findings.iter().any(|f| f.kind == FindingKind::LowMargin),
            "expected a low margin finding"
        );
        assert!(
            report.findings.iter().any(|f| f.kind == FindingKind::DiscountOveruse),
            "expected a discount overuse finding"
        );
        assert!(
            report.findings.iter().any(|f| f.kind == FindingKind::DeadInventory),
            "expected a dead inventory finding"
        );
        assert!(report.estimated_leakage > rust_decimal::Decimal::ZERO);
    }
}
