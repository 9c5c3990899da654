//! Purchase-cycle estimation: how often each customer reorders, and who is
//! currently inside the reorder-due window.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CycleConfig;
use crate::domain::customer::Customer;
use crate::domain::order::Order;
use crate::history::OrderHistoryIndex;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A customer's reorder rhythm, derived from at least two orders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseCycle {
    pub customer_phone: String,
    pub order_dates: Vec<DateTime<Utc>>,
    /// Mean gap in days between consecutive orders.
    pub mean_gap_days: f64,
    pub days_since_last: f64,
    /// `days_since_last - mean_gap_days`; negative while the customer is
    /// still inside their usual rhythm.
    pub days_overdue: f64,
}

/// A customer inside the reorder-due window, prioritized for outreach.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DueCustomer {
    pub customer_name: String,
    pub vip: bool,
    pub cycle: PurchaseCycle,
}

pub struct PurchaseCycleEstimator {
    config: CycleConfig,
}

impl PurchaseCycleEstimator {
    pub fn new(config: CycleConfig) -> Self {
        Self { config }
    }

    /// Cycles for every customer with two or more orders, sorted by phone
    /// for deterministic output.
    pub fn estimate(&self, index: &OrderHistoryIndex<'_>, as_of: DateTime<Utc>) -> Vec<PurchaseCycle> {
        let mut cycles: Vec<PurchaseCycle> = index
            .customers()
            .filter_map(|(phone, orders)| cycle_for(phone, orders, as_of))
            .collect();
        cycles.sort_by(|a, b| a.customer_phone.cmp(&b.customer_phone));
        cycles
    }

    /// Customers whose days-overdue falls inside the configured window,
    /// VIPs first, most overdue first within each group.
    pub fn due_customers(
        &self,
        index: &OrderHistoryIndex<'_>,
        customers: &[Customer],
        as_of: DateTime<Utc>,
    ) -> Vec<DueCustomer> {
        let by_phone: HashMap<&str, &Customer> =
            customers.iter().map(|customer| (customer.phone.as_str(), customer)).collect();

        let mut due: Vec<DueCustomer> = self
            .estimate(index, as_of)
            .into_iter()
            .filter(|cycle| self.is_due(cycle.days_overdue))
            .map(|cycle| {
                let customer = by_phone.get(cycle.customer_phone.as_str());
                DueCustomer {
                    customer_name: customer
                        .map(|c| c.name.clone())
                        .unwrap_or_else(|| cycle.customer_phone.clone()),
                    vip: customer
                        .is_some_and(|c| c.is_vip(self.config.high_value_spend)),
                    cycle,
                }
            })
            .collect();

        due.sort_by(|a, b| {
            b.vip
                .cmp(&a.vip)
                .then_with(|| {
                    b.cycle
                        .days_overdue
                        .partial_cmp(&a.cycle.days_overdue)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.cycle.customer_phone.cmp(&b.cycle.customer_phone))
        });
        due
    }

    fn is_due(&self, days_overdue: f64) -> bool {
        days_overdue >= -self.config.due_window_early_days
            && days_overdue <= self.config.due_window_late_days
    }
}

/// Cycle for one customer's chronologically sorted orders. `None` below two
/// orders; a single purchase has no rhythm to estimate.
pub fn cycle_for(
    phone: &str,
    orders: &[&Order],
    as_of: DateTime<Utc>,
) -> Option<PurchaseCycle> {
    if orders.len() < 2 {
        return None;
    }

    let gaps: Vec<f64> = orders
        .windows(2)
        .map(|pair| days_between(pair[0].order_date, pair[1].order_date))
        .collect();
    let mean_gap_days = gaps.iter().sum::<f64>() / gaps.len() as f64;

    let last = orders.last().expect("at least two orders").order_date;
    let days_since_last = days_between(last, as_of);

    Some(PurchaseCycle {
        customer_phone: phone.to_string(),
        order_dates: orders.iter().map(|order| order.order_date).collect(),
        mean_gap_days,
        days_since_last,
        days_overdue: days_since_last - mean_gap_days,
    })
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / SECONDS_PER_DAY
}
