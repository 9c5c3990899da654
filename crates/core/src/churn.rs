//! Churn-risk scoring: customers well past their usual reorder rhythm,
//! ranked by the revenue at stake.
//!
//! Deliberately stricter than the reorder-due window. A due customer gets a
//! nudge; a churn-risk customer gets an intervention, so only customers
//! worth intervening for (by lifetime spend) are scored at all.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ChurnConfig;
use crate::cycle;
use crate::domain::customer::Customer;
use crate::domain::finding::Severity;
use crate::history::OrderHistoryIndex;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnRisk {
    pub customer_phone: String,
    pub customer_name: String,
    pub lifetime_spend: Decimal,
    pub days_overdue: f64,
    pub severity: Severity,
    /// The configured fraction of lifetime spend, not the whole of it:
    /// churn is probabilistic, not certain loss.
    pub at_risk_amount: Decimal,
}

pub struct ChurnRiskScorer {
    config: ChurnConfig,
}

impl ChurnRiskScorer {
    pub fn new(config: ChurnConfig) -> Self {
        Self { config }
    }

    /// Risks ranked descending by at-risk amount, capped at the configured
    /// result count.
    pub fn score(
        &self,
        index: &OrderHistoryIndex<'_>,
        customers: &[Customer],
        as_of: DateTime<Utc>,
    ) -> Vec<ChurnRisk> {
        let by_phone: HashMap<&str, &Customer> =
            customers.iter().map(|customer| (customer.phone.as_str(), customer)).collect();

        let mut risks: Vec<ChurnRisk> = index
            .customers()
            .filter_map(|(phone, orders)| {
                let customer = by_phone.get(phone)?;
                if customer.lifetime_spend < self.config.min_lifetime_spend {
                    return None;
                }
                let cycle = cycle::cycle_for(phone, orders, as_of)?;
                if cycle.days_overdue <= self.config.overdue_after_days {
                    return None;
                }

                let severity = if cycle.days_overdue > self.config.high_severity_after_days {
                    Severity::High
                } else {
                    Severity::Medium
                };

                Some(ChurnRisk {
                    customer_phone: phone.to_string(),
                    customer_name: customer.name.clone(),
                    lifetime_spend: customer.lifetime_spend,
                    days_overdue: cycle.days_overdue,
                    severity,
                    at_risk_amount: (customer.lifetime_spend * self.config.at_risk_fraction)
                        .round_dp(2),
                })
            })
            .collect();

        risks.sort_by(|a, b| {
            b.at_risk_amount
                .cmp(&a.at_risk_amount)
                .then_with(|| a.customer_phone.cmp(&b.customer_phone))
        });
        risks.truncate(self.config.max_results);
        risks
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::config::ChurnConfig;
    use crate::domain::customer::Customer;
    use crate::domain::finding::Severity;
    use crate::domain::order::{FulfillmentStatus, LineItems, Order, OrderId};
    use crate::history::OrderHistoryIndex;

    use super::ChurnRiskScorer;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
    }

    fn order(id: &str, phone: &str, day: i64) -> Order {
        Order {
            id: OrderId(id.to_string()),
            order_date: base() + Duration::days(day),
            customer_phone: phone.to_string(),
            items: LineItems::Encoded("Honey (x1)".to_string()),
            grand_total: Decimal::from(100),
            net_profit: Decimal::from(20),
            discount: Decimal::ZERO,
            status: FulfillmentStatus::Delivered,
        }
    }

    fn customer(phone: &str, spend: i64) -> Customer {
        Customer {
            phone: phone.to_string(),
            name: format!("Customer {phone}"),
            lifetime_spend: Decimal::from(spend),
            tier: None,
        }
    }

    /// Two orders 10 days apart, so the mean gap is exactly 10.
    fn two_orders(phone: &str, prefix: &str) -> Vec<Order> {
        vec![
            order(&format!("{prefix}-1"), phone, 0),
            order(&format!("{prefix}-2"), phone, 10),
        ]
    }

    fn as_of_for_overdue(overdue: i64) -> DateTime<Utc> {
        // Last order on day 10, mean gap 10: overdue = since_last - 10.
        base() + Duration::days(10 + 10 + overdue)
    }

    #[test]
    fn low_value_customers_are_never_flagged() {
        let orders = two_orders("+1555", "O");
        let index = OrderHistoryIndex::build(&orders);
        let customers = vec![customer("+1555", 999)];

        let scorer = ChurnRiskScorer::new(ChurnConfig::default());
        assert!(scorer.score(&index, &customers, as_of_for_overdue(20)).is_empty());
    }

    #[test]
    fn overdue_must_exceed_the_reorder_window() {
        let orders = two_orders("+1555", "O");
        let index = OrderHistoryIndex::build(&orders);
        let customers = vec![customer("+1555", 5_000)];
        let scorer = ChurnRiskScorer::new(ChurnConfig::default());

        // Exactly 7 days overdue is still "due", not churn risk.
        assert!(scorer.score(&index, &customers, as_of_for_overdue(7)).is_empty());
        // 8 days overdue crosses into churn territory.
        assert_eq!(scorer.score(&index, &customers, as_of_for_overdue(8)).len(), 1);
    }

    #[test]
    fn severity_escalates_past_thirty_days() {
        let orders = two_orders("+1555", "O");
        let index = OrderHistoryIndex::build(&orders);
        let customers = vec![customer("+1555", 5_000)];
        let scorer = ChurnRiskScorer::new(ChurnConfig::default());

        let medium = scorer.score(&index, &customers, as_of_for_overdue(30));
        assert_eq!(medium[0].severity, Severity::Medium);

        let high = scorer.score(&index, &customers, as_of_for_overdue(31));
        assert_eq!(high[0].severity, Severity::High);
    }

    #[test]
    fn at_risk_amount_is_a_fraction_of_lifetime_spend() {
        let orders = two_orders("+1555", "O");
        let index = OrderHistoryIndex::build(&orders);
        let customers = vec![customer("+1555", 10_000)];
        let scorer = ChurnRiskScorer::new(ChurnConfig::default());

        let risks = scorer.score(&index, &customers, as_of_for_overdue(15));
        assert_eq!(risks[0].at_risk_amount, Decimal::from(3_000));
    }

    #[test]
    fn risks_rank_by_at_risk_amount_and_are_capped() {
        let mut orders = Vec::new();
        orders.extend(two_orders("+1111", "A"));
        orders.extend(two_orders("+2222", "B"));
        orders.extend(two_orders("+3333", "C"));
        let index = OrderHistoryIndex::build(&orders);
        let customers =
            vec![customer("+1111", 2_000), customer("+2222", 9_000), customer("+3333", 4_000)];

        let mut config = ChurnConfig::default();
        config.max_results = 2;
        let scorer = ChurnRiskScorer::new(config);

        let risks = scorer.score(&index, &customers, as_of_for_overdue(20));
        assert_eq!(risks.len(), 2);
        assert_eq!(risks[0].customer_phone, "+2222");
        assert_eq!(risks[1].customer_phone, "+3333");
    }
}
