//! Margin leakage detection: three independent sub-checks whose findings
//! are concatenated, never merged.
//!
//! - Thin unit margins on priced products.
//! - Discount overuse across a trailing order window.
//! - Dead inventory: stocked products with negligible recent velocity.
//!
//! Products missing a cost or selling price are excluded from the
//! margin-dependent checks rather than scored as zero-margin.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::config::LeakageConfig;
use crate::domain::finding::{FindingKind, LeakageFinding, Severity};
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::history::OrderHistoryIndex;

pub struct MarginLeakageDetector {
    config: LeakageConfig,
}

impl MarginLeakageDetector {
    pub fn new(config: LeakageConfig) -> Self {
        Self { config }
    }

    pub fn detect(
        &self,
        index: &OrderHistoryIndex<'_>,
        orders: &[Order],
        products: &[Product],
        as_of: DateTime<Utc>,
    ) -> Vec<LeakageFinding> {
        let velocity_cutoff = as_of - Duration::days(self.config.velocity_window_days);
        let units_sold = index.units_sold_between(velocity_cutoff, as_of);

        let mut findings = self.low_margin_findings(products, &units_sold);
        findings.extend(self.discount_findings(orders, as_of));
        findings.extend(self.dead_inventory_findings(products, &units_sold));
        findings
    }

    /// Products whose unit margin sits below the configured floor. The
    /// monetary estimate is the margin shortfall against the floor applied
    /// to trailing-window sales; a product with no recent sales still gets
    /// a finding, but its stuck capital belongs to the dead-stock check.
    pub fn low_margin_findings(
        &self,
        products: &[Product],
        units_sold: &HashMap<String, u64>,
    ) -> Vec<LeakageFinding> {
        products
            .iter()
            .filter_map(|product| {
                let margin_pct = product.margin_pct()?;
                if margin_pct >= self.config.low_margin_pct {
                    return None;
                }

                let severe = margin_pct <= self.config.severe_margin_pct;
                let target_pct = if severe {
                    self.config.severe_target_margin_pct
                } else {
                    self.config.target_margin_pct
                };
                let suggested_price = price_for_target_margin(product.cost_price, target_pct);

                let units = units_sold.get(product.id.0.as_str()).copied().unwrap_or(0);
                let shortfall_frac = (self.config.low_margin_pct - margin_pct) / 100.0;
                let amount = money_from_f64(
                    shortfall_frac
                        * decimal_to_f64(product.selling_price)
                        * units as f64,
                );

                Some(LeakageFinding {
                    kind: FindingKind::LowMargin,
                    severity: if severe { Severity::High } else { Severity::Medium },
                    subject: product.id.0.clone(),
                    amount,
                    suggestion: format!(
                        "{} earns {:.1}% per unit; reprice to at least {} for a {:.0}% margin",
                        product.name,
                        margin_pct,
                        suggested_price,
                        target_pct
                    ),
                })
            })
            .collect()
    }

    /// Share of trailing-window orders that carried a discount.
    pub fn discount_findings(&self, orders: &[Order], as_of: DateTime<Utc>) -> Vec<LeakageFinding> {
        let cutoff = as_of - Duration::days(self.config.discount_window_days);
        let window: Vec<&Order> = orders
            .iter()
            .filter(|order| order.order_date > cutoff && order.order_date <= as_of)
            .collect();
        if window.is_empty() {
            return Vec::new();
        }

        let discounted: Vec<&&Order> =
            window.iter().filter(|order| order.discount > Decimal::ZERO).collect();
        let share = discounted.len() as f64 / window.len() as f64;

        let severity = if share > self.config.discount_high_share {
            Severity::High
        } else if share > self.config.discount_medium_share {
            Severity::Medium
        } else {
            return Vec::new();
        };

        let total_discount: Decimal = discounted.iter().map(|order| order.discount).sum();
        let suggestion = match severity {
            Severity::High => format!(
                "{:.0}% of orders in the last {} days were discounted; reserve discounts for new customers",
                share * 100.0,
                self.config.discount_window_days
            ),
            _ => format!(
                "{:.0}% of orders in the last {} days were discounted; review who gets a discount and why",
                share * 100.0,
                self.config.discount_window_days
            ),
        };

        vec![LeakageFinding {
            kind: FindingKind::DiscountOveruse,
            severity,
            subject: format!("last {} days", self.config.discount_window_days),
            amount: total_discount,
            suggestion,
        }]
    }

    /// Stocked products with at most the configured unit count sold in the
    /// trailing velocity window. The amount is capital stuck in stock.
    pub fn dead_inventory_findings(
        &self,
        products: &[Product],
        units_sold: &HashMap<String, u64>,
    ) -> Vec<LeakageFinding> {
        products
            .iter()
            .filter_map(|product| {
                if product.stock_qty == 0 {
                    return None;
                }
                let units = units_sold.get(product.id.0.as_str()).copied().unwrap_or(0);
                if units > self.config.dead_stock_max_units {
                    return None;
                }

                let severity = if units == 0 { Severity::High } else { Severity::Medium };
                let amount = product.cost_price * Decimal::from(product.stock_qty);

                Some(LeakageFinding {
                    kind: FindingKind::DeadInventory,
                    severity,
                    subject: product.id.0.clone(),
                    amount,
                    suggestion: format!(
                        "{} sold {} unit(s) in {} days with {} in stock; consider a clearance push",
                        product.name,
                        units,
                        self.config.velocity_window_days,
                        product.stock_qty
                    ),
                })
            })
            .collect()
    }
}

/// Selling price that yields `target_pct` margin over the given cost.
fn price_for_target_margin(cost: Decimal, target_pct: f64) -> Decimal {
    let divisor = 1.0 - target_pct / 100.0;
    if divisor <= 0.0 {
        return cost;
    }
    money_from_f64(decimal_to_f64(cost) / divisor)
}

fn decimal_to_f64(value: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    value.to_f64().unwrap_or(0.0)
}

/// NaN and infinities collapse to zero so totals stay well-defined; this
/// coercion is confined to monetary estimates, never severity thresholds.
fn money_from_f64(value: f64) -> Decimal {
    if value.is_finite() {
        Decimal::from_f64(value).unwrap_or(Decimal::ZERO).round_dp(2)
    } else {
        Decimal::ZERO
    }
}
