//! Bundle pricing for affinity pairs.
//!
//! Selection policy is a graduated fallback: offer the deepest candidate
//! discount that still clears the profitability floor, so the customer sees
//! the most attractive price the margin can carry. When nothing clears the
//! floor, the fallback rate is surfaced anyway, marked non-profitable, so
//! the caller can warn instead of silently dropping the pair.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::BundleConfig;
use crate::domain::product::Product;

/// Bundle economics at one candidate discount rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatePricing {
    /// Discount as a percentage, e.g. `15`.
    pub discount_pct: Decimal,
    pub bundle_price: Decimal,
    pub profit: Decimal,
    pub margin_pct: f64,
    /// Profit positive and margin at or above the configured floor.
    pub profitable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BundleQuote {
    pub product_a: String,
    pub product_b: String,
    pub total_cost: Decimal,
    pub total_selling: Decimal,
    /// Every candidate rate, shallowest discount first.
    pub options: Vec<RatePricing>,
    /// The rate chosen by the fallback policy.
    pub selected: RatePricing,
}

pub struct BundlePricer {
    config: BundleConfig,
}

impl BundlePricer {
    pub fn new(config: BundleConfig) -> Self {
        Self { config }
    }

    /// Price a pair of products as a bundle. `None` when either product
    /// lacks a positive cost or selling price; such pairs are skipped, not
    /// priced from fabricated values.
    pub fn price_pair(&self, a: &Product, b: &Product) -> Option<BundleQuote> {
        if !a.has_priced_margin() || !b.has_priced_margin() {
            return None;
        }

        let total_cost = a.cost_price + b.cost_price;
        let total_selling = a.selling_price + b.selling_price;

        let mut options: Vec<RatePricing> = self
            .config
            .discount_rates_pct
            .iter()
            .map(|rate| self.price_at(total_cost, total_selling, *rate))
            .collect();
        options.sort_by(|a, b| a.discount_pct.cmp(&b.discount_pct));

        // Deepest profitable discount wins; otherwise surface the fallback
        // rate marked non-profitable.
        let selected = options
            .iter()
            .rev()
            .find(|option| option.profitable)
            .cloned()
            .unwrap_or_else(|| self.price_at(total_cost, total_selling, self.config.fallback_rate_pct));

        Some(BundleQuote {
            product_a: a.id.0.clone(),
            product_b: b.id.0.clone(),
            total_cost,
            total_selling,
            options,
            selected,
        })
    }

    fn price_at(&self, total_cost: Decimal, total_selling: Decimal, rate_pct: Decimal) -> RatePricing {
        let hundred = Decimal::from(100);
        let bundle_price = (total_selling * (hundred - rate_pct) / hundred).round_dp(2);
        let profit = bundle_price - total_cost;
        let margin_pct = if bundle_price > Decimal::ZERO {
            (profit / bundle_price).to_f64().unwrap_or(0.0) * 100.0
        } else {
            0.0
        };

        RatePricing {
            discount_pct: rate_pct,
            bundle_price,
            profit,
            margin_pct,
            profitable: profit > Decimal::ZERO && margin_pct >= self.config.min_margin_pct,
        }
    }
}
