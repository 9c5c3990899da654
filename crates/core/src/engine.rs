//! The analytics engine facade.
//!
//! `analyze` is a pure function of the snapshot it is given: no analyzer
//! mutates shared state, so concurrent report requests may interleave
//! freely (each just repeats the work — there is no caching layer, and
//! none is assumed). Callers wanting cross-analyzer consistency hand every
//! analyzer the same [`Snapshot`], which is exactly what this facade does.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::affinity::ProductAffinityMiner;
use crate::bundle::BundlePricer;
use crate::churn::ChurnRiskScorer;
use crate::config::AnalyticsConfig;
use crate::cycle::PurchaseCycleEstimator;
use crate::domain::customer::Customer;
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::history::OrderHistoryIndex;
use crate::leakage::MarginLeakageDetector;
use crate::report::{self, AnalyticsReport, BundleOpportunity};

/// A point-in-time copy of the three source collections. The engine never
/// mutates it; persistence of any derived result is the caller's concern.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub orders: Vec<Order>,
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
}

pub struct AnalyticsEngine {
    cycles: PurchaseCycleEstimator,
    churn: ChurnRiskScorer,
    affinity: ProductAffinityMiner,
    bundles: BundlePricer,
    leakage: MarginLeakageDetector,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            cycles: PurchaseCycleEstimator::new(config.cycle),
            churn: ChurnRiskScorer::new(config.churn),
            affinity: ProductAffinityMiner::new(config.affinity),
            bundles: BundlePricer::new(config.bundle),
            leakage: MarginLeakageDetector::new(config.leakage),
        }
    }

    /// Run every analyzer over the snapshot as of the given instant.
    /// `generated_at` on the report equals `as_of`, so an unchanged
    /// snapshot always produces a byte-identical report.
    pub fn analyze(&self, snapshot: &Snapshot, as_of: DateTime<Utc>) -> AnalyticsReport {
        tracing::debug!(
            orders = snapshot.orders.len(),
            customers = snapshot.customers.len(),
            products = snapshot.products.len(),
            "analyzing snapshot"
        );

        let index = OrderHistoryIndex::build(&snapshot.orders);

        let due_customers = self.cycles.due_customers(&index, &snapshot.customers, as_of);
        tracing::debug!(due = due_customers.len(), "purchase cycles estimated");

        let churn_risks = self.churn.score(&index, &snapshot.customers, as_of);
        tracing::debug!(risks = churn_risks.len(), "churn risks scored");

        let by_id: HashMap<&str, &Product> =
            snapshot.products.iter().map(|product| (product.id.0.as_str(), product)).collect();
        let bundles: Vec<BundleOpportunity> = self
            .affinity
            .mine(&index)
            .into_iter()
            .map(|pair| {
                let pricing = match (by_id.get(pair.product_a.as_str()), by_id.get(pair.product_b.as_str()))
                {
                    (Some(a), Some(b)) => self.bundles.price_pair(a, b),
                    _ => None,
                };
                BundleOpportunity { pair, pricing }
            })
            .collect();
        tracing::debug!(
            pairs = bundles.len(),
            priced = bundles.iter().filter(|bundle| bundle.pricing.is_some()).count(),
            "affinity pairs priced"
        );

        let findings = self.leakage.detect(&index, &snapshot.orders, &snapshot.products, as_of);
        tracing::debug!(findings = findings.len(), "leakage checks completed");

        let report = report::aggregate(as_of, due_customers, churn_risks, bundles, findings);
        tracing::info!(
            findings = report.finding_count,
            due = report.due_customers.len(),
            bundles = report.bundles.len(),
            estimated_leakage = %report.estimated_leakage,
            "report assembled"
        );
        report
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}
