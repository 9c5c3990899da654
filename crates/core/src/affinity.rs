//! Product affinity mining: which products are habitually bought together.
//!
//! Counts unordered co-occurrence of product pairs within single orders.
//! Confidence is a fixed-threshold classifier over the raw count, not a
//! statistical significance test; the thresholds are a documented
//! simplification and live in [`crate::config::AffinityConfig`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AffinityConfig;
use crate::history::OrderHistoryIndex;
use crate::normalize;
use crate::domain::order::OrderId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_count(count: u32, config: &AffinityConfig) -> Self {
        if count >= config.high_count {
            Self::High
        } else if count >= config.medium_count {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// An unordered product pair seen together in multiple orders. The key is
/// canonical: `product_a` sorts lexicographically before `product_b`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffinityPair {
    pub product_a: String,
    pub product_b: String,
    pub count: u32,
    pub order_ids: Vec<OrderId>,
    pub confidence: ConfidenceTier,
}

pub struct ProductAffinityMiner {
    config: AffinityConfig,
}

impl ProductAffinityMiner {
    pub fn new(config: AffinityConfig) -> Self {
        Self { config }
    }

    /// Candidate pairs ranked by count descending, capped at the configured
    /// maximum. Pairs below the minimum count are noise and dropped.
    pub fn mine(&self, index: &OrderHistoryIndex<'_>) -> Vec<AffinityPair> {
        // BTreeMap keeps iteration (and thus tie-breaking) deterministic.
        let mut counters: BTreeMap<(String, String), Vec<OrderId>> = BTreeMap::new();

        for (order, items) in index.normalized_orders() {
            let mut distinct = normalize::distinct_products(items);
            if distinct.len() < 2 {
                continue;
            }
            // Sorting once canonicalizes every pair drawn from the order.
            distinct.sort();

            for i in 0..distinct.len() {
                for j in (i + 1)..distinct.len() {
                    counters
                        .entry((distinct[i].clone(), distinct[j].clone()))
                        .or_default()
                        .push(order.id.clone());
                }
            }
        }

        let mut pairs: Vec<AffinityPair> = counters
            .into_iter()
            .filter(|(_, orders)| orders.len() as u32 >= self.config.min_pair_count)
            .map(|((product_a, product_b), order_ids)| {
                let count = order_ids.len() as u32;
                AffinityPair {
                    product_a,
                    product_b,
                    count,
                    order_ids,
                    confidence: ConfidenceTier::from_count(count, &self.config),
                }
            })
            .collect();

        pairs.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.product_a.cmp(&b.product_a))
                .then_with(|| a.product_b.cmp(&b.product_b))
        });
        pairs.truncate(self.config.max_pairs);
        pairs
    }
}
