//! Shoplens core: a small-merchant commerce analytics engine.
//!
//! Given a point-in-time snapshot of orders, customers, and products, the
//! engine derives actionable signals: customers due to reorder, customers
//! at churn risk ranked by revenue at stake, products habitually bought
//! together (with discounted bundle pricing), and profit leakage. Every
//! computation is a pure function of the snapshot; rendering, messaging,
//! and persistence of results are the caller's concern.

pub mod affinity;
pub mod bundle;
pub mod churn;
pub mod config;
pub mod cycle;
pub mod domain;
pub mod engine;
pub mod history;
pub mod leakage;
pub mod normalize;
pub mod report;

pub use affinity::{AffinityPair, ConfidenceTier, ProductAffinityMiner};
pub use bundle::{BundlePricer, BundleQuote, RatePricing};
pub use churn::{ChurnRisk, ChurnRiskScorer};
pub use config::{AnalyticsConfig, ConfigError};
pub use cycle::{DueCustomer, PurchaseCycle, PurchaseCycleEstimator};
pub use domain::customer::Customer;
pub use domain::finding::{FindingKind, LeakageFinding, Severity};
pub use domain::order::{FulfillmentStatus, LineItems, Order, OrderId, RawLineItem};
pub use domain::product::{Product, ProductId};
pub use engine::{AnalyticsEngine, Snapshot};
pub use history::OrderHistoryIndex;
pub use leakage::MarginLeakageDetector;
pub use normalize::LineItem;
pub use report::{AnalyticsReport, BundleOpportunity};
