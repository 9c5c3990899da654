use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Coarse urgency ranking shared by churn risks and leakage findings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    LowMargin,
    ChurnRisk,
    DiscountOveruse,
    DeadInventory,
}

/// A single structural cause of reduced profit, with an order-of-magnitude
/// monetary estimate and a corrective suggestion for the merchant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeakageFinding {
    pub kind: FindingKind,
    pub severity: Severity,
    /// What the finding is about: a product SKU, a customer phone, or a
    /// window label for order-level findings.
    pub subject: String,
    pub amount: Decimal,
    pub suggestion: String,
}
