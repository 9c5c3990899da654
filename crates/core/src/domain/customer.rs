use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Identity key shared with [`super::order::Order::customer_phone`].
    pub phone: String,
    pub name: String,
    pub lifetime_spend: Decimal,
    /// Optional tier label, e.g. "VIP".
    pub tier: Option<String>,
}

impl Customer {
    /// A customer counts as VIP by explicit tier label (case-insensitive)
    /// or by lifetime spend at or above the configured threshold.
    pub fn is_vip(&self, high_value_spend: Decimal) -> bool {
        self.tier.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("vip"))
            || self.lifetime_spend >= high_value_spend
    }
}
