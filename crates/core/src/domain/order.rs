use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

/// Line items as they arrive from the record store: either a structured
/// array with loosely named fields, or a legacy text encoding such as
/// `"Honey (x2), Oil (x1)"`. Resolved once by [`crate::normalize`]; no
/// analyzer reads this shape directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineItems {
    Structured(Vec<RawLineItem>),
    Encoded(String),
}

impl Default for LineItems {
    fn default() -> Self {
        Self::Structured(Vec::new())
    }
}

/// A structured line item exactly as stored. Every field is optional and
/// aliased because upstream records are not consistent about naming.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLineItem {
    #[serde(default, alias = "id", alias = "product_id")]
    pub sku: Option<String>,
    #[serde(default, alias = "product_name")]
    pub name: Option<String>,
    #[serde(default, alias = "quantity")]
    pub qty: Option<u32>,
    #[serde(default, alias = "total", alias = "price")]
    pub line_total: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_date: DateTime<Utc>,
    /// Customer identity key; customers are keyed by phone number.
    pub customer_phone: String,
    pub items: LineItems,
    pub grand_total: Decimal,
    pub net_profit: Decimal,
    pub discount: Decimal,
    pub status: FulfillmentStatus,
}
