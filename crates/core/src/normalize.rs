//! Line-item normalization at the ingestion boundary.
//!
//! Stored orders carry line items either as a structured array with
//! inconsistent field names or as a text encoding like
//! `"Honey (x2), Oil (x1)"`. Everything downstream operates on the one
//! canonical [`LineItem`] shape produced here. Malformed input degrades to
//! an empty list; normalization never fails.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::{LineItems, RawLineItem};

/// Canonical line item every analyzer works with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    /// Always at least 1.
    pub quantity: u32,
    /// Zero when the stored record carried no usable total. A zero here
    /// means "unknown", not a free sale; margin analysis must not read it
    /// as a genuine price.
    pub line_total: Decimal,
}

/// Resolve a stored line-item field into canonical items.
pub fn normalize(items: &LineItems) -> Vec<LineItem> {
    match items {
        LineItems::Structured(raw) => normalize_structured(raw),
        LineItems::Encoded(text) => parse_encoded(text),
    }
}

/// Distinct product identifiers in first-seen order.
pub fn distinct_products(items: &[LineItem]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut distinct = Vec::new();
    for item in items {
        if seen.insert(item.product_id.as_str()) {
            distinct.push(item.product_id.clone());
        }
    }
    distinct
}

fn normalize_structured(raw: &[RawLineItem]) -> Vec<LineItem> {
    raw.iter()
        .filter_map(|item| {
            let name = item.name.as_deref().map(str::trim).unwrap_or("");
            let sku = item.sku.as_deref().map(str::trim).unwrap_or("");
            // Identifier falls back to the display name; an item with
            // neither cannot be keyed and is dropped.
            let product_id = if !sku.is_empty() { sku } else { name };
            if product_id.is_empty() {
                return None;
            }

            Some(LineItem {
                product_id: product_id.to_string(),
                name: if name.is_empty() { product_id.to_string() } else { name.to_string() },
                quantity: item.qty.unwrap_or(1).max(1),
                line_total: item.line_total.unwrap_or(Decimal::ZERO),
            })
        })
        .collect()
}

fn parse_encoded(text: &str) -> Vec<LineItem> {
    text.split(',')
        .filter_map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() {
                return None;
            }

            let (name, quantity) = match parse_segment(segment) {
                Some(parsed) => parsed,
                // Segments outside the `<name> (x<n>)` pattern still count
                // as a single unit of whatever the text names.
                None => (segment.to_string(), 1),
            };

            Some(LineItem {
                product_id: name.clone(),
                name,
                quantity,
                line_total: Decimal::ZERO,
            })
        })
        .collect()
}

/// Match one `<name> (x<integer>)` segment.
fn parse_segment(segment: &str) -> Option<(String, u32)> {
    let body = segment.strip_suffix(')')?;
    let (name, qty) = body.rsplit_once("(x")?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let quantity: u32 = qty.trim().parse().ok()?;
    Some((name.to_string(), quantity.max(1)))
}
