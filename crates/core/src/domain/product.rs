use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub stock_qty: u32,
    pub expiry: Option<NaiveDate>,
}

impl Product {
    /// Margin analysis requires both prices strictly positive. A missing
    /// price is unknown data, not a zero-margin product.
    pub fn has_priced_margin(&self) -> bool {
        self.cost_price > Decimal::ZERO && self.selling_price > Decimal::ZERO
    }

    /// Unit margin as a percentage of selling price. `None` when either
    /// price is missing or non-positive.
    pub fn margin_pct(&self) -> Option<f64> {
        if !self.has_priced_margin() {
            return None;
        }
        let margin = (self.selling_price - self.cost_price) / self.selling_price;
        Some(margin.to_f64().unwrap_or(0.0) * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Product, ProductId};

    fn product(cost: i64, selling: i64) -> Product {
        Product {
            id: ProductId("SKU-1".to_string()),
            name: "Honey".to_string(),
            cost_price: Decimal::from(cost),
            selling_price: Decimal::from(selling),
            stock_qty: 10,
            expiry: None,
        }
    }

    #[test]
    fn margin_pct_from_positive_prices() {
        let margin = product(80, 100).margin_pct().expect("priced margin");
        assert!((margin - 20.0).abs() < 1e-9);
    }

    #[test]
    fn missing_cost_or_selling_price_yields_no_margin() {
        assert_eq!(product(0, 100).margin_pct(), None);
        assert_eq!(product(80, 0).margin_pct(), None);
    }
}
