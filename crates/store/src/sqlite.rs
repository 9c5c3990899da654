//! SQLite-backed record store.
//!
//! Decoding is deliberately defensive: monetary columns are decimal
//! strings, dates are RFC 3339 text, and the `items` column holds either a
//! JSON array or a legacy encoded string. A malformed `items` value
//! degrades to the encoded-string form and is resolved by the normalizer;
//! it never fails the read.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use shoplens_core::{
    Customer, FulfillmentStatus, LineItems, Order, OrderId, Product, ProductId,
};

use crate::{DbPool, RecordStore, StoreError};

pub struct SqliteRecordStore {
    pool: DbPool,
}

impl SqliteRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        let items = serde_json::to_string(&order.items)
            .map_err(|err| StoreError::Decode(format!("serialize items: {err}")))?;
        sqlx::query(
            "INSERT OR REPLACE INTO orders \
             (id, order_date, customer_phone, items, grand_total, net_profit, discount, status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&order.id.0)
        .bind(order.order_date.to_rfc3339())
        .bind(&order.customer_phone)
        .bind(items)
        .bind(order.grand_total.to_string())
        .bind(order.net_profit.to_string())
        .bind(order.discount.to_string())
        .bind(status_to_str(order.status))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_customer(&self, customer: &Customer) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO customers (phone, name, lifetime_spend, tier) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&customer.phone)
        .bind(&customer.name)
        .bind(customer.lifetime_spend.to_string())
        .bind(&customer.tier)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO products \
             (sku, name, cost_price, selling_price, stock_qty, expiry) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&product.id.0)
        .bind(&product.name)
        .bind(product.cost_price.to_string())
        .bind(product.selling_price.to_string())
        .bind(i64::from(product.stock_qty))
        .bind(product.expiry.map(|date| date.format("%Y-%m-%d").to_string()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query("SELECT * FROM orders ORDER BY id").fetch_all(&self.pool).await?;
        rows.iter().map(decode_order).collect()
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM customers ORDER BY phone").fetch_all(&self.pool).await?;
        rows.iter().map(decode_customer).collect()
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM products ORDER BY sku").fetch_all(&self.pool).await?;
        rows.iter().map(decode_product).collect()
    }
}

fn decode_order(row: &SqliteRow) -> Result<Order, StoreError> {
    let raw_items: String = row.try_get("items")?;
    // A non-JSON value is a legacy text encoding; the normalizer owns it.
    let items = serde_json::from_str::<LineItems>(&raw_items)
        .unwrap_or(LineItems::Encoded(raw_items));

    Ok(Order {
        id: OrderId(row.try_get("id")?),
        order_date: decode_datetime(&row.try_get::<String, _>("order_date")?)?,
        customer_phone: row.try_get("customer_phone")?,
        items,
        grand_total: decode_decimal(&row.try_get::<String, _>("grand_total")?)?,
        net_profit: decode_decimal(&row.try_get::<String, _>("net_profit")?)?,
        discount: decode_decimal(&row.try_get::<String, _>("discount")?)?,
        status: status_from_str(&row.try_get::<String, _>("status")?),
    })
}

fn decode_customer(row: &SqliteRow) -> Result<Customer, StoreError> {
    Ok(Customer {
        phone: row.try_get("phone")?,
        name: row.try_get("name")?,
        lifetime_spend: decode_decimal(&row.try_get::<String, _>("lifetime_spend")?)?,
        tier: row.try_get("tier")?,
    })
}

fn decode_product(row: &SqliteRow) -> Result<Product, StoreError> {
    let stock: i64 = row.try_get("stock_qty")?;
    let expiry: Option<String> = row.try_get("expiry")?;

    Ok(Product {
        id: ProductId(row.try_get("sku")?),
        name: row.try_get("name")?,
        cost_price: decode_decimal(&row.try_get::<String, _>("cost_price")?)?,
        selling_price: decode_decimal(&row.try_get::<String, _>("selling_price")?)?,
        stock_qty: u32::try_from(stock.max(0)).unwrap_or(u32::MAX),
        expiry: expiry.as_deref().map(decode_date).transpose()?,
    })
}

fn decode_decimal(raw: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(raw)
        .map_err(|err| StoreError::Decode(format!("invalid decimal {raw:?}: {err}")))
}

fn decode_datetime(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|err| StoreError::Decode(format!("invalid timestamp {raw:?}: {err}")))
}

fn decode_date(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| StoreError::Decode(format!("invalid date {raw:?}: {err}")))
}

fn status_to_str(status: FulfillmentStatus) -> &'static str {
    match status {
        FulfillmentStatus::Pending => "pending",
        FulfillmentStatus::Confirmed => "confirmed",
        FulfillmentStatus::Delivered => "delivered",
        FulfillmentStatus::Cancelled => "cancelled",
    }
}

fn status_from_str(raw: &str) -> FulfillmentStatus {
    match raw {
        "confirmed" => FulfillmentStatus::Confirmed,
        "delivered" => FulfillmentStatus::Delivered,
        "cancelled" => FulfillmentStatus::Cancelled,
        _ => FulfillmentStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use shoplens_core::{
        Customer, FulfillmentStatus, LineItems, Order, OrderId, Product, ProductId, RawLineItem,
    };

    use crate::connection::connect_with_settings;
    use crate::migrations::run_pending;
    use crate::{load_snapshot, RecordStore};

    use super::SqliteRecordStore;

    async fn store() -> SqliteRecordStore {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect in-memory");
        run_pending(&pool).await.expect("run migrations");
        SqliteRecordStore::new(pool)
    }

    fn order(id: &str, items: LineItems) -> Order {
        Order {
            id: OrderId(id.to_string()),
            order_date: Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap(),
            customer_phone: "+1555".to_string(),
            items,
            grand_total: Decimal::new(12_050, 2),
            net_profit: Decimal::new(2_000, 2),
            discount: Decimal::ZERO,
            status: FulfillmentStatus::Delivered,
        }
    }

    #[tokio::test]
    async fn orders_round_trip_with_structured_items() {
        let store = store().await;
        let original = order(
            "O-1",
            LineItems::Structured(vec![RawLineItem {
                sku: Some("SKU-1".to_string()),
                name: Some("Honey".to_string()),
                qty: Some(2),
                line_total: Some(Decimal::from(120)),
            }]),
        );

        store.insert_order(&original).await.expect("insert order");
        let listed = store.list_orders().await.expect("list orders");

        assert_eq!(listed, vec![original]);
    }

    #[tokio::test]
    async fn orders_round_trip_with_encoded_items() {
        let store = store().await;
        let original = order("O-1", LineItems::Encoded("Honey (x2), Oil (x1)".to_string()));

        store.insert_order(&original).await.expect("insert order");
        let listed = store.list_orders().await.expect("list orders");

        assert_eq!(listed[0].items, original.items);
    }

    #[tokio::test]
    async fn customers_and_products_round_trip() {
        let store = store().await;
        store
            .insert_customer(&Customer {
                phone: "+1555".to_string(),
                name: "Asha".to_string(),
                lifetime_spend: Decimal::new(1_234_56, 2),
                tier: Some("VIP".to_string()),
            })
            .await
            .expect("insert customer");
        store
            .insert_product(&Product {
                id: ProductId("SKU-1".to_string()),
                name: "Honey".to_string(),
                cost_price: Decimal::from(60),
                selling_price: Decimal::from(100),
                stock_qty: 25,
                expiry: Some(chrono::NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()),
            })
            .await
            .expect("insert product");

        let snapshot = load_snapshot(&store).await.expect("load snapshot");
        assert_eq!(snapshot.customers[0].tier.as_deref(), Some("VIP"));
        assert_eq!(snapshot.products[0].stock_qty, 25);
        assert_eq!(
            snapshot.products[0].expiry,
            Some(chrono::NaiveDate::from_ymd_opt(2026, 1, 31).unwrap())
        );
    }

    #[tokio::test]
    async fn empty_tables_yield_empty_collections() {
        let store = store().await;
        let snapshot = load_snapshot(&store).await.expect("load snapshot");

        assert!(snapshot.orders.is_empty());
        assert!(snapshot.customers.is_empty());
        assert!(snapshot.products.is_empty());
    }
}
