use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, PrincipalId, UserId};
use domain::{Money, Order, OrderLineItem, OrderStatus, ProductId, ProductSnapshot};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::{CatalogStore, OrderStore, StockDecrement},
};

/// Runs the database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

fn quantity_to_db(quantity: u32) -> Result<i32> {
    i32::try_from(quantity)
        .map_err(|_| StoreError::OutOfRange(format!("quantity {quantity} exceeds column range")))
}

fn quantity_from_db(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::OutOfRange(format!("negative {column}: {value}")))
}

/// PostgreSQL-backed catalog store.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Creates a new PostgreSQL catalog store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_snapshot(row: PgRow) -> Result<ProductSnapshot> {
        Ok(ProductSnapshot {
            product_id: ProductId::new(row.try_get::<String, _>("id")?),
            authoritative_price: Money::from_cents(row.try_get("price_cents")?),
            available_stock: quantity_from_db(row.try_get("stock")?, "stock")?,
            display_name: row.try_get("name")?,
        })
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<ProductSnapshot>> {
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_owned()).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, name, price_cents, stock
            FROM products
            WHERE id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_snapshot).collect()
    }

    async fn decrement_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<StockDecrement> {
        // A quantity beyond the column range can never be covered by stock.
        let Ok(quantity) = i32::try_from(quantity) else {
            return Ok(StockDecrement::Insufficient);
        };

        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock = stock - $2
            WHERE id = $1 AND stock >= $2
            RETURNING stock
            "#,
        )
        .bind(product_id.as_str())
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?;

        match remaining {
            Some(remaining) => Ok(StockDecrement::Applied {
                remaining: quantity_from_db(remaining, "stock")?,
            }),
            None => {
                tracing::debug!(%product_id, quantity, "guarded stock decrement not applied");
                Ok(StockDecrement::Insufficient)
            }
        }
    }
}

/// PostgreSQL-backed order store.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
            status: status.parse::<OrderStatus>()?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    fn row_to_line_item(row: PgRow) -> Result<OrderLineItem> {
        Ok(OrderLineItem {
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            quantity: quantity_from_db(row.try_get("quantity")?, "quantity")?,
            unit_price: Money::from_cents(row.try_get("price_cents")?),
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn find_user_id(&self, principal: &PrincipalId) -> Result<Option<UserId>> {
        let id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE principal_id = $1")
            .bind(principal.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(id.map(UserId::from_uuid))
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, total_amount_cents, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.total_amount.cents())
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_line_items(&self, items: &[OrderLineItem]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let rows = items
            .iter()
            .map(|item| Ok((item, quantity_to_db(item.quantity)?)))
            .collect::<Result<Vec<_>>>()?;

        // One multi-row INSERT: either every item lands or none does.
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO order_items (order_id, product_id, quantity, price_cents) ",
        );
        builder.push_values(rows, |mut row, (item, quantity)| {
            row.push_bind(item.order_id.as_uuid())
                .push_bind(item.product_id.as_str())
                .push_bind(quantity)
                .push_bind(item.unit_price.cents());
        });

        builder.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn delete_line_items(&self, order_id: OrderId) -> Result<()> {
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, user_id, total_amount_cents, status, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn get_line_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, product_id, quantity, price_cents
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_line_item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_conversion_rejects_out_of_range() {
        assert_eq!(quantity_to_db(7).unwrap(), 7);
        assert!(matches!(
            quantity_to_db(u32::MAX),
            Err(StoreError::OutOfRange(_))
        ));
        assert!(matches!(
            quantity_from_db(-1, "stock"),
            Err(StoreError::OutOfRange(_))
        ));
    }
}
