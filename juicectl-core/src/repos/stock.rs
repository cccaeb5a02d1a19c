//! Stock repository
//!
//! Read side for the stock report, write side for audited adjustments.

use sqlx::PgPool;
use tracing::info;

use crate::models::{StockHistoryEntry, StockRow};
use crate::report::StockReport;
use crate::{Error, Result};

/// A requested change to one size's stock level
#[derive(Debug, Clone)]
pub struct StockAdjustment {
    pub size_id: i32,
    /// Signed delta: positive restocks, negative sells or writes off
    pub change: i32,
    /// Free-form reason recorded as `change_type` (e.g. "restock", "sale")
    pub change_type: String,
    pub changed_by: Option<i32>,
    pub notes: Option<String>,
}

pub struct StockRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> StockRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every size of every active product
    pub async fn active_rows(&self) -> Result<Vec<StockRow>> {
        let rows = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT
                p.id AS product_id,
                p.name AS product_name,
                p.category,
                ps.id AS size_id,
                ps.size,
                ps.price,
                ps.stock_quantity
            FROM products p
            JOIN product_sizes ps ON ps.product_id = p.id
            WHERE p.is_active
            ORDER BY p.name, p.id, ps.price, ps.id
            "#,
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn report(&self) -> Result<StockReport> {
        Ok(StockReport::from_rows(self.active_rows().await?))
    }

    /// Apply `adjustment` and record it in stock_history, atomically.
    ///
    /// The size row is locked for the duration, so concurrent adjustments
    /// serialize instead of losing updates.
    pub async fn adjust(&self, adjustment: &StockAdjustment) -> Result<StockHistoryEntry> {
        let mut tx = self.pool.begin().await?;

        let previous: i32 = sqlx::query_scalar(
            "SELECT stock_quantity FROM product_sizes WHERE id = $1 FOR UPDATE",
        )
        .bind(adjustment.size_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::not_found("product size", adjustment.size_id))?;

        let new_stock = next_stock(adjustment.size_id, previous, adjustment.change)?;

        sqlx::query(
            "UPDATE product_sizes SET stock_quantity = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(adjustment.size_id)
        .bind(new_stock)
        .execute(&mut *tx)
        .await?;

        let entry = sqlx::query_as::<_, StockHistoryEntry>(
            r#"
            INSERT INTO stock_history
                (product_size_id, previous_stock, new_stock, change_amount, change_type, changed_by, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, product_size_id, previous_stock, new_stock, change_amount,
                      change_type, changed_by, notes, created_at
            "#,
        )
        .bind(adjustment.size_id)
        .bind(previous)
        .bind(new_stock)
        .bind(adjustment.change)
        .bind(&adjustment.change_type)
        .bind(adjustment.changed_by)
        .bind(&adjustment.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            size_id = adjustment.size_id,
            previous,
            new_stock,
            change_type = %adjustment.change_type,
            "stock adjusted"
        );
        Ok(entry)
    }
}

/// Stock level after applying `change`, refusing to go below zero
fn next_stock(size_id: i32, available: i32, change: i32) -> Result<i32> {
    match available.checked_add(change) {
        Some(next) if next >= 0 => Ok(next),
        _ => Err(Error::InsufficientStock {
            size_id,
            available,
            change,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[test]
    fn next_stock_adds_delta() {
        assert_eq!(next_stock(1, 5, 3).unwrap(), 8);
        assert_eq!(next_stock(1, 5, -5).unwrap(), 0);
    }

    #[test]
    fn next_stock_refuses_negative() {
        let err = next_stock(7, 2, -3).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientStock {
                size_id: 7,
                available: 2,
                change: -3
            }
        ));
    }

    #[test]
    fn next_stock_refuses_overflow() {
        assert!(next_stock(1, i32::MAX, 1).is_err());
    }

    async fn fixtures(pool: &PgPool) {
        schema::apply(pool, |_| {}).await.expect("schema");
        sqlx::raw_sql(
            r#"
            INSERT INTO products (id, name, base_price) VALUES (1, 'Orange Sunrise', 4.50);
            INSERT INTO products (id, name, base_price, is_active) VALUES (2, 'Retired Beet', 4.00, FALSE);
            INSERT INTO product_sizes (id, product_id, size, price, stock_quantity) VALUES
                (10, 1, 'small', 4.50, 5),
                (11, 1, 'large', 6.50, 0),
                (20, 2, 'small', 4.00, 9);
            "#,
        )
        .execute(pool)
        .await
        .expect("fixtures");
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires database"]
    async fn report_covers_active_sizes_only(pool: PgPool) {
        fixtures(&pool).await;
        let report = StockRepo::new(&pool).report().await.expect("report");

        assert_eq!(report.totals.products, 1);
        assert_eq!(report.totals.in_stock, 1);
        assert_eq!(report.totals.out_of_stock, 1);

        let active_sizes: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM product_sizes ps JOIN products p ON p.id = ps.product_id WHERE p.is_active",
        )
        .fetch_one(&pool)
        .await
        .expect("count");
        assert_eq!(report.totals.sizes() as i64, active_sizes);
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires database"]
    async fn adjust_records_history(pool: PgPool) {
        fixtures(&pool).await;
        let repo = StockRepo::new(&pool);

        let entry = repo
            .adjust(&StockAdjustment {
                size_id: 10,
                change: -2,
                change_type: "sale".to_string(),
                changed_by: None,
                notes: None,
            })
            .await
            .expect("adjust");

        assert_eq!(entry.previous_stock, 5);
        assert_eq!(entry.new_stock, 3);
        assert_eq!(entry.new_stock, entry.previous_stock + entry.change_amount);

        let stock: i32 =
            sqlx::query_scalar("SELECT stock_quantity FROM product_sizes WHERE id = 10")
                .fetch_one(&pool)
                .await
                .expect("stock");
        assert_eq!(stock, 3);
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires database"]
    async fn adjust_below_zero_changes_nothing(pool: PgPool) {
        fixtures(&pool).await;
        let result = StockRepo::new(&pool)
            .adjust(&StockAdjustment {
                size_id: 11,
                change: -1,
                change_type: "sale".to_string(),
                changed_by: None,
                notes: None,
            })
            .await;
        assert!(matches!(result, Err(Error::InsufficientStock { .. })));

        let history: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_history")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(history, 0);
    }
}
