//! Catalog repository - counts, lookups used by verify, and seeding

use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogProduct};
use crate::models::StockRow;
use crate::Result;

/// How many zero-stock sizes verify lists at most
pub const ZERO_STOCK_LIMIT: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub products: i64,
    pub sizes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub inserted: Vec<String>,
    /// Products whose name already existed
    pub skipped: Vec<String>,
}

pub struct CatalogRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn counts(&self) -> Result<CatalogCounts> {
        let (products, sizes): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products),
                (SELECT COUNT(*) FROM product_sizes)
            "#,
        )
        .fetch_one(self.pool)
        .await?;
        Ok(CatalogCounts { products, sizes })
    }

    /// Sizes of products whose name starts with `prefix` (case-insensitive)
    pub async fn with_name_prefix(&self, prefix: &str) -> Result<Vec<StockRow>> {
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
            WHERE p.name ILIKE $1
            ORDER BY p.name, p.id, ps.price, ps.id
            "#,
        )
        .bind(like_prefix(prefix))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Up to `limit` sizes with no stock left
    pub async fn zero_stock(&self, limit: i64) -> Result<Vec<StockRow>> {
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
            FROM product_sizes ps
            JOIN products p ON p.id = ps.product_id
            WHERE ps.stock_quantity = 0
            ORDER BY p.name, ps.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert every catalog product not already present by name.
    ///
    /// Each product with its sizes and ingredients goes in one transaction.
    pub async fn seed(&self, catalog: &Catalog) -> Result<SeedSummary> {
        let mut summary = SeedSummary::default();
        for product in &catalog.products {
            if self.insert_product(product).await? {
                summary.inserted.push(product.name.clone());
            } else {
                debug!(name = %product.name, "product exists, skipping");
                summary.skipped.push(product.name.clone());
            }
        }
        info!(
            inserted = summary.inserted.len(),
            skipped = summary.skipped.len(),
            "catalog seeded"
        );
        Ok(summary)
    }

    /// Returns false when a product with this name already exists
    async fn insert_product(&self, product: &CatalogProduct) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let product_id: Option<i32> = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, description, category, base_price, image_url, is_active)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $1)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.base_price)
        .bind(&product.image_url)
        .bind(product.is_active)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(product_id) = product_id else {
            tx.rollback().await?;
            return Ok(false);
        };

        for size in &product.sizes {
            sqlx::query(
                r#"
                INSERT INTO product_sizes
                    (product_id, size, price, stock_quantity, calories, sugar_g, protein_g, vitamin_c_mg)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (product_id, size) DO NOTHING
                "#,
            )
            .bind(product_id)
            .bind(&size.size)
            .bind(size.price)
            .bind(size.stock_quantity)
            .bind(size.calories)
            .bind(size.sugar_g)
            .bind(size.protein_g)
            .bind(size.vitamin_c_mg)
            .execute(&mut *tx)
            .await?;
        }

        for ingredient in &product.ingredients {
            sqlx::query("INSERT INTO product_ingredients (product_id, ingredient) VALUES ($1, $2)")
                .bind(product_id)
                .bind(ingredient)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

/// ILIKE pattern matching names that start with `prefix` literally
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
