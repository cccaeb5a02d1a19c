//! Order repository
//!
//! Orders and their items come back from a single LEFT JOIN and are folded
//! in Rust, so an order without items yields an empty list rather than a
//! placeholder entry.

use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::models::{Order, OrderItem, OrderWithItems};
use crate::Result;

/// One row of the orders ⟕ order_items join
#[derive(Debug, Clone)]
struct OrderLineRow {
    order: Order,
    item_id: Option<i32>,
    product_id: Option<i32>,
    product_name: Option<String>,
    product_size_id: Option<i32>,
    size: Option<String>,
    quantity: Option<i32>,
    item_price: Option<Decimal>,
}

impl OrderLineRow {
    fn from_row(r: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            order: Order {
                id: r.try_get("id")?,
                user_id: r.try_get("user_id")?,
                total_amount: r.try_get("total_amount")?,
                status: r.try_get("status")?,
                customer_name: r.try_get("customer_name")?,
                customer_email: r.try_get("customer_email")?,
                delivery_address: r.try_get("delivery_address")?,
                created_at: r.try_get("created_at")?,
            },
            item_id: r.try_get("item_id")?,
            product_id: r.try_get("product_id")?,
            product_name: r.try_get("product_name")?,
            product_size_id: r.try_get("product_size_id")?,
            size: r.try_get("size")?,
            quantity: r.try_get("quantity")?,
            item_price: r.try_get("item_price")?,
        })
    }

    /// The line item on this row, if the join matched one
    fn item(&self) -> Option<OrderItem> {
        Some(OrderItem {
            id: self.item_id?,
            product_id: self.product_id?,
            product_name: self.product_name.clone()?,
            product_size_id: self.product_size_id?,
            size: self.size.clone()?,
            quantity: self.quantity?,
            price: self.item_price?,
        })
    }
}

pub struct OrderRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All orders of `user_id`, newest first, each with its items in id order.
    pub async fn for_user(&self, user_id: i32) -> Result<Vec<OrderWithItems>> {
        let rows = sqlx::query(
            r#"
            SELECT
                o.id,
                o.user_id,
                o.total_amount,
                o.status,
                o.customer_name,
                o.customer_email,
                o.delivery_address,
                o.created_at,
                oi.id AS item_id,
                oi.product_id,
                p.name AS product_name,
                oi.product_size_id,
                ps.size,
                oi.quantity,
                oi.price AS item_price
            FROM orders o
            LEFT JOIN order_items oi ON oi.order_id = o.id
            LEFT JOIN products p ON p.id = oi.product_id
            LEFT JOIN product_sizes ps ON ps.id = oi.product_size_id
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC, o.id DESC, oi.id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        debug!(user_id, rows = rows.len(), "fetched order lines");
        let lines = rows
            .iter()
            .map(OrderLineRow::from_row)
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;
        Ok(fold_lines(lines))
    }
}

/// Collapse join rows into orders. Rows of one order must be adjacent.
fn fold_lines(rows: Vec<OrderLineRow>) -> Vec<OrderWithItems> {
    let mut orders: Vec<OrderWithItems> = Vec::new();

    for row in rows {
        let item = row.item();
        if let Some(current) = orders.last_mut() {
            if current.order.id == row.order.id {
                current.items.extend(item);
                continue;
            }
        }
        orders.push(OrderWithItems {
            order: row.order,
            items: item.into_iter().collect(),
        });
    }

    orders
}
