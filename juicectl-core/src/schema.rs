//! Shop schema: tables and indexes
//!
//! Every statement is `IF NOT EXISTS`, so `apply` can run against a fresh or
//! an already-initialized database.

use sqlx::PgPool;
use tracing::{debug, info};

use crate::Result;

/// A named group of DDL statements applied in one transaction
#[derive(Debug, Clone, Copy)]
pub struct SchemaStep {
    pub name: &'static str,
    pub statements: &'static [&'static str],
}

const USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        password VARCHAR(255) NOT NULL,
        role VARCHAR(20) NOT NULL DEFAULT 'customer'
            CHECK (role IN ('admin', 'customer')),
        phone VARCHAR(30),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const PRODUCTS: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        description TEXT,
        category VARCHAR(100),
        base_price NUMERIC(10, 2) NOT NULL CHECK (base_price >= 0),
        image_url TEXT,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const PRODUCT_SIZES: &str = r#"
    CREATE TABLE IF NOT EXISTS product_sizes (
        id SERIAL PRIMARY KEY,
        product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
        size VARCHAR(50) NOT NULL,
        price NUMERIC(10, 2) NOT NULL CHECK (price >= 0),
        stock_quantity INTEGER NOT NULL DEFAULT 0 CHECK (stock_quantity >= 0),
        calories INTEGER,
        sugar_g NUMERIC(6, 2),
        protein_g NUMERIC(6, 2),
        vitamin_c_mg NUMERIC(6, 2),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (product_id, size)
    )
"#;

const PRODUCT_INGREDIENTS: &str = r#"
    CREATE TABLE IF NOT EXISTS product_ingredients (
        id SERIAL PRIMARY KEY,
        product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
        ingredient VARCHAR(255) NOT NULL
    )
"#;

const ORDERS: &str = r#"
    CREATE TABLE IF NOT EXISTS orders (
        id SERIAL PRIMARY KEY,
        user_id INTEGER REFERENCES users(id),
        total_amount NUMERIC(10, 2) NOT NULL CHECK (total_amount >= 0),
        status VARCHAR(50) NOT NULL DEFAULT 'pending',
        customer_name VARCHAR(100),
        customer_email VARCHAR(255),
        customer_phone VARCHAR(30),
        delivery_address TEXT,
        delivery_notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const ORDER_ITEMS: &str = r#"
    CREATE TABLE IF NOT EXISTS order_items (
        id SERIAL PRIMARY KEY,
        order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        product_id INTEGER NOT NULL REFERENCES products(id),
        product_size_id INTEGER NOT NULL REFERENCES product_sizes(id),
        quantity INTEGER NOT NULL CHECK (quantity > 0),
        price NUMERIC(10, 2) NOT NULL CHECK (price >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const STOCK_HISTORY: &str = r#"
    CREATE TABLE IF NOT EXISTS stock_history (
        id SERIAL PRIMARY KEY,
        product_size_id INTEGER NOT NULL REFERENCES product_sizes(id),
        previous_stock INTEGER NOT NULL,
        new_stock INTEGER NOT NULL,
        change_amount INTEGER NOT NULL,
        change_type VARCHAR(50) NOT NULL,
        changed_by INTEGER REFERENCES users(id),
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CHECK (new_stock = previous_stock + change_amount)
    )
"#;

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category)",
    "CREATE INDEX IF NOT EXISTS idx_product_sizes_product_id ON product_sizes(product_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_order_id ON order_items(order_id)",
    "CREATE INDEX IF NOT EXISTS idx_stock_history_product_size_id ON stock_history(product_size_id)",
];

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        name: "users",
        statements: &[USERS],
    },
    SchemaStep {
        name: "products",
        statements: &[PRODUCTS],
    },
    SchemaStep {
        name: "product_sizes",
        statements: &[PRODUCT_SIZES],
    },
    SchemaStep {
        name: "product_ingredients",
        statements: &[PRODUCT_INGREDIENTS],
    },
    SchemaStep {
        name: "orders",
        statements: &[ORDERS],
    },
    SchemaStep {
        name: "order_items",
        statements: &[ORDER_ITEMS],
    },
    SchemaStep {
        name: "stock_history",
        statements: &[STOCK_HISTORY],
    },
    SchemaStep {
        name: "indexes",
        statements: INDEXES,
    },
];

/// Schema steps in dependency order (referenced tables first)
pub fn steps() -> &'static [SchemaStep] {
    STEPS
}

/// Apply every step, calling `on_step` after each one commits.
pub async fn apply<F>(pool: &PgPool, mut on_step: F) -> Result<()>
where
    F: FnMut(&SchemaStep),
{
    info!("Applying shop schema...");

    for step in steps() {
        let mut tx = pool.begin().await?;
        for statement in step.statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        debug!(step = step.name, "schema step applied");
        on_step(step);
    }

    info!("Shop schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(name: &str) -> usize {
        steps()
            .iter()
            .position(|step| step.name == name)
            .unwrap_or_else(|| panic!("missing step {name}"))
    }

    #[test]
    fn every_statement_is_idempotent() {
        for step in steps() {
            for statement in step.statements {
                assert!(
                    statement.contains("IF NOT EXISTS"),
                    "step {} has a non-idempotent statement",
                    step.name
                );
            }
        }
    }

    #[test]
    fn referenced_tables_come_first() {
        assert!(position("users") < position("orders"));
        assert!(position("products") < position("product_sizes"));
        assert!(position("products") < position("product_ingredients"));
        assert!(position("product_sizes") < position("order_items"));
        assert!(position("orders") < position("order_items"));
        assert!(position("product_sizes") < position("stock_history"));
        assert_eq!(position("indexes"), steps().len() - 1);
    }

    #[test]
    fn cascades_only_where_owned() {
        assert!(PRODUCT_SIZES.contains("REFERENCES products(id) ON DELETE CASCADE"));
        assert!(PRODUCT_INGREDIENTS.contains("REFERENCES products(id) ON DELETE CASCADE"));
        assert!(ORDER_ITEMS.contains("REFERENCES orders(id) ON DELETE CASCADE"));
        assert!(!ORDERS.contains("CASCADE"));
        assert!(!STOCK_HISTORY.contains("CASCADE"));
    }

    #[test]
    fn lookup_indexes_present() {
        let all = INDEXES.join("\n");
        for name in [
            "idx_users_email",
            "idx_products_category",
            "idx_product_sizes_product_id",
            "idx_orders_user_id",
            "idx_order_items_order_id",
        ] {
            assert!(all.contains(name), "missing index {name}");
        }
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires database"]
    async fn apply_twice_is_idempotent(pool: PgPool) {
        let mut seen = Vec::new();
        apply(&pool, |step| seen.push(step.name)).await.expect("first run");
        apply(&pool, |_| {}).await.expect("second run");
        assert_eq!(seen.len(), steps().len());
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires database"]
    async fn deleting_product_cascades_to_sizes(pool: PgPool) {
        apply(&pool, |_| {}).await.expect("schema");
        let product_id: i32 = sqlx::query_scalar(
            "INSERT INTO products (name, base_price) VALUES ('Kale Kick', 5.00) RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .expect("insert product");
        sqlx::query("INSERT INTO product_sizes (product_id, size, price) VALUES ($1, 'small', 5.00)")
            .bind(product_id)
            .execute(&pool)
            .await
            .expect("insert size");

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&pool)
            .await
            .expect("delete");

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_sizes")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(remaining, 0);
    }
}
