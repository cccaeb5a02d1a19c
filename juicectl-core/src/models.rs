//! Row types for the shop tables.
//!
//! These mirror the persisted rows; nothing here outlives a single command.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::Error;

/// Account role, stored as text and constrained by a CHECK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            other => Err(Error::config(format!("unknown role '{other}'"))),
        }
    }
}

/// User record, minus the password hash
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// Raw column value so rows written before the CHECK existed still load
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        matches!(self.role.parse::<Role>(), Ok(Role::Admin))
    }
}

/// Order header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: i32,
    pub user_id: Option<i32>,
    pub total_amount: Decimal,
    pub status: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub delivery_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Line item with the product and size names resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub product_size_id: i32,
    pub size: String,
    pub quantity: i32,
    /// Unit price at the time of purchase
    pub price: Decimal,
}

/// An order together with its line items (possibly none)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// One size of an active product, as reported by the stock queries
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct StockRow {
    pub product_id: i32,
    pub product_name: String,
    pub category: Option<String>,
    pub size_id: i32,
    pub size: String,
    pub price: Decimal,
    pub stock_quantity: i32,
}

/// Audit row written by every stock adjustment
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StockHistoryEntry {
    pub id: i32,
    pub product_size_id: i32,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub change_amount: i32,
    pub change_type: String,
    pub changed_by: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
