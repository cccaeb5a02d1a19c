//! Repositories: the SQL each command issues
//!
//! - Borrow the pool, never own it; the caller decides when it closes
//! - List operations use JOINs, no N+1 queries
//! - Multi-step writes run in a transaction

pub mod catalog;
pub mod orders;
pub mod stock;
pub mod users;

pub use catalog::{CatalogCounts, CatalogRepo, SeedSummary};
pub use orders::OrderRepo;
pub use stock::{StockAdjustment, StockRepo};
pub use users::{AdminCheck, UserRepo};
