//! Command implementations for juicectl CLI
//!
//! Each command opens its own pool through `with_database`, runs serially
//! and prints its report to stdout.

pub mod admin;
pub mod orders;
pub mod seed;
pub mod setup;
pub mod stock;
pub mod verify;

// Re-export dispatcher functions for flat access from main.rs
pub use admin::run_admin_check;
pub use orders::run_orders;
pub use seed::run_seed;
pub use setup::run_setup;
pub use stock::{run_stock, run_stock_adjust};
pub use verify::run_verify;
