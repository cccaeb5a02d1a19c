//! juicectl-core: database layer for the juice shop operator tool
//!
//! Schema definitions, layered configuration, the connection provider and
//! the repositories each administrative command runs against.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod pool;
pub mod repos;
pub mod report;
pub mod schema;

pub use catalog::Catalog;
pub use config::{DbConfig, JuiceConfig};
pub use error::{Error, Result};
pub use pool::{with_database, Database};
pub use report::{StockReport, StockStatus};
