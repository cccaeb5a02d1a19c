//! orders - Dump a user's orders with their line items as JSON

use anyhow::{Context, Result};
use clap::Args;
use juicectl_core::models::OrderWithItems;
use juicectl_core::repos::OrderRepo;
use juicectl_core::{with_database, Error, JuiceConfig};
use tracing::info;

#[derive(Args, Debug)]
pub struct OrdersArgs {
    /// User whose orders to print (default: [orders] user_id in juicectl.toml)
    #[arg(long)]
    pub user_id: Option<i32>,

    /// Single-line JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

pub async fn run_orders(args: OrdersArgs, config: &JuiceConfig) -> Result<()> {
    let user_id = args
        .user_id
        .or(config.orders.user_id)
        .ok_or_else(|| Error::config("user id not set (pass --user-id or set [orders] user_id)"))?;

    let orders = with_database(&config.database, |db| async move {
        OrderRepo::new(db.pool()).for_user(user_id).await
    })
    .await
    .with_context(|| format!("failed to load orders for user {user_id}"))?;

    info!(user_id, count = orders.len(), "orders loaded");
    println!("{}", render(&orders, args.compact)?);
    Ok(())
}

fn render(orders: &[OrderWithItems], compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(orders)?
    } else {
        serde_json::to_string_pretty(orders)?
    };
    Ok(json)
}
