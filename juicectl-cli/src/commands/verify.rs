//! verify - Sanity-check catalog data after seeding or migration

use anyhow::{Context, Result};
use clap::Args;
use juicectl_core::models::StockRow;
use juicectl_core::repos::catalog::ZERO_STOCK_LIMIT;
use juicectl_core::repos::{CatalogCounts, CatalogRepo};
use juicectl_core::{with_database, JuiceConfig};

use crate::ui;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Show products whose name starts with this (default: [verify] name_prefix)
    #[arg(long)]
    pub name_prefix: Option<String>,
}

/// Everything verify prints, gathered before rendering
struct Verification {
    counts: CatalogCounts,
    prefix: Option<(String, Vec<StockRow>)>,
    zero_stock: Vec<StockRow>,
}

pub async fn run_verify(args: VerifyArgs, config: &JuiceConfig) -> Result<()> {
    let prefix = args.name_prefix.or_else(|| config.verify.name_prefix.clone());

    let verification = with_database(&config.database, |db| async move {
        let repo = CatalogRepo::new(db.pool());
        let counts = repo.counts().await?;
        let prefix = match prefix {
            Some(prefix) => {
                let rows = repo.with_name_prefix(&prefix).await?;
                Some((prefix, rows))
            }
            None => None,
        };
        let zero_stock = repo.zero_stock(ZERO_STOCK_LIMIT).await?;
        Ok::<_, juicectl_core::Error>(Verification {
            counts,
            prefix,
            zero_stock,
        })
    })
    .await
    .context("verification failed")?;

    print!("{}", render(&verification));
    Ok(())
}

fn render(v: &Verification) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} Total products: {}\n", ui::OK, v.counts.products));
    out.push_str(&format!("{} Total product sizes: {}\n", ui::OK, v.counts.sizes));

    match &v.prefix {
        None => {
            out.push_str("\n(no name prefix configured, skipping filtered report)\n");
        }
        Some((prefix, rows)) if rows.is_empty() => {
            out.push_str(&format!("\n{} No products matching '{prefix}*'\n", ui::WARN));
        }
        Some((prefix, rows)) => {
            out.push_str(&format!("\nProducts matching '{prefix}*':\n"));
            for row in rows {
                out.push_str(&format!(
                    "  {} / {}: ${} (stock {})\n",
                    row.product_name, row.size, row.price, row.stock_quantity
                ));
            }
        }
    }

    if v.zero_stock.is_empty() {
        out.push_str(&format!("\n{} All sizes have stock\n", ui::OK));
    } else {
        out.push_str(&format!(
            "\n{} Sizes with zero stock (first {}):\n",
            ui::WARN,
            ZERO_STOCK_LIMIT
        ));
        for row in &v.zero_stock {
            out.push_str(&format!(
                "  {} / {} (size #{})\n",
                row.product_name, row.size, row.size_id
            ));
        }
    }
    out
}
