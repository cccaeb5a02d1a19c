//! seed - Load the product catalog (bundled menu or a TOML file)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use juicectl_core::repos::{CatalogRepo, SeedSummary};
use juicectl_core::{with_database, Catalog, JuiceConfig};

use crate::ui;

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Catalog TOML to load instead of the bundled menu
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,
}

pub async fn run_seed(args: SeedArgs, config: &JuiceConfig) -> Result<()> {
    let catalog = match &args.catalog {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::bundled()?,
    };

    let total = catalog.products.len();
    let summary = with_database(&config.database, |db| async move {
        ui::with_spinner(
            format!("Seeding {total} products"),
            "Catalog seeded",
            async { CatalogRepo::new(db.pool()).seed(&catalog).await },
        )
        .await
    })
    .await
    .context("seeding failed")?;

    print!("{}", render(&summary));
    Ok(())
}

fn render(summary: &SeedSummary) -> String {
    let mut out = String::new();
    for name in &summary.inserted {
        out.push_str(&format!("{} Inserted {name}\n", ui::OK));
    }
    for name in &summary.skipped {
        out.push_str(&format!("{} Skipped {name} (already exists)\n", ui::WARN));
    }
    out.push_str(&format!(
        "{} inserted, {} skipped\n",
        summary.inserted.len(),
        summary.skipped.len()
    ));
    out
}
