//! setup - Create all shop tables and indexes (safe to re-run)

use anyhow::{Context, Result};
use juicectl_core::{schema, with_database, JuiceConfig};

use crate::ui;

pub async fn run_setup(config: &JuiceConfig) -> Result<()> {
    println!("Setting up database schema on {}", config.database.describe());

    with_database(&config.database, |db| async move {
        schema::apply(db.pool(), |step| {
            println!("{} {}", ui::OK, checkpoint(step.name));
        })
        .await
    })
    .await
    .context("schema setup failed")?;

    println!("{} Database setup complete", ui::OK);
    Ok(())
}

fn checkpoint(step: &str) -> String {
    if step == "indexes" {
        "Indexes created".to_string()
    } else {
        format!("Table '{step}' ready")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juicectl_core::schema::steps;

    #[test]
    fn every_step_has_a_checkpoint() {
        for step in steps() {
            assert!(!checkpoint(step.name).is_empty());
        }
        assert_eq!(checkpoint("users"), "Table 'users' ready");
        assert_eq!(checkpoint("indexes"), "Indexes created");
    }
}
