//! stock - Per-product stock breakdown and totals; stock-adjust - audited changes

use anyhow::{Context, Result};
use clap::Args;
use juicectl_core::models::StockHistoryEntry;
use juicectl_core::repos::{StockAdjustment, StockRepo};
use juicectl_core::{with_database, JuiceConfig, StockReport, StockStatus};

use crate::ui;

pub async fn run_stock(config: &JuiceConfig) -> Result<()> {
    let report = with_database(&config.database, |db| async move {
        StockRepo::new(db.pool()).report().await
    })
    .await
    .context("failed to build stock report")?;

    print!("{}", render_report(&report));
    Ok(())
}

fn render_report(report: &StockReport) -> String {
    let mut out = String::new();

    if report.products.is_empty() {
        out.push_str(&format!("{} No active products with sizes\n", ui::WARN));
    }

    for product in &report.products {
        let category = product.category.as_deref().unwrap_or("uncategorized");
        out.push_str(&format!(
            "\n{} (#{}, {})\n",
            product.name, product.product_id, category
        ));
        for size in &product.sizes {
            let status = StockStatus::from_quantity(size.stock_quantity);
            let marker = match status {
                StockStatus::InStock => ui::OK,
                StockStatus::OutOfStock => ui::FAIL,
            };
            out.push_str(&format!(
                "  {marker} {:<10} ${:>7}  qty {:>4}  {}\n",
                size.size,
                size.price,
                size.stock_quantity,
                status.label()
            ));
        }
    }

    let totals = report.totals;
    out.push_str("\nSummary\n");
    out.push_str(&format!("  Products:            {}\n", totals.products));
    out.push_str(&format!("  Sizes in stock:      {}\n", totals.in_stock));
    out.push_str(&format!("  Sizes out of stock:  {}\n", totals.out_of_stock));
    out
}

#[derive(Args, Debug)]
pub struct StockAdjustArgs {
    /// product_sizes.id to adjust
    #[arg(long)]
    pub size_id: i32,

    /// Signed change, e.g. 12 to restock or -3 for a write-off
    #[arg(long, allow_hyphen_values = true)]
    pub change: i32,

    /// Recorded as the change type (restock, sale, correction, ...)
    #[arg(long, default_value = "correction")]
    pub reason: String,

    /// User id recorded as the author of the change
    #[arg(long)]
    pub changed_by: Option<i32>,

    /// Free-text note stored with the history row
    #[arg(long)]
    pub notes: Option<String>,
}

pub async fn run_stock_adjust(args: StockAdjustArgs, config: &JuiceConfig) -> Result<()> {
    let adjustment = StockAdjustment {
        size_id: args.size_id,
        change: args.change,
        change_type: args.reason,
        changed_by: args.changed_by,
        notes: args.notes,
    };

    let entry = with_database(&config.database, |db| async move {
        StockRepo::new(db.pool()).adjust(&adjustment).await
    })
    .await
    .with_context(|| format!("failed to adjust stock for size {}", args.size_id))?;

    println!("{}", render_adjustment(&entry));
    Ok(())
}

fn render_adjustment(entry: &StockHistoryEntry) -> String {
    format!(
        "{} Size {}: {} -> {} ({:+}, {}), history #{}",
        ui::OK,
        entry.product_size_id,
        entry.previous_stock,
        entry.new_stock,
        entry.change_amount,
        entry.change_type,
        entry.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use juicectl_core::models::StockRow;
    use rust_decimal::Decimal;

    fn row(product_id: i32, name: &str, size_id: i32, stock: i32) -> StockRow {
        StockRow {
            product_id,
            product_name: name.to_string(),
            category: None,
            size_id,
            size: "small".to_string(),
            price: Decimal::new(450, 2),
            stock_quantity: stock,
        }
    }

    #[test]
    fn marks_each_size() {
        let report = StockReport::from_rows(vec![
            row(1, "Orange Sunrise", 1, 5),
            row(1, "Orange Sunrise", 2, 0),
        ]);
        let text = render_report(&report);
        assert!(text.contains("IN STOCK"));
        assert!(text.contains("OUT OF STOCK"));
        assert!(text.contains("Sizes in stock:      1"));
        assert!(text.contains("Sizes out of stock:  1"));
        assert!(text.contains("uncategorized"));
    }

    #[test]
    fn empty_report_warns() {
        let text = render_report(&StockReport::default());
        assert!(text.contains("No active products"));
        assert!(text.contains("Products:            0"));
    }

    #[test]
    fn adjustment_line_shows_signed_change() {
        let entry = StockHistoryEntry {
            id: 9,
            product_size_id: 4,
            previous_stock: 5,
            new_stock: 2,
            change_amount: -3,
            change_type: "sale".to_string(),
            changed_by: None,
            notes: None,
            created_at: Utc::now(),
        };
        assert_eq!(
            render_adjustment(&entry),
            format!("{} Size 4: 5 -> 2 (-3, sale), history #9", ui::OK)
        );
    }
}
