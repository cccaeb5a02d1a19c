//! Stock report folding
//!
//! Turns flat product/size rows into the per-product breakdown and totals the
//! stock command prints. No database access happens here.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::StockRow;

/// Availability of a single size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StockStatus {
    InStock,
    OutOfStock,
}

impl StockStatus {
    pub fn from_quantity(quantity: i32) -> Self {
        if quantity > 0 {
            StockStatus::InStock
        } else {
            StockStatus::OutOfStock
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StockStatus::InStock => "IN STOCK",
            StockStatus::OutOfStock => "OUT OF STOCK",
        }
    }
}

/// All sizes of one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductStock {
    pub product_id: i32,
    pub name: String,
    pub category: Option<String>,
    pub sizes: Vec<StockRow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StockTotals {
    /// Distinct products that have at least one size
    pub products: usize,
    pub in_stock: usize,
    pub out_of_stock: usize,
}

impl StockTotals {
    pub fn sizes(&self) -> usize {
        self.in_stock + self.out_of_stock
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockReport {
    pub products: Vec<ProductStock>,
    pub totals: StockTotals,
}

impl StockReport {
    /// Group rows by product, keeping the order in which products first appear.
    pub fn from_rows(rows: Vec<StockRow>) -> Self {
        let mut products: Vec<ProductStock> = Vec::new();
        let mut index: HashMap<i32, usize> = HashMap::new();
        let mut totals = StockTotals::default();

        for row in rows {
            match StockStatus::from_quantity(row.stock_quantity) {
                StockStatus::InStock => totals.in_stock += 1,
                StockStatus::OutOfStock => totals.out_of_stock += 1,
            }

            let slot = *index.entry(row.product_id).or_insert_with(|| {
                products.push(ProductStock {
                    product_id: row.product_id,
                    name: row.product_name.clone(),
                    category: row.category.clone(),
                    sizes: Vec::new(),
                });
                products.len() - 1
            });
            products[slot].sizes.push(row);
        }

        totals.products = products.len();
        Self { products, totals }
    }
}
