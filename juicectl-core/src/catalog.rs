//! Seed catalog definition
//!
//! A catalog is a TOML document of products, each with its sizes and
//! ingredients. The default shop menu is compiled in.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{Error, Result};

const BUNDLED: &str = include_str!("../data/catalog.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    #[serde(default, rename = "product")]
    pub products: Vec<CatalogProduct>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub base_price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, rename = "size")]
    pub sizes: Vec<CatalogSize>,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSize {
    pub size: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub calories: Option<i32>,
    #[serde(default)]
    pub sugar_g: Option<Decimal>,
    #[serde(default)]
    pub protein_g: Option<Decimal>,
    #[serde(default)]
    pub vitamin_c_mg: Option<Decimal>,
}

fn default_active() -> bool {
    true
}

impl Catalog {
    /// The menu shipped with juicectl
    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED, Path::new("<bundled>"))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| Error::catalog(path, e.to_string()))?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, origin: &Path) -> Result<Self> {
        let catalog: Catalog =
            toml::from_str(contents).map_err(|e| Error::catalog(origin, e.to_string()))?;
        catalog.validate(origin)?;
        Ok(catalog)
    }

    /// Reject values the schema CHECKs would refuse, before touching the database
    fn validate(&self, origin: &Path) -> Result<()> {
        for product in &self.products {
            if product.name.trim().is_empty() {
                return Err(Error::catalog(origin, "product with empty name"));
            }
            if product.base_price.is_sign_negative() {
                return Err(Error::catalog(
                    origin,
                    format!("{}: negative base_price", product.name),
                ));
            }
            let mut seen = std::collections::HashSet::new();
            for size in &product.sizes {
                if !seen.insert(size.size.as_str()) {
                    return Err(Error::catalog(
                        origin,
                        format!("{}: duplicate size '{}'", product.name, size.size),
                    ));
                }
                if size.price.is_sign_negative() || size.stock_quantity < 0 {
                    return Err(Error::catalog(
                        origin,
                        format!("{} ({}): negative price or stock", product.name, size.size),
                    ));
                }
            }
        }
        Ok(())
    }
}
