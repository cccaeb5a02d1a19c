use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Load environment variables from .env files in multiple locations
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.juicectl/.env
///
/// dotenvy never overwrites a variable that is already set, so loading the
/// current directory first gives it precedence over the global file.
pub fn load_dotenv() {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded_from.push(path.display().to_string());
        debug!("Loaded .env from current directory: {}", path.display());
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(()) => {
                    loaded_from.push(env_file.display().to_string());
                    debug!("Loaded .env from ~/.juicectl: {}", env_file.display());
                }
                Err(e) => {
                    warn!("Failed to load {}: {}", env_file.display(), e);
                }
            }
        }
    }

    if loaded_from.is_empty() {
        debug!("No .env files found (current dir or ~/.juicectl)");
    } else {
        info!("Loaded environment from: {}", loaded_from.join(", "));
    }
}

/// Get the juicectl config directory path (~/.juicectl)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".juicectl"))
}

/// Config files in ascending priority: global first, local last
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = config_dir() {
        paths.push(dir.join("config.toml"));
    }
    paths.push(PathBuf::from("juicectl.toml"));
    paths
}

// ============================================================================
// Database settings
// ============================================================================

/// Connection settings for the shop database.
///
/// `url`, when present, replaces the individual parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub url: Option<String>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "juice_shop".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            max_connections: 5,
            acquire_timeout_secs: 10,
            url: None,
        }
    }
}

impl DbConfig {
    /// Override fields from `DB_*` variables (and `DATABASE_URL`).
    ///
    /// Takes a lookup function so callers and tests can supply their own source.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(host) = lookup("DB_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            self.port = parse_var("DB_PORT", &port)?;
        }
        if let Some(database) = lookup("DB_NAME") {
            self.database = database;
        }
        if let Some(user) = lookup("DB_USER") {
            self.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.password = password;
        }
        if let Some(max) = lookup("DB_MAX_CONNECTIONS") {
            self.max_connections = parse_var("DB_MAX_CONNECTIONS", &max)?;
        }
        if let Some(timeout) = lookup("DB_CONNECT_TIMEOUT") {
            self.acquire_timeout_secs = parse_var("DB_CONNECT_TIMEOUT", &timeout)?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.url = Some(url);
        }
        Ok(())
    }

    /// Human-readable target for log lines (never includes the password)
    pub fn describe(&self) -> String {
        match &self.url {
            Some(_) => "DATABASE_URL".to_string(),
            None => format!("{}@{}:{}/{}", self.user, self.host, self.port, self.database),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::config(format!("{key}={value:?} is invalid: {e}")))
}

// ============================================================================
// TOML Configuration
// ============================================================================

/// Layered juicectl configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JuiceConfig {
    pub database: DbConfig,
    pub admin: AdminConfig,
    pub orders: OrdersConfig,
    pub verify: VerifyConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Account that admin-check inspects and repairs
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Default user for the orders dump
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Product name prefix for the filtered verification report
    pub name_prefix: Option<String>,
}

impl JuiceConfig {
    /// Load config files, then apply environment overrides.
    ///
    /// Priority order (highest to lowest):
    /// 1. Environment variables (`DB_*`, `DATABASE_URL`)
    /// 2. ./juicectl.toml
    /// 3. ~/.juicectl/config.toml
    /// 4. Built-in defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_paths())
    }

    /// Load a single config file named on the command line.
    ///
    /// Unlike the default locations, the file must exist.
    pub fn load_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        Self::load_from(&[path.to_path_buf()])
    }

    /// Like [`JuiceConfig::load`] with an explicit list of files
    pub fn load_from(paths: &[PathBuf]) -> Result<Self> {
        let mut config = Self::load_files(paths)?;
        config.database.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Merge the given TOML files in order; later files win key by key.
    ///
    /// Missing files are skipped. A file that exists but cannot be read,
    /// parsed or mapped onto [`JuiceConfig`] is an error.
    pub fn load_files(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = toml::Table::new();
        for path in paths {
            if let Some(table) = read_table(path)? {
                merge_tables(&mut merged, table);
            }
        }

        toml::Value::Table(merged)
            .try_into::<JuiceConfig>()
            .map_err(|e| Error::config(format!("invalid config: {e}")))
    }
}

fn read_table(path: &Path) -> Result<Option<toml::Table>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("failed to read {}: {e}", path.display())))?;
    let table = toml::from_str::<toml::Table>(&contents)
        .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))?;
    debug!("Loaded config from {}", path.display());
    Ok(Some(table))
}

/// Recursively overlay `overlay` onto `base`
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, incoming);
                    continue;
                }
                base.insert(key, toml::Value::Table(incoming));
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_db_config_defaults() {
        let config = DbConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.database, "juice_shop");
        assert_eq!(config.max_connections, 5);
        assert!(config.url.is_none());
    }

    #[test]
    fn test_env_overrides_fields() {
        let mut config = DbConfig::default();
        config
            .apply_env(lookup_from(&[
                ("DB_HOST", "db.internal"),
                ("DB_PORT", "6543"),
                ("DB_NAME", "shop"),
                ("DB_USER", "ops"),
                ("DB_PASSWORD", "secret"),
            ]))
            .unwrap();

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6543);
        assert_eq!(config.database, "shop");
        assert_eq!(config.user, "ops");
        assert_eq!(config.password, "secret");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = DbConfig::default();
        config.apply_env(lookup_from(&[("DB_HOST", "")])).unwrap();
        assert_eq!(config.host, "localhost");
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let mut config = DbConfig::default();
        let err = config
            .apply_env(lookup_from(&[("DB_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("DB_PORT"));
    }

    #[test]
    fn test_describe_hides_password() {
        let mut config = DbConfig::default();
        config.password = "hunter2".to_string();
        let described = config.describe();
        assert_eq!(described, "postgres@localhost:5432/juice_shop");
        assert!(!described.contains("hunter2"));

        config.url = Some("postgres://u:hunter2@h/db".to_string());
        assert_eq!(config.describe(), "DATABASE_URL");
    }

    #[test]
    fn test_load_files_missing_uses_defaults() {
        let config =
            JuiceConfig::load_files(&[PathBuf::from("/nonexistent/juicectl.toml")]).unwrap();
        assert_eq!(config, JuiceConfig::default());
    }

    #[test]
    fn test_local_file_overrides_global_key_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("local.toml");

        fs::write(
            &global,
            "[database]\nhost = \"global-host\"\nport = 5433\n\n[admin]\nemail = \"ops@juice.shop\"\n",
        )
        .unwrap();
        fs::write(&local, "[database]\nhost = \"local-host\"\n").unwrap();

        let config = JuiceConfig::load_files(&[global, local]).unwrap();
        assert_eq!(config.database.host, "local-host");
        assert_eq!(config.database.port, 5433);
        assert_eq!(config.admin.email.as_deref(), Some("ops@juice.shop"));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.toml");
        let bad = dir.path().join("bad.toml");
        fs::write(&good, "[verify]\nname_prefix = \"Orange\"\n").unwrap();
        fs::write(&bad, "[verify\nname_prefix = ").unwrap();

        let err = JuiceConfig::load_files(&[good, bad]).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_wrong_value_type_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prod.toml");
        fs::write(
            &path,
            "[database]\nhost = \"prod-db\"\nport = \"5433x\"\n\n[admin]\nemail = \"ops@juice.shop\"\n",
        )
        .unwrap();

        let err = JuiceConfig::load_files(&[path]).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let err = JuiceConfig::load_path(Path::new("/nonexistent/typo.toml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("/nonexistent/typo.toml"));
    }

    #[test]
    fn test_load_dotenv_doesnt_panic() {
        load_dotenv();
    }
}
