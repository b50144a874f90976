//! # Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags (`--db`)
//! 2. Environment variables (`AGENCY_*`), including a `.env` file
//! 3. Defaults (this file)
//!
//! | Variable                 | Example                         |
//! |--------------------------|---------------------------------|
//! | `AGENCY_DB_PATH`         | `/srv/agency/books.db`          |
//! | `AGENCY_NAME`            | `Karachi Tea Traders`           |
//! | `AGENCY_ADDRESS`         | `12 Market Road\|Karachi`       |
//! | `AGENCY_TAX_RATE`        | `17` (percent)                  |
//! | `AGENCY_CURRENCY_SYMBOL` | `Rs `                           |
//! | `AGENCY_QR_PREFIX`       | `KTT`                           |
//! | `AGENCY_STRICT_TALLY`    | `true`                          |

use std::path::PathBuf;

use agency_core::item::DEFAULT_QR_PREFIX;
use agency_core::{Money, TallyPolicy, TaxRate};
use directories::ProjectDirs;
use serde::Serialize;

/// Application configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Explicit database file. `None` means the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Agency name (printed on invoices)
    pub agency_name: String,

    /// Agency address lines (printed on invoices)
    pub agency_address: Vec<String>,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Tax rate applied to new sales unless overridden
    pub default_tax_rate: TaxRate,

    /// Prefix of generated QR payloads
    pub qr_prefix: String,

    /// Fail tallies on malformed amounts instead of zeroing them
    pub strict_tally: bool,
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },

    #[error("Could not determine the application data directory")]
    NoDataDir,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: None,
            agency_name: "Agency Books".to_string(),
            agency_address: Vec::new(),
            currency_symbol: "Rs ".to_string(),
            default_tax_rate: TaxRate::zero(),
            qr_prefix: DEFAULT_QR_PREFIX.to_string(),
            strict_tally: false,
        }
    }
}

impl AppConfig {
    /// Creates a configuration from environment variables and defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates a configuration from `lookup`, which plays the role of the
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(path) = get("AGENCY_DB_PATH") {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(name) = get("AGENCY_NAME") {
            config.agency_name = name;
        }

        if let Some(address) = get("AGENCY_ADDRESS") {
            config.agency_address = address
                .split('|')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
        }

        // Not trimmed: "Rs " keeps its space
        if let Some(symbol) = lookup("AGENCY_CURRENCY_SYMBOL").filter(|s| !s.is_empty()) {
            config.currency_symbol = symbol;
        }

        if let Some(rate) = get("AGENCY_TAX_RATE") {
            config.default_tax_rate =
                TaxRate::parse_percentage(&rate).map_err(|_| ConfigError::InvalidValue {
                    name: "AGENCY_TAX_RATE".to_string(),
                    value: rate.clone(),
                })?;
        }

        if let Some(prefix) = get("AGENCY_QR_PREFIX") {
            config.qr_prefix = prefix;
        }

        if let Some(strict) = get("AGENCY_STRICT_TALLY") {
            config.strict_tally = parse_bool(&strict).ok_or_else(|| ConfigError::InvalidValue {
                name: "AGENCY_STRICT_TALLY".to_string(),
                value: strict.clone(),
            })?;
        }

        Ok(config)
    }

    /// Overrides the database path (the `--db` flag).
    pub fn with_db_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.db_path = path;
        }
        self
    }

    /// Resolves the database file.
    ///
    /// ## Platform-Specific Defaults
    /// - **macOS**: `~/Library/Application Support/com.agency.books/agency.db`
    /// - **Windows**: `%APPDATA%\agency\books\data\agency.db`
    /// - **Linux**: `~/.local/share/books/agency.db`
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let dirs = ProjectDirs::from("com", "agency", "books").ok_or(ConfigError::NoDataDir)?;
        Ok(dirs.data_dir().join("agency.db"))
    }

    /// Tally policy for commands that don't pass `--strict`.
    pub fn tally_policy(&self, strict_flag: bool) -> TallyPolicy {
        if strict_flag || self.strict_tally {
            TallyPolicy::Strict
        } else {
            TallyPolicy::Lenient
        }
    }

    /// Formats an amount with the configured currency symbol.
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with(&self.currency_symbol)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.agency_name, "Agency Books");
        assert_eq!(config.qr_prefix, "AGY");
        assert!(config.default_tax_rate.is_zero());
        assert_eq!(config.tally_policy(false), TallyPolicy::Lenient);
        assert_eq!(config.tally_policy(true), TallyPolicy::Strict);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("AGENCY_DB_PATH", "/tmp/books.db"),
            ("AGENCY_NAME", " Tea Traders "),
            ("AGENCY_ADDRESS", "12 Market Road | Karachi |"),
            ("AGENCY_TAX_RATE", "17"),
            ("AGENCY_CURRENCY_SYMBOL", "$"),
            ("AGENCY_STRICT_TALLY", "yes"),
        ]))
        .unwrap();

        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/books.db"));
        assert_eq!(config.agency_name, "Tea Traders");
        assert_eq!(config.agency_address, vec!["12 Market Road", "Karachi"]);
        assert_eq!(config.default_tax_rate.bps(), 1700);
        assert_eq!(config.tally_policy(false), TallyPolicy::Strict);
        assert_eq!(config.format_money(Money::from_cents(-1234)), "-$12.34");
    }

    #[test]
    fn test_invalid_values() {
        assert!(AppConfig::from_lookup(lookup(&[("AGENCY_TAX_RATE", "abc")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("AGENCY_TAX_RATE", "150")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("AGENCY_STRICT_TALLY", "maybe")])).is_err());
    }

    #[test]
    fn test_db_flag_wins() {
        let config = AppConfig::from_lookup(lookup(&[("AGENCY_DB_PATH", "/tmp/env.db")]))
            .unwrap()
            .with_db_path(Some(PathBuf::from("/tmp/flag.db")));
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/flag.db"));

        let kept = AppConfig::default()
            .with_db_path(Some(PathBuf::from("/tmp/a.db")))
            .with_db_path(None);
        assert_eq!(kept.db_path, Some(PathBuf::from("/tmp/a.db")));
    }
}
