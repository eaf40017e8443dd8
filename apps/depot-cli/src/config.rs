//! # Depot Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DEPOT_REPORT_CURRENCY=EUR                                          │
//! │     DEPOT_RATE_CZK=0.041                                               │
//! │                                                                         │
//! │  2. TOML Config File (--config, or the platform config dir)            │
//! │     ~/.config/depot/depot.toml (Linux)                                 │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Built-in rate table, CZK reports, EXP prefix                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [currency]
//! report = "CZK"
//!
//! [currency.rates]   # EUR per unit; unlisted currencies keep the defaults
//! CZK = 0.041
//! USD = 0.93
//!
//! [expenses]
//! id_prefix = "EXP"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use depot_core::{Currency, RateTable, DEFAULT_EXPENSE_ID_PREFIX, DEFAULT_REPORT_CURRENCY};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};

const ENV_PREFIX: &str = "DEPOT_";
const RATE_ENV_PREFIX: &str = "DEPOT_RATE_";

// =============================================================================
// Currency Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// Currency expense totals are reported in.
    #[serde(default = "default_report_currency")]
    pub report: Currency,

    /// EUR value of one unit, keyed by ISO code. Overrides the built-in table.
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
}

fn default_report_currency() -> Currency {
    DEFAULT_REPORT_CURRENCY
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            report: default_report_currency(),
            rates: BTreeMap::new(),
        }
    }
}

// =============================================================================
// Expense Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSettings {
    /// Prefix of generated expense ids.
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
}

fn default_id_prefix() -> String {
    DEFAULT_EXPENSE_ID_PREFIX.to_string()
}

impl Default for ExpenseSettings {
    fn default() -> Self {
        ExpenseSettings {
            id_prefix: default_id_prefix(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepotConfig {
    #[serde(default)]
    pub currency: CurrencySettings,

    #[serde(default)]
    pub expenses: ExpenseSettings,
}

impl DepotConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// An explicit `config_path` must exist; the platform default is
    /// optional.
    pub fn load(config_path: Option<PathBuf>) -> CliResult<Self> {
        let mut config = Self::default();

        match config_path {
            Some(path) => {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => {
                    info!(?path, "Loading config from file");
                    config = Self::from_file(&path)?;
                }
                path => debug!(?path, "Config file not found, using defaults"),
            },
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CliError::ConfigLoadFailed(format!("{}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CliResult<()> {
        let prefix = &self.expenses.id_prefix;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CliError::InvalidConfig(format!(
                "expenses.id_prefix must be non-empty ASCII letters/digits, got: '{}'",
                prefix
            )));
        }

        self.rate_table().map(|_| ())
    }

    /// Builds the conversion table: built-in defaults, then configured rates.
    pub fn rate_table(&self) -> CliResult<RateTable> {
        let mut table = RateTable::default();
        for (code, rate) in &self.currency.rates {
            let currency: Currency = code
                .parse()
                .map_err(|e| CliError::InvalidConfig(format!("currency.rates.{}: {}", code, e)))?;
            table
                .set_rate(currency, *rate)
                .map_err(|e| CliError::InvalidConfig(e.to_string()))?;
        }
        Ok(table)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    /// Applies `DEPOT_*` overrides from `vars`.
    fn apply_overrides(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            if !key.starts_with(ENV_PREFIX) {
                continue;
            }

            if let Some(code) = key.strip_prefix(RATE_ENV_PREFIX) {
                match value.parse::<f64>() {
                    Ok(rate) => {
                        debug!(currency = %code, rate, "Overriding rate from environment");
                        self.currency.rates.insert(code.to_uppercase(), rate);
                    }
                    Err(_) => warn!(key = %key, value = %value, "Ignoring non-numeric rate"),
                }
                continue;
            }

            match key.as_str() {
                "DEPOT_REPORT_CURRENCY" => match value.parse() {
                    Ok(currency) => {
                        debug!(%currency, "Overriding report currency from environment");
                        self.currency.report = currency;
                    }
                    Err(_) => warn!(value = %value, "Unknown report currency in environment"),
                },
                "DEPOT_EXPENSE_PREFIX" => {
                    debug!(prefix = %value, "Overriding expense id prefix from environment");
                    self.expenses.id_prefix = value;
                }
                _ => {}
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "depot", "depot")
            .map(|dirs| dirs.config_dir().join("depot.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = DepotConfig::default();
        assert_eq!(config.currency.report, Currency::Czk);
        assert_eq!(config.expenses.id_prefix, "EXP");
        assert!(config.validate().is_ok());
        assert_eq!(config.rate_table().unwrap(), RateTable::default());
    }

    #[test]
    fn test_toml_parsing() {
        let config: DepotConfig = toml::from_str(
            r#"
            [currency]
            report = "EUR"

            [currency.rates]
            CZK = 0.05
            "#,
        )
        .unwrap();

        assert_eq!(config.currency.report, Currency::Eur);
        assert_eq!(config.expenses.id_prefix, "EXP");
        let table = config.rate_table().unwrap();
        assert_eq!(table.rate(Currency::Czk).unwrap(), 0.05);
        assert_eq!(table.rate(Currency::Usd).unwrap(), 0.92);
    }

    #[test]
    fn test_config_validation() {
        let mut config = DepotConfig::default();

        config.currency.rates.insert("CZK".to_string(), -1.0);
        assert!(config.validate().is_err());

        config.currency.rates.clear();
        config.currency.rates.insert("GBP".to_string(), 1.15);
        assert!(config.validate().is_err());

        config.currency.rates.clear();
        config.expenses.id_prefix = "EX-P".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DepotConfig::default();
        config.apply_overrides(vars(&[
            ("DEPOT_REPORT_CURRENCY", "usd"),
            ("DEPOT_EXPENSE_PREFIX", "EXQ"),
            ("DEPOT_RATE_czk", "0.042"),
            ("DEPOT_RATE_VND", "not-a-number"),
            ("HOME", "/root"),
        ]));

        assert_eq!(config.currency.report, Currency::Usd);
        assert_eq!(config.expenses.id_prefix, "EXQ");
        assert_eq!(config.currency.rates.get("CZK"), Some(&0.042));
        assert!(!config.currency.rates.contains_key("VND"));
    }

    #[test]
    fn test_unknown_report_currency_is_ignored() {
        let mut config = DepotConfig::default();
        config.apply_overrides(vars(&[("DEPOT_REPORT_CURRENCY", "XYZ")]));
        assert_eq!(config.currency.report, Currency::Czk);
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let path = std::env::temp_dir().join("depot-config-that-does-not-exist.toml");
        assert!(matches!(
            DepotConfig::load(Some(path)),
            Err(CliError::ConfigLoadFailed(_))
        ));
    }
}
