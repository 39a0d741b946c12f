//! Application configuration
//!
//! Layers, later wins: built-in defaults, an optional TOML file, then
//! `CONFLUENCE_*` environment variables (`__` separates nested keys, e.g.
//! `CONFLUENCE_RISK__STOP_LOSS_PERCENTAGE=0.02`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::execution::{SessionConfig, DEFAULT_WINDOW_CAPACITY};
use crate::models::Timeframe;
use crate::risk::{parse_balance, RiskError, RiskParams};
use crate::strategy::{SignalConfig, MIN_DETECTION_CANDLES};

pub const DEFAULT_CONFIG_FILE: &str = "confluence";
pub const ENV_PREFIX: &str = "CONFLUENCE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error(transparent)]
    Risk(#[from] RiskError),
}

/// Risk percentages; the balance comes from the account provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    pub risk_per_trade_percentage: f64,
    pub stop_loss_percentage: f64,
    pub take_profit_percentage: f64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        let params = RiskParams::default();
        Self {
            risk_per_trade_percentage: params.risk_per_trade_percentage,
            stop_loss_percentage: params.stop_loss_percentage,
            take_profit_percentage: params.take_profit_percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub symbol: String,
    pub timeframes: Vec<Timeframe>,
    pub primary_timeframe: Timeframe,
    pub window_capacity: usize,
    /// Raw balance as reported by the account provider
    pub account_balance: String,
    pub risk: RiskSettings,
    pub signal: SignalConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            timeframes: vec![
                Timeframe::M1,
                Timeframe::M5,
                Timeframe::M15,
                Timeframe::H1,
                Timeframe::H4,
                Timeframe::D1,
            ],
            primary_timeframe: Timeframe::M5,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            account_balance: "1000".to_string(),
            risk: RiskSettings::default(),
            signal: SignalConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load and validate configuration
    ///
    /// Without an explicit `path`, `confluence.toml` in the working directory
    /// is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(
        path: Option<&Path>,
        env_source: config::Environment,
    ) -> Result<Self, ConfigError> {
        let defaults = config::Config::try_from(&AppConfig::default())?;

        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let loaded: AppConfig = config::Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(env_source)
            .build()?
            .try_deserialize()?;

        loaded.validate()?;

        tracing::info!(
            symbol = %loaded.symbol,
            primary = %loaded.primary_timeframe,
            timeframes = loaded.timeframes.len(),
            "Configuration loaded"
        );

        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol is empty".to_string()));
        }

        if self.timeframes.is_empty() {
            return Err(ConfigError::Invalid("no timeframes configured".to_string()));
        }

        if !self.timeframes.contains(&self.primary_timeframe) {
            return Err(ConfigError::Invalid(format!(
                "primary timeframe {} is not in the timeframe list",
                self.primary_timeframe
            )));
        }

        if self.signal.min_candles < MIN_DETECTION_CANDLES {
            return Err(ConfigError::Invalid(format!(
                "signal.min_candles {} is below the minimum of {}",
                self.signal.min_candles, MIN_DETECTION_CANDLES
            )));
        }

        if self.window_capacity < self.signal.min_candles {
            return Err(ConfigError::Invalid(format!(
                "window capacity {} is below the {} candles signal detection needs",
                self.window_capacity, self.signal.min_candles
            )));
        }

        self.risk_params()?.validate()?;
        Ok(())
    }

    pub fn risk_params(&self) -> Result<RiskParams, ConfigError> {
        Ok(RiskParams {
            account_balance: parse_balance(&self.account_balance)?,
            risk_per_trade_percentage: self.risk.risk_per_trade_percentage,
            stop_loss_percentage: self.risk.stop_loss_percentage,
            take_profit_percentage: self.risk.take_profit_percentage,
        })
    }

    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        Ok(SessionConfig {
            symbol: self.symbol.clone(),
            timeframes: self.timeframes.clone(),
            primary_timeframe: self.primary_timeframe,
            window_capacity: self.window_capacity,
            risk: self.risk_params()?,
        })
    }
}

/// `CONFLUENCE_*` variables; `timeframes` takes a comma-separated list
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("timeframes")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env_from(vars: &[(&str, &str)]) -> config::Environment {
        let vars: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(vars))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let session = config.session_config().unwrap();
        assert_eq!(session.primary_timeframe, Timeframe::M5);
        assert_eq!(session.risk, RiskParams::default());
    }

    #[test]
    fn test_primary_must_be_tracked() {
        let config = AppConfig {
            primary_timeframe: Timeframe::W1,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_capacity_must_cover_detection() {
        let config = AppConfig {
            window_capacity: 50,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_stop_loss_rejected() {
        let mut config = AppConfig::default();
        config.risk.stop_loss_percentage = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Risk(_))));
    }

    #[test]
    fn test_bad_balance_rejected() {
        let config = AppConfig {
            account_balance: "n/a".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Risk(RiskError::InvalidBalance(_)))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir()
            .join(format!("confluence-test-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
symbol = "ETHUSDT"
timeframes = ["15m", "1h"]
primary_timeframe = "1h"
account_balance = "2500.5"

[risk]
stop_loss_percentage = 0.02

[signal]
volume_multiplier = 1.5
"#
        )
        .unwrap();

        let config = AppConfig::load_with_env(Some(&path), env_from(&[])).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.symbol, "ETHUSDT");
        assert_eq!(config.timeframes, vec![Timeframe::M15, Timeframe::H1]);
        assert_eq!(config.primary_timeframe, Timeframe::H1);
        assert_eq!(config.risk.stop_loss_percentage, 0.02);
        assert_eq!(config.risk.take_profit_percentage, 0.045);
        assert_eq!(config.signal.volume_multiplier, 1.5);
        assert_eq!(config.signal.min_candles, 100);
        assert_eq!(config.risk_params().unwrap().account_balance, 2500.5);
    }

    #[test]
    fn test_env_overrides() {
        let env = env_from(&[
            ("CONFLUENCE_TIMEFRAMES", "1m,5m"),
            ("CONFLUENCE_PRIMARY_TIMEFRAME", "1m"),
            ("CONFLUENCE_RISK__STOP_LOSS_PERCENTAGE", "0.03"),
            ("OTHER_SYMBOL", "ignored"),
        ]);

        let config = AppConfig::load_with_env(None, env).unwrap();
        assert_eq!(config.timeframes, vec![Timeframe::M1, Timeframe::M5]);
        assert_eq!(config.primary_timeframe, Timeframe::M1);
        assert_eq!(config.risk.stop_loss_percentage, 0.03);
        assert_eq!(config.symbol, "BTCUSDT");
    }

    #[test]
    fn test_env_single_timeframe() {
        let env = env_from(&[
            ("CONFLUENCE_TIMEFRAMES", "4h"),
            ("CONFLUENCE_PRIMARY_TIMEFRAME", "4h"),
        ]);

        let config = AppConfig::load_with_env(None, env).unwrap();
        assert_eq!(config.timeframes, vec![Timeframe::H4]);
    }

    #[test]
    fn test_min_candles_floor() {
        let mut config = AppConfig::default();
        config.signal.min_candles = 50;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.signal.min_candles = 150;
        assert!(config.validate().is_ok());
    }
}
