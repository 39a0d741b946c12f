// Risk management module
pub mod trade_setup;

pub use trade_setup::{compute_trade_setup, parse_balance, RiskError, RiskParams, TradeSetup};
