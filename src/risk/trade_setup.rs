use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::TradeSide;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("invalid account balance '{0}'")]
    InvalidBalance(String),
}

/// Risk settings used to size a trade
///
/// Percentages are fractions: 0.02 = 2%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    pub account_balance: f64,
    pub risk_per_trade_percentage: f64,
    pub stop_loss_percentage: f64,
    pub take_profit_percentage: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            account_balance: 1000.0,
            risk_per_trade_percentage: 0.02, // 2% of balance at risk
            stop_loss_percentage: 0.015,     // -1.5% from entry
            take_profit_percentage: 0.045,   // +4.5% from entry
        }
    }
}

impl RiskParams {
    /// Reject parameters that would produce a degenerate setup
    ///
    /// A zero stop-loss puts the stop on the entry and makes the size infinite,
    /// so every field must be strictly positive.
    pub fn validate(&self) -> Result<(), RiskError> {
        let fields = [
            ("account_balance", self.account_balance),
            ("risk_per_trade_percentage", self.risk_per_trade_percentage),
            ("stop_loss_percentage", self.stop_loss_percentage),
            ("take_profit_percentage", self.take_profit_percentage),
        ];

        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(RiskError::NonPositive { field, value });
            }
        }

        Ok(())
    }
}

/// Parse an account balance as delivered by the account provider
pub fn parse_balance(raw: &str) -> Result<f64, RiskError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| RiskError::InvalidBalance(raw.to_string()))?;

    if !value.is_finite() || value < 0.0 {
        return Err(RiskError::InvalidBalance(raw.to_string()));
    }

    Ok(value)
}

/// Proposed trade derived from a signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    pub side: TradeSide,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub position_size: f64,
    pub risk_amount: f64,
}

impl TradeSetup {
    /// Reward per unit of risk (distance to target / distance to stop)
    pub fn risk_reward_ratio(&self) -> f64 {
        (self.take_profit - self.entry_price).abs() / (self.entry_price - self.stop_loss).abs()
    }
}

/// Size a trade so that hitting the stop loses exactly `risk_amount`
///
/// Does not validate `params`: a zero stop-loss percentage yields an
/// infinite (or NaN) position size. Callers validate first.
pub fn compute_trade_setup(entry_price: f64, params: &RiskParams, side: TradeSide) -> TradeSetup {
    let (stop_loss, take_profit) = match side {
        TradeSide::Buy => (
            entry_price * (1.0 - params.stop_loss_percentage),
            entry_price * (1.0 + params.take_profit_percentage),
        ),
        TradeSide::Sell => (
            entry_price * (1.0 + params.stop_loss_percentage),
            entry_price * (1.0 - params.take_profit_percentage),
        ),
    };

    let risk_amount = params.account_balance * params.risk_per_trade_percentage;
    let position_size = risk_amount / (entry_price - stop_loss).abs();

    TradeSetup {
        side,
        entry_price,
        stop_loss,
        take_profit,
        position_size,
        risk_amount,
    }
}
