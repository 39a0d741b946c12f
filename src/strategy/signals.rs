use crate::indicators::{calculate_fibonacci, calculate_sma, FibRatio, IndicatorSnapshot};
use crate::models::{Candle, SignalType};
use serde::{Deserialize, Serialize};

pub const REASON_BUY_FIB: &str = "EMA+MACD+Fib Support+RSI confluence";
pub const REASON_SELL_FIB: &str = "EMA+MACD+Fib Resistance confluence";
pub const REASON_NO_FIB: &str = "EMA+MACD confluence (no Fib)";

/// Fibonacci levels treated as support when price is near them
pub const SUPPORT_LEVELS: [FibRatio; 3] = [FibRatio::R618, FibRatio::R500, FibRatio::R382];
/// Fibonacci levels treated as resistance when price is near them
pub const RESISTANCE_LEVELS: [FibRatio; 2] = [FibRatio::R236, FibRatio::R0];

/// Detection never starts on less history than this
pub const MIN_DETECTION_CANDLES: usize = 100;

/// Configuration for signal generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub min_candles: usize,
    pub fib_lookback: usize,
    pub fib_proximity_pct: f64, // Relative distance to a level, 0.005 = 0.5%
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub rsi_fallback: f64, // Used when RSI is undefined
    pub volume_lookback: usize,
    pub volume_multiplier: f64, // Multiple of average volume
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_candles: MIN_DETECTION_CANDLES,
            fib_lookback: 100,
            fib_proximity_pct: 0.005,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            rsi_fallback: 50.0,
            volume_lookback: 20,
            volume_multiplier: 1.1,
        }
    }
}

/// Boolean conditions derived from the latest two snapshots and the window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Predicates {
    pub up_trend: bool,
    pub ema_aligned_bull: bool,
    pub ema_aligned_bear: bool,
    pub macd_bull_cross: bool,
    pub macd_bear_cross: bool,
    pub near_support: bool,
    pub near_resistance: bool,
    pub rsi_safe_buy: bool,
    pub rsi_safe_sell: bool,
    pub high_volume: bool,
}

/// Derive the rule predicates for the most recent candle
///
/// Returns None when there is not enough history: fewer than
/// `config.min_candles` candles, mismatched snapshot length, or EMA/MACD
/// fields missing on either of the last two snapshots.
pub fn evaluate_predicates(
    candles: &[Candle],
    snapshots: &[IndicatorSnapshot],
    config: &SignalConfig,
) -> Option<Predicates> {
    if candles.len() < config.min_candles.max(2) || snapshots.len() != candles.len() {
        return None;
    }

    let latest = candles.last()?;
    let current = &snapshots[snapshots.len() - 1];
    let previous = &snapshots[snapshots.len() - 2];
    if !current.has_trend_fields() || !previous.has_trend_fields() {
        return None;
    }

    let close = latest.close;
    let (ema7, ema25) = (current.ema7?, current.ema25?);
    let ema99 = current.ema99;
    let (macd, prev_macd) = (current.macd?, previous.macd?);

    let up_trend = ema99.map_or(true, |ema99| close > ema99);
    let ema_aligned_bull = ema99.is_some_and(|ema99| ema7 > ema25 && ema25 > ema99);
    let ema_aligned_bear = ema99.is_some_and(|ema99| ema7 < ema25 && ema25 < ema99);

    let macd_bull_cross = prev_macd.macd <= prev_macd.signal && macd.macd > macd.signal;
    let macd_bear_cross = prev_macd.macd >= prev_macd.signal && macd.macd < macd.signal;

    let fib = calculate_fibonacci(candles, config.fib_lookback);
    let (near_support, near_resistance) = match fib {
        Some(fib) => {
            let near =
                |ratio: &FibRatio| is_near(close, fib.level(*ratio), config.fib_proximity_pct);
            (
                SUPPORT_LEVELS.iter().any(near),
                RESISTANCE_LEVELS.iter().any(near),
            )
        }
        None => (false, false),
    };

    let rsi = current.rsi.unwrap_or(config.rsi_fallback);
    let rsi_safe_buy = rsi < config.rsi_overbought;
    let rsi_safe_sell = rsi > config.rsi_oversold;

    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    let high_volume = calculate_sma(&volumes, config.volume_lookback.min(volumes.len()))
        .is_some_and(|avg| latest.volume > avg * config.volume_multiplier);

    let predicates = Predicates {
        up_trend,
        ema_aligned_bull,
        ema_aligned_bear,
        macd_bull_cross,
        macd_bear_cross,
        near_support,
        near_resistance,
        rsi_safe_buy,
        rsi_safe_sell,
        high_volume,
    };

    tracing::debug!(
        "Indicators: close={:.4}, EMA7={:.4}, EMA25={:.4}, EMA99={:?}, \
         MACD={:.5}/{:.5}, RSI={:.1}, {:?}",
        close,
        ema7,
        ema25,
        ema99,
        macd.macd,
        macd.signal,
        rsi,
        predicates
    );

    Some(predicates)
}

/// Apply the confluence rules in order; first match wins
pub fn classify(p: &Predicates) -> Option<(SignalType, &'static str)> {
    let buy_base =
        p.up_trend && p.ema_aligned_bull && p.macd_bull_cross && p.rsi_safe_buy && p.high_volume;
    let sell_base =
        !p.up_trend && p.ema_aligned_bear && p.macd_bear_cross && p.rsi_safe_sell && p.high_volume;

    if buy_base && p.near_support {
        Some((SignalType::Buy, REASON_BUY_FIB))
    } else if buy_base && !p.near_resistance {
        Some((SignalType::Buy, REASON_NO_FIB))
    } else if sell_base && p.near_resistance {
        Some((SignalType::Sell, REASON_SELL_FIB))
    } else if sell_base && !p.near_support {
        Some((SignalType::Sell, REASON_NO_FIB))
    } else {
        None
    }
}

fn is_near(price: f64, level: f64, proximity_pct: f64) -> bool {
    level != 0.0 && ((price - level) / level).abs() < proximity_pct
}
