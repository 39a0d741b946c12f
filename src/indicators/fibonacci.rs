//! Fibonacci retracement levels
//!
//! Levels are derived from the highest high and lowest low of a trailing
//! sub-window: `level(r) = high - r * (high - low)`, with the 1.0 level pinned
//! to `low` exactly.

use crate::models::Candle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FibRatio {
    R0,
    R236,
    R382,
    R500,
    R618,
    R786,
    R1000,
}

impl FibRatio {
    pub const ALL: [FibRatio; 7] = [
        FibRatio::R0,
        FibRatio::R236,
        FibRatio::R382,
        FibRatio::R500,
        FibRatio::R618,
        FibRatio::R786,
        FibRatio::R1000,
    ];

    pub fn value(&self) -> f64 {
        match self {
            FibRatio::R0 => 0.0,
            FibRatio::R236 => 0.236,
            FibRatio::R382 => 0.382,
            FibRatio::R500 => 0.5,
            FibRatio::R618 => 0.618,
            FibRatio::R786 => 0.786,
            FibRatio::R1000 => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub high: f64,
    pub low: f64,
}

impl FibonacciLevels {
    pub fn from_range(high: f64, low: f64) -> Self {
        Self { high, low }
    }

    pub fn level(&self, ratio: FibRatio) -> f64 {
        match ratio {
            FibRatio::R1000 => self.low,
            _ => self.high - ratio.value() * (self.high - self.low),
        }
    }

    /// All levels as `(ratio, price)`, from 0 down to 1
    pub fn levels(&self) -> Vec<(f64, f64)> {
        FibRatio::ALL
            .iter()
            .map(|ratio| (ratio.value(), self.level(*ratio)))
            .collect()
    }
}

/// Compute levels over the most recent `lookback` candles
///
/// Returns None for an empty window or a zero lookback.
pub fn calculate_fibonacci(candles: &[Candle], lookback: usize) -> Option<FibonacciLevels> {
    if candles.is_empty() || lookback == 0 {
        return None;
    }

    let start = candles.len().saturating_sub(lookback);
    let recent = &candles[start..];

    let high = recent.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = recent.iter().map(|c| c.low).fold(f64::MAX, f64::min);

    Some(FibonacciLevels::from_range(high, low))
}
