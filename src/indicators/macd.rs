use super::moving_average::ema_series;
use serde::{Deserialize, Serialize};

/// MACD: histogram = MACD line - signal line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Index of the first defined MACD value: `slow + signal - 2`
pub fn macd_offset(slow: usize, signal: usize) -> usize {
    slow + signal - 2
}

/// MACD aligned by index with the input prices
///
/// The MACD line exists once the slow EMA does (`i >= slow - 1`); the signal
/// line is an EMA of that line seeded with the SMA of its first `signal`
/// values, so the full value is defined from `slow + signal - 2` onward.
pub fn macd_series(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Vec<Option<MacdValue>> {
    let mut out = vec![None; prices.len()];
    if fast == 0 || slow == 0 || signal == 0 || prices.len() < slow {
        return out;
    }

    let fast_ema = ema_series(prices, fast);
    let slow_ema = ema_series(prices, slow);

    // MACD line, starting at the first index where the slow EMA exists
    let start = slow - 1;
    let line: Vec<f64> = (start..prices.len())
        .filter_map(|i| Some(fast_ema[i]? - slow_ema[i]?))
        .collect();

    // Fast EMA is defined wherever the slow one is unless fast > slow
    if line.len() != prices.len() - start {
        return out;
    }

    let signal_line = ema_series(&line, signal);
    for (j, signal_value) in signal_line.iter().enumerate() {
        if let Some(signal_value) = signal_value {
            out[start + j] = Some(MacdValue {
                macd: line[j],
                signal: *signal_value,
                histogram: line[j] - signal_value,
            });
        }
    }

    out
}
