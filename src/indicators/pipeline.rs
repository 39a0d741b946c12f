use super::bollinger::{bollinger_series, BollingerValue};
use super::macd::{macd_series, MacdValue};
use super::moving_average::ema_series;
use super::rsi::rsi_series;
use crate::models::Candle;
use serde::{Deserialize, Serialize};

pub const EMA_FAST_PERIOD: usize = 7;
pub const EMA_MID_PERIOD: usize = 25;
pub const EMA_SLOW_PERIOD: usize = 99;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD: f64 = 2.0;

/// Indicator values for one candle, positionally aligned with the window
///
/// A field is `None` until the window holds enough history for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ema7: Option<f64>,
    pub ema25: Option<f64>,
    pub ema99: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<MacdValue>,
    pub bollinger: Option<BollingerValue>,
}

impl IndicatorSnapshot {
    /// True when every field the signal rules read (EMAs + MACD) is defined
    pub fn has_trend_fields(&self) -> bool {
        self.ema7.is_some() && self.ema25.is_some() && self.ema99.is_some() && self.macd.is_some()
    }
}

/// Recompute every indicator over the full window
///
/// Output has exactly one snapshot per candle.
pub fn compute_snapshots(candles: &[Candle]) -> Vec<IndicatorSnapshot> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let ema7 = ema_series(&closes, EMA_FAST_PERIOD);
    let ema25 = ema_series(&closes, EMA_MID_PERIOD);
    let ema99 = ema_series(&closes, EMA_SLOW_PERIOD);
    let rsi = rsi_series(&closes, RSI_PERIOD);
    let macd = macd_series(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    let bollinger = bollinger_series(&closes, BOLLINGER_PERIOD, BOLLINGER_STD);

    (0..closes.len())
        .map(|i| IndicatorSnapshot {
            ema7: ema7[i],
            ema25: ema25[i],
            ema99: ema99[i],
            rsi: rsi[i],
            macd: macd[i],
            bollinger: bollinger[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::macd::macd_offset;

    fn flat_candles(n: usize, price: f64) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle {
                time: i as i64 * 60_000,
                open: price,
                high: price,
                low: price,
                close: price,
                volume: 1000.0,
                is_final: true,
            })
            .collect()
    }

    #[test]
    fn test_snapshots_align_with_window() {
        let snapshots = compute_snapshots(&flat_candles(120, 10.0));
        assert_eq!(snapshots.len(), 120);

        for (i, snap) in snapshots.iter().enumerate() {
            assert_eq!(snap.ema7.is_some(), i >= 6);
            assert_eq!(snap.ema25.is_some(), i >= 24);
            assert_eq!(snap.ema99.is_some(), i >= 98);
            assert_eq!(snap.rsi.is_some(), i >= 14);
            assert_eq!(snap.macd.is_some(), i >= macd_offset(MACD_SLOW, MACD_SIGNAL));
            assert_eq!(snap.bollinger.is_some(), i >= 19);
        }
    }

    #[test]
    fn test_flat_window_scenario() {
        let snapshots = compute_snapshots(&flat_candles(100, 100.0));
        let last = snapshots.last().unwrap();

        assert!((last.ema7.unwrap() - 100.0).abs() < 1e-9);
        assert!((last.ema25.unwrap() - 100.0).abs() < 1e-9);
        assert!((last.ema99.unwrap() - 100.0).abs() < 1e-9);
        assert!((last.rsi.unwrap() - 50.0).abs() < 1e-9);
        assert!(last.macd.unwrap().histogram.abs() < 1e-9);
        assert!(last.has_trend_fields());
    }

    #[test]
    fn test_empty_window() {
        assert!(compute_snapshots(&[]).is_empty());
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let candles: Vec<Candle> = flat_candles(150, 1.0)
            .into_iter()
            .enumerate()
            .map(|(i, mut c)| {
                c.close = 100.0 + (i as f64 * 0.3).sin() * 3.0;
                c
            })
            .collect();

        assert_eq!(compute_snapshots(&candles), compute_snapshots(&candles));
    }
}
