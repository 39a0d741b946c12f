// Technical indicators module
// Implements EMA, RSI, MACD, Bollinger Bands and Fibonacci retracement

pub mod bollinger;
pub mod fibonacci;
pub mod macd;
pub mod moving_average;
pub mod pipeline;
pub mod rsi;

pub use bollinger::{bollinger_series, BollingerValue};
pub use fibonacci::{calculate_fibonacci, FibRatio, FibonacciLevels};
pub use macd::{macd_offset, macd_series, MacdValue};
pub use moving_average::{calculate_sma, ema_series, sma_series};
pub use pipeline::{compute_snapshots, IndicatorSnapshot};
pub use rsi::rsi_series;
