// Signal detection module
pub mod confluence;
pub mod signals;

use crate::indicators::IndicatorSnapshot;
use crate::models::{Candle, Signal};

pub use confluence::ConfluenceStrategy;
pub use signals::{
    classify, evaluate_predicates, Predicates, SignalConfig, MIN_DETECTION_CANDLES,
};

/// Base trait for signal detectors
///
/// Implementations are pure: the same window and snapshots always produce
/// the same signal. History-aware deduplication belongs to the caller.
pub trait Strategy: Send + Sync {
    /// Classify the latest candle of the window
    ///
    /// `snapshots` is positionally aligned with `candles`. Returns a signal of
    /// type `SignalType::None` when no rule matches or history is too short.
    fn generate_signal(&self, candles: &[Candle], snapshots: &[IndicatorSnapshot]) -> Signal;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Minimum candles required before the strategy can fire
    fn min_candles_required(&self) -> usize;
}
