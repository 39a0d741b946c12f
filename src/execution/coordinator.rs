use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::candle_window::{CandleWindow, WindowOp};
use crate::indicators::{compute_snapshots, IndicatorSnapshot};
use crate::models::{Candle, Signal, Timeframe};
use crate::strategy::Strategy;

/// Lifecycle of a timeframe: detection starts once enough history exists
/// and never switches off again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinatorPhase {
    Warming,
    Active,
}

/// Propagated to the session on a final candle close or a new signal
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorEvent {
    pub timeframe: Timeframe,
    pub candle: Candle,
    pub signal: Option<Signal>,
}

/// Read-only copy of one timeframe's state for presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeframeView {
    pub timeframe: Timeframe,
    pub phase: CoordinatorPhase,
    pub candles: Vec<Candle>,
    pub snapshots: Vec<IndicatorSnapshot>,
    pub last_signal: Option<Signal>,
}

/// Owns the candle window and derived indicators for one timeframe
pub struct TimeframeCoordinator {
    timeframe: Timeframe,
    window: CandleWindow,
    snapshots: Vec<IndicatorSnapshot>,
    strategy: Arc<dyn Strategy>,
    phase: CoordinatorPhase,
    last_emitted: Option<Signal>,
}

impl TimeframeCoordinator {
    pub fn new(timeframe: Timeframe, capacity: usize, strategy: Arc<dyn Strategy>) -> Self {
        Self {
            timeframe,
            window: CandleWindow::new(capacity),
            snapshots: Vec::new(),
            strategy,
            phase: CoordinatorPhase::Warming,
            last_emitted: None,
        }
    }

    /// Apply one candle event: update window, recompute, detect, deduplicate
    ///
    /// Returns an event when the candle is final or a signal was emitted.
    /// In-progress updates without a signal only change internal state.
    pub fn apply(&mut self, candle: Candle) -> Option<CoordinatorEvent> {
        let op = self.window.apply(candle);
        let candles = self.window.candles();
        self.snapshots = compute_snapshots(candles);

        if self.phase == CoordinatorPhase::Warming
            && candles.len() >= self.strategy.min_candles_required()
        {
            self.phase = CoordinatorPhase::Active;
            tracing::info!(
                timeframe = %self.timeframe,
                candles = candles.len(),
                "Signal detection active"
            );
        }

        let signal = match self.phase {
            CoordinatorPhase::Active => {
                let detected = self.strategy.generate_signal(candles, &self.snapshots);
                self.deduplicate(detected)
            }
            CoordinatorPhase::Warming => None,
        };

        if let Some(signal) = &signal {
            tracing::info!(
                timeframe = %self.timeframe,
                signal = %signal.signal_type,
                price = signal.price,
                op = ?op,
                "{}",
                signal.reason
            );
        }

        if candle.is_final || signal.is_some() {
            Some(CoordinatorEvent {
                timeframe: self.timeframe,
                candle,
                signal,
            })
        } else {
            None
        }
    }

    /// Drop NONE and anything sharing the last emitted signal's candle time
    fn deduplicate(&mut self, signal: Signal) -> Option<Signal> {
        if signal.is_none() {
            return None;
        }

        if let Some(last) = &self.last_emitted {
            if last.time == signal.time {
                tracing::debug!(
                    timeframe = %self.timeframe,
                    time = signal.time,
                    "Suppressed duplicate {} signal",
                    signal.signal_type
                );
                return None;
            }
        }

        self.last_emitted = Some(signal.clone());
        Some(signal)
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn phase(&self) -> CoordinatorPhase {
        self.phase
    }

    pub fn last_emitted(&self) -> Option<&Signal> {
        self.last_emitted.as_ref()
    }

    pub fn snapshots(&self) -> &[IndicatorSnapshot] {
        &self.snapshots
    }

    pub fn candle_count(&self) -> usize {
        self.window.len()
    }

    pub fn view(&self) -> TimeframeView {
        TimeframeView {
            timeframe: self.timeframe,
            phase: self.phase,
            candles: self.window.to_vec(),
            snapshots: self.snapshots.clone(),
            last_signal: self.last_emitted.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SignalType;
    use crate::strategy::ConfluenceStrategy;

    /// Fires BUY on every evaluation once `min` candles exist
    struct AlwaysBuy {
        min: usize,
    }

    impl Strategy for AlwaysBuy {
        fn generate_signal(&self, candles: &[Candle], _snapshots: &[IndicatorSnapshot]) -> Signal {
            let last = candles.last().unwrap();
            Signal {
                signal_type: SignalType::Buy,
                price: last.close,
                time: last.time,
                reason: "always".to_string(),
            }
        }

        fn name(&self) -> &str {
            "AlwaysBuy"
        }

        fn min_candles_required(&self) -> usize {
            self.min
        }
    }

    fn create_test_candle(time: i64, price: f64, is_final: bool) -> Candle {
        Candle {
            time,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 1000.0,
            is_final,
        }
    }

    #[test]
    fn test_warming_to_active() {
        let mut coordinator =
            TimeframeCoordinator::new(Timeframe::M5, 400, Arc::new(ConfluenceStrategy::default()));

        for i in 0..99 {
            coordinator.apply(create_test_candle(i, 100.0, true));
            assert_eq!(coordinator.phase(), CoordinatorPhase::Warming);
        }

        coordinator.apply(create_test_candle(99, 100.0, true));
        assert_eq!(coordinator.phase(), CoordinatorPhase::Active);
        assert_eq!(coordinator.snapshots().len(), 100);
    }

    #[test]
    fn test_active_never_reverts() {
        let mut coordinator =
            TimeframeCoordinator::new(Timeframe::M1, 3, Arc::new(AlwaysBuy { min: 2 }));

        for i in 0..10 {
            coordinator.apply(create_test_candle(i, 100.0, true));
        }
        assert_eq!(coordinator.candle_count(), 3);
        assert_eq!(coordinator.phase(), CoordinatorPhase::Active);
    }

    #[test]
    fn test_final_candle_propagates_without_signal() {
        let mut coordinator =
            TimeframeCoordinator::new(Timeframe::M5, 400, Arc::new(ConfluenceStrategy::default()));

        let event = coordinator.apply(create_test_candle(0, 100.0, true)).unwrap();
        assert_eq!(event.timeframe, Timeframe::M5);
        assert!(event.signal.is_none());
    }

    #[test]
    fn test_live_update_without_signal_is_silent() {
        let mut coordinator =
            TimeframeCoordinator::new(Timeframe::M5, 400, Arc::new(ConfluenceStrategy::default()));

        assert!(coordinator.apply(create_test_candle(0, 100.0, false)).is_none());
        assert!(coordinator.apply(create_test_candle(0, 101.0, false)).is_none());
        assert_eq!(coordinator.candle_count(), 1);
    }

    #[test]
    fn test_duplicate_time_suppressed() {
        let mut coordinator =
            TimeframeCoordinator::new(Timeframe::M5, 400, Arc::new(AlwaysBuy { min: 1 }));

        let first = coordinator.apply(create_test_candle(0, 100.0, false)).unwrap();
        assert!(first.signal.is_some());

        // Same period, updated price: detector fires again but is deduplicated
        assert!(coordinator.apply(create_test_candle(0, 100.5, false)).is_none());

        // Final close of the same period still propagates, without a signal
        let close = coordinator.apply(create_test_candle(0, 101.0, true)).unwrap();
        assert!(close.signal.is_none());

        // Next period fires again
        let next = coordinator.apply(create_test_candle(1, 102.0, false)).unwrap();
        assert_eq!(next.signal.unwrap().time, 1);
        assert_eq!(coordinator.last_emitted().unwrap().time, 1);
    }

    #[test]
    fn test_no_detection_while_warming() {
        let mut coordinator =
            TimeframeCoordinator::new(Timeframe::M5, 400, Arc::new(AlwaysBuy { min: 3 }));

        assert!(coordinator.apply(create_test_candle(0, 100.0, false)).is_none());
        assert!(coordinator.apply(create_test_candle(1, 100.0, false)).is_none());
        assert!(coordinator.apply(create_test_candle(2, 100.0, false)).is_some());
    }

    #[test]
    fn test_view_is_a_copy() {
        let mut coordinator =
            TimeframeCoordinator::new(Timeframe::H1, 400, Arc::new(ConfluenceStrategy::default()));
        coordinator.apply(create_test_candle(0, 100.0, true));

        let view = coordinator.view();
        coordinator.apply(create_test_candle(1, 101.0, true));

        assert_eq!(view.candles.len(), 1);
        assert_eq!(view.snapshots.len(), 1);
        assert_eq!(view.phase, CoordinatorPhase::Warming);
        assert_eq!(coordinator.candle_count(), 2);
    }
}
