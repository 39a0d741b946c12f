use super::{
    signals::{classify, evaluate_predicates, SignalConfig},
    Strategy,
};
use crate::indicators::IndicatorSnapshot;
use crate::models::{Candle, Signal};

/// Multi-indicator confluence detector
///
/// Fires only when trend (EMA stack + close vs EMA99), momentum (a MACD
/// crossover on this exact step), RSI headroom and a volume spike agree.
/// Fibonacci proximity either confirms the entry or, for the "no Fib" rules,
/// must not point the other way.
#[derive(Debug, Clone, Default)]
pub struct ConfluenceStrategy {
    config: SignalConfig,
}

impl ConfluenceStrategy {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }
}

impl Strategy for ConfluenceStrategy {
    fn generate_signal(&self, candles: &[Candle], snapshots: &[IndicatorSnapshot]) -> Signal {
        let Some(latest) = candles.last() else {
            return Signal::none(0.0, 0);
        };

        let Some(predicates) = evaluate_predicates(candles, snapshots, &self.config) else {
            return Signal::none(latest.close, latest.time);
        };

        match classify(&predicates) {
            Some((signal_type, reason)) => {
                tracing::debug!("{} at {}: {}", signal_type, latest.close, reason);
                Signal {
                    signal_type,
                    price: latest.close,
                    time: latest.time,
                    reason: reason.to_string(),
                }
            }
            None => Signal::none(latest.close, latest.time),
        }
    }

    fn name(&self) -> &str {
        "ConfluenceStrategy"
    }

    fn min_candles_required(&self) -> usize {
        self.config.min_candles
    }
}
