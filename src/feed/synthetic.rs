use crate::models::{Candle, Timeframe};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Market scenario types for synthetic data generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketScenario {
    /// Steady uptrend with noise
    Uptrend,
    /// Steady downtrend with noise
    Downtrend,
    /// Sideways/choppy market (±1% around mean)
    Sideways,
    /// High volatility (±5% large swings)
    Volatile,
    /// Drifting 24-candle sine wave with a volume burst every 12 candles
    Cycle,
}

/// Generates synthetic candles for demos and tests
pub struct SyntheticCandleSource {
    rng: StdRng,
    base_price: f64,
    base_volume: f64,
}

impl SyntheticCandleSource {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 150.0,
            base_volume: 1_000_000.0,
        }
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    /// Generate final candles for a scenario
    ///
    /// # Arguments
    /// * `scenario` - The market scenario to simulate
    /// * `num_candles` - Number of candles to generate
    /// * `timeframe` - Period spacing between candle open times
    /// * `start_time` - Open time of the first candle (ms)
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_candles: usize,
        timeframe: Timeframe,
        start_time: i64,
    ) -> Vec<Candle> {
        let step = timeframe.duration_ms();
        let mut candles = Vec::with_capacity(num_candles);
        let mut current_price = self.base_price;
        let mean_price = self.base_price;

        for i in 0..num_candles {
            let time = start_time + i as i64 * step;
            let mut volume_boost = 1.0;

            match scenario {
                MarketScenario::Uptrend | MarketScenario::Downtrend => {
                    let drift = if scenario == MarketScenario::Uptrend { 0.002 } else { -0.002 };
                    let noise = self.rng.gen_range(-0.001..0.001);
                    current_price *= 1.0 + drift + noise;
                }
                MarketScenario::Sideways => {
                    // Mean reversion force + noise
                    let reversion = (mean_price - current_price) * 0.1;
                    let noise = current_price * self.rng.gen_range(-0.01..0.01);
                    current_price += reversion + noise;
                }
                MarketScenario::Volatile => {
                    current_price *= 1.0 + self.rng.gen_range(-0.05..0.05);
                    // Prevent price from going too low
                    current_price = current_price.max(self.base_price * 0.5);
                }
                MarketScenario::Cycle => {
                    let phase = 2.0 * std::f64::consts::PI * i as f64 / 24.0;
                    let noise = self.rng.gen_range(-0.0005..0.0005);
                    let offset = 0.001 * i as f64 + 0.04 * phase.sin() + noise;
                    current_price = self.base_price * (1.0 + offset);
                    if i % 12 == 0 {
                        volume_boost = 3.0;
                    }
                }
            }

            let candle = self.create_candle(current_price, time, volume_boost);
            candles.push(candle);
        }

        candles
    }

    /// Helper to create a candle from close price and open time
    fn create_candle(&mut self, price: f64, time: i64, volume_boost: f64) -> Candle {
        // Create realistic OHLC from close price
        let noise_pct = 0.002; // ±0.2% intrabar movement

        // Generate high and low around the close price
        let high = price * (1.0 + self.rng.gen_range(0.0..noise_pct));
        let low = price * (1.0 - self.rng.gen_range(0.0..noise_pct));

        // Generate open and clamp it between low and high
        let open_raw = price * (1.0 + self.rng.gen_range(-noise_pct..noise_pct));
        let open = open_raw.clamp(low, high);

        // Vary volume ±30%
        let volume = self.base_volume * self.rng.gen_range(0.7..1.3) * volume_boost;

        Candle {
            time,
            open,
            high,
            low,
            close: price,
            volume,
            is_final: true,
        }
    }
}

/// Expand a final candle into `ticks` updates of the same period
///
/// The first `ticks - 1` are in-progress (`is_final == false`) and walk the
/// close from open toward the final close; the last is the final candle.
pub fn live_updates(candle: &Candle, ticks: usize) -> Vec<Candle> {
    let ticks = ticks.max(1);
    let mut updates = Vec::with_capacity(ticks);

    for k in 1..ticks {
        let fraction = k as f64 / ticks as f64;
        let close = candle.open + (candle.close - candle.open) * fraction;
        updates.push(Candle {
            time: candle.time,
            open: candle.open,
            high: candle.open.max(close),
            low: candle.open.min(close),
            close,
            volume: candle.volume * fraction,
            is_final: false,
        });
    }

    updates.push(Candle {
        is_final: true,
        ..*candle
    });
    updates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uptrend() {
        let mut source = SyntheticCandleSource::new(42);
        let candles = source.generate(MarketScenario::Uptrend, 500, Timeframe::M5, 0);

        assert_eq!(candles.len(), 500);

        let first_price = candles.first().unwrap().close;
        let last_price = candles.last().unwrap().close;
        assert!(
            last_price > first_price,
            "Uptrend should end higher: {} -> {}",
            first_price,
            last_price
        );
    }

    #[test]
    fn test_generate_downtrend() {
        let mut source = SyntheticCandleSource::new(42);
        let candles = source.generate(MarketScenario::Downtrend, 500, Timeframe::M5, 0);

        let first_price = candles.first().unwrap().close;
        let last_price = candles.last().unwrap().close;
        assert!(last_price < first_price);
    }

    #[test]
    fn test_generate_sideways() {
        let mut source = SyntheticCandleSource::new(42);
        let candles = source.generate(MarketScenario::Sideways, 500, Timeframe::M5, 0);

        // Should stay roughly around base price (±10%)
        let base = source.base_price;
        for candle in &candles {
            assert!(
                candle.close > base * 0.9 && candle.close < base * 1.1,
                "Sideways should stay near base: {} vs {}",
                candle.close,
                base
            );
        }
    }

    #[test]
    fn test_times_follow_timeframe() {
        let mut source = SyntheticCandleSource::new(7);
        let candles = source.generate(MarketScenario::Volatile, 50, Timeframe::H1, 1_000);

        assert_eq!(candles[0].time, 1_000);
        for pair in candles.windows(2) {
            assert_eq!(pair[1].time - pair[0].time, 3_600_000);
        }
    }

    #[test]
    fn test_ohlc_consistency() {
        let mut source = SyntheticCandleSource::new(42);
        let candles = source.generate(MarketScenario::Cycle, 200, Timeframe::M5, 0);

        for candle in &candles {
            assert!(candle.high >= candle.close, "High should be >= close");
            assert!(candle.high >= candle.open, "High should be >= open");
            assert!(candle.low <= candle.close, "Low should be <= close");
            assert!(candle.low <= candle.open, "Low should be <= open");
            assert!(candle.is_final);
        }
    }

    #[test]
    fn test_same_seed_same_series() {
        let generate = || {
            SyntheticCandleSource::new(9).generate(MarketScenario::Volatile, 100, Timeframe::M1, 0)
        };
        assert_eq!(generate(), generate());
    }

    #[test]
    fn test_base_price_anchors_series() {
        let candles = SyntheticCandleSource::new(5)
            .with_base_price(20_000.0)
            .generate(MarketScenario::Sideways, 50, Timeframe::M5, 0);

        for candle in &candles {
            assert!(candle.close > 18_000.0 && candle.close < 22_000.0);
        }
    }

    #[test]
    fn test_live_updates() {
        let mut source = SyntheticCandleSource::new(1);
        let candle = source.generate(MarketScenario::Uptrend, 1, Timeframe::M5, 0)[0];
        let updates = live_updates(&candle, 4);

        assert_eq!(updates.len(), 4);
        assert!(updates.iter().all(|u| u.time == candle.time));
        assert!(updates[..3].iter().all(|u| !u.is_final));
        assert_eq!(updates[3], candle);
        assert_eq!(live_updates(&candle, 0), vec![candle]);
    }
}
