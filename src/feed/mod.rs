// Candle event delivery: one sequential consumer per timeframe
pub mod synthetic;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::execution::SessionManager;
use crate::models::{Candle, Timeframe};

pub use synthetic::{live_updates, MarketScenario, SyntheticCandleSource};

/// Counters for one drained feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub updates: usize,
    pub closes: usize,
    pub signals: usize,
}

/// Apply every candle from `rx` to `timeframe`, in arrival order
///
/// Runs until the sender side is dropped. A candle for a timeframe the
/// session does not track ends the loop.
pub async fn drive_timeframe(
    session: Arc<SessionManager>,
    timeframe: Timeframe,
    mut rx: mpsc::Receiver<Candle>,
) -> FeedStats {
    let mut stats = FeedStats::default();

    while let Some(candle) = rx.recv().await {
        stats.updates += 1;

        match session.on_candle(timeframe, candle) {
            Ok(Some(event)) => {
                if event.candle.is_final {
                    stats.closes += 1;
                }
                if event.signal.is_some() {
                    stats.signals += 1;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(timeframe = %timeframe, "Dropping feed: {}", e);
                break;
            }
        }
    }

    tracing::info!(
        timeframe = %timeframe,
        updates = stats.updates,
        closes = stats.closes,
        signals = stats.signals,
        "Feed finished"
    );

    stats
}

/// Push candles into a feed, expanding each into `ticks` live updates
pub async fn replay(
    tx: mpsc::Sender<Candle>,
    candles: Vec<Candle>,
    ticks: usize,
    delay: Duration,
) -> anyhow::Result<()> {
    for candle in &candles {
        for update in live_updates(candle, ticks) {
            tx.send(update)
                .await
                .map_err(|_| anyhow::anyhow!("feed receiver closed"))?;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    Ok(())
}
