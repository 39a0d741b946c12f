use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use thiserror::Error;

use super::candle_window::DEFAULT_WINDOW_CAPACITY;
use super::coordinator::{CoordinatorEvent, TimeframeCoordinator, TimeframeView};
use super::executor::OrderRequest;
use crate::models::{AlertHistoryItem, Candle, FeedEntry, Signal, Timeframe};
use crate::risk::{compute_trade_setup, parse_balance, RiskError, RiskParams, TradeSetup};
use crate::strategy::{ConfluenceStrategy, Strategy};

pub const ALERT_LOG_CAPACITY: usize = 50;
pub const SIGNAL_FEED_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("no coordinator configured for timeframe {0}")]
    UnknownTimeframe(Timeframe),
    #[error(transparent)]
    Risk(#[from] RiskError),
}

/// What a session tracks and how it sizes trades
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub symbol: String,
    pub timeframes: Vec<Timeframe>,
    pub primary_timeframe: Timeframe,
    pub window_capacity: usize,
    pub risk: RiskParams,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            timeframes: vec![Timeframe::M5],
            primary_timeframe: Timeframe::M5,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            risk: RiskParams::default(),
        }
    }
}

/// Point-in-time copy of the session's shared outputs
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub symbol: String,
    pub primary_timeframe: Timeframe,
    pub risk_params: RiskParams,
    pub alert_log: Vec<AlertHistoryItem>,
    pub signal_feed: Vec<FeedEntry>,
    pub trade_setup: Option<TradeSetup>,
}

struct SessionState {
    alert_log: VecDeque<AlertHistoryItem>,
    signal_feed: VecDeque<FeedEntry>,
    trade_setup: Option<TradeSetup>,
    risk_params: RiskParams,
}

/// Fans candles out to one coordinator per timeframe and collects signals
///
/// Each coordinator sits behind its own lock, so different timeframes can be
/// fed from different tasks in parallel. The alert log, signal feed and
/// current trade setup share a single lock.
pub struct SessionManager {
    symbol: String,
    primary_timeframe: Timeframe,
    coordinators: HashMap<Timeframe, Mutex<TimeframeCoordinator>>,
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_strategy(config, Arc::new(ConfluenceStrategy::default()))
    }

    pub fn with_strategy(config: SessionConfig, strategy: Arc<dyn Strategy>) -> Self {
        let coordinators = config
            .timeframes
            .iter()
            .map(|&tf| {
                let coordinator =
                    TimeframeCoordinator::new(tf, config.window_capacity, strategy.clone());
                (tf, Mutex::new(coordinator))
            })
            .collect();

        tracing::info!(
            symbol = %config.symbol,
            primary = %config.primary_timeframe,
            strategy = strategy.name(),
            "Session started with {} timeframes",
            config.timeframes.len()
        );

        Self {
            symbol: config.symbol,
            primary_timeframe: config.primary_timeframe,
            coordinators,
            state: Mutex::new(SessionState {
                alert_log: VecDeque::with_capacity(ALERT_LOG_CAPACITY),
                signal_feed: VecDeque::with_capacity(SIGNAL_FEED_CAPACITY),
                trade_setup: None,
                risk_params: config.risk,
            }),
        }
    }

    /// Route one candle update to its timeframe's coordinator
    ///
    /// Updates for the same timeframe are serialized by that coordinator's
    /// lock; the caller must still deliver them in feed order.
    pub fn on_candle(
        &self,
        timeframe: Timeframe,
        candle: Candle,
    ) -> Result<Option<CoordinatorEvent>, SessionError> {
        let coordinator = self
            .coordinators
            .get(&timeframe)
            .ok_or(SessionError::UnknownTimeframe(timeframe))?;

        let event = lock(coordinator).apply(candle);

        if let Some(signal) = event.as_ref().and_then(|e| e.signal.as_ref()) {
            self.record_signal(timeframe, signal);
        }

        Ok(event)
    }

    fn record_signal(&self, timeframe: Timeframe, signal: &Signal) {
        let mut state = lock(&self.state);

        state
            .alert_log
            .push_front(AlertHistoryItem::from_signal(timeframe, signal));
        state.alert_log.truncate(ALERT_LOG_CAPACITY);

        let mut tagged = signal.clone();
        tagged.reason = format!("[{}] {}", timeframe, signal.reason);
        state.signal_feed.push_back(FeedEntry {
            timeframe,
            signal: tagged,
        });
        while state.signal_feed.len() > SIGNAL_FEED_CAPACITY {
            state.signal_feed.pop_front();
        }

        if timeframe != self.primary_timeframe {
            return;
        }

        let Some(side) = signal.side() else {
            return;
        };

        state.trade_setup = match state.risk_params.validate() {
            Ok(()) => {
                let setup = compute_trade_setup(signal.price, &state.risk_params, side);
                tracing::info!(
                    symbol = %self.symbol,
                    side = %side,
                    entry = setup.entry_price,
                    stop_loss = setup.stop_loss,
                    take_profit = setup.take_profit,
                    size = setup.position_size,
                    "New trade setup"
                );
                Some(setup)
            }
            Err(e) => {
                tracing::warn!("Risk settings rejected, no trade setup: {}", e);
                None
            }
        };
    }

    /// Update the account balance from the provider's raw value
    pub fn set_account_balance(&self, raw: &str) -> Result<(), SessionError> {
        let balance = parse_balance(raw)?;
        lock(&self.state).risk_params.account_balance = balance;
        Ok(())
    }

    /// Replace the risk settings; rejected settings leave the old ones in place
    pub fn set_risk_params(&self, params: RiskParams) -> Result<(), SessionError> {
        params.validate()?;
        lock(&self.state).risk_params = params;
        Ok(())
    }

    pub fn risk_params(&self) -> RiskParams {
        lock(&self.state).risk_params
    }

    /// Alert log, most recent first
    pub fn alert_log(&self) -> Vec<AlertHistoryItem> {
        lock(&self.state).alert_log.iter().cloned().collect()
    }

    /// All-timeframe signal feed, oldest first
    pub fn signal_feed(&self) -> Vec<FeedEntry> {
        lock(&self.state).signal_feed.iter().cloned().collect()
    }

    pub fn trade_setup(&self) -> Option<TradeSetup> {
        lock(&self.state).trade_setup
    }

    /// Consume the current trade setup
    pub fn take_trade_setup(&self) -> Option<TradeSetup> {
        lock(&self.state).trade_setup.take()
    }

    /// Order for the current trade setup, if it is executable
    pub fn order_request(&self) -> Option<OrderRequest> {
        let setup = self.trade_setup()?;
        OrderRequest::from_setup(&self.symbol, &setup)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = lock(&self.state);
        SessionSnapshot {
            symbol: self.symbol.clone(),
            primary_timeframe: self.primary_timeframe,
            risk_params: state.risk_params,
            alert_log: state.alert_log.iter().cloned().collect(),
            signal_feed: state.signal_feed.iter().cloned().collect(),
            trade_setup: state.trade_setup,
        }
    }

    pub fn timeframe_view(&self, timeframe: Timeframe) -> Option<TimeframeView> {
        self.coordinators
            .get(&timeframe)
            .map(|coordinator| lock(coordinator).view())
    }

    pub fn timeframes(&self) -> Vec<Timeframe> {
        let mut timeframes: Vec<Timeframe> = self.coordinators.keys().copied().collect();
        timeframes.sort();
        timeframes
    }

    pub fn primary_timeframe(&self) -> Timeframe {
        self.primary_timeframe
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

// State stays consistent across a panic in another holder, so poisoning is ignored
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
