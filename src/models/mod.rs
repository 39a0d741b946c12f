use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OHLCV candle for one period of one timeframe
///
/// `time` is the period-open timestamp in milliseconds. A candle with
/// `is_final == false` is the in-progress period and may be replaced by
/// later updates carrying the same `time`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub is_final: bool,
}

impl Candle {
    /// Open time as a UTC datetime (None if out of chrono's range)
    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time)
    }
}

/// Candle period length defining one independent data stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    M1,
    M3,
    M5,
    M15,
    M30,
    H1,
    H2,
    H4,
    H6,
    H12,
    D1,
    W1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 12] = [
        Timeframe::M1,
        Timeframe::M3,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H2,
        Timeframe::H4,
        Timeframe::H6,
        Timeframe::H12,
        Timeframe::D1,
        Timeframe::W1,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M3 => "3m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H2 => "2h",
            Timeframe::H4 => "4h",
            Timeframe::H6 => "6h",
            Timeframe::H12 => "12h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
        }
    }

    /// Period length in milliseconds
    pub fn duration_ms(&self) -> i64 {
        const MINUTE: i64 = 60_000;
        match self {
            Timeframe::M1 => MINUTE,
            Timeframe::M3 => 3 * MINUTE,
            Timeframe::M5 => 5 * MINUTE,
            Timeframe::M15 => 15 * MINUTE,
            Timeframe::M30 => 30 * MINUTE,
            Timeframe::H1 => 60 * MINUTE,
            Timeframe::H2 => 120 * MINUTE,
            Timeframe::H4 => 240 * MINUTE,
            Timeframe::H6 => 360 * MINUTE,
            Timeframe::H12 => 720 * MINUTE,
            Timeframe::D1 => 1_440 * MINUTE,
            Timeframe::W1 => 10_080 * MINUTE,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown timeframe '{0}'")]
pub struct UnknownTimeframe(pub String);

impl FromStr for Timeframe {
    type Err = UnknownTimeframe;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.label() == s)
            .ok_or_else(|| UnknownTimeframe(s.to_string()))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = UnknownTimeframe;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.label().to_string()
    }
}

/// Classification produced by the signal detector
///
/// `None` is the "no signal" sentinel; it is never logged or propagated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
    None,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::Buy => f.write_str("BUY"),
            SignalType::Sell => f.write_str("SELL"),
            SignalType::None => f.write_str("NONE"),
        }
    }
}

/// Trading signal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub price: f64,
    pub time: i64,
    pub reason: String,
}

impl Signal {
    pub fn none(price: f64, time: i64) -> Self {
        Self {
            signal_type: SignalType::None,
            price,
            time,
            reason: String::new(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.signal_type == SignalType::None
    }

    /// Order side implied by the signal, if it is actionable
    pub fn side(&self) -> Option<TradeSide> {
        match self.signal_type {
            SignalType::Buy => Some(TradeSide::Buy),
            SignalType::Sell => Some(TradeSide::Sell),
            SignalType::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => f.write_str("BUY"),
            TradeSide::Sell => f.write_str("SELL"),
        }
    }
}

/// Entry in the bounded alert log (most recent first)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertHistoryItem {
    /// `<timeframe>-<time>`, unique per emitted signal
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub timeframe: Timeframe,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub price: f64,
    pub reason: String,
}

impl AlertHistoryItem {
    pub fn alert_id(timeframe: Timeframe, time: i64) -> String {
        format!("{}-{}", timeframe, time)
    }

    pub fn from_signal(timeframe: Timeframe, signal: &Signal) -> Self {
        Self {
            id: Self::alert_id(timeframe, signal.time),
            timestamp: DateTime::from_timestamp_millis(signal.time).unwrap_or_default(),
            timeframe,
            signal_type: signal.signal_type,
            price: signal.price,
            reason: signal.reason.clone(),
        }
    }
}

/// Entry in the rolling all-timeframe signal feed (oldest first)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedEntry {
    pub timeframe: Timeframe,
    pub signal: Signal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_round_trip_labels() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.label().parse::<Timeframe>().unwrap(), tf);
        }
        assert!("7m".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_candle_open_time() {
        let candle = Candle {
            time: 1_700_000_000_000,
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 0.0,
            is_final: true,
        };
        let open = candle.open_time().unwrap();
        assert_eq!(open.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_timeframe_serde_uses_label() {
        let json = serde_json::to_string(&Timeframe::H4).unwrap();
        assert_eq!(json, "\"4h\"");
        let tf: Timeframe = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(tf, Timeframe::M15);
    }

    #[test]
    fn test_timeframe_durations_are_ordered() {
        for pair in Timeframe::ALL.windows(2) {
            assert!(pair[0].duration_ms() < pair[1].duration_ms());
        }
        assert_eq!(Timeframe::M5.duration_ms(), 300_000);
    }

    #[test]
    fn test_signal_side() {
        let mut signal = Signal::none(100.0, 0);
        assert!(signal.is_none());
        assert_eq!(signal.side(), None);

        signal.signal_type = SignalType::Sell;
        assert_eq!(signal.side(), Some(TradeSide::Sell));
    }

    #[test]
    fn test_alert_item_id() {
        let signal = Signal {
            signal_type: SignalType::Buy,
            price: 101.5,
            time: 1_700_000_000_000,
            reason: "test".to_string(),
        };
        let item = AlertHistoryItem::from_signal(Timeframe::M5, &signal);

        assert_eq!(item.id, "5m-1700000000000");
        assert_eq!(item.timestamp.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(item.signal_type, SignalType::Buy);
    }
}
