use crate::models::Candle;
use std::collections::VecDeque;

pub const DEFAULT_WINDOW_CAPACITY: usize = 400;

/// How a candle was applied to the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOp {
    /// New period appended (oldest evicted if over capacity)
    Append,
    /// In-progress period at `time` replaced in place
    Update { time: i64 },
}

/// Bounded, time-ordered rolling window of candles for one timeframe
#[derive(Debug, Clone)]
pub struct CandleWindow {
    candles: VecDeque<Candle>,
    capacity: usize,
}

impl CandleWindow {
    /// Create a new candle window
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of candles to keep (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            candles: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Apply a candle update
    ///
    /// A candle whose `time` equals the last candle's replaces it; anything
    /// else is appended, evicting the oldest candle once over capacity.
    /// Out-of-order times are appended as-is; ordering is the feed's job.
    pub fn apply(&mut self, candle: Candle) -> WindowOp {
        if let Some(last) = self.candles.back_mut() {
            if last.time == candle.time {
                *last = candle;
                return WindowOp::Update { time: candle.time };
            }
        }

        self.candles.push_back(candle);

        // Remove oldest if exceeds max
        while self.candles.len() > self.capacity {
            self.candles.pop_front();
        }

        WindowOp::Append
    }

    /// Candles oldest-first as one contiguous slice
    pub fn candles(&mut self) -> &[Candle] {
        self.candles.make_contiguous()
    }

    /// Copy of the window, oldest first
    pub fn to_vec(&self) -> Vec<Candle> {
        self.candles.iter().copied().collect()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CandleWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}
