pub use super::value_objects::{Price, Timestamp};
use serde::{Deserialize, Serialize};

/// One open/high/low/close observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleRecord {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub timestamp: Timestamp,
}

impl CandleRecord {
    pub fn new(open: f64, high: f64, low: f64, close: f64, timestamp: i64) -> Self {
        Self {
            open: Price::from(open),
            high: Price::from(high),
            low: Price::from(low),
            close: Price::from(close),
            timestamp: Timestamp::from_millis(timestamp),
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// |close - open|
    pub fn body_size(&self) -> f64 {
        (self.close.value() - self.open.value()).abs()
    }

    /// high - low
    pub fn range(&self) -> f64 {
        (self.high.value() - self.low.value()).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doji_is_not_bullish() {
        let candle = CandleRecord::new(100.0, 110.0, 90.0, 100.0, 0);
        assert!(!candle.is_bullish());
        assert_eq!(candle.body_size(), 0.0);
        assert_eq!(candle.range(), 20.0);
    }
}
