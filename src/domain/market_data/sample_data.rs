use super::{CandleRecord, Timeframe};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

static BUILTIN: Lazy<SampleDataStore> = Lazy::new(|| {
    SampleDataStore::from_series([
        (
            Timeframe::Short,
            vec![
                CandleRecord::new(100.0, 150.0, 90.0, 120.0, 1_635_724_800_000),
                CandleRecord::new(120.0, 160.0, 110.0, 140.0, 1_635_728_400_000),
                CandleRecord::new(140.0, 180.0, 130.0, 160.0, 1_635_732_000_000),
                CandleRecord::new(160.0, 200.0, 150.0, 180.0, 1_635_735_600_000),
                CandleRecord::new(180.0, 220.0, 170.0, 200.0, 1_635_739_200_000),
            ],
        ),
        (
            Timeframe::Medium,
            vec![
                CandleRecord::new(100.0, 170.0, 90.0, 150.0, 1_635_724_800_000),
                CandleRecord::new(150.0, 200.0, 140.0, 170.0, 1_635_739_200_000),
                CandleRecord::new(170.0, 220.0, 160.0, 190.0, 1_635_753_600_000),
            ],
        ),
        (
            Timeframe::Long,
            vec![
                CandleRecord::new(100.0, 200.0, 90.0, 180.0, 1_635_724_800_000),
                CandleRecord::new(180.0, 250.0, 170.0, 210.0, 1_635_811_200_000),
            ],
        ),
    ])
});

/// Static mapping from timeframe to its ordered candle sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleDataStore {
    series: BTreeMap<Timeframe, Vec<CandleRecord>>,
}

impl SampleDataStore {
    /// The hard-coded demo dataset.
    pub fn builtin() -> &'static SampleDataStore {
        &BUILTIN
    }

    pub fn from_series(series: impl IntoIterator<Item = (Timeframe, Vec<CandleRecord>)>) -> Self {
        Self { series: series.into_iter().collect() }
    }

    pub fn candles(&self, timeframe: Timeframe) -> Option<&[CandleRecord]> {
        self.series.get(&timeframe).map(Vec::as_slice)
    }

    /// True when the timeframe has a non-empty sequence.
    pub fn has_data(&self, timeframe: Timeframe) -> bool {
        self.candles(timeframe).is_some_and(|candles| !candles.is_empty())
    }

    /// First timeframe with data, used as the initial view.
    pub fn first_populated(&self) -> Option<Timeframe> {
        self.series.iter().find(|(_, candles)| !candles.is_empty()).map(|(tf, _)| *tf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sequences_have_expected_lengths() {
        let store = SampleDataStore::builtin();
        assert_eq!(store.candles(Timeframe::Short).map(<[_]>::len), Some(5));
        assert_eq!(store.candles(Timeframe::Medium).map(<[_]>::len), Some(3));
        assert_eq!(store.candles(Timeframe::Long).map(<[_]>::len), Some(2));
    }

    #[test]
    fn empty_sequence_is_not_populated() {
        let store = SampleDataStore::from_series([(Timeframe::Short, Vec::new())]);
        assert!(!store.has_data(Timeframe::Short));
        assert_eq!(store.first_populated(), None);
    }
}
