use crate::domain::chart::{Indicator, Theme};
use crate::domain::market_data::Timeframe;
use std::collections::BTreeSet;

/// The scene's own notion of what is being shown.
///
/// Only mutated from bus handlers inside the scene core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    pub active_timeframe: Timeframe,
    pub enabled_indicators: BTreeSet<Indicator>,
    pub theme: Theme,
}

impl ViewState {
    pub fn new(active_timeframe: Timeframe) -> Self {
        Self { active_timeframe, enabled_indicators: BTreeSet::new(), theme: Theme::default() }
    }

    /// Returns true when the timeframe actually changed.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) -> bool {
        let changed = self.active_timeframe != timeframe;
        self.active_timeframe = timeframe;
        changed
    }

    /// Returns true when the enabled set changed.
    pub fn set_indicator(&mut self, indicator: Indicator, enabled: bool) -> bool {
        if enabled { self.enabled_indicators.insert(indicator) } else { self.enabled_indicators.remove(&indicator) }
    }

    pub fn is_enabled(&self, indicator: Indicator) -> bool {
        self.enabled_indicators.contains(&indicator)
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        let changed = self.theme != theme;
        self.theme = theme;
        changed
    }
}
