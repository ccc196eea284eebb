use std::collections::BTreeSet;
use std::rc::Rc;
use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::domain::chart::{Indicator, Theme, TradingAction};
use crate::domain::errors::EnvironmentError;
use crate::domain::events::{EventBus, TradingEvent};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::Timeframe;
use crate::scene::Clock;
use crate::{log_debug, log_warn};

/// Key of the persisted theme preference.
pub const THEME_KEY: &str = "theme";

/// String key-value store for user preferences (local storage in the browser).
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, EnvironmentError>;
    fn set(&self, key: &str, value: &str) -> Result<(), EnvironmentError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum FeedbackKind {
    #[display(fmt = "success")]
    Success,
    #[display(fmt = "info")]
    Info,
    #[display(fmt = "danger")]
    Danger,
}

/// Transient message shown after an action.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackBanner {
    pub kind: FeedbackKind,
    pub message: String,
    pub expires_at_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub feedback_duration_ms: f64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { feedback_duration_ms: 2000.0 }
    }
}

/// UI-local state of the controls. Every action first updates this state and
/// then publishes the matching event, so the panel always shows what was
/// last published.
pub struct ControlPanel {
    bus: EventBus,
    preferences: Rc<dyn PreferenceStore>,
    clock: Rc<dyn Clock>,
    config: PanelConfig,
    timeframe: Timeframe,
    indicators: BTreeSet<Indicator>,
    theme: Theme,
    feedback: Option<FeedbackBanner>,
}

impl ControlPanel {
    /// Reads the stored theme once; missing, unknown or unreadable values
    /// fall back to dark.
    pub fn new(bus: EventBus, preferences: Rc<dyn PreferenceStore>, clock: Rc<dyn Clock>, config: PanelConfig) -> Self {
        let theme = match preferences.get(THEME_KEY) {
            Ok(Some(value)) => Theme::from_str(&value).unwrap_or_else(|_| {
                log_warn!(LogComponent::Application("ControlPanel"), "unknown stored theme '{}'", value);
                Theme::Dark
            }),
            Ok(None) => Theme::Dark,
            Err(e) => {
                log_warn!(LogComponent::Application("ControlPanel"), "{}", e);
                Theme::Dark
            }
        };

        Self {
            bus,
            preferences,
            clock,
            config,
            timeframe: Timeframe::Short,
            indicators: BTreeSet::new(),
            theme,
            feedback: None,
        }
    }

    pub fn select_timeframe(&mut self, timeframe: Timeframe) {
        self.timeframe = timeframe;
        self.show_feedback(FeedbackKind::Success, format!("Timeframe changed to {}", timeframe));
        self.bus.publish(TradingEvent::TimeframeChange { timeframe });
    }

    /// Flip one indicator and return its new state.
    pub fn toggle_indicator(&mut self, indicator: Indicator) -> bool {
        let enabled = !self.indicators.contains(&indicator);
        if enabled {
            self.indicators.insert(indicator);
        } else {
            self.indicators.remove(&indicator);
        }
        let verb = if enabled { "added" } else { "removed" };
        self.show_feedback(FeedbackKind::Info, format!("{} {}", indicator, verb));
        self.bus.publish(TradingEvent::IndicatorToggle { indicator, enabled });
        enabled
    }

    pub fn place_order(&mut self, action: TradingAction) {
        let kind = match action {
            TradingAction::Buy => FeedbackKind::Success,
            TradingAction::Sell => FeedbackKind::Danger,
        };
        self.show_feedback(kind, format!("{} order placed", action));
        self.bus.publish(TradingEvent::TradingAction { action });
    }

    /// Switch theme, persist it and publish it. Storage failures are logged.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(e) = self.preferences.set(THEME_KEY, self.theme.as_ref()) {
            log_warn!(LogComponent::Application("ControlPanel"), "theme not saved: {}", e);
        }
        self.bus.publish(TradingEvent::ThemeChange { theme: self.theme });
        self.theme
    }

    /// Re-publish the full panel state, e.g. once a scene has just mounted.
    pub fn sync_scene(&self) {
        self.bus.publish(TradingEvent::TimeframeChange { timeframe: self.timeframe });
        for indicator in self.indicators.iter().copied() {
            self.bus.publish(TradingEvent::IndicatorToggle { indicator, enabled: true });
        }
        self.bus.publish(TradingEvent::ThemeChange { theme: self.theme });
        log_debug!(LogComponent::Application("ControlPanel"), "panel state re-published");
    }

    /// Clear the banner once its time is up. Returns true if it was cleared.
    pub fn dismiss_expired_feedback(&mut self) -> bool {
        let now = self.clock.now_ms();
        match &self.feedback {
            Some(banner) if now >= banner.expires_at_ms => {
                self.feedback = None;
                true
            }
            _ => false,
        }
    }

    fn show_feedback(&mut self, kind: FeedbackKind, message: String) {
        get_logger().info(LogComponent::Application("ControlPanel"), &message);
        self.feedback =
            Some(FeedbackBanner { kind, message, expires_at_ms: self.clock.now_ms() + self.config.feedback_duration_ms });
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn is_enabled(&self, indicator: Indicator) -> bool {
        self.indicators.contains(&indicator)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Banner still on screen at the current time.
    pub fn feedback(&self) -> Option<&FeedbackBanner> {
        let now = self.clock.now_ms();
        self.feedback.as_ref().filter(|banner| now < banner.expires_at_ms)
    }

    pub fn feedback_duration_ms(&self) -> f64 {
        self.config.feedback_duration_ms
    }
}
