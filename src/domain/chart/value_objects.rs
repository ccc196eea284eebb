use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Value Object - Decorative indicator overlay.
///
/// The curves are fixed linear transforms of the close price, not real
/// technical analysis.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Indicator {
    #[display(fmt = "MA")]
    #[strum(serialize = "MovingAverage", serialize = "MA")]
    #[serde(rename = "MovingAverage", alias = "MA")]
    MovingAverage,
    #[display(fmt = "RSI")]
    #[strum(serialize = "RSI")]
    #[serde(rename = "RSI")]
    Rsi,
    #[display(fmt = "MACD")]
    #[strum(serialize = "MACD")]
    #[serde(rename = "MACD")]
    Macd,
}

/// Linear transform `close * scale + offset` and colour of one curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveStyle {
    pub scale: f32,
    pub offset: f32,
    pub color: u32,
}

impl Indicator {
    pub fn curve_style(&self) -> CurveStyle {
        match self {
            Indicator::MovingAverage => CurveStyle { scale: 0.01, offset: 0.2, color: 0x00ffff },
            Indicator::Rsi => CurveStyle { scale: 0.008, offset: -0.3, color: 0xff00ff },
            Indicator::Macd => CurveStyle { scale: 0.006, offset: -0.5, color: 0xffff00 },
        }
    }

    /// Moving average is decorated with glow points along its curve.
    pub fn has_glow(&self) -> bool {
        matches!(self, Indicator::MovingAverage)
    }
}

/// Value Object - Colour scheme
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    #[display(fmt = "dark")]
    Dark,
    #[display(fmt = "light")]
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Background, fog and ground tint.
    pub fn background(&self) -> u32 {
        match self {
            Theme::Dark => 0x111827,
            Theme::Light => 0xf0f4f8,
        }
    }
}

/// Value Object - Simulated order side
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum TradingAction {
    #[display(fmt = "BUY")]
    Buy,
    #[display(fmt = "SELL")]
    Sell,
}

impl TradingAction {
    pub fn burst_color(&self) -> u32 {
        match self {
            TradingAction::Buy => 0x00ff44,
            TradingAction::Sell => 0xff4400,
        }
    }

    /// Side length multiplier of the particle cube.
    pub fn burst_scale(&self) -> f32 {
        match self {
            TradingAction::Buy => 1.2,
            TradingAction::Sell => 1.0,
        }
    }
}

/// Value Object - Camera dolly direction
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    #[display(fmt = "in")]
    In,
    #[display(fmt = "out")]
    Out,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn indicator_accepts_short_and_long_names() {
        assert_eq!(Indicator::from_str("MovingAverage").unwrap(), Indicator::MovingAverage);
        assert_eq!(Indicator::from_str("ma").unwrap(), Indicator::MovingAverage);
        assert_eq!(Indicator::from_str("rsi").unwrap(), Indicator::Rsi);
        assert!(Indicator::from_str("Bollinger").is_err());
    }

    #[test]
    fn theme_toggle_is_an_involution() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
        assert_eq!(Theme::from_str("LIGHT").unwrap(), Theme::Light);
    }

    #[test]
    fn sell_burst_is_smaller_than_buy() {
        assert!(TradingAction::Sell.burst_scale() < TradingAction::Buy.burst_scale());
        assert_eq!(TradingAction::Buy.to_string(), "BUY");
    }
}
