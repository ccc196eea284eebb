//! Domain layer: value objects, events and the ambient logging/error types.

pub mod chart;
pub mod errors;
pub mod events;
pub mod logging;
pub mod market_data;

pub use chart::{Indicator, Theme, TradingAction, ZoomDirection};
pub use errors::{AppError, EnvironmentError, EventError, ResourceError, SceneError, SceneResult};
pub use events::{EventBus, EventKind, Subscription, TradingEvent};
pub use market_data::{CandleRecord, SampleDataStore, Timeframe};
