//! Browser implementations of the host capabilities.

mod bridge;
mod listeners;
mod platform;
mod surface;

pub use bridge::WindowEventBridge;
pub use listeners::{ListenerOptions, WindowListener, window_listener};
pub use platform::{BrowserFullscreen, LocalStoragePreferences, PerformanceClock};
pub use surface::{AnimationFrameLoop, CanvasSurface};
