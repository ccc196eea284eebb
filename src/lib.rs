//! Interactive 3D candlestick trading scene for the browser.
//!
//! A control panel publishes events on an injected [`domain::events::EventBus`];
//! the scene core subscribes, rebuilds its chart group and renders it through
//! WebGPU. Everything outside `app`, `presentation` and
//! `infrastructure::browser` runs on native targets as well, which is how the
//! integration tests drive it through the `testing` doubles (enabled by the
//! `testing` feature).

use wasm_bindgen::prelude::*;

use crate::domain::logging::{LogComponent, get_logger};

pub mod application;
pub mod domain;
pub mod ecs;
pub mod infrastructure;
pub mod scene;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod view_state;

#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod presentation;

/// Install the panic hook, console logger and browser clock.
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let logger = if cfg!(debug_assertions) {
        infrastructure::services::ConsoleLogger::new_development()
    } else {
        infrastructure::services::ConsoleLogger::new_production()
    };
    domain::logging::init_logger(Box::new(logger));
    domain::logging::init_time_provider(Box::new(infrastructure::services::BrowserTimeProvider::new()));

    get_logger().info(LogComponent::Presentation("Initialize"), "trading scene module initialized");
}
