use strum::IntoEnumIterator;
use web_sys::CustomEvent;

use super::listeners::{ListenerOptions, WindowListener, window_listener};
use crate::domain::errors::EnvironmentError;
use crate::domain::events::{EventBus, EventKind, TradingEvent};
use crate::domain::logging::LogComponent;
use crate::{log_debug, log_warn};

/// Republishes `trading-*` `CustomEvent`s from `window` on the bus, so
/// non-Rust page code can drive the scene.
pub struct WindowEventBridge {
    listeners: Vec<WindowListener>,
}

impl WindowEventBridge {
    pub fn attach(bus: &EventBus) -> Result<Self, EnvironmentError> {
        let mut listeners = Vec::new();
        for kind in EventKind::iter() {
            let bus = bus.clone();
            let listener = window_listener::<CustomEvent>(
                &kind.window_event_name(),
                &ListenerOptions::default(),
                move |event| {
                    let detail = js_sys::JSON::stringify(&event.detail()).ok().and_then(|s| s.as_string());
                    match TradingEvent::from_window_detail(kind, detail.as_deref()) {
                        Ok(decoded) => bus.publish(decoded),
                        Err(e) => {
                            log_warn!(LogComponent::Infrastructure("WindowBridge"), "ignored: {}", e);
                        }
                    }
                },
            )?;
            listeners.push(listener);
        }
        log_debug!(LogComponent::Infrastructure("WindowBridge"), "{} window events bridged", listeners.len());
        Ok(Self { listeners })
    }

    pub fn detach(self) {
        for listener in self.listeners {
            listener.remove();
        }
    }
}
