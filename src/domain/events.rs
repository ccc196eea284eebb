use crate::domain::chart::{Indicator, Theme, TradingAction, ZoomDirection};
use crate::domain::errors::EventError;
use crate::domain::logging::LogComponent;
use crate::domain::market_data::Timeframe;
use crate::log_trace;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString};

/// Names of the events carried by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum EventKind {
    TimeframeChange,
    IndicatorToggle,
    TradingAction,
    ThemeChange,
    CameraZoom,
    CameraReset,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::TimeframeChange => "timeframe-change",
            EventKind::IndicatorToggle => "indicator-toggle",
            EventKind::TradingAction => "trading-action",
            EventKind::ThemeChange => "theme-change",
            EventKind::CameraZoom => "camera-zoom",
            EventKind::CameraReset => "camera-reset",
        }
    }

    /// Name of the `CustomEvent` dispatched on `window` for this kind.
    pub fn window_event_name(&self) -> String {
        let name = self.name();
        if name.starts_with("trading-") { name.to_string() } else { format!("trading-{}", name) }
    }
}

/// Immutable notification published by the controls and consumed by the scene.
///
/// Serialized as `{"type": "<name>", "detail": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "kebab-case")]
pub enum TradingEvent {
    TimeframeChange { timeframe: Timeframe },
    IndicatorToggle { indicator: Indicator, enabled: bool },
    TradingAction { action: TradingAction },
    ThemeChange { theme: Theme },
    CameraZoom { direction: ZoomDirection },
    CameraReset {},
}

impl TradingEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TradingEvent::TimeframeChange { .. } => EventKind::TimeframeChange,
            TradingEvent::IndicatorToggle { .. } => EventKind::IndicatorToggle,
            TradingEvent::TradingAction { .. } => EventKind::TradingAction,
            TradingEvent::ThemeChange { .. } => EventKind::ThemeChange,
            TradingEvent::CameraZoom { .. } => EventKind::CameraZoom,
            TradingEvent::CameraReset {} => EventKind::CameraReset,
        }
    }

    /// Decode an event from its name and JSON detail. A `null` detail is
    /// treated as an empty object.
    pub fn from_named(name: &str, detail: serde_json::Value) -> Result<Self, EventError> {
        let kind = EventKind::from_str(name).map_err(|_| EventError::UnknownEvent(name.to_string()))?;
        let detail = if detail.is_null() { serde_json::json!({}) } else { detail };
        let envelope = serde_json::json!({ "type": kind.name(), "detail": detail });
        serde_json::from_value(envelope).map_err(|e| EventError::MalformedPayload {
            event: kind.name().to_string(),
            reason: e.to_string(),
        })
    }

    /// Decode the JSON text of a window `CustomEvent` detail. Missing or
    /// `undefined` details count as `null`.
    pub fn from_window_detail(kind: EventKind, detail_json: Option<&str>) -> Result<Self, EventError> {
        let detail = match detail_json {
            None | Some("") | Some("undefined") => serde_json::Value::Null,
            Some(text) => serde_json::from_str(text).map_err(|e| EventError::MalformedPayload {
                event: kind.name().to_string(),
                reason: e.to_string(),
            })?,
        };
        Self::from_named(kind.name(), detail)
    }
}

type Handler = Rc<dyn Fn(&TradingEvent)>;

struct HandlerEntry {
    id: u64,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    handlers: RefCell<Vec<HandlerEntry>>,
    queue: RefCell<VecDeque<TradingEvent>>,
    dispatching: Cell<bool>,
    next_id: Cell<u64>,
}

impl BusInner {
    fn is_subscribed(&self, id: u64) -> bool {
        self.handlers.borrow().iter().any(|entry| entry.id == id)
    }

    fn remove(&self, id: u64) {
        self.handlers.borrow_mut().retain(|entry| entry.id != id);
    }
}

/// Resets the dispatch flag even if a handler unwinds.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// In-process publish/subscribe channel shared by the controls and the scene.
///
/// Delivery is synchronous and in subscription order. An event published from
/// inside a handler is queued and delivered once the current event has reached
/// every subscriber.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&TradingEvent) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.handlers.borrow_mut().push(HandlerEntry { id, kind, handler: Rc::new(handler) });
        Subscription { id, bus: Rc::downgrade(&self.inner) }
    }

    pub fn publish(&self, event: TradingEvent) {
        self.inner.queue.borrow_mut().push_back(event);
        if self.inner.dispatching.replace(true) {
            return;
        }
        let _guard = DispatchGuard(&self.inner.dispatching);

        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(event) = next else { break };
            log_trace!(LogComponent::Domain("EventBus"), "dispatching {}", event.kind().name());

            let targets: Vec<(u64, Handler)> = self
                .inner
                .handlers
                .borrow()
                .iter()
                .filter(|entry| entry.kind == event.kind())
                .map(|entry| (entry.id, entry.handler.clone()))
                .collect();

            for (id, handler) in targets {
                // a handler earlier in this round may have unsubscribed it
                if self.inner.is_subscribed(id) {
                    handler(&event);
                }
            }
        }
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.inner.handlers.borrow().iter().filter(|entry| entry.kind == kind).count()
    }

    pub fn total_subscribers(&self) -> usize {
        self.inner.handlers.borrow().len()
    }
}

/// Registration handle. Dropping it removes the handler.
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn named_event_decodes_detail() {
        let event = TradingEvent::from_named("indicator-toggle", json!({"indicator": "MA", "enabled": true}))
            .unwrap();
        assert_eq!(event, TradingEvent::IndicatorToggle { indicator: Indicator::MovingAverage, enabled: true });
    }

    #[test]
    fn null_detail_is_an_empty_object() {
        let event = TradingEvent::from_named("camera-reset", serde_json::Value::Null).unwrap();
        assert_eq!(event.kind(), EventKind::CameraReset);
    }

    #[test]
    fn unknown_names_and_keys_are_rejected() {
        assert_eq!(
            TradingEvent::from_named("explode", json!({})),
            Err(EventError::UnknownEvent("explode".to_string()))
        );
        assert!(matches!(
            TradingEvent::from_named("timeframe-change", json!({"timeframe": "2W"})),
            Err(EventError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn window_names_keep_a_single_prefix() {
        assert_eq!(EventKind::TimeframeChange.window_event_name(), "trading-timeframe-change");
        assert_eq!(EventKind::TradingAction.window_event_name(), "trading-action");
        assert_eq!(EventKind::CameraReset.window_event_name(), "trading-camera-reset");
    }

    #[test]
    fn window_detail_text_is_decoded() {
        let event = TradingEvent::from_window_detail(EventKind::ThemeChange, Some(r#"{"theme":"light"}"#)).unwrap();
        assert_eq!(event, TradingEvent::ThemeChange { theme: Theme::Light });
        assert!(TradingEvent::from_window_detail(EventKind::CameraReset, None).is_ok());
        assert!(matches!(
            TradingEvent::from_window_detail(EventKind::CameraZoom, Some("{not json")),
            Err(EventError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let sub = bus.subscribe(EventKind::CameraReset, move |_| counter.set(counter.get() + 1));
        bus.publish(TradingEvent::CameraReset {});
        sub.unsubscribe();
        bus.publish(TradingEvent::CameraReset {});
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.total_subscribers(), 0);
    }
}
