//! Logging and time services behind the domain `Logger` / `TimeProvider` traits.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::logging::{LogEntry, LogLevel, Logger, TimeProvider};

/// Writes entries to the browser console (stderr on native targets).
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    pub fn new_production() -> Self {
        Self::new(LogLevel::Info)
    }

    pub fn new_development() -> Self {
        Self::new(LogLevel::Debug)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        let formatted = entry.format();

        #[cfg(target_arch = "wasm32")]
        {
            let line = wasm_bindgen::JsValue::from_str(&formatted);
            match entry.level {
                LogLevel::Trace | LogLevel::Debug => web_sys::console::debug_1(&line),
                LogLevel::Info => web_sys::console::info_1(&line),
                LogLevel::Warn => web_sys::console::warn_1(&line),
                LogLevel::Error => web_sys::console::error_1(&line),
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        eprintln!("{}", formatted);
    }
}

/// Wall clock from `Date.now()`.
#[derive(Debug, Default)]
pub struct BrowserTimeProvider;

impl BrowserTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_arch = "wasm32")]
impl TimeProvider for BrowserTimeProvider {
    fn current_timestamp(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        let date = js_sys::Date::new(&(timestamp as f64).into());
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            date.get_hours(),
            date.get_minutes(),
            date.get_seconds(),
            date.get_milliseconds()
        )
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TimeProvider for BrowserTimeProvider {
    fn current_timestamp(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        let ms_of_day = timestamp % 86_400_000;
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            ms_of_day / 3_600_000,
            (ms_of_day / 60_000) % 60,
            (ms_of_day / 1000) % 60,
            ms_of_day % 1000
        )
    }
}

/// Read side of a [`HistoryLogger`].
#[derive(Clone, Default)]
pub struct LogHistory {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogHistory {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.iter().cloned().collect()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries
            .lock()
            .map(|e| e.iter().any(|entry| entry.level == level && entry.message.contains(needle)))
            .unwrap_or(false)
    }
}

/// Keeps the last `capacity` entries and forwards everything to an optional
/// inner logger.
pub struct HistoryLogger {
    inner: Option<Box<dyn Logger>>,
    history: LogHistory,
    capacity: usize,
}

impl HistoryLogger {
    pub fn new(capacity: usize) -> Self {
        Self { inner: None, history: LogHistory::default(), capacity: capacity.max(1) }
    }

    pub fn wrapping(inner: Box<dyn Logger>, capacity: usize) -> Self {
        Self { inner: Some(inner), ..Self::new(capacity) }
    }

    pub fn history(&self) -> LogHistory {
        self.history.clone()
    }
}

impl Logger for HistoryLogger {
    fn log(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.history.entries.lock() {
            if entries.len() == self.capacity {
                entries.pop_front();
            }
            entries.push_back(entry.clone());
        }
        if let Some(inner) = &self.inner {
            inner.log(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::logging::LogComponent;

    #[test]
    fn history_is_bounded_and_keeps_the_newest() {
        let logger = HistoryLogger::new(2);
        let history = logger.history();
        logger.info(LogComponent::Infrastructure("Test"), "first");
        logger.warn(LogComponent::Infrastructure("Test"), "second");
        logger.error(LogComponent::Infrastructure("Test"), "third");

        let messages: Vec<String> = history.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["second".to_string(), "third".to_string()]);
        assert!(history.contains(LogLevel::Error, "thi"));
        assert!(!history.contains(LogLevel::Info, "first"));

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn console_logger_levels() {
        assert_eq!(ConsoleLogger::new_production().min_level(), LogLevel::Info);
        assert_eq!(ConsoleLogger::new_development().min_level(), LogLevel::Debug);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_timestamp_format() {
        let provider = BrowserTimeProvider::new();
        assert_eq!(provider.format_timestamp(3_723_004), "01:02:03.004");
    }
}
