use web_sys::{Element, Storage};

use crate::application::{FullscreenHost, PreferenceStore};
use crate::domain::errors::EnvironmentError;
use crate::scene::Clock;

/// `performance.now()`, falling back to `Date.now()`.
#[derive(Debug, Default)]
pub struct PerformanceClock;

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }
}

/// Preferences in `window.localStorage`.
#[derive(Debug, Default)]
pub struct LocalStoragePreferences;

impl LocalStoragePreferences {
    fn storage() -> Result<Storage, EnvironmentError> {
        let window = web_sys::window().ok_or(EnvironmentError::WindowUnavailable)?;
        window
            .local_storage()
            .map_err(|e| EnvironmentError::StorageUnavailable(format!("{:?}", e)))?
            .ok_or_else(|| EnvironmentError::StorageUnavailable("localStorage is disabled".to_string()))
    }
}

impl PreferenceStore for LocalStoragePreferences {
    fn get(&self, key: &str) -> Result<Option<String>, EnvironmentError> {
        Self::storage()?.get_item(key).map_err(|e| EnvironmentError::StorageUnavailable(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EnvironmentError> {
        Self::storage()?.set_item(key, value).map_err(|e| EnvironmentError::StorageUnavailable(format!("{:?}", e)))
    }
}

/// Fullscreen API on one element.
pub struct BrowserFullscreen {
    element: Element,
}

impl BrowserFullscreen {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

impl FullscreenHost for BrowserFullscreen {
    fn is_fullscreen(&self) -> bool {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.fullscreen_element())
            .is_some()
    }

    fn request(&self) -> Result<(), EnvironmentError> {
        self.element
            .request_fullscreen()
            .map_err(|e| EnvironmentError::FullscreenRejected(format!("{:?}", e)))
    }

    fn exit(&self) -> Result<(), EnvironmentError> {
        let document = web_sys::window().and_then(|w| w.document()).ok_or(EnvironmentError::WindowUnavailable)?;
        document.exit_fullscreen();
        Ok(())
    }
}
