use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Event};

use crate::domain::errors::{EnvironmentError, SceneError};
use crate::scene::ListenerGuard;

#[derive(Clone, Debug)]
pub struct ListenerOptions {
    pub passive: bool,
    pub capture: bool,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self { passive: true, capture: false }
    }
}

/// Listener registered on `window`; removed explicitly or when dropped.
pub struct WindowListener {
    event_name: String,
    callback: Option<Closure<dyn FnMut(Event)>>,
    capture: bool,
}

impl WindowListener {
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn remove(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        let Some(callback) = self.callback.take() else { return };
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback_and_bool(
                &self.event_name,
                callback.as_ref().unchecked_ref(),
                self.capture,
            );
        }
    }
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        self.detach();
    }
}

impl ListenerGuard for WindowListener {
    fn remove(mut self: Box<Self>) {
        self.detach();
    }
}

pub fn window_listener<E>(
    event_name: &str,
    options: &ListenerOptions,
    mut cb: impl FnMut(E) + 'static,
) -> Result<WindowListener, EnvironmentError>
where
    E: JsCast + 'static,
{
    let window = web_sys::window().ok_or(EnvironmentError::WindowUnavailable)?;

    let opts = AddEventListenerOptions::new();
    opts.set_passive(options.passive);
    opts.set_capture(options.capture);

    let callback = Closure::wrap(Box::new(move |ev: Event| {
        if let Ok(ev) = ev.dyn_into::<E>() {
            cb(ev);
        }
    }) as Box<dyn FnMut(Event)>);

    window
        .add_event_listener_with_callback_and_add_event_listener_options(
            event_name,
            callback.as_ref().unchecked_ref(),
            &opts,
        )
        .map_err(|_| EnvironmentError::ListenerRejected(event_name.to_string()))?;

    Ok(WindowListener { event_name: event_name.to_string(), callback: Some(callback), capture: options.capture })
}

pub(crate) fn listener_error(error: EnvironmentError) -> SceneError {
    SceneError::SurfaceUnavailable(error.to_string())
}
