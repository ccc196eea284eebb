use leptos::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::app::App;
use crate::domain::errors::{AppError, EnvironmentError, SceneError};
use crate::domain::logging::{LogComponent, get_logger};
use crate::scene::SceneConfig;

/// Mount the trading scene app into the element with id `root_id`.
///
/// `config_json` optionally overrides scene settings; omitted fields keep
/// their defaults.
#[wasm_bindgen(js_name = mountTradingScene)]
pub fn mount_trading_scene(root_id: &str, config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(json) if !json.trim().is_empty() => SceneConfig::from_json(json)?,
        _ => SceneConfig::default(),
    };

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(AppError::Environment(EnvironmentError::WindowUnavailable))?;
    let root = document
        .get_element_by_id(root_id)
        .ok_or_else(|| AppError::Scene(SceneError::SurfaceUnavailable(format!("no element with id '{}'", root_id))))?
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| AppError::Scene(SceneError::SurfaceUnavailable(format!("'{}' is not an HTML element", root_id))))?;

    get_logger().info(LogComponent::Presentation("WasmApi"), &format!("mounting trading scene into #{}", root_id));
    mount_to(root, move || view! { <App config=config /> });
    Ok(())
}
