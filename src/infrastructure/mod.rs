pub mod rendering;
pub mod services;

#[cfg(target_arch = "wasm32")]
pub mod browser;
