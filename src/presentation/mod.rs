//! JavaScript-facing entry points.

pub mod wasm_api;
