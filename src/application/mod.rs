//! Application layer: the control panel and the mount lifecycle.

pub mod control_panel;
pub mod mount;

pub use control_panel::*;
pub use mount::*;
