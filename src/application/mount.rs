use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::domain::chart::ZoomDirection;
use crate::domain::errors::{EnvironmentError, SceneError};
use crate::domain::events::{EventBus, TradingEvent};
use crate::domain::logging::{LogComponent, get_logger};
use crate::scene::{Clock, SceneHandle};
use crate::{log_info, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountPhase {
    /// Mounted, no display surface yet.
    Pending,
    /// Surface exists, scene being constructed.
    Loading,
    Ready,
    /// Construction failed; a static fallback is shown.
    Unavailable,
    Unmounted,
}

/// Host fullscreen primitives.
pub trait FullscreenHost {
    fn is_fullscreen(&self) -> bool;
    fn request(&self) -> Result<(), EnvironmentError>;
    fn exit(&self) -> Result<(), EnvironmentError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Overlay controls hide this long after the last pointer movement.
    pub controls_hide_ms: f64,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self { controls_hide_ms: 3000.0 }
    }
}

/// Lifecycle of the viewport container around the scene.
///
/// Constructs the scene at most once per mount and tears it down exactly
/// once on unmount. Camera utilities go out as bus events.
pub struct MountController {
    bus: EventBus,
    fullscreen_host: Rc<dyn FullscreenHost>,
    clock: Rc<dyn Clock>,
    config: MountConfig,
    phase: MountPhase,
    scene: Option<SceneHandle>,
    init_attempts: u32,
    teardowns: u32,
    fullscreen: bool,
    controls_visible_until: Option<f64>,
    failure: Option<String>,
}

impl MountController {
    pub fn new(bus: EventBus, fullscreen_host: Rc<dyn FullscreenHost>, clock: Rc<dyn Clock>, config: MountConfig) -> Self {
        let fullscreen = fullscreen_host.is_fullscreen();
        Self {
            bus,
            fullscreen_host,
            clock,
            config,
            phase: MountPhase::Pending,
            scene: None,
            init_attempts: 0,
            teardowns: 0,
            fullscreen,
            controls_visible_until: None,
            failure: None,
        }
    }

    pub fn begin_loading(&mut self) {
        if self.phase == MountPhase::Pending {
            self.phase = MountPhase::Loading;
        }
    }

    /// Construct the scene through `init`. Ignored after the first attempt
    /// and after unmount.
    pub fn mount<F>(&mut self, init: F) -> MountPhase
    where
        F: FnOnce(&EventBus) -> Result<SceneHandle, SceneError>,
    {
        if self.init_attempts > 0 || !matches!(self.phase, MountPhase::Pending | MountPhase::Loading) {
            log_warn!(LogComponent::Application("Mount"), "scene construction skipped in phase {:?}", self.phase);
            return self.phase;
        }
        self.init_attempts += 1;
        self.phase = MountPhase::Loading;

        match init(&self.bus) {
            Ok(handle) => {
                self.scene = Some(handle);
                self.phase = MountPhase::Ready;
                log_info!(LogComponent::Application("Mount"), "3D view ready");
            }
            Err(e) => self.fail(e),
        }
        self.phase
    }

    /// Record a construction failure reported outside [`MountController::mount`],
    /// e.g. by the async renderer factory.
    pub fn fail(&mut self, error: SceneError) {
        if matches!(self.phase, MountPhase::Unmounted | MountPhase::Ready) {
            return;
        }
        get_logger().error(LogComponent::Application("Mount"), &format!("3D view unavailable: {}", error));
        self.failure = Some(error.to_string());
        self.phase = MountPhase::Unavailable;
    }

    pub fn unmount(&mut self) {
        if self.phase == MountPhase::Unmounted {
            return;
        }
        if let Some(mut scene) = self.scene.take() {
            scene.teardown();
            self.teardowns += 1;
        }
        self.controls_visible_until = None;
        self.phase = MountPhase::Unmounted;
    }

    pub fn zoom(&self, direction: ZoomDirection) {
        if self.phase != MountPhase::Unmounted {
            self.bus.publish(TradingEvent::CameraZoom { direction });
        }
    }

    pub fn reset_view(&self) {
        if self.phase != MountPhase::Unmounted {
            self.bus.publish(TradingEvent::CameraReset {});
        }
    }

    /// Ask the host to enter or leave fullscreen. The state itself follows
    /// [`MountController::on_fullscreen_change`].
    pub fn toggle_fullscreen(&self) -> bool {
        let result = if self.fullscreen_host.is_fullscreen() {
            self.fullscreen_host.exit()
        } else {
            self.fullscreen_host.request()
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                log_warn!(LogComponent::Application("Mount"), "{}", e);
                false
            }
        }
    }

    pub fn on_fullscreen_change(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub fn pointer_moved(&mut self) {
        self.controls_visible_until = Some(self.clock.now_ms() + self.config.controls_hide_ms);
    }

    pub fn controls_visible(&self) -> bool {
        let now = self.clock.now_ms();
        self.controls_visible_until.is_some_and(|until| now < until)
    }

    pub fn phase(&self) -> MountPhase {
        self.phase
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn init_attempts(&self) -> u32 {
        self.init_attempts
    }

    pub fn teardowns(&self) -> u32 {
        self.teardowns
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn scene(&self) -> Option<&SceneHandle> {
        self.scene.as_ref()
    }

    pub fn controls_hide_ms(&self) -> f64 {
        self.config.controls_hide_ms
    }
}

impl Drop for MountController {
    fn drop(&mut self) {
        self.unmount();
    }
}
