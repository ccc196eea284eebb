//! Scene construction, event handling, the per-frame step and teardown.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strum::IntoEnumIterator;

use super::camera::{OrbitControls, PerspectiveCamera};
use super::chart_builder::{self, ChartSummary};
use super::config::SceneConfig;
use super::environment::Environment;
use super::{Clock, FrameScheduler, ListenerGuard, PointerInput, SceneSurface, SurfaceSize};
use crate::domain::chart::{TradingAction, ZoomDirection};
use crate::domain::errors::SceneError;
use crate::domain::events::{EventBus, EventKind, Subscription, TradingEvent};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{SampleDataStore, Timeframe};
use crate::ecs::SceneGraph;
use crate::ecs::components::{Layer, ParticleBurst, PrimitiveKind, Transform};
use crate::ecs::resources::{Color, GeometryDesc, MaterialDesc, ResourceStats};
use crate::ecs::systems;
use crate::infrastructure::rendering::{FrameData, SceneRenderer, build_frame, frame_uniforms};
use crate::view_state::ViewState;
use crate::{log_debug, log_info, log_warn};

/// Sole owner of the scene's graphics state.
pub struct SceneCore {
    config: SceneConfig,
    store: SampleDataStore,
    view: ViewState,
    graph: SceneGraph,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    environment: Environment,
    renderer: Option<Box<dyn SceneRenderer>>,
    clock: Rc<dyn Clock>,
    rng: StdRng,
    last_frame_ms: Option<f64>,
    last_summary: ChartSummary,
    rebuilds: u64,
    frames_rendered: u64,
    render_failures: u64,
}

impl SceneCore {
    fn new(
        config: SceneConfig,
        store: SampleDataStore,
        initial: Timeframe,
        renderer: Box<dyn SceneRenderer>,
        clock: Rc<dyn Clock>,
        size: SurfaceSize,
    ) -> Self {
        let mut graph = SceneGraph::new();
        let view = ViewState::new(initial);
        let environment = Environment::build(&mut graph, &config.environment, view.theme);
        let camera = PerspectiveCamera::new(&config.camera, size.aspect());
        let controls = OrbitControls::new(&camera, config.controls.clone());
        let rng = StdRng::seed_from_u64(config.chart.seed);

        let mut core = Self {
            config,
            store,
            view,
            graph,
            camera,
            controls,
            environment,
            renderer: Some(renderer),
            clock,
            rng,
            last_frame_ms: None,
            last_summary: ChartSummary::default(),
            rebuilds: 0,
            frames_rendered: 0,
            render_failures: 0,
        };
        core.rebuild_chart();
        core
    }

    /// React to one bus notification. Invalid requests keep the current state.
    pub fn handle_event(&mut self, event: &TradingEvent) {
        match event {
            TradingEvent::TimeframeChange { timeframe } => {
                if !self.store.has_data(*timeframe) {
                    log_warn!(
                        LogComponent::Scene("Bootstrap"),
                        "timeframe {} has no candles, keeping {}",
                        timeframe,
                        self.view.active_timeframe
                    );
                    return;
                }
                self.view.set_timeframe(*timeframe);
                self.rebuild_chart();
            }
            TradingEvent::IndicatorToggle { indicator, enabled } => {
                self.view.set_indicator(*indicator, *enabled);
                self.rebuild_chart();
            }
            TradingEvent::TradingAction { action } => self.spawn_burst(*action),
            TradingEvent::ThemeChange { theme } => {
                self.view.set_theme(*theme);
                self.environment.apply_theme(&mut self.graph, *theme);
            }
            TradingEvent::CameraZoom { direction } => {
                match direction {
                    ZoomDirection::In => self.controls.zoom_in(),
                    ZoomDirection::Out => self.controls.zoom_out(),
                }
                self.controls.sync(&mut self.camera);
            }
            TradingEvent::CameraReset {} => {
                self.controls.reset();
                self.controls.sync(&mut self.camera);
            }
        }
    }

    fn rebuild_chart(&mut self) {
        let now = self.clock.now_ms();
        let candles = self.store.candles(self.view.active_timeframe).unwrap_or(&[]);
        self.last_summary =
            chart_builder::rebuild_chart(&mut self.graph, candles, &self.view, &self.config.chart, now, &mut self.rng);
        self.rebuilds += 1;
        log_debug!(
            LogComponent::Scene("ChartBuilder"),
            "rebuilt {} chart: {:?}",
            self.view.active_timeframe,
            self.last_summary
        );
    }

    fn spawn_burst(&mut self, action: TradingAction) {
        let effects = &self.config.effects;
        let half_extent = action.burst_scale();
        let positions: Vec<Vec3> = (0..effects.particle_count)
            .map(|_| {
                Vec3::new(
                    self.rng.gen_range(-1.0..1.0f32),
                    self.rng.gen_range(-1.0..1.0f32),
                    self.rng.gen_range(-1.0..1.0f32),
                ) * half_extent
            })
            .collect();

        let entity = self.graph.spawn_primitive(
            PrimitiveKind::ParticleBurst,
            Layer::Effects,
            GeometryDesc::Points { positions },
            MaterialDesc::Points { color: Color(action.burst_color()), size: effects.particle_size, opacity: 0.8 },
            Transform::default(),
        );
        let burst = ParticleBurst {
            started_ms: self.clock.now_ms(),
            duration_ms: effects.burst_duration_ms,
            spin_per_frame: effects.spin_per_frame,
            expansion: effects.expansion,
        };
        self.graph.with_component(entity, burst);
        log_info!(LogComponent::Scene("Effects"), "{} burst spawned", action);
    }

    /// One tick of the render loop.
    pub fn frame(&mut self) {
        let now = self.clock.now_ms();
        let dt = self.last_frame_ms.map(|last| ((now - last) / 1000.0).max(0.0)).unwrap_or(0.0);
        self.last_frame_ms = Some(now);

        self.controls.update(&mut self.camera);
        self.graph.chart_rotation += self.config.chart.rotation_speed * dt as f32;
        systems::run_entrance_animations(&mut self.graph.world, now);
        systems::run_pulses(&mut self.graph.world, now);
        systems::advance_particle_bursts(&mut self.graph, now);

        let Some(renderer) = self.renderer.as_mut() else { return };
        let frame = FrameData {
            geometry: build_frame(&self.graph),
            uniforms: frame_uniforms(&self.camera, &self.environment),
            clear_color: linear_clear_color(self.environment.background),
        };
        match renderer.render(&frame) {
            Ok(()) => self.frames_rendered += 1,
            Err(e) => {
                self.render_failures += 1;
                if self.render_failures <= 3 {
                    log_warn!(LogComponent::Scene("RenderLoop"), "{}", e);
                }
            }
        }
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        if size.is_empty() {
            log_debug!(LogComponent::Scene("Bootstrap"), "ignoring resize to {}x{}", size.width, size.height);
            return;
        }
        self.camera.set_aspect(size.width, size.height);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_viewport(size);
        }
    }

    pub fn pointer(&mut self, input: PointerInput) {
        match input {
            PointerInput::Drag { dx, dy } => self.controls.rotate(dx, dy),
            PointerInput::Wheel { delta_y } => self.controls.wheel(delta_y),
        }
    }

    fn release(&mut self) {
        self.graph.dispose_all();
        if let Some(mut renderer) = self.renderer.take() {
            renderer.dispose();
            renderer.detach();
        }
        let stats = self.graph.resources.stats();
        get_logger().info(
            LogComponent::Scene("Bootstrap"),
            &format!(
                "scene released: {} geometries, {} materials disposed",
                stats.geometries_disposed, stats.materials_disposed
            ),
        );
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn count(&self, kind: PrimitiveKind) -> usize {
        self.graph.count(kind)
    }

    pub fn resource_stats(&self) -> ResourceStats {
        self.graph.resources.stats()
    }

    pub fn viewport(&self) -> Option<SurfaceSize> {
        self.renderer.as_ref().map(|renderer| renderer.viewport())
    }

    pub fn last_summary(&self) -> ChartSummary {
        self.last_summary
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn render_failures(&self) -> u64 {
        self.render_failures
    }
}

fn linear_clear_color(color: Color) -> [f64; 4] {
    let [r, g, b] = color.to_rgb().map(|c| (c as f64).powf(2.2));
    [r, g, b, 1.0]
}

/// Live scene: the core plus everything registered on its behalf.
///
/// [`SceneHandle::teardown`] releases it all; later calls are no-ops and
/// dropping the handle tears down as well.
pub struct SceneHandle {
    core: Rc<RefCell<SceneCore>>,
    subscriptions: Vec<Subscription>,
    resize_listener: Option<Box<dyn ListenerGuard>>,
    pointer_listener: Option<Box<dyn ListenerGuard>>,
    scheduler: Option<Box<dyn FrameScheduler>>,
    torn_down: bool,
}

impl SceneHandle {
    /// Remove subscriptions and listeners, cancel the frame loop, dispose
    /// every geometry and material, then dispose and detach the renderer.
    pub fn teardown(&mut self) {
        if self.torn_down {
            log_debug!(LogComponent::Scene("Bootstrap"), "teardown already done");
            return;
        }
        self.torn_down = true;

        self.subscriptions.clear();
        if let Some(listener) = self.resize_listener.take() {
            listener.remove();
        }
        if let Some(listener) = self.pointer_listener.take() {
            listener.remove();
        }
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.cancel();
        }

        match self.core.try_borrow_mut() {
            Ok(mut core) => core.release(),
            Err(_) => {
                get_logger().error(
                    LogComponent::Scene("Bootstrap"),
                    "teardown requested while the scene is busy; resources not released",
                );
            }
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.as_ref().is_some_and(|scheduler| scheduler.is_running())
    }

    /// Read-only view of the core, for diagnostics and tests.
    pub fn inspect<R>(&self, f: impl FnOnce(&SceneCore) -> R) -> R {
        f(&self.core.borrow())
    }
}

impl Drop for SceneHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Build the scene on `surface` with the built-in sample data.
pub fn initialize_scene(
    surface: &mut dyn SceneSurface,
    bus: &EventBus,
    clock: Rc<dyn Clock>,
    config: SceneConfig,
) -> Result<SceneHandle, SceneError> {
    initialize_scene_with_data(surface, bus, clock, config, SampleDataStore::builtin().clone())
}

pub fn initialize_scene_with_data(
    surface: &mut dyn SceneSurface,
    bus: &EventBus,
    clock: Rc<dyn Clock>,
    config: SceneConfig,
    store: SampleDataStore,
) -> Result<SceneHandle, SceneError> {
    if let Err(e) = config.validate() {
        get_logger().error(LogComponent::Scene("Bootstrap"), &format!("scene setup failed: {}", e));
        return Err(e);
    }
    let size = surface.size();
    if size.is_empty() {
        return Err(SceneError::InvalidDimensions { width: size.width, height: size.height });
    }
    let initial = if store.has_data(Timeframe::Short) {
        Timeframe::Short
    } else {
        store.first_populated().ok_or(SceneError::EmptyDataStore)?
    };

    let mut renderer = surface.attach_renderer()?;
    renderer.set_viewport(size);

    let core = Rc::new(RefCell::new(SceneCore::new(config, store, initial, renderer, clock, size)));
    let mut handle = SceneHandle {
        core,
        subscriptions: Vec::new(),
        resize_listener: None,
        pointer_listener: None,
        scheduler: None,
        torn_down: false,
    };

    if let Err(e) = wire(&mut handle, surface, bus) {
        get_logger().error(LogComponent::Scene("Bootstrap"), &format!("scene setup failed: {}", e));
        handle.teardown();
        return Err(e);
    }

    log_info!(
        LogComponent::Scene("Bootstrap"),
        "scene ready at {}x{} showing {}",
        size.width,
        size.height,
        initial
    );
    Ok(handle)
}

/// Run `f` on the core if it is still alive and not already borrowed.
fn with_core(core: &Weak<RefCell<SceneCore>>, what: &str, f: impl FnOnce(&mut SceneCore)) {
    let Some(core) = core.upgrade() else { return };
    match core.try_borrow_mut() {
        Ok(mut core) => f(&mut core),
        Err(_) => {
            log_warn!(LogComponent::Scene("Bootstrap"), "{} skipped: scene busy", what);
        }
    }
}

fn wire(handle: &mut SceneHandle, surface: &mut dyn SceneSurface, bus: &EventBus) -> Result<(), SceneError> {
    for kind in EventKind::iter() {
        let core = Rc::downgrade(&handle.core);
        handle.subscriptions.push(bus.subscribe(kind, move |event| {
            with_core(&core, kind.name(), |core| core.handle_event(event));
        }));
    }

    let core = Rc::downgrade(&handle.core);
    handle.resize_listener = Some(surface.watch_resize(Box::new(move |size| {
        with_core(&core, "resize", |core| core.resize(size));
    }))?);

    let core = Rc::downgrade(&handle.core);
    handle.pointer_listener = Some(surface.watch_pointer(Box::new(move |input| {
        with_core(&core, "pointer", |core| core.pointer(input));
    }))?);

    let mut scheduler = surface.frame_scheduler()?;
    let core = Rc::downgrade(&handle.core);
    scheduler.start(Box::new(move || {
        with_core(&core, "frame", |core| core.frame());
    }))?;
    handle.scheduler = Some(scheduler);
    Ok(())
}
