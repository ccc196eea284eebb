use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use leptos::*;
use strum::IntoEnumIterator;

use crate::application::{
    ControlPanel, FeedbackBanner, FeedbackKind, MountConfig, MountController, MountPhase, PanelConfig,
    PreferenceStore,
};
use crate::domain::chart::{Indicator, Theme, TradingAction, ZoomDirection};
use crate::domain::events::EventBus;
use crate::domain::logging::LogComponent;
use crate::domain::market_data::Timeframe;
use crate::infrastructure::browser::{
    BrowserFullscreen, CanvasSurface, LocalStoragePreferences, PerformanceClock, WindowEventBridge,
};
use crate::scene::{Clock, SceneConfig, initialize_scene};
use crate::{log_info, log_warn};

const STYLES: &str = r#"
.trading-scene-app {
    display: flex;
    height: 100%;
    min-height: 480px;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    background: #111827;
    color: #f9fafb;
}
.trading-scene-app.light { background: #f0f4f8; color: #1f2937; }
.control-panel { width: 16rem; padding: 1rem; position: relative; background: #1f2937; }
.trading-scene-app.light .control-panel { background: #e5e7eb; }
.control-panel h2 { font-size: 1.25rem; margin: 0 0 1.5rem; }
.control-panel h3 { font-size: 0.95rem; margin: 0 0 0.5rem; }
.control-panel section { margin-bottom: 1.5rem; }
.control-panel .hint { font-size: 0.75rem; opacity: 0.6; margin: 0 0 0.5rem; }
.control-panel button { cursor: pointer; border: none; border-radius: 4px; padding: 0.35rem 0.75rem; background: #374151; color: inherit; }
.trading-scene-app.light .control-panel button { background: #d1d5db; }
.control-panel button.active { background: #2563eb; color: #fff; }
.control-panel .row { display: flex; gap: 0.5rem; }
.control-panel .stack button { display: block; width: 100%; text-align: left; margin-bottom: 0.5rem; }
.control-panel button.buy { background: #16a34a; color: #fff; flex: 1; }
.control-panel button.sell { background: #dc2626; color: #fff; flex: 1; }
.control-panel .theme-toggle { position: absolute; top: 1rem; right: 1rem; }
.feedback { margin-bottom: 1rem; padding: 0.5rem 0.75rem; border-radius: 4px; text-align: center; font-size: 0.85rem; color: #fff; }
.feedback.success { background: #16a34a; }
.feedback.info { background: #2563eb; }
.feedback.danger { background: #dc2626; }
.version { position: absolute; bottom: 1rem; left: 0; right: 0; text-align: center; font-size: 0.75rem; opacity: 0.5; }
.scene-area { flex: 1; position: relative; }
.scene-viewport { position: relative; width: 100%; height: 100%; background: #000; }
.scene-canvas { position: absolute; inset: 0; }
.scene-overlay { position: absolute; inset: 0; display: flex; flex-direction: column; align-items: center; justify-content: center; background: #111827; color: #fff; }
.scene-controls { position: absolute; bottom: 1rem; right: 1rem; display: flex; gap: 0.5rem; opacity: 0; transition: opacity 300ms; }
.scene-controls.visible { opacity: 0.8; }
.scene-controls.hidden { display: none; }
.scene-controls button { cursor: pointer; border: none; border-radius: 9999px; width: 2.25rem; height: 2.25rem; background: #1f2937; color: #fff; }
"#;

/// What the panel view renders; refreshed after every action.
#[derive(Clone, PartialEq)]
struct PanelSnapshot {
    timeframe: Timeframe,
    theme: Theme,
    enabled: Vec<Indicator>,
    feedback: Option<FeedbackBanner>,
}

impl PanelSnapshot {
    fn of(panel: &ControlPanel) -> Self {
        Self {
            timeframe: panel.timeframe(),
            theme: panel.theme(),
            enabled: Indicator::iter().filter(|i| panel.is_enabled(*i)).collect(),
            feedback: panel.feedback().cloned(),
        }
    }
}

#[derive(Clone)]
struct PanelHandle {
    panel: Rc<RefCell<ControlPanel>>,
    snapshot: RwSignal<PanelSnapshot>,
    dismiss: Rc<RefCell<Option<Timeout>>>,
}

impl PanelHandle {
    fn new(panel: ControlPanel) -> Self {
        let snapshot = create_rw_signal(PanelSnapshot::of(&panel));
        Self { panel: Rc::new(RefCell::new(panel)), snapshot, dismiss: Rc::default() }
    }

    fn apply(&self, action: impl FnOnce(&mut ControlPanel)) {
        action(&mut self.panel.borrow_mut());
        self.refresh();

        let delay = self.panel.borrow().feedback_duration_ms().ceil() as u32 + 1;
        let this = self.clone();
        let timeout = Timeout::new(delay, move || {
            let cleared = this.panel.borrow_mut().dismiss_expired_feedback();
            if cleared {
                this.refresh();
            }
        });
        // replacing the previous timeout cancels it
        *self.dismiss.borrow_mut() = Some(timeout);
    }

    fn refresh(&self) {
        self.snapshot.set(PanelSnapshot::of(&self.panel.borrow()));
    }

    fn sync_scene(&self) {
        self.panel.borrow().sync_scene();
    }

    fn stop_timers(&self) {
        self.dismiss.borrow_mut().take();
    }
}

/// Root component: control panel beside the 3D viewport, sharing one bus.
#[component]
pub fn App(config: SceneConfig) -> impl IntoView {
    let bus = EventBus::new();
    let clock: Rc<dyn Clock> = Rc::new(PerformanceClock);
    let preferences: Rc<dyn PreferenceStore> = Rc::new(LocalStoragePreferences);
    let panel = PanelHandle::new(ControlPanel::new(bus.clone(), preferences, clock.clone(), PanelConfig::default()));
    let snapshot = panel.snapshot;

    let bridge = match WindowEventBridge::attach(&bus) {
        Ok(bridge) => Some(bridge),
        Err(e) => {
            log_warn!(LogComponent::Presentation("App"), "window events not bridged: {}", e);
            None
        }
    };
    {
        let bridge = RefCell::new(bridge);
        let panel = panel.clone();
        on_cleanup(move || {
            panel.stop_timers();
            if let Some(bridge) = bridge.borrow_mut().take() {
                bridge.detach();
            }
        });
    }

    let on_ready: Rc<dyn Fn()> = {
        let panel = panel.clone();
        Rc::new(move || panel.sync_scene())
    };

    log_info!(LogComponent::Presentation("App"), "trading scene app mounted");

    view! {
        <style>{STYLES}</style>
        <div class="trading-scene-app" class:light=move || snapshot.with(|s| s.theme == Theme::Light)>
            <ControlPanelView panel=panel />
            <main class="scene-area">
                <SceneViewport bus=bus config=config clock=clock on_ready=on_ready />
            </main>
        </div>
    }
}

#[component]
fn ControlPanelView(panel: PanelHandle) -> impl IntoView {
    let snapshot = panel.snapshot;

    let feedback = move || {
        snapshot.with(|s| {
            s.feedback.as_ref().map(|banner| {
                let class = match banner.kind {
                    FeedbackKind::Success => "feedback success",
                    FeedbackKind::Info => "feedback info",
                    FeedbackKind::Danger => "feedback danger",
                };
                view! { <div class=class>{banner.message.clone()}</div> }
            })
        })
    };

    let timeframes = Timeframe::iter()
        .map(|timeframe| {
            let panel = panel.clone();
            view! {
                <button
                    class:active=move || snapshot.with(|s| s.timeframe == timeframe)
                    on:click=move |_| panel.apply(|p| p.select_timeframe(timeframe))
                >
                    {timeframe.label()}
                </button>
            }
        })
        .collect_view();

    let indicators = Indicator::iter()
        .map(|indicator| {
            let panel = panel.clone();
            let enabled = move || snapshot.with(|s| s.enabled.contains(&indicator));
            view! {
                <button
                    class:active=enabled
                    on:click=move |_| panel.apply(|p| {
                        p.toggle_indicator(indicator);
                    })
                >
                    {move || if enabled() { format!("Remove {}", indicator) } else { format!("Add {}", indicator) }}
                </button>
            }
        })
        .collect_view();

    let order = |action: TradingAction| {
        let panel = panel.clone();
        move |_: web_sys::MouseEvent| panel.apply(|p| p.place_order(action))
    };
    let buy = order(TradingAction::Buy);
    let sell = order(TradingAction::Sell);
    let toggle_theme = {
        let panel = panel.clone();
        move |_: web_sys::MouseEvent| {
            panel.apply(|p| {
                p.toggle_theme();
            })
        }
    };

    view! {
        <aside class="control-panel">
            <button class="theme-toggle" title="Toggle between dark and light mode" on:click=toggle_theme>
                {move || if snapshot.with(|s| s.theme == Theme::Dark) { "☀" } else { "☾" }}
            </button>
            <h2>"Trading Controls"</h2>
            {feedback}
            <section>
                <h3>"Timeframe"</h3>
                <p class="hint">"Select the time interval for each candle"</p>
                <div class="row">{timeframes}</div>
            </section>
            <section>
                <h3>"Indicators"</h3>
                <p class="hint">"Technical indicators to enhance your analysis"</p>
                <div class="stack">{indicators}</div>
            </section>
            <section>
                <h3>"Trading"</h3>
                <p class="hint">"Execute buy or sell orders"</p>
                <div class="row">
                    <button class="buy" on:click=buy>"Buy"</button>
                    <button class="sell" on:click=sell>"Sell"</button>
                </div>
            </section>
            <div class="version">{concat!("Trading 3D v", env!("CARGO_PKG_VERSION"))}</div>
        </aside>
    }
}

/// Container that owns the scene: builds it once the element exists and
/// tears it down on cleanup.
#[component]
fn SceneViewport(bus: EventBus, config: SceneConfig, clock: Rc<dyn Clock>, on_ready: Rc<dyn Fn()>) -> impl IntoView {
    let wrapper_ref = create_node_ref::<html::Div>();
    let canvas_host_ref = create_node_ref::<html::Div>();
    let phase = create_rw_signal(MountPhase::Pending);
    let fullscreen = create_rw_signal(false);
    let controls_visible = create_rw_signal(false);

    let mount: Rc<RefCell<Option<MountController>>> = Rc::default();
    let hide_timer: Rc<RefCell<Option<Timeout>>> = Rc::default();
    let fullscreen_listener: Rc<RefCell<Option<EventListener>>> = Rc::default();

    {
        let mount = mount.clone();
        let fullscreen_listener = fullscreen_listener.clone();
        create_effect(move |started: Option<bool>| {
            if started == Some(true) {
                return true;
            }
            let (Some(wrapper), Some(host)) = (wrapper_ref.get(), canvas_host_ref.get()) else {
                return false;
            };
            let wrapper: web_sys::Element = (*wrapper).clone().into();
            let host: web_sys::Element = (*host).clone().into();

            let mut controller = MountController::new(
                bus.clone(),
                Rc::new(BrowserFullscreen::new(wrapper)),
                clock.clone(),
                MountConfig::default(),
            );
            controller.begin_loading();
            phase.set(controller.phase());
            *mount.borrow_mut() = Some(controller);

            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                let mount = mount.clone();
                let listener = EventListener::new(&document, "fullscreenchange", move |_| {
                    let active = web_sys::window()
                        .and_then(|w| w.document())
                        .and_then(|d| d.fullscreen_element())
                        .is_some();
                    if let Some(controller) = mount.borrow_mut().as_mut() {
                        controller.on_fullscreen_change(active);
                    }
                    fullscreen.set(active);
                });
                *fullscreen_listener.borrow_mut() = Some(listener);
            }

            let mount = mount.clone();
            let clock = clock.clone();
            let config = config.clone();
            let on_ready = on_ready.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let prepared = CanvasSurface::prepare(host).await;
                let ready = {
                    let mut slot = mount.borrow_mut();
                    // unmounted while the GPU was coming up
                    let Some(controller) = slot.as_mut() else { return };
                    match prepared {
                        Ok(mut surface) => {
                            controller.mount(|bus| initialize_scene(&mut surface, bus, clock, config));
                        }
                        Err(e) => controller.fail(e),
                    }
                    phase.set(controller.phase());
                    controller.phase() == MountPhase::Ready
                };
                if ready {
                    on_ready();
                }
            });
            true
        });
    }

    {
        let mount = mount.clone();
        let hide_timer = hide_timer.clone();
        on_cleanup(move || {
            hide_timer.borrow_mut().take();
            fullscreen_listener.borrow_mut().take();
            let controller = mount.borrow_mut().take();
            if let Some(mut controller) = controller {
                controller.unmount();
            }
        });
    }

    let on_mouse_move = {
        let mount = mount.clone();
        move |_: web_sys::MouseEvent| {
            let hide_ms = {
                let mut slot = mount.borrow_mut();
                let Some(controller) = slot.as_mut() else { return };
                controller.pointer_moved();
                controller.controls_hide_ms()
            };
            controls_visible.set(true);
            let mount = mount.clone();
            let timeout = Timeout::new(hide_ms.ceil() as u32 + 1, move || {
                let visible = mount.borrow().as_ref().is_some_and(|c| c.controls_visible());
                controls_visible.set(visible);
            });
            *hide_timer.borrow_mut() = Some(timeout);
        }
    };

    let zoom = |direction: ZoomDirection| {
        let mount = mount.clone();
        move |_: web_sys::MouseEvent| {
            if let Some(controller) = mount.borrow().as_ref() {
                controller.zoom(direction);
            }
        }
    };
    let zoom_in = zoom(ZoomDirection::In);
    let zoom_out = zoom(ZoomDirection::Out);
    let reset_view = {
        let mount = mount.clone();
        move |_: web_sys::MouseEvent| {
            if let Some(controller) = mount.borrow().as_ref() {
                controller.reset_view();
            }
        }
    };
    let toggle_fullscreen = {
        let mount = mount.clone();
        move |_: web_sys::MouseEvent| {
            if let Some(controller) = mount.borrow().as_ref() {
                controller.toggle_fullscreen();
            }
        }
    };

    view! {
        <div class="scene-viewport" node_ref=wrapper_ref on:mousemove=on_mouse_move>
            <div class="scene-canvas" node_ref=canvas_host_ref></div>
            {move || match phase.get() {
                MountPhase::Pending | MountPhase::Loading => view! {
                    <div class="scene-overlay">
                        <p>"Initializing 3D Trading View..."</p>
                    </div>
                }
                .into_view(),
                MountPhase::Unavailable => view! {
                    <div class="scene-overlay">
                        <p>"3D view unavailable"</p>
                    </div>
                }
                .into_view(),
                MountPhase::Ready | MountPhase::Unmounted => ().into_view(),
            }}
            <div
                class="scene-controls"
                class:visible=move || controls_visible.get()
                class:hidden=move || phase.get() != MountPhase::Ready
            >
                <button title="Zoom in" on:click=zoom_in>"+"</button>
                <button title="Zoom out" on:click=zoom_out>"−"</button>
                <button title="Reset view" on:click=reset_view>"⟳"</button>
                <button
                    title=move || if fullscreen.get() { "Exit fullscreen" } else { "Enter fullscreen" }
                    on:click=toggle_fullscreen
                >
                    {move || if fullscreen.get() { "⤡" } else { "⤢" }}
                </button>
            </div>
        </div>
    }
}
