use std::cell::{Cell, RefCell};
use std::rc::Rc;

use trading_scene::application::{FullscreenHost, MountConfig, MountController, MountPhase};
use trading_scene::domain::chart::ZoomDirection;
use trading_scene::domain::errors::SceneError;
use trading_scene::domain::events::{EventBus, EventKind, Subscription, TradingEvent};
use trading_scene::scene::{SceneConfig, initialize_scene};
use trading_scene::testing::{FakeFullscreen, HeadlessSurface, VirtualClock};

fn controller(bus: &EventBus, host: Rc<FakeFullscreen>, clock: Rc<VirtualClock>) -> MountController {
    let host: Rc<dyn FullscreenHost> = host;
    MountController::new(bus.clone(), host, clock, MountConfig::default())
}

fn record(bus: &EventBus, kinds: &[EventKind]) -> (Rc<RefCell<Vec<TradingEvent>>>, Vec<Subscription>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let subs = kinds
        .iter()
        .map(|kind| {
            let seen = seen.clone();
            bus.subscribe(*kind, move |event| seen.borrow_mut().push(event.clone()))
        })
        .collect();
    (seen, subs)
}

#[test]
fn phases_run_pending_loading_ready_unmounted() {
    let bus = EventBus::new();
    let clock = VirtualClock::new(0.0);
    let mut surface = HeadlessSurface::new(800, 600);
    let probe = surface.probe();
    let mut mount = controller(&bus, FakeFullscreen::new(), clock.clone());

    assert_eq!(mount.phase(), MountPhase::Pending);
    mount.begin_loading();
    assert_eq!(mount.phase(), MountPhase::Loading);

    let phase = mount.mount(|bus| initialize_scene(&mut surface, bus, clock.clone(), SceneConfig::default()));
    assert_eq!(phase, MountPhase::Ready);
    assert!(mount.scene().is_some_and(|scene| scene.is_running()));

    mount.unmount();
    assert_eq!(mount.phase(), MountPhase::Unmounted);
    assert_eq!(mount.teardowns(), 1);
    assert_eq!(probe.disposals.get(), 1);
    assert_eq!(bus.total_subscribers(), 0);
}

#[test]
fn scene_is_constructed_at_most_once() {
    let bus = EventBus::new();
    let clock = VirtualClock::new(0.0);
    let mut surface = HeadlessSurface::new(800, 600);
    let mut mount = controller(&bus, FakeFullscreen::new(), clock.clone());
    let calls = Cell::new(0);

    mount.mount(|bus| {
        calls.set(calls.get() + 1);
        initialize_scene(&mut surface, bus, clock.clone(), SceneConfig::default())
    });
    let phase = mount.mount(|_| {
        calls.set(calls.get() + 1);
        Err(SceneError::RendererUnavailable)
    });

    assert_eq!(phase, MountPhase::Ready);
    assert_eq!(calls.get(), 1);
    assert_eq!(mount.init_attempts(), 1);
}

#[test]
fn unmount_tears_down_exactly_once() {
    let bus = EventBus::new();
    let clock = VirtualClock::new(0.0);
    let mut surface = HeadlessSurface::new(800, 600);
    let probe = surface.probe();
    {
        let mut mount = controller(&bus, FakeFullscreen::new(), clock.clone());
        mount.mount(|bus| initialize_scene(&mut surface, bus, clock.clone(), SceneConfig::default()));
        mount.unmount();
        mount.unmount();
        assert_eq!(mount.teardowns(), 1);
    }
    assert_eq!(probe.disposals.get(), 1);
    assert_eq!(probe.detachments.get(), 1);
    assert_eq!(surface.active_listeners(), 0);
}

#[test]
fn dropping_the_controller_releases_the_scene() {
    let bus = EventBus::new();
    let clock = VirtualClock::new(0.0);
    let mut surface = HeadlessSurface::new(800, 600);
    let probe = surface.probe();
    let mut mount = controller(&bus, FakeFullscreen::new(), clock.clone());
    mount.mount(|bus| initialize_scene(&mut surface, bus, clock.clone(), SceneConfig::default()));

    drop(mount);

    assert_eq!(probe.disposals.get(), 1);
    assert!(!surface.frames().is_running());
}

#[test]
fn failed_construction_shows_fallback() {
    let bus = EventBus::new();
    let clock = VirtualClock::new(0.0);
    let mut surface = HeadlessSurface::new(0, 0);
    let mut mount = controller(&bus, FakeFullscreen::new(), clock.clone());

    let phase = mount.mount(|bus| initialize_scene(&mut surface, bus, clock.clone(), SceneConfig::default()));

    assert_eq!(phase, MountPhase::Unavailable);
    assert!(mount.scene().is_none());
    assert!(mount.failure().is_some_and(|msg| msg.contains("0x0")));

    mount.unmount();
    assert_eq!(mount.teardowns(), 0);
    assert_eq!(mount.phase(), MountPhase::Unmounted);
}

#[test]
fn async_failure_is_recorded_while_loading() {
    let bus = EventBus::new();
    let mut mount = controller(&bus, FakeFullscreen::new(), VirtualClock::new(0.0));
    mount.begin_loading();

    mount.fail(SceneError::GraphicsInitialization("no adapter".to_string()));

    assert_eq!(mount.phase(), MountPhase::Unavailable);
    assert_eq!(mount.failure(), Some("graphics initialization failed: no adapter"));
}

#[test]
fn camera_buttons_publish_until_unmounted() {
    let bus = EventBus::new();
    let (seen, _subs) = record(&bus, &[EventKind::CameraZoom, EventKind::CameraReset]);
    let mut mount = controller(&bus, FakeFullscreen::new(), VirtualClock::new(0.0));

    mount.zoom(ZoomDirection::In);
    mount.zoom(ZoomDirection::Out);
    mount.reset_view();
    assert_eq!(
        *seen.borrow(),
        vec![
            TradingEvent::CameraZoom { direction: ZoomDirection::In },
            TradingEvent::CameraZoom { direction: ZoomDirection::Out },
            TradingEvent::CameraReset {},
        ]
    );

    mount.unmount();
    mount.zoom(ZoomDirection::In);
    mount.reset_view();
    assert_eq!(seen.borrow().len(), 3);
}

#[test]
fn zoom_button_reaches_the_mounted_scene() {
    let bus = EventBus::new();
    let clock = VirtualClock::new(0.0);
    let mut surface = HeadlessSurface::new(800, 600);
    let mut mount = controller(&bus, FakeFullscreen::new(), clock.clone());
    mount.mount(|bus| initialize_scene(&mut surface, bus, clock.clone(), SceneConfig::default()));

    let before = mount.scene().map(|scene| scene.inspect(|core| core.controls().distance()));
    mount.zoom(ZoomDirection::In);
    let after = mount.scene().map(|scene| scene.inspect(|core| core.controls().distance()));

    let (before, after) = (before.expect("mounted"), after.expect("mounted"));
    assert!((after - before * 0.8).abs() < 1e-4);
}

#[test]
fn fullscreen_toggle_requests_then_exits() {
    let bus = EventBus::new();
    let host = FakeFullscreen::new();
    let mut mount = controller(&bus, host.clone(), VirtualClock::new(0.0));

    assert!(mount.toggle_fullscreen());
    assert_eq!(host.requests(), 1);
    assert!(!mount.is_fullscreen());
    mount.on_fullscreen_change(true);
    assert!(mount.is_fullscreen());

    assert!(mount.toggle_fullscreen());
    assert_eq!(host.exits(), 1);
    mount.on_fullscreen_change(false);
    assert!(!mount.is_fullscreen());
}

#[test]
fn unsupported_fullscreen_is_logged_and_ignored() {
    let bus = EventBus::new();
    let host = FakeFullscreen::unsupported();
    let mount = controller(&bus, host.clone(), VirtualClock::new(0.0));

    assert!(!mount.toggle_fullscreen());
    assert_eq!(host.requests(), 1);
    assert!(!mount.is_fullscreen());
}

#[test]
fn controls_hide_three_seconds_after_last_movement() {
    let bus = EventBus::new();
    let clock = VirtualClock::new(500.0);
    let mut mount = controller(&bus, FakeFullscreen::new(), clock.clone());
    assert!(!mount.controls_visible());

    mount.pointer_moved();
    clock.advance(2_000.0);
    mount.pointer_moved();
    clock.advance(2_999.0);
    assert!(mount.controls_visible());

    clock.advance(1.0);
    assert!(!mount.controls_visible());
}
