use std::rc::Rc;
use std::sync::OnceLock;

use trading_scene::application::{ControlPanel, PanelConfig, PreferenceStore};
use trading_scene::domain::events::{EventBus, TradingEvent};
use trading_scene::domain::logging::{LogLevel, init_logger};
use trading_scene::domain::market_data::{SampleDataStore, Timeframe};
use trading_scene::infrastructure::services::{HistoryLogger, LogHistory};
use trading_scene::scene::{SceneConfig, initialize_scene, initialize_scene_with_data};
use trading_scene::testing::{HeadlessSurface, MemoryPreferenceStore, VirtualClock};

fn history() -> &'static LogHistory {
    static HISTORY: OnceLock<LogHistory> = OnceLock::new();
    HISTORY.get_or_init(|| {
        let logger = HistoryLogger::new(512);
        let history = logger.history();
        init_logger(Box::new(logger));
        history
    })
}

#[test]
fn missing_timeframe_is_a_warning() {
    let log = history();
    let short = SampleDataStore::builtin().candles(Timeframe::Short).unwrap_or(&[]).to_vec();
    let mut surface = HeadlessSurface::new(320, 240);
    let bus = EventBus::new();
    let _scene = initialize_scene_with_data(
        &mut surface,
        &bus,
        VirtualClock::new(0.0),
        SceneConfig::default(),
        SampleDataStore::from_series([(Timeframe::Short, short)]),
    )
    .expect("scene builds");

    bus.publish(TradingEvent::TimeframeChange { timeframe: Timeframe::Long });

    assert!(log.contains(LogLevel::Warn, "timeframe 1D has no candles"));
}

#[test]
fn teardown_reports_released_resources() {
    let log = history();
    let mut surface = HeadlessSurface::new(320, 240);
    let bus = EventBus::new();
    let mut scene =
        initialize_scene(&mut surface, &bus, VirtualClock::new(0.0), SceneConfig::default()).expect("scene builds");

    scene.teardown();

    assert!(log.contains(LogLevel::Info, "scene released"));
}

#[test]
fn failed_setup_is_an_error() {
    let log = history();
    let mut surface = HeadlessSurface::new(320, 240).with_failing_scheduler();
    let bus = EventBus::new();

    assert!(initialize_scene(&mut surface, &bus, VirtualClock::new(0.0), SceneConfig::default()).is_err());
    assert!(log.contains(LogLevel::Error, "scene setup failed"));
}

#[test]
fn unsaved_theme_is_a_warning() {
    let log = history();
    let store = MemoryPreferenceStore::new();
    store.set_failing(true);
    let prefs: Rc<dyn PreferenceStore> = store;
    let mut panel = ControlPanel::new(EventBus::new(), prefs, VirtualClock::new(0.0), PanelConfig::default());

    panel.toggle_theme();

    assert!(log.contains(LogLevel::Warn, "theme not saved"));
}
