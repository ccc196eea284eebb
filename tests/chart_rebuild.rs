use quickcheck_macros::quickcheck;
use rand::SeedableRng;
use rand::rngs::StdRng;
use strum::IntoEnumIterator;
use trading_scene::domain::chart::Indicator;
use trading_scene::domain::market_data::{CandleRecord, Timeframe};
use trading_scene::ecs::SceneGraph;
use trading_scene::ecs::components::{Layer, PrimitiveKind};
use trading_scene::scene::chart_builder::rebuild_chart;
use trading_scene::scene::config::ChartLayout;
use trading_scene::view_state::ViewState;

fn candles_from(raw: &[(u16, u16, u8, u8)]) -> Vec<CandleRecord> {
    raw.iter()
        .enumerate()
        .map(|(i, &(open, close, up, down))| {
            let (open, close) = (open as f64, close as f64);
            CandleRecord::new(open, open.max(close) + up as f64, open.min(close) - down as f64, close, i as i64 * 60_000)
        })
        .collect()
}

fn indicator_set(mask: u8) -> Vec<Indicator> {
    Indicator::iter().enumerate().filter(|(i, _)| mask & (1 << i) != 0).map(|(_, indicator)| indicator).collect()
}

#[quickcheck]
fn one_body_and_wick_per_candle(raw: Vec<(u16, u16, u8, u8)>, mask: u8) -> bool {
    let candles = candles_from(&raw);
    let mut view = ViewState::new(Timeframe::Medium);
    for indicator in indicator_set(mask) {
        view.set_indicator(indicator, true);
    }
    let mut graph = SceneGraph::new();
    let mut rng = StdRng::seed_from_u64(1);

    let summary = rebuild_chart(&mut graph, &candles, &view, &ChartLayout::default(), 0.0, &mut rng);

    let curves_expected = if candles.is_empty() { 0 } else { view.enabled_indicators.len() };
    graph.count(PrimitiveKind::CandleBody) == candles.len()
        && graph.count(PrimitiveKind::Wick) == candles.len()
        && graph.count(PrimitiveKind::TitleLabel) == 1
        && graph.count(PrimitiveKind::BadgeMarker) == 4
        && summary.candles == candles.len()
        && summary.curves == curves_expected
}

#[quickcheck]
fn disabling_indicators_removes_their_curves(raw: Vec<(u16, u16, u8, u8)>, mask: u8) -> bool {
    let candles = candles_from(&raw);
    let layout = ChartLayout::default();
    let mut graph = SceneGraph::new();
    let mut rng = StdRng::seed_from_u64(2);
    let mut view = ViewState::new(Timeframe::Short);
    let chosen = indicator_set(mask);

    for indicator in &chosen {
        view.set_indicator(*indicator, true);
    }
    rebuild_chart(&mut graph, &candles, &view, &layout, 0.0, &mut rng);
    for indicator in &chosen {
        view.set_indicator(*indicator, false);
    }
    rebuild_chart(&mut graph, &candles, &view, &layout, 0.0, &mut rng);

    Indicator::iter().all(|indicator| {
        graph.count(PrimitiveKind::IndicatorCurve(indicator)) == 0
            && graph.count(PrimitiveKind::IndicatorGlow(indicator)) == 0
    }) && graph.count(PrimitiveKind::CandleBody) == candles.len()
}

#[quickcheck]
fn rebuild_is_idempotent(raw: Vec<(u16, u16, u8, u8)>, mask: u8) -> bool {
    let candles = candles_from(&raw);
    let layout = ChartLayout::default();
    let mut graph = SceneGraph::new();
    let mut rng = StdRng::seed_from_u64(3);
    let mut view = ViewState::new(Timeframe::Long);
    for indicator in indicator_set(mask) {
        view.set_indicator(indicator, true);
    }

    rebuild_chart(&mut graph, &candles, &view, &layout, 0.0, &mut rng);
    let first = graph.rest_positions(Layer::Chart);
    let live = graph.resources.live_geometries();
    rebuild_chart(&mut graph, &candles, &view, &layout, 0.0, &mut rng);

    graph.rest_positions(Layer::Chart) == first && graph.resources.live_geometries() == live
}

#[test]
fn rebuild_releases_replaced_resources() {
    let candles = candles_from(&[(100, 110, 5, 5), (110, 95, 3, 8), (95, 120, 1, 2)]);
    let layout = ChartLayout::default();
    let mut graph = SceneGraph::new();
    let mut rng = StdRng::seed_from_u64(4);
    let mut view = ViewState::new(Timeframe::Short);
    view.set_indicator(Indicator::MovingAverage, true);

    for _ in 0..5 {
        rebuild_chart(&mut graph, &candles, &view, &layout, 0.0, &mut rng);
    }

    let stats = graph.resources.stats();
    assert_eq!(graph.resources.live_geometries(), graph.layer_len(Layer::Chart));
    assert_eq!((stats.geometries_created - stats.geometries_disposed) as usize, graph.layer_len(Layer::Chart));
    assert_eq!(stats.double_disposals, 0);
}
