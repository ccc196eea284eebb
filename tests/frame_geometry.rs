use rand::SeedableRng;
use rand::rngs::StdRng;
use trading_scene::domain::chart::{Indicator, Theme};
use trading_scene::domain::market_data::{SampleDataStore, Timeframe};
use trading_scene::ecs::SceneGraph;
use trading_scene::infrastructure::rendering::renderer::geometry::BOX_VERTICES;
use trading_scene::infrastructure::rendering::{build_frame, frame_uniforms};
use trading_scene::scene::camera::PerspectiveCamera;
use trading_scene::scene::chart_builder::rebuild_chart;
use trading_scene::scene::config::{CameraConfig, ChartLayout, EnvironmentConfig};
use trading_scene::scene::environment::Environment;
use trading_scene::view_state::ViewState;

fn short_candles() -> &'static [trading_scene::domain::market_data::CandleRecord] {
    SampleDataStore::builtin().candles(Timeframe::Short).unwrap_or(&[])
}

#[test]
fn environment_alone_is_grid_lines_and_a_floor_quad() {
    let mut graph = SceneGraph::new();
    Environment::build(&mut graph, &EnvironmentConfig::default(), Theme::Dark);

    let frame = build_frame(&graph);

    assert_eq!(frame.line_count(), 42);
    assert_eq!(frame.triangle_count(), 2);
}

#[test]
fn chart_adds_boxes_and_curves_add_lines() {
    let mut graph = SceneGraph::new();
    Environment::build(&mut graph, &EnvironmentConfig::default(), Theme::Dark);
    let mut rng = StdRng::seed_from_u64(7);
    let layout = ChartLayout::default();

    let mut view = ViewState::new(Timeframe::Short);
    rebuild_chart(&mut graph, short_candles(), &view, &layout, 0.0, &mut rng);
    let plain = build_frame(&graph);
    assert_eq!(plain.line_count(), 42);
    assert_eq!(plain.triangles.len() % BOX_VERTICES, 6);
    // floor quad plus at least bodies, wicks and the label
    assert!(plain.triangles.len() >= 6 + 11 * BOX_VERTICES);

    view.set_indicator(Indicator::Macd, true);
    rebuild_chart(&mut graph, short_candles(), &view, &layout, 0.0, &mut rng);
    let with_curve = build_frame(&graph);
    assert!(with_curve.line_count() > 42);
    assert_eq!(with_curve.triangles.len(), plain.triangles.len());
}

#[test]
fn uniforms_follow_camera_and_fog() {
    let mut graph = SceneGraph::new();
    let mut environment = Environment::build(&mut graph, &EnvironmentConfig::default(), Theme::Dark);
    environment.apply_theme(&mut graph, Theme::Light);
    let camera = PerspectiveCamera::new(&CameraConfig::default(), 4.0 / 3.0);

    let uniforms = frame_uniforms(&camera, &environment);

    assert_eq!(uniforms.camera_position, [0.0, 0.5, 5.0, 1.0]);
    assert_eq!(&uniforms.fog_color[..3], &environment.fog.color.to_rgb()[..]);
    assert_eq!(uniforms.fog_range[0], 15.0);
    assert_eq!(uniforms.fog_range[1], 30.0);
    assert_eq!(uniforms.view_proj, camera.view_projection().to_cols_array_2d());
}
