use std::f32::consts::FRAC_PI_2;

use trading_scene::scene::camera::{OrbitControls, PerspectiveCamera};
use trading_scene::scene::config::{CameraConfig, ControlsConfig};

fn rig() -> (PerspectiveCamera, OrbitControls) {
    let camera = PerspectiveCamera::new(&CameraConfig::default(), 16.0 / 9.0);
    let controls = OrbitControls::new(&camera, ControlsConfig::default());
    (camera, controls)
}

#[test]
fn starts_at_configured_distance() {
    let (_, controls) = rig();
    assert!((controls.distance() - 25.25f32.sqrt()).abs() < 1e-5);
}

#[test]
fn zoom_steps_are_clamped() {
    let (mut camera, mut controls) = rig();
    let start = controls.distance();

    controls.zoom_in();
    assert!((controls.distance() - start * 0.8).abs() < 1e-5);
    for _ in 0..5 {
        controls.zoom_in();
    }
    assert_eq!(controls.distance(), 3.0);

    for _ in 0..10 {
        controls.zoom_out();
    }
    assert_eq!(controls.distance(), 10.0);

    controls.update(&mut camera);
    assert!((camera.position.length() - 10.0).abs() < 1e-4);
}

#[test]
fn wheel_dollies_in_both_directions() {
    let (_, mut controls) = rig();
    let start = controls.distance();

    controls.wheel(120.0);
    assert!(controls.distance() > start);
    controls.wheel(-120.0);
    controls.wheel(-120.0);
    assert!(controls.distance() < start);
    let here = controls.distance();
    controls.wheel(0.0);
    assert_eq!(controls.distance(), here);
}

#[test]
fn reset_restores_initial_pose() {
    let (mut camera, mut controls) = rig();
    let initial = camera.position;

    controls.zoom_out();
    controls.rotate(300.0, -80.0);
    for _ in 0..20 {
        controls.update(&mut camera);
    }
    assert!((camera.position - initial).length() > 0.1);

    controls.reset();
    controls.update(&mut camera);
    assert!((camera.position - initial).length() < 1e-4);
}

#[test]
fn camera_never_goes_below_the_floor() {
    let (mut camera, mut controls) = rig();
    for _ in 0..50 {
        controls.rotate(0.0, -400.0);
        controls.update(&mut camera);
    }
    assert!(controls.polar_angle() <= FRAC_PI_2 + 1e-6);
    assert!(camera.position.y >= -1e-4);

    for _ in 0..50 {
        controls.rotate(0.0, 400.0);
        controls.update(&mut camera);
    }
    assert!(controls.polar_angle() > 0.0);
}

#[test]
fn damping_spreads_a_drag_over_frames() {
    let (mut camera, mut controls) = rig();
    controls.rotate(100.0, 0.0);

    controls.update(&mut camera);
    let first = camera.position;
    controls.update(&mut camera);
    let second = camera.position;

    assert!((second - first).length() > 0.0);
    assert!((first.y - second.y).abs() < 1e-5);
}

#[test]
fn aspect_tracks_surface_and_ignores_zero_height() {
    let (mut camera, _) = rig();
    camera.set_aspect(400, 300);
    assert!((camera.aspect - 4.0 / 3.0).abs() < 1e-6);

    camera.set_aspect(400, 0);
    assert!((camera.aspect - 4.0 / 3.0).abs() < 1e-6);
}

#[test]
fn sync_does_not_consume_pending_rotation() {
    let (mut synced, mut with_sync) = rig();
    let (mut plain, mut without_sync) = rig();
    with_sync.rotate(100.0, 0.0);
    without_sync.rotate(100.0, 0.0);

    with_sync.zoom_in();
    with_sync.sync(&mut synced);
    assert!(synced.position.x.abs() < 1e-5);
    assert!((synced.position.length() - with_sync.distance()).abs() < 1e-4);

    without_sync.zoom_in();
    for _ in 0..10 {
        with_sync.update(&mut synced);
        without_sync.update(&mut plain);
    }
    assert!((synced.position - plain.position).length() < 1e-5);
}

#[test]
fn inconsistent_limits_do_not_panic() {
    let camera = PerspectiveCamera::new(&CameraConfig::default(), 1.0);
    let inverted = ControlsConfig { min_distance: 12.0, max_distance: 4.0, ..ControlsConfig::default() };
    let mut controls = OrbitControls::new(&camera, inverted);
    controls.zoom_in();
    assert!(controls.distance().is_finite());

    let flat = ControlsConfig { max_polar_angle: 0.0, ..ControlsConfig::default() };
    let mut camera = camera;
    let mut controls = OrbitControls::new(&camera, flat);
    controls.update(&mut camera);
    assert!(controls.polar_angle().is_finite());
}
