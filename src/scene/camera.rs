use glam::{Mat4, Vec3};

use super::config::{CameraConfig, ControlsConfig, MIN_POLAR_ANGLE};

const WHEEL_STEP: f32 = 0.95;

/// Right-handed perspective camera looking at a target.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            fov_y: config.fov_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
            position: Vec3::from(config.position),
            target: Vec3::from(config.target),
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Damped orbit around a target, in spherical coordinates.
///
/// `phi` is the polar angle from +Y and is kept in `[0, max_polar_angle]` so
/// the camera never dips below the ground plane.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    target: Vec3,
    radius: f32,
    theta: f32,
    phi: f32,
    delta_theta: f32,
    delta_phi: f32,
    config: ControlsConfig,
    initial: (Vec3, f32, f32, f32),
}

impl OrbitControls {
    pub fn new(camera: &PerspectiveCamera, config: ControlsConfig) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.length().max(config.min_distance).min(config.max_distance);
        let theta = offset.x.atan2(offset.z);
        let phi = if offset.length() > 0.0 { (offset.y / offset.length()).clamp(-1.0, 1.0).acos() } else { 0.0 };
        let phi = phi.max(MIN_POLAR_ANGLE).min(config.max_polar_angle);
        Self {
            target: camera.target,
            radius,
            theta,
            phi,
            delta_theta: 0.0,
            delta_phi: 0.0,
            config,
            initial: (camera.target, radius, theta, phi),
        }
    }

    /// Queue a rotation from a pointer drag in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.delta_theta -= dx * self.config.rotate_speed;
        self.delta_phi -= dy * self.config.rotate_speed;
    }

    /// Scale the orbit distance, clamped to the configured range.
    pub fn dolly(&mut self, factor: f32) {
        if factor > 0.0 {
            self.radius = (self.radius * factor).max(self.config.min_distance).min(self.config.max_distance);
        }
    }

    pub fn zoom_in(&mut self) {
        self.dolly(self.config.zoom_in_factor);
    }

    pub fn zoom_out(&mut self) {
        self.dolly(self.config.zoom_out_factor);
    }

    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y > 0.0 {
            self.dolly(1.0 / WHEEL_STEP);
        } else if delta_y < 0.0 {
            self.dolly(WHEEL_STEP);
        }
    }

    pub fn reset(&mut self) {
        let (target, radius, theta, phi) = self.initial;
        self.target = target;
        self.radius = radius;
        self.theta = theta;
        self.phi = phi;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
    }

    /// Apply one step of damped motion and write the result into `camera`.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let damping = self.config.damping_factor;
        self.theta += self.delta_theta * damping;
        self.phi += self.delta_phi * damping;
        self.delta_theta *= 1.0 - damping;
        self.delta_phi *= 1.0 - damping;
        self.phi = self.phi.max(MIN_POLAR_ANGLE).min(self.config.max_polar_angle);
        self.sync(camera);
    }

    /// Write the current orbit into `camera` without consuming pending motion.
    pub fn sync(&self, camera: &mut PerspectiveCamera) {
        camera.target = self.target;
        camera.position = self.target + self.offset();
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn polar_angle(&self) -> f32 {
        self.phi
    }

    fn offset(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(self.radius * sin_phi * self.theta.sin(), self.radius * self.phi.cos(), self.radius * sin_phi * self.theta.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> (PerspectiveCamera, OrbitControls) {
        let camera = PerspectiveCamera::new(&CameraConfig::default(), 4.0 / 3.0);
        let controls = OrbitControls::new(&camera, ControlsConfig::default());
        (camera, controls)
    }

    #[test]
    fn initial_orbit_reproduces_camera_position() {
        let (mut camera, mut controls) = controls();
        controls.update(&mut camera);
        assert!((camera.position - Vec3::new(0.0, 0.5, 5.0)).length() < 1e-4);
    }

    #[test]
    fn dragging_down_never_goes_below_the_horizon() {
        let (mut camera, mut controls) = controls();
        for _ in 0..200 {
            controls.rotate(0.0, -500.0);
            controls.update(&mut camera);
        }
        assert!(controls.polar_angle() <= std::f32::consts::FRAC_PI_2 + 1e-6);
        assert!(camera.position.y >= -1e-4);
    }
}
