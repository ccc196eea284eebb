use super::resources::{GeometryId, MaterialId};
use crate::domain::chart::Indicator;
use glam::{Mat4, Quat, Vec3};

/// Local transform of a primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl Transform {
    pub fn at(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Which part of the scene graph a primitive hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Grid and ground plane, created once.
    Environment,
    /// The rotating chart group, rebuilt on view changes.
    Chart,
    /// Transient effects such as particle bursts.
    Effects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveKind {
    Grid,
    Floor,
    CandleBody,
    Wick,
    IndicatorCurve(Indicator),
    IndicatorGlow(Indicator),
    TitleLabel,
    BadgeMarker,
    ParticleBurst,
}

/// A renderable mesh: one geometry plus one material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub layer: Layer,
    pub geometry: GeometryId,
    pub material: MaterialId,
}

/// Resting translation, independent of any running animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestPosition(pub Vec3);

/// Rise-in from below with ease-out cubic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntranceAnimation {
    pub start_ms: f64,
    pub duration_ms: f64,
    pub from_y: f32,
    pub to_y: f32,
}

impl EntranceAnimation {
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }
}

/// Endless vertical bob of a badge marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub origin_y: f32,
    pub speed: f32,
    pub height: f32,
    pub phase_start_ms: f64,
}

impl Pulse {
    pub fn offset(&self, now_ms: f64) -> f32 {
        let t = now_ms - self.phase_start_ms;
        ((t * 0.002 * self.speed as f64).sin() as f32) * self.height
    }
}

/// Expanding, fading particle cloud spawned by a trading action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleBurst {
    pub started_ms: f64,
    pub duration_ms: f64,
    pub spin_per_frame: f32,
    pub expansion: f32,
}

impl ParticleBurst {
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_ms) / self.duration_ms).max(0.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entrance_progress_is_clamped() {
        let anim = EntranceAnimation { start_ms: 100.0, duration_ms: 500.0, from_y: -1.0, to_y: 0.0 };
        assert_eq!(anim.progress(0.0), 0.0);
        assert_eq!(anim.progress(350.0), 0.5);
        assert_eq!(anim.progress(10_000.0), 1.0);
    }

    #[test]
    fn pulse_starts_at_origin() {
        let pulse = Pulse { origin_y: 0.0, speed: 1.5, height: 0.03, phase_start_ms: 200.0 };
        assert_eq!(pulse.offset(200.0), 0.0);
        assert!(pulse.offset(900.0).abs() <= 0.03);
    }
}
