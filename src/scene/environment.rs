use glam::Vec3;
use hecs::Entity;

use super::config::EnvironmentConfig;
use crate::domain::chart::Theme;
use crate::domain::logging::LogComponent;
use crate::ecs::SceneGraph;
use crate::ecs::components::{Layer, Primitive, PrimitiveKind, Transform};
use crate::ecs::resources::{Color, GeometryDesc, MaterialDesc};
use crate::log_warn;

const GRID_CENTER: Color = Color(0x444444);
const GRID_LINES: Color = Color(0x222222);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights {
    pub ambient: f32,
    pub point_position: Vec3,
    pub point_intensity: f32,
    pub directional_position: Vec3,
    pub directional_intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

/// Lights, fog, grid and ground plane. Created once per scene.
#[derive(Debug)]
pub struct Environment {
    pub lights: Lights,
    pub fog: Fog,
    pub background: Color,
    floor: Entity,
}

impl Environment {
    pub fn build(graph: &mut SceneGraph, config: &EnvironmentConfig, theme: Theme) -> Self {
        graph.spawn_primitive(
            PrimitiveKind::Grid,
            Layer::Environment,
            GeometryDesc::Grid { size: config.grid_size, divisions: config.grid_divisions },
            MaterialDesc::Grid { center: GRID_CENTER, lines: GRID_LINES },
            Transform::at(Vec3::new(0.0, config.floor_y, 0.0)),
        );
        let floor = graph.spawn_primitive(
            PrimitiveKind::Floor,
            Layer::Environment,
            GeometryDesc::Plane { width: config.floor_size, depth: config.floor_size },
            MaterialDesc::standard(Color(theme.background()), 0.5, 0.3),
            Transform::at(Vec3::new(0.0, config.floor_y, 0.0)),
        );

        Self {
            lights: Lights {
                ambient: config.ambient_intensity,
                point_position: Vec3::from(config.point_position),
                point_intensity: config.point_intensity,
                directional_position: Vec3::from(config.directional_position),
                directional_intensity: config.directional_intensity,
            },
            fog: Fog { color: Color(theme.background()), near: config.fog_near, far: config.fog_far },
            background: Color(theme.background()),
            floor,
        }
    }

    /// Re-tint background, fog and ground plane in place.
    pub fn apply_theme(&mut self, graph: &mut SceneGraph, theme: Theme) {
        let tint = Color(theme.background());
        self.background = tint;
        self.fog.color = tint;

        let material = match graph.world.get::<&Primitive>(self.floor) {
            Ok(primitive) => primitive.material,
            Err(_) => {
                log_warn!(LogComponent::Scene("Environment"), "ground plane is gone, theme not applied to it");
                return;
            }
        };
        match graph.resources.material_mut(material) {
            Ok(MaterialDesc::Standard { color, .. }) => *color = tint,
            Ok(_) => {}
            Err(e) => {
                log_warn!(LogComponent::Scene("Environment"), "{}", e);
            }
        }
    }

    pub fn floor_color(&self, graph: &SceneGraph) -> Option<Color> {
        let primitive = *graph.world.get::<&Primitive>(self.floor).ok()?;
        match graph.resources.material(primitive.material)? {
            MaterialDesc::Standard { color, .. } => Some(*color),
            _ => None,
        }
    }
}
