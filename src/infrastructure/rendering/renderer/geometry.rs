//! CPU tessellation of the scene graph into vertex lists.

use glam::{Mat4, Vec3};

use crate::ecs::SceneGraph;
use crate::ecs::components::{Layer, Transform};
use crate::ecs::resources::{Color, GeometryDesc, MaterialDesc};
use crate::infrastructure::rendering::gpu_structures::{SceneUniforms, SceneVertex};
use crate::scene::camera::PerspectiveCamera;
use crate::scene::environment::Environment;

/// Vertices for one frame: a triangle list and a line list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameGeometry {
    pub triangles: Vec<SceneVertex>,
    pub lines: Vec<SceneVertex>,
}

impl FrameGeometry {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn line_count(&self) -> usize {
        self.lines.len() / 2
    }
}

/// Unit cube faces as (normal, four corners in CCW order).
const CUBE_FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    ([1.0, 0.0, 0.0], [[0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5]]),
    ([-1.0, 0.0, 0.0], [[-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5]]),
    ([0.0, 1.0, 0.0], [[-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]]),
    ([0.0, -1.0, 0.0], [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5]]),
    ([0.0, 0.0, 1.0], [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]]),
    ([0.0, 0.0, -1.0], [[0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5]]),
];

/// Vertices emitted per box (6 faces, 2 triangles each).
pub const BOX_VERTICES: usize = 36;

struct Surface {
    color: [f32; 4],
    emissive: f32,
    lit: bool,
}

fn push_box(out: &mut Vec<SceneVertex>, model: Mat4, size: Vec3, surface: &Surface) {
    for (normal, corners) in CUBE_FACES.iter() {
        let normal = model.transform_vector3(Vec3::from(*normal)).normalize_or_zero().to_array();
        let world: Vec<[f32; 3]> =
            corners.iter().map(|c| model.transform_point3(Vec3::from(*c) * size).to_array()).collect();
        for index in [0usize, 1, 2, 0, 2, 3] {
            out.push(if surface.lit {
                SceneVertex::lit(world[index], normal, surface.color, surface.emissive)
            } else {
                SceneVertex::unlit(world[index], surface.color)
            });
        }
    }
}

fn surface_of(material: &MaterialDesc) -> Surface {
    match material {
        MaterialDesc::Standard { color, emissive, emissive_intensity, .. } => Surface {
            color: color.to_rgba(1.0),
            emissive: if emissive.0 == 0 { 0.0 } else { *emissive_intensity },
            lit: true,
        },
        MaterialDesc::Line { color } => Surface { color: color.to_rgba(1.0), emissive: 0.0, lit: false },
        MaterialDesc::Points { color, opacity, .. } => {
            Surface { color: color.to_rgba(*opacity), emissive: 0.0, lit: false }
        }
        MaterialDesc::Grid { lines, .. } => Surface { color: lines.to_rgba(1.0), emissive: 0.0, lit: false },
    }
}

fn model_matrix(transform: &Transform, layer: Layer, chart_rotation: f32) -> Mat4 {
    match layer {
        Layer::Chart => Mat4::from_rotation_y(chart_rotation) * transform.matrix(),
        _ => transform.matrix(),
    }
}

/// Tessellate every live primitive. Chart primitives are rotated with the
/// chart group.
pub fn build_frame(graph: &SceneGraph) -> FrameGeometry {
    let mut frame = FrameGeometry::default();

    for (primitive, transform) in graph.primitives() {
        let (Some(geometry), Some(material)) =
            (graph.resources.geometry(primitive.geometry), graph.resources.material(primitive.material))
        else {
            continue;
        };
        let model = model_matrix(&transform, primitive.layer, graph.chart_rotation);
        let surface = surface_of(material);

        match geometry {
            GeometryDesc::Box { width, height, depth } => {
                push_box(&mut frame.triangles, model, Vec3::new(*width, *height, *depth), &surface);
            }
            GeometryDesc::Plane { width, depth } => {
                let normal = model.transform_vector3(Vec3::Y).normalize_or_zero().to_array();
                let (hw, hd) = (width * 0.5, depth * 0.5);
                let corners = [[-hw, 0.0, hd], [hw, 0.0, hd], [hw, 0.0, -hd], [-hw, 0.0, -hd]]
                    .map(|c| model.transform_point3(Vec3::from(c)).to_array());
                for index in [0usize, 1, 2, 0, 2, 3] {
                    frame.triangles.push(SceneVertex::lit(corners[index], normal, surface.color, surface.emissive));
                }
            }
            GeometryDesc::Grid { size, divisions } => {
                let center = match material {
                    MaterialDesc::Grid { center, .. } => *center,
                    _ => Color::WHITE,
                };
                push_grid(&mut frame.lines, model, *size, *divisions, center.to_rgba(1.0), surface.color);
            }
            GeometryDesc::Polyline { points } => {
                for pair in points.windows(2) {
                    for point in pair {
                        frame.lines.push(SceneVertex::unlit(model.transform_point3(*point).to_array(), surface.color));
                    }
                }
            }
            GeometryDesc::Points { positions } => {
                let size = match material {
                    MaterialDesc::Points { size, .. } => *size,
                    _ => 0.05,
                };
                for position in positions {
                    let point_model = model * Mat4::from_translation(*position);
                    push_box(&mut frame.triangles, point_model, Vec3::splat(size), &surface);
                }
            }
        }
    }
    frame
}

fn push_grid(out: &mut Vec<SceneVertex>, model: Mat4, size: f32, divisions: u32, center: [f32; 4], lines: [f32; 4]) {
    let divisions = divisions.max(1);
    let half = size * 0.5;
    let step = size / divisions as f32;
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if i * 2 == divisions { center } else { lines };
        for (a, b) in [(Vec3::new(-half, 0.0, k), Vec3::new(half, 0.0, k)), (Vec3::new(k, 0.0, -half), Vec3::new(k, 0.0, half))] {
            out.push(SceneVertex::unlit(model.transform_point3(a).to_array(), color));
            out.push(SceneVertex::unlit(model.transform_point3(b).to_array(), color));
        }
    }
}

/// Camera, light and fog uniforms for the current frame.
pub fn frame_uniforms(camera: &PerspectiveCamera, environment: &Environment) -> SceneUniforms {
    let lights = &environment.lights;
    let towards_light = lights.directional_position.normalize_or_zero();
    let [fr, fg, fb] = environment.fog.color.to_rgb();
    SceneUniforms {
        view_proj: camera.view_projection().to_cols_array_2d(),
        camera_position: camera.position.extend(1.0).to_array(),
        ambient: [1.0, 1.0, 1.0, lights.ambient],
        point_light: lights.point_position.extend(lights.point_intensity).to_array(),
        directional_light: towards_light.extend(lights.directional_intensity).to_array(),
        fog_color: [fr, fg, fb, 1.0],
        fog_range: [environment.fog.near, environment.fog.far, 0.0, 0.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::PrimitiveKind;

    #[test]
    fn box_is_twelve_triangles() {
        let mut graph = SceneGraph::new();
        graph.spawn_primitive(
            PrimitiveKind::TitleLabel,
            Layer::Chart,
            GeometryDesc::Box { width: 1.5, height: 0.3, depth: 0.05 },
            MaterialDesc::standard(Color(0x3377ff), 0.7, 0.2),
            Transform::default(),
        );
        let frame = build_frame(&graph);
        assert_eq!(frame.triangles.len(), BOX_VERTICES);
        assert_eq!(frame.triangle_count(), 12);
        assert!(frame.lines.is_empty());
    }

    #[test]
    fn grid_emits_two_lines_per_division_edge() {
        let mut graph = SceneGraph::new();
        graph.spawn_primitive(
            PrimitiveKind::Grid,
            Layer::Environment,
            GeometryDesc::Grid { size: 20.0, divisions: 20 },
            MaterialDesc::Grid { center: Color(0x444444), lines: Color(0x222222) },
            Transform::default(),
        );
        assert_eq!(build_frame(&graph).line_count(), 42);
    }
}
