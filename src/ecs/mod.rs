use glam::Vec3;
use hecs::{Entity, World};

use crate::domain::logging::LogComponent;
use crate::log_warn;

pub mod components;
pub mod resources;
pub mod systems;

use components::{Layer, Primitive, PrimitiveKind, RestPosition, Transform};
use resources::{GeometryDesc, MaterialDesc, ResourceRegistry};

/// Arena holding every primitive of the scene together with the registry
/// that owns their geometries and materials.
#[derive(Default)]
pub struct SceneGraph {
    pub world: World,
    pub resources: ResourceRegistry,
    /// Y rotation of the chart group in radians.
    pub chart_rotation: f32,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate resources for a mesh and attach it to `layer`.
    pub fn spawn_primitive(
        &mut self,
        kind: PrimitiveKind,
        layer: Layer,
        geometry: GeometryDesc,
        material: MaterialDesc,
        transform: Transform,
    ) -> Entity {
        let geometry = self.resources.create_geometry(geometry);
        let material = self.resources.create_material(material);
        let primitive = Primitive { kind, layer, geometry, material };
        self.world.spawn((primitive, transform, RestPosition(transform.translation)))
    }

    /// Attach an extra component (animation state) to a primitive.
    pub fn with_component<C: hecs::Component>(&mut self, entity: Entity, component: C) {
        if self.world.insert_one(entity, component).is_err() {
            log_warn!(LogComponent::Scene("Graph"), "component for despawned entity {:?} dropped", entity);
        }
    }

    /// Detach a primitive and dispose its geometry and material.
    pub fn despawn_primitive(&mut self, entity: Entity) {
        let primitive = match self.world.get::<&Primitive>(entity) {
            Ok(primitive) => *primitive,
            Err(_) => return,
        };
        if self.world.despawn(entity).is_ok() {
            self.resources.release(primitive.geometry, primitive.material);
        }
    }

    /// Remove every primitive of a layer. Returns how many were removed.
    pub fn clear_layer(&mut self, layer: Layer) -> usize {
        let entities: Vec<Entity> = self
            .world
            .query::<&Primitive>()
            .iter()
            .filter(|(_, primitive)| primitive.layer == layer)
            .map(|(entity, _)| entity)
            .collect();
        let removed = entities.len();
        for entity in entities {
            self.despawn_primitive(entity);
        }
        removed
    }

    pub fn dispose_all(&mut self) {
        for layer in [Layer::Effects, Layer::Chart, Layer::Environment] {
            self.clear_layer(layer);
        }
    }

    pub fn count(&self, kind: PrimitiveKind) -> usize {
        self.world.query::<&Primitive>().iter().filter(|(_, primitive)| primitive.kind == kind).count()
    }

    pub fn layer_len(&self, layer: Layer) -> usize {
        self.world.query::<&Primitive>().iter().filter(|(_, primitive)| primitive.layer == layer).count()
    }

    /// Resting positions of a layer, ordered by kind then position.
    pub fn rest_positions(&self, layer: Layer) -> Vec<(PrimitiveKind, Vec3)> {
        let mut positions: Vec<(PrimitiveKind, Vec3)> = self
            .world
            .query::<(&Primitive, &RestPosition)>()
            .iter()
            .filter(|(_, (primitive, _))| primitive.layer == layer)
            .map(|(_, (primitive, rest))| (primitive.kind, rest.0))
            .collect();
        positions.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.x.total_cmp(&b.1.x))
                .then(a.1.y.total_cmp(&b.1.y))
                .then(a.1.z.total_cmp(&b.1.z))
        });
        positions
    }

    /// Snapshot of every primitive with its current transform.
    pub fn primitives(&self) -> Vec<(Primitive, Transform)> {
        self.world.query::<(&Primitive, &Transform)>().iter().map(|(_, (p, t))| (*p, *t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::resources::Color;

    fn cube(graph: &mut SceneGraph, layer: Layer) -> Entity {
        graph.spawn_primitive(
            PrimitiveKind::BadgeMarker,
            layer,
            GeometryDesc::Box { width: 0.06, height: 0.06, depth: 0.06 },
            MaterialDesc::standard(Color::WHITE, 0.5, 0.5),
            Transform::default(),
        )
    }

    #[test]
    fn clearing_a_layer_leaves_others_alone() {
        let mut graph = SceneGraph::new();
        cube(&mut graph, Layer::Chart);
        cube(&mut graph, Layer::Chart);
        cube(&mut graph, Layer::Environment);
        assert_eq!(graph.clear_layer(Layer::Chart), 2);
        assert_eq!(graph.layer_len(Layer::Environment), 1);
        assert_eq!(graph.resources.live_geometries(), 1);
    }

    #[test]
    fn despawning_twice_disposes_once() {
        let mut graph = SceneGraph::new();
        let entity = cube(&mut graph, Layer::Effects);
        graph.despawn_primitive(entity);
        graph.despawn_primitive(entity);
        let stats = graph.resources.stats();
        assert_eq!(stats.geometries_disposed, 1);
        assert_eq!(stats.materials_disposed, 1);
        assert_eq!(stats.double_disposals, 0);
    }
}
