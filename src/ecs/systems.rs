use glam::Quat;
use hecs::{Entity, World};

use super::SceneGraph;
use super::components::{EntranceAnimation, ParticleBurst, Primitive, Pulse, Transform};
use super::resources::{GeometryDesc, MaterialDesc};
use crate::domain::logging::LogComponent;
use crate::log_debug;

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Advance rise-in animations; finished ones are removed from their entity.
pub fn run_entrance_animations(world: &mut World, now_ms: f64) {
    let mut finished = Vec::new();
    for (entity, (anim, transform)) in world.query_mut::<(&EntranceAnimation, &mut Transform)>() {
        let progress = anim.progress(now_ms);
        transform.translation.y = anim.from_y + (anim.to_y - anim.from_y) * ease_out_cubic(progress);
        if progress >= 1.0 {
            finished.push(entity);
        }
    }
    for entity in finished {
        let _ = world.remove_one::<EntranceAnimation>(entity);
    }
}

pub fn run_pulses(world: &mut World, now_ms: f64) {
    for (_, (pulse, transform)) in world.query_mut::<(&Pulse, &mut Transform)>() {
        transform.translation.y = pulse.origin_y + pulse.offset(now_ms);
    }
}

/// Spin, fade and expand every burst; despawn and dispose the expired ones.
///
/// Returns the number of bursts removed this frame.
pub fn advance_particle_bursts(graph: &mut SceneGraph, now_ms: f64) -> usize {
    let SceneGraph { world, resources, .. } = graph;
    let mut expired: Vec<Entity> = Vec::new();

    for (entity, (burst, primitive, transform)) in
        world.query_mut::<(&ParticleBurst, &Primitive, &mut Transform)>()
    {
        let progress = burst.progress(now_ms);
        if progress >= 1.0 {
            expired.push(entity);
            continue;
        }
        transform.rotation *= Quat::from_rotation_y(burst.spin_per_frame);
        if let Ok(MaterialDesc::Points { opacity, .. }) = resources.material_mut(primitive.material) {
            *opacity = 1.0 - progress;
        }
        if let Ok(GeometryDesc::Points { positions }) = resources.geometry_mut(primitive.geometry) {
            for position in positions.iter_mut() {
                *position += *position * progress * burst.expansion;
            }
        }
    }

    for entity in &expired {
        graph.despawn_primitive(*entity);
    }
    if !expired.is_empty() {
        log_debug!(LogComponent::Scene("Effects"), "{} particle burst(s) expired", expired.len());
    }
    expired.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_out_cubic_hits_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn finished_entrance_is_removed() {
        let mut world = World::new();
        let entity = world.spawn((
            Transform::default(),
            EntranceAnimation { start_ms: 0.0, duration_ms: 500.0, from_y: -1.0, to_y: 0.0 },
        ));
        run_entrance_animations(&mut world, 100.0);
        assert!(world.get::<&Transform>(entity).unwrap().translation.y < 0.0);
        run_entrance_animations(&mut world, 600.0);
        assert_eq!(world.get::<&Transform>(entity).unwrap().translation.y, 0.0);
        assert!(world.get::<&EntranceAnimation>(entity).is_err());
    }
}
