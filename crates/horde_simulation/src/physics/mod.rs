//! Physics module
//!
//! - collision: headless CollisionWorld (raycast, overlap sphere, ground check)
//! - knockback: двухфазный ballistic knockback (общий для зомби и игрока)
//! - movement: обычное движение игрока (WASD + jump + gravity)

use bevy::prelude::*;

use crate::SimulationSet;

pub mod collision;
pub mod knockback;
pub mod movement;

// Re-export основных типов
pub use collision::{
    ActorBody, CollisionWorld, Obstacle, RaycastHit, SpatialQuery, GROUND_MASK, LAYER_ENVIRONMENT,
    LAYER_GROUND,
};
pub use knockback::{
    Knockback, KnockbackParams, KnockbackPhase, KnockbackReceiver, KnockbackStep, VerticalImpulse,
};
pub use movement::player_movement;

/// Physics Plugin
///
/// Порядок (через SimulationSet):
/// 1. sync_collision_world — снимок коллайдеров на начало кадра
/// 2. player_movement — обычное движение (Without<Knockback>)
/// 3. integrate_knockback — ballistic интеграция, приземление, warp
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                collision::sync_collision_world.in_set(SimulationSet::CollisionSync),
                movement::player_movement.in_set(SimulationSet::PlayerMovement),
                knockback::integrate_knockback.in_set(SimulationSet::Knockback),
            ),
        );
    }
}
