//! Spawn helpers (bundles для сцены и тестов)
//!
//! Required Components добирают остальное:
//! - Zombie → ZombieBrain, AnimationFlags, ActorBody
//! - Player → ActorBody, PlayerInput, PlayerMotor, PunchLockout, AnimationFlags

use bevy::prelude::*;

use crate::components::{Health, Player, Zombie};
use crate::config::{PlayerConfig, ZombieConfig};
use crate::navigation::NavAgent;
use crate::physics::{KnockbackReceiver, Obstacle};

/// Зомби на позиции (стартовое здоровье и скорости из тюнинга)
///
/// Стартовая wander точка назначается на первом тике (`assign_initial_wander_destination`).
pub fn zombie_bundle(position: Vec3, config: ZombieConfig) -> impl Bundle {
    (
        Zombie,
        Transform::from_translation(position),
        Health::new(config.max_health),
        NavAgent::new(config.wander_speed, config.stopping_distance),
        config,
    )
}

/// Игрок: kinematic контроллер + knockback sink
pub fn player_bundle(position: Vec3, config: PlayerConfig) -> impl Bundle {
    (
        Player,
        Transform::from_translation(position),
        KnockbackReceiver::new(config.knockback),
        config,
    )
}

/// Статическое препятствие (AABB с центром в `center`)
pub fn obstacle_bundle(center: Vec3, half_extents: Vec3) -> impl Bundle {
    (Transform::from_translation(center), Obstacle::new(half_extents))
}
