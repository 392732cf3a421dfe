//! Animation флаги для визуального слоя
//!
//! Чисто наблюдательные: ядро симуляции их не читает.
//! Визуальный слой мапит их на параметры аниматора (`setFlag(name, bool)`).

use bevy::prelude::*;

use crate::ai::ZombieBrain;
use crate::components::{Player, PlayerInput, PunchLockout};
use crate::config::ZombieConfig;
use crate::navigation::NavAgent;

/// Минимальная скорость для "идёт"
const WALKING_SPEED_THRESHOLD: f32 = 0.1;

/// Минимальный input для "идёт" (игрок)
const WALKING_INPUT_THRESHOLD: f32 = 0.1;

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct AnimationFlags {
    pub is_walking: bool,
    pub is_attacking: bool,
}

impl AnimationFlags {
    pub const IS_WALKING: &'static str = "IsWalking";
    pub const IS_ATTACKING: &'static str = "IsAttacking";

    /// Пары (имя параметра аниматора, значение)
    pub fn flags(&self) -> [(&'static str, bool); 2] {
        [
            (Self::IS_WALKING, self.is_walking),
            (Self::IS_ATTACKING, self.is_attacking),
        ]
    }
}

/// Зомби: идёт если агент не остановлен и реально движется,
/// атакует если цель в melee дистанции
pub fn update_zombie_animation_flags(
    mut zombies: Query<(&Transform, &NavAgent, &ZombieBrain, &ZombieConfig, &mut AnimationFlags)>,
    targets: Query<&Transform>,
) {
    for (transform, nav, brain, config, mut flags) in zombies.iter_mut() {
        let is_walking =
            !nav.is_stopped() && nav.velocity().length() > WALKING_SPEED_THRESHOLD;

        let is_attacking = brain
            .current_target()
            .and_then(|target| targets.get(target).ok())
            .is_some_and(|target| {
                transform.translation.distance(target.translation) <= config.melee_range
            });

        // Change detection: пишем только при изменении
        flags.set_if_neq(AnimationFlags {
            is_walking,
            is_attacking,
        });
    }
}

/// Игрок: идёт при ненулевом input, атакует во время punch lockout
pub fn update_player_animation_flags(
    mut players: Query<(&PlayerInput, &PunchLockout, &mut AnimationFlags), With<Player>>,
) {
    for (input, lockout, mut flags) in players.iter_mut() {
        flags.set_if_neq(AnimationFlags {
            is_walking: input.move_axis.length() > WALKING_INPUT_THRESHOLD,
            is_attacking: lockout.is_active(),
        });
    }
}
