//! Zombie melee attack (cooldown gate + knockback direction).

use bevy::prelude::*;

use crate::ai::ZombieBrain;
use crate::config::ZombieConfig;

/// Событие: зомби провёл атаку
///
/// `knockback_applied == false` — у цели нет KnockbackReceiver,
/// атака засчитана без физического эффекта.
#[derive(Event, Debug, Clone)]
pub struct ZombieAttacked {
    pub zombie: Entity,
    pub target: Entity,
    pub direction: Vec3,
    pub knockback_applied: bool,
}

/// Cooldown gate: `now - last_attack_time >= attack_cooldown`
///
/// Первая атака доступна сразу. При успехе обновляет `last_attack_time`.
pub fn try_attack(brain: &mut ZombieBrain, config: &ZombieConfig, now: f32) -> bool {
    if let Some(last) = brain.last_attack_time {
        if now - last < config.attack_cooldown {
            return false;
        }
    }

    brain.last_attack_time = Some(now);
    true
}

/// Направление knockback цели: от зомби к цели + вертикальный bias (re-normalized)
pub fn attack_knockback_direction(from: Vec3, to: Vec3, vertical_bias: f32) -> Vec3 {
    ((to - from).normalize_or_zero() + Vec3::Y * vertical_bias).normalize_or_zero()
}
