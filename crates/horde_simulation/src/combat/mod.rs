//! Combat system module
//!
//! ECS ответственность:
//! - Combat rules: attack cooldown, damage, retarget, death
//! - Events: ZombieAttacked, DamageIntent, ZombieDied, EffectSpawnRequested
//!
//! Визуальный слой ответственность:
//! - спавн эффектов по EffectSpawnRequested
//! - анимации удара (AnimationFlags)

use bevy::prelude::*;

use crate::SimulationSet;

pub mod attack;
pub mod damage;
pub mod punch;


// Re-export основных типов
pub use attack::{attack_knockback_direction, try_attack, ZombieAttacked};
pub use damage::{
    apply_damage_intents, plan_damage_reaction, DamageFollowUp, DamageIntent, DamageReaction,
    EffectKind, EffectSpawnRequested, ZombieDied,
};
pub use punch::player_punch;

/// Combat Plugin
///
/// Порядок выполнения:
/// 1. player_punch (SimulationSet::PlayerInput) — DamageIntent от игрока
/// 2. apply_damage_intents (SimulationSet::Damage) — урон, signaling, смерть
///
/// Атаки зомби идут из FSM (SimulationSet::Ai) → ZombieAttacked.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<ZombieAttacked>()
            .add_event::<DamageIntent>()
            .add_event::<ZombieDied>()
            .add_event::<EffectSpawnRequested>();

        app.add_systems(
            Update,
            (
                punch::player_punch.in_set(SimulationSet::PlayerInput),
                damage::apply_damage_intents.in_set(SimulationSet::Damage),
            ),
        );
    }
}
