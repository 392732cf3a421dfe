//! AI decision-making module
//!
//! Wander/Chase FSM для зомби + pack-alert signaling.
//!
//! - components: ZombieBrain (state, provenance, cooldown)
//! - signaling: single-hop broadcast (чистое планирование + патчи)
//! - systems: FSM tick, стартовая wander точка

use bevy::prelude::*;

use crate::SimulationSet;

pub mod components;
pub mod signaling;
pub mod systems;

// Re-export основных типов
pub use components::{ZombieBrain, ZombieState};
pub use signaling::{
    apply_signal_patch, plan_broadcast, SignalBroadcast, SignalCandidate, SignalPatch,
};
pub use systems::{choose_wander_destination, enter_chase, enter_wander};

/// AI Plugin
///
/// Порядок выполнения (SimulationSet::Ai):
/// 1. assign_initial_wander_destination — новые зомби сразу получают wander точку
/// 2. zombie_fsm_update — Wander/Chase transitions + melee атаки
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SignalBroadcast>().add_systems(
            Update,
            (
                systems::assign_initial_wander_destination,
                systems::zombie_fsm_update,
            )
                .chain() // Последовательное выполнение
                .in_set(SimulationSet::Ai),
        );
    }
}
