//! Pack-alert signaling (single-hop broadcast)
//!
//! Зомби, получивший урон, поднимает соседей в радиусе awareness.
//! Реализация в две фазы:
//! 1. `plan_broadcast` — чистая функция над снимком кандидатов → список патчей
//! 2. `apply_signal_patch` — применение патча к brain + nav агенту
//!
//! Eligibility считается по снимку на момент broadcast: применение патчей
//! не может повлиять на то, кто ещё получит сигнал. Получатели сами
//! ничего не рассылают.

use bevy::prelude::*;

use crate::ai::ZombieBrain;
use crate::config::ZombieConfig;
use crate::navigation::NavAgent;

/// Событие: зомби поднял стаю
#[derive(Event, Debug, Clone)]
pub struct SignalBroadcast {
    pub source: Entity,
    pub target: Entity,
    pub recipients: Vec<Entity>,
}

/// Снимок кандидата на момент broadcast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalCandidate {
    pub entity: Entity,
    pub position: Vec3,
    pub wandering: bool,
    pub has_signaled: bool,
    pub signaling_source: Option<Entity>,
}

impl SignalCandidate {
    pub fn from_brain(entity: Entity, position: Vec3, brain: &ZombieBrain) -> Self {
        Self {
            entity,
            position,
            wandering: brain.is_wandering(),
            has_signaled: brain.has_signaled,
            signaling_source: brain.signaling_source,
        }
    }

    /// Idle зомби, ещё не вовлечённый в погоню
    pub fn is_eligible(&self) -> bool {
        self.wandering && !self.has_signaled && self.signaling_source.is_none()
    }
}

/// Патч для одного получателя
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalPatch {
    pub recipient: Entity,
    pub source: Entity,
    pub target: Entity,
}

/// Кто получит сигнал (порядок кандидатов не влияет на множество)
pub fn plan_broadcast(
    source: Entity,
    source_position: Vec3,
    target: Entity,
    radius: f32,
    candidates: &[SignalCandidate],
) -> Vec<SignalPatch> {
    candidates
        .iter()
        .filter(|candidate| candidate.entity != source)
        .filter(|candidate| candidate.position.distance(source_position) <= radius)
        .filter(|candidate| candidate.is_eligible())
        .map(|candidate| SignalPatch {
            recipient: candidate.entity,
            source,
            target,
        })
        .collect()
}

/// Применить патч: Chase за целью, chase speed, агент снова идёт
pub fn apply_signal_patch(
    brain: &mut ZombieBrain,
    nav: &mut NavAgent,
    config: &ZombieConfig,
    patch: &SignalPatch,
) {
    brain.follow_signal(patch.source, patch.target);
    nav.set_stopped(false);
    nav.set_speed(config.chase_speed);
}
