//! Базовые компоненты акторов: Health, Zombie

use bevy::prelude::*;

use crate::ai::ZombieBrain;
use crate::animation::AnimationFlags;
use crate::physics::ActorBody;

/// Зомби — AI-управляемый актор
///
/// Автоматически добавляет FSM brain, animation флаги и коллайдер через Required Components.
/// NavAgent, Health и ZombieConfig приходят из `zombie_bundle` (зависят от тюнинга).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(ZombieBrain, AnimationFlags, ActorBody)]
pub struct Zombie;

/// Здоровье актора
///
/// Может уйти в минус транзитно: урон применяется до проверки смерти.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Без клампа (health ≤ 0 → смерть обрабатывает вызывающий)
    pub fn take_damage(&mut self, amount: f32) {
        self.current -= amount;
    }
}
