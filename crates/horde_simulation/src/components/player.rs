//! Player control компоненты
//!
//! Отмечает entity которым управляет игрок через input (в отличие от AI).

use bevy::prelude::*;

use crate::animation::AnimationFlags;
use crate::physics::ActorBody;

/// Marker component для player-controlled entity
///
/// Input и motor состояние добавляются автоматически (Required Components).
/// PlayerConfig и KnockbackReceiver приходят из `player_bundle`.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(ActorBody, PlayerInput, PlayerMotor, PunchLockout, AnimationFlags)]
pub struct Player;

/// Input игрока на текущий тик
///
/// Для headless тестов — mock input через этот компонент.
/// `jump` и `punch` — одноразовые intents, системы их сбрасывают.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerInput {
    /// x = strafe (right), y = forward
    pub move_axis: Vec2,
    pub jump: bool,
    pub punch: bool,
}

/// Состояние kinematic контроллера
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerMotor {
    pub velocity: Vec3,
    pub grounded: bool,
}

/// Блокировка повторного удара после punch
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PunchLockout {
    pub remaining: f32,
}

impl PunchLockout {
    pub fn tick(&mut self, delta: f32) {
        self.remaining = (self.remaining - delta).max(0.0);
    }

    pub fn start(&mut self, duration: f32) {
        self.remaining = duration;
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// Явный handle игрока для AI (вместо поиска по тегу)
///
/// Устанавливается сценой после spawn. Пустой handle → зомби
/// просто не детектят (warning в лог).
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ScenePlayer(Option<Entity>);

impl ScenePlayer {
    pub fn new(entity: Entity) -> Self {
        Self(Some(entity))
    }

    pub fn get(&self) -> Option<Entity> {
        self.0
    }

    pub fn set(&mut self, entity: Option<Entity>) {
        self.0 = entity;
    }
}
