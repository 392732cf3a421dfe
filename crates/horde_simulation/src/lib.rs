//! Horde Simulation Core
//!
//! ECS-симуляция на Bevy 0.16: AI зомби (Wander/Chase), perception,
//! pack-alert signaling, combat resolution и ballistic knockback.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (FSM, combat rules, knockback integration)
//! - Движок = tactical layer (navmesh, коллизии, рендер, анимации)
//!
//! Движок подключается через узкие интерфейсы: `NavAgent` (navigation),
//! `CollisionWorld` / `SpatialQuery` (raycast, overlap, ground check),
//! `AnimationFlags` и события lifecycle (`EffectSpawnRequested`, `ZombieDied`).
//! Для headless режима есть встроенные реализации этих коллабораторов.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod animation;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod navigation;
pub mod perception;
pub mod physics;
pub mod spawn;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, SignalBroadcast, ZombieBrain, ZombieState};
pub use animation::AnimationFlags;
pub use combat::{
    CombatPlugin, DamageIntent, EffectKind, EffectSpawnRequested, ZombieAttacked, ZombieDied,
};
pub use components::*;
pub use config::{ConfigError, PlayerConfig, SimulationSettings, ZombieConfig};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use navigation::{NavAgent, NavigationPlugin};
pub use physics::{
    ActorBody, CollisionWorld, Knockback, KnockbackParams, KnockbackPhase, KnockbackReceiver,
    Obstacle, PhysicsPlugin, SpatialQuery,
};
pub use spawn::{obstacle_bundle, player_bundle, zombie_bundle};

/// Порядок фаз внутри одного тика (TickDriver)
///
/// Каждый кадр все живые агенты продвигаются ровно один раз,
/// с переменным `Time::delta_secs()` с прошлого кадра.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Снимок коллайдеров для raycast/overlap (позиции на начало кадра)
    CollisionSync,
    /// Player intents (punch)
    PlayerInput,
    /// Входящий урон → signaling, retarget, death
    Damage,
    /// Zombie FSM (Wander/Chase) + атаки
    Ai,
    /// Обычное движение игрока (отключено во время knockback)
    PlayerMovement,
    /// Ballistic knockback integration
    Knockback,
    /// Navigation backend (headless или движок)
    Navigation,
    /// Animation флаги для визуального слоя
    Presentation,
}

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub settings: SimulationSettings,
}

impl SimulationPlugin {
    pub fn with_settings(settings: SimulationSettings) -> Self {
        Self { settings }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                SimulationSet::CollisionSync,
                SimulationSet::PlayerInput,
                SimulationSet::Damage,
                SimulationSet::Ai,
                SimulationSet::PlayerMovement,
                SimulationSet::Knockback,
                SimulationSet::Navigation,
                SimulationSet::Presentation,
            )
                .chain(), // Последовательное выполнение фаз
        );

        app
            // Без TimePlugin (тесты) время двигается вручную через Time::advance_by
            .init_resource::<Time>()
            .insert_resource(self.settings.clone())
            .insert_resource(DeterministicRng::new(self.settings.seed))
            .insert_resource(CollisionWorld::new(self.settings.ground_height))
            .init_resource::<ScenePlayer>()
            .add_plugins((PhysicsPlugin, CombatPlugin, AIPlugin, NavigationPlugin))
            .add_systems(
                Update,
                (
                    animation::update_zombie_animation_flags,
                    animation::update_player_animation_flags,
                )
                    .in_set(SimulationSet::Presentation),
            );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время идёт фиксированными шагами `frame_time` (без привязки к wall clock),
/// чтобы прогон 1000 тиков покрывал реальные секунды игры.
pub fn create_headless_app(settings: SimulationSettings, frame_time: f32) -> App {
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            frame_time,
        )))
        .add_plugins(SimulationPlugin::with_settings(settings));

    app
}
