//! Ballistic knockback (общий алгоритм для зомби и игрока)
//!
//! Двухфазный процесс на несколько тиков:
//! 1. Impulse — фиксированная длительность, начальная скорость гасится гравитацией
//! 2. Falling — та же интеграция, пока grounded check не сработает
//!
//! Пока `Knockback` висит на entity — он единственный источник смещения:
//! - игрок: `player_movement` фильтрует `Without<Knockback>`
//! - зомби: NavAgent position sync выключен, после приземления warp + sync on
//!
//! Повторный knockback во время активного — latest-wins (insert заменяет компонент).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::navigation::NavAgent;
use crate::physics::collision::{CollisionWorld, SpatialQuery, GROUND_MASK};

/// Откуда берётся начальная вертикальная скорость
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum VerticalImpulse {
    /// Всегда `vertical_force` (self-knockback зомби)
    Fixed,
    /// `direction.y * vertical_force` (игрок от удара зомби)
    ScaledByDirection,
}

/// Набор параметров knockback
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockbackParams {
    pub horizontal_force: f32,
    pub vertical_force: f32,
    pub vertical_impulse: VerticalImpulse,
    pub gravity: f32,
    /// Длительность Impulse фазы (секунды)
    pub impulse_duration: f32,
    /// Длина луча вниз для проверки приземления
    pub ground_check_distance: f32,
}

impl KnockbackParams {
    pub fn zombie() -> Self {
        Self {
            horizontal_force: 5.0,
            vertical_force: 1.0,
            vertical_impulse: VerticalImpulse::Fixed,
            gravity: 20.0,
            impulse_duration: 0.3,
            ground_check_distance: 1.0,
        }
    }

    pub fn player() -> Self {
        Self {
            horizontal_force: 5.0,
            vertical_force: 2.0,
            vertical_impulse: VerticalImpulse::ScaledByDirection,
            gravity: 20.0,
            impulse_duration: 0.3,
            ground_check_distance: 0.1,
        }
    }
}

impl Default for KnockbackParams {
    fn default() -> Self {
        Self::zombie()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum KnockbackPhase {
    Impulse,
    Falling,
}

/// Результат одного тика интеграции
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KnockbackStep {
    /// Сместить агента на offset
    Moved(Vec3),
    /// Приземлились — процесс завершён
    Landed,
}

/// Активный knockback процесс (компонент)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Knockback {
    pub elapsed: f32,
    pub phase: KnockbackPhase,
    pub horizontal_velocity: Vec3,
    pub vertical_velocity: f32,
    pub gravity: f32,
    pub impulse_duration: f32,
    pub ground_check_distance: f32,
}

impl Knockback {
    /// Старт процесса из направления удара
    ///
    /// Горизонталь — только XZ компонента direction (нормализованная).
    pub fn begin(direction: Vec3, params: &KnockbackParams) -> Self {
        let horizontal = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        let vertical_velocity = match params.vertical_impulse {
            VerticalImpulse::Fixed => params.vertical_force,
            VerticalImpulse::ScaledByDirection => direction.y * params.vertical_force,
        };

        Self {
            elapsed: 0.0,
            phase: KnockbackPhase::Impulse,
            horizontal_velocity: horizontal * params.horizontal_force,
            vertical_velocity,
            gravity: params.gravity,
            impulse_duration: params.impulse_duration,
            ground_check_distance: params.ground_check_distance,
        }
    }

    /// Один тик
    ///
    /// `grounded` учитывается только в Falling фазе (Impulse всегда
    /// отрабатывает полную длительность).
    pub fn advance(&mut self, delta: f32, grounded: bool) -> KnockbackStep {
        if self.phase == KnockbackPhase::Falling && grounded {
            return KnockbackStep::Landed;
        }

        self.vertical_velocity -= self.gravity * delta;
        let offset = self.horizontal_velocity * delta + Vec3::Y * self.vertical_velocity * delta;
        self.elapsed += delta;

        if self.phase == KnockbackPhase::Impulse && self.elapsed >= self.impulse_duration {
            self.phase = KnockbackPhase::Falling;
        }

        KnockbackStep::Moved(offset)
    }
}

/// Capability: entity принимает knockback от атак (player movement sink)
///
/// Цель без этого компонента получает атаку без физического эффекта.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct KnockbackReceiver {
    pub params: KnockbackParams,
}

impl KnockbackReceiver {
    pub fn new(params: KnockbackParams) -> Self {
        Self { params }
    }

    /// Entry point `applyKnockback(direction)`
    pub fn apply_knockback(&self, direction: Vec3) -> Knockback {
        Knockback::begin(direction, &self.params)
    }
}

impl Default for KnockbackReceiver {
    fn default() -> Self {
        Self::new(KnockbackParams::player())
    }
}

/// Система: интеграция knockback для всех агентов
///
/// NavAgent есть → pathing-driven (без clamp, после приземления warp + sync).
/// NavAgent нет → kinematic (игрок): clamp над землёй как character controller.
pub fn integrate_knockback(
    mut commands: Commands,
    mut agents: Query<(Entity, &mut Transform, &mut Knockback, Option<&mut NavAgent>)>,
    collision: Res<CollisionWorld>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (entity, mut transform, mut knockback, nav) in agents.iter_mut() {
        let grounded = knockback.phase == KnockbackPhase::Falling
            && collision.grounded_check(
                transform.translation,
                knockback.ground_check_distance,
                GROUND_MASK,
            );

        match knockback.advance(delta, grounded) {
            KnockbackStep::Moved(offset) => {
                transform.translation += offset;
                if nav.is_none() {
                    transform.translation = collision.clamp_above_ground(transform.translation);
                }
            }
            KnockbackStep::Landed => {
                if let Some(mut nav) = nav {
                    // Navmesh снова authoritative
                    nav.warp(transform.translation);
                    nav.set_position_sync(true);
                }
                commands.entity(entity).remove::<Knockback>();

                crate::logger::log(format_args!(
                    "🪂 {:?} landed after knockback ({:.2}s)",
                    entity, knockback.elapsed
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    /// Симуляция с плоской землёй на y=0
    fn run_until_landed(mut knockback: Knockback, start_y: f32) -> (Knockback, Vec3, usize) {
        let world = CollisionWorld::new(0.0);
        let mut position = Vec3::new(0.0, start_y, 0.0);

        for tick in 0..10_000 {
            let grounded = knockback.phase == KnockbackPhase::Falling
                && world.grounded_check(position, knockback.ground_check_distance, GROUND_MASK);
            match knockback.advance(DT, grounded) {
                KnockbackStep::Moved(offset) => position += offset,
                KnockbackStep::Landed => return (knockback, position, tick),
            }
        }

        panic!("knockback never landed");
    }

    #[test]
    fn test_zombie_begin_uses_fixed_vertical() {
        let knockback = Knockback::begin(Vec3::new(3.0, 7.0, 4.0), &KnockbackParams::zombie());

        // Горизонталь нормализована (0.6, 0, 0.8) × 5
        assert!((knockback.horizontal_velocity - Vec3::new(3.0, 0.0, 4.0)).length() < 1e-5);
        // Вертикаль игнорирует direction.y
        assert_eq!(knockback.vertical_velocity, 1.0);
        assert_eq!(knockback.phase, KnockbackPhase::Impulse);
    }

    #[test]
    fn test_player_begin_scales_vertical() {
        let knockback = Knockback::begin(Vec3::new(0.0, 0.5, 1.0), &KnockbackParams::player());

        assert_eq!(knockback.vertical_velocity, 1.0); // 0.5 × 2.0
        assert!((knockback.horizontal_velocity - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn test_zero_direction_has_no_horizontal() {
        let knockback = Knockback::begin(Vec3::Y, &KnockbackParams::zombie());
        assert_eq!(knockback.horizontal_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_impulse_ignores_grounded() {
        let mut knockback = Knockback::begin(Vec3::X, &KnockbackParams::zombie());

        // Даже если "на земле" — Impulse фаза двигает
        let step = knockback.advance(DT, true);
        assert!(matches!(step, KnockbackStep::Moved(_)));
        assert_eq!(knockback.phase, KnockbackPhase::Impulse);
    }

    #[test]
    fn test_gravity_applied_before_move() {
        let mut knockback = Knockback::begin(Vec3::X, &KnockbackParams::zombie());
        let KnockbackStep::Moved(offset) = knockback.advance(0.1, false) else {
            panic!("expected movement");
        };

        // vy = 1 - 20×0.1 = -1 → dy = -0.1; dx = 5×0.1
        assert!((offset.y + 0.1).abs() < 1e-5, "offset = {:?}", offset);
        assert!((offset.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_switches_to_falling_after_impulse() {
        let mut knockback = Knockback::begin(Vec3::X, &KnockbackParams::zombie());

        knockback.advance(0.2, false);
        assert_eq!(knockback.phase, KnockbackPhase::Impulse);

        knockback.advance(0.1, false);
        assert_eq!(knockback.phase, KnockbackPhase::Falling);
    }

    #[test]
    fn test_zombie_knockback_terminates_grounded() {
        let params = KnockbackParams::zombie();
        let (knockback, position, _) = run_until_landed(Knockback::begin(Vec3::X, &params), 0.0);

        assert!(knockback.elapsed >= params.impulse_duration);
        assert!(position.y <= params.ground_check_distance);
        // Горизонтальное смещение ≈ 5 m/s × ~0.3s
        assert!(position.x > 1.0, "x = {}", position.x);
    }

    #[test]
    fn test_player_knockback_from_height_terminates() {
        let params = KnockbackParams::player();
        let direction = Vec3::new(1.0, 0.5, 0.0).normalize();
        let (knockback, position, ticks) = run_until_landed(Knockback::begin(direction, &params), 5.0);

        assert!(knockback.elapsed >= params.impulse_duration);
        assert!(position.y <= params.ground_check_distance);
        // С 5м падение заметно дольше Impulse фазы
        assert!(ticks as f32 * DT > params.impulse_duration);
    }

    #[test]
    fn test_receiver_entry_point() {
        let receiver = KnockbackReceiver::default();
        let knockback = receiver.apply_knockback(Vec3::new(0.0, 0.5, -1.0));

        assert_eq!(knockback.phase, KnockbackPhase::Impulse);
        assert!(knockback.horizontal_velocity.z < 0.0);
    }
}
