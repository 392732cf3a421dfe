//! Kinematic контроллер игрока
//!
//! Архитектура:
//! - CollisionWorld для ground check (луч вниз на `ground_probe_distance`)
//! - Custom velocity integration (WASD в локальных осях + jump + gravity)
//! - Во время knockback система игрока не трогает (Without<Knockback>)

use bevy::prelude::*;

use crate::components::{Player, PlayerInput, PlayerMotor};
use crate::config::PlayerConfig;
use crate::physics::collision::{CollisionWorld, SpatialQuery, GROUND_MASK};
use crate::physics::knockback::Knockback;

/// Вертикальная скорость "прилипания" к земле в grounded состоянии
const GROUNDED_STICK_VELOCITY: f32 = -1.0;

/// Один шаг kinematic движения (без ECS)
///
/// Возвращает смещение за тик. `motor` обновляется (velocity, grounded).
pub fn step_player_motor(
    transform: &Transform,
    config: &PlayerConfig,
    input: &PlayerInput,
    motor: &mut PlayerMotor,
    grounded: bool,
    delta: f32,
) -> Vec3 {
    let axis = input.move_axis.clamp_length_max(1.0);
    let planar = (transform.right().as_vec3() * axis.x + transform.forward().as_vec3() * axis.y)
        * config.speed;

    motor.grounded = grounded;
    if grounded {
        motor.velocity.y = if input.jump {
            config.jump_speed
        } else {
            GROUNDED_STICK_VELOCITY
        };
    }
    motor.velocity.y -= config.gravity * delta;
    motor.velocity.x = planar.x;
    motor.velocity.z = planar.z;

    motor.velocity * delta
}

/// Система движения игрока
///
/// Приостановлена пока на игроке активен Knockback.
pub fn player_movement(
    mut players: Query<
        (&mut Transform, &PlayerConfig, &mut PlayerInput, &mut PlayerMotor),
        (With<Player>, Without<Knockback>),
    >,
    collision: Res<CollisionWorld>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (mut transform, config, mut input, mut motor) in players.iter_mut() {
        let grounded = collision.grounded_check(
            transform.translation,
            config.ground_probe_distance,
            GROUND_MASK,
        );

        let offset = step_player_motor(&transform, config, &input, &mut motor, grounded, delta);
        transform.translation = collision.clamp_above_ground(transform.translation + offset);

        // Jump — одноразовый intent
        input.jump = false;
    }
}
