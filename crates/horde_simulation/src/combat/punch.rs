//! Player punch: луч от глаз вперёд → DamageIntent по первому зомби.

use bevy::prelude::*;

use crate::combat::DamageIntent;
use crate::components::{Player, PlayerInput, PunchLockout, Zombie};
use crate::config::PlayerConfig;
use crate::perception::eye_position;
use crate::physics::{CollisionWorld, SpatialQuery};

/// Система: обработка punch intent
///
/// Lockout стартует на каждый принятый удар (даже мимо).
/// Удар во время lockout игнорируется.
pub fn player_punch(
    mut players: Query<
        (Entity, &Transform, &PlayerConfig, &mut PlayerInput, &mut PunchLockout),
        With<Player>,
    >,
    zombies: Query<(), With<Zombie>>,
    collision: Res<CollisionWorld>,
    time: Res<Time>,
    mut damage_events: EventWriter<DamageIntent>,
) {
    let delta = time.delta_secs();

    for (entity, transform, config, mut input, mut lockout) in players.iter_mut() {
        lockout.tick(delta);

        if !input.punch {
            continue;
        }
        input.punch = false;

        if lockout.is_active() {
            continue;
        }
        lockout.start(config.punch_lockout);

        let origin = eye_position(transform.translation, config.eye_height);
        let Some(hit) = collision.raycast(origin, transform.forward().as_vec3(), config.punch_range)
        else {
            crate::logger::log(format_args!("👊 {:?} punch missed", entity));
            continue;
        };

        if !zombies.contains(hit.entity) {
            continue;
        }

        crate::logger::log(format_args!(
            "👊 {:?} punched {:?} at {:.2}m",
            entity, hit.entity, hit.distance
        ));

        damage_events.write(DamageIntent {
            target: hit.entity,
            attacker: entity,
            amount: config.punch_damage,
        });
    }
}
