//! FSM AI systems (Wander/Chase transitions, wander pause, melee attacks).

use std::collections::HashMap;

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{ZombieBrain, ZombieState};
use crate::combat::{attack_knockback_direction, try_attack, ZombieAttacked};
use crate::components::{ScenePlayer, Zombie};
use crate::config::ZombieConfig;
use crate::navigation::NavAgent;
use crate::perception::{detect, eye_position, has_line_of_sight};
use crate::physics::{CollisionWorld, KnockbackReceiver};
use crate::DeterministicRng;

/// Случайная точка в сфере радиуса `radius` вокруг `origin` (Y отбрасывается)
///
/// Rejection sampling внутри единичного куба — равномерно по объёму сферы.
pub fn choose_wander_destination<R: Rng + ?Sized>(origin: Vec3, radius: f32, rng: &mut R) -> Vec3 {
    let offset = loop {
        let candidate = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if candidate.length_squared() <= 1.0 {
            break candidate * radius;
        }
    };

    Vec3::new(origin.x + offset.x, origin.y, origin.z + offset.z)
}

/// Переход в Chase (агент снова идёт, chase скорость)
pub fn enter_chase(brain: &mut ZombieBrain, nav: &mut NavAgent, config: &ZombieConfig, target: Entity) {
    brain.begin_chase(target);
    nav.set_stopped(false);
    nav.set_speed(config.chase_speed);
}

/// Переход в Wander: полный сброс chase полей + новая wander точка
pub fn enter_wander<R: Rng + ?Sized>(
    brain: &mut ZombieBrain,
    nav: &mut NavAgent,
    config: &ZombieConfig,
    position: Vec3,
    rng: &mut R,
) {
    brain.reset_to_wander();
    nav.set_stopped(false);
    nav.set_speed(config.wander_speed);
    nav.set_destination(choose_wander_destination(position, config.wander_radius, rng));
}

/// Система: стартовая wander точка для только что заспавненных зомби
///
/// Зомби, заспавненный сразу в Chase, не трогаем.
pub fn assign_initial_wander_destination(
    mut zombies: Query<
        (Entity, &Transform, &ZombieConfig, &mut ZombieBrain, &mut NavAgent),
        Added<Zombie>,
    >,
    mut rng: ResMut<DeterministicRng>,
) {
    for (entity, transform, config, mut brain, mut nav) in zombies.iter_mut() {
        // Уже поднят уроном в этом же кадре
        if !brain.is_wandering() {
            continue;
        }

        enter_wander(&mut brain, &mut nav, config, transform.translation, &mut rng.rng);

        crate::logger::log(format_args!(
            "🧟 {:?} spawned → Wander (destination {:?})",
            entity,
            nav.destination()
        ));
    }
}

/// Система: Zombie FSM tick
///
/// Wander:
/// - детект игрока (distance + LOS) → Chase без broadcast
/// - путь завершён → пауза `wander_pause_duration` → новая точка
///
/// Chase:
/// - destination обновляется каждый тик (цель двигается)
/// - self-detected: drop при потере LOS или дистанции > awareness
/// - по сигналу: drop только когда источник вернулся в Wander (или исчез)
/// - цель исчезла → Wander
/// - цель в melee range → атака (cooldown gated)
///
/// Состояние источников сигнала — снимок на начало тика.
#[allow(clippy::too_many_arguments)]
pub fn zombie_fsm_update(
    mut commands: Commands,
    mut zombies: Query<
        (Entity, &Transform, &ZombieConfig, &mut ZombieBrain, &mut NavAgent),
        With<Zombie>,
    >,
    targets: Query<(&Transform, Option<&KnockbackReceiver>)>,
    scene_player: Res<ScenePlayer>,
    collision: Res<CollisionWorld>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time>,
    mut attacked_events: EventWriter<ZombieAttacked>,
    mut missing_player_reported: Local<bool>,
) {
    let delta = time.delta_secs();
    let now = time.elapsed_secs();

    // Снимок: кто в Wander на начало тика
    let wandering: HashMap<Entity, bool> = zombies
        .iter()
        .map(|(entity, _, _, brain, _)| (entity, brain.is_wandering()))
        .collect();

    let player = scene_player
        .get()
        .and_then(|player| targets.get(player).ok().map(|(t, _)| (player, t.translation)));

    if player.is_none() && !wandering.is_empty() && !*missing_player_reported {
        crate::logger::log_warning("ScenePlayer not resolved → zombies cannot detect the player");
        *missing_player_reported = true;
    }

    for (entity, transform, config, mut brain, mut nav) in zombies.iter_mut() {
        let position = transform.translation;
        let state = brain.state;

        match state {
            ZombieState::Wander { pause_remaining } => {
                if let Some((player, player_position)) = player {
                    if detect(
                        &*collision,
                        position,
                        player,
                        player_position,
                        config.awareness_radius,
                        config.eye_height,
                    ) {
                        // Сами нашли цель — без broadcast
                        enter_chase(&mut brain, &mut nav, config, player);
                        crate::logger::log(format_args!(
                            "👁️ {:?} Wander → Chase (spotted player {:?})",
                            entity, player
                        ));
                        continue;
                    }
                }

                match pause_remaining {
                    Some(remaining) => {
                        let remaining = remaining - delta;
                        if remaining <= 0.0 {
                            let destination =
                                choose_wander_destination(position, config.wander_radius, &mut rng.rng);
                            nav.set_stopped(false);
                            nav.set_destination(destination);
                            brain.state = ZombieState::Wander {
                                pause_remaining: None,
                            };
                        } else {
                            brain.state = ZombieState::Wander {
                                pause_remaining: Some(remaining),
                            };
                        }
                    }
                    None => {
                        if nav.has_reached_destination() {
                            nav.set_stopped(true);
                            brain.state = ZombieState::Wander {
                                pause_remaining: Some(config.wander_pause_duration),
                            };
                        }
                    }
                }
            }

            ZombieState::Chase { target } => {
                let Ok((target_transform, receiver)) = targets.get(target) else {
                    crate::logger::log(format_args!(
                        "🔙 {:?} Chase → Wander (target {:?} gone)",
                        entity, target
                    ));
                    enter_wander(&mut brain, &mut nav, config, position, &mut rng.rng);
                    continue;
                };
                let target_position = target_transform.translation;

                nav.set_destination(target_position);

                let keep_chasing = match brain.signaling_source {
                    None => {
                        let eye = eye_position(position, config.eye_height);
                        has_line_of_sight(
                            &*collision,
                            position,
                            target,
                            target_position,
                            config.eye_height,
                            config.awareness_radius,
                        ) && eye.distance(target_position) <= config.awareness_radius
                    }
                    // Follower не судит сам — зеркалит источник
                    Some(source) => wandering.get(&source).is_some_and(|wander| !*wander),
                };

                if !keep_chasing {
                    crate::logger::log(format_args!(
                        "🔙 {:?} Chase → Wander (lost {:?}, source {:?})",
                        entity, target, brain.signaling_source
                    ));
                    enter_wander(&mut brain, &mut nav, config, position, &mut rng.rng);
                    continue;
                }

                if position.distance(target_position) > config.melee_range {
                    continue;
                }

                if !try_attack(&mut brain, config, now) {
                    continue;
                }

                let direction =
                    attack_knockback_direction(position, target_position, config.attack_vertical_bias);
                let knockback_applied = match receiver {
                    Some(receiver) => {
                        commands.entity(target).insert(receiver.apply_knockback(direction));
                        true
                    }
                    None => {
                        crate::logger::log_warning(format_args!(
                            "{:?} attacked {:?} without knockback receiver → no physical effect",
                            entity, target
                        ));
                        false
                    }
                };

                crate::logger::log(format_args!(
                    "🧟⚔️ {:?} attacked {:?} (direction {:?})",
                    entity, target, direction
                ));

                attacked_events.write(ZombieAttacked {
                    zombie: entity,
                    target,
                    direction,
                    knockback_applied,
                });
            }
        }
    }
}
