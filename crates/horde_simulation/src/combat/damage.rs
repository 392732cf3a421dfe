//! Damage resolution: урон → self-knockback → смерть или (broadcast, retarget/engage).

use bevy::prelude::*;

use crate::ai::{
    apply_signal_patch, enter_chase, plan_broadcast, SignalBroadcast, SignalCandidate, ZombieBrain,
};
use crate::components::{Health, Zombie};
use crate::config::ZombieConfig;
use crate::navigation::NavAgent;
use crate::physics::{CollisionWorld, Knockback, SpatialQuery};

/// Запрос урона (от punch игрока или внешних источников)
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageIntent {
    pub target: Entity,
    pub attacker: Entity,
    pub amount: f32,
}

/// Event: зомби умер (health ≤ 0), entity despawned в этом же кадре
#[derive(Event, Debug, Clone, Copy)]
pub struct ZombieDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum EffectKind {
    DeathParticles,
}

/// Lifecycle запрос визуальному слою: `spawnEffect(kind, position)`
#[derive(Event, Debug, Clone, Copy)]
pub struct EffectSpawnRequested {
    pub kind: EffectKind,
    pub position: Vec3,
}

/// Что делать с целью после broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageFollowUp {
    /// Chase другой цели, смена ещё не использована → переключиться на атакующего
    Retarget,
    /// Wander → Chase атакующего (без повторного broadcast)
    Engage,
    /// Уже преследуем атакующего или retarget исчерпан
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageReaction {
    pub broadcast: bool,
    pub follow_up: DamageFollowUp,
}

/// Реакция выжившего зомби на урон (по состоянию ДО реакции)
pub fn plan_damage_reaction(brain: &ZombieBrain, attacker: Entity) -> DamageReaction {
    // Follower никогда не рассылает сам
    let broadcast = !brain.has_signaled && !brain.is_following_signal();

    let follow_up = match brain.current_target() {
        Some(current) if current != attacker && !brain.has_retargeted => DamageFollowUp::Retarget,
        Some(_) => DamageFollowUp::Hold,
        None => DamageFollowUp::Engage,
    };

    DamageReaction {
        broadcast,
        follow_up,
    }
}

/// Система: применение DamageIntent
///
/// Порядок на каждый intent:
/// 1. health -= amount (может уйти в минус)
/// 2. self-knockback от атакующего (только горизонталь), nav position sync off
/// 3. health ≤ 0 → effect + ZombieDied + despawn, дальше ничего
/// 4. иначе broadcast (если ещё не рассылали и не follower) → retarget / engage
///
/// Повторный урон по уже мёртвому в этом кадре игнорируется.
#[allow(clippy::too_many_arguments)]
pub fn apply_damage_intents(
    mut commands: Commands,
    mut intents: EventReader<DamageIntent>,
    mut zombies: Query<
        (&Transform, &ZombieConfig, &mut Health, &mut ZombieBrain, &mut NavAgent),
        With<Zombie>,
    >,
    transforms: Query<&Transform>,
    collision: Res<CollisionWorld>,
    mut signal_events: EventWriter<SignalBroadcast>,
    mut died_events: EventWriter<ZombieDied>,
    mut effect_events: EventWriter<EffectSpawnRequested>,
) {
    for intent in intents.read() {
        let attacker_position = transforms.get(intent.attacker).ok().map(|t| t.translation);

        // Фаза 1: урон + knockback + death check
        let (position, config, reaction) = {
            let Ok((transform, config, mut health, brain, mut nav)) = zombies.get_mut(intent.target)
            else {
                crate::logger::log_warning(format_args!(
                    "DamageIntent target {:?} is not a zombie → ignored",
                    intent.target
                ));
                continue;
            };

            if !health.is_alive() {
                continue;
            }

            health.take_damage(intent.amount);
            let position = transform.translation;

            match attacker_position {
                Some(attacker_position) => {
                    let away = position - attacker_position;
                    let knockback =
                        Knockback::begin(Vec3::new(away.x, 0.0, away.z), &config.knockback);
                    commands.entity(intent.target).insert(knockback);
                    nav.set_position_sync(false);
                }
                None => {
                    crate::logger::log_warning(format_args!(
                        "Attacker {:?} has no Transform → {:?} takes damage without knockback",
                        intent.attacker, intent.target
                    ));
                }
            }

            crate::logger::log(format_args!(
                "💥 {:?} hit by {:?} for {:.1} (health {:.1}/{:.1})",
                intent.target, intent.attacker, intent.amount, health.current, health.max
            ));

            if !health.is_alive() {
                effect_events.write(EffectSpawnRequested {
                    kind: EffectKind::DeathParticles,
                    position,
                });
                died_events.write(ZombieDied {
                    entity: intent.target,
                    killer: Some(intent.attacker),
                    position,
                });
                commands.entity(intent.target).despawn();

                crate::logger::log(format_args!("💀 {:?} died (killer {:?})", intent.target, intent.attacker));
                continue;
            }

            (position, config.clone(), plan_damage_reaction(&brain, intent.attacker))
        };

        // Фаза 2: broadcast по снимку соседей
        if reaction.broadcast {
            let candidates: Vec<SignalCandidate> = collision
                .overlap_sphere(position, config.awareness_radius)
                .into_iter()
                .filter_map(|entity| {
                    let (transform, _, health, brain, _) = zombies.get(entity).ok()?;
                    health
                        .is_alive()
                        .then(|| SignalCandidate::from_brain(entity, transform.translation, brain))
                })
                .collect();

            let patches = plan_broadcast(
                intent.target,
                position,
                intent.attacker,
                config.awareness_radius,
                &candidates,
            );

            let mut recipients = Vec::with_capacity(patches.len());
            for patch in &patches {
                if let Ok((_, recipient_config, _, mut brain, mut nav)) = zombies.get_mut(patch.recipient) {
                    apply_signal_patch(&mut brain, &mut nav, recipient_config, patch);
                    recipients.push(patch.recipient);
                }
            }

            crate::logger::log(format_args!(
                "📢 {:?} alerted {} zombies → chase {:?}",
                intent.target,
                recipients.len(),
                intent.attacker
            ));

            signal_events.write(SignalBroadcast {
                source: intent.target,
                target: intent.attacker,
                recipients,
            });
        }

        // Фаза 3: has_signaled + retarget/engage
        let Ok((_, _, _, mut brain, mut nav)) = zombies.get_mut(intent.target) else {
            continue;
        };

        if reaction.broadcast {
            brain.has_signaled = true;
        }

        match reaction.follow_up {
            DamageFollowUp::Retarget => {
                if brain.retarget(intent.attacker) {
                    crate::logger::log(format_args!(
                        "🎯 {:?} retargeted → {:?}",
                        intent.target, intent.attacker
                    ));
                }
            }
            DamageFollowUp::Engage => {
                enter_chase(&mut brain, &mut nav, &config, intent.attacker);
                crate::logger::log(format_args!(
                    "⚔️ {:?} Wander → Chase (attacked by {:?})",
                    intent.target, intent.attacker
                ));
            }
            DamageFollowUp::Hold => {}
        }
    }
}
