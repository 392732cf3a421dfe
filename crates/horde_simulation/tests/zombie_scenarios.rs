//! Zombie scenario tests
//!
//! Headless App + SimulationPlugin, время двигается вручную (Time::advance_by).
//!
//! Проверяем:
//! - detection (distance + LOS) без broadcast, в т.ч. вплотную
//! - self-detected погоня бросается по дистанции и стене
//! - pack-alert broadcast по урону, single-hop
//! - смерть ровно один раз
//! - attack cooldown
//! - follower зеркалит источник
//! - knockback всегда завершается на земле

use std::time::Duration;

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use horde_simulation::*;

const DT: f32 = 0.1;

/// Helper: App со всеми подсистемами, без ScenePlayer
fn scenario_app() -> App {
    let mut app = App::new();
    app.add_plugins(SimulationPlugin::default());
    app
}

fn step(app: &mut App, seconds: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(seconds));
    app.update();
}

fn spawn_zombie(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn(zombie_bundle(position, ZombieConfig::default()))
        .id()
}

fn spawn_player(app: &mut App, position: Vec3) -> Entity {
    let player = app
        .world_mut()
        .spawn(player_bundle(position, PlayerConfig::default()))
        .id();
    app.world_mut().insert_resource(ScenePlayer::new(player));
    player
}

/// Атакующий без AI: только позиция + коллайдер (виден для LOS)
fn spawn_attacker(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((Transform::from_translation(position), ActorBody::default()))
        .id()
}

fn brain(app: &App, entity: Entity) -> ZombieBrain {
    app.world()
        .get::<ZombieBrain>(entity)
        .cloned()
        .expect("zombie brain")
}

fn damage(app: &mut App, target: Entity, attacker: Entity, amount: f32) {
    app.world_mut().send_event(DamageIntent {
        target,
        attacker,
        amount,
    });
}

/// Читает новые события с курсора
fn drain<E: Event + Clone>(app: &App, cursor: &mut EventCursor<E>) -> Vec<E> {
    let events = app.world().resource::<Events<E>>();
    cursor.read(events).cloned().collect()
}

fn cursor<E: Event>(app: &App) -> EventCursor<E> {
    app.world().resource::<Events<E>>().get_cursor()
}

#[test]
fn test_zombie_detects_visible_player() {
    let mut app = scenario_app();
    let player = spawn_player(&mut app, Vec3::new(10.0, 0.0, 0.0));
    let zombie = spawn_zombie(&mut app, Vec3::ZERO);
    let mut signals = cursor::<SignalBroadcast>(&app);

    step(&mut app, DT);

    let brain = brain(&app, zombie);
    assert_eq!(brain.current_target(), Some(player));
    assert_eq!(brain.signaling_source, None);
    assert!(!brain.has_signaled);
    assert!(drain(&app, &mut signals).is_empty(), "self-detection must not broadcast");
}

#[test]
fn test_wall_blocks_detection() {
    let mut app = scenario_app();
    spawn_player(&mut app, Vec3::new(10.0, 0.0, 0.0));
    let zombie = spawn_zombie(&mut app, Vec3::ZERO);
    app.world_mut().spawn(obstacle_bundle(
        Vec3::new(5.0, 1.5, 0.0),
        Vec3::new(0.5, 1.5, 3.0),
    ));

    step(&mut app, DT);

    assert!(brain(&app, zombie).is_wandering());
}

#[test]
fn test_player_out_of_awareness_not_detected() {
    let mut app = scenario_app();
    spawn_player(&mut app, Vec3::new(40.0, 0.0, 0.0));
    let zombie = spawn_zombie(&mut app, Vec3::ZERO);

    step(&mut app, DT);

    assert!(brain(&app, zombie).is_wandering());
}

#[test]
fn test_zombie_detects_adjacent_player() {
    let mut app = scenario_app();
    // Глаз зомби внутри сферы игрока
    let player = spawn_player(&mut app, Vec3::new(0.5, 0.0, 0.0));
    let zombie = spawn_zombie(&mut app, Vec3::ZERO);

    step(&mut app, DT);

    assert_eq!(brain(&app, zombie).current_target(), Some(player));
}

#[test]
fn test_chase_continues_when_player_overlaps_zombie() {
    let mut app = scenario_app();
    let player = spawn_player(&mut app, Vec3::new(5.0, 0.0, 0.0));
    let zombie = spawn_zombie(&mut app, Vec3::ZERO);
    let mut attacks = cursor::<ZombieAttacked>(&app);

    step(&mut app, DT);
    assert!(brain(&app, zombie).is_chasing());

    // Игрок вплотную к зомби
    let zombie_position = app.world().get::<Transform>(zombie).unwrap().translation;
    app.world_mut().get_mut::<Transform>(player).unwrap().translation =
        zombie_position + Vec3::new(0.4, 0.0, 0.0);

    step(&mut app, DT);

    let brain = brain(&app, zombie);
    assert_eq!(brain.current_target(), Some(player));
    let attacks = drain(&app, &mut attacks);
    assert_eq!(attacks.len(), 1);
    assert_eq!(attacks[0].target, player);
}

#[test]
fn test_self_detected_chase_drops_out_of_range() {
    let mut app = scenario_app();
    let player = spawn_player(&mut app, Vec3::new(10.0, 0.0, 0.0));
    let zombie = spawn_zombie(&mut app, Vec3::ZERO);

    step(&mut app, DT);
    assert_eq!(brain(&app, zombie).current_target(), Some(player));

    // Дальше awareness radius (35м)
    app.world_mut().get_mut::<Transform>(player).unwrap().translation = Vec3::new(60.0, 0.0, 0.0);
    step(&mut app, DT);

    let brain = brain(&app, zombie);
    assert!(brain.is_wandering());
    assert_eq!(brain.current_target(), None);
    assert_eq!(brain.signaling_source, None);
    assert!(!brain.has_signaled);
    assert!(!brain.has_retargeted);
}

#[test]
fn test_self_detected_chase_drops_behind_wall() {
    let mut app = scenario_app();
    let player = spawn_player(&mut app, Vec3::new(10.0, 0.0, 0.0));
    let zombie = spawn_zombie(&mut app, Vec3::ZERO);

    step(&mut app, DT);
    assert_eq!(brain(&app, zombie).current_target(), Some(player));

    // Стена между зомби и игроком посреди погони
    app.world_mut().spawn(obstacle_bundle(
        Vec3::new(7.0, 1.5, 0.0),
        Vec3::new(0.5, 1.5, 3.0),
    ));
    step(&mut app, DT);

    let brain = brain(&app, zombie);
    assert!(brain.is_wandering());
    assert_eq!(brain.current_target(), None);
    assert_eq!(brain.signaling_source, None);
    assert!(!brain.has_signaled);
    assert!(!brain.has_retargeted);
}

#[test]
fn test_damage_broadcasts_to_idle_zombies_in_radius() {
    let mut app = scenario_app();
    // ScenePlayer не задан: зомби не детектят сами
    let attacker = app
        .world_mut()
        .spawn(player_bundle(Vec3::new(8.0, 0.0, 0.0), PlayerConfig::default()))
        .id();
    let z1 = spawn_zombie(&mut app, Vec3::ZERO);
    let z2 = spawn_zombie(&mut app, Vec3::new(0.0, 0.0, 20.0));
    let z3 = spawn_zombie(&mut app, Vec3::new(50.0, 0.0, 0.0));
    let z4 = spawn_zombie(&mut app, Vec3::new(0.0, 0.0, -10.0));

    step(&mut app, DT);

    // Z4 уже в погоне за атакующим
    app.world_mut()
        .get_mut::<ZombieBrain>(z4)
        .unwrap()
        .begin_chase(attacker);

    let mut signals = cursor::<SignalBroadcast>(&app);
    damage(&mut app, z1, attacker, 5.0);
    step(&mut app, DT);

    assert_eq!(app.world().get::<Health>(z1).unwrap().current, 15.0);

    let source = brain(&app, z1);
    assert!(source.has_signaled);
    assert_eq!(source.current_target(), Some(attacker));
    assert_eq!(source.signaling_source, None);

    let follower = brain(&app, z2);
    assert_eq!(follower.current_target(), Some(attacker));
    assert_eq!(follower.signaling_source, Some(z1));
    assert!(!follower.has_signaled);

    // Вне радиуса
    let far = brain(&app, z3);
    assert!(far.is_wandering());
    assert_eq!(far.signaling_source, None);

    // Уже в погоне — не тронут
    let busy = brain(&app, z4);
    assert_eq!(busy.signaling_source, None);

    let signals = drain(&app, &mut signals);
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].source, z1);
    assert_eq!(signals[0].target, attacker);
    assert_eq!(signals[0].recipients, vec![z2]);
}

#[test]
fn test_second_hit_does_not_broadcast_again() {
    let mut app = scenario_app();
    let attacker = spawn_attacker(&mut app, Vec3::new(5.0, 0.0, 0.0));
    let z1 = spawn_zombie(&mut app, Vec3::ZERO);
    step(&mut app, DT);

    let mut signals = cursor::<SignalBroadcast>(&app);
    damage(&mut app, z1, attacker, 1.0);
    step(&mut app, DT);
    damage(&mut app, z1, attacker, 1.0);
    step(&mut app, DT);

    assert_eq!(drain(&app, &mut signals).len(), 1);
    assert_eq!(app.world().get::<Health>(z1).unwrap().current, 18.0);
}

#[test]
fn test_lethal_damage_dies_exactly_once() {
    let mut app = scenario_app();
    let attacker = spawn_attacker(&mut app, Vec3::new(5.0, 0.0, 0.0));
    let config = ZombieConfig {
        max_health: 8.0,
        ..default()
    };
    let z1 = app.world_mut().spawn(zombie_bundle(Vec3::ZERO, config)).id();
    let z2 = spawn_zombie(&mut app, Vec3::new(0.0, 0.0, 5.0));
    step(&mut app, DT);

    let mut died = cursor::<ZombieDied>(&app);
    let mut effects = cursor::<EffectSpawnRequested>(&app);
    let mut signals = cursor::<SignalBroadcast>(&app);

    // Два удара в одном кадре: второй по уже мёртвому игнорируется
    damage(&mut app, z1, attacker, 10.0);
    damage(&mut app, z1, attacker, 10.0);
    step(&mut app, DT);
    // Урон по despawned entity — тоже игнорируется
    damage(&mut app, z1, attacker, 10.0);
    step(&mut app, DT);

    let died = drain(&app, &mut died);
    assert_eq!(died.len(), 1);
    assert_eq!(died[0].entity, z1);
    assert_eq!(died[0].killer, Some(attacker));

    let effects = drain(&app, &mut effects);
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].kind, EffectKind::DeathParticles);

    assert!(app.world().get_entity(z1).is_err());
    // Смерть — без broadcast
    assert!(drain(&app, &mut signals).is_empty());
    assert!(brain(&app, z2).is_wandering());
}

#[test]
fn test_attack_respects_cooldown() {
    let mut app = scenario_app();
    let player = spawn_player(&mut app, Vec3::new(1.0, 0.0, 0.0));
    let zombie = spawn_zombie(&mut app, Vec3::ZERO);
    let mut attacks = cursor::<ZombieAttacked>(&app);

    // Кадр 1: детект, кадр 2: первая атака
    step(&mut app, DT);
    step(&mut app, DT);

    let first = drain(&app, &mut attacks);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].zombie, zombie);
    assert_eq!(first[0].target, player);
    assert!(first[0].knockback_applied);
    assert!(app.world().get::<Knockback>(player).is_some());

    // Остаток окна cooldown
    for _ in 0..7 {
        step(&mut app, DT);
    }

    assert!(drain(&app, &mut attacks).is_empty());
}

#[test]
fn test_follower_drops_when_source_reverts() {
    let mut app = scenario_app();
    // Атакующий без коллайдера: LOS к нему не подтверждается
    let attacker = app
        .world_mut()
        .spawn(Transform::from_xyz(8.0, 0.0, 0.0))
        .id();
    let z1 = spawn_zombie(&mut app, Vec3::ZERO);
    let z2 = spawn_zombie(&mut app, Vec3::new(0.0, 0.0, 10.0));
    step(&mut app, DT);

    damage(&mut app, z1, attacker, 1.0);
    step(&mut app, DT);

    // Источник сам бросил погоню (нет LOS), follower — ещё по снимку начала тика
    let source = brain(&app, z1);
    assert!(source.is_wandering());
    assert!(!source.has_signaled);
    assert_eq!(brain(&app, z2).signaling_source, Some(z1));

    step(&mut app, DT);

    let follower = brain(&app, z2);
    assert!(follower.is_wandering());
    assert_eq!(follower.signaling_source, None);
    assert_eq!(follower.current_target(), None);
    assert!(!follower.has_retargeted);
}

#[test]
fn test_follower_drops_when_source_destroyed() {
    let mut app = scenario_app();
    let attacker = spawn_attacker(&mut app, Vec3::new(5.0, 0.0, 0.0));
    let z1 = spawn_zombie(&mut app, Vec3::ZERO);
    let z2 = spawn_zombie(&mut app, Vec3::new(0.0, 0.0, -10.0));
    step(&mut app, DT);

    damage(&mut app, z1, attacker, 1.0);
    step(&mut app, DT);
    assert_eq!(brain(&app, z2).signaling_source, Some(z1));

    app.world_mut().despawn(z1);
    step(&mut app, DT);

    assert!(brain(&app, z2).is_wandering());
}

#[test]
fn test_knockback_terminates_grounded() {
    let mut app = scenario_app();
    let attacker = spawn_attacker(&mut app, Vec3::new(3.0, 0.0, 0.0));
    let zombie = spawn_zombie(&mut app, Vec3::ZERO);
    step(&mut app, DT);

    damage(&mut app, zombie, attacker, 1.0);
    step(&mut app, 0.05);
    assert!(app.world().get::<Knockback>(zombie).is_some());
    assert!(!app.world().get::<NavAgent>(zombie).unwrap().position_sync_enabled());

    let mut landed = false;
    for _ in 0..100 {
        step(&mut app, 0.05);
        if app.world().get::<Knockback>(zombie).is_none() {
            landed = true;
            break;
        }
    }

    assert!(landed, "knockback never finished");
    assert!(app.world().get::<NavAgent>(zombie).unwrap().position_sync_enabled());
    let position = app.world().get::<Transform>(zombie).unwrap().translation;
    assert_eq!(position.y, 0.0);
    // Отброшен от атакующего
    assert!(position.x < 0.0, "position = {:?}", position);
}

#[test]
fn test_wander_pauses_between_destinations() {
    let mut app = scenario_app();
    let zombie = spawn_zombie(&mut app, Vec3::ZERO);

    let mut paused = false;
    for _ in 0..300 {
        step(&mut app, DT);
        if matches!(
            brain(&app, zombie).state,
            ZombieState::Wander {
                pause_remaining: Some(_)
            }
        ) {
            paused = true;
            break;
        }
    }
    assert!(paused, "zombie never reached its wander destination");
    assert!(app.world().get::<NavAgent>(zombie).unwrap().is_stopped());

    let rest = app.world().get::<Transform>(zombie).unwrap().translation;
    let reached = app.world().get::<NavAgent>(zombie).unwrap().destination();
    for _ in 0..10 {
        step(&mut app, DT);
    }
    assert_eq!(app.world().get::<Transform>(zombie).unwrap().translation, rest);
    assert_eq!(app.world().get::<NavAgent>(zombie).unwrap().destination(), reached);

    for _ in 0..15 {
        step(&mut app, DT);
    }
    // Пауза (2с) закончилась — новая точка
    assert_ne!(app.world().get::<NavAgent>(zombie).unwrap().destination(), reached);
}

#[test]
fn test_retarget_happens_once_per_chase() {
    let mut app = scenario_app();
    let player = spawn_player(&mut app, Vec3::new(10.0, 0.0, 0.0));
    let first = spawn_attacker(&mut app, Vec3::new(0.0, 0.0, 5.0));
    let second = spawn_attacker(&mut app, Vec3::new(0.0, 0.0, -5.0));
    let zombie = spawn_zombie(&mut app, Vec3::ZERO);

    step(&mut app, DT);
    assert_eq!(brain(&app, zombie).current_target(), Some(player));

    damage(&mut app, zombie, first, 1.0);
    step(&mut app, DT);
    let after_first = brain(&app, zombie);
    assert_eq!(after_first.current_target(), Some(first));
    assert!(after_first.has_retargeted);

    damage(&mut app, zombie, second, 1.0);
    step(&mut app, DT);
    assert_eq!(brain(&app, zombie).current_target(), Some(first));
}

#[test]
fn test_target_despawn_reverts_to_wander() {
    let mut app = scenario_app();
    let player = spawn_player(&mut app, Vec3::new(10.0, 0.0, 0.0));
    let zombie = spawn_zombie(&mut app, Vec3::ZERO);
    step(&mut app, DT);
    assert!(brain(&app, zombie).is_chasing());

    app.world_mut().despawn(player);
    step(&mut app, DT);

    let brain = brain(&app, zombie);
    assert!(brain.is_wandering());
    assert_eq!(brain.current_target(), None);
}

#[test]
fn test_player_punch_damages_zombie_with_lockout() {
    let mut app = scenario_app();
    // Игрок смотрит в -Z (Transform по умолчанию)
    let player = spawn_player(&mut app, Vec3::ZERO);
    let zombie = spawn_zombie(&mut app, Vec3::new(0.0, 0.0, -2.0));
    step(&mut app, DT);

    app.world_mut().get_mut::<PlayerInput>(player).unwrap().punch = true;
    step(&mut app, DT);
    assert_eq!(app.world().get::<Health>(zombie).unwrap().current, 18.0);
    assert!(app.world().get::<AnimationFlags>(player).unwrap().is_attacking);

    // Lockout 0.5с — второй удар сразу не проходит
    app.world_mut().get_mut::<PlayerInput>(player).unwrap().punch = true;
    step(&mut app, DT);
    assert_eq!(app.world().get::<Health>(zombie).unwrap().current, 18.0);
}

#[test]
fn test_player_movement_suspended_during_knockback() {
    let mut app = scenario_app();
    let player = spawn_player(&mut app, Vec3::ZERO);
    step(&mut app, DT);

    let receiver = *app.world().get::<KnockbackReceiver>(player).unwrap();
    app.world_mut()
        .entity_mut(player)
        .insert(receiver.apply_knockback(Vec3::new(1.0, 0.5, 0.0)));
    // Input вперёд (-Z) игнорируется пока летим
    app.world_mut().get_mut::<PlayerInput>(player).unwrap().move_axis = Vec2::new(0.0, 1.0);

    step(&mut app, DT);
    let position = app.world().get::<Transform>(player).unwrap().translation;
    assert!(position.x > 0.0);
    assert_eq!(position.z, 0.0);

    for _ in 0..50 {
        step(&mut app, DT);
    }
    assert!(app.world().get::<Knockback>(player).is_none());
    // Обычное движение вернулось
    assert!(app.world().get::<Transform>(player).unwrap().translation.z < 0.0);
}
