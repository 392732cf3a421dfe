//! Headless симуляция орды
//!
//! Запускает Bevy App без рендера: игрок, кольцо зомби, стена.
//! Опционально: путь к JSON с SimulationSettings первым аргументом,
//! уровень логов через HORDE_LOG.

use bevy::prelude::*;
use horde_simulation::logger::{set_log_level, LogLevel};
use horde_simulation::{
    create_headless_app, log_error, obstacle_bundle, player_bundle, zombie_bundle, AnimationFlags,
    PlayerInput, ScenePlayer, SimulationSettings, ZombieBrain, ZombieDied,
};

const FRAME_TIME: f32 = 1.0 / 60.0;
const TICK_COUNT: usize = 1000;
const ZOMBIE_COUNT: usize = 8;

fn main() {
    // HORDE_LOG=info|warn|error — по умолчанию пишем всё
    if let Some(level) = std::env::var("HORDE_LOG").ok().and_then(|v| LogLevel::parse(&v)) {
        set_log_level(level);
    }

    let settings = match std::env::args().nth(1) {
        Some(path) => match SimulationSettings::from_json_file(&path) {
            Ok(settings) => settings,
            Err(err) => {
                log_error(format_args!("Failed to load settings: {err}"));
                std::process::exit(1);
            }
        },
        None => SimulationSettings::default(),
    };

    println!("Starting horde headless simulation (seed: {})", settings.seed);

    let mut app = create_headless_app(settings.clone(), FRAME_TIME);
    let world = app.world_mut();

    let player = world
        .spawn(player_bundle(Vec3::ZERO, settings.player.clone()))
        .id();
    world.insert_resource(ScenePlayer::new(player));

    for i in 0..ZOMBIE_COUNT {
        let angle = i as f32 / ZOMBIE_COUNT as f32 * std::f32::consts::TAU;
        let position = Vec3::new(angle.cos(), 0.0, angle.sin()) * 20.0;
        world.spawn(zombie_bundle(position, settings.zombie.clone()));
    }

    // Стена частично закрывает кольцо от игрока
    world.spawn(obstacle_bundle(
        Vec3::new(6.0, 1.5, 0.0),
        Vec3::new(0.5, 1.5, 4.0),
    ));

    let mut deaths = 0;
    for tick in 0..TICK_COUNT {
        // Скриптованный игрок: бьёт каждые 30 тиков
        if tick % 30 == 0 {
            if let Some(mut input) = app.world_mut().get_mut::<PlayerInput>(player) {
                input.punch = true;
            }
        }

        app.update();

        let died = app.world().resource::<Events<ZombieDied>>();
        deaths += died.iter_current_update_events().count();

        if tick % 100 == 0 {
            let world = app.world_mut();
            let mut zombies = world.query::<&ZombieBrain>();
            let (chasing, total) = zombies
                .iter(world)
                .fold((0, 0), |(chasing, total), brain| {
                    (chasing + usize::from(brain.is_chasing()), total + 1)
                });
            // Как визуальный слой: имена параметров аниматора
            let player_flags = world
                .get::<AnimationFlags>(player)
                .map(|flags| {
                    flags
                        .flags()
                        .iter()
                        .map(|(name, value)| format!("{name}={value}"))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();
            println!(
                "Tick {}: {} zombies ({} chasing), {} died | player {}",
                tick, total, chasing, deaths, player_flags
            );
        }
    }

    println!("Simulation complete!");
}
