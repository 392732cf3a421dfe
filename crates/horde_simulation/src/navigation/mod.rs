//! Navigation коллаборатор (NavAgent)
//!
//! ECS пишет high-level intent (destination, speed, stopped),
//! backend (navmesh движка или headless шаг) двигает агента.
//!
//! Контракт как у NavMeshAgent:
//! - `set_destination` → путь считается асинхронно (`is_path_pending` до следующего шага)
//! - `remaining_distance` валиден только когда путь не pending
//! - `set_position_sync(false)` — агент не пишет в Transform (knockback владеет позицией)
//! - `warp` — телепорт на ближайшую точку navmesh

use bevy::prelude::*;

use crate::physics::CollisionWorld;
use crate::SimulationSet;

/// Порог скорости "стоит на месте"
const VELOCITY_EPSILON: f32 = 1e-4;

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    destination: Option<Vec3>,
    speed: f32,
    stopped: bool,
    path_pending: bool,
    remaining_distance: f32,
    stopping_distance: f32,
    velocity: Vec3,
    position_sync: bool,
    pending_warp: Option<Vec3>,
}

impl NavAgent {
    pub fn new(speed: f32, stopping_distance: f32) -> Self {
        Self {
            destination: None,
            speed,
            stopped: false,
            path_pending: false,
            remaining_distance: 0.0,
            stopping_distance,
            velocity: Vec3::ZERO,
            position_sync: true,
            pending_warp: None,
        }
    }

    pub fn set_destination(&mut self, destination: Vec3) {
        self.destination = Some(destination);
        self.path_pending = true;
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_path_pending(&self) -> bool {
        self.path_pending
    }

    pub fn remaining_distance(&self) -> f32 {
        self.remaining_distance
    }

    pub fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    pub fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
        if stopped {
            self.velocity = Vec3::ZERO;
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Телепорт (применяется на следующем navigation шаге)
    pub fn warp(&mut self, position: Vec3) {
        self.pending_warp = Some(position);
    }

    pub fn set_position_sync(&mut self, enabled: bool) {
        self.position_sync = enabled;
        if !enabled {
            self.velocity = Vec3::ZERO;
        }
    }

    pub fn position_sync_enabled(&self) -> bool {
        self.position_sync
    }

    /// Путь посчитан и агент в пределах stopping distance
    pub fn has_reached_destination(&self) -> bool {
        !self.path_pending && self.remaining_distance <= self.stopping_distance
    }
}

impl Default for NavAgent {
    fn default() -> Self {
        Self::new(2.0, 1.0)
    }
}

/// Headless navigation backend: прямая по XZ, агент стоит на плоскости земли
///
/// Движок с настоящим navmesh заменяет эту систему своей (NavigationPlugin
/// тогда не добавляется).
pub fn headless_navigation_step(
    mut agents: Query<(&mut Transform, &mut NavAgent)>,
    collision: Res<CollisionWorld>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (mut transform, mut nav) in agents.iter_mut() {
        if let Some(position) = nav.pending_warp.take() {
            transform.translation = collision.project_to_ground(position);
        }

        // Путь "посчитан" за один шаг
        nav.path_pending = false;

        let Some(destination) = nav.destination else {
            nav.remaining_distance = 0.0;
            nav.velocity = Vec3::ZERO;
            continue;
        };

        let to_destination = Vec3::new(
            destination.x - transform.translation.x,
            0.0,
            destination.z - transform.translation.z,
        );
        let distance = to_destination.length();

        if nav.position_sync && !nav.stopped && distance > nav.stopping_distance && delta > 0.0 {
            let step = (nav.speed * delta).min(distance);
            let direction = to_destination / distance;
            let next = transform.translation + direction * step;
            transform.translation = collision.project_to_ground(next);
            nav.velocity = direction * (step / delta);
            nav.remaining_distance = distance - step;
        } else {
            if nav.position_sync {
                nav.velocity = Vec3::ZERO;
            }
            nav.remaining_distance = distance;
        }

        if nav.velocity.length_squared() < VELOCITY_EPSILON {
            nav.velocity = Vec3::ZERO;
        }
    }
}

/// Navigation Plugin (headless backend)
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            headless_navigation_step.in_set(SimulationSet::Navigation),
        );
    }
}
