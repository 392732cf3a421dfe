//! Tuning конфиги агентов + загрузка SimulationSettings из JSON
//!
//! Значения по умолчанию = inspector defaults игровой сцены.
//! Конфиги — компоненты: у каждого зомби/игрока может быть свой тюнинг.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::physics::KnockbackParams;

/// Ошибки загрузки/валидации настроек
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Параметры зомби (perception, wander, combat, knockback)
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct ZombieConfig {
    /// Стартовое здоровье
    pub max_health: f32,
    /// Радиус выбора случайной wander точки (метры)
    pub wander_radius: f32,
    /// Пауза на месте после достижения wander точки (секунды)
    pub wander_pause_duration: f32,
    /// Радиус обнаружения и signaling (метры)
    pub awareness_radius: f32,
    /// Дистанция melee атаки (от ног до ног)
    pub melee_range: f32,
    /// Высота глаз над pivot (для LOS лучей)
    pub eye_height: f32,
    /// Минимальный интервал между атаками (секунды)
    pub attack_cooldown: f32,
    /// Вертикальная добавка к направлению knockback цели
    pub attack_vertical_bias: f32,
    pub wander_speed: f32,
    pub chase_speed: f32,
    /// Допуск NavAgent при достижении точки
    pub stopping_distance: f32,
    /// Self-knockback при получении урона
    pub knockback: KnockbackParams,
}

impl Default for ZombieConfig {
    fn default() -> Self {
        Self {
            max_health: 20.0,
            wander_radius: 7.0,
            wander_pause_duration: 2.0,
            awareness_radius: 35.0,
            melee_range: 1.5,
            eye_height: 1.5,
            attack_cooldown: 1.0,
            attack_vertical_bias: 0.5,
            wander_speed: 2.0,
            chase_speed: 4.0,
            stopping_distance: 1.0,
            knockback: KnockbackParams::zombie(),
        }
    }
}

/// Параметры игрока (движение, punch, knockback sink)
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    pub eye_height: f32,
    pub punch_range: f32,
    pub punch_damage: f32,
    /// Блокировка повторного удара (секунды)
    pub punch_lockout: f32,
    /// Длина луча вниз для grounded проверки
    pub ground_probe_distance: f32,
    pub knockback: KnockbackParams,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 6.0,
            jump_speed: 8.0,
            gravity: 20.0,
            eye_height: 1.5,
            punch_range: 2.0,
            punch_damage: 2.0,
            punch_lockout: 0.5,
            ground_probe_distance: 0.1,
            knockback: KnockbackParams::player(),
        }
    }
}

/// Глобальные настройки симуляции (resource)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Seed для DeterministicRng
    pub seed: u64,
    /// Высота плоскости земли (headless CollisionWorld)
    pub ground_height: f32,
    pub zombie: ZombieConfig,
    pub player: PlayerConfig,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            ground_height: 0.0,
            zombie: ZombieConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}

impl SimulationSettings {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Проверка что тюнинг физически осмысленный
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zombie = &self.zombie;
        positive("zombie.max_health", zombie.max_health)?;
        positive("zombie.wander_radius", zombie.wander_radius)?;
        non_negative("zombie.wander_pause_duration", zombie.wander_pause_duration)?;
        positive("zombie.awareness_radius", zombie.awareness_radius)?;
        positive("zombie.melee_range", zombie.melee_range)?;
        non_negative("zombie.eye_height", zombie.eye_height)?;
        non_negative("zombie.attack_cooldown", zombie.attack_cooldown)?;
        non_negative("zombie.wander_speed", zombie.wander_speed)?;
        non_negative("zombie.chase_speed", zombie.chase_speed)?;
        non_negative("zombie.stopping_distance", zombie.stopping_distance)?;
        validate_knockback("zombie.knockback", &zombie.knockback)?;

        let player = &self.player;
        non_negative("player.speed", player.speed)?;
        non_negative("player.jump_speed", player.jump_speed)?;
        positive("player.gravity", player.gravity)?;
        non_negative("player.eye_height", player.eye_height)?;
        positive("player.punch_range", player.punch_range)?;
        non_negative("player.punch_damage", player.punch_damage)?;
        non_negative("player.punch_lockout", player.punch_lockout)?;
        non_negative("player.ground_probe_distance", player.ground_probe_distance)?;
        validate_knockback("player.knockback", &player.knockback)?;

        Ok(())
    }
}

fn validate_knockback(field: &'static str, params: &KnockbackParams) -> Result<(), ConfigError> {
    // Без гравитации Falling фаза никогда не приземлится
    if !(params.gravity > 0.0) {
        return Err(invalid(field, format!("gravity must be > 0, got {}", params.gravity)));
    }
    if !(params.impulse_duration > 0.0) {
        return Err(invalid(
            field,
            format!("impulse_duration must be > 0, got {}", params.impulse_duration),
        ));
    }
    if !(params.ground_check_distance >= 0.0) {
        return Err(invalid(
            field,
            format!("ground_check_distance must be >= 0, got {}", params.ground_check_distance),
        ));
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be > 0, got {}", value)))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be >= 0, got {}", value)))
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
