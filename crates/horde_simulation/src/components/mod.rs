//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (Health, Zombie marker)
//! - player: player control (Player, PlayerInput, PlayerMotor, PunchLockout, ScenePlayer)

pub mod actor;
pub mod player;

// Re-exports для удобного импорта
pub use actor::*;
pub use player::*;
