//! FSM AI components (Wander/Chase state machine, chase provenance).

use bevy::prelude::*;

/// Zombie FSM состояния
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ZombieState {
    /// Бродит между случайными точками
    Wander {
        /// Some — стоим на месте после достижения точки (секунды до новой точки)
        pause_remaining: Option<f32>,
    },

    /// Преследует цель (игрок или атаковавший)
    Chase { target: Entity },
}

impl Default for ZombieState {
    fn default() -> Self {
        Self::Wander {
            pause_remaining: None,
        }
    }
}

/// Мозг зомби: FSM state + chase provenance + cooldown
///
/// Ссылки на другие entity — weak handles: цель или источник сигнала
/// могут быть despawned, lookup через Query вернёт Err.
///
/// Инвариант: в Wander `signaling_source == None`, `has_signaled == false`,
/// `has_retargeted == false`, цели нет.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct ZombieBrain {
    pub state: ZombieState,
    /// Кто нас поднял (None — обнаружили цель сами)
    pub signaling_source: Option<Entity>,
    /// Мы уже рассылали сигнал в этом эпизоде
    pub has_signaled: bool,
    /// Мы уже сменили цель в этом chase эпизоде
    pub has_retargeted: bool,
    /// Время последней атаки (None — ещё не атаковали)
    pub last_attack_time: Option<f32>,
}

impl ZombieBrain {
    pub fn current_target(&self) -> Option<Entity> {
        match self.state {
            ZombieState::Chase { target } => Some(target),
            ZombieState::Wander { .. } => None,
        }
    }

    pub fn is_wandering(&self) -> bool {
        matches!(self.state, ZombieState::Wander { .. })
    }

    pub fn is_chasing(&self) -> bool {
        matches!(self.state, ZombieState::Chase { .. })
    }

    /// Chase по сигналу другого зомби (не self-detected)
    pub fn is_following_signal(&self) -> bool {
        self.signaling_source.is_some()
    }

    /// Wander → Chase (provenance не трогаем)
    pub fn begin_chase(&mut self, target: Entity) {
        self.state = ZombieState::Chase { target };
    }

    /// Получили сигнал: Chase за целью источника, без re-broadcast
    pub fn follow_signal(&mut self, source: Entity, target: Entity) {
        self.signaling_source = Some(source);
        self.begin_chase(target);
    }

    /// Смена цели (не больше одной за chase эпизод)
    ///
    /// Возвращает false если уже меняли.
    pub fn retarget(&mut self, target: Entity) -> bool {
        if self.has_retargeted {
            return false;
        }
        self.state = ZombieState::Chase { target };
        self.has_retargeted = true;
        true
    }

    /// Полный сброс chase полей при переходе в Wander
    ///
    /// `last_attack_time` переживает сброс (cooldown не обнуляется сменой state).
    pub fn reset_to_wander(&mut self) {
        self.state = ZombieState::default();
        self.signaling_source = None;
        self.has_signaled = false;
        self.has_retargeted = false;
    }
}
