//! Perception: обнаружение игрока зомби
//!
//! Два теста (оба от уровня глаз):
//! - distance gate: дистанция глаза-глаза ≤ awareness radius
//! - line of sight: луч от глаз наблюдателя к глазам цели первым попадает в цель
//!
//! Чистые функции поверх `SpatialQuery` — тестируются без App.

use bevy::prelude::*;

use crate::physics::SpatialQuery;

/// Точка глаз агента (pivot + eye_height по Y)
pub fn eye_position(position: Vec3, eye_height: f32) -> Vec3 {
    position + Vec3::Y * eye_height
}

/// Видит ли наблюдатель цель
///
/// Луч ограничен `max_distance`: если первое попадание — не цель
/// (стена, другой зомби) или луч ничего не задел, LOS нет.
/// Глаз уже внутри коллайдера цели (игрок вплотную) — видим.
pub fn has_line_of_sight(
    spatial: &impl SpatialQuery,
    observer_position: Vec3,
    target: Entity,
    target_position: Vec3,
    eye_height: f32,
    max_distance: f32,
) -> bool {
    let from = eye_position(observer_position, eye_height);
    let to = eye_position(target_position, eye_height);
    let Some(direction) = (to - from).try_normalize() else {
        // Совпадающие точки — считаем что видим
        return true;
    };

    // Луч изнутри коллайдера цель не заденет
    if spatial.contains(target, from) {
        return true;
    }

    spatial
        .raycast(from, direction, max_distance)
        .is_some_and(|hit| hit.entity == target)
}

/// Полная проверка обнаружения: distance gate + line of sight
pub fn detect(
    spatial: &impl SpatialQuery,
    observer_position: Vec3,
    target: Entity,
    target_position: Vec3,
    awareness_radius: f32,
    eye_height: f32,
) -> bool {
    let eye = eye_position(observer_position, eye_height);
    let target_eye = eye_position(target_position, eye_height);
    if eye.distance(target_eye) > awareness_radius {
        return false;
    }

    has_line_of_sight(
        spatial,
        observer_position,
        target,
        target_position,
        eye_height,
        awareness_radius,
    )
}
