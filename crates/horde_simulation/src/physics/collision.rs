//! Collision / spatial query коллаборатор
//!
//! `SpatialQuery` — узкий интерфейс к физическому движку:
//! raycast, overlap sphere, grounded check. Perception и signaling
//! работают только через него.
//!
//! `CollisionWorld` — headless реализация:
//! - ground plane (слой LAYER_GROUND) на высоте `ground_height`
//! - акторы: сферы (ActorBody) на высоте груди
//! - препятствия: axis-aligned boxes (Obstacle)
//!
//! Как в Unity/Godot: луч, стартующий ВНУТРИ коллайдера, этот коллайдер
//! не видит (глаз зомби внутри его собственной сферы). Если нужно знать,
//! не стоит ли origin внутри чужого коллайдера, есть `contains`.

use bevy::prelude::*;

/// Layer 3: Environment (стены, ящики)
pub const LAYER_ENVIRONMENT: u32 = 0b100;

/// Layer 4: Ground (плоскость земли)
pub const LAYER_GROUND: u32 = 0b1000;

/// Mask: на чём можно стоять (земля + верх препятствий)
pub const GROUND_MASK: u32 = LAYER_GROUND | LAYER_ENVIRONMENT;

/// Результат raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub entity: Entity,
    pub point: Vec3,
    pub distance: f32,
}

/// Spatial query интерфейс (реализуется движком или CollisionWorld)
pub trait SpatialQuery {
    /// Первый коллайдер на луче (direction нормализуется внутри)
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit>;

    /// Все акторы, чьи коллайдеры пересекают сферу
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<Entity>;

    /// Луч вниз длиной `max_distance` упирается в поверхность из `mask`
    fn grounded_check(&self, origin: Vec3, max_distance: f32, mask: u32) -> bool;

    /// Лежит ли точка внутри коллайдера `entity` (false если коллайдера нет)
    fn contains(&self, entity: Entity, point: Vec3) -> bool;
}

/// Коллайдер актора (сфера на высоте `center_height` над pivot)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct ActorBody {
    pub radius: f32,
    pub center_height: f32,
}

impl Default for ActorBody {
    fn default() -> Self {
        // Покрывает 0.2..1.8м — линия глаз (1.5м) проходит сквозь сферу
        Self {
            radius: 0.8,
            center_height: 1.0,
        }
    }
}

/// Статическое препятствие (AABB вокруг Transform.translation)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Obstacle {
    pub half_extents: Vec3,
    /// Битовая маска слоёв (LAYER_ENVIRONMENT по умолчанию)
    pub layers: u32,
}

impl Obstacle {
    pub fn new(half_extents: Vec3) -> Self {
        Self {
            half_extents,
            layers: LAYER_ENVIRONMENT,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BodyShape {
    entity: Entity,
    center: Vec3,
    radius: f32,
}

#[derive(Debug, Clone, Copy)]
struct BoxShape {
    entity: Entity,
    min: Vec3,
    max: Vec3,
    layers: u32,
}

/// Headless collision world (resource)
///
/// Пересобирается каждый кадр в `sync_collision_world` — запросы видят
/// позиции на начало кадра.
#[derive(Resource, Debug, Clone, Default)]
pub struct CollisionWorld {
    pub ground_height: f32,
    bodies: Vec<BodyShape>,
    boxes: Vec<BoxShape>,
}

impl CollisionWorld {
    pub fn new(ground_height: f32) -> Self {
        Self {
            ground_height,
            ..Default::default()
        }
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.boxes.clear();
    }

    pub fn add_body(&mut self, entity: Entity, position: Vec3, body: &ActorBody) {
        self.bodies.push(BodyShape {
            entity,
            center: position + Vec3::Y * body.center_height,
            radius: body.radius,
        });
    }

    pub fn add_obstacle(&mut self, entity: Entity, center: Vec3, obstacle: &Obstacle) {
        self.boxes.push(BoxShape {
            entity,
            min: center - obstacle.half_extents,
            max: center + obstacle.half_extents,
            layers: obstacle.layers,
        });
    }

    /// Kinematic контроллер не проваливается сквозь землю
    pub fn clamp_above_ground(&self, position: Vec3) -> Vec3 {
        Vec3::new(position.x, position.y.max(self.ground_height), position.z)
    }

    /// Проекция точки на navmesh (в headless режиме — на плоскость земли)
    pub fn project_to_ground(&self, position: Vec3) -> Vec3 {
        Vec3::new(position.x, self.ground_height, position.z)
    }
}

impl SpatialQuery for CollisionWorld {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let body_hits = self
            .bodies
            .iter()
            .filter_map(|body| ray_sphere(origin, direction, body.center, body.radius).map(|t| (body.entity, t)));
        let box_hits = self
            .boxes
            .iter()
            .filter_map(|shape| ray_aabb(origin, direction, shape.min, shape.max).map(|t| (shape.entity, t)));

        body_hits
            .chain(box_hits)
            .filter(|(_, distance)| *distance <= max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, distance)| RaycastHit {
                entity,
                point: origin + direction * distance,
                distance,
            })
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<Entity> {
        self.bodies
            .iter()
            .filter(|body| body.center.distance(center) <= radius + body.radius)
            .map(|body| body.entity)
            .collect()
    }

    fn grounded_check(&self, origin: Vec3, max_distance: f32, mask: u32) -> bool {
        // Ниже плоскости тоже считается "на земле" (проваливание после большого шага)
        if mask & LAYER_GROUND != 0 && origin.y - self.ground_height <= max_distance {
            return true;
        }

        self.boxes.iter().any(|shape| {
            shape.layers & mask != 0
                && origin.x >= shape.min.x
                && origin.x <= shape.max.x
                && origin.z >= shape.min.z
                && origin.z <= shape.max.z
                && origin.y >= shape.min.y
                && origin.y - shape.max.y <= max_distance
        })
    }

    fn contains(&self, entity: Entity, point: Vec3) -> bool {
        let in_body = self
            .bodies
            .iter()
            .any(|body| body.entity == entity && body.center.distance_squared(point) <= body.radius * body.radius);

        in_body
            || self.boxes.iter().any(|shape| {
                shape.entity == entity
                    && point.cmpge(shape.min).all()
                    && point.cmple(shape.max).all()
            })
    }
}

/// Ray vs sphere: дистанция входа, None если origin внутри или сфера позади
fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let offset = origin - center;
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }

    let b = offset.dot(direction);
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let t = -b - discriminant.sqrt();
    (t >= 0.0).then_some(t)
}

/// Ray vs AABB (slab test): дистанция входа, None если origin внутри или box позади
fn ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];

        if d.abs() < 1e-8 {
            // Луч параллелен slab — должен быть внутри него
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    (t_enter >= 0.0).then_some(t_enter)
}

/// Система: пересборка CollisionWorld из ECS (headless режим)
pub fn sync_collision_world(
    mut world: ResMut<CollisionWorld>,
    bodies: Query<(Entity, &Transform, &ActorBody)>,
    obstacles: Query<(Entity, &Transform, &Obstacle)>,
) {
    world.clear();

    for (entity, transform, body) in bodies.iter() {
        world.add_body(entity, transform.translation, body);
    }

    for (entity, transform, obstacle) in obstacles.iter() {
        world.add_obstacle(entity, transform.translation, obstacle);
    }
}
