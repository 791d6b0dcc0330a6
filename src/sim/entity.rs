//! Moving entities: player craft, obstacles and projectiles
//!
//! All three share one representation and differ only in their kind tag and
//! spawn parameters.

use glam::{IVec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bounds::ScreenBounds;
use super::collision::{DistanceMetric, overlaps};
use crate::consts::DEFAULT_HEADING;
use crate::settings::Tuning;
use crate::{heading_vector, normalize_degrees};

/// Entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Obstacle,
    Projectile,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Player => "Ship",
            EntityKind::Obstacle => "asteroid",
            EntityKind::Projectile => "Laser",
        }
    }
}

/// Obstacle size tier; shot obstacles may break into the next tier down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleSize {
    #[default]
    Large,
    Medium,
    Small,
}

impl ObstacleSize {
    /// Tier the fragments of this obstacle belong to; small ones just vanish
    pub fn smaller(self) -> Option<Self> {
        match self {
            ObstacleSize::Large => Some(ObstacleSize::Medium),
            ObstacleSize::Medium => Some(ObstacleSize::Small),
            ObstacleSize::Small => None,
        }
    }

    pub fn radius(self, tuning: &Tuning) -> i32 {
        match self {
            ObstacleSize::Large => tuning.obstacle_radius,
            ObstacleSize::Medium => tuning.medium_obstacle_radius,
            ObstacleSize::Small => tuning.small_obstacle_radius,
        }
    }

    pub fn points(self, tuning: &Tuning) -> u64 {
        match self {
            ObstacleSize::Large => tuning.obstacle_points,
            ObstacleSize::Medium => tuning.medium_obstacle_points,
            ObstacleSize::Small => tuning.small_obstacle_points,
        }
    }
}

/// When a death timer that ran out actually kills its entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryTiming {
    /// Classic: the update that takes the timer below zero leaves the entity
    /// alive and the following update kills it. A timer that lands exactly on
    /// zero never fires.
    Lagged,
    /// The update that takes the timer to zero or below kills the entity.
    #[default]
    Immediate,
}

/// Death-timer clock for one update
#[derive(Debug, Clone, Copy)]
pub struct DeathClock {
    /// Nominal loop rate; each update drains `dt / target_fps` (never 0)
    pub target_fps: u32,
    pub expiry: ExpiryTiming,
}

/// A moving object on the play field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Screen position (pixels, y down)
    pub pos: IVec2,
    /// Per-tick displacement (y up)
    pub vel: Vec2,
    /// Heading in degrees; normalized to [0, 360) on update
    pub rotation: f32,
    pub radius: i32,
    /// Set for obstacles only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ObstacleSize>,
    pub alive: bool,
    /// Teleport across screen edges
    pub wrap: bool,
    /// Remaining lifetime; 0 means the entity does not expire
    pub death_timer: f32,
}

impl Entity {
    fn new(id: u32, kind: EntityKind, pos: IVec2, radius: i32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            rotation: DEFAULT_HEADING,
            radius,
            size: None,
            alive: true,
            wrap: false,
            death_timer: 0.0,
        }
    }

    /// Player craft at the center of the screen, facing up
    pub fn player(id: u32, bounds: &ScreenBounds, tuning: &Tuning) -> Self {
        let mut ship = Self::new(id, EntityKind::Player, bounds.center(), tuning.player_radius);
        ship.wrap = true;
        ship.rotation = tuning.player_start_heading;
        ship
    }

    /// Obstacle at `pos`, launched along a random heading
    pub fn obstacle<R: Rng>(id: u32, pos: IVec2, rng: &mut R, tuning: &Tuning) -> Self {
        let mut rock = Self::new(id, EntityKind::Obstacle, pos, tuning.obstacle_radius);
        rock.size = Some(ObstacleSize::Large);
        rock.wrap = true;
        rock.rotation = 360.0 * rng.random::<f32>();
        rock.launch(tuning.obstacle_speed, tuning.launch_scale);
        rock
    }

    /// Piece of a broken obstacle: starts where `parent` was, keeps its
    /// velocity and gets an extra kick along `heading`
    pub fn fragment(
        id: u32,
        parent: &Entity,
        size: ObstacleSize,
        heading: f32,
        tuning: &Tuning,
    ) -> Self {
        let mut rock = Self::new(id, EntityKind::Obstacle, parent.pos, size.radius(tuning));
        rock.size = Some(size);
        rock.wrap = true;
        rock.rotation = heading;
        rock.vel = parent.vel;
        rock.accelerate(tuning.split_kick);
        rock
    }

    /// Heading of the current velocity in degrees, or 0 when at rest
    pub fn course(&self) -> f32 {
        if self.vel == Vec2::ZERO {
            return 0.0;
        }
        normalize_degrees(self.vel.y.atan2(self.vel.x).to_degrees())
    }

    /// Projectile leaving `shooter`'s position along its heading.
    ///
    /// Launch speed is the shooter's current speed plus the bonus; the
    /// shooter's direction of travel is not inherited.
    pub fn projectile(id: u32, shooter: &Entity, tuning: &Tuning) -> Self {
        let mut laser = Self::new(id, EntityKind::Projectile, shooter.pos, tuning.projectile_radius);
        laser.wrap = true;
        laser.rotation = shooter.rotation;
        laser.launch(
            shooter.speed() + tuning.projectile_bonus_speed,
            tuning.launch_scale,
        );
        laser.death_timer = tuning.projectile_lifetime;
        laser
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Current velocity magnitude
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Advance one tick: move, wrap, run the death timer, normalize heading
    pub fn update(&mut self, dt: f32, bounds: &ScreenBounds, clock: DeathClock) {
        if !self.alive {
            return;
        }

        // Positions are integral; fractional motion is dropped each tick
        self.pos.x += self.vel.x as i32;
        self.pos.y += (-self.vel.y) as i32;

        if self.wrap {
            bounds.wrap(&mut self.pos, self.radius);
        }

        self.tick_death_timer(dt, clock);

        self.rotation = normalize_degrees(self.rotation);
        log::trace!(
            "{}#{} at ({}, {}) heading {:.1}",
            self.name(),
            self.id,
            self.pos.x,
            self.pos.y,
            self.rotation
        );
    }

    fn tick_death_timer(&mut self, dt: f32, clock: DeathClock) {
        let drain = dt / clock.target_fps.max(1) as f32;
        match clock.expiry {
            ExpiryTiming::Lagged => {
                if self.death_timer > 0.0 {
                    self.death_timer -= drain;
                } else if self.death_timer < 0.0 {
                    self.alive = false;
                }
            }
            ExpiryTiming::Immediate => {
                if self.death_timer > 0.0 {
                    self.death_timer -= drain;
                    if self.death_timer <= 0.0 {
                        self.alive = false;
                    }
                }
            }
        }
    }

    /// Push along the current heading
    pub fn accelerate(&mut self, amount: f32) {
        self.vel += heading_vector(self.rotation) * amount;
    }

    /// Accelerate by `scale * amount`; used for spawn impulses
    pub fn launch(&mut self, amount: f32, scale: f32) {
        self.accelerate(scale * amount);
    }

    /// Turn by `amount` degrees (counter-clockwise positive)
    pub fn rotate(&mut self, amount: f32) {
        self.rotation += amount;
    }

    /// Kill both entities if they touch. Dead entities only collide when
    /// `wrecks` is set.
    ///
    /// Returns true when a hit was registered.
    pub fn handle_collision(
        &mut self,
        other: &mut Entity,
        metric: DistanceMetric,
        wrecks: bool,
    ) -> bool {
        if !wrecks && (!self.alive || !other.alive) {
            return false;
        }
        if !overlaps(metric, self.pos, self.radius, other.pos, other.radius) {
            return false;
        }
        log::debug!(
            "{}#{} collided with {}#{}",
            self.name(),
            self.id,
            other.name(),
            other.id
        );
        self.alive = false;
        other.alive = false;
        true
    }
}
