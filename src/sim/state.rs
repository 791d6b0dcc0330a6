//! World state
//!
//! The world owns every entity. Only the world loop mutates it; everything
//! else sees [`Frame`](super::Frame) snapshots.

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bounds::ScreenBounds;
use super::collision::overlaps;
use super::entity::{DeathClock, Entity, ObstacleSize};
use crate::consts::*;
use crate::settings::Settings;

/// Decorative background marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Star {
    pub pos: IVec2,
    pub size: u32,
}

/// Things that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ProjectileFired { id: u32 },
    ObstacleDestroyed { id: u32, shot: bool },
    ObstacleSplit { parent_id: u32, size: ObstacleSize },
    PlayerDestroyed { obstacle_id: u32 },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct World {
    /// Seed the current layout was generated from
    pub seed: u64,
    rng: Pcg32,
    pub bounds: ScreenBounds,
    pub settings: Settings,
    pub player: Entity,
    pub obstacles: Vec<Entity>,
    pub projectiles: Vec<Entity>,
    pub stars: Vec<Star>,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Ticks until the player may fire again
    pub fire_cooldown: u32,
    /// Events produced by the most recent tick
    pub events: Vec<GameEvent>,
    /// Resets performed so far; mixed into the seed of each new layout
    generation: u64,
    next_id: u32,
}

impl World {
    /// Create a world with the player centered and the obstacle belt placed
    pub fn new(seed: u64, bounds: ScreenBounds, settings: Settings) -> Self {
        let tuning = settings.tuning.clone();
        let mut world = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            bounds,
            player: Entity::player(0, &bounds, &tuning),
            settings,
            obstacles: Vec::new(),
            projectiles: Vec::new(),
            stars: Vec::new(),
            score: 0,
            time_ticks: 0,
            fire_cooldown: 0,
            events: Vec::new(),
            generation: 0,
            next_id: 1,
        };
        world.populate();
        world
    }

    fn populate(&mut self) {
        let id = self.next_entity_id();
        self.player = Entity::player(id, &self.bounds, &self.settings.tuning);

        for _ in 0..self.settings.obstacle_count {
            self.spawn_obstacle();
        }

        let star_count = self.rng.random_range(
            STAR_AVG_COUNT - STAR_COUNT_SPREAD..STAR_AVG_COUNT + STAR_COUNT_SPREAD,
        );
        for _ in 0..star_count {
            let pos = self.bounds.random_point(&mut self.rng);
            let size = self.rng.random_range(STAR_MIN_SIZE..STAR_MAX_SIZE);
            self.stars.push(Star { pos, size });
        }

        log::debug!(
            "World populated: {} obstacles, {} stars (seed {})",
            self.obstacles.len(),
            self.stars.len(),
            self.seed
        );
    }

    /// Start over: fresh layout, no projectiles, zero score
    pub fn reset(&mut self) {
        self.generation += 1;
        self.seed = self.seed.wrapping_add(self.generation);
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.obstacles.clear();
        self.projectiles.clear();
        self.stars.clear();
        self.events.clear();
        self.score = 0;
        self.time_ticks = 0;
        self.fire_cooldown = 0;
        self.populate();
        log::info!("World reset (seed {})", self.seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Place one obstacle at a random on-screen point.
    ///
    /// With spawn clearance on, points that already touch the player are
    /// re-rolled a bounded number of times; the last roll is kept regardless.
    pub fn spawn_obstacle(&mut self) -> u32 {
        let mut pos = self.bounds.random_point(&mut self.rng);
        if self.settings.spawn_clearance {
            let mut attempts = 1;
            while attempts < SPAWN_CLEARANCE_ATTEMPTS && self.touches_player(pos) {
                pos = self.bounds.random_point(&mut self.rng);
                attempts += 1;
            }
            if self.touches_player(pos) {
                log::warn!("No clear spawn point found for obstacle near ({}, {})", pos.x, pos.y);
            }
        }

        let id = self.next_entity_id();
        let rock = Entity::obstacle(id, pos, &mut self.rng, &self.settings.tuning);
        self.obstacles.push(rock);
        id
    }

    fn touches_player(&self, pos: IVec2) -> bool {
        overlaps(
            self.settings.distance,
            pos,
            self.settings.tuning.obstacle_radius,
            self.player.pos,
            self.player.radius,
        )
    }

    /// Break `parent` into two obstacles of the next size down.
    ///
    /// The pieces head off either side of the mean of the parent's course
    /// and the hitter's, each deviating by the same random angle up to
    /// `split_spread`. Returns the new IDs, or nothing for the smallest tier.
    pub fn split_obstacle(&mut self, parent: &Entity, hitter_vel: Vec2) -> Vec<u32> {
        let Some(size) = parent.size.and_then(ObstacleSize::smaller) else {
            return Vec::new();
        };

        let hitter_course = if hitter_vel == Vec2::ZERO {
            0.0
        } else {
            hitter_vel.y.atan2(hitter_vel.x).to_degrees()
        };
        let mean = (parent.course() + hitter_course) / 2.0;
        let spread = self.settings.tuning.split_spread.max(0.0);
        let offset = if spread > 0.0 {
            self.rng.random_range(0.0..=spread)
        } else {
            0.0
        };

        let mut ids = Vec::with_capacity(2);
        for heading in [mean - offset, mean + offset] {
            let id = self.next_entity_id();
            let piece = Entity::fragment(id, parent, size, heading, &self.settings.tuning);
            self.obstacles.push(piece);
            ids.push(id);
        }
        self.events.push(GameEvent::ObstacleSplit {
            parent_id: parent.id,
            size,
        });
        log::debug!("Obstacle #{} split into {:?} #{:?}", parent.id, size, ids);
        ids
    }

    /// Spawn a projectile from the player's nose
    pub fn fire(&mut self) -> u32 {
        let id = self.next_entity_id();
        let laser = Entity::projectile(id, &self.player, &self.settings.tuning);
        self.projectiles.push(laser);
        id
    }

    /// True once the player craft has been destroyed
    pub fn is_over(&self) -> bool {
        !self.player.alive
    }

    pub fn live_obstacles(&self) -> usize {
        self.obstacles.iter().filter(|e| e.alive).count()
    }

    pub fn live_projectiles(&self) -> usize {
        self.projectiles.iter().filter(|e| e.alive).count()
    }

    /// Death timers drain against the nominal rate, so a projectile lives
    /// the same wall-clock time whatever `settings.target_fps` is
    pub fn death_clock(&self) -> DeathClock {
        DeathClock {
            target_fps: TARGET_FPS,
            expiry: self.settings.expiry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Ruleset;

    fn bounds() -> ScreenBounds {
        ScreenBounds::new(1080, 1920).unwrap()
    }

    #[test]
    fn test_new_world_layout() {
        let world = World::new(12345, bounds(), Settings::default());
        assert_eq!(world.obstacles.len(), OBSTACLE_COUNT);
        assert_eq!(world.live_obstacles(), OBSTACLE_COUNT);
        assert!(world.projectiles.is_empty());
        assert_eq!(world.player.pos, IVec2::new(540, 960));
        assert!(!world.is_over());
        assert!(
            (STAR_AVG_COUNT - STAR_COUNT_SPREAD..STAR_AVG_COUNT + STAR_COUNT_SPREAD)
                .contains(&world.stars.len())
        );
        for star in &world.stars {
            assert!((STAR_MIN_SIZE..STAR_MAX_SIZE).contains(&star.size));
        }
    }

    #[test]
    fn test_obstacles_on_screen() {
        let world = World::new(7, bounds(), Settings::from_preset(Ruleset::Classic));
        for rock in &world.obstacles {
            assert!(rock.pos.x >= 0 && rock.pos.x < 1080);
            assert!(rock.pos.y >= 0 && rock.pos.y < 1920);
        }
    }

    #[test]
    fn test_spawn_clearance_keeps_player_safe() {
        for seed in 0..20 {
            let world = World::new(seed, bounds(), Settings::default());
            for rock in &world.obstacles {
                assert!(!overlaps(
                    world.settings.distance,
                    rock.pos,
                    rock.radius,
                    world.player.pos,
                    world.player.radius
                ));
            }
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = World::new(99, bounds(), Settings::default());
        let b = World::new(99, bounds(), Settings::default());
        assert_eq!(a.obstacles, b.obstacles);
        assert_eq!(a.stars, b.stars);
    }

    #[test]
    fn test_unique_ids() {
        let mut world = World::new(1, bounds(), Settings::default());
        let fired = world.fire();
        let mut ids: Vec<u32> = world.obstacles.iter().map(|e| e.id).collect();
        ids.push(world.player.id);
        ids.push(fired);
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_split_into_next_tier() {
        let mut settings = Settings::default();
        settings.obstacle_count = 1;
        let mut world = World::new(4, bounds(), settings);
        let parent = world.obstacles[0].clone();

        let ids = world.split_obstacle(&parent, Vec2::new(0.0, 50.0));
        assert_eq!(ids.len(), 2);
        assert_eq!(world.obstacles.len(), 3);
        for piece in &world.obstacles[1..] {
            assert_eq!(piece.size, Some(ObstacleSize::Medium));
            assert_eq!(piece.pos, parent.pos);
            // Parent velocity plus one kick
            assert!(((piece.vel - parent.vel).length() - world.settings.tuning.split_kick).abs() < 1e-3);
        }
        assert!(world.events.contains(&GameEvent::ObstacleSplit {
            parent_id: parent.id,
            size: ObstacleSize::Medium
        }));
    }

    #[test]
    fn test_split_pieces_mirror_the_mean_heading() {
        let mut settings = Settings::default();
        settings.obstacle_count = 1;
        let mut world = World::new(9, bounds(), settings);
        let mut parent = world.obstacles[0].clone();
        parent.vel = Vec2::new(10.0, 0.0);

        // Parent heads 0°, hitter 90°: pieces at 45° ± offset
        world.split_obstacle(&parent, Vec2::new(0.0, 10.0));
        let a = world.obstacles[1].rotation;
        let b = world.obstacles[2].rotation;
        assert!(((a + b) / 2.0 - 45.0).abs() < 1e-3);
        assert!((b - a) / 2.0 <= world.settings.tuning.split_spread + 1e-3);
        assert!(b >= a);
    }

    #[test]
    fn test_smallest_tier_does_not_split() {
        let mut settings = Settings::default();
        settings.obstacle_count = 1;
        let mut world = World::new(4, bounds(), settings);
        let mut parent = world.obstacles[0].clone();
        parent.size = Some(ObstacleSize::Small);

        assert!(world.split_obstacle(&parent, Vec2::ZERO).is_empty());
        assert_eq!(world.obstacles.len(), 1);
        assert!(world.events.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut world = World::new(5, bounds(), Settings::default());
        world.fire();
        world.score = 60;
        world.time_ticks = 99;
        world.player.alive = false;
        world.obstacles[0].alive = false;

        world.reset();
        assert!(world.player.alive);
        assert!(world.projectiles.is_empty());
        assert_eq!(world.live_obstacles(), OBSTACLE_COUNT);
        assert_eq!(world.obstacles.len(), OBSTACLE_COUNT);
        assert_eq!(world.score, 0);
        assert_eq!(world.time_ticks, 0);
        assert_ne!(world.seed, 5);
    }
}
