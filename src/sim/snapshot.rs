//! Render-facing view of the world
//!
//! A [`Frame`] is an immutable copy of everything a presentation layer needs
//! to draw one tick. Dead entities are left out.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};
use super::state::{Star, World};
use crate::consts::HEADING_FRAMES;

/// One drawable entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub id: u32,
    pub kind: EntityKind,
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    pub rotation: f32,
    /// Index of the heading frame to draw (player craft only uses it)
    pub frame: usize,
}

impl Sprite {
    fn from_entity(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind,
            x: entity.pos.x,
            y: entity.pos.y,
            radius: entity.radius,
            rotation: entity.rotation,
            frame: match entity.kind {
                EntityKind::Player => heading_frame(entity.rotation, HEADING_FRAMES),
                _ => 0,
            },
        }
    }
}

/// Snapshot of the world taken before a tick
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u64,
    pub score: u64,
    pub player_alive: bool,
    /// Player first, then obstacles, then projectiles
    pub sprites: Vec<Sprite>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stars: Vec<Star>,
}

impl Frame {
    pub fn capture(world: &World) -> Self {
        let sprites = std::iter::once(&world.player)
            .chain(&world.obstacles)
            .chain(&world.projectiles)
            .filter(|e| e.alive)
            .map(Sprite::from_entity)
            .collect();

        let stars = if world.settings.starfield {
            world.stars.clone()
        } else {
            Vec::new()
        };

        Self {
            tick: world.time_ticks,
            score: world.score,
            player_alive: world.player.alive,
            sprites,
            stars,
        }
    }

    pub fn player(&self) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.kind == EntityKind::Player)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.sprites.iter().filter(|s| s.kind == kind).count()
    }
}

/// Sprite frame for a heading: nearest of `frames` evenly spaced headings
pub fn heading_frame(rotation: f32, frames: usize) -> usize {
    if frames == 0 {
        return 0;
    }
    let step = 360.0 / frames as f32;
    let index = (crate::normalize_degrees(rotation) / step).round() as usize;
    index % frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::ScreenBounds;

    fn world() -> World {
        World::new(21, ScreenBounds::new(1080, 1920).unwrap(), Settings::default())
    }

    #[test]
    fn test_heading_frame() {
        assert_eq!(heading_frame(0.0, 12), 0);
        assert_eq!(heading_frame(90.0, 12), 3);
        assert_eq!(heading_frame(14.0, 12), 0);
        assert_eq!(heading_frame(16.0, 12), 1);
        assert_eq!(heading_frame(350.0, 12), 0);
        assert_eq!(heading_frame(-90.0, 12), 9);
        assert_eq!(heading_frame(45.0, 0), 0);
    }

    #[test]
    fn test_capture_live_entities_only() {
        let mut world = world();
        world.fire();
        world.obstacles[0].alive = false;
        world.score = 40;

        let frame = Frame::capture(&world);
        assert_eq!(frame.score, 40);
        assert!(frame.player_alive);
        assert_eq!(frame.count(EntityKind::Obstacle), world.obstacles.len() - 1);
        assert_eq!(frame.count(EntityKind::Projectile), 1);
        assert!(frame.sprites.iter().all(|s| s.id != world.obstacles[0].id));

        let ship = frame.player().unwrap();
        assert_eq!((ship.x, ship.y), (540, 960));
        assert_eq!(ship.frame, 3);
    }

    #[test]
    fn test_dead_player_not_drawn() {
        let mut world = world();
        world.player.alive = false;
        let frame = Frame::capture(&world);
        assert!(!frame.player_alive);
        assert!(frame.player().is_none());
    }

    #[test]
    fn test_starfield_setting() {
        let mut world = world();
        assert!(Frame::capture(&world).stars.is_empty());

        world.settings.starfield = true;
        let frame = Frame::capture(&world);
        assert_eq!(frame.stars, world.stars);
    }

    #[test]
    fn test_frame_json() {
        let frame = Frame::capture(&world());
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"kind\":\"player\""));
        assert!(!json.contains("stars"));
        let parsed: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, frame);
    }
}
