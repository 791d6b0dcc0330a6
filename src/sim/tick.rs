//! World tick
//!
//! One call advances the world by one step of the fixed-rate loop:
//! input, firing, collisions, cleanup, then motion.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::state::{GameEvent, World};

/// Controls currently held down by the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldInput {
    pub thrust: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub fire: bool,
}

/// How many dead entities are swept out of each collection per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Classic: at most the first dead entity of each kind; the rest linger
    /// until later ticks
    FirstPerKind,
    #[default]
    All,
}

/// Advance the world by one tick. `dt` is the tick length in milliseconds.
pub fn tick(world: &mut World, input: &HeldInput, dt: f32) {
    world.events.clear();

    apply_input(world, input);
    handle_fire(world, input);
    handle_collisions(world);
    clean_up(world);

    let clock = world.death_clock();
    let bounds = world.bounds;
    world.player.update(dt, &bounds, clock);
    for rock in &mut world.obstacles {
        rock.update(dt, &bounds, clock);
    }
    for laser in &mut world.projectiles {
        laser.update(dt, &bounds, clock);
    }

    world.time_ticks += 1;
}

fn apply_input(world: &mut World, input: &HeldInput) {
    // A destroyed craft no longer responds to controls unless wrecks still act
    if !world.player.alive && !world.settings.wrecks_interact {
        return;
    }

    let tuning = &world.settings.tuning;
    if input.thrust {
        world.player.accelerate(tuning.player_thrust);
    }
    if input.rotate_left {
        world.player.rotate(tuning.player_turn_rate);
    }
    if input.rotate_right {
        world.player.rotate(-tuning.player_turn_rate);
    }
}

fn handle_fire(world: &mut World, input: &HeldInput) {
    if world.fire_cooldown > 0 {
        world.fire_cooldown -= 1;
        return;
    }
    if input.fire && (world.player.alive || world.settings.wrecks_interact) {
        let id = world.fire();
        world.fire_cooldown = world.settings.fire_cooldown_ticks;
        world.events.push(GameEvent::ProjectileFired { id });
    }
}

fn handle_collisions(world: &mut World) {
    let metric = world.settings.distance;
    let wrecks = world.settings.wrecks_interact;
    let tuning = &world.settings.tuning;
    // Obstacles destroyed this tick and the velocity of whatever hit them
    let mut broken: Vec<(Entity, Vec2)> = Vec::new();

    for rock in &mut world.obstacles {
        let player_was_alive = world.player.alive;
        let rock_was_alive = rock.alive;
        if world.player.handle_collision(rock, metric, wrecks) {
            if player_was_alive {
                log::info!("Player destroyed by obstacle #{}", rock.id);
                world.events.push(GameEvent::PlayerDestroyed {
                    obstacle_id: rock.id,
                });
            }
            if rock_was_alive {
                world.events.push(GameEvent::ObstacleDestroyed {
                    id: rock.id,
                    shot: false,
                });
                broken.push((rock.clone(), world.player.vel));
            }
        }

        for laser in &mut world.projectiles {
            let rock_was_alive = rock.alive;
            if laser.handle_collision(rock, metric, wrecks) && rock_was_alive {
                let size = rock.size.unwrap_or_default();
                world.score += size.points(tuning);
                world.events.push(GameEvent::ObstacleDestroyed {
                    id: rock.id,
                    shot: true,
                });
                broken.push((rock.clone(), laser.vel));
            }
        }
    }

    if world.settings.split_obstacles {
        for (rock, hitter_vel) in broken {
            world.split_obstacle(&rock, hitter_vel);
        }
    }
}

fn clean_up(world: &mut World) {
    let policy = world.settings.cleanup;
    sweep(&mut world.projectiles, policy);
    sweep(&mut world.obstacles, policy);
}

fn sweep(entities: &mut Vec<Entity>, policy: CleanupPolicy) {
    match policy {
        CleanupPolicy::FirstPerKind => {
            if let Some(index) = entities.iter().position(|e| !e.alive) {
                let removed = entities.remove(index);
                log::trace!("Removed {}#{}", removed.name(), removed.id);
            }
        }
        CleanupPolicy::All => entities.retain(|e| e.alive),
    }
}
