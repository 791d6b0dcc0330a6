//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order within each collection)
//! - No async or platform dependencies

pub mod bounds;
pub mod collision;
pub mod entity;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use bounds::ScreenBounds;
pub use collision::{DistanceMetric, distance, overlaps};
pub use entity::{DeathClock, Entity, EntityKind, ExpiryTiming, ObstacleSize};
pub use snapshot::{Frame, Sprite, heading_frame};
pub use state::{GameEvent, Star, World};
pub use tick::{CleanupPolicy, HeldInput, tick};
