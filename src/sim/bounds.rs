//! Screen rectangle supplied by the host
//!
//! Screen coordinates: x grows right, y grows down, origin at the top-left.

use glam::IVec2;
use rand::Rng;
use serde::Serialize;

use crate::{Error, Result};

/// Play field rectangle in screen pixels. Always non-empty; the only way
/// to build one is [`ScreenBounds::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenBounds {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl ScreenBounds {
    /// Bounds anchored at the origin with the given size
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidBounds { width, height });
        }
        Ok(Self {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        })
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn right(&self) -> i32 {
        self.right
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> IVec2 {
        IVec2::new(
            (self.left + self.right) / 2,
            (self.top + self.bottom) / 2,
        )
    }

    /// Uniform point with `left <= x < right` and `top <= y < bottom`
    pub fn random_point<R: Rng>(&self, rng: &mut R) -> IVec2 {
        IVec2::new(
            rng.random_range(self.left..self.right),
            rng.random_range(self.top..self.bottom),
        )
    }

    /// Teleport a point that left the screen to the opposite edge.
    ///
    /// An entity is let fully past the top/left edge (by its radius) before it
    /// wraps, and re-enters from just outside the top/left edge when it leaves
    /// through the bottom/right.
    pub fn wrap(&self, pos: &mut IVec2, radius: i32) {
        if pos.x > self.right {
            pos.x = self.left - radius;
        } else if pos.x < self.left - radius {
            pos.x = self.right;
        }

        if pos.y > self.bottom {
            pos.y = self.top - radius;
        } else if pos.y < self.top - radius {
            pos.y = self.bottom;
        }
    }
}
