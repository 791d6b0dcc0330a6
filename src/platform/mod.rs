//! Host integration layer
//!
//! The simulation knows nothing about time, threads or screens. This layer
//! adds the pieces a host needs:
//! - Lifecycle state machine (start/pause/resume/stop)
//! - The world task that owns the world and ticks it at a fixed rate
//! - A draw sink that receives frame snapshots

pub mod driver;
pub mod lifecycle;

pub use driver::{Command, WorldHandle, forward_frames, spawn_world};
pub use lifecycle::{LifecycleEvent, LoopState};

use crate::sim::Frame;

/// Presentation side of the loop: receives every published frame
pub trait FrameSink {
    fn draw(&mut self, frame: &Frame);
}

/// Collects frames in memory
impl FrameSink for Vec<Frame> {
    fn draw(&mut self, frame: &Frame) {
        self.push(frame.clone());
    }
}
