//! World loop lifecycle
//!
//! ```text
//! Idle --Start--> Running --Pause--> Paused
//!                    ^                  |
//!                    +-----Resume-------+
//! any --Stop--> Stopped
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    /// Created but not started
    #[default]
    Idle,
    Running,
    Paused,
    /// Terminal; the world task has ended or is about to
    Stopped,
}

/// Lifecycle notifications from the host (window shown, app backgrounded...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Start,
    Pause,
    Resume,
    Stop,
}

impl LoopState {
    /// Next state after `event`, or `None` when the event does not apply in
    /// this state. Ignored events leave the loop untouched.
    pub fn apply(self, event: LifecycleEvent) -> Option<LoopState> {
        use LifecycleEvent::*;
        use LoopState::*;

        let next = match (self, event) {
            (Stopped, _) => None,
            (_, Stop) => Some(Stopped),
            (Idle, Start) => Some(Running),
            (Running, Pause) => Some(Paused),
            (Paused, Resume) => Some(Running),
            _ => None,
        };

        if next.is_none() {
            log::debug!("Ignoring {:?} while {:?}", event, self);
        }
        next
    }

    pub fn is_running(self) -> bool {
        self == LoopState::Running
    }

    pub fn is_stopped(self) -> bool {
        self == LoopState::Stopped
    }
}
