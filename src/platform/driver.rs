//! World task
//!
//! A single tokio task owns the [`World`] and is its only writer. Hosts send
//! [`Command`]s over an mpsc channel and observe [`Frame`] snapshots and the
//! [`LoopState`] through watch channels.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::FrameSink;
use super::lifecycle::{LifecycleEvent, LoopState};
use crate::sim::{Frame, HeldInput, World, tick};
use crate::{Error, Result};

const COMMAND_BUFFER: usize = 64;

/// Messages accepted by the world task
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Replace the held controls; the latest input wins
    Input(HeldInput),
    Lifecycle(LifecycleEvent),
    /// Start over with a fresh layout and zero score
    Reset,
}

/// Host-side handle to a running world task
#[derive(Debug)]
pub struct WorldHandle {
    commands: mpsc::Sender<Command>,
    frames: watch::Receiver<Frame>,
    state: watch::Receiver<LoopState>,
    task: JoinHandle<World>,
}

impl WorldHandle {
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::LoopClosed)
    }

    pub async fn send_input(&self, input: HeldInput) -> Result<()> {
        self.send(Command::Input(input)).await
    }

    pub async fn start(&self) -> Result<()> {
        self.send(Command::Lifecycle(LifecycleEvent::Start)).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(Command::Lifecycle(LifecycleEvent::Pause)).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.send(Command::Lifecycle(LifecycleEvent::Resume)).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(Command::Lifecycle(LifecycleEvent::Stop)).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.send(Command::Reset).await
    }

    /// Most recently published frame
    pub fn frame(&self) -> Frame {
        self.frames.borrow().clone()
    }

    pub fn state(&self) -> LoopState {
        *self.state.borrow()
    }

    /// A fresh receiver for frame updates
    pub fn subscribe_frames(&self) -> watch::Receiver<Frame> {
        self.frames.clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<LoopState> {
        self.state.clone()
    }

    /// Stop the loop (if it is still running) and hand back the final world
    pub async fn join(self) -> Result<World> {
        let Self {
            commands, task, ..
        } = self;
        // The task may already have stopped on its own
        let _ = commands
            .send(Command::Lifecycle(LifecycleEvent::Stop))
            .await;
        drop(commands);
        task.await.map_err(|e| {
            log::error!("World task failed: {e}");
            Error::LoopClosed
        })
    }
}

/// Move `world` into a new world task. The loop starts `Idle`.
///
/// Fails without spawning anything when the world's settings are unusable.
pub fn spawn_world(world: World) -> Result<WorldHandle> {
    world.settings.validate()?;

    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (frame_tx, frame_rx) = watch::channel(Frame::capture(&world));
    let (state_tx, state_rx) = watch::channel(LoopState::Idle);

    let task = tokio::spawn(world_task(world, command_rx, frame_tx, state_tx));

    Ok(WorldHandle {
        commands: command_tx,
        frames: frame_rx,
        state: state_rx,
        task,
    })
}

async fn world_task(
    mut world: World,
    mut commands: mpsc::Receiver<Command>,
    frame_tx: watch::Sender<Frame>,
    state_tx: watch::Sender<LoopState>,
) -> World {
    let period = world.settings.tick_interval();
    let dt = world.settings.tick_dt();
    let mut interval = tokio::time::interval(period);
    // After a pause, carry on at the normal rate instead of catching up
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut state = LoopState::Idle;
    let mut input = HeldInput::default();

    log::info!(
        "World loop ready: {:?} per tick, ruleset {}",
        period,
        world.settings.ruleset.as_str()
    );

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => {
                let Some(command) = command else {
                    log::info!("All world handles dropped, stopping");
                    break;
                };
                match command {
                    Command::Input(held) => input = held,
                    Command::Lifecycle(event) => {
                        let Some(next) = state.apply(event) else {
                            continue;
                        };
                        log::info!("World loop {:?} -> {:?}", state, next);
                        state = next;
                        state_tx.send_replace(state);
                        if state.is_stopped() {
                            break;
                        }
                        if state.is_running() {
                            interval.reset();
                        }
                    }
                    Command::Reset => {
                        world.reset();
                        input = HeldInput::default();
                        frame_tx.send_replace(Frame::capture(&world));
                    }
                }
            }

            _ = interval.tick(), if state.is_running() => {
                frame_tx.send_replace(Frame::capture(&world));
                let was_over = world.is_over();
                tick(&mut world, &input, dt);
                if world.is_over() && !was_over {
                    log::info!(
                        "Game over at tick {} with score {}",
                        world.time_ticks,
                        world.score
                    );
                }
            }
        }
    }

    state_tx.send_replace(LoopState::Stopped);
    log::info!(
        "World loop stopped after {} ticks (score {})",
        world.time_ticks,
        world.score
    );
    world
}

/// Feed every newly published frame to `sink` until the world task ends
pub async fn forward_frames<S: FrameSink + ?Sized>(
    mut frames: watch::Receiver<Frame>,
    sink: &mut S,
) {
    while frames.changed().await.is_ok() {
        let frame = frames.borrow_and_update().clone();
        sink.draw(&frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::ScreenBounds;

    fn world() -> World {
        World::new(3, ScreenBounds::new(800, 600).unwrap(), Settings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_loop_does_not_tick() {
        let handle = spawn_world(world()).unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        assert_eq!(handle.state(), LoopState::Idle);
        assert_eq!(handle.frame().tick, 0);

        let world = handle.join().await.unwrap();
        assert_eq!(world.time_ticks, 0);
    }

    #[tokio::test]
    async fn test_rejects_unusable_fps() {
        for fps in [0, 2000] {
            let mut world = world();
            world.settings.target_fps = fps;
            assert!(matches!(spawn_world(world), Err(Error::InvalidSettings(_))));
        }
    }

    #[tokio::test]
    async fn test_commands_fail_after_stop() {
        let handle = spawn_world(world()).unwrap();
        handle.stop().await.unwrap();
        let mut state = handle.subscribe_state();
        state.wait_for(|s| s.is_stopped()).await.unwrap();
        // Let the task finish and drop its receiver
        tokio::task::yield_now().await;
        while !handle.task.is_finished() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(handle.start().await, Err(Error::LoopClosed)));
    }
}
