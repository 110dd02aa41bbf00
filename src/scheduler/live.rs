//! Real-time rotation loop.
//!
//! One tokio task owns the [RotationCore] and therefore every charge counter.
//! Recharge timers are sleeper tasks in a `JoinSet` that report back with a
//! message; callers talk to the loop through [LiveHandle]. Commands and timer
//! messages are applied one at a time between ticks, so stopping the loop can
//! never leave a half-applied charge update behind.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tokio_stream::wrappers::ReceiverStream;

use crate::config::RotationPlan;
use crate::error::LiveError;
use crate::scheduler::{CastEvent, RechargeClock, RotationCore, ScheduleConfig, ScheduleState};

const COMMAND_BUFFER: usize = 16;
const CAST_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveCommand {
    /// Fire a chain now if all of its members are ready.
    TriggerChain(usize),
    Stop,
}

/// Sent by a sleeper task when one recharge of `slot` has run its course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CooldownElapsed {
    slot: usize,
}

pub struct LiveHandle {
    commands: mpsc::Sender<LiveCommand>,
    casts: ReceiverStream<CastEvent>,
    task: JoinHandle<ScheduleState>,
}

impl LiveHandle {
    /// Emitted casts, timestamped in milliseconds since the loop started.
    pub fn casts(&mut self) -> &mut ReceiverStream<CastEvent> {
        &mut self.casts
    }

    pub async fn trigger_chain(&self, index: usize) -> Result<(), LiveError> {
        self.commands
            .send(LiveCommand::TriggerChain(index))
            .await
            .map_err(|_| LiveError::Stopped)
    }

    /// Stop the loop and return its final state.
    pub async fn stop(self) -> Result<ScheduleState, LiveError> {
        // The loop may already be gone; joining tells us how it ended.
        let _ = self.commands.send(LiveCommand::Stop).await;
        drop(self.casts);
        self.task.await.map_err(|_| LiveError::Stopped)
    }
}

/// Start the live loop on the current tokio runtime.
pub fn spawn(plan: Arc<RotationPlan>, config: ScheduleConfig) -> LiveHandle {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (cast_tx, cast_rx) = mpsc::channel(CAST_BUFFER);
    let task = tokio::spawn(run_loop(plan, config, command_rx, cast_tx));
    LiveHandle {
        commands: command_tx,
        casts: ReceiverStream::new(cast_rx),
        task,
    }
}

async fn run_loop(
    plan: Arc<RotationPlan>,
    config: ScheduleConfig,
    mut commands: mpsc::Receiver<LiveCommand>,
    casts: mpsc::Sender<CastEvent>,
) -> ScheduleState {
    let mut core = RotationCore::new(&plan, &config, RechargeClock::External);
    let (elapsed_tx, mut elapsed_rx) = mpsc::unbounded_channel::<CooldownElapsed>();
    let mut timers = JoinSet::new();
    let mut ticker = interval(Duration::from_millis(config.tick_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let start = Instant::now();
    let mut emitted = Vec::new();

    info!("live rotation started");
    'run: loop {
        tokio::select! {
            biased;
            command = commands.recv() => match command {
                Some(LiveCommand::TriggerChain(index)) => {
                    if core.trigger_chain(index) {
                        debug!("chain {index} triggered");
                    } else {
                        debug!("chain {index} not ready");
                    }
                }
                Some(LiveCommand::Stop) | None => break 'run,
            },
            Some(CooldownElapsed { slot }) = elapsed_rx.recv() => {
                core.complete_recharge(slot, elapsed_ms(start));
                debug!("slot {slot} recharged");
            }
            _ = ticker.tick() => {
                core.step(elapsed_ms(start), &mut emitted);
            }
            Some(_) = timers.join_next() => {}
        }

        for slot in core.take_started_timers() {
            let tx = elapsed_tx.clone();
            let cooldown = Duration::from_millis(core.cooldown_ms(slot));
            timers.spawn(async move {
                sleep(cooldown).await;
                let _ = tx.send(CooldownElapsed { slot });
            });
        }

        for cast in emitted.drain(..) {
            debug!("cast {} at {} ms", cast.source.label(), cast.timestamp_ms);
            if casts.send(cast).await.is_err() {
                break 'run;
            }
        }
    }

    timers.abort_all();
    info!("live rotation stopped");
    core.state().clone()
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
