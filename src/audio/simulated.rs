//! Clock-driven engine used by the headless player.
//!
//! `SimulatedEngine` keeps time instead of producing sound: it reads the
//! duration from the file's tags, advances a position while "playing", and
//! emits the same notifications a real backend would.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Weak},
};

use {
    async_channel::{Receiver, Sender, unbounded},
    async_trait::async_trait,
    parking_lot::Mutex,
    tokio::{
        spawn,
        task::spawn_blocking,
        time::{Duration, MissedTickBehavior, interval},
    },
    tracing::{debug, trace},
};

use crate::{
    audio::{
        engine::{EngineNotification, PlaybackEngine},
        metadata::TagReader,
    },
    error::EngineError,
};

/// Default interval between position ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Clock state shared with the ticker task.
#[derive(Debug, Default)]
struct Clock {
    /// Loaded track and its duration.
    loaded: Option<(PathBuf, u64)>,
    /// Whether the clock is running.
    running: bool,
    /// Position in milliseconds.
    position_ms: u64,
    /// Output volume, kept for reporting only.
    volume: u8,
}

/// Engine that plays silence in real time.
pub struct SimulatedEngine {
    /// Shared clock.
    clock: Arc<Mutex<Clock>>,
    /// Notification sender used by the ticker.
    notify_tx: Sender<EngineNotification>,
    /// Notification receiver handed to the controller.
    notify_rx: Receiver<EngineNotification>,
}

impl SimulatedEngine {
    /// Creates an engine and starts its ticker on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new(tick_interval: Duration) -> Self {
        let clock = Arc::new(Mutex::new(Clock::default()));
        let (notify_tx, notify_rx) = unbounded();

        spawn(run_ticker(Arc::downgrade(&clock), notify_tx.clone(), tick_interval));

        Self {
            clock,
            notify_tx,
            notify_rx,
        }
    }

    /// Current position in milliseconds.
    #[must_use]
    pub fn position_ms(&self) -> u64 {
        self.clock.lock().position_ms
    }

    /// Current output volume.
    #[must_use]
    pub fn volume(&self) -> u8 {
        self.clock.lock().volume
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

#[async_trait]
impl PlaybackEngine for SimulatedEngine {
    async fn load(&self, path: &Path) -> Result<Option<u64>, EngineError> {
        let owned = path.to_path_buf();
        let duration = spawn_blocking(move || TagReader::read_duration_ms(owned))
            .await
            .map_err(|e| EngineError::load(path.display().to_string(), e.to_string()))?
            .map_err(|e| EngineError::load(path.display().to_string(), e.to_string()))?;

        let Some(duration) = duration else {
            return Err(EngineError::load(
                path.display().to_string(),
                "track has no duration",
            ));
        };

        let mut clock = self.clock.lock();
        clock.loaded = Some((path.to_path_buf(), duration));
        clock.running = false;
        clock.position_ms = 0;
        debug!("Loaded {} ({duration} ms)", path.display());

        Ok(Some(duration))
    }

    fn play(&self) -> Result<(), EngineError> {
        let mut clock = self.clock.lock();
        if clock.loaded.is_none() {
            return Err(EngineError::backend("nothing loaded"));
        }
        clock.running = true;
        Ok(())
    }

    fn pause(&self) -> Result<(), EngineError> {
        self.clock.lock().running = false;
        Ok(())
    }

    fn stop(&self) -> Result<(), EngineError> {
        let mut clock = self.clock.lock();
        clock.running = false;
        clock.position_ms = 0;
        Ok(())
    }

    fn seek(&self, position_ms: u64) -> Result<(), EngineError> {
        let mut clock = self.clock.lock();
        let Some(duration) = clock.loaded.as_ref().map(|(_, duration)| *duration) else {
            return Err(EngineError::backend("nothing loaded"));
        };
        clock.position_ms = position_ms.min(duration);
        Ok(())
    }

    fn set_volume(&self, level: u8) -> Result<(), EngineError> {
        if level > 100 {
            return Err(EngineError::backend(format!("volume {level} out of range")));
        }
        self.clock.lock().volume = level;
        Ok(())
    }

    fn notifications(&self) -> Receiver<EngineNotification> {
        self.notify_rx.clone()
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        self.notify_tx.close();
    }
}

/// Milliseconds the clock advances per tick.
fn tick_step(tick_interval: Duration) -> u64 {
    u64::try_from(tick_interval.as_millis()).unwrap_or(u64::MAX)
}

/// Advances the clock until the engine is dropped.
async fn run_ticker(
    clock: Weak<Mutex<Clock>>,
    notify_tx: Sender<EngineNotification>,
    tick_interval: Duration,
) {
    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let step = tick_step(tick_interval);

    loop {
        ticker.tick().await;

        let Some(clock) = clock.upgrade() else {
            break;
        };

        let notification = {
            let mut clock = clock.lock();
            let Some(duration) = clock.loaded.as_ref().map(|(_, duration)| *duration) else {
                continue;
            };
            if !clock.running {
                continue;
            }

            clock.position_ms = clock.position_ms.saturating_add(step).min(duration);
            if clock.position_ms >= duration {
                clock.running = false;
                EngineNotification::EndOfTrack
            } else {
                EngineNotification::PositionTick(clock.position_ms)
            }
        };

        trace!("Engine notification: {notification:?}");
        if notify_tx.send(notification).await.is_err() {
            break;
        }
    }

    debug!("Simulated engine ticker exiting");
}
