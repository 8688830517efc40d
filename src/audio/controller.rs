//! Playback controller.
//!
//! The controller owns the playlist, the cursor and the playback state
//! machine. Every command and every engine notification passes through one
//! queue drained by a single task, so each is applied completely before the
//! next one is looked at. Track loads are the only long-running step: while
//! one is in flight, commands that supersede it (`Load`, `Stop`,
//! `ClearPlaylist`) cancel it and everything else waits its turn.

use std::{
    collections::VecDeque,
    future::{Future, pending},
    path::Path,
    pin::Pin,
    sync::Arc,
};

use {
    async_channel::{Receiver, Sender, unbounded},
    parking_lot::RwLock,
    tokio::{select, spawn, sync::oneshot},
    tracing::{debug, error, info, warn},
};

use crate::{
    audio::{
        commands::Command,
        engine::{EngineNotification, PlaybackEngine},
        navigation::{DEFAULT_BACK_STACK_DEPTH, NavigationStrategy, Selection, ShuffleHistory},
    },
    config::UserSettings,
    error::{EngineError, ErrorKind, PlaybackError},
    library::{Playlist, Track},
    state::{ObserverHub, PlayMode, PlaybackEvent, PlaybackState},
};

/// Result of a command as seen by its issuer.
pub type CommandResult = Result<(), PlaybackError>;

type ReplyTx = oneshot::Sender<CommandResult>;

type LoadFuture = Pin<Box<dyn Future<Output = Result<Option<u64>, EngineError>> + Send>>;

/// Startup parameters for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Initial output volume, 0-100.
    pub volume: u8,
    /// Initial play mode.
    pub mode: PlayMode,
    /// Depth of the shuffle back-stack.
    pub back_stack_depth: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            volume: 50,
            mode: PlayMode::Sequential,
            back_stack_depth: DEFAULT_BACK_STACK_DEPTH,
        }
    }
}

impl From<&UserSettings> for ControllerConfig {
    fn from(settings: &UserSettings) -> Self {
        Self {
            volume: settings.volume.min(100),
            mode: settings.play_mode,
            back_stack_depth: settings.shuffle_back_stack,
        }
    }
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerSnapshot {
    /// Playback state.
    pub state: PlaybackState,
    /// Selected playlist index. `None` only when the playlist is empty.
    pub cursor: Option<usize>,
    /// Play mode.
    pub mode: PlayMode,
    /// Output volume.
    pub volume: u8,
    /// Current playlist.
    pub playlist: Playlist,
    /// Whether a track load is in flight.
    pub loading: bool,
}

/// Messages drained by the controller task.
enum ControlMessage {
    /// A command, with the channel to reply on if the issuer is waiting.
    Command {
        command: Command,
        reply: Option<ReplyTx>,
    },
    /// A notification forwarded from the engine.
    Engine(EngineNotification),
}

impl ControlMessage {
    fn cancels_load(&self) -> bool {
        matches!(self, Self::Command { command, .. } if command.cancels_load())
    }
}

/// Handle to a running controller.
///
/// Cheap to clone; every clone feeds the same queue. The controller task
/// exits once all handles are dropped.
#[derive(Clone)]
pub struct PlaybackController {
    /// Queue into the controller task.
    control_tx: Sender<ControlMessage>,
    /// Snapshot refreshed by the task before each reply.
    snapshot: Arc<RwLock<ControllerSnapshot>>,
    /// Observer registry events are published to.
    hub: ObserverHub,
}

impl PlaybackController {
    /// Starts a controller task on the current Tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `engine` - Audio backend to drive.
    /// * `hub` - Registry that receives every published event.
    /// * `config` - Initial volume, mode and shuffle depth.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(engine: Arc<dyn PlaybackEngine>, hub: ObserverHub, config: ControllerConfig) -> Self {
        let (control_tx, control_rx) = unbounded();
        let volume = config.volume.min(100);

        if let Err(e) = engine.set_volume(volume) {
            warn!("Failed to apply initial volume {volume}: {e}");
        }

        let snapshot = Arc::new(RwLock::new(ControllerSnapshot {
            mode: config.mode,
            volume,
            ..ControllerSnapshot::default()
        }));

        let notifications = engine.notifications();
        let worker = ControllerTask {
            engine,
            hub: hub.clone(),
            snapshot: Arc::clone(&snapshot),
            playlist: Playlist::new(),
            cursor: None,
            state: PlaybackState::Stopped,
            mode: config.mode,
            volume,
            track_loaded: false,
            duration_ms: None,
            navigation: NavigationStrategy::new(config.back_stack_depth),
            pending: None,
            deferred: VecDeque::new(),
            playlist_dirty: false,
        };
        spawn(worker.run(control_rx, notifications));

        info!(mode = %config.mode, volume, "Playback controller started");

        Self {
            control_tx,
            snapshot,
            hub,
        }
    }

    /// Applies `command` and waits for its outcome.
    ///
    /// Observers must not await this from inside a callback; use
    /// [`submit`](Self::submit) there instead.
    ///
    /// # Errors
    ///
    /// Returns the `PlaybackError` the command failed with, `Cancelled` if a
    /// later command superseded a load, or `Shutdown` if the controller task
    /// is gone.
    pub async fn execute(&self, command: Command) -> CommandResult {
        let (reply, outcome) = oneshot::channel();
        self.control_tx
            .send(ControlMessage::Command {
                command,
                reply: Some(reply),
            })
            .await
            .map_err(|_| PlaybackError::Shutdown)?;

        outcome.await.map_err(|_| PlaybackError::Shutdown)?
    }

    /// Queues `command` without waiting for it.
    ///
    /// Failures are published to observers as `PlaybackEvent::Error`.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Shutdown` if the controller task is gone.
    pub fn submit(&self, command: Command) -> CommandResult {
        self.control_tx
            .try_send(ControlMessage::Command {
                command,
                reply: None,
            })
            .map_err(|_| PlaybackError::Shutdown)
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        self.snapshot.read().clone()
    }

    /// Current playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.snapshot.read().state
    }

    /// Current cursor.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.snapshot.read().cursor
    }

    /// The observer registry this controller publishes to.
    #[must_use]
    pub fn hub(&self) -> &ObserverHub {
        &self.hub
    }
}

/// What playback should do once a navigation load completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Play,
    Pause,
    Stop,
}

impl From<PlaybackState> for Intent {
    fn from(state: PlaybackState) -> Self {
        match state {
            PlaybackState::Playing { .. } => Self::Play,
            PlaybackState::Paused { .. } => Self::Pause,
            PlaybackState::Stopped => Self::Stop,
        }
    }
}

/// Why a navigation load was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Next or Previous; a failed load degrades to Stopped.
    Step,
    /// End of track; a failed load degrades to Stopped.
    AutoAdvance,
    /// JumpTo or Play of an unloaded cursor; a failed load is an error.
    Explicit,
}

/// What to commit once a load succeeds.
enum LoadTarget {
    /// Replace the playlist and stop at `index`.
    Replace { playlist: Playlist, index: usize },
    /// Move within the current playlist.
    Navigate {
        index: usize,
        history: Option<ShuffleHistory>,
        intent: Intent,
        origin: Origin,
    },
}

/// A track load in flight.
struct PendingLoad {
    future: LoadFuture,
    target: LoadTarget,
    reply: Option<ReplyTx>,
}

/// Outcome of applying a command.
enum Flow {
    /// Applied; reply now.
    Done,
    /// A load was started; reply when it settles.
    Loading,
}

enum Wake {
    LoadSettled(Result<Option<u64>, EngineError>),
    Message(ControlMessage),
    EngineClosed,
    Shutdown,
}

/// State owned by the controller task.
struct ControllerTask {
    engine: Arc<dyn PlaybackEngine>,
    hub: ObserverHub,
    snapshot: Arc<RwLock<ControllerSnapshot>>,
    playlist: Playlist,
    cursor: Option<usize>,
    state: PlaybackState,
    mode: PlayMode,
    volume: u8,
    /// Whether the engine holds the track under the cursor.
    track_loaded: bool,
    /// Duration of the loaded track, if known.
    duration_ms: Option<u64>,
    navigation: NavigationStrategy,
    pending: Option<PendingLoad>,
    /// Messages that arrived during a load, in arrival order.
    deferred: VecDeque<ControlMessage>,
    playlist_dirty: bool,
}

impl ControllerTask {
    async fn run(
        mut self,
        control_rx: Receiver<ControlMessage>,
        notifications: Receiver<EngineNotification>,
    ) {
        let mut engine_open = true;

        loop {
            if self.pending.is_some() && self.deferred.iter().any(ControlMessage::cancels_load) {
                self.cancel_pending();
                continue;
            }

            if self.pending.is_none()
                && let Some(message) = self.deferred.pop_front()
            {
                self.handle(message);
                self.sync_snapshot();
                continue;
            }

            let wake = select! {
                result = poll_pending(&mut self.pending) => Wake::LoadSettled(result),
                message = control_rx.recv() => match message {
                    Ok(message) => Wake::Message(message),
                    Err(_) => Wake::Shutdown,
                },
                notification = notifications.recv(), if engine_open => match notification {
                    Ok(notification) => Wake::Message(ControlMessage::Engine(notification)),
                    Err(_) => Wake::EngineClosed,
                },
            };

            match wake {
                Wake::LoadSettled(result) => {
                    if let Some(load) = self.pending.take() {
                        self.drain_stale(&notifications);
                        self.finish_load(load, result);
                    }
                }
                Wake::Message(message) if self.pending.is_some() => self.hold(message),
                Wake::Message(message) => self.handle(message),
                Wake::EngineClosed => {
                    warn!("Engine notification stream closed");
                    engine_open = false;
                }
                Wake::Shutdown => break,
            }

            self.sync_snapshot();
        }

        if let Err(e) = self.engine.stop() {
            warn!("Failed to stop engine on shutdown: {e}");
        }
        debug!("Playback controller task exiting");
    }

    /// Queues a message that arrived during a load.
    fn hold(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::Engine(
                notification @ (EngineNotification::PositionTick(_) | EngineNotification::EndOfTrack),
            ) => {
                debug!("Discarding {notification:?} for the track being replaced");
            }
            message => self.deferred.push_back(message),
        }
    }

    /// Sorts out notifications the engine queued before the load returned.
    ///
    /// They describe the replaced track, so ticks and end-of-track are
    /// dropped; errors are held like any other message.
    fn drain_stale(&mut self, notifications: &Receiver<EngineNotification>) {
        while let Ok(notification) = notifications.try_recv() {
            self.hold(ControlMessage::Engine(notification));
        }
    }

    fn handle(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::Command { command, reply } => {
                let name = command.name();
                debug!("Applying {name}");
                match self.apply(command) {
                    Ok(Flow::Done) => self.respond(reply, Ok(())),
                    Ok(Flow::Loading) => {
                        if let Some(load) = self.pending.as_mut() {
                            load.reply = reply;
                        }
                    }
                    Err(e) => {
                        debug!("Rejected {name}: {e}");
                        self.respond(reply, Err(e));
                    }
                }
            }
            ControlMessage::Engine(notification) => self.on_engine(notification),
        }
    }

    fn apply(&mut self, command: Command) -> Result<Flow, PlaybackError> {
        match command {
            Command::Load {
                playlist,
                start_index,
            } => {
                if start_index >= playlist.len() {
                    return Err(PlaybackError::InvalidIndex {
                        index: start_index,
                        len: playlist.len(),
                    });
                }
                let path = playlist[start_index].path.clone();
                self.start_load(
                    path,
                    LoadTarget::Replace {
                        playlist,
                        index: start_index,
                    },
                );
                Ok(Flow::Loading)
            }
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::TogglePause => match self.state {
                PlaybackState::Playing { .. } => self.pause(),
                PlaybackState::Paused { .. } => self.play(),
                PlaybackState::Stopped => Err(PlaybackError::InvalidTransition {
                    command: "toggle pause",
                    state: self.state.name(),
                }),
            },
            Command::Stop => {
                self.halt();
                Ok(Flow::Done)
            }
            Command::Next => Ok(self.step(true, Origin::Step)),
            Command::Previous => Ok(self.step(false, Origin::Step)),
            Command::JumpTo(index) => {
                if index >= self.playlist.len() {
                    return Err(PlaybackError::InvalidIndex {
                        index,
                        len: self.playlist.len(),
                    });
                }
                self.start_navigation(index, None, Intent::Play, Origin::Explicit);
                Ok(Flow::Loading)
            }
            Command::Seek(position) => self.seek(position),
            Command::SetVolume(level) => self.set_volume(level),
            Command::SetMode(mode) => {
                self.set_mode(mode);
                Ok(Flow::Done)
            }
            Command::AddTracks(tracks) => {
                self.add_tracks(tracks);
                Ok(Flow::Done)
            }
            Command::RemoveTrack(index) => self.remove_track(index),
            Command::ClearPlaylist => {
                self.halt();
                self.playlist.clear();
                self.cursor = None;
                self.unload();
                self.navigation.reset();
                self.mark_playlist_changed();
                Ok(Flow::Done)
            }
        }
    }

    fn play(&mut self) -> Result<Flow, PlaybackError> {
        let index = match self.state {
            PlaybackState::Playing { .. } => {
                return Err(PlaybackError::InvalidTransition {
                    command: "play",
                    state: self.state.name(),
                });
            }
            PlaybackState::Paused { track, .. } => track,
            PlaybackState::Stopped => self.cursor.ok_or(PlaybackError::NoTrackLoaded)?,
        };

        if !self.track_loaded {
            self.start_navigation(index, None, Intent::Play, Origin::Explicit);
            return Ok(Flow::Loading);
        }

        self.engine.play().map_err(PlaybackError::Engine)?;
        let position = self.state.position();
        self.transition(PlaybackState::Playing {
            track: index,
            position,
        });
        Ok(Flow::Done)
    }

    fn pause(&mut self) -> Result<Flow, PlaybackError> {
        let PlaybackState::Playing { track, position } = self.state else {
            return Err(PlaybackError::InvalidTransition {
                command: "pause",
                state: self.state.name(),
            });
        };

        self.engine.pause().map_err(PlaybackError::Engine)?;
        self.transition(PlaybackState::Paused { track, position });
        Ok(Flow::Done)
    }

    fn seek(&mut self, position: u64) -> Result<Flow, PlaybackError> {
        if self.state == PlaybackState::Stopped {
            return Err(PlaybackError::InvalidTransition {
                command: "seek",
                state: self.state.name(),
            });
        }
        if let Some(max) = self.duration_ms
            && position > max
        {
            return Err(PlaybackError::OutOfRange {
                value: position,
                max,
            });
        }

        self.engine.seek(position).map_err(PlaybackError::Engine)?;
        self.transition(self.state.with_position(position));
        Ok(Flow::Done)
    }

    fn set_volume(&mut self, level: u8) -> Result<Flow, PlaybackError> {
        if level > 100 {
            return Err(PlaybackError::OutOfRange {
                value: u64::from(level),
                max: 100,
            });
        }

        self.engine.set_volume(level).map_err(PlaybackError::Engine)?;
        if self.volume != level {
            self.volume = level;
            self.hub.publish(PlaybackEvent::VolumeChanged(level));
        }
        Ok(Flow::Done)
    }

    fn set_mode(&mut self, mode: PlayMode) {
        if (mode == PlayMode::Shuffle) != (self.mode == PlayMode::Shuffle) {
            self.navigation.reset();
        }
        if self.mode != mode {
            self.mode = mode;
            debug!("Play mode set to {mode}");
            self.hub.publish(PlaybackEvent::ModeChanged(mode));
        }
    }

    fn add_tracks(&mut self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }
        self.playlist.extend(tracks);
        if self.cursor.is_none() {
            self.cursor = Some(0);
            self.unload();
        }
        self.navigation.reset();
        self.mark_playlist_changed();
    }

    fn remove_track(&mut self, index: usize) -> Result<Flow, PlaybackError> {
        if index >= self.playlist.len() {
            return Err(PlaybackError::InvalidIndex {
                index,
                len: self.playlist.len(),
            });
        }

        self.playlist.remove(index);
        self.navigation.reset();

        match self.cursor {
            Some(current) if current == index => {
                self.halt();
                self.unload();
                self.cursor = (!self.playlist.is_empty()).then(|| index % self.playlist.len());
            }
            Some(current) if current > index => {
                self.cursor = Some(current - 1);
                let shifted = match self.state {
                    PlaybackState::Playing { track, position } => PlaybackState::Playing {
                        track: track - 1,
                        position,
                    },
                    PlaybackState::Paused { track, position } => PlaybackState::Paused {
                        track: track - 1,
                        position,
                    },
                    PlaybackState::Stopped => PlaybackState::Stopped,
                };
                self.transition(shifted);
            }
            _ => {}
        }

        self.mark_playlist_changed();
        Ok(Flow::Done)
    }

    /// Moves to the next (`forward`) or previous track, keeping the current
    /// play/pause/stop intent.
    fn step(&mut self, forward: bool, origin: Origin) -> Flow {
        let Some(current) = self.cursor else {
            self.halt();
            return Flow::Done;
        };

        let len = self.playlist.len();
        let selection = if forward {
            self.navigation.plan_next(len, self.mode, current)
        } else {
            self.navigation.plan_previous(len, self.mode, current)
        };

        match selection {
            Some(Selection { index, history }) => {
                let intent = Intent::from(self.state);
                self.start_navigation(index, Some(history), intent, origin);
                Flow::Loading
            }
            None => {
                debug!(mode = %self.mode, current, "No track to move to, stopping");
                self.halt();
                Flow::Done
            }
        }
    }

    fn start_navigation(
        &mut self,
        index: usize,
        history: Option<ShuffleHistory>,
        intent: Intent,
        origin: Origin,
    ) {
        let path = self.playlist[index].path.clone();
        self.start_load(
            path,
            LoadTarget::Navigate {
                index,
                history,
                intent,
                origin,
            },
        );
    }

    fn start_load(&mut self, path: String, target: LoadTarget) {
        if self.pending.is_some() {
            self.cancel_pending();
        }

        debug!("Loading {path}");
        let engine = Arc::clone(&self.engine);
        self.pending = Some(PendingLoad {
            future: Box::pin(async move { engine.load(Path::new(&path)).await }),
            target,
            reply: None,
        });
    }

    fn cancel_pending(&mut self) {
        let Some(load) = self.pending.take() else {
            return;
        };

        debug!("Cancelling in-flight load");
        let result = match load.target {
            LoadTarget::Replace { .. } => Err(PlaybackError::Cancelled),
            LoadTarget::Navigate { .. } => Ok(()),
        };
        if let Some(reply) = load.reply {
            let _ = reply.send(result);
        }
    }

    fn finish_load(&mut self, load: PendingLoad, result: Result<Option<u64>, EngineError>) {
        let PendingLoad { target, reply, .. } = load;

        match (target, result) {
            (LoadTarget::Replace { playlist, index }, Ok(duration)) => {
                self.playlist = playlist;
                self.cursor = Some(index);
                self.loaded(duration);
                self.navigation.reset();
                self.halt();
                self.mark_playlist_changed();
                info!("Loaded playlist of {} tracks", self.playlist.len());
                self.respond(reply, Ok(()));
            }
            (LoadTarget::Replace { .. }, Err(e)) => {
                warn!("{e}");
                self.respond(reply, Err(PlaybackError::Load(e)));
            }
            (
                LoadTarget::Navigate {
                    index,
                    history,
                    intent,
                    ..
                },
                Ok(duration),
            ) => {
                self.cursor = Some(index);
                if let Some(history) = history {
                    self.navigation.commit(history);
                }
                self.loaded(duration);

                let next = match intent {
                    Intent::Play => match self.engine.play() {
                        Ok(()) => PlaybackState::Playing {
                            track: index,
                            position: 0,
                        },
                        Err(e) => {
                            self.report(ErrorKind::Engine, &e.to_string());
                            PlaybackState::Stopped
                        }
                    },
                    Intent::Pause => PlaybackState::Paused {
                        track: index,
                        position: 0,
                    },
                    Intent::Stop => PlaybackState::Stopped,
                };
                self.transition(next);
                self.mark_playlist_changed();
                self.respond(reply, Ok(()));
            }
            (LoadTarget::Navigate { origin, .. }, Err(e)) => match origin {
                Origin::Step | Origin::AutoAdvance => {
                    if origin == Origin::AutoAdvance {
                        warn!("Auto-advance failed: {e}");
                    } else {
                        warn!("{e}");
                    }
                    self.report(ErrorKind::Load, &e.to_string());
                    self.halt();
                    self.respond(reply, Ok(()));
                }
                Origin::Explicit => {
                    warn!("{e}");
                    self.respond(reply, Err(PlaybackError::Load(e)));
                }
            },
        }
    }

    fn on_engine(&mut self, notification: EngineNotification) {
        match notification {
            EngineNotification::PositionTick(position) => {
                if self.state == PlaybackState::Stopped {
                    return;
                }
                self.state = self.state.with_position(position);
                self.hub.publish(PlaybackEvent::PositionTick(position));
            }
            EngineNotification::EndOfTrack => {
                if self.state == PlaybackState::Stopped {
                    debug!("Ignoring end of track while stopped");
                    return;
                }
                debug!("End of track, advancing");
                self.step(true, Origin::AutoAdvance);
            }
            EngineNotification::Error(detail) => {
                error!("Engine failure: {detail}");
                self.report(ErrorKind::Engine, &detail);
                self.halt();
            }
        }
    }

    /// Stops the engine (best effort) and enters Stopped.
    fn halt(&mut self) {
        if self.state != PlaybackState::Stopped
            && let Err(e) = self.engine.stop()
        {
            warn!("Engine failed to stop: {e}");
        }
        self.transition(PlaybackState::Stopped);
    }

    fn loaded(&mut self, duration: Option<u64>) {
        self.track_loaded = true;
        self.duration_ms = duration.or_else(|| {
            self.cursor
                .and_then(|index| self.playlist.get(index))
                .and_then(|track| track.duration_ms)
        });
    }

    fn unload(&mut self) {
        self.track_loaded = false;
        self.duration_ms = None;
    }

    fn transition(&mut self, new: PlaybackState) {
        if new == self.state {
            return;
        }
        let old = self.state;
        self.state = new;
        debug!("State {} -> {}", old.name(), new.name());
        self.hub.publish(PlaybackEvent::StateChanged { old, new });
    }

    fn mark_playlist_changed(&mut self) {
        self.playlist_dirty = true;
        self.hub.publish(PlaybackEvent::PlaylistChanged {
            playlist: self.playlist.clone(),
            cursor: self.cursor,
        });
    }

    fn report(&self, kind: ErrorKind, detail: &str) {
        self.hub.publish(PlaybackEvent::Error {
            kind,
            detail: detail.to_string(),
        });
    }

    /// Refreshes the snapshot, then answers the issuer. Errors nobody waits
    /// for are published instead.
    fn respond(&mut self, reply: Option<ReplyTx>, result: CommandResult) {
        self.sync_snapshot();
        match reply {
            Some(reply) => {
                let _ = reply.send(result);
            }
            None => {
                if let Err(e) = result {
                    warn!("{e}");
                    self.report(e.kind(), &e.to_string());
                }
            }
        }
    }

    fn sync_snapshot(&mut self) {
        let mut snapshot = self.snapshot.write();
        snapshot.state = self.state;
        snapshot.cursor = self.cursor;
        snapshot.mode = self.mode;
        snapshot.volume = self.volume;
        snapshot.loading = self.pending.is_some();
        if self.playlist_dirty {
            snapshot.playlist = self.playlist.clone();
            self.playlist_dirty = false;
        }
    }
}

async fn poll_pending(load: &mut Option<PendingLoad>) -> Result<Option<u64>, EngineError> {
    match load {
        Some(load) => load.future.as_mut().await,
        None => pending().await,
    }
}
