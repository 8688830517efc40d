//! Integration tests for the playback controller.
//!
//! These drive a `PlaybackController` against a recording engine whose loads
//! can be slowed down or made to fail, and whose notifications are injected
//! by the test.

#[cfg(test)]
mod tests {
    use std::{
        collections::{HashMap, HashSet},
        path::Path,
        sync::Arc,
    };

    use {
        async_channel::{Receiver, Sender, unbounded},
        async_trait::async_trait,
        parking_lot::Mutex,
        tokio::{
            spawn,
            time::{Duration, sleep, timeout},
        },
    };

    use crate::{
        audio::{
            commands::Command,
            controller::{ControllerConfig, ControllerSnapshot, PlaybackController},
            engine::{EngineNotification, PlaybackEngine},
        },
        error::{EngineError, ErrorKind, PlaybackError},
        library::{Playlist, Track},
        state::{ObserverHub, PlayMode, PlaybackEvent, PlaybackState},
    };

    // Default timeout in milliseconds for test async operations
    const TEST_TIMEOUT_MS: u64 = 1000;

    const TRACK_DURATION_MS: u64 = 180_000;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Load(String),
        Play,
        Pause,
        Stop,
        Seek(u64),
        SetVolume(u8),
    }

    struct RecordingEngine {
        calls: Mutex<Vec<Call>>,
        slow: Mutex<HashMap<String, Duration>>,
        failing: Mutex<HashSet<String>>,
        /// Paths whose load reports the previous track finishing first.
        trailing_end: Mutex<HashSet<String>>,
        notify_tx: Sender<EngineNotification>,
        notify_rx: Receiver<EngineNotification>,
    }

    impl RecordingEngine {
        fn new() -> Arc<Self> {
            let (notify_tx, notify_rx) = unbounded();
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                slow: Mutex::new(HashMap::new()),
                failing: Mutex::new(HashSet::new()),
                trailing_end: Mutex::new(HashSet::new()),
                notify_tx,
                notify_rx,
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        fn loads(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::Load(path) => Some(path),
                    _ => None,
                })
                .collect()
        }

        fn slow_load(&self, path: &str, delay: Duration) {
            self.slow.lock().insert(path.to_string(), delay);
        }

        fn fail_load(&self, path: &str) {
            self.failing.lock().insert(path.to_string());
        }

        fn end_previous_during_load(&self, path: &str) {
            self.trailing_end.lock().insert(path.to_string());
        }

        fn emit(&self, notification: EngineNotification) {
            self.notify_tx.try_send(notification).unwrap();
        }

        fn record(&self, call: Call) {
            self.calls.lock().push(call);
        }
    }

    #[async_trait]
    impl PlaybackEngine for RecordingEngine {
        async fn load(&self, path: &Path) -> Result<Option<u64>, EngineError> {
            let path = path.to_string_lossy().to_string();
            self.record(Call::Load(path.clone()));

            let delay = self.slow.lock().get(&path).copied();
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            if self.failing.lock().contains(&path) {
                return Err(EngineError::load(path, "unsupported format"));
            }
            if self.trailing_end.lock().contains(&path) {
                self.emit(EngineNotification::PositionTick(TRACK_DURATION_MS - 10));
                self.emit(EngineNotification::EndOfTrack);
            }
            Ok(Some(TRACK_DURATION_MS))
        }

        fn play(&self) -> Result<(), EngineError> {
            self.record(Call::Play);
            Ok(())
        }

        fn pause(&self) -> Result<(), EngineError> {
            self.record(Call::Pause);
            Ok(())
        }

        fn stop(&self) -> Result<(), EngineError> {
            self.record(Call::Stop);
            Ok(())
        }

        fn seek(&self, position_ms: u64) -> Result<(), EngineError> {
            self.record(Call::Seek(position_ms));
            Ok(())
        }

        fn set_volume(&self, level: u8) -> Result<(), EngineError> {
            self.record(Call::SetVolume(level));
            Ok(())
        }

        fn notifications(&self) -> Receiver<EngineNotification> {
            self.notify_rx.clone()
        }
    }

    fn create_test_playlist(prefix: &str, count: usize) -> Playlist {
        (0..count)
            .map(|i| {
                Track::new(
                    format!("/{prefix}/{i}.flac"),
                    format!("Track {i}"),
                    Some(TRACK_DURATION_MS),
                )
            })
            .collect()
    }

    fn start(mode: PlayMode) -> (Arc<RecordingEngine>, PlaybackController, Receiver<PlaybackEvent>) {
        let engine = RecordingEngine::new();
        let hub = ObserverHub::new();
        let (tx, rx) = unbounded();
        let _subscription = hub.subscribe(move |event| {
            let _ = tx.try_send(event.clone());
        });

        let controller = PlaybackController::new(
            engine.clone(),
            hub,
            ControllerConfig {
                mode,
                ..ControllerConfig::default()
            },
        );
        (engine, controller, rx)
    }

    async fn load(controller: &PlaybackController, count: usize, start_index: usize) {
        controller
            .execute(Command::Load {
                playlist: create_test_playlist("music", count),
                start_index,
            })
            .await
            .unwrap();
    }

    async fn wait_until<F>(controller: &PlaybackController, predicate: F) -> ControllerSnapshot
    where
        F: Fn(&ControllerSnapshot) -> bool,
    {
        timeout(Duration::from_millis(TEST_TIMEOUT_MS), async {
            loop {
                let snapshot = controller.snapshot();
                if predicate(&snapshot) {
                    return snapshot;
                }
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("controller never reached the expected state")
    }

    /// Collects events until none arrives for `quiet`.
    async fn collect_events(rx: &Receiver<PlaybackEvent>, quiet: Duration) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Ok(Ok(event)) = timeout(quiet, rx.recv()).await {
            events.push(event);
        }
        events
    }

    fn state_changes(events: &[PlaybackEvent]) -> Vec<(PlaybackState, PlaybackState)> {
        events
            .iter()
            .filter_map(|event| match event {
                PlaybackEvent::StateChanged { old, new } => Some((*old, *new)),
                _ => None,
            })
            .collect()
    }

    fn playing(track: usize, position: u64) -> PlaybackState {
        PlaybackState::Playing { track, position }
    }

    fn paused(track: usize, position: u64) -> PlaybackState {
        PlaybackState::Paused { track, position }
    }

    #[tokio::test]
    async fn test_sequential_playthrough_stops_at_end() {
        let (engine, controller, _events) = start(PlayMode::Sequential);
        load(&controller, 3, 0).await;
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(controller.cursor(), Some(0));

        controller.execute(Command::Play).await.unwrap();
        assert_eq!(controller.state(), playing(0, 0));

        controller.execute(Command::Next).await.unwrap();
        assert_eq!(controller.state(), playing(1, 0));
        controller.execute(Command::Next).await.unwrap();
        assert_eq!(controller.state(), playing(2, 0));

        controller.execute(Command::Next).await.unwrap();
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(controller.cursor(), Some(2));

        assert_eq!(
            engine.loads(),
            vec!["/music/0.flac", "/music/1.flac", "/music/2.flac"]
        );
    }

    #[tokio::test]
    async fn test_loop_single_never_stops() {
        let (engine, controller, _events) = start(PlayMode::LoopSingle);
        load(&controller, 1, 0).await;
        controller.execute(Command::Play).await.unwrap();

        for _ in 0..3 {
            controller.execute(Command::Next).await.unwrap();
            assert_eq!(controller.state(), playing(0, 0));
        }
        assert_eq!(engine.loads().len(), 4);
    }

    #[tokio::test]
    async fn test_loop_all_round_trip_restores_cursor() {
        let (_engine, controller, _events) = start(PlayMode::LoopAll);
        load(&controller, 4, 1).await;

        for _ in 0..3 {
            controller.execute(Command::Next).await.unwrap();
        }
        assert_eq!(controller.cursor(), Some(0));

        for _ in 0..3 {
            controller.execute(Command::Previous).await.unwrap();
        }
        assert_eq!(controller.cursor(), Some(1));
        assert_eq!(controller.state(), PlaybackState::Stopped);
    }

    #[tokio::test]
    async fn test_shuffle_visits_every_track_once_per_cycle() {
        let (_engine, controller, _events) = start(PlayMode::Shuffle);
        load(&controller, 5, 0).await;
        controller.execute(Command::Play).await.unwrap();

        let mut visited = HashSet::from([0]);
        for _ in 0..4 {
            controller.execute(Command::Next).await.unwrap();
            let track = controller.state().track().unwrap();
            assert!(visited.insert(track), "track {track} repeated within a cycle");
        }
        assert_eq!(visited.len(), 5);
    }

    #[tokio::test]
    async fn test_next_keeps_pause_intent() {
        let (engine, controller, _events) = start(PlayMode::Sequential);
        load(&controller, 3, 0).await;
        controller.execute(Command::Play).await.unwrap();
        controller.execute(Command::Pause).await.unwrap();

        controller.execute(Command::Next).await.unwrap();
        assert_eq!(controller.state(), paused(1, 0));
        assert_eq!(engine.calls().last(), Some(&Call::Load("/music/1.flac".into())));
    }

    #[tokio::test]
    async fn test_stop_when_stopped_emits_nothing() {
        let (_engine, controller, events) = start(PlayMode::Sequential);

        controller.execute(Command::Stop).await.unwrap();
        controller.execute(Command::Stop).await.unwrap();

        let received = collect_events(&events, Duration::from_millis(100)).await;
        assert!(received.is_empty(), "unexpected events: {received:?}");
    }

    #[tokio::test]
    async fn test_seek_then_stop_ends_stopped() {
        let (engine, controller, events) = start(PlayMode::Sequential);
        load(&controller, 2, 0).await;
        controller.execute(Command::Play).await.unwrap();

        controller.submit(Command::Seek(5000)).unwrap();
        controller.execute(Command::Stop).await.unwrap();

        assert_eq!(controller.state(), PlaybackState::Stopped);
        let received = collect_events(&events, Duration::from_millis(100)).await;
        assert_eq!(
            state_changes(&received),
            vec![
                (PlaybackState::Stopped, playing(0, 0)),
                (playing(0, 0), playing(0, 5000)),
                (playing(0, 5000), PlaybackState::Stopped),
            ]
        );
        assert!(engine.calls().contains(&Call::Seek(5000)));
    }

    #[tokio::test]
    async fn test_rejected_commands_leave_state_untouched() {
        let (_engine, controller, _events) = start(PlayMode::Sequential);

        let result = controller
            .execute(Command::Load {
                playlist: create_test_playlist("music", 1),
                start_index: 3,
            })
            .await;
        assert_eq!(result, Err(PlaybackError::InvalidIndex { index: 3, len: 1 }));
        assert!(controller.snapshot().playlist.is_empty());

        assert_eq!(
            controller.execute(Command::Play).await,
            Err(PlaybackError::NoTrackLoaded)
        );
        assert_eq!(
            controller.execute(Command::Pause).await,
            Err(PlaybackError::InvalidTransition {
                command: "pause",
                state: "stopped",
            })
        );
        assert_eq!(
            controller.execute(Command::Seek(10)).await,
            Err(PlaybackError::InvalidTransition {
                command: "seek",
                state: "stopped",
            })
        );
        assert_eq!(
            controller.execute(Command::SetVolume(101)).await,
            Err(PlaybackError::OutOfRange {
                value: 101,
                max: 100,
            })
        );
        assert_eq!(controller.snapshot(), ControllerSnapshot {
            volume: 50,
            ..ControllerSnapshot::default()
        });
    }

    #[tokio::test]
    async fn test_play_while_playing_and_seek_past_end() {
        let (_engine, controller, _events) = start(PlayMode::Sequential);
        load(&controller, 2, 0).await;
        controller.execute(Command::Play).await.unwrap();

        assert_eq!(
            controller.execute(Command::Play).await,
            Err(PlaybackError::InvalidTransition {
                command: "play",
                state: "playing",
            })
        );
        assert_eq!(
            controller.execute(Command::Seek(TRACK_DURATION_MS + 1)).await,
            Err(PlaybackError::OutOfRange {
                value: TRACK_DURATION_MS + 1,
                max: TRACK_DURATION_MS,
            })
        );
        assert_eq!(
            controller.execute(Command::JumpTo(9)).await,
            Err(PlaybackError::InvalidIndex { index: 9, len: 2 })
        );
        assert_eq!(controller.state(), playing(0, 0));
    }

    #[tokio::test]
    async fn test_stop_cancels_in_flight_load() {
        let (engine, controller, _events) = start(PlayMode::Sequential);
        engine.slow_load("/music/0.flac", Duration::from_millis(300));

        let loader = {
            let controller = controller.clone();
            spawn(async move {
                controller
                    .execute(Command::Load {
                        playlist: create_test_playlist("music", 3),
                        start_index: 0,
                    })
                    .await
            })
        };
        wait_until(&controller, |snapshot| snapshot.loading).await;

        controller.execute(Command::Stop).await.unwrap();

        assert_eq!(loader.await.unwrap(), Err(PlaybackError::Cancelled));
        let snapshot = controller.snapshot();
        assert!(snapshot.playlist.is_empty());
        assert_eq!(snapshot.cursor, None);
        assert_eq!(snapshot.state, PlaybackState::Stopped);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_second_load_supersedes_first() {
        let (engine, controller, _events) = start(PlayMode::Sequential);
        engine.slow_load("/first/0.flac", Duration::from_millis(300));

        let first = {
            let controller = controller.clone();
            spawn(async move {
                controller
                    .execute(Command::Load {
                        playlist: create_test_playlist("first", 2),
                        start_index: 0,
                    })
                    .await
            })
        };
        wait_until(&controller, |snapshot| snapshot.loading).await;

        let second = create_test_playlist("second", 3);
        controller
            .execute(Command::Load {
                playlist: second.clone(),
                start_index: 2,
            })
            .await
            .unwrap();

        assert_eq!(first.await.unwrap(), Err(PlaybackError::Cancelled));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.playlist, second);
        assert_eq!(snapshot.cursor, Some(2));
    }

    #[tokio::test]
    async fn test_commands_wait_for_in_flight_load() {
        let (engine, controller, _events) = start(PlayMode::Sequential);
        engine.slow_load("/music/0.flac", Duration::from_millis(100));

        let loader = {
            let controller = controller.clone();
            spawn(async move {
                controller
                    .execute(Command::Load {
                        playlist: create_test_playlist("music", 2),
                        start_index: 0,
                    })
                    .await
            })
        };
        wait_until(&controller, |snapshot| snapshot.loading).await;

        controller.execute(Command::Play).await.unwrap();
        assert_eq!(loader.await.unwrap(), Ok(()));
        assert_eq!(controller.state(), playing(0, 0));
    }

    #[tokio::test]
    async fn test_end_of_track_advances_and_ticks_update_position() {
        let (engine, controller, events) = start(PlayMode::Sequential);
        load(&controller, 3, 0).await;
        controller.execute(Command::Play).await.unwrap();

        engine.emit(EngineNotification::PositionTick(1200));
        wait_until(&controller, |snapshot| snapshot.state == playing(0, 1200)).await;

        engine.emit(EngineNotification::EndOfTrack);
        wait_until(&controller, |snapshot| snapshot.state == playing(1, 0)).await;

        controller.execute(Command::JumpTo(2)).await.unwrap();
        engine.emit(EngineNotification::EndOfTrack);
        wait_until(&controller, |snapshot| snapshot.state == PlaybackState::Stopped).await;

        let received = collect_events(&events, Duration::from_millis(100)).await;
        assert!(received.contains(&PlaybackEvent::PositionTick(1200)));
    }

    #[tokio::test]
    async fn test_notifications_for_replaced_track_are_dropped() {
        let (engine, controller, events) = start(PlayMode::Sequential);
        engine.end_previous_during_load("/music/1.flac");
        load(&controller, 4, 0).await;
        controller.execute(Command::Play).await.unwrap();

        controller.execute(Command::Next).await.unwrap();
        assert_eq!(controller.state(), playing(1, 0));

        sleep(Duration::from_millis(50)).await;
        assert_eq!(controller.state(), playing(1, 0));
        assert_eq!(engine.loads(), vec!["/music/0.flac", "/music/1.flac"]);

        let received = collect_events(&events, Duration::from_millis(100)).await;
        assert!(!received.contains(&PlaybackEvent::PositionTick(TRACK_DURATION_MS - 10)));
    }

    #[tokio::test]
    async fn test_engine_error_queued_during_load_still_stops() {
        let (engine, controller, _events) = start(PlayMode::Sequential);
        engine.slow_load("/music/1.flac", Duration::from_millis(50));
        load(&controller, 3, 0).await;
        controller.execute(Command::Play).await.unwrap();

        let next = {
            let controller = controller.clone();
            spawn(async move { controller.execute(Command::Next).await })
        };
        wait_until(&controller, |snapshot| snapshot.loading).await;
        engine.emit(EngineNotification::Error("device lost".to_string()));

        next.await.unwrap().unwrap();
        wait_until(&controller, |snapshot| snapshot.state == PlaybackState::Stopped).await;
        assert_eq!(controller.cursor(), Some(1));
    }

    #[tokio::test]
    async fn test_engine_error_forces_stop() {
        let (engine, controller, events) = start(PlayMode::Sequential);
        load(&controller, 2, 0).await;
        controller.execute(Command::Play).await.unwrap();

        engine.emit(EngineNotification::Error("device lost".to_string()));
        wait_until(&controller, |snapshot| snapshot.state == PlaybackState::Stopped).await;

        let received = collect_events(&events, Duration::from_millis(100)).await;
        assert!(received.contains(&PlaybackEvent::Error {
            kind: ErrorKind::Engine,
            detail: "device lost".to_string(),
        }));
        assert_eq!(engine.calls().last(), Some(&Call::Stop));
    }

    #[tokio::test]
    async fn test_failed_next_degrades_to_stop() {
        let (engine, controller, events) = start(PlayMode::Sequential);
        engine.fail_load("/music/1.flac");
        load(&controller, 3, 0).await;
        controller.execute(Command::Play).await.unwrap();

        controller.execute(Command::Next).await.unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.state, PlaybackState::Stopped);
        assert_eq!(snapshot.cursor, Some(0));

        let received = collect_events(&events, Duration::from_millis(100)).await;
        assert!(received.iter().any(|event| matches!(
            event,
            PlaybackEvent::Error {
                kind: ErrorKind::Load,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_failed_jump_is_reported_to_caller() {
        let (engine, controller, _events) = start(PlayMode::Sequential);
        engine.fail_load("/music/2.flac");
        load(&controller, 3, 0).await;
        controller.execute(Command::Play).await.unwrap();

        let result = controller.execute(Command::JumpTo(2)).await;
        assert!(matches!(result, Err(PlaybackError::Load(_))));
        assert_eq!(controller.state(), playing(0, 0));
        assert_eq!(controller.cursor(), Some(0));
    }

    #[tokio::test]
    async fn test_pause_keeps_position_and_toggle_resumes() {
        let (engine, controller, _events) = start(PlayMode::Sequential);
        load(&controller, 1, 0).await;
        controller.execute(Command::Play).await.unwrap();

        engine.emit(EngineNotification::PositionTick(900));
        wait_until(&controller, |snapshot| snapshot.state == playing(0, 900)).await;

        controller.execute(Command::TogglePause).await.unwrap();
        assert_eq!(controller.state(), paused(0, 900));
        controller.execute(Command::TogglePause).await.unwrap();
        assert_eq!(controller.state(), playing(0, 900));

        let calls = engine.calls();
        assert_eq!(&calls[calls.len() - 2..], &[Call::Pause, Call::Play]);
    }

    #[tokio::test]
    async fn test_volume_and_mode_changes_are_published() {
        let (engine, controller, events) = start(PlayMode::Sequential);

        controller.execute(Command::SetVolume(40)).await.unwrap();
        controller.execute(Command::SetMode(PlayMode::Shuffle)).await.unwrap();
        controller.execute(Command::SetMode(PlayMode::Shuffle)).await.unwrap();

        let received = collect_events(&events, Duration::from_millis(100)).await;
        assert_eq!(
            received,
            vec![
                PlaybackEvent::VolumeChanged(40),
                PlaybackEvent::ModeChanged(PlayMode::Shuffle),
            ]
        );
        assert_eq!(engine.calls(), vec![Call::SetVolume(50), Call::SetVolume(40)]);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.volume, 40);
        assert_eq!(snapshot.mode, PlayMode::Shuffle);
    }

    #[tokio::test]
    async fn test_removing_current_track_stops() {
        let (_engine, controller, _events) = start(PlayMode::Sequential);
        load(&controller, 3, 0).await;
        controller.execute(Command::JumpTo(1)).await.unwrap();
        assert_eq!(controller.state(), playing(1, 0));

        controller.execute(Command::RemoveTrack(1)).await.unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.state, PlaybackState::Stopped);
        assert_eq!(snapshot.cursor, Some(1));
        assert_eq!(snapshot.playlist.len(), 2);
        assert_eq!(snapshot.playlist[1].title, "Track 2");
    }

    #[tokio::test]
    async fn test_removing_earlier_track_shifts_cursor() {
        let (_engine, controller, _events) = start(PlayMode::Sequential);
        load(&controller, 3, 0).await;
        controller.execute(Command::JumpTo(2)).await.unwrap();

        controller.execute(Command::RemoveTrack(0)).await.unwrap();

        assert_eq!(controller.state(), playing(1, 0));
        assert_eq!(controller.cursor(), Some(1));
    }

    #[tokio::test]
    async fn test_add_tracks_then_play_loads_first_track() {
        let (engine, controller, _events) = start(PlayMode::Sequential);

        controller
            .execute(Command::AddTracks(create_test_playlist("music", 2).into_tracks()))
            .await
            .unwrap();
        assert_eq!(controller.cursor(), Some(0));
        assert_eq!(controller.state(), PlaybackState::Stopped);

        controller.execute(Command::Play).await.unwrap();
        assert_eq!(controller.state(), playing(0, 0));
        assert_eq!(engine.loads(), vec!["/music/0.flac"]);
    }

    #[tokio::test]
    async fn test_clear_playlist() {
        let (_engine, controller, _events) = start(PlayMode::Sequential);
        load(&controller, 3, 0).await;
        controller.execute(Command::Play).await.unwrap();

        controller.execute(Command::ClearPlaylist).await.unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.state, PlaybackState::Stopped);
        assert_eq!(snapshot.cursor, None);
        assert!(snapshot.playlist.is_empty());
        assert_eq!(
            controller.execute(Command::Play).await,
            Err(PlaybackError::NoTrackLoaded)
        );
    }

    #[tokio::test]
    async fn test_next_on_empty_playlist_is_a_no_op() {
        let (engine, controller, events) = start(PlayMode::LoopAll);

        controller.execute(Command::Next).await.unwrap();
        controller.execute(Command::Previous).await.unwrap();

        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert!(engine.loads().is_empty());
        assert!(collect_events(&events, Duration::from_millis(100)).await.is_empty());
    }

    #[tokio::test]
    async fn test_submitted_failures_are_published() {
        let (_engine, controller, events) = start(PlayMode::Sequential);

        controller.submit(Command::Pause).unwrap();

        let event = timeout(Duration::from_millis(TEST_TIMEOUT_MS), events.recv())
            .await
            .expect("error event not published")
            .unwrap();
        assert_eq!(
            event,
            PlaybackEvent::Error {
                kind: ErrorKind::InvalidTransition,
                detail: "Cannot pause while stopped".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_observer_can_issue_commands() {
        let (_engine, controller, _events) = start(PlayMode::Sequential);
        load(&controller, 2, 0).await;

        let issuer = controller.clone();
        let _subscription = controller.hub().subscribe(move |event| {
            if let PlaybackEvent::StateChanged {
                new: PlaybackState::Playing { .. },
                ..
            } = event
            {
                issuer.submit(Command::Pause).unwrap();
            }
        });

        controller.execute(Command::Play).await.unwrap();
        wait_until(&controller, |snapshot| snapshot.state == paused(0, 0)).await;
    }
}
