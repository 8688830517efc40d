//! Cadenza - headless music player.
//!
//! Plays a playlist through the simulated engine and reads controls from
//! stdin, one command per line. Events are printed to stdout; logs go to
//! stderr.

use std::{path::PathBuf, sync::Arc, time::Duration};

use {
    anyhow::{Error, Result, bail},
    clap::{Args as ClapArgs, Parser, Subcommand},
    tokio::{
        io::{AsyncBufReadExt, BufReader, stdin},
        runtime::Handle,
        select,
        signal::ctrl_c,
        task::spawn_blocking,
        time::interval,
    },
    tracing::{debug, info},
};

use cadenza::{
    Command, ControllerConfig, LibraryError, ObserverHub, PlayMode, PlaybackController,
    PlaybackEvent, PlaybackState, Playlist, PlaylistStore, SettingsManager, SimulatedEngine,
    TagReader, Track,
    config::persist_preferences,
    console::{HELP, Input, describe_event, format_time, parse_line},
    error::{ErrorReporter, ResultExt},
    library::autosave_playlist,
    logging::init_logging,
};

/// How often to check whether playback finished once stdin is closed.
const FINISH_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "cadenza")]
#[command(about = "Headless music player with playlists and favourites")]
#[command(version)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (defaults to $XDG_CONFIG_HOME/cadenza/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Play audio files in order, or the last session's playlist if none
    /// are given
    Play {
        /// Files to play
        files: Vec<PathBuf>,

        #[command(flatten)]
        options: PlayOptions,
    },
    /// Manage saved playlists
    #[command(subcommand)]
    Playlist(PlaylistAction),
    /// Manage favourite tracks
    #[command(subcommand)]
    Favourites(FavouritesAction),
}

#[derive(Subcommand, Debug)]
enum PlaylistAction {
    /// List saved playlists
    List,
    /// Print the tracks of a playlist
    Show { name: String },
    /// Save files as a playlist, replacing any playlist of that name
    Save {
        name: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Append files to a playlist, skipping ones it already holds
    Add {
        name: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove every entry for a file from a playlist
    Remove { name: String, file: PathBuf },
    /// Delete a playlist
    Delete { name: String },
    /// Delete every playlist, including the saved session
    DeleteAll,
    /// Play a saved playlist
    Play {
        name: String,
        #[command(flatten)]
        options: PlayOptions,
    },
}

#[derive(Subcommand, Debug)]
enum FavouritesAction {
    /// List favourite tracks
    List,
    /// Add files to favourites
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove a file from favourites
    Remove { file: PathBuf },
    /// Remove all favourites
    Clear,
    /// Play all favourites
    Play {
        #[command(flatten)]
        options: PlayOptions,
    },
}

/// Overrides applied to a player session.
#[derive(ClapArgs, Debug, Clone, Copy)]
struct PlayOptions {
    /// Play mode (sequential, loop-single, loop-all, shuffle)
    #[arg(short, long)]
    mode: Option<PlayMode>,

    /// Initial volume, 0-100
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: Option<u8>,

    /// Track number to start from
    #[arg(short, long, default_value_t = 1)]
    start: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let settings = match args.config {
        Some(path) => SettingsManager::with_config_path(path),
        None => SettingsManager::new(),
    }
    .add_context("Failed to load settings")?;
    let settings = Arc::new(settings);

    let database_path = settings.get_settings().database_path();
    debug!("Opening library at {}", database_path.display());
    let store = PlaylistStore::open(&database_path)
        .await
        .add_contextf(format!("Failed to open library {}", database_path.display()))?;

    if let Err(e) = run(args.action, settings, store).await {
        ErrorReporter::error(&e, "cadenza");
        return Err(e);
    }
    Ok(())
}

async fn run(action: Action, settings: Arc<SettingsManager>, store: PlaylistStore) -> Result<()> {
    match action {
        Action::Play { files, options } => {
            let playlist = if files.is_empty() {
                restore_session(&settings, &store).await?
            } else {
                read_tracks(files).await?
            };
            run_player(settings, store, playlist, options).await
        }
        Action::Playlist(action) => run_playlist_action(action, settings, store).await,
        Action::Favourites(action) => run_favourites_action(action, settings, store).await,
    }
}

async fn run_playlist_action(
    action: PlaylistAction,
    settings: Arc<SettingsManager>,
    store: PlaylistStore,
) -> Result<()> {
    match action {
        PlaylistAction::List => {
            for name in store.list_playlists().await.add_context("Failed to list playlists")? {
                println!("{name}");
            }
        }
        PlaylistAction::Show { name } => {
            let playlist = store
                .load_playlist(&name)
                .await
                .add_contextf(format!("Failed to load playlist '{name}'"))?;
            print_tracks(&playlist);
        }
        PlaylistAction::Save { name, files } => {
            let playlist = read_tracks(files).await?;
            store
                .save_playlist(&name, &playlist)
                .await
                .add_contextf(format!("Failed to save playlist '{name}'"))?;
            println!("Saved {} tracks to '{name}'", playlist.len());
        }
        PlaylistAction::Add { name, files } => {
            for track in read_tracks(files).await?.into_tracks() {
                match store.add_to_playlist(&name, &track).await {
                    Ok(()) => println!("Added {} to '{name}'", track.title),
                    Err(LibraryError::AlreadyExists { .. }) => {
                        println!("'{name}' already holds {}", track.title);
                    }
                    Err(e) => {
                        return Err(e).add_contextf(format!("Failed to add to playlist '{name}'"));
                    }
                }
            }
        }
        PlaylistAction::Remove { name, file } => {
            let path = file.to_string_lossy();
            if store
                .remove_from_playlist(&name, &path)
                .await
                .add_contextf(format!("Failed to remove from playlist '{name}'"))?
            {
                println!("Removed {path} from '{name}'");
            } else {
                println!("'{name}' does not hold {path}");
            }
        }
        PlaylistAction::Delete { name } => {
            store
                .delete_playlist(&name)
                .await
                .add_contextf(format!("Failed to delete playlist '{name}'"))?;
            println!("Deleted '{name}'");
        }
        PlaylistAction::DeleteAll => {
            let removed = store
                .delete_all_playlists()
                .await
                .add_context("Failed to delete playlists")?;
            println!("Deleted {removed} playlists");
        }
        PlaylistAction::Play { name, options } => {
            let playlist = store
                .load_playlist(&name)
                .await
                .add_contextf(format!("Failed to load playlist '{name}'"))?;
            run_player(settings, store, playlist, options).await?;
        }
    }
    Ok(())
}

async fn run_favourites_action(
    action: FavouritesAction,
    settings: Arc<SettingsManager>,
    store: PlaylistStore,
) -> Result<()> {
    match action {
        FavouritesAction::List => {
            let favourites = store.favourites().await.add_context("Failed to read favourites")?;
            print_tracks(&favourites);
        }
        FavouritesAction::Add { files } => {
            for track in read_tracks(files).await?.into_tracks() {
                match store.add_favourite(&track).await {
                    Ok(()) => println!("Added {}", track.title),
                    Err(LibraryError::AlreadyExists { .. }) => {
                        println!("{} is already a favourite", track.title);
                    }
                    Err(e) => return Err(e).add_context("Failed to add favourite"),
                }
            }
        }
        FavouritesAction::Remove { file } => {
            let path = file.to_string_lossy();
            if store
                .remove_favourite(&path)
                .await
                .add_context("Failed to remove favourite")?
            {
                println!("Removed {path}");
            } else {
                println!("{path} is not a favourite");
            }
        }
        FavouritesAction::Clear => {
            store
                .clear_favourites()
                .await
                .add_context("Failed to clear favourites")?;
            println!("Cleared favourites");
        }
        FavouritesAction::Play { options } => {
            let favourites = store.favourites().await.add_context("Failed to read favourites")?;
            if favourites.is_empty() {
                bail!("No favourites to play");
            }
            run_player(settings, store, favourites, options).await?;
        }
    }
    Ok(())
}

/// Loads the playlist autosaved by the previous session.
async fn restore_session(settings: &SettingsManager, store: &PlaylistStore) -> Result<Playlist> {
    let (enabled, name) = {
        let current = settings.get_settings();
        (current.restore_session, current.session_playlist.clone())
    };
    if !enabled {
        bail!("No files given and session restore is disabled");
    }

    match store.load_playlist(&name).await {
        Ok(playlist) if !playlist.is_empty() => {
            info!("Restoring {} tracks from '{name}'", playlist.len());
            Ok(playlist)
        }
        Ok(_) | Err(LibraryError::NotFound { .. }) => bail!("No files given and no saved session"),
        Err(e) => Err(e).add_contextf(format!("Failed to load session playlist '{name}'")),
    }
}

/// Reads tags for each file off the async runtime.
async fn read_tracks(files: Vec<PathBuf>) -> Result<Playlist> {
    let playlist = spawn_blocking(move || {
        files
            .iter()
            .map(TagReader::read_track_or_fallback)
            .collect::<Playlist>()
    })
    .await
    .add_context("Tag reading task failed")?;
    Ok(playlist)
}

fn print_tracks(playlist: &Playlist) {
    for (number, track) in playlist.iter().enumerate() {
        let duration = track.duration_ms.map_or_else(|| "-:--".to_string(), format_time);
        println!("{:>3}. {} [{duration}] {}", number + 1, track.title, track.path);
    }
}

/// Runs an interactive session over `playlist` until quit, interrupt, or
/// the end of playback after stdin closes.
async fn run_player(
    settings: Arc<SettingsManager>,
    store: PlaylistStore,
    playlist: Playlist,
    options: PlayOptions,
) -> Result<()> {
    let (mut config, tick_interval, session) = {
        let current = settings.get_settings();
        (
            ControllerConfig::from(&*current),
            Duration::from_millis(current.position_tick_interval_ms),
            current.session_playlist.clone(),
        )
    };
    if let Some(mode) = options.mode {
        config.mode = mode;
    }
    if let Some(volume) = options.volume {
        config.volume = volume;
    }

    let hub = ObserverHub::new();
    let _printer = hub.subscribe({
        let mut titles: Vec<String> = Vec::new();
        move |event| {
            if let PlaybackEvent::PlaylistChanged { playlist, .. } = event {
                titles = playlist.iter().map(|track| track.title.clone()).collect();
            }
            if let Some(line) = describe_event(event, |index| titles.get(index).cloned()) {
                println!("{line}");
            }
        }
    });
    let _preferences = persist_preferences(&hub, Arc::clone(&settings));
    let _autosave = autosave_playlist(&hub, store.clone(), session, Handle::current());

    let engine = Arc::new(SimulatedEngine::new(tick_interval));
    let controller = PlaybackController::new(engine, hub, config);

    let start_index = options.start.saturating_sub(1);
    controller
        .execute(Command::Load {
            playlist,
            start_index,
        })
        .await
        .add_context("Failed to load playlist")?;
    controller
        .execute(Command::Play)
        .await
        .add_context("Failed to start playback")?;

    info!("Type 'help' for commands");
    let mut lines = BufReader::new(stdin()).lines();
    loop {
        select! {
            _ = ctrl_c() => {
                info!("Interrupted");
                return shutdown(&controller).await;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match parse_line(&line) {
                    Ok(Input::Quit) => return shutdown(&controller).await,
                    Ok(input) => handle_input(&controller, &store, input).await,
                    Err(message) => println!("{message}"),
                },
                Ok(None) => break,
                Err(e) => {
                    ErrorReporter::warn(&Error::from(e), "Reading controls");
                    break;
                }
            },
        }
    }

    debug!("Input closed, waiting for playback to finish");
    let mut poll = interval(FINISH_POLL_INTERVAL);
    loop {
        select! {
            _ = ctrl_c() => break,
            _ = poll.tick() => {
                if !controller.state().is_playing() {
                    break;
                }
            }
        }
    }
    shutdown(&controller).await
}

async fn handle_input(controller: &PlaybackController, store: &PlaylistStore, input: Input) {
    match input {
        Input::Command(command) => {
            if let Err(e) = controller.execute(command).await {
                println!("{e}");
            }
        }
        Input::Add(path) => match read_tracks(vec![path]).await {
            Ok(playlist) => {
                if let Err(e) = controller.execute(Command::AddTracks(playlist.into_tracks())).await {
                    println!("{e}");
                }
            }
            Err(e) => ErrorReporter::warn(&e, "Adding track"),
        },
        Input::Favourite => {
            let Some(track) = current_track(controller) else {
                println!("No current track");
                return;
            };
            match store.add_favourite(&track).await {
                Ok(()) => println!("Added {} to favourites", track.title),
                Err(LibraryError::AlreadyExists { .. }) => {
                    println!("{} is already a favourite", track.title);
                }
                Err(e) => ErrorReporter::warn(&Error::from(e), "Adding favourite"),
            }
        }
        Input::Status => print_status(controller),
        Input::Help => println!("{HELP}"),
        Input::Quit => {}
    }
}

fn current_track(controller: &PlaybackController) -> Option<Track> {
    let snapshot = controller.snapshot();
    snapshot
        .cursor
        .and_then(|cursor| snapshot.playlist.get(cursor).cloned())
}

fn print_status(controller: &PlaybackController) {
    let snapshot = controller.snapshot();
    let title = current_track(controller).map_or_else(|| "-".to_string(), |track| track.title);
    let state = match snapshot.state {
        PlaybackState::Stopped => "stopped".to_string(),
        PlaybackState::Playing { position, .. } => format!("playing {}", format_time(position)),
        PlaybackState::Paused { position, .. } => format!("paused {}", format_time(position)),
    };
    let position = snapshot
        .cursor
        .map_or_else(|| "-".to_string(), |cursor| (cursor + 1).to_string());

    println!(
        "{state} | {title} | track {position}/{} | mode {} | volume {}{}",
        snapshot.playlist.len(),
        snapshot.mode,
        snapshot.volume,
        if snapshot.loading { " | loading" } else { "" },
    );
}

async fn shutdown(controller: &PlaybackController) -> Result<()> {
    if controller.state() != PlaybackState::Stopped {
        controller
            .execute(Command::Stop)
            .await
            .add_context("Failed to stop playback")?;
    }
    Ok(())
}
