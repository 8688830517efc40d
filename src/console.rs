//! Line-oriented controls for the headless player.
//!
//! Each input line maps to one controller command or a player action.
//! Track numbers are 1-based on the console and 0-based everywhere else.

use std::path::PathBuf;

use crate::{
    audio::Command,
    state::{PlayMode, PlaybackEvent, PlaybackState},
};

/// Help text printed by `help`.
pub const HELP: &str = "\
play | pause | stop | next (n) | prev (p)
seek <seconds> | vol <0-100> | mode <sequential|loop-single|loop-all|shuffle>
jump <track> | remove <track> | add <file> | clear
fav | status | help | quit (q)";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Forward to the controller.
    Command(Command),
    /// Add a file to the playlist, reading its tags first.
    Add(PathBuf),
    /// Mark the current track as a favourite.
    Favourite,
    /// Print the current state.
    Status,
    /// Print `HELP`.
    Help,
    /// Leave the player.
    Quit,
}

/// Parses one console line.
///
/// # Errors
///
/// Returns a message describing what was wrong with the line.
pub fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let input = match word.to_ascii_lowercase().as_str() {
        "play" => Input::Command(Command::Play),
        "pause" => Input::Command(Command::TogglePause),
        "stop" => Input::Command(Command::Stop),
        "next" | "n" => Input::Command(Command::Next),
        "prev" | "previous" | "p" => Input::Command(Command::Previous),
        "clear" => Input::Command(Command::ClearPlaylist),
        "seek" => {
            let seconds: f64 = parse_arg(rest, "seek")?;
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(format!("invalid position '{rest}'"));
            }
            Input::Command(Command::Seek((seconds * 1000.0) as u64))
        }
        "vol" | "volume" => Input::Command(Command::SetVolume(parse_arg(rest, "vol")?)),
        "mode" => Input::Command(Command::SetMode(rest.parse::<PlayMode>()?)),
        "jump" => Input::Command(Command::JumpTo(track_index(rest, "jump")?)),
        "remove" | "rm" => Input::Command(Command::RemoveTrack(track_index(rest, "remove")?)),
        "add" if !rest.is_empty() => Input::Add(PathBuf::from(rest)),
        "add" => return Err("usage: add <file>".to_string()),
        "fav" | "favourite" => Input::Favourite,
        "status" | "s" => Input::Status,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        "" => return Err("empty input".to_string()),
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(input)
}

fn parse_arg<T: std::str::FromStr>(arg: &str, command: &str) -> Result<T, String> {
    arg.parse()
        .map_err(|_| format!("usage: {command} <number>, got '{arg}'"))
}

fn track_index(arg: &str, command: &str) -> Result<usize, String> {
    let number: usize = parse_arg(arg, command)?;
    number
        .checked_sub(1)
        .ok_or_else(|| "track numbers start at 1".to_string())
}

/// Formats milliseconds as `m:ss`.
#[must_use]
pub fn format_time(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// One-line description of an event, or `None` for events not worth a line.
///
/// `title` resolves a playlist index to a track title.
pub fn describe_event(event: &PlaybackEvent, title: impl Fn(usize) -> Option<String>) -> Option<String> {
    let name = |track: usize| title(track).unwrap_or_else(|| format!("track {}", track + 1));

    match event {
        PlaybackEvent::StateChanged { old, new } => match (old, new) {
            (_, PlaybackState::Playing { track, position }) if old.track() != Some(*track) || !old.is_playing() => {
                Some(format!("Playing {} [{}]", name(*track), format_time(*position)))
            }
            (_, PlaybackState::Playing { position, .. }) => Some(format!("Seek to {}", format_time(*position))),
            (_, PlaybackState::Paused { track, position }) => {
                Some(format!("Paused {} at {}", name(*track), format_time(*position)))
            }
            (_, PlaybackState::Stopped) => Some("Stopped".to_string()),
        },
        PlaybackEvent::PositionTick(_) => None,
        PlaybackEvent::PlaylistChanged { playlist, .. } => Some(format!("Playlist: {} tracks", playlist.len())),
        PlaybackEvent::VolumeChanged(volume) => Some(format!("Volume {volume}")),
        PlaybackEvent::ModeChanged(mode) => Some(format!("Mode {mode}")),
        PlaybackEvent::Error { kind, detail } => Some(format!("Error ({kind:?}): {detail}")),
    }
}
