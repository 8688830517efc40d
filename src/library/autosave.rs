//! Keeps the session playlist saved as it changes.

use {
    tokio::runtime::Handle,
    tracing::{debug, warn},
};

use crate::{
    library::{database::PlaylistStore, models::Playlist},
    state::{ObserverHub, PlaybackEvent, Subscription},
};

/// Subscribes an observer that writes every new playlist to `store` under
/// `name`.
///
/// Saves run on the observer's delivery thread using `runtime`; unchanged
/// playlists are skipped.
pub fn autosave_playlist(
    hub: &ObserverHub,
    store: PlaylistStore,
    name: impl Into<String>,
    runtime: Handle,
) -> Subscription {
    let name = name.into();
    let mut last_saved: Option<Playlist> = None;

    hub.subscribe(move |event| {
        let PlaybackEvent::PlaylistChanged { playlist, .. } = event else {
            return;
        };
        if last_saved.as_ref() == Some(playlist) {
            return;
        }

        match runtime.block_on(store.save_playlist(&name, playlist)) {
            Ok(()) => {
                debug!("Autosaved {} tracks to '{name}'", playlist.len());
                last_saved = Some(playlist.clone());
            }
            Err(e) => warn!("Failed to autosave playlist '{name}': {e}"),
        }
    })
}
