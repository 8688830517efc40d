//! Playback state values and the observer hub that publishes changes.
//!
//! The controller is the only writer of playback state; everything else
//! learns about changes through `ObserverHub` subscriptions.

pub mod events;
pub mod observer_hub;
pub mod playback;

pub use {
    events::PlaybackEvent,
    observer_hub::{ObserverHub, Subscription},
    playback::{PlayMode, PlaybackState},
};
