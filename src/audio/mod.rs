//! Playback coordination.
//!
//! Navigation rules, the command set, the engine seam and the controller
//! that ties them together. `SimulatedEngine` stands in for an audio
//! backend in the headless player.

pub mod commands;
pub mod controller;
pub mod controller_tests;
pub mod engine;
pub mod metadata;
pub mod navigation;
pub mod simulated;

pub use {
    commands::Command,
    controller::{CommandResult, ControllerConfig, ControllerSnapshot, PlaybackController},
    engine::{EngineNotification, PlaybackEngine},
    metadata::{TagReader, TrackMetadata},
    navigation::{NavigationStrategy, Selection, ShuffleHistory},
    simulated::SimulatedEngine,
};
