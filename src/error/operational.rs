//! Operational error context propagation with `anyhow`.
//!
//! This module provides extension traits and utilities for attaching
//! context to errors at the binary boundary and reporting them once.

use std::{error::Error as StdError, fmt::Display};

use {
    anyhow::{Context, Error, Result as AnyhowResult},
    tracing::{error, warn},
};

/// Extension trait for enhanced error context.
pub trait ResultExt<T, E> {
    /// Adds context to an error with a static string.
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;

    /// Adds context to an error with a formatted string.
    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(context)
    }

    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(format.to_string())
    }
}

/// Centralized error reporting for the binary.
pub struct ErrorReporter;

impl ErrorReporter {
    /// Reports a recoverable failure (the player keeps running).
    pub fn warn(error: &Error, context: &str) {
        warn!(context = context, error = %Self::to_user_message(error), "Recoverable error");
    }

    /// Reports a failure that ends the current operation.
    pub fn error(error: &Error, context: &str) {
        error!(context = context, error = %Self::to_user_message(error), "Operation failed");
    }

    /// Flattens an error chain into a single line, outermost context first.
    pub fn to_user_message(error: &Error) -> String {
        error
            .chain()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(": ")
    }
}
