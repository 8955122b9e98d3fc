//! Error taxonomy. `InvariantViolation`s are never returned through
//! this type — a lookup the engine's own logic demanded (`xget`/`xpop`
//! in [`crate::tree_index::TreeIndex`]) panics directly, since by
//! definition it indicates a bug rather than a recoverable condition.
//! This enum covers what *can* be handled: start-up configuration
//! problems and the display connection itself.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid colour literal: {0:?}")]
    InvalidColour(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("could not connect to display server")]
    Fatal,

    #[error("another window manager is already running")]
    AnotherWmDetected,
}
