//! Error types for tempora-core.

use thiserror::Error;

/// Which sequencer precondition a call violated.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("sequencer is already open")]
    AlreadyOpen,

    #[error("sequencer is not open")]
    NotOpen,

    #[error("no sequence assigned")]
    NoSequence,
}

/// Error type for tempora-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid state: {0}")]
    InvalidState(#[from] StateError),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Midi(#[from] tempora_midi::Error),

    #[error("Failed to spawn dispatch thread: {0}")]
    ThreadSpawn(std::io::Error),

    #[error("Dispatch thread panicked")]
    DispatchPanicked,
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
