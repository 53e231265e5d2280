//! Error types for mafia-core

use crate::phase::TimeOfDay;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the match engine
///
/// Every operation returns its error to the caller; nothing is retried
/// internally. The transport collaborator maps these onto its own surface.
#[derive(Debug, Error)]
pub enum Error {
    /// No match exists for the host address.
    #[error("no game found for host address '{0}'")]
    NotFound(String),

    /// Initialize was called for a host that already has a live match.
    #[error("a game already exists for host address '{0}'")]
    AlreadyExists(String),

    /// Start was called twice, or a start subscription arrived after start.
    #[error("the game has already been started")]
    AlreadyStarted,

    /// Join was attempted after the game started.
    #[error("cannot join a game already in progress")]
    InProgress,

    /// A player joined twice, or a voter voted twice in one phase.
    #[error("'{0}' cannot perform the same action twice")]
    Duplicate(String),

    /// A vote of the wrong kind for the current phase.
    #[error("that vote cannot be cast during the {0}")]
    WrongPhase(TimeOfDay),

    /// The voter or the target is not part of the roster.
    #[error("player '{0}' is not a member of the game")]
    NotMember(String),

    /// The voter or the target has been convicted or killed.
    #[error("player '{0}' can no longer act in the game")]
    Incapacitated(String),

    /// A non-Mafia player attempted a kill vote.
    #[error("player '{0}' is not a member of the Mafia and cannot vote to kill")]
    Unauthorized(String),

    /// The caller's cancellation signal fired while waiting.
    #[error("the wait was cancelled before the event occurred")]
    Cancelled,

    /// The match was destroyed while the caller was waiting on it.
    #[error("the game was ended while waiting on it")]
    GameGone,
}

// Compile-time check that Error is Send + Sync for thread-safe error propagation.
// This function is never called but will fail to compile if the bound is not satisfied.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
