//! Recommendation service errors.

use derive_more::{Display, Error};
use tracing::{error, instrument};

/// What went wrong talking to the recommendation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RemoteErrorKind {
    /// Service unreachable or answered with a non-success status.
    Unavailable,
    /// Service answered `success: false`.
    Rejected,
    /// Service answered without a move.
    NoMove,
    /// Service answered with a move that cannot be played.
    InvalidMove,
}

/// Recommendation service error with location tracking.
///
/// Every kind is recoverable; nothing retries automatically.
#[derive(Debug, Clone, Display, Error)]
#[display("Remote error ({}): {} at {}:{}", kind, message, file, line)]
pub struct RemoteError {
    /// Error category.
    pub kind: RemoteErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl RemoteError {
    /// Creates a new remote error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(?kind, error_message = %message, "Remote error created");
        Self {
            kind,
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// The service could not be reached.
    #[track_caller]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Unavailable, message)
    }

    /// The service reported failure.
    #[track_caller]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Rejected, message)
    }

    /// The service returned no move.
    #[track_caller]
    pub fn no_move(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NoMove, message)
    }

    /// The service returned a move that cannot be played.
    #[track_caller]
    pub fn invalid_move(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::InvalidMove, message)
    }
}
