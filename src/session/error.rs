//! Session errors.

use super::{Phase, Termination, Ticket};
use crate::engine::RemoteError;
use crate::games::chess::ChessMove;

/// Error that can occur when driving a session.
///
/// None of these leave the session changed.
#[derive(Debug, Clone, derive_more::Display)]
pub enum SessionError {
    /// The move is not legal in the current position.
    #[display("Illegal move {}", mv)]
    IllegalMove {
        /// Rejected move.
        mv: ChessMove,
    },

    /// The operation does not fit the current phase.
    #[display("Cannot {} while {}", operation, phase)]
    OutOfTurn {
        /// What was attempted.
        operation: &'static str,
        /// Phase at the time.
        phase: Phase,
    },

    /// Another call of the same kind is still outstanding.
    #[display("Busy: {} still pending", pending)]
    Busy {
        /// What is pending.
        pending: &'static str,
    },

    /// The game is already over.
    #[display("Game is already over: {}", termination)]
    GameOver {
        /// How it ended.
        termination: Termination,
    },

    /// The recommendation service failed.
    #[display("{}", _0)]
    Remote(RemoteError),

    /// A completion arrived for a ticket that is no longer current.
    #[display("Stale completion for ticket {}", ticket)]
    Stale {
        /// The superseded ticket.
        ticket: Ticket,
    },
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RemoteError> for SessionError {
    fn from(e: RemoteError) -> Self {
        SessionError::Remote(e)
    }
}
