//! Notifications for the presentation layer.

use super::{Seat, Termination, Ticket};
use crate::engine::RemoteErrorKind;

/// Something the player should be told about.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A move was played and logged.
    MoveApplied {
        /// Who played it.
        seat: Seat,
        /// Move record number.
        index: u32,
        /// Move in SAN.
        san: String,
        /// Move in coordinate notation.
        uci: String,
    },
    /// A remote move request went out.
    RemoteThinking {
        /// Ticket of the request.
        ticket: Ticket,
    },
    /// The service's evaluation of the position it searched.
    Evaluation {
        /// Centipawns from White's point of view.
        centipawns: Option<f64>,
        /// Mate distance, if any.
        mate: Option<i32>,
    },
    /// The remote move request failed; the session still waits for it.
    RemoteFailed {
        /// Failure category.
        kind: RemoteErrorKind,
        /// Failure description.
        message: String,
    },
    /// A draw offer is being considered.
    DrawOffered,
    /// The draw offer was declined.
    DrawDeclined,
    /// The game ended.
    GameOver(Termination),
    /// A command was refused.
    Rejected {
        /// Why.
        reason: String,
    },
    /// The session was reset to the starting position.
    Restarted,
}
