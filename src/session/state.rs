//! Session phases, seats and terminal outcomes.

use super::MoveRecord;
use crate::games::chess::{DrawRule, GameEnd, Side};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Where the session stands in the turn protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Phase {
    /// Waiting for the human's move.
    AwaitingHumanMove,
    /// Waiting for the remote service's move.
    AwaitingRemoteMove,
    /// Game over; nothing changes until restart.
    Terminal,
}

/// Who is sitting on each side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    /// The local player, always White.
    Human,
    /// The recommendation service, always Black.
    Remote,
}

impl Seat {
    /// Side of the board this seat plays.
    pub fn side(self) -> Side {
        match self {
            Seat::Human => Side::White,
            Seat::Remote => Side::Black,
        }
    }

    /// Seat playing the given side.
    pub fn for_side(side: Side) -> Self {
        match side {
            Side::White => Seat::Human,
            Side::Black => Seat::Remote,
        }
    }
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum Termination {
    /// Checkmate on the board.
    Checkmate {
        /// Side that delivered mate.
        winner: Side,
    },
    /// No legal move and not in check.
    Stalemate,
    /// Draw by rule.
    DrawByRule {
        /// Rule that applied.
        rule: DrawRule,
    },
    /// A side resigned.
    Resignation {
        /// Side that resigned.
        resigning: Side,
    },
    /// Both sides agreed to a draw.
    DrawByAgreement,
}

impl Termination {
    /// Short machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Termination::Checkmate { .. } => "checkmate",
            Termination::Stalemate => "stalemate",
            Termination::DrawByRule { .. } => "draw",
            Termination::Resignation { .. } => "resignation",
            Termination::DrawByAgreement => "draw-by-agreement",
        }
    }

    /// Winning side, if the game was decisive.
    pub fn winner(&self) -> Option<Side> {
        match self {
            Termination::Checkmate { winner } => Some(*winner),
            Termination::Resignation { resigning } => Some(resigning.opponent()),
            _ => None,
        }
    }
}

impl From<GameEnd> for Termination {
    fn from(end: GameEnd) -> Self {
        match end {
            GameEnd::Checkmate { winner } => Termination::Checkmate { winner },
            GameEnd::Stalemate => Termination::Stalemate,
            GameEnd::Draw(rule) => Termination::DrawByRule { rule },
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Checkmate { winner } => write!(f, "{} wins by checkmate", winner),
            Termination::Stalemate => write!(f, "Game drawn by stalemate"),
            Termination::DrawByRule { rule } => write!(f, "Game drawn by {}", rule),
            Termination::Resignation { resigning } => {
                write!(f, "{} resigned, {} wins", resigning, resigning.opponent())
            }
            Termination::DrawByAgreement => write!(f, "Game drawn by agreement"),
        }
    }
}

/// Identifies one suspended operation.
///
/// Completions carry their ticket back; a ticket from before a restart,
/// resignation or game end no longer matches and is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("#{}.{}", epoch, id)]
pub struct Ticket {
    /// Session epoch the ticket was issued in.
    pub epoch: u64,
    /// Sequence number, unique per coordinator.
    pub id: u64,
}

/// Read-only view of the session for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct SessionSnapshot {
    /// Current position as FEN.
    fen: String,
    /// Side to move.
    side_to_move: Side,
    /// Protocol phase.
    phase: Phase,
    /// Move history.
    records: Vec<MoveRecord>,
    /// How the game ended, once it has.
    termination: Option<Termination>,
    /// A remote move request is outstanding.
    remote_in_flight: bool,
    /// A draw offer is awaiting a decision.
    draw_pending: bool,
}

impl SessionSnapshot {
    pub(super) fn new(
        fen: String,
        side_to_move: Side,
        phase: Phase,
        records: Vec<MoveRecord>,
        termination: Option<Termination>,
        remote_in_flight: bool,
        draw_pending: bool,
    ) -> Self {
        Self {
            fen,
            side_to_move,
            phase,
            records,
            termination,
            remote_in_flight,
            draw_pending,
        }
    }
}
