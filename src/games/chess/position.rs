//! Opaque position value produced and consumed by the standard rules.

use super::Side;
use shakmaty::fen::Fen;
use shakmaty::{Chess, EnPassantMode, Position as _};

/// A chess position plus the repetition history needed for draw detection.
///
/// Callers outside the rules engine only read the side to move and the
/// FEN; the board itself stays behind this type.
#[derive(Debug, Clone)]
pub struct Position {
    pub(super) chess: Chess,
    /// Repetition keys of every position reached, current one last.
    pub(super) seen: Vec<String>,
}

impl Position {
    pub(super) fn from_chess(chess: Chess) -> Self {
        let key = repetition_key(&chess);
        Self {
            chess,
            seen: vec![key],
        }
    }

    pub(super) fn advance(&self, chess: Chess) -> Self {
        let mut seen = self.seen.clone();
        seen.push(repetition_key(&chess));
        Self { chess, seen }
    }

    /// Returns the side to move.
    pub fn side_to_move(&self) -> Side {
        self.chess.turn().into()
    }

    /// Serializes the position as FEN.
    pub fn fen(&self) -> String {
        Fen::from_position(self.chess.clone(), EnPassantMode::Legal).to_string()
    }

    /// Number of times the current position has occurred.
    pub fn occurrences(&self) -> usize {
        match self.seen.last() {
            Some(current) => self.seen.iter().filter(|key| *key == current).count(),
            None => 0,
        }
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.fen() == other.fen() && self.seen == other.seen
    }
}

/// FEN without the move counters: placement, turn, castling, en passant.
fn repetition_key(chess: &Chess) -> String {
    Fen::from_position(chess.clone(), EnPassantMode::Legal)
        .to_string()
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}
