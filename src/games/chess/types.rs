//! Core domain types for chess sessions.

use serde::{Deserialize, Serialize};

/// Side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// White (moves first).
    White,
    /// Black.
    Black,
}

impl Side {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl From<shakmaty::Color> for Side {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => Side::White,
            shakmaty::Color::Black => Side::Black,
        }
    }
}

/// Piece a pawn may promote to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Promotion {
    /// Queen, used when no choice is given.
    #[default]
    #[strum(serialize = "q")]
    Queen,
    /// Rook.
    #[strum(serialize = "r")]
    Rook,
    /// Bishop.
    #[strum(serialize = "b")]
    Bishop,
    /// Knight.
    #[strum(serialize = "n")]
    Knight,
}

impl From<Promotion> for shakmaty::Role {
    fn from(promotion: Promotion) -> Self {
        match promotion {
            Promotion::Queen => shakmaty::Role::Queen,
            Promotion::Rook => shakmaty::Role::Rook,
            Promotion::Bishop => shakmaty::Role::Bishop,
            Promotion::Knight => shakmaty::Role::Knight,
        }
    }
}

/// Draw conditions detected by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum DrawRule {
    /// Neither side can possibly deliver mate.
    #[display("insufficient material")]
    InsufficientMaterial,
    /// One hundred plies without a capture or pawn move.
    #[display("fifty-move rule")]
    FiftyMoveRule,
    /// Same position for the third time.
    #[display("threefold repetition")]
    ThreefoldRepetition,
}

/// How a position ends the game, as reported by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEnd {
    /// The side to move is mated.
    Checkmate {
        /// Side that delivered mate.
        winner: Side,
    },
    /// The side to move has no legal move and is not in check.
    Stalemate,
    /// Drawn by rule.
    Draw(DrawRule),
}

impl std::fmt::Display for GameEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameEnd::Checkmate { winner } => write!(f, "{} wins by checkmate", winner),
            GameEnd::Stalemate => write!(f, "Draw by stalemate"),
            GameEnd::Draw(rule) => write!(f, "Draw by {}", rule),
        }
    }
}
