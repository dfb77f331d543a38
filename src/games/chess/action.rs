//! First-class move type.
//!
//! A move names an origin, a destination and an optional promotion
//! piece. Whether it is legal is a question for the rules engine;
//! this type only knows how to read and write UCI coordinates.

use super::Promotion;
use serde::{Deserialize, Serialize};
use shakmaty::Square;
use std::str::FromStr;
use tracing::instrument;

/// A move request: origin square, destination square, optional promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChessMove {
    /// Square the piece leaves.
    #[serde(with = "square_name")]
    pub origin: Square,
    /// Square the piece lands on.
    #[serde(with = "square_name")]
    pub destination: Square,
    /// Promotion choice; queen is assumed when a pawn promotes without one.
    pub promotion: Option<Promotion>,
}

impl ChessMove {
    /// Creates a move without a promotion choice.
    pub fn new(origin: Square, destination: Square) -> Self {
        Self {
            origin,
            destination,
            promotion: None,
        }
    }

    /// Returns the move with an explicit promotion choice.
    pub fn with_promotion(mut self, promotion: Promotion) -> Self {
        self.promotion = Some(promotion);
        self
    }

    /// Parses coordinate notation such as `e2e4` or `e7e8n`.
    #[instrument]
    pub fn parse_uci(text: &str) -> Result<Self, MoveParseError> {
        let text = text.trim();
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(MoveParseError::Length(text.to_string()));
        }

        let square = |name: &str| {
            name.parse::<Square>()
                .map_err(|_| MoveParseError::Square(name.to_string()))
        };
        let origin = square(&text[0..2])?;
        let destination = square(&text[2..4])?;

        let promotion = match text.get(4..) {
            Some(piece) if !piece.is_empty() => Some(
                Promotion::from_str(piece)
                    .map_err(|_| MoveParseError::Promotion(piece.to_string()))?,
            ),
            _ => None,
        };

        Ok(Self {
            origin,
            destination,
            promotion,
        })
    }

    /// Formats the move in coordinate notation.
    pub fn to_uci(&self) -> String {
        self.to_string()
    }
}

impl FromStr for ChessMove {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_uci(s)
    }
}

impl std::fmt::Display for ChessMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.origin, self.destination)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion)?;
        }
        Ok(())
    }
}

/// Error reading a move in coordinate notation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveParseError {
    /// Wrong number of characters.
    #[display("Expected 4 or 5 characters, got {:?}", _0)]
    Length(String),

    /// Not a square on the board.
    #[display("Not a board square: {:?}", _0)]
    Square(String),

    /// Unknown promotion piece.
    #[display("Unknown promotion piece: {:?}", _0)]
    Promotion(String),
}

impl std::error::Error for MoveParseError {}

mod square_name {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
    use shakmaty::Square;

    pub fn serialize<S: Serializer>(square: &Square, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(square)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Square, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(|_| D::Error::custom(format!("not a square: {}", name)))
    }
}
