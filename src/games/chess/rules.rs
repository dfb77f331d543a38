//! Rules engine seam and its standard implementation.
//!
//! The session coordinator never looks at the board itself. Everything it
//! needs to know about chess goes through [`RulesEngine`].

use super::{ChessMove, DrawRule, GameEnd, Position, Side};
use derive_more::{Display, Error};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Move, Position as _, Role, Square};
use tracing::{debug, instrument, warn};

/// Plies without capture or pawn move that end the game.
const FIFTY_MOVE_PLIES: u32 = 100;

/// Occurrences of one position that end the game.
const REPETITION_LIMIT: usize = 3;

/// Result of applying a move to a position.
#[derive(Debug, Clone)]
pub struct Ply<P> {
    /// Position after the move.
    pub position: P,
    /// Standard algebraic notation of the move, with check suffix.
    pub san: String,
}

/// Legal-move enumeration and game-termination queries.
pub trait RulesEngine: std::fmt::Debug + Send + Sync {
    /// Position type exchanged with the coordinator.
    type Position: Clone + std::fmt::Debug + Send + Sync;

    /// The standard starting position.
    fn initial_position(&self) -> Self::Position;

    /// Reads a position from FEN.
    fn from_fen(&self, fen: &str) -> Result<Self::Position, RulesError>;

    /// Serializes a position as FEN.
    fn fen(&self, position: &Self::Position) -> String;

    /// Side whose turn it is.
    fn side_to_move(&self, position: &Self::Position) -> Side;

    /// Squares the piece on `origin` may legally move to.
    fn legal_destinations(&self, position: &Self::Position, origin: Square) -> Vec<Square>;

    /// Applies a move, failing if it is not legal.
    fn apply(&self, position: &Self::Position, mv: &ChessMove) -> Result<Ply<Self::Position>, RulesError>;

    /// Reports whether the position ends the game, and how.
    fn termination(&self, position: &Self::Position) -> Option<GameEnd>;
}

/// Standard chess rules backed by `shakmaty`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    /// Finds the legal move matching origin, destination and promotion.
    ///
    /// Castling is addressed by the king's destination (`e1g1`). A pawn
    /// reaching the last rank without a promotion choice promotes to a queen.
    fn find_legal(chess: &Chess, mv: &ChessMove) -> Option<Move> {
        let wanted = Role::from(mv.promotion.unwrap_or_default());
        chess.legal_moves().into_iter().find(|candidate| {
            let coordinates = matches!(
                candidate.to_uci(CastlingMode::Standard),
                UciMove::Normal { from, to, .. } if from == mv.origin && to == mv.destination
            );
            coordinates && candidate.promotion().is_none_or(|role| role == wanted)
        })
    }
}

impl RulesEngine for StandardRules {
    type Position = Position;

    fn initial_position(&self) -> Position {
        Position::from_chess(Chess::default())
    }

    #[instrument(skip(self))]
    fn from_fen(&self, fen: &str) -> Result<Position, RulesError> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|e| RulesError::new(format!("Invalid FEN {:?}: {}", fen, e)))?;
        let chess: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::new(format!("Illegal position {:?}: {}", fen, e)))?;
        debug!("Position loaded from FEN");
        Ok(Position::from_chess(chess))
    }

    fn fen(&self, position: &Position) -> String {
        position.fen()
    }

    fn side_to_move(&self, position: &Position) -> Side {
        position.side_to_move()
    }

    #[instrument(skip(self, position), fields(origin = %origin))]
    fn legal_destinations(&self, position: &Position, origin: Square) -> Vec<Square> {
        let mut destinations: Vec<Square> = position
            .chess
            .legal_moves()
            .iter()
            .filter_map(|candidate| match candidate.to_uci(CastlingMode::Standard) {
                UciMove::Normal { from, to, .. } if from == origin => Some(to),
                _ => None,
            })
            .collect();
        // Promotions list the same destination once per piece.
        destinations.sort();
        destinations.dedup();
        debug!(count = destinations.len(), "Enumerated legal destinations");
        destinations
    }

    #[instrument(skip(self, position), fields(mv = %mv))]
    fn apply(&self, position: &Position, mv: &ChessMove) -> Result<Ply<Position>, RulesError> {
        let legal = Self::find_legal(&position.chess, mv).ok_or_else(|| {
            warn!("Move rejected by rules");
            RulesError::new(format!("Illegal move {} in {}", mv, position.fen()))
        })?;

        let mut chess = position.chess.clone();
        let san = SanPlus::from_move_and_play_unchecked(&mut chess, &legal).to_string();
        debug!(san = %san, "Move applied");

        Ok(Ply {
            position: position.advance(chess),
            san,
        })
    }

    fn termination(&self, position: &Position) -> Option<GameEnd> {
        let chess = &position.chess;
        if chess.is_checkmate() {
            return Some(GameEnd::Checkmate {
                winner: Side::from(chess.turn()).opponent(),
            });
        }
        if chess.is_stalemate() {
            return Some(GameEnd::Stalemate);
        }
        if chess.is_insufficient_material() {
            return Some(GameEnd::Draw(DrawRule::InsufficientMaterial));
        }
        if chess.halfmoves() >= FIFTY_MOVE_PLIES {
            return Some(GameEnd::Draw(DrawRule::FiftyMoveRule));
        }
        if position.occurrences() >= REPETITION_LIMIT {
            return Some(GameEnd::Draw(DrawRule::ThreefoldRepetition));
        }
        None
    }
}

/// Rules error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Rules error: {} at {}:{}", message, file, line)]
pub struct RulesError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl RulesError {
    /// Creates a new rules error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
