//! Chess rules, moves and positions.

mod action;
mod position;
mod rules;
mod types;

pub use action::{ChessMove, MoveParseError};
pub use position::Position;
pub use rules::{Ply, RulesEngine, RulesError, StandardRules};
pub use types::{DrawRule, GameEnd, Promotion, Side};

/// Board squares, re-exported from the rules library.
pub use shakmaty::Square;
