//! Game session: turn protocol, move log and the driver task.

mod coordinator;
mod draw;
mod driver;
mod error;
mod events;
mod record;
mod state;

pub use coordinator::{
    AppliedMove, DEFAULT_SEARCH_DEPTH, DrawOffer, DrawOutcome, DrawReply, GameCoordinator,
    RemoteMoveReply, RemoteMoveRequest,
};
pub use draw::{CoinFlipPolicy, DrawDecision, DrawPolicy, FixedPolicy};
pub use driver::{DriverClosed, SessionCommand, SessionDriver, SessionHandle};
pub use error::SessionError;
pub use events::SessionEvent;
pub use record::{MoveLog, MoveRecord};
pub use state::{Phase, Seat, SessionSnapshot, Termination, Ticket};
