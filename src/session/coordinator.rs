//! Game session coordinator.
//!
//! Owns the position, the move log and turn ownership. The human plays
//! White; the recommendation service plays Black. The two operations that
//! wait on something outside the session, the remote move and the draw
//! offer, are split into a `begin_*` call that issues a [`Ticket`], a
//! future that does the waiting without touching session state, and a
//! `complete_*`/`resolve_*` call that folds the answer back in.

use super::draw::{DrawDecision, DrawPolicy};
use super::{
    MoveLog, MoveRecord, Phase, Seat, SessionError, SessionEvent, SessionSnapshot, Termination,
    Ticket,
};
use crate::engine::{Recommendation, RecommendationService, RemoteError};
use crate::games::chess::{ChessMove, RulesEngine, RulesError, Square, StandardRules};
use derive_getters::Getters;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Search depth requested from the service unless configured otherwise.
pub const DEFAULT_SEARCH_DEPTH: u32 = 20;

/// A move that was accepted and logged.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct AppliedMove {
    /// Who played it.
    seat: Seat,
    /// The move as requested.
    mv: ChessMove,
    /// The move in SAN.
    san: String,
    /// Move record number.
    index: u32,
    /// Phase after the move.
    phase: Phase,
    /// Set when the move ended the game.
    termination: Option<Termination>,
}

/// Result of a resolved draw offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// The game ended drawn by agreement.
    Accepted,
    /// Play continues.
    Declined,
}

/// An outstanding remote move request.
#[derive(Debug)]
pub struct RemoteMoveRequest {
    ticket: Ticket,
    fen: String,
    depth: u32,
    service: Arc<dyn RecommendationService>,
}

impl RemoteMoveRequest {
    /// Ticket identifying this request.
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Position sent to the service.
    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// Calls the service. Session state is not touched here.
    #[instrument(skip(self), fields(ticket = %self.ticket))]
    pub async fn dispatch(self) -> RemoteMoveReply {
        debug!(fen = %self.fen, depth = self.depth, "Dispatching remote move request");
        let result = self.service.best_move(&self.fen, self.depth).await;
        RemoteMoveReply::new(self.ticket, result)
    }
}

/// The service's answer to a [`RemoteMoveRequest`].
#[derive(Debug, Clone)]
pub struct RemoteMoveReply {
    ticket: Ticket,
    result: Result<Recommendation, RemoteError>,
}

impl RemoteMoveReply {
    /// Pairs a service result with the ticket it answers.
    pub fn new(ticket: Ticket, result: Result<Recommendation, RemoteError>) -> Self {
        Self { ticket, result }
    }

    /// Ticket this reply answers.
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }
}

/// An outstanding draw offer.
#[derive(Debug)]
pub struct DrawOffer {
    ticket: Ticket,
    fen: String,
    policy: Arc<dyn DrawPolicy>,
}

impl DrawOffer {
    /// Ticket identifying this offer.
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Lets the policy decide. Session state is not touched here.
    #[instrument(skip(self), fields(ticket = %self.ticket))]
    pub async fn evaluate(self) -> DrawReply {
        let decision = self.policy.decide(&self.fen).await;
        DrawReply::new(self.ticket, decision)
    }
}

/// The policy's answer to a [`DrawOffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawReply {
    ticket: Ticket,
    decision: DrawDecision,
}

impl DrawReply {
    /// Pairs a decision with the ticket it answers.
    pub fn new(ticket: Ticket, decision: DrawDecision) -> Self {
        Self { ticket, decision }
    }

    /// Ticket this reply answers.
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// The decision.
    pub fn decision(&self) -> DrawDecision {
        self.decision
    }
}

/// Turn-taking state machine between the human and the remote service.
#[derive(Debug)]
pub struct GameCoordinator<R: RulesEngine = StandardRules> {
    rules: R,
    service: Arc<dyn RecommendationService>,
    draw_policy: Arc<dyn DrawPolicy>,
    search_depth: u32,
    initial: R::Position,
    position: R::Position,
    log: MoveLog,
    phase: Phase,
    termination: Option<Termination>,
    epoch: u64,
    next_ticket: u64,
    remote_in_flight: Option<Ticket>,
    draw_pending: Option<Ticket>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl<R: RulesEngine> GameCoordinator<R> {
    /// Creates a session at the standard starting position.
    #[instrument(skip_all)]
    pub fn new(
        rules: R,
        service: Arc<dyn RecommendationService>,
        draw_policy: Arc<dyn DrawPolicy>,
    ) -> Self {
        let initial = rules.initial_position();
        info!("Creating game session");
        Self {
            position: initial.clone(),
            initial,
            rules,
            service,
            draw_policy,
            search_depth: DEFAULT_SEARCH_DEPTH,
            log: MoveLog::new(),
            phase: Phase::AwaitingHumanMove,
            termination: None,
            epoch: 0,
            next_ticket: 0,
            remote_in_flight: None,
            draw_pending: None,
            events: None,
        }
    }

    /// Sets the depth requested from the service.
    pub fn with_search_depth(mut self, depth: u32) -> Self {
        self.search_depth = depth;
        self
    }

    /// Sends session events to `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Starts (and restarts) from `position` instead of the standard one.
    ///
    /// The human moves first, so the position must have White to move and
    /// must not already be decided.
    #[instrument(skip_all)]
    pub fn starting_from(mut self, position: R::Position) -> Result<Self, RulesError> {
        if self.rules.side_to_move(&position) != Seat::Human.side() {
            return Err(RulesError::new(format!(
                "Starting position must have {} to move: {}",
                Seat::Human.side(),
                self.rules.fen(&position)
            )));
        }
        if let Some(end) = self.rules.termination(&position) {
            return Err(RulesError::new(format!(
                "Starting position is already decided ({}): {}",
                end,
                self.rules.fen(&position)
            )));
        }

        info!(fen = %self.rules.fen(&position), "Using custom starting position");
        self.initial = position.clone();
        self.position = position;
        Ok(self)
    }

    // ─────────────────────────────────────────────────────────────
    //  Queries
    // ─────────────────────────────────────────────────────────────

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// How the game ended, once it has.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Current position.
    pub fn position(&self) -> &R::Position {
        &self.position
    }

    /// Move history.
    pub fn records(&self) -> &[MoveRecord] {
        self.log.records()
    }

    /// Rules engine in use.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Restart counter; bumps on every [`restart`](Self::restart).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Squares the piece on `origin` may move to, for highlighting.
    pub fn legal_destinations(&self, origin: Square) -> Vec<Square> {
        self.rules.legal_destinations(&self.position, origin)
    }

    /// Read-only view of the whole session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(
            self.rules.fen(&self.position),
            self.rules.side_to_move(&self.position),
            self.phase,
            self.log.records().to_vec(),
            self.termination,
            self.remote_in_flight.is_some(),
            self.draw_pending.is_some(),
        )
    }

    // ─────────────────────────────────────────────────────────────
    //  Human moves
    // ─────────────────────────────────────────────────────────────

    /// Plays the human's move.
    ///
    /// # Errors
    ///
    /// Rejected without any change when the game is over, a remote request
    /// is outstanding, it is not the human's turn, or the move is illegal.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn apply_move(&mut self, mv: ChessMove) -> Result<AppliedMove, SessionError> {
        self.ensure_live()?;
        if self.remote_in_flight.is_some() {
            warn!("Move attempted while remote request is outstanding");
            return Err(SessionError::Busy {
                pending: "remote move request",
            });
        }
        if self.phase != Phase::AwaitingHumanMove {
            warn!("Human tried to move out of turn");
            return Err(SessionError::OutOfTurn {
                operation: "play a move",
                phase: self.phase,
            });
        }
        self.play(Seat::Human, mv, None)
    }

    // ─────────────────────────────────────────────────────────────
    //  Remote moves
    // ─────────────────────────────────────────────────────────────

    /// Issues a remote move request and marks it in flight.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn begin_remote_move(&mut self) -> Result<RemoteMoveRequest, SessionError> {
        self.ensure_live()?;
        if self.remote_in_flight.is_some() {
            return Err(SessionError::Busy {
                pending: "remote move request",
            });
        }
        if self.phase != Phase::AwaitingRemoteMove {
            return Err(SessionError::OutOfTurn {
                operation: "request a remote move",
                phase: self.phase,
            });
        }

        let ticket = self.issue_ticket();
        self.remote_in_flight = Some(ticket);
        info!(%ticket, "Remote move requested");
        self.emit(SessionEvent::RemoteThinking { ticket });

        Ok(RemoteMoveRequest {
            ticket,
            fen: self.rules.fen(&self.position),
            depth: self.search_depth,
            service: Arc::clone(&self.service),
        })
    }

    /// Folds the service's answer back into the session.
    ///
    /// A failed or unplayable recommendation leaves the session waiting for
    /// the remote move; a fresh request may be issued.
    #[instrument(skip_all, fields(ticket = %reply.ticket))]
    pub fn complete_remote_move(&mut self, reply: RemoteMoveReply) -> Result<AppliedMove, SessionError> {
        let RemoteMoveReply { ticket, result } = reply;
        if self.remote_in_flight != Some(ticket) {
            debug!("Discarding reply for superseded request");
            return Err(SessionError::Stale { ticket });
        }
        self.remote_in_flight = None;

        let recommendation = match result {
            Ok(recommendation) => recommendation,
            Err(e) => return Err(self.remote_failure(e)),
        };

        let mv = ChessMove::parse_uci(recommendation.best_move()).map_err(|e| {
            self.remote_failure(RemoteError::invalid_move(format!(
                "Unreadable move {:?}: {}",
                recommendation.best_move(),
                e
            )))
        })?;

        let evaluation = SessionEvent::Evaluation {
            centipawns: *recommendation.evaluation(),
            mate: *recommendation.mate(),
        };
        match self.play(Seat::Remote, mv, Some(evaluation)) {
            Err(SessionError::IllegalMove { mv }) => Err(self.remote_failure(
                RemoteError::invalid_move(format!("Recommended move {} is illegal", mv)),
            )),
            result => result,
        }
    }

    /// Requests, awaits and applies the remote move in one call.
    pub async fn request_remote_move(&mut self) -> Result<AppliedMove, SessionError> {
        let request = self.begin_remote_move()?;
        let reply = request.dispatch().await;
        self.complete_remote_move(reply)
    }

    // ─────────────────────────────────────────────────────────────
    //  Resignation and draws
    // ─────────────────────────────────────────────────────────────

    /// The human resigns.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn resign(&mut self) -> Result<Termination, SessionError> {
        self.ensure_live()?;
        let termination = Termination::Resignation {
            resigning: Seat::Human.side(),
        };
        self.terminate(termination);
        Ok(termination)
    }

    /// Offers a draw; the decision comes back through
    /// [`resolve_draw_offer`](Self::resolve_draw_offer).
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn begin_draw_offer(&mut self) -> Result<DrawOffer, SessionError> {
        self.ensure_live()?;
        if self.draw_pending.is_some() {
            return Err(SessionError::Busy {
                pending: "draw offer",
            });
        }

        let ticket = self.issue_ticket();
        self.draw_pending = Some(ticket);
        info!(%ticket, "Draw offered");
        self.emit(SessionEvent::DrawOffered);

        Ok(DrawOffer {
            ticket,
            fen: self.rules.fen(&self.position),
            policy: Arc::clone(&self.draw_policy),
        })
    }

    /// Applies the decision on a draw offer.
    #[instrument(skip(self))]
    pub fn resolve_draw_offer(&mut self, reply: DrawReply) -> Result<DrawOutcome, SessionError> {
        if self.draw_pending != Some(reply.ticket) {
            debug!("Discarding decision for superseded draw offer");
            return Err(SessionError::Stale {
                ticket: reply.ticket,
            });
        }
        self.draw_pending = None;

        match reply.decision {
            DrawDecision::Accept => {
                self.terminate(Termination::DrawByAgreement);
                Ok(DrawOutcome::Accepted)
            }
            DrawDecision::Decline => {
                info!("Draw declined");
                self.emit(SessionEvent::DrawDeclined);
                Ok(DrawOutcome::Declined)
            }
        }
    }

    /// Offers, awaits and resolves a draw in one call.
    pub async fn offer_draw(&mut self) -> Result<DrawOutcome, SessionError> {
        let offer = self.begin_draw_offer()?;
        let reply = offer.evaluate().await;
        self.resolve_draw_offer(reply)
    }

    // ─────────────────────────────────────────────────────────────
    //  Restart
    // ─────────────────────────────────────────────────────────────

    /// Throws the game away and starts over. Allowed in any phase;
    /// outstanding tickets become stale.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn restart(&mut self) -> SessionSnapshot {
        self.epoch += 1;
        self.position = self.initial.clone();
        self.log = MoveLog::new();
        self.phase = Phase::AwaitingHumanMove;
        self.termination = None;
        self.remote_in_flight = None;
        self.draw_pending = None;
        info!(epoch = self.epoch, "Game restarted");
        self.emit(SessionEvent::Restarted);
        self.snapshot()
    }

    // ─────────────────────────────────────────────────────────────
    //  Internals
    // ─────────────────────────────────────────────────────────────

    /// Shared move path for both seats.
    ///
    /// `annotation` is emitted right after the move, before any game-over
    /// event the move causes.
    fn play(
        &mut self,
        seat: Seat,
        mv: ChessMove,
        annotation: Option<SessionEvent>,
    ) -> Result<AppliedMove, SessionError> {
        let to_move = self.rules.side_to_move(&self.position);
        if Seat::for_side(to_move) != seat {
            warn!(%seat, %to_move, "Move from the side not on turn");
            return Err(SessionError::OutOfTurn {
                operation: "play a move",
                phase: self.phase,
            });
        }

        if !self
            .rules
            .legal_destinations(&self.position, mv.origin)
            .contains(&mv.destination)
        {
            warn!(%seat, %mv, "Destination not legal for origin");
            return Err(SessionError::IllegalMove { mv });
        }

        let ply = self.rules.apply(&self.position, &mv).map_err(|e| {
            warn!(%seat, %mv, error = %e, "Rules refused move");
            SessionError::IllegalMove { mv }
        })?;

        let index = match seat {
            Seat::Human => self.log.record_human(ply.san.clone())?,
            Seat::Remote => self.log.record_remote(ply.san.clone())?,
        };
        self.position = ply.position;

        info!(%seat, index, san = %ply.san, "Move applied");
        self.emit(SessionEvent::MoveApplied {
            seat,
            index,
            san: ply.san.clone(),
            uci: mv.to_uci(),
        });
        if let Some(annotation) = annotation {
            self.emit(annotation);
        }

        let termination = self.rules.termination(&self.position).map(Termination::from);
        match termination {
            Some(termination) => self.terminate(termination),
            None => {
                self.phase = match seat {
                    Seat::Human => Phase::AwaitingRemoteMove,
                    Seat::Remote => Phase::AwaitingHumanMove,
                };
            }
        }

        Ok(AppliedMove {
            seat,
            mv,
            san: ply.san,
            index,
            phase: self.phase,
            termination,
        })
    }

    fn ensure_live(&self) -> Result<(), SessionError> {
        match self.termination {
            Some(termination) => Err(SessionError::GameOver { termination }),
            None => Ok(()),
        }
    }

    fn terminate(&mut self, termination: Termination) {
        self.phase = Phase::Terminal;
        self.termination = Some(termination);
        self.remote_in_flight = None;
        self.draw_pending = None;
        info!(reason = termination.reason(), %termination, "Game over");
        self.emit(SessionEvent::GameOver(termination));
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket {
            epoch: self.epoch,
            id: self.next_ticket,
        }
    }

    fn remote_failure(&self, e: RemoteError) -> SessionError {
        warn!(kind = %e.kind, error = %e.message, "Remote move failed");
        self.emit(SessionEvent::RemoteFailed {
            kind: e.kind,
            message: e.message.clone(),
        });
        SessionError::Remote(e)
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                debug!("Event receiver dropped");
            }
        }
    }
}
