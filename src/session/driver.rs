//! Session driver task.
//!
//! The driver owns the coordinator and is the only thing that mutates it.
//! Commands arrive over a channel; remote move requests and draw offers
//! run as spawned tasks whose answers come back over a second channel and
//! are folded in on the driver's own loop.

use super::{
    DrawReply, GameCoordinator, Phase, RemoteMoveReply, SessionError, SessionEvent,
    SessionSnapshot,
};
use crate::games::chess::{ChessMove, RulesEngine, Square};
use derive_more::{Display, Error};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

/// Requests accepted by the driver.
#[derive(Debug)]
pub enum SessionCommand {
    /// Human move.
    Move(ChessMove),
    /// Ask the service for its move (again).
    RequestRemoteMove,
    /// Human resigns.
    Resign,
    /// Human offers a draw.
    OfferDraw,
    /// Start over.
    Restart,
    /// Reply with a snapshot.
    Snapshot(oneshot::Sender<SessionSnapshot>),
    /// Reply with legal destinations from a square.
    LegalDestinations(Square, oneshot::Sender<Vec<Square>>),
    /// Stop the driver.
    Shutdown,
}

/// Answers from spawned tasks.
#[derive(Debug)]
enum Completion {
    Remote(RemoteMoveReply),
    Draw(DrawReply),
}

/// The driver has stopped.
#[derive(Debug, Clone, Display, Error)]
#[display("Session driver is no longer running")]
pub struct DriverClosed;

/// Cloneable handle for sending commands to a running driver.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Sends a raw command.
    pub fn send(&self, command: SessionCommand) -> Result<(), DriverClosed> {
        self.commands.send(command).map_err(|_| DriverClosed)
    }

    /// Plays the human's move.
    pub fn play(&self, mv: ChessMove) -> Result<(), DriverClosed> {
        self.send(SessionCommand::Move(mv))
    }

    /// Asks for the remote move, e.g. after a failure.
    pub fn request_remote_move(&self) -> Result<(), DriverClosed> {
        self.send(SessionCommand::RequestRemoteMove)
    }

    /// Resigns.
    pub fn resign(&self) -> Result<(), DriverClosed> {
        self.send(SessionCommand::Resign)
    }

    /// Offers a draw.
    pub fn offer_draw(&self) -> Result<(), DriverClosed> {
        self.send(SessionCommand::OfferDraw)
    }

    /// Restarts the game.
    pub fn restart(&self) -> Result<(), DriverClosed> {
        self.send(SessionCommand::Restart)
    }

    /// Stops the driver.
    pub fn shutdown(&self) -> Result<(), DriverClosed> {
        self.send(SessionCommand::Shutdown)
    }

    /// Fetches a snapshot of the session.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, DriverClosed> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot(tx))?;
        rx.await.map_err(|_| DriverClosed)
    }

    /// Fetches the legal destinations from `origin`.
    pub async fn legal_destinations(&self, origin: Square) -> Result<Vec<Square>, DriverClosed> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::LegalDestinations(origin, tx))?;
        rx.await.map_err(|_| DriverClosed)
    }
}

/// Owns a [`GameCoordinator`] and runs its command loop.
#[derive(Debug)]
pub struct SessionDriver<R: RulesEngine> {
    coordinator: GameCoordinator<R>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    remote_delay: Duration,
}

impl<R: RulesEngine> SessionDriver<R> {
    /// Wraps `coordinator`, wiring its events to `events`.
    ///
    /// After each accepted human move the remote move is requested
    /// automatically, `remote_delay` later.
    pub fn new(
        coordinator: GameCoordinator<R>,
        events: mpsc::UnboundedSender<SessionEvent>,
        remote_delay: Duration,
    ) -> (Self, SessionHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let driver = Self {
            coordinator: coordinator.with_events(events.clone()),
            commands,
            events,
            completions_tx,
            completions_rx,
            remote_delay,
        };
        (driver, SessionHandle { commands: commands_tx })
    }

    /// Runs until shut down or every handle is dropped, then hands the
    /// coordinator back.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> GameCoordinator<R> {
        info!("Session driver started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                Some(completion) = self.completions_rx.recv() => self.complete(completion),
            }
        }
        info!("Session driver stopped");
        self.coordinator
    }

    fn handle(&mut self, command: SessionCommand) {
        debug!(?command, "Handling command");
        match command {
            SessionCommand::Move(mv) => match self.coordinator.apply_move(mv) {
                Ok(applied) if *applied.phase() == Phase::AwaitingRemoteMove => {
                    self.dispatch_remote(self.remote_delay);
                }
                Ok(_) => {}
                Err(e) => self.reject(e),
            },
            SessionCommand::RequestRemoteMove => self.dispatch_remote(Duration::ZERO),
            SessionCommand::Resign => {
                if let Err(e) = self.coordinator.resign() {
                    self.reject(e);
                }
            }
            SessionCommand::OfferDraw => match self.coordinator.begin_draw_offer() {
                Ok(offer) => {
                    let completions = self.completions_tx.clone();
                    tokio::spawn(async move {
                        let reply = offer.evaluate().await;
                        let _ = completions.send(Completion::Draw(reply));
                    });
                }
                Err(e) => self.reject(e),
            },
            SessionCommand::Restart => {
                self.coordinator.restart();
            }
            SessionCommand::Snapshot(reply) => {
                let _ = reply.send(self.coordinator.snapshot());
            }
            SessionCommand::LegalDestinations(origin, reply) => {
                let _ = reply.send(self.coordinator.legal_destinations(origin));
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn dispatch_remote(&mut self, delay: Duration) {
        let request = match self.coordinator.begin_remote_move() {
            Ok(request) => request,
            Err(e) => return self.reject(e),
        };

        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let reply = request.dispatch().await;
            let _ = completions.send(Completion::Remote(reply));
        });
    }

    fn complete(&mut self, completion: Completion) {
        let result = match completion {
            Completion::Remote(reply) => self.coordinator.complete_remote_move(reply).map(|_| ()),
            Completion::Draw(reply) => self.coordinator.resolve_draw_offer(reply).map(|_| ()),
        };
        match result {
            Ok(()) => {}
            Err(SessionError::Stale { ticket }) => debug!(%ticket, "Dropped stale completion"),
            // Already reported as a RemoteFailed event.
            Err(SessionError::Remote(_)) => {}
            Err(e) => self.reject(e),
        }
    }

    fn reject(&self, e: SessionError) {
        warn!(error = %e, "Command rejected");
        let _ = self.events.send(SessionEvent::Rejected {
            reason: e.to_string(),
        });
    }
}
