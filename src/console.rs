//! Line-oriented terminal front-end.
//!
//! Reads commands from stdin, forwards them to a [`SessionDriver`] and
//! prints the events it sends back.

use anyhow::{Result, bail};
use std::sync::Arc;
use strictly_chess::{
    ArenaConfig, ChessMove, CoinFlipPolicy, GameCoordinator, HttpRecommendationClient, MoveRecord,
    RecommendationService, RulesEngine, Seat, SessionDriver, SessionEvent, SessionHandle,
    SessionSnapshot, Square, StandardRules,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Chance the remote side accepts a draw offer.
const DRAW_ACCEPTANCE: f64 = 0.5;

/// Something typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
enum Input {
    Move(ChessMove),
    Moves(Square),
    Resign,
    Draw,
    Retry,
    Restart,
    History,
    Board,
    Help,
    Quit,
}

impl Input {
    fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Err("Empty command".to_string());
        };
        let input = match first.to_ascii_lowercase().as_str() {
            "moves" => {
                let square = words
                    .next()
                    .ok_or_else(|| "Usage: moves <square>".to_string())?;
                let square = square
                    .parse::<Square>()
                    .map_err(|_| format!("Not a board square: {}", square))?;
                Input::Moves(square)
            }
            "resign" => Input::Resign,
            "draw" => Input::Draw,
            "retry" => Input::Retry,
            "restart" | "new" => Input::Restart,
            "history" => Input::History,
            "board" => Input::Board,
            "help" | "?" => Input::Help,
            "quit" | "exit" => Input::Quit,
            text => Input::Move(text.parse::<ChessMove>().map_err(|e| e.to_string())?),
        };
        Ok(input)
    }
}

/// Plays one session in the terminal until the player quits.
#[instrument(skip_all, fields(player = %config.player_name()))]
pub async fn play(config: ArenaConfig) -> Result<()> {
    let client = Arc::new(HttpRecommendationClient::new(
        config.engine_url(),
        Some(config.request_timeout()),
    )?);

    if let Err(e) = client.health().await {
        warn!(error = %e, "Recommendation service health check failed");
        println!("Warning: {} is not answering ({}).", config.engine_url(), e.message);
    }

    let draw_policy = CoinFlipPolicy::new(config.draw_decision_delay(), DRAW_ACCEPTANCE);
    let mut coordinator = GameCoordinator::new(StandardRules, client.clone(), Arc::new(draw_policy))
        .with_search_depth(*config.search_depth());

    if let Some(fen) = config.start_fen() {
        match client.validate_fen(fen).await {
            Ok(false) => bail!("The service rejected the starting position: {}", fen),
            Ok(true) => debug!("Starting position validated by service"),
            Err(e) => warn!(error = %e, "Could not validate starting position remotely"),
        }
        let position = StandardRules.from_fen(fen)?;
        coordinator = coordinator.starting_from(position)?;
    }

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (driver, handle) = SessionDriver::new(coordinator, events_tx, config.remote_move_delay());
    let driver = tokio::spawn(driver.run());

    println!("{} (White) vs {} (Black)", config.player_name(), config.engine_url());
    print_help();
    print_board(&handle.snapshot().await?);
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    prompt();
                    continue;
                }
                match Input::parse(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => handle_input(&handle, input).await?,
                    Err(message) => println!("{}", message),
                }
                prompt();
            }
            Some(event) = events.recv() => {
                print_event(&event, config.player_name());
                if matches!(event, SessionEvent::MoveApplied { seat: Seat::Remote, .. }) {
                    print_board(&handle.snapshot().await?);
                    prompt();
                }
            }
        }
    }

    handle.shutdown()?;
    let coordinator = driver.await?;
    info!(records = coordinator.records().len(), "Session finished");
    println!("Goodbye.");
    Ok(())
}

async fn handle_input(handle: &SessionHandle, input: Input) -> Result<()> {
    debug!(?input, "Console input");
    match input {
        Input::Move(mv) => handle.play(mv)?,
        Input::Moves(square) => {
            let destinations = handle.legal_destinations(square).await?;
            if destinations.is_empty() {
                println!("No legal moves from {}.", square);
            } else {
                let names: Vec<String> = destinations.iter().map(Square::to_string).collect();
                println!("{} -> {}", square, names.join(" "));
            }
        }
        Input::Resign => handle.resign()?,
        Input::Draw => handle.offer_draw()?,
        Input::Retry => handle.request_remote_move()?,
        Input::Restart => handle.restart()?,
        Input::History => print_history(handle.snapshot().await?.records()),
        Input::Board => print_board(&handle.snapshot().await?),
        Input::Help => print_help(),
        Input::Quit => {}
    }
    Ok(())
}

fn prompt() {
    print!("> ");
    use std::io::Write as _;
    let _ = std::io::stdout().flush();
}

fn print_help() {
    println!("Commands: e2e4 | e7e8q | moves <square> | resign | draw | retry | restart | history | board | quit");
}

fn print_event(event: &SessionEvent, player: &str) {
    match event {
        SessionEvent::MoveApplied { seat, index, san, .. } => match seat {
            Seat::Human => println!("{}. {} ({})", index, san, player),
            Seat::Remote => println!("{}. ... {} (engine)", index, san),
        },
        SessionEvent::RemoteThinking { .. } => println!("Engine is thinking..."),
        SessionEvent::Evaluation { centipawns, mate } => {
            if let Some(text) = evaluation_text(*centipawns, *mate) {
                println!("Evaluation: {}", text);
            }
        }
        SessionEvent::RemoteFailed { kind, message } => {
            println!("Engine error ({}): {}. Type 'retry' to ask again.", kind, message)
        }
        SessionEvent::DrawOffered => println!("Draw offered, waiting for an answer..."),
        SessionEvent::DrawDeclined => println!("Draw declined. Play on."),
        SessionEvent::GameOver(termination) => println!("Game over: {}.", termination),
        SessionEvent::Rejected { reason } => println!("Rejected: {}", reason),
        SessionEvent::Restarted => println!("New game."),
    }
}

/// Formats an evaluation: `Mate in 3`, `+0.35`.
fn evaluation_text(centipawns: Option<f64>, mate: Option<i32>) -> Option<String> {
    match (mate, centipawns) {
        (Some(mate), _) => Some(format!("Mate in {}", mate.abs())),
        (None, Some(cp)) => Some(format!("{:+.2}", cp / 100.0)),
        (None, None) => None,
    }
}

fn print_history(records: &[MoveRecord]) {
    if records.is_empty() {
        println!("No moves yet.");
        return;
    }
    for record in records {
        match record.remote() {
            Some(remote) => println!("{:>3}. {:<8} {}", record.index(), record.human(), remote),
            None => println!("{:>3}. {}", record.index(), record.human()),
        }
    }
}

fn print_board(snapshot: &SessionSnapshot) {
    match render_board(snapshot.fen()) {
        Some(board) => println!("{}", board),
        None => println!("{}", snapshot.fen()),
    }
    println!("{} to move", snapshot.side_to_move());
}

/// Draws the piece placement of `fen` as text, White at the bottom.
fn render_board(fen: &str) -> Option<String> {
    let placement = fen.split_whitespace().next()?;
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return None;
    }

    let mut out = String::new();
    for (i, rank) in ranks.iter().enumerate() {
        out.push_str(&format!("{} ", 8 - i));
        for c in rank.chars() {
            match c.to_digit(10) {
                Some(empty) => (0..empty).for_each(|_| out.push_str(" .")),
                None => {
                    out.push(' ');
                    out.push(c);
                }
            }
        }
        out.push('\n');
    }
    out.push_str("   a b c d e f g h");
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_moves() {
        assert_eq!(
            Input::parse("e2e4"),
            Ok(Input::Move(ChessMove::new(Square::E2, Square::E4)))
        );
        assert_eq!(Input::parse("moves e2"), Ok(Input::Moves(Square::E2)));
        assert_eq!(Input::parse("RESIGN"), Ok(Input::Resign));
        assert_eq!(Input::parse("quit"), Ok(Input::Quit));
        assert!(Input::parse("moves").is_err());
        assert!(Input::parse("castle").is_err());
    }

    #[test]
    fn renders_starting_board() {
        let board = render_board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        let lines: Vec<&str> = board.lines().collect();
        assert_eq!(lines[0], "8  r n b q k b n r");
        assert_eq!(lines[4], "4  . . . . . . . .");
        assert_eq!(lines[7], "1  R N B Q K B N R");
        assert_eq!(lines[8], "   a b c d e f g h");
    }

    #[test]
    fn formats_evaluations() {
        assert_eq!(evaluation_text(Some(35.0), None).as_deref(), Some("+0.35"));
        assert_eq!(evaluation_text(Some(-120.0), None).as_deref(), Some("-1.20"));
        assert_eq!(evaluation_text(Some(0.0), Some(-3)).as_deref(), Some("Mate in 3"));
        assert_eq!(evaluation_text(None, None), None);
    }
}
