//! Interactive two-player loop: White moves come from stdin as
//! coordinate pairs (`e2e4`), Black's from the suggestion service when
//! one is configured.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use gambit::chess::core::Coordinate;
use gambit::chess::game::{Game, GameStatus};
use gambit::oracle::{MoveSuggester, OpenAiSuggester};
use itertools::Itertools;
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("gambit {}", env!("CARGO_PKG_VERSION"));
    let suggester = OpenAiSuggester::from_env();
    if suggester.is_none() {
        println!("OPENAI_API_KEY is not set; black moves must be typed in as well.");
    }

    let mut game = Game::new();
    println!("{}", game.board());
    prompt(&game)?;
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "" => {}
            "quit" | "exit" => break,
            "board" | "d" => println!("{}", game.board()),
            "history" => println!("{}", game.transcript_text()),
            input => {
                if play_turn(&mut game, suggester.as_ref(), input) {
                    break;
                }
            }
        }
        prompt(&game)?;
    }
    Ok(())
}

/// Plays one human half-move and, when a suggester is configured and it
/// is Black's turn afterwards, one reply. Returns true once the game is
/// over.
fn play_turn(game: &mut Game, suggester: Option<&OpenAiSuggester>, input: &str) -> bool {
    let (from, to) = match parse_move(input) {
        Ok(squares) => squares,
        Err(error) => {
            println!("{error}");
            return false;
        }
    };
    if !game.try_move(from, to) {
        println!("illegal move: {input}");
        return false;
    }
    info!(%from, %to, "move applied");
    println!("{}", game.board());
    if announce(game) {
        return true;
    }
    if let Some(suggester) = suggester {
        respond(game, suggester);
        println!("{}", game.board());
        if announce(game) {
            return true;
        }
    }
    false
}

/// Asks the suggester for a reply and reconciles it against the
/// legality engine. Every failure mode ends the same way: no move this
/// ply, board unchanged.
fn respond(game: &mut Game, suggester: &impl MoveSuggester) {
    let reply = match suggester.suggest(&game.transcript_text()) {
        Ok(reply) => reply,
        Err(error) => {
            warn!(error = %error, "no suggestion this ply");
            return;
        }
    };
    match game.play_reply(&reply) {
        Some((from, to)) => println!("{} plays {from}{to} ({reply})", game.side_to_move().opponent()),
        None => warn!(reply = %reply, "suggestion did not resolve to a legal move"),
    }
}

/// Parses an `e2e4`-style source/destination pair.
fn parse_move(input: &str) -> anyhow::Result<(Coordinate, Coordinate)> {
    let (from_file, from_rank, to_file, to_rank) = input
        .chars()
        .collect_tuple()
        .with_context(|| format!("expected a move like e2e4, got \"{input}\""))?;
    Ok((
        Coordinate::try_from((from_file, from_rank))?,
        Coordinate::try_from((to_file, to_rank))?,
    ))
}

/// Reports terminal states; returns true when the game ended.
fn announce(game: &Game) -> bool {
    match game.status() {
        GameStatus::Checkmate => {
            println!("checkmate, {} wins", game.side_to_move().opponent());
            true
        }
        GameStatus::Stalemate => {
            println!("stalemate");
            true
        }
        GameStatus::Check => {
            println!("{} is in check", game.side_to_move());
            false
        }
        GameStatus::InProgress => false,
    }
}

fn prompt(game: &Game) -> io::Result<()> {
    print!("{}> ", game.side_to_move());
    io::stdout().flush()
}
