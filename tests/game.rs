//! Orchestration tests: turn enforcement, transcript bookkeeping and
//! reconciliation of suggested replies.

use gambit::chess::core::{Coordinate, PieceKind, Player};
use gambit::chess::game::{Game, GameStatus};
use pretty_assertions::assert_eq;

fn at(square: &str) -> Coordinate {
    Coordinate::try_from(square).unwrap()
}

fn mv(game: &mut Game, from: &str, to: &str) {
    assert!(
        game.try_move(at(from), at(to)),
        "{from} -> {to} should be accepted"
    );
}

#[test]
fn turns_alternate_and_are_enforced() {
    let mut game = Game::new();
    // Black may not open the game.
    assert!(!game.try_move(at("e7"), at("e5")));
    mv(&mut game, "e2", "e4");
    // White may not move twice in a row.
    assert!(!game.try_move(at("d2"), at("d4")));
    assert_eq!(game.side_to_move(), Player::Black);
    mv(&mut game, "e7", "e5");
    assert_eq!(game.side_to_move(), Player::White);
}

#[test]
fn illegal_moves_change_nothing() {
    let mut game = Game::new();
    let before = game.board().clone();
    assert!(!game.try_move(at("e2"), at("e5")));
    assert!(!game.try_move(at("e4"), at("e5")));
    assert_eq!(*game.board(), before);
    assert!(game.transcript().is_empty());
    assert_eq!(game.side_to_move(), Player::White);
}

#[test]
fn fools_mate_transcript_and_status() {
    let mut game = Game::new();
    mv(&mut game, "f2", "f3");
    mv(&mut game, "e7", "e5");
    mv(&mut game, "g2", "g4");
    mv(&mut game, "d8", "h4");
    assert_eq!(game.transcript_text(), "1. f3 e5 2. g4 Qh4+");
    assert_eq!(game.side_to_move(), Player::White);
    assert_eq!(game.status(), GameStatus::Checkmate);
}

#[test]
fn check_status_reported_for_side_to_move() {
    let mut game = Game::new();
    mv(&mut game, "e2", "e4");
    mv(&mut game, "d7", "d6");
    mv(&mut game, "f1", "b5");
    assert_eq!(game.side_to_move(), Player::Black);
    assert_eq!(game.status(), GameStatus::Check);
    assert_eq!(game.transcript_text(), "1. e4 d6 2. Bb5+");
}

#[test]
fn replies_are_decoded_resolved_and_applied() {
    let mut game = Game::new();
    mv(&mut game, "f2", "f3");
    let applied = game.play_reply("... e5");
    assert_eq!(applied, Some((at("e7"), at("e5"))));
    assert_eq!(game.transcript_text(), "1. f3 e5");
    assert_eq!(game.side_to_move(), Player::White);
    assert_eq!(
        game.board().piece_at(at("e5")).map(|piece| piece.kind),
        Some(PieceKind::Pawn)
    );
}

#[test]
fn malformed_replies_leave_the_game_untouched() {
    let mut game = Game::new();
    mv(&mut game, "e2", "e4");
    let before = game.board().clone();
    for reply in [
        "",
        "I resign",
        "knight to somewhere",
        "e9",
        "... Qh4", // unreachable from the starting position
    ] {
        assert_eq!(game.play_reply(reply), None, "reply: {reply:?}");
        assert_eq!(*game.board(), before);
        assert_eq!(game.side_to_move(), Player::Black);
    }
    assert_eq!(game.transcript_text(), "1. e4");
}

#[test]
fn suggested_castle_is_executed_atomically() {
    let mut game = Game::new();
    // Shuttle white pieces while Black clears its kingside.
    mv(&mut game, "a2", "a3");
    mv(&mut game, "e7", "e5");
    mv(&mut game, "a3", "a4");
    mv(&mut game, "g8", "f6");
    mv(&mut game, "a4", "a5");
    mv(&mut game, "f8", "e7");
    mv(&mut game, "b2", "b3");
    let applied = game.play_reply("... O-O");
    assert_eq!(applied, Some((at("e8"), at("g8"))));
    assert_eq!(
        game.board().piece_at(at("g8")).map(|piece| piece.kind),
        Some(PieceKind::King)
    );
    assert_eq!(
        game.board().piece_at(at("f8")).map(|piece| piece.kind),
        Some(PieceKind::Rook)
    );
    assert_eq!(game.board().piece_at(at("h8")), None);
    assert!(game.transcript_text().ends_with("O-O"));
}

#[test]
fn reply_numbering_stays_in_lockstep() {
    let mut game = Game::new();
    mv(&mut game, "e2", "e4");
    game.play_reply("... e5").unwrap();
    mv(&mut game, "g1", "f3");
    game.play_reply("... Nc6").unwrap();
    assert_eq!(game.transcript_text(), "1. e4 e5 2. Nf3 Nc6");
}
