//! Game orchestration: alternates turns, keeps the transcript and
//! reconciles suggested replies against the legality engine.

use crate::chess::board::Board;
use crate::chess::core::{Coordinate, Player};
use crate::chess::notation;
use crate::chess::rules;

/// Position judgement for the side whose turn it is.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    /// The side to move is in check but has an escape.
    Check,
    /// The side to move is in check with no escape; the opponent won.
    Checkmate,
    /// The side to move is not in check but has no legal move; draw.
    Stalemate,
}

/// One game of chess: the board, whose turn it is, and the append-only
/// transcript of notation tokens. Turn alternation is enforced here, not
/// left to callers: a move by the side not on turn is rejected outright.
pub struct Game {
    board: Board,
    side_to_move: Player,
    transcript: Vec<String>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A fresh game from the standard starting position, White to move.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::starting(),
            side_to_move: Player::White,
            transcript: Vec::new(),
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    /// Notation tokens of every half-move so far, in order.
    #[must_use]
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// The history serialized the way the suggestion service consumes
    /// it: numbered tokens joined by single spaces.
    #[must_use]
    pub fn transcript_text(&self) -> String {
        self.transcript.join(" ")
    }

    /// Attempts a move for the side to move. Returns `false` and changes
    /// nothing when the source square is empty, the piece belongs to the
    /// opponent, or the move fails the legality check.
    pub fn try_move(&mut self, from: Coordinate, to: Coordinate) -> bool {
        let Some(piece) = self.board.piece_at(from) else {
            return false;
        };
        if piece.color != self.side_to_move {
            return false;
        }
        if !rules::is_move_valid(&self.board, piece, from, to) {
            return false;
        }
        self.commit(from, to);
        true
    }

    /// Decodes and resolves a raw suggestion for the side to move and
    /// applies it when it survives the legality check. Returns the
    /// applied `(source, destination)` pair, or `None` with the game
    /// untouched when the text is unparsable or names no legal move.
    pub fn play_reply(&mut self, reply: &str) -> Option<(Coordinate, Coordinate)> {
        let hint = notation::decode(reply, self.side_to_move)?;
        let (from, to) = notation::resolve(&self.board, self.side_to_move, &hint)?;
        self.commit(from, to);
        Some((from, to))
    }

    /// Judges the position for the side to move.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        if rules::is_checkmate(&self.board, self.side_to_move) {
            GameStatus::Checkmate
        } else if rules::in_check(&self.board, self.side_to_move) {
            GameStatus::Check
        } else if rules::is_stalemate(&self.board, self.side_to_move) {
            GameStatus::Stalemate
        } else {
            GameStatus::InProgress
        }
    }

    fn commit(&mut self, from: Coordinate, to: Coordinate) {
        let record = rules::apply_move(&mut self.board, from, to)
            .expect("commit is only reached for validated moves");
        let gives_check = rules::in_check(&self.board, self.side_to_move.opponent());
        let token = notation::encode(&record, gives_check);
        self.transcript
            .push(notation::numbered(self.transcript.len(), &token));
        self.side_to_move = self.side_to_move.opponent();
    }
}
