//! Notation codec: encodes applied moves into compact algebraic tokens
//! for the transcript and decodes the suggestion service's free-text
//! replies back into board moves.
//!
//! Decoding classifies one token against an ordered list of shapes;
//! the first match wins. Order matters because shapes overlap: the
//! castling literals are tested before the generic piece shapes, and
//! `O-O-O` before its prefix `O-O`. A trailing check suffix is peeled by
//! a bounded loop before any shape matching.

use crate::chess::board::Board;
use crate::chess::core::{Coordinate, PieceKind, Player, BOARD_WIDTH};
use crate::chess::rules::{self, MoveRecord};

/// A decoded suggestion: the piece kind to look for, the target square,
/// and an optional source-file disambiguation hint (present in shapes
/// like `Ngf3` or `exd5`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hint {
    #[allow(missing_docs)]
    pub kind: PieceKind,
    #[allow(missing_docs)]
    pub destination: Coordinate,
    /// Column the mover must stand on, when the token named one.
    pub source_file: Option<i8>,
}

/// Serializes an applied move:
/// `{letter}{x?}{file}{rank}{=Q?}` with the source file prefixed for
/// pawn captures, the castling literal overriding everything else, and
/// `+` appended when the resulting position checks the opponent.
#[must_use]
pub fn encode(record: &MoveRecord, gives_check: bool) -> String {
    let mut token = match record.castled {
        Some(side) => side.token().to_string(),
        None => {
            let mut token = String::new();
            token.push_str(record.piece.kind.letter());
            if record.captured.is_some() {
                if record.piece.kind == PieceKind::Pawn {
                    token.push(record.from.file());
                }
                token.push('x');
            }
            token.push(record.to.file());
            token.push(record.to.rank());
            if record.promoted {
                token.push_str("=Q");
            }
            token
        }
    };
    if gives_check {
        token.push('+');
    }
    token
}

/// Prefixes the token with the full-move number when it opens a full
/// move (plies 0, 2, 4, ...). The numbering is coupled to two-ply
/// alternation: `ply` must be the count of half-moves already recorded.
#[must_use]
pub fn numbered(ply: usize, token: &str) -> String {
    if ply % 2 == 0 {
        format!("{}. {token}", ply / 2 + 1)
    } else {
        token.to_string()
    }
}

/// Extracts the most plausible move token from a free-text reply: strips
/// the `"..."` speaker marker the suggester is instructed to prefix, and
/// takes the first whitespace-separated word of what remains.
fn candidate_token(reply: &str) -> Option<&str> {
    let trimmed = reply.trim();
    let trimmed = trimmed.strip_prefix("...").unwrap_or(trimmed);
    trimmed.split_whitespace().next()
}

/// Classifies a free-text reply into a [`Hint`] for `side`, or `None`
/// when no known token shape matches. Never fails hard: arbitrary text
/// simply decodes to nothing.
#[must_use]
pub fn decode(reply: &str, side: Player) -> Option<Hint> {
    let mut token = candidate_token(reply)?;
    // Check/mate suffixes carry no targeting information.
    while let Some(stripped) = token.strip_suffix('+').or_else(|| token.strip_suffix('#')) {
        token = stripped;
    }
    let back = side.back_rank();
    if token == "O-O-O" || token == "0-0-0" {
        return Some(Hint {
            kind: PieceKind::King,
            destination: Coordinate::new(back, 2),
            source_file: None,
        });
    }
    if token == "O-O" || token == "0-0" {
        return Some(Hint {
            kind: PieceKind::King,
            destination: Coordinate::new(back, 6),
            source_file: None,
        });
    }
    match token.as_bytes() {
        // Bare pawn move: "e4".
        [file, rank] => hint(PieceKind::Pawn, *file, *rank, None),
        // Pawn capture with source file: "exd5".
        [source, b'x', file, rank] if is_file(*source) => {
            hint(PieceKind::Pawn, *file, *rank, Some(*source))
        }
        // Piece move: "Nf3".
        [letter, file, rank] => hint(piece_kind(*letter)?, *file, *rank, None),
        // Piece capture: "Nxf3".
        [letter, b'x', file, rank] => hint(piece_kind(*letter)?, *file, *rank, None),
        // Pawn promotion: "e8=Q".
        [file, rank, b'=', b'Q'] => hint(PieceKind::Pawn, *file, *rank, None),
        // Disambiguated piece move: "Ngf3".
        [letter, source, file, rank] if is_file(*source) => {
            hint(piece_kind(*letter)?, *file, *rank, Some(*source))
        }
        // Disambiguated piece capture: "Ngxf3".
        [letter, source, b'x', file, rank] if is_file(*source) => {
            hint(piece_kind(*letter)?, *file, *rank, Some(*source))
        }
        _ => None,
    }
}

/// Resolves a hint to a concrete `(source, destination)` pair: scans the
/// board in row-major order and returns the first piece of the hinted
/// kind and color whose move to the destination passes the full
/// legality check, narrowed by the source-file hint when one was
/// parsed. No match means the suggestion is discarded.
#[must_use]
pub fn resolve(board: &Board, side: Player, hint: &Hint) -> Option<(Coordinate, Coordinate)> {
    board
        .pieces(side)
        .into_iter()
        .filter(|(_, piece)| piece.kind == hint.kind)
        .filter(|(from, _)| hint.source_file.map_or(true, |file| from.col == file))
        .find(|&(from, piece)| rules::is_move_valid(board, piece, from, hint.destination))
        .map(|(from, _)| (from, hint.destination))
}

fn hint(kind: PieceKind, file: u8, rank: u8, source: Option<u8>) -> Option<Hint> {
    Some(Hint {
        kind,
        destination: square(file, rank)?,
        source_file: source.map(|byte| (byte - b'a') as i8),
    })
}

fn is_file(byte: u8) -> bool {
    byte.is_ascii_lowercase() && byte <= b'h'
}

fn square(file: u8, rank: u8) -> Option<Coordinate> {
    if !is_file(file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some(Coordinate::new(
        BOARD_WIDTH - (rank - b'0') as i8,
        (file - b'a') as i8,
    ))
}

fn piece_kind(letter: u8) -> Option<PieceKind> {
    PieceKind::try_from(char::from(letter)).ok()
}
