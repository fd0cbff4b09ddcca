//! Move legality engine: raw destination generation, path obstruction,
//! check-safety filtering, castling, promotion and mate detection.
//!
//! Every query is a pure computation over the [`Board`] it is given; no
//! state survives between calls. A candidate move passes through three
//! stages: raw generation by movement shape, a delta-based obstruction
//! re-check, and a king-safety simulation on a cloned board. The
//! simulation is deliberately absent from check *detection* itself:
//! "does any opposing raw move hit the king" never asks whether that
//! opposing move would be fully legal, which keeps the recursion
//! bounded.

use arrayvec::ArrayVec;

use crate::chess::board::Board;
use crate::chess::core::{CastlingSide, Coordinate, Piece, PieceKind, Player};

/// Upper bound on raw destinations for a single piece (a centralized
/// queen reaches 27 squares).
const MAX_RAW_MOVES: usize = 27;

/// Destination list produced by [`raw_moves`].
pub type RawMoves = ArrayVec<Coordinate, MAX_RAW_MOVES>;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ORTHOGONAL_RAYS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL_RAYS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Destinations reachable by the piece's movement shape, ignoring
/// whether the move would leave the mover's own king in check. Squares
/// holding a same-color piece are never offered; the source square is
/// never offered.
#[must_use]
pub fn raw_moves(board: &Board, piece: Piece, from: Coordinate) -> RawMoves {
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, piece, from),
        PieceKind::Knight => leaper_moves(board, piece, from, &KNIGHT_OFFSETS),
        PieceKind::King => leaper_moves(board, piece, from, &KING_OFFSETS),
        PieceKind::Rook => slider_moves(board, piece, from, &ORTHOGONAL_RAYS),
        PieceKind::Bishop => slider_moves(board, piece, from, &DIAGONAL_RAYS),
        PieceKind::Queen => {
            let mut moves = slider_moves(board, piece, from, &ORTHOGONAL_RAYS);
            moves.extend(slider_moves(board, piece, from, &DIAGONAL_RAYS));
            moves
        }
    }
}

fn pawn_moves(board: &Board, pawn: Piece, from: Coordinate) -> RawMoves {
    let mut moves = RawMoves::new();
    let direction = pawn.color.pawn_direction();
    let ahead = from.offset(direction, 0);
    if ahead.is_on_board() && board.piece_at(ahead).is_none() {
        moves.push(ahead);
        // Double step from the starting rank, with both squares free.
        if from.row == pawn.color.pawn_row() {
            let jump = from.offset(2 * direction, 0);
            if jump.is_on_board() && board.piece_at(jump).is_none() {
                moves.push(jump);
            }
        }
    }
    // Diagonals are captures only: offered just when an opposing piece
    // occupies them.
    for cols in [-1, 1] {
        let target = from.offset(direction, cols);
        if let Some(occupant) = board.piece_at(target) {
            if occupant.color != pawn.color {
                moves.push(target);
            }
        }
    }
    moves
}

fn leaper_moves(board: &Board, piece: Piece, from: Coordinate, offsets: &[(i8, i8)]) -> RawMoves {
    let mut moves = RawMoves::new();
    for &(rows, cols) in offsets {
        let target = from.offset(rows, cols);
        if !target.is_on_board() {
            continue;
        }
        match board.piece_at(target) {
            Some(occupant) if occupant.color == piece.color => {}
            _ => moves.push(target),
        }
    }
    moves
}

fn slider_moves(board: &Board, piece: Piece, from: Coordinate, rays: &[(i8, i8)]) -> RawMoves {
    let mut moves = RawMoves::new();
    for &(rows, cols) in rays {
        let mut target = from.offset(rows, cols);
        while target.is_on_board() {
            match board.piece_at(target) {
                None => moves.push(target),
                Some(occupant) => {
                    if occupant.color != piece.color {
                        moves.push(target);
                    }
                    break;
                }
            }
            target = target.offset(rows, cols);
        }
    }
    moves
}

/// Re-derives, from the source/destination deltas alone, whether the
/// geometric shape is legal for the piece kind and whether the path to
/// the destination is free. This intentionally re-checks what
/// [`raw_moves`] already guarantees; the two run from independent
/// derivations.
#[must_use]
pub fn is_blocked(board: &Board, piece: Piece, from: Coordinate, to: Coordinate) -> bool {
    let rows = to.row - from.row;
    let cols = to.col - from.col;
    match piece.kind {
        PieceKind::Pawn => pawn_blocked(board, piece, from, to, rows, cols),
        PieceKind::Knight => {
            own_piece_at(board, piece, to)
                || !((rows.abs() == 2 && cols.abs() == 1) || (rows.abs() == 1 && cols.abs() == 2))
        }
        PieceKind::King => own_piece_at(board, piece, to) || rows.abs() > 1 || cols.abs() > 1,
        PieceKind::Rook => {
            !((rows == 0) ^ (cols == 0))
                || own_piece_at(board, piece, to)
                || path_obstructed(board, from, to)
        }
        PieceKind::Bishop => {
            rows == 0
                || rows.abs() != cols.abs()
                || own_piece_at(board, piece, to)
                || path_obstructed(board, from, to)
        }
        PieceKind::Queen => {
            let straight = (rows == 0) ^ (cols == 0);
            let diagonal = rows != 0 && rows.abs() == cols.abs();
            (!straight && !diagonal)
                || own_piece_at(board, piece, to)
                || path_obstructed(board, from, to)
        }
    }
}

fn pawn_blocked(
    board: &Board,
    pawn: Piece,
    from: Coordinate,
    to: Coordinate,
    rows: i8,
    cols: i8,
) -> bool {
    let direction = pawn.color.pawn_direction();
    if cols == 0 {
        if rows == direction {
            // Forward moves never capture.
            return board.piece_at(to).is_some();
        }
        if rows == 2 * direction && from.row == pawn.color.pawn_row() {
            return board.piece_at(from.offset(direction, 0)).is_some()
                || board.piece_at(to).is_some();
        }
        true
    } else if cols.abs() == 1 && rows == direction {
        // Diagonal steps require an opposing occupant.
        !matches!(board.piece_at(to), Some(occupant) if occupant.color != pawn.color)
    } else {
        true
    }
}

fn own_piece_at(board: &Board, piece: Piece, to: Coordinate) -> bool {
    matches!(board.piece_at(to), Some(occupant) if occupant.color == piece.color)
}

/// Whether any square strictly between `from` and `to` is occupied.
/// Only meaningful for straight or diagonal lines; shape validation
/// happens before this is consulted.
fn path_obstructed(board: &Board, from: Coordinate, to: Coordinate) -> bool {
    let rows = (to.row - from.row).signum();
    let cols = (to.col - from.col).signum();
    let mut cursor = from.offset(rows, cols);
    while cursor != to && cursor.is_on_board() {
        if board.piece_at(cursor).is_some() {
            return true;
        }
        cursor = cursor.offset(rows, cols);
    }
    false
}

/// Full legality check for a single candidate move: the supplied piece
/// must match the occupant of the source square, the destination must
/// pass raw generation and the obstruction re-check (or be a legal
/// castle), and the mover's king must not be attacked afterwards.
///
/// Rejection never mutates the board, and repeating the same query on
/// the same board always returns the same answer.
#[must_use]
pub fn is_move_valid(board: &Board, piece: Piece, from: Coordinate, to: Coordinate) -> bool {
    // Trust the board, not the caller: the occupant carries the
    // authoritative `has_moved` state.
    let piece = match board.piece_at(from) {
        Some(occupant) if occupant.kind == piece.kind && occupant.color == piece.color => occupant,
        _ => return false,
    };
    if from == to || !to.is_on_board() {
        return false;
    }
    // Castling is a two-file king move; it is recognized before the
    // per-square generation, which knows nothing about it.
    if let Some(side) = castling_request(piece, from, to) {
        return castle_allowed(board, piece.color, side)
            && !castle_exposes_king(board, piece.color, side);
    }
    if !raw_moves(board, piece, from).contains(&to) {
        return false;
    }
    if is_blocked(board, piece, from, to) {
        return false;
    }
    !leaves_king_exposed(board, piece, from, to)
}

fn castling_request(king: Piece, from: Coordinate, to: Coordinate) -> Option<CastlingSide> {
    if king.kind != PieceKind::King || king.has_moved {
        return None;
    }
    let back = king.color.back_rank();
    if from.row != back || to.row != back || from.col != 4 {
        return None;
    }
    match to.col - from.col {
        2 => Some(CastlingSide::Kingside),
        -2 => Some(CastlingSide::Queenside),
        _ => None,
    }
}

/// Castling eligibility for one corner: unmoved king on its starting
/// square, the corner rook still there and never moved (per the board's
/// corner flags), and every square strictly between them empty.
#[must_use]
pub fn castle_allowed(board: &Board, color: Player, side: CastlingSide) -> bool {
    let back = color.back_rank();
    match board.piece_at(Coordinate::new(back, 4)) {
        Some(piece) if piece.kind == PieceKind::King && piece.color == color && !piece.has_moved => {
        }
        _ => return false,
    }
    if !board.rook_undisturbed(color, side) {
        return false;
    }
    match board.piece_at(Coordinate::new(back, side.corner_col())) {
        Some(piece) if piece.kind == PieceKind::Rook && piece.color == color => {}
        _ => return false,
    }
    let between = match side {
        CastlingSide::Queenside => 1..4,
        CastlingSide::Kingside => 5..7,
    };
    between
        .into_iter()
        .all(|col| board.piece_at(Coordinate::new(back, col)).is_none())
}

fn castle_exposes_king(board: &Board, color: Player, side: CastlingSide) -> bool {
    let mut probe = board.clone();
    execute_castle(&mut probe, color, side);
    in_check(&probe, color)
}

fn leaves_king_exposed(board: &Board, piece: Piece, from: Coordinate, to: Coordinate) -> bool {
    let mut probe = board.clone();
    let moved = probe.take(from);
    probe.place(to, moved);
    in_check(&probe, piece.color)
}

/// Whether `color`'s king square appears in any opposing piece's raw
/// destination list. Opposing moves are *not* themselves filtered for
/// legality here.
///
/// # Panics
///
/// Panics when the board holds no king of the given color; that is a
/// broken game invariant, not a gameplay input.
#[must_use]
pub fn in_check(board: &Board, color: Player) -> bool {
    let king_square = board
        .king_square(color)
        .expect("a game board always holds both kings");
    board
        .pieces(color.opponent())
        .into_iter()
        .any(|(from, piece)| raw_moves(board, piece, from).contains(&king_square))
}

/// True when `color` is in check and every raw, unobstructed move by any
/// of its pieces still leaves the king attacked. The enumeration
/// short-circuits on the first escaping move.
#[must_use]
pub fn is_checkmate(board: &Board, color: Player) -> bool {
    if !in_check(board, color) {
        return false;
    }
    for (from, piece) in board.pieces(color) {
        for to in raw_moves(board, piece, from) {
            if is_blocked(board, piece, from, to) {
                continue;
            }
            if !leaves_king_exposed(board, piece, from, to) {
                return false;
            }
        }
    }
    true
}

/// True when `color` is not in check but has no fully legal move.
#[must_use]
pub fn is_stalemate(board: &Board, color: Player) -> bool {
    !in_check(board, color) && !has_legal_move(board, color)
}

fn has_legal_move(board: &Board, color: Player) -> bool {
    for (from, piece) in board.pieces(color) {
        if raw_moves(board, piece, from)
            .into_iter()
            .any(|to| is_move_valid(board, piece, from, to))
        {
            return true;
        }
        // Castling does not appear in raw generation.
        if piece.kind == PieceKind::King && !piece.has_moved {
            for side in [CastlingSide::Kingside, CastlingSide::Queenside] {
                let to = Coordinate::new(color.back_rank(), side.king_target_col());
                if is_move_valid(board, piece, from, to) {
                    return true;
                }
            }
        }
    }
    false
}

/// Every destination the piece on `from` may legally move to, castling
/// included. Used by the rendering surface to highlight targets.
#[must_use]
pub fn legal_destinations(board: &Board, from: Coordinate) -> Vec<Coordinate> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };
    let mut destinations: Vec<Coordinate> = raw_moves(board, piece, from)
        .into_iter()
        .filter(|&to| is_move_valid(board, piece, from, to))
        .collect();
    if piece.kind == PieceKind::King && !piece.has_moved {
        for side in [CastlingSide::Kingside, CastlingSide::Queenside] {
            let to = Coordinate::new(piece.color.back_rank(), side.king_target_col());
            if is_move_valid(board, piece, from, to) {
                destinations.push(to);
            }
        }
    }
    destinations
}

/// Everything the notation encoder needs to know about a move after it
/// was applied. `piece` is the mover as it stood *before* relocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    #[allow(missing_docs)]
    pub piece: Piece,
    #[allow(missing_docs)]
    pub from: Coordinate,
    #[allow(missing_docs)]
    pub to: Coordinate,
    /// The piece that stood on the destination, if the move captured.
    pub captured: Option<Piece>,
    /// Whether a pawn reached the far back rank and became a queen.
    pub promoted: bool,
    /// Set when the move was a castle; the rook relocation is implied.
    pub castled: Option<CastlingSide>,
}

/// Applies a move that already passed [`is_move_valid`]: relocates the
/// piece, marks it moved, updates the corner-rook flags, executes the
/// rook half of a castle and promotes pawns reaching the far back rank.
/// Returns `None` (and changes nothing) when the source square is empty.
pub fn apply_move(board: &mut Board, from: Coordinate, to: Coordinate) -> Option<MoveRecord> {
    let piece = board.piece_at(from)?;
    if let Some(side) = castling_request(piece, from, to) {
        execute_castle(board, piece.color, side);
        return Some(MoveRecord {
            piece,
            from,
            to,
            captured: None,
            promoted: false,
            castled: Some(side),
        });
    }
    let captured = board.piece_at(to);
    let mut moved = board.take(from)?;
    if moved.kind == PieceKind::Rook {
        board.note_rook_departure(from, moved.color);
    }
    moved.mark_moved();
    let promoted = moved.kind == PieceKind::Pawn && to.row == moved.color.promotion_row();
    if promoted {
        moved = Piece {
            kind: PieceKind::Queen,
            color: moved.color,
            has_moved: true,
        };
    }
    board.place(to, Some(moved));
    Some(MoveRecord {
        piece,
        from,
        to,
        captured,
        promoted,
        castled: None,
    })
}

/// Relocates king and rook in one step and marks both as moved.
fn execute_castle(board: &mut Board, color: Player, side: CastlingSide) {
    let back = color.back_rank();
    if let Some(mut king) = board.take(Coordinate::new(back, 4)) {
        king.mark_moved();
        board.place(Coordinate::new(back, side.king_target_col()), Some(king));
    }
    if let Some(mut rook) = board.take(Coordinate::new(back, side.corner_col())) {
        rook.mark_moved();
        board.place(Coordinate::new(back, side.rook_target_col()), Some(rook));
    }
    board.mark_rook_moved(color, side);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn at(square: &str) -> Coordinate {
        Coordinate::try_from(square).unwrap()
    }

    #[test]
    fn starting_raw_move_counts() {
        let board = Board::starting();
        let knight = board.piece_at(at("b1")).unwrap();
        assert_eq!(raw_moves(&board, knight, at("b1")).len(), 2);
        let pawn = board.piece_at(at("e2")).unwrap();
        assert_eq!(raw_moves(&board, pawn, at("e2")).len(), 2);
        let rook = board.piece_at(at("a1")).unwrap();
        assert!(raw_moves(&board, rook, at("a1")).is_empty());
        let king = board.piece_at(at("e1")).unwrap();
        assert!(raw_moves(&board, king, at("e1")).is_empty());
    }

    #[test]
    fn slider_stops_at_first_occupant() {
        let mut board = Board::starting();
        // Open the e-file for the white queen's diagonal.
        assert!(apply_move(&mut board, at("e2"), at("e4")).is_some());
        let queen = board.piece_at(at("d1")).unwrap();
        let moves = raw_moves(&board, queen, at("d1"));
        assert!(moves.contains(&at("e2")));
        assert!(moves.contains(&at("h5")));
        // The own pawn on d2 blocks the file without being offered.
        assert!(!moves.contains(&at("d2")));
        assert!(!moves.contains(&at("d3")));
    }

    #[test]
    fn pawn_shapes_blocked() {
        let mut board = Board::starting();
        let pawn = board.piece_at(at("f2")).unwrap();
        // Sideways and backwards shapes are blocked outright.
        assert!(is_blocked(&board, pawn, at("f2"), at("g2")));
        assert!(is_blocked(&board, pawn, at("f2"), at("f1")));
        // Diagonal without a capture target is blocked.
        assert!(is_blocked(&board, pawn, at("f2"), at("g3")));
        // A piece parked ahead blocks both single and double step.
        board.place(at("f3"), Some(Piece::new(PieceKind::Knight, Player::Black)));
        assert!(is_blocked(&board, pawn, at("f2"), at("f3")));
        assert!(is_blocked(&board, pawn, at("f2"), at("f4")));
        // A capture target opens the diagonal.
        board.place(at("g3"), Some(Piece::new(PieceKind::Knight, Player::Black)));
        assert!(!is_blocked(&board, pawn, at("f2"), at("g3")));
    }

    #[test]
    fn wrong_piece_for_square_is_rejected() {
        let board = Board::starting();
        let impostor = Piece::new(PieceKind::Knight, Player::White);
        // e2 holds a pawn, not a knight.
        assert!(!is_move_valid(&board, impostor, at("e2"), at("e4")));
        // Empty source square.
        let pawn = Piece::new(PieceKind::Pawn, Player::White);
        assert!(!is_move_valid(&board, pawn, at("e4"), at("e5")));
    }

    #[test]
    fn moving_onto_itself_is_rejected() {
        let board = Board::starting();
        let pawn = board.piece_at(at("e2")).unwrap();
        assert!(!is_move_valid(&board, pawn, at("e2"), at("e2")));
    }

    #[test]
    fn pinned_piece_may_not_expose_the_king() {
        let mut board = Board::empty();
        board.place(at("e1"), Some(Piece::new(PieceKind::King, Player::White)));
        board.place(at("e4"), Some(Piece::new(PieceKind::Rook, Player::White)));
        board.place(at("e8"), Some(Piece::new(PieceKind::King, Player::Black)));
        board.place(at("e7"), Some(Piece::new(PieceKind::Queen, Player::Black)));
        let rook = board.piece_at(at("e4")).unwrap();
        // Leaving the e-file exposes the king to the queen.
        assert!(!is_move_valid(&board, rook, at("e4"), at("a4")));
        // Staying on the file is fine.
        assert!(is_move_valid(&board, rook, at("e4"), at("e5")));
        assert!(is_move_valid(&board, rook, at("e4"), at("e7")));
    }

    #[test]
    fn apply_move_relocates_and_marks() {
        let mut board = Board::starting();
        let record = apply_move(&mut board, at("g1"), at("f3")).unwrap();
        assert_eq!(record.piece.kind, PieceKind::Knight);
        assert!(!record.piece.has_moved);
        assert_eq!(record.captured, None);
        assert_eq!(board.piece_at(at("g1")), None);
        let knight = board.piece_at(at("f3")).unwrap();
        assert!(knight.has_moved);
    }

    #[test]
    fn apply_move_from_empty_square_is_noop() {
        let mut board = Board::starting();
        let snapshot = board.clone();
        assert_eq!(apply_move(&mut board, at("e5"), at("e6")), None);
        assert_eq!(board, snapshot);
    }
}
