//! Chess primitives commonly used within [`crate::chess`].

use std::fmt::{self, Write};

use anyhow::bail;
use itertools::Itertools;

/// Number of rows and columns of the grid.
pub const BOARD_WIDTH: i8 = 8;

/// A square addressed by `(row, col)`. Row 0 is Black's back rank, row 7
/// White's. The fields are signed so that offset arithmetic can produce
/// out-of-range candidates; everything that reads the board treats those
/// as empty squares rather than failing.
///
/// The algebraic mapping is file = `'a' + col`, rank = `8 - row`:
///
/// ```
/// use gambit::chess::core::Coordinate;
///
/// assert_eq!(Coordinate::try_from("e4").unwrap(), Coordinate::new(4, 4));
/// assert_eq!(Coordinate::new(0, 0).to_string(), "a8");
/// assert_eq!(Coordinate::new(7, 7).to_string(), "h1");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
    #[allow(missing_docs)]
    pub row: i8,
    #[allow(missing_docs)]
    pub col: i8,
}

impl Coordinate {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Whether both components are within `[0, 7]`.
    #[must_use]
    pub const fn is_on_board(self) -> bool {
        0 <= self.row && self.row < BOARD_WIDTH && 0 <= self.col && self.col < BOARD_WIDTH
    }

    /// The square `rows`/`cols` away. The result may be off the board;
    /// callers either bounds-check it or rely on reads treating it as
    /// empty.
    #[must_use]
    pub const fn offset(self, rows: i8, cols: i8) -> Self {
        Self::new(self.row + rows, self.col + cols)
    }

    /// Algebraic file letter, `'a'` through `'h'`.
    #[must_use]
    pub fn file(self) -> char {
        debug_assert!(self.is_on_board());
        (b'a' + self.col as u8) as char
    }

    /// Algebraic rank digit, `'1'` through `'8'` (rank 8 is row 0).
    #[must_use]
    pub fn rank(self) -> char {
        debug_assert!(self.is_on_board());
        (b'0' + (BOARD_WIDTH - self.row) as u8) as char
    }
}

impl TryFrom<(char, char)> for Coordinate {
    type Error = anyhow::Error;

    fn try_from((file, rank): (char, char)) -> anyhow::Result<Self> {
        if !('a'..='h').contains(&file) {
            bail!("file should be within 'a'..='h', got '{file}'");
        }
        if !('1'..='8').contains(&rank) {
            bail!("rank should be within '1'..='8', got '{rank}'");
        }
        Ok(Self::new(
            BOARD_WIDTH - (rank as i8 - '0' as i8),
            file as i8 - 'a' as i8,
        ))
    }
}

impl TryFrom<&str> for Coordinate {
    type Error = anyhow::Error;

    fn try_from(square: &str) -> anyhow::Result<Self> {
        match square.chars().collect_tuple::<(char, char)>() {
            Some(pair) => Self::try_from(pair),
            None => bail!("square should be two chars, got \"{square}\""),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// A standard game of chess is played between two players: White (having
/// the advantage of the first turn) and Black. White's pieces start on
/// rows 6 and 7 of the grid, Black's on rows 0 and 1.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// "Flips" the color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Direction this color's pawns advance along the row axis.
    pub(super) const fn pawn_direction(self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    /// Row holding this color's king and rooks at setup.
    pub(super) const fn back_rank(self) -> i8 {
        match self {
            Self::White => 7,
            Self::Black => 0,
        }
    }

    /// Row holding this color's pawns at setup; double steps start here.
    pub(super) const fn pawn_row(self) -> i8 {
        match self {
            Self::White => 6,
            Self::Black => 1,
        }
    }

    /// The opposite back rank; a pawn reaching it becomes a queen.
    pub(super) const fn promotion_row(self) -> i8 {
        self.opponent().back_rank()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::White => "white",
            Self::Black => "black",
        })
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Notation letter; empty for pawns, which are written by their
    /// destination alone.
    #[must_use]
    pub const fn letter(self) -> &'static str {
        match self {
            Self::Pawn => "",
            Self::Knight => "N",
            Self::Bishop => "B",
            Self::Rook => "R",
            Self::Queen => "Q",
            Self::King => "K",
        }
    }
}

impl TryFrom<char> for PieceKind {
    type Error = anyhow::Error;

    /// Parses a notation letter. Pawns have no letter and can not be
    /// parsed this way.
    fn try_from(letter: char) -> anyhow::Result<Self> {
        match letter {
            'N' => Ok(Self::Knight),
            'B' => Ok(Self::Bishop),
            'R' => Ok(Self::Rook),
            'Q' => Ok(Self::Queen),
            'K' => Ok(Self::King),
            _ => bail!("piece letter should be within \"NBRQK\", got '{letter}'"),
        }
    }
}

/// A specific piece owned by a player. `has_moved` flips to true the
/// first time the piece is relocated and never resets; castling
/// eligibility reads it for kings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    #[allow(missing_docs)]
    pub kind: PieceKind,
    #[allow(missing_docs)]
    pub color: Player,
    #[allow(missing_docs)]
    pub has_moved: bool,
}

impl Piece {
    /// A piece that has not moved yet.
    #[must_use]
    pub const fn new(kind: PieceKind, color: Player) -> Self {
        Self {
            kind,
            color,
            has_moved: false,
        }
    }

    pub(super) fn mark_moved(&mut self) {
        self.has_moved = true;
    }
}

impl fmt::Display for Piece {
    /// One-letter form: uppercase for White, lowercase for Black.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(match (self.color, self.kind) {
            (Player::White, PieceKind::King) => 'K',
            (Player::White, PieceKind::Queen) => 'Q',
            (Player::White, PieceKind::Rook) => 'R',
            (Player::White, PieceKind::Bishop) => 'B',
            (Player::White, PieceKind::Knight) => 'N',
            (Player::White, PieceKind::Pawn) => 'P',
            (Player::Black, PieceKind::King) => 'k',
            (Player::Black, PieceKind::Queen) => 'q',
            (Player::Black, PieceKind::Rook) => 'r',
            (Player::Black, PieceKind::Bishop) => 'b',
            (Player::Black, PieceKind::Knight) => 'n',
            (Player::Black, PieceKind::Pawn) => 'p',
        })
    }
}

/// The two directions a king can castle: toward the h-file corner
/// (short, `O-O`) or the a-file corner (long, `O-O-O`).
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastlingSide {
    Kingside,
    Queenside,
}

impl CastlingSide {
    /// Column of the corner rook involved in this castle.
    pub(super) const fn corner_col(self) -> i8 {
        match self {
            Self::Kingside => 7,
            Self::Queenside => 0,
        }
    }

    /// Column the king lands on: two files toward the corner.
    pub(super) const fn king_target_col(self) -> i8 {
        match self {
            Self::Kingside => 6,
            Self::Queenside => 2,
        }
    }

    /// Column the rook lands on, on the far side of the king.
    pub(super) const fn rook_target_col(self) -> i8 {
        match self {
            Self::Kingside => 5,
            Self::Queenside => 3,
        }
    }

    /// Notation literal overriding the regular token shape.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Kingside => "O-O",
            Self::Queenside => "O-O-O",
        }
    }
}

bitflags::bitflags! {
    /// Tracks whether each corner rook has ever left its starting
    /// square. A rook's own `has_moved` flag can not answer "did the
    /// rook from *this* corner move", so the board carries one bit per
    /// corner. The bits travel with the board value through clones and
    /// are only consulted for castling eligibility.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MovedRooks: u8 {
        #[allow(missing_docs)]
        const WHITE_KINGSIDE = 0b0001;
        #[allow(missing_docs)]
        const WHITE_QUEENSIDE = 0b0010;
        #[allow(missing_docs)]
        const BLACK_KINGSIDE = 0b0100;
        #[allow(missing_docs)]
        const BLACK_QUEENSIDE = 0b1000;
    }
}

impl MovedRooks {
    pub(super) const fn corner(color: Player, side: CastlingSide) -> Self {
        match (color, side) {
            (Player::White, CastlingSide::Kingside) => Self::WHITE_KINGSIDE,
            (Player::White, CastlingSide::Queenside) => Self::WHITE_QUEENSIDE,
            (Player::Black, CastlingSide::Kingside) => Self::BLACK_KINGSIDE,
            (Player::Black, CastlingSide::Queenside) => Self::BLACK_QUEENSIDE,
        }
    }
}
