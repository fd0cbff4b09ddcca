//! Two-player chess rules engine paired with a language-model move
//! suggester. The [`chess`] module owns board state, move legality,
//! check/checkmate/stalemate detection and the notation codec; the
//! [`oracle`] module is the boundary to the external suggestion service.

pub mod chess;
pub mod oracle;
