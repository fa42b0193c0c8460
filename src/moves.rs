/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{bail, Result};

use crate::{Board, Color, File, PieceId, PieceKind, Rank, Square};

/// The two sides a King may castle to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CastleSide {
    /// Castling on the King's side of the board ("kingside", `O-O`).
    Short,
    /// Castling on the Queen's side of the board ("queenside", `O-O-O`).
    Long,
}

impl CastleSide {
    /// The King's home square, relative to `color`. Shared by both sides.
    #[inline(always)]
    pub const fn king_home(color: Color) -> Square {
        Square::new(File::E, Rank::first(color))
    }

    /// Where the King lands after castling on this side.
    ///
    /// # Example
    /// ```
    /// # use newt::{CastleSide, Color, Square};
    /// assert_eq!(CastleSide::Short.king_target(Color::White), Square::G1);
    /// assert_eq!(CastleSide::Long.king_target(Color::Black), Square::C8);
    /// ```
    #[inline(always)]
    pub const fn king_target(self, color: Color) -> Square {
        let file = match self {
            Self::Short => File::G,
            Self::Long => File::C,
        };
        Square::new(file, Rank::first(color))
    }

    /// The home square of the Rook that castles on this side.
    #[inline(always)]
    pub const fn rook_home(self, color: Color) -> Square {
        let file = match self {
            Self::Short => File::H,
            Self::Long => File::A,
        };
        Square::new(file, Rank::first(color))
    }

    /// Where the Rook lands after castling on this side: the square the King
    /// passed through.
    #[inline(always)]
    pub const fn rook_target(self, color: Color) -> Square {
        let file = match self {
            Self::Short => File::F,
            Self::Long => File::D,
        };
        Square::new(file, Rank::first(color))
    }
}

/// The special-move tag of a [`Move`]. At most one applies, by construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MoveKind {
    /// An ordinary relocation, with or without a capture on the target square.
    Quiet,

    /// The King and a Rook sliding past each other on one side of the board.
    Castle(CastleSide),

    /// A Pawn capturing an enemy Pawn that just advanced two squares, as if
    /// it had advanced one. The victim does not stand on the target square.
    EnPassant,

    /// A Pawn reaching the last rank and becoming the carried [`PieceKind`].
    Promotion(PieceKind),
}

/// An immutable description of one ply: which piece moves where, what it
/// captures, and its special-move tag.
///
/// Also records whether the mover had already moved, so that undoing the
/// move restores the moved-flag exactly.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Move {
    piece: PieceId,
    from: Square,
    to: Square,
    captured: Option<PieceId>,
    kind: MoveKind,
    had_moved: bool,
}

impl Move {
    /// Describes the move of the piece `id` to `to` on the given board,
    /// deriving the capture victim and the special-move tag from the current
    /// position.
    ///
    /// This does not check that the target is reachable; callers validate
    /// legality against the mover's legal-move set. It does validate the
    /// promotion argument: a Pawn reaching its last rank must carry a
    /// promotion kind, any other move must not, and the kind must be one a
    /// Pawn can promote to.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let mut board = Board::new();
    /// let pawn = board.spawn(Color::White, PieceKind::Pawn, Square::E7);
    ///
    /// // A promotion without a chosen kind is rejected
    /// assert!(Move::new(&board, pawn, Square::E8, None).is_err());
    ///
    /// let mv = Move::new(&board, pawn, Square::E8, Some(PieceKind::Queen)).unwrap();
    /// assert_eq!(mv.promotion(), Some(PieceKind::Queen));
    /// ```
    pub fn new(
        board: &Board,
        id: PieceId,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Self> {
        let piece = board.piece(id);
        let from = piece.square();
        let color = piece.color();
        let mut captured = board.piece_at(to);

        let kind = match piece.kind() {
            PieceKind::Pawn => {
                // A pawn changing file without a victim on the target square
                // is capturing en passant; the victim stands beside it.
                if to.file() != from.file() && captured.is_none() {
                    let victim_square = Square::new(to.file(), from.rank());
                    captured = board.piece_at(victim_square).filter(|&id| {
                        let victim = board.piece(id);
                        victim.kind() == PieceKind::Pawn && victim.color() != color
                    });
                    if captured.is_none() {
                        bail!("No pawn to capture en passant on {victim_square}");
                    }
                    MoveKind::EnPassant
                } else if to.rank() == Rank::eighth(color) {
                    let Some(promotion) = promotion else {
                        bail!("A promotion kind must be provided when a pawn reaches {to}");
                    };
                    if !promotion.is_promotion_target() {
                        bail!("A pawn cannot promote to a {}", promotion.name());
                    }
                    MoveKind::Promotion(promotion)
                } else {
                    MoveKind::Quiet
                }
            }

            // A King stepping two files from its home square is castling
            PieceKind::King
                if from == CastleSide::king_home(color) && from.file().abs_diff(to.file()) == 2 =>
            {
                if to.file() > from.file() {
                    MoveKind::Castle(CastleSide::Short)
                } else {
                    MoveKind::Castle(CastleSide::Long)
                }
            }

            _ => MoveKind::Quiet,
        };

        if promotion.is_some() && !matches!(kind, MoveKind::Promotion(_)) {
            bail!("A promotion kind was provided, but moving to {to} is not a promotion");
        }
        debug_assert!(
            !(matches!(kind, MoveKind::Castle(_)) && captured.is_some()),
            "castling can never capture"
        );

        Ok(Self {
            piece: id,
            from,
            to,
            captured,
            kind,
            had_moved: piece.has_moved(),
        })
    }

    /// Describes a pawn double-step directly, without inspecting a board.
    ///
    /// Used when loading a position whose en-passant rights imply a last
    /// move that was never actually played through the engine.
    #[inline(always)]
    pub(crate) const fn double_step(piece: PieceId, from: Square, to: Square) -> Self {
        Self {
            piece,
            from,
            to,
            captured: None,
            kind: MoveKind::Quiet,
            had_moved: false,
        }
    }

    /// The id of the moving piece.
    #[inline(always)]
    pub const fn piece(&self) -> PieceId {
        self.piece
    }

    /// The square the piece moves from.
    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    /// The square the piece moves to.
    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// The id of the captured piece, if any.
    ///
    /// For an en passant capture the victim does not stand on [`Move::to`].
    #[inline(always)]
    pub const fn captured(&self) -> Option<PieceId> {
        self.captured
    }

    /// The special-move tag of this move.
    #[inline(always)]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// Returns `true` if this move captures a piece (en passant included).
    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Returns `true` if this move is an en passant capture.
    #[inline(always)]
    pub const fn is_en_passant(&self) -> bool {
        matches!(self.kind, MoveKind::EnPassant)
    }

    /// The side castled to, if this move is a castle.
    #[inline(always)]
    pub const fn castle_side(&self) -> Option<CastleSide> {
        match self.kind {
            MoveKind::Castle(side) => Some(side),
            _ => None,
        }
    }

    /// The kind promoted to, if this move is a promotion.
    #[inline(always)]
    pub const fn promotion(&self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Promotion(kind) => Some(kind),
            _ => None,
        }
    }

    /// Whether the mover had already moved before this move was made.
    #[inline(always)]
    pub(crate) const fn had_moved(&self) -> bool {
        self.had_moved
    }

    /// Returns `true` if this move is a pawn advancing two ranks.
    ///
    /// Only such a move can enable an en passant capture in reply.
    #[inline(always)]
    pub fn is_double_step(&self, board: &Board) -> bool {
        board.piece(self.piece).kind() == PieceKind::Pawn
            && self.from.rank().abs_diff(self.to.rank()) == 2
    }
}

impl fmt::Display for Move {
    /// Formats the move in [Universal Chess Interface](https://en.wikipedia.org//wiki/Universal_Chess_Interface) notation: `from`, `to`,
    /// and the promotion char if applicable, e.g. `e2e4` or `e7e8q`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveKind::Promotion(kind) => write!(f, "{}{}{}", self.from, self.to, kind.to_uci()),
            _ => write!(f, "{}{}", self.from, self.to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn test_quiet_and_capture() {
        let mut board = Board::new();
        let rook = board.spawn(Color::White, PieceKind::Rook, Square::A1);
        let victim = board.spawn(Color::Black, PieceKind::Knight, Square::A5);

        let quiet = Move::new(&board, rook, Square::A3, None).unwrap();
        assert_eq!(quiet.kind(), MoveKind::Quiet);
        assert!(!quiet.is_capture());

        let capture = Move::new(&board, rook, Square::A5, None).unwrap();
        assert_eq!(capture.kind(), MoveKind::Quiet);
        assert_eq!(capture.captured(), Some(victim));
    }

    #[test]
    fn test_castle_detection() {
        let mut board = Board::new();
        let king = board.spawn(Color::White, PieceKind::King, Square::E1);
        board.spawn(Color::White, PieceKind::Rook, Square::H1);

        let mv = Move::new(&board, king, Square::G1, None).unwrap();
        assert_eq!(mv.castle_side(), Some(CastleSide::Short));

        // A single-file king step is not a castle
        let mv = Move::new(&board, king, Square::F1, None).unwrap();
        assert_eq!(mv.kind(), MoveKind::Quiet);
    }

    #[test]
    fn test_en_passant_derives_victim() {
        let mut board = Board::new();
        let pawn = board.spawn(Color::White, PieceKind::Pawn, Square::E5);
        let victim = board.spawn(Color::Black, PieceKind::Pawn, Square::D5);

        let mv = Move::new(&board, pawn, Square::D6, None).unwrap();
        assert!(mv.is_en_passant());
        assert_eq!(mv.captured(), Some(victim));

        // Diagonal pawn move with neither a target nor a beside-victim
        assert!(Move::new(&board, pawn, Square::F6, None).is_err());
    }

    #[test]
    fn test_promotion_validation() {
        let mut board = Board::new();
        let pawn = board.spawn(Color::White, PieceKind::Pawn, Square::A7);
        let rook = board.spawn(Color::White, PieceKind::Rook, Square::H1);

        // Missing kind
        assert!(Move::new(&board, pawn, Square::A8, None).is_err());
        // Kings and pawns are not promotion targets
        assert!(Move::new(&board, pawn, Square::A8, Some(PieceKind::King)).is_err());
        // Extraneous kind on a non-promotion move
        assert!(Move::new(&board, rook, Square::H4, Some(PieceKind::Queen)).is_err());
        assert!(Move::new(&board, pawn, Square::A8, Some(PieceKind::Queen)).is_ok());
    }

    #[test]
    fn test_display() {
        let mut board = Board::new();
        let pawn = board.spawn(Color::White, PieceKind::Pawn, Square::E7);
        let mv = Move::new(&board, pawn, Square::E8, Some(PieceKind::Queen)).unwrap();
        assert_eq!(mv.to_string(), "e7e8q");
    }
}
