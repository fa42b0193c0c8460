/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Color, Direction, File, Piece, PieceId, PieceKind, Rank, Square};

/// An `8x8` mailbox board: one cell per [`Square`], each holding at most one
/// piece, plus the arena owning every [`Piece`] ever created for this game.
///
/// Captured (and promoted-away) pieces stay in the arena, detached from the
/// grid, so that undoing a move can restore exactly the piece it removed.
#[derive(Clone, Debug)]
pub struct Board {
    /// One cell per square, `None` when empty.
    grid: [Option<PieceId>; Square::COUNT],

    /// Every piece of the game, addressed by [`PieceId`]. Never shrinks.
    pieces: Vec<Piece>,
}

impl Default for Board {
    /// An empty board.
    fn default() -> Self {
        Self {
            grid: [None; Square::COUNT],
            pieces: Vec::new(),
        }
    }
}

impl Board {
    /// Creates a new, empty [`Board`].
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the id of the piece standing on `square`, if any.
    #[inline(always)]
    pub fn piece_at(&self, square: Square) -> Option<PieceId> {
        self.grid[square.index()]
    }

    /// Fetches the piece standing on `square`, if any.
    #[inline(always)]
    pub fn piece_on(&self, square: Square) -> Option<&Piece> {
        self.piece_at(square).map(|id| self.piece(id))
    }

    /// Returns `true` if `square` holds no piece.
    #[inline(always)]
    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Fetches the piece addressed by `id`.
    #[inline(always)]
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.index()]
    }

    /// Mutable access to the piece addressed by `id`.
    #[inline(always)]
    pub(crate) fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.pieces[id.index()]
    }

    /// Creates a new [`Piece`] in the arena and places it on `square`.
    ///
    /// # Panics
    ///
    /// If `square` is already occupied.
    pub fn spawn(&mut self, color: Color, kind: PieceKind, square: Square) -> PieceId {
        let id = PieceId(self.pieces.len() as u32);
        self.pieces.push(Piece::new(color, kind, square));
        self.place(id, square);
        id
    }

    /// Places an existing piece on `square`.
    ///
    /// # Panics
    ///
    /// If `square` is already occupied.
    pub fn place(&mut self, id: PieceId, square: Square) {
        assert!(
            self.is_empty(square),
            "attempted to place a piece on occupied square {square}"
        );
        self.grid[square.index()] = Some(id);
        self.piece_mut(id).set_square(square);
    }

    /// Removes the piece (if any) from `square` and returns its id.
    ///
    /// The piece stays in the arena with its square unchanged, so it can be
    /// placed back later. A no-op when the square is empty.
    #[inline(always)]
    pub fn remove(&mut self, square: Square) -> Option<PieceId> {
        self.grid[square.index()].take()
    }

    /// Relocates the piece on `from` to `to`.
    ///
    /// Moved-flags are untouched; trial moves must leave them alone, and
    /// committed moves update them explicitly.
    ///
    /// # Panics
    ///
    /// If `from` is empty, or `to` is occupied.
    pub fn move_piece(&mut self, from: Square, to: Square) {
        let id = self
            .remove(from)
            .unwrap_or_else(|| panic!("attempted to move from empty square {from}"));
        self.place(id, to);
    }

    /// Iterates over all occupied squares and the ids of the pieces on them,
    /// in square order.
    #[inline(always)]
    pub fn occupied(&self) -> impl Iterator<Item = (Square, PieceId)> + '_ {
        Square::iter().filter_map(|sq| self.piece_at(sq).map(|id| (sq, id)))
    }

    /// The number of pieces currently on the board.
    #[inline(always)]
    pub fn piece_count(&self) -> usize {
        self.occupied().count()
    }

    /// Walks the squares along `direction` from `from` (exclusive), stopping
    /// after (and including) the first occupied square, or at the board edge.
    ///
    /// This is the shared primitive for sliding-piece attacks.
    ///
    /// # Example
    /// ```
    /// # use newt::{Board, Color, Direction, PieceKind, Square};
    /// let mut board = Board::new();
    /// board.spawn(Color::Black, PieceKind::Knight, Square::C4);
    ///
    /// let ray: Vec<Square> = board.ray(Square::C1, Direction::NORTH).collect();
    /// assert_eq!(ray, [Square::C2, Square::C3, Square::C4]);
    /// ```
    pub fn ray(&self, from: Square, direction: Direction) -> impl Iterator<Item = Square> + '_ {
        let mut blocked = false;
        std::iter::successors(from.shifted(direction), move |sq| sq.shifted(direction)).take_while(
            move |&sq| {
                if blocked {
                    return false;
                }
                blocked = !self.is_empty(sq);
                true
            },
        )
    }
}

impl fmt::Display for Board {
    /// Renders the board as an `8x8` grid of UCI piece chars, with file and
    /// rank labels, from Rank 8 down to Rank 1.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}|")?;
            for file in File::iter() {
                match self.piece_on(Square::new(file, rank)) {
                    Some(piece) => write!(f, " {piece}")?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for file in File::iter() {
            write!(f, " {file}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_and_remove() {
        let mut board = Board::new();
        let id = board.spawn(Color::White, PieceKind::Rook, Square::A1);

        assert_eq!(board.piece_at(Square::A1), Some(id));
        assert_eq!(board.piece(id).square(), Square::A1);

        assert_eq!(board.remove(Square::A1), Some(id));
        assert!(board.is_empty(Square::A1));
        // Removing from an empty square is a no-op
        assert_eq!(board.remove(Square::A1), None);

        // The piece survives in the arena and can be restored
        board.place(id, Square::A1);
        assert_eq!(board.piece_at(Square::A1), Some(id));
    }

    #[test]
    fn test_move_piece_updates_square() {
        let mut board = Board::new();
        let id = board.spawn(Color::Black, PieceKind::Queen, Square::D8);

        board.move_piece(Square::D8, Square::D5);
        assert!(board.is_empty(Square::D8));
        assert_eq!(board.piece_at(Square::D5), Some(id));
        assert_eq!(board.piece(id).square(), Square::D5);
        // Trial relocations must not touch the moved-flag
        assert!(!board.piece(id).has_moved());
    }

    #[test]
    #[should_panic(expected = "occupied")]
    fn test_spawn_on_occupied_square_panics() {
        let mut board = Board::new();
        board.spawn(Color::White, PieceKind::Pawn, Square::E2);
        board.spawn(Color::Black, PieceKind::Pawn, Square::E2);
    }

    #[test]
    #[should_panic(expected = "empty square")]
    fn test_move_from_empty_square_panics() {
        let mut board = Board::new();
        board.move_piece(Square::E2, Square::E4);
    }

    #[test]
    fn test_ray_stops_at_first_occupied() {
        let mut board = Board::new();
        board.spawn(Color::White, PieceKind::Pawn, Square::E4);

        // Ray includes the blocker, nothing beyond it
        let ray: Vec<Square> = board.ray(Square::E1, Direction::NORTH).collect();
        assert_eq!(ray, [Square::E2, Square::E3, Square::E4]);

        // Unobstructed ray runs to the edge
        let ray: Vec<Square> = board.ray(Square::A1, Direction::NORTHEAST).collect();
        assert_eq!(ray.last(), Some(&Square::H8));
        assert_eq!(ray.len(), 7);

        // Ray from the edge, pointing off the board, is empty
        assert_eq!(board.ray(Square::H8, Direction::NORTH).count(), 0);
    }
}
