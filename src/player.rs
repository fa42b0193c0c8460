/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{
    executer::with_trial_move, movegen, Board, CastleSide, Color, Move, PieceId, PieceKind, Rank,
    Square,
};

/// One side of the game: a [`Color`], the ids of its live pieces, and its
/// King.
///
/// A player holds no board or opponent references; operations that need the
/// position or the enemy take them as arguments, and [`Game`](crate::Game)
/// owns both players.
#[derive(Clone, Debug)]
pub struct Player {
    color: Color,
    pieces: Vec<PieceId>,
    king: Option<PieceId>,
}

impl Player {
    /// Creates a new [`Player`] with no pieces.
    #[inline(always)]
    pub fn new(color: Color) -> Self {
        Self {
            color,
            pieces: Vec::new(),
            king: None,
        }
    }

    /// This player's [`Color`].
    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// The ids of this player's live pieces, in no particular order.
    #[inline(always)]
    pub fn pieces(&self) -> &[PieceId] {
        &self.pieces
    }

    /// Returns `true` once this player has a King.
    #[inline(always)]
    pub const fn has_king(&self) -> bool {
        self.king.is_some()
    }

    /// The id of this player's King.
    ///
    /// # Panics
    ///
    /// If no King has been added yet; every set-up game gives each player
    /// exactly one King before play begins.
    #[inline(always)]
    pub fn king(&self) -> PieceId {
        self.king
            .unwrap_or_else(|| panic!("{} player has no king", self.color))
    }

    /// Adds a piece to this player's set.
    ///
    /// # Panics
    ///
    /// If the piece's color is not this player's, or if it is a second King.
    pub(crate) fn add_piece(&mut self, board: &Board, id: PieceId) {
        let piece = board.piece(id);
        assert_eq!(
            piece.color(),
            self.color,
            "attempted to give the {} player an enemy piece",
            self.color
        );

        if piece.kind() == PieceKind::King {
            assert!(
                self.king.is_none(),
                "{} player cannot have more than one king",
                self.color
            );
            self.king = Some(id);
        }

        self.pieces.push(id);
    }

    /// Removes a piece from this player's set.
    ///
    /// # Panics
    ///
    /// If the piece is the King (the King never leaves the game), or if this
    /// player does not own it.
    pub(crate) fn remove_piece(&mut self, id: PieceId) {
        assert_ne!(self.king, Some(id), "cannot remove the king from the game");

        let position = self
            .pieces
            .iter()
            .position(|&p| p == id)
            .unwrap_or_else(|| panic!("{} player does not own piece {id:?}", self.color));
        self.pieces.swap_remove(position);
    }

    /// Returns `true` if any of this player's pieces attacks `square`.
    pub fn attacks_square(&self, board: &Board, square: Square) -> bool {
        self.pieces
            .iter()
            .any(|&id| movegen::attacks(board, id).contains(&square))
    }

    /// Returns `true` if this player's King is attacked by `them`.
    #[inline(always)]
    pub fn is_in_check(&self, board: &Board, them: &Player) -> bool {
        them.attacks_square(board, board.piece(self.king()).square())
    }

    /// Returns `true` if any of this player's pieces has a cached legal move.
    ///
    /// Meaningful only after [`Player::refresh_legal_moves`].
    pub fn has_legal_moves(&self, board: &Board) -> bool {
        self.pieces
            .iter()
            .any(|&id| !board.piece(id).legal_moves().is_empty())
    }

    /// Returns `true` if this player is in check with no legal move anywhere.
    ///
    /// Meaningful only after [`Player::refresh_legal_moves`].
    #[inline(always)]
    pub fn is_checkmated(&self, board: &Board, them: &Player) -> bool {
        self.is_in_check(board, them) && !self.has_legal_moves(board)
    }

    /// Returns `true` if this player is *not* in check yet has no legal move.
    ///
    /// Meaningful only after [`Player::refresh_legal_moves`].
    #[inline(always)]
    pub fn is_stalemated(&self, board: &Board, them: &Player) -> bool {
        !self.is_in_check(board, them) && !self.has_legal_moves(board)
    }

    /// Recomputes the cached legal-move set of every piece this player owns.
    ///
    /// Each pseudo-legal candidate is applied to the board, tested for
    /// leaving this player's King in check, and reverted; the whole sweep is
    /// a single critical section over the shared board. Castling and
    /// en passant eligibility (the latter derived from `last_move`) are
    /// appended afterwards.
    pub fn refresh_legal_moves(
        &self,
        board: &mut Board,
        them: &mut Player,
        last_move: Option<&Move>,
    ) {
        for &id in &self.pieces {
            let from = board.piece(id).square();
            let mut legal = movegen::TargetList::new();

            for to in movegen::pseudo_legal(board, id) {
                let capture_at = board.piece_at(to).map(|_| to);
                let exposed = with_trial_move(board, them, from, to, capture_at, |board, them| {
                    self.is_in_check(board, them)
                });
                if !exposed {
                    legal.push(to);
                }
            }

            board.piece_mut(id).set_legal_moves(legal);
        }

        self.add_castle_moves(board, them);
        self.add_en_passant_moves(board, them, last_move);
    }

    /// Appends the King's castle targets to its legal-move set where castling
    /// is allowed.
    fn add_castle_moves(&self, board: &mut Board, them: &Player) {
        let Some(king) = self.king else { return };
        if board.piece(king).has_moved() || self.is_in_check(board, them) {
            return;
        }

        for side in [CastleSide::Short, CastleSide::Long] {
            if self.can_castle(board, them, side) {
                board
                    .piece_mut(king)
                    .legal_moves_mut()
                    .push(side.king_target(self.color));
            }
        }
    }

    /// Castling legality for one side: King and Rook unmoved, the Rook on its
    /// home square with a clear line to the King, and no enemy attack on any
    /// square the King transits, its destination included. The origin is
    /// covered by the caller's check test.
    fn can_castle(&self, board: &Board, them: &Player, side: CastleSide) -> bool {
        let king = board.piece(self.king());
        if king.square() != CastleSide::king_home(self.color) {
            return false;
        }

        let Some(rook_id) = board.piece_at(side.rook_home(self.color)) else {
            return false;
        };
        let rook = board.piece(rook_id);
        if rook.kind() != PieceKind::Rook || rook.color() != self.color || rook.has_moved() {
            return false;
        }

        // The rook must see the king: its ray stops at the first piece in
        // between, so reaching the king means the line is clear
        if !movegen::attacks(board, rook_id).contains(&king.square()) {
            return false;
        }

        [side.rook_target(self.color), side.king_target(self.color)]
            .into_iter()
            .all(|sq| !them.attacks_square(board, sq))
    }

    /// Appends en passant captures to eligible pawns.
    ///
    /// Eligibility requires the immediately preceding move to have been an
    /// enemy pawn double-step landing beside the capturing pawn; the capture
    /// is simulated (removing the victim from its actual square) and
    /// discarded if it would expose this player's King.
    fn add_en_passant_moves(&self, board: &mut Board, them: &mut Player, last_move: Option<&Move>) {
        let Some(last) = last_move else { return };
        if board.piece(last.piece()).color() != them.color() || !last.is_double_step(board) {
            return;
        }

        let victim_square = last.to();
        let Some(target) = victim_square.forward_by(self.color, 1) else {
            return;
        };

        for &id in &self.pieces {
            let pawn = board.piece(id);
            if pawn.kind() != PieceKind::Pawn {
                continue;
            }

            let from = pawn.square();
            if from.rank() != Rank::fifth(self.color)
                || from.file().abs_diff(victim_square.file()) != 1
            {
                continue;
            }

            let exposed = with_trial_move(
                board,
                them,
                from,
                target,
                Some(victim_square),
                |board, them| self.is_in_check(board, them),
            );
            if !exposed {
                board.piece_mut(id).legal_moves_mut().push(target);
            }
        }
    }
}
