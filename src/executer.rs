/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Applies and reverts the full side effects of a [`Move`]: board cells,
//! player piece sets, moved-flags, the castling Rook's co-move, the
//! en passant victim, and promotion's piece substitution.
//!
//! Two call paths share the same board primitives:
//! - [`execute`] / [`undo`] / [`redo`] commit permanent changes and are only
//!   invoked by [`Game`](crate::Game);
//! - [`with_trial_move`] applies a candidate, hands the position to a
//!   closure, and reverts before returning, so legality probing can never
//!   leave a trial applied.

use log::trace;

use crate::{Board, CastleSide, Move, MoveKind, Player, Square};

/// Applies `mv` to the board and both piece sets.
///
/// Assumes the move was validated; `us` must own the moving piece.
pub(crate) fn execute(board: &mut Board, us: &mut Player, them: &mut Player, mv: &Move) {
    trace!("executing {mv}");

    match mv.kind() {
        MoveKind::Quiet => {
            detach_captured(board, them, mv);
            board.move_piece(mv.from(), mv.to());
            board.piece_mut(mv.piece()).set_moved(true);
        }

        MoveKind::Castle(side) => execute_castle(board, us, side, mv),

        MoveKind::EnPassant => {
            // The victim stands beside the mover, not on the target square
            detach_captured(board, them, mv);
            board.move_piece(mv.from(), mv.to());
            board.piece_mut(mv.piece()).set_moved(true);
        }

        MoveKind::Promotion(kind) => {
            detach_captured(board, them, mv);

            // The pawn leaves the game; a new piece takes its place
            board.remove(mv.from());
            us.remove_piece(mv.piece());

            let color = us.color();
            let promoted = board.spawn(color, kind, mv.to());
            board.piece_mut(promoted).set_moved(true);
            us.add_piece(board, promoted);
        }
    }
}

/// Reverts `mv`, restoring board cells, piece sets, and moved-flags to
/// exactly their pre-move state.
///
/// `mv` must be the most recently applied move; undoing anything else is a
/// logic error and will corrupt the position.
pub(crate) fn undo(board: &mut Board, us: &mut Player, them: &mut Player, mv: &Move) {
    trace!("reverting {mv}");

    match mv.kind() {
        MoveKind::Quiet => {
            board.move_piece(mv.to(), mv.from());
            board.piece_mut(mv.piece()).set_moved(mv.had_moved());
            restore_captured(board, them, mv);
        }

        MoveKind::Castle(side) => undo_castle(board, us, side, mv),

        MoveKind::EnPassant => {
            board.move_piece(mv.to(), mv.from());
            board.piece_mut(mv.piece()).set_moved(mv.had_moved());
            restore_captured(board, them, mv);
        }

        MoveKind::Promotion(_) => {
            // Take the promoted piece off; bring the pawn back
            let promoted = board
                .remove(mv.to())
                .unwrap_or_else(|| panic!("no promoted piece on {} to revert", mv.to()));
            us.remove_piece(promoted);

            us.add_piece(board, mv.piece());
            board.place(mv.piece(), mv.from());
            board.piece_mut(mv.piece()).set_moved(mv.had_moved());

            restore_captured(board, them, mv);
        }
    }
}

/// Re-applies a move previously reverted by [`undo`].
#[inline(always)]
pub(crate) fn redo(board: &mut Board, us: &mut Player, them: &mut Player, mv: &Move) {
    execute(board, us, them, mv);
}

fn execute_castle(board: &mut Board, us: &mut Player, side: CastleSide, mv: &Move) {
    let color = us.color();
    board.move_piece(mv.from(), mv.to());
    board.move_piece(side.rook_home(color), side.rook_target(color));

    board.piece_mut(mv.piece()).set_moved(true);
    let rook = board
        .piece_at(side.rook_target(color))
        .unwrap_or_else(|| panic!("no rook on {} after castling", side.rook_target(color)));
    board.piece_mut(rook).set_moved(true);
}

fn undo_castle(board: &mut Board, us: &mut Player, side: CastleSide, mv: &Move) {
    let color = us.color();
    board.move_piece(mv.to(), mv.from());
    board.move_piece(side.rook_target(color), side.rook_home(color));

    // Castling requires both to have been unmoved
    board.piece_mut(mv.piece()).set_moved(false);
    let rook = board
        .piece_at(side.rook_home(color))
        .unwrap_or_else(|| panic!("no rook on {} after reverting a castle", side.rook_home(color)));
    board.piece_mut(rook).set_moved(false);
}

#[inline(always)]
fn detach_captured(board: &mut Board, them: &mut Player, mv: &Move) {
    if let Some(victim) = mv.captured() {
        let square = board.piece(victim).square();
        board.remove(square);
        them.remove_piece(victim);
    }
}

#[inline(always)]
fn restore_captured(board: &mut Board, them: &mut Player, mv: &Move) {
    if let Some(victim) = mv.captured() {
        let square = board.piece(victim).square();
        board.place(victim, square);
        them.add_piece(board, victim);
    }
}

/// Applies a bare relocation (plus an optional capture at `capture_at`),
/// evaluates `probe` on the resulting position, then unconditionally
/// reverts. Both halves live in this one function, so no caller can leave
/// a trial move applied.
///
/// Moved-flags and legal-move caches are untouched; this is the simulation
/// path behind legality testing, never a committed move.
pub(crate) fn with_trial_move<R>(
    board: &mut Board,
    them: &mut Player,
    from: Square,
    to: Square,
    capture_at: Option<Square>,
    probe: impl FnOnce(&Board, &Player) -> R,
) -> R {
    let captured = capture_at.and_then(|sq| board.remove(sq));
    if let Some(victim) = captured {
        them.remove_piece(victim);
    }
    board.move_piece(from, to);

    let outcome = probe(board, them);

    board.move_piece(to, from);
    if let Some(victim) = captured {
        let square = board.piece(victim).square();
        board.place(victim, square);
        them.add_piece(board, victim);
    }

    outcome
}
