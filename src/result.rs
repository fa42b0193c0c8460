/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Board, Move, PieceKind, Player};

/// The terminal state of a game, derived from the two players and the board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GameResult {
    /// The game continues.
    Ongoing,
    /// Black is checkmated.
    WhiteWon,
    /// White is checkmated.
    BlackWon,
    /// A side has no legal move while not in check.
    Stalemate,
    /// Neither side has enough material left to force mate.
    Draw,
}

impl GameResult {
    /// Returns `true` unless the game is still ongoing.
    #[inline(always)]
    pub const fn is_over(&self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ongoing => "ongoing",
            Self::WhiteWon => "white won",
            Self::BlackWon => "black won",
            Self::Stalemate => "stalemate",
            Self::Draw => "draw",
        };
        s.fmt(f)
    }
}

/// Derives the [`GameResult`] of a position.
///
/// Refreshes both players' legal moves (`last_move` feeds en passant
/// eligibility), then checks for checkmate, stalemate, and insufficient
/// material, in that order.
pub fn evaluate(
    board: &mut Board,
    white: &mut Player,
    black: &mut Player,
    last_move: Option<&Move>,
) -> GameResult {
    white.refresh_legal_moves(board, black, last_move);
    black.refresh_legal_moves(board, white, last_move);

    if black.is_checkmated(board, white) {
        GameResult::WhiteWon
    } else if white.is_checkmated(board, black) {
        GameResult::BlackWon
    } else if white.is_stalemated(board, black) || black.is_stalemated(board, white) {
        GameResult::Stalemate
    } else if is_insufficient_material(board, white, black) {
        GameResult::Draw
    } else {
        GameResult::Ongoing
    }
}

/// Returns `true` if neither side can possibly force mate:
/// King against King, a King and at most two minor pieces against a bare
/// King, or a King and one minor piece each. Never with a Queen, Rook, or
/// Pawn on the board, and never with a pair of Bishops on one side.
pub fn is_insufficient_material(board: &Board, white: &Player, black: &Player) -> bool {
    if board.piece_count() >= 5 {
        return false;
    }
    if white.pieces().len() >= 4 || black.pieces().len() >= 4 {
        return false;
    }

    for (_, id) in board.occupied() {
        if matches!(
            board.piece(id).kind(),
            PieceKind::Queen | PieceKind::Pawn | PieceKind::Rook
        ) {
            return false;
        }
    }

    for player in [white, black] {
        let bishops = player
            .pieces()
            .iter()
            .filter(|&&id| board.piece(id).kind() == PieceKind::Bishop)
            .count();
        if bishops >= 2 {
            return false;
        }
    }

    true
}
