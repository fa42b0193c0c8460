/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use crate::{Board, Direction, PieceId, PieceKind, Rank, Square};

/// Maximum number of squares a single piece can reach.
///
/// A Queen in the center of an open board reaches 27 squares; a King reaches
/// 8, plus 2 castling targets. 32 comfortably bounds every piece.
pub const MAX_PIECE_TARGETS: usize = 32;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_PIECE_TARGETS`] squares.
pub type TargetList = ArrayVec<Square, MAX_PIECE_TARGETS>;

/// Computes the squares threatened by the piece `id`, ignoring the color of
/// whatever occupies them and ignoring checks.
///
/// Sliding pieces stop at (and include) the first occupied square of a ray.
/// Pawns threaten their two capture diagonals regardless of occupancy.
///
/// # Example
/// ```
/// # use newt::*;
/// let mut board = Board::new();
/// let knight = board.spawn(Color::White, PieceKind::Knight, Square::A1);
/// let mut targets = movegen::attacks(&board, knight);
/// targets.sort();
/// assert_eq!(targets.as_slice(), [Square::C2, Square::B3]);
/// ```
pub fn attacks(board: &Board, id: PieceId) -> TargetList {
    let piece = board.piece(id);
    let from = piece.square();
    let mut targets = TargetList::new();

    match piece.kind() {
        PieceKind::King => extend_steps(&mut targets, from, &Direction::COMPASS),
        PieceKind::Knight => extend_steps(&mut targets, from, &Direction::KNIGHT_JUMPS),
        PieceKind::Rook => extend_rays(&mut targets, board, from, &Direction::ORTHOGONALS),
        PieceKind::Bishop => extend_rays(&mut targets, board, from, &Direction::DIAGONALS),
        PieceKind::Queen => extend_rays(&mut targets, board, from, &Direction::COMPASS),
        PieceKind::Pawn => {
            extend_steps(&mut targets, from, &Direction::pawn_captures(piece.color()))
        }
    }

    targets
}

/// Computes the pseudo-legal moves of the piece `id`: geometrically valid
/// targets, ignoring whether the move would expose the mover's own King.
///
/// For every kind but the Pawn this is the attack set minus squares occupied
/// by friendly pieces. A Pawn instead advances one square when it is empty,
/// two from its starting rank when both are empty, and onto its capture
/// diagonals only when an enemy piece stands there.
///
/// Squares holding the enemy King are never yielded; king capture is not a
/// chess move and is never simulated.
pub fn pseudo_legal(board: &Board, id: PieceId) -> TargetList {
    let piece = board.piece(id);
    let color = piece.color();

    if piece.kind() == PieceKind::Pawn {
        return pawn_pseudo_legal(board, id);
    }

    let mut targets = TargetList::new();
    for to in attacks(board, id) {
        match board.piece_on(to) {
            Some(other) if other.color() == color => continue,
            Some(other) if other.kind() == PieceKind::King => continue,
            _ => targets.push(to),
        }
    }

    targets
}

fn pawn_pseudo_legal(board: &Board, id: PieceId) -> TargetList {
    let piece = board.piece(id);
    let from = piece.square();
    let color = piece.color();
    let mut targets = TargetList::new();

    if let Some(one_ahead) = from.forward_by(color, 1) {
        if board.is_empty(one_ahead) {
            targets.push(one_ahead);

            // Double-step, only from the starting rank and only through air
            if from.rank() == Rank::second(color) {
                if let Some(two_ahead) = from.forward_by(color, 2) {
                    if board.is_empty(two_ahead) {
                        targets.push(two_ahead);
                    }
                }
            }
        }
    }

    for to in attacks(board, id) {
        match board.piece_on(to) {
            Some(other) if other.color() != color && other.kind() != PieceKind::King => {
                targets.push(to)
            }
            _ => continue,
        }
    }

    targets
}

#[inline(always)]
fn extend_steps(targets: &mut TargetList, from: Square, directions: &[Direction]) {
    targets.extend(directions.iter().filter_map(|&dir| from.shifted(dir)));
}

#[inline(always)]
fn extend_rays(targets: &mut TargetList, board: &Board, from: Square, directions: &[Direction]) {
    for &dir in directions {
        targets.extend(board.ray(from, dir));
    }
}
