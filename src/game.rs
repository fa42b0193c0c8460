/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::{bail, Result};
use log::debug;

use crate::{
    executer, result, Board, Color, GameResult, Move, MoveHistory, PieceId, PieceKind, Player,
    Square, TargetList, FEN_STARTPOS,
};

/// A game of chess: the board, both players, the side to move, and the
/// reversible move history.
///
/// The basic methods you're probably looking for are [`Game::new`],
/// [`Game::play_turn`], [`Game::undo`], [`Game::redo`], and
/// [`Game::result`].
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    white: Player,
    black: Player,
    turn: Color,
    history: MoveHistory,
    fullmoves: u16,
}

impl Game {
    /// Creates a new [`Game`] with the standard starting position.
    ///
    /// # Example
    /// ```
    /// # use newt::{Color, Game};
    /// let game = Game::new();
    /// assert_eq!(game.turn(), Color::White);
    /// assert_eq!(game.player(Color::White).pieces().len(), 16);
    /// ```
    pub fn new() -> Self {
        Self::from_fen(FEN_STARTPOS).expect("standard start position FEN is valid")
    }

    /// Creates a new [`Game`] with an empty board and White to move.
    ///
    /// Use [`Game::put`] to compose a position.
    pub fn empty() -> Self {
        Self {
            board: Board::new(),
            white: Player::new(Color::White),
            black: Player::new(Color::Black),
            turn: Color::White,
            history: MoveHistory::new(),
            fullmoves: 1,
        }
    }

    /// The current position.
    #[inline(always)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    #[inline(always)]
    pub const fn turn(&self) -> Color {
        self.turn
    }

    /// The [`Player`] of the given color.
    #[inline(always)]
    pub fn player(&self, color: Color) -> &Player {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    /// The [`Player`] whose turn it is.
    #[inline(always)]
    pub fn current_player(&self) -> &Player {
        self.player(self.turn)
    }

    /// The move history of this game.
    #[inline(always)]
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// The fullmove number: starts at 1 and increments after each of
    /// Black's moves.
    #[inline(always)]
    pub const fn fullmoves(&self) -> u16 {
        self.fullmoves
    }

    /// Creates a piece of the given color and kind on `square`, registering
    /// it with its owner.
    ///
    /// # Panics
    ///
    /// If `square` is occupied, or if the piece would be a second King for
    /// its owner.
    pub fn put(&mut self, color: Color, kind: PieceKind, square: Square) -> PieceId {
        let id = self.board.spawn(color, kind, square);
        match color {
            Color::White => self.white.add_piece(&self.board, id),
            Color::Black => self.black.add_piece(&self.board, id),
        }
        id
    }

    /// Plays one ply for the side to move.
    ///
    /// Refreshes the mover's legal moves, rejects the move if `to` is not in
    /// the moving piece's legal-move set or if the promotion argument is
    /// missing/extraneous, then executes it, records it, and passes the turn.
    ///
    /// # Example
    /// ```
    /// # use newt::{Color, Game, Square};
    /// let mut game = Game::new();
    /// assert!(game.play_turn(Square::E2, Square::E4, None).is_ok());
    /// assert_eq!(game.turn(), Color::Black);
    ///
    /// // Illegal moves are rejected, not fatal
    /// assert!(game.play_turn(Square::E7, Square::E4, None).is_err());
    /// ```
    pub fn play_turn(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<()> {
        let Some(id) = self.board.piece_at(from) else {
            bail!("No piece on {from} to move");
        };
        if self.board.piece(id).color() != self.turn {
            bail!("The piece on {from} does not belong to the {} player", self.turn);
        }

        let turn = self.turn;
        let last = self.history.last().copied();
        let (board, us, them) = self.split_for(turn);
        us.refresh_legal_moves(board, them, last.as_ref());

        if !board.piece(id).legal_moves().contains(&to) {
            bail!("Moving from {from} to {to} is not legal");
        }

        let mv = Move::new(board, id, to, promotion)?;
        executer::execute(board, us, them, &mv);

        self.history.record(mv);
        if turn == Color::Black {
            self.fullmoves += 1;
        }
        self.turn = turn.opponent();
        debug!("{turn} played {mv}");
        Ok(())
    }

    /// Takes back the most recently played move, if any, handing the turn
    /// back to its mover.
    ///
    /// Returns `false` (a reported no-op, not an error) when the history is
    /// empty. The history is trusted: the move is reverted without
    /// re-validating legality.
    pub fn undo(&mut self) -> bool {
        let Some(mv) = self.history.undo() else {
            return false;
        };

        // Hand the turn back first, then revert
        let mover = self.board.piece(mv.piece()).color();
        self.turn = mover;
        if mover == Color::Black {
            self.fullmoves -= 1;
        }

        let (board, us, them) = self.split_for(mover);
        executer::undo(board, us, them, &mv);
        debug!("took back {mv}");
        true
    }

    /// Replays the most recently undone move, if any.
    ///
    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(mv) = self.history.redo() else {
            return false;
        };

        let mover = self.board.piece(mv.piece()).color();
        {
            let (board, us, them) = self.split_for(mover);
            executer::redo(board, us, them, &mv);
        }
        if mover == Color::Black {
            self.fullmoves += 1;
        }
        self.turn = mover.opponent();
        debug!("replayed {mv}");
        true
    }

    /// The legal targets of the piece on `from`, freshly computed.
    ///
    /// Empty when the square is empty or holds an enemy piece; presentation
    /// layers use this to highlight destinations.
    pub fn legal_targets(&mut self, from: Square) -> TargetList {
        let Some(id) = self.board.piece_at(from) else {
            return TargetList::new();
        };
        if self.board.piece(id).color() != self.turn {
            return TargetList::new();
        }

        self.refresh_legal_moves();
        self.board.piece(id).legal_moves().iter().copied().collect()
    }

    /// Recomputes the legal moves of every piece the side to move owns.
    pub fn refresh_legal_moves(&mut self) {
        let turn = self.turn;
        let last = self.history.last().copied();
        let (board, us, them) = self.split_for(turn);
        us.refresh_legal_moves(board, them, last.as_ref());
    }

    /// Returns `true` if the given side's King is under attack.
    pub fn is_in_check(&self, color: Color) -> bool {
        self.player(color)
            .is_in_check(&self.board, self.player(color.opponent()))
    }

    /// Returns `true` if the given side is checkmated.
    pub fn is_checkmated(&mut self, color: Color) -> bool {
        self.refresh_for(color);
        self.player(color)
            .is_checkmated(&self.board, self.player(color.opponent()))
    }

    /// Returns `true` if the given side is stalemated.
    pub fn is_stalemated(&mut self, color: Color) -> bool {
        self.refresh_for(color);
        self.player(color)
            .is_stalemated(&self.board, self.player(color.opponent()))
    }

    /// Evaluates the terminal state of the game.
    ///
    /// Not invoked automatically by [`Game::play_turn`]; callers query it
    /// after each ply.
    pub fn result(&mut self) -> GameResult {
        let last = self.history.last().copied();
        result::evaluate(
            &mut self.board,
            &mut self.white,
            &mut self.black,
            last.as_ref(),
        )
    }

    /// Splits the game into the board and the (mover, opponent) player pair
    /// for `color`.
    pub(crate) fn split_for(&mut self, color: Color) -> (&mut Board, &mut Player, &mut Player) {
        match color {
            Color::White => (&mut self.board, &mut self.white, &mut self.black),
            Color::Black => (&mut self.board, &mut self.black, &mut self.white),
        }
    }

    fn refresh_for(&mut self, color: Color) {
        let last = self.history.last().copied();
        let (board, us, them) = self.split_for(color);
        us.refresh_legal_moves(board, them, last.as_ref());
    }

    #[inline(always)]
    pub(crate) fn set_turn(&mut self, turn: Color) {
        self.turn = turn;
    }

    #[inline(always)]
    pub(crate) fn set_fullmoves(&mut self, fullmoves: u16) {
        self.fullmoves = fullmoves;
    }

    #[inline(always)]
    pub(crate) fn history_mut(&mut self) -> &mut MoveHistory {
        &mut self.history
    }
}

impl Default for Game {
    /// Calls [`Game::new`].
    fn default() -> Self {
        Self::new()
    }
}
