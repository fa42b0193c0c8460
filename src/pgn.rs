/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Emitting and resolving moves in [Standard Algebraic Notation](https://www.chessprogramming.org/Algebraic_Chess_Notation),
//! the move notation used by PGN.

use anyhow::{bail, Context, Result};

use crate::{executer, CastleSide, File, Game, Move, MoveKind, PieceId, PieceKind, Rank, Square};

impl Game {
    /// Emits the SAN string for a legal move of the side to move, without
    /// playing it.
    ///
    /// Pawn moves read `e4` / `exd5` / `e8=Q`, castles `O-O` / `O-O-O`,
    /// piece moves carry a file, rank, or full-square disambiguator whenever
    /// another piece of the same kind could also reach the target. A `+` or
    /// `#` suffix is derived by applying the move, inspecting the opponent,
    /// and reverting.
    ///
    /// # Example
    /// ```
    /// # use newt::{Game, Square};
    /// let mut game = Game::new();
    /// assert_eq!(game.san(Square::E2, Square::E4, None).unwrap(), "e4");
    /// assert_eq!(game.san(Square::G1, Square::F3, None).unwrap(), "Nf3");
    /// ```
    pub fn san(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<String> {
        let Some(id) = self.board().piece_at(from) else {
            bail!("No piece on {from}");
        };
        let turn = self.turn();
        if self.board().piece(id).color() != turn {
            bail!("The piece on {from} does not belong to the {turn} player");
        }

        self.refresh_legal_moves();
        if !self.board().piece(id).legal_moves().contains(&to) {
            bail!("Moving from {from} to {to} is not legal");
        }
        let mv = Move::new(self.board(), id, to, promotion)?;

        let mut san = match mv.kind() {
            MoveKind::Castle(CastleSide::Short) => String::from("O-O"),
            MoveKind::Castle(CastleSide::Long) => String::from("O-O-O"),
            _ if self.board().piece(id).kind() == PieceKind::Pawn => {
                let mut san = String::new();
                if mv.is_capture() {
                    san.push(from.file().char());
                    san.push('x');
                }
                san.push_str(&to.to_uci());
                if let Some(kind) = mv.promotion() {
                    san.push('=');
                    san.push(kind.to_uci().to_ascii_uppercase());
                }
                san
            }
            _ => {
                let mut san = String::new();
                san.push(self.board().piece(id).kind().to_uci().to_ascii_uppercase());
                san.push_str(&self.disambiguator(id, to));
                if mv.is_capture() {
                    san.push('x');
                }
                san.push_str(&to.to_uci());
                san
            }
        };

        // Play the move, look at the opponent, take it back
        let (board, us, them) = self.split_for(turn);
        executer::execute(board, us, them, &mv);
        them.refresh_legal_moves(board, us, Some(&mv));
        if them.is_checkmated(board, us) {
            san.push('#');
        } else if them.is_in_check(board, us) {
            san.push('+');
        }
        executer::undo(board, us, them, &mv);

        Ok(san)
    }

    /// Resolves a SAN token into a `(from, to, promotion)` triple for the
    /// side to move.
    ///
    /// The mover's legal-move candidates are filtered by piece kind, target
    /// square, and the optional disambiguator; resolution fails when zero or
    /// more than one candidate remains. Trailing check/mate/annotation
    /// glyphs are ignored.
    ///
    /// # Example
    /// ```
    /// # use newt::{Game, Square};
    /// let mut game = Game::new();
    /// let (from, to, promotion) = game.parse_san("Nf3").unwrap();
    /// assert_eq!((from, to, promotion), (Square::G1, Square::F3, None));
    ///
    /// assert!(game.parse_san("Qh5").is_err()); // blocked in
    /// ```
    pub fn parse_san(&mut self, san: &str) -> Result<(Square, Square, Option<PieceKind>)> {
        let turn = self.turn();
        self.refresh_legal_moves();

        let token = san.trim().trim_end_matches(['+', '#', '!', '?']);
        if token.is_empty() || !token.is_ascii() {
            bail!("Invalid SAN token: {san}");
        }

        match token {
            "O-O" | "0-0" => return self.resolve_castle(CastleSide::Short),
            "O-O-O" | "0-0-0" => return self.resolve_castle(CastleSide::Long),
            _ => {}
        }

        let mut rest = token;

        let mut promotion = None;
        if let Some((head, tail)) = rest.rsplit_once('=') {
            let kind = match tail.chars().next() {
                Some(c) if tail.len() == 1 => PieceKind::from_uci(c)?,
                _ => bail!("Invalid promotion in SAN token {san}"),
            };
            if !kind.is_promotion_target() {
                bail!("Invalid promotion in SAN token {san}");
            }
            promotion = Some(kind);
            rest = head;
        }

        if rest.len() < 2 {
            bail!("Invalid SAN token {san}");
        }
        let (mut head, target) = rest.split_at(rest.len() - 2);
        let to = Square::from_uci(target)
            .context(format!("Invalid target square in SAN token {san}"))?;

        head = head.strip_suffix('x').unwrap_or(head);

        let kind = match head.chars().next() {
            Some(c) if c.is_ascii_uppercase() => {
                head = &head[1..];
                PieceKind::from_uci(c)?
            }
            _ => PieceKind::Pawn,
        };

        let mut want_file = None;
        let mut want_rank = None;
        for ch in head.chars() {
            match ch {
                'a'..='h' if want_file.is_none() => want_file = Some(File::from_char(ch)?),
                '1'..='8' if want_rank.is_none() => want_rank = Some(Rank::from_char(ch)?),
                _ => bail!("Invalid disambiguator in SAN token {san}"),
            }
        }

        if kind == PieceKind::Pawn && to.rank() == Rank::eighth(turn) {
            if promotion.is_none() {
                bail!("SAN token {san} must carry a promotion kind");
            }
        } else if promotion.is_some() {
            bail!("SAN token {san} must not carry a promotion kind");
        }

        let mut candidates = self.player(turn).pieces().iter().copied().filter(|&id| {
            let piece = self.board().piece(id);
            piece.kind() == kind
                && piece.legal_moves().contains(&to)
                && want_file.map_or(true, |file| piece.square().file() == file)
                && want_rank.map_or(true, |rank| piece.square().rank() == rank)
        });

        let Some(candidate) = candidates.next() else {
            bail!("SAN token {san} matches no legal move");
        };
        if candidates.next().is_some() {
            bail!("SAN token {san} is ambiguous");
        }

        Ok((self.board().piece(candidate).square(), to, promotion))
    }

    fn resolve_castle(&self, side: CastleSide) -> Result<(Square, Square, Option<PieceKind>)> {
        let turn = self.turn();
        let king = self.board().piece(self.player(turn).king());
        let target = side.king_target(turn);
        if !king.legal_moves().contains(&target) {
            bail!("Castling is not legal for the {turn} player");
        }
        Ok((king.square(), target, None))
    }

    /// The smallest origin marker distinguishing the mover from every other
    /// same-kind piece that can also legally reach `to`: nothing, the file,
    /// the rank, or the full square.
    fn disambiguator(&self, id: PieceId, to: Square) -> String {
        let piece = self.board().piece(id);
        let from = piece.square();

        let rivals: Vec<Square> = self
            .player(piece.color())
            .pieces()
            .iter()
            .filter(|&&other| other != id)
            .map(|&other| self.board().piece(other))
            .filter(|other| other.kind() == piece.kind() && other.legal_moves().contains(&to))
            .map(|other| other.square())
            .collect();

        if rivals.is_empty() {
            String::new()
        } else if rivals.iter().all(|sq| sq.file() != from.file()) {
            from.file().char().to_string()
        } else if rivals.iter().all(|sq| sq.rank() != from.rank()) {
            from.rank().char().to_string()
        } else {
            from.to_uci()
        }
    }
}
