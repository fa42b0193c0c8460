/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Loading and exporting positions in [Forsyth-Edwards Notation](https://www.chessprogramming.org/Forsyth-Edwards_Notation).
//!
//! A FEN string only records board state, while en passant eligibility
//! depends on move history; loading a position with an active en passant
//! field therefore synthesizes the implied pawn double-step as the game's
//! last recorded move.

use anyhow::{bail, Context, Result};
use log::debug;

use crate::{CastleSide, Color, File, Game, Move, PieceKind, Rank, Square};

/// FEN string for the standard starting position.
pub const FEN_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Game {
    /// Creates a new [`Game`] from the provided FEN string.
    ///
    /// All six fields are required: placement, side to move, castling
    /// rights, en passant target, halfmove clock, and fullmove number.
    /// Castling rights must be consistent with the placement; rights that
    /// are absent mark the corresponding Rook as having moved, so that
    /// exporting regenerates the same rights. A `-` is tolerated for the
    /// two counters. A malformed string yields an error and no game.
    ///
    /// # Example
    /// ```
    /// # use newt::{Color, Game, FEN_STARTPOS};
    /// let game = Game::from_fen(FEN_STARTPOS).unwrap();
    /// assert_eq!(game.turn(), Color::White);
    ///
    /// assert!(Game::from_fen("not a position").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            bail!(
                "Invalid FEN string: Must contain exactly 6 fields. Got {}: {fen}",
                fields.len()
            );
        }

        let mut game = Game::empty();
        parse_placement(&mut game, fields[0])?;

        let mut turn_chars = fields[1].chars();
        let turn = match (turn_chars.next(), turn_chars.next()) {
            (Some(c), None) => Color::from_uci(c)?,
            _ => bail!("Invalid FEN side-to-move field: {}", fields[1]),
        };
        game.set_turn(turn);

        derive_moved_flags(&mut game);
        apply_castling_rights(&mut game, fields[2])?;
        apply_en_passant(&mut game, fields[3], turn)?;

        // The halfmove clock is validated but not maintained; there is no
        // 50-move rule tracking
        if fields[4] != "-" {
            fields[4]
                .parse::<u32>()
                .context(format!("Invalid FEN halfmove clock: {}", fields[4]))?;
        }

        let fullmoves = match fields[5] {
            "-" => 1,
            field => field
                .parse::<u16>()
                .context(format!("Invalid FEN fullmove number: {field}"))?,
        };
        game.set_fullmoves(fullmoves);

        debug!("loaded position {fen}");
        Ok(game)
    }

    /// Exports the current position as a FEN string, regenerating every
    /// field from live state.
    ///
    /// Castling rights are derived from moved-flags, the en passant field
    /// from the last recorded move. The halfmove clock always exports as
    /// `0`, since no 50-move rule is maintained.
    ///
    /// # Example
    /// ```
    /// # use newt::{Game, FEN_STARTPOS};
    /// let game = Game::new();
    /// assert_eq!(game.to_fen(), FEN_STARTPOS);
    /// ```
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in Rank::iter().rev() {
            let mut empty = 0;
            for file in File::iter() {
                match self.board().piece_on(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.to_uci());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank != Rank::ONE {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(self.turn().to_uci());

        fen.push(' ');
        let mut rights = String::new();
        for (ch, color, side) in [
            ('K', Color::White, CastleSide::Short),
            ('Q', Color::White, CastleSide::Long),
            ('k', Color::Black, CastleSide::Short),
            ('q', Color::Black, CastleSide::Long),
        ] {
            if self.castle_right(color, side) {
                rights.push(ch);
            }
        }
        fen.push_str(if rights.is_empty() { "-" } else { &rights });

        fen.push(' ');
        match self.en_passant_target() {
            Some(sq) => fen.push_str(&sq.to_uci()),
            None => fen.push('-'),
        }

        fen.push_str(" 0 ");
        fen.push_str(&self.fullmoves().to_string());

        fen
    }

    /// Returns `true` if `color` retains the right to castle on `side`:
    /// its King stands unmoved on its home square and the matching Rook
    /// stands unmoved on its corner.
    ///
    /// This is a right, not a legal move; the path may still be blocked or
    /// attacked this turn.
    pub fn castle_right(&self, color: Color, side: CastleSide) -> bool {
        let player = self.player(color);
        if !player.has_king() {
            return false;
        }

        let king = self.board().piece(player.king());
        if king.has_moved() || king.square() != CastleSide::king_home(color) {
            return false;
        }

        matches!(
            self.board().piece_on(side.rook_home(color)),
            Some(rook)
                if rook.kind() == PieceKind::Rook
                    && rook.color() == color
                    && !rook.has_moved()
        )
    }

    /// The en passant target square implied by the last recorded move:
    /// the square skipped by a pawn that just double-stepped, if any.
    pub fn en_passant_target(&self) -> Option<Square> {
        let last = self.history().last()?;
        if !last.is_double_step(self.board()) {
            return None;
        }

        let mover = self.board().piece(last.piece()).color();
        last.from().forward_by(mover, 1)
    }
}

fn parse_placement(game: &mut Game, placement: &str) -> Result<()> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        bail!(
            "Invalid FEN placement: Must contain exactly 8 ranks. Got {}: {placement}",
            ranks.len()
        );
    }

    for (rank, rank_str) in Rank::iter().rev().zip(ranks) {
        let mut file = 0u8;
        for ch in rank_str.chars() {
            if let Some(skip) = ch.to_digit(10) {
                if skip < 1 || skip > 8 {
                    bail!("Invalid FEN placement: Bad empty-square count {ch} on rank {rank}");
                }
                file += skip as u8;
                if file > 8 {
                    bail!("Invalid FEN placement: Rank {rank} spans more than 8 files");
                }
                continue;
            }

            let kind = PieceKind::from_uci(ch)
                .context(format!("Invalid FEN placement on rank {rank}"))?;
            let color = Color::from_case(ch);

            if file > File::MAX {
                bail!("Invalid FEN placement: Rank {rank} spans more than 8 files");
            }
            if kind == PieceKind::King && game.player(color).has_king() {
                bail!("Invalid FEN placement: The {color} player has more than one king");
            }

            game.put(color, kind, Square::new(File::new(file)?, rank));
            file += 1;
        }

        if file != 8 {
            bail!("Invalid FEN placement: Rank {rank} does not cover all 8 files");
        }
    }

    for color in Color::all() {
        if !game.player(color).has_king() {
            bail!("Invalid FEN placement: The {color} player has no king");
        }
    }

    Ok(())
}

/// Marks Kings and Rooks standing away from their home squares as moved;
/// the castling-rights field then only ever *revokes* rights.
fn derive_moved_flags(game: &mut Game) {
    for color in Color::all() {
        let (board, us, _) = game.split_for(color);

        let king = us.king();
        if board.piece(king).square() != CastleSide::king_home(color) {
            board.piece_mut(king).set_moved(true);
        }

        let corners = [
            CastleSide::Short.rook_home(color),
            CastleSide::Long.rook_home(color),
        ];
        for &id in us.pieces() {
            let piece = board.piece(id);
            if piece.kind() == PieceKind::Rook && !corners.contains(&piece.square()) {
                board.piece_mut(id).set_moved(true);
            }
        }
    }
}

fn apply_castling_rights(game: &mut Game, field: &str) -> Result<()> {
    if field != "-" {
        if field.is_empty() || field.len() > 4 {
            bail!("Invalid FEN castling field: {field}");
        }
        for (i, ch) in field.char_indices() {
            if !"KQkq".contains(ch) || field[..i].contains(ch) {
                bail!("Invalid FEN castling field: {field}");
            }
        }
    }

    for (ch, color, side) in [
        ('K', Color::White, CastleSide::Short),
        ('Q', Color::White, CastleSide::Long),
        ('k', Color::Black, CastleSide::Short),
        ('q', Color::Black, CastleSide::Long),
    ] {
        let granted = field != "-" && field.contains(ch);
        let (board, us, _) = game.split_for(color);

        let rook = board.piece_at(side.rook_home(color)).filter(|&id| {
            let piece = board.piece(id);
            piece.kind() == PieceKind::Rook && piece.color() == color && !piece.has_moved()
        });
        let king_ready = !board.piece(us.king()).has_moved();

        if granted {
            if !king_ready || rook.is_none() {
                bail!("Invalid FEN: Castling right '{ch}' is inconsistent with the placement");
            }
        } else if let Some(rook) = rook {
            // No right: this rook must be treated as having moved
            board.piece_mut(rook).set_moved(true);
        }
    }

    Ok(())
}

fn apply_en_passant(game: &mut Game, field: &str, turn: Color) -> Result<()> {
    if field == "-" {
        return Ok(());
    }

    let target = Square::from_uci(field).context("Invalid FEN en passant field")?;
    if target.rank() != Rank::sixth(turn) {
        bail!("Invalid FEN: En passant square {target} is unreachable with {turn} to move");
    }

    let pawn_square = Square::new(target.file(), Rank::fifth(turn));
    let from = Square::new(target.file(), Rank::seventh(turn));

    let Some(pawn) = game.board().piece_at(pawn_square) else {
        bail!("Invalid FEN: No pawn on {pawn_square} to justify en passant square {target}");
    };
    let piece = game.board().piece(pawn);
    if piece.kind() != PieceKind::Pawn || piece.color() == turn {
        bail!("Invalid FEN: No enemy pawn on {pawn_square} to justify en passant square {target}");
    }
    if !game.board().is_empty(target) || !game.board().is_empty(from) {
        bail!("Invalid FEN: En passant square {target} implies a double-step that cannot have happened");
    }

    // Synthesize the double-step so eligibility can be judged off history
    let (board, _, _) = game.split_for(turn);
    board.piece_mut(pawn).set_moved(true);
    game.history_mut().record(Move::double_step(pawn, from, pawn_square));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_roundtrip() {
        let game = Game::from_fen(FEN_STARTPOS).unwrap();
        assert_eq!(game.to_fen(), FEN_STARTPOS);
        assert_eq!(game.board().piece_count(), 32);
        assert!(game.castle_right(Color::White, CastleSide::Short));
        assert!(game.castle_right(Color::Black, CastleSide::Long));
    }

    #[test]
    fn test_malformed_fens_are_rejected() {
        // Too few fields
        assert!(Game::from_fen("8/8/8/8/8/8/8/8 w - -").is_err());
        // Bad rank count
        assert!(Game::from_fen("8/8/8/8/8/8/8 w - - 0 1").is_err());
        // Rank spanning more than 8 files
        assert!(Game::from_fen("9/8/8/8/8/8/8/8 w - - 0 1").is_err());
        // Missing kings
        assert!(Game::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
        // Two kings for one side
        assert!(Game::from_fen("kk6/8/8/8/8/8/8/K7 w - - 0 1").is_err());
        // Bad side to move
        assert!(Game::from_fen("k7/8/8/8/8/8/8/K7 x - - 0 1").is_err());
        // Castling right with no rook to back it
        assert!(Game::from_fen("k7/8/8/8/8/8/8/4K3 w K - 0 1").is_err());
    }

    #[test]
    fn test_counter_placeholders_are_tolerated() {
        let game = Game::from_fen("k7/8/8/8/8/8/8/K7 w - - - -").unwrap();
        assert_eq!(game.fullmoves(), 1);
    }

    #[test]
    fn test_revoked_rights_mark_rooks_moved() {
        // Everything on its home square, but only White may castle short
        let game =
            Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w K - 0 1").unwrap();
        assert!(game.castle_right(Color::White, CastleSide::Short));
        assert!(!game.castle_right(Color::White, CastleSide::Long));
        assert!(!game.castle_right(Color::Black, CastleSide::Short));
        assert!(!game.castle_right(Color::Black, CastleSide::Long));
        // And the export agrees
        assert_eq!(game.to_fen(), "r3k2r/8/8/8/8/8/8/R3K2R w K - 0 1");
    }

    #[test]
    fn test_en_passant_field_synthesizes_history() {
        // Black just double-stepped d7d5; White's e5 pawn may capture
        let mut game =
            Game::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let last = *game.history().last().unwrap();
        assert!(last.is_double_step(game.board()));
        assert_eq!(game.en_passant_target(), Some(Square::D6));

        assert!(game.play_turn(Square::E5, Square::D6, None).is_ok());
        assert!(game.board().is_empty(Square::D5));

        // An en passant square with nothing to justify it is rejected
        assert!(Game::from_fen("4k3/8/8/4P3/8/8/8/4K3 w - d6 0 1").is_err());
    }

    #[test]
    fn test_export_reflects_play() {
        let mut game = Game::new();
        game.play_turn(Square::E2, Square::E4, None).unwrap();
        assert_eq!(
            game.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );

        game.play_turn(Square::G8, Square::F6, None).unwrap();
        assert_eq!(
            game.to_fen(),
            "rnbqkb1r/pppppppp/5n2/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
        );
    }
}
