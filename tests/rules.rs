/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use newt::{movegen, Color, Game, GameResult, PieceKind, Square};

#[test]
fn test_castling_end_to_end() {
    let mut game = Game::empty();
    game.put(Color::White, PieceKind::King, Square::E1);
    game.put(Color::White, PieceKind::Rook, Square::H1);
    game.put(Color::Black, PieceKind::King, Square::E8);

    assert!(game.legal_targets(Square::E1).contains(&Square::G1));
    game.play_turn(Square::E1, Square::G1, None).unwrap();

    let king = game.board().piece_at(Square::G1).unwrap();
    let rook = game.board().piece_at(Square::F1).unwrap();
    assert_eq!(game.board().piece(king).kind(), PieceKind::King);
    assert_eq!(game.board().piece(rook).kind(), PieceKind::Rook);
    assert!(game.board().piece(king).has_moved());
    assert!(game.board().piece(rook).has_moved());
    assert!(game.board().is_empty(Square::E1));
    assert!(game.board().is_empty(Square::H1));
}

#[test]
fn test_castling_undo_restores_rights() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    let mut game = Game::from_fen(fen).unwrap();

    game.play_turn(Square::E1, Square::G1, None).unwrap();
    assert_eq!(
        game.to_fen(),
        "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 0 1"
    );

    assert!(game.undo());
    assert_eq!(game.to_fen(), fen);
}

#[test]
fn test_en_passant_end_to_end() {
    let mut game = Game::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();

    // Black double-steps beside the white pawn
    game.play_turn(Square::D7, Square::D5, None).unwrap();
    assert!(game.legal_targets(Square::E5).contains(&Square::D6));

    game.play_turn(Square::E5, Square::D6, None).unwrap();
    // The victim leaves d5; the capturer lands on d6
    assert!(game.board().is_empty(Square::D5));
    let pawn = game.board().piece_on(Square::D6).unwrap();
    assert_eq!(pawn.kind(), PieceKind::Pawn);
    assert_eq!(pawn.color(), Color::White);
    assert!(game.player(Color::Black).pieces().len() == 1);
}

#[test]
fn test_en_passant_expires_after_one_ply() {
    let mut game =
        Game::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
    game.play_turn(Square::D7, Square::D5, None).unwrap();

    // White plays something else; the en passant window closes
    game.play_turn(Square::E1, Square::E2, None).unwrap();
    game.play_turn(Square::E8, Square::E7, None).unwrap();
    assert!(!game.legal_targets(Square::E5).contains(&Square::D6));
}

#[test]
fn test_back_rank_checkmate() {
    let mut game = Game::from_fen("6k1/8/8/8/8/8/5PPP/r5K1 w - - 0 1").unwrap();

    assert!(game.is_in_check(Color::White));
    assert!(game.is_checkmated(Color::White));
    assert_eq!(game.result(), GameResult::BlackWon);
}

#[test]
fn test_stalemate() {
    let mut game = Game::from_fen("8/8/8/8/8/6q1/5k2/7K w - - 0 1").unwrap();

    assert!(!game.is_in_check(Color::White));
    assert!(game.is_stalemated(Color::White));
    assert_eq!(game.result(), GameResult::Stalemate);
}

#[test]
fn test_fools_mate() {
    let mut game = Game::new();
    game.play_turn(Square::F2, Square::F3, None).unwrap();
    game.play_turn(Square::E7, Square::E5, None).unwrap();
    game.play_turn(Square::G2, Square::G4, None).unwrap();

    assert_eq!(game.san(Square::D8, Square::H4, None).unwrap(), "Qh4#");
    game.play_turn(Square::D8, Square::H4, None).unwrap();

    assert!(game.is_checkmated(Color::White));
    assert_eq!(game.result(), GameResult::BlackWon);
}

#[test]
fn test_promotion_requires_a_kind() {
    let mut game = Game::from_fen("7k/P7/8/8/8/8/8/7K w - - 0 1").unwrap();
    let before = game.to_fen();

    // No kind supplied: rejected, nothing changes
    assert!(game.play_turn(Square::A7, Square::A8, None).is_err());
    assert_eq!(game.to_fen(), before);
    assert_eq!(game.turn(), Color::White);

    // An extraneous kind on an ordinary move is rejected too
    assert!(game
        .play_turn(Square::H1, Square::H2, Some(PieceKind::Queen))
        .is_err());

    game.play_turn(Square::A7, Square::A8, Some(PieceKind::Queen))
        .unwrap();
    let queen = game.board().piece_on(Square::A8).unwrap();
    assert_eq!(queen.kind(), PieceKind::Queen);
    assert_eq!(queen.color(), Color::White);
}

#[test]
fn test_undo_restores_captures_exactly() {
    let mut game = Game::new();
    game.play_turn(Square::E2, Square::E4, None).unwrap();
    game.play_turn(Square::E7, Square::E5, None).unwrap();
    game.play_turn(Square::D1, Square::H5, None).unwrap();
    game.play_turn(Square::B8, Square::C6, None).unwrap();
    let before = game.to_fen();
    let black_pieces = game.player(Color::Black).pieces().len();

    // Queen takes the f7 pawn; undo brings everything back
    game.play_turn(Square::H5, Square::F7, None).unwrap();
    assert_eq!(game.player(Color::Black).pieces().len(), black_pieces - 1);

    assert!(game.undo());
    assert_eq!(game.to_fen(), before);
    assert_eq!(game.player(Color::Black).pieces().len(), black_pieces);
}

#[test]
fn test_record_undo_redo_equivalence() {
    let mut game = Game::new();
    game.play_turn(Square::E2, Square::E4, None).unwrap();
    let after = game.to_fen();

    assert!(game.undo());
    assert!(game.redo());
    assert_eq!(game.to_fen(), after);
    assert_eq!(game.history().len(), 1);

    // Empty stacks are reported no-ops
    assert!(!game.redo());
    game.undo();
    assert!(!game.undo());
    assert_eq!(game.to_fen(), Game::new().to_fen());
}

#[test]
fn test_legal_moves_are_a_subset_of_pseudo_legal_moves() {
    let mut game = Game::new();
    game.play_turn(Square::E2, Square::E4, None).unwrap();
    game.play_turn(Square::E7, Square::E5, None).unwrap();
    game.refresh_legal_moves();

    let board = game.board();
    for &id in game.player(game.turn()).pieces() {
        let piece = board.piece(id);
        let pseudo = movegen::pseudo_legal(board, id);
        let attacks = movegen::attacks(board, id);

        for target in piece.legal_moves() {
            assert!(pseudo.contains(target), "{piece} cannot reach {target}");
        }
        for target in &pseudo {
            // Pseudo-legal targets are attacks, except pawn pushes
            if piece.kind() != PieceKind::Pawn {
                assert!(attacks.contains(target));
            } else {
                assert!(attacks.contains(target) || target.file() == piece.square().file());
            }
        }
    }
}

#[test]
fn test_insufficient_material_draw_from_play() {
    // One capture away from king against king
    let mut game = Game::from_fen("4k3/8/8/8/8/8/4q3/4K3 w - - 0 1").unwrap();
    assert_eq!(game.result(), GameResult::Ongoing);

    game.play_turn(Square::E1, Square::E2, None).unwrap();
    assert_eq!(game.result(), GameResult::Draw);
}
