use recon_core::{Bitboard, BoardModel, Color, Move, Piece, Role, Square, sense_region};

fn piece(color: Color, role: Role) -> Piece {
    Piece { color, role }
}

#[test]
fn sense_overwrites_contradicting_belief() {
    let mut model = BoardModel::starting(Color::White);
    let region = vec![
        (Square::D7, None),
        (Square::E7, Some(piece(Color::Black, Role::Knight))),
        (Square::D6, Some(piece(Color::Black, Role::Pawn))),
        (Square::E6, None),
    ];
    model.apply_sense(&region);

    for (square, observed) in &region {
        assert_eq!(model.piece_at(*square), *observed, "{square}");
    }
}

#[test]
fn full_region_sense_of_empty_squares_clears_belief() {
    let mut model = BoardModel::starting(Color::Black);
    let region: Vec<_> = sense_region(Square::B2)
        .into_iter()
        .map(|square| (square, None))
        .collect();
    model.apply_sense(&region);
    for square in sense_region(Square::B2) {
        assert_eq!(model.piece_at(square), None);
    }
    assert_eq!(model.piece_at(Square::D1), Some(piece(Color::White, Role::Queen)));
}

#[test]
fn revealed_king_retires_stale_copy() {
    let mut model = BoardModel::starting(Color::White);
    assert_eq!(model.king_square(Color::Black), Some(Square::E8));

    model.apply_sense(&[(Square::F7, Some(piece(Color::Black, Role::King)))]);

    assert_eq!(model.king_square(Color::Black), Some(Square::F7));
    assert_eq!(model.piece_at(Square::E8), None);
}

#[test]
fn king_is_absent_after_capture_clear() {
    let mut model = BoardModel::starting(Color::Black);
    model.apply_opponent_capture(Square::E1);
    assert_eq!(model.king_square(Color::White), None);
    assert_eq!(model.king_square(Color::Black), Some(Square::E8));
}

#[test]
fn attackers_are_computed_against_belief() {
    let model =
        BoardModel::from_fen("4k3/8/8/8/8/8/3N4/R3K3 w - - 0 1", Color::White).unwrap();
    let attackers = model.attackers_of(Color::White, Square::E8);
    assert!(attackers.is_empty());

    let attackers = model.attackers_of(Color::White, Square::A8);
    assert_eq!(attackers, Bitboard::from_square(Square::A1));

    let attackers = model.attackers_of(Color::White, Square::E4);
    assert_eq!(attackers, Bitboard::from_square(Square::D2));
}

#[test]
fn own_moves_replay_captures() {
    let mut model =
        BoardModel::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", Color::White).unwrap();
    model.apply_own_move(Some(&Move::new(Square::E4, Square::D5)));
    assert_eq!(model.piece_at(Square::D5), Some(piece(Color::White, Role::Pawn)));
    assert_eq!(model.piece_at(Square::E4), None);
}

#[test]
fn snapshot_forces_side_to_move() {
    let model = BoardModel::starting(Color::Black);
    let fen = model.fen(Color::Black);
    assert!(fen.starts_with("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b "));
    assert_eq!(model.snapshot(Color::White).turn, Color::White);
}

#[test]
fn own_drop_places_piece_without_lifting_anything() {
    let mut model = BoardModel::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1", Color::White).unwrap();
    let before_white = model.board().by_color(Color::White).count();

    model.apply_own_move(Some(&"N@f3".parse::<Move>().unwrap()));

    assert_eq!(model.piece_at(Square::F3), Some(piece(Color::White, Role::Knight)));
    assert_eq!(model.piece_at(Square::E1), Some(piece(Color::White, Role::King)));
    assert_eq!(model.board().by_color(Color::White).count(), before_white + 1);
}
