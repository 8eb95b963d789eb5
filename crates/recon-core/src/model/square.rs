use shakmaty::{Bitboard, Color, Square, attacks};

/// Mirrors `square` across the horizontal midline: `(file, 7 - rank)`.
pub fn flipped(square: Square) -> Square {
    square.flip_vertical()
}

/// Maps a square authored from White's side of the board onto `color`'s side.
pub fn flipped_for(color: Color, square: Square) -> Square {
    match color {
        Color::White => square,
        Color::Black => flipped(square),
    }
}

/// Rank of `square` counted from `color`'s own back rank, in `0..=7`.
pub fn relative_rank(color: Color, square: Square) -> u32 {
    let rank = square.rank() as u32;
    match color {
        Color::White => rank,
        Color::Black => 7 - rank,
    }
}

/// The 3x3 window revealed by sensing at `center`, clipped to the board edge.
pub fn sense_region(center: Square) -> Bitboard {
    attacks::king_attacks(center) | Bitboard::from_square(center)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_is_an_involution_on_every_square() {
        for square in Bitboard::FULL {
            assert_eq!(flipped(flipped(square)), square);
            assert_eq!(flipped(square).file(), square.file());
            assert_eq!(
                flipped(square).rank() as u32,
                7 - square.rank() as u32,
                "{square}"
            );
        }
    }

    #[test]
    fn flip_maps_known_squares() {
        assert_eq!(flipped(Square::E2), Square::E7);
        assert_eq!(flipped(Square::B4), Square::B5);
        assert_eq!(flipped(Square::A1), Square::A8);
    }

    #[test]
    fn flipped_for_only_mirrors_black() {
        assert_eq!(flipped_for(Color::White, Square::D7), Square::D7);
        assert_eq!(flipped_for(Color::Black, Square::D7), Square::D2);
    }

    #[test]
    fn relative_rank_counts_from_own_side() {
        assert_eq!(relative_rank(Color::White, Square::E1), 0);
        assert_eq!(relative_rank(Color::Black, Square::E8), 0);
        assert_eq!(relative_rank(Color::Black, Square::E4), 4);
    }

    #[test]
    fn sense_region_is_clipped_at_edges() {
        assert_eq!(sense_region(Square::E4).count(), 9);
        assert_eq!(sense_region(Square::A1).count(), 4);
        assert_eq!(sense_region(Square::H5).count(), 6);
        assert!(sense_region(Square::A1).contains(Square::B2));
        assert!(!sense_region(Square::A1).contains(Square::C3));
    }
}
