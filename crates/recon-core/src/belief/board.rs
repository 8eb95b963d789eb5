use crate::model::moves::Move;
use shakmaty::fen::{Fen, ParseFenError};
use shakmaty::{Bitboard, Board, Color, File, Piece, Role, Setup, Square};

/// One square of a sense result: what the host says stands there now.
pub type SenseObservation = (Square, Option<Piece>);

/// Best-guess full board from the perspective of `color`.
///
/// Castling rights are kept as the rook squares that may still castle. Own
/// moves retire them; placement only masks them when rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardModel {
    board: Board,
    color: Color,
    castles: Bitboard,
}

impl BoardModel {
    /// Rights are seeded from the kings and rooks standing on their home squares.
    pub fn new(board: Board, color: Color) -> Self {
        let mut model = Self {
            board,
            color,
            castles: Bitboard::EMPTY,
        };
        model.castles = model.unmoved_rooks();
        model
    }

    /// Belief seeded with the standard starting layout.
    pub fn starting(color: Color) -> Self {
        Self::new(Board::default(), color)
    }

    /// Belief seeded from a FEN record's placement and castling fields.
    pub fn from_fen(fen: &str, color: Color) -> Result<Self, ParseFenError> {
        let fen: Fen = fen.trim().parse()?;
        let setup = fen.into_setup();
        let mut model = Self::new(setup.board, color);
        model.castles &= setup.castling_rights;
        Ok(model)
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn opponent(&self) -> Color {
        !self.color
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_at(square)
    }

    /// True when belief records a piece of the opponent on `square`.
    pub fn holds_enemy(&self, square: Square) -> bool {
        self.board
            .piece_at(square)
            .is_some_and(|piece| piece.color == self.opponent())
    }

    /// The opponent took one of our pieces on `square`; the capturer stays unknown.
    pub fn apply_opponent_capture(&mut self, square: Square) {
        self.clear_square(square);
    }

    pub fn clear_square(&mut self, square: Square) {
        let _ = self.board.remove_piece_at(square);
    }

    /// Overwrites every observed square with ground truth.
    ///
    /// A side has exactly one king, so a king revealed inside the region also
    /// retires any stale king of that colour recorded elsewhere.
    pub fn apply_sense(&mut self, region: &[SenseObservation]) {
        let mut observed = Bitboard::EMPTY;
        for (square, piece) in region {
            observed.add(*square);
            match piece {
                Some(piece) => self.board.set_piece_at(*square, *piece),
                None => self.clear_square(*square),
            }
        }

        for (_, piece) in region {
            if let Some(piece) = piece
                && piece.role == Role::King
            {
                let stale = self.board.kings() & self.board.by_color(piece.color) & !observed;
                for square in stale {
                    self.clear_square(square);
                }
            }
        }
    }

    /// Replays the move the host actually executed. `None` leaves belief untouched.
    pub fn apply_own_move(&mut self, taken: Option<&Move>) {
        let Some(mv) = taken else {
            return;
        };

        if let Some(role) = mv.drop {
            self.board.set_piece_at(
                mv.to,
                Piece {
                    color: self.color,
                    role,
                },
            );
            return;
        }

        let Some(piece) = self.board.remove_piece_at(mv.from) else {
            return;
        };

        // Leaving a corner or capturing onto one ends that rook's right.
        self.castles &= !(Bitboard::from_square(mv.from) | Bitboard::from_square(mv.to));
        if piece.role == Role::King {
            for corner in home_corners(piece.color) {
                self.castles &= !Bitboard::from_square(corner);
            }
            self.shift_castling_rook(mv.from, mv.to);
        }

        let role = mv.promotion.unwrap_or(piece.role);
        self.board.set_piece_at(
            mv.to,
            Piece {
                color: piece.color,
                role,
            },
        );
    }

    fn shift_castling_rook(&mut self, from: Square, to: Square) {
        let from_file = from.file() as i32;
        let to_file = to.file() as i32;
        if (to_file - from_file).abs() != 2 {
            return;
        }
        let rank = from.rank();
        let (rook_from, rook_to) = if to_file > from_file {
            (
                Square::from_coords(File::H, rank),
                Square::from_coords(File::F, rank),
            )
        } else {
            (
                Square::from_coords(File::A, rank),
                Square::from_coords(File::D, rank),
            )
        };
        if let Some(rook) = self.board.remove_piece_at(rook_from) {
            self.board.set_piece_at(rook_to, rook);
        }
    }

    /// Believed king location of `color`; `None` while belief holds no single king.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.board.king_of(color)
    }

    /// Pieces of `side` that attack `square` under belief occupancy.
    pub fn attackers_of(&self, side: Color, square: Square) -> Bitboard {
        self.board
            .attacks_to(square, side, self.board.occupied())
            & self.board.by_color(side)
    }

    /// Belief as a position with `turn` to move and no history attached.
    pub fn snapshot(&self, turn: Color) -> Setup {
        Setup {
            board: self.board.clone(),
            turn,
            castling_rights: self.castling_rights(),
            ..Setup::empty()
        }
    }

    /// FEN of [`BoardModel::snapshot`].
    pub fn fen(&self, turn: Color) -> String {
        Fen::from_setup(self.snapshot(turn)).to_string()
    }

    fn castling_rights(&self) -> Bitboard {
        self.castles & self.unmoved_rooks()
    }

    fn unmoved_rooks(&self) -> Bitboard {
        let mut rights = Bitboard::EMPTY;
        for color in [Color::White, Color::Black] {
            let king = Piece {
                color,
                role: Role::King,
            };
            if self.board.piece_at(king_home(color)) != Some(king) {
                continue;
            }
            for corner in home_corners(color) {
                let rook = Piece {
                    color,
                    role: Role::Rook,
                };
                if self.board.piece_at(corner) == Some(rook) {
                    rights.add(corner);
                }
            }
        }
        rights
    }
}

fn king_home(color: Color) -> Square {
    match color {
        Color::White => Square::E1,
        Color::Black => Square::E8,
    }
}

fn home_corners(color: Color) -> [Square; 2] {
    match color {
        Color::White => [Square::A1, Square::H1],
        Color::Black => [Square::A8, Square::H8],
    }
}
