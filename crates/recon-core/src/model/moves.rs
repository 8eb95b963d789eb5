use crate::model::square::flipped;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use shakmaty::uci::UciMove;
use shakmaty::{Role, Square};

/// A requested or executed move: source, destination and optional
/// promotion/drop metadata. Drops use `from == to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
    pub drop: Option<Role>,
}

impl Move {
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
            drop: None,
        }
    }

    pub const fn with_promotion(from: Square, to: Square, role: Role) -> Self {
        Self {
            from,
            to,
            promotion: Some(role),
            drop: None,
        }
    }

    pub const fn drop_at(role: Role, to: Square) -> Self {
        Self {
            from: to,
            to,
            promotion: None,
            drop: Some(role),
        }
    }

    /// Mirrors both endpoints, keeping promotion and drop untouched.
    pub fn flipped(self) -> Self {
        Self {
            from: flipped(self.from),
            to: flipped(self.to),
            promotion: self.promotion,
            drop: self.drop,
        }
    }

    /// UCI form understood by engines and hosts.
    pub fn to_uci(self) -> UciMove {
        match self.drop {
            Some(role) => UciMove::Put { role, to: self.to },
            None => UciMove::Normal {
                from: self.from,
                to: self.to,
                promotion: self.promotion,
            },
        }
    }

    /// `None` for the null move `0000`.
    pub fn from_uci(uci: UciMove) -> Option<Self> {
        match uci {
            UciMove::Normal {
                from,
                to,
                promotion,
            } => Some(Self {
                from,
                to,
                promotion,
                drop: None,
            }),
            UciMove::Put { role, to } => Some(Self::drop_at(role, to)),
            UciMove::Null => None,
        }
    }

    /// Parses UCI notation where `0000` (a pass) is allowed.
    pub fn parse_or_null(raw: &str) -> Result<Option<Self>, ParseMoveError> {
        let raw = raw.trim();
        raw.parse::<UciMove>()
            .map(Self::from_uci)
            .map_err(|_| ParseMoveError::Notation(raw.to_string()))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_uci(), f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseMoveError {
    /// Not UCI long algebraic notation.
    Notation(String),
    /// `0000` where a real move is required.
    NullMove,
}

impl fmt::Display for ParseMoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMoveError::Notation(raw) => write!(f, "invalid uci move '{raw}'"),
            ParseMoveError::NullMove => f.write_str("null move where a move is required"),
        }
    }
}

impl std::error::Error for ParseMoveError {}

impl FromStr for Move {
    type Err = ParseMoveError;

    /// Parses UCI long algebraic notation (`e2e4`, `e7e8q`, `N@f3`).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse_or_null(raw)?.ok_or(ParseMoveError::NullMove)
    }
}

impl TryFrom<String> for Move {
    type Error = ParseMoveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Move> for String {
    fn from(value: Move) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_uci() {
        let mv: Move = "e2e4".parse().unwrap();
        assert_eq!(mv, Move::new(Square::E2, Square::E4));
        assert_eq!(mv.to_string(), "e2e4");

        let promo: Move = "a7a8q".parse().unwrap();
        assert_eq!(promo.promotion, Some(Role::Queen));
        assert_eq!(promo.to_string(), "a7a8q");

        let drop: Move = "N@f3".parse().unwrap();
        assert_eq!(drop, Move::drop_at(Role::Knight, Square::F3));
        assert_eq!(drop.to_string(), "N@f3");
    }

    #[test]
    fn rejects_malformed_notation() {
        for raw in ["e2", "e2z4", "e7e8x", "é2e4"] {
            assert_eq!(
                raw.parse::<Move>(),
                Err(ParseMoveError::Notation(raw.to_string()))
            );
        }
    }

    #[test]
    fn null_move_is_a_pass_not_a_move() {
        assert_eq!(Move::parse_or_null("0000"), Ok(None));
        assert_eq!("0000".parse::<Move>(), Err(ParseMoveError::NullMove));
        assert_eq!(
            Move::parse_or_null(" g1f3 "),
            Ok(Some(Move::new(Square::G1, Square::F3)))
        );
    }

    #[test]
    fn flipped_move_keeps_metadata() {
        let promo = Move::with_promotion(Square::B7, Square::B8, Role::Knight);
        let flipped = promo.flipped();
        assert_eq!(flipped.from, Square::B2);
        assert_eq!(flipped.to, Square::B1);
        assert_eq!(flipped.promotion, Some(Role::Knight));
        assert_eq!(flipped.flipped(), promo);

        let drop = Move::drop_at(Role::Pawn, Square::C3);
        assert_eq!(drop.flipped().drop, Some(Role::Pawn));
        assert_eq!(drop.flipped().flipped(), drop);
    }

    #[test]
    fn serde_uses_uci_strings() {
        let mv = Move::new(Square::G1, Square::F3);
        let json = serde_json::to_string(&mv).unwrap();
        assert_eq!(json, "\"g1f3\"");
        let back: Move = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mv);
    }
}
