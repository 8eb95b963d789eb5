use crate::bot::BotParams;
use rand::Rng;
use rand::seq::SliceRandom;
use recon_core::{Color, Role, SenseObservation, Square};
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KingSearchState {
    /// Re-sensing the believed king square; `visits` proposals made so far.
    ActivelySearching { visits: u32 },
    /// Gave up on the believed square and is waiting for a reason to probe.
    Idle,
    /// The king went missing; probing flight squares until it shows up again.
    ProxyFallback,
}

/// Sub-policy that steers sense actions toward the opponent king.
#[derive(Debug, Clone)]
pub struct KingSearch {
    state: KingSearchState,
    believed: Square,
    proxy: bool,
    threshold: u32,
    opponent: Color,
    flight: [Square; 3],
}

impl KingSearch {
    pub fn new(opponent: Color, believed: Square, flight: [Square; 3], threshold: u32) -> Self {
        Self {
            state: KingSearchState::ActivelySearching { visits: 0 },
            believed,
            proxy: false,
            threshold: threshold.max(1),
            opponent,
            flight,
        }
    }

    /// Search seeded with the mirrored defaults for an agent playing `color`.
    pub fn for_color(color: Color, params: &BotParams) -> Self {
        Self::new(
            !color,
            params.default_king_for(color),
            params.king_flight_for(color),
            params.king_visit_threshold,
        )
    }

    pub fn state(&self) -> KingSearchState {
        self.state
    }

    /// Last square where the opponent king was believed to stand.
    pub fn believed_square(&self) -> Square {
        self.believed
    }

    /// Set when the latest sense showed no opponent king.
    pub fn proxy(&self) -> bool {
        self.proxy
    }

    pub fn flight_squares(&self) -> [Square; 3] {
        self.flight
    }

    /// Next sense target, or `None` when the search has nothing to offer.
    pub fn propose<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Square> {
        match self.state {
            KingSearchState::ActivelySearching { visits } => {
                let visits = visits + 1;
                if visits >= self.threshold {
                    self.transition(KingSearchState::Idle);
                } else {
                    self.state = KingSearchState::ActivelySearching { visits };
                }
                Some(self.believed)
            }
            KingSearchState::Idle => {
                if !self.proxy {
                    return None;
                }
                self.transition(KingSearchState::ProxyFallback);
                self.flight.choose(rng).copied()
            }
            KingSearchState::ProxyFallback => self.flight.choose(rng).copied(),
        }
    }

    /// Folds a sense result into the search. Returns the revealed king square, if any.
    pub fn observe_sense(&mut self, region: &[SenseObservation]) -> Option<Square> {
        let revealed = region.iter().find_map(|(square, piece)| {
            piece
                .filter(|piece| piece.color == self.opponent && piece.role == Role::King)
                .map(|_| *square)
        });

        let Some(square) = revealed else {
            self.proxy = true;
            return None;
        };

        self.proxy = false;
        let moved = square != self.believed;
        if moved {
            event!(
                target: "recon_bot::search",
                Level::DEBUG,
                from = %self.believed,
                to = %square,
                "opponent king moved"
            );
        }
        self.believed = square;
        // A new target gets its full quota of visits; a re-sighting keeps the count.
        if moved || !matches!(self.state, KingSearchState::ActivelySearching { .. }) {
            self.transition(KingSearchState::ActivelySearching { visits: 0 });
        }
        Some(square)
    }

    /// Resumes active search of the believed square on the next cycle.
    pub fn rearm(&mut self) {
        self.transition(KingSearchState::ActivelySearching { visits: 0 });
    }

    fn transition(&mut self, next: KingSearchState) {
        if self.state != next {
            event!(
                target: "recon_bot::search",
                Level::DEBUG,
                from = ?self.state,
                to = ?next,
                believed = %self.believed,
                proxy = self.proxy,
                "king search transition"
            );
        }
        self.state = next;
    }
}
