//! What the projector screen is currently showing.
//!
//! These are presentation flags (last winner, final podium, last
//! registration), not raffle state: they expire on their own so a display
//! left open does not keep showing yesterday's podium.

use crate::expiry::ExpiringStore;
use crate::models::{RegisterResponse, Winner};
use serde::Serialize;
use std::time::Duration;
use utoipa::ToSchema;

const WINNER_KEY: &str = "last_winner";
const PODIUM_KEY: &str = "podium";
const REGISTRATION_KEY: &str = "last_registration";

#[derive(Debug, Clone)]
enum DisplayEntry {
    Winner(Winner),
    Podium(Vec<Winner>),
    Registration(RegisterResponse),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DisplaySnapshot {
    /// Winner announced by the latest draw, until dismissed
    pub last_winner: Option<Winner>,
    /// Final standings after the session ended
    pub podium: Option<Vec<Winner>>,
    pub last_registration: Option<RegisterResponse>,
}

pub struct DisplayBoard {
    store: ExpiringStore<DisplayEntry>,
    window: Duration,
}

impl DisplayBoard {
    pub fn new(window: Duration) -> Self {
        Self {
            store: ExpiringStore::new(),
            window,
        }
    }

    pub fn show_winner(&self, winner: Winner) {
        self.store
            .set(WINNER_KEY, DisplayEntry::Winner(winner), self.window);
    }

    /// "Continue drawing": hide the announced winner.
    pub fn dismiss_winner(&self) {
        self.store.remove(WINNER_KEY);
    }

    pub fn show_podium(&self, winners: Vec<Winner>) {
        self.store.remove(WINNER_KEY);
        self.store
            .set(PODIUM_KEY, DisplayEntry::Podium(winners), self.window);
    }

    pub fn note_registration(&self, registration: RegisterResponse) {
        self.store.set(
            REGISTRATION_KEY,
            DisplayEntry::Registration(registration),
            self.window,
        );
    }

    /// Finish the presentation.
    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        let last_winner = match self.store.get(WINNER_KEY) {
            Some(DisplayEntry::Winner(w)) => Some(w),
            _ => None,
        };
        let podium = match self.store.get(PODIUM_KEY) {
            // an empty podium is not worth showing
            Some(DisplayEntry::Podium(p)) if !p.is_empty() => Some(p),
            _ => None,
        };
        let last_registration = match self.store.get(REGISTRATION_KEY) {
            Some(DisplayEntry::Registration(r)) => Some(r),
            _ => None,
        };
        DisplaySnapshot {
            last_winner,
            podium,
            last_registration,
        }
    }

    pub fn sweep(&self) -> usize {
        self.store.sweep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winner(position: i32) -> Winner {
        Winner {
            position,
            participant_id: position,
            name: format!("P{position}"),
            lucky_number: 1000 + position,
        }
    }

    #[test]
    fn test_winner_then_podium() {
        let board = DisplayBoard::new(Duration::from_secs(60));
        board.show_winner(winner(1));
        assert_eq!(board.snapshot().last_winner, Some(winner(1)));

        board.show_podium(vec![winner(1), winner(2)]);
        let snapshot = board.snapshot();
        assert_eq!(snapshot.last_winner, None);
        assert_eq!(snapshot.podium.map(|p| p.len()), Some(2));

        board.clear();
        assert_eq!(board.snapshot(), DisplaySnapshot::default());
    }

    #[test]
    fn test_dismiss_and_empty_podium() {
        let board = DisplayBoard::new(Duration::from_secs(60));
        board.show_winner(winner(2));
        board.dismiss_winner();
        board.show_podium(Vec::new());
        assert_eq!(board.snapshot(), DisplaySnapshot::default());
    }

    #[test]
    fn test_flags_expire() {
        let board = DisplayBoard::new(Duration::ZERO);
        board.show_winner(winner(1));
        board.note_registration(RegisterResponse {
            participant_id: 1,
            name: "Ana".into(),
            email: "ana@x.com".into(),
            lucky_number: 1234,
        });
        assert_eq!(board.sweep(), 2);
        assert_eq!(board.snapshot(), DisplaySnapshot::default());
    }
}
