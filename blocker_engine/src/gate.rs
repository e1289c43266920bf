use blocker_formats::Settings;

use crate::host::{OccupantRegistry, MAX_SLOTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyGate {
    pub min_occupants_to_open: usize,
    pub ignore_observers: bool,
}

impl OccupancyGate {
    pub fn new(min_occupants_to_open: usize, ignore_observers: bool) -> Self {
        OccupancyGate {
            min_occupants_to_open,
            ignore_observers,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.min_players_to_open, settings.ignore_spectators)
    }

    /// Connected humans, minus observers when configured.
    pub fn eligible_count<R: OccupantRegistry + ?Sized>(&self, occupants: &R) -> usize {
        (0..MAX_SLOTS)
            .filter(|slot| occupants.is_connected(*slot) && !occupants.is_automated(*slot))
            .filter(|slot| !(self.ignore_observers && occupants.is_observer(*slot)))
            .count()
    }

    pub fn opens_at(&self, eligible: usize) -> bool {
        eligible >= self.min_occupants_to_open
    }

    pub fn should_be_open<R: OccupantRegistry + ?Sized>(&self, occupants: &R) -> bool {
        self.opens_at(self.eligible_count(occupants))
    }
}
