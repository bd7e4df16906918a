//! Population statistics reported by the engine.

use crate::Species;
use serde::{Deserialize, Serialize};

/// Live agent counts per species
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub predators: usize,
    pub prey: usize,
}

impl PopulationCounts {
    pub fn total(&self) -> usize {
        self.predators + self.prey
    }

    pub fn count(&self, species: Species) -> usize {
        match species {
            Species::Predator => self.predators,
            Species::Prey => self.prey,
        }
    }

    pub(crate) fn increment(&mut self, species: Species) {
        match species {
            Species::Predator => self.predators += 1,
            Species::Prey => self.prey += 1,
        }
    }

    /// True once at least one species has no live agent left
    pub fn any_extinct(&self) -> bool {
        self.predators == 0 || self.prey == 0
    }
}

impl FromIterator<Species> for PopulationCounts {
    fn from_iter<I: IntoIterator<Item = Species>>(iter: I) -> Self {
        let mut counts = PopulationCounts::default();
        for species in iter {
            counts.increment(species);
        }
        counts
    }
}

/// What happened during one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Index of the cycle, starting at 1
    pub cycle: u64,
    /// Population after the commit phase
    pub population: PopulationCounts,
    /// Newborns placed on the grid
    pub births: usize,
    /// Newborns dropped because no free cell was left
    pub births_dropped: usize,
    /// Predators removed by starvation
    pub starved: usize,
    /// Prey captured by predators
    pub eaten: usize,
}

/// Cumulative counters over a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationTotals {
    pub births: u64,
    pub births_dropped: u64,
    pub starved: u64,
    pub eaten: u64,
}

impl PopulationTotals {
    pub fn record(&mut self, report: &CycleReport) {
        self.births += report.births as u64;
        self.births_dropped += report.births_dropped as u64;
        self.starved += report.starved as u64;
        self.eaten += report.eaten as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_from_species() {
        let counts: PopulationCounts = [Species::Prey, Species::Predator, Species::Prey]
            .into_iter()
            .collect();
        assert_eq!(counts.predators, 1);
        assert_eq!(counts.prey, 2);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.count(Species::Prey), 2);
        assert!(!counts.any_extinct());
    }

    #[test]
    fn test_extinction() {
        let counts = PopulationCounts {
            predators: 0,
            prey: 12,
        };
        assert!(counts.any_extinct());
    }

    #[test]
    fn test_totals_accumulate() {
        let mut totals = PopulationTotals::default();
        let report = CycleReport {
            cycle: 1,
            births: 2,
            births_dropped: 1,
            starved: 3,
            eaten: 4,
            ..Default::default()
        };
        totals.record(&report);
        totals.record(&report);
        assert_eq!(totals.births, 4);
        assert_eq!(totals.births_dropped, 2);
        assert_eq!(totals.starved, 6);
        assert_eq!(totals.eaten, 8);
    }
}
