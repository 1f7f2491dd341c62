//! Species tracking and the extinction model.
//!
//! Eight iconic species each carry an ecosystem-health threshold and a fixed
//! score penalty. Extinction is one-way: once health dips below a threshold
//! the species is marked extinct and never recovers, even if health does.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::MASS_EXTINCTION_COUNT;
use crate::state::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeciesId {
    Pollinators,
    Predators,
    Forests,
    Marine,
    Birds,
    Megafauna,
    Butterflies,
    Fish,
}

impl SpeciesId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pollinators => "pollinators",
            Self::Predators => "predators",
            Self::Forests => "forests",
            Self::Marine => "marine",
            Self::Birds => "birds",
            Self::Megafauna => "megafauna",
            Self::Butterflies => "butterflies",
            Self::Fish => "fish",
        }
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked species within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    /// Ecosystem health below which the species goes extinct.
    pub threshold: f64,
    /// Contribution to the cumulative score penalty once extinct.
    pub penalty: f64,
    pub extinct: bool,
}

fn species(id: SpeciesId, name: &str, threshold: f64, penalty: f64) -> Species {
    Species {
        id,
        name: name.to_string(),
        threshold,
        penalty,
        extinct: false,
    }
}

/// Fresh non-extinct roster for a new session.
#[must_use]
pub fn roster() -> Vec<Species> {
    vec![
        species(SpeciesId::Pollinators, "Pollinators", 40.0, 0.15),
        species(SpeciesId::Predators, "Apex Predators", 35.0, 0.10),
        species(SpeciesId::Forests, "Old Growth Forests", 50.0, 0.20),
        species(SpeciesId::Marine, "Marine Life", 30.0, 0.12),
        species(SpeciesId::Birds, "Birds of Prey", 45.0, 0.08),
        species(SpeciesId::Megafauna, "Megafauna", 25.0, 0.15),
        species(SpeciesId::Butterflies, "Butterflies", 55.0, 0.10),
        species(SpeciesId::Fish, "Freshwater Fish", 20.0, 0.08),
    ]
}

/// Mark newly-extinct species and accumulate their score penalties.
///
/// Returns the species that crossed their threshold this call, so the engine
/// can emit one-shot notifications. Already-extinct species are never
/// re-reported.
pub fn check_extinctions(state: &mut SessionState) -> Vec<SpeciesId> {
    let mut newly_extinct = Vec::new();
    let health = state.ecosystem_health;
    for species in &mut state.species {
        if !species.extinct && health < species.threshold {
            species.extinct = true;
            state.extinction_penalty += species.penalty;
            newly_extinct.push(species.id);
        }
    }
    newly_extinct
}

/// Whether enough species have died to count as a mass extinction event.
#[must_use]
pub fn mass_extinction(state: &SessionState) -> bool {
    state.species.iter().filter(|s| s.extinct).count() >= MASS_EXTINCTION_COUNT
}

/// Per-channel growth multipliers from the current extinction set.
///
/// Not clamped at zero: the shipped roster's channel sums stay below 1.0, and
/// the invariant is enforced by the data-shape tests instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthPenalties {
    pub population: f64,
    pub tech: f64,
    pub resources: f64,
}

impl Default for GrowthPenalties {
    fn default() -> Self {
        Self {
            population: 1.0,
            tech: 1.0,
            resources: 1.0,
        }
    }
}

/// Which growth channel a species' extinction penalizes.
#[must_use]
pub const fn penalty_channel(id: SpeciesId) -> PenaltyChannel {
    match id {
        SpeciesId::Pollinators | SpeciesId::Birds | SpeciesId::Megafauna
        | SpeciesId::Butterflies => PenaltyChannel::Population,
        SpeciesId::Predators => PenaltyChannel::Tech,
        SpeciesId::Forests | SpeciesId::Marine | SpeciesId::Fish => PenaltyChannel::Resources,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyChannel {
    Population,
    Tech,
    Resources,
}

/// Aggregate the extinct species' fixed penalties into growth multipliers.
#[must_use]
pub fn growth_penalties(state: &SessionState) -> GrowthPenalties {
    let mut population = 0.0;
    let mut tech = 0.0;
    let mut resources = 0.0;
    for species in state.species.iter().filter(|s| s.extinct) {
        match penalty_channel(species.id) {
            PenaltyChannel::Population => population += species.penalty,
            PenaltyChannel::Tech => tech += species.penalty,
            PenaltyChannel::Resources => resources += species.penalty,
        }
    }
    GrowthPenalties {
        population: 1.0 - population,
        tech: 1.0 - tech,
        resources: 1.0 - resources,
    }
}

/// Alive/extinct tallies for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivalCounts {
    pub alive: usize,
    pub extinct: usize,
    pub total: usize,
}

#[must_use]
pub fn survival_counts(state: &SessionState) -> SurvivalCounts {
    let total = state.species.len();
    let alive = state.species.iter().filter(|s| !s.extinct).count();
    SurvivalCounts {
        alive,
        extinct: total - alive,
        total,
    }
}

/// End-screen classification of the final extinction count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeTier {
    Perfect,
    Minor,
    Major,
    Catastrophic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtinctionNarrative {
    pub tier: NarrativeTier,
    pub title: String,
    pub message: String,
}

#[must_use]
pub fn narrative(state: &SessionState) -> ExtinctionNarrative {
    let counts = survival_counts(state);
    if counts.extinct == 0 {
        ExtinctionNarrative {
            tier: NarrativeTier::Perfect,
            title: String::from("Perfect Conservation"),
            message: String::from(
                "All species survived! Your civilization achieved harmony with nature.",
            ),
        }
    } else if counts.extinct >= 6 {
        ExtinctionNarrative {
            tier: NarrativeTier::Catastrophic,
            title: String::from("Mass Extinction"),
            message: format!(
                "Only {} of {} species survived. The ecological cost was devastating.",
                counts.alive, counts.total
            ),
        }
    } else if counts.extinct >= MASS_EXTINCTION_COUNT {
        ExtinctionNarrative {
            tier: NarrativeTier::Major,
            title: String::from("Major Losses"),
            message: format!(
                "{} species went extinct. The ecosystem is severely damaged.",
                counts.extinct
            ),
        }
    } else {
        ExtinctionNarrative {
            tier: NarrativeTier::Minor,
            title: String::from("Some Losses"),
            message: format!(
                "{} species extinct, but {} survived.",
                counts.extinct, counts.alive
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionState;

    #[test]
    fn extinction_is_one_way_and_reported_once() {
        let mut state = SessionState::default();
        state.ecosystem_health = 47.0;
        let first = check_extinctions(&mut state);
        assert_eq!(first, vec![SpeciesId::Forests, SpeciesId::Butterflies]);
        assert!((state.extinction_penalty - 0.30).abs() < 1e-9);

        // Health recovery must not resurrect anything or re-report.
        state.ecosystem_health = 90.0;
        assert!(check_extinctions(&mut state).is_empty());
        assert!(
            state
                .species
                .iter()
                .filter(|s| s.extinct)
                .all(|s| matches!(s.id, SpeciesId::Forests | SpeciesId::Butterflies))
        );
    }

    #[test]
    fn mass_extinction_requires_three() {
        let mut state = SessionState::default();
        state.ecosystem_health = 47.0;
        check_extinctions(&mut state);
        assert!(!mass_extinction(&state));

        state.ecosystem_health = 42.0;
        check_extinctions(&mut state);
        assert!(mass_extinction(&state));
    }

    #[test]
    fn full_extinction_penalty_sums_match_channels() {
        let mut state = SessionState::default();
        state.ecosystem_health = 0.0;
        check_extinctions(&mut state);

        let penalties = growth_penalties(&state);
        assert!((penalties.population - 0.52).abs() < 1e-9);
        assert!((penalties.tech - 0.90).abs() < 1e-9);
        assert!((penalties.resources - 0.60).abs() < 1e-9);
        assert!((state.extinction_penalty - 0.98).abs() < 1e-9);
    }

    #[test]
    fn narrative_tiers_cover_counts() {
        let mut state = SessionState::default();
        assert_eq!(narrative(&state).tier, NarrativeTier::Perfect);

        state.ecosystem_health = 54.0;
        check_extinctions(&mut state);
        assert_eq!(narrative(&state).tier, NarrativeTier::Minor);

        state.ecosystem_health = 42.0;
        check_extinctions(&mut state);
        assert_eq!(narrative(&state).tier, NarrativeTier::Major);

        state.ecosystem_health = 0.0;
        check_extinctions(&mut state);
        assert_eq!(narrative(&state).tier, NarrativeTier::Catastrophic);
    }
}
