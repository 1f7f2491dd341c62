//! Adaptive genetic weights and the evolutionary fitness score.
//!
//! Five weights drift toward the player's demonstrated tendency, one nudge
//! per resolved choice, and are renormalized to sum to 1.0 after every
//! adjustment. The weighted fitness over the five sub-scores is the base of
//! the final session score.

use serde::{Deserialize, Serialize};

use crate::catalog::ChoiceType;
use crate::constants::{
    FITNESS_POPULATION_SCALE, FITNESS_RESOURCE_DIVISOR, FITNESS_RESOURCE_MIDPOINT,
    FITNESS_TECH_SCALE, GENE_ADAPT_RATE, WEIGHTED_FITNESS_SCALE,
};
use crate::state::SessionState;

/// The five adaptive weights. Invariant: non-negative and summing to 1.0
/// after any [`GeneWeights::adapt`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneWeights {
    pub survival: f64,
    pub growth: f64,
    pub tech: f64,
    pub resource: f64,
    pub diversity: f64,
}

impl Default for GeneWeights {
    fn default() -> Self {
        Self {
            survival: 0.3,
            growth: 0.2,
            tech: 0.3,
            resource: 0.1,
            diversity: 0.1,
        }
    }
}

impl GeneWeights {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.survival + self.growth + self.tech + self.resource + self.diversity
    }

    /// Floor each weight at zero and rescale so the vector sums to 1.0.
    /// Skipped when the total is non-positive, which cannot occur from a
    /// valid starting distribution.
    pub fn normalize(&mut self) {
        self.survival = self.survival.max(0.0);
        self.growth = self.growth.max(0.0);
        self.tech = self.tech.max(0.0);
        self.resource = self.resource.max(0.0);
        self.diversity = self.diversity.max(0.0);
        let total = self.total();
        if total > 0.0 {
            self.survival /= total;
            self.growth /= total;
            self.tech /= total;
            self.resource /= total;
            self.diversity /= total;
        }
    }

    /// Nudge the weights toward the tendency implied by a resolved choice.
    pub fn adapt(&mut self, choice_type: ChoiceType) {
        let rate = GENE_ADAPT_RATE;
        match choice_type {
            ChoiceType::Aggressive => {
                self.growth += rate;
                self.resource += rate * 0.5;
                self.survival -= rate * 0.5;
                self.diversity -= rate * 0.5;
            }
            ChoiceType::Sustainable => {
                self.survival += rate;
                self.diversity += rate * 0.5;
                self.growth -= rate * 0.5;
            }
            ChoiceType::Balanced => {
                self.tech += rate;
                self.resource += rate * 0.3;
            }
        }
        self.normalize();
    }

    /// Human-readable playstyle label from the dominant weights.
    #[must_use]
    pub fn profile(&self) -> String {
        let mut profiles = Vec::new();
        if self.survival > 0.35 {
            profiles.push("Survivor");
        }
        if self.growth > 0.3 {
            profiles.push("Expansionist");
        }
        if self.tech > 0.35 {
            profiles.push("Innovator");
        }
        if self.resource > 0.15 {
            profiles.push("Hoarder");
        }
        if self.diversity > 0.15 {
            profiles.push("Conservationist");
        }
        if profiles.is_empty() {
            String::from("Balanced")
        } else {
            profiles.join(" + ")
        }
    }
}

/// The five fitness sub-scores, each on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    pub survival: f64,
    pub reproduction: f64,
    pub adaptation: f64,
    pub resource_efficiency: f64,
    pub biodiversity: f64,
}

/// Compute the fitness breakdown for the current session state.
#[must_use]
pub fn fitness(state: &SessionState) -> Fitness {
    let survival = state.ecosystem_health;
    let reproduction = ((state.population / FITNESS_POPULATION_SCALE) * 100.0).min(100.0);
    let adaptation = ((state.tech_level / FITNESS_TECH_SCALE) * 100.0).min(100.0);
    let resource_efficiency =
        (FITNESS_RESOURCE_MIDPOINT + state.resources / FITNESS_RESOURCE_DIVISOR).clamp(0.0, 100.0);
    let total = state.species.len();
    let alive = state.species.iter().filter(|s| !s.extinct).count();
    let biodiversity = if total == 0 {
        100.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let ratio = alive as f64 / total as f64;
        ratio * 100.0
    };
    Fitness {
        survival,
        reproduction,
        adaptation,
        resource_efficiency,
        biodiversity,
    }
}

/// Dot product of the fitness vector and the gene weights, scaled to the
/// 0-10000 genetic score range.
#[must_use]
pub fn weighted_fitness(fitness: &Fitness, genes: &GeneWeights) -> f64 {
    let score = fitness.survival * genes.survival
        + fitness.reproduction * genes.growth
        + fitness.adaptation * genes.tech
        + fitness.resource_efficiency * genes.resource
        + fitness.biodiversity * genes.diversity;
    score * WEIGHTED_FITNESS_SCALE
}
