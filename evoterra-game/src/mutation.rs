//! One-shot mutation effects from the genetic engine.
//!
//! A small fixed catalog of boosts: permanent gene nudges, instantaneous stat
//! increases, and a timed growth-rate doubling. The timed boost's revert is a
//! deadline carried in session state and processed by the tick, so an
//! abandoned session never fires a stale revert.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{ECOSYSTEM_HEALTH_MAX, GROWTH_BOOST_DURATION_SECS, GROWTH_BOOST_FACTOR};
use crate::state::{GrowthBoost, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationId {
    PollutionResistance,
    PopulationBoom,
    InnovationSurge,
    ResourceEfficiency,
    Symbiosis,
}

impl MutationId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PollutionResistance => "pollution_resistance",
            Self::PopulationBoom => "population_boom",
            Self::InnovationSurge => "innovation_surge",
            Self::ResourceEfficiency => "resource_efficiency",
            Self::Symbiosis => "symbiosis",
        }
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permanent additive nudge to the gene weights, renormalized after apply.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeneNudge {
    pub survival: f64,
    pub growth: f64,
    pub tech: f64,
    pub resource: f64,
    pub diversity: f64,
}

impl GeneNudge {
    fn is_zero(&self) -> bool {
        self.survival == 0.0
            && self.growth == 0.0
            && self.tech == 0.0
            && self.resource == 0.0
            && self.diversity == 0.0
    }
}

/// Data record for one mutation; interpreted by [`apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationDef {
    pub id: MutationId,
    pub title: &'static str,
    pub description: &'static str,
    pub tech: f64,
    pub resources: f64,
    pub ecosystem: f64,
    pub genes: GeneNudge,
    /// Doubles the growth multiplier for a fixed window when set.
    pub timed_growth_boost: bool,
}

const NO_NUDGE: GeneNudge = GeneNudge {
    survival: 0.0,
    growth: 0.0,
    tech: 0.0,
    resource: 0.0,
    diversity: 0.0,
};

/// The fixed mutation catalog.
pub static MUTATIONS: [MutationDef; 5] = [
    MutationDef {
        id: MutationId::PollutionResistance,
        title: "MUTATION: Pollution Resistance!",
        description: "Your species develops resistance to environmental toxins",
        tech: 0.0,
        resources: 0.0,
        ecosystem: 0.0,
        genes: GeneNudge {
            survival: 0.1,
            ..NO_NUDGE
        },
        timed_growth_boost: false,
    },
    MutationDef {
        id: MutationId::PopulationBoom,
        title: "MUTATION: Population Boom!",
        description: "Genetic adaptation causes explosive population growth",
        tech: 0.0,
        resources: 0.0,
        ecosystem: 0.0,
        genes: NO_NUDGE,
        timed_growth_boost: true,
    },
    MutationDef {
        id: MutationId::InnovationSurge,
        title: "MUTATION: Innovation Surge!",
        description: "Sudden leap in cognitive abilities",
        tech: 30.0,
        resources: 0.0,
        ecosystem: 0.0,
        genes: GeneNudge {
            tech: 0.1,
            ..NO_NUDGE
        },
        timed_growth_boost: false,
    },
    MutationDef {
        id: MutationId::ResourceEfficiency,
        title: "MUTATION: Resource Efficiency!",
        description: "Your civilization learns to do more with less",
        tech: 0.0,
        resources: 40.0,
        ecosystem: 0.0,
        genes: GeneNudge {
            resource: 0.1,
            ..NO_NUDGE
        },
        timed_growth_boost: false,
    },
    MutationDef {
        id: MutationId::Symbiosis,
        title: "MUTATION: Ecological Symbiosis!",
        description: "Your species forms beneficial relationships with nature",
        tech: 0.0,
        resources: 0.0,
        ecosystem: 15.0,
        genes: GeneNudge {
            diversity: 0.15,
            survival: 0.05,
            ..NO_NUDGE
        },
        timed_growth_boost: false,
    },
];

/// Draw a mutation uniformly from the catalog.
pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> &'static MutationDef {
    let index = rng.gen_range(0..MUTATIONS.len());
    &MUTATIONS[index]
}

/// Apply a mutation record to the session state.
pub fn apply(state: &mut SessionState, def: &MutationDef) {
    state.tech_level += def.tech;
    state.resources += def.resources;
    if def.ecosystem != 0.0 {
        state.ecosystem_health =
            (state.ecosystem_health + def.ecosystem).clamp(0.0, ECOSYSTEM_HEALTH_MAX);
    }
    if !def.genes.is_zero() {
        state.genes.survival += def.genes.survival;
        state.genes.growth += def.genes.growth;
        state.genes.tech += def.genes.tech;
        state.genes.resource += def.genes.resource;
        state.genes.diversity += def.genes.diversity;
        state.genes.normalize();
    }
    if def.timed_growth_boost {
        match state.growth_boost.as_mut() {
            // A second boom while one is live extends the window instead of
            // compounding the multiplier.
            Some(boost) => boost.revert_at = state.clock + GROWTH_BOOST_DURATION_SECS,
            None => {
                state.growth_boost = Some(GrowthBoost {
                    previous: state.growth_multiplier,
                    revert_at: state.clock + GROWTH_BOOST_DURATION_SECS,
                });
                state.growth_multiplier *= GROWTH_BOOST_FACTOR;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;

    fn find(id: MutationId) -> &'static MutationDef {
        MUTATIONS
            .iter()
            .find(|m| m.id == id)
            .expect("catalog entry")
    }

    #[test]
    fn gene_nudges_keep_weights_normalized() {
        let mut state = SessionState::default();
        apply(&mut state, find(MutationId::Symbiosis));
        assert!((state.genes.total() - 1.0).abs() < FLOAT_EPSILON);
        assert!(state.genes.diversity > 0.1);
        assert!((state.ecosystem_health - 100.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn innovation_surge_boosts_tech_and_weights() {
        let mut state = SessionState::default();
        apply(&mut state, find(MutationId::InnovationSurge));
        assert!((state.tech_level - 30.0).abs() < FLOAT_EPSILON);
        assert!(state.genes.tech > 0.3);
    }

    #[test]
    fn population_boom_arms_a_revert_deadline() {
        let mut state = SessionState::default();
        state.clock = 45.0;
        apply(&mut state, find(MutationId::PopulationBoom));
        assert!((state.growth_multiplier - 2.0).abs() < FLOAT_EPSILON);
        let boost = state.growth_boost.expect("boost armed");
        assert!((boost.previous - 1.0).abs() < FLOAT_EPSILON);
        assert!((boost.revert_at - 65.0).abs() < FLOAT_EPSILON);

        // A second boom extends rather than compounds.
        state.clock = 50.0;
        apply(&mut state, find(MutationId::PopulationBoom));
        assert!((state.growth_multiplier - 2.0).abs() < FLOAT_EPSILON);
        let boost = state.growth_boost.expect("boost still armed");
        assert!((boost.revert_at - 70.0).abs() < FLOAT_EPSILON);
    }
}
