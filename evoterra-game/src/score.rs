//! Final score computation.
//!
//! A pure function of the frozen session state: the genetic score is scaled
//! by the biome bonus, the momentum multiplier, and the extinction penalty,
//! then the flat streak and speed bonuses are added. Multiplicative stacking
//! makes ecosystem collapse compound punitively while tempo bonuses pay out
//! regardless of economic outcome.

use serde::{Deserialize, Serialize};

use crate::biome::{self, BiomeCatalog};
use crate::genes::{self, Fitness};
use crate::numbers::floor_f64_to_i64;
use crate::state::SessionState;

/// Frozen scoring components for the end screen and leaderboard record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub final_score: i64,
    /// Weighted fitness before multipliers, floored for display.
    pub genetic: i64,
    pub fitness: Fitness,
    pub biome_bonus: f64,
    pub momentum: f64,
    pub streak_bonus: f64,
    pub speed_bonus: f64,
    pub extinction_penalty: f64,
    pub playstyle: String,
}

/// Compute the score breakdown against the embedded biome catalog.
#[must_use]
pub fn calculate_final_score(state: &SessionState) -> ScoreBreakdown {
    calculate_final_score_with(state, biome::catalog())
}

/// Compute the score breakdown against an explicit biome catalog.
#[must_use]
pub fn calculate_final_score_with(state: &SessionState, biomes: &BiomeCatalog) -> ScoreBreakdown {
    let fitness = genes::fitness(state);
    let genetic = genes::weighted_fitness(&fitness, &state.genes);
    let biome_id = state.biome.unwrap_or_default();
    let biome_bonus = biomes.score_bonus(biome_id, state.ecosystem_health);
    let momentum = state.momentum_multiplier;
    let extinction_multiplier = 1.0 - state.extinction_penalty;

    let total = genetic * biome_bonus * momentum * extinction_multiplier
        + state.streak_bonus
        + state.speed_bonus;

    ScoreBreakdown {
        final_score: floor_f64_to_i64(total).max(0),
        genetic: floor_f64_to_i64(genetic),
        fitness,
        biome_bonus,
        momentum,
        streak_bonus: state.streak_bonus,
        speed_bonus: state.speed_bonus,
        extinction_penalty: state.extinction_penalty,
        playstyle: state.genes.profile(),
    }
}
