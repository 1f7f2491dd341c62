//! Centralized balance and tuning constants for Evoterra game logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Logging keys -------------------------------------------------------------
pub(crate) const DEBUG_ENV_VAR: &str = "EVOTERRA_DEBUG_LOGS";

// Session pacing -----------------------------------------------------------
pub(crate) const SESSION_DURATION_SECS: f64 = 180.0;
pub(crate) const FIRST_CHOICE_DELAY_SECS: f64 = 5.0;
pub(crate) const CHOICE_REARM_BASE_SECS: f64 = 5.0;
pub(crate) const CHOICE_REARM_JITTER_SECS: f64 = 2.0;
pub(crate) const CHOICE_TIME_LIMIT_SECS: f64 = 10.0;
pub(crate) const CHOICE_PRESENTED_CAP: usize = 50;
pub(crate) const FINAL_STRETCH_SECS: f64 = 40.0;
pub(crate) const FINAL_STRETCH_FIRST_DELAY_SECS: f64 = 4.0;
pub(crate) const FINAL_STRETCH_REARM_SECS: f64 = 3.0;
pub(crate) const FINAL_STRETCH_GROWTH_BOOST: f64 = 1.5;

// Crisis scheduling --------------------------------------------------------
pub(crate) const CRISES_PER_SESSION: usize = 3;
pub(crate) const CRISIS_REFERENCE_WINDOW_SECS: f64 = 300.0;
pub(crate) const CRISIS_WARMUP_SECS: f64 = 60.0;
pub(crate) const CRISIS_TAIL_GUARD_SECS: f64 = 30.0;
pub(crate) const CRISIS_MIN_GAP_SECS: f64 = 40.0;
pub(crate) const CRISIS_TRIGGER_CHANCE: f64 = 0.03;

// Mutation tuning ----------------------------------------------------------
pub(crate) const MUTATION_MAX_PER_SESSION: u32 = 3;
pub(crate) const MUTATION_WARMUP_SECS: f64 = 30.0;
pub(crate) const MUTATION_TRIGGER_CHANCE: f64 = 0.02;
pub(crate) const GROWTH_BOOST_FACTOR: f64 = 2.0;
pub(crate) const GROWTH_BOOST_DURATION_SECS: f64 = 20.0;

// Growth and decay ---------------------------------------------------------
pub(crate) const STARTING_POPULATION: f64 = 10.0;
pub(crate) const POPULATION_GROWTH_PER_SEC: f64 = 2.5;
pub(crate) const TECH_GROWTH_PER_SEC: f64 = 1.5;
pub(crate) const RESOURCE_GROWTH_PER_SEC: f64 = 1.2;
pub(crate) const NATURAL_DECAY_PER_MINUTE: f64 = 0.30;
pub(crate) const CROWDING_POPULATION_UNIT: f64 = 1_000.0;
pub(crate) const CROWDING_RATE_PER_SEC: f64 = 0.05;
pub(crate) const DIE_OFF_HEALTH_THRESHOLD: f64 = 30.0;
pub(crate) const DIE_OFF_RATE_PER_SEC: f64 = 0.02;
pub(crate) const POPULATION_FLOOR: f64 = 5.0;
pub(crate) const ECOSYSTEM_HEALTH_MAX: f64 = 100.0;

// Tipping points -----------------------------------------------------------
pub(crate) const TIPPING_POINT_HEALTH: f64 = 40.0;
pub(crate) const DEATH_SPIRAL_HEALTH: f64 = 25.0;
pub(crate) const DEATH_SPIRAL_DEGRADATION_FACTOR: f64 = 2.0;
pub(crate) const LOW_HEALTH_FLOOR: f64 = 20.0;
pub(crate) const LOW_HEALTH_DECAY_PER_SEC: f64 = 1.0;
pub(crate) const MASS_EXTINCTION_COUNT: usize = 3;

// Reward tuning ------------------------------------------------------------
pub(crate) const SPEED_BONUS_FAST_SECS: f64 = 3.0;
pub(crate) const SPEED_BONUS_FAST_POINTS: f64 = 50.0;
pub(crate) const SPEED_BONUS_QUICK_SECS: f64 = 5.0;
pub(crate) const SPEED_BONUS_QUICK_POINTS: f64 = 25.0;
pub(crate) const SLOW_CHOICE_SECS: f64 = 8.0;
pub(crate) const MOMENTUM_BASELINE: f64 = 1.0;
pub(crate) const MOMENTUM_TIER_ONE_COUNT: u32 = 3;
pub(crate) const MOMENTUM_TIER_ONE_FACTOR: f64 = 1.2;
pub(crate) const MOMENTUM_TIER_TWO_COUNT: u32 = 5;
pub(crate) const MOMENTUM_TIER_TWO_FACTOR: f64 = 1.5;
pub(crate) const STREAK_WINDOW: usize = 3;
pub(crate) const STREAK_MATCH_BONUS: f64 = 500.0;
pub(crate) const STREAK_DIVERSE_BONUS: f64 = 300.0;
pub(crate) const STREAK_SUSTAINABLE_HEALTH_GAIN: f64 = 5.0;
pub(crate) const STREAK_AGGRESSIVE_HEALTH_LOSS: f64 = 10.0;

// Genetic engine -----------------------------------------------------------
pub(crate) const GENE_ADAPT_RATE: f64 = 0.05;
pub(crate) const FITNESS_POPULATION_SCALE: f64 = 1_000.0;
pub(crate) const FITNESS_TECH_SCALE: f64 = 200.0;
pub(crate) const FITNESS_RESOURCE_DIVISOR: f64 = 10.0;
pub(crate) const FITNESS_RESOURCE_MIDPOINT: f64 = 50.0;
pub(crate) const WEIGHTED_FITNESS_SCALE: f64 = 100.0;

// Biome modifiers ----------------------------------------------------------
pub(crate) const BIOME_POP_BONUS_HEALTH: f64 = 70.0;
pub(crate) const BIOME_POP_BONUS_FACTOR: f64 = 1.1;
pub(crate) const BIOME_POP_PENALTY_HEALTH: f64 = 30.0;
pub(crate) const BIOME_POP_PENALTY_FACTOR: f64 = 0.7;
pub(crate) const BIOME_RESOURCE_MODIFIER_FLOOR: f64 = 0.1;

// Evolution phase ----------------------------------------------------------
pub(crate) const EVOLUTION_STAGE_PROGRESS_MAX: f64 = 100.0;

#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f64 = 1e-9;
