//! The session state aggregate.
//!
//! One mutable aggregate owned exclusively by the session engine for its
//! lifetime. There is no ambient global state; every operation receives the
//! aggregate explicitly and the engine hands out read-only snapshots.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::biome::BiomeId;
use crate::catalog::{ChoiceDef, ChoiceType, OptionDef};
use crate::constants::{
    CHOICE_TIME_LIMIT_SECS, ECOSYSTEM_HEALTH_MAX, FIRST_CHOICE_DELAY_SECS, MOMENTUM_BASELINE,
    POPULATION_FLOOR, SESSION_DURATION_SECS, STARTING_POPULATION, STREAK_WINDOW,
};
use crate::genes::GeneWeights;
use crate::score::ScoreBreakdown;
use crate::species::{self, Species};

/// Strictly forward-progressing session phase; no phase is ever revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    NotStarted,
    Evolution,
    Civilization,
    Ended,
}

impl SessionPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Evolution => "evolution",
            Self::Civilization => "civilization",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// The countdown ran out normally.
    Timeout,
    /// Ecosystem health reached zero before the countdown did.
    Collapse,
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::Collapse => f.write_str("collapse"),
        }
    }
}

/// One narrative stage of the evolution intro.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionStage {
    pub name: &'static str,
    pub description: &'static str,
    pub duration_secs: f64,
}

const fn stage(name: &'static str, description: &'static str) -> EvolutionStage {
    EvolutionStage {
        name,
        description,
        duration_secs: 3.0,
    }
}

/// The seven fixed-duration narrative stages, auto-advanced by the tick.
pub const EVOLUTION_STAGES: [EvolutionStage; 7] = [
    stage("Primordial Ooze", "Organic molecules form in the ancient ocean"),
    stage("RNA World", "Self-replicating RNA emerges"),
    stage("First Cells", "Membrane-bound life appears"),
    stage("Photosynthesis", "Organisms harness the sun's energy"),
    stage("Multicellular Life", "Complex organisms evolve"),
    stage("Land Colonization", "Life spreads to land"),
    stage("Modern Era", "Choose your environment"),
];

/// The temporary growth-rate boost granted by a mutation, with the deadline
/// for its revert. Discarded when the session ends, which suppresses the
/// revert for sessions that are no longer active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthBoost {
    /// Multiplier value to restore when the boost expires.
    pub previous: f64,
    /// Session-clock deadline for the revert.
    pub revert_at: f64,
}

/// A choice awaiting player input. At most one exists at a time; no new
/// choice is offered while one is pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChoice {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_crisis: bool,
    /// Suggested answer window in seconds (presentation metadata).
    pub timer: u32,
    /// Options in the shuffled order they were presented.
    pub options: Vec<OptionDef>,
    /// Session-clock instant the choice was shown, for decision latency.
    pub presented_at: f64,
}

/// Single mutable aggregate for one session, created fresh at session start
/// and frozen at session end for score extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub player_name: String,
    pub biome: Option<BiomeId>,

    // Evolution phase
    pub evolution_stage: usize,
    pub evolution_progress: f64,

    // Clock; accumulated from tick deltas, countdown derived from it.
    pub clock: f64,
    pub civilization_started_at: Option<f64>,
    pub time_remaining: f64,

    // Civilization economy
    pub population: f64,
    pub tech_level: f64,
    pub resources: f64,
    pub ecosystem_health: f64,

    // Genetic engine
    pub genes: GeneWeights,
    pub mutations_triggered: u32,
    pub growth_multiplier: f64,
    pub growth_boost: Option<GrowthBoost>,

    // Species tracking
    pub species: Vec<Species>,
    pub extinction_penalty: f64,

    // Choice scheduling
    pub choices_presented: Vec<String>,
    pub pending_choice: Option<PendingChoice>,
    pub choice_timer: f64,
    pub next_choice_time: f64,
    pub choice_time_limit: f64,
    pub crisis_queue: Vec<ChoiceDef>,
    pub last_crisis_at: Option<f64>,

    // Reward bookkeeping
    pub speed_bonus: f64,
    pub streak_bonus: f64,
    pub momentum_multiplier: f64,
    pub fast_choices_count: u32,
    pub last_choice_types: SmallVec<[ChoiceType; 3]>,

    // One-way latches
    pub tipping_point_warning: bool,
    pub death_spiral_active: bool,
    pub final_stretch: bool,

    // Terminal data
    pub outcome: Option<SessionOutcome>,
    pub score: Option<ScoreBreakdown>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::NotStarted,
            player_name: String::new(),
            biome: None,
            evolution_stage: 0,
            evolution_progress: 0.0,
            clock: 0.0,
            civilization_started_at: None,
            time_remaining: SESSION_DURATION_SECS,
            population: STARTING_POPULATION,
            tech_level: 0.0,
            resources: 0.0,
            ecosystem_health: ECOSYSTEM_HEALTH_MAX,
            genes: GeneWeights::default(),
            mutations_triggered: 0,
            growth_multiplier: 1.0,
            growth_boost: None,
            species: species::roster(),
            extinction_penalty: 0.0,
            choices_presented: Vec::new(),
            pending_choice: None,
            choice_timer: 0.0,
            next_choice_time: FIRST_CHOICE_DELAY_SECS,
            choice_time_limit: CHOICE_TIME_LIMIT_SECS,
            crisis_queue: Vec::new(),
            last_crisis_at: None,
            speed_bonus: 0.0,
            streak_bonus: 0.0,
            momentum_multiplier: MOMENTUM_BASELINE,
            fast_choices_count: 0,
            last_choice_types: SmallVec::new(),
            tipping_point_warning: false,
            death_spiral_active: false,
            final_stretch: false,
            outcome: None,
            score: None,
        }
    }
}

impl SessionState {
    /// Fresh state for a newly started session.
    #[must_use]
    pub fn fresh(player_name: &str) -> Self {
        Self {
            phase: SessionPhase::Evolution,
            player_name: if player_name.trim().is_empty() {
                String::from("Anonymous")
            } else {
                player_name.to_string()
            },
            ..Self::default()
        }
    }

    /// Seconds elapsed inside the civilization phase, if it has started.
    #[must_use]
    pub fn civilization_elapsed(&self) -> Option<f64> {
        self.civilization_started_at
            .map(|started| (self.clock - started).max(0.0))
    }

    /// Whether the session is still accepting ticks and input.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Evolution | SessionPhase::Civilization
        )
    }

    /// Clamp the economy after a tick. Population is floored at the minimum
    /// survival value; a fully collapsed ecosystem ends the session through
    /// the engine's collapse path instead.
    pub fn clamp_after_tick(&mut self) {
        self.ecosystem_health = self.ecosystem_health.clamp(0.0, ECOSYSTEM_HEALTH_MAX);
        self.tech_level = self.tech_level.max(0.0);
        self.population = self.population.max(POPULATION_FLOOR);
        self.resources = self.resources.max(0.0);
    }

    /// Clamp the economy after a choice effect; choices may push population
    /// below the tick floor (the next tick restores it).
    pub fn clamp_after_choice(&mut self) {
        self.population = self.population.max(0.0);
        self.tech_level = self.tech_level.max(0.0);
        self.ecosystem_health = self.ecosystem_health.clamp(0.0, ECOSYSTEM_HEALTH_MAX);
    }

    /// Record a resolved choice classification in the 3-slot history ring.
    pub fn push_choice_type(&mut self, choice_type: ChoiceType) {
        self.last_choice_types.push(choice_type);
        if self.last_choice_types.len() > STREAK_WINDOW {
            self.last_choice_types.remove(0);
        }
    }
}
