//! The session engine: phase machine, per-tick integration, event
//! scheduling, and choice resolution.
//!
//! The engine owns the session state exclusively. It is driven by a
//! cooperative tick on an external cadence; each invocation receives the
//! elapsed real time since the previous one. No call blocks, and every state
//! transition completes within the call that caused it.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::biome::{self, BiomeId, ModifierKind};
use crate::catalog::{ChoiceDef, ChoiceType, EventCatalog};
use crate::constants::{
    CHOICE_REARM_BASE_SECS, CHOICE_REARM_JITTER_SECS, CRISIS_MIN_GAP_SECS,
    CRISIS_REFERENCE_WINDOW_SECS, CRISIS_TAIL_GUARD_SECS, CRISIS_TRIGGER_CHANCE,
    CRISIS_WARMUP_SECS, DEATH_SPIRAL_DEGRADATION_FACTOR, DEATH_SPIRAL_HEALTH, DEBUG_ENV_VAR,
    DIE_OFF_HEALTH_THRESHOLD, DIE_OFF_RATE_PER_SEC, EVOLUTION_STAGE_PROGRESS_MAX,
    FINAL_STRETCH_FIRST_DELAY_SECS,
    FINAL_STRETCH_GROWTH_BOOST, FINAL_STRETCH_REARM_SECS, FINAL_STRETCH_SECS, LOW_HEALTH_DECAY_PER_SEC,
    LOW_HEALTH_FLOOR, MASS_EXTINCTION_COUNT, MOMENTUM_BASELINE, MOMENTUM_TIER_ONE_COUNT,
    MOMENTUM_TIER_ONE_FACTOR, MOMENTUM_TIER_TWO_COUNT, MOMENTUM_TIER_TWO_FACTOR,
    MUTATION_MAX_PER_SESSION, MUTATION_TRIGGER_CHANCE, MUTATION_WARMUP_SECS,
    NATURAL_DECAY_PER_MINUTE, CROWDING_POPULATION_UNIT, CROWDING_RATE_PER_SEC,
    POPULATION_GROWTH_PER_SEC, RESOURCE_GROWTH_PER_SEC, SLOW_CHOICE_SECS, SPEED_BONUS_FAST_POINTS,
    SPEED_BONUS_FAST_SECS, SPEED_BONUS_QUICK_POINTS, SPEED_BONUS_QUICK_SECS,
    STREAK_AGGRESSIVE_HEALTH_LOSS, STREAK_DIVERSE_BONUS, STREAK_MATCH_BONUS,
    STREAK_SUSTAINABLE_HEALTH_GAIN, STREAK_WINDOW, TECH_GROWTH_PER_SEC, TIPPING_POINT_HEALTH,
};
use crate::leaderboard::ScoreRecord;
use crate::mutation;
use crate::numbers::{floor_f64_to_i64, round_f64_to_i64};
use crate::score::{self, ScoreBreakdown};
use crate::session::{RngBundle, SessionCfg, SessionEvent, TickOutcome};
use crate::species;
use crate::state::{
    EVOLUTION_STAGES, PendingChoice, SessionOutcome, SessionPhase, SessionState,
};

#[cfg(debug_assertions)]
fn debug_log_enabled() -> bool {
    matches!(std::env::var(DEBUG_ENV_VAR), Ok(val) if val != "0")
}

#[cfg(not(debug_assertions))]
const fn debug_log_enabled() -> bool {
    false
}

/// Owns one session's state and drives it to completion.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    cfg: SessionCfg,
    catalog: EventCatalog,
    rng: RngBundle,
    seed: u64,
    state: SessionState,
}

impl SessionEngine {
    /// Construct an engine around an explicit catalog and seed.
    #[must_use]
    pub fn new(catalog: EventCatalog, cfg: SessionCfg, seed: u64) -> Self {
        let mut cfg = cfg;
        cfg.sanitize();
        Self {
            cfg,
            catalog,
            rng: RngBundle::from_user_seed(seed),
            seed,
            state: SessionState::default(),
        }
    }

    /// Construct an engine over the embedded static catalogs.
    #[must_use]
    pub fn with_default_catalog(cfg: SessionCfg, seed: u64) -> Self {
        Self::new(crate::catalog::catalog().clone(), cfg, seed)
    }

    /// Read-only snapshot of the session state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &SessionCfg {
        &self.cfg
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The choice currently awaiting player input, if any.
    #[must_use]
    pub fn pending_choice(&self) -> Option<&PendingChoice> {
        self.state.pending_choice.as_ref()
    }

    /// The frozen score breakdown, present once the session has ended.
    #[must_use]
    pub fn score(&self) -> Option<&ScoreBreakdown> {
        self.state.score.as_ref()
    }

    /// Deterministically reseed the engine's RNG streams.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = RngBundle::from_user_seed(seed);
        self.seed = seed;
    }

    /// Begin a fresh session, discarding any prior state. The evolution
    /// phase starts immediately; the countdown arms on biome selection.
    pub fn start_session(&mut self, player_name: &str) {
        self.state = SessionState::fresh(player_name);
        self.state.time_remaining = self.cfg.duration_secs;

        let mut pool = self.catalog.crises.clone();
        pool.shuffle(&mut *self.rng.crisis());
        pool.truncate(self.cfg.crisis_count);
        self.state.crisis_queue = pool;
    }

    /// Whether the evolution intro has finished and a biome can be chosen.
    #[must_use]
    pub fn can_select_biome(&self) -> bool {
        self.state.phase == SessionPhase::Evolution
            && self.state.evolution_stage >= EVOLUTION_STAGES.len() - 1
            && self.state.evolution_progress >= EVOLUTION_STAGE_PROGRESS_MAX
    }

    /// Choose the biome and enter the civilization phase. A no-op unless the
    /// evolution phase has reached its final stage.
    pub fn select_biome(&mut self, biome: BiomeId) {
        if !self.can_select_biome() {
            return;
        }
        self.state.biome = Some(biome);
        self.state.phase = SessionPhase::Civilization;
        self.state.civilization_started_at = Some(self.state.clock);
        self.state.time_remaining = self.cfg.duration_secs;
        self.state.growth_multiplier = 1.0;
    }

    /// Advance the simulation by `dt` seconds of real time.
    pub fn tick(&mut self, dt: f64) -> TickOutcome {
        if !self.state.is_active() || !dt.is_finite() || dt <= 0.0 {
            return TickOutcome::default();
        }
        self.state.clock += dt;
        let mut events = Vec::new();
        match self.state.phase {
            SessionPhase::Evolution => self.tick_evolution(dt, &mut events),
            SessionPhase::Civilization => self.tick_civilization(dt, &mut events),
            SessionPhase::NotStarted | SessionPhase::Ended => {}
        }
        TickOutcome {
            ended: self.state.phase == SessionPhase::Ended,
            events,
        }
    }

    fn tick_evolution(&mut self, dt: f64, events: &mut Vec<SessionEvent>) {
        let last = EVOLUTION_STAGES.len() - 1;
        if self.state.evolution_stage >= last
            && self.state.evolution_progress >= EVOLUTION_STAGE_PROGRESS_MAX
        {
            // Complete; waiting on biome selection.
            return;
        }
        let stage = &EVOLUTION_STAGES[self.state.evolution_stage.min(last)];
        let mut progress = self.state.evolution_progress
            + (EVOLUTION_STAGE_PROGRESS_MAX / stage.duration_secs) * dt;
        loop {
            if progress < EVOLUTION_STAGE_PROGRESS_MAX {
                self.state.evolution_progress = progress;
                break;
            }
            events.push(SessionEvent::EvolutionStageCompleted {
                stage: self.state.evolution_stage,
            });
            if self.state.evolution_stage >= last {
                self.state.evolution_progress = EVOLUTION_STAGE_PROGRESS_MAX;
                events.push(SessionEvent::EvolutionComplete);
                break;
            }
            self.state.evolution_stage += 1;
            progress -= EVOLUTION_STAGE_PROGRESS_MAX;
        }
    }

    fn tick_civilization(&mut self, dt: f64, events: &mut Vec<SessionEvent>) {
        let started = self.state.civilization_started_at.unwrap_or(self.state.clock);
        let elapsed = self.state.clock - started;
        self.state.time_remaining = (self.cfg.duration_secs - elapsed).max(0.0);
        if self.state.time_remaining <= 0.0 {
            self.finish(SessionOutcome::Timeout, events);
            return;
        }

        if !self.state.final_stretch && self.state.time_remaining <= FINAL_STRETCH_SECS {
            self.state.final_stretch = true;
            self.state.next_choice_time = FINAL_STRETCH_FIRST_DELAY_SECS;
            events.push(SessionEvent::FinalStretch);
        }

        // Scheduled revert of a temporary mutation boost; dropped unfired
        // when the session ends first.
        if let Some(boost) = self.state.growth_boost
            && self.state.clock >= boost.revert_at
        {
            self.state.growth_multiplier = boost.previous;
            self.state.growth_boost = None;
        }

        // Penalties reflect species already extinct before this tick.
        let penalties = species::growth_penalties(&self.state);

        self.check_tipping_points(dt, events);
        self.check_extinctions(events);

        let biomes = biome::catalog();
        let biome_id = self.state.biome.unwrap_or_default();
        let health = self.state.ecosystem_health;

        let mut pop_growth = POPULATION_GROWTH_PER_SEC
            * biomes.modifier(biome_id, ModifierKind::Population, health)
            * dt;
        pop_growth *= penalties.population;
        pop_growth *= self.state.momentum_multiplier;
        pop_growth *= self.state.growth_multiplier;
        if self.state.final_stretch {
            pop_growth *= FINAL_STRETCH_GROWTH_BOOST;
        }
        self.state.population += pop_growth;

        let mut tech_growth =
            TECH_GROWTH_PER_SEC * biomes.modifier(biome_id, ModifierKind::Tech, health) * dt;
        tech_growth *= penalties.tech;
        tech_growth *= self.state.momentum_multiplier;
        if self.state.final_stretch {
            tech_growth *= FINAL_STRETCH_GROWTH_BOOST;
        }
        self.state.tech_level += tech_growth;

        let mut resource_growth = RESOURCE_GROWTH_PER_SEC
            * biomes.modifier(biome_id, ModifierKind::Resources, health)
            * dt;
        resource_growth *= penalties.resources;
        self.state.resources += resource_growth;

        // Entropy: proportional decay on the coupled channels.
        let decay = NATURAL_DECAY_PER_MINUTE / 60.0 * dt;
        self.state.ecosystem_health -= self.state.ecosystem_health * decay;
        self.state.tech_level -= self.state.tech_level * decay;
        self.state.population -= self.state.population * decay;

        // Crowding pressure, doubled once the death spiral is live.
        let mut degradation =
            (self.state.population / CROWDING_POPULATION_UNIT) * CROWDING_RATE_PER_SEC * dt;
        if self.state.death_spiral_active {
            degradation *= DEATH_SPIRAL_DEGRADATION_FACTOR;
        }
        self.state.ecosystem_health -= degradation;

        // Die-off compounds with the generic decay term at low health.
        if self.state.ecosystem_health < DIE_OFF_HEALTH_THRESHOLD {
            self.state.population -= self.state.population * DIE_OFF_RATE_PER_SEC * dt;
        }

        self.state.clamp_after_tick();

        if self.state.ecosystem_health <= 0.0 {
            self.finish(SessionOutcome::Collapse, events);
            return;
        }

        self.state.choice_timer += dt;
        self.run_scheduler(events);
    }

    fn check_tipping_points(&mut self, dt: f64, events: &mut Vec<SessionEvent>) {
        let eco = self.state.ecosystem_health;
        if eco < TIPPING_POINT_HEALTH && !self.state.tipping_point_warning {
            self.state.tipping_point_warning = true;
            events.push(SessionEvent::TippingPointWarning);
        }
        if eco < DEATH_SPIRAL_HEALTH && !self.state.death_spiral_active {
            self.state.death_spiral_active = true;
            events.push(SessionEvent::DeathSpiralActivated);
        }
        // Near-irrecoverable zone: a flat extra drain below the floor.
        if eco < LOW_HEALTH_FLOOR && eco > 0.0 {
            self.state.ecosystem_health -= LOW_HEALTH_DECAY_PER_SEC * dt;
        }
    }

    fn check_extinctions(&mut self, events: &mut Vec<SessionEvent>) {
        let before = self.state.species.iter().filter(|s| s.extinct).count();
        let newly = species::check_extinctions(&mut self.state);
        if newly.is_empty() {
            return;
        }
        for id in &newly {
            events.push(SessionEvent::SpeciesExtinct { id: *id });
        }
        let after = before + newly.len();
        if before < MASS_EXTINCTION_COUNT && after >= MASS_EXTINCTION_COUNT {
            events.push(SessionEvent::MassExtinction);
            if !self.state.death_spiral_active {
                self.state.death_spiral_active = true;
                events.push(SessionEvent::DeathSpiralActivated);
            }
        }
    }

    fn run_scheduler(&mut self, events: &mut Vec<SessionEvent>) {
        if self.state.pending_choice.is_some() {
            return;
        }
        if self.state.choice_timer < self.state.next_choice_time {
            return;
        }
        if self.state.choices_presented.len() >= self.cfg.choice_cap {
            return;
        }

        // Mutations ride the scheduling slot without consuming it.
        self.maybe_trigger_mutation(events);

        if self.should_trigger_crisis() {
            let crisis = self.state.crisis_queue.remove(0);
            let elapsed_ref = CRISIS_REFERENCE_WINDOW_SECS - self.state.time_remaining;
            self.state.last_crisis_at = Some(elapsed_ref);
            if debug_log_enabled() {
                println!("Scheduler | crisis {} at ref {elapsed_ref:.1}s", crisis.id);
            }
            self.present_choice(crisis, events);
            return;
        }

        let unused: Vec<ChoiceDef> = self
            .catalog
            .choices
            .iter()
            .filter(|c| !self.state.choices_presented.iter().any(|p| p == &c.id))
            .cloned()
            .collect();
        let pool = if unused.is_empty() {
            // Catalog exhausted: recycle so the finite pool replays.
            self.state.choices_presented.clear();
            self.catalog.choices.clone()
        } else {
            unused
        };
        if pool.is_empty() {
            return;
        }
        let index = self.rng.catalog().gen_range(0..pool.len());
        let choice = pool[index].clone();
        if debug_log_enabled() {
            println!("Scheduler | choice {} ({} unused)", choice.id, pool.len());
        }
        self.present_choice(choice, events);
    }

    fn maybe_trigger_mutation(&mut self, events: &mut Vec<SessionEvent>) {
        if self.state.mutations_triggered >= MUTATION_MAX_PER_SESSION {
            return;
        }
        let Some(elapsed) = self.state.civilization_elapsed() else {
            return;
        };
        if elapsed <= MUTATION_WARMUP_SECS {
            return;
        }
        let roll = self.rng.mutation().r#gen::<f64>();
        if roll >= MUTATION_TRIGGER_CHANCE {
            return;
        }
        self.state.mutations_triggered += 1;
        let def = mutation::pick(&mut *self.rng.mutation());
        mutation::apply(&mut self.state, def);
        events.push(SessionEvent::MutationTriggered { id: def.id });
    }

    fn should_trigger_crisis(&self) -> bool {
        if self.state.crisis_queue.is_empty() {
            return false;
        }
        let elapsed_ref = CRISIS_REFERENCE_WINDOW_SECS - self.state.time_remaining;
        if elapsed_ref < CRISIS_WARMUP_SECS
            || self.state.time_remaining < CRISIS_TAIL_GUARD_SECS
        {
            return false;
        }
        let since_last = self
            .state
            .last_crisis_at
            .map_or(elapsed_ref, |last| elapsed_ref - last);
        since_last > CRISIS_MIN_GAP_SECS
            && self.rng.crisis().r#gen::<f64>() < CRISIS_TRIGGER_CHANCE
    }

    fn present_choice(&mut self, def: ChoiceDef, events: &mut Vec<SessionEvent>) {
        let mut options = def.options;
        // Shuffled per presentation so option position carries no signal.
        options.shuffle(&mut *self.rng.catalog());
        events.push(SessionEvent::ChoiceOffered {
            id: def.id.clone(),
            is_crisis: def.is_crisis,
        });
        self.state.pending_choice = Some(PendingChoice {
            id: def.id,
            title: def.title,
            description: def.description,
            is_crisis: def.is_crisis,
            timer: def.timer,
            options,
            presented_at: self.state.clock,
        });
    }

    /// Resolve the outstanding choice. A no-op when no choice is pending,
    /// the id does not match, or the option index is out of range.
    pub fn make_choice(&mut self, choice_id: &str, option_index: usize) -> TickOutcome {
        if self.state.phase != SessionPhase::Civilization {
            return TickOutcome::default();
        }
        let Some(pending) = self.state.pending_choice.take() else {
            return TickOutcome::default();
        };
        if pending.id != choice_id || option_index >= pending.options.len() {
            self.state.pending_choice = Some(pending);
            return TickOutcome::default();
        }
        let option = pending.options[option_index].clone();
        let mut events = Vec::new();

        let latency = (self.state.clock - pending.presented_at).max(0.0);
        if latency < SPEED_BONUS_FAST_SECS {
            self.state.speed_bonus += SPEED_BONUS_FAST_POINTS;
            self.state.fast_choices_count += 1;
        } else if latency < SPEED_BONUS_QUICK_SECS {
            self.state.speed_bonus += SPEED_BONUS_QUICK_POINTS;
            self.state.fast_choices_count += 1;
        }
        if self.state.fast_choices_count >= MOMENTUM_TIER_ONE_COUNT {
            self.state.momentum_multiplier = MOMENTUM_TIER_ONE_FACTOR;
        }
        if self.state.fast_choices_count >= MOMENTUM_TIER_TWO_COUNT {
            self.state.momentum_multiplier = MOMENTUM_TIER_TWO_FACTOR;
        }
        if latency > SLOW_CHOICE_SECS {
            self.state.fast_choices_count = 0;
            self.state.momentum_multiplier = MOMENTUM_BASELINE;
        }

        option.effects.apply(&mut self.state);
        self.state.genes.adapt(option.choice_type);
        self.state.push_choice_type(option.choice_type);
        self.apply_streaks();
        self.state.clamp_after_choice();

        events.push(SessionEvent::ChoiceResolved {
            id: pending.id.clone(),
            choice_type: option.choice_type,
        });
        if self.state.ecosystem_health < DIE_OFF_HEALTH_THRESHOLD {
            events.push(SessionEvent::EcosystemStressed);
        }

        self.state.choices_presented.push(pending.id);
        self.state.choice_timer = 0.0;
        self.state.next_choice_time = if self.state.final_stretch {
            FINAL_STRETCH_REARM_SECS
        } else {
            CHOICE_REARM_BASE_SECS
                + self.rng.pacing().gen_range(0.0..CHOICE_REARM_JITTER_SECS)
        };

        if self.state.ecosystem_health <= 0.0 {
            self.finish(SessionOutcome::Collapse, &mut events);
        }

        TickOutcome {
            ended: self.state.phase == SessionPhase::Ended,
            events,
        }
    }

    fn apply_streaks(&mut self) {
        if self.state.last_choice_types.len() < STREAK_WINDOW {
            return;
        }
        let first = self.state.last_choice_types[0];
        if self.state.last_choice_types.iter().all(|t| *t == first) {
            match first {
                ChoiceType::Sustainable => {
                    self.state.streak_bonus += STREAK_MATCH_BONUS;
                    self.state.ecosystem_health += STREAK_SUSTAINABLE_HEALTH_GAIN;
                }
                ChoiceType::Aggressive => {
                    self.state.streak_bonus += STREAK_MATCH_BONUS;
                    self.state.ecosystem_health -= STREAK_AGGRESSIVE_HEALTH_LOSS;
                }
                ChoiceType::Balanced => {}
            }
        } else {
            let [a, b, c] = [
                self.state.last_choice_types[0],
                self.state.last_choice_types[1],
                self.state.last_choice_types[2],
            ];
            if a != b && b != c && a != c {
                self.state.streak_bonus += STREAK_DIVERSE_BONUS;
            }
        }
    }

    fn finish(&mut self, outcome: SessionOutcome, events: &mut Vec<SessionEvent>) {
        if self.state.phase == SessionPhase::Ended {
            return;
        }
        self.state.phase = SessionPhase::Ended;
        self.state.outcome = Some(outcome);
        if outcome == SessionOutcome::Collapse {
            self.state.ecosystem_health = 0.0;
        }
        // Suppress any armed boost revert; the session is no longer live.
        self.state.growth_boost = None;
        self.state.pending_choice = None;
        self.state.score = Some(score::calculate_final_score(&self.state));
        events.push(SessionEvent::SessionEnded { outcome });
    }

    /// Assemble the leaderboard record for a finished session. `timestamp`
    /// is supplied by the caller; the engine never reads wall clocks.
    #[must_use]
    pub fn final_record(&self, timestamp: i64) -> Option<ScoreRecord> {
        let score = self.state.score.as_ref()?;
        Some(ScoreRecord {
            name: self.state.player_name.clone(),
            score: score.final_score,
            civilization: score.genetic,
            ecosystem: round_f64_to_i64(self.state.ecosystem_health),
            population: floor_f64_to_i64(self.state.population),
            tech_level: floor_f64_to_i64(self.state.tech_level),
            resources: floor_f64_to_i64(self.state.resources),
            biome: self.state.biome.unwrap_or_default(),
            playstyle: score.playstyle.clone(),
            timestamp,
        })
    }
}
