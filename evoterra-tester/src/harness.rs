//! Headless session runner stepping the engine on a fixed cadence.

use serde::Serialize;

use evoterra_game::{
    BiomeId, SessionCfg, SessionEngine, SessionOutcome, SessionPhase, species,
};

use crate::policy::DecisionPolicy;

const DT: f64 = 0.1;
const SAFETY_TICKS: usize = 100_000;

/// Flattened result of one scripted session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub seed: u64,
    pub biome: String,
    pub outcome: String,
    pub final_score: i64,
    pub genetic: i64,
    pub streak_bonus: f64,
    pub speed_bonus: f64,
    pub momentum: f64,
    pub extinct_species: usize,
    pub choices_resolved: usize,
    pub playstyle: String,
    pub played_secs: f64,
}

/// Run one full session under the given policy and return its report.
pub fn run_session(
    seed: u64,
    biome: BiomeId,
    cfg: SessionCfg,
    policy: &mut DecisionPolicy,
) -> anyhow::Result<SessionReport> {
    let mut engine = SessionEngine::with_default_catalog(cfg, seed);
    engine.start_session("Tester");

    while !engine.can_select_biome() {
        engine.tick(DT);
    }
    engine.select_biome(biome);
    anyhow::ensure!(
        engine.state().phase == SessionPhase::Civilization,
        "biome selection must enter the civilization phase"
    );

    let mut choices_resolved = 0usize;
    let mut answer_at: Option<(String, usize, f64)> = None;
    for _ in 0..SAFETY_TICKS {
        let outcome = engine.tick(DT);
        if outcome.ended {
            break;
        }
        if engine.pending_choice().is_none() {
            answer_at = None;
            continue;
        }
        if answer_at.is_none() {
            if let Some(pending) = engine.pending_choice() {
                let index = policy.pick_option(pending);
                let due = engine.state().clock + policy.answer_delay();
                answer_at = Some((pending.id.clone(), index, due));
            }
            continue;
        }
        let due_now = answer_at
            .as_ref()
            .is_some_and(|(_, _, due)| engine.state().clock >= *due);
        if due_now && let Some((id, index, _)) = answer_at.take() {
            let resolved = engine.make_choice(&id, index);
            choices_resolved += 1;
            log::debug!(
                "seed {seed}: resolved {id} ({} events)",
                resolved.events.len()
            );
            if resolved.ended {
                break;
            }
        }
    }

    let state = engine.state();
    anyhow::ensure!(
        state.phase == SessionPhase::Ended,
        "session did not terminate within the safety window"
    );
    let score = engine
        .score()
        .ok_or_else(|| anyhow::anyhow!("ended session carries no score"))?;

    let outcome = match state.outcome {
        Some(SessionOutcome::Collapse) => "collapse",
        Some(SessionOutcome::Timeout) => "timeout",
        None => "unknown",
    };
    let played_secs = state
        .civilization_started_at
        .map_or(0.0, |started| state.clock - started);

    Ok(SessionReport {
        seed,
        biome: biome.to_string(),
        outcome: outcome.to_string(),
        final_score: score.final_score,
        genetic: score.genetic,
        streak_bonus: score.streak_bonus,
        speed_bonus: score.speed_bonus,
        momentum: score.momentum,
        extinct_species: species::survival_counts(state).extinct,
        choices_resolved,
        playstyle: score.playstyle.clone(),
        played_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Strategy;

    #[test]
    fn scripted_session_terminates_and_reports() {
        let mut policy = DecisionPolicy::new(Strategy::Sustainable, 9);
        let report = run_session(9, BiomeId::Temperate, SessionCfg::default(), &mut policy)
            .expect("session runs");
        assert!(report.final_score >= 0);
        assert!(report.choices_resolved > 0);
        assert!(report.played_secs > 0.0);
        assert_eq!(report.outcome, "timeout");
    }

    #[test]
    fn aggressive_runs_burn_out_early() {
        let mut policy = DecisionPolicy::new(Strategy::Aggressive, 10);
        let report = run_session(10, BiomeId::Tropical, SessionCfg::default(), &mut policy)
            .expect("session runs");
        assert_eq!(report.outcome, "collapse");
        assert!(report.extinct_species >= 2, "collapse crosses the fragile thresholds");
        assert!(report.played_secs < 180.0);
    }
}
