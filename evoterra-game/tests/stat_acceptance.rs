//! Statistical acceptance tests over the seeded scheduling policies.

use std::collections::HashMap;

use evoterra_game::{BiomeId, SessionCfg, SessionEngine, SessionPhase};

const TOLERANCE: f64 = 0.03;

fn fresh_engine(seed: u64) -> SessionEngine {
    SessionEngine::with_default_catalog(SessionCfg::default(), seed)
}

#[test]
fn crisis_draw_is_uniform_without_replacement() {
    const SAMPLES: u64 = 2_000;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for seed in 0..SAMPLES {
        let mut engine = fresh_engine(seed);
        engine.start_session("sampler");
        let queue = &engine.state().crisis_queue;
        assert_eq!(queue.len(), 3);
        let mut ids: Vec<&str> = queue.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3, "crises are drawn without replacement");
        for crisis in queue {
            *counts.entry(crisis.id.clone()).or_default() += 1;
        }
    }
    // Each of the 8 pool entries should land in roughly 3/8 of sessions.
    let expected = 3.0 / 8.0;
    for (id, count) in &counts {
        #[allow(clippy::cast_precision_loss)]
        let observed = *count as f64 / SAMPLES as f64;
        assert!(
            (observed - expected).abs() <= 0.05,
            "{id} drawn at rate {observed:.3}, expected {expected:.3}"
        );
    }
}

#[test]
fn first_regular_choice_is_roughly_uniform_over_the_pool() {
    const SAMPLES: u64 = 1_500;
    let catalog = evoterra_game::catalog::catalog();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut regular_offers = 0usize;

    for seed in 0..SAMPLES {
        let mut engine = fresh_engine(seed);
        engine.start_session("sampler");
        while !engine.can_select_biome() {
            engine.tick(0.5);
        }
        engine.select_biome(BiomeId::Temperate);
        while engine.pending_choice().is_none()
            && engine.state().phase == SessionPhase::Civilization
        {
            engine.tick(0.5);
        }
        let Some(pending) = engine.pending_choice() else {
            continue;
        };
        // A small fraction of seeds draw a crisis first; skip those.
        if catalog.crises.iter().any(|c| c.id == pending.id) {
            continue;
        }
        *counts.entry(pending.id.clone()).or_default() += 1;
        regular_offers += 1;
    }

    assert_eq!(counts.len(), catalog.choices.len(), "every id gets offered");
    let expected = 1.0 / 14.0;
    for (id, count) in &counts {
        #[allow(clippy::cast_precision_loss)]
        let observed = *count as f64 / regular_offers as f64;
        assert!(
            (observed - expected).abs() <= TOLERANCE,
            "{id} offered first at rate {observed:.3}, expected {expected:.3}"
        );
    }
}

#[test]
fn rearm_jitter_spans_the_five_to_seven_second_band() {
    const SAMPLES: usize = 1_000;
    let mut engine = fresh_engine(0xACED);
    engine.start_session("sampler");
    while !engine.can_select_biome() {
        engine.tick(0.5);
    }
    engine.select_biome(BiomeId::Grassland);

    let mut total = 0.0;
    let mut resolved = 0usize;
    let mut low = f64::MAX;
    let mut high = f64::MIN;
    while resolved < SAMPLES {
        engine.tick(0.25);
        if engine.state().phase != SessionPhase::Civilization {
            // Countdown exhausted; restart and keep sampling.
            engine.start_session("sampler");
            while !engine.can_select_biome() {
                engine.tick(0.5);
            }
            engine.select_biome(BiomeId::Grassland);
            continue;
        }
        if engine.state().final_stretch {
            // The final stretch pins the interval; skip it for this test.
            continue;
        }
        if let Some(pending) = engine.pending_choice() {
            let id = pending.id.clone();
            engine.make_choice(&id, 0);
            let interval = engine.state().next_choice_time;
            total += interval;
            low = low.min(interval);
            high = high.max(interval);
            resolved += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = total / resolved as f64;
    assert!(low >= 5.0, "interval floor violated: {low:.3}");
    assert!(high < 7.0, "interval ceiling violated: {high:.3}");
    assert!((mean - 6.0).abs() <= 0.1, "interval mean drifted: {mean:.3}");
}
