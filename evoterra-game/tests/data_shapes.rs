//! Shape and invariant checks over the embedded data catalogs.

use std::collections::HashSet;

use evoterra_game::species::{self, PenaltyChannel};
use evoterra_game::{BiomeId, ChoiceType, catalog};

#[test]
fn choice_pool_has_fourteen_unique_entries() {
    let catalog = catalog::catalog();
    assert_eq!(catalog.choices.len(), 14);
    let ids: HashSet<&str> = catalog.choices.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), 14, "choice ids must be unique");
    assert!(catalog.choices.iter().all(|c| !c.is_crisis));
}

#[test]
fn crisis_pool_has_eight_entries_with_timers() {
    let catalog = catalog::catalog();
    assert_eq!(catalog.crises.len(), 8);
    let ids: HashSet<&str> = catalog.crises.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), 8, "crisis ids must be unique");
    for crisis in &catalog.crises {
        assert!(crisis.timer > 0, "{} needs an answer window", crisis.id);
    }
    // Fortune events ride the pool without crisis styling.
    assert_eq!(catalog.crises.iter().filter(|c| !c.is_crisis).count(), 2);
}

#[test]
fn pools_are_disjoint_and_options_are_well_formed() {
    let catalog = catalog::catalog();
    let choice_ids: HashSet<&str> = catalog.choices.iter().map(|c| c.id.as_str()).collect();
    let crisis_ids: HashSet<&str> = catalog.crises.iter().map(|c| c.id.as_str()).collect();
    assert!(choice_ids.is_disjoint(&crisis_ids));

    for entry in catalog.choices.iter().chain(catalog.crises.iter()) {
        assert!(
            (2..=3).contains(&entry.options.len()),
            "{} must offer 2-3 options",
            entry.id
        );
        assert!(!entry.title.is_empty());
        assert!(!entry.description.is_empty());
        let types: HashSet<ChoiceType> = entry.options.iter().map(|o| o.choice_type).collect();
        assert_eq!(
            types.len(),
            entry.options.len(),
            "{} options must carry distinct classifications",
            entry.id
        );
        for option in &entry.options {
            assert!(!option.label.is_empty());
            assert!(!option.effect.is_empty());
            assert!(option.effects.population_scale > 0.0);
            assert!(option.effects.eco_damage >= 0.0);
            assert!(option.effects.eco_recovery >= 0.0);
            assert!(
                option.effects.eco_damage == 0.0 || option.effects.eco_recovery == 0.0,
                "{} mixes damage and recovery in one option",
                entry.id
            );
        }
    }
}

#[test]
fn species_roster_penalties_stay_below_unity_per_channel() {
    let roster = species::roster();
    assert_eq!(roster.len(), 8);

    let mut population = 0.0;
    let mut tech = 0.0;
    let mut resources = 0.0;
    for entry in &roster {
        assert!(entry.threshold > 0.0 && entry.threshold < 100.0);
        assert!(entry.penalty > 0.0 && entry.penalty < 1.0);
        assert!(!entry.extinct);
        match species::penalty_channel(entry.id) {
            PenaltyChannel::Population => population += entry.penalty,
            PenaltyChannel::Tech => tech += entry.penalty,
            PenaltyChannel::Resources => resources += entry.penalty,
        }
    }
    // Exact sums the growth multipliers are derived from.
    assert!((population - 0.48).abs() < 1e-9);
    assert!((tech - 0.10).abs() < 1e-9);
    assert!((resources - 0.40).abs() < 1e-9);
    // No channel can invert growth even with every species extinct.
    assert!(population < 1.0 && tech < 1.0 && resources < 1.0);
    // The cumulative score penalty keeps the extinction multiplier positive.
    assert!((population + tech + resources - 0.98).abs() < 1e-9);
}

#[test]
fn biome_catalog_rates_are_sane() {
    let biomes = evoterra_game::biome::catalog();
    assert_eq!(biomes.biomes.len(), 6);
    for id in BiomeId::all() {
        let biome = biomes.get(id);
        assert_eq!(biome.id, id);
        assert!(biome.population_growth_rate > 0.0);
        assert!(biome.tech_growth_rate > 0.0);
        assert!(biome.resource_generation > 0.0);
        assert!(biome.fragility > 0.0);
        assert!(biome.resilience > 0.0);
        assert!(!biome.name.is_empty());
        assert!(!biome.tagline.is_empty());
    }
}
