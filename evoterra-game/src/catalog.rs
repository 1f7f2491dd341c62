//! Choice and crisis catalogs.
//!
//! Options carry tagged effect records interpreted by one generic applier
//! rather than per-entry executable code, so the full catalog can be
//! validated and tested as data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::biome::{self, ModifierKind};
use crate::state::SessionState;

const DEFAULT_CHOICES_DATA: &str = include_str!("../assets/data/choices.json");
const DEFAULT_CRISES_DATA: &str = include_str!("../assets/data/crises.json");

/// Classification tag fed into the genetic weight engine and the streak
/// bookkeeping when an option is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceType {
    Aggressive,
    Balanced,
    Sustainable,
}

impl ChoiceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Balanced => "balanced",
            Self::Sustainable => "sustainable",
        }
    }
}

impl fmt::Display for ChoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChoiceType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aggressive" => Ok(Self::Aggressive),
            "balanced" => Ok(Self::Balanced),
            "sustainable" => Ok(Self::Sustainable),
            _ => Err(()),
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

/// Deterministic state deltas applied when an option is selected.
///
/// Ecosystem deltas are magnitudes: `eco_damage` is subtracted after scaling
/// by the biome damage modifier, `eco_recovery` added after scaling by the
/// recovery modifier. `population_scale` multiplies population before the
/// additive delta (used by evacuation-style outcomes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effects {
    #[serde(default)]
    pub population: f64,
    #[serde(default)]
    pub tech: f64,
    #[serde(default)]
    pub resources: f64,
    #[serde(default = "default_scale")]
    pub population_scale: f64,
    #[serde(default)]
    pub eco_damage: f64,
    #[serde(default)]
    pub eco_recovery: f64,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            population: 0.0,
            tech: 0.0,
            resources: 0.0,
            population_scale: 1.0,
            eco_damage: 0.0,
            eco_recovery: 0.0,
        }
    }
}

impl Effects {
    /// Apply the record to the session state, scaling ecosystem deltas by the
    /// selected biome's damage/recovery modifiers at the current health.
    pub fn apply(&self, state: &mut SessionState) {
        let biome_id = state.biome.unwrap_or_default();
        let biomes = biome::catalog();
        state.population = state.population * self.population_scale + self.population;
        state.tech_level += self.tech;
        state.resources += self.resources;
        if self.eco_damage != 0.0 {
            let modifier =
                biomes.modifier(biome_id, ModifierKind::Damage, state.ecosystem_health);
            state.ecosystem_health -= self.eco_damage * modifier;
        }
        if self.eco_recovery != 0.0 {
            let modifier =
                biomes.modifier(biome_id, ModifierKind::Recovery, state.ecosystem_health);
            state.ecosystem_health += self.eco_recovery * modifier;
        }
    }
}

/// One selectable option within a choice or crisis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDef {
    pub label: String,
    /// Short effect summary shown to the player.
    #[serde(default)]
    pub effect: String,
    pub choice_type: ChoiceType,
    #[serde(default)]
    pub effects: Effects,
}

/// A catalog entry: a prompt with 2-3 mutually exclusive options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDef {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Crisis styling flag; fortune events ride the crisis pool with this off.
    #[serde(default)]
    pub is_crisis: bool,
    /// Suggested answer window in seconds, presentation metadata only.
    #[serde(default)]
    pub timer: u32,
    #[serde(default)]
    pub options: Vec<OptionDef>,
}

/// Container for the regular choice pool and the crisis pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EventCatalog {
    pub choices: Vec<ChoiceDef>,
    pub crises: Vec<ChoiceDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
struct ChoicePool {
    choices: Vec<ChoiceDef>,
}

impl EventCatalog {
    /// Create an empty catalog (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load both pools from JSON strings.
    ///
    /// # Errors
    ///
    /// Returns an error if either document cannot be parsed.
    pub fn from_json(choices_json: &str, crises_json: &str) -> Result<Self, serde_json::Error> {
        let choices: ChoicePool = serde_json::from_str(choices_json)?;
        let crises: ChoicePool = serde_json::from_str(crises_json)?;
        Ok(Self {
            choices: choices.choices,
            crises: crises.choices,
        })
    }

    /// Load the embedded static catalogs.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_CHOICES_DATA, DEFAULT_CRISES_DATA).unwrap_or_default()
    }

    /// Look up an entry by id across both pools.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ChoiceDef> {
        self.choices
            .iter()
            .chain(self.crises.iter())
            .find(|c| c.id == id)
    }
}

/// Shared catalog instance parsed once from the embedded assets.
#[must_use]
pub fn catalog() -> &'static EventCatalog {
    static CATALOG: OnceLock<EventCatalog> = OnceLock::new();
    CATALOG.get_or_init(EventCatalog::load_from_static)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeId;

    #[test]
    fn static_catalog_parses_with_expected_pool_sizes() {
        let catalog = catalog();
        assert_eq!(catalog.choices.len(), 14);
        assert_eq!(catalog.crises.len(), 8);
        for entry in catalog.choices.iter().chain(catalog.crises.iter()) {
            assert!(
                (2..=3).contains(&entry.options.len()),
                "{} has {} options",
                entry.id,
                entry.options.len()
            );
        }
    }

    #[test]
    fn effects_apply_scales_eco_by_biome_modifiers() {
        let mut state = SessionState::default();
        state.biome = Some(BiomeId::Tropical);
        state.ecosystem_health = 50.0;
        let effects = Effects {
            population: 10.0,
            eco_damage: 10.0,
            ..Effects::default()
        };
        effects.apply(&mut state);
        // Tropical fragility is 1.5.
        assert!((state.ecosystem_health - 35.0).abs() < 1e-9);
        assert!((state.population - 20.0).abs() < 1e-9);
    }

    #[test]
    fn population_scale_applies_before_delta() {
        let mut state = SessionState::default();
        state.population = 200.0;
        let effects = Effects {
            population_scale: 0.5,
            ..Effects::default()
        };
        effects.apply(&mut state);
        assert!((state.population - 100.0).abs() < 1e-9);
    }

    #[test]
    fn find_reaches_both_pools() {
        let catalog = catalog();
        assert!(catalog.find("food_production").is_some());
        assert!(catalog.find("asteroid").is_some());
        assert!(catalog.find("no_such_id").is_none());
    }
}
