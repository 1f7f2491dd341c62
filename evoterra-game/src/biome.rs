//! Biome catalog and pure growth/damage modifier lookups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::constants::{
    BIOME_POP_BONUS_FACTOR, BIOME_POP_BONUS_HEALTH, BIOME_POP_PENALTY_FACTOR,
    BIOME_POP_PENALTY_HEALTH, BIOME_RESOURCE_MODIFIER_FLOOR,
};

const DEFAULT_BIOMES_DATA: &str = include_str!("../assets/data/biomes.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BiomeId {
    Tropical,
    #[default]
    Temperate,
    Grassland,
    Desert,
    Tundra,
    Oceanic,
}

impl BiomeId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tropical => "tropical",
            Self::Temperate => "temperate",
            Self::Grassland => "grassland",
            Self::Desert => "desert",
            Self::Tundra => "tundra",
            Self::Oceanic => "oceanic",
        }
    }

    /// Every selectable biome, in catalog order.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Tropical,
            Self::Temperate,
            Self::Grassland,
            Self::Desert,
            Self::Tundra,
            Self::Oceanic,
        ]
    }
}

impl fmt::Display for BiomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BiomeId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tropical" => Ok(Self::Tropical),
            "temperate" => Ok(Self::Temperate),
            "grassland" => Ok(Self::Grassland),
            "desert" => Ok(Self::Desert),
            "tundra" => Ok(Self::Tundra),
            "oceanic" => Ok(Self::Oceanic),
            _ => Err(()),
        }
    }
}

/// Which growth/decay channel a modifier lookup applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Population,
    Tech,
    Resources,
    Damage,
    Recovery,
}

/// Score-bonus predicates a biome can opt into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BiomeBonuses {
    #[serde(default)]
    pub high_biodiversity: bool,
    #[serde(default)]
    pub rapid_collapse: bool,
    #[serde(default)]
    pub all_rounder: bool,
    #[serde(default)]
    pub resilient: bool,
    #[serde(default)]
    pub expansion: bool,
    #[serde(default)]
    pub hardy_population: bool,
    #[serde(default)]
    pub water_mastery: bool,
    #[serde(default)]
    pub slow_and_steady: bool,
    #[serde(default)]
    pub tech_advantage: bool,
    #[serde(default)]
    pub maritime: bool,
    #[serde(default)]
    pub pollution_sensitive: bool,
}

/// A single biome definition with its growth rates and ecosystem character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    pub id: BiomeId,
    pub name: String,
    pub description: String,
    pub tagline: String,
    pub population_growth_rate: f64,
    pub tech_growth_rate: f64,
    pub resource_generation: f64,
    /// Damage multiplier applied to ecosystem losses from choices.
    pub fragility: f64,
    /// Recovery multiplier applied to ecosystem gains from choices.
    pub resilience: f64,
    #[serde(default)]
    pub bonuses: BiomeBonuses,
}

/// Container for all biome data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BiomeCatalog {
    pub biomes: Vec<Biome>,
}

impl BiomeCatalog {
    /// Load biome data from JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid biome data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load biome data from the embedded static catalog.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_BIOMES_DATA).unwrap_or_default()
    }

    /// Look up a biome, falling back to Temperate for ids missing from the
    /// catalog, or to a neutral inline default when the catalog is empty.
    #[must_use]
    pub fn get(&self, id: BiomeId) -> Biome {
        self.biomes
            .iter()
            .find(|b| b.id == id)
            .or_else(|| self.biomes.iter().find(|b| b.id == BiomeId::Temperate))
            .cloned()
            .unwrap_or_else(|| neutral_biome(id))
    }

    /// Growth/damage multiplier for a channel at the given ecosystem health.
    #[must_use]
    pub fn modifier(&self, id: BiomeId, kind: ModifierKind, ecosystem_health: f64) -> f64 {
        let biome = self.get(id);
        match kind {
            ModifierKind::Population => {
                let mut factor = biome.population_growth_rate;
                if ecosystem_health > BIOME_POP_BONUS_HEALTH {
                    factor *= BIOME_POP_BONUS_FACTOR;
                }
                if ecosystem_health < BIOME_POP_PENALTY_HEALTH {
                    factor *= BIOME_POP_PENALTY_FACTOR;
                }
                factor
            }
            ModifierKind::Tech => biome.tech_growth_rate,
            ModifierKind::Resources => {
                let factor = biome.resource_generation * (ecosystem_health / 100.0);
                factor.max(BIOME_RESOURCE_MODIFIER_FLOOR)
            }
            ModifierKind::Damage => biome.fragility,
            ModifierKind::Recovery => biome.resilience,
        }
    }

    /// Multiplicative final-score bonus from the biome's predicate set.
    #[must_use]
    pub fn score_bonus(&self, id: BiomeId, ecosystem_health: f64) -> f64 {
        let biome = self.get(id);
        let mut bonus = 1.0;
        if biome.bonuses.high_biodiversity && ecosystem_health > 80.0 {
            bonus *= 1.15;
        }
        if biome.bonuses.rapid_collapse && ecosystem_health < 30.0 {
            bonus *= 0.8;
        }
        if biome.bonuses.all_rounder {
            bonus *= 1.05;
        }
        if biome.bonuses.slow_and_steady && ecosystem_health > 60.0 {
            bonus *= 1.1;
        }
        if biome.bonuses.hardy_population && ecosystem_health < 40.0 {
            bonus *= 1.15;
        }
        bonus
    }
}

fn neutral_biome(id: BiomeId) -> Biome {
    Biome {
        id,
        name: String::from("Temperate Forest"),
        description: String::from("Balanced woodland with four seasons"),
        tagline: String::from("Balanced growth, stable ecosystem"),
        population_growth_rate: 1.0,
        tech_growth_rate: 1.0,
        resource_generation: 1.0,
        fragility: 1.0,
        resilience: 1.0,
        bonuses: BiomeBonuses::default(),
    }
}

/// Shared catalog instance parsed once from the embedded asset.
#[must_use]
pub fn catalog() -> &'static BiomeCatalog {
    static CATALOG: OnceLock<BiomeCatalog> = OnceLock::new();
    CATALOG.get_or_init(BiomeCatalog::load_from_static)
}

/// Coarse ecosystem health classification for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthBand {
    Healthy,
    Warning,
    Danger,
    Critical,
}

impl HealthBand {
    #[must_use]
    pub fn classify(ecosystem_health: f64) -> Self {
        if ecosystem_health >= 70.0 {
            Self::Healthy
        } else if ecosystem_health >= 40.0 {
            Self::Warning
        } else if ecosystem_health >= 20.0 {
            Self::Danger
        } else {
            Self::Critical
        }
    }
}
