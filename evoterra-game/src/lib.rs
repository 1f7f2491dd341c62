//! Evoterra Game Engine
//!
//! Platform-agnostic core logic for the Evoterra short-session ecology game.
//! This crate provides all simulation mechanics without UI or
//! platform-specific dependencies.

pub mod biome;
pub mod catalog;
pub mod constants;
pub mod genes;
pub mod leaderboard;
pub mod mutation;
pub mod numbers;
pub mod score;
pub mod session;
pub mod species;
pub mod state;

// Re-export commonly used types
pub use biome::{Biome, BiomeCatalog, BiomeId, HealthBand, ModifierKind};
pub use catalog::{ChoiceDef, ChoiceType, Effects, EventCatalog, OptionDef};
pub use genes::{Fitness, GeneWeights};
pub use leaderboard::{
    LeaderboardError, LeaderboardStats, LeaderboardStore, LocalLeaderboard, ScoreRecord,
    ScoreService, SubmitOutcome, fetch_top, record_score,
};
pub use mutation::{MUTATIONS, MutationDef, MutationId};
pub use score::{ScoreBreakdown, calculate_final_score};
pub use session::{
    CountingRng, EventSeverity, RngBundle, SessionCfg, SessionEngine, SessionEvent, TickOutcome,
};
pub use species::{ExtinctionNarrative, NarrativeTier, Species, SpeciesId, SurvivalCounts};
pub use state::{
    EVOLUTION_STAGES, EvolutionStage, GrowthBoost, PendingChoice, SessionOutcome, SessionPhase,
    SessionState,
};

/// Trait for abstracting catalog loading operations.
/// Platform-specific implementations should provide this.
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the choice and crisis catalogs from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog data cannot be loaded.
    fn load_event_catalog(&self) -> Result<EventCatalog, Self::Error>;
}

/// Loader backed by the catalogs embedded in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalogLoader;

impl CatalogLoader for StaticCatalogLoader {
    type Error = std::convert::Infallible;

    fn load_event_catalog(&self) -> Result<EventCatalog, Self::Error> {
        Ok(catalog::catalog().clone())
    }
}

/// Main host tying a catalog loader and leaderboard storage to engine
/// construction and score recording.
pub struct GameHost<L, S>
where
    L: CatalogLoader,
    S: LeaderboardStore,
{
    loader: L,
    store: S,
}

impl<L, S> GameHost<L, S>
where
    L: CatalogLoader,
    S: LeaderboardStore,
{
    /// Create a new host with the provided loader and storage.
    pub const fn new(loader: L, store: S) -> Self {
        Self { loader, store }
    }

    /// Construct a session engine with the specified configuration and seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog data cannot be loaded.
    pub fn create_engine(&self, cfg: SessionCfg, seed: u64) -> Result<SessionEngine, L::Error> {
        let catalog = self.loader.load_event_catalog()?;
        Ok(SessionEngine::new(catalog, cfg, seed))
    }

    /// Record a finished session's score: best-effort remote submit, local
    /// fallback, never an error.
    pub fn record_score<Sv: ScoreService>(
        &self,
        service: &Sv,
        record: ScoreRecord,
    ) -> SubmitOutcome {
        leaderboard::record_score(&self.store, service, record)
    }

    /// Read the top-N list, falling back to the local board when the remote
    /// service is unavailable.
    pub fn fetch_top<Sv: ScoreService>(&self, service: &Sv, n: usize) -> Vec<ScoreRecord> {
        leaderboard::fetch_top(&self.store, service, n)
    }

    /// Load the persisted local board, or a fresh one when nothing was
    /// saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer rejects the read.
    pub fn load_leaderboard(&self) -> Result<LocalLeaderboard, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        Ok(self
            .store
            .load()
            .map_err(Into::into)?
            .unwrap_or_default())
    }

    /// Borrow the leaderboard store.
    pub const fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::{MemoryStore, OfflineService};

    #[test]
    fn host_builds_engines_from_loaded_catalogs() {
        let host = GameHost::new(StaticCatalogLoader, MemoryStore::default());
        let engine = host
            .create_engine(SessionCfg::default(), 0xABCD)
            .expect("static loader is infallible");
        assert_eq!(engine.seed(), 0xABCD);
        assert_eq!(engine.state().phase, SessionPhase::NotStarted);
    }

    #[test]
    fn host_records_scores_with_local_fallback() {
        let host = GameHost::new(StaticCatalogLoader, MemoryStore::default());
        let record = ScoreRecord {
            name: String::from("Ada"),
            score: 5_000,
            civilization: 4_000,
            ecosystem: 62,
            population: 310,
            tech_level: 140,
            resources: 85,
            biome: BiomeId::Grassland,
            playstyle: String::from("Innovator"),
            timestamp: 1_700_000_000_000,
        };
        let outcome = host.record_score(&OfflineService, record);
        assert!(!outcome.remote);
        assert!(outcome.saved_locally);
        assert_eq!(outcome.rank, Some(1));

        let top = host.fetch_top(&OfflineService, 10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "Ada");

        let board = host.load_leaderboard().expect("memory store never fails");
        assert_eq!(board.len(), 1);
        assert_eq!(board.rank(6_000), 1);
    }
}
