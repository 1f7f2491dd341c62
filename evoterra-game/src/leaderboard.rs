//! Score records, the local ranked list, and the platform seams for
//! persistence and best-effort remote submission.
//!
//! Remote submission is fire-and-forget: a failed or unavailable service
//! degrades to the local list and never surfaces an error to the player.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::biome::BiomeId;
use crate::numbers::round_f64_to_i64;

/// Storage key the local list is persisted under.
pub const LEADERBOARD_KEY: &str = "evoterra_leaderboard";

/// Maximum entries retained in the local list.
pub const MAX_SCORES: usize = 100;

/// One finished session, as submitted and ranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: i64,
    /// Floored genetic score component.
    pub civilization: i64,
    /// Rounded final ecosystem health.
    pub ecosystem: i64,
    pub population: i64,
    pub tech_level: i64,
    pub resources: i64,
    pub biome: BiomeId,
    pub playstyle: String,
    /// Caller-supplied wall-clock timestamp (milliseconds).
    pub timestamp: i64,
}

/// Errors surfaced by leaderboard storage and submission seams.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// The persistence layer rejected the read or write.
    #[error("storage failure: {0}")]
    Storage(String),
    /// The remote service could not be reached or answered badly.
    #[error("service unavailable")]
    Unavailable,
}

/// Local ranked list: descending by score, capped at [`MAX_SCORES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LocalLeaderboard {
    scores: Vec<ScoreRecord>,
}

impl LocalLeaderboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from unordered records, sorting and capping.
    #[must_use]
    pub fn from_records(mut records: Vec<ScoreRecord>) -> Self {
        records.sort_by(|a, b| b.score.cmp(&a.score));
        records.truncate(MAX_SCORES);
        Self { scores: records }
    }

    /// Parse a persisted board from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<ScoreRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Serialize the board for persistence.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.scores)
    }

    /// Insert a record, keeping order and the size cap. Returns the
    /// 1-based rank the record landed at, or `None` when it fell off the
    /// bottom of a full board.
    pub fn insert(&mut self, record: ScoreRecord) -> Option<usize> {
        let position = self
            .scores
            .iter()
            .position(|s| s.score < record.score)
            .unwrap_or(self.scores.len());
        if position >= MAX_SCORES {
            return None;
        }
        self.scores.insert(position, record);
        self.scores.truncate(MAX_SCORES);
        Some(position + 1)
    }

    /// 1-based rank a score would earn against the current board.
    #[must_use]
    pub fn rank(&self, score: i64) -> usize {
        self.scores.iter().take_while(|s| s.score > score).count() + 1
    }

    /// Top `n` records in rank order.
    #[must_use]
    pub fn top(&self, n: usize) -> &[ScoreRecord] {
        &self.scores[..n.min(self.scores.len())]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Aggregate statistics over the stored records.
    #[must_use]
    pub fn stats(&self) -> LeaderboardStats {
        if self.scores.is_empty() {
            return LeaderboardStats::default();
        }
        #[allow(clippy::cast_precision_loss)]
        let count = self.scores.len() as f64;
        let total_score: i64 = self.scores.iter().map(|s| s.score).sum();
        let total_civ: i64 = self.scores.iter().map(|s| s.civilization).sum();
        let total_eco: i64 = self.scores.iter().map(|s| s.ecosystem).sum();

        let most_popular_biome = mode_by(&self.scores, |s| s.biome);
        let most_common_playstyle = mode_by(&self.scores, |s| s.playstyle.clone());

        #[allow(clippy::cast_precision_loss)]
        LeaderboardStats {
            total_games: self.scores.len(),
            average_score: round_f64_to_i64(total_score as f64 / count),
            average_civilization: round_f64_to_i64(total_civ as f64 / count),
            average_ecosystem: round_f64_to_i64(total_eco as f64 / count),
            highest_score: self.scores.first().map_or(0, |s| s.score),
            most_popular_biome,
            most_common_playstyle,
        }
    }
}

fn mode_by<T, K, F>(records: &[T], key: F) -> Option<K>
where
    K: PartialEq + Clone,
    F: Fn(&T) -> K,
{
    let mut best: Option<(K, usize)> = None;
    for record in records {
        let k = key(record);
        let count = records.iter().filter(|r| key(r) == k).count();
        match &best {
            Some((_, best_count)) if *best_count >= count => {}
            _ => best = Some((k, count)),
        }
    }
    best.map(|(k, _)| k)
}

/// Aggregate view of the local list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LeaderboardStats {
    pub total_games: usize,
    pub average_score: i64,
    pub average_civilization: i64,
    pub average_ecosystem: i64,
    pub highest_score: i64,
    pub most_popular_biome: Option<BiomeId>,
    pub most_common_playstyle: Option<String>,
}

/// Trait for abstracting local leaderboard persistence.
/// Platform-specific implementations should provide this.
pub trait LeaderboardStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the persisted board, `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the board cannot be loaded.
    fn load(&self) -> Result<Option<LocalLeaderboard>, Self::Error>;

    /// Persist the board under [`LEADERBOARD_KEY`].
    ///
    /// # Errors
    ///
    /// Returns an error if the board cannot be saved.
    fn save(&self, board: &LocalLeaderboard) -> Result<(), Self::Error>;
}

/// Trait for the best-effort remote score service.
/// Platform-specific implementations should provide this.
pub trait ScoreService {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Submit a record, returning the server-assigned rank when available.
    ///
    /// # Errors
    ///
    /// Returns an error when the service is unreachable.
    fn submit(&self, record: &ScoreRecord) -> Result<Option<usize>, Self::Error>;

    /// Fetch the remote top-N list.
    ///
    /// # Errors
    ///
    /// Returns an error when the service is unreachable.
    fn top(&self, n: usize) -> Result<Vec<ScoreRecord>, Self::Error>;
}

/// Result of recording a finished session's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// 1-based rank, remote when available, local otherwise.
    pub rank: Option<usize>,
    /// Whether the remote service accepted the submission.
    pub remote: bool,
    /// Whether the local board was persisted successfully.
    pub saved_locally: bool,
}

/// Record a score with graceful degradation: try the remote service, always
/// fold the record into the local board, and report persistence as a flag
/// rather than an error. Nothing here can fail the caller.
pub fn record_score<St, Sv>(store: &St, service: &Sv, record: ScoreRecord) -> SubmitOutcome
where
    St: LeaderboardStore,
    Sv: ScoreService,
{
    let remote_rank = service.submit(&record).ok().flatten();

    let mut board = store.load().ok().flatten().unwrap_or_default();
    let local_rank = board.insert(record);
    let saved_locally = store.save(&board).is_ok();

    SubmitOutcome {
        rank: remote_rank.or(local_rank),
        remote: remote_rank.is_some(),
        saved_locally,
    }
}

/// Read the top-N list, falling back to the local board when the remote
/// service is unavailable.
pub fn fetch_top<St, Sv>(store: &St, service: &Sv, n: usize) -> Vec<ScoreRecord>
where
    St: LeaderboardStore,
    Sv: ScoreService,
{
    if let Ok(records) = service.top(n) {
        return records;
    }
    store
        .load()
        .ok()
        .flatten()
        .map(|board| board.top(n).to_vec())
        .unwrap_or_default()
}

/// In-memory store, primarily for tests and headless harnesses.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    board: std::cell::RefCell<Option<LocalLeaderboard>>,
}

impl LeaderboardStore for MemoryStore {
    type Error = std::convert::Infallible;

    fn load(&self) -> Result<Option<LocalLeaderboard>, Self::Error> {
        Ok(self.board.borrow().clone())
    }

    fn save(&self, board: &LocalLeaderboard) -> Result<(), Self::Error> {
        *self.board.borrow_mut() = Some(board.clone());
        Ok(())
    }
}

/// Service stub that always reports the backend as unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineService;

impl ScoreService for OfflineService {
    type Error = LeaderboardError;

    fn submit(&self, _record: &ScoreRecord) -> Result<Option<usize>, Self::Error> {
        Err(LeaderboardError::Unavailable)
    }

    fn top(&self, _n: usize) -> Result<Vec<ScoreRecord>, Self::Error> {
        Err(LeaderboardError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, score: i64) -> ScoreRecord {
        ScoreRecord {
            name: name.to_string(),
            score,
            civilization: score / 2,
            ecosystem: 50,
            population: 100,
            tech_level: 40,
            resources: 30,
            biome: BiomeId::Temperate,
            playstyle: String::from("Balanced"),
            timestamp: 0,
        }
    }

    #[test]
    fn insert_keeps_descending_order_and_cap() {
        let mut board = LocalLeaderboard::new();
        for i in 0..120 {
            board.insert(record("p", i));
        }
        assert_eq!(board.len(), MAX_SCORES);
        assert_eq!(board.top(1)[0].score, 119);
        let scores: Vec<i64> = board.top(MAX_SCORES).iter().map(|s| s.score).collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(scores, sorted);
    }

    #[test]
    fn rank_counts_strictly_better_scores() {
        let board = LocalLeaderboard::from_records(vec![
            record("a", 900),
            record("b", 500),
            record("c", 100),
        ]);
        assert_eq!(board.rank(1_000), 1);
        assert_eq!(board.rank(500), 2);
        assert_eq!(board.rank(50), 4);
    }

    #[test]
    fn record_score_degrades_to_local_without_error() {
        let store = MemoryStore::default();
        let outcome = record_score(&store, &OfflineService, record("solo", 4_200));
        assert!(!outcome.remote);
        assert!(outcome.saved_locally);
        assert_eq!(outcome.rank, Some(1));

        let reloaded = store.load().expect("infallible").expect("board saved");
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.top(1)[0].name, "solo");
    }

    #[test]
    fn fetch_top_falls_back_to_local() {
        let store = MemoryStore::default();
        let mut board = LocalLeaderboard::new();
        board.insert(record("kept", 10));
        store.save(&board).expect("infallible");

        let records = fetch_top(&store, &OfflineService, 5);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "kept");
    }

    #[test]
    fn board_roundtrips_through_json() {
        let board = LocalLeaderboard::from_records(vec![record("a", 3), record("b", 7)]);
        let json = board.to_json().expect("serialize");
        let restored = LocalLeaderboard::from_json(&json).expect("deserialize");
        assert_eq!(restored, board);
        assert_eq!(restored.top(1)[0].score, 7);
    }

    #[test]
    fn stats_summarize_the_board() {
        let mut tropical = record("t", 100);
        tropical.biome = BiomeId::Tropical;
        let board =
            LocalLeaderboard::from_records(vec![record("a", 200), record("b", 400), tropical]);
        let stats = board.stats();
        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.highest_score, 400);
        assert_eq!(stats.average_score, 233);
        assert_eq!(stats.most_popular_biome, Some(BiomeId::Temperate));
        assert_eq!(stats.most_common_playstyle.as_deref(), Some("Balanced"));
    }
}
