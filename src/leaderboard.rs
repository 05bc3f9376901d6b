//! Score reporting and the local leaderboard
//!
//! The remote leaderboard service is reached through [`ScoreReporter`] and
//! [`LeaderboardSource`]. `LocalLeaderboard` implements both in memory and
//! can be cached in the local key-value store.

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, StoreError};
use crate::persistence::{KeyValueStore, load_json, save_json};

/// Entries returned when the caller asks for `limit = 0`
pub const DEFAULT_LIMIT: usize = 10;

/// Entries kept by the local leaderboard
pub const MAX_LOCAL_ENTRIES: usize = 100;

/// Receives the final score of each completed session
pub trait ScoreReporter {
    fn submit_score(
        &mut self,
        identifier: &str,
        score: u64,
        display_name: &str,
    ) -> Result<(), ReportError>;
}

/// Ranked read access to submitted scores
pub trait LeaderboardSource {
    /// Best scores first, ties broken by earliest submission
    fn get_leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry>;
}

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Lower-cased player identifier
    pub identifier: String,
    pub score: u64,
    #[serde(default)]
    pub display_name: String,
    /// Submission order, earlier wins ties
    pub submitted: u64,
}

/// In-memory leaderboard, sorted descending by score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalLeaderboard {
    entries: Vec<LeaderboardEntry>,
    next_seq: u64,
}

impl LocalLeaderboard {
    /// Storage key for the cached board
    const STORAGE_KEY: &'static str = "moth_leaderboard";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Insert a validated entry, returning its rank (1-indexed)
    pub fn add_score(
        &mut self,
        identifier: &str,
        score: u64,
        display_name: &str,
    ) -> Result<usize, ReportError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ReportError::MissingIdentifier);
        }

        let entry = LeaderboardEntry {
            identifier: identifier.to_lowercase(),
            score,
            display_name: display_name.trim().to_string(),
            submitted: self.next_seq,
        };
        self.next_seq += 1;

        // Insert after every entry with an equal score so earlier submissions keep the lead
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_LOCAL_ENTRIES);

        Ok(rank)
    }

    /// Load the cached board; any missing or corrupt cache yields an empty board
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<Self>(store, Self::STORAGE_KEY) {
            Some(board) => {
                log::info!("Loaded {} leaderboard entries", board.entries.len());
                board
            }
            None => {
                log::info!("No cached leaderboard, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Leaderboard saved ({} entries)", self.entries.len());
        Ok(())
    }
}

impl ScoreReporter for LocalLeaderboard {
    fn submit_score(
        &mut self,
        identifier: &str,
        score: u64,
        display_name: &str,
    ) -> Result<(), ReportError> {
        let rank = self.add_score(identifier, score, display_name)?;
        log::info!("Score {} recorded at rank {}", score, rank);
        Ok(())
    }
}

impl LeaderboardSource for LocalLeaderboard {
    fn get_leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
        self.entries.iter().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_sorted_descending() {
        let mut board = LocalLeaderboard::new();
        board.submit_score("a", 100, "").unwrap();
        board.submit_score("b", 300, "").unwrap();
        board.submit_score("c", 200, "").unwrap();

        let scores: Vec<u64> = board.get_leaderboard(10).iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 100]);
        assert_eq!(board.top_score(), Some(300));
    }

    #[test]
    fn test_ties_keep_earliest_first() {
        let mut board = LocalLeaderboard::new();
        board.submit_score("first", 500, "").unwrap();
        board.submit_score("second", 500, "").unwrap();
        board.submit_score("third", 700, "").unwrap();

        let ids: Vec<String> = board
            .get_leaderboard(3)
            .into_iter()
            .map(|e| e.identifier)
            .collect();
        assert_eq!(ids, vec!["third", "first", "second"]);
    }

    #[test]
    fn test_identifier_required_and_normalized() {
        let mut board = LocalLeaderboard::new();
        assert_eq!(
            board.submit_score("   ", 10, "x"),
            Err(ReportError::MissingIdentifier)
        );
        board.submit_score(" 0xABcD ", 10, " Moth ").unwrap();
        let entry = &board.get_leaderboard(1)[0];
        assert_eq!(entry.identifier, "0xabcd");
        assert_eq!(entry.display_name, "Moth");
    }

    #[test]
    fn test_limit_zero_means_default() {
        let mut board = LocalLeaderboard::new();
        for i in 0..15 {
            board.submit_score("p", i, "").unwrap();
        }
        assert_eq!(board.get_leaderboard(0).len(), DEFAULT_LIMIT);
        assert_eq!(board.get_leaderboard(3).len(), 3);
        assert_eq!(board.get_leaderboard(50).len(), 15);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let mut board = LocalLeaderboard::new();
        for i in 0..(MAX_LOCAL_ENTRIES as u64 + 20) {
            board.add_score("p", i, "").unwrap();
        }
        assert_eq!(board.len(), MAX_LOCAL_ENTRIES);
        assert_eq!(board.top_score(), Some(MAX_LOCAL_ENTRIES as u64 + 19));
    }

    #[test]
    fn test_store_roundtrip() {
        let mut store = MemoryStore::default();
        assert!(LocalLeaderboard::load(&store).is_empty());

        let mut board = LocalLeaderboard::new();
        board.submit_score("a", 10, "A").unwrap();
        board.save(&mut store).unwrap();

        let mut loaded = LocalLeaderboard::load(&store);
        assert_eq!(loaded.get_leaderboard(1), board.get_leaderboard(1));
        // Sequence survives the cache so later ties still order correctly
        loaded.submit_score("b", 10, "").unwrap();
        assert_eq!(loaded.get_leaderboard(2)[1].identifier, "b");
    }
}
