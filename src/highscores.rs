//! High score boards
//!
//! One top-10 board per ruleset, since classic and corrected runs are not
//! comparable. Persisted as a single JSON file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::persistence;
use crate::settings::Ruleset;

/// Runs kept on each board
pub const MAX_HIGH_SCORES: usize = 10;

/// One finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// World ticks the craft lasted
    pub ticks: u64,
    /// World seed, so the run can be replayed
    pub seed: u64,
    /// Unix timestamp (ms) when recorded
    pub timestamp_ms: u64,
}

impl HighScoreEntry {
    /// Higher score first; equal scores go to the run that survived longer
    fn beats(&self, other: &HighScoreEntry) -> bool {
        (self.score, self.ticks) > (other.score, other.ticks)
    }
}

/// Leaderboards keyed by ruleset, each sorted best first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    #[serde(default)]
    boards: BTreeMap<Ruleset, Vec<HighScoreEntry>>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for `ruleset`, best first
    pub fn board(&self, ruleset: Ruleset) -> &[HighScoreEntry] {
        self.boards
            .get(&ruleset)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Rulesets that have at least one entry
    pub fn rulesets(&self) -> impl Iterator<Item = Ruleset> + '_ {
        self.boards
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(ruleset, _)| *ruleset)
    }

    /// Whether `entry` would make the `ruleset` board. Pointless runs never do.
    pub fn qualifies(&self, ruleset: Ruleset, entry: &HighScoreEntry) -> bool {
        if entry.score == 0 {
            return false;
        }
        let board = self.board(ruleset);
        board.len() < MAX_HIGH_SCORES || board.last().is_none_or(|last| entry.beats(last))
    }

    /// Record a run. Returns the rank achieved (1-indexed) if it qualified.
    pub fn add_score(&mut self, ruleset: Ruleset, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(ruleset, &entry) {
            return None;
        }

        let board = self.boards.entry(ruleset).or_default();
        // Full ties keep the older run ahead
        let index = board
            .iter()
            .position(|e| entry.beats(e))
            .unwrap_or(board.len());
        board.insert(index, entry);
        board.truncate(MAX_HIGH_SCORES);
        Some(index + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.boards.values().all(Vec::is_empty)
    }

    pub fn top_score(&self, ruleset: Ruleset) -> Option<u64> {
        self.board(ruleset).first().map(|e| e.score)
    }

    /// Load the boards, starting fresh when the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        let scores: Self = persistence::load_json_or_default(path)?;
        log::info!(
            "Loaded high scores for {} ruleset(s) from {}",
            scores.rulesets().count(),
            path.display()
        );
        Ok(scores)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        persistence::save_json(path, self)?;
        log::info!("High scores saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(score: u64, ticks: u64) -> HighScoreEntry {
        HighScoreEntry {
            score,
            ticks,
            seed: 1,
            timestamp_ms: ticks,
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(Ruleset::Corrected, &run(0, 5000)));
    }

    #[test]
    fn test_sorted_insert() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(Ruleset::Corrected, run(40, 100)), Some(1));
        assert_eq!(scores.add_score(Ruleset::Corrected, run(100, 200)), Some(1));
        assert_eq!(scores.add_score(Ruleset::Corrected, run(60, 150)), Some(2));

        let order: Vec<u64> = scores
            .board(Ruleset::Corrected)
            .iter()
            .map(|e| e.score)
            .collect();
        assert_eq!(order, vec![100, 60, 40]);
        assert_eq!(scores.top_score(Ruleset::Corrected), Some(100));
    }

    #[test]
    fn test_longer_survival_breaks_ties() {
        let mut scores = HighScores::new();
        scores.add_score(Ruleset::Corrected, run(60, 150));
        assert_eq!(scores.add_score(Ruleset::Corrected, run(60, 900)), Some(1));
        assert_eq!(scores.add_score(Ruleset::Corrected, run(60, 150)), Some(3));

        let ticks: Vec<u64> = scores
            .board(Ruleset::Corrected)
            .iter()
            .map(|e| e.ticks)
            .collect();
        assert_eq!(ticks, vec![900, 150, 150]);
    }

    #[test]
    fn test_boards_are_per_ruleset() {
        let mut scores = HighScores::new();
        scores.add_score(Ruleset::Classic, run(500, 10));
        assert_eq!(scores.add_score(Ruleset::Corrected, run(20, 10)), Some(1));

        assert_eq!(scores.top_score(Ruleset::Classic), Some(500));
        assert_eq!(scores.top_score(Ruleset::Corrected), Some(20));
        assert_eq!(
            scores.rulesets().collect::<Vec<_>>(),
            vec![Ruleset::Classic, Ruleset::Corrected]
        );
    }

    #[test]
    fn test_full_board() {
        let mut scores = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u64 {
            scores.add_score(Ruleset::Classic, run(i * 20, 100));
        }
        assert_eq!(scores.board(Ruleset::Classic).len(), MAX_HIGH_SCORES);
        // Same score as the last entry only gets in by lasting longer
        assert_eq!(scores.add_score(Ruleset::Classic, run(20, 100)), None);
        assert_eq!(
            scores.add_score(Ruleset::Classic, run(20, 101)),
            Some(MAX_HIGH_SCORES)
        );
        assert_eq!(scores.board(Ruleset::Classic).len(), MAX_HIGH_SCORES);
        assert_eq!(scores.board(Ruleset::Classic)[MAX_HIGH_SCORES - 1].ticks, 101);
    }

    #[test]
    fn test_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");

        let mut scores = HighScores::load(&path).unwrap();
        assert!(scores.is_empty());
        scores.add_score(Ruleset::Classic, run(80, 900));
        scores.save(&path).unwrap();

        let loaded = HighScores::load(&path).unwrap();
        assert_eq!(loaded, scores);
        assert_eq!(loaded.board(Ruleset::Classic)[0].ticks, 900);
    }
}
