//! High score leaderboard system
//!
//! Top 5 scores, persisted as a JSON array of `{name, score}`. Loading is
//! forgiving: a corrupt blob gives an empty board and bad entries are skipped
//! one at a time, so a broken save can never stop the game.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::{DEFAULT_PLAYER_NAME, MAX_HIGH_SCORES};
use crate::persistence::KeyValueStore;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Display name
    pub name: String,
    /// Pipes cleared
    pub score: u64,
}

impl HighScoreEntry {
    pub fn new(name: impl Into<String>, score: u64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct HighScores {
    entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Storage key, shared with boards saved by earlier releases
    pub const STORAGE_KEY: &'static str = "flappyDronehighScores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a score qualifies for the leaderboard: there's a free slot,
    /// or it strictly beats the lowest entry
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, name: impl Into<String>, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry::new(name, score);

        // Find insertion point (sorted descending by score, ties keep seniority)
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

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Record a finished run. `ask_name` is only called when the score
    /// qualifies; `None` or a blank answer falls back to the default name.
    pub fn record_if_qualifies<F>(&mut self, score: u64, ask_name: F) -> Option<usize>
    where
        F: FnOnce() -> Option<String>,
    {
        if !self.qualifies(score) {
            return None;
        }
        let name = normalize_name(ask_name());
        self.add_score(name, score)
    }

    /// Parse stored data. Never fails: anything unusable is dropped.
    pub fn from_json(json: &str) -> Self {
        let Ok(Value::Array(items)) = serde_json::from_str::<Value>(json) else {
            return Self::new();
        };

        let mut entries: Vec<HighScoreEntry> = items.iter().filter_map(parse_entry).collect();
        // Stable, so equal scores keep their stored order
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }

    /// Load from storage; missing, unreadable or corrupt data gives an empty board
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => {
                let scores = Self::from_json(&json);
                log::info!("Loaded {} high scores", scores.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("High scores unavailable: {}", e);
                Self::new()
            }
        }
    }

    /// Save to storage; failures are logged and otherwise ignored
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) {
        match store.set(Self::STORAGE_KEY, &self.to_json()) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Failed to save high scores: {}", e),
        }
    }
}

/// Trimmed name, or the default for a missing/blank one
pub fn normalize_name(input: Option<String>) -> String {
    input
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string())
}

/// Clamp a raw numeric score to a valid one (non-finite and negative -> 0)
pub fn coerce_score(raw: f64) -> u64 {
    if raw.is_finite() && raw > 0.0 {
        raw.floor() as u64
    } else {
        0
    }
}

/// Accepts `{name, score}` objects and bare scalars. Scores are read
/// loosely (see `loose_number`); a missing or non-numeric score drops the entry.
fn parse_entry(item: &Value) -> Option<HighScoreEntry> {
    match item {
        Value::Object(map) => {
            let raw = loose_number(map.get("score")?)?;
            let name = match map.get("name") {
                Some(v) if is_truthy(v) => loose_string(v),
                _ => DEFAULT_PLAYER_NAME.to_string(),
            };
            Some(HighScoreEntry::new(name, coerce_score(raw)))
        }
        Value::Array(_) => None,
        scalar => Some(HighScoreEntry::new(
            DEFAULT_PLAYER_NAME,
            coerce_score(loose_number(scalar)?),
        )),
    }
}

/// Numeric reading of a stored value. `null`, `false` and blank strings
/// read as 0, `true` as 1. Containers and unparsable strings give `None`.
fn loose_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                let n = s.parse::<f64>().ok()?;
                // Rust also accepts "inf"/"nan" spellings
                if n.is_infinite() && !s.ends_with("Infinity") {
                    return None;
                }
                n
            }
        }
        Value::Array(_) | Value::Object(_) => return None,
    };
    (!n.is_nan()).then_some(n)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Display form of a stored name that isn't a plain string
fn loose_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(loose_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
