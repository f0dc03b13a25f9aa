use std::collections::HashMap;

use serde::Serialize;

use super::types::{
    FolderId,
    StudyLogEntry,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstAttempt {
    pub word: String,
    pub is_correct: bool,
    pub folder_id: Option<FolderId>,
    pub time: Option<String>,
}

/// First attempt per word, in the order the words first appeared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirstAttempts {
    attempts: Vec<FirstAttempt>,
    index: HashMap<String, usize>,
}

impl FirstAttempts {
    pub fn get(&self, word: &str) -> Option<&FirstAttempt> {
        self.index.get(word).and_then(|&i| self.attempts.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FirstAttempt> {
        self.attempts.iter()
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn correct(&self) -> usize {
        self.attempts.iter().filter(|a| a.is_correct).count()
    }

    pub fn incorrect(&self) -> usize {
        self.attempts.iter().filter(|a| !a.is_correct).count()
    }

    pub fn into_vec(self) -> Vec<FirstAttempt> {
        self.attempts
    }
}

/// Keeps the first chronological attempt per word; retries later the same day
/// are ignored. Entries with no resolvable word are skipped.
pub fn reduce_first_attempts(entries: &[StudyLogEntry]) -> FirstAttempts {
    let mut reduced = FirstAttempts::default();

    for entry in entries {
        let Some(word) = entry.word() else {
            continue;
        };
        if reduced.index.contains_key(word) {
            continue;
        }

        reduced.index.insert(word.to_string(), reduced.attempts.len());
        reduced.attempts.push(FirstAttempt {
            word: word.to_string(),
            is_correct: entry.is_correct(),
            folder_id: entry.folder_id,
            time: entry.last_reviewed_at.clone(),
        });
    }

    reduced
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudySummary {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    /// Set when only an attempt count was available, with no per-word breakdown.
    pub is_estimated: bool,
    pub attempts: Vec<FirstAttempt>,
}

impl StudySummary {
    pub fn from_attempts(attempts: FirstAttempts) -> Self {
        Self {
            total: attempts.len(),
            correct: attempts.correct(),
            incorrect: attempts.incorrect(),
            is_estimated: false,
            attempts: attempts.into_vec(),
        }
    }

    /// Used when the study log itself could not be fetched.
    pub fn estimated(attempt_count: u32) -> Self {
        Self {
            total: attempt_count as usize,
            correct: 0,
            incorrect: 0,
            is_estimated: true,
            attempts: Vec::new(),
        }
    }

    /// Percentage of distinct words missed on first attempt, 0 when empty or estimated.
    pub fn error_rate(&self) -> f64 {
        if self.is_estimated || self.total == 0 {
            return 0.0;
        }
        self.incorrect as f64 * 100.0 / self.total as f64
    }
}

pub fn summarize(entries: &[StudyLogEntry]) -> StudySummary {
    StudySummary::from_attempts(reduce_first_attempts(entries))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entries(value: serde_json::Value) -> Vec<StudyLogEntry> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn keeps_first_attempt_and_falls_back_to_stage() {
        let log = entries(json!([
            { "lemma": "run", "todayFirstResult": true },
            { "lemma": "run", "todayFirstResult": false },
            { "lemma": "jump", "todayFirstResult": null, "isTodayStudy": true, "stage": 2 }
        ]));

        let reduced = reduce_first_attempts(&log);
        assert_eq!(reduced.len(), 2);
        assert!(reduced.get("run").unwrap().is_correct);
        assert!(reduced.get("jump").unwrap().is_correct);

        let summary = summarize(&log);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.incorrect, 0);
        assert!(!summary.is_estimated);
    }

    #[test]
    fn reordering_later_duplicates_changes_nothing() {
        let a = entries(json!([
            { "lemma": "walk", "todayFirstResult": false, "folderId": 1 },
            { "lemma": "swim", "todayFirstResult": true },
            { "lemma": "walk", "todayFirstResult": true, "folderId": 2 },
            { "lemma": "walk", "todayFirstResult": true, "folderId": 3 }
        ]));
        let b = entries(json!([
            { "lemma": "walk", "todayFirstResult": false, "folderId": 1 },
            { "lemma": "walk", "todayFirstResult": true, "folderId": 3 },
            { "lemma": "swim", "todayFirstResult": true },
            { "lemma": "walk", "todayFirstResult": true, "folderId": 2 }
        ]));

        let ra = reduce_first_attempts(&a);
        let rb = reduce_first_attempts(&b);
        assert_eq!(ra.get("walk"), rb.get("walk"));
        assert_eq!(ra.get("walk").unwrap().folder_id, Some(1));
        assert_eq!(ra.get("swim"), rb.get("swim"));
        assert_eq!(ra.len(), rb.len());
    }

    #[test]
    fn rerunning_is_idempotent() {
        let log = entries(json!([
            { "vocab": { "id": 9, "lemma": "eat" }, "todayFirstResult": false },
            { "lemma": "eat", "todayFirstResult": true }
        ]));
        let first = reduce_first_attempts(&log);
        let second = reduce_first_attempts(&log);
        assert_eq!(first, second);
        assert!(!first.get("eat").unwrap().is_correct);
    }

    #[test]
    fn entries_without_a_word_are_skipped() {
        let log = entries(json!([{ "todayFirstResult": true }, { "lemma": "" }]));
        assert!(reduce_first_attempts(&log).is_empty());
        assert_eq!(summarize(&log), StudySummary::default());
    }

    #[test]
    fn estimated_summary_has_no_breakdown() {
        let summary = StudySummary::estimated(12);
        assert_eq!(summary.total, 12);
        assert_eq!(summary.correct + summary.incorrect, 0);
        assert!(summary.is_estimated);
        assert_eq!(summary.error_rate(), 0.0);
    }

    #[test]
    fn error_rate_is_a_percentage() {
        let log = entries(json!([
            { "lemma": "a", "todayFirstResult": true },
            { "lemma": "b", "todayFirstResult": false },
            { "lemma": "c", "todayFirstResult": false },
            { "lemma": "d", "todayFirstResult": true }
        ]));
        assert_eq!(summarize(&log).error_rate(), 50.0);
    }
}
