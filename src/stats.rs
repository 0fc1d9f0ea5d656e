//! Per-word exposure and error counts backing the weak-word mode

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::QuizResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordStat {
    pub times_shown: u32,
    pub times_wrong: u32,
}

impl WordStat {
    /// Wrong answers per exposure; `None` for a word never shown
    pub fn error_rate(&self) -> Option<f64> {
        if self.times_shown == 0 {
            None
        } else {
            Some(self.times_wrong as f64 / self.times_shown as f64)
        }
    }
}

/// On-disk row of the statistics CSV
#[derive(Debug, Serialize, Deserialize)]
struct StatRow {
    word: String,
    times_shown: u32,
    times_wrong: u32,
}

#[derive(Debug, Clone)]
pub struct WordStats {
    path: PathBuf,
    stats: HashMap<String, WordStat>,
}

impl WordStats {
    /// Empty statistics for every catalog word, persisted at `path`
    pub fn fresh<P: Into<PathBuf>>(path: P, catalog: &Catalog) -> Self {
        let stats = catalog
            .words()
            .map(|w| (w.to_string(), WordStat::default()))
            .collect();
        Self {
            path: path.into(),
            stats,
        }
    }

    /// Load persisted statistics. A missing or unreadable file resets every word to zero
    /// instead of failing; catalog words absent from the file start at zero.
    pub fn load<P: Into<PathBuf>>(path: P, catalog: &Catalog) -> Self {
        let mut store = Self::fresh(path, catalog);
        if !store.path.exists() {
            return store;
        }

        match read_rows(&store.path) {
            Ok(rows) => {
                for row in rows {
                    let stat = WordStat {
                        times_shown: row.times_shown,
                        times_wrong: row.times_wrong.min(row.times_shown),
                    };
                    store.stats.insert(row.word, stat);
                }
                tracing::info!(path = %store.path.display(), words = store.stats.len(), "word statistics loaded");
            }
            Err(e) => {
                tracing::warn!(path = %store.path.display(), error = %e, "word statistics unreadable, starting fresh");
            }
        }
        store
    }

    /// Record one exposure of `word`; creates its entry on first sight
    pub fn update(&mut self, word: &str, correct: bool) {
        let stat = self.stats.entry(word.to_string()).or_default();
        // Counts come from a hand-editable file; saturate instead of wrapping
        stat.times_shown = stat.times_shown.saturating_add(1);
        if !correct {
            stat.times_wrong = stat.times_wrong.saturating_add(1);
        }
    }

    pub fn get(&self, word: &str) -> Option<&WordStat> {
        self.stats.get(word)
    }

    pub fn error_rate(&self, word: &str) -> Option<f64> {
        self.stats.get(word).and_then(WordStat::error_rate)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WordStat)> {
        self.stats.iter().map(|(w, s)| (w.as_str(), s))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the whole statistics file, rows sorted by word
    pub fn save(&self) -> QuizResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut words: Vec<&String> = self.stats.keys().collect();
        words.sort();

        let mut writer = csv::Writer::from_path(&self.path)?;
        for word in words {
            let stat = self.stats[word];
            writer.serialize(StatRow {
                word: word.clone(),
                times_shown: stat.times_shown,
                times_wrong: stat.times_wrong,
            })?;
        }
        writer.flush()?;
        tracing::debug!(path = %self.path.display(), "word statistics saved");
        Ok(())
    }
}

fn read_rows(path: &Path) -> QuizResult<Vec<StatRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}
