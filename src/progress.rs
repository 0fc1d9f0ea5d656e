//! Score history - one record per completed quiz, append-only

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::QuizResult;
use crate::questions::{QuizMode, QUIZ_LENGTH};

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

mod date_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(s.trim(), DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(with = "date_format")]
    pub date: NaiveDateTime,
    pub mode: QuizMode,
    pub score: u8,
}

/// Aggregate view over the whole history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub total_sessions: usize,
    pub average_score: f64,
    pub best_score: u8,
    pub perfect_count: usize,
    pub accuracy_percent: f64,
}

impl ScoreSummary {
    pub fn from_records(records: &[ScoreRecord]) -> Self {
        let total = records.len();
        let points: usize = records.iter().map(|r| r.score as usize).sum();
        let average = if total > 0 { points as f64 / total as f64 } else { 0.0 };
        let accuracy = if total > 0 {
            points as f64 / (total * QUIZ_LENGTH) as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_sessions: total,
            average_score: average,
            best_score: records.iter().map(|r| r.score).max().unwrap_or(0),
            perfect_count: records.iter().filter(|r| r.score as usize == QUIZ_LENGTH).count(),
            accuracy_percent: accuracy,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoreHistory {
    path: PathBuf,
}

impl ScoreHistory {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record; the header is written only when the file is new or empty
    pub fn append(&self, record: &ScoreRecord) -> QuizResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        tracing::info!(mode = %record.mode, score = record.score, "score recorded");
        Ok(())
    }

    /// All records in file order. Missing file or unexpected header reads as an empty
    /// history; malformed rows are skipped.
    pub fn load(&self) -> Vec<ScoreRecord> {
        if !self.path.exists() {
            return Vec::new();
        }

        let mut reader = match csv::Reader::from_path(&self.path) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "score history unreadable");
                return Vec::new();
            }
        };

        let has_columns = reader
            .headers()
            .map(|h| ["date", "mode", "score"].iter().all(|c| h.iter().any(|x| x == *c)))
            .unwrap_or(false);
        if !has_columns {
            tracing::warn!(path = %self.path.display(), "score history has unexpected columns, ignoring it");
            return Vec::new();
        }

        let mut records = Vec::new();
        for (line, row) in reader.deserialize::<ScoreRecord>().enumerate() {
            match row {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(line = line + 2, error = %e, "skipping malformed score row"),
            }
        }
        records
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary::from_records(&self.load())
    }
}
