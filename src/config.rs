//! Runtime configuration: file locations, catalog column names and logging

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, QuizResult};

/// Header names the vocabulary sheet must carry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    #[serde(default = "default_number_column")]
    pub number: String,
    #[serde(default = "default_word_column")]
    pub word: String,
    #[serde(default = "default_meaning_column")]
    pub meaning: String,
}

fn default_number_column() -> String {
    "番号".to_string()
}
fn default_word_column() -> String {
    "英単語".to_string()
}
fn default_meaning_column() -> String {
    "意味".to_string()
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            number: default_number_column(),
            word: default_word_column(),
            meaning: default_meaning_column(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default = "default_words_path")]
    pub words_path: String,
    #[serde(default = "default_stats_path")]
    pub stats_path: String,
    #[serde(default = "default_score_path")]
    pub score_path: String,
    #[serde(default = "default_achievements_path")]
    pub achievements_path: String,
    #[serde(default = "default_chart_path")]
    pub chart_path: String,
    /// SQLite file for quiz sessions; sessions stay in memory when unset
    #[serde(default)]
    pub session_db_path: Option<String>,
    #[serde(default)]
    pub columns: ColumnNames,
    #[serde(default = "default_serial_min")]
    pub serial_min: i64,
    #[serde(default = "default_serial_max")]
    pub serial_max: i64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_words_path() -> String {
    "words.xlsx".to_string()
}
fn default_stats_path() -> String {
    "word_stats.csv".to_string()
}
fn default_score_path() -> String {
    "score_history.csv".to_string()
}
fn default_achievements_path() -> String {
    "achievements.csv".to_string()
}
fn default_chart_path() -> String {
    "static/score_history.svg".to_string()
}
fn default_serial_min() -> i64 {
    1
}
fn default_serial_max() -> i64 {
    500
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            words_path: default_words_path(),
            stats_path: default_stats_path(),
            score_path: default_score_path(),
            achievements_path: default_achievements_path(),
            chart_path: default_chart_path(),
            session_db_path: None,
            columns: ColumnNames::default(),
            serial_min: default_serial_min(),
            serial_max: default_serial_max(),
            log_level: default_log_level(),
        }
    }
}

/// Config file read when none is named explicitly
pub const DEFAULT_CONFIG_PATH: &str = "wordquiz.toml";

impl QuizConfig {
    /// Load configuration from a TOML file. A missing file yields the defaults.
    /// `RUST_LOG` takes precedence over the configured log level.
    pub fn load<P: AsRef<Path>>(path: P) -> QuizResult<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        config.override_log_level(std::env::var("RUST_LOG").ok());
        Ok(config)
    }

    fn override_log_level(&mut self, level: Option<String>) {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            self.log_level = level;
        }
    }

    pub fn from_toml(content: &str) -> QuizResult<Self> {
        let config: QuizConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Point every data file at `dir`, keeping the default file names.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let at = |name: &str| dir.join(name).to_string_lossy().to_string();
        Self {
            words_path: at("words.xlsx"),
            stats_path: at("word_stats.csv"),
            score_path: at("score_history.csv"),
            achievements_path: at("achievements.csv"),
            chart_path: at("score_history.svg"),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> QuizResult<()> {
        if self.serial_min > self.serial_max {
            return Err(QuizError::Config(format!(
                "serial_min ({}) must not exceed serial_max ({})",
                self.serial_min, self.serial_max
            )));
        }
        Ok(())
    }

    pub fn serial_in_range(&self, serial: f64) -> bool {
        serial >= self.serial_min as f64 && serial <= self.serial_max as f64
    }
}
