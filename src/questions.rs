//! Question selection and multiple-choice generation

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, WordEntry};
use crate::error::QuizError;
use crate::stats::WordStats;

/// Questions per quiz
pub const QUIZ_LENGTH: usize = 10;
/// The first questions ask for the meaning, the rest for the word
pub const MEANING_QUESTIONS: usize = 5;
/// Options shown per question, including the correct one
pub const CHOICE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    /// Uniform random sample of the catalog
    Normal,
    /// Words with the highest historical error rate first
    Weak,
}

impl QuizMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::Normal => "normal",
            QuizMode::Weak => "weak",
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizMode {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(QuizMode::Normal),
            "weak" | "weak-word" | "weak_word" => Ok(QuizMode::Weak),
            other => Err(QuizError::UnknownMode(other.to_string())),
        }
    }
}

/// Which side of the entry is shown and which is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Show the word, choose the meaning
    WordToMeaning,
    /// Show the meaning, choose the word
    MeaningToWord,
}

impl Direction {
    pub fn for_index(index: usize) -> Self {
        if index < MEANING_QUESTIONS {
            Direction::WordToMeaning
        } else {
            Direction::MeaningToWord
        }
    }

    pub fn prompt<'a>(&self, entry: &'a WordEntry) -> &'a str {
        match self {
            Direction::WordToMeaning => &entry.word,
            Direction::MeaningToWord => &entry.meaning,
        }
    }

    pub fn answer<'a>(&self, entry: &'a WordEntry) -> &'a str {
        match self {
            Direction::WordToMeaning => &entry.meaning,
            Direction::MeaningToWord => &entry.word,
        }
    }
}

/// Pick the ordered question list for a new quiz
pub fn choose_questions<R: Rng + ?Sized>(
    mode: QuizMode,
    catalog: &Catalog,
    stats: &WordStats,
    rng: &mut R,
) -> Vec<WordEntry> {
    match mode {
        QuizMode::Normal => catalog
            .entries()
            .choose_multiple(rng, QUIZ_LENGTH)
            .cloned()
            .collect(),
        QuizMode::Weak => choose_weak(catalog, stats, rng),
    }
}

/// Highest error rate first among words already shown; ties keep catalog order.
/// Short lists are padded with random catalog entries not yet selected.
fn choose_weak<R: Rng + ?Sized>(catalog: &Catalog, stats: &WordStats, rng: &mut R) -> Vec<WordEntry> {
    let mut rated: Vec<(usize, f64)> = catalog
        .entries()
        .iter()
        .enumerate()
        .filter_map(|(i, e)| stats.error_rate(&e.word).map(|rate| (i, rate)))
        .collect();
    rated.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut picked: Vec<usize> = rated.into_iter().take(QUIZ_LENGTH).map(|(i, _)| i).collect();

    if picked.len() < QUIZ_LENGTH {
        let taken: HashSet<usize> = picked.iter().copied().collect();
        let remaining: Vec<usize> = (0..catalog.len()).filter(|i| !taken.contains(i)).collect();
        let needed = QUIZ_LENGTH - picked.len();
        tracing::debug!(rated = picked.len(), padding = needed, "padding weak-word quiz");
        picked.extend(remaining.choose_multiple(rng, needed).copied());
    }

    picked.into_iter().map(|i| catalog.entries()[i].clone()).collect()
}

/// Options for one question, already shuffled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSet {
    pub correct_answer: String,
    pub options: Vec<String>,
}

impl ChoiceSet {
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_answer)
    }
}

/// Build a fresh multiple-choice set: up to three distinct distractors drawn from the
/// catalog's answers in this direction, plus the correct answer, in random order.
pub fn generate_choices<R: Rng + ?Sized>(
    entry: &WordEntry,
    direction: Direction,
    catalog: &Catalog,
    rng: &mut R,
) -> ChoiceSet {
    let correct = direction.answer(entry);

    let mut seen = HashSet::new();
    let pool: Vec<&str> = catalog
        .entries()
        .iter()
        .map(|e| direction.answer(e))
        .filter(|a| *a != correct && seen.insert(*a))
        .collect();

    let mut options: Vec<String> = pool
        .choose_multiple(rng, CHOICE_COUNT - 1)
        .map(|s| s.to_string())
        .collect();
    options.push(correct.to_string());
    options.shuffle(rng);

    ChoiceSet {
        correct_answer: correct.to_string(),
        options,
    }
}
