//! Vocabulary catalog - the fixed word list every quiz draws from

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, QuizResult};
use crate::questions::QUIZ_LENGTH;

/// A word and its meaning, as read from the vocabulary sheet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub meaning: String,
}

impl WordEntry {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
        }
    }
}

/// Immutable, ordered word list. Always holds enough entries for one quiz.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<WordEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<WordEntry>) -> QuizResult<Self> {
        if entries.len() < QUIZ_LENGTH {
            return Err(QuizError::InsufficientWords {
                found: entries.len(),
                required: QUIZ_LENGTH,
            });
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.word.as_str()) {
                tracing::warn!(word = %entry.word, "duplicate word in catalog; statistics will be shared");
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.word.as_str())
    }

    pub fn meanings(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.meaning.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<WordEntry> {
        (0..n)
            .map(|i| WordEntry::new(format!("word{i}"), format!("meaning{i}")))
            .collect()
    }

    #[test]
    fn rejects_fewer_than_ten_words() {
        let err = Catalog::new(entries(9)).unwrap_err();
        assert!(matches!(
            err,
            QuizError::InsufficientWords { found: 9, required: 10 }
        ));
    }

    #[test]
    fn keeps_source_order() {
        let catalog = Catalog::new(entries(12)).unwrap();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.words().next(), Some("word0"));
        assert_eq!(catalog.meanings().last(), Some("meaning11"));
    }

    #[test]
    fn duplicates_are_tolerated() {
        let mut list = entries(10);
        list.push(WordEntry::new("word0", "again"));
        assert_eq!(Catalog::new(list).unwrap().len(), 11);
    }
}
