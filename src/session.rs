//! Per-user quiz progress: one run of ten questions

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, WordEntry};
use crate::error::SessionError;
use crate::questions::{generate_choices, ChoiceSet, Direction, QuizMode, QUIZ_LENGTH};
use crate::stats::WordStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizPhase {
    NotStarted,
    InProgress,
    Completed,
}

/// A missed question, as shown to the user on the result page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrongAnswer {
    /// What was displayed as the question
    pub prompt: String,
    pub correct_answer: String,
    pub user_answer: String,
}

/// The current question together with a freshly shuffled set of options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentedQuestion {
    /// Zero-based position within the quiz
    pub index: usize,
    pub direction: Direction,
    pub prompt: String,
    pub choices: ChoiceSet,
}

impl PresentedQuestion {
    /// One-based number for display ("question 3 of 10")
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: String,
    /// True once the last question has been answered
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    mode: QuizMode,
    phase: QuizPhase,
    questions: Vec<WordEntry>,
    current_index: usize,
    score: usize,
    wrong_answers: Vec<WrongAnswer>,
    /// Set once the completed run has been written to the score history
    recorded: bool,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            mode: QuizMode::Normal,
            phase: QuizPhase::NotStarted,
            questions: Vec::new(),
            current_index: 0,
            score: 0,
            wrong_answers: Vec::new(),
            recorded: false,
        }
    }

    /// Begin a run over exactly `QUIZ_LENGTH` questions, discarding any previous progress.
    /// Any other count is rejected and leaves the session untouched.
    pub fn start(&mut self, mode: QuizMode, questions: Vec<WordEntry>) -> Result<(), SessionError> {
        if questions.len() != QUIZ_LENGTH {
            return Err(SessionError::QuestionCount {
                found: questions.len(),
                expected: QUIZ_LENGTH,
            });
        }
        *self = Self {
            mode,
            phase: QuizPhase::InProgress,
            questions,
            ..Self::new()
        };
        Ok(())
    }

    pub fn started(mode: QuizMode, questions: Vec<WordEntry>) -> Result<Self, SessionError> {
        let mut session = Self::new();
        session.start(mode, questions)?;
        Ok(session)
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn questions(&self) -> &[WordEntry] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn wrong_answers(&self) -> &[WrongAnswer] {
        &self.wrong_answers
    }

    pub fn is_recorded(&self) -> bool {
        self.recorded
    }

    fn current_entry(&self) -> Result<&WordEntry, SessionError> {
        match self.phase {
            QuizPhase::NotStarted => Err(SessionError::NotStarted),
            QuizPhase::Completed => Err(SessionError::AlreadyCompleted),
            QuizPhase::InProgress => self
                .questions
                .get(self.current_index)
                .ok_or(SessionError::AlreadyCompleted),
        }
    }

    /// Current question with a newly generated choice set. Does not advance the quiz;
    /// every call reshuffles and may pick different distractors.
    pub fn present<R: Rng + ?Sized>(
        &self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<PresentedQuestion, SessionError> {
        let entry = self.current_entry()?;
        let direction = Direction::for_index(self.current_index);
        Ok(PresentedQuestion {
            index: self.current_index,
            direction,
            prompt: direction.prompt(entry).to_string(),
            choices: generate_choices(entry, direction, catalog, rng),
        })
    }

    /// Grade `selected` against the current question and move on.
    /// Statistics are always keyed by the word, whichever side was asked.
    pub fn submit(&mut self, selected: &str, stats: &mut WordStats) -> Result<AnswerOutcome, SessionError> {
        let entry = self.current_entry()?;
        let direction = Direction::for_index(self.current_index);
        let word = entry.word.clone();
        let prompt = direction.prompt(entry).to_string();
        let correct_answer = direction.answer(entry).to_string();
        let correct = selected == correct_answer;

        if correct {
            self.score += 1;
        } else {
            self.wrong_answers.push(WrongAnswer {
                prompt,
                correct_answer: correct_answer.clone(),
                user_answer: selected.to_string(),
            });
        }
        stats.update(&word, correct);

        self.current_index += 1;
        if self.current_index >= self.questions.len() {
            self.phase = QuizPhase::Completed;
        }
        tracing::debug!(index = self.current_index, correct, score = self.score, "answer graded");

        Ok(AnswerOutcome {
            correct,
            correct_answer,
            finished: self.phase == QuizPhase::Completed,
        })
    }

    /// Mark the completed run as written to history; allowed exactly once
    pub fn mark_recorded(&mut self) -> Result<(), SessionError> {
        match self.phase {
            QuizPhase::NotStarted => Err(SessionError::NotStarted),
            QuizPhase::InProgress => Err(SessionError::NotCompleted {
                answered: self.current_index,
                total: self.questions.len(),
            }),
            QuizPhase::Completed if self.recorded => Err(SessionError::AlreadyRecorded),
            QuizPhase::Completed => {
                self.recorded = true;
                Ok(())
            }
        }
    }
}
