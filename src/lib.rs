//! Vocabulary quiz core
//!
//! Loads the word catalog, picks questions (random or weak-word), runs ten-question
//! quiz sessions, and keeps score history, per-word statistics and badges.
//! With the `python` feature the crate also builds the extension module used by the web front end.

mod achievements;
mod app;
mod catalog;
mod chart;
mod clock;
mod config;
mod db;
mod error;
mod excel;
mod fuzzy;
pub mod logging;
mod progress;
mod questions;
mod session;
mod stats;

#[cfg(feature = "python")]
mod python;

pub use achievements::{qualifying_badges, AchievementBook, AwardedBadge, Badge, Rank, LUCKY_CHANCE};
pub use app::{QuizApp, QuizReport};
pub use catalog::{Catalog, WordEntry};
pub use chart::{render_svg, SvgTrendRenderer, TrendRenderer};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ColumnNames, QuizConfig, DEFAULT_CONFIG_PATH};
pub use db::{MemorySessionStore, SessionStore, SqliteSessionStore};
pub use error::{QuizError, QuizResult, SessionError};
pub use excel::{detect_columns, load_catalog, parse_csv, parse_workbook, ColumnMapping};
pub use fuzzy::{closest_header, header_similarity};
pub use progress::{ScoreHistory, ScoreRecord, ScoreSummary, DATE_FORMAT};
pub use questions::{
    choose_questions, generate_choices, ChoiceSet, Direction, QuizMode, CHOICE_COUNT, MEANING_QUESTIONS,
    QUIZ_LENGTH,
};
pub use session::{AnswerOutcome, PresentedQuestion, QuizPhase, QuizSession, WrongAnswer};
pub use stats::{WordStat, WordStats};
