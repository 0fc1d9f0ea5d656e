//! Error types shared by every quiz component

use thiserror::Error;

/// Misuse of a quiz session (answering without a quiz, answering a finished one, ...)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no active quiz for this session")]
    NoActiveSession,

    #[error("quiz has not been started")]
    NotStarted,

    #[error("quiz is already completed")]
    AlreadyCompleted,

    #[error("quiz is not completed yet ({answered} of {total} answered)")]
    NotCompleted { answered: usize, total: usize },

    #[error("quiz result was already recorded")]
    AlreadyRecorded,

    #[error("a quiz needs exactly {expected} questions, got {found}")]
    QuestionCount { found: usize, expected: usize },
}

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("missing required column '{column}' in file header{}", suggestion_hint(.suggestion))]
    MissingColumn {
        column: String,
        suggestion: Option<String>,
    },

    #[error("not enough words to build a quiz: found {found}, need at least {required}")]
    InsufficientWords { found: usize, required: usize },

    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("no sheets found in workbook")]
    EmptyWorkbook,

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("unknown quiz mode: {0}")]
    UnknownMode(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl QuizError {
    /// True for errors caused by the user's navigation rather than the system;
    /// the front end answers these by sending the user back to the start page.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, QuizError::Session(_) | QuizError::UnknownMode(_))
    }
}

impl From<toml::de::Error> for QuizError {
    fn from(e: toml::de::Error) -> Self {
        QuizError::Config(e.to_string())
    }
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (found '{}', did you mean it?)", s),
        None => String::new(),
    }
}

pub type QuizResult<T> = Result<T, QuizError>;
