//! Python bindings for the web front end (enabled by the `python` feature)

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::achievements::AwardedBadge;
use crate::app::{QuizApp, QuizReport};
use crate::config::{QuizConfig, DEFAULT_CONFIG_PATH};
use crate::error::QuizError;
use crate::logging::init_tracing;
use crate::progress::ScoreSummary;
use crate::questions::{Direction, QuizMode};
use crate::session::{AnswerOutcome, PresentedQuestion};

/// Usage errors become ValueError so the web layer can redirect to the start page
fn to_py_err(e: QuizError) -> PyErr {
    if e.is_usage_error() {
        PyValueError::new_err(e.to_string())
    } else {
        PyRuntimeError::new_err(e.to_string())
    }
}

#[pyclass(name = "Question")]
#[derive(Debug, Clone)]
pub struct PyQuestion {
    #[pyo3(get)]
    pub number: usize,
    #[pyo3(get)]
    pub direction: String,
    #[pyo3(get)]
    pub prompt: String,
    #[pyo3(get)]
    pub choices: Vec<String>,
}

#[pymethods]
impl PyQuestion {
    fn __repr__(&self) -> String {
        format!("Question(number={}, prompt='{}')", self.number, self.prompt)
    }
}

impl From<PresentedQuestion> for PyQuestion {
    fn from(q: PresentedQuestion) -> Self {
        let direction = match q.direction {
            Direction::WordToMeaning => "word_to_meaning",
            Direction::MeaningToWord => "meaning_to_word",
        };
        Self {
            number: q.number(),
            direction: direction.to_string(),
            prompt: q.prompt,
            choices: q.choices.options,
        }
    }
}

#[pyclass(name = "AnswerResult")]
#[derive(Debug, Clone)]
pub struct PyAnswerResult {
    #[pyo3(get)]
    pub correct: bool,
    #[pyo3(get)]
    pub correct_answer: String,
    #[pyo3(get)]
    pub finished: bool,
}

impl From<AnswerOutcome> for PyAnswerResult {
    fn from(o: AnswerOutcome) -> Self {
        Self {
            correct: o.correct,
            correct_answer: o.correct_answer,
            finished: o.finished,
        }
    }
}

#[pyclass(name = "Badge")]
#[derive(Debug, Clone)]
pub struct PyBadge {
    #[pyo3(get)]
    pub code: String,
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub rank: String,
}

#[pymethods]
impl PyBadge {
    fn __repr__(&self) -> String {
        format!("Badge(code='{}', rank='{}')", self.code, self.rank)
    }
}

impl From<AwardedBadge> for PyBadge {
    fn from(b: AwardedBadge) -> Self {
        Self {
            code: b.code,
            name: b.name,
            rank: b.rank.as_str().to_string(),
        }
    }
}

#[pyclass(name = "QuizReport")]
#[derive(Debug, Clone)]
pub struct PyQuizReport {
    #[pyo3(get)]
    pub mode: String,
    #[pyo3(get)]
    pub score: usize,
    #[pyo3(get)]
    pub total: usize,
    /// (prompt, correct answer, user answer)
    #[pyo3(get)]
    pub wrong: Vec<(String, String, String)>,
    #[pyo3(get)]
    pub chart_path: Option<String>,
    #[pyo3(get)]
    pub new_badges: Vec<PyBadge>,
}

#[pymethods]
impl PyQuizReport {
    fn __repr__(&self) -> String {
        format!("QuizReport(score={}/{}, badges={})", self.score, self.total, self.new_badges.len())
    }
}

impl From<QuizReport> for PyQuizReport {
    fn from(r: QuizReport) -> Self {
        Self {
            mode: r.mode.to_string(),
            score: r.score,
            total: r.total,
            wrong: r
                .wrong_answers
                .into_iter()
                .map(|w| (w.prompt, w.correct_answer, w.user_answer))
                .collect(),
            chart_path: r.chart_path.map(|p| p.to_string_lossy().to_string()),
            new_badges: r.new_badges.into_iter().map(PyBadge::from).collect(),
        }
    }
}

#[pyclass(name = "ScoreSummary")]
#[derive(Debug, Clone)]
pub struct PyScoreSummary {
    #[pyo3(get)]
    pub total_sessions: usize,
    #[pyo3(get)]
    pub average_score: f64,
    #[pyo3(get)]
    pub best_score: u8,
    #[pyo3(get)]
    pub accuracy_percent: f64,
}

impl From<ScoreSummary> for PyScoreSummary {
    fn from(s: ScoreSummary) -> Self {
        Self {
            total_sessions: s.total_sessions,
            average_score: s.average_score,
            best_score: s.best_score,
            accuracy_percent: s.accuracy_percent,
        }
    }
}

/// The quiz application, one per web process
#[pyclass(name = "QuizApp", unsendable)]
pub struct PyQuizApp {
    inner: QuizApp,
}

#[pymethods]
impl PyQuizApp {
    #[new]
    #[pyo3(signature = (config_path = None))]
    fn new(config_path: Option<&str>) -> PyResult<Self> {
        let config =
            QuizConfig::load(config_path.unwrap_or(DEFAULT_CONFIG_PATH)).map_err(to_py_err)?;
        let inner = QuizApp::from_config(config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    fn start(&mut self, session_id: &str, mode: &str) -> PyResult<()> {
        let mode: QuizMode = mode.parse().map_err(to_py_err)?;
        self.inner.start_quiz(session_id, mode).map_err(to_py_err)
    }

    fn question(&mut self, session_id: &str) -> PyResult<PyQuestion> {
        self.inner
            .current_question(session_id)
            .map(PyQuestion::from)
            .map_err(to_py_err)
    }

    fn answer(&mut self, session_id: &str, selected: &str) -> PyResult<PyAnswerResult> {
        self.inner
            .submit_answer(session_id, selected)
            .map(PyAnswerResult::from)
            .map_err(to_py_err)
    }

    fn finish(&mut self, session_id: &str) -> PyResult<PyQuizReport> {
        self.inner
            .finish_quiz(session_id)
            .map(PyQuizReport::from)
            .map_err(to_py_err)
    }

    fn summary(&self) -> PyScoreSummary {
        self.inner.history_summary().into()
    }

    fn health(&self) -> &'static str {
        self.inner.health()
    }
}

#[pyfunction]
#[pyo3(name = "init_logging", signature = (level = "info"))]
pub fn py_init_logging(level: &str) {
    init_tracing(level);
}

#[pymodule]
fn wordquiz_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_init_logging, m)?)?;

    m.add_class::<PyQuizApp>()?;
    m.add_class::<PyQuestion>()?;
    m.add_class::<PyAnswerResult>()?;
    m.add_class::<PyBadge>()?;
    m.add_class::<PyQuizReport>()?;
    m.add_class::<PyScoreSummary>()?;

    Ok(())
}
