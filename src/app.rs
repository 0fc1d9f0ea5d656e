//! Application root - owns the catalog, statistics and stores, and drives quizzes
//! on behalf of the front end. One user session id maps to one quiz.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;

use crate::achievements::{AchievementBook, AwardedBadge};
use crate::catalog::Catalog;
use crate::chart::{SvgTrendRenderer, TrendRenderer};
use crate::clock::{Clock, SystemClock};
use crate::config::QuizConfig;
use crate::db::{MemorySessionStore, SessionStore, SqliteSessionStore};
use crate::error::{QuizResult, SessionError};
use crate::excel::load_catalog;
use crate::progress::{ScoreHistory, ScoreRecord, ScoreSummary};
use crate::questions::{choose_questions, QuizMode};
use crate::session::{AnswerOutcome, PresentedQuestion, QuizSession, WrongAnswer};
use crate::stats::WordStats;

/// Everything the result page shows for a finished quiz
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizReport {
    pub mode: QuizMode,
    pub score: usize,
    pub total: usize,
    pub wrong_answers: Vec<WrongAnswer>,
    pub chart_path: Option<PathBuf>,
    pub new_badges: Vec<AwardedBadge>,
}

pub struct QuizApp {
    config: QuizConfig,
    catalog: Catalog,
    stats: WordStats,
    history: ScoreHistory,
    achievements: AchievementBook,
    sessions: Box<dyn SessionStore>,
    renderer: Box<dyn TrendRenderer>,
    rng: Box<dyn RngCore>,
    clock: Box<dyn Clock>,
}

impl QuizApp {
    /// Load the catalog (fatal on failure) and the statistics (reset on failure)
    pub fn from_config(config: QuizConfig) -> QuizResult<Self> {
        config.validate()?;
        let catalog = load_catalog(&config)?;
        let mut app = Self::with_catalog(config, catalog);

        if let Some(db_path) = app.config.session_db_path.clone() {
            app.sessions = Box::new(SqliteSessionStore::open(&db_path)?);
            tracing::info!(path = %db_path, "using sqlite session store");
        }
        Ok(app)
    }

    /// Build around an already loaded catalog with in-memory sessions
    pub fn with_catalog(config: QuizConfig, catalog: Catalog) -> Self {
        let stats = WordStats::load(&config.stats_path, &catalog);
        Self {
            history: ScoreHistory::new(&config.score_path),
            achievements: AchievementBook::new(&config.achievements_path),
            renderer: Box::new(SvgTrendRenderer::new(&config.chart_path)),
            sessions: Box::new(MemorySessionStore::new()),
            rng: Box::new(StdRng::from_entropy()),
            clock: Box::new(SystemClock),
            stats,
            catalog,
            config,
        }
    }

    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Box::new(clock);
    }

    pub fn with_session_store(mut self, store: impl SessionStore + 'static) -> Self {
        self.sessions = Box::new(store);
        self
    }

    pub fn with_renderer(mut self, renderer: impl TrendRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn stats(&self) -> &WordStats {
        &self.stats
    }

    /// Liveness probe
    pub fn health(&self) -> &'static str {
        "ok"
    }

    fn active_session(&self, session_id: &str) -> QuizResult<QuizSession> {
        self.sessions
            .load(session_id)?
            .ok_or_else(|| SessionError::NoActiveSession.into())
    }

    /// Start (or restart) the quiz for `session_id`
    pub fn start_quiz(&mut self, session_id: &str, mode: QuizMode) -> QuizResult<()> {
        let questions = choose_questions(mode, &self.catalog, &self.stats, &mut *self.rng);
        let session = QuizSession::started(mode, questions)?;
        self.sessions.save(session_id, &session)?;
        tracing::info!(session_id, %mode, "quiz started");
        Ok(())
    }

    pub fn session(&self, session_id: &str) -> QuizResult<Option<QuizSession>> {
        self.sessions.load(session_id)
    }

    /// The question to show now; options are regenerated on every call
    pub fn current_question(&mut self, session_id: &str) -> QuizResult<PresentedQuestion> {
        let session = self.active_session(session_id)?;
        Ok(session.present(&self.catalog, &mut *self.rng)?)
    }

    pub fn submit_answer(&mut self, session_id: &str, selected: &str) -> QuizResult<AnswerOutcome> {
        let mut session = self.active_session(session_id)?;
        // Statistics change only once the advanced session is stored
        let mut stats = self.stats.clone();
        let outcome = session.submit(selected, &mut stats)?;
        self.sessions.save(session_id, &session)?;
        self.stats = stats;
        Ok(outcome)
    }

    /// Record a completed quiz: history, statistics, chart and badges.
    /// Allowed once per run; a repeat call is rejected instead of double-counting.
    pub fn finish_quiz(&mut self, session_id: &str) -> QuizResult<QuizReport> {
        let mut session = self.active_session(session_id)?;
        session.mark_recorded()?;
        // Persist the flag first; a failure below must not allow a second record
        self.sessions.save(session_id, &session)?;

        let now = self.clock.now();
        let score = session.score();
        self.history.append(&ScoreRecord {
            date: now,
            mode: session.mode(),
            score: score as u8,
        })?;
        self.stats.save()?;

        let records = self.history.load();
        let chart_path = match self.renderer.render(&records) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "score chart could not be rendered");
                None
            }
        };

        let new_badges = self
            .achievements
            .award(&records, score as u8, now, &mut *self.rng)?;
        tracing::info!(session_id, score, badges = new_badges.len(), "quiz finished");

        Ok(QuizReport {
            mode: session.mode(),
            score,
            total: session.questions().len(),
            wrong_answers: session.wrong_answers().to_vec(),
            chart_path,
            new_badges,
        })
    }

    /// Drop the quiz for `session_id`
    pub fn abandon_quiz(&mut self, session_id: &str) -> QuizResult<()> {
        self.sessions.remove(session_id)
    }

    pub fn history(&self) -> Vec<ScoreRecord> {
        self.history.load()
    }

    pub fn history_summary(&self) -> ScoreSummary {
        self.history.summary()
    }

    pub fn earned_badges(&self) -> Vec<AwardedBadge> {
        self.achievements.earned().iter().map(|b| b.award()).collect()
    }

    pub fn save_stats(&self) -> QuizResult<()> {
        self.stats.save()
    }

    /// Re-read statistics from disk, discarding unsaved in-memory updates
    pub fn reload_stats(&mut self) {
        self.stats = WordStats::load(self.stats.path().to_path_buf(), &self.catalog);
    }
}
