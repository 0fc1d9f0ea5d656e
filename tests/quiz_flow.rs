//! End-to-end quiz runs against a CSV catalog in a temp directory

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use wordquiz_core::{
    FixedClock, MemorySessionStore, QuizApp, QuizConfig, QuizError, QuizMode, QuizPhase, QuizReport,
    QuizResult, QuizSession, SessionError, SessionStore, SqliteSessionStore, QUIZ_LENGTH,
};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 4, day)
        .unwrap()
        .and_hms_opt(hour, 15, 0)
        .unwrap()
}

fn write_catalog(dir: &Path, words: usize) -> QuizConfig {
    let path = dir.join("words.csv");
    let mut body = String::from("番号,英単語,意味\n");
    for i in 1..=words {
        body.push_str(&format!("{i},word{i},meaning{i}\n"));
    }
    fs::write(&path, body).unwrap();
    QuizConfig {
        words_path: path.to_string_lossy().to_string(),
        ..QuizConfig::in_dir(dir)
    }
}

fn setup(words: usize, seed: u64) -> (TempDir, QuizApp) {
    let dir = tempfile::tempdir().unwrap();
    let config = write_catalog(dir.path(), words);
    let app = QuizApp::from_config(config)
        .unwrap()
        .with_rng(StdRng::seed_from_u64(seed))
        .with_clock(FixedClock(at(10, 12)));
    (dir, app)
}

/// Play a whole quiz, answering the first `correct` questions right and the rest wrong
fn play(app: &mut QuizApp, id: &str, mode: QuizMode, correct: usize) -> QuizReport {
    app.start_quiz(id, mode).unwrap();
    for i in 0..QUIZ_LENGTH {
        let question = app.current_question(id).unwrap();
        let answer = if i < correct {
            question.choices.correct_answer.clone()
        } else {
            "definitely wrong".to_string()
        };
        app.submit_answer(id, &answer).unwrap();
    }
    app.finish_quiz(id).unwrap()
}

fn codes(report: &QuizReport) -> Vec<&str> {
    report.new_badges.iter().map(|b| b.code.as_str()).collect()
}

#[test]
fn perfect_normal_run() {
    let (dir, mut app) = setup(40, 1);
    let report = play(&mut app, "alice", QuizMode::Normal, QUIZ_LENGTH);

    assert_eq!(report.score, 10);
    assert_eq!(report.total, 10);
    assert!(report.wrong_answers.is_empty());
    assert!(codes(&report).contains(&"PERFECT"));
    assert!(codes(&report).contains(&"TRY_FIRST"));

    let session = app.session("alice").unwrap().unwrap();
    assert_eq!(session.phase(), QuizPhase::Completed);

    let history = app.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].score, 10);
    assert_eq!(history[0].date, at(10, 12));

    let chart = report.chart_path.expect("chart written");
    assert!(chart.exists());
    assert!(dir.path().join("word_stats.csv").exists());
    assert!(fs::read_to_string(dir.path().join("achievements.csv"))
        .unwrap()
        .contains("PERFECT"));
}

#[test]
fn answering_after_completion_is_rejected() {
    let (_dir, mut app) = setup(20, 2);
    play(&mut app, "bob", QuizMode::Normal, 3);

    let err = app.submit_answer("bob", "anything").unwrap_err();
    assert!(matches!(err, QuizError::Session(SessionError::AlreadyCompleted)));
    assert!(err.is_usage_error());

    let err = app.current_question("bob").unwrap_err();
    assert!(matches!(err, QuizError::Session(SessionError::AlreadyCompleted)));
}

#[test]
fn result_is_recorded_once() {
    let (_dir, mut app) = setup(20, 3);
    play(&mut app, "carol", QuizMode::Normal, 5);

    let err = app.finish_quiz("carol").unwrap_err();
    assert!(matches!(err, QuizError::Session(SessionError::AlreadyRecorded)));
    assert_eq!(app.history().len(), 1);
}

#[test]
fn unknown_session_is_rejected() {
    let (_dir, mut app) = setup(20, 4);
    assert!(matches!(
        app.submit_answer("nobody", "x").unwrap_err(),
        QuizError::Session(SessionError::NoActiveSession)
    ));
    assert!(matches!(
        app.current_question("nobody").unwrap_err(),
        QuizError::Session(SessionError::NoActiveSession)
    ));
    assert!(matches!(
        app.finish_quiz("nobody").unwrap_err(),
        QuizError::Session(SessionError::NoActiveSession)
    ));
}

#[test]
fn finishing_early_is_rejected() {
    let (_dir, mut app) = setup(20, 5);
    app.start_quiz("dave", QuizMode::Normal).unwrap();
    let q = app.current_question("dave").unwrap();
    app.submit_answer("dave", &q.choices.correct_answer).unwrap();

    assert!(matches!(
        app.finish_quiz("dave").unwrap_err(),
        QuizError::Session(SessionError::NotCompleted { answered: 1, total: 10 })
    ));
    assert!(app.history().is_empty());
}

#[test]
fn missed_answers_are_listed_in_order() {
    let (_dir, mut app) = setup(20, 6);
    let report = play(&mut app, "erin", QuizMode::Normal, 7);

    assert_eq!(report.score, 7);
    assert_eq!(report.wrong_answers.len(), 3);
    let session = app.session("erin").unwrap().unwrap();
    for (wrong, entry) in report.wrong_answers.iter().zip(&session.questions()[7..]) {
        // second half shows the meaning and asks for the word
        assert_eq!(wrong.prompt, entry.meaning);
        assert_eq!(wrong.correct_answer, entry.word);
        assert_eq!(wrong.user_answer, "definitely wrong");
    }
}

#[test]
fn ninety_multi_is_awarded_once() {
    let (_dir, mut app) = setup(30, 7);

    app.set_clock(FixedClock(at(9, 12)));
    let first = play(&mut app, "frank", QuizMode::Normal, 9);
    assert!(codes(&first).contains(&"TRY_FIRST"));
    assert!(!codes(&first).contains(&"NINETY_MULTI"));

    app.set_clock(FixedClock(at(10, 12)));
    let second = play(&mut app, "frank", QuizMode::Normal, 9);
    assert!(!codes(&second).contains(&"NINETY_MULTI"));

    let third = play(&mut app, "frank", QuizMode::Normal, 10);
    assert!(codes(&third).contains(&"NINETY_MULTI"));
    assert!(codes(&third).contains(&"PERFECT"));

    let fourth = play(&mut app, "frank", QuizMode::Normal, 9);
    assert!(!codes(&fourth).contains(&"NINETY_MULTI"));
    assert!(!codes(&fourth).contains(&"TRY_FIRST"));

    let earned: Vec<String> = app.earned_badges().into_iter().map(|b| b.code).collect();
    assert_eq!(earned.iter().filter(|c| *c == "NINETY_MULTI").count(), 1);
}

#[test]
fn early_and_late_badges_follow_the_clock() {
    let (_dir, app) = setup(20, 8);
    let mut app = app.with_clock(FixedClock(at(10, 6)));
    let morning = play(&mut app, "gina", QuizMode::Normal, 2);
    assert!(codes(&morning).contains(&"EARLY_BIRD"));

    app.set_clock(FixedClock(at(10, 23)));
    let night = play(&mut app, "gina", QuizMode::Normal, 2);
    assert!(codes(&night).contains(&"NIGHT_OWL"));
    assert!(!codes(&night).contains(&"EARLY_BIRD"));
}

#[test]
fn weak_mode_prioritises_missed_words() {
    let (_dir, mut app) = setup(30, 9);
    play(&mut app, "hana", QuizMode::Normal, 6);
    let missed: Vec<String> = app.session("hana").unwrap().unwrap().questions()[6..]
        .iter()
        .map(|e| e.word.clone())
        .collect();

    app.start_quiz("hana", QuizMode::Weak).unwrap();
    let session = app.session("hana").unwrap().unwrap();
    let head: Vec<String> = session.questions()[..4].iter().map(|e| e.word.clone()).collect();
    let mut expected = missed.clone();
    expected.sort();
    let mut got = head.clone();
    got.sort();
    assert_eq!(got, expected);
    assert_eq!(session.questions().len(), QUIZ_LENGTH);
}

#[test]
fn statistics_persist_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_catalog(dir.path(), 15);
    let mut app = QuizApp::from_config(config.clone())
        .unwrap()
        .with_rng(StdRng::seed_from_u64(10))
        .with_clock(FixedClock(at(10, 12)));
    play(&mut app, "ivan", QuizMode::Normal, 0);

    let reopened = QuizApp::from_config(config).unwrap();
    let shown: u32 = reopened.stats().iter().map(|(_, s)| s.times_shown).sum();
    let wrong: u32 = reopened.stats().iter().map(|(_, s)| s.times_wrong).sum();
    assert_eq!(shown, 10);
    assert_eq!(wrong, 10);
}

#[test]
fn sqlite_sessions_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = write_catalog(dir.path(), 15);
    config.session_db_path = Some(dir.path().join("sessions.db").to_string_lossy().to_string());

    let mut app = QuizApp::from_config(config.clone())
        .unwrap()
        .with_rng(StdRng::seed_from_u64(11));
    app.start_quiz("june", QuizMode::Normal).unwrap();
    let q = app.current_question("june").unwrap();
    app.submit_answer("june", &q.choices.correct_answer).unwrap();
    drop(app);

    let mut app = QuizApp::from_config(config).unwrap();
    let session = app.session("june").unwrap().unwrap();
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.score(), 1);
    assert_eq!(app.current_question("june").unwrap().index, 1);
}

#[test]
fn custom_session_store_is_used() {
    let (_dir, app) = setup(15, 12);
    let mut app = app.with_session_store(SqliteSessionStore::in_memory().unwrap());
    app.start_quiz("kai", QuizMode::Weak).unwrap();
    assert_eq!(app.session("kai").unwrap().unwrap().mode(), QuizMode::Weak);
    app.abandon_quiz("kai").unwrap();
    assert!(app.session("kai").unwrap().is_none());
}

#[test]
fn bad_catalog_prevents_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_catalog(dir.path(), 5);
    assert!(matches!(
        QuizApp::from_config(config),
        Err(QuizError::InsufficientWords { found: 5, required: 10 })
    ));
}

#[test]
fn corrupt_state_files_do_not_block_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_catalog(dir.path(), 12);
    fs::write(&config.stats_path, "garbage\n\"unterminated").unwrap();
    fs::write(&config.achievements_path, "nonsense,columns\n1,2\n").unwrap();
    fs::write(&config.score_path, "a,b\n").unwrap();

    let mut app = QuizApp::from_config(config)
        .unwrap()
        .with_rng(StdRng::seed_from_u64(13))
        .with_clock(FixedClock(at(10, 12)));
    assert_eq!(app.health(), "ok");
    assert!(app.history().is_empty());
    let report = play(&mut app, "lena", QuizMode::Weak, 10);
    assert_eq!(report.score, 10);
}

#[test]
fn failed_finish_is_not_recorded_twice() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = write_catalog(dir.path(), 15);
    // A directory where the statistics file should be makes the save fail
    let blocked = dir.path().join("blocked");
    fs::create_dir(&blocked).unwrap();
    config.stats_path = blocked.to_string_lossy().to_string();

    let mut app = QuizApp::from_config(config)
        .unwrap()
        .with_rng(StdRng::seed_from_u64(14))
        .with_clock(FixedClock(at(10, 12)));
    app.start_quiz("mona", QuizMode::Normal).unwrap();
    for _ in 0..QUIZ_LENGTH {
        let q = app.current_question("mona").unwrap();
        app.submit_answer("mona", &q.choices.correct_answer).unwrap();
    }

    assert!(app.finish_quiz("mona").is_err());
    assert!(matches!(
        app.finish_quiz("mona").unwrap_err(),
        QuizError::Session(SessionError::AlreadyRecorded)
    ));
    assert_eq!(app.history().len(), 1);
}

/// Memory store whose writes can be switched off
struct FlakyStore {
    inner: MemorySessionStore,
    failing: Rc<Cell<bool>>,
}

impl SessionStore for FlakyStore {
    fn load(&self, session_id: &str) -> QuizResult<Option<QuizSession>> {
        self.inner.load(session_id)
    }

    fn save(&mut self, session_id: &str, session: &QuizSession) -> QuizResult<()> {
        if self.failing.get() {
            return Err(io::Error::new(io::ErrorKind::Other, "store offline").into());
        }
        self.inner.save(session_id, session)
    }

    fn remove(&mut self, session_id: &str) -> QuizResult<()> {
        self.inner.remove(session_id)
    }
}

#[test]
fn failed_answer_save_leaves_statistics_alone() {
    let failing = Rc::new(Cell::new(false));
    let (_dir, app) = setup(15, 15);
    let mut app = app.with_session_store(FlakyStore {
        inner: MemorySessionStore::new(),
        failing: Rc::clone(&failing),
    });
    app.start_quiz("nina", QuizMode::Normal).unwrap();
    let q = app.current_question("nina").unwrap();

    failing.set(true);
    assert!(matches!(
        app.submit_answer("nina", "definitely wrong").unwrap_err(),
        QuizError::Io(_)
    ));
    let shown: u32 = app.stats().iter().map(|(_, s)| s.times_shown).sum();
    assert_eq!(shown, 0);

    failing.set(false);
    app.submit_answer("nina", &q.choices.correct_answer).unwrap();
    let shown: u32 = app.stats().iter().map(|(_, s)| s.times_shown).sum();
    assert_eq!(shown, 1);
    assert_eq!(app.session("nina").unwrap().unwrap().score(), 1);
}
