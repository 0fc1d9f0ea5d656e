//! One-time badges awarded after a completed quiz

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::QuizResult;
use crate::progress::ScoreRecord;
use crate::questions::QUIZ_LENGTH;

/// Probability of the lucky badge on any completion
pub const LUCKY_CHANCE: f64 = 0.03;
const NINETY_SCORE: u8 = 9;
const NINETY_REQUIRED: usize = 3;
const STREAK_DAYS: i64 = 7;
const EARLY_BIRD_LAST_HOUR: u32 = 7;
const NIGHT_OWL_FIRST_HOUR: u32 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Gold,
    Silver,
    Bronze,
    Special,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Gold => "gold",
            Rank::Silver => "silver",
            Rank::Bronze => "bronze",
            Rank::Special => "special",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Badge {
    Perfect,
    NinetyMulti,
    TryFirst,
    SevenStreak,
    EarlyBird,
    NightOwl,
    LuckyBee,
}

impl Badge {
    pub const ALL: [Badge; 7] = [
        Badge::Perfect,
        Badge::NinetyMulti,
        Badge::TryFirst,
        Badge::SevenStreak,
        Badge::EarlyBird,
        Badge::NightOwl,
        Badge::LuckyBee,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Badge::Perfect => "PERFECT",
            Badge::NinetyMulti => "NINETY_MULTI",
            Badge::TryFirst => "TRY_FIRST",
            Badge::SevenStreak => "SEVEN_STREAK",
            Badge::EarlyBird => "EARLY_BIRD",
            Badge::NightOwl => "NIGHT_OWL",
            Badge::LuckyBee => "LUCKY_BEE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.code() == code.trim())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Badge::Perfect => "満点王",
            Badge::NinetyMulti => "準優秀賞",
            Badge::TryFirst => "挑戦者",
            Badge::SevenStreak => "皆勤賞",
            Badge::EarlyBird => "早起き賞",
            Badge::NightOwl => "夜ふかし賞",
            Badge::LuckyBee => "ラッキービー",
        }
    }

    pub fn rank(&self) -> Rank {
        match self {
            Badge::Perfect => Rank::Gold,
            Badge::NinetyMulti => Rank::Silver,
            Badge::TryFirst | Badge::SevenStreak => Rank::Bronze,
            Badge::EarlyBird | Badge::NightOwl | Badge::LuckyBee => Rank::Special,
        }
    }

    pub fn award(&self) -> AwardedBadge {
        AwardedBadge {
            code: self.code().to_string(),
            name: self.name().to_string(),
            rank: self.rank(),
        }
    }
}

/// Badge with its display metadata, as handed to the result page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardedBadge {
    pub code: String,
    pub name: String,
    pub rank: Rank,
}

/// Badges whose conditions hold right now, whether or not they were earned before.
/// `history` must already include the run that just finished.
pub fn qualifying_badges<R: Rng + ?Sized>(
    history: &[ScoreRecord],
    latest_score: u8,
    now: NaiveDateTime,
    rng: &mut R,
) -> Vec<Badge> {
    let mut earned = Vec::new();

    if history.len() == 1 {
        earned.push(Badge::TryFirst);
    }
    if latest_score as usize == QUIZ_LENGTH {
        earned.push(Badge::Perfect);
    }
    if history.iter().filter(|r| r.score >= NINETY_SCORE).count() >= NINETY_REQUIRED {
        earned.push(Badge::NinetyMulti);
    }
    if played_every_day(history, now.date()) {
        earned.push(Badge::SevenStreak);
    }
    if now.hour() <= EARLY_BIRD_LAST_HOUR {
        earned.push(Badge::EarlyBird);
    }
    if now.hour() >= NIGHT_OWL_FIRST_HOUR {
        earned.push(Badge::NightOwl);
    }
    if rng.gen::<f64>() < LUCKY_CHANCE {
        earned.push(Badge::LuckyBee);
    }

    earned.sort_by_key(|b| Badge::ALL.iter().position(|x| x == b));
    earned
}

/// Every one of the last seven calendar days, today included, has a record
fn played_every_day(history: &[ScoreRecord], today: NaiveDate) -> bool {
    let days: HashSet<NaiveDate> = history.iter().map(|r| r.date.date()).collect();
    (0..STREAK_DAYS).all(|i| days.contains(&(today - Duration::days(i))))
}

/// Persisted set of badge codes ever earned; only grows
#[derive(Debug, Clone)]
pub struct AchievementBook {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct CodeRow {
    code: String,
}

impl AchievementBook {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Codes on file; unreadable or missing file reads as none earned.
    /// Unknown codes are kept so a rewrite never drops them.
    pub fn load(&self) -> BTreeSet<String> {
        if !self.path.exists() {
            return BTreeSet::new();
        }
        match read_codes(&self.path) {
            Ok(codes) => codes,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "achievements unreadable, treating as none earned");
                BTreeSet::new()
            }
        }
    }

    pub fn earned(&self) -> Vec<Badge> {
        let codes = self.load();
        Badge::ALL
            .into_iter()
            .filter(|b| codes.contains(b.code()))
            .collect()
    }

    /// Store the union of the file and `badges`, sorted by code
    pub fn merge(&self, badges: &[Badge]) -> QuizResult<()> {
        let mut codes = self.load();
        codes.extend(badges.iter().map(|b| b.code().to_string()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        for code in codes {
            writer.serialize(CodeRow { code })?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Evaluate every rule and persist the badges not earned before; returns only those
    pub fn award<R: Rng + ?Sized>(
        &self,
        history: &[ScoreRecord],
        latest_score: u8,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> QuizResult<Vec<AwardedBadge>> {
        let already = self.load();
        let fresh: Vec<Badge> = qualifying_badges(history, latest_score, now, rng)
            .into_iter()
            .filter(|b| !already.contains(b.code()))
            .collect();

        if !fresh.is_empty() {
            self.merge(&fresh)?;
            let codes: Vec<&str> = fresh.iter().map(|b| b.code()).collect();
            tracing::info!(badges = ?codes, "new achievements");
        }
        Ok(fresh.iter().map(Badge::award).collect())
    }
}

fn read_codes(path: &Path) -> QuizResult<BTreeSet<String>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut codes = BTreeSet::new();
    for row in reader.deserialize::<CodeRow>() {
        let code = row?.code.trim().to_string();
        if !code.is_empty() {
            codes.insert(code);
        }
    }
    Ok(codes)
}
