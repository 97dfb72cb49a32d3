use crate::app_dirs::AppDirs;
use crate::game::RunSummary;
use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike, Weekday};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub const STATS_KEY: &str = "keyfall.stats";
pub const DAILY_STATS_KEY: &str = "keyfall.daily_stats";

pub mod achievement_ids {
    pub const FIRST_GAME: &str = "first_game";
    pub const SPEED_DEMON: &str = "speed_demon";
    pub const ACCURACY_MASTER: &str = "accuracy_master";
    pub const COMBO_KING: &str = "combo_king";
    pub const PERFECTIONIST: &str = "perfectionist";
    pub const MARATHON_RUNNER: &str = "marathon_runner";
    pub const LITTLE_LEARNER: &str = "little_learner";
    pub const PRINCESS_POWER: &str = "princess_power";
    pub const DINO_CHAMPION: &str = "dino_champion";
    pub const NUMBER_WIZARD: &str = "number_wizard";
    pub const SPEED_MASTER: &str = "speed_master";
    pub const ULTRA_ACCURACY: &str = "ultra_accuracy";
    pub const COMBO_MASTER: &str = "combo_master";
    pub const WORD_SMITH: &str = "word_smith";
    pub const SENTENCE_MASTER: &str = "sentence_master";
    pub const CODE_NINJA: &str = "code_ninja";
    pub const INSANE_MODE: &str = "insane_mode";
    pub const THEME_COLLECTOR: &str = "theme_collector";
    pub const DAILY_PLAYER: &str = "daily_player";
    pub const NIGHT_OWL: &str = "night_owl";
    pub const EARLY_BIRD: &str = "early_bird";
    pub const WEEKEND_WARRIOR: &str = "weekend_warrior";
    pub const STREAK_MASTER: &str = "streak_master";
    pub const MULTI_MODE: &str = "multi_mode";
    pub const LANGUAGE_EXPLORER: &str = "language_explorer";
}

use achievement_ids as ids;

/// (id, name, description, points)
const CATALOGUE: [(&str, &str, &str, u64); 25] = [
    (ids::FIRST_GAME, "First Steps", "Play your first game", 10),
    (ids::SPEED_DEMON, "Speed Demon", "Reach 60 WPM", 50),
    (ids::ACCURACY_MASTER, "Accuracy Master", "Achieve 95% accuracy", 50),
    (ids::COMBO_KING, "Combo King", "Get a 20x combo", 30),
    (ids::PERFECTIONIST, "Perfectionist", "100% accuracy in a game", 100),
    (ids::MARATHON_RUNNER, "Marathon Runner", "Play 50 games", 75),
    (ids::LITTLE_LEARNER, "Little Learner", "Complete first kids game", 25),
    (ids::PRINCESS_POWER, "Princess Power", "Master princess mode", 40),
    (ids::DINO_CHAMPION, "Dino Champion", "Roar through dino mode", 40),
    (ids::NUMBER_WIZARD, "Number Wizard", "Count like a pro", 40),
    (ids::SPEED_MASTER, "Speed Master", "Reach 100 WPM", 100),
    (ids::ULTRA_ACCURACY, "Ultra Accuracy", "Achieve 99% accuracy", 150),
    (ids::COMBO_MASTER, "Combo Master", "Get a 50x combo", 75),
    (ids::WORD_SMITH, "Word Smith", "Type 1000 words total", 50),
    (ids::SENTENCE_MASTER, "Sentence Master", "Complete 100 sentences", 60),
    (ids::CODE_NINJA, "Code Ninja", "Master code mode", 80),
    (ids::INSANE_MODE, "Insane Mode", "Complete insane difficulty", 200),
    (ids::THEME_COLLECTOR, "Theme Collector", "Try all themes", 30),
    (ids::DAILY_PLAYER, "Daily Player", "Play for 7 consecutive days", 100),
    (ids::NIGHT_OWL, "Night Owl", "Play at night (10 PM - 6 AM)", 25),
    (ids::EARLY_BIRD, "Early Bird", "Play in the morning (6 AM - 10 AM)", 25),
    (ids::WEEKEND_WARRIOR, "Weekend Warrior", "Play on weekends", 30),
    (ids::STREAK_MASTER, "Streak Master", "Maintain 10-day streak", 150),
    (ids::MULTI_MODE, "Multi-Mode", "Try all game modes", 50),
    (ids::LANGUAGE_EXPLORER, "Language Explorer", "Try all programming languages", 60),
];

/// Points for catalogue entries stored without a value
const DEFAULT_ACHIEVEMENT_POINTS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub level: u32,
    pub name: &'static str,
    pub min_points: u64,
}

pub const RANKS: [Rank; 10] = [
    Rank { level: 1, name: "Novice", min_points: 0 },
    Rank { level: 2, name: "Apprentice", min_points: 100 },
    Rank { level: 3, name: "Adept", min_points: 300 },
    Rank { level: 4, name: "Expert", min_points: 600 },
    Rank { level: 5, name: "Master", min_points: 1000 },
    Rank { level: 6, name: "Grandmaster", min_points: 1500 },
    Rank { level: 7, name: "Legend", min_points: 2200 },
    Rank { level: 8, name: "Mythic", min_points: 3000 },
    Rank { level: 9, name: "Divine", min_points: 4000 },
    Rank { level: 10, name: "Transcendent", min_points: 5000 },
];

/// Highest rank the points qualify for
pub fn rank_for(points: u64) -> Rank {
    RANKS
        .iter()
        .rev()
        .find(|r| points >= r.min_points)
        .copied()
        .unwrap_or(RANKS[0])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub points: u64,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Local>>,
}

/// Display name for a catalogue id
pub fn achievement_name(id: &str) -> Option<&'static str> {
    CATALOGUE
        .iter()
        .find(|(entry, ..)| *entry == id)
        .map(|&(_, name, ..)| name)
}

pub fn achievement_catalogue() -> Vec<Achievement> {
    CATALOGUE
        .iter()
        .map(|&(id, name, description, points)| Achievement {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            points,
            unlocked: false,
            unlocked_at: None,
        })
        .collect()
}

/// Games, words, seconds and score summed over some span of days
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub games: u64,
    pub words: u64,
    pub time: f64,
    pub score: u64,
}

impl PeriodTotals {
    fn add(&mut self, other: &PeriodTotals) {
        self.games += other.games;
        self.words += other.words;
        self.time += other.time;
        self.score += other.score;
    }

    fn from_json_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            games: count_field(obj, "games"),
            words: count_field(obj, "words"),
            time: number_field(obj, "time"),
            score: count_field(obj, "score"),
        }
    }
}

/// Lifetime statistics document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub games_played: u64,
    pub best_wpm: f64,
    pub best_accuracy: f64,
    pub high_score: u64,
    pub total_words_typed: u64,
    pub total_time_spent: f64,
    pub total_score: u64,
    pub current_streak: u64,
    pub longest_streak: u64,
    pub last_play_date: Option<NaiveDate>,
    pub themes_used: BTreeSet<String>,
    pub modes_played: BTreeSet<String>,
    pub languages_tried: BTreeSet<String>,
    pub achievements: Vec<Achievement>,
    pub progression_level: u64,
    pub progression_points: u64,
    pub today: PeriodTotals,
    pub week: PeriodTotals,
    pub month: PeriodTotals,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            games_played: 0,
            best_wpm: 0.0,
            best_accuracy: 0.0,
            high_score: 0,
            total_words_typed: 0,
            total_time_spent: 0.0,
            total_score: 0,
            current_streak: 0,
            longest_streak: 0,
            last_play_date: None,
            themes_used: BTreeSet::new(),
            modes_played: BTreeSet::new(),
            languages_tried: BTreeSet::new(),
            achievements: achievement_catalogue(),
            progression_level: 1,
            progression_points: 0,
            today: PeriodTotals::default(),
            week: PeriodTotals::default(),
            month: PeriodTotals::default(),
        }
    }
}

impl Statistics {
    /// Rebuilds the document field by field. Anything malformed becomes its default.
    pub fn from_json_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            warn!("statistics document is not an object, starting fresh");
            return Self::default();
        };

        let mut stats = Self {
            games_played: count_field(obj, "games_played"),
            best_wpm: number_field(obj, "best_wpm"),
            best_accuracy: number_field(obj, "best_accuracy"),
            high_score: count_field(obj, "high_score"),
            total_words_typed: count_field(obj, "total_words_typed"),
            total_time_spent: number_field(obj, "total_time_spent"),
            total_score: count_field(obj, "total_score"),
            current_streak: count_field(obj, "current_streak"),
            longest_streak: count_field(obj, "longest_streak"),
            last_play_date: obj
                .get("last_play_date")
                .and_then(Value::as_str)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
            themes_used: string_set(obj, "themes_used"),
            modes_played: string_set(obj, "modes_played"),
            languages_tried: string_set(obj, "languages_tried"),
            achievements: achievements_field(obj),
            progression_level: count_field(obj, "progression_level").max(1),
            progression_points: count_field(obj, "progression_points"),
            today: obj.get("today").map(PeriodTotals::from_json_value).unwrap_or_default(),
            week: obj.get("week").map(PeriodTotals::from_json_value).unwrap_or_default(),
            month: obj.get("month").map(PeriodTotals::from_json_value).unwrap_or_default(),
        };
        stats.longest_streak = stats.longest_streak.max(stats.current_streak);
        stats
    }

    pub fn rank(&self) -> Rank {
        RANKS
            .iter()
            .find(|r| u64::from(r.level) == self.progression_level)
            .copied()
            .unwrap_or_else(|| rank_for(self.progression_points))
    }

    /// Fraction of the way to the next rank; 1 at the top rank
    pub fn progress_to_next_rank(&self) -> f64 {
        let current = self.rank();
        let Some(next) = RANKS.iter().find(|r| r.level > current.level) else {
            return 1.0;
        };
        let span = (next.min_points - current.min_points) as f64;
        let done = self.progression_points.saturating_sub(current.min_points) as f64;
        (done / span).clamp(0.0, 1.0)
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a.id == id && a.unlocked)
    }

    /// Marks an achievement as earned. Returns the achievement if this call unlocked it.
    pub fn unlock(&mut self, id: &str, now: DateTime<Local>) -> Option<Achievement> {
        let achievement = self.achievements.iter_mut().find(|a| a.id == id)?;
        if achievement.unlocked {
            return None;
        }
        achievement.unlocked = true;
        achievement.unlocked_at = Some(now);
        let earned = achievement.clone();
        self.progression_points += earned.points;
        self.update_rank();
        debug!("achievement {} unlocked (+{})", earned.id, earned.points);
        Some(earned)
    }

    pub fn unlocked_at(&self, id: &str) -> Option<DateTime<Local>> {
        self.achievements
            .iter()
            .find(|a| a.id == id)
            .and_then(|a| a.unlocked_at)
    }

    pub fn unlocked_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.unlocked).count()
    }

    fn update_rank(&mut self) {
        let rank = u64::from(rank_for(self.progression_points).level);
        self.progression_level = self.progression_level.max(rank);
    }

    fn update_streak(&mut self, today: NaiveDate) {
        match self.last_play_date {
            Some(last) if last == today => return,
            Some(last) if (today - last).num_days() == 1 => self.current_streak += 1,
            None => self.current_streak += 1,
            Some(_) => self.current_streak = 1,
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_play_date = Some(today);
    }
}

/// Per-day totals keyed by ISO date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyStats(pub BTreeMap<String, PeriodTotals>);

impl DailyStats {
    pub fn from_json_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            warn!("daily statistics document is not an object, starting fresh");
            return Self::default();
        };
        let days = obj
            .iter()
            .filter_map(|(key, totals)| match NaiveDate::parse_from_str(key, "%Y-%m-%d") {
                Ok(_) => Some((key.clone(), PeriodTotals::from_json_value(totals))),
                Err(_) => {
                    warn!("dropping daily statistics for unparseable date {key:?}");
                    None
                }
            })
            .collect();
        Self(days)
    }

    pub fn day(&self, date: NaiveDate) -> PeriodTotals {
        self.0.get(&day_key(date)).copied().unwrap_or_default()
    }

    fn record(&mut self, date: NaiveDate, run: &PeriodTotals) {
        self.0.entry(day_key(date)).or_default().add(run);
    }

    /// Totals for the `days` days ending at `today`, inclusive
    pub fn period(&self, today: NaiveDate, days: i64) -> PeriodTotals {
        let mut totals = PeriodTotals::default();
        for (key, day) in &self.0 {
            let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") else {
                continue;
            };
            let age = (today - date).num_days();
            if (0..days).contains(&age) {
                totals.add(day);
            }
        }
        totals
    }
}

fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Both persisted documents, updated together after each run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsBook {
    pub stats: Statistics,
    pub daily: DailyStats,
}

impl StatsBook {
    /// Today, week and month totals as of `today`, from the daily aggregates
    pub fn periods(&self, today: NaiveDate) -> [(&'static str, PeriodTotals); 3] {
        [
            ("today", self.daily.day(today)),
            ("week", self.daily.period(today, 7)),
            ("month", self.daily.period(today, 30)),
        ]
    }

    /// Folds a finished run into the statistics. Returns achievements unlocked by it.
    pub fn record_run(&mut self, run: &RunSummary, now: DateTime<Local>) -> Vec<Achievement> {
        let today = now.date_naive();
        let stats = &mut self.stats;

        stats.games_played += 1;
        stats.best_wpm = stats.best_wpm.max(run.wpm);
        stats.best_accuracy = stats.best_accuracy.max(run.accuracy);
        stats.high_score = stats.high_score.max(run.score);
        stats.total_words_typed += u64::from(run.words_typed);
        stats.total_time_spent += run.elapsed_secs;
        stats.total_score += run.score;

        stats.progression_points += run.score / 10;
        stats.update_rank();
        stats.update_streak(today);

        stats.themes_used.insert(run.theme.to_string());
        stats.modes_played.insert(run.mode.to_string());
        stats.languages_tried.insert(run.language.to_string());

        let totals = PeriodTotals {
            games: 1,
            words: u64::from(run.words_typed),
            time: run.elapsed_secs,
            score: run.score,
        };
        self.daily.record(today, &totals);
        self.stats.today = self.daily.day(today);
        self.stats.week = self.daily.period(today, 7);
        self.stats.month = self.daily.period(today, 30);

        self.check_achievements(run, now)
    }

    fn check_achievements(&mut self, run: &RunSummary, now: DateTime<Local>) -> Vec<Achievement> {
        let s = &self.stats;
        let hour = now.hour();
        let weekend = matches!(now.weekday(), Weekday::Sat | Weekday::Sun);

        let earned = [
            (ids::FIRST_GAME, s.games_played >= 1),
            (ids::SPEED_DEMON, run.wpm >= 60.0),
            (ids::SPEED_MASTER, run.wpm >= 100.0),
            (ids::ACCURACY_MASTER, run.accuracy >= 95.0),
            (ids::ULTRA_ACCURACY, run.accuracy >= 99.0),
            (ids::PERFECTIONIST, run.accuracy >= 100.0),
            (ids::COMBO_KING, run.max_combo >= 20),
            (ids::COMBO_MASTER, run.max_combo >= 50),
            (ids::MARATHON_RUNNER, s.games_played >= 50),
            (ids::WORD_SMITH, s.total_words_typed >= 1000),
            (ids::THEME_COLLECTOR, s.themes_used.len() >= 4),
            (ids::MULTI_MODE, s.modes_played.len() >= 5),
            (ids::LANGUAGE_EXPLORER, s.languages_tried.len() >= 4),
            (ids::NIGHT_OWL, !(6..22).contains(&hour)),
            (ids::EARLY_BIRD, (6..10).contains(&hour)),
            (ids::WEEKEND_WARRIOR, weekend),
            (ids::DAILY_PLAYER, s.current_streak >= 7),
            (ids::STREAK_MASTER, s.current_streak >= 10),
        ];

        earned
            .into_iter()
            .filter(|&(_, met)| met)
            .filter_map(|(id, _)| self.stats.unlock(id, now))
            .collect()
    }
}

fn number_field(obj: &serde_json::Map<String, Value>, key: &str) -> f64 {
    let parsed = match obj.get(key) {
        None | Some(Value::Null) => return 0.0,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => {
            warn!("statistics field {key} is invalid, using 0");
            0.0
        }
    }
}

fn count_field(obj: &serde_json::Map<String, Value>, key: &str) -> u64 {
    number_field(obj, key).floor() as u64
}

fn string_set(obj: &serde_json::Map<String, Value>, key: &str) -> BTreeSet<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        None => BTreeSet::new(),
        Some(_) => {
            warn!("statistics field {key} is not a list, using empty");
            BTreeSet::new()
        }
    }
}

/// Stored achievements merged over the catalogue, so new entries appear for old players
fn achievements_field(obj: &serde_json::Map<String, Value>) -> Vec<Achievement> {
    let mut catalogue = achievement_catalogue();
    let Some(Value::Array(stored)) = obj.get("achievements") else {
        if obj.contains_key("achievements") {
            warn!("statistics achievements are not a list, using the catalogue");
        }
        return catalogue;
    };

    for entry in stored {
        let Some(id) = entry.get("id").and_then(Value::as_str) else {
            continue;
        };
        let Some(slot) = catalogue.iter_mut().find(|a| a.id == id) else {
            continue;
        };
        slot.unlocked = entry.get("unlocked").and_then(Value::as_bool).unwrap_or(false);
        slot.unlocked_at = entry
            .get("unlocked_at")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Local));
        if let Some(points) = entry.get("points") {
            slot.points = points.as_u64().unwrap_or(DEFAULT_ACHIEVEMENT_POINTS);
        }
    }
    catalogue
}

/// Key/value document store for statistics
#[derive(Debug)]
pub struct StatsDb {
    conn: Connection,
}

impl StatsDb {
    /// Opens the database in the state directory, creating it if needed
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("keyfall_stats.db"));
        Self::open(&db_path)
    }

    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }
        Self::init(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;
        Ok(StatsDb { conn })
    }

    pub fn get_document(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM documents WHERE key = ?1", [key], |row| row.get(0))
            .optional()
    }

    /// Reads both documents. Missing or malformed documents come back as defaults.
    pub fn load_book(&self) -> Result<StatsBook> {
        let stats = match self.get_document(STATS_KEY)? {
            Some(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => Statistics::from_json_value(&value),
                Err(e) => {
                    warn!("statistics document unreadable ({e}), starting fresh");
                    Statistics::default()
                }
            },
            None => Statistics::default(),
        };
        let daily = match self.get_document(DAILY_STATS_KEY)? {
            Some(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => DailyStats::from_json_value(&value),
                Err(e) => {
                    warn!("daily statistics unreadable ({e}), starting fresh");
                    DailyStats::default()
                }
            },
            None => DailyStats::default(),
        };
        Ok(StatsBook { stats, daily })
    }

    pub fn save_book(&mut self, book: &StatsBook) -> Result<()> {
        let stats = serde_json::to_string(&book.stats)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let daily = serde_json::to_string(&book.daily)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let tx = self.conn.transaction()?;
        for (key, value) in [(STATS_KEY, stats), (DAILY_STATS_KEY, daily)] {
            upsert_document(&tx, key, &value)?;
        }
        tx.commit()
    }
}

fn upsert_document(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO documents (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
        params![key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProgrammingLanguage, Theme};
    use crate::content::Mode;
    use chrono::TimeZone;
    use serde_json::json;

    fn create_test_db() -> StatsDb {
        StatsDb::open_in_memory().unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap()
    }

    fn run(score: u64, wpm: f64, accuracy: f64, words: u32) -> RunSummary {
        RunSummary {
            score,
            wpm,
            accuracy,
            words_typed: words,
            elapsed_secs: 30.0,
            mode: Mode::Words,
            theme: Theme::Dark,
            language: ProgrammingLanguage::Javascript,
            max_combo: 3,
            level: 1,
        }
    }

    fn ids_of(list: &[Achievement]) -> Vec<&str> {
        list.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_catalogue_is_complete() {
        let catalogue = achievement_catalogue();
        assert_eq!(catalogue.len(), 25);
        let unique: BTreeSet<_> = catalogue.iter().map(|a| a.id.clone()).collect();
        assert_eq!(unique.len(), 25);
        assert!(catalogue.iter().all(|a| !a.unlocked));
    }

    #[test]
    fn test_achievement_names() {
        assert_eq!(achievement_name(ids::COMBO_KING), Some("Combo King"));
        assert_eq!(achievement_name("nope"), None);
    }

    #[test]
    fn test_record_run_updates_totals() {
        let mut book = StatsBook::default();
        // a Wednesday afternoon
        let now = at(2024, 3, 13, 14);
        let unlocked = book.record_run(&run(450, 30.0, 90.0, 12), now);

        let s = &book.stats;
        assert_eq!(s.games_played, 1);
        assert_eq!(s.high_score, 450);
        assert_eq!(s.total_words_typed, 12);
        assert_eq!(s.current_streak, 1);
        assert_eq!(s.last_play_date, NaiveDate::from_ymd_opt(2024, 3, 13));
        assert_eq!(ids_of(&unlocked), vec![ids::FIRST_GAME]);
        // 450 / 10 + 10 for first game
        assert_eq!(s.progression_points, 55);
        assert_eq!(s.today.games, 1);
        assert_eq!(s.week.score, 450);
        assert!(s.modes_played.contains("words"));
    }

    #[test]
    fn test_bests_only_improve() {
        let mut book = StatsBook::default();
        let now = at(2024, 3, 13, 14);
        book.record_run(&run(500, 50.0, 97.0, 20), now);
        book.record_run(&run(100, 20.0, 80.0, 5), now);
        assert_eq!(book.stats.best_wpm, 50.0);
        assert_eq!(book.stats.best_accuracy, 97.0);
        assert_eq!(book.stats.high_score, 500);
        assert_eq!(book.stats.total_score, 600);
    }

    #[test]
    fn test_streaks() {
        let mut book = StatsBook::default();
        book.record_run(&run(10, 1.0, 50.0, 1), at(2024, 3, 11, 14));
        book.record_run(&run(10, 1.0, 50.0, 1), at(2024, 3, 11, 18));
        assert_eq!(book.stats.current_streak, 1);
        book.record_run(&run(10, 1.0, 50.0, 1), at(2024, 3, 12, 14));
        book.record_run(&run(10, 1.0, 50.0, 1), at(2024, 3, 13, 14));
        assert_eq!(book.stats.current_streak, 3);
        book.record_run(&run(10, 1.0, 50.0, 1), at(2024, 3, 20, 14));
        assert_eq!(book.stats.current_streak, 1);
        assert_eq!(book.stats.longest_streak, 3);
    }

    #[test]
    fn test_time_of_day_achievements() {
        let mut book = StatsBook::default();
        // Saturday night
        let unlocked = book.record_run(&run(10, 1.0, 50.0, 1), at(2024, 3, 16, 23));
        let got = ids_of(&unlocked);
        assert!(got.contains(&ids::NIGHT_OWL));
        assert!(got.contains(&ids::WEEKEND_WARRIOR));
        assert!(!got.contains(&ids::EARLY_BIRD));

        let unlocked = book.record_run(&run(10, 1.0, 50.0, 1), at(2024, 3, 18, 7));
        assert_eq!(ids_of(&unlocked), vec![ids::EARLY_BIRD]);
    }

    #[test]
    fn test_skill_achievements_unlock_once() {
        let mut book = StatsBook::default();
        let now = at(2024, 3, 13, 14);
        let unlocked = book.record_run(&run(1000, 105.0, 100.0, 50), now);
        let got = ids_of(&unlocked);
        for id in [
            ids::SPEED_DEMON,
            ids::SPEED_MASTER,
            ids::ACCURACY_MASTER,
            ids::ULTRA_ACCURACY,
            ids::PERFECTIONIST,
        ] {
            assert!(got.contains(&id), "{id} missing");
        }
        let again = book.record_run(&run(1000, 105.0, 100.0, 50), now);
        assert!(again.is_empty());
        assert!(book.stats.unlocked_at(ids::PERFECTIONIST).is_some());
    }

    #[test]
    fn test_collections_unlock_variety_achievements() {
        let mut book = StatsBook::default();
        let now = at(2024, 3, 13, 14);
        let themes = [Theme::Dark, Theme::Light, Theme::Neon, Theme::Retro];
        let languages = [
            ProgrammingLanguage::Javascript,
            ProgrammingLanguage::Python,
            ProgrammingLanguage::Java,
            ProgrammingLanguage::Cpp,
        ];
        let modes = [Mode::Letters, Mode::Words, Mode::Code, Mode::Speed, Mode::Mixed];
        let mut all = Vec::new();
        for i in 0..5 {
            let mut r = run(10, 1.0, 50.0, 1);
            r.theme = themes[i % 4];
            r.language = languages[i % 4];
            r.mode = modes[i];
            all.extend(book.record_run(&r, now));
        }
        let got = ids_of(&all);
        assert!(got.contains(&ids::THEME_COLLECTOR));
        assert!(got.contains(&ids::LANGUAGE_EXPLORER));
        assert!(got.contains(&ids::MULTI_MODE));
    }

    #[test]
    fn test_rank_progression() {
        assert_eq!(rank_for(0).name, "Novice");
        assert_eq!(rank_for(99).name, "Novice");
        assert_eq!(rank_for(100).name, "Apprentice");
        assert_eq!(rank_for(4999).name, "Divine");
        assert_eq!(rank_for(1_000_000).name, "Transcendent");

        let mut stats = Statistics {
            progression_points: 200,
            ..Statistics::default()
        };
        stats.update_rank();
        assert_eq!(stats.rank().name, "Apprentice");
        assert!((stats.progress_to_next_rank() - 0.5).abs() < 1e-9);

        stats.progression_points = 6000;
        stats.update_rank();
        assert_eq!(stats.progress_to_next_rank(), 1.0);
    }

    #[test]
    fn test_period_windows() {
        let mut daily = DailyStats::default();
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let one = PeriodTotals {
            games: 1,
            words: 10,
            time: 60.0,
            score: 100,
        };
        for days_ago in [0, 6, 7, 29, 30] {
            daily.record(today - chrono::Duration::days(days_ago), &one);
        }
        assert_eq!(daily.period(today, 7).games, 2);
        assert_eq!(daily.period(today, 30).games, 4);
        assert_eq!(daily.day(today).words, 10);
    }

    #[test]
    fn test_validation_replaces_bad_values() {
        let doc = json!({
            "games_played": -4,
            "best_wpm": "fast",
            "high_score": "120",
            "total_time_spent": 12.5,
            "themes_used": "dark",
            "modes_played": ["words", 7, "code"],
            "achievements": {"first_game": true},
            "current_streak": 3,
            "longest_streak": 1,
        });
        let stats = Statistics::from_json_value(&doc);
        assert_eq!(stats.games_played, 0);
        assert_eq!(stats.best_wpm, 0.0);
        assert_eq!(stats.high_score, 120);
        assert_eq!(stats.total_time_spent, 12.5);
        assert!(stats.themes_used.is_empty());
        assert_eq!(stats.modes_played.len(), 2);
        assert_eq!(stats.achievements, achievement_catalogue());
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.progression_level, 1);

        assert_eq!(Statistics::from_json_value(&json!([1, 2])), Statistics::default());
    }

    #[test]
    fn test_stored_achievements_merge_with_catalogue() {
        let doc = json!({
            "achievements": [
                {"id": "first_game", "unlocked": true, "points": 10},
                {"id": "retired_badge", "unlocked": true},
            ]
        });
        let stats = Statistics::from_json_value(&doc);
        assert_eq!(stats.achievements.len(), 25);
        assert!(stats.is_unlocked(ids::FIRST_GAME));
        assert_eq!(stats.unlocked_count(), 1);
    }

    #[test]
    fn test_periods_follow_the_calendar() {
        let mut book = StatsBook::default();
        book.record_run(&run(10, 1.0, 50.0, 1), at(2024, 3, 11, 14));
        assert_eq!(book.stats.today.games, 1);

        let later = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let [(_, today), (_, week), (_, month)] = book.periods(later);
        assert_eq!(today.games, 0);
        assert_eq!(week.games, 1);
        assert_eq!(month.games, 1);

        let [(_, _), (_, week), (_, month)] =
            book.periods(NaiveDate::from_ymd_opt(2024, 4, 20).unwrap());
        assert_eq!(week.games, 0);
        assert_eq!(month.games, 0);
    }

    #[test]
    fn test_daily_validation() {
        let doc = json!({
            "2024-03-01": {"games": 2, "words": 30, "time": 90.5, "score": 400},
            "yesterday": {"games": 1},
            "2024-03-02": {"games": "many"},
        });
        let daily = DailyStats::from_json_value(&doc);
        assert_eq!(daily.0.len(), 2);
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(daily.day(d).score, 400);
        assert_eq!(daily.day(d.succ_opt().unwrap()).games, 0);
        assert_eq!(DailyStats::from_json_value(&json!(3)), DailyStats::default());
    }

    #[test]
    fn test_db_roundtrip() {
        let mut db = create_test_db();
        assert_eq!(db.load_book().unwrap(), StatsBook::default());

        let now = at(2024, 3, 13, 14);
        let mut book = db.load_book().unwrap();
        let unlocked = book.record_run(&run(300, 42.0, 96.0, 15), now);
        assert!(ids_of(&unlocked).contains(&ids::ACCURACY_MASTER));
        db.save_book(&book).unwrap();

        let book = db.load_book().unwrap();
        assert_eq!(book.stats.games_played, 1);
        assert_eq!(book.stats.best_wpm, 42.0);
        assert!(book.stats.is_unlocked(ids::FIRST_GAME));
        assert_eq!(book.daily.0.len(), 1);
    }

    #[test]
    fn test_in_run_unlock_persists() {
        let mut db = create_test_db();
        let now = at(2024, 3, 13, 14);
        let mut book = db.load_book().unwrap();
        let first = book.stats.unlock(ids::COMBO_KING, now);
        assert_eq!(first.map(|a| a.points), Some(30));
        assert!(book.stats.unlock(ids::COMBO_KING, now).is_none());
        assert!(book.stats.unlock("no_such_thing", now).is_none());
        db.save_book(&book).unwrap();

        let book = db.load_book().unwrap();
        assert_eq!(book.stats.progression_points, 30);
    }

    #[test]
    fn test_corrupt_document_falls_back() {
        let db = create_test_db();
        upsert_document(&db.conn, STATS_KEY, "{not json").unwrap();
        upsert_document(&db.conn, DAILY_STATS_KEY, "[]").unwrap();
        let book = db.load_book().unwrap();
        assert_eq!(book, StatsBook::default());
    }

    #[test]
    fn test_documents_overwrite() {
        let db = create_test_db();
        assert_eq!(db.get_document("k").unwrap(), None);
        upsert_document(&db.conn, "k", "v").unwrap();
        upsert_document(&db.conn, "k", "w").unwrap();
        assert_eq!(db.get_document("k").unwrap().as_deref(), Some("w"));
    }
}
