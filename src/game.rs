use crate::config::{Difficulty, ProgrammingLanguage, Theme};
use crate::content::{ContentGenerator, ContentRequest, Mode};
use crate::falling::{item_speed, SLOT_MAX, SLOT_MIN};
use crate::matcher::{classify, find_exact, MatchKind};
use crate::scheduler::SpawnScheduler;
use crate::session::{GameSession, SessionConfig};
use crate::stats::achievement_ids;
use crate::time_series::record_per_second;
use log::{debug, info};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::collections::{HashSet, VecDeque};

/// Game tick cadence, roughly 60 per second
pub const TICK_RATE_MS: u64 = 16;
/// Runs shorter than this are not worth recording
pub const MIN_RECORDED_SECS: f64 = 5.0;
pub const COMBO_MILESTONE: u32 = 10;
pub const COMBO_KING_THRESHOLD: u32 = 20;
pub const KIDS_ACHIEVEMENT_WORDS: u32 = 20;

/// Things that happened during a tick or keystroke, for audio and particle adapters
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// `x` and `y` are fractions of the playfield
    ItemMatched { points: u64, x: f64, y: f64 },
    WrongInput,
    ItemExpired { x: f64 },
    ComboMilestone(u32),
    LevelUp(u32),
    AchievementEarned(&'static str),
    Encouragement(String),
    Paused,
    Resumed,
    RunEnded,
}

/// Result handed to the statistics store when a run finishes
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub score: u64,
    pub wpm: f64,
    pub accuracy: f64,
    pub words_typed: u32,
    pub elapsed_secs: f64,
    pub mode: Mode,
    pub theme: Theme,
    pub language: ProgrammingLanguage,
    pub max_combo: u32,
    pub level: u32,
}

impl RunSummary {
    pub fn should_persist(&self) -> bool {
        self.elapsed_secs > MIN_RECORDED_SECS
    }
}

/// The falling-word loop: spawning, ticking, matching and scoring for one run
pub struct Game<R: Rng = ThreadRng> {
    session: GameSession,
    scheduler: SpawnScheduler,
    generator: ContentGenerator<'static>,
    rng: R,
    events: VecDeque<GameEvent>,
    earned: HashSet<&'static str>,
}

impl Game<ThreadRng> {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_rng(config, rand::thread_rng())
    }
}

impl<R: Rng> Game<R> {
    pub fn with_rng(config: SessionConfig, rng: R) -> Self {
        Self::with_generator(config, rng, ContentGenerator::default())
    }

    pub fn with_generator(config: SessionConfig, rng: R, generator: ContentGenerator<'static>) -> Self {
        Self {
            session: GameSession::new(config),
            scheduler: SpawnScheduler::new(),
            generator,
            rng,
            events: VecDeque::new(),
            earned: HashSet::new(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.session.running
    }

    pub fn is_paused(&self) -> bool {
        self.session.paused
    }

    fn difficulty(&self) -> Difficulty {
        self.session.config.effective_difficulty()
    }

    pub fn start(&mut self) {
        self.session.running = true;
        self.session.paused = false;
        self.scheduler.arm(self.difficulty(), self.session.progress.level);
        info!(
            "run started: mode={} difficulty={}",
            self.session.config.mode,
            self.difficulty()
        );
        if self.session.config.mode.is_kids() {
            self.events
                .push_back(GameEvent::Encouragement("Ready to play? Let's go!".to_string()));
        }
    }

    /// Advances the run by one tick of `dt_ms`. Items move first, then the spawn timer runs.
    pub fn tick(&mut self, dt_ms: u64) {
        if !self.session.is_active() {
            return;
        }
        self.session.elapsed_secs += dt_ms as f64 / 1000.0;

        let floor = self.session.config.floor;
        let mut expired = Vec::new();
        for item in self.session.items_mut() {
            if item.advance(floor) {
                expired.push(item.horizontal_slot() / 100.0);
            }
        }
        for x in expired {
            debug!("item expired at x={x:.2}");
            self.session.progress.record_miss();
            self.events.push_back(GameEvent::ItemExpired { x });
        }
        self.session.prune();

        let wpm = self.session.wpm();
        let elapsed = self.session.elapsed_secs;
        record_per_second(&mut self.session.wpm_coords, elapsed, wpm);

        if self.scheduler.advance(dt_ms as f64) {
            self.spawn_item();
            self.scheduler.arm(self.difficulty(), self.session.progress.level);
        }
    }

    /// Draws new content and drops it at a random column. Returns the item id.
    pub fn spawn_item(&mut self) -> u64 {
        let config = &self.session.config;
        let level = self.session.progress.level;
        let request = ContentRequest {
            mode: config.mode,
            difficulty: config.effective_difficulty(),
            level,
            custom_words: &config.custom_words,
            language: config.language,
        };
        let text = self.generator.generate(&request, &mut self.rng);
        let slot = self.rng.gen_range(SLOT_MIN..SLOT_MAX);
        let speed = item_speed(request.difficulty, level);
        debug!("spawn {text:?} at {slot:.1}% speed {speed:.2}");
        self.session.spawn(text, slot, speed)
    }

    /// A printable keystroke
    pub fn type_char(&mut self, c: char) -> Option<MatchKind> {
        if !self.session.is_active() {
            return None;
        }
        self.session.buffer.push(c);
        self.session.progress.record_keystroke();

        let buffer = self.session.buffer.clone();
        let kind = classify(&buffer, self.session.items_mut());
        match kind {
            MatchKind::Complete(idx) => self.complete(idx),
            MatchKind::Wrong => self.wrong(),
            MatchKind::Partial(_) => {}
        }
        Some(kind)
    }

    /// Drops the last buffered character and refreshes highlighting only
    pub fn backspace(&mut self) {
        if !self.session.is_active() {
            return;
        }
        self.session.buffer.pop();
        let buffer = self.session.buffer.clone();
        classify(&buffer, self.session.items_mut());
    }

    /// Enter: the whole buffer must equal an item. The buffer is cleared either way.
    pub fn submit(&mut self) -> Option<MatchKind> {
        if !self.session.is_active() {
            return None;
        }
        let found = find_exact(&self.session.buffer, self.session.items());
        self.session.buffer.clear();
        for item in self.session.items_mut() {
            item.clear_prefix();
        }
        match found {
            Some(idx) => {
                self.complete(idx);
                Some(MatchKind::Complete(idx))
            }
            None => {
                self.wrong();
                Some(MatchKind::Wrong)
            }
        }
    }

    fn complete(&mut self, idx: usize) {
        let floor = self.session.config.floor;
        let Some(item) = self.session.items_mut().get_mut(idx) else {
            return;
        };
        let len = item.text().chars().count();
        let x = item.horizontal_slot() / 100.0;
        let y = (item.position() / floor).clamp(0.0, 1.0);
        item.mark_matched();

        let award = self.session.progress.record_match(len);
        self.session.buffer.clear();
        for item in self.session.items_mut() {
            item.clear_prefix();
        }
        self.session.prune();
        self.events.push_back(GameEvent::ItemMatched {
            points: award.points,
            x,
            y,
        });

        let mode = self.session.config.mode;
        if mode.is_kids() {
            let cheer = self.generator.encouragement(mode, &mut self.rng);
            self.events.push_back(GameEvent::Encouragement(cheer));
            self.check_kids_achievements(mode);
        }

        if award.combo >= COMBO_MILESTONE && award.combo % COMBO_MILESTONE == 0 {
            self.events.push_back(GameEvent::ComboMilestone(award.combo));
        }
        if let Some(level) = award.level_up {
            debug!("level up to {level}");
            self.events.push_back(GameEvent::LevelUp(level));
        }
        if award.combo >= COMBO_KING_THRESHOLD {
            self.earn(achievement_ids::COMBO_KING);
        }
    }

    fn check_kids_achievements(&mut self, mode: Mode) {
        let words = self.session.progress.words_typed;
        if words == 1 {
            self.earn(achievement_ids::LITTLE_LEARNER);
        }
        if words >= KIDS_ACHIEVEMENT_WORDS {
            match mode {
                Mode::Princess => self.earn(achievement_ids::PRINCESS_POWER),
                Mode::Dino => self.earn(achievement_ids::DINO_CHAMPION),
                Mode::Numbers => self.earn(achievement_ids::NUMBER_WIZARD),
                _ => {}
            }
        }
    }

    fn earn(&mut self, id: &'static str) {
        if self.earned.insert(id) {
            self.events.push_back(GameEvent::AchievementEarned(id));
        }
    }

    fn wrong(&mut self) {
        self.session.progress.record_miss();
        self.events.push_back(GameEvent::WrongInput);
    }

    pub fn pause(&mut self) {
        if !self.session.running || self.session.paused {
            return;
        }
        self.session.paused = true;
        self.scheduler.cancel();
        self.events.push_back(GameEvent::Paused);
    }

    /// Spawning restarts from a full interval; time spent paused is not credited
    pub fn resume(&mut self) {
        if !self.session.running || !self.session.paused {
            return;
        }
        self.session.paused = false;
        self.scheduler.arm(self.difficulty(), self.session.progress.level);
        self.events.push_back(GameEvent::Resumed);
    }

    pub fn toggle_pause(&mut self) {
        if self.session.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Ends the run. The spawn timer is stopped before any item is torn down.
    pub fn shutdown(&mut self) -> RunSummary {
        self.scheduler.cancel();
        let was_running = self.session.running;
        self.session.running = false;
        self.session.paused = false;
        let cleared = self.session.clear_items();
        self.session.buffer.clear();

        let summary = self.summary();
        if was_running {
            info!(
                "run ended: score={} words={} wpm={:.1} accuracy={:.1} elapsed={:.1}s cleared={}",
                summary.score,
                summary.words_typed,
                summary.wpm,
                summary.accuracy,
                summary.elapsed_secs,
                cleared
            );
            self.events.push_back(GameEvent::RunEnded);
        }
        summary
    }

    /// Ends the current run and starts a fresh one with the same settings
    pub fn restart(&mut self) -> RunSummary {
        let summary = self.shutdown();
        let config = self.session.config.clone();
        self.session = GameSession::new(config);
        self.earned.clear();
        self.start();
        summary
    }

    pub fn summary(&self) -> RunSummary {
        let s = &self.session;
        RunSummary {
            score: s.progress.score,
            wpm: s.wpm(),
            accuracy: s.accuracy(),
            words_typed: s.progress.words_typed,
            elapsed_secs: s.elapsed_secs,
            mode: s.config.mode,
            theme: s.config.theme,
            language: s.config.language,
            max_combo: s.progress.max_combo,
            level: s.progress.level,
        }
    }

    pub fn drain_events(&mut self) -> std::collections::vec_deque::Drain<'_, GameEvent> {
        self.events.drain(..)
    }
}
