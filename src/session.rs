use crate::config::{Difficulty, ProgrammingLanguage, Theme};
use crate::content::Mode;
use crate::falling::{FallingItem, ItemState};
use crate::progression::Progress;
use crate::time_series::TimeSeriesPoint;

/// Position at which an item counts as missed
pub const DEFAULT_FLOOR: f64 = 600.0;

/// Everything a run is started with
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub theme: Theme,
    pub language: ProgrammingLanguage,
    pub custom_words: Vec<String>,
    pub floor: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            difficulty: Difficulty::default(),
            theme: Theme::default(),
            language: ProgrammingLanguage::default(),
            custom_words: Vec::new(),
            floor: DEFAULT_FLOOR,
        }
    }
}

impl SessionConfig {
    /// Kids modes always play on easy
    pub fn effective_difficulty(&self) -> Difficulty {
        if self.mode.is_kids() {
            Difficulty::Easy
        } else {
            self.difficulty
        }
    }
}

/// Per-run state, owned by one game
#[derive(Debug, Clone)]
pub struct GameSession {
    pub config: SessionConfig,
    pub progress: Progress,
    pub buffer: String,
    items: Vec<FallingItem>,
    pub elapsed_secs: f64,
    pub running: bool,
    pub paused: bool,
    next_id: u64,
    pub wpm_coords: Vec<TimeSeriesPoint>,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            progress: Progress::default(),
            buffer: String::new(),
            items: Vec::new(),
            elapsed_secs: 0.0,
            running: false,
            paused: false,
            next_id: 0,
            wpm_coords: Vec::new(),
        }
    }

    /// Items still on screen, in spawn order
    pub fn items(&self) -> &[FallingItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [FallingItem] {
        &mut self.items
    }

    /// Adds a new item and sets it falling. Returns its id.
    pub fn spawn(&mut self, text: impl Into<String>, slot: f64, speed: f64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let mut item = FallingItem::new(id, text, slot, speed);
        item.start_falling();
        self.items.push(item);
        id
    }

    /// Drops every item that has reached a terminal state
    pub fn prune(&mut self) {
        self.items.retain(FallingItem::is_active);
    }

    /// Tears down every live item without scoring. Returns how many were cleared.
    pub fn clear_items(&mut self) -> usize {
        let mut cleared = 0;
        for item in self.items.iter_mut().filter(|i| i.is_active()) {
            item.mark_cleared();
            cleared += 1;
        }
        debug_assert!(self.items.iter().all(|i| i.state() != ItemState::Falling));
        self.items.clear();
        cleared
    }

    pub fn wpm(&self) -> f64 {
        self.progress.wpm(self.elapsed_secs)
    }

    pub fn accuracy(&self) -> f64 {
        self.progress.accuracy()
    }

    pub fn is_active(&self) -> bool {
        self.running && !self.paused
    }
}
