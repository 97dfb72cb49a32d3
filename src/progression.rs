/// Words needed per level
pub const WORDS_PER_LEVEL: u32 = 10;
pub const MAX_COMBO_MULTIPLIER: f64 = 3.0;
/// Combo length at which the counter appears on screen
pub const COMBO_DISPLAY_THRESHOLD: u32 = 5;

/// Points and level change produced by one completed item
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Award {
    pub points: u64,
    pub combo: u32,
    pub level_up: Option<u32>,
}

/// Score, combo, level and the counters the rates are derived from
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub level: u32,
    pub words_typed: u32,
    pub correct_inputs: u32,
    pub total_inputs: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            level: 1,
            words_typed: 0,
            correct_inputs: 0,
            total_inputs: 0,
        }
    }
}

impl Progress {
    pub fn record_keystroke(&mut self) {
        self.total_inputs += 1;
    }

    /// Scores a completed item of `len` characters. The multiplier uses the combo
    /// held before this match.
    pub fn record_match(&mut self, len: usize) -> Award {
        let points = points_for(len, self.combo, self.level);

        self.correct_inputs += 1;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.words_typed += 1;
        self.score += points;

        let new_level = level_for(self.words_typed);
        let level_up = if new_level > self.level {
            self.level = new_level;
            Some(new_level)
        } else {
            None
        };

        Award {
            points,
            combo: self.combo,
            level_up,
        }
    }

    /// Wrong input or an item reaching the floor
    pub fn record_miss(&mut self) -> bool {
        let had_combo = self.combo > 0;
        self.combo = 0;
        had_combo
    }

    pub fn wpm(&self, elapsed_secs: f64) -> f64 {
        wpm(self.words_typed, elapsed_secs)
    }

    pub fn accuracy(&self) -> f64 {
        accuracy(self.correct_inputs, self.total_inputs)
    }

    pub fn show_combo(&self) -> bool {
        self.combo >= COMBO_DISPLAY_THRESHOLD
    }
}

pub fn combo_multiplier(combo: u32) -> f64 {
    (f64::from(combo) * 0.1 + 1.0).min(MAX_COMBO_MULTIPLIER)
}

pub fn level_multiplier(level: u32) -> f64 {
    f64::from(level) * 0.5 + 1.0
}

pub fn points_for(len: usize, combo: u32, level: u32) -> u64 {
    (len as f64 * 10.0 * combo_multiplier(combo) * level_multiplier(level)).round() as u64
}

pub fn level_for(words_typed: u32) -> u32 {
    words_typed / WORDS_PER_LEVEL + 1
}

pub fn wpm(words_typed: u32, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 || !elapsed_secs.is_finite() {
        return 0.0;
    }
    f64::from(words_typed) / elapsed_secs * 60.0
}

pub fn accuracy(correct_inputs: u32, total_inputs: u32) -> f64 {
    if total_inputs == 0 {
        return 100.0;
    }
    f64::from(correct_inputs) / f64::from(total_inputs) * 100.0
}
