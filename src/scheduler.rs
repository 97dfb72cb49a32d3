use crate::config::Difficulty;

pub const BASE_SPAWN_DELAY_MS: f64 = 2000.0;
/// Spawn interval never drops below this share of the base delay
pub const MIN_LEVEL_SPEED_UP: f64 = 0.3;

pub fn level_speed_up(level: u32) -> f64 {
    (1.0 - f64::from(level.max(1) - 1) * 0.1).max(MIN_LEVEL_SPEED_UP)
}

pub fn spawn_delay_ms(difficulty: Difficulty, level: u32) -> f64 {
    BASE_SPAWN_DELAY_MS * difficulty.spawn_multiplier() * level_speed_up(level)
}

/// Self-rearming spawn timer driven by the game tick.
///
/// The timer fires at most once per arm. Cancelling is idempotent and drops any
/// partially elapsed delay, so re-arming always starts a full interval.
#[derive(Debug, Default, Clone)]
pub struct SpawnScheduler {
    remaining_ms: Option<f64>,
    fired: u64,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, difficulty: Difficulty, level: u32) {
        self.remaining_ms = Some(spawn_delay_ms(difficulty, level));
    }

    pub fn cancel(&mut self) {
        self.remaining_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining_ms.is_some()
    }

    pub fn remaining_ms(&self) -> Option<f64> {
        self.remaining_ms
    }

    /// Number of times the timer has fired since creation
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Lets `elapsed_ms` pass. Returns true when the delay ran out, in which case
    /// the scheduler is disarmed until the caller re-arms it.
    pub fn advance(&mut self, elapsed_ms: f64) -> bool {
        let Some(remaining) = self.remaining_ms.as_mut() else {
            return false;
        };
        *remaining -= elapsed_ms;
        if *remaining <= 0.0 {
            self.remaining_ms = None;
            self.fired += 1;
            true
        } else {
            false
        }
    }
}
