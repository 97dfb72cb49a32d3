use crate::feedback::FeedbackSink;
use crate::game::GameEvent;
use crate::stats::achievement_name;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// How long the playfield shakes after a wrong key, in seconds
pub const SHAKE_SECS: f64 = 0.5;
/// How long a banner message stays up, in seconds
pub const BANNER_SECS: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BurstKind {
    Success,
    Combo,
    LevelUp,
    Achievement,
}

impl BurstKind {
    pub fn count(self) -> usize {
        match self {
            BurstKind::Success => 8,
            BurstKind::Combo => 15,
            BurstKind::LevelUp => 20,
            BurstKind::Achievement => 12,
        }
    }

    fn symbols(self) -> &'static [char] {
        match self {
            BurstKind::Success => &['*', '+', '.', '✓'],
            BurstKind::Combo => &['✦', '*', '◆'],
            BurstKind::LevelUp => &['★', '☆', '*'],
            BurstKind::Achievement => &['✨', '★', '◆'],
        }
    }
}

/// One spark, in playfield fractions. `x` and `y` run from 0 to 1.
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub kind: BurstKind,
    pub age: f64,
    pub max_age: f64,
}

impl Particle {
    fn new<R: Rng + ?Sized>(x: f64, y: f64, kind: BurstKind, rng: &mut R) -> Self {
        Self {
            x: x + rng.gen_range(-0.04..0.04),
            y: y + rng.gen_range(-0.04..0.04),
            vel_x: rng.gen_range(-0.3..0.3),
            vel_y: rng.gen_range(-0.5..-0.1),
            symbol: *kind.symbols().choose(rng).unwrap_or(&'*'),
            kind,
            age: 0.0,
            max_age: rng.gen_range(0.6..1.2),
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += 1.2 * dt;
        self.age += dt;
        self.age < self.max_age
    }

    pub fn on_screen(&self) -> bool {
        (0.0..1.0).contains(&self.x) && (0.0..1.0).contains(&self.y)
    }
}

/// Short-lived sparks and screen shake driven by game events
#[derive(Debug, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    enabled: bool,
    shake_remaining: f64,
}

impl ParticleSystem {
    pub fn new(enabled: bool) -> Self {
        Self {
            particles: Vec::new(),
            enabled,
            shake_remaining: 0.0,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.particles.clear();
            self.shake_remaining = 0.0;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_active(&self) -> bool {
        !self.particles.is_empty() || self.shake_remaining > 0.0
    }

    pub fn burst(&mut self, x: f64, y: f64, kind: BurstKind) {
        self.burst_with(x, y, kind, &mut rand::thread_rng());
    }

    pub fn burst_with<R: Rng + ?Sized>(&mut self, x: f64, y: f64, kind: BurstKind, rng: &mut R) {
        if !self.enabled {
            return;
        }
        for _ in 0..kind.count() {
            self.particles.push(Particle::new(x, y, kind, rng));
        }
    }

    /// Horizontal jitter for the playfield, in columns
    pub fn shake_offset(&self) -> i16 {
        if self.shake_remaining <= 0.0 {
            return 0;
        }
        // alternate sides every 50ms
        if ((self.shake_remaining * 20.0) as i64) % 2 == 0 {
            1
        } else {
            -1
        }
    }

    pub fn update(&mut self, dt: f64) {
        self.shake_remaining = (self.shake_remaining - dt).max(0.0);
        self.particles.retain_mut(|p| p.update(dt) && p.y < 1.2);
    }
}

impl FeedbackSink for ParticleSystem {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ItemMatched { x, y, .. } => self.burst(*x, *y, BurstKind::Success),
            GameEvent::ComboMilestone(_) => self.burst(0.5, 0.5, BurstKind::Combo),
            GameEvent::LevelUp(_) => self.burst(0.5, 0.1, BurstKind::LevelUp),
            GameEvent::AchievementEarned(_) => self.burst(0.9, 0.05, BurstKind::Achievement),
            GameEvent::WrongInput => {
                if self.enabled {
                    self.shake_remaining = SHAKE_SECS;
                }
            }
            GameEvent::RunEnded => self.particles.clear(),
            _ => {}
        }
    }
}

/// Timed text overlays: encouragement, level ups, unlocked achievements
#[derive(Debug, Default)]
pub struct Banners {
    queue: VecDeque<(String, f64)>,
}

impl Banners {
    pub fn push(&mut self, text: impl Into<String>) {
        self.queue.push_back((text.into(), BANNER_SECS));
    }

    /// Message currently on screen
    pub fn current(&self) -> Option<&str> {
        self.queue.front().map(|(text, _)| text.as_str())
    }

    pub fn update(&mut self, dt: f64) {
        if let Some((_, remaining)) = self.queue.front_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.queue.pop_front();
            }
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl FeedbackSink for Banners {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Encouragement(msg) => self.push(msg.clone()),
            GameEvent::LevelUp(level) => self.push(format!("Level {level}!")),
            GameEvent::ComboMilestone(combo) => self.push(format!("{combo}x combo!")),
            GameEvent::AchievementEarned(id) => {
                let name = achievement_name(id).unwrap_or(id);
                self.push(format!("Achievement unlocked: {name}"))
            }
            GameEvent::RunEnded => self.clear(),
            _ => {}
        }
    }
}
