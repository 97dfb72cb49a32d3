use crate::game::GameEvent;
use log::debug;
use std::io::Write;

/// Receives game events for cosmetic output. Implementations must not affect gameplay.
pub trait FeedbackSink {
    fn on_event(&mut self, event: &GameEvent);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCue {
    Correct,
    Wrong,
    Combo,
    LevelUp,
    GameOver,
}

impl AudioCue {
    pub fn for_event(event: &GameEvent) -> Option<AudioCue> {
        match event {
            GameEvent::ItemMatched { .. } => Some(AudioCue::Correct),
            GameEvent::WrongInput => Some(AudioCue::Wrong),
            GameEvent::ComboMilestone(_) => Some(AudioCue::Combo),
            GameEvent::LevelUp(_) => Some(AudioCue::LevelUp),
            GameEvent::RunEnded => Some(AudioCue::GameOver),
            _ => None,
        }
    }

    /// A terminal can only beep, so routine hits stay silent
    pub fn rings_bell(self) -> bool {
        !matches!(self, AudioCue::Correct)
    }
}

/// Audio through the terminal bell
pub struct BellSink<W: Write> {
    out: W,
    enabled: bool,
    rung: usize,
}

impl<W: Write> BellSink<W> {
    pub fn new(out: W, enabled: bool) -> Self {
        Self {
            out,
            enabled,
            rung: 0,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn rung(&self) -> usize {
        self.rung
    }

    fn ring(&mut self) {
        let result = self.out.write_all(b"\x07").and_then(|_| self.out.flush());
        match result {
            Ok(()) => self.rung += 1,
            Err(e) => debug!("bell failed: {e}"),
        }
    }
}

impl<W: Write> FeedbackSink for BellSink<W> {
    fn on_event(&mut self, event: &GameEvent) {
        if !self.enabled {
            return;
        }
        if let Some(cue) = AudioCue::for_event(event) {
            if cue.rings_bell() {
                self.ring();
            }
        }
    }
}

/// Fans one event out to every registered sink
#[derive(Default)]
pub struct FeedbackHub {
    sinks: Vec<Box<dyn FeedbackSink>>,
}

impl FeedbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sink: Box<dyn FeedbackSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn dispatch<'a>(&mut self, events: impl IntoIterator<Item = &'a GameEvent>) {
        for event in events {
            for sink in self.sinks.iter_mut() {
                sink.on_event(event);
            }
        }
    }
}
