use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use log::debug;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum KeyfallEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait KeyfallEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<KeyfallEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<KeyfallEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let sent = match event::read() {
                // key release events would double every keystroke on some terminals
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    tx.send(KeyfallEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => tx.send(KeyfallEvent::Resize),
                Ok(_) => Ok(()),
                Err(e) => {
                    debug!("terminal event reader stopped: {e}");
                    break;
                }
            };
            if sent.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyfallEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<KeyfallEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<KeyfallEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<KeyfallEvent>) -> Self {
        Self { rx }
    }
}

impl KeyfallEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<KeyfallEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time.
///
/// Ticks keep their cadence under heavy typing: a key that arrives mid-interval
/// does not push the next tick back.
pub struct Runner<E: KeyfallEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Instant,
}

impl<E: KeyfallEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Blocks until the next tick is due and returns the next event, or Tick on timeout
    pub fn step(&mut self) -> KeyfallEvent {
        let now = Instant::now();
        if now >= self.next_tick {
            self.schedule_next_tick(now);
            return KeyfallEvent::Tick;
        }

        match self.event_source.recv_timeout(self.next_tick - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                self.schedule_next_tick(Instant::now());
                KeyfallEvent::Tick
            }
        }
    }

    fn schedule_next_tick(&mut self, now: Instant) {
        self.next_tick += self.ticker.interval();
        // after a long stall, resume the cadence from now instead of bursting ticks
        if self.next_tick < now {
            self.next_tick = now + self.ticker.interval();
        }
    }
}
