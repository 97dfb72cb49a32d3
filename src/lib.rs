// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod content;
pub mod falling;
pub mod feedback;
pub mod game;
pub mod matcher;
pub mod progression;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod time_series;

pub use game::{Game, GameEvent, RunSummary, TICK_RATE_MS};
pub use session::SessionConfig;
