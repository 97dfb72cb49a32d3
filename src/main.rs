mod ui;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keyfall::{
    app_dirs::AppDirs,
    celebration::{Banners, ParticleSystem},
    config::{ConfigStore, Difficulty, FileConfigStore, ProgrammingLanguage, Settings, Theme},
    content::Mode,
    feedback::{BellSink, FeedbackHub, FeedbackSink},
    runtime::{CrosstermEventSource, FixedTicker, KeyfallEvent, Runner},
    session::{SessionConfig, DEFAULT_FLOOR},
    stats::{Achievement, StatsBook, StatsDb},
    Game, GameEvent, RunSummary, TICK_RATE_MS,
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    fs::{self, OpenOptions},
    io::{self, stdin, Write},
    time::Duration,
};

/// falling-word typing arcade for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Words, letters and code snippets fall down the screen; type them before they land. Combos multiply your score, every ten words is a new level, and your bests, streaks and achievements are kept between runs."
)]
pub struct Cli {
    /// mode to preselect in the menu
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// difficulty for this session (kids modes always play easy)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// colour theme for this session
    #[clap(short = 't', long, value_enum)]
    theme: Option<Theme>,

    /// language used by the code and programming modes
    #[clap(short = 'l', long, value_enum)]
    language: Option<ProgrammingLanguage>,

    /// silence the terminal bell
    #[clap(long)]
    mute: bool,

    /// disable particle bursts and screen shake
    #[clap(long)]
    no_particles: bool,

    /// add a word to the saved custom word list (repeatable)
    #[clap(long = "add-word", value_name = "WORD")]
    add_word: Vec<String>,

    /// remove a word from the saved custom word list (repeatable)
    #[clap(long = "remove-word", value_name = "WORD")]
    remove_word: Vec<String>,

    /// print lifetime statistics and exit
    #[clap(long)]
    stats: bool,
}

impl Cli {
    /// Applies the persistent word list edits, reporting rejected words to `err`.
    /// Returns true if the list changed.
    fn apply_word_edits(&self, settings: &mut Settings, err: &mut impl Write) -> bool {
        let mut changed = false;
        for word in &self.add_word {
            if settings.add_custom_word(word) {
                changed = true;
            } else {
                warn!("custom word {word:?} rejected");
                let _ = writeln!(
                    err,
                    "keyfall: {word:?} was not added (letters, digits, spaces and .,!?- only; no duplicates; at most 100 words)"
                );
            }
        }
        for word in &self.remove_word {
            changed |= settings.remove_custom_word(word);
        }
        changed
    }

    /// Session-only overrides on top of the saved settings
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(difficulty) = self.difficulty {
            settings.difficulty = difficulty;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(language) = self.language {
            settings.language = language;
        }
        if self.mute {
            settings.sound_enabled = false;
        }
        if self.no_particles {
            settings.particles_enabled = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Playing,
    Results,
    Stats,
}

#[derive(Debug, Default)]
pub struct MenuState {
    pub selected: usize,
}

impl MenuState {
    fn for_mode(mode: Mode) -> Self {
        Self {
            selected: Mode::ALL.iter().position(|m| *m == mode).unwrap_or(0),
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::ALL[self.selected % Mode::ALL.len()]
    }

    fn up(&mut self) {
        self.selected = (self.selected + Mode::ALL.len() - 1) % Mode::ALL.len();
    }

    fn down(&mut self) {
        self.selected = (self.selected + 1) % Mode::ALL.len();
    }
}

pub struct App {
    pub settings: Settings,
    config_store: Box<dyn ConfigStore>,
    stats_db: Option<StatsDb>,
    pub book: StatsBook,
    pub state: AppState,
    stats_return: AppState,
    pub menu: MenuState,
    pub game: Game,
    pub particles: ParticleSystem,
    pub banners: Banners,
    audio: FeedbackHub,
    pub last_run: Option<RunSummary>,
    pub last_unlocked: Vec<Achievement>,
}

fn audio_hub(settings: &Settings) -> FeedbackHub {
    let mut hub = FeedbackHub::new();
    if settings.sound_enabled {
        hub.add(Box::new(BellSink::new(io::stdout(), true)));
    }
    hub
}

/// Next variant in declaration order, wrapping around
fn cycle<T: ValueEnum + PartialEq + Copy>(current: T) -> T {
    let variants = T::value_variants();
    let idx = variants.iter().position(|v| *v == current).unwrap_or(0);
    variants[(idx + 1) % variants.len()]
}

impl App {
    pub fn new(
        settings: Settings,
        config_store: Box<dyn ConfigStore>,
        stats_db: Option<StatsDb>,
        mode: Mode,
    ) -> Self {
        let book = match stats_db.as_ref().map(StatsDb::load_book) {
            Some(Ok(book)) => book,
            Some(Err(e)) => {
                warn!("could not load statistics: {e}");
                StatsBook::default()
            }
            None => StatsBook::default(),
        };
        let menu = MenuState::for_mode(mode);
        let config = session_config(&settings, mode);

        Self {
            particles: ParticleSystem::new(settings.particles_active()),
            audio: audio_hub(&settings),
            settings,
            config_store,
            stats_db,
            book,
            state: AppState::Menu,
            stats_return: AppState::Menu,
            menu,
            game: Game::new(config),
            banners: Banners::default(),
            last_run: None,
            last_unlocked: Vec::new(),
        }
    }

    pub fn start_run(&mut self) {
        let config = session_config(&self.settings, self.menu.mode());
        self.game = Game::new(config);
        self.game.start();
        self.particles.set_enabled(self.settings.particles_active());
        self.banners.clear();
        self.last_unlocked.clear();
        self.state = AppState::Playing;
        self.dispatch_events();
    }

    /// Stops the current run, records it and shows the results
    pub fn end_run(&mut self) {
        let summary = self.game.shutdown();
        self.dispatch_events();
        self.record(&summary);
        self.last_run = Some(summary);
        self.state = AppState::Results;
    }

    fn restart_run(&mut self) {
        let summary = self.game.restart();
        self.record(&summary);
        self.particles.set_enabled(self.settings.particles_active());
        self.dispatch_events();
    }

    fn record(&mut self, summary: &RunSummary) {
        if !summary.should_persist() {
            info!("run too short to record ({:.1}s)", summary.elapsed_secs);
            return;
        }
        let unlocked = self.book.record_run(summary, Local::now());
        self.last_unlocked.extend(unlocked);
        self.save_book();
    }

    fn save_book(&mut self) {
        if !self.settings.auto_save {
            return;
        }
        if let Some(db) = self.stats_db.as_mut() {
            if let Err(e) = db.save_book(&self.book) {
                warn!("could not save statistics: {e}");
            }
        }
    }

    pub fn on_tick(&mut self, dt_ms: u64) {
        if self.state == AppState::Playing {
            self.game.tick(dt_ms);
            self.dispatch_events();
        }
        let dt = dt_ms as f64 / 1000.0;
        self.particles.update(dt);
        self.banners.update(dt);
    }

    /// Whether the screen changes between ticks without input
    pub fn is_animating(&self) -> bool {
        self.state == AppState::Playing || self.particles.is_active() || self.banners.current().is_some()
    }

    fn dispatch_events(&mut self) {
        let events: Vec<GameEvent> = self.game.drain_events().collect();
        for event in &events {
            self.particles.on_event(event);
            self.banners.on_event(event);
            if let GameEvent::AchievementEarned(id) = event {
                if let Some(achievement) = self.book.stats.unlock(id, Local::now()) {
                    self.last_unlocked.push(achievement);
                    self.save_book();
                }
            }
        }
        self.audio.dispatch(&events);
    }

    fn save_settings(&mut self) {
        self.particles.set_enabled(self.settings.particles_active());
        self.audio = audio_hub(&self.settings);
        if let Err(e) = self.config_store.save(&self.settings) {
            warn!("could not save settings: {e}");
        }
    }

    fn show_stats(&mut self) {
        self.stats_return = self.state;
        self.state = AppState::Stats;
    }

    /// Ends any run in progress so it is recorded before exit
    pub fn quit(&mut self) {
        if self.state == AppState::Playing {
            self.end_run();
        }
    }

    /// Returns true when the app should exit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return true;
        }

        match self.state {
            AppState::Menu => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.menu.up(),
                KeyCode::Down | KeyCode::Char('j') => self.menu.down(),
                KeyCode::Enter => self.start_run(),
                KeyCode::Char('d') => {
                    self.settings.difficulty = cycle(self.settings.difficulty);
                    self.save_settings();
                }
                KeyCode::Char('t') => {
                    self.settings.theme = cycle(self.settings.theme);
                    self.save_settings();
                }
                KeyCode::Char('l') => {
                    self.settings.language = cycle(self.settings.language);
                    self.save_settings();
                }
                KeyCode::Char('m') => {
                    self.settings.sound_enabled = !self.settings.sound_enabled;
                    self.save_settings();
                }
                KeyCode::Char('p') => {
                    self.settings.particles_enabled = !self.settings.particles_enabled;
                    self.save_settings();
                }
                KeyCode::Char('c') => {
                    self.settings.show_combo = !self.settings.show_combo;
                    self.save_settings();
                }
                KeyCode::Char('h') => {
                    self.settings.accessibility.high_contrast =
                        !self.settings.accessibility.high_contrast;
                    self.save_settings();
                }
                KeyCode::Char('s') => self.show_stats(),
                KeyCode::Char('q') | KeyCode::Esc => return true,
                _ => {}
            },
            AppState::Playing if self.game.is_paused() => match key.code {
                KeyCode::Esc => {
                    self.game.resume();
                    self.dispatch_events();
                }
                KeyCode::Char('r') => self.restart_run(),
                KeyCode::Char('q') => self.end_run(),
                _ => {}
            },
            AppState::Playing => {
                match key.code {
                    KeyCode::Esc => {
                        self.game.pause();
                    }
                    KeyCode::Backspace => self.game.backspace(),
                    KeyCode::Enter => {
                        self.game.submit();
                    }
                    KeyCode::Char(c) if !is_chord(&key) => {
                        self.game.type_char(c);
                    }
                    _ => {}
                }
                self.dispatch_events();
            }
            AppState::Results => match key.code {
                KeyCode::Char('r') | KeyCode::Enter => self.start_run(),
                KeyCode::Char('m') | KeyCode::Esc => self.state = AppState::Menu,
                KeyCode::Char('s') => self.show_stats(),
                KeyCode::Char('q') => return true,
                _ => {}
            },
            AppState::Stats => match key.code {
                KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => {
                    self.state = self.stats_return;
                }
                KeyCode::Char('q') => return true,
                _ => {}
            },
        }
        false
    }
}

/// Ctrl, Alt and Super combinations are shortcuts, not typing. Shift still types.
fn is_chord(key: &KeyEvent) -> bool {
    key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

fn session_config(settings: &Settings, mode: Mode) -> SessionConfig {
    SessionConfig {
        mode,
        difficulty: settings.difficulty,
        theme: settings.theme,
        language: settings.language,
        custom_words: settings.custom_words.clone(),
        floor: DEFAULT_FLOOR,
    }
}

/// Plain-text statistics for `--stats`
fn stats_report(book: &StatsBook, today: NaiveDate) -> String {
    let s = &book.stats;
    let rank = s.rank();
    let mut out = String::new();
    out.push_str(&format!(
        "rank        {} (level {}, {} pts, {:.0}% to next)\n",
        rank.name,
        rank.level,
        s.progression_points,
        s.progress_to_next_rank() * 100.0
    ));
    out.push_str(&format!("games       {}\n", s.games_played));
    out.push_str(&format!("high score  {}\n", s.high_score));
    out.push_str(&format!("best wpm    {:.1}\n", s.best_wpm));
    out.push_str(&format!("best acc    {:.1}%\n", s.best_accuracy));
    out.push_str(&format!("words       {}\n", s.total_words_typed));
    out.push_str(&format!("time        {:.0}s\n", s.total_time_spent));
    out.push_str(&format!(
        "streak      {} days (longest {})\n",
        s.current_streak, s.longest_streak
    ));
    for (label, totals) in book.periods(today) {
        out.push_str(&format!(
            "{label:<11} {} games, {} words, {} pts\n",
            totals.games, totals.words, totals.score
        ));
    }
    out.push_str(&format!(
        "achievements {}/{}\n",
        s.unlocked_count(),
        s.achievements.len()
    ));
    out
}

/// Logs go to a file; the terminal belongs to the UI
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn open_stats_db() -> Option<StatsDb> {
    match StatsDb::new() {
        Ok(db) => Some(db),
        Err(e) => {
            warn!("statistics unavailable: {e}");
            None
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let store = FileConfigStore::new();
    let mut settings = store.load();
    if cli.apply_word_edits(&mut settings, &mut io::stderr()) {
        store
            .save(&settings)
            .with_context(|| format!("saving custom words to {}", store.path().display()))?;
    }

    let stats_db = open_stats_db();

    if cli.stats {
        let book = match &stats_db {
            Some(db) => db.load_book().context("reading statistics")?,
            None => StatsBook::default(),
        };
        print!("{}", stats_report(&book, Local::now().date_naive()));
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    cli.apply_overrides(&mut settings);
    let mut app = App::new(
        settings,
        Box::new(store),
        stats_db,
        cli.mode.unwrap_or_default(),
    );

    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            KeyfallEvent::Tick => {
                let animating = app.is_animating();
                app.on_tick(TICK_RATE_MS);
                if animating {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            KeyfallEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            KeyfallEvent::Key(key) => {
                if app.handle_key(key) {
                    app.quit();
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    ui::screen::current_screen(&app.state).render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use keyfall::stats::achievement_ids;
    use ratatui::{backend::TestBackend, Terminal};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct MemoryStore(Rc<RefCell<Option<Settings>>>);

    impl ConfigStore for MemoryStore {
        fn load(&self) -> Settings {
            self.0.borrow().clone().unwrap_or_default()
        }

        fn save(&self, settings: &Settings) -> io::Result<()> {
            *self.0.borrow_mut() = Some(settings.clone());
            Ok(())
        }
    }

    fn quiet_settings() -> Settings {
        Settings {
            sound_enabled: false,
            ..Settings::default()
        }
    }

    fn test_app() -> App {
        App::new(
            quiet_settings(),
            Box::new(MemoryStore::default()),
            StatsDb::open_in_memory().ok(),
            Mode::Words,
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["keyfall"]);
        assert_eq!(cli.mode, None);
        assert_eq!(cli.difficulty, None);
        assert!(!cli.mute);
        assert!(!cli.no_particles);
        assert!(!cli.stats);
        assert!(cli.add_word.is_empty());
    }

    #[test]
    fn test_cli_parses_enums() {
        let cli = Cli::parse_from([
            "keyfall", "-m", "dino", "-d", "insane", "-t", "neon", "-l", "cpp", "--mute",
        ]);
        assert_eq!(cli.mode, Some(Mode::Dino));
        assert_eq!(cli.difficulty, Some(Difficulty::Insane));
        assert_eq!(cli.theme, Some(Theme::Neon));
        assert_eq!(cli.language, Some(ProgrammingLanguage::Cpp));
        assert!(cli.mute);
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["keyfall", "--mode", "chess"]).is_err());
    }

    #[test]
    fn test_cli_overrides_and_word_edits() {
        let cli = Cli::parse_from([
            "keyfall",
            "--add-word",
            "ferris",
            "--add-word",
            "bad<word>",
            "--remove-word",
            "gone",
            "--no-particles",
            "-t",
            "retro",
        ]);
        let mut settings = Settings {
            custom_words: vec!["gone".into()],
            ..Settings::default()
        };
        let mut err = Vec::new();
        assert!(cli.apply_word_edits(&mut settings, &mut err));
        assert_eq!(settings.custom_words, vec!["ferris", "badword"]);
        assert!(err.is_empty());

        cli.apply_overrides(&mut settings);
        assert_eq!(settings.theme, Theme::Retro);
        assert!(!settings.particles_enabled);
        assert!(settings.sound_enabled);
    }

    #[test]
    fn test_rejected_word_is_reported() {
        let cli = Cli::try_parse_from([
            "keyfall",
            "--add-word",
            "semi;colon",
            "--add-word",
            "crab",
        ])
        .unwrap();
        let mut settings = Settings::default();
        let mut err = Vec::new();
        assert!(cli.apply_word_edits(&mut settings, &mut err));
        assert_eq!(settings.custom_words, vec!["crab"]);
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("\"semi;colon\" was not added"));
        assert!(!err.contains("crab"));
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle(Difficulty::Easy), Difficulty::Medium);
        assert_eq!(cycle(Difficulty::Insane), Difficulty::Easy);
        assert_eq!(cycle(Theme::Retro), Theme::Dark);
    }

    #[test]
    fn test_menu_navigation_wraps() {
        let mut app = test_app();
        assert_eq!(app.menu.mode(), Mode::Words);
        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.menu.mode(), Mode::Numbers);
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.menu.mode(), Mode::Letters);
    }

    #[test]
    fn test_menu_toggles_are_saved() {
        let store = MemoryStore::default();
        let mut app = App::new(quiet_settings(), Box::new(store.clone()), None, Mode::Letters);
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('t')));
        app.handle_key(key(KeyCode::Char('p')));
        let saved = store.load();
        assert_eq!(saved.difficulty, Difficulty::Hard);
        assert_eq!(saved.theme, Theme::Light);
        assert!(!saved.particles_enabled);
        assert!(!app.particles.is_enabled());
    }

    #[test]
    fn test_app_state_transitions() {
        let mut app = test_app();
        assert_eq!(app.state, AppState::Menu);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Playing);
        assert!(app.game.is_running());

        app.handle_key(key(KeyCode::Esc));
        assert!(app.game.is_paused());
        app.handle_key(key(KeyCode::Esc));
        assert!(!app.game.is_paused());

        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('q')));
        assert_eq!(app.state, AppState::Results);
        assert!(!app.game.is_running());
        assert!(app.last_run.is_some());

        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.state, AppState::Stats);
        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.state, AppState::Results);

        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(app.state, AppState::Menu);
        assert!(app.handle_key(key(KeyCode::Char('q'))));
    }

    #[test]
    fn test_q_is_typed_while_playing() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Enter));
        assert!(!app.handle_key(key(KeyCode::Char('q'))));
        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.game.session().buffer, "q");
    }

    #[test]
    fn test_modifier_chords_are_not_typed() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Enter));
        for (c, modifiers) in [
            ('a', KeyModifiers::CONTROL),
            ('x', KeyModifiers::ALT),
            ('s', KeyModifiers::SUPER),
        ] {
            app.handle_key(KeyEvent {
                modifiers,
                ..key(KeyCode::Char(c))
            });
        }
        let progress = &app.game.session().progress;
        assert_eq!(app.game.session().buffer, "");
        assert_eq!(progress.total_inputs, 0);
        assert_eq!(progress.combo, 0);

        app.handle_key(KeyEvent {
            modifiers: KeyModifiers::SHIFT,
            ..key(KeyCode::Char('A'))
        });
        assert_eq!(app.game.session().buffer, "A");
        assert_eq!(app.game.session().progress.total_inputs, 1);
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Enter));
        let ctrl_c = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char('c'))
        };
        assert!(app.handle_key(ctrl_c));
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_short_runs_are_not_recorded() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Enter));
        for _ in 0..10 {
            app.on_tick(TICK_RATE_MS);
        }
        app.end_run();
        assert_eq!(app.book.stats.games_played, 0);
    }

    #[test]
    fn test_long_run_is_recorded_and_saved() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Enter));
        for _ in 0..400 {
            app.on_tick(TICK_RATE_MS);
        }
        app.end_run();
        assert_eq!(app.book.stats.games_played, 1);
        assert!(app.book.stats.is_unlocked(achievement_ids::FIRST_GAME));
        assert!(app
            .last_unlocked
            .iter()
            .any(|a| a.id == achievement_ids::FIRST_GAME));

        let stored = app.stats_db.as_ref().unwrap().load_book().unwrap();
        assert_eq!(stored.stats.games_played, 1);
    }

    #[test]
    fn test_auto_save_off_keeps_stats_in_memory() {
        let settings = Settings {
            auto_save: false,
            ..quiet_settings()
        };
        let mut app = App::new(
            settings,
            Box::new(MemoryStore::default()),
            StatsDb::open_in_memory().ok(),
            Mode::Letters,
        );
        app.start_run();
        for _ in 0..400 {
            app.on_tick(TICK_RATE_MS);
        }
        app.end_run();
        assert_eq!(app.book.stats.games_played, 1);
        let stored = app.stats_db.as_ref().unwrap().load_book().unwrap();
        assert_eq!(stored.stats.games_played, 0);
    }

    #[test]
    fn test_typing_spawned_item_scores() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Enter));
        while app.game.session().items().is_empty() {
            app.on_tick(TICK_RATE_MS);
        }
        let text = app.game.session().items()[0].text().to_string();
        type_str(&mut app, &text);
        assert_eq!(app.game.session().progress.words_typed, 1);
        assert!(app.game.session().progress.score > 0);
    }

    #[test]
    fn test_pause_restart_resets_run() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Enter));
        type_str(&mut app, "zz");
        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::Playing);
        assert!(app.game.is_running());
        assert!(!app.game.is_paused());
        assert!(app.game.session().buffer.is_empty());
        assert_eq!(app.game.session().progress.total_inputs, 0);
    }

    #[test]
    fn test_stats_report_lists_bests() {
        let mut book = StatsBook::default();
        book.stats.games_played = 3;
        book.stats.best_wpm = 42.5;
        let report = stats_report(&book, Local::now().date_naive());
        assert!(report.contains("games       3"));
        assert!(report.contains("best wpm    42.5"));
        assert!(report.contains("rank        Novice"));
    }

    #[test]
    fn test_stats_report_periods_are_relative_to_today() {
        let mut app = test_app();
        let played = Local.with_ymd_and_hms(2024, 3, 11, 14, 0, 0).single().unwrap();
        let summary = RunSummary {
            words_typed: 12,
            score: 300,
            elapsed_secs: 60.0,
            ..app.game.summary()
        };
        app.book.record_run(&summary, played);

        let same_day = stats_report(&app.book, played.date_naive());
        assert!(same_day.contains("today       1 games, 12 words, 300 pts"));

        let next_week = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let report = stats_report(&app.book, next_week);
        assert!(report.contains("today       0 games"));
        assert!(report.contains("week        0 games"));
        assert!(report.contains("month       1 games, 12 words, 300 pts"));
    }

    #[test]
    fn test_ui_renders_every_state() {
        let mut app = test_app();
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();

        for state in [
            AppState::Menu,
            AppState::Playing,
            AppState::Results,
            AppState::Stats,
        ] {
            app.state = state;
            terminal.draw(|f| ui(&mut app, f)).unwrap();
            let content: String = terminal
                .backend()
                .buffer()
                .content
                .iter()
                .map(|c| c.symbol())
                .collect();
            assert!(!content.trim().is_empty(), "{state:?} rendered nothing");
        }
    }

    #[test]
    fn test_tick_rate_constant() {
        assert_eq!(TICK_RATE_MS, 16);
    }
}
