use crate::app_dirs::AppDirs;
use clap::ValueEnum;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound on the persisted custom word list
pub const MAX_CUSTOM_WORDS: usize = 100;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Insane,
}

impl Difficulty {
    /// Scales the spawn interval; lower means items arrive faster
    pub fn spawn_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 0.7,
            Difficulty::Insane => 0.4,
        }
    }

    /// Fall speed in position units per tick at level 1
    pub fn base_speed(self) -> f64 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 1.5,
            Difficulty::Insane => 2.0,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Neon,
    Retro,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeyboardLayout {
    #[default]
    Qwerty,
    Azerty,
    Dvorak,
}

/// Keyword table used by the code and programming modes
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProgrammingLanguage {
    #[default]
    Javascript,
    Python,
    Java,
    Cpp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Accessibility {
    pub high_contrast: bool,
    pub large_text: bool,
    pub reduced_motion: bool,
    pub screen_reader: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub theme: Theme,
    pub sound_enabled: bool,
    pub particles_enabled: bool,
    pub auto_save: bool,
    pub show_combo: bool,
    pub keyboard_layout: KeyboardLayout,
    pub language: ProgrammingLanguage,
    pub custom_words: Vec<String>,
    pub accessibility: Accessibility,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            theme: Theme::Dark,
            sound_enabled: true,
            particles_enabled: true,
            auto_save: true,
            show_combo: true,
            keyboard_layout: KeyboardLayout::Qwerty,
            language: ProgrammingLanguage::Javascript,
            custom_words: Vec::new(),
            accessibility: Accessibility::default(),
        }
    }
}

impl Settings {
    /// Build settings from an untrusted JSON document.
    ///
    /// Every field is checked on its own; a missing or malformed field falls
    /// back to its default instead of discarding the whole document.
    pub fn from_json_value(value: &Value) -> Self {
        let defaults = Settings::default();
        let Some(obj) = value.as_object() else {
            warn!("settings document is not an object, using defaults");
            return defaults;
        };

        let accessibility = obj
            .get("accessibility")
            .and_then(|v| serde_json::from_value::<Accessibility>(v.clone()).ok())
            .unwrap_or_default();

        let custom_words = match obj.get("custom_words") {
            Some(Value::Array(items)) => {
                sanitize_word_list(items.iter().filter_map(|w| w.as_str().map(str::to_owned)))
            }
            Some(_) => {
                warn!("custom_words is not a list, dropping it");
                Vec::new()
            }
            None => Vec::new(),
        };

        Self {
            difficulty: field(obj, "difficulty", defaults.difficulty),
            theme: field(obj, "theme", defaults.theme),
            sound_enabled: bool_field(obj, "sound_enabled", defaults.sound_enabled),
            particles_enabled: bool_field(obj, "particles_enabled", defaults.particles_enabled),
            auto_save: bool_field(obj, "auto_save", defaults.auto_save),
            show_combo: bool_field(obj, "show_combo", defaults.show_combo),
            keyboard_layout: field(obj, "keyboard_layout", defaults.keyboard_layout),
            language: field(obj, "language", defaults.language),
            custom_words,
            accessibility,
        }
    }

    /// Whether particle bursts should be produced at all
    pub fn particles_active(&self) -> bool {
        self.particles_enabled && !self.accessibility.reduced_motion
    }

    /// Add a word to the custom list. Returns false when the word is invalid,
    /// already present, or the list is full.
    pub fn add_custom_word(&mut self, word: &str) -> bool {
        let word = sanitize_input(word);
        if !validate_word(&word)
            || self.custom_words.contains(&word)
            || self.custom_words.len() >= MAX_CUSTOM_WORDS
        {
            return false;
        }
        self.custom_words.push(word);
        true
    }

    pub fn remove_custom_word(&mut self, word: &str) -> bool {
        match self.custom_words.iter().position(|w| w == word) {
            Some(idx) => {
                self.custom_words.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Copy of the settings in the shape written to disk
    pub fn sanitized(&self) -> Self {
        Self {
            custom_words: sanitize_word_list(self.custom_words.iter().cloned()),
            ..self.clone()
        }
    }
}

fn field<T: for<'de> Deserialize<'de>>(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    default: T,
) -> T {
    match obj.get(key) {
        Some(v) => serde_json::from_value(v.clone()).unwrap_or_else(|_| {
            warn!("invalid value {v} for setting {key}, using default");
            default
        }),
        None => default,
    }
}

fn bool_field(obj: &serde_json::Map<String, Value>, key: &str, default: bool) -> bool {
    match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(v) => {
            warn!("invalid value {v} for setting {key}, using default");
            default
        }
        None => default,
    }
}

/// Strip markup-significant characters and surrounding whitespace
pub fn sanitize_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '&'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Letters, digits, whitespace and `.,!?-` only; never empty
pub fn validate_word(word: &str) -> bool {
    !word.is_empty()
        && word.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || c.is_whitespace()
                || matches!(c, '.' | ',' | '!' | '?' | '-')
        })
}

fn sanitize_word_list(words: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for word in words.map(|w| sanitize_input(&w)) {
        if validate_word(&word) && !out.contains(&word) {
            out.push(word);
        }
        if out.len() == MAX_CUSTOM_WORDS {
            break;
        }
    }
    out
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("keyfall_settings.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        let Ok(bytes) = fs::read(&self.path) else {
            return Settings::default();
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => Settings::from_json_value(&value),
            Err(e) => {
                warn!("could not parse {}: {e}", self.path.display());
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&settings.sanitized()).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
