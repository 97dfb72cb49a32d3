pub mod tables;

pub use tables::{ContentTables, KidsTheme};

use crate::config::{Difficulty, ProgrammingLanguage};
use clap::ValueEnum;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Chance that the words mode draws from the player's own list
pub const CUSTOM_WORD_CHANCE: f64 = 0.2;
/// Chance that the code mode draws a full snippet rather than a keyword
pub const CODE_SNIPPET_CHANCE: f64 = 0.7;

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
pub enum Mode {
    #[default]
    Letters,
    Words,
    Sentences,
    Code,
    Speed,
    Programming,
    Custom,
    Mixed,
    Princess,
    Dino,
    Numbers,
}

impl Mode {
    pub const ALL: [Mode; 11] = [
        Mode::Letters,
        Mode::Words,
        Mode::Sentences,
        Mode::Code,
        Mode::Speed,
        Mode::Programming,
        Mode::Custom,
        Mode::Mixed,
        Mode::Princess,
        Mode::Dino,
        Mode::Numbers,
    ];

    pub fn is_kids(self) -> bool {
        matches!(self, Mode::Princess | Mode::Dino | Mode::Numbers)
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::Letters => "single letters",
            Mode::Words => "words for the chosen difficulty",
            Mode::Sentences => "whole sentences",
            Mode::Code => "code snippets and keywords",
            Mode::Speed => "a random blend of letters, words and code",
            Mode::Programming => "keyword patterns for your language",
            Mode::Custom => "your own word list",
            Mode::Mixed => "everything at once",
            Mode::Princess => "kids: castles and crowns",
            Mode::Dino => "kids: roaring dinosaurs",
            Mode::Numbers => "kids: counting and sums",
        }
    }
}

/// Inputs to a single draw
#[derive(Debug, Clone, Copy)]
pub struct ContentRequest<'a> {
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub level: u32,
    pub custom_words: &'a [String],
    pub language: ProgrammingLanguage,
}

/// Picks the next string to drop. Never fails: any missing or empty table
/// degrades to a random uppercase letter.
#[derive(Debug, Clone, Copy)]
pub struct ContentGenerator<'t> {
    tables: &'t ContentTables,
}

impl Default for ContentGenerator<'static> {
    fn default() -> Self {
        Self::new(ContentTables::embedded())
    }
}

impl<'t> ContentGenerator<'t> {
    pub fn new(tables: &'t ContentTables) -> Self {
        Self { tables }
    }

    pub fn generate<R: Rng + ?Sized>(&self, req: &ContentRequest, rng: &mut R) -> String {
        let text = self.generate_for(req.mode, req, rng);
        if text.trim().is_empty() {
            debug!("empty draw for mode {}, substituting a letter", req.mode);
            return random_letter(rng);
        }
        text
    }

    fn generate_for<R: Rng + ?Sized>(&self, mode: Mode, req: &ContentRequest, rng: &mut R) -> String {
        if mode.is_kids() {
            return self.kids_content(mode, req.level, rng);
        }

        match mode {
            Mode::Letters => random_letter(rng),
            Mode::Words => self.word_content(req, rng),
            Mode::Sentences => self
                .table_or_medium(&self.tables.sentences, req.difficulty)
                .and_then(|list| pick(list, rng))
                .unwrap_or_else(|| random_letter(rng)),
            Mode::Code => self.code_content(req.language, rng),
            Mode::Speed => {
                let kind = *[Mode::Letters, Mode::Words, Mode::Code]
                    .choose(rng)
                    .unwrap_or(&Mode::Letters);
                self.generate_for(kind, req, rng)
            }
            Mode::Programming => self.programming_content(req.language, rng),
            Mode::Custom => {
                pick(req.custom_words, rng).unwrap_or_else(|| self.word_content(req, rng))
            }
            Mode::Mixed => match rng.gen_range(0..4) {
                0 => random_letter(rng),
                1 => self.word_content(req, rng),
                2 => self.code_content(req.language, rng),
                _ => self
                    .tables
                    .sentences
                    .get("easy")
                    .and_then(|list| pick(list, rng))
                    .unwrap_or_else(|| random_letter(rng)),
            },
            Mode::Princess | Mode::Dino | Mode::Numbers => unreachable!("handled above"),
        }
    }

    fn word_content<R: Rng + ?Sized>(&self, req: &ContentRequest, rng: &mut R) -> String {
        if !req.custom_words.is_empty() && rng.gen_bool(CUSTOM_WORD_CHANCE) {
            if let Some(word) = pick(req.custom_words, rng) {
                return word;
            }
        }
        self.table_or_medium(&self.tables.words, req.difficulty)
            .and_then(|list| pick(list, rng))
            .unwrap_or_else(|| random_letter(rng))
    }

    fn code_content<R: Rng + ?Sized>(&self, language: ProgrammingLanguage, rng: &mut R) -> String {
        if rng.gen_bool(CODE_SNIPPET_CHANCE) {
            if let Some(snippet) = pick(&self.tables.snippets, rng) {
                return snippet;
            }
        }
        self.keywords(language)
            .and_then(|list| pick(list, rng))
            .unwrap_or_else(|| random_letter(rng))
    }

    fn programming_content<R: Rng + ?Sized>(
        &self,
        language: ProgrammingLanguage,
        rng: &mut R,
    ) -> String {
        let Some(kw) = self.keywords(language).and_then(|list| pick(list, rng)) else {
            return random_letter(rng);
        };
        match rng.gen_range(0..5) {
            0 => format!("{kw} variable"),
            1 => format!("function {kw}()"),
            2 => format!("const {kw} = value"),
            3 => format!("if ({kw}) {{"),
            _ => format!("return {kw};"),
        }
    }

    fn kids_content<R: Rng + ?Sized>(&self, mode: Mode, level: u32, rng: &mut R) -> String {
        let Some(theme) = self.tables.kids.get(&mode.to_string()) else {
            debug!("no kids table for {mode}");
            return "A".to_string();
        };
        let pool = kids_pool(theme, level);
        pool.choose(rng)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "A".to_string())
    }

    /// A random cheer for the kids modes
    pub fn encouragement<R: Rng + ?Sized>(&self, mode: Mode, rng: &mut R) -> String {
        self.tables
            .kids
            .get(&mode.to_string())
            .and_then(|theme| pick(&theme.encouragement, rng))
            .unwrap_or_else(|| {
                ["Great job!", "Amazing!", "Perfect!"]
                    .choose(rng)
                    .unwrap_or(&"Great job!")
                    .to_string()
            })
    }

    fn keywords(&self, language: ProgrammingLanguage) -> Option<&'t Vec<String>> {
        let tables = self.tables;
        tables
            .keywords
            .get(&language.to_string())
            .filter(|list| !list.is_empty())
            .or_else(|| {
                debug!("no keywords for {language}, using javascript");
                tables.keywords.get("javascript")
            })
    }

    fn table_or_medium(
        &self,
        table: &'t std::collections::HashMap<String, Vec<String>>,
        difficulty: Difficulty,
    ) -> Option<&'t Vec<String>> {
        table
            .get(&difficulty.to_string())
            .filter(|list| !list.is_empty())
            .or_else(|| table.get("medium"))
    }
}

/// Level-gated pool for the kids themes. The pool only grows with level.
pub fn kids_pool(theme: &KidsTheme, level: u32) -> Vec<&str> {
    fn prefix(list: &[String], n: usize) -> impl Iterator<Item = &str> {
        list[..n.min(list.len())].iter().map(String::as_str)
    }

    if level <= 2 {
        let glyphs = if theme.letters.is_empty() {
            &theme.numbers
        } else {
            &theme.letters
        };
        prefix(glyphs, 10 + level as usize * 5).collect()
    } else if level <= 5 {
        prefix(&theme.letters, 15)
            .chain(prefix(&theme.words, 10))
            .chain(prefix(&theme.numbers, usize::MAX))
            .chain(prefix(&theme.number_words, 5))
            .collect()
    } else {
        [
            &theme.letters,
            &theme.words,
            &theme.themed,
            &theme.numbers,
            &theme.number_words,
            &theme.simple_math,
        ]
        .into_iter()
        .flat_map(|list| list.iter().map(String::as_str))
        .collect()
    }
}

fn pick<R: Rng + ?Sized>(list: &[String], rng: &mut R) -> Option<String> {
    list.choose(rng).cloned()
}

pub fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> String {
    char::from(b'A' + rng.gen_range(0..26u8)).to_string()
}
