use include_dir::{include_dir, Dir};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::sync::OnceLock;

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/content/data");

/// Per-theme tables for the kids modes. Any table may be absent.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct KidsTheme {
    #[serde(default)]
    pub letters: Vec<String>,
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub themed: Vec<String>,
    #[serde(default)]
    pub numbers: Vec<String>,
    #[serde(default)]
    pub number_words: Vec<String>,
    #[serde(default)]
    pub simple_math: Vec<String>,
    #[serde(default)]
    pub encouragement: Vec<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
struct CodeTables {
    #[serde(default)]
    snippets: Vec<String>,
    #[serde(default)]
    keywords: HashMap<String, Vec<String>>,
}

/// Static content the generator draws from, keyed by lowercase names
#[derive(Clone, Debug, Default)]
pub struct ContentTables {
    pub words: HashMap<String, Vec<String>>,
    pub sentences: HashMap<String, Vec<String>>,
    pub snippets: Vec<String>,
    pub keywords: HashMap<String, Vec<String>>,
    pub kids: HashMap<String, KidsTheme>,
}

impl ContentTables {
    /// Tables compiled into the binary, parsed once
    pub fn embedded() -> &'static ContentTables {
        static TABLES: OnceLock<ContentTables> = OnceLock::new();
        TABLES.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                warn!("embedded content tables unreadable ({e}), generating letters only");
                ContentTables::default()
            })
        })
    }

    pub fn load() -> Result<Self, Box<dyn Error>> {
        let code: CodeTables = read_table("code.json")?;
        Ok(Self {
            words: read_table("words.json")?,
            sentences: read_table("sentences.json")?,
            snippets: code.snippets,
            keywords: code.keywords,
            kids: read_table("kids.json")?,
        })
    }
}

fn read_table<T: DeserializeOwned>(file_name: &str) -> Result<T, Box<dyn Error>> {
    let file = DATA_DIR
        .get_file(file_name)
        .ok_or_else(|| format!("content table {file_name} not found"))?;
    let contents = file
        .contents_utf8()
        .ok_or_else(|| format!("content table {file_name} is not utf-8"))?;
    Ok(serde_json::from_str(contents)?)
}
