use std::env;

use anyhow::Result;

use crate::analyze::{Language, PunctuationTables, DEFAULT_ANALYZE_URL};

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy. The punctuation tables
/// are built here once and passed to whatever needs them — no module-level
/// regex state anywhere.
pub struct Config {
    /// Base URL of the search backend serving `_analyze` requests.
    pub analyze_url: String,
    /// Corpus language for tokenization.
    pub language: Language,
    /// Default score percentile gating terms into the clustering step.
    pub percentile: f64,
    /// Compiled per-language punctuation patterns.
    pub punctuation: PunctuationTables,
}

impl Config {
    /// Load configuration from environment variables. Everything has a
    /// default; a local backend and an English corpus need no setup.
    pub fn load() -> Result<Self> {
        let language = match env::var("MURASAKI_LANG") {
            Ok(code) => Language::from_code(&code).ok_or_else(|| {
                anyhow::anyhow!("MURASAKI_LANG must be one of en, zh, ko, es, fr (got {code:?})")
            })?,
            Err(_) => Language::English,
        };

        let percentile = match env::var("MURASAKI_PERCENTILE") {
            Ok(raw) => raw
                .parse::<f64>()
                .map_err(|_| anyhow::anyhow!("MURASAKI_PERCENTILE must be a number, got {raw:?}"))?,
            Err(_) => 90.0,
        };
        if !(0.0..=100.0).contains(&percentile) {
            anyhow::bail!("MURASAKI_PERCENTILE must be between 0 and 100, got {percentile}");
        }

        Ok(Self {
            analyze_url: env::var("MURASAKI_ES_URL")
                .unwrap_or_else(|_| DEFAULT_ANALYZE_URL.to_string()),
            language,
            percentile,
            punctuation: PunctuationTables::new(),
        })
    }

    /// Check that an analysis backend is configured.
    /// Call this before any operation that tokenizes remotely.
    pub fn require_analyze(&self) -> Result<()> {
        if self.analyze_url.is_empty() {
            anyhow::bail!(
                "MURASAKI_ES_URL is empty. Point it at a running search backend\n\
                 (default: {DEFAULT_ANALYZE_URL})."
            );
        }
        Ok(())
    }
}
