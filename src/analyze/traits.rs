// Tokenizer trait — swap-ready abstraction.
//
// The corpus languages need real analyzers (stemming for European languages,
// morphological segmentation for Japanese/Korean/Chinese), which live in the
// search backend. The trait keeps the rest of the pipeline indifferent to
// where tokens come from, with a naive whitespace splitter as the fallback.

use async_trait::async_trait;

use super::client::AnalyzeError;

/// Corpus languages with a configured analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Chinese,
    Korean,
    Spanish,
    French,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Chinese,
        Language::Korean,
        Language::Spanish,
        Language::French,
    ];

    /// The two-letter code, which doubles as the analyzer index name.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
            Language::Korean => "ko",
            Language::Spanish => "es",
            Language::French => "fr",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        Language::ALL.iter().copied().find(|l| l.code() == code)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Trait for turning text into tokens. Implementations are async because the
/// primary backend is a network service.
#[async_trait]
pub trait Tokenizer: Send + Sync {
    /// Tokenize one piece of text in the given language.
    async fn tokenize(&self, text: &str, lang: Language) -> Result<Vec<String>, AnalyzeError>;
}

/// Naive whitespace splitting — no stemming, no stop words. Useful for tests
/// and for already-segmented text.
pub struct WhitespaceTokenizer;

#[async_trait]
impl Tokenizer for WhitespaceTokenizer {
    async fn tokenize(&self, text: &str, _lang: Language) -> Result<Vec<String>, AnalyzeError> {
        Ok(text.split_whitespace().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_codes_round_trip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
        assert_eq!(Language::from_code("ja"), None);
    }

    #[tokio::test]
    async fn whitespace_tokenizer_splits() {
        let tokens = WhitespaceTokenizer
            .tokenize("  the shining  prince ", Language::English)
            .await
            .unwrap();
        assert_eq!(tokens, vec!["the", "shining", "prince"]);
    }

    #[tokio::test]
    async fn whitespace_tokenizer_empty_text() {
        let tokens = WhitespaceTokenizer
            .tokenize("", Language::English)
            .await
            .unwrap();
        assert!(tokens.is_empty());
    }
}
