// Per-language punctuation stripping.
//
// Classical texts arrive with mixed ASCII and CJK punctuation that the
// analyzers should never see as token material. Each language gets one
// compiled pattern, built once at startup and carried by value — the tables
// live in the configuration, not in module globals.

use std::collections::HashMap;

use regex_lite::Regex;

use super::traits::Language;

// ASCII punctuation; English keeps the apostrophe (contractions survive).
const ASCII_PUNCT: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
const ASCII_PUNCT_KEEP_APOSTROPHE: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~";

// Fullwidth and CJK punctuation, stops included, for zh and ko text.
const CJK_PUNCT: &str = "＂＃＄％＆＇（）＊＋，－／：；＜＝＞＠［＼］＾＿｀｛｜｝～｟｠｢｣､\u{3000}、〃〈〉《》「」『』【】〔〕〖〗〘〙〚〛〜〝〞〟〰〾〿–—'‛\u{201c}\u{201d}„‟…‧﹏﹑﹔·！？｡。";

/// Compiled punctuation patterns, one per language.
pub struct PunctuationTables {
    patterns: HashMap<Language, Regex>,
}

impl PunctuationTables {
    /// Build the per-language patterns. Pattern construction is from fixed
    /// character sets, so this cannot fail at runtime.
    pub fn new() -> Self {
        let mut patterns = HashMap::new();
        for lang in Language::ALL {
            let chars = match lang {
                Language::English => ASCII_PUNCT_KEEP_APOSTROPHE.to_string(),
                Language::Chinese | Language::Korean => {
                    format!("{CJK_PUNCT}{ASCII_PUNCT}")
                }
                Language::Spanish | Language::French => ASCII_PUNCT.to_string(),
            };
            let pattern = Regex::new(&char_class(&chars))
                .unwrap_or_else(|e| panic!("punctuation pattern for {lang}: {e}"));
            patterns.insert(lang, pattern);
        }
        Self { patterns }
    }

    /// Remove the language's punctuation characters (and stray backslashes)
    /// from the text.
    pub fn strip(&self, text: &str, lang: Language) -> String {
        let cleaned = text.replace('\\', "");
        match self.patterns.get(&lang) {
            Some(re) => re.replace_all(&cleaned, "").into_owned(),
            None => cleaned,
        }
    }
}

impl Default for PunctuationTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a character-class pattern from a literal character set, escaping
/// the class metacharacters.
fn char_class(chars: &str) -> String {
    let mut out = String::with_capacity(chars.len() * 2 + 2);
    out.push('[');
    for c in chars.chars() {
        if matches!(c, '\\' | ']' | '^' | '-' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_keeps_apostrophes() {
        let tables = PunctuationTables::new();
        let out = tables.strip("Genji's world, at last!", Language::English);
        assert_eq!(out, "Genji's world at last");
    }

    #[test]
    fn spanish_drops_apostrophes_too() {
        let tables = PunctuationTables::new();
        let out = tables.strip("¿verdad? d'oro", Language::Spanish);
        // The inverted question mark is not ASCII punctuation; it survives.
        assert_eq!(out, "¿verdad doro");
    }

    #[test]
    fn chinese_strips_fullwidth_punctuation() {
        let tables = PunctuationTables::new();
        let out = tables.strip("源氏、物語。「夕顔」", Language::Chinese);
        assert_eq!(out, "源氏物語夕顔");
    }

    #[test]
    fn backslashes_are_removed() {
        let tables = PunctuationTables::new();
        let out = tables.strip(r"a\b c", Language::English);
        assert_eq!(out, "ab c");
    }

    #[test]
    fn strip_is_idempotent() {
        let tables = PunctuationTables::new();
        let once = tables.strip("moon; viewing, (autumn)", Language::English);
        let twice = tables.strip(&once, Language::English);
        assert_eq!(once, twice);
    }
}
