// Remote text analysis — tokenization via the search backend, with
// per-language punctuation stripping in front of it.

pub mod client;
pub mod punctuation;
pub mod traits;

pub use client::{AnalyzeError, EsAnalyzeClient, DEFAULT_ANALYZE_URL};
pub use punctuation::PunctuationTables;
pub use traits::{Language, Tokenizer, WhitespaceTokenizer};
