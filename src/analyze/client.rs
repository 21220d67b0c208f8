// Remote analysis client — tokenization over the search backend's _analyze
// endpoint.
//
// The backend owns the per-language analyzers (stemmers, CJK segmenters,
// stop-word lists); this client only sends text at an index named after the
// language code and collects the token stream back. Index setup is operator
// territory and deliberately not handled here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::traits::{Language, Tokenizer};

/// Default analysis endpoint for a locally running backend.
pub const DEFAULT_ANALYZE_URL: &str = "http://localhost:9200";

/// Errors from the remote analysis service.
///
/// An unreachable service is its own variant: "the tokenizer is down" must
/// never look like "the text produced no tokens".
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Could not reach the service at all (connect or timeout failure).
    #[error("analysis service unreachable: {0}")]
    ServiceUnavailable(#[source] reqwest::Error),

    /// The request went out but failed in transit.
    #[error("analysis request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("analysis service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body wasn't the expected token list shape.
    #[error("malformed analysis response: {0}")]
    Malformed(#[source] reqwest::Error),

    /// Client construction failed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    analyzer: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    tokens: Vec<AnalyzeToken>,
}

#[derive(Deserialize)]
struct AnalyzeToken {
    token: String,
}

/// HTTP client for the `_analyze` endpoint of a search backend.
pub struct EsAnalyzeClient {
    client: reqwest::Client,
    base_url: String,
}

impl EsAnalyzeClient {
    /// Create a client pointing at the given base URL
    /// (e.g. `http://localhost:9200`).
    pub fn new(base_url: &str) -> Result<Self, AnalyzeError> {
        let client = reqwest::Client::builder()
            .user_agent("murasaki/0.1 (corpus-analysis)")
            .build()
            .map_err(AnalyzeError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Run the language's analyzer over the text and return its tokens.
    pub async fn analyze(&self, text: &str, lang: Language) -> Result<Vec<String>, AnalyzeError> {
        let url = format!("{}/{}/_analyze", self.base_url, lang.code());

        debug!(lang = %lang, chars = text.chars().count(), "analyze request");

        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest {
                analyzer: lang.code(),
                text,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    AnalyzeError::ServiceUnavailable(e)
                } else {
                    AnalyzeError::Transport(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::Status { status, body });
        }

        let parsed: AnalyzeResponse = response.json().await.map_err(AnalyzeError::Malformed)?;
        Ok(parsed.tokens.into_iter().map(|t| t.token).collect())
    }
}

#[async_trait]
impl Tokenizer for EsAnalyzeClient {
    async fn tokenize(&self, text: &str, lang: Language) -> Result<Vec<String>, AnalyzeError> {
        self.analyze(text, lang).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = EsAnalyzeClient::new("http://localhost:9200/").unwrap();
        assert_eq!(client.base_url, "http://localhost:9200");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_distinct_error() {
        // Nothing listens on this port; the failure must surface as
        // ServiceUnavailable, not as an empty token list.
        let client = EsAnalyzeClient::new("http://127.0.0.1:1").unwrap();
        let result = client.analyze("some text", Language::English).await;

        match result {
            Err(AnalyzeError::ServiceUnavailable(_)) => {}
            other => panic!("expected ServiceUnavailable, got {other:?}"),
        }
    }
}
