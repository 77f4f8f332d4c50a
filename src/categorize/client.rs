//! An HTTP client for an Ollama-style `/api/generate` endpoint.

use crate::categorize::{build_prompt, CategorizeError, Categorizer, ResponseLayer};
use crate::model::{Category, Transaction};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// The default inference endpoint, a local Ollama server.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";

/// The default model identifier sent with each request.
pub const DEFAULT_MODEL: &str = "gpt-oss:20b";

/// Request body for `/api/generate`.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    stream: bool,
    prompt: String,
}

/// The part of the `/api/generate` reply that we care about.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Categorizes transactions by sending one non-streaming generate request per transaction.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl InferenceClient {
    pub fn new(
        endpoint: Url,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CategorizeError> {
        // The service runs locally, so system proxy settings do not apply to it.
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(CategorizeError::Client)?;
        Ok(Self {
            http,
            endpoint,
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl Categorizer for InferenceClient {
    async fn categorize(
        &self,
        transaction: &Transaction,
        context: &[Transaction],
    ) -> Result<Category, CategorizeError> {
        let body = GenerateRequest {
            model: &self.model,
            stream: false,
            prompt: build_prompt(transaction, context).map_err(CategorizeError::Prompt)?,
        };
        debug!(
            "Requesting a category for transaction {} from {} with {} context transactions",
            transaction.id(),
            self.endpoint,
            context.len()
        );

        let unavailable = |source| CategorizeError::ServiceUnavailable {
            endpoint: self.endpoint.to_string(),
            source,
        };
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;
        let status = response.status();
        let text = response.text().await.map_err(unavailable)?;
        trace!("Inference service replied with {status}: {text}");

        if !status.is_success() {
            return Err(CategorizeError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_reply(&text)
    }
}

/// Parses the outer envelope and then the model-generated category inside it.
pub(crate) fn parse_reply(body: &str) -> Result<Category, CategorizeError> {
    let envelope: GenerateResponse =
        serde_json::from_str(body).map_err(|source| CategorizeError::MalformedResponse {
            layer: ResponseLayer::Envelope,
            source,
        })?;
    serde_json::from_str(strip_code_fence(&envelope.response)).map_err(|source| {
        CategorizeError::MalformedResponse {
            layer: ResponseLayer::Payload,
            source,
        }
    })
}

/// Models sometimes wrap JSON in a Markdown code fence, e.g. "```json\n{...}\n```".
fn strip_code_fence(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string on the opening line, if any.
    match rest.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => rest.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Draft, TransactionType};
    use crate::test::MockInference;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn groceries() -> Category {
        Category::new("Groceries", "🛒")
    }

    fn transaction() -> Transaction {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        Transaction::from_draft(
            1,
            Draft::new(TransactionType::Expense, "Supermarket", Decimal::new(4210, 2), date),
        )
    }

    fn client(endpoint: Url) -> InferenceClient {
        InferenceClient::new(endpoint, DEFAULT_MODEL, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_parse_reply_success() {
        let body = r#"{"model":"gpt-oss:20b","response":"{\"name\":\"Groceries\",\"icon\":\"🛒\"}","done":true}"#;
        assert_eq!(parse_reply(body).unwrap(), groceries());
    }

    #[test]
    fn test_parse_reply_fenced_payload() {
        let body = r#"{"response":"```json\n{\"name\":\"Groceries\",\"icon\":\"🛒\"}\n```"}"#;
        assert_eq!(parse_reply(body).unwrap(), groceries());
    }

    #[test]
    fn test_parse_reply_bad_envelope() {
        let err = parse_reply("<html>oops</html>").unwrap_err();
        assert!(matches!(
            err,
            CategorizeError::MalformedResponse {
                layer: ResponseLayer::Envelope,
                ..
            }
        ));
        let err = parse_reply(r#"{"done":true}"#).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_parse_reply_bad_payload() {
        let err = parse_reply(r#"{"response":"I think this is groceries"}"#).unwrap_err();
        assert!(matches!(
            err,
            CategorizeError::MalformedResponse {
                layer: ResponseLayer::Payload,
                ..
            }
        ));
        assert!(err.is_parse());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{}"), "```{}");
    }

    #[tokio::test]
    async fn test_categorize_sends_generate_request() {
        let mock = MockInference::start(
            200,
            r#"{"response":"{\"name\":\"Groceries\",\"icon\":\"🛒\"}"}"#,
        )
        .await;
        let target = transaction();
        let category = client(mock.endpoint())
            .categorize(&target, &[target.clone()])
            .await
            .unwrap();
        assert_eq!(category, groceries());

        let requests = mock.requests().await;
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_str(&requests[0]).unwrap();
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["stream"], false);
        assert!(body["prompt"].as_str().unwrap().contains("Supermarket"));
    }

    #[tokio::test]
    async fn test_categorize_non_success_status() {
        let mock = MockInference::start(500, r#"{"error":"model not loaded"}"#).await;
        let err = client(mock.endpoint())
            .categorize(&transaction(), &[])
            .await
            .unwrap_err();
        match err {
            CategorizeError::Status { status, ref body } => {
                assert_eq!(status, 500);
                assert!(body.contains("model not loaded"));
            }
            ref other => panic!("unexpected error {other:?}"),
        }
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_categorize_unreachable_service() {
        let endpoint = MockInference::unused_endpoint().await;
        let err = client(endpoint)
            .categorize(&transaction(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CategorizeError::ServiceUnavailable { .. }));
        assert!(err.is_transport());
    }
}
