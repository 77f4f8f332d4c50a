//! Categorization of transactions by a local LLM inference service.
//!
//! A `Categorizer` only computes a `Category`. It never writes to the ledger. Writing the result
//! back is the caller's job (see `App::categorize`).

mod client;
mod prompt;

pub use client::{InferenceClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use prompt::build_prompt;

use crate::model::{Category, Transaction};
use std::fmt::{Display, Formatter};

/// Assigns a category to a transaction, given a window of recent transactions as examples.
#[async_trait::async_trait]
pub trait Categorizer: Send + Sync {
    async fn categorize(
        &self,
        transaction: &Transaction,
        context: &[Transaction],
    ) -> Result<Category, CategorizeError>;
}

/// Which of the two JSON layers in the service's reply could not be parsed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ResponseLayer {
    /// The outer body, `{ "response": "..." }`.
    Envelope,
    /// The model-generated text inside `response`, expected to be `{ "name": .., "icon": .. }`.
    Payload,
}

impl Display for ResponseLayer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseLayer::Envelope => f.write_str("response envelope"),
            ResponseLayer::Payload => f.write_str("category payload"),
        }
    }
}

/// The ways a categorization can fail. In every case the transaction is left as it was.
#[derive(Debug, thiserror::Error)]
pub enum CategorizeError {
    /// The transactions could not be serialized into the prompt.
    #[error("unable to build the categorization prompt")]
    Prompt(#[source] serde_json::Error),

    /// The HTTP client could not be constructed.
    #[error("unable to create the HTTP client")]
    Client(#[source] reqwest::Error),

    /// The service could not be reached, timed out, or dropped the connection.
    #[error("the inference service at {endpoint} is unavailable")]
    ServiceUnavailable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("the inference service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// One of the two JSON layers could not be parsed.
    #[error("the inference service returned a malformed {layer}")]
    MalformedResponse {
        layer: ResponseLayer,
        #[source]
        source: serde_json::Error,
    },
}

impl CategorizeError {
    /// `true` for failures to talk to the service at all, or a non-2xx reply.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CategorizeError::ServiceUnavailable { .. } | CategorizeError::Status { .. }
        )
    }

    /// `true` when the service replied but its reply could not be parsed.
    pub fn is_parse(&self) -> bool {
        matches!(self, CategorizeError::MalformedResponse { .. })
    }
}
