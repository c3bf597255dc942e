//! The planner's output: one fetch per upstream request, its wire body, and
//! the interface the caller drives execution through.
//!
//! Grounded on `resolve.SingleFetch`/`resolve.ContextVariable`/`resolve.BufPair`
//! and `graphqldatasource.Source.Load` in
//! `examples/original_source/pkg/engine/datasource/graphqldatasource/graphql_datasource.go`
//! (lines ~230-285), with the outbound HTTP shape (timeout, `Accept`/`Content-Type`
//! headers) grounded on `examples/original_source/pkg/engine/datasource/httpclient/nethttpclient.go`.
//! `reqwest` and `async-trait` are added here rather than carried from the
//! teacher: the teacher never executes a fetch itself (composition only), so
//! this is new ambient stack picked because the other example repos in the
//! pack reach for the same two crates wherever they make an outbound HTTP
//! call from async Rust.

use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{PlanError, PlanResult};

/// A value the upstream request needs that is only known once the
/// downstream request arrives: a path into the downstream variables object.
///
/// Mirrors `resolve.ContextVariable{Path: [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextVariable {
    pub path: Vec<String>,
}

/// Deduplicates [`ContextVariable`]s by path and hands out a stable
/// placeholder token for each distinct one, mirroring
/// `p.fetch.Variables.AddVariable(...)`'s `(contextVariableName, exists)`
/// return.
#[derive(Debug, Clone, Default)]
pub struct VariableTemplate {
    placeholders: IndexMap<Vec<String>, String>,
}

impl VariableTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the placeholder token for `variable`'s path, creating one if
    /// this path hasn't been seen before, and whether it already existed.
    pub fn add_variable(&mut self, variable: ContextVariable) -> (String, bool) {
        if let Some(existing) = self.placeholders.get(&variable.path) {
            return (existing.clone(), true);
        }
        let placeholder = format!("$$context_variable_{}$$", self.placeholders.len());
        self.placeholders.insert(variable.path, placeholder.clone());
        (placeholder, false)
    }

    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }
}

/// The wire body of one upstream GraphQL-over-HTTP request:
/// `{"url": ..., "body": {"query": ..., "variables": {...}}}`, i.e.
/// `sjson.SetRawBytes(p.fetch.Input, "body.query", ...)` /
/// `"body.variables"` / `"url"` folded into one typed struct instead of a
/// raw byte buffer built up key by key.
#[derive(Debug, Clone, Serialize)]
pub struct FetchInput {
    pub url: String,
    pub body: FetchBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchBody {
    pub query: String,
    /// Downstream variable name -> context-variable placeholder token.
    /// Keyed by downstream name (not upstream), matching
    /// `sjson.SetRawBytes(p.variables, variableNameStr, contextVariableName)`.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub variables: serde_json::Map<String, serde_json::Value>,
}

/// One outbound fetch produced by planning: which response buffer it feeds,
/// and what to send upstream to fill it. Mirrors `resolve.SingleFetch`.
#[derive(Debug, Clone, Serialize)]
pub struct Fetch {
    pub buffer_id: u32,
    pub input: FetchInput,
}

/// Accumulates a fetch's response: the `data` and `errors` members of the
/// upstream GraphQL response, kept separate so a caller can merge `data`
/// into the overall response tree and surface `errors` independently.
/// Mirrors `resolve.BufPair{Data, Errors *bytes.Buffer}`.
#[derive(Debug, Clone, Default)]
pub struct BufPair {
    pub data: serde_json::Value,
    pub errors: Vec<serde_json::Value>,
}

/// Executes one [`Fetch`] against its upstream. Implemented for real HTTP
/// traffic by [`HttpDataSource`]; tests substitute an in-memory fake.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn load(&self, input: &FetchInput) -> PlanResult<BufPair>;
}

/// POSTs `input` as JSON and splits the response into `data`/`errors`.
///
/// Grounded on `Source.Load` in `graphql_datasource.go`: a plain
/// `http.Client` with a fixed timeout, `POST`, `Content-Type`/`Accept:
/// application/json`. The default timeout (10s) matches
/// `nethttpclient.go`'s `DefaultNetHttpClient`.
pub struct HttpDataSource {
    client: reqwest::Client,
}

impl HttpDataSource {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(10))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client configuration must be valid");
        Self { client }
    }
}

impl Default for HttpDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn load(&self, input: &FetchInput) -> PlanResult<BufPair> {
        let response = self
            .client
            .post(&input.url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(input)
            .send()
            .await
            .map_err(|err| PlanError::internal(format!("upstream request failed: {err}")))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|err| PlanError::internal(format!("upstream response was not JSON: {err}")))?;

        let data = body.get("data").cloned().unwrap_or(serde_json::Value::Null);
        let errors = match body.get("error") {
            Some(serde_json::Value::Array(errors)) => errors.clone(),
            Some(other) => vec![other.clone()],
            None => Vec::new(),
        };

        Ok(BufPair { data, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_variable_deduplicates_by_path() {
        let mut template = VariableTemplate::new();
        let (first, existed) = template.add_variable(ContextVariable {
            path: vec!["id".to_string()],
        });
        assert!(!existed);
        let (second, existed) = template.add_variable(ContextVariable {
            path: vec!["id".to_string()],
        });
        assert!(existed);
        assert_eq!(first, second);

        let (third, existed) = template.add_variable(ContextVariable {
            path: vec!["other".to_string()],
        });
        assert!(!existed);
        assert_ne!(first, third);
    }

    struct FakeDataSource {
        response: serde_json::Value,
    }

    #[async_trait]
    impl DataSource for FakeDataSource {
        async fn load(&self, _input: &FetchInput) -> PlanResult<BufPair> {
            let data = self.response.get("data").cloned().unwrap_or(serde_json::Value::Null);
            let errors = match self.response.get("error") {
                Some(serde_json::Value::Array(errors)) => errors.clone(),
                Some(other) => vec![other.clone()],
                None => Vec::new(),
            };
            Ok(BufPair { data, errors })
        }
    }

    #[tokio::test]
    async fn fake_data_source_splits_data_and_errors() {
        let source = FakeDataSource {
            response: serde_json::json!({"data": {"me": {"id": "1"}}, "error": [{"message": "partial"}]}),
        };
        let input = FetchInput {
            url: "http://upstream".to_string(),
            body: FetchBody {
                query: "{me {id}}".to_string(),
                variables: serde_json::Map::new(),
            },
        };
        let result = source.load(&input).await.unwrap();
        assert_eq!(result.data["me"]["id"], "1");
        assert_eq!(result.errors.len(), 1);
    }
}
