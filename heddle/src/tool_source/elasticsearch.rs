//! Elasticsearch ingest pipeline simulation as a `ToolSource`.
//!
//! Exposes one tool, `elasticsearch_simulate_pipeline`, which posts
//! `{pipeline, docs}` to `<base>/_ingest/pipeline/_simulate` and returns the
//! response body as pretty JSON. Nothing is indexed.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Tool name offered to the validator.
pub const TOOL_SIMULATE_PIPELINE: &str = "elasticsearch_simulate_pipeline";

/// Local single-node cluster.
pub const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";

/// Client for the simulate API of one cluster.
#[derive(Debug, Clone)]
pub struct ElasticsearchTool {
    base_url: String,
    client: reqwest::Client,
    basic_auth: Option<(String, String)>,
}

impl Default for ElasticsearchTool {
    fn default() -> Self {
        Self::new(DEFAULT_ELASTICSEARCH_URL)
    }
}

impl ElasticsearchTool {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            basic_auth: None,
        }
    }

    pub fn with_basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            basic_auth: Some((username.into(), password.into())),
            ..self
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn spec() -> ToolSpec {
        ToolSpec {
            name: TOOL_SIMULATE_PIPELINE.to_string(),
            description: Some(
                "Simulate an Elasticsearch ingest pipeline to test how documents would be processed"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pipeline": {
                        "type": "object",
                        "description": "The pipeline configuration"
                    },
                    "docs": {
                        "type": "array",
                        "description": "Documents to process"
                    }
                },
                "required": ["pipeline", "docs"]
            }),
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.basic_auth {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    /// Runs the simulate API with an already validated body.
    pub async fn simulate(&self, pipeline: &Value, docs: &Value) -> Result<Value, ToolSourceError> {
        let url = format!("{}/_ingest/pipeline/_simulate", self.base_url);
        debug!(url = %url, "elasticsearch simulate");
        let body = json!({ "pipeline": pipeline, "docs": docs });
        let res = self
            .request(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| simulate_failed(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let err_body = res.text().await.unwrap_or_default();
            warn!(status = %status, "elasticsearch simulate rejected");
            return Err(simulate_failed(format!("{}: {}", status, err_body)));
        }
        res.json::<Value>()
            .await
            .map_err(|e| simulate_failed(e.to_string()))
    }

    /// Pings the cluster root. Any failure reads as "not running".
    pub async fn is_running(&self) -> bool {
        match self.request(self.client.get(&self.base_url)).send().await {
            Ok(res) if res.status().is_success() => true,
            Ok(res) => {
                warn!(status = %res.status(), url = %self.base_url, "elasticsearch is not accessible");
                false
            }
            Err(e) => {
                warn!(error = %e, url = %self.base_url, "elasticsearch is not accessible");
                false
            }
        }
    }
}

fn simulate_failed(detail: String) -> ToolSourceError {
    ToolSourceError::Transport(format!("failed to simulate ingest pipeline: {}", detail))
}

/// Pulls `pipeline` (object) and `docs` (array) out of the call arguments.
fn parse_arguments(arguments: &Value) -> Result<(&Value, &Value), ToolSourceError> {
    let pipeline = arguments
        .get("pipeline")
        .filter(|v| v.is_object())
        .ok_or_else(|| ToolSourceError::InvalidInput("pipeline must be an object".into()))?;
    let docs = arguments
        .get("docs")
        .filter(|v| v.is_array())
        .ok_or_else(|| ToolSourceError::InvalidInput("docs must be an array".into()))?;
    Ok((pipeline, docs))
}

#[async_trait]
impl ToolSource for ElasticsearchTool {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(vec![Self::spec()])
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        if name != TOOL_SIMULATE_PIPELINE {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        let (pipeline, docs) = parse_arguments(&arguments)?;
        let response = self.simulate(pipeline, docs).await?;
        let text = serde_json::to_string_pretty(&response).unwrap_or_else(|_| response.to_string());
        Ok(ToolCallContent { text })
    }
}
