/// Workflow backend HTTP client
///
/// Serializes editor graphs through the mapping layer and talks to the
/// workflow backend over `reqwest`. The client never mutates a graph; load
/// operations return a fresh `WorkflowGraph` for the caller to hand to
/// `GraphEditor::load`.

use crate::api::error::{ApiError, Envelope, ErrorBody, VALIDATION_ERROR_CODE};
use crate::api::events::ExecutionStream;
use crate::api::validation::ValidationReport;
use crate::blocks::BlockCatalog;
use crate::config::ApiConfig;
use crate::workflow::mapping::{to_backend_graph, transform_workflow_to_canvas, trigger_node_id};
use crate::workflow::types::{
    BackendEdge, BackendNode, WorkflowDetail, WorkflowDocument, WorkflowDraft, WorkflowGraph,
    WorkflowSummary,
};
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Body of `POST /workflows/validate`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateRequest {
    nodes: Vec<BackendNode>,
    edges: Vec<BackendEdge>,
    trigger_node_id: String,
}

/// `data` of a 2xx validate response
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateData {
    #[serde(default = "default_true")]
    valid: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Value,
}

fn default_true() -> bool {
    true
}

/// Classify a 2xx or 400/422 validate response
///
/// Error envelopes of either status become an invalid report. A 400/422
/// body that is not an envelope keeps its raw text as the message.
fn validation_report(
    graph: &WorkflowGraph,
    status: StatusCode,
    body: &str,
) -> Result<ValidationReport, ApiError> {
    let envelope = serde_json::from_str::<Envelope<ValidateData>>(body);
    match envelope {
        Ok(Envelope {
            success: false,
            error: Some(error),
            ..
        }) => Ok(ValidationReport::from_failure(
            graph,
            error.code.as_deref().unwrap_or_default(),
            &error.display_message(status.as_u16(), body),
            &error.details,
        )),
        Ok(Envelope {
            data: Some(data), ..
        }) if status.is_success() => Ok(if data.valid {
            ValidationReport::ok()
        } else {
            ValidationReport::from_failure(
                graph,
                data.code.as_deref().unwrap_or(VALIDATION_ERROR_CODE),
                data.message.as_deref().unwrap_or_default(),
                &data.details,
            )
        }),
        _ if status.is_success() => Err(ApiError::Decode(format!(
            "validate response has neither data nor error (status {})",
            status
        ))),
        _ => Ok(ValidationReport::from_failure(
            graph,
            "",
            &ErrorBody::default().display_message(status.as_u16(), body),
            &Value::Null,
        )),
    }
}

/// Id and version assigned on create/save
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWorkflow {
    pub id: String,
    #[serde(default)]
    pub version: Option<u32>,
}

/// Response of `POST /workflows/:id/execute`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionHandle {
    pub execution_id: String,
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Token for `subscribe_execution`
    #[serde(default)]
    pub subscription_token: Option<String>,
}

/// Response of `GET /workflows/executions/:id`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDetail {
    pub id: String,
    #[serde(default)]
    pub workflow_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Response of `POST /executions/:id/sign`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    /// The client must broadcast `payload` itself and report the hash
    #[serde(default)]
    pub submit_on_client: bool,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub execution_id: Option<String>,
}

/// HTTP client for the workflow backend
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    catalog: Arc<BlockCatalog>,
}

impl WorkflowClient {
    pub fn new(config: &ApiConfig, catalog: Arc<BlockCatalog>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            catalog,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn catalog(&self) -> &Arc<BlockCatalog> {
        &self.catalog
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("🌍 {} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and unwrap the response envelope's `data`
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let err = ApiError::from_response(response).await;
            tracing::error!("❌ Backend request failed ({}): {}", status, err);
            return Err(err);
        }

        let body = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("{} (status {})", e, status)))?;
        if !envelope.success {
            if let Some(error) = envelope.error {
                return Err(ApiError::Http {
                    status: status.as_u16(),
                    code: error.code,
                    message: error.message.unwrap_or_else(|| "request failed".to_string()),
                });
            }
        }
        envelope
            .data
            .ok_or_else(|| ApiError::Decode("response envelope has no data".to_string()))
    }

    /// Send a request whose response carries nothing the caller needs
    async fn send_unit(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let err = ApiError::from_response(response).await;
        tracing::error!("❌ Backend request failed ({}): {}", status, err);
        Err(err)
    }

    /// Check a graph against the backend without persisting it
    ///
    /// Schema and structure problems come back as an invalid report, whether
    /// the backend answers 2xx with an error envelope or 400/422. Auth,
    /// rate-limit, server and transport failures are errors.
    pub async fn validate_workflow(&self, graph: &WorkflowGraph) -> Result<ValidationReport, ApiError> {
        let (nodes, edges) = to_backend_graph(&self.catalog, graph);
        let body = ValidateRequest {
            nodes,
            edges,
            trigger_node_id: trigger_node_id(graph),
        };
        let builder = self.request(Method::POST, "/workflows/validate").json(&body);

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() && !matches!(status.as_u16(), 400 | 422) {
            let err = ApiError::from_response(response).await;
            tracing::error!("❌ Validation request failed ({}): {}", status, err);
            return Err(err);
        }
        let raw = response.text().await?;
        let report = validation_report(graph, status, &raw)?;

        if report.valid {
            tracing::info!("✅ Workflow validated");
        } else {
            tracing::warn!("⚠️ Workflow validation failed: {}", report.message);
        }
        Ok(report)
    }

    pub async fn create_workflow(
        &self,
        draft: &WorkflowDraft,
        graph: &WorkflowGraph,
    ) -> Result<SavedWorkflow, ApiError> {
        let document = WorkflowDocument::from_graph(&self.catalog, graph, draft);
        let saved: SavedWorkflow = self
            .send(self.request(Method::POST, "/workflows").json(&document))
            .await?;
        tracing::info!("💾 Created workflow '{}' ({})", draft.name, saved.id);
        Ok(saved)
    }

    /// Overwrite an existing workflow; `version` is the one last loaded
    pub async fn save_workflow(
        &self,
        workflow_id: &str,
        draft: &WorkflowDraft,
        graph: &WorkflowGraph,
        version: Option<u32>,
    ) -> Result<SavedWorkflow, ApiError> {
        let mut document = WorkflowDocument::from_graph(&self.catalog, graph, draft);
        document.version = version;
        let path = format!("/workflows/{}", workflow_id);
        let saved: SavedWorkflow = self
            .send(self.request(Method::PUT, &path).json(&document))
            .await?;
        tracing::info!("💾 Saved workflow {} (version {:?})", saved.id, saved.version);
        Ok(saved)
    }

    pub async fn execute_workflow(
        &self,
        workflow_id: &str,
        initial_input: Value,
    ) -> Result<ExecutionHandle, ApiError> {
        let path = format!("/workflows/{}/execute", workflow_id);
        let handle: ExecutionHandle = self
            .send(
                self.request(Method::POST, &path)
                    .json(&json!({ "initialInput": initial_input })),
            )
            .await?;
        tracing::info!(
            "🚀 Started execution {} of workflow {} ({})",
            handle.execution_id,
            workflow_id,
            handle.status
        );
        Ok(handle)
    }

    pub async fn get_workflow(&self, workflow_id: &str) -> Result<WorkflowDetail, ApiError> {
        let path = format!("/workflows/{}", workflow_id);
        self.send(self.request(Method::GET, &path)).await
    }

    /// Fetch a workflow and rebuild its canvas graph
    pub async fn load_workflow(&self, workflow_id: &str) -> Result<(WorkflowDetail, WorkflowGraph), ApiError> {
        let detail = self.get_workflow(workflow_id).await?;
        let graph = transform_workflow_to_canvas(&self.catalog, &detail);
        tracing::info!("📥 Loaded workflow '{}' ({})", detail.name, detail.id);
        Ok((detail, graph))
    }

    pub async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>, ApiError> {
        self.send(self.request(Method::GET, "/workflows")).await
    }

    pub async fn delete_workflow(&self, workflow_id: &str) -> Result<(), ApiError> {
        let path = format!("/workflows/{}", workflow_id);
        self.send_unit(self.request(Method::DELETE, &path)).await?;
        tracing::info!("🗑️ Deleted workflow {}", workflow_id);
        Ok(())
    }

    pub async fn get_execution(&self, execution_id: &str) -> Result<ExecutionDetail, ApiError> {
        let path = format!("/workflows/executions/{}", execution_id);
        self.send(self.request(Method::GET, &path)).await
    }

    /// Open the execution's event stream
    pub async fn subscribe_execution(
        &self,
        execution_id: &str,
        token: Option<&str>,
    ) -> Result<ExecutionStream, ApiError> {
        let path = format!("/workflows/executions/{}/subscribe", execution_id);
        let mut builder = self
            .request(Method::GET, &path)
            .header(reqwest::header::ACCEPT, "text/event-stream");
        if let Some(token) = token {
            builder = builder.query(&[("token", token)]);
        }

        let response = builder.send().await?;
        if response.status() != StatusCode::OK {
            return Err(ApiError::from_response(response).await);
        }
        tracing::info!("📡 Subscribed to execution {}", execution_id);
        Ok(ExecutionStream::new(execution_id.to_string(), response))
    }

    /// Resume a paused execution with an encoded Safe signature
    pub async fn submit_signature(
        &self,
        execution_id: &str,
        signature: &str,
    ) -> Result<SignResponse, ApiError> {
        let path = format!("/executions/{}/sign", execution_id);
        let response: SignResponse = self
            .send(self.request(Method::POST, &path).json(&json!({ "signature": signature })))
            .await?;
        tracing::info!(
            "✍️ Signature submitted for execution {} (client submit: {})",
            execution_id,
            response.submit_on_client
        );
        Ok(response)
    }

    /// Report the hash of a transaction the client broadcast itself
    pub async fn report_client_tx(&self, execution_id: &str, tx_hash: &str) -> Result<(), ApiError> {
        let path = format!("/executions/{}/report-client-tx", execution_id);
        self.send_unit(self.request(Method::POST, &path).json(&json!({ "txHash": tx_hash })))
            .await
    }
}
