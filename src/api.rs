use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// Client for the n8n public REST API (`/api/v1`).
///
/// Holds a base URL and an API key, both immutable after construction.
/// Payloads are passed through as opaque [`serde_json::Value`]s; the client
/// performs no validation or interpretation of workflow JSON. Requests are
/// issued exactly once, with no retry or backoff.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base: Url,
    api_key: String,
}

/// Optional filters for [`Client::list_executions`]. Fields map onto the
/// `limit` and `lastId` query parameters; `None` fields are omitted.
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilter {
    pub limit: Option<u32>,
    pub last_id: Option<String>,
}

/// Outcome of [`Client::self_test`], serializable to the
/// `{status, message, details}` shape the diagnostic surface reports.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SelfTestReport {
    Ok {
        message: String,
        details: ConnectionDetails,
    },
    Error {
        message: String,
        details: FailureDetails,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionDetails {
    #[serde(rename = "workflowCount")]
    pub workflow_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureDetails {
    pub error: String,
}

/// Responses may nest the payload under a `data` key. Unwrap it when present
/// and non-null; otherwise hand back the body as parsed. A present-but-null
/// `data` falls through to the outer object.
fn unwrap_envelope(mut value: Value) -> Value {
    let data = value.as_object_mut().and_then(|map| match map.get("data") {
        Some(d) if !d.is_null() => map.remove("data"),
        _ => None,
    });
    data.unwrap_or(value)
}

impl Client {
    /// Create a client for the n8n instance at `base_url`, authenticating
    /// with `api_key`. Trailing slashes on the base URL are stripped so path
    /// concatenation never doubles them.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let base = Url::parse(base_url.trim_end_matches('/'))?;
        if base.cannot_be_a_base() {
            return Err(Error::UnsupportedBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            api_key: api_key.into(),
        })
    }

    /// Join `/api/v1` plus the given segments onto the base URL. Segments are
    /// percent-encoded, so ids containing reserved characters stay one
    /// segment (`a/b` becomes `a%2Fb`).
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().expect("base url checked in new");
            path.pop_if_empty();
            path.extend(["api", "v1"]);
            path.extend(segments);
        }
        url
    }

    /// The sole network entry point. Sends one request with the fixed header
    /// set and optional JSON body, then either fails with the status and raw
    /// body text, unwraps a JSON envelope, or returns the body as plain text
    /// for non-JSON content types.
    async fn request(&self, method: Method, url: Url, body: Option<Value>) -> Result<Value> {
        debug!(%method, %url, "n8n API request");
        let mut req = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header("X-N8N-API-KEY", &self.api_key);
        if let Some(body) = &body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        debug!(status = status.as_u16(), "n8n API response");

        if !status.is_success() {
            // Best effort: an unreadable error body becomes an empty string
            // rather than a secondary failure.
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_owned(),
                body,
            });
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        if is_json {
            Ok(unwrap_envelope(resp.json().await?))
        } else {
            Ok(Value::String(resp.text().await?))
        }
    }

    async fn get(&self, segments: &[&str]) -> Result<Value> {
        self.request(Method::GET, self.endpoint(segments), None)
            .await
    }

    async fn post(&self, segments: &[&str], body: Value) -> Result<Value> {
        self.request(Method::POST, self.endpoint(segments), Some(body))
            .await
    }

    async fn patch(&self, segments: &[&str], body: Value) -> Result<Value> {
        self.request(Method::PATCH, self.endpoint(segments), Some(body))
            .await
    }

    async fn delete(&self, segments: &[&str]) -> Result<Value> {
        self.request(Method::DELETE, self.endpoint(segments), None)
            .await
    }

    // instance

    pub async fn instance_info(&self) -> Result<Value> {
        self.get(&["health"]).await
    }

    pub async fn instance_version(&self) -> Result<Value> {
        self.get(&["settings"]).await
    }

    // workflows

    pub async fn list_workflows(&self) -> Result<Value> {
        self.get(&["workflows"]).await
    }

    pub async fn get_workflow(&self, id: &str) -> Result<Value> {
        self.get(&["workflows", id]).await
    }

    pub async fn create_workflow(&self, data: &Value) -> Result<Value> {
        self.post(&["workflows"], data.clone()).await
    }

    pub async fn update_workflow(&self, id: &str, data: &Value) -> Result<Value> {
        self.patch(&["workflows", id], data.clone()).await
    }

    pub async fn delete_workflow(&self, id: &str) -> Result<Value> {
        self.delete(&["workflows", id]).await
    }

    /// Trigger a workflow run, optionally passing input data (sent as
    /// `{"data": …}`; an empty object when omitted).
    pub async fn execute_workflow(&self, id: &str, data: Option<&Value>) -> Result<Value> {
        let body = match data {
            Some(data) => json!({ "data": data }),
            None => json!({}),
        };
        self.post(&["workflows", id, "execute"], body).await
    }

    /// Shorthand for updating a workflow with `{"active": true}`.
    pub async fn activate_workflow(&self, id: &str) -> Result<Value> {
        self.update_workflow(id, &json!({ "active": true })).await
    }

    /// Shorthand for updating a workflow with `{"active": false}`.
    pub async fn deactivate_workflow(&self, id: &str) -> Result<Value> {
        self.update_workflow(id, &json!({ "active": false })).await
    }

    // executions

    pub async fn list_executions(&self, filter: &ExecutionFilter) -> Result<Value> {
        let mut url = self.endpoint(&["executions"]);
        if filter.limit.is_some() || filter.last_id.is_some() {
            let mut query = url.query_pairs_mut();
            if let Some(limit) = filter.limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(last_id) = &filter.last_id {
                query.append_pair("lastId", last_id);
            }
        }
        self.request(Method::GET, url, None).await
    }

    pub async fn get_execution(&self, id: &str) -> Result<Value> {
        self.get(&["executions", id]).await
    }

    pub async fn stop_execution(&self, id: &str) -> Result<Value> {
        self.post(&["executions", id], json!({ "stop": true })).await
    }

    // tags

    pub async fn list_tags(&self) -> Result<Value> {
        self.get(&["tags"]).await
    }

    pub async fn create_tag(&self, data: &Value) -> Result<Value> {
        self.post(&["tags"], data.clone()).await
    }

    // credentials

    pub async fn list_credentials(&self) -> Result<Value> {
        self.get(&["credentials"]).await
    }

    pub async fn get_credential(&self, id: &str) -> Result<Value> {
        self.get(&["credentials", id]).await
    }

    pub async fn create_credential(&self, data: &Value) -> Result<Value> {
        self.post(&["credentials"], data.clone()).await
    }

    pub async fn update_credential(&self, id: &str, data: &Value) -> Result<Value> {
        self.patch(&["credentials", id], data.clone()).await
    }

    pub async fn delete_credential(&self, id: &str) -> Result<Value> {
        self.delete(&["credentials", id]).await
    }

    // node types

    pub async fn list_node_types(&self) -> Result<Value> {
        self.get(&["node-types"]).await
    }

    /// The API exposes no per-name endpoint, so this fetches the full list
    /// and scans for an exact (case-sensitive) `name` match.
    pub async fn get_node_type(&self, name: &str) -> Result<Option<Value>> {
        let node_types = self.list_node_types().await?;
        let found = node_types.as_array().and_then(|types| {
            types
                .iter()
                .find(|node| node.get("name").and_then(Value::as_str) == Some(name))
                .cloned()
        });
        Ok(found)
    }

    // variables

    pub async fn list_variables(&self) -> Result<Value> {
        self.get(&["variables"]).await
    }

    pub async fn get_variable(&self, id: &str) -> Result<Value> {
        self.get(&["variables", id]).await
    }

    pub async fn create_variable(&self, data: &Value) -> Result<Value> {
        self.post(&["variables"], data.clone()).await
    }

    pub async fn update_variable(&self, id: &str, data: &Value) -> Result<Value> {
        self.patch(&["variables", id], data.clone()).await
    }

    pub async fn delete_variable(&self, id: &str) -> Result<Value> {
        self.delete(&["variables", id]).await
    }

    // diagnostics

    /// Probe the API by listing workflows. Returns `true` on any 2xx answer
    /// and `false` on any failure; details are discarded.
    pub async fn test_connection(&self) -> bool {
        self.list_workflows().await.is_ok()
    }

    /// Like [`test_connection`](Client::test_connection), but reports a
    /// structured status instead of a bare boolean. Never fails.
    pub async fn self_test(&self) -> SelfTestReport {
        match self.list_workflows().await {
            Ok(workflows) => {
                let workflow_count = workflows.as_array().map_or(0, Vec::len);
                SelfTestReport::Ok {
                    message: format!("n8n API reachable, {workflow_count} workflow(s) visible"),
                    details: ConnectionDetails { workflow_count },
                }
            }
            Err(err) => SelfTestReport::Error {
                message: err.to_string(),
                details: FailureDetails {
                    error: format!("{err:?}"),
                },
            },
        }
    }
}
