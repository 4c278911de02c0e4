//! Async client for the n8n public REST API.
//!
//! [`Client`] wraps `/api/v1` with typed convenience methods for workflows,
//! executions, tags, credentials, node types and variables, plus two
//! diagnostic helpers. Payloads stay opaque JSON; responses have their
//! `{data: …}` envelope unwrapped transparently.

pub mod api;
pub mod config;
pub mod error;

pub use api::{Client, ExecutionFilter, SelfTestReport};
pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_workflows() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/workflows"))
            .and(header("X-N8N-API-KEY", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "id": "1", "name": "Test" }]
            })))
            .mount(&server)
            .await;

        let client = crate::Client::new(&server.uri(), "test-key").unwrap();
        let workflows = client.list_workflows().await.unwrap();
        // ensure the mock was hit
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
        let workflows = workflows.as_array().unwrap();
        assert_eq!(workflows.len(), 1);
        assert_eq!(workflows[0]["id"], "1");
        assert_eq!(workflows[0]["name"], "Test");
    }

    #[tokio::test]
    async fn create_workflow() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/workflows"))
            .and(header("X-N8N-API-KEY", "test-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "id": "2",
                    "name": "New"
                })),
            )
            .mount(&server)
            .await;

        let client = crate::Client::new(&server.uri(), "test-key").unwrap();
        let wf = client
            .create_workflow(&serde_json::json!({
                "name": "New",
                "nodes": [],
                "connections": {},
                "settings": {}
            }))
            .await
            .unwrap();
        // no envelope on this response, so the body comes back as-is
        assert_eq!(wf["id"], "2");
        assert_eq!(wf["name"], "New");
    }
}
