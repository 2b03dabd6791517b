//! Forge API client implementation.

use std::time::Duration;

use async_trait::async_trait;
use gitforge_core::{Error, ForgeApi, Result};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

/// Request timeout for backend calls. The protocol layer has no
/// cancellation of its own, so a hung backend call is bounded here.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the forge REST API.
pub struct ApiClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client for the given forge instance.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            http: reqwest::Client::builder()
                .user_agent("gitforge-tools")
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// The API URL for a given endpoint path.
    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.api_url(path);
        debug!(method = %method, url = %url, "forge API request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("{} {}: {}", method, path, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("read response: {}", e)))?;

        if status.as_u16() >= 400 {
            warn!(status = status.as_u16(), message = %text, "forge API error response");
            return Err(Error::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        // DELETE with 204 No Content returns no body
        if status == StatusCode::NO_CONTENT || text.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ForgeApi for ApiClient {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        self.send(Method::GET, path, query, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value> {
        self.send(Method::POST, path, &[], body.as_ref()).await
    }

    async fn patch(&self, path: &str, body: Option<Value>) -> Result<Value> {
        self.send(Method::PATCH, path, &[], body.as_ref()).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, &[], None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(server.base_url(), "secret-token")
    }

    #[tokio::test]
    async fn test_get_sends_token_and_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/repos/acme/widgets/labels")
                    .header("Authorization", "token secret-token")
                    .query_param("page", "2");
                then.status(200).json_body(json!([{"id": 1, "name": "bug"}]));
            })
            .await;

        let client = client_for(&server);
        let value = client
            .get(
                "/repos/acme/widgets/labels",
                &[("page".to_string(), "2".to_string())],
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(value[0]["name"], "bug");
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/repos/acme/widgets/labels")
                    .header("Content-Type", "application/json")
                    .json_body(json!({"name": "bug", "color": "#ff0000"}));
                then.status(201).json_body(json!({"id": 7, "name": "bug"}));
            })
            .await;

        let client = client_for(&server);
        let value = client
            .post(
                "/repos/acme/widgets/labels",
                Some(json!({"name": "bug", "color": "#ff0000"})),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(value["id"], 7);
    }

    #[tokio::test]
    async fn test_error_status_carries_body_text() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/repos/acme/widgets/labels/9");
                then.status(404).body("label does not exist");
            })
            .await;

        let client = client_for(&server);
        let err = client.delete("/repos/acme/widgets/labels/9").await.unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("label does not exist"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_content_is_null_not_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/repos/acme/widgets/labels/9");
                then.status(204);
            })
            .await;

        let client = client_for(&server);
        client.delete("/repos/acme/widgets/labels/9").await.unwrap();
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/version");
                then.status(200).json_body(json!({"version": "1.0"}));
            })
            .await;

        let client = ApiClient::new(format!("{}/", server.base_url()), "t");
        client.get("/version", &[]).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_body_success_is_null() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/version");
                then.status(200);
            })
            .await;

        let client = client_for(&server);
        let value = client.get("/version", &[]).await.unwrap();
        assert!(value.is_null());
    }
}
