//! Hetzner Cloud API client wrapper for action and server operations

use crate::hcloud::{ActionClient, ClientError, ClientResult};
use crate::types::{Action, ActionId, ServerCreateOpts, ServerCreateResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Base URL of the public Hetzner Cloud API.
pub const DEFAULT_ENDPOINT: &str = "https://api.hetzner.cloud/v1";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct ActionEnvelope {
    action: Action,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Authenticated client for the Hetzner Cloud API.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct HcloudClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HcloudClient {
    /// Create a client against the public API using an API token.
    pub fn new(token: &str) -> ClientResult<Self> {
        Self::with_endpoint(token, DEFAULT_ENDPOINT)
    }

    /// Create a client against a custom endpoint, e.g. a proxy or a mock server.
    pub fn with_endpoint(token: &str, endpoint: &str) -> ClientResult<Self> {
        if token.trim().is_empty() {
            return Err(ClientError::Config("API token must not be empty".to_string()));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ClientError::Config(format!("Invalid API token: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the current state of an action.
    pub async fn get_action(&self, id: ActionId) -> ClientResult<Action> {
        let url = format!("{}/actions/{id}", self.endpoint);
        log::trace!("GET {url}");

        let response = self.http.get(&url).send().await?;
        let envelope: ActionEnvelope = decode(response).await?;
        Ok(envelope.action)
    }

    /// Create a server. The returned actions still have to be waited on.
    pub async fn create_server(&self, opts: &ServerCreateOpts) -> ClientResult<ServerCreateResult> {
        let url = format!("{}/servers", self.endpoint);
        log::debug!("Creating server '{}' ({})", opts.name, opts.server_type);

        let response = self.http.post(&url).json(opts).send().await?;
        decode(response).await
    }
}

#[async_trait]
impl ActionClient for HcloudClient {
    async fn get_action(&self, id: ActionId) -> ClientResult<Action> {
        Self::get_action(self, id).await
    }
}

/// Decode a success body into `T`, or turn the API error envelope into `ClientError::Api`.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to decode body: {e}")));
    }

    // Not every failure comes from the API itself (proxies, load balancers)
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => Err(ClientError::Api {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope.error.message,
        }),
        Err(_) => Err(ClientError::Api {
            status: status.as_u16(),
            code: "unknown".to_string(),
            message: body,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionStatus;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_empty_token_is_rejected() {
        let result = HcloudClient::new("  ");
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_endpoint_trailing_slash_is_trimmed() {
        let client = HcloudClient::with_endpoint("token", "http://localhost:1234/v1/")
            .expect("client should build");
        assert_eq!(client.endpoint(), "http://localhost:1234/v1");
    }

    #[tokio::test]
    async fn test_get_action_sends_token_and_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/actions/42"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "action": {
                    "id": 42,
                    "command": "create_server",
                    "status": "running",
                    "progress": 50,
                    "started": "2016-01-30T23:55:00+00:00",
                    "finished": null,
                    "resources": [{"id": 7, "type": "server"}],
                    "error": null
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HcloudClient::with_endpoint("secret", &server.uri()).expect("client");
        let action = client.get_action(ActionId(42)).await.expect("action");

        assert_eq!(action.id, ActionId(42));
        assert_eq!(action.command, "create_server");
        assert_eq!(action.status, ActionStatus::Running);
        assert_eq!(action.progress, 50);
        assert!(action.error.is_none());
    }

    #[tokio::test]
    async fn test_api_error_envelope_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/actions/1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "not_found", "message": "action with ID '1' not found"}
            })))
            .mount(&server)
            .await;

        let client = HcloudClient::with_endpoint("secret", &server.uri()).expect("client");
        let err = client.get_action(ActionId(1)).await.expect_err("should fail");

        match err {
            ClientError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 404);
                assert_eq!(code, "not_found");
                assert!(message.contains("not found"));
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = HcloudClient::with_endpoint("secret", &server.uri()).expect("client");
        let err = client.get_action(ActionId(1)).await.expect_err("should fail");

        match err {
            ClientError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 502);
                assert_eq!(code, "unknown");
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"nope\": true}"))
            .mount(&server)
            .await;

        let client = HcloudClient::with_endpoint("secret", &server.uri()).expect("client");
        let err = client.get_action(ActionId(1)).await.expect_err("should fail");
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_create_server_posts_options() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/servers"))
            .and(body_json(json!({
                "name": "example",
                "server_type": "cx22",
                "image": "ubuntu-24.04",
                "location": "fsn1"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "server": {"id": 7, "name": "example", "status": "initializing"},
                "action": {"id": 100, "command": "create_server", "status": "running"},
                "next_actions": [{"id": 101, "command": "start_server", "status": "running"}],
                "root_password": "hunter2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HcloudClient::with_endpoint("secret", &server.uri()).expect("client");
        let result = client
            .create_server(&ServerCreateOpts {
                name: "example".into(),
                server_type: "cx22".into(),
                image: "ubuntu-24.04".into(),
                location: Some("fsn1".into()),
                ..Default::default()
            })
            .await
            .expect("server should be created");

        assert_eq!(result.server.id, 7);
        assert_eq!(result.action.id, ActionId(100));
        assert_eq!(result.next_actions.len(), 1);
        assert_eq!(result.next_actions[0].id, ActionId(101));
        assert_eq!(result.root_password.as_deref(), Some("hunter2"));
    }
}
