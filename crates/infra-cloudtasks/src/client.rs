// Cloud Tasks QueueClient Implementation

use async_trait::async_trait;
use fougere_core::domain::{QueueSpec, WireQueue};
use fougere_core::error::{AppError, Result};
use fougere_core::port::{LookupOutcome, QueueClient};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://cloudtasks.googleapis.com/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fields replaced on every update (full replace of limits and retry policy)
const UPDATE_MASK: &str = "rateLimits.maxDispatchesPerSecond,rateLimits.maxConcurrentDispatches,retryConfig.minBackoff,retryConfig.maxBackoff";

/// Cloud Tasks client configuration
#[derive(Debug, Clone)]
pub struct CloudTasksClientConfig {
    /// API root, e.g. `https://cloudtasks.googleapis.com/`
    pub endpoint: String,
    /// Per-request deadline
    pub timeout: Duration,
    /// OAuth2 access token sent as `Bearer`; requests are unauthenticated when `None`
    pub access_token: Option<String>,
}

impl Default for CloudTasksClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            access_token: None,
        }
    }
}

// Helper to convert reqwest::Error to AppError with structured information
fn map_reqwest_error(err: reqwest::Error) -> AppError {
    let status = err.status().map(|s| s.as_u16());

    if err.is_timeout() {
        AppError::remote(status, format!("Request timed out: {}", err))
    } else if err.is_connect() {
        AppError::remote(status, format!("Connection failed: {}", err))
    } else if err.is_decode() {
        AppError::remote(status, format!("Invalid response body: {}", err))
    } else {
        AppError::remote(status, format!("HTTP error: {}", err))
    }
}

// Non-success status to AppError, keeping the body for diagnosis
async fn status_error(response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown status").to_string()
    } else {
        body.trim().to_string()
    };
    AppError::remote(Some(status.as_u16()), message)
}

/// QueueClient over the Cloud Tasks REST API (v2)
pub struct CloudTasksClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl CloudTasksClient {
    pub fn new(config: CloudTasksClientConfig) -> Result<Self> {
        // Keep a trailing slash so joined paths extend the endpoint path
        let mut raw = config.endpoint.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let endpoint = Url::parse(&raw)
            .map_err(|e| AppError::Config(format!("Invalid endpoint '{}': {}", config.endpoint, e)))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token,
        })
    }

    /// Client against `endpoint` with default timeout and no authentication
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        Self::new(CloudTasksClientConfig {
            endpoint: endpoint.into(),
            ..Default::default()
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.endpoint
            .join(&format!("v2/{}", path))
            .map_err(|e| AppError::Config(format!("Invalid Cloud Tasks URL for '{}': {}", path, e)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.authorize(request)
            .send()
            .await
            .map_err(map_reqwest_error)
    }
}

#[async_trait]
impl QueueClient for CloudTasksClient {
    async fn lookup(&self, spec: &QueueSpec) -> Result<LookupOutcome> {
        let url = self.url(&spec.resource_name())?;
        debug!(method = "GET", url = %url, "Looking up queue");

        let response = self.send(self.http.get(url)).await?;
        let status = response.status();
        debug!(queue = %spec.name, status = status.as_u16(), "Lookup response");

        if status == StatusCode::NOT_FOUND {
            return Ok(LookupOutcome::NotFound);
        }
        if !status.is_success() {
            return Err(status_error(response).await);
        }

        // Presence is decided by the status; an unreadable body still means found
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let queue = serde_json::from_slice::<WireQueue>(&body).unwrap_or_else(|e| {
            debug!(queue = %spec.name, error = %e, "Lookup body not decodable");
            WireQueue {
                name: spec.resource_name(),
                rate_limits: Default::default(),
                retry_config: Default::default(),
            }
        });
        Ok(LookupOutcome::Found(queue))
    }

    async fn create(&self, spec: &QueueSpec, queue: &WireQueue) -> Result<()> {
        let url = self.url(&format!("{}/queues", spec.parent()))?;
        let body = queue.renamed(spec.resource_name());
        debug!(method = "POST", url = %url, "Creating queue");

        let response = self.send(self.http.post(url).json(&body)).await?;
        debug!(queue = %spec.name, status = response.status().as_u16(), "Create response");

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }

    async fn update(&self, spec: &QueueSpec, queue: &WireQueue) -> Result<()> {
        let mut url = self.url(&spec.resource_name())?;
        url.query_pairs_mut().append_pair("updateMask", UPDATE_MASK);
        let body = queue.renamed(spec.resource_name());
        debug!(method = "PATCH", url = %url, "Updating queue");

        let response = self.send(self.http.patch(url).json(&body)).await?;
        debug!(queue = %spec.name, status = response.status().as_u16(), "Update response");

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const QUEUE_PATH: &str =
        "/v2/projects/project-123/locations/northamerica-northeast1/queues/banane-queue-1-project-123";

    fn spec() -> QueueSpec {
        QueueSpec {
            name: "banane-queue-1-project-123".to_string(),
            region: "northamerica-northeast1".to_string(),
            project_id: "project-123".to_string(),
            min_backoff: "1s".to_string(),
            max_backoff: "10s".to_string(),
            max_concurrent_dispatches: 100,
            max_dispatches_per_second: 1000.0,
        }
    }

    fn remote_body() -> serde_json::Value {
        json!({
            "name": "projects/project-123/locations/northamerica-northeast1/queues/banane-queue-1-project-123",
            "rateLimits": {
                "maxDispatchesPerSecond": 1000.0,
                "maxConcurrentDispatches": 100
            },
            "retryConfig": {
                "minBackoff": "1s",
                "maxBackoff": "10s"
            }
        })
    }

    async fn client(server: &MockServer) -> CloudTasksClient {
        CloudTasksClient::with_endpoint(server.uri()).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = CloudTasksClientConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.access_token.is_none());

        let client = CloudTasksClient::new(config).unwrap();
        assert_eq!(client.endpoint().as_str(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_endpoint_base_path_is_kept() {
        let client = CloudTasksClient::with_endpoint("http://localhost:8123/tasks").unwrap();
        let url = client.url(&spec().resource_name()).unwrap();
        assert_eq!(
            url.path(),
            "/tasks/v2/projects/project-123/locations/northamerica-northeast1/queues/banane-queue-1-project-123"
        );
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let result = CloudTasksClient::with_endpoint("not a url");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_lookup_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(QUEUE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(remote_body()))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client(&server).await.lookup(&spec()).await.unwrap();

        match outcome {
            LookupOutcome::Found(queue) => {
                assert_eq!(queue.rate_limits.max_concurrent_dispatches, 100);
                assert_eq!(queue.retry_config.min_backoff, "1s");
            }
            LookupOutcome::NotFound => panic!("expected queue to be found"),
        }
    }

    #[tokio::test]
    async fn test_lookup_success_without_body_is_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(QUEUE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client(&server).await.lookup(&spec()).await.unwrap();

        match outcome {
            LookupOutcome::Found(queue) => {
                assert_eq!(queue.name, spec().resource_name());
            }
            LookupOutcome::NotFound => panic!("expected queue to be found"),
        }
    }

    #[tokio::test]
    async fn test_lookup_not_found_is_structural() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(QUEUE_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND" }
            })))
            .mount(&server)
            .await;

        let outcome = client(&server).await.lookup(&spec()).await.unwrap();
        assert_eq!(outcome, LookupOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_other_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(QUEUE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("The caller does not have permission"))
            .mount(&server)
            .await;

        let err = client(&server).await.lookup(&spec()).await.unwrap_err();
        match err {
            AppError::Remote { status, message } => {
                assert_eq!(status, Some(403));
                assert!(message.contains("permission"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_create_posts_qualified_queue_to_parent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/v2/projects/project-123/locations/northamerica-northeast1/queues",
            ))
            .and(body_json(remote_body()))
            .respond_with(ResponseTemplate::new(200).set_body_json(remote_body()))
            .expect(1)
            .mount(&server)
            .await;

        let spec = spec();
        let result = client(&server)
            .await
            .create(&spec, &WireQueue::from_spec(&spec))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_conflict_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let spec = spec();
        let err = client(&server)
            .await
            .create(&spec, &WireQueue::from_spec(&spec))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Remote error (409): Conflict");
    }

    #[tokio::test]
    async fn test_update_patches_with_mask() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(QUEUE_PATH))
            .and(query_param("updateMask", UPDATE_MASK))
            .and(body_json(remote_body()))
            .respond_with(ResponseTemplate::new(200).set_body_json(remote_body()))
            .expect(1)
            .mount(&server)
            .await;

        let spec = spec();
        let result = client(&server)
            .await
            .update(&spec, &WireQueue::from_spec(&spec))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(QUEUE_PATH))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = CloudTasksClient::new(CloudTasksClientConfig {
            endpoint: server.uri(),
            access_token: Some("secret-token".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(client.lookup(&spec()).await.unwrap(), LookupOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_timeout_is_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = CloudTasksClient::new(CloudTasksClientConfig {
            endpoint: server.uri(),
            timeout: Duration::from_millis(100),
            access_token: None,
        })
        .unwrap();

        let err = client.lookup(&spec()).await.unwrap_err();
        assert!(matches!(err, AppError::Remote { .. }));
        assert!(err.to_string().contains("timed out"));
    }
}
