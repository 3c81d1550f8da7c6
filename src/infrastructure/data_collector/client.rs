use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

const SERVICE: &str = "data_collector";

/// Client for the Data Collector's deletion call
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DataCollectorClient: Send + Sync {
    /// Ask the Data Collector to drop all data held for this email.
    /// Returns the collector's own success flag.
    async fn delete_user_data(&self, email: &str) -> Result<bool, DomainError>;
}

#[derive(Serialize)]
struct DeleteDataRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct DeleteDataResponse {
    success: bool,
}

/// Data Collector client speaking JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpDataCollectorClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpDataCollectorClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build Data Collector client: {}", e))
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DataCollectorClient for HttpDataCollectorClient {
    async fn delete_user_data(&self, email: &str) -> Result<bool, DomainError> {
        let url = format!("{}/rpc/delete-data", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&DeleteDataRequest { email })
            .send()
            .await
            .map_err(|e| DomainError::unavailable(SERVICE, format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::unavailable(
                SERVICE,
                format!("Returned error status: {}", response.status()),
            ));
        }

        let body: DeleteDataResponse = response.json().await.map_err(|e| {
            DomainError::unavailable(SERVICE, format!("Failed to parse response: {}", e))
        })?;

        debug!(email, success = body.success, "Data Collector deletion answered");

        Ok(body.success)
    }
}

/// Used when no Data Collector is configured
#[derive(Debug, Clone, Default)]
pub struct NoopDataCollectorClient;

#[async_trait]
impl DataCollectorClient for NoopDataCollectorClient {
    async fn delete_user_data(&self, email: &str) -> Result<bool, DomainError> {
        debug!(email, "No Data Collector configured, skipping data deletion");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HttpDataCollectorClient {
        HttpDataCollectorClient::new(server.uri(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_delete_user_data_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rpc/delete-data"))
            .and(body_json(json!({ "email": "mario@test.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server).delete_user_data("mario@test.com").await.unwrap();
        assert!(result);
    }

    #[tokio::test]
    async fn test_delete_user_data_reports_collector_flag() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rpc/delete-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
            .mount(&server)
            .await;

        let result = client(&server).delete_user_data("mario@test.com").await.unwrap();
        assert!(!result);
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rpc/delete-data"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client(&server).delete_user_data("mario@test.com").await;
        assert!(matches!(result, Err(DomainError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_malformed_body_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rpc/delete-data"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = client(&server).delete_user_data("mario@test.com").await;
        assert!(matches!(result, Err(DomainError::Unavailable { .. })));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client =
            HttpDataCollectorClient::new("http://collector:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://collector:8080");
    }

    #[tokio::test]
    async fn test_noop_client() {
        let result = NoopDataCollectorClient.delete_user_data("mario@test.com").await;
        assert!(!result.unwrap());
    }
}
