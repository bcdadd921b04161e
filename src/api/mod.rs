pub mod models;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::contact::ContactMessage;
pub use models::{ContactResponse, Project};
use models::{Envelope, ErrorBody, HealthStatus};

/// Every endpoint lives under this prefix
const API_PREFIX: &str = "/api/v1";

pub const NETWORK_ERROR: &str = "Network error. Please check your connection and try again.";
pub const SEND_FAILED: &str = "Failed to send message. Please try again.";
const REQUEST_FAILED: &str = "Request failed. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx answer, or a 2xx answer whose body reports failure
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// No usable response: DNS, refused connection, reset, timeout
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 2xx answer whose body could not be read; `fallback` is the user-facing text
    #[error("unexpected response: {reason}")]
    Decode { reason: String, fallback: &'static str },
}

impl ApiError {
    /// Text shown to the user for this failure
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Network(_) => NETWORK_ERROR.to_string(),
            ApiError::Decode { fallback, .. } => fallback.to_string(),
        }
    }
}

/// Thin client for the portfolio API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// POST the message as JSON. One attempt, no retry.
    pub async fn submit_contact(&self, message: &ContactMessage) -> Result<ContactResponse, ApiError> {
        let url = self.endpoint("/contact");
        tracing::debug!("POST {}", url);

        let response = self.http.post(&url).json(message).send().await?;
        let body: ContactResponse = decode(response, SEND_FAILED).await?;

        if body.is_rejection() {
            let message = ErrorBody { error: body.error.clone(), message: body.message.clone() }
                .into_message()
                .unwrap_or_else(|| SEND_FAILED.to_string());
            return Err(ApiError::Server { status: 200, message });
        }

        tracing::info!("Contact message accepted by {}", self.base_url);
        Ok(body)
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        let url = self.endpoint("/projects");
        tracing::debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let envelope: Envelope<Vec<Project>> = decode(response, REQUEST_FAILED).await?;

        if let Some(count) = envelope.count {
            if count as usize != envelope.data.len() {
                tracing::warn!("Project count {} does not match {} entries", count, envelope.data.len());
            }
        }
        Ok(envelope.data)
    }

    pub async fn get_project(&self, id: u64) -> Result<Project, ApiError> {
        let url = self.endpoint(&format!("/projects/{}", id));
        tracing::debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let envelope: Envelope<Project> = decode(response, REQUEST_FAILED).await?;
        Ok(envelope.data)
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = self.endpoint("/health");
        tracing::debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        decode(response, REQUEST_FAILED).await
    }
}

/// Read the body and turn it into `T`, or into a server error carrying the
/// body's `error`/`message` text (`fallback` when there is none).
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &'static str,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| fallback.to_string());
        tracing::warn!("Request failed with {}: {}", status, message);
        return Err(ApiError::Server { status: status.as_u16(), message });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::Decode { reason: e.to_string(), fallback })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ContactMessage {
        ContactMessage::new("John", "john@example.com", "Hi", "Hello")
    }

    fn client(server: &mockito::Server) -> ApiClient {
        ApiClient::new(server.url(), None).unwrap()
    }

    #[tokio::test]
    async fn test_submit_contact_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/contact")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "name": "John",
                "email": "john@example.com",
                "subject": "Hi",
                "message": "Hello"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success"}"#)
            .expect(1)
            .create_async()
            .await;

        let response = client(&server).submit_contact(&draft()).await.unwrap();
        assert_eq!(response.status.as_deref(), Some("success"));
        assert!(response.message.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_contact_server_message_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/contact")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Invalid email"}"#)
            .create_async()
            .await;

        let err = client(&server).submit_contact(&draft()).await.unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 400, .. }));
        assert_eq!(err.user_message(), "Invalid email");
    }

    #[tokio::test]
    async fn test_submit_contact_prefers_error_field() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/contact")
            .with_status(400)
            .with_body(r#"{"success":false,"error":"Missing required field: subject","message":"ignored"}"#)
            .create_async()
            .await;

        let err = client(&server).submit_contact(&draft()).await.unwrap_err();
        assert_eq!(err.user_message(), "Missing required field: subject");
    }

    #[tokio::test]
    async fn test_submit_contact_fallback_without_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/contact")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let err = client(&server).submit_contact(&draft()).await.unwrap_err();
        assert_eq!(err.user_message(), SEND_FAILED);
    }

    #[tokio::test]
    async fn test_submit_contact_rejected_in_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/contact")
            .with_status(200)
            .with_body(r#"{"success":false,"error":"Failed to send message"}"#)
            .create_async()
            .await;

        let err = client(&server).submit_contact(&draft()).await.unwrap_err();
        assert_eq!(err.user_message(), "Failed to send message");
    }

    #[tokio::test]
    async fn test_submit_contact_unreadable_success_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/contact")
            .with_status(200)
            .with_body("OK")
            .create_async()
            .await;

        let err = client(&server).submit_contact(&draft()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert_eq!(err.user_message(), SEND_FAILED);
    }

    #[tokio::test]
    async fn test_get_project_unreadable_body_is_not_a_send_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/projects/7")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = client(&server).get_project(7).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert_eq!(err.user_message(), REQUEST_FAILED);
    }

    #[tokio::test]
    async fn test_network_failure_is_generic() {
        // Nothing listens on port 9 of localhost
        let client = ApiClient::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();
        let err = client.submit_contact(&draft()).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(err.user_message(), NETWORK_ERROR);
    }

    #[tokio::test]
    async fn test_list_projects_unwraps_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/projects")
            .with_status(200)
            .with_body(
                r#"{"success":true,"count":2,"data":[
                    {"id":1,"title":"E-Commerce Platform","description":"Store",
                     "tech_stack":["React","Stripe"],"github_url":"https://github.com/u/p1",
                     "live_url":"https://p1.demo.com","image_url":"/images/p1.jpg"},
                    {"id":2,"title":"AI Task Manager","tech_stack":["Flask"]}
                ]}"#,
            )
            .create_async()
            .await;

        let projects = client(&server).list_projects().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert!(projects[0].uses("Stripe"));
        assert_eq!(projects[1].description, "");
        assert_eq!(projects[1].github_url, None);
    }

    #[tokio::test]
    async fn test_get_project_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/projects/42")
            .with_status(404)
            .with_body(r#"{"success":false,"error":"Project not found"}"#)
            .create_async()
            .await;

        let err = client(&server).get_project(42).await.unwrap_err();
        assert_eq!(err.user_message(), "Project not found");
    }

    #[tokio::test]
    async fn test_health() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/health")
            .with_status(200)
            .with_body(r#"{"status":"healthy","service":"portfolio-api","version":"1.0.0"}"#)
            .create_async()
            .await;

        let health = client(&server).health().await.unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/", None).unwrap();
        assert_eq!(client.endpoint("/contact"), "http://localhost:5000/api/v1/contact");
    }
}
