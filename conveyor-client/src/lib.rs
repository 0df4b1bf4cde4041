//! Conveyor HTTP Client
//!
//! A type-safe HTTP client for the Conveyor orchestrator API.
//!
//! Every request carries the identity headers configured on the client, the
//! same way the API gateway forwards them. Failed calls surface the
//! orchestrator's [`ErrorCode`] so callers can branch without matching on
//! messages.
//!
//! # Example
//!
//! ```no_run
//! use conveyor_client::OrchestratorClient;
//! use conveyor_core::dto::build::TriggerBuild;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OrchestratorClient::new("http://localhost:8080").with_identity(1, "olivia");
//!
//!     let build = client
//!         .trigger_build(Uuid::nil(), TriggerBuild {
//!             branch: Some("main".to_string()),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     println!("Triggered build: {}", build.id);
//!     Ok(())
//! }
//! ```
//!
//! [`ErrorCode`]: conveyor_core::dto::error::ErrorCode

mod builds;
pub mod error;
mod pipelines;
mod schedules;

// Re-export commonly used types
pub use conveyor_core::dto::error::ErrorCode;
pub use error::{ClientError, Result};

use conveyor_core::domain::project::UserId;
use conveyor_core::dto::identity::{
    SUPER_ADMIN_ROLE, USER_ID_HEADER, USER_ROLE_HEADER, USERNAME_HEADER,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// Caller identity sent with every request
#[derive(Debug, Clone, PartialEq, Eq)]
struct Identity {
    user_id: UserId,
    username: Option<String>,
    super_admin: bool,
}

/// HTTP client for the Conveyor orchestrator API
///
/// Methods are organized into logical groups:
/// - Pipeline management (create, list, get, update, delete)
/// - Builds (trigger, list, get, snapshot, reconciliation audit)
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
    identity: Option<Identity>,
}

impl OrchestratorClient {
    /// Create a new orchestrator client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the orchestrator API (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new orchestrator client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            identity: None,
        }
    }

    /// Act as the given user on every following request
    pub fn with_identity(mut self, user_id: UserId, username: impl Into<String>) -> Self {
        self.identity = Some(Identity {
            user_id,
            username: Some(username.into()),
            super_admin: false,
        });
        self
    }

    /// Mark the configured identity as a super-admin
    ///
    /// Has no effect until an identity is set.
    pub fn as_super_admin(mut self) -> Self {
        if let Some(identity) = self.identity.as_mut() {
            identity.super_admin = true;
        }
        self
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the orchestrator is up
    pub async fn health(&self) -> Result<()> {
        let response = self.request(Method::GET, "/health").send().await?;
        self.handle_empty_response(response).await
    }

    /// Start a request to `path` with the identity headers attached
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, url);

        if let Some(identity) = &self.identity {
            builder = builder.header(USER_ID_HEADER, identity.user_id.to_string());
            if let Some(username) = &identity.username {
                builder = builder.header(USERNAME_HEADER, username);
            }
            if identity.super_admin {
                builder = builder.header(USER_ROLE_HEADER, SUPER_ADMIN_ROLE);
            }
        }

        builder
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Orchestrator returned {}: {}", status, body);
            return Err(ClientError::api_error(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    ///
    /// This method checks the status code and returns an error if the request failed.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::api_error(status.as_u16(), &body));
        }

        Ok(())
    }
}
