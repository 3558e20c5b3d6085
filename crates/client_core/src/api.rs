//! HTTP boundary to the catalog service.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{NewUser, UserId},
    error::ApiError,
    protocol::{CreateUserResponse, DeleteUserResponse, PageResponse, UserResponse},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::{join_segments, ClientConfig, DetailEndpoint},
    error::ClientError,
    types::{LoadedUser, MutationOutcome, Page},
};

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_page(&self, index: u32) -> Result<Page, ClientError>;
    async fn fetch_user(&self, id: &UserId) -> Result<LoadedUser, ClientError>;
    async fn create_user(&self, draft: &NewUser) -> Result<MutationOutcome, ClientError>;
    async fn delete_user(&self, id: &UserId) -> Result<(), ClientError>;
}

/// Stand-in used when no base URL is configured: every request fails with
/// [`ClientError::ConfigMissing`] so views degrade instead of crashing.
pub struct MissingCatalogApi;

#[async_trait]
impl CatalogApi for MissingCatalogApi {
    async fn fetch_page(&self, _index: u32) -> Result<Page, ClientError> {
        Err(ClientError::ConfigMissing)
    }

    async fn fetch_user(&self, _id: &UserId) -> Result<LoadedUser, ClientError> {
        Err(ClientError::ConfigMissing)
    }

    async fn create_user(&self, _draft: &NewUser) -> Result<MutationOutcome, ClientError> {
        Err(ClientError::ConfigMissing)
    }

    async fn delete_user(&self, _id: &UserId) -> Result<(), ClientError> {
        Err(ClientError::ConfigMissing)
    }
}

pub struct HttpCatalogApi {
    http: Client,
    base_url: Url,
    detail_endpoint: DetailEndpoint,
}

impl HttpCatalogApi {
    pub fn new(base_url: Url, config: &ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            base_url,
            detail_endpoint: config.detail_endpoint,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        join_segments(&self.base_url, segments)
    }
}

/// Picks the HTTP boundary when a base URL is configured, the
/// [`MissingCatalogApi`] otherwise.
pub fn connect(config: &ClientConfig) -> Arc<dyn CatalogApi> {
    let Some(base_url) = config.base_url.clone() else {
        warn!("catalog API base URL is not configured; views will render their error state");
        return Arc::new(MissingCatalogApi);
    };

    match HttpCatalogApi::new(base_url, config) {
        Ok(api) => {
            info!(base_url = %api.base_url, "catalog API configured");
            Arc::new(api)
        }
        Err(err) => {
            warn!(error = %err, "failed to build HTTP client; catalog API unavailable");
            Arc::new(MissingCatalogApi)
        }
    }
}

async fn rejection(response: Response, fallback: &str) -> ClientError {
    let status = response.status();
    let body = response.json::<ApiError>().await.unwrap_or_default();
    let message = body
        .message()
        .map(str::to_string)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| fallback.to_string());
    ClientError::rejected(Some(status.as_u16()), message)
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn fetch_page(&self, index: u32) -> Result<Page, ClientError> {
        let url = self.url(&["users", "page", &index.to_string()])?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(rejection(response, "Failed to fetch").await);
        }

        let body: PageResponse = response.json().await?;
        Ok(Page {
            index,
            items: body.users,
            server_latency_ms: body.time_taken,
        })
    }

    async fn fetch_user(&self, id: &UserId) -> Result<LoadedUser, ClientError> {
        let url = match self.detail_endpoint {
            DetailEndpoint::Root => self.url(&[id.as_str()])?,
            DetailEndpoint::Users => self.url(&["users", id.as_str()])?,
        };
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::NotFound(id.to_string()));
        }

        let body: UserResponse = response.json().await?;
        match body.user {
            Some(user) if body.success => Ok(LoadedUser {
                user,
                server_latency_ms: body.time_ms,
            }),
            _ => Err(ClientError::NotFound(id.to_string())),
        }
    }

    async fn create_user(&self, draft: &NewUser) -> Result<MutationOutcome, ClientError> {
        let url = self.url(&["users"])?;
        let response = self.http.post(url).json(draft).send().await?;
        if !response.status().is_success() {
            return Err(rejection(response, "Failed to create user").await);
        }

        let body: CreateUserResponse = response.json().await?;
        Ok(MutationOutcome {
            entity: body.user,
            server_latency_ms: body.time_taken,
        })
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), ClientError> {
        let url = self.url(&["users", id.as_str()])?;
        let response = self.http.delete(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(rejection(response, "Failed to delete user").await);
        }

        // 2xx with an empty or non-JSON body (e.g. 204) means the row is gone.
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let body = match serde_json::from_slice::<DeleteUserResponse>(&bytes) {
            Ok(body) => body,
            Err(err) => {
                debug!(user_id = %id, error = %err, "delete body not JSON; status was success");
                return Ok(());
            }
        };
        if body.success {
            return Ok(());
        }
        let message = body
            .msg
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or_else(|| "Failed to delete user".to_string());
        Err(ClientError::rejected(Some(status.as_u16()), message))
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
