// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP Backends
//!
//! reqwest adapters for the directory service, the content services and the
//! user-admin service. Each adapter owns its wire format; this module holds
//! the shared endpoint plumbing and the status-to-error mapping.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Anti-Corruption Layer between remote REST APIs and the
//!   domain ports

pub mod content;
pub mod directory;
pub mod user_admin;

pub use content::HttpContentService;
pub use directory::HttpDirectoryClient;
pub use user_admin::HttpUserAdminClient;

use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

use crate::domain::error::{ExploreError, RemoteError};

/// Header carrying the authenticated user on every backend call
pub const USER_ID_HEADER: &str = "userId";

/// How a backend's 4xx answers translate into domain errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFlavor {
    Directory,
    /// Content services report payload validation failures as 400/422
    Content,
}

/// Base URL plus client for one named backend
#[derive(Clone)]
pub struct ServiceEndpoint {
    service: String,
    base_url: String,
    client: Client,
}

impl ServiceEndpoint {
    pub fn new(
        service: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ExploreError> {
        let service = service.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::unreachable(service.clone(), e.to_string()))?;

        Ok(Self {
            service,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Build full URL for API endpoint
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn transport_error(&self, err: reqwest::Error) -> ExploreError {
        // no status means the request never got an answer
        let status = err.status().map(|s| s.as_u16());
        RemoteError::new(self.service.clone(), status, err.to_string()).into()
    }

    /// Decode a successful JSON body; an unreadable body keeps the answer's status
    pub async fn decode<T: serde::de::DeserializeOwned>(&self, response: Response) -> Result<T, ExploreError> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&body).map_err(|e| {
            RemoteError::new(
                self.service.clone(),
                Some(status.as_u16()),
                format!("unreadable response body: {}", e),
            )
            .into()
        })
    }

    /// Pass successful responses through, map every other status to an error
    pub async fn check(&self, response: Response, flavor: ErrorFlavor) -> Result<Response, ExploreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            body
        };

        Err(self.status_error(status, message, flavor))
    }

    fn status_error(&self, status: StatusCode, message: String, flavor: ErrorFlavor) -> ExploreError {
        match (status, flavor) {
            (StatusCode::NOT_FOUND, _) => {
                ExploreError::NotFound(format!("{}: {}", self.service, message))
            }
            (StatusCode::FORBIDDEN, _) => ExploreError::permission_denied(message),
            (StatusCode::BAD_REQUEST, ErrorFlavor::Content) => ExploreError::IncorrectPayload(message),
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorFlavor::Content) => {
                ExploreError::ImportFailed(message)
            }
            _ => ExploreError::Remote(RemoteError::new(
                self.service.clone(),
                Some(status.as_u16()),
                message,
            )),
        }
    }
}

/// Repeated query pairs (`ids=a&ids=b`)
pub(crate) fn repeated<'a, T: ToString>(key: &'a str, values: &[T]) -> Vec<(&'a str, String)> {
    values.iter().map(|v| (key, v.to_string())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(service: &str) -> ServiceEndpoint {
        ServiceEndpoint::new(service, "http://localhost:1/", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_url_building_trims_trailing_slash() {
        assert_eq!(endpoint("directory-server").url("/v1/elements"), "http://localhost:1/v1/elements");
    }

    #[test]
    fn test_status_mapping() {
        let content = endpoint("filter-server");

        assert!(matches!(
            content.status_error(StatusCode::NOT_FOUND, "gone".into(), ErrorFlavor::Content),
            ExploreError::NotFound(_)
        ));
        assert!(matches!(
            content.status_error(StatusCode::FORBIDDEN, "no".into(), ErrorFlavor::Directory),
            ExploreError::PermissionDenied { .. }
        ));
        assert!(matches!(
            content.status_error(StatusCode::BAD_REQUEST, "bad".into(), ErrorFlavor::Content),
            ExploreError::IncorrectPayload(_)
        ));
        assert!(matches!(
            content.status_error(StatusCode::UNPROCESSABLE_ENTITY, "bad".into(), ErrorFlavor::Content),
            ExploreError::ImportFailed(_)
        ));

        match content.status_error(StatusCode::BAD_REQUEST, "bad".into(), ErrorFlavor::Directory) {
            ExploreError::Remote(remote) => {
                assert_eq!(remote.status, Some(400));
                assert!(remote.is_client_error());
            }
            other => panic!("unexpected error: {:?}", other),
        }

        match content.status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".into(), ErrorFlavor::Content) {
            ExploreError::Remote(remote) => {
                assert_eq!(remote.service, "filter-server");
                assert_eq!(remote.status, Some(500));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let endpoint = endpoint("directory-server");
        let err = endpoint
            .client()
            .get(endpoint.url("/v1/elements"))
            .send()
            .await
            .map_err(|e| endpoint.transport_error(e))
            .unwrap_err();
        match err {
            ExploreError::Remote(remote) => assert_eq!(remote.status, None),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
