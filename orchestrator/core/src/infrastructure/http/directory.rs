// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Directory service adapter
//!
//! # API Endpoints
//!
//! - `POST /v1/directories/{parent}/elements` - Create entry
//! - `PUT /v1/elements/{id}` - Update name/description
//! - `DELETE /v1/elements/{id}` - Delete entry
//! - `DELETE /v1/elements?ids=` - Bulk strip
//! - `GET /v1/elements/{id}` - Entry attributes
//! - `GET /v1/elements?ids=&elementTypes=` - Attributes of many entries
//! - `GET /v1/elements/authorized?ids=&accessType=&targetDirectoryUuid=&recursiveCheck=` - Permission check
//! - `POST /v1/elements/{id}/notification?type=UPDATE_DIRECTORY` - Cache invalidation
//! - `GET /v1/users/{user}/cases/count` - Case count for quotas

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use super::{repeated, ErrorFlavor, ServiceEndpoint, USER_ID_HEADER};
use crate::domain::directory::DirectoryClient;
use crate::domain::element::{Element, ElementId, ElementPatch, ElementType};
use crate::domain::error::{ExploreError, RemoteError};
use crate::domain::permission::{PermissionCheck, PermissionResult};

pub const DIRECTORY_SERVICE: &str = "directory-server";

pub struct HttpDirectoryClient {
    endpoint: ServiceEndpoint,
}

impl HttpDirectoryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ExploreError> {
        Ok(Self {
            endpoint: ServiceEndpoint::new(DIRECTORY_SERVICE, base_url, timeout)?,
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ExploreError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.endpoint.transport_error(e))?;
        self.endpoint.check(response, ErrorFlavor::Directory).await
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn create_element(
        &self,
        element: &Element,
        parent: ElementId,
        user: &str,
    ) -> Result<Element, ExploreError> {
        let url = self
            .endpoint
            .url(&format!("/v1/directories/{}/elements", parent));
        let request = self
            .endpoint
            .client()
            .post(url)
            .header(USER_ID_HEADER, user)
            .json(element);
        let response = self.send(request).await?;
        self.endpoint.decode(response).await
    }

    async fn update_element(
        &self,
        id: ElementId,
        patch: &ElementPatch,
        user: &str,
    ) -> Result<(), ExploreError> {
        let url = self.endpoint.url(&format!("/v1/elements/{}", id));
        let request = self
            .endpoint
            .client()
            .put(url)
            .header(USER_ID_HEADER, user)
            .json(patch);
        self.send(request).await.map(|_| ())
    }

    async fn delete_element(&self, id: ElementId, user: &str) -> Result<(), ExploreError> {
        let url = self.endpoint.url(&format!("/v1/elements/{}", id));
        let request = self.endpoint.client().delete(url).header(USER_ID_HEADER, user);
        self.send(request).await.map(|_| ())
    }

    async fn delete_elements(
        &self,
        ids: &[ElementId],
        parent: Option<ElementId>,
        user: &str,
    ) -> Result<(), ExploreError> {
        let mut query = repeated("ids", ids);
        if let Some(parent) = parent {
            query.push(("parentDirectoryUuid", parent.to_string()));
        }
        let request = self
            .endpoint
            .client()
            .delete(self.endpoint.url("/v1/elements"))
            .header(USER_ID_HEADER, user)
            .query(&query);
        self.send(request).await.map(|_| ())
    }

    async fn get_element_infos(&self, id: ElementId) -> Result<Element, ExploreError> {
        let url = self.endpoint.url(&format!("/v1/elements/{}", id));
        let response = self.send(self.endpoint.client().get(url)).await?;
        self.endpoint.decode(response).await
    }

    async fn get_elements_infos(
        &self,
        ids: &[ElementId],
        type_filter: Option<&[ElementType]>,
    ) -> Result<Vec<Element>, ExploreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = repeated("ids", ids);
        if let Some(types) = type_filter {
            query.extend(repeated("elementTypes", types));
        }
        let request = self
            .endpoint
            .client()
            .get(self.endpoint.url("/v1/elements"))
            .query(&query);
        let response = self.send(request).await?;
        self.endpoint.decode(response).await
    }

    async fn check_permission(
        &self,
        check: &PermissionCheck,
        user: &str,
    ) -> Result<PermissionResult, ExploreError> {
        let mut query = repeated("ids", &check.subject_ids);
        query.push(("accessType", check.permission.to_string()));
        if let Some(target) = check.target_directory {
            query.push(("targetDirectoryUuid", target.to_string()));
        }
        query.push(("recursiveCheck", check.recursive.to_string()));

        let response = self
            .endpoint
            .client()
            .get(self.endpoint.url("/v1/elements/authorized"))
            .header(USER_ID_HEADER, user)
            .query(&query)
            .send()
            .await
            .map_err(|e| self.endpoint.transport_error(e))?;

        // A 403 is an answer, not a failure
        if response.status() == StatusCode::FORBIDDEN {
            let reason = response.text().await.unwrap_or_default();
            let reason = if reason.is_empty() {
                format!("{} access refused", check.permission)
            } else {
                reason
            };
            return Ok(PermissionResult::denied(reason));
        }

        let response = self.endpoint.check(response, ErrorFlavor::Directory).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| self.endpoint.transport_error(e))?;
        if body.is_empty() {
            return Ok(PermissionResult::granted());
        }
        serde_json::from_slice(&body).map_err(|e| {
            ExploreError::from(RemoteError::new(
                DIRECTORY_SERVICE,
                Some(StatusCode::OK.as_u16()),
                format!("unreadable permission result: {}", e),
            ))
        })
    }

    async fn notify_directory_changed(
        &self,
        id: ElementId,
        user: &str,
    ) -> Result<(), ExploreError> {
        let url = self.endpoint.url(&format!("/v1/elements/{}/notification", id));
        let request = self
            .endpoint
            .client()
            .post(url)
            .header(USER_ID_HEADER, user)
            .query(&[("type", "UPDATE_DIRECTORY")]);
        self.send(request).await.map(|_| ())
    }

    async fn count_user_cases(&self, user: &str) -> Result<u32, ExploreError> {
        let url = self.endpoint.url(&format!("/v1/users/{}/cases/count", user));
        let response = self.send(self.endpoint.client().get(url)).await?;
        self.endpoint.decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::element::ElementTypeKey;
    use crate::domain::permission::PermissionType;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> HttpDirectoryClient {
        HttpDirectoryClient::new(server.url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_create_element_posts_under_parent() {
        let mut server = mockito::Server::new_async().await;
        let parent = ElementId::new();
        let id = ElementId::new();
        let element = Element::new(id, "lines", ElementTypeKey::of(ElementType::Filter), "u1", None);

        let mock = server
            .mock("POST", format!("/v1/directories/{}/elements", parent).as_str())
            .match_header("userId", "u1")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "elementUuid": id.to_string(),
                "type": "FILTER",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::to_string(&element).unwrap())
            .create_async()
            .await;

        let created = client(&server).create_element(&element, parent, "u1").await.unwrap();
        assert_eq!(created.id, id);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_element_infos_not_found() {
        let mut server = mockito::Server::new_async().await;
        let id = ElementId::new();
        server
            .mock("GET", format!("/v1/elements/{}", id).as_str())
            .with_status(404)
            .create_async()
            .await;

        let err = client(&server).get_element_infos(id).await.unwrap_err();
        assert!(matches!(err, ExploreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_check_permission_forbidden_is_denial() {
        let mut server = mockito::Server::new_async().await;
        let subject = ElementId::new();
        let mock = server
            .mock("GET", "/v1/elements/authorized")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ids".into(), subject.to_string()),
                Matcher::UrlEncoded("accessType".into(), "WRITE".into()),
                Matcher::UrlEncoded("recursiveCheck".into(), "true".into()),
            ]))
            .with_status(403)
            .with_body("not the owner")
            .create_async()
            .await;

        let check = PermissionCheck::new(vec![subject], PermissionType::Write).recursive(true);
        let result = client(&server).check_permission(&check, "u1").await.unwrap();
        assert!(!result.granted);
        assert_eq!(result.reason.as_deref(), Some("not the owner"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_check_permission_granted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/elements/authorized")
            .match_query(Matcher::Any)
            .with_status(200)
            .create_async()
            .await;

        let check = PermissionCheck::new(vec![ElementId::new()], PermissionType::Read);
        assert!(client(&server).check_permission(&check, "u1").await.unwrap().granted);
    }

    #[tokio::test]
    async fn test_server_error_is_remote_error() {
        let mut server = mockito::Server::new_async().await;
        let parent = ElementId::new();
        server
            .mock("POST", format!("/v1/directories/{}/elements", parent).as_str())
            .with_status(500)
            .with_body("db down")
            .create_async()
            .await;

        let element = Element::new(
            ElementId::new(),
            "s",
            ElementTypeKey::of(ElementType::Study),
            "u1",
            None,
        );
        match client(&server).create_element(&element, parent, "u1").await {
            Err(ExploreError::Remote(remote)) => {
                assert_eq!(remote.status, Some(500));
                assert_eq!(remote.message, "db down");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
