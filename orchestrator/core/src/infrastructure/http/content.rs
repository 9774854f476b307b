// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Content service adapter
//!
//! Every content service exposes the same REST shape under its own resource
//! path `P` (for instance `/v1/filters`):
//!
//! - `POST P?id=` - Create under a caller-chosen id
//! - `POST P?duplicateFrom=` - Duplicate, answers the new id
//! - `DELETE P/{id}` - Delete
//! - `GET P/metadata?ids=` - Listing metadata
//! - `PUT P/{id}` - Replace content
//! - `PUT P/{id}/replace-with-script` - Convert in place
//! - `POST P/{id}/new-script?newId=` - Derive a script

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{repeated, ErrorFlavor, ServiceEndpoint, USER_ID_HEADER};
use crate::domain::content::ContentService;
use crate::domain::element::{ElementId, SpecificMetadata};
use crate::domain::error::ExploreError;

pub struct HttpContentService {
    endpoint: ServiceEndpoint,
    path: String,
}

impl HttpContentService {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        path: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ExploreError> {
        let path = path.into();
        let path = format!("/{}", path.trim_matches('/'));
        Ok(Self {
            endpoint: ServiceEndpoint::new(name, base_url, timeout)?,
            path,
        })
    }

    fn url(&self, suffix: &str) -> String {
        self.endpoint.url(&format!("{}{}", self.path, suffix))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ExploreError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.endpoint.transport_error(e))?;
        self.endpoint.check(response, ErrorFlavor::Content).await
    }
}

#[async_trait]
impl ContentService for HttpContentService {
    fn name(&self) -> &str {
        self.endpoint.service()
    }

    async fn create(&self, id: ElementId, payload: &Value, user: &str) -> Result<(), ExploreError> {
        let request = self
            .endpoint
            .client()
            .post(self.url(""))
            .header(USER_ID_HEADER, user)
            .query(&[("id", id.to_string())])
            .json(payload);
        self.send(request).await.map(|_| ())
    }

    async fn duplicate(&self, source: ElementId, user: &str) -> Result<ElementId, ExploreError> {
        let request = self
            .endpoint
            .client()
            .post(self.url(""))
            .header(USER_ID_HEADER, user)
            .query(&[("duplicateFrom", source.to_string())]);
        let response = self.send(request).await?;
        self.endpoint.decode::<ElementId>(response).await
    }

    async fn delete(&self, id: ElementId, user: &str) -> Result<(), ExploreError> {
        let request = self
            .endpoint
            .client()
            .delete(self.url(&format!("/{}", id)))
            .header(USER_ID_HEADER, user);
        self.send(request).await.map(|_| ())
    }

    async fn get_metadata(&self, ids: &[ElementId]) -> Result<Vec<SpecificMetadata>, ExploreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .endpoint
            .client()
            .get(self.url("/metadata"))
            .query(&repeated("ids", ids));
        let response = self.send(request).await?;
        self.endpoint.decode::<Vec<SpecificMetadata>>(response).await
    }

    async fn update(&self, id: ElementId, payload: &Value, user: &str) -> Result<(), ExploreError> {
        let request = self
            .endpoint
            .client()
            .put(self.url(&format!("/{}", id)))
            .header(USER_ID_HEADER, user)
            .json(payload);
        self.send(request).await.map(|_| ())
    }

    async fn replace_with_script(&self, id: ElementId, user: &str) -> Result<(), ExploreError> {
        let request = self
            .endpoint
            .client()
            .put(self.url(&format!("/{}/replace-with-script", id)))
            .header(USER_ID_HEADER, user);
        self.send(request).await.map(|_| ())
    }

    async fn create_script_from(
        &self,
        source: ElementId,
        new_id: ElementId,
        user: &str,
    ) -> Result<(), ExploreError> {
        let request = self
            .endpoint
            .client()
            .post(self.url(&format!("/{}/new-script", source)))
            .header(USER_ID_HEADER, user)
            .query(&[("newId", new_id.to_string())]);
        self.send(request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn filters(server: &mockito::ServerGuard) -> HttpContentService {
        HttpContentService::new("filter-server", server.url(), "v1/filters/", Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_sends_local_id() {
        let mut server = mockito::Server::new_async().await;
        let id = ElementId::new();
        let mock = server
            .mock("POST", "/v1/filters")
            .match_query(Matcher::UrlEncoded("id".into(), id.to_string()))
            .match_header("userId", "u1")
            .match_body(Matcher::Json(serde_json::json!({"equipmentType": "LINE"})))
            .with_status(200)
            .create_async()
            .await;

        filters(&server)
            .create(id, &serde_json::json!({"equipmentType": "LINE"}), "u1")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_duplicate_returns_server_assigned_id() {
        let mut server = mockito::Server::new_async().await;
        let source = ElementId::new();
        let new_id = ElementId::new();
        server
            .mock("POST", "/v1/filters")
            .match_query(Matcher::UrlEncoded("duplicateFrom".into(), source.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!("\"{}\"", new_id))
            .create_async()
            .await;

        assert_eq!(filters(&server).duplicate(source, "u1").await.unwrap(), new_id);
    }

    #[tokio::test]
    async fn test_validation_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/filters")
            .match_query(Matcher::Any)
            .with_status(422)
            .with_body("unknown equipment")
            .create_async()
            .await;

        let err = filters(&server)
            .create(ElementId::new(), &Value::Null, "u1")
            .await
            .unwrap_err();
        match err {
            ExploreError::ImportFailed(message) => assert_eq!(message, "unknown equipment"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_metadata() {
        let mut server = mockito::Server::new_async().await;
        let id = ElementId::new();
        server
            .mock("GET", "/v1/filters/metadata")
            .match_query(Matcher::UrlEncoded("ids".into(), id.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!([{"id": id.to_string(), "equipmentType": "LINE"}]).to_string(),
            )
            .create_async()
            .await;

        let metadata = filters(&server).get_metadata(&[id]).await.unwrap();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0]["equipmentType"], "LINE");
    }

    #[tokio::test]
    async fn test_malformed_metadata_keeps_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/filters/metadata")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{not json")
            .create_async()
            .await;

        let err = filters(&server)
            .get_metadata(&[ElementId::new()])
            .await
            .unwrap_err();
        match err {
            ExploreError::Remote(remote) => {
                assert_eq!(remote.service, "filter-server");
                assert_eq!(remote.status, Some(200));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_and_script_paths() {
        let mut server = mockito::Server::new_async().await;
        let id = ElementId::new();
        let new_id = ElementId::new();
        let delete = server
            .mock("DELETE", format!("/v1/filters/{}", id).as_str())
            .with_status(200)
            .create_async()
            .await;
        let replace = server
            .mock("PUT", format!("/v1/filters/{}/replace-with-script", id).as_str())
            .with_status(200)
            .create_async()
            .await;
        let script = server
            .mock("POST", format!("/v1/filters/{}/new-script", id).as_str())
            .match_query(Matcher::UrlEncoded("newId".into(), new_id.to_string()))
            .with_status(200)
            .create_async()
            .await;

        let service = filters(&server);
        service.delete(id, "u1").await.unwrap();
        service.replace_with_script(id, "u1").await.unwrap();
        service.create_script_from(id, new_id, "u1").await.unwrap();

        delete.assert_async().await;
        replace.assert_async().await;
        script.assert_async().await;
    }
}
