// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use super::{ErrorFlavor, ServiceEndpoint};
use crate::domain::error::ExploreError;
use crate::domain::user_admin::UserAdminClient;

/// User-admin adapter: `GET /v1/users/{user}/profile/max-cases`
pub struct HttpUserAdminClient {
    endpoint: ServiceEndpoint,
}

impl HttpUserAdminClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ExploreError> {
        Ok(Self {
            endpoint: ServiceEndpoint::new("user-admin-server", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl UserAdminClient for HttpUserAdminClient {
    async fn max_allowed_cases(&self, user: &str) -> Result<Option<u32>, ExploreError> {
        let url = self
            .endpoint
            .url(&format!("/v1/users/{}/profile/max-cases", user));
        let response = self
            .endpoint
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| self.endpoint.transport_error(e))?;

        // no profile or no limit configured
        if matches!(response.status(), StatusCode::NO_CONTENT | StatusCode::NOT_FOUND) {
            return Ok(None);
        }

        let response = self.endpoint.check(response, ErrorFlavor::Directory).await?;
        self.endpoint.decode::<Option<u32>>(response).await
    }
}
