// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;

use crate::domain::error::ExploreError;

/// Per-user quota lookups
#[async_trait]
pub trait UserAdminClient: Send + Sync {
    /// Maximum number of cases and studies `user` may own, `None` when unlimited
    async fn max_allowed_cases(&self, user: &str) -> Result<Option<u32>, ExploreError>;
}
