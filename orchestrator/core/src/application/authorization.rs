// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Authorization Gate Application Service
//!
//! Evaluates access rights before any mutating saga step. The gate fails
//! closed: a refused check and an unreachable directory service both end
//! as `PermissionDenied`. It is stateless and holds no lock, so one instance
//! serves every concurrent request.
//!
//! Recursive checks are delegated to the directory service; the gate never
//! walks the element tree itself.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::directory::DirectoryClient;
use crate::domain::element::ElementId;
use crate::domain::error::ExploreError;
use crate::domain::permission::{PermissionCheck, PermissionType};

pub const PERMISSION_DENIED_METRIC: &str = "explore_permission_denied_total";

// ============================================================================
// Service Trait
// ============================================================================

#[async_trait]
pub trait AuthorizationGate: Send + Sync {
    async fn authorize(
        &self,
        user: &str,
        subject_ids: &[ElementId],
        target_directory: Option<ElementId>,
        permission: PermissionType,
        recursive: bool,
    ) -> Result<(), ExploreError>;

    /// READ on `source`, then WRITE on the directory receiving the copy.
    ///
    /// Callers resolve `destination` to the source's parent when the request
    /// names none.
    async fn authorize_duplication(
        &self,
        user: &str,
        source: ElementId,
        destination: ElementId,
    ) -> Result<(), ExploreError> {
        self.authorize(user, &[source], None, PermissionType::Read, false)
            .await?;
        self.authorize(user, &[source], Some(destination), PermissionType::Write, false)
            .await
    }
}

// ============================================================================
// Standard Implementation
// ============================================================================

pub struct DirectoryAuthorizationGate {
    directory: Arc<dyn DirectoryClient>,
}

impl DirectoryAuthorizationGate {
    pub fn new(directory: Arc<dyn DirectoryClient>) -> Self {
        Self { directory }
    }

    fn deny(user: &str, check: &PermissionCheck, reason: String) -> ExploreError {
        warn!(
            user = %user,
            permission = %check.permission,
            recursive = check.recursive,
            subjects = ?check.subject_ids,
            target = ?check.target_directory,
            "Permission denied: {}",
            reason
        );
        metrics::counter!(PERMISSION_DENIED_METRIC, "permission" => check.permission.as_str())
            .increment(1);
        ExploreError::PermissionDenied { reason }
    }
}

#[async_trait]
impl AuthorizationGate for DirectoryAuthorizationGate {
    async fn authorize(
        &self,
        user: &str,
        subject_ids: &[ElementId],
        target_directory: Option<ElementId>,
        permission: PermissionType,
        recursive: bool,
    ) -> Result<(), ExploreError> {
        let check = PermissionCheck::new(subject_ids.to_vec(), permission)
            .with_target(target_directory)
            .recursive(recursive);

        match self.directory.check_permission(&check, user).await {
            Ok(result) if result.granted => {
                debug!(user = %user, permission = %permission, "Permission granted");
                Ok(())
            }
            Ok(result) => {
                let reason = result
                    .reason
                    .unwrap_or_else(|| format!("{} access refused", permission));
                Err(Self::deny(user, &check, reason))
            }
            Err(e) => Err(Self::deny(
                user,
                &check,
                format!("permission check failed: {}", e),
            )),
        }
    }
}
