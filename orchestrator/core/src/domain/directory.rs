// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Directory Client Trait - Anti-Corruption Layer for the directory service
//!
//! The directory service owns the element tree: names, owners, parents and
//! access rights. It knows nothing about type-specific payloads, which live in
//! the content services (see [`crate::domain::content`]).

use async_trait::async_trait;

use crate::domain::element::{Element, ElementId, ElementPatch, ElementType};
use crate::domain::error::ExploreError;
use crate::domain::permission::{PermissionCheck, PermissionResult};

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Register a new entry under `parent`. The entry keeps the id chosen by
    /// the caller.
    async fn create_element(
        &self,
        element: &Element,
        parent: ElementId,
        user: &str,
    ) -> Result<Element, ExploreError>;

    async fn update_element(
        &self,
        id: ElementId,
        patch: &ElementPatch,
        user: &str,
    ) -> Result<(), ExploreError>;

    async fn delete_element(&self, id: ElementId, user: &str) -> Result<(), ExploreError>;

    /// Strip every remaining directory reference for `ids` in one call
    async fn delete_elements(
        &self,
        ids: &[ElementId],
        parent: Option<ElementId>,
        user: &str,
    ) -> Result<(), ExploreError>;

    async fn get_element_infos(&self, id: ElementId) -> Result<Element, ExploreError>;

    /// Base attributes for `ids`, in the directory's own order. Unknown ids are
    /// omitted rather than reported.
    async fn get_elements_infos(
        &self,
        ids: &[ElementId],
        type_filter: Option<&[ElementType]>,
    ) -> Result<Vec<Element>, ExploreError>;

    async fn check_permission(
        &self,
        check: &PermissionCheck,
        user: &str,
    ) -> Result<PermissionResult, ExploreError>;

    /// Invalidate cached listings containing `id`
    async fn notify_directory_changed(&self, id: ElementId, user: &str)
        -> Result<(), ExploreError>;

    /// Number of cases and studies currently owned by `user`
    async fn count_user_cases(&self, user: &str) -> Result<u32, ExploreError>;
}
