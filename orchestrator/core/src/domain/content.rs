// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Content Service Trait
//!
//! One implementation per element type family (filters, studies, parameters,
//! ...). The gateway only needs the small capability set below; everything
//! type-specific stays behind the payload `Value`.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::element::{ElementId, SpecificMetadata};
use crate::domain::error::ExploreError;

#[async_trait]
pub trait ContentService: Send + Sync {
    /// Name used in logs and remote error reports
    fn name(&self) -> &str;

    /// Store `payload` under a caller-chosen id
    async fn create(&self, id: ElementId, payload: &Value, user: &str) -> Result<(), ExploreError>;

    /// Copy `source`; the content service assigns the new id
    async fn duplicate(&self, source: ElementId, user: &str) -> Result<ElementId, ExploreError>;

    async fn delete(&self, id: ElementId, user: &str) -> Result<(), ExploreError>;

    /// Type-specific metadata for `ids`. Each map carries at least an `id` field.
    async fn get_metadata(&self, ids: &[ElementId]) -> Result<Vec<SpecificMetadata>, ExploreError>;

    async fn update(&self, id: ElementId, _payload: &Value, _user: &str) -> Result<(), ExploreError> {
        Err(ExploreError::UnsupportedOperation(format!(
            "{} cannot update content of {}",
            self.name(),
            id
        )))
    }

    async fn replace_with_script(&self, id: ElementId, _user: &str) -> Result<(), ExploreError> {
        Err(ExploreError::UnsupportedOperation(format!(
            "{} cannot replace {} with a script",
            self.name(),
            id
        )))
    }

    /// Derive a script from the form-based `source`, stored under `new_id`
    async fn create_script_from(
        &self,
        source: ElementId,
        _new_id: ElementId,
        _user: &str,
    ) -> Result<(), ExploreError> {
        Err(ExploreError::UnsupportedOperation(format!(
            "{} cannot create a script from {}",
            self.name(),
            source
        )))
    }
}
