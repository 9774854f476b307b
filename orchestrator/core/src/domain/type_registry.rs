// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Type Registry
//!
//! Maps an element type (and, for parameters, a sub-type) to the content
//! service that owns its payload.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Single polymorphic dispatch point for every saga step and
//!   for the metadata fan-out
//!
//! The registry is assembled once at startup through [`TypeRegistryBuilder`]
//! and is read-only afterwards; share it behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::content::ContentService;
use crate::domain::element::{ElementType, ElementTypeKey};
use crate::domain::error::ExploreError;

#[derive(Clone)]
pub struct RegistryEntry {
    pub key: ElementTypeKey,
    pub service: Arc<dyn ContentService>,
    /// Whether the service exposes type-specific metadata for listings
    pub has_metadata: bool,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("key", &self.key)
            .field("service", &self.service.name())
            .field("has_metadata", &self.has_metadata)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Element type {0} is registered more than once")]
    DuplicateType(ElementTypeKey),

    #[error("DIRECTORY elements have no content service")]
    DirectoryNotAllowed,
}

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: HashMap<ElementTypeKey, RegistryEntry>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Find the entry responsible for `key`.
    ///
    /// Parameters look up their exact sub-type first, then fall back to a
    /// generic `PARAMETERS` entry.
    pub fn entry(&self, key: ElementTypeKey) -> Result<&RegistryEntry, ExploreError> {
        if key.element_type == ElementType::Directory {
            return Err(ExploreError::UnknownElementType(key.to_string()));
        }

        if let Some(entry) = self.entries.get(&key) {
            return Ok(entry);
        }

        if key.parameters_type.is_some() {
            if let Some(entry) = self.entries.get(&ElementTypeKey::of(key.element_type)) {
                return Ok(entry);
            }
        }

        Err(ExploreError::UnknownElementType(key.to_string()))
    }

    pub fn resolve(&self, key: ElementTypeKey) -> Result<Arc<dyn ContentService>, ExploreError> {
        self.entry(key).map(|entry| entry.service.clone())
    }

    /// Entry to query for listing metadata, if `key` carries any
    pub fn metadata_entry(&self, key: ElementTypeKey) -> Option<&RegistryEntry> {
        self.entry(key).ok().filter(|entry| entry.has_metadata)
    }

    pub fn has_metadata(&self, key: ElementTypeKey) -> bool {
        self.metadata_entry(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ElementTypeKey> {
        self.entries.keys()
    }
}

#[derive(Default)]
pub struct TypeRegistryBuilder {
    entries: Vec<RegistryEntry>,
}

impl TypeRegistryBuilder {
    pub fn register(
        mut self,
        key: impl Into<ElementTypeKey>,
        service: Arc<dyn ContentService>,
        has_metadata: bool,
    ) -> Self {
        self.entries.push(RegistryEntry {
            key: key.into(),
            service,
            has_metadata,
        });
        self
    }

    pub fn build(self) -> Result<TypeRegistry, RegistryError> {
        let mut entries = HashMap::with_capacity(self.entries.len());
        for entry in self.entries {
            if entry.key.element_type == ElementType::Directory {
                return Err(RegistryError::DirectoryNotAllowed);
            }
            if entries.contains_key(&entry.key) {
                return Err(RegistryError::DuplicateType(entry.key));
            }
            entries.insert(entry.key, entry);
        }
        Ok(TypeRegistry { entries })
    }
}
