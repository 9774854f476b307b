// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Permission
//!
//! Access-right value objects exchanged with the directory service.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Describes permission checks and their results

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::element::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionType {
    Read,
    Write,
}

impl PermissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
        }
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a permission check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResult {
    pub granted: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl PermissionResult {
    pub fn granted() -> Self {
        Self {
            granted: true,
            reason: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            granted: false,
            reason: Some(reason.into()),
        }
    }
}

/// A single question asked to the directory service.
///
/// With `recursive`, the directory also validates every descendant of the
/// subjects; the gateway never walks the tree itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheck {
    pub subject_ids: Vec<ElementId>,
    pub target_directory: Option<ElementId>,
    pub permission: PermissionType,
    pub recursive: bool,
}

impl PermissionCheck {
    pub fn new(subject_ids: Vec<ElementId>, permission: PermissionType) -> Self {
        Self {
            subject_ids,
            target_directory: None,
            permission,
            recursive: false,
        }
    }

    pub fn with_target(mut self, target_directory: Option<ElementId>) -> Self {
        self.target_directory = target_directory;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}
