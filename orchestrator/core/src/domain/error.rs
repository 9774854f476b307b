// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Explore Error Taxonomy
//!
//! Every port (`DirectoryClient`, `ContentService`, `UserAdminClient`) and every
//! application service speaks this single error type, so that the presentation
//! layer can map failures to HTTP classes without knowing which backend failed.
//!
//! | Variant | HTTP class |
//! |---------|-----------|
//! | `PermissionDenied` | 403 |
//! | `NotFound` | 404 |
//! | `MaxElementsExceeded` | 403 (quota) |
//! | `UnknownElementType`, `UnsupportedOperation` | 400 |
//! | `IncorrectPayload`, `ImportFailed` | 400 / 422 |
//! | `Remote` | remote 4xx passed through, otherwise 502/503 |

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure reported by (or while reaching) a backing service.
///
/// `status` is `None` when the service could not be reached at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub service: String,
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn new(service: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    pub fn unreachable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(service, None, message)
    }

    /// True when the remote rejected the request itself (4xx), as opposed to
    /// failing on its own side or being unreachable.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status, Some(status) if (400..500).contains(&status))
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} returned HTTP {}: {}", self.service, status, self.message),
            None => write!(f, "{} unreachable: {}", self.service, self.message),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ExploreError {
    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote error: {0}")]
    Remote(RemoteError),

    #[error("Unknown element type: {0}")]
    UnknownElementType(String),

    #[error("Import failed: {0}")]
    ImportFailed(String),

    #[error("Incorrect payload: {0}")]
    IncorrectPayload(String),

    #[error("Maximum number of elements exceeded (limit: {limit})")]
    MaxElementsExceeded { limit: u32 },

    #[error("Operation not supported: {0}")]
    UnsupportedOperation(String),
}

impl ExploreError {
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied { reason: reason.into() }
    }

    /// Stable machine-readable kind, used in API error bodies and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Remote(_) => "REMOTE_ERROR",
            Self::UnknownElementType(_) => "UNKNOWN_ELEMENT_TYPE",
            Self::ImportFailed(_) => "IMPORT_FAILED",
            Self::IncorrectPayload(_) => "INCORRECT_PAYLOAD",
            Self::MaxElementsExceeded { .. } => "MAX_ELEMENTS_EXCEEDED",
            Self::UnsupportedOperation(_) => "UNSUPPORTED_OPERATION",
        }
    }
}

impl From<RemoteError> for ExploreError {
    fn from(err: RemoteError) -> Self {
        ExploreError::Remote(err)
    }
}
