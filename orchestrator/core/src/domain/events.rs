// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::element::{ElementId, ElementTypeKey};

/// Element lifecycle events published by the saga orchestrator.
///
/// Compensation and notification outcomes are published from background
/// tasks, so subscribers (and tests) can observe work that outlives the
/// request that started it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ElementEvent {
    ElementCreated {
        element_id: ElementId,
        element_type: ElementTypeKey,
        parent_id: ElementId,
        owner: String,
        created_at: DateTime<Utc>,
    },
    ElementDuplicated {
        source_id: ElementId,
        element_id: ElementId,
        element_type: ElementTypeKey,
        parent_id: ElementId,
        duplicated_at: DateTime<Utc>,
    },
    ElementUpdated {
        element_id: ElementId,
        user: String,
        updated_at: DateTime<Utc>,
    },
    ElementDeleted {
        element_id: ElementId,
        user: String,
        deleted_at: DateTime<Utc>,
    },
    CompensationSucceeded {
        element_id: ElementId,
        service: String,
        compensated_at: DateTime<Utc>,
    },
    CompensationFailed {
        element_id: ElementId,
        service: String,
        error: String,
        failed_at: DateTime<Utc>,
    },
    DirectoryNotified {
        element_id: ElementId,
        success: bool,
        notified_at: DateTime<Utc>,
    },
    BulkDeletionCompleted {
        requested: usize,
        failed: usize,
        directory_cleaned: bool,
        completed_at: DateTime<Utc>,
    },
}

impl ElementEvent {
    /// Element the event is about; bulk deletions concern no single element
    pub fn element_id(&self) -> Option<ElementId> {
        match self {
            Self::ElementCreated { element_id, .. }
            | Self::ElementDuplicated { element_id, .. }
            | Self::ElementUpdated { element_id, .. }
            | Self::ElementDeleted { element_id, .. }
            | Self::CompensationSucceeded { element_id, .. }
            | Self::CompensationFailed { element_id, .. }
            | Self::DirectoryNotified { element_id, .. } => Some(*element_id),
            Self::BulkDeletionCompleted { .. } => None,
        }
    }
}
