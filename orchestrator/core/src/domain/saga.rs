// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Element Saga - transient descriptor of one creation request
//!
//! A creation request runs at most two forward steps (content, then
//! directory) and at most one compensation (content delete). The descriptor
//! records which steps ran and enforces the state machine:
//!
//! ```text
//! Init -> ContentCreated -> DirectoryCreated
//! Init -> ContentCreated -> Compensating -> Failed
//! Init -> Failed
//! ```
//!
//! Nothing here is persisted; the descriptor is dropped once the request
//! (and its compensation, if any) completes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::element::{ElementId, ElementTypeKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SagaState {
    Init,
    ContentCreated,
    DirectoryCreated,
    Compensating,
    Failed,
}

impl SagaState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::DirectoryCreated | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SagaAction {
    CreateContent,
    DuplicateContent { source: ElementId },
    CreateScriptFrom { source: ElementId },
    CreateDirectoryEntry { parent: ElementId },
    DeleteContent,
}

/// One remote call, tagged with the service that receives it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SagaStep {
    pub service: String,
    pub action: SagaAction,
}

impl SagaStep {
    pub fn new(service: impl Into<String>, action: SagaAction) -> Self {
        Self {
            service: service.into(),
            action,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SagaError {
    #[error("Invalid saga state transition from {from:?} to {to:?}")]
    InvalidStateTransition { from: SagaState, to: SagaState },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaDescriptor {
    /// Known once the content step succeeded (duplication gets it from the
    /// content service)
    pub element_id: Option<ElementId>,
    pub element_type: ElementTypeKey,
    pub forward_steps: Vec<SagaStep>,
    pub compensations: Vec<SagaStep>,
    state: SagaState,
}

impl SagaDescriptor {
    pub fn new(element_type: ElementTypeKey, element_id: Option<ElementId>) -> Self {
        Self {
            element_id,
            element_type,
            forward_steps: Vec::new(),
            compensations: Vec::new(),
            state: SagaState::Init,
        }
    }

    pub fn state(&self) -> SagaState {
        self.state
    }

    fn transition(&mut self, allowed_from: &[SagaState], to: SagaState) -> Result<(), SagaError> {
        if !allowed_from.contains(&self.state) {
            return Err(SagaError::InvalidStateTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    pub fn mark_content_created(&mut self, id: ElementId, step: SagaStep) -> Result<(), SagaError> {
        self.transition(&[SagaState::Init], SagaState::ContentCreated)?;
        self.element_id = Some(id);
        self.forward_steps.push(step);
        Ok(())
    }

    pub fn mark_directory_created(&mut self, step: SagaStep) -> Result<(), SagaError> {
        self.transition(&[SagaState::ContentCreated], SagaState::DirectoryCreated)?;
        self.forward_steps.push(step);
        Ok(())
    }

    pub fn mark_compensating(&mut self, compensation: SagaStep) -> Result<(), SagaError> {
        self.transition(&[SagaState::ContentCreated], SagaState::Compensating)?;
        self.compensations.push(compensation);
        Ok(())
    }

    pub fn mark_failed(&mut self) -> Result<(), SagaError> {
        self.transition(&[SagaState::Init, SagaState::Compensating], SagaState::Failed)
    }
}
