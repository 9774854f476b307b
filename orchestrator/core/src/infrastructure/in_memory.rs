// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-Memory Backends
//!
//! HashMap-backed `DirectoryClient` and `ContentService` implementations for
//! tests and local development. Both record every call they receive and
//! support failure injection per operation, so saga behavior (ordering,
//! compensation, best-effort loops) can be asserted without a network.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::content::ContentService;
use crate::domain::directory::DirectoryClient;
use crate::domain::element::{Element, ElementId, ElementPatch, ElementType, SpecificMetadata};
use crate::domain::error::ExploreError;
use crate::domain::permission::{PermissionCheck, PermissionResult, PermissionType};
use crate::domain::user_admin::UserAdminClient;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Directory
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryOp {
    CreateElement,
    UpdateElement,
    DeleteElement,
    DeleteElements,
    GetElementInfos,
    GetElementsInfos,
    CheckPermission,
    NotifyDirectoryChanged,
    CountUserCases,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryCall {
    CreateElement { id: ElementId, parent: ElementId, user: String },
    UpdateElement { id: ElementId, patch: ElementPatch, user: String },
    DeleteElement { id: ElementId, user: String },
    DeleteElements { ids: Vec<ElementId>, parent: Option<ElementId>, user: String },
    GetElementInfos { id: ElementId },
    GetElementsInfos { ids: Vec<ElementId> },
    CheckPermission { check: PermissionCheck, user: String },
    NotifyDirectoryChanged { id: ElementId, user: String },
    CountUserCases { user: String },
}

impl DirectoryCall {
    /// Calls that change directory state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateElement { .. }
                | Self::UpdateElement { .. }
                | Self::DeleteElement { .. }
                | Self::DeleteElements { .. }
        )
    }
}

struct DenyRule {
    permission: Option<PermissionType>,
    target: Option<ElementId>,
    reason: String,
}

impl DenyRule {
    fn matches(&self, check: &PermissionCheck) -> bool {
        self.permission.map_or(true, |p| p == check.permission)
            && self.target.map_or(true, |t| {
                check.target_directory == Some(t) || check.subject_ids.contains(&t)
            })
    }
}

#[derive(Default)]
struct DirectoryState {
    elements: HashMap<ElementId, Element>,
    order: Vec<ElementId>,
    calls: Vec<DirectoryCall>,
    failures: HashMap<DirectoryOp, ExploreError>,
    delays: HashMap<DirectoryOp, Duration>,
    deny_rules: Vec<DenyRule>,
    case_counts: HashMap<String, u32>,
}

#[derive(Default)]
pub struct InMemoryDirectory {
    state: Mutex<DirectoryState>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry under `parent`
    pub fn insert(&self, mut element: Element, parent: Option<ElementId>) {
        let mut state = lock(&self.state);
        element.parent_id = parent;
        if !state.elements.contains_key(&element.id) {
            state.order.push(element.id);
        }
        state.elements.insert(element.id, element);
    }

    pub fn contains(&self, id: ElementId) -> bool {
        lock(&self.state).elements.contains_key(&id)
    }

    pub fn element(&self, id: ElementId) -> Option<Element> {
        lock(&self.state).elements.get(&id).cloned()
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        lock(&self.state).calls.clone()
    }

    pub fn permission_checks(&self) -> Vec<PermissionCheck> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DirectoryCall::CheckPermission { check, .. } => Some(check),
                _ => None,
            })
            .collect()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_mutation()).count()
    }

    /// Every call of `op` fails with `error` from now on
    pub fn fail_on(&self, op: DirectoryOp, error: ExploreError) {
        lock(&self.state).failures.insert(op, error);
    }

    /// Every call of `op` sleeps for `delay` before running
    pub fn delay_on(&self, op: DirectoryOp, delay: Duration) {
        lock(&self.state).delays.insert(op, delay);
    }

    /// Deny every permission check
    pub fn deny_all(&self, reason: &str) {
        self.push_rule(None, None, reason);
    }

    /// Deny checks of the given permission type
    pub fn deny_permission(&self, permission: PermissionType, reason: &str) {
        self.push_rule(Some(permission), None, reason);
    }

    /// Deny checks of `permission` that touch `target` (as subject or target directory)
    pub fn deny_on(&self, permission: PermissionType, target: ElementId, reason: &str) {
        self.push_rule(Some(permission), Some(target), reason);
    }

    fn push_rule(&self, permission: Option<PermissionType>, target: Option<ElementId>, reason: &str) {
        lock(&self.state).deny_rules.push(DenyRule {
            permission,
            target,
            reason: reason.to_string(),
        });
    }

    pub fn set_case_count(&self, user: &str, count: u32) {
        lock(&self.state).case_counts.insert(user.to_string(), count);
    }

    async fn enter(&self, op: DirectoryOp, call: DirectoryCall) -> Result<(), ExploreError> {
        let delay = {
            let mut state = lock(&self.state);
            state.calls.push(call);
            state.delays.get(&op).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match lock(&self.state).failures.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn create_element(
        &self,
        element: &Element,
        parent: ElementId,
        user: &str,
    ) -> Result<Element, ExploreError> {
        self.enter(
            DirectoryOp::CreateElement,
            DirectoryCall::CreateElement {
                id: element.id,
                parent,
                user: user.to_string(),
            },
        )
        .await?;

        let mut created = element.clone();
        created.parent_id = Some(parent);
        let mut state = lock(&self.state);
        if state.elements.contains_key(&created.id) {
            return Err(ExploreError::IncorrectPayload(format!(
                "element {} already exists",
                created.id
            )));
        }
        state.order.push(created.id);
        state.elements.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_element(
        &self,
        id: ElementId,
        patch: &ElementPatch,
        user: &str,
    ) -> Result<(), ExploreError> {
        self.enter(
            DirectoryOp::UpdateElement,
            DirectoryCall::UpdateElement {
                id,
                patch: patch.clone(),
                user: user.to_string(),
            },
        )
        .await?;

        let mut state = lock(&self.state);
        let element = state
            .elements
            .get_mut(&id)
            .ok_or_else(|| ExploreError::NotFound(format!("element {}", id)))?;
        if let Some(name) = &patch.name {
            element.name = name.clone();
        }
        if let Some(description) = &patch.description {
            element.description = Some(description.clone());
        }
        Ok(())
    }

    async fn delete_element(&self, id: ElementId, user: &str) -> Result<(), ExploreError> {
        self.enter(
            DirectoryOp::DeleteElement,
            DirectoryCall::DeleteElement {
                id,
                user: user.to_string(),
            },
        )
        .await?;

        let mut state = lock(&self.state);
        state
            .elements
            .remove(&id)
            .ok_or_else(|| ExploreError::NotFound(format!("element {}", id)))?;
        state.order.retain(|e| *e != id);
        Ok(())
    }

    async fn delete_elements(
        &self,
        ids: &[ElementId],
        parent: Option<ElementId>,
        user: &str,
    ) -> Result<(), ExploreError> {
        self.enter(
            DirectoryOp::DeleteElements,
            DirectoryCall::DeleteElements {
                ids: ids.to_vec(),
                parent,
                user: user.to_string(),
            },
        )
        .await?;

        let mut state = lock(&self.state);
        for id in ids {
            state.elements.remove(id);
        }
        state.order.retain(|e| !ids.contains(e));
        Ok(())
    }

    async fn get_element_infos(&self, id: ElementId) -> Result<Element, ExploreError> {
        self.enter(DirectoryOp::GetElementInfos, DirectoryCall::GetElementInfos { id })
            .await?;
        lock(&self.state)
            .elements
            .get(&id)
            .cloned()
            .ok_or_else(|| ExploreError::NotFound(format!("element {}", id)))
    }

    async fn get_elements_infos(
        &self,
        ids: &[ElementId],
        type_filter: Option<&[ElementType]>,
    ) -> Result<Vec<Element>, ExploreError> {
        self.enter(
            DirectoryOp::GetElementsInfos,
            DirectoryCall::GetElementsInfos { ids: ids.to_vec() },
        )
        .await?;

        let state = lock(&self.state);
        Ok(ids
            .iter()
            .filter_map(|id| state.elements.get(id))
            .filter(|e| type_filter.map_or(true, |types| types.contains(&e.element_type)))
            .cloned()
            .collect())
    }

    async fn check_permission(
        &self,
        check: &PermissionCheck,
        user: &str,
    ) -> Result<PermissionResult, ExploreError> {
        self.enter(
            DirectoryOp::CheckPermission,
            DirectoryCall::CheckPermission {
                check: check.clone(),
                user: user.to_string(),
            },
        )
        .await?;

        let state = lock(&self.state);
        Ok(state
            .deny_rules
            .iter()
            .find(|rule| rule.matches(check))
            .map(|rule| PermissionResult::denied(rule.reason.clone()))
            .unwrap_or_else(PermissionResult::granted))
    }

    async fn notify_directory_changed(
        &self,
        id: ElementId,
        user: &str,
    ) -> Result<(), ExploreError> {
        self.enter(
            DirectoryOp::NotifyDirectoryChanged,
            DirectoryCall::NotifyDirectoryChanged {
                id,
                user: user.to_string(),
            },
        )
        .await
    }

    async fn count_user_cases(&self, user: &str) -> Result<u32, ExploreError> {
        self.enter(
            DirectoryOp::CountUserCases,
            DirectoryCall::CountUserCases {
                user: user.to_string(),
            },
        )
        .await?;
        Ok(lock(&self.state).case_counts.get(user).copied().unwrap_or(0))
    }
}

// ============================================================================
// Content service
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentOp {
    Create,
    Duplicate,
    Delete,
    GetMetadata,
    Update,
    ReplaceWithScript,
    CreateScriptFrom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentCall {
    Create { id: ElementId, user: String },
    Duplicate { source: ElementId, new_id: ElementId, user: String },
    Delete { id: ElementId, user: String },
    GetMetadata { ids: Vec<ElementId> },
    Update { id: ElementId, user: String },
    ReplaceWithScript { id: ElementId, user: String },
    CreateScriptFrom { source: ElementId, new_id: ElementId, user: String },
}

#[derive(Default)]
struct ContentState {
    records: HashMap<ElementId, Value>,
    metadata: HashMap<ElementId, SpecificMetadata>,
    calls: Vec<ContentCall>,
    failures: HashMap<ContentOp, ExploreError>,
    failing_deletes: HashSet<ElementId>,
}

pub struct InMemoryContentService {
    name: String,
    supports_scripts: bool,
    state: Mutex<ContentState>,
}

impl InMemoryContentService {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            supports_scripts: false,
            state: Mutex::new(ContentState::default()),
        }
    }

    /// Enable update, replace-with-script and script derivation
    pub fn with_script_support(mut self) -> Self {
        self.supports_scripts = true;
        self
    }

    pub fn insert(&self, id: ElementId, payload: Value) {
        lock(&self.state).records.insert(id, payload);
    }

    /// Metadata returned for `id` by `get_metadata`, without the `id` field
    pub fn set_metadata(&self, id: ElementId, metadata: SpecificMetadata) {
        lock(&self.state).metadata.insert(id, metadata);
    }

    pub fn contains(&self, id: ElementId) -> bool {
        lock(&self.state).records.contains_key(&id)
    }

    pub fn record(&self, id: ElementId) -> Option<Value> {
        lock(&self.state).records.get(&id).cloned()
    }

    pub fn calls(&self) -> Vec<ContentCall> {
        lock(&self.state).calls.clone()
    }

    pub fn delete_calls_for(&self, id: ElementId) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ContentCall::Delete { id: d, .. } if *d == id))
            .count()
    }

    pub fn fail_on(&self, op: ContentOp, error: ExploreError) {
        lock(&self.state).failures.insert(op, error);
    }

    /// Deleting `id` fails while other deletes keep working
    pub fn fail_delete_of(&self, id: ElementId) {
        lock(&self.state).failing_deletes.insert(id);
    }

    fn enter(&self, op: ContentOp, call: ContentCall) -> Result<(), ExploreError> {
        let mut state = lock(&self.state);
        state.calls.push(call);
        match state.failures.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn unsupported(&self, what: &str) -> ExploreError {
        ExploreError::UnsupportedOperation(format!("{} cannot {}", self.name, what))
    }

    fn not_found(&self, id: ElementId) -> ExploreError {
        ExploreError::NotFound(format!("{} has no record {}", self.name, id))
    }
}

#[async_trait]
impl ContentService for InMemoryContentService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create(&self, id: ElementId, payload: &Value, user: &str) -> Result<(), ExploreError> {
        self.enter(
            ContentOp::Create,
            ContentCall::Create {
                id,
                user: user.to_string(),
            },
        )?;
        lock(&self.state).records.insert(id, payload.clone());
        Ok(())
    }

    async fn duplicate(&self, source: ElementId, user: &str) -> Result<ElementId, ExploreError> {
        let new_id = ElementId::new();
        self.enter(
            ContentOp::Duplicate,
            ContentCall::Duplicate {
                source,
                new_id,
                user: user.to_string(),
            },
        )?;
        let mut state = lock(&self.state);
        let payload = state
            .records
            .get(&source)
            .cloned()
            .ok_or_else(|| self.not_found(source))?;
        state.records.insert(new_id, payload);
        Ok(new_id)
    }

    async fn delete(&self, id: ElementId, user: &str) -> Result<(), ExploreError> {
        self.enter(
            ContentOp::Delete,
            ContentCall::Delete {
                id,
                user: user.to_string(),
            },
        )?;
        let mut state = lock(&self.state);
        if state.failing_deletes.contains(&id) {
            return Err(ExploreError::Remote(crate::domain::error::RemoteError::new(
                self.name.clone(),
                Some(500),
                format!("cannot delete {}", id),
            )));
        }
        state.metadata.remove(&id);
        state
            .records
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| self.not_found(id))
    }

    async fn get_metadata(&self, ids: &[ElementId]) -> Result<Vec<SpecificMetadata>, ExploreError> {
        self.enter(
            ContentOp::GetMetadata,
            ContentCall::GetMetadata { ids: ids.to_vec() },
        )?;
        let state = lock(&self.state);
        Ok(ids
            .iter()
            .filter_map(|id| {
                state.metadata.get(id).map(|metadata| {
                    let mut entry = metadata.clone();
                    entry.insert("id".to_string(), Value::String(id.to_string()));
                    entry
                })
            })
            .collect())
    }

    async fn update(&self, id: ElementId, payload: &Value, user: &str) -> Result<(), ExploreError> {
        if !self.supports_scripts {
            return Err(self.unsupported("update content"));
        }
        self.enter(
            ContentOp::Update,
            ContentCall::Update {
                id,
                user: user.to_string(),
            },
        )?;
        let mut state = lock(&self.state);
        match state.records.get_mut(&id) {
            Some(record) => {
                *record = payload.clone();
                Ok(())
            }
            None => Err(self.not_found(id)),
        }
    }

    async fn replace_with_script(&self, id: ElementId, user: &str) -> Result<(), ExploreError> {
        if !self.supports_scripts {
            return Err(self.unsupported("replace content with a script"));
        }
        self.enter(
            ContentOp::ReplaceWithScript,
            ContentCall::ReplaceWithScript {
                id,
                user: user.to_string(),
            },
        )?;
        let mut state = lock(&self.state);
        match state.records.get_mut(&id) {
            Some(record) => {
                *record = serde_json::json!({ "script": record.clone() });
                Ok(())
            }
            None => Err(self.not_found(id)),
        }
    }

    async fn create_script_from(
        &self,
        source: ElementId,
        new_id: ElementId,
        user: &str,
    ) -> Result<(), ExploreError> {
        if !self.supports_scripts {
            return Err(self.unsupported("create a script"));
        }
        self.enter(
            ContentOp::CreateScriptFrom,
            ContentCall::CreateScriptFrom {
                source,
                new_id,
                user: user.to_string(),
            },
        )?;
        let mut state = lock(&self.state);
        let payload = state
            .records
            .get(&source)
            .cloned()
            .ok_or_else(|| self.not_found(source))?;
        state
            .records
            .insert(new_id, serde_json::json!({ "script": payload }));
        Ok(())
    }
}

// ============================================================================
// User admin
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserAdmin {
    limits: Mutex<HashMap<String, u32>>,
}

impl InMemoryUserAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_max_cases(&self, user: &str, limit: u32) {
        lock(&self.limits).insert(user.to_string(), limit);
    }
}

#[async_trait]
impl UserAdminClient for InMemoryUserAdmin {
    async fn max_allowed_cases(&self, user: &str) -> Result<Option<u32>, ExploreError> {
        Ok(lock(&self.limits).get(user).copied())
    }
}
