// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Element Saga Application Service
//!
//! Orchestrates element lifecycle operations across the directory service and
//! the content services, which share no transaction manager:
//! - Creation, duplication and script derivation run as a two-step saga
//!   (content first, then directory) with one compensating content delete
//! - Single deletion cascades content then directory
//! - Bulk deletion is best-effort: every id is attempted, failures are
//!   reported per id, and one final directory strip always runs
//! - In-place content replacement is a single call followed by a directory
//!   change notification
//!
//! Every mutating path goes through the [`AuthorizationGate`] first.
//!
//! # Cancellation
//!
//! The forward steps and the compensation run on a spawned task that reports
//! back over a oneshot channel. Dropping the caller's future never leaves a
//! content record without either its directory entry or a compensation
//! attempt.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::application::authorization::AuthorizationGate;
use crate::domain::content::ContentService;
use crate::domain::directory::DirectoryClient;
use crate::domain::element::{Element, ElementCreation, ElementId, ElementPatch, ElementTypeKey};
use crate::domain::error::{ExploreError, RemoteError};
use crate::domain::events::ElementEvent;
use crate::domain::permission::PermissionType;
use crate::domain::saga::{SagaAction, SagaDescriptor, SagaError, SagaStep};
use crate::domain::type_registry::TypeRegistry;
use crate::domain::user_admin::UserAdminClient;
use crate::infrastructure::event_bus::EventBus;

pub const ELEMENTS_CREATED_METRIC: &str = "explore_elements_created_total";
pub const COMPENSATIONS_METRIC: &str = "explore_saga_compensations_total";
pub const BULK_DELETE_FAILURES_METRIC: &str = "explore_bulk_delete_failures_total";

const DIRECTORY_STEP: &str = "directory";

// ============================================================================
// Bulk deletion report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDeletionOutcome {
    pub element_id: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ElementDeletionOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-id result of a bulk deletion. Returned on success even when some ids
/// failed; orphaned content is left to out-of-band cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeletionReport {
    pub outcomes: Vec<ElementDeletionOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_cleanup_error: Option<String>,
}

impl BulkDeletionReport {
    pub fn failed_ids(&self) -> Vec<ElementId> {
        self.outcomes
            .iter()
            .filter(|o| !o.succeeded())
            .map(|o| o.element_id)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.directory_cleanup_error.is_none() && self.outcomes.iter().all(|o| o.succeeded())
    }
}

// ============================================================================
// Service Trait
// ============================================================================

#[async_trait]
pub trait ElementService: Send + Sync {
    async fn create_element(&self, request: ElementCreation, user: &str) -> Result<Element, ExploreError>;

    /// Copy `source` into `destination`, or next to the source when absent
    async fn duplicate_element(
        &self,
        source: ElementId,
        destination: Option<ElementId>,
        user: &str,
    ) -> Result<Element, ExploreError>;

    /// Derive a script element from the form-based `source`
    async fn create_script_from(
        &self,
        source: ElementId,
        name: String,
        parent: ElementId,
        user: &str,
    ) -> Result<Element, ExploreError>;

    async fn update_element(&self, id: ElementId, patch: ElementPatch, user: &str) -> Result<(), ExploreError>;

    async fn update_element_content(&self, id: ElementId, payload: Value, user: &str) -> Result<(), ExploreError>;

    async fn replace_with_script(&self, id: ElementId, user: &str) -> Result<(), ExploreError>;

    async fn delete_element(&self, id: ElementId, user: &str) -> Result<(), ExploreError>;

    async fn delete_elements(
        &self,
        ids: Vec<ElementId>,
        parent: Option<ElementId>,
        user: &str,
    ) -> Result<BulkDeletionReport, ExploreError>;
}

// ============================================================================
// Saga plan
// ============================================================================

enum ContentStep {
    Create { id: ElementId, payload: Value },
    Duplicate { source: ElementId },
    ScriptFrom { source: ElementId, id: ElementId },
}

impl ContentStep {
    fn local_id(&self) -> Option<ElementId> {
        match self {
            Self::Create { id, .. } | Self::ScriptFrom { id, .. } => Some(*id),
            Self::Duplicate { .. } => None,
        }
    }

    fn action(&self) -> SagaAction {
        match self {
            Self::Create { .. } => SagaAction::CreateContent,
            Self::Duplicate { source } => SagaAction::DuplicateContent { source: *source },
            Self::ScriptFrom { source, .. } => SagaAction::CreateScriptFrom { source: *source },
        }
    }

    async fn run(&self, content: &dyn ContentService, user: &str) -> Result<ElementId, ExploreError> {
        match self {
            Self::Create { id, payload } => content.create(*id, payload, user).await.map(|_| *id),
            Self::Duplicate { source } => content.duplicate(*source, user).await,
            Self::ScriptFrom { source, id } => {
                content.create_script_from(*source, *id, user).await.map(|_| *id)
            }
        }
    }
}

struct SagaPlan {
    content: Arc<dyn ContentService>,
    step: ContentStep,
    key: ElementTypeKey,
    name: String,
    description: Option<String>,
    parent: ElementId,
    user: String,
}

struct SagaRunner {
    directory: Arc<dyn DirectoryClient>,
    event_bus: Arc<EventBus>,
}

fn log_transition(result: Result<(), SagaError>) {
    if let Err(e) = result {
        error!("Saga bookkeeping error: {}", e);
    }
}

impl SagaRunner {
    async fn execute(self, plan: SagaPlan, reply: oneshot::Sender<Result<Element, ExploreError>>) {
        let SagaPlan {
            content,
            step,
            key,
            name,
            description,
            parent,
            user,
        } = plan;
        let mut saga = SagaDescriptor::new(key, step.local_id());

        // Forward step 1: content
        let id = match step.run(content.as_ref(), &user).await {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    element_type = %key,
                    service = content.name(),
                    user = %user,
                    "Content step failed, nothing to compensate: {}",
                    e
                );
                log_transition(saga.mark_failed());
                let _ = reply.send(Err(e));
                return;
            }
        };
        log_transition(saga.mark_content_created(id, SagaStep::new(content.name(), step.action())));

        // Forward step 2: directory
        let element = Element::new(id, name, key, user.clone(), description);
        match self.directory.create_element(&element, parent, &user).await {
            Ok(created) => {
                log_transition(saga.mark_directory_created(SagaStep::new(
                    DIRECTORY_STEP,
                    SagaAction::CreateDirectoryEntry { parent },
                )));
                info!(element_id = %id, element_type = %key, user = %user, "Element created");
                metrics::counter!(ELEMENTS_CREATED_METRIC, "type" => key.to_string()).increment(1);

                let event = match step {
                    ContentStep::Duplicate { source } => ElementEvent::ElementDuplicated {
                        source_id: source,
                        element_id: id,
                        element_type: key,
                        parent_id: parent,
                        duplicated_at: Utc::now(),
                    },
                    _ => ElementEvent::ElementCreated {
                        element_id: id,
                        element_type: key,
                        parent_id: parent,
                        owner: user.clone(),
                        created_at: Utc::now(),
                    },
                };
                self.event_bus.publish_element_event(event);
                let _ = reply.send(Ok(created));
            }
            Err(e) => {
                warn!(
                    element_id = %id,
                    element_type = %key,
                    user = %user,
                    "Directory step failed, compensating content record: {}",
                    e
                );
                log_transition(
                    saga.mark_compensating(SagaStep::new(content.name(), SagaAction::DeleteContent)),
                );
                // the caller gets the directory failure without waiting on cleanup
                let _ = reply.send(Err(e));

                self.compensate(content.as_ref(), id, &user).await;
                log_transition(saga.mark_failed());
            }
        }

        debug!(saga = ?saga, "Saga finished");
    }

    /// Single attempt; a failure is logged and published, never retried
    async fn compensate(&self, content: &dyn ContentService, id: ElementId, user: &str) {
        match content.delete(id, user).await {
            Ok(()) => {
                info!(element_id = %id, service = content.name(), "Compensation succeeded");
                metrics::counter!(COMPENSATIONS_METRIC, "outcome" => "success").increment(1);
                self.event_bus.publish_element_event(ElementEvent::CompensationSucceeded {
                    element_id: id,
                    service: content.name().to_string(),
                    compensated_at: Utc::now(),
                });
            }
            Err(e) => {
                error!(
                    element_id = %id,
                    service = content.name(),
                    "Compensation failed, content record is orphaned: {}",
                    e
                );
                metrics::counter!(COMPENSATIONS_METRIC, "outcome" => "failure").increment(1);
                self.event_bus.publish_element_event(ElementEvent::CompensationFailed {
                    element_id: id,
                    service: content.name().to_string(),
                    error: e.to_string(),
                    failed_at: Utc::now(),
                });
            }
        }
    }
}

// ============================================================================
// Standard Implementation
// ============================================================================

pub struct StandardElementService {
    directory: Arc<dyn DirectoryClient>,
    registry: Arc<TypeRegistry>,
    gate: Arc<dyn AuthorizationGate>,
    user_admin: Option<Arc<dyn UserAdminClient>>,
    event_bus: Arc<EventBus>,
}

impl StandardElementService {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        registry: Arc<TypeRegistry>,
        gate: Arc<dyn AuthorizationGate>,
        user_admin: Option<Arc<dyn UserAdminClient>>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            directory,
            registry,
            gate,
            user_admin,
            event_bus,
        }
    }

    async fn run_saga(&self, plan: SagaPlan) -> Result<Element, ExploreError> {
        let (reply, outcome) = oneshot::channel();
        let runner = SagaRunner {
            directory: self.directory.clone(),
            event_bus: self.event_bus.clone(),
        };
        tokio::spawn(runner.execute(plan, reply));

        outcome.await.unwrap_or_else(|_| {
            Err(RemoteError::unreachable("explore", "saga task ended without a result").into())
        })
    }

    async fn check_case_quota(&self, key: ElementTypeKey, user: &str) -> Result<(), ExploreError> {
        if !key.element_type.counts_against_case_quota() {
            return Ok(());
        }
        let Some(user_admin) = &self.user_admin else {
            return Ok(());
        };

        if let Some(limit) = user_admin.max_allowed_cases(user).await? {
            let count = self.directory.count_user_cases(user).await?;
            if count >= limit {
                warn!(user = %user, count, limit, "Case quota reached");
                return Err(ExploreError::MaxElementsExceeded { limit });
            }
        }
        Ok(())
    }

    /// Notify the directory in the background; the outcome is logged and published
    fn spawn_directory_notification(&self, id: ElementId, user: &str) {
        let directory = self.directory.clone();
        let event_bus = self.event_bus.clone();
        let user = user.to_string();

        tokio::spawn(async move {
            let success = match directory.notify_directory_changed(id, &user).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(element_id = %id, "Directory change notification failed: {}", e);
                    false
                }
            };
            event_bus.publish_element_event(ElementEvent::DirectoryNotified {
                element_id: id,
                success,
                notified_at: Utc::now(),
            });
        });
    }

    fn publish_updated(&self, id: ElementId, user: &str) {
        self.event_bus.publish_element_event(ElementEvent::ElementUpdated {
            element_id: id,
            user: user.to_string(),
            updated_at: Utc::now(),
        });
    }

    async fn delete_content(&self, element: &Element, user: &str) -> Result<(), ExploreError> {
        if element.is_directory() {
            return Ok(());
        }
        let content = self.registry.resolve(element.type_key())?;
        content.delete(element.id, user).await
    }

    async fn attempt_deletion(&self, id: ElementId, user: &str) -> Result<(), ExploreError> {
        let element = self.directory.get_element_infos(id).await?;
        self.delete_content(&element, user).await
    }
}

#[async_trait]
impl ElementService for StandardElementService {
    async fn create_element(&self, request: ElementCreation, user: &str) -> Result<Element, ExploreError> {
        let key = request.type_key();
        let content = self.registry.resolve(key)?;

        self.gate
            .authorize(user, &[request.parent_directory], None, PermissionType::Write, false)
            .await?;
        self.check_case_quota(key, user).await?;

        info!(element_type = %key, parent = %request.parent_directory, user = %user, "Creating element");
        self.run_saga(SagaPlan {
            content,
            step: ContentStep::Create {
                id: ElementId::new(),
                payload: request.payload,
            },
            key,
            name: request.name,
            description: request.description,
            parent: request.parent_directory,
            user: user.to_string(),
        })
        .await
    }

    async fn duplicate_element(
        &self,
        source: ElementId,
        destination: Option<ElementId>,
        user: &str,
    ) -> Result<Element, ExploreError> {
        let original = self.directory.get_element_infos(source).await?;
        let parent = destination.or(original.parent_id).ok_or_else(|| {
            ExploreError::NotFound(format!("parent directory of element {}", source))
        })?;
        self.gate.authorize_duplication(user, source, parent).await?;

        let key = original.type_key();
        let content = self.registry.resolve(key)?;
        self.check_case_quota(key, user).await?;

        info!(source = %source, parent = %parent, user = %user, "Duplicating element");
        self.run_saga(SagaPlan {
            content,
            step: ContentStep::Duplicate { source },
            key,
            name: original.name,
            description: original.description,
            parent,
            user: user.to_string(),
        })
        .await
    }

    async fn create_script_from(
        &self,
        source: ElementId,
        name: String,
        parent: ElementId,
        user: &str,
    ) -> Result<Element, ExploreError> {
        self.gate
            .authorize(user, &[source], None, PermissionType::Read, false)
            .await?;
        self.gate
            .authorize(user, &[parent], None, PermissionType::Write, false)
            .await?;

        let original = self.directory.get_element_infos(source).await?;
        let key = original.type_key();
        let content = self.registry.resolve(key)?;

        self.run_saga(SagaPlan {
            content,
            step: ContentStep::ScriptFrom {
                source,
                id: ElementId::new(),
            },
            key,
            name,
            description: original.description,
            parent,
            user: user.to_string(),
        })
        .await
    }

    async fn update_element(&self, id: ElementId, patch: ElementPatch, user: &str) -> Result<(), ExploreError> {
        self.gate
            .authorize(user, &[id], None, PermissionType::Write, false)
            .await?;
        if patch.is_empty() {
            return Ok(());
        }
        self.directory.update_element(id, &patch, user).await?;
        self.publish_updated(id, user);
        Ok(())
    }

    async fn update_element_content(&self, id: ElementId, payload: Value, user: &str) -> Result<(), ExploreError> {
        self.gate
            .authorize(user, &[id], None, PermissionType::Write, false)
            .await?;
        let element = self.directory.get_element_infos(id).await?;
        let content = self.registry.resolve(element.type_key())?;

        content.update(id, &payload, user).await?;
        self.spawn_directory_notification(id, user);
        self.publish_updated(id, user);
        Ok(())
    }

    async fn replace_with_script(&self, id: ElementId, user: &str) -> Result<(), ExploreError> {
        self.gate
            .authorize(user, &[id], None, PermissionType::Write, false)
            .await?;
        let element = self.directory.get_element_infos(id).await?;
        let content = self.registry.resolve(element.type_key())?;

        content.replace_with_script(id, user).await?;
        self.spawn_directory_notification(id, user);
        self.publish_updated(id, user);
        Ok(())
    }

    async fn delete_element(&self, id: ElementId, user: &str) -> Result<(), ExploreError> {
        // checked before the lookup; recursion on a leaf is a no-op
        // recursive before the lookup: a leaf has no descendants to validate
        self.gate
            .authorize(user, &[id], None, PermissionType::Write, true)
            .await?;
        let element = self.directory.get_element_infos(id).await?;

        // content first, so a directory entry never outlives its payload
        self.delete_content(&element, user).await?;
        self.directory.delete_element(id, user).await?;

        info!(element_id = %id, user = %user, "Element deleted");
        self.event_bus.publish_element_event(ElementEvent::ElementDeleted {
            element_id: id,
            user: user.to_string(),
            deleted_at: Utc::now(),
        });
        Ok(())
    }

    async fn delete_elements(
        &self,
        ids: Vec<ElementId>,
        parent: Option<ElementId>,
        user: &str,
    ) -> Result<BulkDeletionReport, ExploreError> {
        self.gate
            .authorize(user, &ids, parent, PermissionType::Write, true)
            .await?;

        info!(count = ids.len(), user = %user, "Starting bulk deletion");
        let mut report = BulkDeletionReport::default();

        for id in &ids {
            let error = match self.attempt_deletion(*id, user).await {
                Ok(()) => None,
                Err(e) => {
                    warn!(element_id = %id, "Failed to delete element content, continuing: {}", e);
                    metrics::counter!(BULK_DELETE_FAILURES_METRIC).increment(1);
                    Some(e.to_string())
                }
            };
            report.outcomes.push(ElementDeletionOutcome {
                element_id: *id,
                error,
            });
        }

        // Strip directory references even for ids whose content survived
        if let Err(e) = self.directory.delete_elements(&ids, parent, user).await {
            error!(count = ids.len(), "Bulk directory cleanup failed: {}", e);
            report.directory_cleanup_error = Some(e.to_string());
        }

        let failed = report.failed_ids().len();
        info!(requested = ids.len(), failed, "Bulk deletion finished");
        self.event_bus.publish_element_event(ElementEvent::BulkDeletionCompleted {
            requested: ids.len(),
            failed,
            directory_cleaned: report.directory_cleanup_error.is_none(),
            completed_at: Utc::now(),
        });
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::authorization::DirectoryAuthorizationGate;
    use crate::domain::element::ElementType;
    use crate::infrastructure::in_memory::{
        ContentCall, DirectoryOp, InMemoryContentService, InMemoryDirectory, InMemoryUserAdmin,
    };

    struct Fixture {
        directory: Arc<InMemoryDirectory>,
        filters: Arc<InMemoryContentService>,
        studies: Arc<InMemoryContentService>,
        user_admin: Arc<InMemoryUserAdmin>,
        service: StandardElementService,
    }

    fn fixture() -> Fixture {
        let directory = Arc::new(InMemoryDirectory::new());
        let filters = Arc::new(InMemoryContentService::new("filter-server").with_script_support());
        let studies = Arc::new(InMemoryContentService::new("study-server"));
        let user_admin = Arc::new(InMemoryUserAdmin::new());
        let registry = TypeRegistry::builder()
            .register(ElementType::Filter, filters.clone(), true)
            .register(ElementType::Study, studies.clone(), false)
            .build()
            .unwrap();
        let service = StandardElementService::new(
            directory.clone(),
            Arc::new(registry),
            Arc::new(DirectoryAuthorizationGate::new(directory.clone())),
            Some(user_admin.clone()),
            Arc::new(EventBus::new(100)),
        );
        Fixture {
            directory,
            filters,
            studies,
            user_admin,
            service,
        }
    }

    fn study_request(parent: ElementId) -> ElementCreation {
        ElementCreation {
            element_type: ElementType::Study,
            parameters_type: None,
            name: "study".to_string(),
            description: None,
            parent_directory: parent,
            payload: Value::Null,
        }
    }

    #[tokio::test]
    async fn test_case_quota_blocks_before_any_mutation() {
        let f = fixture();
        f.user_admin.set_max_cases("u1", 2);
        f.directory.set_case_count("u1", 2);

        let err = f
            .service
            .create_element(study_request(ElementId::new()), "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, ExploreError::MaxElementsExceeded { limit: 2 }));
        assert!(f.studies.calls().is_empty());
        assert_eq!(f.directory.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_case_quota_allows_below_limit() {
        let f = fixture();
        f.user_admin.set_max_cases("u1", 2);
        f.directory.set_case_count("u1", 1);

        let created = f
            .service
            .create_element(study_request(ElementId::new()), "u1")
            .await
            .unwrap();
        assert!(f.studies.contains(created.id));
    }

    #[tokio::test]
    async fn test_replace_with_script_notifies_directory() {
        let f = fixture();
        let id = ElementId::new();
        f.directory.insert(
            Element::new(id, "f", ElementType::Filter.into(), "u1", None),
            Some(ElementId::new()),
        );
        f.filters.insert(id, serde_json::json!({"rules": []}));
        let mut events = f.service.event_bus.subscribe_element(id);

        f.service.replace_with_script(id, "u1").await.unwrap();

        assert!(f
            .filters
            .calls()
            .contains(&ContentCall::ReplaceWithScript { id, user: "u1".into() }));
        let notified = tokio::time::timeout(std::time::Duration::from_secs(2), async {
            loop {
                if let Ok(ElementEvent::DirectoryNotified { success, .. }) = events.recv().await {
                    return success;
                }
            }
        })
        .await
        .unwrap();
        assert!(notified);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_request() {
        let f = fixture();
        let id = ElementId::new();
        f.directory.insert(
            Element::new(id, "f", ElementType::Filter.into(), "u1", None),
            None,
        );
        f.filters.insert(id, Value::Null);
        f.directory.fail_on(
            DirectoryOp::NotifyDirectoryChanged,
            RemoteError::new("directory-server", Some(503), "busy").into(),
        );

        f.service
            .update_element_content(id, serde_json::json!({"rules": [1]}), "u1")
            .await
            .unwrap();
        assert_eq!(f.filters.record(id), Some(serde_json::json!({"rules": [1]})));
    }

    #[tokio::test]
    async fn test_update_element_patches_directory() {
        let f = fixture();
        let id = ElementId::new();
        f.directory.insert(
            Element::new(id, "old", ElementType::Filter.into(), "u1", None),
            None,
        );

        let patch = ElementPatch {
            name: Some("new".to_string()),
            description: Some("renamed".to_string()),
        };
        f.service.update_element(id, patch, "u1").await.unwrap();

        let updated = f.directory.element(id).unwrap();
        assert_eq!(updated.name, "new");
        assert_eq!(updated.description.as_deref(), Some("renamed"));
    }

    #[tokio::test]
    async fn test_create_script_from_uses_fresh_local_id() {
        let f = fixture();
        let source = ElementId::new();
        let parent = ElementId::new();
        f.directory.insert(
            Element::new(source, "form", ElementType::Filter.into(), "u1", None),
            Some(parent),
        );
        f.filters.insert(source, serde_json::json!({"rules": []}));

        let script = f
            .service
            .create_script_from(source, "script".to_string(), parent, "u1")
            .await
            .unwrap();

        assert_ne!(script.id, source);
        assert_eq!(script.name, "script");
        assert!(f.filters.contains(script.id));
        assert!(f.directory.contains(script.id));
    }

    #[tokio::test]
    async fn test_delete_directory_skips_content() {
        let f = fixture();
        let id = ElementId::new();
        f.directory.insert(
            Element::new(id, "dir", ElementType::Directory.into(), "u1", None),
            None,
        );

        f.service.delete_element(id, "u1").await.unwrap();

        assert!(!f.directory.contains(id));
        assert!(f.filters.calls().is_empty());
        assert!(f.directory.permission_checks()[0].recursive);
    }

    #[test]
    fn test_report_accounting() {
        let ok = ElementId::new();
        let ko = ElementId::new();
        let report = BulkDeletionReport {
            outcomes: vec![
                ElementDeletionOutcome { element_id: ok, error: None },
                ElementDeletionOutcome {
                    element_id: ko,
                    error: Some("boom".to_string()),
                },
            ],
            directory_cleanup_error: None,
        };
        assert_eq!(report.failed_ids(), vec![ko]);
        assert!(!report.is_complete());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["outcomes"][0].get("error").is_none());
        assert_eq!(json["outcomes"][1]["error"], "boom");
    }
}
