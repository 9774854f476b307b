// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Metadata Aggregator
//!
//! Scatter-gather for element listings: base attributes come from the
//! directory service, type-specific metadata from every content service that
//! registers some. Per-type calls run concurrently and the first failure
//! fails the whole listing; partial results are never returned.

use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::content::ContentService;
use crate::domain::directory::DirectoryClient;
use crate::domain::element::{Element, ElementId, ElementType, ElementTypeKey, SpecificMetadata};
use crate::domain::error::ExploreError;
use crate::domain::type_registry::TypeRegistry;

const EQUIPMENT_TYPE_FIELD: &str = "equipmentType";

/// Listing request with its optional filters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataQuery {
    pub ids: Vec<ElementId>,
    #[serde(default)]
    pub element_types: Option<Vec<ElementType>>,
    #[serde(default)]
    pub equipment_types: Option<Vec<String>>,
}

impl MetadataQuery {
    pub fn new(ids: Vec<ElementId>) -> Self {
        Self {
            ids,
            ..Default::default()
        }
    }
}

pub struct MetadataAggregator {
    directory: Arc<dyn DirectoryClient>,
    registry: Arc<TypeRegistry>,
}

impl MetadataAggregator {
    pub fn new(directory: Arc<dyn DirectoryClient>, registry: Arc<TypeRegistry>) -> Self {
        Self { directory, registry }
    }

    pub async fn list_with_metadata(&self, ids: &[ElementId]) -> Result<Vec<Element>, ExploreError> {
        self.list(&MetadataQuery::new(ids.to_vec())).await
    }

    pub async fn list(&self, query: &MetadataQuery) -> Result<Vec<Element>, ExploreError> {
        let mut elements = self
            .directory
            .get_elements_infos(&query.ids, query.element_types.as_deref())
            .await?;

        let index = self.gather(&elements).await?;
        for element in &mut elements {
            if self.registry.has_metadata(element.type_key()) {
                element.specific_metadata = index.get(&element.id.to_string()).cloned();
            }
        }

        if let Some(equipment_types) = &query.equipment_types {
            elements.retain(|element| matches_equipment_type(element, equipment_types));
        }
        Ok(elements)
    }

    /// One `get_metadata` call per registered service key present in `elements`
    async fn gather(&self, elements: &[Element]) -> Result<HashMap<String, SpecificMetadata>, ExploreError> {
        let mut partitions: HashMap<ElementTypeKey, (Arc<dyn ContentService>, Vec<ElementId>)> =
            HashMap::new();
        for element in elements {
            let Some(entry) = self.registry.metadata_entry(element.type_key()) else {
                continue;
            };
            partitions
                .entry(entry.key)
                .or_insert_with(|| (entry.service.clone(), Vec::new()))
                .1
                .push(element.id);
        }

        debug!(types = partitions.len(), elements = elements.len(), "Fanning out metadata calls");
        let calls = partitions.into_iter().map(|(key, (service, ids))| async move {
            service.get_metadata(&ids).await.map_err(|e| {
                warn!(element_type = %key, service = service.name(), "Metadata call failed: {}", e);
                e
            })
        });
        let responses = try_join_all(calls).await?;

        let mut index = HashMap::new();
        for mut metadata in responses.into_iter().flatten() {
            match metadata.remove("id") {
                Some(Value::String(id)) => {
                    index.insert(id.to_lowercase(), metadata);
                }
                _ => warn!("Dropping metadata entry without a string id"),
            }
        }
        Ok(index)
    }
}

fn matches_equipment_type(element: &Element, allowed: &[String]) -> bool {
    let equipment_type = element
        .specific_metadata
        .as_ref()
        .and_then(|metadata| metadata.get(EQUIPMENT_TYPE_FIELD))
        .and_then(Value::as_str);
    match equipment_type {
        Some(value) => allowed.iter().any(|a| a == value),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::{ContentCall, InMemoryContentService, InMemoryDirectory};
    use serde_json::json;

    fn metadata(value: Value) -> SpecificMetadata {
        match value {
            Value::Object(map) => map,
            _ => panic!("metadata must be an object"),
        }
    }

    #[tokio::test]
    async fn test_equipment_type_filter_keeps_untyped_elements() {
        let directory = Arc::new(InMemoryDirectory::new());
        let filters = Arc::new(InMemoryContentService::new("filter-server"));
        let registry = TypeRegistry::builder()
            .register(ElementType::Filter, filters.clone(), true)
            .register(ElementType::Study, Arc::new(InMemoryContentService::new("study-server")), false)
            .build()
            .unwrap();

        let line = ElementId::new();
        let load = ElementId::new();
        let study = ElementId::new();
        for (id, ty) in [(line, ElementType::Filter), (load, ElementType::Filter), (study, ElementType::Study)] {
            directory.insert(Element::new(id, "e", ty.into(), "u1", None), None);
        }
        filters.set_metadata(line, metadata(json!({"equipmentType": "LINE"})));
        filters.set_metadata(load, metadata(json!({"equipmentType": "LOAD"})));

        let aggregator = MetadataAggregator::new(directory, Arc::new(registry));
        let query = MetadataQuery {
            ids: vec![line, load, study],
            element_types: None,
            equipment_types: Some(vec!["LINE".to_string()]),
        };
        let listed: Vec<ElementId> = aggregator.list(&query).await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(listed, vec![line, study]);
    }

    #[tokio::test]
    async fn test_one_call_per_service_key() {
        let directory = Arc::new(InMemoryDirectory::new());
        let filters = Arc::new(InMemoryContentService::new("filter-server"));
        let registry = TypeRegistry::builder()
            .register(ElementType::Filter, filters.clone(), true)
            .build()
            .unwrap();

        let ids: Vec<ElementId> = (0..3).map(|_| ElementId::new()).collect();
        for id in &ids {
            directory.insert(Element::new(*id, "f", ElementType::Filter.into(), "u1", None), None);
        }

        let aggregator = MetadataAggregator::new(directory, Arc::new(registry));
        aggregator.list_with_metadata(&ids).await.unwrap();

        assert_eq!(filters.calls(), vec![ContentCall::GetMetadata { ids: ids.clone() }]);
    }

    #[tokio::test]
    async fn test_empty_listing_makes_no_content_call() {
        let directory = Arc::new(InMemoryDirectory::new());
        let filters = Arc::new(InMemoryContentService::new("filter-server"));
        let registry = TypeRegistry::builder()
            .register(ElementType::Filter, filters.clone(), true)
            .build()
            .unwrap();

        let aggregator = MetadataAggregator::new(directory, Arc::new(registry));
        assert!(aggregator.list_with_metadata(&[]).await.unwrap().is_empty());
        assert!(filters.calls().is_empty());
    }
}
