// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::error::ExploreError;

/// Type-specific metadata returned by a content service for one element.
pub type SpecificMetadata = Map<String, Value>;

// ============================================================================
// Value Objects
// ============================================================================

/// Unique identifier shared by the directory entry and the content record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementType {
    Study,
    Filter,
    ContingencyList,
    Parameters,
    SpreadsheetConfig,
    SpreadsheetConfigCollection,
    Workspace,
    DiagramConfig,
    Case,
    Directory,
}

impl ElementType {
    pub const ALL: [ElementType; 10] = [
        ElementType::Study,
        ElementType::Filter,
        ElementType::ContingencyList,
        ElementType::Parameters,
        ElementType::SpreadsheetConfig,
        ElementType::SpreadsheetConfigCollection,
        ElementType::Workspace,
        ElementType::DiagramConfig,
        ElementType::Case,
        ElementType::Directory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Study => "STUDY",
            Self::Filter => "FILTER",
            Self::ContingencyList => "CONTINGENCY_LIST",
            Self::Parameters => "PARAMETERS",
            Self::SpreadsheetConfig => "SPREADSHEET_CONFIG",
            Self::SpreadsheetConfigCollection => "SPREADSHEET_CONFIG_COLLECTION",
            Self::Workspace => "WORKSPACE",
            Self::DiagramConfig => "DIAGRAM_CONFIG",
            Self::Case => "CASE",
            Self::Directory => "DIRECTORY",
        }
    }

    /// Types counted against the per-user case quota
    pub fn counts_against_case_quota(&self) -> bool {
        matches!(self, Self::Case | Self::Study)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = ExploreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ExploreError::UnknownElementType(s.to_string()))
    }
}

/// Sub-type of a `PARAMETERS` element; each may be owned by a different content service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParametersType {
    Loadflow,
    SecurityAnalysis,
    SensitivityAnalysis,
    ShortCircuit,
    VoltageInit,
    DynamicSimulation,
    StateEstimation,
    PccMin,
}

impl ParametersType {
    pub const ALL: [ParametersType; 8] = [
        ParametersType::Loadflow,
        ParametersType::SecurityAnalysis,
        ParametersType::SensitivityAnalysis,
        ParametersType::ShortCircuit,
        ParametersType::VoltageInit,
        ParametersType::DynamicSimulation,
        ParametersType::StateEstimation,
        ParametersType::PccMin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loadflow => "LOADFLOW",
            Self::SecurityAnalysis => "SECURITY_ANALYSIS",
            Self::SensitivityAnalysis => "SENSITIVITY_ANALYSIS",
            Self::ShortCircuit => "SHORT_CIRCUIT",
            Self::VoltageInit => "VOLTAGE_INIT",
            Self::DynamicSimulation => "DYNAMIC_SIMULATION",
            Self::StateEstimation => "STATE_ESTIMATION",
            Self::PccMin => "PCC_MIN",
        }
    }
}

impl fmt::Display for ParametersType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParametersType {
    type Err = ExploreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ExploreError::UnknownElementType(format!("PARAMETERS/{}", s)))
    }
}

/// Registry key: element type plus, for parameters, the sub-type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementTypeKey {
    pub element_type: ElementType,
    pub parameters_type: Option<ParametersType>,
}

impl ElementTypeKey {
    pub fn of(element_type: ElementType) -> Self {
        Self {
            element_type,
            parameters_type: None,
        }
    }

    pub fn parameters(parameters_type: ParametersType) -> Self {
        Self {
            element_type: ElementType::Parameters,
            parameters_type: Some(parameters_type),
        }
    }
}

impl From<ElementType> for ElementTypeKey {
    fn from(element_type: ElementType) -> Self {
        Self::of(element_type)
    }
}

impl fmt::Display for ElementTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parameters_type {
            Some(sub) => write!(f, "{}/{}", self.element_type, sub),
            None => write!(f, "{}", self.element_type),
        }
    }
}

// ============================================================================
// Entity: Element
// ============================================================================

/// A directory-tracked object whose payload lives in a content service.
///
/// The directory owns every field here except `specific_metadata`, which the
/// metadata aggregator attaches from the owning content service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    #[serde(rename = "elementUuid")]
    pub id: ElementId,

    #[serde(rename = "elementName")]
    pub name: String,

    #[serde(rename = "type")]
    pub element_type: ElementType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters_type: Option<ParametersType>,

    pub owner: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Parent directory, when the directory service reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ElementId>,

    #[serde(default)]
    pub subdirectories_count: i64,

    #[serde(default)]
    pub specific_metadata: Option<SpecificMetadata>,
}

impl Element {
    pub fn new(
        id: ElementId,
        name: impl Into<String>,
        key: ElementTypeKey,
        owner: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            element_type: key.element_type,
            parameters_type: key.parameters_type,
            owner: owner.into(),
            description,
            parent_id: None,
            subdirectories_count: 0,
            specific_metadata: None,
        }
    }

    pub fn type_key(&self) -> ElementTypeKey {
        ElementTypeKey {
            element_type: self.element_type,
            parameters_type: self.parameters_type,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.element_type == ElementType::Directory
    }
}

/// Attribute changes applied to an existing directory entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(default, rename = "elementName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ElementPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Everything needed to create a new element from scratch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementCreation {
    #[serde(rename = "type")]
    pub element_type: ElementType,

    #[serde(default)]
    pub parameters_type: Option<ParametersType>,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "parentDirectoryUuid")]
    pub parent_directory: ElementId,

    #[serde(default)]
    pub payload: Value,
}

impl ElementCreation {
    pub fn type_key(&self) -> ElementTypeKey {
        ElementTypeKey {
            element_type: self.element_type,
            parameters_type: self.parameters_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_parsing() {
        assert_eq!("FILTER".parse::<ElementType>().unwrap(), ElementType::Filter);
        assert_eq!(
            "contingency_list".parse::<ElementType>().unwrap(),
            ElementType::ContingencyList
        );
        assert!(matches!(
            "NETWORK".parse::<ElementType>(),
            Err(ExploreError::UnknownElementType(_))
        ));
    }

    #[test]
    fn test_type_key_display() {
        assert_eq!(ElementTypeKey::of(ElementType::Study).to_string(), "STUDY");
        assert_eq!(
            ElementTypeKey::parameters(ParametersType::Loadflow).to_string(),
            "PARAMETERS/LOADFLOW"
        );
    }

    #[test]
    fn test_element_wire_format() {
        let id = ElementId::new();
        let element = Element::new(
            id,
            "my filter",
            ElementTypeKey::of(ElementType::Filter),
            "u1",
            None,
        );

        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["elementUuid"], serde_json::json!(id.to_string()));
        assert_eq!(json["elementName"], "my filter");
        assert_eq!(json["type"], "FILTER");
        assert_eq!(json["owner"], "u1");
        assert!(json["specificMetadata"].is_null());
        assert!(json.get("parametersType").is_none());
    }

    #[test]
    fn test_element_deserializes_directory_payload() {
        let json = serde_json::json!({
            "elementUuid": "2f1b0d5c-36a3-4f5e-9c41-7b0d8bde0a11",
            "elementName": "params",
            "type": "PARAMETERS",
            "parametersType": "SECURITY_ANALYSIS",
            "owner": "alice",
            "subdirectoriesCount": 0
        });

        let element: Element = serde_json::from_value(json).unwrap();
        assert_eq!(
            element.type_key(),
            ElementTypeKey::parameters(ParametersType::SecurityAnalysis)
        );
        assert_eq!(element.description, None);
        assert_eq!(element.parent_id, None);
    }

    #[test]
    fn test_case_quota_types() {
        assert!(ElementType::Case.counts_against_case_quota());
        assert!(ElementType::Study.counts_against_case_quota());
        assert!(!ElementType::Filter.counts_against_case_quota());
    }
}
