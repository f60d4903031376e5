// report.rs — Employee reports and the type-tagged details payload.
//
// A report's `details` shape depends on its type. Maintenance and Sales
// payloads are opaque to the backend (carried as-is); the Project payload
// is fully typed because the workflow engine mutates individual stage
// entries, the document list, and the exception log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::file::StoredFile;
use crate::note::AdminNote;

/// Report family. Determines the shape of [`ReportDetails`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Maintenance,
    Sales,
    Project,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::Sales => "sales",
            Self::Project => "project",
        }
    }
}

/// Project-level workflow checkpoint reached by stage confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowStatus {
    ConcreteWorksDone,
    TechnicallyCompleted,
}

/// The stages a caller may confirm on a Project report.
///
/// Wire ids are fixed by the client contract (camelCase, one legacy
/// underscore) — parsing an unknown id is the caller's error, not ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageId {
    ConcreteWorks,
    TechnicalCompletion,
    DeliveryHandoverSigned,
    WorkflowDocs,
}

impl StageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConcreteWorks => "concreteWorks",
            Self::TechnicalCompletion => "technicalCompletion",
            Self::DeliveryHandoverSigned => "deliveryHandover_signed",
            Self::WorkflowDocs => "workflowDocs",
        }
    }
}

impl FromStr for StageId {
    type Err = UnknownStageId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concreteWorks" => Ok(Self::ConcreteWorks),
            "technicalCompletion" => Ok(Self::TechnicalCompletion),
            "deliveryHandover_signed" => Ok(Self::DeliveryHandoverSigned),
            "workflowDocs" => Ok(Self::WorkflowDocs),
            other => Err(UnknownStageId(other.to_string())),
        }
    }
}

/// Error for an unrecognized stage id (maps to InvalidArgument upstream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStageId(pub String);

impl fmt::Display for UnknownStageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown stage id '{}'", self.0)
    }
}

impl std::error::Error for UnknownStageId {}

/// One checkpoint entry in a Project report's ordered stage list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageUpdate {
    /// Stage identifier, e.g. `concreteWorks`, `installationComplete`,
    /// `deliveryHandover`.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub files: Vec<StoredFile>,
}

/// A free-text exception recorded against a Project report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionEntry {
    pub comment: String,
    #[serde(default)]
    pub files: Vec<StoredFile>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Typed details payload of a Project report.
///
/// Unknown keys from older clients are preserved round-trip through
/// `extra` rather than dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    #[serde(default)]
    pub stage_updates: Vec<StageUpdate>,
    /// Report-level workflow documents (appended by the `workflowDocs`
    /// stage action).
    #[serde(default)]
    pub documents: Vec<StoredFile>,
    #[serde(default)]
    pub exceptions: Vec<ExceptionEntry>,
    /// Legacy field cleared when the project is technically completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_snag_list: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProjectDetails {
    pub fn stage(&self, id: &str) -> Option<&StageUpdate> {
        self.stage_updates.iter().find(|s| s.id == id)
    }

    pub fn stage_mut(&mut self, id: &str) -> Option<&mut StageUpdate> {
        self.stage_updates.iter_mut().find(|s| s.id == id)
    }
}

/// Type-tagged details payload. The tag mirrors [`ReportType`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportDetails {
    Maintenance(serde_json::Map<String, serde_json::Value>),
    Sales(serde_json::Map<String, serde_json::Value>),
    Project(ProjectDetails),
}

impl ReportDetails {
    pub fn report_type(&self) -> ReportType {
        match self {
            Self::Maintenance(_) => ReportType::Maintenance,
            Self::Sales(_) => ReportType::Sales,
            Self::Project(_) => ReportType::Project,
        }
    }

    pub fn as_project(&self) -> Option<&ProjectDetails> {
        match self {
            Self::Project(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_project_mut(&mut self) -> Option<&mut ProjectDetails> {
        match self {
            Self::Project(p) => Some(p),
            _ => None,
        }
    }
}

/// One entry in a report's modification history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationEntry {
    pub modified_by: String,
    pub modified_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// An employee report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub employee_id: String,
    pub branch_id: Option<String>,
    /// Assigned team — only meaningful for Project reports; pulls the
    /// team leader into notification fan-outs.
    pub team_id: Option<String>,
    pub report_type: ReportType,
    pub details: ReportDetails,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<serde_json::Value>,
    #[serde(default)]
    pub modifications: Vec<ModificationEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_status: Option<WorkflowStatus>,
    #[serde(default)]
    pub admin_notes: Vec<AdminNote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_id_parses_wire_forms() {
        assert_eq!(
            "concreteWorks".parse::<StageId>().unwrap(),
            StageId::ConcreteWorks
        );
        assert_eq!(
            "deliveryHandover_signed".parse::<StageId>().unwrap(),
            StageId::DeliveryHandoverSigned
        );
        assert!("unknown_stage".parse::<StageId>().is_err());
    }

    #[test]
    fn details_round_trip_preserves_unknown_keys() {
        let json = serde_json::json!({
            "type": "project",
            "stageUpdates": [{"id": "concreteWorks", "completed": false}],
            "siteAddress": "12 Harbor Rd"
        });
        let details: ReportDetails = serde_json::from_value(json).unwrap();
        let project = details.as_project().unwrap();
        assert_eq!(project.stage_updates.len(), 1);
        assert_eq!(
            project.extra.get("siteAddress").and_then(|v| v.as_str()),
            Some("12 Harbor Rd")
        );

        let back = serde_json::to_value(&details).unwrap();
        assert_eq!(back["type"], "project");
        assert_eq!(back["siteAddress"], "12 Harbor Rd");
    }

    #[test]
    fn maintenance_details_are_opaque() {
        let json = serde_json::json!({
            "type": "maintenance",
            "equipment": "chiller-3",
            "resolved": true
        });
        let details: ReportDetails = serde_json::from_value(json).unwrap();
        assert_eq!(details.report_type(), ReportType::Maintenance);
        assert!(details.as_project().is_none());
    }

    #[test]
    fn workflow_status_keeps_variant_names_on_the_wire() {
        let json = serde_json::to_string(&WorkflowStatus::ConcreteWorksDone).unwrap();
        assert_eq!(json, "\"ConcreteWorksDone\"");
    }
}
