// user.rs — Users, branches, teams, and import/export requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::ReportType;

/// Role a user holds within the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Employee,
    TeamLead,
    BranchManager,
    HrManager,
}

/// A backend user account.
///
/// `credential` is the stored password: either a format-prefixed salted
/// hash (`sha256$…`) or, for accounts predating the hashing rollout, the
/// legacy plaintext value. See `ops-credentials` for the migration path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub branch_id: Option<String>,
    /// Capability flag: may file import requests.
    pub can_import: bool,
    /// Capability flag: may file export requests.
    pub can_export: bool,
    /// Stored credential — never serialized into API responses.
    #[serde(skip_serializing)]
    pub credential: String,
    /// Which report families this user may file.
    #[serde(default)]
    pub allowed_report_types: Vec<ReportType>,
}

/// An office branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
}

/// A project team; the leader is pulled into report notification fan-outs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub leader_id: String,
}

/// Direction of an import/export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportExportKind {
    Import,
    Export,
}

/// A customs import/export request filed by an employee.
///
/// Creation is guarded by the matching capability flag on the user
/// (`can_import` / `can_export`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportExportRequest {
    pub id: Uuid,
    pub employee_id: String,
    pub kind: ImportExportKind,
    /// Free-form line items (goods descriptions, quantities, values).
    pub items: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
