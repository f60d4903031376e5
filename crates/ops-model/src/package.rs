// package.rs — Package/shipment requests, their attachments, and audit log.
//
// A PackageRequest moves through a fixed sequence of business states
// (see `ops-workflow`); every state change appends an immutable
// PackageLogEntry and may attach evidentiary files. Attachments and log
// entries never outlive their parent request — the store cascades deletes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::file::StoredFile;

/// Lifecycle state of a package request.
///
/// Normal flow: `New → PaymentConfirmed → Processing → ReadyForDelivery →
/// Delivered`. The engine does not guard transitions against the current
/// state (reference behavior — see DESIGN notes), so the enum is ordering
/// only by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    New,
    PaymentConfirmed,
    Processing,
    ReadyForDelivery,
    Delivered,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::PaymentConfirmed => "payment_confirmed",
            Self::Processing => "processing",
            Self::ReadyForDelivery => "ready_for_delivery",
            Self::Delivered => "delivered",
        }
    }
}

/// Handling priority assigned by the requesting employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Which evidence slot an attachment fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    PaymentProof,
    ShippingDoc,
}

impl AttachmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentProof => "payment_proof",
            Self::ShippingDoc => "shipping_doc",
        }
    }
}

/// A package/shipment request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRequest {
    /// Opaque string token, e.g. `PKG-5f2c…`. Assigned at creation, never
    /// reused.
    pub id: String,
    pub employee_id: String,
    pub title: String,
    pub description: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub priority: Priority,
    pub status: PackageStatus,
    /// 0–100; written together with `status`, never independently.
    pub progress: u8,
    /// Opaque key-value metadata supplied by the caller.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An evidentiary file attached to a package request by a workflow
/// transition. Never mutated; removed only by parent cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageAttachment {
    pub id: Uuid,
    pub request_id: String,
    pub kind: AttachmentKind,
    pub file: StoredFile,
    pub file_name: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

/// One append-only audit entry on a package request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageLogEntry {
    pub id: Uuid,
    pub request_id: String,
    /// Action kind, e.g. `payment_confirmed`, `marked_ready`.
    pub action: String,
    pub comment: Option<String>,
    pub actor_id: String,
    pub created_at: DateTime<Utc>,
}

/// A package request joined with display fields for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageView {
    #[serde(flatten)]
    pub request: PackageRequest,
    pub employee_name: Option<String>,
    pub branch_name: Option<String>,
    pub attachments: Vec<PackageAttachment>,
    pub logs: Vec<PackageLogEntry>,
}
