//! # ops-model
//!
//! Domain data model for the operations-tracking backend.
//!
//! Everything here is plain data: serde-derived structs and enums shared by
//! the store, the workflow engine, the discussion threads, and the HTTP
//! layer. No I/O, no business rules — those live in the crates that own
//! them.
//!
//! The one structurally interesting type is [`ReportDetails`]: a type-tagged
//! union over the three report families. Maintenance and Sales payloads are
//! carried opaquely; the Project payload is fully typed because the workflow
//! engine mutates its stage entries.

pub mod file;
pub mod note;
pub mod notification;
pub mod package;
pub mod report;
pub mod user;

pub use file::StoredFile;
pub use note::{AdminNote, Reply};
pub use notification::{DeviceToken, Notification};
pub use package::{
    AttachmentKind, PackageAttachment, PackageLogEntry, PackageRequest, PackageStatus, PackageView,
    Priority,
};
pub use report::{
    ExceptionEntry, ModificationEntry, ProjectDetails, Report, ReportDetails, ReportType, StageId,
    StageUpdate, WorkflowStatus,
};
pub use user::{Branch, ImportExportKind, ImportExportRequest, Role, Team, User};
