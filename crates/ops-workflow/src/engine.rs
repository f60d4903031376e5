// engine.rs — The package-request state machine.
//
// Transitions are an explicit table over `PackageAction`. Note what the
// table does NOT do: it does not validate the current status before
// applying an action. That matches the reference behavior this service
// replaces — `confirm-delivery` on a brand-new request overwrites status
// and progress all the same. Adding guards is an open product question
// (see DESIGN.md); the table makes it a one-line check per action if the
// owner ever wants it.

use chrono::Utc;
use ops_model::{
    AttachmentKind, PackageAttachment, PackageLogEntry, PackageRequest, PackageStatus,
    PackageView, Priority, User,
};
use ops_store::{PackageUpdate, Store};
use uuid::Uuid;

use ops_media::{upload_all, MediaStore, UploadPayload};

use crate::error::WorkflowError;

/// Named actions a caller can apply to a package request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageAction {
    ConfirmPayment,
    Start,
    MarkReady,
    ConfirmDelivery,
}

impl PackageAction {
    /// Status written by this action.
    pub fn status(&self) -> PackageStatus {
        match self {
            Self::ConfirmPayment => PackageStatus::PaymentConfirmed,
            Self::Start => PackageStatus::Processing,
            Self::MarkReady => PackageStatus::ReadyForDelivery,
            Self::ConfirmDelivery => PackageStatus::Delivered,
        }
    }

    /// Progress percent written together with the status.
    pub fn progress(&self) -> u8 {
        match self {
            Self::ConfirmPayment => 20,
            Self::Start => 50,
            Self::MarkReady => 75,
            Self::ConfirmDelivery => 100,
        }
    }

    /// Which evidence slot this action's uploads land in, if any.
    pub fn file_slot(&self) -> Option<AttachmentKind> {
        match self {
            Self::ConfirmPayment => Some(AttachmentKind::PaymentProof),
            Self::MarkReady => Some(AttachmentKind::ShippingDoc),
            Self::Start | Self::ConfirmDelivery => None,
        }
    }

    /// Action kind recorded in the audit log.
    pub fn audit_kind(&self) -> &'static str {
        match self {
            Self::ConfirmPayment => "payment_confirmed",
            Self::Start => "processing_started",
            Self::MarkReady => "marked_ready",
            Self::ConfirmDelivery => "delivery_confirmed",
        }
    }
}

/// Parameters for creating a package request.
#[derive(Debug, Clone)]
pub struct CreatePackage {
    pub employee_id: String,
    pub title: String,
    pub description: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub priority: Priority,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Payment already received at filing time. Documented special case:
    /// true starts the request at PaymentConfirmed/10 instead of New/0.
    pub is_paid: bool,
}

/// The workflow engine: owns every state-changing path for package
/// requests and delegates file persistence to the media store.
#[derive(Clone)]
pub struct WorkflowEngine {
    store: Store,
    media: std::sync::Arc<dyn MediaStore>,
}

impl WorkflowEngine {
    pub fn new(store: Store, media: std::sync::Arc<dyn MediaStore>) -> Self {
        Self { store, media }
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    pub(crate) fn media(&self) -> &dyn MediaStore {
        self.media.as_ref()
    }

    /// Resolve the acting user from a username, 404 if absent.
    pub(crate) fn resolve_actor(&self, username: &str) -> Result<User, WorkflowError> {
        self.store
            .find_user_by_username(username)?
            .ok_or_else(|| WorkflowError::UserNotFound(username.to_string()))
    }

    /// Create a request. Initial state depends on the `is_paid` flag.
    pub fn create_package(&self, params: CreatePackage) -> Result<PackageView, WorkflowError> {
        let (status, progress) = if params.is_paid {
            (PackageStatus::PaymentConfirmed, 10)
        } else {
            (PackageStatus::New, 0)
        };
        let now = Utc::now();
        let request = PackageRequest {
            id: format!("PKG-{}", Uuid::new_v4().simple()),
            employee_id: params.employee_id,
            title: params.title,
            description: params.description,
            customer_name: params.customer_name,
            customer_phone: params.customer_phone,
            priority: params.priority,
            status,
            progress,
            metadata: params.metadata,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_package(&request)?;
        tracing::info!(request_id = %request.id, status = status.as_str(), "package request created");
        Ok(self.store.get_package_view(&request.id)?)
    }

    /// Apply a named transition: upload evidence, persist attachments,
    /// write status/progress, append the audit entry — then return the
    /// refreshed joined view.
    pub async fn apply_action(
        &self,
        request_id: &str,
        action: PackageAction,
        actor_username: &str,
        comment: Option<String>,
        files: Vec<UploadPayload>,
    ) -> Result<PackageView, WorkflowError> {
        let actor = self.resolve_actor(actor_username)?;
        // Existence check up front so a bad id fails before any upload.
        self.store.get_package(request_id)?;

        let attachments = match action.file_slot() {
            Some(kind) if !files.is_empty() => {
                let folder = format!("packages/{request_id}/{}", actor.id);
                let stored = upload_all(self.media(), &folder, &files).await?;
                let now = Utc::now();
                stored
                    .into_iter()
                    .zip(&files)
                    .map(|(file, payload)| PackageAttachment {
                        id: Uuid::new_v4(),
                        request_id: request_id.to_string(),
                        kind,
                        file,
                        file_name: payload.name.clone(),
                        uploaded_by: actor.id.clone(),
                        uploaded_at: now,
                    })
                    .collect()
            }
            _ => Vec::new(),
        };

        let log = PackageLogEntry {
            id: Uuid::new_v4(),
            request_id: request_id.to_string(),
            action: action.audit_kind().to_string(),
            comment,
            actor_id: actor.id.clone(),
            created_at: Utc::now(),
        };
        self.store.apply_package_transition(
            request_id,
            action.status(),
            action.progress(),
            &attachments,
            &log,
        )?;

        tracing::info!(
            request_id,
            action = action.audit_kind(),
            actor = %actor.id,
            attachments = attachments.len(),
            "package transition applied"
        );
        Ok(self.store.get_package_view(request_id)?)
    }

    /// Apply a field patch; empty patches are InvalidArgument.
    pub fn update_package(
        &self,
        request_id: &str,
        update: PackageUpdate,
    ) -> Result<PackageView, WorkflowError> {
        if update.is_empty() {
            return Err(WorkflowError::EmptyUpdate);
        }
        self.store.update_package(request_id, &update)?;
        Ok(self.store.get_package_view(request_id)?)
    }

    /// Delete a request; attachments and logs cascade away with it.
    pub fn delete_package(&self, request_id: &str) -> Result<(), WorkflowError> {
        self.store.delete_package(request_id)?;
        tracing::info!(request_id, "package request deleted");
        Ok(())
    }
}
