// stages.rs — Project-report stage confirmations and the exception log.
//
// Unlike the package table, project stages have no uniform shape: each
// stage id selects its own mutation over the typed Project details. The
// dispatch is a closed enum match — an id we don't recognize is the
// caller's error (InvalidArgument), and the report is left untouched.

use chrono::Utc;
use ops_model::{
    ExceptionEntry, ModificationEntry, ProjectDetails, Report, StageId, StageUpdate, StoredFile,
    WorkflowStatus,
};

use ops_media::{upload_all, UploadPayload};

use crate::engine::WorkflowEngine;
use crate::error::WorkflowError;

/// Stage entry id mutated by `technicalCompletion`.
const INSTALLATION_STAGE: &str = "installationComplete";
/// Stage entry id mutated by `deliveryHandover_signed`.
const HANDOVER_STAGE: &str = "deliveryHandover";

impl WorkflowEngine {
    /// Confirm a project stage: dispatch on the submitted stage id,
    /// mutate the details payload, and possibly advance the report's
    /// workflow status.
    pub async fn confirm_stage(
        &self,
        report_id: &str,
        stage_id: &str,
        comment: Option<String>,
        actor_username: &str,
        files: Vec<UploadPayload>,
    ) -> Result<Report, WorkflowError> {
        let stage: StageId = stage_id
            .parse()
            .map_err(|_| WorkflowError::UnknownStage(stage_id.to_string()))?;
        let actor = self.resolve_actor(actor_username)?;

        // Existence and type checks before any upload happens.
        let report = self.store().get_report(report_id)?;
        if report.details.as_project().is_none() {
            return Err(WorkflowError::NotProjectReport(report_id.to_string()));
        }

        let stored = if files.is_empty() {
            Vec::new()
        } else {
            let folder = format!("reports/{report_id}/{}", actor.id);
            upload_all(self.media(), &folder, &files).await?
        };

        let updated = self
            .store()
            .with_report_for_update(report_id, |report| -> Result<Report, WorkflowError> {
                let details = report
                    .details
                    .as_project_mut()
                    .ok_or_else(|| WorkflowError::NotProjectReport(report_id.to_string()))?;

                match stage {
                    StageId::ConcreteWorks => {
                        complete_stage(details, "concreteWorks", comment.clone(), None);
                        report.workflow_status = Some(WorkflowStatus::ConcreteWorksDone);
                    }
                    StageId::TechnicalCompletion => {
                        complete_stage(
                            details,
                            INSTALLATION_STAGE,
                            comment.clone(),
                            Some(stored.clone()),
                        );
                        details.pending_snag_list = None;
                        report.workflow_status = Some(WorkflowStatus::TechnicallyCompleted);
                    }
                    StageId::DeliveryHandoverSigned => {
                        if let Some(signed) = stored.first().cloned() {
                            attach_signed_handover(details, signed);
                        }
                    }
                    StageId::WorkflowDocs => {
                        details.documents.extend(stored.clone());
                    }
                }
                Ok(report.clone())
            })?;

        tracing::info!(
            report_id,
            stage = stage.as_str(),
            actor = %actor.id,
            files = stored.len(),
            "project stage confirmed"
        );
        Ok(updated)
    }

    /// Append a free-text exception (plus evidence files) to a Project
    /// report. Does not change report status or workflow status.
    pub async fn add_exception(
        &self,
        report_id: &str,
        comment: String,
        actor_username: &str,
        files: Vec<UploadPayload>,
    ) -> Result<Report, WorkflowError> {
        let actor = self.resolve_actor(actor_username)?;

        let report = self.store().get_report(report_id)?;
        if report.details.as_project().is_none() {
            return Err(WorkflowError::NotProjectReport(report_id.to_string()));
        }

        let stored = if files.is_empty() {
            Vec::new()
        } else {
            let folder = format!("reports/{report_id}/{}", actor.id);
            upload_all(self.media(), &folder, &files).await?
        };

        let entry = ExceptionEntry {
            comment,
            files: stored,
            created_by: actor.id.clone(),
            created_at: Utc::now(),
        };
        self.store()
            .with_report_for_update(report_id, move |report| -> Result<Report, WorkflowError> {
                let details = report
                    .details
                    .as_project_mut()
                    .ok_or_else(|| WorkflowError::NotProjectReport(report_id.to_string()))?;
                details.exceptions.push(entry);
                Ok(report.clone())
            })
    }

    /// Store or replace the report's evaluation payload.
    pub fn set_evaluation(
        &self,
        report_id: &str,
        evaluation: serde_json::Value,
    ) -> Result<Report, WorkflowError> {
        self.store()
            .with_report_for_update(report_id, move |report| -> Result<Report, WorkflowError> {
                report.evaluation = Some(evaluation);
                Ok(report.clone())
            })
    }

    /// Apply a status change and/or annotation to a report, recording the
    /// actor in the modification history.
    pub fn update_report(
        &self,
        report_id: &str,
        actor_id: &str,
        status: Option<String>,
        note: Option<String>,
    ) -> Result<Report, WorkflowError> {
        if status.is_none() && note.is_none() {
            return Err(WorkflowError::EmptyUpdate);
        }
        let actor_id = actor_id.to_string();
        self.store()
            .with_report_for_update(report_id, move |report| -> Result<Report, WorkflowError> {
                if let Some(status) = status {
                    report.status = status;
                }
                report.modifications.push(ModificationEntry {
                    modified_by: actor_id,
                    modified_at: Utc::now(),
                    note,
                });
                Ok(report.clone())
            })
    }
}

/// Mark a stage entry complete (creating it if the report predates the
/// stage list), optionally overwriting its file set.
fn complete_stage(
    details: &mut ProjectDetails,
    stage_entry_id: &str,
    comment: Option<String>,
    files: Option<Vec<StoredFile>>,
) {
    let now = Utc::now();
    match details.stage_mut(stage_entry_id) {
        Some(entry) => {
            entry.completed = true;
            entry.completed_at = Some(now);
            if comment.is_some() {
                entry.comment = comment;
            }
            if let Some(files) = files {
                entry.files = files;
            }
        }
        None => details.stage_updates.push(StageUpdate {
            id: stage_entry_id.to_string(),
            name: None,
            completed: true,
            completed_at: Some(now),
            comment,
            files: files.unwrap_or_default(),
        }),
    }
}

/// Place the signed handover copy at slot 1, next to the original scan.
/// With fewer than two existing files the copy is appended instead of
/// leaving a hole.
fn attach_signed_handover(details: &mut ProjectDetails, signed: StoredFile) {
    match details.stage_mut(HANDOVER_STAGE) {
        Some(entry) => {
            if entry.files.len() >= 2 {
                entry.files[1] = signed;
            } else {
                entry.files.push(signed);
            }
        }
        None => details.stage_updates.push(StageUpdate {
            id: HANDOVER_STAGE.to_string(),
            name: None,
            completed: false,
            completed_at: None,
            comment: None,
            files: vec![signed],
        }),
    }
}
