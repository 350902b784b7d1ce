//! State owned by one import dialog.
//!
//! An `ImportSession` ties together the selected file and its validation
//! result, the upload progress, and the monitor for a queued backend task.
//! The host UI keeps one session per dialog, performs the actual I/O (file
//! reading, HTTP calls, timers) and reports results back through the methods
//! below.

use super::monitor::TaskMonitor;
use super::progress::UploadProgress;
use super::validator::{validate_text, ValidationOutcome};
use super::ImportError;
use crate::model::{ImportKind, ImportSchema};
use crate::requests::{UploadAck, UploadCsvRequest, UploadResponse};

/// One selected file and what the validator made of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadJob {
    pub file_name: String,
    pub file_size: usize,
    /// Normalized CSV to upload; `None` when validation failed.
    pub cleaned_payload: Option<String>,
    pub validation: ValidationOutcome,
}

/// How an upload attempt ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The backend imported the rows before answering.
    Completed(UploadAck),
    /// The backend queued the import; the monitor now tracks this task id.
    Queued(String),
    /// Transport failure. The user may retry the upload.
    Failed(String),
    /// No upload was running, e.g. the dialog was reset meanwhile.
    Ignored,
}

#[derive(Clone, Debug)]
pub struct ImportSession {
    kind: ImportKind,
    schema: ImportSchema,
    job: Option<UploadJob>,
    progress: UploadProgress,
    monitor: TaskMonitor,
    show_warnings: bool,
}

impl ImportSession {
    pub fn new(kind: ImportKind) -> Self {
        Self {
            kind,
            schema: kind.schema(),
            job: None,
            progress: UploadProgress::default(),
            monitor: TaskMonitor::new(),
            show_warnings: true,
        }
    }

    pub fn kind(&self) -> ImportKind {
        self.kind
    }

    pub fn schema(&self) -> &ImportSchema {
        &self.schema
    }

    pub fn job(&self) -> Option<&UploadJob> {
        self.job.as_ref()
    }

    pub fn progress(&self) -> &UploadProgress {
        &self.progress
    }

    pub fn monitor(&self) -> &TaskMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut TaskMonitor {
        &mut self.monitor
    }

    pub fn show_warnings(&self) -> bool {
        self.show_warnings
    }

    pub fn toggle_warnings(&mut self) {
        self.show_warnings = !self.show_warnings;
    }

    /// An upload is on the wire or a queued task is being processed.
    pub fn is_busy(&self) -> bool {
        self.progress.is_uploading() || self.monitor.is_processing()
    }

    pub fn can_upload(&self) -> bool {
        !self.is_busy()
            && self
                .job
                .as_ref()
                .is_some_and(|job| job.cleaned_payload.is_some())
    }

    /// Validates a freshly picked file and makes it the current job.
    pub fn select_file(
        &mut self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<&ValidationOutcome, ImportError> {
        if self.is_busy() {
            return Err(ImportError::Busy);
        }
        let validation = match std::str::from_utf8(bytes) {
            Ok(text) => {
                let text = text.strip_prefix('\u{feff}').unwrap_or(text);
                validate_text(text, &self.schema)
            }
            Err(err) => {
                log::warn!("{} is not valid UTF-8: {}", file_name, err);
                unreadable(file_name)
            }
        };
        log::info!(
            "{} import: {} selected, {} errors, {} warnings",
            self.kind,
            file_name,
            validation.errors.len(),
            validation.warnings.len()
        );
        Ok(self.replace_job(file_name, bytes.len(), validation))
    }

    /// Records a file the host could not read at all.
    pub fn read_failed(
        &mut self,
        file_name: &str,
        reason: &str,
    ) -> Result<&ValidationOutcome, ImportError> {
        if self.is_busy() {
            return Err(ImportError::Busy);
        }
        log::warn!("failed to read {}: {}", file_name, reason);
        Ok(self.replace_job(file_name, 0, unreadable(file_name)))
    }

    fn replace_job(
        &mut self,
        file_name: &str,
        file_size: usize,
        validation: ValidationOutcome,
    ) -> &ValidationOutcome {
        self.progress.reset();
        let job = UploadJob {
            file_name: file_name.to_string(),
            file_size,
            cleaned_payload: validation.cleaned_payload(),
            validation,
        };
        &self.job.insert(job).validation
    }

    /// Builds the upload request from the cleaned payload and marks the
    /// session as uploading.
    pub fn begin_upload(&mut self) -> Result<UploadCsvRequest, ImportError> {
        if self.is_busy() {
            return Err(ImportError::Busy);
        }
        let job = self.job.as_ref().ok_or(ImportError::NoFile)?;
        let payload = job
            .cleaned_payload
            .as_ref()
            .ok_or(ImportError::InvalidFile)?;
        let request = UploadCsvRequest {
            file_data: payload.clone(),
            file_name: job.file_name.clone(),
        };
        self.progress.start();
        Ok(request)
    }

    pub fn record_progress(&mut self, loaded: u64, total: u64) {
        self.progress.advance(loaded, total);
    }

    pub fn finish_upload(&mut self, result: Result<UploadResponse, String>) -> UploadOutcome {
        if !self.progress.is_uploading() {
            return UploadOutcome::Ignored;
        }
        match result {
            Err(message) => {
                log::warn!("{} upload failed: {}", self.kind, message);
                self.progress.fail(message.clone());
                UploadOutcome::Failed(message)
            }
            Ok(UploadResponse::Immediate(ack)) => {
                self.progress.complete();
                UploadOutcome::Completed(ack)
            }
            Ok(UploadResponse::Queued { task_id }) => {
                self.progress.complete();
                match self.monitor.start(task_id.clone()) {
                    Ok(()) => UploadOutcome::Queued(task_id),
                    Err(err) => {
                        let message = err.to_string();
                        self.progress.fail(message.clone());
                        UploadOutcome::Failed(message)
                    }
                }
            }
        }
    }

    /// Detaches from the running task. Returns its id so the host can offer
    /// to re-attach later.
    pub fn continue_in_background(&mut self) -> Option<String> {
        let task_id = self.monitor.task().map(|task| task.task_id.clone())?;
        self.monitor.continue_in_background().then_some(task_id)
    }

    /// Re-attaches this session to a task left running in the background.
    pub fn resume_task(&mut self, task_id: &str) -> Result<(), ImportError> {
        if self.progress.is_uploading() {
            return Err(ImportError::Busy);
        }
        self.monitor.resume(task_id)
    }

    /// Drops the file, the upload state and the task: back to `idle`.
    pub fn reset(&mut self) {
        self.job = None;
        self.progress.reset();
        self.monitor.reset();
        self.show_warnings = true;
    }
}

fn unreadable(file_name: &str) -> ValidationOutcome {
    ValidationOutcome::failure(format!(
        "Unable to read \"{}\". Make sure it is a UTF-8 encoded CSV file.",
        file_name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::monitor::{MonitorEvent, TaskStatus};
    use crate::jobs::TaskStatusResponse;

    const VALID: &str = "Product Name,Category Name,Variant Name,Price,SKU,Barcode,Department\n Widget ,Gadgets,Red,10,SKU1,123,Dept1\n";

    fn session_with_valid_file() -> ImportSession {
        let mut session = ImportSession::new(ImportKind::Products);
        session.select_file("products.csv", VALID.as_bytes()).unwrap();
        session
    }

    #[test]
    fn selecting_a_valid_file_prepares_the_cleaned_payload() {
        let session = session_with_valid_file();
        let job = session.job().unwrap();
        assert_eq!(job.file_name, "products.csv");
        assert_eq!(job.file_size, VALID.len());
        assert_eq!(
            job.cleaned_payload.as_deref(),
            Some("Product Name,Category Name,Variant Name,Price,SKU,Barcode,Department\nWidget,Gadgets,Red,10,SKU1,123,Dept1")
        );
        assert!(session.can_upload());
    }

    #[test]
    fn byte_order_mark_is_dropped() {
        let mut session = ImportSession::new(ImportKind::Products);
        let bytes = format!("\u{feff}{}", VALID);
        let outcome = session.select_file("bom.csv", bytes.as_bytes()).unwrap();
        assert!(outcome.is_valid(), "{:?}", outcome.errors);
    }

    #[test]
    fn undecodable_file_becomes_a_single_error() {
        let mut session = ImportSession::new(ImportKind::Stock);
        let outcome = session.select_file("stock.csv", &[0xff, 0xfe, 0x00, 0x41]).unwrap();
        assert_eq!(
            outcome.errors,
            ["Unable to read \"stock.csv\". Make sure it is a UTF-8 encoded CSV file."]
        );
        assert!(outcome.rows.is_empty());
        assert!(!session.can_upload());
        assert_eq!(session.begin_upload(), Err(ImportError::InvalidFile));
    }

    #[test]
    fn read_failure_replaces_the_previous_job() {
        let mut session = session_with_valid_file();
        let outcome = session.read_failed("other.csv", "NotReadableError").unwrap();
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(session.job().unwrap().file_name, "other.csv");
        assert!(!session.can_upload());
    }

    #[test]
    fn upload_without_a_file_is_refused() {
        let mut session = ImportSession::new(ImportKind::Products);
        assert_eq!(session.begin_upload(), Err(ImportError::NoFile));
    }

    #[test]
    fn immediate_response_completes_the_upload() {
        let mut session = session_with_valid_file();
        let request = session.begin_upload().unwrap();
        assert_eq!(request.file_name, "products.csv");
        assert!(session.progress().is_uploading());
        assert!(!session.can_upload());

        session.record_progress(40, 80);
        assert_eq!(session.progress().percent(), 50);

        let ack = UploadAck {
            message: "Imported 1 rows.".to_string(),
            rows_imported: 1,
        };
        let outcome = session.finish_upload(Ok(UploadResponse::Immediate(ack.clone())));
        assert_eq!(outcome, UploadOutcome::Completed(ack));
        assert_eq!(session.progress().percent(), 100);
        assert!(session.monitor().is_idle());
    }

    #[test]
    fn transport_failure_allows_a_manual_retry() {
        let mut session = session_with_valid_file();
        session.begin_upload().unwrap();
        let outcome = session.finish_upload(Err("Network error".to_string()));
        assert_eq!(outcome, UploadOutcome::Failed("Network error".to_string()));
        assert!(!session.progress().is_uploading());
        assert_eq!(session.progress().error(), Some("Network error"));
        assert!(session.can_upload());
        assert!(session.begin_upload().is_ok());
        assert_eq!(session.progress().error(), None);
    }

    #[test]
    fn queued_response_starts_the_monitor() {
        let mut session = session_with_valid_file();
        session.begin_upload().unwrap();
        let outcome = session.finish_upload(Ok(UploadResponse::Queued {
            task_id: "t-1".to_string(),
        }));
        assert_eq!(outcome, UploadOutcome::Queued("t-1".to_string()));
        assert!(session.monitor().is_polling());
        assert!(session.is_busy());
        assert_eq!(session.select_file("again.csv", VALID.as_bytes()), Err(ImportError::Busy));
    }

    #[test]
    fn background_then_resume() {
        let mut session = session_with_valid_file();
        session.begin_upload().unwrap();
        session.finish_upload(Ok(UploadResponse::Queued {
            task_id: "t-1".to_string(),
        }));

        assert_eq!(session.continue_in_background().as_deref(), Some("t-1"));
        assert!(session.monitor_mut().begin_poll().is_none());

        let mut reopened = ImportSession::new(ImportKind::Products);
        reopened.resume_task("t-1").unwrap();
        let task_id = reopened.monitor_mut().begin_poll().unwrap();
        assert_eq!(task_id, "t-1");
        let event = reopened
            .monitor_mut()
            .apply(Ok(TaskStatusResponse::complete("Imported 1 rows.")));
        assert!(matches!(event, MonitorEvent::Completed { .. }));
        assert_eq!(reopened.monitor().status(), Some(TaskStatus::Complete));
    }

    #[test]
    fn background_without_a_task_does_nothing() {
        let mut session = session_with_valid_file();
        assert_eq!(session.continue_in_background(), None);
    }

    #[test]
    fn late_upload_answer_after_reset_is_ignored() {
        let mut session = session_with_valid_file();
        session.begin_upload().unwrap();
        session.reset();
        assert!(session.job().is_none());
        assert_eq!(
            session.finish_upload(Err("aborted".to_string())),
            UploadOutcome::Ignored
        );
        assert!(session.progress().error().is_none());
    }

    #[test]
    fn warnings_can_be_hidden_and_reset_shows_them_again() {
        let mut session = session_with_valid_file();
        assert!(session.show_warnings());
        session.toggle_warnings();
        assert!(!session.show_warnings());
        session.reset();
        assert!(session.show_warnings());
    }
}
