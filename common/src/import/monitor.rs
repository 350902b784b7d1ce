//! State machine for observing a queued import on the backend.
//!
//! `idle -> processing -> complete | failed | error`
//!
//! The monitor does no I/O and owns no timer. Its owner calls `begin_poll`
//! on every tick of whatever scheduler it uses (an interval in the browser, a
//! loop in tests), sends the status request for the returned task id, and
//! feeds the answer back through `apply`. `begin_poll` hands out at most one
//! request at a time, so a tick that lands while a request is still in flight
//! is skipped instead of stacking a second request.
//!
//! `failed` means the backend reported the job as failed. `error` means the
//! status check itself could not be completed. Neither cancels anything on
//! the backend; there is no cancellation endpoint.

use super::ImportError;
use crate::jobs::{CsvUploadStatus, TaskStatusResponse};
use std::time::Duration;

/// Spacing between status checks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

pub const FAILED_FALLBACK_MESSAGE: &str = "The import failed.";
const PROCESSING_MESSAGE: &str = "Processing import...";
const COMPLETE_MESSAGE: &str = "Import complete.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Processing,
    Complete,
    Failed,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        self != TaskStatus::Processing
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsyncTask {
    pub task_id: String,
    pub status: TaskStatus,
    pub message: String,
}

/// What the owner should do once a task completes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionAction {
    /// Navigate to the given location.
    Redirect(String),
    /// The user moved on; only raise a notification.
    Notify,
    /// Show success and let the dialog close.
    Close,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MonitorEvent {
    Progress(String),
    Completed {
        message: String,
        action: CompletionAction,
    },
    Failed(String),
    Errored(String),
    /// The answer arrived after the monitor stopped observing the task.
    Ignored,
}

#[derive(Clone, Debug, Default)]
pub struct TaskMonitor {
    task: Option<AsyncTask>,
    redirect_to: Option<String>,
    background: bool,
    detached: bool,
    in_flight: bool,
}

impl TaskMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Location to navigate to when a task completes in the foreground.
    pub fn set_redirect(&mut self, redirect_to: Option<String>) {
        self.redirect_to = redirect_to;
    }

    pub fn task(&self) -> Option<&AsyncTask> {
        self.task.as_ref()
    }

    pub fn status(&self) -> Option<TaskStatus> {
        self.task.as_ref().map(|task| task.status)
    }

    pub fn is_idle(&self) -> bool {
        self.task.is_none()
    }

    pub fn is_processing(&self) -> bool {
        self.status() == Some(TaskStatus::Processing)
    }

    pub fn is_background(&self) -> bool {
        self.background
    }

    /// True while this instance should keep issuing status checks.
    pub fn is_polling(&self) -> bool {
        self.is_processing() && !self.detached
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Enters `processing` for a task the backend just accepted.
    pub fn start(&mut self, task_id: impl Into<String>) -> Result<(), ImportError> {
        self.enter_processing(task_id.into(), false)
    }

    /// Re-attaches to a task that was left running in the background.
    /// Completion is reported as `CompletionAction::Notify`.
    pub fn resume(&mut self, task_id: impl Into<String>) -> Result<(), ImportError> {
        self.enter_processing(task_id.into(), true)
    }

    fn enter_processing(&mut self, task_id: String, background: bool) -> Result<(), ImportError> {
        if let Some(task) = self.task.as_ref().filter(|t| t.status == TaskStatus::Processing) {
            return Err(ImportError::AlreadyProcessing(task.task_id.clone()));
        }
        log::debug!("watching import task {}", task_id);
        self.task = Some(AsyncTask {
            task_id,
            status: TaskStatus::Processing,
            message: PROCESSING_MESSAGE.to_string(),
        });
        self.background = background;
        self.detached = false;
        self.in_flight = false;
        Ok(())
    }

    /// Returns the task id to check now, or `None` when no request should be
    /// sent: not processing, detached, or a previous request is still pending.
    pub fn begin_poll(&mut self) -> Option<String> {
        if !self.is_polling() || self.in_flight {
            return None;
        }
        self.in_flight = true;
        self.task.as_ref().map(|task| task.task_id.clone())
    }

    /// Consumes the answer to the request handed out by `begin_poll`.
    pub fn apply(&mut self, result: Result<TaskStatusResponse, String>) -> MonitorEvent {
        self.in_flight = false;
        if self.detached {
            return MonitorEvent::Ignored;
        }
        let background = self.background;
        let redirect_to = self.redirect_to.clone();
        let Some(task) = self
            .task
            .as_mut()
            .filter(|t| t.status == TaskStatus::Processing)
        else {
            return MonitorEvent::Ignored;
        };

        match result {
            Ok(response) => match response.csv_upload_status {
                CsvUploadStatus::Processing => {
                    if !response.message.is_empty() {
                        task.message = response.message;
                    }
                    MonitorEvent::Progress(task.message.clone())
                }
                CsvUploadStatus::Complete => {
                    task.status = TaskStatus::Complete;
                    task.message = non_empty_or(response.message, COMPLETE_MESSAGE);
                    let action = match redirect_to {
                        _ if background => CompletionAction::Notify,
                        Some(url) => CompletionAction::Redirect(url),
                        None => CompletionAction::Close,
                    };
                    log::info!("import task {} complete", task.task_id);
                    MonitorEvent::Completed {
                        message: task.message.clone(),
                        action,
                    }
                }
                CsvUploadStatus::Failed => {
                    task.status = TaskStatus::Failed;
                    task.message = non_empty_or(response.message, FAILED_FALLBACK_MESSAGE);
                    log::warn!("import task {} failed: {}", task.task_id, task.message);
                    MonitorEvent::Failed(task.message.clone())
                }
            },
            Err(reason) => {
                task.status = TaskStatus::Error;
                task.message = format!("Could not check the import status: {}", reason);
                log::warn!("status check for task {} failed: {}", task.task_id, reason);
                MonitorEvent::Errored(task.message.clone())
            }
        }
    }

    /// Stops observing a processing task without touching the backend job.
    /// Returns false when there was nothing to detach from.
    pub fn continue_in_background(&mut self) -> bool {
        if !self.is_processing() {
            return false;
        }
        self.background = true;
        self.detached = true;
        self.in_flight = false;
        true
    }

    /// Back to `idle`. The redirect target is kept.
    pub fn reset(&mut self) {
        *self = Self {
            redirect_to: self.redirect_to.take(),
            ..Self::default()
        };
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
