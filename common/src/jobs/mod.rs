use serde::{Deserialize, Serialize};

/// Status reported by the backend for a queued CSV import.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvUploadStatus {
    Processing,
    Complete,
    Failed,
}

/// Body of `GET /api/imports/status/{task_id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub csv_upload_status: CsvUploadStatus,
    #[serde(default)]
    pub message: String,
}

impl TaskStatusResponse {
    pub fn processing(message: impl Into<String>) -> Self {
        Self {
            csv_upload_status: CsvUploadStatus::Processing,
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            csv_upload_status: CsvUploadStatus::Complete,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            csv_upload_status: CsvUploadStatus::Failed,
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.csv_upload_status != CsvUploadStatus::Processing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&TaskStatusResponse::failed("bad row 4")).unwrap();
        assert_eq!(json, r#"{"csv_upload_status":"failed","message":"bad row 4"}"#);
    }

    #[test]
    fn missing_message_defaults_to_empty() {
        let status: TaskStatusResponse =
            serde_json::from_str(r#"{"csv_upload_status":"complete"}"#).unwrap();
        assert_eq!(status.csv_upload_status, CsvUploadStatus::Complete);
        assert!(status.message.is_empty());
        assert!(status.is_terminal());
    }
}
