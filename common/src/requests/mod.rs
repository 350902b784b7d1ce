use serde::{Deserialize, Serialize};

/// Request payload for `POST /api/imports/{kind}/upload`.
///
/// `file_data` carries the cleaned CSV text produced by the validator, not the
/// raw bytes the user picked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCsvRequest {
    pub file_data: String,
    pub file_name: String,
}

/// Acknowledgement for an import the backend finished inline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAck {
    pub message: String,
    #[serde(default)]
    pub rows_imported: usize,
}

/// The two shapes the upload endpoint answers with.
///
/// `Queued` is listed first so that a body carrying a `task_id` is never
/// mistaken for an acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Queued { task_id: String },
    Immediate(UploadAck),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_fields() {
        let request = UploadCsvRequest {
            file_data: "a,b".to_string(),
            file_name: "products.csv".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["fileData"], "a,b");
        assert_eq!(json["fileName"], "products.csv");
    }

    #[test]
    fn task_id_body_is_queued() {
        let response: UploadResponse = serde_json::from_str(r#"{"task_id":"abc"}"#).unwrap();
        assert_eq!(
            response,
            UploadResponse::Queued {
                task_id: "abc".to_string()
            }
        );
    }

    #[test]
    fn message_body_is_immediate() {
        let response: UploadResponse =
            serde_json::from_str(r#"{"message":"Imported 2 rows.","rows_imported":2}"#).unwrap();
        match response {
            UploadResponse::Immediate(ack) => assert_eq!(ack.rows_imported, 2),
            other => panic!("unexpected response {:?}", other),
        }
    }
}
