//! Shared model and import pipeline used by both the actix backend and the
//! yew frontend.
//!
//! - `model`: import kinds and their schemas.
//! - `import`: row parser, schema validator, upload session and task monitor.
//! - `jobs`: task status payloads exchanged by the status endpoint.
//! - `requests`: upload request/response payloads.

pub mod import;
pub mod jobs;
pub mod model;
pub mod requests;
