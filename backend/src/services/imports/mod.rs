//! CSV import API.
//!
//! Routes, all under `/api/imports`:
//! - `POST /{kind}/upload`: body `{ "fileData": ..., "fileName": ... }` with
//!   the cleaned CSV text. The file is validated again with the same schema
//!   the browser used. Small files are stored before answering with
//!   `{ "message", "rows_imported" }`; larger ones are handed to a background
//!   job and the answer is `{ "task_id" }`.
//! - `GET /status/{task_id}`: latest `TaskStatusResponse` of a background
//!   import, `404` for unknown ids.
//! - `GET /{kind}/template`: downloadable CSV with the expected headers and
//!   one example row.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod get_status;
pub mod store;
mod template;
mod upload;

const API_PATH: &str = "/api/imports";

/// Configures and returns the Actix scope for import routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/status/{task_id}", get().to(get_status::process))
        .route("/{kind}/upload", post().to(upload::process))
        .route("/{kind}/template", get().to(template::process))
}
