//! # CSV Upload Service
//!
//! `POST /api/imports/{kind}/upload`
//!
//! 1.  **Checks**: the import kind must exist and the file name must end with
//!     `.csv`. The payload is validated with `common::import::validate_text`
//!     against the kind's schema; the browser already did this, but the
//!     server does not rely on it.
//!
//! 2.  **Inline import**: when the file has at most `sync_row_limit` data
//!     rows, the rows are stored on the blocking pool and the client gets an
//!     `UploadResponse::Immediate` acknowledgement.
//!
//! 3.  **Background import**: otherwise a job is registered in `JobsState`
//!     and its id returned at once as `UploadResponse::Queued`. A Tokio task
//!     runs `import_blocking` through `spawn_blocking` and reports progress
//!     after each stored chunk as `JobUpdate`s; the final status travels the
//!     same channel so it can never be overtaken by a progress update.

use super::store;
use crate::config::AppConfig;
use crate::job_controller::state::{JobUpdate, JobsState};
use actix_web::{web, HttpResponse, Responder};
use common::import::{validate_text, ParsedTable};
use common::jobs::TaskStatusResponse;
use common::model::ImportKind;
use common::requests::{UploadAck, UploadCsvRequest, UploadResponse};
use log::{error, info};
use std::path::{Path, PathBuf};

/// Why an upload was turned down.
#[derive(Debug)]
enum UploadError {
    /// The request itself is wrong; the client has to fix the file.
    Rejected(String),
    /// Storing the rows failed.
    Storage(String),
}

pub(crate) async fn process(
    kind: web::Path<String>,
    state: web::Data<JobsState>,
    config: web::Data<AppConfig>,
    payload: web::Json<UploadCsvRequest>,
) -> impl Responder {
    let kind = match kind.parse::<ImportKind>() {
        Ok(kind) => kind,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };

    match upload_csv(kind, payload.into_inner(), &state, &config).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(UploadError::Rejected(msg)) => HttpResponse::BadRequest().body(msg),
        Err(UploadError::Storage(msg)) => HttpResponse::InternalServerError().body(msg),
    }
}

async fn upload_csv(
    kind: ImportKind,
    request: UploadCsvRequest,
    state: &JobsState,
    config: &AppConfig,
) -> Result<UploadResponse, UploadError> {
    if !request.file_name.to_ascii_lowercase().ends_with(".csv") {
        return Err(UploadError::Rejected("The file must end with .csv".to_string()));
    }

    let outcome = validate_text(&request.file_data, &kind.schema());
    if !outcome.is_valid() {
        return Err(UploadError::Rejected(outcome.errors.join("\n")));
    }

    let data_rows = outcome.data_row_count();
    let table = outcome.rows;
    info!(
        "{} upload {}: {} data rows",
        kind, request.file_name, data_rows
    );

    if data_rows <= config.sync_row_limit {
        let db_path = config.database_path.clone();
        let batch_id = uuid::Uuid::new_v4().to_string();
        let imported = web::block(move || {
            import_blocking(&db_path, &batch_id, kind, &table, |_, _| {})
        })
        .await
        .map_err(|e| UploadError::Storage(e.to_string()))?
        .map_err(UploadError::Storage)?;
        return Ok(UploadResponse::Immediate(UploadAck {
            message: format!("Imported {} rows.", imported),
            rows_imported: imported,
        }));
    }

    let task_id = schedule_import_job(state, config.database_path.clone(), kind, table).await;
    Ok(UploadResponse::Queued { task_id })
}

/// Registers a background import and returns its id immediately.
async fn schedule_import_job(
    state: &JobsState,
    db_path: PathBuf,
    kind: ImportKind,
    table: ParsedTable,
) -> String {
    let job_id = state.register().await;
    let tx = state.tx.clone();
    let job_id_clone = job_id.clone();

    tokio::spawn(async move {
        let tx_block = tx.clone();
        let job_id_for_blocking = job_id_clone.clone();

        let handle = tokio::task::spawn_blocking(move || {
            import_blocking(&db_path, &job_id_for_blocking, kind, &table, |done, total| {
                let _ = tx_block.blocking_send(JobUpdate {
                    job_id: job_id_for_blocking.clone(),
                    status: TaskStatusResponse::processing(format!(
                        "Imported {} of {} rows",
                        done, total
                    )),
                });
            })
        });

        let status = match handle.await {
            Ok(Ok(total)) => TaskStatusResponse::complete(format!("Imported {} rows.", total)),
            Ok(Err(e)) => {
                error!("import job {} failed: {}", job_id_clone, e);
                TaskStatusResponse::failed(e)
            }
            Err(join_err) => TaskStatusResponse::failed(format!("Task join error: {}", join_err)),
        };

        let update = JobUpdate {
            job_id: job_id_clone,
            status,
        };
        if let Err(e) = tx.send(update).await {
            error!(
                "final status of import job {} was lost: {}",
                e.0.job_id, e
            );
        }
    });

    job_id
}

/// Stores the data rows of `table` in chunks of `ROWS_PER_TRANSACTION`,
/// calling `on_progress(stored, total)` after each chunk. The batch id is
/// the job id for background imports.
fn import_blocking<F>(
    db_path: &Path,
    batch_id: &str,
    kind: ImportKind,
    table: &ParsedTable,
    mut on_progress: F,
) -> Result<usize, String>
where
    F: FnMut(usize, usize),
{
    let header = table.header().ok_or("The file is empty.")?;
    let rows = table.data_rows();
    let total = rows.len();

    let mut conn = store::open(db_path).map_err(|e| e.to_string())?;
    let mut stored = 0;
    for chunk in rows.chunks(store::ROWS_PER_TRANSACTION) {
        // +2: header is row 1
        let first_row = stored + 2;
        stored += store::insert_rows(&mut conn, batch_id, kind, header, chunk, first_row).map_err(
            |e| {
                format!(
                    "Failed to store rows {}-{}: {}",
                    first_row,
                    first_row + chunk.len() - 1,
                    e
                )
            },
        )?;
        on_progress(stored, total);
    }
    info!("{} import {}: stored {} rows", kind, batch_id, stored);
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_controller::state::start_job_updater;
    use crate::services::imports::configure_routes;
    use actix_web::{http::StatusCode, test as atest, App};
    use common::jobs::CsvUploadStatus;
    use std::time::Duration;

    const STOCK_HEADER: &str = "Stock Name,Stock Variant Name,Starting Quantity,Starting Value,Alert Level";

    fn stock_file(rows: usize) -> String {
        let mut text = STOCK_HEADER.to_string();
        for i in 0..rows {
            text.push_str(&format!("\nItem {},Box,{},{}.5,1", i, i, i));
        }
        text
    }

    fn request(file_data: String, file_name: &str) -> UploadCsvRequest {
        UploadCsvRequest {
            file_data,
            file_name: file_name.to_string(),
        }
    }

    fn config_for(dir: &tempfile::TempDir, sync_row_limit: usize) -> AppConfig {
        AppConfig {
            database_path: dir.path().join("imports.sqlite"),
            sync_row_limit,
            ..AppConfig::default()
        }
    }

    #[actix_web::test]
    async fn small_upload_is_imported_inline() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir, 10);
        let (state, _rx) = JobsState::new(8);
        let app = atest::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(config.clone()))
                .service(configure_routes()),
        )
        .await;

        let req = atest::TestRequest::post()
            .uri("/api/imports/stock/upload")
            .set_json(request(stock_file(3), "stock.csv"))
            .to_request();
        let response: UploadResponse = atest::call_and_read_body_json(&app, req).await;

        assert_eq!(
            response,
            UploadResponse::Immediate(UploadAck {
                message: "Imported 3 rows.".to_string(),
                rows_imported: 3,
            })
        );
        let conn = store::open(&config.database_path).unwrap();
        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM imported_rows WHERE import_kind = 'stock'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(total, 3);
    }

    #[actix_web::test]
    async fn large_upload_is_queued_and_completes() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir, 2);
        let (state, rx) = JobsState::new(8);
        actix_web::rt::spawn(start_job_updater(state.clone(), rx));
        let app = atest::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .app_data(web::Data::new(config.clone()))
                .service(configure_routes()),
        )
        .await;

        let req = atest::TestRequest::post()
            .uri("/api/imports/stock/upload")
            .set_json(request(stock_file(5), "stock.csv"))
            .to_request();
        let response: UploadResponse = atest::call_and_read_body_json(&app, req).await;
        let UploadResponse::Queued { task_id } = response else {
            panic!("expected a queued import, got {:?}", response);
        };

        let mut last = None;
        for _ in 0..100 {
            let req = atest::TestRequest::get()
                .uri(&format!("/api/imports/status/{}", task_id))
                .to_request();
            let status: TaskStatusResponse = atest::call_and_read_body_json(&app, req).await;
            let done = status.is_terminal();
            last = Some(status);
            if done {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let last = last.unwrap();
        assert_eq!(last.csv_upload_status, CsvUploadStatus::Complete);
        assert_eq!(last.message, "Imported 5 rows.");
        let conn = store::open(&config.database_path).unwrap();
        assert_eq!(store::count_rows(&conn, &task_id).unwrap(), 5);
    }

    #[actix_web::test]
    async fn queued_import_fails_when_the_store_cannot_be_opened() {
        let dir = tempfile::tempdir().unwrap();
        // A directory is not a usable SQLite file.
        let config = AppConfig {
            database_path: dir.path().to_path_buf(),
            sync_row_limit: 0,
            ..AppConfig::default()
        };
        let (state, rx) = JobsState::new(8);
        actix_web::rt::spawn(start_job_updater(state.clone(), rx));
        let app = atest::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .app_data(web::Data::new(config))
                .service(configure_routes()),
        )
        .await;

        let req = atest::TestRequest::post()
            .uri("/api/imports/stock/upload")
            .set_json(request(stock_file(1), "stock.csv"))
            .to_request();
        let response: UploadResponse = atest::call_and_read_body_json(&app, req).await;
        let UploadResponse::Queued { task_id } = response else {
            panic!("expected a queued import, got {:?}", response);
        };

        let mut last = None;
        for _ in 0..100 {
            let req = atest::TestRequest::get()
                .uri(&format!("/api/imports/status/{}", task_id))
                .to_request();
            let status: TaskStatusResponse = atest::call_and_read_body_json(&app, req).await;
            let done = status.is_terminal();
            last = Some(status);
            if done {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let last = last.unwrap();
        assert_eq!(last.csv_upload_status, CsvUploadStatus::Failed);
        assert!(!last.message.is_empty());
    }

    #[actix_web::test]
    async fn invalid_file_is_rejected_with_row_errors() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _rx) = JobsState::new(8);
        let app = atest::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(config_for(&dir, 10)))
                .service(configure_routes()),
        )
        .await;

        let body = format!("{}\nFlour,Bag,-1,3,1", STOCK_HEADER);
        let req = atest::TestRequest::post()
            .uri("/api/imports/stock/upload")
            .set_json(request(body, "stock.csv"))
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = atest::read_body(resp).await;
        assert_eq!(body, "Row 2: Starting Quantity \"-1\" cannot be negative");
    }

    #[actix_web::test]
    async fn non_csv_name_and_unknown_kind_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _rx) = JobsState::new(8);
        let app = atest::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(config_for(&dir, 10)))
                .service(configure_routes()),
        )
        .await;

        let req = atest::TestRequest::post()
            .uri("/api/imports/stock/upload")
            .set_json(request(stock_file(1), "stock.xlsx"))
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = atest::TestRequest::post()
            .uri("/api/imports/customers/upload")
            .set_json(request(stock_file(1), "customers.csv"))
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn unknown_task_is_not_found() {
        let (state, _rx) = JobsState::new(8);
        let app = atest::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;
        let req = atest::TestRequest::get()
            .uri("/api/imports/status/nope")
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn template_is_a_csv_attachment() {
        let app = atest::init_service(App::new().service(configure_routes())).await;
        let req = atest::TestRequest::get()
            .uri("/api/imports/products/template")
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get("content-disposition")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(disposition.contains("products_template.csv"), "{}", disposition);
        let body = atest::read_body(resp).await;
        assert_eq!(body, ImportKind::Products.template_csv());

        let req = atest::TestRequest::get()
            .uri("/api/imports/unknown/template")
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn chunks_report_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imports.sqlite");
        let text = stock_file(store::ROWS_PER_TRANSACTION + 1);
        let outcome = validate_text(&text, &ImportKind::Stock.schema());
        let mut progress = Vec::new();

        let stored = import_blocking(&path, "batch", ImportKind::Stock, &outcome.rows, |done, total| {
            progress.push((done, total))
        })
        .unwrap();

        let total = store::ROWS_PER_TRANSACTION + 1;
        assert_eq!(stored, total);
        assert_eq!(progress, [(store::ROWS_PER_TRANSACTION, total), (total, total)]);
    }
}
