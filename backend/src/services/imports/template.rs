use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use common::model::ImportKind;

/// Serves the CSV template for one import kind as an attachment.
pub(crate) async fn process(kind: web::Path<String>) -> impl Responder {
    let kind = match kind.parse::<ImportKind>() {
        Ok(kind) => kind,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };

    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(kind.template_file_name())],
        })
        .body(kind.template_csv())
}
