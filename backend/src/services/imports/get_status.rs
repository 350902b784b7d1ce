use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};

pub(crate) async fn process(task_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    match state.status(&task_id).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().body("Task ID not found"),
    }
}
