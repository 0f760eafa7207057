use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;

use crate::services::Extractor;

#[get("/")]
pub async fn default() -> impl Responder {
    HttpResponse::Ok().body("Send me an article url and I will read it to you.")
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    renderer_ready: bool,
    sessions_available: usize,
    queued: usize,
}

#[get("/health")]
pub async fn health(extractor: web::Data<Extractor>) -> HttpResponse {
    let renderer = extractor.renderer();

    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        renderer_ready: renderer.is_ready().await,
        sessions_available: renderer.pool().available(),
        queued: renderer.pool().queued(),
    })
}
