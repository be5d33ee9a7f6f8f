use askama::Template;
use axum::{Json, response::IntoResponse};
use serde_json::json;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {}

pub async fn index() -> impl IntoResponse {
    IndexTemplate {}
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "image-studio",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
