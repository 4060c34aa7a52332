//! HTTP API surface
//!
//! Route registration and the response helpers shared by both conversation
//! handlers. Every body, success or error, is JSON with a timestamp.

pub mod text_chat;
pub mod voice_chat;

use crate::error::ApiError;
use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

/// Register the conversation routes under `/api`
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/text-chat", web::post().to(text_chat::text_chat))
            .route("/voice-chat", web::post().to(voice_chat::voice_chat)),
    );
}

/// 200 JSON response with caching disabled
pub(crate) fn ok_json<T: Serialize>(body: &T) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-cache"))
        .json(body)
}

/// Keep malformed-JSON rejections on the JSON error contract
fn json_error_handler(_err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::invalid(
        "Invalid request format",
        "Please ensure you're sending valid JSON with a 'message' field.",
    )
    .into()
}
