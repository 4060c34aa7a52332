//! Health check endpoint

use crate::clients::AppContext;
use actix_web::{web, HttpResponse};
use serde_json::json;

/// `GET /health`
pub async fn health_check(ctx: web::Data<AppContext>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": ctx.started_at.elapsed().as_secs(),
        "capabilities": {
            "chat": ctx.chat.is_ready(),
            "speech": ctx.speech.is_ready(),
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
