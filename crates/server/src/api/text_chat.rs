//! Text conversation handler
//!
//! Validates the inbound message, forwards it with the accumulated history
//! to the chat-completion capability, and returns the reply. A failing or
//! empty completion never fails the request; the fixed degraded-service
//! reply is substituted so the conversation continues.

use crate::api::ok_json;
use crate::clients::AppContext;
use crate::error::ApiError;
use crate::persona;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use hermes_protocol::limits::MAX_MESSAGE_CHARS;
use hermes_protocol::{TextChatRequest, TextChatResponse, Turn};
use tracing::{debug, warn};

/// `POST /api/text-chat`
pub async fn text_chat(
    ctx: web::Data<AppContext>,
    body: web::Json<TextChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let TextChatRequest { message, history } = body.into_inner();

    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid(
            "No message provided",
            "Please provide a message and try again.",
        ));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::invalid(
            "Message too long",
            "Please keep your message under 2000 characters.",
        ));
    }

    let chat = ctx.chat.get().ok_or_else(|| {
        ApiError::misconfigured(
            "AI service not available - configuration missing",
            "The AI service is not properly configured. Please contact support.",
        )
    })?;

    let history = history.unwrap_or_default();
    let response = generate_reply(chat.as_ref(), &history, trimmed).await;

    Ok(ok_json(&TextChatResponse {
        response,
        timestamp: Utc::now(),
    }))
}

/// Run the completion, substituting the degraded reply on any failure
pub(crate) async fn generate_reply(
    chat: &dyn crate::clients::ChatModel,
    history: &[Turn],
    user_text: &str,
) -> String {
    let turns = persona::compose_turns(history, user_text);
    debug!(turns = turns.len(), "generating reply");

    match chat.generate(&turns).await {
        Ok(reply) if !reply.trim().is_empty() => reply,
        Ok(_) => {
            warn!("chat completion returned empty text, substituting degraded reply");
            persona::DEGRADED_MESSAGE.to_string()
        }
        Err(failure) => {
            warn!(%failure, "chat completion failed, substituting degraded reply");
            persona::DEGRADED_MESSAGE.to_string()
        }
    }
}
