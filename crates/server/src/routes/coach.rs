use axum::{Extension, Json};

use crate::clients::SharedAi;
use crate::error::AppError;
use crate::models::{CoachingRequest, CoachingResponse};
use crate::services::coaching::{self, Conversation};
use crate::services::prompts;

/// POST /coach
pub async fn coach(
    Extension(ai): Extension<SharedAi>,
    Json(req): Json<CoachingRequest>,
) -> Result<Json<CoachingResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".into()));
    }

    tracing::info!(
        history = req.conversation_history.as_ref().map_or(0, Vec::len),
        has_game_context = req.game_context.is_some(),
        "Starting chess coaching interaction"
    );

    let conversation = Conversation::new(prompts::COACH_PERSONA)
        .with_history(req.conversation_history.unwrap_or_default())
        .with_game_context(req.game_context.as_deref())
        .with_user(req.message);

    let coaching_text = coaching::request_coaching(ai.as_ref(), conversation).await?;
    let reply = coaching::structure_reply(ai.as_ref(), &coaching_text)
        .await
        .into_reply();

    Ok(Json(reply.into_coaching_response()))
}
