use axum::{Extension, Json};

use crate::clients::{AiError, ChatMessage, ChatRequest, SharedAi};
use crate::models::HealthCheck;
use crate::services::prompts;

/// GET /health
///
/// Always 200; an unreachable AI service is reported as `unhealthy`. Any completed
/// round-trip counts as reachable, even when the capped probe comes back empty.
pub async fn health_check(Extension(ai): Extension<SharedAi>) -> Json<HealthCheck> {
    let probe = ChatRequest {
        messages: vec![
            ChatMessage::system(prompts::HEALTH_SYSTEM),
            ChatMessage::user(prompts::HEALTH_PROBE),
        ],
        temperature: None,
        max_tokens: 5,
        json_output: false,
    };

    let check = match ai.chat(probe).await {
        Ok(_) | Err(AiError::Empty) => HealthCheck {
            status: "healthy".to_string(),
            openai_connection: true,
            message: "Service is healthy and OpenAI connection is working".to_string(),
        },
        Err(e) => {
            tracing::error!("OpenAI connection test failed: {e}");
            HealthCheck {
                status: "unhealthy".to_string(),
                openai_connection: false,
                message: format!("OpenAI connection failed: {e}"),
            }
        }
    };

    Json(check)
}
