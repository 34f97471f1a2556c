use axum::{Extension, Json};

use crate::clients::SharedAi;
use crate::error::AppError;
use crate::models::{GameAnalysis, PgnInput};
use crate::services::analysis;

/// POST /analyze
pub async fn analyze_game(
    Extension(ai): Extension<SharedAi>,
    Json(input): Json<PgnInput>,
) -> Result<Json<GameAnalysis>, AppError> {
    tracing::info!("Starting game analysis");
    let game_analysis = analysis::analyze_game(ai.as_ref(), &input.pgn).await?;
    Ok(Json(game_analysis))
}
