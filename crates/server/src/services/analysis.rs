//! PGN replay plus AI game analysis.

use chess_core::{replay_pgn, MoveRecord};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::prompts;
use crate::clients::{ChatMessage, ChatRequest, ChessAi};
use crate::error::AppError;
use crate::models::{GameAnalysis, KeyMoment};

const ANALYSIS_TEMPERATURE: f32 = 0.7;
const ANALYSIS_MAX_TOKENS: u32 = 2000;

/// The part of a [`GameAnalysis`] written by the AI.
#[derive(Debug, Deserialize)]
pub struct AnalysisReport {
    pub summary: String,
    pub key_moments: Vec<KeyMoment>,
}

/// Replay `pgn`, ask the AI for a summary and key moments, and merge both with the
/// game's metadata.
pub async fn analyze_game(ai: &dyn ChessAi, pgn: &str) -> Result<GameAnalysis, AppError> {
    let game = replay_pgn(pgn)?;
    tracing::info!(moves = game.moves.len(), "Replayed PGN");

    let report = request_report(ai, &game.moves).await?;
    tracing::info!(key_moments = report.key_moments.len(), "Analysis completed");

    Ok(GameAnalysis {
        moves: game.moves,
        summary: report.summary,
        key_moments: report.key_moments,
        metadata: game.metadata,
    })
}

async fn request_report(ai: &dyn ChessAi, moves: &[MoveRecord]) -> Result<AnalysisReport, AppError> {
    let request = ChatRequest::json(
        vec![
            ChatMessage::system(prompts::ANALYSIS_SYSTEM),
            ChatMessage::user(prompts::analysis_prompt(moves)),
        ],
        ANALYSIS_TEMPERATURE,
        ANALYSIS_MAX_TOKENS,
    );

    let content = ai.chat(request).await?;
    parse_report(&content)
}

/// Validate the AI's reply: a JSON object with `summary` and well-formed `key_moments`.
pub fn parse_report(content: &str) -> Result<AnalysisReport, AppError> {
    let value: JsonValue = serde_json::from_str(content).map_err(|e| {
        tracing::error!("Failed to parse analysis response as JSON: {e}; raw: {content}");
        AppError::Internal(format!(
            "Failed to parse analysis response as JSON. Response: {}...",
            preview(content)
        ))
    })?;

    let object = value
        .as_object()
        .ok_or_else(|| AppError::Internal("Invalid response format: response is not an object".into()))?;
    if !object.contains_key("summary") || !object.contains_key("key_moments") {
        return Err(AppError::Internal(
            "Invalid response format: missing required fields in response".into(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::Internal(format!("Invalid response format: {e}")))
}

fn preview(content: &str) -> &str {
    match content.char_indices().nth(100) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::scripted::ScriptedAi;

    const REPORT: &str = r#"{
        "summary": "White built a strong center.",
        "key_moments": [
            {"move_number": 3, "move": "Bb5", "analysis": "The Ruy Lopez.", "evaluation": "+="},
            {"move_number": 3, "move": "a6", "analysis": "Morphy Defense."}
        ]
    }"#;

    #[tokio::test]
    async fn test_analyze_game_merges_report_and_moves() {
        let ai = ScriptedAi::new(vec![Ok(REPORT.to_string())]);
        let pgn = "[White \"Kasparov\"]\n\n1. e4 e5 2. Nf3 Nc6 3. Bb5 a6";

        let analysis = analyze_game(&ai, pgn).await.unwrap();
        assert_eq!(analysis.moves.len(), 3);
        assert_eq!(analysis.summary, "White built a strong center.");
        assert_eq!(analysis.key_moments.len(), 2);
        assert_eq!(analysis.key_moments[1].evaluation, None);
        assert_eq!(analysis.metadata.white_player.as_deref(), Some("Kasparov"));

        let requests = ai.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].json_output);
        assert!(requests[0].messages[1].content.contains("3. Bb5 a6"));
    }

    #[tokio::test]
    async fn test_bad_pgn_skips_ai_call() {
        let ai = ScriptedAi::new(vec![Ok(REPORT.to_string())]);
        let err = analyze_game(&ai, "1. e4 e5 2. Ke3").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(ai.requests().is_empty());
    }

    #[test]
    fn test_parse_report_rejects_non_json() {
        let err = parse_report("Sure! Here is the analysis").unwrap_err();
        assert!(matches!(err, AppError::Internal(msg) if msg.contains("JSON")));
    }

    #[test]
    fn test_parse_report_requires_fields() {
        assert!(parse_report(r#"{"summary": "only a summary"}"#).is_err());
        assert!(parse_report(r#"["summary", "key_moments"]"#).is_err());
        assert!(parse_report(r#"{"summary": "s", "key_moments": [{"move": "e4"}]}"#).is_err());
    }

    #[test]
    fn test_parse_report_tolerates_quoted_move_numbers() {
        let report = parse_report(
            r#"{"summary": "s", "key_moments": [{"move_number": "5", "move": "O-O", "analysis": "Safe"}]}"#,
        )
        .unwrap();
        assert_eq!(report.key_moments[0].move_number, 5);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "♞".repeat(150);
        assert_eq!(preview(&long).chars().count(), 100);
        assert_eq!(preview("short"), "short");
    }
}
