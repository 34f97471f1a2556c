//! Request and response bodies of the HTTP API.

use chess_core::{GameMetadata, MoveRecord};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::clients::ChatMessage;

/// One AI-selected move worth talking about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMoment {
    #[serde(deserialize_with = "lenient_move_number")]
    pub move_number: u32,
    #[serde(rename = "move")]
    pub move_san: String,
    pub analysis: String,
    #[serde(default)]
    pub evaluation: Option<String>, // e.g. "+=", "=", "-/+"
}

/// The AI sometimes quotes move numbers (`"12"`).
fn lenient_move_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MoveNumber {
        Number(u32),
        Text(String),
    }

    match MoveNumber::deserialize(deserializer)? {
        MoveNumber::Number(n) => Ok(n),
        MoveNumber::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid move number '{text}'"))),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameAnalysis {
    pub moves: Vec<MoveRecord>,
    pub summary: String,
    pub key_moments: Vec<KeyMoment>,
    #[serde(flatten)]
    pub metadata: GameMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    pub status: String,
    pub openai_connection: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PgnInput {
    pub pgn: String,
}

#[derive(Debug, Deserialize)]
pub struct CoachingRequest {
    pub message: String,
    #[serde(default)]
    pub game_context: Option<String>,
    #[serde(default)]
    pub conversation_history: Option<Vec<ChatMessage>>,
}

/// Structured coaching advice, as returned by `/coach`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachingResponse {
    pub response: String,
    pub suggestions: Vec<String>,
    pub next_steps: Option<Vec<String>>,
    pub evaluation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceCoachingResponse {
    /// Base64-encoded speech audio.
    pub audio_response: String,
    pub text_response: String,
    pub suggestions: Vec<String>,
    pub next_steps: Option<Vec<String>>,
    pub evaluation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisWithVoiceResponse {
    pub game_analysis: GameAnalysis,
    pub coaching: Option<VoiceCoachingResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_moment_accepts_quoted_move_number() {
        let moment: KeyMoment = serde_json::from_str(
            r#"{"move_number": "12", "move": "Nxe5", "analysis": "Wins a pawn"}"#,
        )
        .unwrap();
        assert_eq!(moment.move_number, 12);
        assert_eq!(moment.move_san, "Nxe5");
        assert_eq!(moment.evaluation, None);

        let moment: KeyMoment =
            serde_json::from_str(r#"{"move_number": 3, "move": "a6", "analysis": "Modern"}"#).unwrap();
        assert_eq!(moment.move_number, 3);
    }

    #[test]
    fn test_key_moment_rejects_non_numeric_move_number() {
        let result = serde_json::from_str::<KeyMoment>(
            r#"{"move_number": "twelve", "move": "Nxe5", "analysis": "Wins a pawn"}"#,
        );
        assert!(result.is_err());
    }
}
