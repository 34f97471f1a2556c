use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::{Extension, Json};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::clients::{AudioClip, ChatMessage, SharedAi};
use crate::error::AppError;
use crate::models::{AnalysisWithVoiceResponse, GameAnalysis, VoiceCoachingResponse};
use crate::services::coaching::{self, Conversation};
use crate::services::{analysis, prompts};

const DEFAULT_AUDIO_FILENAME: &str = "audio.wav";

/// Parsed multipart form of `/analyze-with-voice`.
#[derive(Debug, Default)]
struct VoiceForm {
    pgn: Option<String>,
    audio: Option<AudioClip>,
    conversation_history: Vec<ChatMessage>,
}

/// POST /analyze-with-voice (multipart: `pgn`, `audio_file`?, `conversation_history`?)
pub async fn analyze_with_voice(
    Extension(ai): Extension<SharedAi>,
    multipart: Multipart,
) -> Result<Json<AnalysisWithVoiceResponse>, AppError> {
    let form = read_form(multipart).await?;
    let pgn = form
        .pgn
        .ok_or_else(|| AppError::BadRequest("Missing form field 'pgn'".into()))?;

    tracing::info!(has_audio = form.audio.is_some(), "Starting combined analysis and coaching");
    let game_analysis = analysis::analyze_game(ai.as_ref(), &pgn).await?;

    let Some(audio) = form.audio else {
        return Ok(Json(AnalysisWithVoiceResponse {
            game_analysis,
            coaching: None,
        }));
    };

    let coaching = voice_coaching(&ai, &game_analysis, audio, form.conversation_history).await?;

    Ok(Json(AnalysisWithVoiceResponse {
        game_analysis,
        coaching: Some(coaching),
    }))
}

async fn voice_coaching(
    ai: &SharedAi,
    game_analysis: &GameAnalysis,
    audio: AudioClip,
    history: Vec<ChatMessage>,
) -> Result<VoiceCoachingResponse, AppError> {
    let question = ai.transcribe(audio).await?;
    tracing::info!("Transcribed text: {question}");

    let conversation = Conversation::new(prompts::VOICE_COACH_PERSONA)
        .with_history(history)
        .with_user(prompts::voice_question(
            &game_analysis.summary,
            &game_analysis.key_moments,
            &question,
        ));

    let coaching_text = coaching::request_coaching(ai.as_ref(), conversation).await?;
    let reply = coaching::structure_reply(ai.as_ref(), &coaching_text)
        .await
        .into_reply();

    let audio_bytes = ai.synthesize(&reply.text).await?;
    Ok(reply.into_voice_response(BASE64.encode(audio_bytes)))
}

async fn read_form(mut multipart: Multipart) -> Result<VoiceForm, AppError> {
    let mut form = VoiceForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pgn" => form.pgn = Some(field.text().await.map_err(bad_multipart)?),
            "audio_file" => form.audio = read_audio(field).await?,
            "conversation_history" => {
                let raw = field.text().await.map_err(bad_multipart)?;
                form.conversation_history = parse_history(&raw)?;
            }
            other => tracing::debug!("Ignoring unexpected form field '{other}'"),
        }
    }

    Ok(form)
}

/// An empty file part counts as no audio.
async fn read_audio(field: Field<'_>) -> Result<Option<AudioClip>, AppError> {
    let filename = field
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_AUDIO_FILENAME)
        .to_string();
    let bytes = field.bytes().await.map_err(bad_multipart)?;

    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(AudioClip {
        filename,
        bytes: bytes.to_vec(),
    }))
}

fn parse_history(raw: &str) -> Result<Vec<ChatMessage>, AppError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| AppError::BadRequest(format!("Invalid conversation history format: {e}")))
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart form: {e}"))
}
