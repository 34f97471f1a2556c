//! In-memory [`ChessAi`] double for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AiError, AudioClip, ChatRequest, ChessAi};

/// Replays queued chat replies in order and records every request it saw.
#[derive(Default)]
pub struct ScriptedAi {
    replies: Mutex<VecDeque<Result<String, AiError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    pub transcript: String,
    pub audio: Vec<u8>,
}

impl ScriptedAi {
    pub fn new(replies: Vec<Result<String, AiError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            transcript: "What should I have played?".to_string(),
            audio: b"mp3".to_vec(),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChessAi for ScriptedAi {
    async fn chat(&self, request: ChatRequest) -> Result<String, AiError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::Unavailable("no scripted reply left".to_string())))
    }

    async fn transcribe(&self, _audio: AudioClip) -> Result<String, AiError> {
        Ok(self.transcript.clone())
    }

    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, AiError> {
        Ok(self.audio.clone())
    }
}
