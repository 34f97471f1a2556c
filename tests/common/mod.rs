#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use server::clients::{AiError, AudioClip, ChatRequest, ChessAi};
use server::config::Config;

pub const RUY_LOPEZ: &str = r#"[Event "Casual Game"]
[White "Alice"]
[Black "Bob"]
[Result "*"]
[Date "2024.03.01"]
[Opening "Ruy Lopez"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 *"#;

pub const ANALYSIS_JSON: &str = r#"{
    "summary": "A principled Ruy Lopez opening.",
    "key_moments": [
        {"move_number": 3, "move": "Bb5", "analysis": "Pressure on the e5 defender.", "evaluation": "+="}
    ]
}"#;

pub const STRUCTURED_JSON: &str = r#"{
    "text_response": "Keep the tension in the center.",
    "suggestions": ["Play Ba4", "Castle kingside"],
    "next_steps": ["Study the Closed Ruy Lopez"],
    "evaluation": "Equal"
}"#;

/// AI double: replays queued chat replies and records what it was asked.
pub struct ScriptedAi {
    replies: Mutex<VecDeque<Result<String, AiError>>>,
    chats: Mutex<Vec<ChatRequest>>,
    transcriptions: Mutex<Vec<AudioClip>>,
    spoken: Mutex<Vec<String>>,
}

impl ScriptedAi {
    pub fn new(replies: Vec<Result<String, AiError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            chats: Mutex::new(Vec::new()),
            transcriptions: Mutex::new(Vec::new()),
            spoken: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn chats(&self) -> Vec<ChatRequest> {
        self.chats.lock().unwrap().clone()
    }

    pub fn transcriptions(&self) -> Vec<AudioClip> {
        self.transcriptions.lock().unwrap().clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChessAi for ScriptedAi {
    async fn chat(&self, request: ChatRequest) -> Result<String, AiError> {
        self.chats.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::Unavailable("no scripted reply".to_string())))
    }

    async fn transcribe(&self, audio: AudioClip) -> Result<String, AiError> {
        self.transcriptions.lock().unwrap().push(audio);
        Ok("Why did Black play a6?".to_string())
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AiError> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(b"ID3-fake-audio".to_vec())
    }
}

/// Serve the real router on an ephemeral port; returns its base URL.
pub async fn spawn_app(ai: Arc<ScriptedAi>) -> String {
    let app = server::app(ai, &Config::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::new()
}
