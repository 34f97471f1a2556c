use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    AudioInput, ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, CreateSpeechRequestArgs, CreateTranscriptionRequestArgs,
    ResponseFormat, SpeechModel, Voice,
};
use async_openai::Client;
use async_trait::async_trait;

use super::{AiError, AudioClip, ChatMessage, ChatRequest, ChessAi, Role};
use crate::config::Config;

pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    chat_model: String,
    transcription_model: String,
    speech_model: SpeechModel,
    voice: Voice,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        let mut openai_config = OpenAIConfig::new();
        if let Some(key) = &config.openai_api_key {
            openai_config = openai_config.with_api_key(key);
        }
        if let Some(base) = &config.openai_base_url {
            openai_config = openai_config.with_api_base(base);
        }

        Self {
            client: Client::with_config(openai_config),
            chat_model: config.chat_model.clone(),
            transcription_model: config.transcription_model.clone(),
            speech_model: speech_model(&config.speech_model),
            voice: voice(&config.speech_voice),
        }
    }
}

#[async_trait]
impl ChessAi for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<String, AiError> {
        let messages = request
            .messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.chat_model)
            .messages(messages)
            .max_completion_tokens(request.max_tokens);
        if let Some(temperature) = request.temperature {
            args.temperature(temperature);
        }
        if request.json_output {
            args.response_format(ResponseFormat::JsonObject);
        }

        let response = self.client.chat().create(args.build()?).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(AiError::Empty)
    }

    async fn transcribe(&self, audio: AudioClip) -> Result<String, AiError> {
        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(audio.filename, audio.bytes))
            .model(&self.transcription_model)
            .build()?;

        let response = self.client.audio().transcribe(request).await?;
        Ok(response.text)
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AiError> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.speech_model.clone())
            .voice(self.voice.clone())
            .build()?;

        let response = self.client.audio().speech(request).await?;
        Ok(response.bytes.to_vec())
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    let content = message.content.clone();
    let built = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(built)
}

fn speech_model(name: &str) -> SpeechModel {
    match name {
        "tts-1-hd" => SpeechModel::Tts1Hd,
        "tts-1" => SpeechModel::Tts1,
        other => {
            tracing::warn!("Unknown speech model '{other}', using tts-1");
            SpeechModel::Tts1
        }
    }
}

fn voice(name: &str) -> Voice {
    match name.to_ascii_lowercase().as_str() {
        "alloy" => Voice::Alloy,
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "nova" => Voice::Nova,
        "shimmer" => Voice::Shimmer,
        other => {
            tracing::warn!("Unknown speech voice '{other}', using alloy");
            Voice::Alloy
        }
    }
}
