//! Emotion classification.
//!
//! When a completion service is configured the user's text is sent with a
//! fixed instruction asking for `{"message", "emotion"}` JSON. Any failure on
//! that path falls back to a keyword classifier that never fails.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::CompletionConfig,
    emotion::Emotion,
    fetch::{Fallback, FetchError},
    transport::{HttpRequest, Transport},
};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

const SYSTEM_PROMPT: &str = r#"You are a compassionate emotional support companion. When a user shares their feelings, respond with:
1. A short, comforting message (1-2 sentences) showing empathy and support
2. Identify the primary emotion in one word (sad, angry, anxious, excited, confused, grateful, lonely, stressed, hopeful, etc.)

Format your response as JSON:
{
  "message": "Your comforting message here",
  "emotion": "primary_emotion"
}

Be warm, understanding, and supportive. Avoid being clinical or overly formal."#;

const MAX_TOKENS: u32 = 150;
const TEMPERATURE: f32 = 0.7;

pub const DEFAULT_REPLY: &str = "I hear you, and your feelings are completely valid.";
pub const GENERIC_MESSAGE: &str =
    "Thank you for sharing with me. Whatever you're feeling right now is completely valid and important.";

/// Keyword sets checked in order; the first category with a hit wins.
const KEYWORD_RULES: [(Emotion, &[&str], &str); 7] = [
    (
        Emotion::Sad,
        &["sad", "down", "depressed", "crying", "lonely"],
        "It's okay to feel down sometimes. Your feelings are valid, and this difficult moment will pass.",
    ),
    (
        Emotion::Angry,
        &["angry", "mad", "frustrated", "rage"],
        "Your anger is understandable. Take deep breaths and remember that you have the strength to work through this.",
    ),
    (
        Emotion::Anxious,
        &["anxious", "worried", "stressed", "panic", "nervous"],
        "Anxiety can feel overwhelming, but you're braver than you believe. Take it one breath at a time.",
    ),
    (
        Emotion::Excited,
        &["excited", "happy", "amazing", "great", "wonderful"],
        "Your joy is contagious! It's beautiful to see you embracing the good moments in life.",
    ),
    (
        Emotion::Exhausted,
        &["tired", "exhausted", "drained", "overwhelmed"],
        "Rest is not a luxury, it's a necessity. Be gentle with yourself and take the time you need to recharge.",
    ),
    (
        Emotion::Confused,
        &["confused", "lost", "unsure", "don't know"],
        "Feeling lost is part of the human experience. Trust that clarity will come when you're ready for it.",
    ),
    (
        Emotion::Grateful,
        &["grateful", "thankful", "blessed", "appreciate"],
        "Gratitude is a beautiful way to see the world. Your positive energy makes a difference.",
    ),
];

/// A comforting message plus the detected emotion label.
///
/// `emotion` is kept as a label rather than an [`Emotion`] because the
/// completion service may answer with words outside the fixed set; the
/// recommendation tables resolve those to `reflective` on lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub message: String,
    pub emotion: String,
}

impl Classification {
    fn new(message: impl Into<String>, emotion: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            emotion: emotion.into(),
        }
    }
}

/// Keyword classifier. Pure and deterministic.
pub fn classify_locally(text: &str) -> Classification {
    let lower = text.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(_, keywords, _)| keywords.iter().any(|keyword| lower.contains(keyword)))
        .map(|(emotion, _, message)| Classification::new(*message, emotion.as_str()))
        .unwrap_or_else(|| Classification::new(GENERIC_MESSAGE, Emotion::Reflective.as_str()))
}

/// Interprets the completion text: JSON `{message, emotion}` when possible,
/// otherwise the first non-empty line with `reflective`.
pub fn parse_reply(content: &str) -> Classification {
    match serde_json::from_str::<Value>(content.trim()) {
        Ok(parsed) => {
            let field = |name: &str| {
                parsed
                    .get(name)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            };
            Classification {
                message: field("message").unwrap_or_else(|| DEFAULT_REPLY.to_string()),
                emotion: field("emotion")
                    .map(|label| label.to_lowercase())
                    .unwrap_or_else(|| Emotion::Reflective.as_str().to_string()),
            }
        }
        Err(_) => {
            let message = content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or(DEFAULT_REPLY);
            Classification::new(message, Emotion::Reflective.as_str())
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct EmotionClassifier {
    transport: Arc<dyn Transport>,
    config: Option<CompletionConfig>,
}

impl EmotionClassifier {
    pub fn new(transport: Arc<dyn Transport>, config: Option<CompletionConfig>) -> Self {
        Self { transport, config }
    }

    /// Never fails: remote problems resolve to the keyword classifier.
    pub async fn classify(&self, text: &str) -> Classification {
        self.classify_remote(text)
            .await
            .or_fallback("emotion classification", || classify_locally(text))
    }

    pub async fn classify_remote(&self, text: &str) -> Result<Classification, FetchError> {
        let config = self
            .config
            .as_ref()
            .ok_or(FetchError::MissingCredentials("completion"))?;

        let body = ChatCompletionRequest {
            model: &config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let request = HttpRequest::post(&config.endpoint, serde_json::to_value(&body)?)
            .header("Authorization", format!("Bearer {}", config.api_key))
            .header("Content-Type", "application/json");

        let response = self.transport.send(request).await?.error_for_status()?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&response.body)?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(FetchError::Empty("completion had no content"))?;

        log_debug!("completion reply: {content:?}");
        Ok(parse_reply(&content))
    }
}
