//! Live video conversation sessions.
//!
//! A session is requested on demand with a context describing what the user
//! shared. Missing credentials and remote failures both come back as `None`;
//! the view shows the same "unavailable" panel for either.

use std::sync::Arc;

use chrono::{DateTime, Local};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    config::ConversationConfig,
    emotion::Emotion,
    fetch::{Fallback, FetchError},
    transport::{HttpRequest, Transport},
};

const ENABLE_LOGS: bool = true;

use crate::log_info;

const PARTICIPANT_LEFT_TIMEOUT_SECS: u32 = 60;
const PARTICIPANT_ABSENT_TIMEOUT_SECS: u32 = 300;

const FALLBACK_TEMPLATES: [&str; 5] = [
    "I can sense you're feeling {emotion} right now. Your feelings are completely valid and important.",
    "Thank you for sharing that you're feeling {emotion}. It takes courage to be vulnerable about our emotions.",
    "I hear that you're experiencing {emotion} feelings. You're not alone in this journey.",
    "Your {emotion} feelings deserve to be acknowledged and understood. I'm here to listen.",
    "Feeling {emotion} is part of the human experience. Your emotions matter and so do you.",
];

pub const GENERIC_GREETING: &str = "Hello, I'm your emotional support guru, and I'm here for you. Thank you for sharing your feelings with me - it takes courage to be vulnerable. I can sense that you're going through something meaningful right now, and I want you to know that whatever you're feeling is completely valid. I'm here to listen, understand, and support you. What would you like to share with me about how you're feeling today?";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationProperties {
    pub participant_left_timeout: u32,
    pub participant_absent_timeout: u32,
    pub enable_recording: bool,
}

impl Default for ConversationProperties {
    fn default() -> Self {
        Self {
            participant_left_timeout: PARTICIPANT_LEFT_TIMEOUT_SECS,
            participant_absent_timeout: PARTICIPANT_ABSENT_TIMEOUT_SECS,
            enable_recording: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica_id: Option<String>,
    pub persona_id: String,
    pub conversation_name: String,
    pub conversational_context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_greeting: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ConversationProperties>,
}

/// A created session, as returned by the conversation API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationSession {
    #[serde(rename = "conversation_id")]
    pub id: String,
    #[serde(rename = "conversation_name", default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "conversation_url")]
    pub url: String,
    #[serde(default)]
    pub replica_id: String,
    #[serde(default)]
    pub persona_id: String,
    #[serde(default)]
    pub created_at: String,
}

impl ConversationSession {
    pub fn created_at_local(&self) -> Option<DateTime<Local>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|created| created.with_timezone(&Local))
    }
}

/// Opening line for the avatar, chosen by emotion. Labels outside the fixed
/// set get [`GENERIC_GREETING`].
pub fn greeting_for(label: &str) -> &'static str {
    match Emotion::from_label(label) {
        Some(Emotion::Sad) => "Hello, I'm your emotional support guru, and I'm here for you. I can sense that you're feeling sad right now, and I want you to know that your feelings are completely valid. Sadness is a natural part of the human experience, and it's okay to feel this way. Thank you for trusting me with what's in your heart. Tell me, what's been weighing on you today?",
        Some(Emotion::Angry) => "Hello, I'm your emotional support guru. I understand you're feeling angry right now, and I want you to know that anger is a valid emotion that deserves to be heard. Sometimes anger is our heart's way of telling us that something important to us has been affected. I'm here to listen without judgment and help you work through these feelings. What's been stirring up this anger for you?",
        Some(Emotion::Anxious) => "Hello, I'm your emotional support guru, and I'm so glad you're here. I can sense that you're feeling anxious, and I want you to know that you're safe in this space. Anxiety can feel overwhelming, but you've already taken a brave step by reaching out. Your feelings are valid, and together we can explore what's causing this anxiety. Take a deep breath with me - what's been on your mind lately?",
        Some(Emotion::Excited) => "Hello, I'm your emotional support guru! I can feel your excitement, and it's wonderful to see you embracing positive emotions. Joy and excitement are beautiful parts of life that deserve to be celebrated. I'm here to share in this moment with you and help you explore these feelings. What's got you feeling so excited today?",
        Some(Emotion::Exhausted) => "Hello, I'm your emotional support guru. I can sense that you're feeling exhausted, and I want you to know that it's okay to feel tired. Sometimes life asks so much of us, and it's natural to feel drained. You've been carrying a lot, haven't you? I'm here to offer you a moment of rest and understanding. What's been taking so much of your energy lately?",
        Some(Emotion::Confused) => "Hello, I'm your emotional support guru. I understand you're feeling confused right now, and that's completely okay. Confusion often comes when we're at a crossroads or facing something new and uncertain. It's a sign that you're thinking deeply about something important. I'm here to help you sort through these feelings and find some clarity. What's been causing this confusion for you?",
        Some(Emotion::Grateful) => "Hello, I'm your emotional support guru. I can sense your gratitude, and it's beautiful to witness. Gratitude is such a powerful emotion that can transform how we see the world. I'm honored that you're sharing this positive energy with me. What's been filling your heart with gratitude today?",
        Some(Emotion::Lonely) => "Hello, I'm your emotional support guru, and I want you to know that you're not alone right now. I can sense that you're feeling lonely, and I understand how isolating that can feel. Loneliness is one of the most human experiences we can have, and it takes courage to acknowledge it. I'm here with you in this moment. What's been making you feel so alone lately?",
        Some(Emotion::Hopeful) => "Hello, I'm your emotional support guru. I can feel the hope radiating from you, and it's truly inspiring. Hope is such a powerful force - it's what keeps us moving forward even in difficult times. I'm here to nurture that hope with you and explore what's lighting up your path. What's been giving you this sense of hope?",
        Some(Emotion::Reflective) => "Hello, I'm your emotional support guru. I can sense that you're in a reflective space right now, taking time to look inward and process your experiences. This kind of self-reflection shows wisdom and emotional maturity. I'm here to accompany you on this journey of self-discovery. What's been on your mind as you've been reflecting?",
        None => GENERIC_GREETING,
    }
}

pub fn conversational_context(user_text: &str, label: &str) -> String {
    format!(
        "You are a compassionate emotional support guru. The user has just shared: \"{user_text}\" and they are feeling {label}. \n\n\
Your role is to:\n\
1. Start immediately with a warm, personalized greeting\n\
2. Acknowledge their specific emotion with empathy\n\
3. Provide comfort and validation for their feelings\n\
4. Ask thoughtful follow-up questions to help them explore deeper\n\
5. Be a wise, caring presence who listens without judgment\n\
6. Offer gentle guidance and wisdom when appropriate\n\n\
Remember: Always speak with warmth, understanding, and genuine care. Make them feel heard and supported."
    )
}

pub fn session_name(today: DateTime<Local>) -> String {
    format!("Emotional Support Session - {}", today.format("%-m/%-d/%Y"))
}

/// Supportive line for the "conversation unavailable" panel.
pub fn fallback_message(label: &str) -> String {
    fallback_message_with(label, &mut rand::thread_rng())
}

pub fn fallback_message_with<R: Rng + ?Sized>(label: &str, rng: &mut R) -> String {
    let template = FALLBACK_TEMPLATES
        .choose(rng)
        .copied()
        .unwrap_or(FALLBACK_TEMPLATES[0]);
    template.replace("{emotion}", label)
}

#[derive(Clone)]
pub struct ConversationInitiator {
    transport: Arc<dyn Transport>,
    config: ConversationConfig,
}

impl ConversationInitiator {
    pub fn new(transport: Arc<dyn Transport>, config: ConversationConfig) -> Self {
        Self { transport, config }
    }

    /// `None` when credentials are missing or the remote call failed.
    pub async fn start_conversation(
        &self,
        user_text: &str,
        label: &str,
    ) -> Option<ConversationSession> {
        self.create(user_text, label)
            .await
            .map(Some)
            .or_fallback("video conversation", || None)
    }

    pub fn build_request(
        &self,
        persona_id: &str,
        user_text: &str,
        label: &str,
    ) -> ConversationRequest {
        ConversationRequest {
            replica_id: self.config.replica_id.clone(),
            persona_id: persona_id.to_string(),
            conversation_name: session_name(Local::now()),
            conversational_context: conversational_context(user_text, label),
            custom_greeting: Some(greeting_for(label).to_string()),
            properties: Some(ConversationProperties::default()),
        }
    }

    pub async fn create(
        &self,
        user_text: &str,
        label: &str,
    ) -> Result<ConversationSession, FetchError> {
        let (api_key, persona_id) = self
            .config
            .credentials()
            .ok_or(FetchError::MissingCredentials("video conversation"))?;

        let body = self.build_request(persona_id, user_text, label);
        let url = format!("{}/conversations", self.config.base_url.trim_end_matches('/'));
        let request = HttpRequest::post(url, serde_json::to_value(&body)?)
            .header("x-api-key", api_key)
            .header("Content-Type", "application/json");

        let response = self.transport.send(request).await?.error_for_status()?;
        let session: ConversationSession = serde_json::from_str(&response.body)?;
        log_info!("conversation {} created ({})", session.id, session.status);
        Ok(session)
    }
}
