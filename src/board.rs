//! The mood board: what the window shows and the actions behind its buttons.
//!
//! One submission produces one [`EmotionalResponse`]. The video conversation
//! is a modal overlay that lives alongside it and is torn down when closed.
//!
//! [`MoodBoard`] is a cheap-to-clone handle. Remote calls run without the
//! state lock held, so reading the view or resetting never waits on the
//! network.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    classifier::EmotionClassifier,
    config::AppConfig,
    conversation::{fallback_message, ConversationInitiator, ConversationSession},
    recommend::{recommend_song, youtube_search_url, MoodImageFinder},
    transport::{ReqwestTransport, Transport},
};

pub const MAX_INPUT_CHARS: usize = 500;

const CREDENTIALS_NOTICE: &str = "For enhanced AI responses, beautiful mood images, and live video conversations, add your Perplexity, Unsplash, and Tavus API keys to the environment variables. Currently using fallback responses.";

pub const CONVERSATION_REQUIREMENTS: [&str; 3] = [
    "TAVUS_API_KEY",
    "TAVUS_PERSONA_ID",
    "TAVUS_REPLICA_ID (optional)",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("share how you're feeling first")]
    EmptyInput,

    #[error("please keep it under {MAX_INPUT_CHARS} characters (got {0})")]
    TooLong(usize),

    #[error("no feeling has been shared yet")]
    NothingShared,

    #[error("no conversation is ready to open")]
    NoConversation,
}

/// The composite reply for one submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalResponse {
    pub message: String,
    pub emotion: String,
    pub song: String,
    pub artist: String,
    pub image: Option<String>,
}

impl EmotionalResponse {
    pub fn youtube_url(&self) -> String {
        youtube_search_url(&self.song, &self.artist)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ConversationView {
    /// Opened through the system browser.
    Window,
    /// Rendered inside the overlay.
    Embedded,
}

/// The video conversation overlay.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConversationModal {
    #[default]
    Closed,
    /// Credentials missing or the remote call failed; the two are not told
    /// apart.
    Unavailable {
        emotion: String,
        support_message: String,
        required: Vec<&'static str>,
    },
    Ready {
        session: ConversationSession,
        created_display: Option<String>,
    },
    Started {
        session: ConversationSession,
        view: ConversationView,
    },
}

/// Serializable view of the whole window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub input_limit: usize,
    pub credentials_notice: Option<&'static str>,
    pub response: Option<EmotionalResponse>,
    pub youtube_url: Option<String>,
    pub conversation: ConversationModal,
}

#[derive(Debug, Default)]
struct BoardState {
    /// Bumped on every submit and reset; a conversation result that arrives
    /// for an older submission is dropped.
    submission: u64,
    submitted_text: Option<String>,
    response: Option<EmotionalResponse>,
    conversation: ConversationModal,
}

#[derive(Clone)]
pub struct MoodBoard {
    classifier: EmotionClassifier,
    images: MoodImageFinder,
    conversations: ConversationInitiator,
    credentials_notice: Option<&'static str>,
    state: Arc<Mutex<BoardState>>,
}

impl MoodBoard {
    /// Board wired to the real HTTP transport.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::try_new()?);
        Ok(Self::new(config, transport))
    }

    pub fn new(config: AppConfig, transport: Arc<dyn Transport>) -> Self {
        let credentials_notice = if config.missing_credentials().is_empty() {
            None
        } else {
            Some(CREDENTIALS_NOTICE)
        };

        Self {
            classifier: EmotionClassifier::new(transport.clone(), config.completion),
            images: MoodImageFinder::new(transport.clone(), config.photo_search),
            conversations: ConversationInitiator::new(transport, config.conversation),
            credentials_notice,
            state: Arc::new(Mutex::new(BoardState::default())),
        }
    }

    pub async fn view(&self) -> BoardView {
        let state = self.state.lock().await;
        BoardView {
            input_limit: MAX_INPUT_CHARS,
            credentials_notice: self.credentials_notice,
            response: state.response.clone(),
            youtube_url: state.response.as_ref().map(EmotionalResponse::youtube_url),
            conversation: state.conversation.clone(),
        }
    }

    pub async fn response(&self) -> Option<EmotionalResponse> {
        self.state.lock().await.response.clone()
    }

    pub async fn conversation(&self) -> ConversationModal {
        self.state.lock().await.conversation.clone()
    }

    /// Classifies the text, then picks a song and an image for the result.
    /// Replaces any previous response.
    pub async fn submit(&self, text: &str) -> Result<EmotionalResponse, BoardError> {
        let text = validate_input(text)?;

        let classification = self.classifier.classify(text).await;
        let song = recommend_song(&classification.emotion);
        let image = self.images.fetch_mood_image(&classification.emotion).await;

        let response = EmotionalResponse {
            message: classification.message,
            emotion: classification.emotion,
            song: song.song,
            artist: song.artist,
            image: Some(image),
        };

        let mut state = self.state.lock().await;
        state.submission += 1;
        state.submitted_text = Some(text.to_string());
        state.response = Some(response.clone());
        state.conversation = ConversationModal::Closed;
        Ok(response)
    }

    /// "Share another feeling".
    pub async fn reset(&self) -> BoardView {
        {
            let mut state = self.state.lock().await;
            let submission = state.submission + 1;
            *state = BoardState {
                submission,
                ..BoardState::default()
            };
        }
        self.view().await
    }

    pub async fn start_conversation(&self) -> Result<ConversationModal, BoardError> {
        let (submission, text, emotion) = {
            let state = self.state.lock().await;
            match (&state.submitted_text, &state.response) {
                (Some(text), Some(response)) => {
                    (state.submission, text.clone(), response.emotion.clone())
                }
                _ => return Err(BoardError::NothingShared),
            }
        };

        let modal = match self.conversations.start_conversation(&text, &emotion).await {
            Some(session) => ConversationModal::Ready {
                created_display: session
                    .created_at_local()
                    .map(|created| created.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()),
                session,
            },
            None => ConversationModal::Unavailable {
                support_message: fallback_message(&emotion),
                emotion,
                required: CONVERSATION_REQUIREMENTS.to_vec(),
            },
        };

        let mut state = self.state.lock().await;
        if state.submission != submission {
            return Err(BoardError::NothingShared);
        }
        state.conversation = modal.clone();
        Ok(modal)
    }

    /// Marks the session as started in `view` and returns its join URL.
    pub async fn begin_conversation(&self, view: ConversationView) -> Result<String, BoardError> {
        let mut state = self.state.lock().await;
        let session = match &state.conversation {
            ConversationModal::Ready { session, .. }
            | ConversationModal::Started { session, .. } => session.clone(),
            _ => return Err(BoardError::NoConversation),
        };
        let url = session.url.clone();
        state.conversation = ConversationModal::Started { session, view };
        Ok(url)
    }

    pub async fn close_conversation(&self) {
        self.state.lock().await.conversation = ConversationModal::Closed;
    }
}

fn validate_input(text: &str) -> Result<&str, BoardError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(BoardError::EmptyInput);
    }
    let chars = text.chars().count();
    if chars > MAX_INPUT_CHARS {
        return Err(BoardError::TooLong(chars));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SilentToneSink, ToneSink};
    use crate::breathing::BreathingOverlay;
    use crate::config::{CompletionConfig, ConversationConfig, PhotoSearchConfig};
    use crate::fetch::FetchError;
    use crate::recommend::{music::song_candidates, FALLBACK_IMAGE};
    use crate::transport::{testing::RecordingTransport, HttpRequest, HttpResponse};
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio::time::timeout;

    /// Accepts a request and never answers it.
    #[derive(Default)]
    struct StalledTransport {
        entered: Notify,
    }

    #[async_trait]
    impl Transport for StalledTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, FetchError> {
            self.entered.notify_one();
            std::future::pending().await
        }
    }

    fn offline_board() -> (MoodBoard, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let board = MoodBoard::new(AppConfig::default(), transport.clone());
        (board, transport)
    }

    fn online_config() -> AppConfig {
        AppConfig {
            completion: Some(CompletionConfig {
                api_key: "k".into(),
                model: "m".into(),
                endpoint: "https://completion.test".into(),
            }),
            photo_search: Some(PhotoSearchConfig {
                client_id: "c".into(),
                endpoint: "https://photos.test".into(),
            }),
            conversation: ConversationConfig {
                api_key: Some("t".into()),
                persona_id: Some("p1".into()),
                replica_id: None,
                base_url: "https://video.test/v2".into(),
            },
            debug: false,
        }
    }

    #[tokio::test]
    async fn offline_submission_uses_local_fallbacks() {
        let (board, transport) = offline_board();

        let response = board
            .submit("I feel so anxious and overwhelmed today")
            .await
            .unwrap();

        assert_eq!(response.emotion, "anxious");
        assert_eq!(response.image.as_deref(), Some(FALLBACK_IMAGE));
        assert!(song_candidates("anxious")
            .iter()
            .any(|c| c.song == response.song && c.artist == response.artist));
        assert_eq!(transport.calls(), 0);

        let view = board.view().await;
        assert!(view.credentials_notice.is_some());
        assert_eq!(view.input_limit, MAX_INPUT_CHARS);
        assert!(view.youtube_url.unwrap().contains("search_query="));
    }

    #[tokio::test]
    async fn rejects_blank_and_oversized_input() {
        let (board, _) = offline_board();
        assert_eq!(board.submit("   \n").await, Err(BoardError::EmptyInput));

        let long = "a".repeat(MAX_INPUT_CHARS + 1);
        assert_eq!(
            board.submit(&long).await,
            Err(BoardError::TooLong(MAX_INPUT_CHARS + 1))
        );

        let exact = "é".repeat(MAX_INPUT_CHARS);
        assert!(board.submit(&exact).await.is_ok());
    }

    #[tokio::test]
    async fn reset_clears_response_and_conversation() {
        let (board, _) = offline_board();
        board.submit("so tired").await.unwrap();
        board.start_conversation().await.unwrap();

        let view = board.reset().await;
        assert!(view.response.is_none());
        assert!(view.youtube_url.is_none());
        assert_eq!(view.conversation, ConversationModal::Closed);
    }

    #[tokio::test]
    async fn conversation_requires_a_submission() {
        let (board, _) = offline_board();
        assert_eq!(
            board.start_conversation().await.err(),
            Some(BoardError::NothingShared)
        );
    }

    #[tokio::test]
    async fn missing_conversation_credentials_show_unavailable_panel() {
        let (board, transport) = offline_board();
        board.submit("I'm so confused").await.unwrap();

        match board.start_conversation().await.unwrap() {
            ConversationModal::Unavailable {
                emotion,
                support_message,
                required,
            } => {
                assert_eq!(emotion, "confused");
                assert!(support_message.contains("confused"));
                assert_eq!(required.len(), 3);
            }
            other => panic!("expected unavailable panel, got {other:?}"),
        }
        assert_eq!(transport.calls(), 0);
        assert_eq!(
            board.begin_conversation(ConversationView::Embedded).await,
            Err(BoardError::NoConversation)
        );
    }

    #[tokio::test]
    async fn online_board_wires_every_service() {
        let transport = Arc::new(
            RecordingTransport::new()
                .respond(
                    200,
                    json!({ "choices": [{ "message": {
                        "content": "{\"message\": \"That's wonderful.\", \"emotion\": \"hopeful\"}"
                    } }] })
                    .to_string(),
                )
                .respond(
                    200,
                    json!({
                        "results": [{ "id": "a", "urls": { "regular": "https://img.test/a" } }],
                        "total": 1,
                        "total_pages": 1
                    })
                    .to_string(),
                )
                .respond(
                    200,
                    json!({
                        "conversation_id": "c1",
                        "conversation_name": "Emotional Support Session",
                        "status": "active",
                        "conversation_url": "https://video.test/c1",
                        "replica_id": "r1",
                        "persona_id": "p1",
                        "created_at": "2026-10-16T08:00:00Z"
                    })
                    .to_string(),
                ),
        );
        let board = MoodBoard::new(online_config(), transport.clone());

        let response = board.submit("new job starts monday").await.unwrap();
        assert_eq!(response.message, "That's wonderful.");
        assert_eq!(response.emotion, "hopeful");
        assert_eq!(response.image.as_deref(), Some("https://img.test/a"));
        assert!(board.view().await.credentials_notice.is_none());

        match board.start_conversation().await.unwrap() {
            ConversationModal::Ready {
                session,
                created_display,
            } => {
                assert_eq!(session.id, "c1");
                assert!(created_display.is_some());
            }
            other => panic!("expected ready panel, got {other:?}"),
        }
        let url = board
            .begin_conversation(ConversationView::Window)
            .await
            .unwrap();
        assert_eq!(url, "https://video.test/c1");
        assert!(matches!(
            board.conversation().await,
            ConversationModal::Started {
                view: ConversationView::Window,
                ..
            }
        ));

        board.close_conversation().await;
        assert_eq!(board.conversation().await, ConversationModal::Closed);
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn ready_panel_serializes_session_details() {
        let session: ConversationSession = serde_json::from_value(json!({
            "conversation_id": "c9",
            "conversation_url": "https://video.test/c9",
            "created_at": "2026-10-16T08:00:00Z"
        }))
        .unwrap();
        let modal = ConversationModal::Ready {
            session,
            created_display: Some("10/16/2026, 8:00:00 AM".into()),
        };

        let value = serde_json::to_value(&modal).unwrap();
        assert_eq!(value["kind"], "ready");
        assert_eq!(value["session"]["conversation_id"], "c9");
        assert_eq!(value["created_display"], "10/16/2026, 8:00:00 AM");
    }

    #[tokio::test]
    async fn pending_network_call_does_not_block_the_window() {
        let transport = Arc::new(StalledTransport::default());
        let board = MoodBoard::new(online_config(), transport.clone());
        let overlay = BreathingOverlay::new(Arc::new(|| {
            Arc::new(SilentToneSink) as Arc<dyn ToneSink>
        }));
        let (controller, _) = overlay.open().await;

        let submitting = tokio::spawn({
            let board = board.clone();
            async move { board.submit("hello").await }
        });
        transport.entered.notified().await;

        let wait = Duration::from_secs(2);
        let toggled = timeout(wait, controller.toggle())
            .await
            .expect("breathing toggle while submit is in flight");
        assert!(toggled.running);

        let view = timeout(wait, board.view())
            .await
            .expect("view while submit is in flight");
        assert!(view.response.is_none());
        timeout(wait, board.reset())
            .await
            .expect("reset while submit is in flight");
        timeout(wait, overlay.close())
            .await
            .expect("close breathing while submit is in flight");

        assert!(!submitting.is_finished());
        submitting.abort();
    }
}
