pub mod audio;
pub mod board;
pub mod breathing;
pub mod classifier;
pub mod config;
pub mod conversation;
pub mod emotion;
pub mod fetch;
pub mod recommend;
pub mod transport;
pub mod utils;

pub use board::{
    BoardError, BoardView, ConversationModal, ConversationView, EmotionalResponse, MoodBoard,
};
pub use config::AppConfig;
pub use emotion::Emotion;

#[cfg(feature = "desktop")]
pub use desktop::run;

#[cfg(feature = "desktop")]
pub(crate) use desktop::AppState;

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::Arc;

    use tauri::{AppHandle, Manager, State};
    use tauri_plugin_opener::OpenerExt;

    use crate::{
        audio,
        board::{BoardView, ConversationModal, ConversationView, EmotionalResponse, MoodBoard},
        breathing::{
            commands::{
                close_breathing, get_breathing_state, open_breathing, reset_breathing,
                toggle_breathing, toggle_breathing_mute,
            },
            BreathingOverlay,
        },
        config::AppConfig,
    };

    pub(crate) struct AppState {
        pub(crate) board: MoodBoard,
        pub(crate) breathing: BreathingOverlay,
    }

    fn open_external(app_handle: &AppHandle, url: &str) -> Result<(), String> {
        app_handle
            .opener()
            .open_url(url, None::<&str>)
            .map_err(|e| e.to_string())
    }

    #[tauri::command]
    async fn get_view_state(state: State<'_, AppState>) -> Result<BoardView, String> {
        Ok(state.board.view().await)
    }

    #[tauri::command]
    async fn submit_mood(
        state: State<'_, AppState>,
        text: String,
    ) -> Result<EmotionalResponse, String> {
        state.board.submit(&text).await.map_err(|e| e.to_string())
    }

    #[tauri::command]
    async fn reset_mood(state: State<'_, AppState>) -> Result<BoardView, String> {
        Ok(state.board.reset().await)
    }

    #[tauri::command]
    async fn youtube_link(state: State<'_, AppState>) -> Result<Option<String>, String> {
        Ok(state
            .board
            .response()
            .await
            .as_ref()
            .map(EmotionalResponse::youtube_url))
    }

    #[tauri::command]
    async fn open_song_search(
        state: State<'_, AppState>,
        app_handle: AppHandle,
    ) -> Result<(), String> {
        let url = state
            .board
            .response()
            .await
            .as_ref()
            .map(EmotionalResponse::youtube_url)
            .ok_or_else(|| "no song has been recommended yet".to_string())?;
        open_external(&app_handle, &url)
    }

    #[tauri::command]
    async fn start_conversation(state: State<'_, AppState>) -> Result<ConversationModal, String> {
        state
            .board
            .start_conversation()
            .await
            .map_err(|e| e.to_string())
    }

    #[tauri::command]
    async fn open_conversation_window(
        state: State<'_, AppState>,
        app_handle: AppHandle,
    ) -> Result<String, String> {
        let url = state
            .board
            .begin_conversation(ConversationView::Window)
            .await
            .map_err(|e| e.to_string())?;
        open_external(&app_handle, &url)?;
        Ok(url)
    }

    #[tauri::command]
    async fn embed_conversation(state: State<'_, AppState>) -> Result<String, String> {
        state
            .board
            .begin_conversation(ConversationView::Embedded)
            .await
            .map_err(|e| e.to_string())
    }

    #[tauri::command]
    async fn close_conversation(state: State<'_, AppState>) -> Result<(), String> {
        state.board.close_conversation().await;
        Ok(())
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        let config = AppConfig::from_env();

        // Initialize logging (reads RUST_LOG env var)
        let level = if config.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();

        log::info!("Sound Heal starting up...");
        for missing in config.missing_credentials() {
            log::info!("No {missing} credentials; using local fallbacks");
        }

        tauri::Builder::default()
            .plugin(tauri_plugin_opener::init())
            .setup(move |app| {
                let result = (|| -> anyhow::Result<()> {
                    let board = MoodBoard::from_config(config)?;
                    app.manage(AppState {
                        board,
                        breathing: BreathingOverlay::new(Arc::new(audio::output_tone_sink)),
                    });
                    Ok(())
                })();

                result.map_err(|err| err.into())
            })
            .invoke_handler(tauri::generate_handler![
                get_view_state,
                submit_mood,
                reset_mood,
                youtube_link,
                open_song_search,
                start_conversation,
                open_conversation_window,
                embed_conversation,
                close_conversation,
                open_breathing,
                close_breathing,
                get_breathing_state,
                toggle_breathing,
                reset_breathing,
                toggle_breathing_mute,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}
