use tauri::{AppHandle, Emitter, State};

use crate::{
    breathing::{BreathingController, BreathingSnapshot, BreathingState},
    AppState,
};

pub const BREATHING_STATE_EVENT: &str = "breathing-state-changed";

async fn controller_from_state(
    state: &State<'_, AppState>,
) -> Result<BreathingController, String> {
    state
        .breathing
        .current()
        .await
        .ok_or_else(|| "breathing guide is not open".to_string())
}

fn emit_breathing_state(app_handle: &AppHandle, state: BreathingState) {
    let _ = app_handle.emit(BREATHING_STATE_EVENT, BreathingSnapshot::from(state));
}

/// Forwards every published state to the window until the controller is
/// released and dropped.
fn spawn_forwarder(app_handle: AppHandle, controller: &BreathingController) {
    let mut updates = controller.subscribe();
    tauri::async_runtime::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = *updates.borrow_and_update();
            emit_breathing_state(&app_handle, state);
        }
    });
}

#[tauri::command]
pub async fn open_breathing(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<BreathingSnapshot, String> {
    let (controller, opened) = state.breathing.open().await;
    if opened {
        spawn_forwarder(app_handle, &controller);
    }
    Ok(controller.get_state().await.into())
}

#[tauri::command]
pub async fn close_breathing(state: State<'_, AppState>) -> Result<(), String> {
    state.breathing.close().await;
    Ok(())
}

#[tauri::command]
pub async fn get_breathing_state(
    state: State<'_, AppState>,
) -> Result<BreathingSnapshot, String> {
    let controller = controller_from_state(&state).await?;
    Ok(controller.get_state().await.into())
}

#[tauri::command]
pub async fn toggle_breathing(
    state: State<'_, AppState>,
) -> Result<BreathingSnapshot, String> {
    let controller = controller_from_state(&state).await?;
    Ok(controller.toggle().await.into())
}

#[tauri::command]
pub async fn reset_breathing(
    state: State<'_, AppState>,
) -> Result<BreathingSnapshot, String> {
    let controller = controller_from_state(&state).await?;
    Ok(controller.reset().await.into())
}

#[tauri::command]
pub async fn toggle_breathing_mute(
    state: State<'_, AppState>,
) -> Result<BreathingSnapshot, String> {
    let controller = controller_from_state(&state).await?;
    Ok(controller.toggle_mute().await.into())
}
