use std::{sync::Arc, time::Duration};

use log::{debug, info};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::audio::ToneSink;

use super::{BreathingState, Phase};

/// The running one-second tick task. Dropping it stops the task.
struct Ticker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

/// Drives a [`BreathingState`] in real time.
///
/// Owns at most one tick task; start, pause, reset and release each cancel
/// the current task before installing a new one. Every state change is
/// published on a watch channel for the view.
#[derive(Clone)]
pub struct BreathingController {
    state: Arc<Mutex<BreathingState>>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    updates: Arc<watch::Sender<BreathingState>>,
    tones: Arc<dyn ToneSink>,
    tick_interval: Duration,
}

impl BreathingController {
    pub fn new(tones: Arc<dyn ToneSink>) -> Self {
        let (updates, _) = watch::channel(BreathingState::new());
        Self {
            state: Arc::new(Mutex::new(BreathingState::new())),
            ticker: Arc::new(Mutex::new(None)),
            updates: Arc::new(updates),
            tones,
            tick_interval: Duration::from_secs(1),
        }
    }

    pub async fn get_state(&self) -> BreathingState {
        *self.state.lock().await
    }

    pub fn subscribe(&self) -> watch::Receiver<BreathingState> {
        self.updates.subscribe()
    }

    pub async fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .map(|ticker| !ticker.handle.is_finished())
            .unwrap_or(false)
    }

    /// Play/pause button.
    pub async fn toggle(&self) -> BreathingState {
        if self.get_state().await.running {
            self.pause().await
        } else {
            self.start().await
        }
    }

    pub async fn start(&self) -> BreathingState {
        let started = {
            let mut guard = self.state.lock().await;
            if guard.running {
                return *guard;
            }
            *guard = guard.start();
            *guard
        };

        self.cue(started.phase, started.muted);
        self.spawn_ticker().await;
        self.publish(started);
        info!("Breathing started (cycle {})", started.cycle_count + 1);
        started
    }

    pub async fn pause(&self) -> BreathingState {
        self.cancel_ticker().await;
        let paused = {
            let mut guard = self.state.lock().await;
            *guard = guard.pause();
            *guard
        };
        self.publish(paused);
        paused
    }

    pub async fn reset(&self) -> BreathingState {
        self.cancel_ticker().await;
        let reset = {
            let mut guard = self.state.lock().await;
            *guard = guard.reset();
            *guard
        };
        self.tones.silence();
        self.publish(reset);
        reset
    }

    pub async fn toggle_mute(&self) -> BreathingState {
        let toggled = {
            let mut guard = self.state.lock().await;
            *guard = guard.toggle_mute();
            *guard
        };
        self.publish(toggled);
        toggled
    }

    /// Stops the tick task and frees the audio device. Called when the
    /// breathing overlay closes.
    pub async fn release(&self) {
        self.reset().await;
        self.tones.release();
        debug!("Breathing controller released");
    }

    fn cue(&self, phase: Phase, muted: bool) {
        if muted {
            return;
        }
        if let Some(tone) = phase.tone() {
            self.tones.play(tone);
        }
    }

    fn publish(&self, state: BreathingState) {
        self.updates.send_replace(state);
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(old) = ticker_guard.take() {
            drop(old);
        }

        let state = self.state.clone();
        let updates = self.updates.clone();
        let tones = self.tones.clone();
        let tick_interval = self.tick_interval;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + tick_interval, tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = token.cancelled() => break,
                }

                let (before, after) = {
                    let mut guard = state.lock().await;
                    if !guard.running {
                        break;
                    }
                    let before = *guard;
                    *guard = before.tick();
                    (before, *guard)
                };

                if after.phase != before.phase && !after.muted {
                    if let Some(tone) = after.phase.tone() {
                        tones.play(tone);
                    }
                }

                updates.send_replace(after);
            }
        });

        *ticker_guard = Some(Ticker { handle, cancel });
    }

    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            drop(ticker);
        }
    }
}
