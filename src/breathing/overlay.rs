use log::debug;
use tokio::sync::Mutex;

use crate::audio::ToneSinkFactory;

use super::BreathingController;

/// The breathing overlay's lifetime: a controller and its audio sink exist
/// only between `open` and `close`.
pub struct BreathingOverlay {
    tone_sinks: ToneSinkFactory,
    controller: Mutex<Option<BreathingController>>,
}

impl BreathingOverlay {
    pub fn new(tone_sinks: ToneSinkFactory) -> Self {
        Self {
            tone_sinks,
            controller: Mutex::new(None),
        }
    }

    /// Returns the open controller, creating it first if the overlay was
    /// closed. The flag is `true` when this call did the opening.
    pub async fn open(&self) -> (BreathingController, bool) {
        let mut guard = self.controller.lock().await;
        if let Some(controller) = guard.as_ref() {
            return (controller.clone(), false);
        }
        let controller = BreathingController::new((self.tone_sinks)());
        *guard = Some(controller.clone());
        debug!("Breathing overlay opened");
        (controller, true)
    }

    pub async fn current(&self) -> Option<BreathingController> {
        self.controller.lock().await.clone()
    }

    /// Stops the timer and frees its audio sink. No-op when already closed.
    pub async fn close(&self) {
        let controller = self.controller.lock().await.take();
        if let Some(controller) = controller {
            controller.release().await;
            debug!("Breathing overlay closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SilentToneSink, ToneSink};
    use std::sync::Arc;
    use std::time::Duration;

    fn overlay() -> BreathingOverlay {
        BreathingOverlay::new(Arc::new(|| Arc::new(SilentToneSink) as Arc<dyn ToneSink>))
    }

    #[tokio::test]
    async fn reopening_returns_the_open_controller() {
        let overlay = overlay();
        let (first, opened) = overlay.open().await;
        assert!(opened);

        first.toggle_mute().await;
        let (second, opened) = overlay.open().await;
        assert!(!opened);
        assert!(second.get_state().await.muted);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_is_scoped_to_open_and_close() {
        let overlay = overlay();

        for _ in 0..3 {
            let (controller, opened) = overlay.open().await;
            assert!(opened);
            controller.start().await;
            tokio::time::sleep(Duration::from_secs(3)).await;

            overlay.close().await;
            assert!(overlay.current().await.is_none());
            assert!(!controller.is_ticking().await);
            assert!(!controller.get_state().await.running);
        }
    }

    #[tokio::test]
    async fn close_without_open_is_harmless() {
        let overlay = overlay();
        overlay.close().await;
        assert!(overlay.current().await.is_none());
    }
}
