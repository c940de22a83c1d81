pub mod tone;

pub use tone::{Tone, ToneSource};

use std::sync::Arc;

/// Where the breathing timer sends its cues. Playback is best effort: an
/// implementation that cannot reach an output device drops the tone.
pub trait ToneSink: Send + Sync {
    fn play(&self, tone: Tone);

    /// Cuts off whatever is currently sounding.
    fn silence(&self);

    /// Frees the output device. Later calls to `play` may reacquire it.
    fn release(&self);
}

/// Builds a fresh sink each time an overlay that plays tones is opened.
pub type ToneSinkFactory = Arc<dyn Fn() -> Arc<dyn ToneSink> + Send + Sync>;

/// Sink used when the crate is built without audio output.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentToneSink;

impl ToneSink for SilentToneSink {
    fn play(&self, _tone: Tone) {}

    fn silence(&self) {}

    fn release(&self) {}
}

/// Fresh sink for the system output device, or a silent one when audio
/// support is compiled out.
pub fn output_tone_sink() -> Arc<dyn ToneSink> {
    #[cfg(feature = "audio")]
    {
        Arc::new(engine::AudioEngineHandle::new())
    }

    #[cfg(not(feature = "audio"))]
    {
        Arc::new(SilentToneSink)
    }
}

#[cfg(feature = "audio")]
pub use engine::AudioEngineHandle;

#[cfg(feature = "audio")]
mod engine {
    use log::{debug, error, warn};
    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use std::sync::{
        mpsc::{self, Sender},
        Mutex,
    };
    use std::thread::{self, JoinHandle};

    use super::{Tone, ToneSink, ToneSource};

    enum AudioCommand {
        Play(Tone),
        Silence,
        Shutdown,
    }

    struct Worker {
        tx: Sender<AudioCommand>,
        handle: JoinHandle<()>,
    }

    /// Owns a dedicated `audio-engine` thread holding the non-`Send` output
    /// stream. The thread starts on the first tone and is joined on
    /// [`ToneSink::release`] or drop.
    pub struct AudioEngineHandle {
        worker: Mutex<Option<Worker>>,
    }

    impl AudioEngineHandle {
        pub fn new() -> Self {
            Self {
                worker: Mutex::new(None),
            }
        }

        fn send(&self, cmd: AudioCommand) -> Result<(), String> {
            let mut guard = self.worker.lock().map_err(|e| e.to_string())?;
            if guard.is_none() {
                *guard = Some(spawn_worker()?);
            }
            match guard.as_ref() {
                Some(worker) => worker.tx.send(cmd).map_err(|e| e.to_string()),
                None => Ok(()),
            }
        }

        fn shutdown(&self) {
            let worker = match self.worker.lock() {
                Ok(mut guard) => guard.take(),
                Err(poisoned) => poisoned.into_inner().take(),
            };

            if let Some(worker) = worker {
                let _ = worker.tx.send(AudioCommand::Shutdown);
                if let Err(join_err) = worker.handle.join() {
                    error!("Failed to join audio thread: {join_err:?}");
                }
            }
        }
    }

    impl Default for AudioEngineHandle {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Drop for AudioEngineHandle {
        fn drop(&mut self) {
            self.shutdown();
        }
    }

    impl ToneSink for AudioEngineHandle {
        fn play(&self, tone: Tone) {
            if let Err(err) = self.send(AudioCommand::Play(tone)) {
                warn!("Skipping tone: {err}");
            }
        }

        fn silence(&self) {
            let has_worker = self
                .worker
                .lock()
                .map(|guard| guard.is_some())
                .unwrap_or(false);
            if has_worker {
                let _ = self.send(AudioCommand::Silence);
            }
        }

        fn release(&self) {
            self.shutdown();
        }
    }

    fn spawn_worker() -> Result<Worker, String> {
        let (tx, rx) = mpsc::channel::<AudioCommand>();

        let handle = thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut output: Option<(OutputStream, OutputStreamHandle)> = None;
                let mut sink: Option<Sink> = None;
                let mut unavailable = false;

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Play(tone) => {
                            if unavailable {
                                continue;
                            }
                            if output.is_none() {
                                match OutputStream::try_default() {
                                    Ok(opened) => output = Some(opened),
                                    Err(e) => {
                                        warn!("Audio output unavailable, tones disabled: {e}");
                                        unavailable = true;
                                        continue;
                                    }
                                }
                            }
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            if let Some((_, handle)) = output.as_ref() {
                                match Sink::try_new(handle) {
                                    Ok(new_sink) => {
                                        debug!("Playing {} Hz tone", tone.frequency_hz);
                                        new_sink.append(ToneSource::new(tone));
                                        sink = Some(new_sink);
                                    }
                                    Err(e) => warn!("Failed to create audio sink: {e}"),
                                }
                            }
                        }
                        AudioCommand::Silence => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                        }
                        AudioCommand::Shutdown => break,
                    }
                }

                if let Some(old) = sink.take() {
                    old.stop();
                }
            })
            .map_err(|e| e.to_string())?;

        Ok(Worker { tx, handle })
    }
}
