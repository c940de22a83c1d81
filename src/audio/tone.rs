use serde::Serialize;
use std::f32::consts::PI;
use std::time::Duration;

pub const SAMPLE_RATE: u32 = 44100;

const PEAK_GAIN: f32 = 0.1;
const SUSTAIN_GAIN: f32 = 0.05;
const RAMP_SECS: f32 = 0.5;

/// A sine tone with a breathing-shaped envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
}

impl Tone {
    pub fn new(frequency_hz: f32, duration: Duration) -> Self {
        Self {
            frequency_hz,
            duration,
        }
    }
}

/// Gain at `t` seconds into a tone lasting `duration` seconds.
///
/// Rises 0 → 0.1 over the first half second, eases to 0.05 by half a second
/// before the end, then fades to 0.
pub fn envelope_gain(t: f32, duration: f32) -> f32 {
    if t <= 0.0 || t >= duration {
        return 0.0;
    }
    if t < RAMP_SECS {
        return PEAK_GAIN * t / RAMP_SECS;
    }

    let release_start = (duration - RAMP_SECS).max(RAMP_SECS);
    if t < release_start {
        let span = release_start - RAMP_SECS;
        if span <= f32::EPSILON {
            return PEAK_GAIN;
        }
        return PEAK_GAIN + (SUSTAIN_GAIN - PEAK_GAIN) * (t - RAMP_SECS) / span;
    }

    let tail = duration - release_start;
    let from = if release_start > RAMP_SECS {
        SUSTAIN_GAIN
    } else {
        PEAK_GAIN
    };
    from * (duration - t) / tail
}

/// Finite mono sample stream for a [`Tone`].
pub struct ToneSource {
    frequency_hz: f32,
    duration_secs: f32,
    sample_rate: u32,
    num_sample: usize,
    total_samples: usize,
}

impl ToneSource {
    pub fn new(tone: Tone) -> Self {
        let duration_secs = tone.duration.as_secs_f32();
        Self {
            frequency_hz: tone.frequency_hz,
            duration_secs,
            sample_rate: SAMPLE_RATE,
            num_sample: 0,
            total_samples: (duration_secs * SAMPLE_RATE as f32) as usize,
        }
    }
}

impl Iterator for ToneSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }

        let t = self.num_sample as f32 / self.sample_rate as f32;
        self.num_sample += 1;

        let gain = envelope_gain(t, self.duration_secs);
        Some((2.0 * PI * self.frequency_hz * t).sin() * gain)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_samples.saturating_sub(self.num_sample);
        (remaining, Some(remaining))
    }
}

#[cfg(feature = "audio")]
impl rodio::Source for ToneSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples.saturating_sub(self.num_sample))
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(self.duration_secs))
    }
}
