use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::audio::Tone;

const INHALE_TONE_HZ: f32 = 220.0;
const EXHALE_TONE_HZ: f32 = 180.0;

const MIN_SCALE: f32 = 0.5;
const MAX_SCALE: f32 = 1.0;

/// One segment of the 4-7-8 cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Inhale,
    Hold,
    Exhale,
    Pause,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Pause
    }
}

impl Phase {
    pub fn duration_secs(self) -> u32 {
        match self {
            Phase::Inhale => 4,
            Phase::Hold => 7,
            Phase::Exhale => 8,
            Phase::Pause => 2,
        }
    }

    pub fn next(self) -> Phase {
        match self {
            Phase::Inhale => Phase::Hold,
            Phase::Hold => Phase::Exhale,
            Phase::Exhale => Phase::Pause,
            Phase::Pause => Phase::Inhale,
        }
    }

    /// Cue played when the phase begins. Hold and pause are silent.
    pub fn tone(self) -> Option<Tone> {
        let duration = Duration::from_secs(u64::from(self.duration_secs()));
        match self {
            Phase::Inhale => Some(Tone::new(INHALE_TONE_HZ, duration)),
            Phase::Exhale => Some(Tone::new(EXHALE_TONE_HZ, duration)),
            Phase::Hold | Phase::Pause => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Phase::Inhale => "Inhale",
            Phase::Hold => "Hold",
            Phase::Exhale => "Exhale",
            Phase::Pause => "Ready",
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Phase::Inhale => "Breathe in slowly through your nose...",
            Phase::Hold => "Hold your breath gently...",
            Phase::Exhale => "Exhale slowly through your mouth...",
            Phase::Pause => "Rest and prepare for the next breath...",
        }
    }

    /// Gradient stops for the breathing circle.
    pub fn gradient(self) -> (&'static str, &'static str) {
        match self {
            Phase::Inhale => ("#60a5fa", "#22d3ee"),
            Phase::Hold => ("#c084fc", "#f472b6"),
            Phase::Exhale => ("#4ade80", "#34d399"),
            Phase::Pause => ("#d1d5db", "#9ca3af"),
        }
    }
}

/// Timer state. `seconds_remaining` stays within `0..=phase.duration_secs()`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BreathingState {
    pub phase: Phase,
    pub seconds_remaining: u32,
    pub cycle_count: u32,
    pub running: bool,
    pub muted: bool,
}

impl BreathingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One elapsed second. Stopped timers are unchanged; a countdown that
    /// reaches zero moves to the next phase at full duration, counting a
    /// cycle each time an exhale completes.
    #[must_use]
    pub fn tick(self) -> Self {
        if !self.running {
            return self;
        }

        let remaining = self.seconds_remaining.saturating_sub(1);
        if remaining > 0 {
            return Self {
                seconds_remaining: remaining,
                ..self
            };
        }

        let next = self.phase.next();
        Self {
            phase: next,
            seconds_remaining: next.duration_secs(),
            cycle_count: if self.phase == Phase::Exhale {
                self.cycle_count + 1
            } else {
                self.cycle_count
            },
            ..self
        }
    }

    /// Begins (or resumes) at the top of an inhale. The cycle count is kept.
    #[must_use]
    pub fn start(self) -> Self {
        Self {
            phase: Phase::Inhale,
            seconds_remaining: Phase::Inhale.duration_secs(),
            running: true,
            ..self
        }
    }

    #[must_use]
    pub fn pause(self) -> Self {
        Self {
            running: false,
            ..self
        }
    }

    /// Back to the initial state. Mute is a preference and survives.
    #[must_use]
    pub fn reset(self) -> Self {
        Self {
            muted: self.muted,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn toggle_mute(self) -> Self {
        Self {
            muted: !self.muted,
            ..self
        }
    }

    /// Fraction of the current phase already elapsed, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        let duration = self.phase.duration_secs() as f32;
        let elapsed = duration - self.seconds_remaining.min(self.phase.duration_secs()) as f32;
        elapsed / duration
    }

    /// Circle scale: grows on inhale, full on hold, shrinks on exhale,
    /// small on pause.
    pub fn display_scale(&self) -> f32 {
        display_scale(self.phase, self.progress())
    }
}

pub fn display_scale(phase: Phase, progress: f32) -> f32 {
    let progress = progress.clamp(0.0, 1.0);
    let span = MAX_SCALE - MIN_SCALE;
    match phase {
        Phase::Inhale => MIN_SCALE + progress * span,
        Phase::Hold => MAX_SCALE,
        Phase::Exhale => MAX_SCALE - progress * span,
        Phase::Pause => MIN_SCALE,
    }
}

/// What the breathing overlay renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathingSnapshot {
    pub state: BreathingState,
    pub scale: f32,
    pub countdown: String,
    pub title: &'static str,
    pub instruction: &'static str,
    pub subtitle: String,
    pub gradient: (&'static str, &'static str),
}

impl From<BreathingState> for BreathingSnapshot {
    fn from(state: BreathingState) -> Self {
        let countdown = if state.seconds_remaining > 0 {
            state.seconds_remaining.to_string()
        } else {
            String::new()
        };
        let (instruction, subtitle) = if state.running {
            (
                state.phase.instruction(),
                format!("Cycle {}", state.cycle_count + 1),
            )
        } else {
            (
                "Let's take a deep breath together...",
                "Press play to begin your breathing journey".to_string(),
            )
        };

        Self {
            scale: state.display_scale(),
            countdown,
            title: state.phase.title(),
            instruction,
            subtitle,
            gradient: state.phase.gradient(),
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ticks(mut state: BreathingState, ticks: u32) -> BreathingState {
        for _ in 0..ticks {
            state = state.tick();
        }
        state
    }

    #[test]
    fn initial_state_is_idle_pause() {
        let state = BreathingState::new();
        assert_eq!(state.phase, Phase::Pause);
        assert_eq!(state.seconds_remaining, 0);
        assert_eq!(state.cycle_count, 0);
        assert!(!state.running);
        assert!(!state.muted);
    }

    #[test]
    fn ticks_are_ignored_while_stopped() {
        let state = BreathingState::new();
        assert_eq!(run_ticks(state, 50), state);

        let paused = run_ticks(BreathingState::new().start(), 3).pause();
        assert_eq!(run_ticks(paused, 10), paused);
    }

    #[test]
    fn full_cycle_returns_to_inhale_with_one_count() {
        let state = run_ticks(BreathingState::new().start(), 4 + 7 + 8 + 2);
        assert_eq!(state.phase, Phase::Inhale);
        assert_eq!(state.seconds_remaining, 4);
        assert_eq!(state.cycle_count, 1);
        assert!(state.running);
    }

    #[test]
    fn phases_follow_fixed_durations() {
        let mut state = BreathingState::new().start();
        let mut seen = vec![(state.phase, 0)];
        for second in 1..=42 {
            let next = state.tick();
            if next.phase != state.phase {
                seen.push((next.phase, second));
            }
            state = next;
        }
        assert_eq!(
            seen,
            vec![
                (Phase::Inhale, 0),
                (Phase::Hold, 4),
                (Phase::Exhale, 11),
                (Phase::Pause, 19),
                (Phase::Inhale, 21),
                (Phase::Hold, 25),
                (Phase::Exhale, 32),
                (Phase::Pause, 40),
                (Phase::Inhale, 42),
            ]
        );
        assert_eq!(state.cycle_count, 2);
    }

    #[test]
    fn remaining_stays_within_phase_bounds() {
        let mut state = BreathingState::new().start();
        for _ in 0..200 {
            assert!(state.seconds_remaining <= state.phase.duration_secs());
            assert!(state.seconds_remaining > 0);
            state = state.tick();
        }
    }

    #[test]
    fn cycle_counts_only_after_exhale() {
        // inhale + hold: no completed exhale yet
        let state = run_ticks(BreathingState::new().start(), 11);
        assert_eq!(state.phase, Phase::Exhale);
        assert_eq!(state.cycle_count, 0);
        let state = run_ticks(state, 8);
        assert_eq!(state.phase, Phase::Pause);
        assert_eq!(state.cycle_count, 1);
    }

    #[test]
    fn reset_from_any_point_restores_initial_state() {
        for ticks in [0, 1, 5, 13, 20, 37] {
            let state = run_ticks(BreathingState::new().start(), ticks).reset();
            assert_eq!(state, BreathingState::new());
        }
    }

    #[test]
    fn reset_keeps_mute_preference() {
        let state = BreathingState::new().toggle_mute().start().reset();
        assert!(state.muted);
        assert_eq!(state.phase, Phase::Pause);
    }

    #[test]
    fn restart_reenters_inhale_and_keeps_cycles() {
        let state = run_ticks(BreathingState::new().start(), 25).pause();
        assert_eq!(state.cycle_count, 1);
        let resumed = state.start();
        assert_eq!(resumed.phase, Phase::Inhale);
        assert_eq!(resumed.seconds_remaining, 4);
        assert_eq!(resumed.cycle_count, 1);
    }

    #[test]
    fn mute_does_not_change_timing() {
        let loud = run_ticks(BreathingState::new().start(), 17);
        let quiet = run_ticks(BreathingState::new().toggle_mute().start(), 17);
        assert_eq!(loud.phase, quiet.phase);
        assert_eq!(loud.seconds_remaining, quiet.seconds_remaining);
    }

    #[test]
    fn scale_interpolates_by_phase() {
        assert_eq!(display_scale(Phase::Inhale, 0.0), 0.5);
        assert_eq!(display_scale(Phase::Inhale, 0.5), 0.75);
        assert_eq!(display_scale(Phase::Inhale, 1.0), 1.0);
        assert_eq!(display_scale(Phase::Hold, 0.3), 1.0);
        assert_eq!(display_scale(Phase::Exhale, 0.0), 1.0);
        assert_eq!(display_scale(Phase::Exhale, 1.0), 0.5);
        assert_eq!(display_scale(Phase::Pause, 0.7), 0.5);
    }

    #[test]
    fn scale_follows_countdown() {
        let state = BreathingState::new().start();
        assert_eq!(state.display_scale(), 0.5);
        let state = state.tick().tick();
        assert_eq!(state.display_scale(), 0.75);
        assert_eq!(BreathingState::new().display_scale(), 0.5);
    }

    #[test]
    fn tones_only_for_inhale_and_exhale() {
        assert_eq!(Phase::Inhale.tone().unwrap().frequency_hz, 220.0);
        assert_eq!(Phase::Exhale.tone().unwrap().frequency_hz, 180.0);
        assert_eq!(
            Phase::Exhale.tone().unwrap().duration,
            Duration::from_secs(8)
        );
        assert!(Phase::Hold.tone().is_none());
        assert!(Phase::Pause.tone().is_none());
    }

    #[test]
    fn snapshot_text_depends_on_running() {
        let idle = BreathingSnapshot::from(BreathingState::new());
        assert_eq!(idle.countdown, "");
        assert_eq!(idle.title, "Ready");
        assert_eq!(idle.instruction, "Let's take a deep breath together...");

        let running = BreathingSnapshot::from(BreathingState::new().start());
        assert_eq!(running.countdown, "4");
        assert_eq!(running.title, "Inhale");
        assert_eq!(running.instruction, "Breathe in slowly through your nose...");
        assert_eq!(running.subtitle, "Cycle 1");
    }
}
