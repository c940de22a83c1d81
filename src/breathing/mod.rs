#[cfg(feature = "desktop")]
pub mod commands;
pub mod controller;
pub mod overlay;
pub mod state;

pub use controller::BreathingController;
pub use overlay::BreathingOverlay;
pub use state::{display_scale, BreathingSnapshot, BreathingState, Phase};
