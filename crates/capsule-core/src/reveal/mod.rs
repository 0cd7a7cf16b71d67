//! Reveal orchestration: the interactive sequence that takes a viewer
//! from a locked capsule to revealed content.

pub mod animation;
pub mod session;

pub use animation::{AnimationClip, AnimationSequencer, AnimationSignal, PlaybackHandle};
pub use session::{AssetOutcome, Phase, RevealSession};
