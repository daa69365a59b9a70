//! Emotional appraisal: seven discrete emotions with a valence/arousal
//! summary, trigger-driven transitions and per-step decay to a persona
//! baseline.
//!
//! ```text
//! TraitVector ─► EmotionalConfig { multipliers, decay rate, baseline }
//!                    │
//! observed step ─► Trigger ─► apply_trigger ─► decay_emotions ─► EmotionalState
//!                                  │
//!                                  └─► EmotionalEvent (journey log)
//! ```

pub mod appraisal;
pub mod state;

pub use appraisal::{
    apply_trigger, calculate_abandonment_modifier, decay_emotions, should_consider_abandonment,
    EmotionalConcern, EmotionalConfig, EmotionalEvent, Trigger,
};
pub use state::{Emotion, EmotionalState, Intensities, NEUTRAL_FLOOR};
