//! Cognitive model of a persona mid-journey.
//!
//! [`CognitiveState`] is the mutable root; [`attention`] holds the visual
//! sub-models and [`update`] the per-step transition pipeline.

pub mod attention;
pub mod state;
pub mod update;

pub use attention::{
    scan_width_multiplier, yerkes_dodson, BaseScanPattern, Habituation, PeripheralVision,
    ScanPattern, UiPattern,
};
pub use state::{
    ActionRecord, CognitiveMode, CognitiveState, DecisionFatigue, ErrorRecord, Memory, Mood,
    ProcessingSystem, StateSample, DEFAULTS_FATIGUE_THRESHOLD,
};
pub use update::{fatigue_increment, Appraisal};
