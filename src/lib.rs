//! # persona-journey
//!
//! Simulates synthetic personas pursuing a goal through a web flow.  Each
//! persona carries a trait vector that drives a cognitive state (patience,
//! confusion, frustration, attention, decision fatigue), an appraisal-based
//! emotional state and a motor timing model.  An external decision oracle
//! plays the persona's mind one step at a time; the engine turns its replies
//! into state changes, friction points and an abandonment verdict.
//!
//! ```text
//! Persona ──► Journey ──step──► PageSnapshot ──► DecisionOracle
//!                ▲                                   │
//!                └── CognitiveState ◄── Decision ◄───┘
//!                        │
//!                        └──► Abandonment rules ──► JourneyResult
//! ```

pub mod abandonment;
pub mod cognitive;
pub mod config;
pub mod emotion;
pub mod executor;
pub mod journey;
pub mod oracle;
pub mod persona;
pub mod timing;

pub use abandonment::{AbandonmentReason, AbandonmentThresholds};
pub use cognitive::CognitiveState;
pub use config::{JourneyConfig, SimulationConfig};
pub use emotion::{Emotion, EmotionalState};
pub use executor::{Action, ActionExecutor, PageSnapshot};
pub use journey::{run_cohort, CohortReport, Journey, JourneyError, JourneyOutcome, JourneyResult};
pub use oracle::{DecisionOracle, DecisionRequest};
pub use persona::{Persona, TraitVector};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
