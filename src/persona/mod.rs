//! Persona system: who is navigating and how they are disposed.
//!
//! ```text
//! PersonaDefinition { name, description, traits (partial map), demographics }
//!   ↓  TraitVector::from_map (defaults, clamping)
//! Persona { TraitVector (25 scalars), Demographics }
//!   ↓  consumed once at journey start
//! AbandonmentThresholds · EmotionalConfig · CognitiveState · MotorProfile
//! ```

pub mod profile;
pub mod traits;

pub use profile::{Demographics, Persona, PersonaDefinition};
pub use traits::{TraitVector, TRAIT_NAMES};
