//! Appraisal transitions: triggers, decay toward baseline, and the
//! emotional inputs to the abandonment decision.
//!
//! Every function here is pure: it takes a state and returns a new one.
//! The cognitive state owns the current [`EmotionalState`] and replaces it
//! with the returned value.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::{Emotion, EmotionalState, Intensities};
use crate::persona::TraitVector;

// ============================================================================
// Triggers
// ============================================================================

/// Closed set of appraisal triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Error,
    Failure,
    Progress,
    ConfusionOnset,
    Setback,
    TimePressure,
    Success,
}

impl Trigger {
    pub const ALL: [Trigger; 7] = [
        Self::Error,
        Self::Failure,
        Self::Progress,
        Self::ConfusionOnset,
        Self::Setback,
        Self::TimePressure,
        Self::Success,
    ];

    /// Per-unit change over the tracked emotions, in
    /// `[anxiety, frustration, boredom, confusion, satisfaction, excitement, relief]`
    /// order.
    pub fn direction(&self) -> [f64; 7] {
        match self {
            Self::Error => [0.15, 0.20, 0.0, 0.05, -0.10, -0.05, -0.05],
            Self::Failure => [0.10, 0.15, 0.05, 0.0, -0.10, -0.10, 0.0],
            Self::Progress => [-0.10, -0.10, -0.05, -0.05, 0.15, 0.10, 0.05],
            Self::ConfusionOnset => [0.05, 0.0, 0.0, 0.20, -0.05, 0.0, 0.0],
            Self::Setback => [0.05, 0.15, 0.05, 0.0, -0.10, -0.10, 0.0],
            Self::TimePressure => [0.15, 0.05, -0.05, 0.0, 0.0, 0.0, 0.0],
            Self::Success => [-0.05, -0.05, 0.05, -0.05, 0.05, -0.02, 0.10],
        }
    }

    /// Default event description.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Error => "Ran into an error",
            Self::Failure => "Action did not work",
            Self::Progress => "Made progress toward the goal",
            Self::ConfusionOnset => "Started to feel lost",
            Self::Setback => "Things got more annoying",
            Self::TimePressure => "Running out of patience",
            Self::Success => "Action worked as expected",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Failure => "failure",
            Self::Progress => "progress",
            Self::ConfusionOnset => "confusion_onset",
            Self::Setback => "setback",
            Self::TimePressure => "time_pressure",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the emotional journey log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalEvent {
    pub step_number: u32,
    pub trigger: Trigger,
    pub description: String,
    pub severity: f64,
}

// ============================================================================
// Trait-derived configuration
// ============================================================================

/// Trait-derived multipliers and baselines for one persona.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalConfig {
    /// Scales every change (emotional contagion), 0.5–1.5.
    pub intensity_multiplier: f64,
    /// Extra scale on rises of negative emotions, 0.8–1.2.
    pub negative_sensitivity: f64,
    /// Extra scale on rises of positive emotions, 0.8–1.2.
    pub positive_sensitivity: f64,
    /// Fraction of the distance to baseline closed per step, 0.05–0.15.
    pub decay_rate: f64,
    /// Resting intensities the state decays toward.
    pub baseline: Intensities,
}

impl EmotionalConfig {
    pub fn from_traits(t: &TraitVector) -> Self {
        let baseline = Intensities {
            anxiety: 0.10 * (1.0 - t.self_efficacy) + 0.05 * (1.0 - t.risk_tolerance),
            frustration: 0.08 * (1.0 - t.patience),
            boredom: 0.08 * (1.0 - t.curiosity),
            confusion: 0.08 * (1.0 - t.comprehension),
            satisfaction: 0.05 + 0.05 * t.self_efficacy,
            excitement: 0.08 * t.curiosity,
            relief: 0.0,
        };
        Self {
            intensity_multiplier: 0.5 + t.emotional_contagion,
            negative_sensitivity: 1.2 - 0.4 * t.resilience,
            positive_sensitivity: 0.8 + 0.4 * t.self_efficacy,
            decay_rate: 0.05 + 0.10 * t.resilience,
            baseline: baseline.clamped(),
        }
    }

    /// The state a journey starts in.
    pub fn initial_state(&self) -> EmotionalState {
        EmotionalState::from_intensities(self.baseline)
    }
}

impl Default for EmotionalConfig {
    fn default() -> Self {
        Self::from_traits(&TraitVector::default())
    }
}

// ============================================================================
// Transitions
// ============================================================================

/// Apply a trigger.
///
/// `severity` defaults to 1.0; negative or non-finite severities count as 0.
/// The description defaults to the trigger's own.
pub fn apply_trigger(
    state: &EmotionalState,
    trigger: Trigger,
    config: &EmotionalConfig,
    step: u32,
    severity: Option<f64>,
    description: Option<&str>,
) -> (EmotionalState, EmotionalEvent) {
    let severity = match severity {
        Some(s) if s.is_finite() => s.max(0.0),
        Some(_) => 0.0,
        None => 1.0,
    };

    let mut values = state.intensities.to_array();
    for (i, delta) in trigger.direction().iter().enumerate() {
        let emotion = Emotion::TRACKED[i];
        let mut change = delta * severity * config.intensity_multiplier;
        if *delta > 0.0 {
            change *= if emotion.is_positive() {
                config.positive_sensitivity
            } else {
                config.negative_sensitivity
            };
        }
        values[i] += change;
    }

    let next = EmotionalState::from_intensities(Intensities::from_array(values));
    let event = EmotionalEvent {
        step_number: step,
        trigger,
        description: description.unwrap_or(trigger.describe()).to_string(),
        severity,
    };
    (next, event)
}

/// Move every intensity a fixed fraction toward its baseline.
pub fn decay_emotions(state: &EmotionalState, config: &EmotionalConfig) -> EmotionalState {
    let rate = config.decay_rate.clamp(0.0, 1.0);
    let baseline = config.baseline.to_array();
    let mut values = state.intensities.to_array();
    for (v, b) in values.iter_mut().zip(baseline) {
        *v += (b - *v) * rate;
    }
    EmotionalState::from_intensities(Intensities::from_array(values))
}

/// Emotional combinations that justify considering abandonment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalConcern {
    /// Anxiety > 0.7 and frustration > 0.6.
    AnxiousAndFrustrated,
    /// Boredom > 0.8 and excitement < 0.2.
    Disengaged,
    /// Valence < -0.7 and arousal > 0.7.
    Overwhelmed,
}

impl EmotionalConcern {
    pub fn message(&self) -> &'static str {
        match self {
            Self::AnxiousAndFrustrated => {
                "Too anxious and frustrated to keep going; this feels like it will not work out"
            }
            Self::Disengaged => "Completely bored; this is not worth the effort anymore",
            Self::Overwhelmed => "Overwhelmed by how bad this experience feels",
        }
    }
}

/// Check the three emotional abandonment combinations, in order.
pub fn should_consider_abandonment(state: &EmotionalState) -> Option<EmotionalConcern> {
    let i = &state.intensities;
    if i.anxiety > 0.7 && i.frustration > 0.6 {
        Some(EmotionalConcern::AnxiousAndFrustrated)
    } else if i.boredom > 0.8 && i.excitement < 0.2 {
        Some(EmotionalConcern::Disengaged)
    } else if state.valence < -0.7 && state.arousal > 0.7 {
        Some(EmotionalConcern::Overwhelmed)
    } else {
        None
    }
}

/// Multiplier (≥ 1) applied to the patience floor as negative, aroused
/// states deepen.  Ranges up to 2.0.
pub fn calculate_abandonment_modifier(state: &EmotionalState) -> f64 {
    let negativity = (-state.valence).max(0.0);
    let i = &state.intensities;
    1.0 + 0.6 * negativity * state.arousal + 0.4 * i.anxiety * i.frustration
}

// ============================================================================
// Tests
// ============================================================================
