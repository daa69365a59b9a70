//! Abandonment decision engine.
//!
//! [`AbandonmentThresholds`] are derived once per journey from the persona's
//! traits; [`evaluate`] is a pure function of the current
//! [`CognitiveState`] and those thresholds.  Rules are checked in a fixed
//! priority order and the first match wins.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cognitive::{CognitiveState, Memory};
use crate::emotion::{calculate_abandonment_modifier, should_consider_abandonment};
use crate::persona::TraitVector;

/// Pages inspected by loop detection.
pub const LOOP_WINDOW: usize = 5;
/// Goal progress under which a long journey counts as going nowhere.
pub const NO_PROGRESS_FLOOR: f64 = 0.1;
/// Modifier above which emotions start eating into the patience floor.
pub const EMOTIONAL_MODIFIER_TRIGGER: f64 = 1.3;

// ============================================================================
// Thresholds
// ============================================================================

/// Per-persona limits.  Immutable for the journey.
///
/// Bucketed on coarse trait bands (`< 0.3`, `> 0.7`) rather than smooth
/// curves; the band edges decide the documented scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbandonmentThresholds {
    pub patience_min: f64,
    pub confusion_max: f64,
    pub frustration_max: f64,
    pub max_steps_without_progress: u32,
    pub loop_detection_threshold: usize,
    /// Simulated seconds.
    pub time_limit: f64,
    pub decision_fatigue_max: f64,
}

impl AbandonmentThresholds {
    /// Derive thresholds; `time_limit` overrides the patience-based limit.
    pub fn from_traits(traits: &TraitVector, time_limit: Option<f64>) -> Self {
        let default_limit = if traits.patience > 0.7 {
            180.0
        } else if traits.patience < 0.3 {
            60.0
        } else {
            120.0
        };
        Self {
            patience_min: 0.1,
            confusion_max: if traits.comprehension < 0.4 { 0.6 } else { 0.8 },
            frustration_max: if traits.patience < 0.3 { 0.7 } else { 0.85 },
            max_steps_without_progress: if traits.persistence > 0.7 { 15 } else { 10 },
            loop_detection_threshold: 3,
            time_limit: time_limit.unwrap_or(default_limit),
            decision_fatigue_max: if traits.persistence > 0.7 {
                0.95
            } else if traits.persistence < 0.3 {
                0.7
            } else {
                0.85
            },
        }
    }
}

// ============================================================================
// Verdict
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonmentReason {
    Patience,
    Confusion,
    Frustration,
    DecisionFatigue,
    Loop,
    NoProgress,
    Emotional,
    /// Simulated time ran past the limit.
    Timeout,
}

impl AbandonmentReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patience => "patience",
            Self::Confusion => "confusion",
            Self::Frustration => "frustration",
            Self::DecisionFatigue => "decision_fatigue",
            Self::Loop => "loop",
            Self::NoProgress => "no_progress",
            Self::Emotional => "emotional",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for AbandonmentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal abandonment decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub reason: AbandonmentReason,
    pub message: String,
}

impl Verdict {
    fn new(reason: AbandonmentReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

// ============================================================================
// Evaluation
// ============================================================================

/// Run the abandonment rules in priority order.  `None` means keep going.
pub fn evaluate(state: &CognitiveState, thresholds: &AbandonmentThresholds) -> Option<Verdict> {
    use AbandonmentReason::*;

    if state.patience_remaining < thresholds.patience_min {
        return Some(Verdict::new(Patience, "Lost patience and gave up"));
    }
    if state.confusion_level > thresholds.confusion_max {
        return Some(Verdict::new(
            Confusion,
            "Too confused to figure out what to do next",
        ));
    }
    if state.frustration_level > thresholds.frustration_max {
        return Some(Verdict::new(Frustration, "Too frustrated to continue"));
    }
    if state.decision_fatigue.fatigue_level > thresholds.decision_fatigue_max {
        return Some(Verdict::new(
            DecisionFatigue,
            "Worn out by too many decisions",
        ));
    }
    if is_looping(&state.memory, thresholds.loop_detection_threshold) {
        return Some(Verdict::new(
            Loop,
            "Going around in circles between the same pages",
        ));
    }
    if state.step_count > thresholds.max_steps_without_progress
        && state.goal_progress < NO_PROGRESS_FLOOR
    {
        return Some(Verdict::new(
            NoProgress,
            format!(
                "No meaningful progress after {} steps",
                state.step_count
            ),
        ));
    }
    if let Some(concern) = should_consider_abandonment(&state.emotional_state) {
        return Some(Verdict::new(Emotional, concern.message()));
    }
    let modifier = calculate_abandonment_modifier(&state.emotional_state);
    if modifier > EMOTIONAL_MODIFIER_TRIGGER
        && state.patience_remaining < thresholds.patience_min * modifier
    {
        return Some(Verdict::new(
            Emotional,
            "Emotionally drained and out of patience",
        ));
    }
    None
}

/// Whether the last [`LOOP_WINDOW`] pages contain at most `threshold`
/// distinct URLs.  Needs a full window.
pub fn is_looping(memory: &Memory, threshold: usize) -> bool {
    let recent = memory.recent_pages(LOOP_WINDOW);
    if recent.len() < LOOP_WINDOW {
        return false;
    }
    let distinct: HashSet<&str> = recent.iter().map(String::as_str).collect();
    distinct.len() <= threshold
}

// ============================================================================
// Tests
// ============================================================================
