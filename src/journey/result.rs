//! Journey results and the end-of-journey summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::abandonment::AbandonmentReason;
use crate::cognitive::{CognitiveState, Mood, StateSample};
use crate::emotion::{Emotion, EmotionalEvent, EmotionalState};
use crate::persona::Persona;

/// Band around zero within which the valence trend counts as stable.
pub const VALENCE_TREND_BAND: f64 = 0.1;

/// Terminal states of the step loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyOutcome {
    GoalAchieved,
    Abandoned,
    TimedOut,
    MaxStepsReached,
}

/// A point where the persona reported something getting in its way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrictionPoint {
    pub step: u32,
    pub url: String,
    pub description: String,
    pub element: Option<String>,
    pub mood: Mood,
    pub dominant_emotion: Emotion,
    pub timestamp: DateTime<Utc>,
}

/// One step of inner monologue.  Malformed turns leave no entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonologueEntry {
    pub step: u32,
    pub phase: Option<String>,
    pub monologue: String,
    pub action: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValenceTrend {
    Improving,
    Declining,
    Stable,
}

impl ValenceTrend {
    /// Compare mean valence of the first and second half of the journey.
    pub fn from_samples(samples: &[StateSample]) -> Self {
        if samples.len() < 2 {
            return Self::Stable;
        }
        let mid = samples.len() / 2;
        let mean = |s: &[StateSample]| s.iter().map(|x| x.valence).sum::<f64>() / s.len() as f64;
        let delta = mean(&samples[mid..]) - mean(&samples[..mid]);
        if delta > VALENCE_TREND_BAND {
            Self::Improving
        } else if delta < -VALENCE_TREND_BAND {
            Self::Declining
        } else {
            Self::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub avg_confusion_level: f64,
    pub max_frustration_level: f64,
    pub backtrack_count: u32,
    pub decisions_made: u32,
    pub final_decision_fatigue: f64,
    pub was_choosing_defaults: bool,
    pub emotional_valence_trend: ValenceTrend,
    pub dominant_emotion: Emotion,
    pub emotional_event_count: usize,
}

impl Summary {
    pub fn from_state(state: &CognitiveState) -> Self {
        let history = &state.history;
        let avg_confusion_level = if history.is_empty() {
            state.confusion_level
        } else {
            history.iter().map(|s| s.confusion).sum::<f64>() / history.len() as f64
        };
        let max_frustration_level = history
            .iter()
            .map(|s| s.frustration)
            .fold(state.frustration_level, f64::max);

        Self {
            avg_confusion_level,
            max_frustration_level,
            backtrack_count: state.memory.backtrack_count,
            decisions_made: state.decision_fatigue.decisions_made,
            final_decision_fatigue: state.decision_fatigue.fatigue_level,
            was_choosing_defaults: state.decision_fatigue.choosing_defaults,
            emotional_valence_trend: ValenceTrend::from_samples(history),
            dominant_emotion: state.emotional_state.dominant,
            emotional_event_count: state.emotional_journey.len(),
        }
    }
}

/// Everything a caller gets back from one journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResult {
    pub id: Uuid,
    pub persona: Persona,
    pub goal: String,
    pub goal_achieved: bool,
    pub outcome: JourneyOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abandonment_reason: Option<AbandonmentReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abandonment_message: Option<String>,
    /// Simulated seconds.
    pub total_time: f64,
    pub step_count: u32,
    pub friction_points: Vec<FrictionPoint>,
    pub full_monologue: Vec<MonologueEntry>,
    pub final_state: CognitiveState,
    pub summary: Summary,
    pub emotional_journey: Vec<EmotionalEvent>,
    pub final_emotional_state: EmotionalState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(valences: &[f64]) -> Vec<StateSample> {
        valences
            .iter()
            .enumerate()
            .map(|(i, v)| StateSample {
                step: i as u32 + 1,
                patience: 0.5,
                confusion: 0.1 * i as f64,
                frustration: 0.2,
                goal_progress: 0.0,
                valence: *v,
            })
            .collect()
    }

    #[test]
    fn test_valence_trend() {
        assert_eq!(ValenceTrend::from_samples(&[]), ValenceTrend::Stable);
        assert_eq!(
            ValenceTrend::from_samples(&samples(&[-0.3, -0.2, 0.1, 0.2])),
            ValenceTrend::Improving
        );
        assert_eq!(
            ValenceTrend::from_samples(&samples(&[0.2, 0.1, -0.1, -0.3])),
            ValenceTrend::Declining
        );
        assert_eq!(
            ValenceTrend::from_samples(&samples(&[0.0, 0.05, 0.05, 0.1])),
            ValenceTrend::Stable
        );
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&JourneyOutcome::MaxStepsReached).unwrap(),
            "\"max_steps_reached\""
        );
    }
}
