//! Discrete-emotion state with a valence/arousal summary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Intensity below which no emotion counts as dominant.
pub const NEUTRAL_FLOOR: f64 = 0.1;

/// The seven tracked emotions, plus `Neutral` for the dominant summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Anxiety,
    Frustration,
    Boredom,
    Confusion,
    Satisfaction,
    Excitement,
    Relief,
    Neutral,
}

impl Emotion {
    /// Tracked emotions in storage order.
    pub const TRACKED: [Emotion; 7] = [
        Self::Anxiety,
        Self::Frustration,
        Self::Boredom,
        Self::Confusion,
        Self::Satisfaction,
        Self::Excitement,
        Self::Relief,
    ];

    /// Tie-break order when two emotions share the highest intensity.
    pub const DOMINANCE_PRIORITY: [Emotion; 7] = [
        Self::Frustration,
        Self::Anxiety,
        Self::Confusion,
        Self::Excitement,
        Self::Satisfaction,
        Self::Relief,
        Self::Boredom,
    ];

    /// Whether the emotion counts towards positive valence.
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Satisfaction | Self::Excitement | Self::Relief)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anxiety => "anxiety",
            Self::Frustration => "frustration",
            Self::Boredom => "boredom",
            Self::Confusion => "confusion",
            Self::Satisfaction => "satisfaction",
            Self::Excitement => "excitement",
            Self::Relief => "relief",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw intensities of the seven tracked emotions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Intensities {
    pub anxiety: f64,
    pub frustration: f64,
    pub boredom: f64,
    pub confusion: f64,
    pub satisfaction: f64,
    pub excitement: f64,
    pub relief: f64,
}

impl Intensities {
    /// Build from values in [`Emotion::TRACKED`] order.
    pub fn from_array(v: [f64; 7]) -> Self {
        Self {
            anxiety: v[0],
            frustration: v[1],
            boredom: v[2],
            confusion: v[3],
            satisfaction: v[4],
            excitement: v[5],
            relief: v[6],
        }
    }

    /// Values in [`Emotion::TRACKED`] order.
    pub fn to_array(&self) -> [f64; 7] {
        [
            self.anxiety,
            self.frustration,
            self.boredom,
            self.confusion,
            self.satisfaction,
            self.excitement,
            self.relief,
        ]
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Anxiety => self.anxiety,
            Emotion::Frustration => self.frustration,
            Emotion::Boredom => self.boredom,
            Emotion::Confusion => self.confusion,
            Emotion::Satisfaction => self.satisfaction,
            Emotion::Excitement => self.excitement,
            Emotion::Relief => self.relief,
            Emotion::Neutral => 0.0,
        }
    }

    /// Clamp every intensity to `[0, 1]`; NaN becomes 0.
    pub fn clamped(&self) -> Self {
        let mut v = self.to_array();
        for x in &mut v {
            *x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        }
        Self::from_array(v)
    }
}

/// Emotional state: intensities plus the derived summary.
///
/// Construct through [`EmotionalState::from_intensities`] so the summary is
/// always consistent with the intensities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalState {
    #[serde(flatten)]
    pub intensities: Intensities,
    /// Pleasantness in `[-1, 1]`.
    pub valence: f64,
    /// Activation in `[0, 1]`.
    pub arousal: f64,
    pub dominant: Emotion,
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self::from_intensities(Intensities::default())
    }
}

impl EmotionalState {
    /// Clamp intensities and recompute valence, arousal and dominant.
    pub fn from_intensities(raw: Intensities) -> Self {
        let intensities = raw.clamped();
        Self {
            intensities,
            valence: compute_valence(&intensities),
            arousal: compute_arousal(&intensities),
            dominant: compute_dominant(&intensities),
        }
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        self.intensities.get(emotion)
    }
}

/// Weighted positive minus weighted negative; each side's weights sum to 1.
fn compute_valence(i: &Intensities) -> f64 {
    let positive = 0.4 * i.satisfaction + 0.3 * i.excitement + 0.3 * i.relief;
    let negative =
        0.3 * i.anxiety + 0.35 * i.frustration + 0.1 * i.boredom + 0.25 * i.confusion;
    (positive - negative).clamp(-1.0, 1.0)
}

/// High-activation emotions raise arousal, low-activation ones damp it.
fn compute_arousal(i: &Intensities) -> f64 {
    let high = i.anxiety + i.frustration + i.excitement;
    let low = i.boredom + i.relief;
    (0.5 * high - 0.25 * low).clamp(0.0, 1.0)
}

fn compute_dominant(i: &Intensities) -> Emotion {
    let mut best = Emotion::Neutral;
    let mut best_value = NEUTRAL_FLOOR;
    for emotion in Emotion::DOMINANCE_PRIORITY {
        let v = i.get(emotion);
        // Strictly greater keeps the earlier (higher-priority) emotion on ties.
        if v > best_value || (best == Emotion::Neutral && v >= NEUTRAL_FLOOR) {
            best = emotion;
            best_value = v;
        }
    }
    best
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_low_is_neutral() {
        let s = EmotionalState::from_intensities(Intensities {
            anxiety: 0.09,
            boredom: 0.05,
            ..Default::default()
        });
        assert_eq!(s.dominant, Emotion::Neutral);
    }

    #[test]
    fn test_dominant_is_max() {
        let s = EmotionalState::from_intensities(Intensities {
            anxiety: 0.3,
            satisfaction: 0.6,
            ..Default::default()
        });
        assert_eq!(s.dominant, Emotion::Satisfaction);
    }

    #[test]
    fn test_ties_follow_priority() {
        let s = EmotionalState::from_intensities(Intensities {
            boredom: 0.5,
            anxiety: 0.5,
            frustration: 0.5,
            ..Default::default()
        });
        assert_eq!(s.dominant, Emotion::Frustration);

        let s = EmotionalState::from_intensities(Intensities {
            relief: 0.4,
            excitement: 0.4,
            ..Default::default()
        });
        assert_eq!(s.dominant, Emotion::Excitement);
    }

    #[test]
    fn test_exactly_at_floor_counts() {
        let s = EmotionalState::from_intensities(Intensities {
            relief: NEUTRAL_FLOOR,
            ..Default::default()
        });
        assert_eq!(s.dominant, Emotion::Relief);
    }

    #[test]
    fn test_valence_and_arousal_bounds() {
        let worst = EmotionalState::from_intensities(Intensities {
            anxiety: 1.0,
            frustration: 1.0,
            boredom: 1.0,
            confusion: 1.0,
            ..Default::default()
        });
        assert!((worst.valence + 1.0).abs() < 1e-9);
        let best = EmotionalState::from_intensities(Intensities {
            satisfaction: 1.0,
            excitement: 1.0,
            relief: 1.0,
            ..Default::default()
        });
        assert!((best.valence - 1.0).abs() < 1e-9);
        assert!(best.arousal <= 1.0 && worst.arousal >= 0.0);
    }

    #[test]
    fn test_construction_clamps() {
        let s = EmotionalState::from_intensities(Intensities {
            anxiety: 2.0,
            relief: -1.0,
            boredom: f64::NAN,
            ..Default::default()
        });
        assert_eq!(s.intensities.anxiety, 1.0);
        assert_eq!(s.intensities.relief, 0.0);
        assert_eq!(s.intensities.boredom, 0.0);
    }

    #[test]
    fn test_serializes_flat() {
        let s = EmotionalState::default();
        let v = serde_json::to_value(s).unwrap();
        assert!(v.get("anxiety").is_some());
        assert_eq!(v["dominant"], "neutral");
    }
}
