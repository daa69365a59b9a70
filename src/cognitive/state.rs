//! Cognitive state: everything about the simulated mind that changes
//! during a journey.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::attention::{BaseScanPattern, Habituation, PeripheralVision, ScanPattern};
use crate::emotion::{EmotionalConfig, EmotionalEvent, EmotionalState};
use crate::persona::TraitVector;

/// Fatigue above which the persona starts taking defaults.
pub const DEFAULTS_FATIGUE_THRESHOLD: f64 = 0.7;

// ============================================================================
// Mood
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Neutral,
    Hopeful,
    Confused,
    Frustrated,
    Defeated,
    Relieved,
}

impl Mood {
    /// Case-insensitive parse; unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "neutral" => Some(Self::Neutral),
            "hopeful" => Some(Self::Hopeful),
            "confused" => Some(Self::Confused),
            "frustrated" => Some(Self::Frustrated),
            "defeated" => Some(Self::Defeated),
            "relieved" => Some(Self::Relieved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Hopeful => "hopeful",
            Self::Confused => "confused",
            Self::Frustrated => "frustrated",
            Self::Defeated => "defeated",
            Self::Relieved => "relieved",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Memory
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Action kind ("click", "fill", ...).
    pub action: String,
    pub target: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error: String,
    pub context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub pages_visited: Vec<String>,
    pub actions_attempted: Vec<ActionRecord>,
    pub errors_encountered: Vec<ErrorRecord>,
    pub backtrack_count: u32,
}

impl Memory {
    /// The most recent `n` visited pages, oldest first.
    pub fn recent_pages(&self, n: usize) -> &[String] {
        let start = self.pages_visited.len().saturating_sub(n);
        &self.pages_visited[start..]
    }

    pub fn has_visited(&self, url: &str) -> bool {
        self.pages_visited.iter().any(|p| p == url)
    }
}

// ============================================================================
// Decision fatigue and dual-process mode
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionFatigue {
    pub decisions_made: u32,
    pub fatigue_level: f64,
    /// Option count of the most recent decision.
    pub last_decision_complexity: u32,
    /// Once set, stays set for the rest of the journey.
    pub choosing_defaults: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingSystem {
    /// Fast, intuitive.
    System1,
    /// Slow, deliberate.
    System2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveMode {
    pub system: ProcessingSystem,
    /// Confusion level that tips System 1 into System 2.
    pub switch_threshold: f64,
    pub system1_errors: u32,
    /// Seconds spent in each mode.
    pub time_in_system1: f64,
    pub time_in_system2: f64,
}

impl CognitiveMode {
    /// Planners switch to deliberate processing sooner (threshold 0.3–0.6).
    pub fn for_traits(traits: &TraitVector) -> Self {
        Self {
            system: ProcessingSystem::System1,
            switch_threshold: 0.6 - 0.3 * traits.metacognitive_planning,
            system1_errors: 0,
            time_in_system1: 0.0,
            time_in_system2: 0.0,
        }
    }
}

// ============================================================================
// History
// ============================================================================

/// Per-step sample used by the journey summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSample {
    pub step: u32,
    pub patience: f64,
    pub confusion: f64,
    pub frustration: f64,
    pub goal_progress: f64,
    pub valence: f64,
}

/// Outcome of the last executed action, consumed by the next appraisal.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct PendingOutcome {
    pub success: bool,
    pub error: Option<String>,
}

// ============================================================================
// Cognitive state
// ============================================================================

/// The mutable root of a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveState {
    /// Raw patience; may go negative.  Read through [`Self::patience`].
    pub patience_remaining: f64,
    pub confusion_level: f64,
    pub frustration_level: f64,
    pub goal_progress: f64,
    pub current_mood: Mood,
    pub memory: Memory,
    /// Simulated seconds since the journey started.
    pub time_elapsed: f64,
    pub step_count: u32,
    pub decision_fatigue: DecisionFatigue,
    pub cognitive_mode: CognitiveMode,
    pub scan_pattern: ScanPattern,
    pub peripheral_vision: PeripheralVision,
    pub habituation: Habituation,
    /// Milliseconds between gaze landing and the pointer starting to move.
    pub gaze_mouse_lag: f64,
    pub emotional_state: EmotionalState,
    pub emotional_journey: Vec<EmotionalEvent>,
    pub history: Vec<StateSample>,

    #[serde(skip)]
    pub(crate) pending_outcome: Option<PendingOutcome>,
    #[serde(skip)]
    pub(crate) progress_at_step_start: f64,
}

impl CognitiveState {
    /// Fresh state for a persona at journey start.
    pub fn new(traits: &TraitVector, emotions: &EmotionalConfig, gaze_mouse_lag: f64) -> Self {
        Self {
            patience_remaining: traits.patience,
            confusion_level: 0.0,
            frustration_level: 0.0,
            goal_progress: 0.0,
            current_mood: Mood::Neutral,
            memory: Memory::default(),
            time_elapsed: 0.0,
            step_count: 0,
            decision_fatigue: DecisionFatigue::default(),
            cognitive_mode: CognitiveMode::for_traits(traits),
            scan_pattern: ScanPattern::new(BaseScanPattern::for_traits(traits)),
            peripheral_vision: PeripheralVision::from_load(0.0, 0.0),
            habituation: Habituation::for_traits(traits),
            gaze_mouse_lag,
            emotional_state: emotions.initial_state(),
            emotional_journey: Vec::new(),
            history: Vec::new(),
            pending_outcome: None,
            progress_at_step_start: 0.0,
        }
    }

    /// Patience clamped to `[0, 1]`.
    pub fn patience(&self) -> f64 {
        self.patience_remaining.clamp(0.0, 1.0)
    }

    /// Record the page the persona is looking at.
    ///
    /// Consecutive observations of the same URL count once.  Returning to a
    /// page seen earlier counts as a backtrack.
    pub fn observe_page(&mut self, url: &str) {
        if url.is_empty() || self.memory.pages_visited.last().map(String::as_str) == Some(url) {
            return;
        }
        if self.memory.has_visited(url) {
            self.memory.backtrack_count += 1;
        }
        self.memory.pages_visited.push(url.to_string());
    }

    /// Advance the simulated clock, attributing the time to the active mode.
    pub fn track_time(&mut self, seconds: f64) {
        let seconds = seconds.max(0.0);
        self.time_elapsed += seconds;
        match self.cognitive_mode.system {
            ProcessingSystem::System1 => self.cognitive_mode.time_in_system1 += seconds,
            ProcessingSystem::System2 => self.cognitive_mode.time_in_system2 += seconds,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(traits: &TraitVector) -> CognitiveState {
        CognitiveState::new(traits, &EmotionalConfig::from_traits(traits), 300.0)
    }

    #[test]
    fn test_initial_patience_is_trait_patience() {
        let t = TraitVector {
            patience: 0.05,
            ..Default::default()
        };
        let s = fresh(&t);
        assert_eq!(s.patience_remaining, 0.05);
        assert_eq!(s.current_mood, Mood::Neutral);
        assert_eq!(s.cognitive_mode.system, ProcessingSystem::System1);
        assert_eq!(s.scan_pattern.effective_width, 100.0);
    }

    #[test]
    fn test_patience_clamped_on_read() {
        let mut s = fresh(&TraitVector::default());
        s.patience_remaining = -0.4;
        assert_eq!(s.patience(), 0.0);
        s.patience_remaining = 1.3;
        assert_eq!(s.patience(), 1.0);
    }

    #[test]
    fn test_observe_page_dedupes_and_counts_backtracks() {
        let mut s = fresh(&TraitVector::default());
        s.observe_page("a");
        s.observe_page("a");
        s.observe_page("b");
        s.observe_page("a");
        assert_eq!(s.memory.pages_visited, vec!["a", "b", "a"]);
        assert_eq!(s.memory.backtrack_count, 1);
        assert_eq!(s.memory.recent_pages(2), &["b".to_string(), "a".to_string()]);
        assert_eq!(s.memory.recent_pages(10).len(), 3);
    }

    #[test]
    fn test_track_time_by_mode() {
        let mut s = fresh(&TraitVector::default());
        s.track_time(2.0);
        s.cognitive_mode.system = ProcessingSystem::System2;
        s.track_time(3.0);
        s.track_time(-1.0);
        assert_eq!(s.time_elapsed, 5.0);
        assert_eq!(s.cognitive_mode.time_in_system1, 2.0);
        assert_eq!(s.cognitive_mode.time_in_system2, 3.0);
    }

    #[test]
    fn test_mood_parse() {
        assert_eq!(Mood::parse(" Frustrated "), Some(Mood::Frustrated));
        assert_eq!(Mood::parse("ecstatic"), None);
    }

    #[test]
    fn test_switch_threshold_range() {
        let planner = CognitiveMode::for_traits(&TraitVector {
            metacognitive_planning: 1.0,
            ..Default::default()
        });
        assert!((planner.switch_threshold - 0.3).abs() < 1e-12);
    }
}
