//! Per-step state transitions.
//!
//! A step touches the state twice, always in this order:
//!
//! 1. [`CognitiveState::apply_decision`], once the oracle has answered:
//!    oracle readings, patience depletion, frustration decay, emotional
//!    appraisal, dual-process switch, scan width, peripheral vision,
//!    habituation.
//! 2. [`CognitiveState::record_action`], once the proposed action ran:
//!    decision fatigue, recovery on success, error bookkeeping.
//!
//! The abandonment check runs between the two.

use super::state::{
    ActionRecord, CognitiveState, ErrorRecord, PendingOutcome, ProcessingSystem, StateSample,
    DEFAULTS_FATIGUE_THRESHOLD,
};
use super::attention::PeripheralVision;
use crate::emotion::{apply_trigger, decay_emotions, EmotionalConfig, Trigger};
use crate::executor::{Action, ExecutedAction};
use crate::oracle::Decision;
use crate::persona::TraitVector;

/// Base patience cost of one step.
pub const PATIENCE_COST_PER_STEP: f64 = 0.02;
/// Additional patience cost per unit of frustration.
pub const PATIENCE_COST_PER_FRUSTRATION: f64 = 0.05;
/// Frustration shed per step per unit of resilience.
pub const FRUSTRATION_DECAY_PER_RESILIENCE: f64 = 0.04;
/// Patience below which time pressure sets in.
pub const TIME_PRESSURE_PATIENCE: f64 = 0.3;
/// Flat frustration added when an action throws.
pub const ACTION_EXCEPTION_FRUSTRATION: f64 = 0.15;
/// Goal-progress gain that counts as progress for recovery.
pub const PROGRESS_GAIN_THRESHOLD: f64 = 0.1;

/// Base fatigue per decision, scaled by log2(options + 1).
const FATIGUE_BASE: f64 = 0.015;

/// What the appraisal saw this step, for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Appraisal {
    pub trigger: Option<Trigger>,
    pub switched_to: Option<ProcessingSystem>,
}

impl CognitiveState {
    /// Apply the oracle's decision (or `None` for a malformed reply).
    ///
    /// `element_texts` are the visible element texts used for habituation.
    pub fn apply_decision<'a, I>(
        &mut self,
        decision: Option<&Decision>,
        element_texts: I,
        traits: &TraitVector,
        emotions: &EmotionalConfig,
    ) -> Appraisal
    where
        I: IntoIterator<Item = &'a str>,
    {
        let prev_confusion = self.confusion_level;
        let prev_frustration = self.frustration_level;
        let prev_progress = self.goal_progress;
        self.progress_at_step_start = prev_progress;

        // 1. oracle readings are authoritative
        if let Some(d) = decision {
            if let Some(c) = d.new_confusion {
                self.confusion_level = c.clamp(0.0, 1.0);
            }
            if let Some(f) = d.new_frustration {
                self.frustration_level = f.clamp(0.0, 1.0);
            }
            if let Some(p) = d.goal_progress {
                self.goal_progress = p.clamp(0.0, 1.0);
            }
            if let Some(mood) = d.parsed_mood() {
                self.current_mood = mood;
            }
        }
        let frustration_rose = self.frustration_level > prev_frustration;

        // 2. patience depletion
        self.patience_remaining -=
            PATIENCE_COST_PER_STEP + self.frustration_level * PATIENCE_COST_PER_FRUSTRATION;

        // 3. time-based frustration decay
        self.frustration_level =
            (self.frustration_level - traits.resilience * FRUSTRATION_DECAY_PER_RESILIENCE)
                .max(0.0);

        // 4. emotional appraisal, then decay
        let pending = self.pending_outcome.take();
        let trigger = self.select_trigger(
            decision,
            pending.as_ref(),
            prev_confusion,
            prev_progress,
            frustration_rose,
        );
        if let Some((trigger, severity, description)) = trigger.clone() {
            let (next, event) = apply_trigger(
                &self.emotional_state,
                trigger,
                emotions,
                self.step_count,
                Some(severity),
                description.as_deref(),
            );
            self.emotional_state = next;
            self.emotional_journey.push(event);
        }
        self.emotional_state = decay_emotions(&self.emotional_state, emotions);

        // 5. dual-process switch
        let switched_to = self.update_cognitive_mode();

        // 6. scan width
        self.scan_pattern
            .update(self.confusion_level, self.frustration_level);

        // 7. peripheral vision
        self.peripheral_vision =
            PeripheralVision::from_load(self.confusion_level, self.frustration_level);

        // 8. habituation
        let newly_blind = self.habituation.observe(element_texts);
        for pattern in &newly_blind {
            log::debug!("Step {}: persona stopped noticing {}", self.step_count, pattern);
        }

        self.history.push(StateSample {
            step: self.step_count,
            patience: self.patience(),
            confusion: self.confusion_level,
            frustration: self.frustration_level,
            goal_progress: self.goal_progress,
            valence: self.emotional_state.valence,
        });

        Appraisal {
            trigger: trigger.map(|(t, _, _)| t),
            switched_to,
        }
    }

    /// Record the outcome of an executed action.
    ///
    /// `result` is `Err(message)` when the executor raised an error.
    pub fn record_action(
        &mut self,
        action: &Action,
        result: Result<&ExecutedAction, &str>,
        traits: &TraitVector,
    ) {
        // 9. decision fatigue
        let options = action.estimated_option_count();
        let fatigue = &mut self.decision_fatigue;
        fatigue.decisions_made += 1;
        fatigue.last_decision_complexity = options;
        fatigue.fatigue_level = (fatigue.fatigue_level
            + fatigue_increment(options, traits.working_memory))
        .clamp(0.0, 1.0);
        if fatigue.fatigue_level > DEFAULTS_FATIGUE_THRESHOLD {
            fatigue.choosing_defaults = true;
        }

        let success = matches!(result, Ok(outcome) if outcome.success);
        self.memory.actions_attempted.push(ActionRecord {
            action: action.kind().as_str().to_string(),
            target: action.target(),
            success,
        });
        if !success && self.cognitive_mode.system == ProcessingSystem::System1 {
            self.cognitive_mode.system1_errors += 1;
        }

        match result {
            // 10. resilience-based recovery
            Ok(outcome) if outcome.success => {
                let new_page = outcome
                    .final_url
                    .as_deref()
                    .map(|url| !self.memory.has_visited(url))
                    .unwrap_or(false);
                let gain = self.goal_progress - self.progress_at_step_start;
                let progressed = new_page || gain > PROGRESS_GAIN_THRESHOLD;

                let relief = if progressed { 0.20 } else { 0.08 };
                self.frustration_level =
                    (self.frustration_level - traits.resilience * relief).max(0.0);
                if progressed {
                    self.patience_remaining =
                        (self.patience_remaining + traits.resilience * 0.08).min(1.0);
                }
                self.pending_outcome = Some(PendingOutcome {
                    success: true,
                    error: None,
                });
            }
            Ok(_) => {
                self.memory.errors_encountered.push(ErrorRecord {
                    error: "Action had no visible effect".to_string(),
                    context: action.to_string(),
                });
                self.pending_outcome = Some(PendingOutcome {
                    success: false,
                    error: None,
                });
            }
            // 11. exception
            Err(message) => {
                self.memory.errors_encountered.push(ErrorRecord {
                    error: message.to_string(),
                    context: action.to_string(),
                });
                self.frustration_level =
                    (self.frustration_level + ACTION_EXCEPTION_FRUSTRATION).min(1.0);
                self.pending_outcome = Some(PendingOutcome {
                    success: false,
                    error: Some(message.to_string()),
                });
            }
        }
    }

    /// Pick this step's trigger, with its severity and description.
    fn select_trigger(
        &self,
        decision: Option<&Decision>,
        pending: Option<&PendingOutcome>,
        prev_confusion: f64,
        prev_progress: f64,
        frustration_rose: bool,
    ) -> Option<(Trigger, f64, Option<String>)> {
        let reported_success = decision
            .and_then(|d| d.action_success)
            .or(pending.map(|p| p.success));
        let error = decision
            .and_then(|d| d.error_message.clone())
            .filter(|e| !e.trim().is_empty())
            .or_else(|| pending.and_then(|p| p.error.clone()));

        let failed = reported_success == Some(false)
            || (error.is_some() && reported_success != Some(true));
        let progress_delta = self.goal_progress - prev_progress;
        let confusion_delta = self.confusion_level - prev_confusion;

        if failed {
            if let Some(e) = error {
                return Some((Trigger::Error, 1.0, Some(format!("Error: {}", e))));
            }
            return Some((Trigger::Failure, 0.8, None));
        }
        if progress_delta > 0.0 {
            return Some((
                Trigger::Progress,
                (progress_delta * 5.0).clamp(0.5, 1.5),
                Some(format!(
                    "Progress {:.0}% → {:.0}%",
                    prev_progress * 100.0,
                    self.goal_progress * 100.0
                )),
            ));
        }
        if confusion_delta > 0.0 {
            return Some((
                Trigger::ConfusionOnset,
                (confusion_delta * 5.0).clamp(0.5, 1.5),
                None,
            ));
        }
        if frustration_rose {
            return Some((Trigger::Setback, 1.0, None));
        }
        let patience = self.patience();
        if patience < TIME_PRESSURE_PATIENCE {
            let urgency = (TIME_PRESSURE_PATIENCE - patience) / TIME_PRESSURE_PATIENCE;
            return Some((Trigger::TimePressure, 0.5 + 0.5 * urgency, None));
        }
        if reported_success == Some(true) {
            return Some((Trigger::Success, 0.6, None));
        }
        None
    }

    /// System 1 → 2 when confusion passes the threshold; back to 1 once
    /// confusion drops below it and the last attempt worked.
    fn update_cognitive_mode(&mut self) -> Option<ProcessingSystem> {
        let last_succeeded = self
            .memory
            .actions_attempted
            .last()
            .map(|a| a.success)
            .unwrap_or(false);
        let mode = &mut self.cognitive_mode;
        match mode.system {
            ProcessingSystem::System1 if self.confusion_level > mode.switch_threshold => {
                mode.system = ProcessingSystem::System2;
                Some(ProcessingSystem::System2)
            }
            ProcessingSystem::System2
                if self.confusion_level < mode.switch_threshold && last_succeeded =>
            {
                mode.system = ProcessingSystem::System1;
                mode.system1_errors = 0;
                Some(ProcessingSystem::System1)
            }
            _ => None,
        }
    }
}

/// Fatigue added by one decision; grows with the option count and is
/// heavier for low working memory.
pub fn fatigue_increment(options: u32, working_memory: f64) -> f64 {
    FATIGUE_BASE * ((options as f64) + 1.0).log2() * (1.5 - working_memory.clamp(0.0, 1.0))
}

// ============================================================================
// Tests
// ============================================================================
