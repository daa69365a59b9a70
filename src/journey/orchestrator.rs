//! Step orchestrator: the journey control loop.
//!
//! ```text
//! Running ─┬─► GoalAchieved
//!          ├─► Abandoned (reason + message)
//!          ├─► TimedOut
//!          └─► MaxStepsReached
//! ```
//!
//! Per step: advance the clock, check the time limit, snapshot the page,
//! ask the oracle, apply the decision to the cognitive state, check for
//! goal and abandonment, then act with human timing.  A journey owns its
//! state and its executor; nothing is shared across journeys.

use std::sync::Arc;

use chrono::Utc;

use super::error::JourneyError;
use super::result::{FrictionPoint, JourneyOutcome, JourneyResult, MonologueEntry, Summary};
use crate::abandonment::{self, AbandonmentReason, AbandonmentThresholds, Verdict};
use crate::cognitive::{CognitiveState, ErrorRecord, ProcessingSystem};
use crate::config::JourneyConfig;
use crate::emotion::EmotionalConfig;
use crate::executor::{ActionExecutor, PageSnapshot};
use crate::oracle::{
    self, build_request, parse_reply, Decision, DecisionOracle, OracleReply, PromptContext,
};
use crate::persona::Persona;
use crate::timing::{action_duration, MotorProfile, Pointer};

/// Simulated seconds to take in a page before deciding.
const THINK_BASE_SECS: f64 = 1.5;
/// Extra seconds per unit of reading tendency.
const THINK_PER_READING_SECS: f64 = 2.0;
/// Extra seconds when deliberating in System 2.
const SYSTEM2_EXTRA_SECS: f64 = 1.0;
/// Characters of a malformed reply quoted in the log.
const MALFORMED_EXCERPT: usize = 200;

pub const TIMEOUT_MESSAGE: &str = "Ran out of time";

/// One persona's run against one goal.
pub struct Journey {
    persona: Persona,
    config: JourneyConfig,
    thresholds: AbandonmentThresholds,
    emotions: EmotionalConfig,
    motor: MotorProfile,
    state: CognitiveState,
    oracle: Arc<dyn DecisionOracle>,
    executor: Box<dyn ActionExecutor>,
    pointer: Pointer,
    friction_points: Vec<FrictionPoint>,
    monologue: Vec<MonologueEntry>,
}

impl Journey {
    /// Validate the configuration and derive the persona's thresholds,
    /// emotional config and initial state.
    pub fn new(
        persona: Persona,
        config: JourneyConfig,
        oracle: Arc<dyn DecisionOracle>,
        executor: Box<dyn ActionExecutor>,
    ) -> Result<Self, JourneyError> {
        config.validate()?;

        let traits = &persona.traits;
        let thresholds = AbandonmentThresholds::from_traits(traits, config.time_limit);
        let emotions = EmotionalConfig::from_traits(traits);
        let motor = MotorProfile::from_demographics(&persona.demographics);
        let state = CognitiveState::new(traits, &emotions, motor.gaze_mouse_lag());

        Ok(Self {
            persona,
            config,
            thresholds,
            emotions,
            motor,
            state,
            oracle,
            executor,
            pointer: Pointer::default(),
            friction_points: Vec::new(),
            monologue: Vec::new(),
        })
    }

    pub fn state(&self) -> &CognitiveState {
        &self.state
    }

    pub fn thresholds(&self) -> &AbandonmentThresholds {
        &self.thresholds
    }

    /// Run to a terminal state.
    ///
    /// Errors only when the oracle gives no answer at all; executor
    /// failures are recorded and the journey continues.
    pub async fn run(mut self) -> Result<JourneyResult, JourneyError> {
        let started_at = Utc::now();
        log::info!(
            "Starting journey for '{}' via {}: {}",
            self.persona.name,
            self.oracle.name(),
            self.config.goal
        );

        let start_url = self.config.start_url.clone();
        if let Err(e) = self.executor.navigate(&start_url).await {
            log::warn!("Initial navigation to {} failed: {}", start_url, e);
            self.record_executor_error(e.to_string(), format!("navigate:{}", start_url));
        }

        let (outcome, verdict) = loop {
            if self.state.step_count >= self.config.max_steps {
                log::info!(
                    "'{}' reached the step limit ({})",
                    self.persona.name,
                    self.config.max_steps
                );
                break (JourneyOutcome::MaxStepsReached, None);
            }

            self.state.step_count += 1;
            let step = self.state.step_count;
            self.state.track_time(self.think_time());
            if self.state.time_elapsed > self.thresholds.time_limit {
                log::info!(
                    "'{}' timed out at step {} ({:.1}s > {:.0}s)",
                    self.persona.name,
                    step,
                    self.state.time_elapsed,
                    self.thresholds.time_limit
                );
                break (
                    JourneyOutcome::TimedOut,
                    Some(Verdict {
                        reason: AbandonmentReason::Timeout,
                        message: TIMEOUT_MESSAGE.to_string(),
                    }),
                );
            }

            let snapshot = self.take_snapshot().await;
            self.state.observe_page(&snapshot.url);
            let screenshot = self.take_screenshot().await;

            let request = build_request(PromptContext {
                persona: &self.persona,
                goal: &self.config.goal,
                snapshot: &snapshot,
                state: &self.state,
                screenshot,
            });
            let raw = match tokio::time::timeout(
                self.config.oracle_timeout(),
                self.oracle.decide(&request),
            )
            .await
            {
                Err(_) => {
                    return Err(JourneyError::OracleTimeout {
                        step,
                        seconds: self.config.oracle_timeout_secs,
                    })
                }
                Ok(Err(source)) => return Err(JourneyError::Oracle { step, source }),
                Ok(Ok(raw)) => raw,
            };

            let reply = parse_reply(&raw);
            if let OracleReply::Malformed { reason } = &reply {
                log::warn!(
                    "Step {}: malformed oracle reply ({}): {}",
                    step,
                    reason,
                    oracle::excerpt(&raw, MALFORMED_EXCERPT)
                );
            }
            let decision = reply.decision();

            let appraisal = self.state.apply_decision(
                decision,
                snapshot.element_texts(),
                &self.persona.traits,
                &self.emotions,
            );
            if let Some(d) = decision {
                self.record_decision(d, &snapshot.url);
            }
            log::debug!(
                "Step {} [{}] patience={:.2} confusion={:.2} frustration={:.2} progress={:.2} emotion={} trigger={:?}",
                step,
                snapshot.url,
                self.state.patience(),
                self.state.confusion_level,
                self.state.frustration_level,
                self.state.goal_progress,
                self.state.emotional_state.dominant,
                appraisal.trigger,
            );
            if let Some(system) = appraisal.switched_to {
                log::debug!("Step {}: switched to {:?}", step, system);
            }

            if decision.map_or(false, |d| d.goal_achieved) {
                log::info!("'{}' achieved the goal at step {}", self.persona.name, step);
                break (JourneyOutcome::GoalAchieved, None);
            }

            if let Some(verdict) = abandonment::evaluate(&self.state, &self.thresholds) {
                log::info!(
                    "'{}' abandoned at step {}: {} ({})",
                    self.persona.name,
                    step,
                    verdict.reason,
                    verdict.message
                );
                break (JourneyOutcome::Abandoned, Some(verdict));
            }

            if let Some(action) = decision.and_then(Decision::parsed_action) {
                let millis = action_duration(
                    &action,
                    &snapshot,
                    &mut self.pointer,
                    &self.motor,
                    self.state.gaze_mouse_lag,
                );
                self.state.track_time(millis / 1000.0);
                self.pause(millis).await;

                match self.executor.execute(&action).await {
                    Ok(executed) => {
                        self.state
                            .record_action(&action, Ok(&executed), &self.persona.traits)
                    }
                    Err(e) => {
                        log::warn!("Step {}: {} failed: {}", step, action, e);
                        let message = e.to_string();
                        self.state
                            .record_action(&action, Err(&message), &self.persona.traits);
                    }
                }
            }

            self.pause(self.config.inter_step_delay_ms as f64).await;
        };

        Ok(self.finish(outcome, verdict, started_at))
    }

    fn think_time(&self) -> f64 {
        let mut secs =
            THINK_BASE_SECS + THINK_PER_READING_SECS * self.persona.traits.reading_tendency;
        if self.state.cognitive_mode.system == ProcessingSystem::System2 {
            secs += SYSTEM2_EXTRA_SECS;
        }
        secs
    }

    async fn pause(&self, simulated_millis: f64) {
        let real = self.config.scaled(simulated_millis);
        if !real.is_zero() {
            tokio::time::sleep(real).await;
        }
    }

    /// Current page, or the last known page when the executor cannot say.
    async fn take_snapshot(&mut self) -> PageSnapshot {
        match self.executor.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Step {}: snapshot failed: {}", self.state.step_count, e);
                self.record_executor_error(e.to_string(), "snapshot".to_string());
                PageSnapshot {
                    url: self
                        .state
                        .memory
                        .pages_visited
                        .last()
                        .cloned()
                        .unwrap_or_else(|| self.config.start_url.clone()),
                    ..Default::default()
                }
            }
        }
    }

    async fn take_screenshot(&mut self) -> Option<crate::executor::Screenshot> {
        if !self.config.vision {
            return None;
        }
        match self.executor.screenshot().await {
            Ok(shot) => shot,
            Err(e) => {
                log::warn!("Screenshot failed: {}", e);
                None
            }
        }
    }

    fn record_executor_error(&mut self, error: String, context: String) {
        self.state
            .memory
            .errors_encountered
            .push(ErrorRecord { error, context });
    }

    fn record_decision(&mut self, d: &Decision, url: &str) {
        let now = Utc::now();
        let step = self.state.step_count;
        if let Some(text) = d.monologue.as_deref().filter(|m| !m.trim().is_empty()) {
            self.monologue.push(MonologueEntry {
                step,
                phase: d.phase.clone(),
                monologue: text.to_string(),
                action: d.action.clone(),
                timestamp: now,
            });
        }
        if let Some(description) = d
            .friction_description
            .as_deref()
            .filter(|f| !f.trim().is_empty())
        {
            self.friction_points.push(FrictionPoint {
                step,
                url: url.to_string(),
                description: description.to_string(),
                element: d.friction_element.clone(),
                mood: self.state.current_mood,
                dominant_emotion: self.state.emotional_state.dominant,
                timestamp: now,
            });
        }
    }

    fn finish(
        self,
        outcome: JourneyOutcome,
        verdict: Option<Verdict>,
        started_at: chrono::DateTime<Utc>,
    ) -> JourneyResult {
        let (abandonment_reason, abandonment_message) = match verdict {
            Some(v) => (Some(v.reason), Some(v.message)),
            None => (None, None),
        };
        JourneyResult {
            id: uuid::Uuid::new_v4(),
            goal: self.config.goal,
            goal_achieved: outcome == JourneyOutcome::GoalAchieved,
            outcome,
            abandonment_reason,
            abandonment_message,
            total_time: self.state.time_elapsed,
            step_count: self.state.step_count,
            friction_points: self.friction_points,
            full_monologue: self.monologue,
            summary: Summary::from_state(&self.state),
            emotional_journey: self.state.emotional_journey.clone(),
            final_emotional_state: self.state.emotional_state,
            final_state: self.state,
            persona: self.persona,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::executor::{
        ExecutedAction, ExecutorError, NavigateOutcome, Screenshot, ScrollDirection,
    };
    use crate::oracle::{DecisionRequest, OracleError};
    use crate::persona::TraitVector;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Oracle answering from a script; the last reply repeats.
    pub(crate) struct ScriptedOracle {
        replies: Vec<String>,
        calls: AtomicUsize,
        pub requests: Mutex<Vec<DecisionRequest>>,
    }

    impl ScriptedOracle {
        pub(crate) fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
            Self {
                replies: replies.into_iter().map(Into::into).collect(),
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn always(reply: &str) -> Self {
            Self::new([reply])
        }
    }

    #[async_trait]
    impl DecisionOracle for ScriptedOracle {
        async fn decide(&self, request: &DecisionRequest) -> Result<String, OracleError> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.replies[i.min(self.replies.len() - 1)].clone())
        }
    }

    struct FailingOracle;

    #[async_trait]
    impl DecisionOracle for FailingOracle {
        async fn decide(&self, _request: &DecisionRequest) -> Result<String, OracleError> {
            Err(OracleError::RetriesExhausted {
                attempts: 3,
                last_error: "overloaded".into(),
            })
        }
    }

    struct HangingOracle;

    #[async_trait]
    impl DecisionOracle for HangingOracle {
        async fn decide(&self, _request: &DecisionRequest) -> Result<String, OracleError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("{}".into())
        }
    }

    /// In-memory browser: navigation always lands, clicks follow the
    /// `fail_clicks` switch and load `click_target` when set.
    pub(crate) struct FakeBrowser {
        url: String,
        fail_clicks: bool,
        throw_on_click: bool,
        click_target: Option<String>,
    }

    impl FakeBrowser {
        pub(crate) fn new() -> Self {
            Self {
                url: String::new(),
                fail_clicks: false,
                throw_on_click: false,
                click_target: None,
            }
        }
    }

    #[async_trait]
    impl ActionExecutor for FakeBrowser {
        async fn navigate(&mut self, url: &str) -> Result<NavigateOutcome, ExecutorError> {
            self.url = url.to_string();
            Ok(NavigateOutcome {
                final_url: url.to_string(),
            })
        }

        async fn click(&mut self, selector: &str) -> Result<ExecutedAction, ExecutorError> {
            if self.throw_on_click {
                return Err(ExecutorError::ElementNotFound(selector.to_string()));
            }
            if self.fail_clicks {
                return Ok(ExecutedAction {
                    success: false,
                    final_url: None,
                });
            }
            let final_url = match self.click_target.clone() {
                Some(url) => Some(self.navigate(&url).await?.final_url),
                None => None,
            };
            Ok(ExecutedAction {
                success: true,
                final_url,
            })
        }

        async fn fill(&mut self, _selector: &str, _value: &str) -> Result<bool, ExecutorError> {
            Ok(true)
        }

        async fn hover(&mut self, _selector: &str) -> Result<bool, ExecutorError> {
            Ok(true)
        }

        async fn scroll(&mut self, _direction: ScrollDirection) -> Result<bool, ExecutorError> {
            Ok(true)
        }

        async fn screenshot(&mut self) -> Result<Option<Screenshot>, ExecutorError> {
            Ok(Some(Screenshot {
                media_type: "image/png".into(),
                data: vec![1, 2, 3],
            }))
        }

        async fn snapshot(&mut self) -> Result<PageSnapshot, ExecutorError> {
            Ok(PageSnapshot {
                url: self.url.clone(),
                title: "Fake".into(),
                ..Default::default()
            })
        }
    }

    pub(crate) fn config(max_steps: u32) -> JourneyConfig {
        JourneyConfig::new("Buy a toaster", "https://shop.example/")
            .with_max_steps(max_steps)
            .with_time_scale(0.0)
    }

    fn journey(
        traits: TraitVector,
        cfg: JourneyConfig,
        oracle: impl DecisionOracle + 'static,
    ) -> Journey {
        Journey::new(
            Persona::new("Tester", traits),
            cfg,
            Arc::new(oracle),
            Box::new(FakeBrowser::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_impatient_persona_gives_up_first_step() {
        let traits = TraitVector {
            patience: 0.05,
            ..Default::default()
        };
        let j = journey(
            traits,
            config(30),
            ScriptedOracle::always(r#"{"goalAchieved": false, "action": null}"#),
        );
        let r = j.run().await.unwrap();
        assert_eq!(r.step_count, 1);
        assert_eq!(r.outcome, JourneyOutcome::Abandoned);
        assert_eq!(r.abandonment_reason, Some(AbandonmentReason::Patience));
        assert!(!r.goal_achieved);
    }

    #[tokio::test]
    async fn test_alternating_pages_detected_as_loop() {
        let traits = TraitVector {
            persistence: 0.9,
            ..Default::default()
        };
        let a = r#"{"goalProgress": 0, "action": "navigate:https://shop.example/a"}"#;
        let b = r#"{"goalProgress": 0, "action": "navigate:https://shop.example/b"}"#;
        let j = journey(traits, config(30), ScriptedOracle::new([a, b, a, b, a, b, a, b]));
        let r = j.run().await.unwrap();
        assert_eq!(r.abandonment_reason, Some(AbandonmentReason::Loop));
        assert!(r.step_count <= 5);
        assert_eq!(r.final_state.memory.backtrack_count, 2);
    }

    #[tokio::test]
    async fn test_goal_achieved_on_third_step() {
        let no = r#"{"goalAchieved": false, "goalProgress": 0.3, "monologue": "Looking around"}"#;
        let yes = r#"{"goalAchieved": true, "goalProgress": 1.0, "monologue": "Done!"}"#;
        let j = journey(TraitVector::default(), config(30), ScriptedOracle::new([no, no, yes]));
        let r = j.run().await.unwrap();
        assert_eq!(r.step_count, 3);
        assert!(r.goal_achieved);
        assert_eq!(r.outcome, JourneyOutcome::GoalAchieved);
        assert_eq!(r.abandonment_reason, None);
        assert_eq!(r.full_monologue.len(), 3);
        assert_eq!(r.full_monologue[2].monologue, "Done!");
    }

    #[tokio::test]
    async fn test_runs_to_step_limit() {
        let j = journey(
            TraitVector::default(),
            config(10),
            ScriptedOracle::always(r#"{"goalAchieved": false, "action": null}"#),
        );
        let r = j.run().await.unwrap();
        assert_eq!(r.step_count, 10);
        assert_eq!(r.outcome, JourneyOutcome::MaxStepsReached);
        assert!(!r.goal_achieved);
        assert_eq!(r.abandonment_reason, None);
        assert_eq!(r.abandonment_message, None);
        assert_eq!(r.final_state.history.len(), 10);
        assert!((r.final_state.patience_remaining - 0.3).abs() < 1e-9);
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("abandonmentReason").is_none());
    }

    #[tokio::test]
    async fn test_malformed_replies_are_no_op_turns() {
        let j = journey(
            TraitVector::default(),
            config(3),
            ScriptedOracle::always("I'm not sure what to do here."),
        );
        let r = j.run().await.unwrap();
        assert_eq!(r.outcome, JourneyOutcome::MaxStepsReached);
        assert!(r.full_monologue.is_empty());
        assert_eq!(r.final_state.decision_fatigue.decisions_made, 0);
        assert!(r.final_state.memory.actions_attempted.is_empty());
    }

    #[tokio::test]
    async fn test_executor_errors_are_recorded_not_fatal() {
        let mut browser = FakeBrowser::new();
        browser.throw_on_click = true;
        let j = Journey::new(
            Persona::new("Tester", TraitVector::default()),
            config(2),
            Arc::new(ScriptedOracle::always(r#"{"action": "click:#buy"}"#)),
            Box::new(browser),
        )
        .unwrap();
        let r = j.run().await.unwrap();
        assert_eq!(r.outcome, JourneyOutcome::MaxStepsReached);
        let errors = &r.final_state.memory.errors_encountered;
        assert_eq!(errors.len(), 2);
        assert!(errors[0].error.contains("#buy"));
        // second step appraises the first step's failure
        assert!(r
            .emotional_journey
            .iter()
            .any(|e| e.trigger == crate::emotion::Trigger::Error && e.step_number == 2));
        assert_eq!(r.final_state.decision_fatigue.decisions_made, 2);
    }

    #[tokio::test]
    async fn test_failed_click_feeds_failure_trigger() {
        let mut browser = FakeBrowser::new();
        browser.fail_clicks = true;
        let j = Journey::new(
            Persona::new("Tester", TraitVector::default()),
            config(2),
            Arc::new(ScriptedOracle::always(r#"{"action": "click:#buy"}"#)),
            Box::new(browser),
        )
        .unwrap();
        let r = j.run().await.unwrap();
        assert_eq!(r.emotional_journey[0].trigger, crate::emotion::Trigger::Failure);
        assert_eq!(r.emotional_journey[0].step_number, 2);
    }

    #[tokio::test]
    async fn test_friction_points_recorded() {
        let reply = r#"{"frictionDescription": "Price hidden until checkout", "frictionElement": ".price", "mood": "frustrated"}"#;
        let j = journey(TraitVector::default(), config(1), ScriptedOracle::always(reply));
        let r = j.run().await.unwrap();
        assert_eq!(r.friction_points.len(), 1);
        let f = &r.friction_points[0];
        assert_eq!(f.url, "https://shop.example/");
        assert_eq!(f.element.as_deref(), Some(".price"));
        assert_eq!(f.mood, crate::cognitive::Mood::Frustrated);
    }

    #[tokio::test]
    async fn test_time_limit_reports_timeout() {
        let cfg = config(30).with_time_limit(5.0);
        let j = journey(
            TraitVector::default(),
            cfg,
            ScriptedOracle::always(r#"{"goalAchieved": false}"#),
        );
        let r = j.run().await.unwrap();
        // 2.5 simulated seconds per step
        assert_eq!(r.step_count, 3);
        assert_eq!(r.outcome, JourneyOutcome::TimedOut);
        assert_eq!(r.abandonment_reason, Some(AbandonmentReason::Timeout));
        assert_eq!(r.abandonment_message.as_deref(), Some(TIMEOUT_MESSAGE));
    }

    #[tokio::test]
    async fn test_oracle_failure_is_fatal() {
        let j = journey(TraitVector::default(), config(5), FailingOracle);
        assert!(matches!(
            j.run().await,
            Err(JourneyError::Oracle { step: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_oracle_hang_hits_timeout() {
        let cfg = config(5).with_oracle_timeout(0.05);
        let j = journey(TraitVector::default(), cfg, HangingOracle);
        assert!(matches!(
            j.run().await,
            Err(JourneyError::OracleTimeout { step: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected_before_start() {
        let result = Journey::new(
            Persona::new("Tester", TraitVector::default()),
            config(0),
            Arc::new(ScriptedOracle::always("{}")),
            Box::new(FakeBrowser::new()),
        );
        assert!(matches!(result, Err(JourneyError::Config(_))));
    }

    #[tokio::test]
    async fn test_vision_attaches_screenshot() {
        let oracle = Arc::new(ScriptedOracle::always(r#"{"goalAchieved": true}"#));
        let mut cfg = config(3);
        cfg.vision = true;
        let j = Journey::new(
            Persona::new("Tester", TraitVector::default()),
            cfg,
            oracle.clone(),
            Box::new(FakeBrowser::new()),
        )
        .unwrap();
        j.run().await.unwrap();
        let requests = oracle.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].screenshot.is_some());
        assert!(requests[0].user_prompt.contains("Buy a toaster"));
    }

    #[tokio::test]
    async fn test_actions_advance_simulated_clock() {
        let j = journey(
            TraitVector::default(),
            config(1),
            ScriptedOracle::always(r#"{"action": "fill:#q:toaster"}"#),
        );
        let r = j.run().await.unwrap();
        // think time + gaze lag + travel + typing
        assert!(r.total_time > 2.5 + 2.0);
        assert_eq!(r.final_state.memory.actions_attempted[0].action, "fill");
    }

    async fn patience_after(action: &str, browser: FakeBrowser) -> f64 {
        let traits = TraitVector {
            resilience: 1.0,
            ..Default::default()
        };
        let reply = format!(r#"{{"goalAchieved": false, "action": "{}"}}"#, action);
        let j = Journey::new(
            Persona::new("Tester", traits),
            config(1),
            Arc::new(ScriptedOracle::always(&reply)),
            Box::new(browser),
        )
        .unwrap();
        j.run().await.unwrap().final_state.patience_remaining
    }

    #[tokio::test]
    async fn test_link_click_to_new_page_recovers_like_navigation() {
        let navigated =
            patience_after("navigate:https://shop.example/next", FakeBrowser::new()).await;

        let mut browser = FakeBrowser::new();
        browser.click_target = Some("https://shop.example/next".into());
        let clicked = patience_after("click:a.next", browser).await;

        let in_place = patience_after("click:#tab", FakeBrowser::new()).await;

        assert!((navigated - clicked).abs() < 1e-9);
        // new page restores resilience * 0.08
        assert!((clicked - in_place - 0.08).abs() < 1e-9);
    }
}
