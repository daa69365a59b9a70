//! Run one goal across many personas and aggregate the outcomes.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use super::orchestrator::Journey;
use super::result::JourneyResult;
use crate::abandonment::AbandonmentReason;
use crate::config::JourneyConfig;
use crate::executor::{ActionExecutor, ExecutorError};
use crate::oracle::DecisionOracle;
use crate::persona::Persona;

/// One persona's line in a cohort report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortEntry {
    pub persona: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JourneyResult>,
    /// Set when the journey could not run to a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortReport {
    pub goal: String,
    pub entries: Vec<CohortEntry>,
    /// Share of finished journeys that achieved the goal.
    pub completion_rate: f64,
    pub abandonment_counts: BTreeMap<AbandonmentReason, usize>,
    pub median_steps: Option<f64>,
}

impl CohortReport {
    fn from_entries(goal: String, entries: Vec<CohortEntry>) -> Self {
        let results: Vec<&JourneyResult> = entries.iter().filter_map(|e| e.result.as_ref()).collect();

        let completion_rate = if results.is_empty() {
            0.0
        } else {
            results.iter().filter(|r| r.goal_achieved).count() as f64 / results.len() as f64
        };

        let mut abandonment_counts = BTreeMap::new();
        for reason in results.iter().filter_map(|r| r.abandonment_reason) {
            *abandonment_counts.entry(reason).or_insert(0) += 1;
        }

        let mut steps: Vec<u32> = results.iter().map(|r| r.step_count).collect();
        steps.sort_unstable();
        let median_steps = match steps.len() {
            0 => None,
            n if n % 2 == 1 => Some(steps[n / 2] as f64),
            n => Some((steps[n / 2 - 1] + steps[n / 2]) as f64 / 2.0),
        };

        Self {
            goal,
            entries,
            completion_rate,
            abandonment_counts,
            median_steps,
        }
    }
}

/// Run `personas` concurrently against the same goal.
///
/// Each journey gets its own executor from `make_executor`; the oracle is
/// shared.  Failures are reported per persona and never stop the others.
pub async fn run_cohort<F>(
    personas: Vec<Persona>,
    config: &JourneyConfig,
    oracle: Arc<dyn DecisionOracle>,
    mut make_executor: F,
) -> CohortReport
where
    F: FnMut(&Persona) -> Result<Box<dyn ActionExecutor>, ExecutorError>,
{
    log::info!(
        "Running {} personas against goal: {}",
        personas.len(),
        config.goal
    );

    let mut names = Vec::with_capacity(personas.len());
    let mut runs = Vec::with_capacity(personas.len());
    for persona in personas {
        names.push(persona.name.clone());
        let executor = make_executor(&persona);
        let config = config.clone();
        let oracle = Arc::clone(&oracle);
        runs.push(async move {
            let executor = executor.map_err(|e| format!("Executor setup failed: {}", e))?;
            let journey = Journey::new(persona, config, oracle, executor).map_err(|e| e.to_string())?;
            journey.run().await.map_err(|e| e.to_string())
        });
    }

    let entries = names
        .into_iter()
        .zip(join_all(runs).await)
        .map(|(persona, outcome)| match outcome {
            Ok(result) => CohortEntry {
                persona,
                result: Some(result),
                error: None,
            },
            Err(error) => {
                log::warn!("Journey for '{}' failed: {}", persona, error);
                CohortEntry {
                    persona,
                    result: None,
                    error: Some(error),
                }
            }
        })
        .collect();

    let report = CohortReport::from_entries(config.goal.clone(), entries);
    log::info!(
        "Cohort finished: {:.0}% completion, abandonments {:?}",
        report.completion_rate * 100.0,
        report.abandonment_counts
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::orchestrator::tests::{config, FakeBrowser, ScriptedOracle};
    use crate::persona::TraitVector;

    fn browser(_: &Persona) -> Result<Box<dyn ActionExecutor>, ExecutorError> {
        Ok(Box::new(FakeBrowser::new()))
    }

    #[test]
    fn test_cohort_aggregates_outcomes() {
        let impatient = Persona::new(
            "Rushed",
            TraitVector {
                patience: 0.05,
                ..Default::default()
            },
        );
        let steady = Persona::new("Steady", TraitVector::default());
        let oracle = Arc::new(ScriptedOracle::always(r#"{"goalAchieved": false}"#));

        let report = tokio_test::block_on(run_cohort(
            vec![impatient, steady],
            &config(4),
            oracle,
            browser,
        ));

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].persona, "Rushed");
        assert_eq!(report.completion_rate, 0.0);
        assert_eq!(
            report.abandonment_counts.get(&AbandonmentReason::Patience),
            Some(&1)
        );
        // steps 1 and 4
        assert_eq!(report.median_steps, Some(2.5));
    }

    #[test]
    fn test_executor_setup_failure_is_per_persona() {
        let oracle = Arc::new(ScriptedOracle::always(r#"{"goalAchieved": true}"#));
        let personas = vec![
            Persona::new("Broken", TraitVector::default()),
            Persona::new("Fine", TraitVector::default()),
        ];
        let report = tokio_test::block_on(run_cohort(personas, &config(4), oracle, |p: &Persona| {
            if p.name == "Broken" {
                Err(ExecutorError::Unsupported("no browser".into()))
            } else {
                browser(p)
            }
        }));

        assert!(report.entries[0].result.is_none());
        assert!(report.entries[0]
            .error
            .as_deref()
            .unwrap()
            .contains("no browser"));
        assert_eq!(report.completion_rate, 1.0);
        assert_eq!(report.median_steps, Some(1.0));
    }

    #[test]
    fn test_empty_cohort() {
        let report = CohortReport::from_entries("goal".into(), Vec::new());
        assert_eq!(report.completion_rate, 0.0);
        assert_eq!(report.median_steps, None);
        assert!(report.abandonment_counts.is_empty());
    }
}
