//! Journeys: one persona pursuing one goal, step by step.
//!
//! [`Journey`] owns the loop; [`run_cohort`] fans a goal out over many
//! personas.  Results serialize as camelCase JSON.

pub mod cohort;
pub mod error;
pub mod orchestrator;
pub mod result;

pub use cohort::{run_cohort, CohortEntry, CohortReport};
pub use error::JourneyError;
pub use orchestrator::{Journey, TIMEOUT_MESSAGE};
pub use result::{
    FrictionPoint, JourneyOutcome, JourneyResult, MonologueEntry, Summary, ValenceTrend,
};
