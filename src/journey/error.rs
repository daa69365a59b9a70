//! Journey errors.
//!
//! Only two things end a journey with an error: bad configuration (before
//! any state exists) and failing to get any answer from the oracle.
//! Abandonment is an outcome, not an error.

use thiserror::Error;

use crate::config::ConfigError;
use crate::oracle::OracleError;

#[derive(Debug, Error)]
pub enum JourneyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Decision oracle failed at step {step}: {source}")]
    Oracle {
        step: u32,
        #[source]
        source: OracleError,
    },

    #[error("Decision oracle did not answer within {seconds}s at step {step}")]
    OracleTimeout { step: u32, seconds: f64 },
}
