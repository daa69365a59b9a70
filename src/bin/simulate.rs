//! persona-journey command-line runner.
//!
//! Loads a simulation file, runs every persona in it against the goal and
//! prints the cohort report as JSON.
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY`: oracle credentials (overrides the file)
//! - `PERSONA_JOURNEY_MODEL`: oracle model (overrides the file)
//! - `RUST_LOG`: tracing filter (default: "info,persona_journey=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin simulate -- simulation.yaml [report.json]
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use persona_journey::config::SimulationConfig;
use persona_journey::executor::{ActionExecutor, StaticPageExecutor};
use persona_journey::journey::run_cohort;
use persona_journey::oracle::{AnthropicOracle, DecisionOracle};
use persona_journey::persona::Persona;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,persona_journey=debug".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(config_path) = args.next() else {
        bail!("usage: simulate <simulation.yaml> [report.json]");
    };
    let output_path = args.next();

    let config = SimulationConfig::from_yaml_file(&config_path)
        .with_context(|| format!("loading {}", config_path))?;
    let journey_config = config.journey_config();
    let request_timeout = Duration::from_secs_f64(config.oracle.request_timeout_secs);

    let oracle: Arc<dyn DecisionOracle> = Arc::new(AnthropicOracle::new(config.oracle.clone())?);
    tracing::info!(
        "Simulating {} personas with {} against {}",
        config.personas.len(),
        oracle.name(),
        journey_config.start_url
    );

    let personas: Vec<Persona> = config.personas.iter().map(Persona::from_definition).collect();
    let report = run_cohort(personas, &journey_config, oracle, |_| {
        StaticPageExecutor::new(request_timeout).map(|e| Box::new(e) as Box<dyn ActionExecutor>)
    })
    .await;

    let json = serde_json::to_string_pretty(&report)?;
    match output_path {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("writing {}", path))?;
            tracing::info!("Report written to {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}
