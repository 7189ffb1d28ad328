//! Revival simulation binary.
//!
//! Composition root that assembles:
//! 1. Configuration from the environment (and `.env`)
//! 2. Logging (stderr plus a rolling log file)
//! 3. Runtime over the simulated host via the bootstrap builder
//! 4. The scripted session in [`revival_client::Simulation`]
//!
//! # Examples
//!
//! ```bash
//! # Default rules
//! cargo run -p revival-client
//!
//! # Verification mode with a short window
//! REVIVAL_TESTING=1 REVIVAL_INVULNERABILITY_SECS=3 cargo run -p revival-client
//! ```

use anyhow::Result;
use client_bootstrap::{ClientConfig, RuntimeBuilder, setup_logging};
use revival_client::Simulation;
use runtime::ScriptedInput;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 1. Load configuration from environment
    let config = ClientConfig::from_env()?;

    // 2. Setup logging
    let _log_guard = setup_logging(config.log_dir.as_deref())?;

    tracing::info!("Starting revival simulation");
    tracing::info!("Local participant: {}", config.local_participant);
    tracing::info!("Bypass requirements: {}", config.revival.bypass_requirements);

    // 3. Build Runtime
    let input = ScriptedInput::new();
    let setup = RuntimeBuilder::new(config)
        .input_provider(input.clone())
        .build()
        .await?;

    // 4. Run the scripted session
    let summary = Simulation::new(setup, input).run().await?;

    tracing::info!("Transitions: {:?}", summary.transitions);
    for error in &summary.rejections {
        tracing::info!("Rejected: {error}");
    }
    for message in &summary.notifications {
        tracing::info!("Notification: {message}");
    }
    tracing::info!(
        "Final state: {}, cooldown remaining: {}s",
        summary.final_state,
        summary.remaining_cooldown.as_secs()
    );

    Ok(())
}
