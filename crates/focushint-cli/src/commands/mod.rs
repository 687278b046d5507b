pub mod activity;
pub mod config;
pub mod event;
pub mod hints;
pub mod model;
pub mod prefs;
pub mod trigger;

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use focushint_core::{Config, Database, HintComposer, HintOrchestrator, OllamaClient};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn Error>>;

pub fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn Error>> {
    Ok(tokio::runtime::Runtime::new()?)
}

/// Build the orchestrator over the default database.
///
/// With `probe` false the backend is assumed down and never contacted,
/// which is all template hints need.
pub async fn orchestrator(
    config: &Config,
    probe: bool,
) -> Result<Arc<HintOrchestrator<OllamaClient>>, Box<dyn Error>> {
    let db = Database::open()?;
    let client = OllamaClient::new(&config.model)?;
    let timeout = Duration::from_secs(config.model.timeout_secs);
    let composer = if probe {
        HintComposer::probed(client, timeout).await
    } else {
        HintComposer::new(client, false, timeout)
    };
    Ok(Arc::new(HintOrchestrator::from_config(
        Arc::new(Mutex::new(db)),
        composer,
        config,
    )))
}
