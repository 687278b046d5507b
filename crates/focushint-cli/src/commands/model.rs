use clap::Subcommand;
use focushint_core::{Config, OllamaClient, TextGenerator};
use serde_json::json;

use super::{print_json, runtime, CmdResult};

#[derive(Subcommand)]
pub enum ModelAction {
    /// Check whether the backend answers
    Probe,
}

pub fn run(action: ModelAction) -> CmdResult {
    match action {
        ModelAction::Probe => {
            let config = Config::load()?;
            let client = OllamaClient::new(&config.model)?;
            let available = runtime()?.block_on(client.probe());
            print_json(&json!({
                "base_url": config.model.base_url,
                "model": client.model(),
                "available": available,
            }))
        }
    }
}
