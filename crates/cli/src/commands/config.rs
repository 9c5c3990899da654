use std::path::Path;

use shoplens_core::AnalyticsConfig;

use crate::commands::CommandResult;

pub fn run(config_path: Option<&Path>) -> CommandResult {
    let config = match AnalyticsConfig::load(config_path) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    match serde_json::to_string_pretty(&config) {
        Ok(output) => CommandResult::raw(output),
        Err(error) => CommandResult::failure("config", "serialization", error.to_string(), 6),
    }
}
