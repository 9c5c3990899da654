use std::path::Path;

use chrono::{DateTime, Utc};

use shoplens_core::{AnalyticsConfig, AnalyticsEngine, AnalyticsReport};
use shoplens_store::{connect, load_snapshot, SqliteRecordStore};

use crate::commands::{self, CommandResult};

pub fn run(
    database_url: &str,
    config_path: Option<&Path>,
    as_of: Option<&str>,
    pretty: bool,
) -> CommandResult {
    let config = match AnalyticsConfig::load(config_path) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "report",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let as_of = match as_of {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(instant) => instant.with_timezone(&Utc),
            Err(error) => {
                return CommandResult::failure(
                    "report",
                    "invalid_argument",
                    format!("--as-of must be RFC 3339: {error}"),
                    2,
                );
            }
        },
        None => Utc::now(),
    };

    let runtime = match commands::runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "report",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect(database_url)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let store = SqliteRecordStore::new(pool);
        let snapshot = load_snapshot(&store)
            .await
            .map_err(|error| ("snapshot_load", error.to_string(), 5u8))?;
        Ok::<_, (&'static str, String, u8)>(AnalyticsEngine::new(config).analyze(&snapshot, as_of))
    });

    match result {
        Ok(report) => render(&report, pretty),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("report", error_class, message, exit_code)
        }
    }
}

fn render(report: &AnalyticsReport, pretty: bool) -> CommandResult {
    let rendered = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    match rendered {
        Ok(output) => CommandResult::raw(output),
        Err(error) => CommandResult::failure("report", "serialization", error.to_string(), 6),
    }
}
