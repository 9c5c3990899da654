pub mod config;
pub mod migrate;
pub mod report;
pub mod seed;

use serde::Serialize;

/// What a subcommand hands back to `main`: a process exit code and the
/// exact text to print on stdout.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<'a> {
    command: &'a str,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<&'a str>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            output: render_outcome(CommandOutcome {
                command,
                status: "ok",
                error_class: None,
                message: message.into(),
            }),
        }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self {
            exit_code,
            output: render_outcome(CommandOutcome {
                command,
                status: "error",
                error_class: Some(error_class),
                message: message.into(),
            }),
        }
    }

    /// For commands whose payload is the result itself, such as a rendered
    /// report.
    pub fn raw(output: String) -> Self {
        Self { exit_code: 0, output }
    }
}

fn render_outcome(outcome: CommandOutcome<'_>) -> String {
    serde_json::to_string(&outcome).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
    tokio::runtime::Builder::new_current_thread().enable_all().build()
}
