//! Shared plumbing for the command-line tools.
//!
//! Stdout carries exactly one JSON value per run: the result, an error report,
//! or a usage string. Logs go to stderr.

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::SearchkitConfig;
use crate::PipelineError;

/// Installs a stderr fmt subscriber filtered by `RUST_LOG`, default `warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Parses arguments. On a usage error prints the usage line as a JSON string and
/// returns the failing exit code; `--help` and `--version` print normally.
pub fn parse_args<P: Parser>() -> Result<P, ExitCode> {
    match P::try_parse() {
        Ok(args) => Ok(args),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            Err(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::debug!(error = %err, "usage_error");
            println!("{}", usage_json::<P>());
            Err(ExitCode::FAILURE)
        }
    }
}

/// The tool's usage line rendered as a JSON string.
pub fn usage_json<P: CommandFactory>() -> String {
    let usage = P::command().render_usage().to_string();
    serde_json::Value::String(usage).to_string()
}

/// Loads [`SearchkitConfig`], reporting failures as invalid input.
pub fn load_config() -> Result<SearchkitConfig, PipelineError> {
    SearchkitConfig::load().map_err(|e| PipelineError::InvalidInput(e.to_string()))
}

/// Renders the result as JSON. `Err` holds the error report to print instead.
pub fn render<T: Serialize>(tool: &str, result: Result<T, PipelineError>) -> Result<String, String> {
    let rendered = result.and_then(|value| {
        serde_json::to_string(&value).map_err(|e| PipelineError::InvalidInput(e.to_string()))
    });
    rendered.map_err(|err| {
        tracing::error!(tool, code = err.code(), error = %err, "tool_failed");
        serde_json::to_string(&err.report())
            .unwrap_or_else(|_| format!("{{\"error\":{{\"code\":\"{}\"}}}}", err.code()))
    })
}

/// Prints the rendered result or error report and picks the exit code.
pub fn finish<T: Serialize>(tool: &str, result: Result<T, PipelineError>) -> ExitCode {
    match render(tool, result) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(report) => {
            println!("{report}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    #[command(name = "embed")]
    struct Args {
        #[arg(required = true)]
        terms: Vec<String>,
    }

    #[test]
    fn usage_is_a_json_string() {
        let usage = usage_json::<Args>();
        let parsed: String = serde_json::from_str(&usage).unwrap();
        assert!(parsed.contains("embed"));
        assert!(parsed.contains("TERMS"));
    }

    #[test]
    fn render_success_and_failure() {
        assert_eq!(render("t", Ok(vec![vec![1.5f32, 2.0]])), Ok("[[1.5,2.0]]".to_string()));

        let report = render::<()>("t", Err(PipelineError::TermNotFound("qwx".into()))).unwrap_err();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["error"]["code"], "TERM_NOT_FOUND");
        assert_eq!(value["error"]["reserved"], 2);
    }
}
