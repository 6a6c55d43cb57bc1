//! Uncaught failures
//!
//! A failure that reaches a boundary with no armed checkpoint ends the
//! program: the report configured by `STRATA_UNCAUGHT` is written, then the
//! process exits (status 1) or aborts per `STRATA_ON_UNCAUGHT`.
//!
//! Human report:
//! ```text
//! Error: index 7 out of array bounds
//!   at 12:9
//! ```
//!
//! JSON report (`report-json` feature, enabled by default):
//! ```text
//! {"line":12,"col":9,"message":"index 7 out of array bounds"}
//! ```

use crate::config::{ReportDestination, ReportFormat, UncaughtAction, UncaughtReport, runtime_config};
use std::io::Write;
use strata_core::{ErrorContext, ErrorPayload, RuntimeError};

/// Render `payload` in the given format (no trailing newline)
pub fn render_report(payload: &ErrorPayload, format: &ReportFormat) -> String {
    match format {
        ReportFormat::Human => format_human(payload),
        ReportFormat::Json => format_json(payload),
    }
}

fn format_human(payload: &ErrorPayload) -> String {
    format!("Error: {}\n  at {}", payload.message, payload.position)
}

#[cfg(feature = "report-json")]
fn format_json(payload: &ErrorPayload) -> String {
    serde_json::to_string(payload).unwrap_or_else(|_| format_human(payload))
}

#[cfg(not(feature = "report-json"))]
fn format_json(payload: &ErrorPayload) -> String {
    tracing::warn!("JSON uncaught report requested but report-json is disabled");
    format_human(payload)
}

/// Write the report for `payload` to its configured destination
pub fn write_report(payload: &ErrorPayload, report: &UncaughtReport) -> std::io::Result<()> {
    let text = render_report(payload, &report.format);
    match &report.destination {
        ReportDestination::Stderr => {
            let mut stderr = std::io::stderr().lock();
            writeln!(stderr, "{}", text)?;
            stderr.flush()
        }
        ReportDestination::File(path) => std::fs::write(path, format!("{}\n", text)),
    }
}

/// Report `payload` and terminate the process
pub fn fatal(payload: &ErrorPayload) -> ! {
    let config = runtime_config();
    tracing::error!(error = %payload, "uncaught failure");

    if let Err(e) = write_report(payload, &config.report) {
        // Fall back to plain stderr
        eprintln!("Error: {}\n  at {}", payload.message, payload.position);
        eprintln!("(uncaught report could not be written: {})", e);
    }

    match config.on_uncaught {
        UncaughtAction::Exit => std::process::exit(1),
        UncaughtAction::Abort => std::process::abort(),
    }
}

/// Boundary check for a region's result
///
/// An error is recorded in `ctx`. If a checkpoint is armed it is handed
/// back for the caller to propagate; otherwise the program ends.
pub fn finish<T>(ctx: &mut ErrorContext, result: Result<T, RuntimeError>) -> Result<T, RuntimeError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            ctx.fail_with(&err);
            if ctx.is_armed() {
                Err(err)
            } else {
                fatal(&err.into_payload())
            }
        }
    }
}

/// Run a top-level task with a fresh error context
///
/// Failures that escape every checkpoint inside `body` are fatal.
pub fn run<T, F>(body: F) -> T
where
    F: FnOnce(&mut ErrorContext) -> Result<T, RuntimeError>,
{
    let mut ctx = ErrorContext::new();
    let result = body(&mut ctx);
    match finish(&mut ctx, result) {
        Ok(value) => value,
        Err(err) => fatal(&err.into_payload()),
    }
}
