//! Runtime configuration read from the environment
//!
//! Parsed once per process, on first use:
//! - `STRATA_LOG` → tracing filter directive (default `warn`)
//! - `STRATA_UNCAUGHT` → uncaught-error report format and destination
//!   - unset, `1` or `human` → human-readable to stderr
//!   - `json` → JSON to stderr
//!   - `json:/path` → JSON to file
//! - `STRATA_ON_UNCAUGHT` → `exit` (status 1, the default) or `abort`
//!
//! Unrecognised values fall back to the default. The fallbacks are kept as
//! warnings and logged once `logging::init` has a subscriber installed.

use std::path::PathBuf;
use std::sync::OnceLock;

pub const LOG_ENV: &str = "STRATA_LOG";
pub const UNCAUGHT_ENV: &str = "STRATA_UNCAUGHT";
pub const ON_UNCAUGHT_ENV: &str = "STRATA_ON_UNCAUGHT";

pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Output format of the uncaught-error report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFormat {
    Human,
    Json,
}

/// Where the uncaught-error report goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDestination {
    Stderr,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncaughtReport {
    pub format: ReportFormat,
    pub destination: ReportDestination,
}

impl Default for UncaughtReport {
    fn default() -> Self {
        UncaughtReport {
            format: ReportFormat::Human,
            destination: ReportDestination::Stderr,
        }
    }
}

impl UncaughtReport {
    /// Parse a `STRATA_UNCAUGHT` value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "1" | "human" => Some(UncaughtReport::default()),
            "json" => Some(UncaughtReport {
                format: ReportFormat::Json,
                destination: ReportDestination::Stderr,
            }),
            s if s.starts_with("json:") && s.len() > 5 => Some(UncaughtReport {
                format: ReportFormat::Json,
                destination: ReportDestination::File(PathBuf::from(&s[5..])),
            }),
            _ => None,
        }
    }
}

/// How the process terminates after an uncaught failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UncaughtAction {
    #[default]
    Exit,
    Abort,
}

impl UncaughtAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "exit" => Some(UncaughtAction::Exit),
            "abort" => Some(UncaughtAction::Abort),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub log_filter: String,
    pub report: UncaughtReport,
    pub on_uncaught: UncaughtAction,
    /// Values that were not recognised, one message each
    pub warnings: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            report: UncaughtReport::default(),
            on_uncaught: UncaughtAction::default(),
            warnings: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let log = std::env::var(LOG_ENV).ok();
        let uncaught = std::env::var(UNCAUGHT_ENV).ok();
        let on_uncaught = std::env::var(ON_UNCAUGHT_ENV).ok();
        Self::from_values(log.as_deref(), uncaught.as_deref(), on_uncaught.as_deref())
    }

    /// Build from raw variable values; empty counts as unset
    pub fn from_values(
        log: Option<&str>,
        uncaught: Option<&str>,
        on_uncaught: Option<&str>,
    ) -> Self {
        let mut config = RuntimeConfig::default();

        if let Some(filter) = log.filter(|v| !v.is_empty()) {
            config.log_filter = filter.to_string();
        }

        if let Some(value) = uncaught.filter(|v| !v.is_empty()) {
            match UncaughtReport::parse(value) {
                Some(report) => config.report = report,
                None => config.warnings.push(format!(
                    "{}='{}' not recognized, using human report on stderr",
                    UNCAUGHT_ENV, value
                )),
            }
        }

        if let Some(value) = on_uncaught.filter(|v| !v.is_empty()) {
            match UncaughtAction::parse(value) {
                Some(action) => config.on_uncaught = action,
                None => config.warnings.push(format!(
                    "{}='{}' not recognized, using exit",
                    ON_UNCAUGHT_ENV, value
                )),
            }
        }

        config
    }
}

static RUNTIME_CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

/// The process-wide configuration, read from the environment on first call
pub fn runtime_config() -> &'static RuntimeConfig {
    RUNTIME_CONFIG.get_or_init(RuntimeConfig::from_env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_values(None, None, None);
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.log_filter, "warn");
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn test_parse_report() {
        assert_eq!(UncaughtReport::parse("1"), Some(UncaughtReport::default()));
        assert_eq!(
            UncaughtReport::parse("json").map(|r| r.format),
            Some(ReportFormat::Json)
        );
        assert_eq!(
            UncaughtReport::parse("json:/tmp/err.json").map(|r| r.destination),
            Some(ReportDestination::File(PathBuf::from("/tmp/err.json")))
        );
        assert_eq!(UncaughtReport::parse("json:"), None);
        assert_eq!(UncaughtReport::parse("yaml"), None);
    }

    #[test]
    fn test_unrecognised_values_fall_back() {
        let config = RuntimeConfig::from_values(Some(""), Some("xml"), Some("explode"));
        assert_eq!(config.report, UncaughtReport::default());
        assert_eq!(config.on_uncaught, UncaughtAction::Exit);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.warnings.len(), 2);
        assert!(config.warnings[0].contains("STRATA_UNCAUGHT='xml'"));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        // SAFETY: serialized with every other test touching these variables
        unsafe {
            std::env::set_var(LOG_ENV, "strata_runtime=debug");
            std::env::set_var(UNCAUGHT_ENV, "json");
            std::env::set_var(ON_UNCAUGHT_ENV, "abort");
        }
        let config = RuntimeConfig::from_env();
        unsafe {
            std::env::remove_var(LOG_ENV);
            std::env::remove_var(UNCAUGHT_ENV);
            std::env::remove_var(ON_UNCAUGHT_ENV);
        }

        assert_eq!(config.log_filter, "strata_runtime=debug");
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.on_uncaught, UncaughtAction::Abort);
    }
}
