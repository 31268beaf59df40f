// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized logging setup
//!
//! Every binary in the workspace initializes `tracing` through this crate so
//! that `RUST_LOG`, output format and log-file handling behave the same way
//! everywhere.

use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing::Level;

/// Log line encoding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Plaintext,
    /// One JSON object per line
    Json,
}

/// `--log-level` values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliLogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

/// Logging flags for a binary's argument struct
///
/// Use with `#[command(flatten)]`. Output goes to stderr unless `--log-file`
/// or `--log-dir` is given. Stdout stays free for the values a binary prints
/// for its caller (bound URL, token).
#[derive(Clone, Debug, Default, clap::Args)]
pub struct CliLoggingArgs {
    /// Verbosity when `RUST_LOG` is unset [default: info]
    #[arg(long, value_enum)]
    pub log_level: Option<CliLogLevel>,

    /// Line encoding [default: plaintext]
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Write logs to `<dir>/<component>.log` instead of stderr
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Write logs to this file, relative to `--log-dir` when both are given
    #[arg(long)]
    pub log_file: Option<String>,
}

impl CliLoggingArgs {
    /// Install the global subscriber for `component`
    pub fn init(self, component: &str) -> anyhow::Result<()> {
        let level = self.log_level.unwrap_or_default().into();
        let format = self.log_format.unwrap_or_default();

        match self.resolve_log_path(component) {
            Some(log_path) => init_to_file(component, level, format, &log_path),
            None => init(component, level, format),
        }
    }

    /// Resolve the log file path, if file logging was requested
    ///
    /// 1. An absolute `log_file` is used as is
    /// 2. A relative `log_file` is joined onto `log_dir` when one is given
    /// 3. A bare `log_dir` gets `<component>.log`
    pub fn resolve_log_path(&self, component: &str) -> Option<PathBuf> {
        match (&self.log_file, &self.log_dir) {
            (Some(file), _) if Path::new(file).is_absolute() => Some(PathBuf::from(file)),
            (Some(file), Some(dir)) => Some(Path::new(dir).join(file)),
            (Some(file), None) => Some(PathBuf::from(file)),
            (None, Some(dir)) => Some(Path::new(dir).join(format!("{}.log", component))),
            (None, None) => None,
        }
    }
}

/// Log to stderr
///
/// ```rust
/// use wbt_logging::{init, Level, LogFormat};
///
/// fn main() -> anyhow::Result<()> {
///     init("wbt-fs-bridge", Level::INFO, LogFormat::Plaintext)?;
///     tracing::info!("bridge starting");
///     Ok(())
/// }
/// ```
pub fn init(component: &str, default_level: Level, format: LogFormat) -> anyhow::Result<()> {
    init_with_writer(component, default_level, format, io::stderr)
}

/// Append to `log_path`, creating its parent directory when missing
pub fn init_to_file(
    component: &str,
    default_level: Level,
    format: LogFormat,
    log_path: &Path,
) -> anyhow::Result<()> {
    use std::fs;

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let log_file = fs::OpenOptions::new().create(true).append(true).open(log_path)?;

    init_with_writer(component, default_level, format, std::sync::Mutex::new(log_file))
}

/// Log through `writer`.
///
/// Without `RUST_LOG`, the component's own crate logs at `default_level` and
/// everything else (hyper, tower-http) at `warn` or quieter.
pub fn init_with_writer<W>(
    component: &str,
    default_level: Level,
    format: LogFormat,
    writer: W,
) -> anyhow::Result<()>
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let others = default_level.min(Level::WARN);
    let target = component.replace('-', "_");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{others},{target}={default_level}")));

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).json();
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
        LogFormat::Plaintext => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer);
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
    }

    Ok(())
}

/// Stand-in for a secret in log fields
///
/// ```rust
/// use wbt_logging::redact;
///
/// let token = "c2VjcmV0";
/// tracing::info!(token = %redact(token), "token configured");
/// // Output: token="[REDACTED]"
/// ```
pub fn redact(_value: impl std::fmt::Display) -> &'static str {
    "[REDACTED]"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact() {
        assert_eq!(format!("{}", redact("sensitive-data")), "[REDACTED]");
    }

    #[test]
    fn test_cli_log_level_conversion() {
        assert_eq!(Level::from(CliLogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(CliLogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(CliLogLevel::Info), Level::INFO);
        assert_eq!(Level::from(CliLogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(CliLogLevel::Trace), Level::TRACE);
        assert_eq!(CliLogLevel::default(), CliLogLevel::Info);
    }

    #[test]
    fn test_flags_parse_into_logging_args() {
        use clap::Parser;

        #[derive(Parser)]
        struct Cli {
            #[command(flatten)]
            logging: CliLoggingArgs,
        }

        let cli = Cli::parse_from(["bin", "--log-level", "debug", "--log-format", "json"]);
        assert_eq!(cli.logging.log_level, Some(CliLogLevel::Debug));
        assert_eq!(cli.logging.log_format, Some(LogFormat::Json));

        let cli = Cli::parse_from(["bin"]);
        assert_eq!(cli.logging.log_level, None);
        assert_eq!(cli.logging.log_format, None);
    }

    #[test]
    fn test_console_logging_without_file_options() {
        let args = CliLoggingArgs::default();
        assert_eq!(args.resolve_log_path("wbt-fs-bridge"), None);
    }

    #[test]
    fn test_log_path_resolution() {
        let dir_only = CliLoggingArgs {
            log_dir: Some("/var/log/wbt".to_string()),
            ..Default::default()
        };
        assert_eq!(
            dir_only.resolve_log_path("wbt-fs-bridge"),
            Some(PathBuf::from("/var/log/wbt/wbt-fs-bridge.log"))
        );

        let relative_file = CliLoggingArgs {
            log_dir: Some("/var/log/wbt".to_string()),
            log_file: Some("bridge.log".to_string()),
            ..Default::default()
        };
        assert_eq!(
            relative_file.resolve_log_path("wbt-fs-bridge"),
            Some(PathBuf::from("/var/log/wbt/bridge.log"))
        );

        let tmp = tempfile::tempdir().unwrap();
        let absolute = tmp.path().join("bridge.log");
        let absolute_file = CliLoggingArgs {
            log_dir: Some("/ignored".to_string()),
            log_file: Some(absolute.to_string_lossy().into_owned()),
            ..Default::default()
        };
        assert_eq!(absolute_file.resolve_log_path("wbt-fs-bridge"), Some(absolute));
    }
}
