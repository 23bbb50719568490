//! Logging setup and line format
//!
//! Every event is rendered as `[YYYY-MM-DD HH:MM:SS] [LEVEL] message` and sent to:
//! - the console, filtered by CLI verbosity
//! - the execution log file, all levels from INFO
//! - the error log file, ERROR and CRITICAL only
//!
//! CRITICAL is an ERROR event carrying `critical = true`; use the
//! [`critical!`](crate::critical) macro to emit one.

use crate::config::FilesConfig;
use anyhow::{Context, Result};
use std::fmt;
use std::fs::OpenOptions;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Field name that promotes an ERROR event to CRITICAL
pub const CRITICAL_FIELD: &str = "critical";

/// Emits an ERROR event rendered with the CRITICAL level
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        ::tracing::error!(critical = true, $($arg)+)
    };
}

/// Keeps the background log writers alive; drop it only at process exit
#[must_use]
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// Returns the level name written in log lines
pub fn level_label(level: &Level, critical: bool) -> &'static str {
    if *level == Level::ERROR {
        if critical {
            "CRITICAL"
        } else {
            "ERROR"
        }
    } else if *level == Level::WARN {
        "WARNING"
    } else if *level == Level::INFO {
        "INFO"
    } else if *level == Level::DEBUG {
        "DEBUG"
    } else {
        "TRACE"
    }
}

/// Event formatter producing `[timestamp] [LEVEL] message key=value...`
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketFormat;

impl<S, N> FormatEvent<S, N> for BracketFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        write!(
            writer,
            "[{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            level_label(event.metadata().level(), visitor.critical),
            visitor.message
        )?;
        for (name, value) in &visitor.fields {
            write!(writer, " {}={}", name, value)?;
        }
        writeln!(writer)
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    critical: bool,
    fields: Vec<(&'static str, String)>,
}

impl Visit for LineVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == CRITICAL_FIELD {
            self.critical = value;
        } else {
            self.fields.push((field.name(), value.to_string()));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push((field.name(), format!("{:?}", value)));
        }
    }
}

/// Builds the console filter from CLI verbosity, honoring RUST_LOG
fn console_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_alt=info,warn"),
            1 => EnvFilter::new("catalog_alt=debug,info"),
            2 => EnvFilter::new("catalog_alt=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    }
}

fn open_append(path: &str) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path))
}

/// Installs the global subscriber with console, execution log and error log sinks
pub fn init_logging(files: &FilesConfig, verbose: u8, quiet: bool) -> Result<LogGuards> {
    let (log_writer, log_guard) = tracing_appender::non_blocking(open_append(&files.log)?);
    let (error_writer, error_guard) =
        tracing_appender::non_blocking(open_append(&files.error_log)?);

    let console = tracing_subscriber::fmt::layer()
        .event_format(BracketFormat)
        .with_writer(std::io::stdout)
        .with_filter(console_filter(verbose, quiet));

    let execution_log = tracing_subscriber::fmt::layer()
        .event_format(BracketFormat)
        .with_ansi(false)
        .with_writer(log_writer)
        .with_filter(EnvFilter::new("catalog_alt=info,warn"));

    let error_log = tracing_subscriber::fmt::layer()
        .event_format(BracketFormat)
        .with_ansi(false)
        .with_writer(error_writer)
        .with_filter(LevelFilter::ERROR);

    tracing_subscriber::registry()
        .with(console)
        .with(execution_log)
        .with(error_log)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(LogGuards {
        _guards: vec![log_guard, error_guard],
    })
}
