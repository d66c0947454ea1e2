//! Logging for the composition run.
//!
//! Two outputs:
//! - diagnostics via `tracing` (stderr, stdout or a file, chosen by `--log`)
//! - the operator channel: plain lines prefixed with the package name,
//!   used for the `merged`/`computed` dumps and ordering warnings

use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Where tracing output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    /// Append to a file, without ANSI colors.
    File(PathBuf),
}

impl std::str::FromStr for LogTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" | "off" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            "" => return Err("Log target must not be empty".to_string()),
            filename => LogTarget::File(PathBuf::from(filename)),
        })
    }
}

/// `RUST_LOG` when set, otherwise `debug` or `info` depending on `verbose`.
fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global tracing subscriber.
pub fn init_tracing(target: &LogTarget, verbose: bool) -> Result<()> {
    match target {
        LogTarget::Off => {}
        LogTarget::Stdout => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter(verbose))
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::Stderr => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter(verbose))
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter(verbose))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[derive(Clone)]
enum Sink {
    Stdout,
    Buffer(Arc<Mutex<Vec<String>>>),
}

/// Operator-facing log channel.
///
/// Every line is `"<name>: <message>"`. Lines are also mirrored to tracing
/// at debug level.
#[derive(Clone)]
pub struct Logger {
    name: String,
    sink: Sink,
}

impl Logger {
    /// Logger writing to stdout.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink: Sink::Stdout,
        }
    }

    /// Logger collecting lines in memory, read back with [`Logger::lines`].
    pub fn buffered(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink: Sink::Buffer(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Format a line without emitting it.
    pub fn format_line(&self, message: &str) -> String {
        format!("{}: {}", self.name, message)
    }

    /// Emit one message.
    pub fn log(&self, message: &str) {
        let line = self.format_line(message);
        tracing::debug!(logger = %self.name, "{}", message);
        match &self.sink {
            Sink::Stdout => println!("{}", line),
            Sink::Buffer(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(line);
                }
            }
        }
    }

    /// Emit several parts joined by single spaces.
    pub fn log_parts(&self, parts: &[&dyn std::fmt::Display]) {
        let message = parts
            .iter()
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.log(&message);
    }

    /// Emit a `WARNING:` line and a tracing warning.
    pub fn warning(&self, message: &str) {
        tracing::warn!(logger = %self.name, "{}", message);
        let parts: [&dyn std::fmt::Display; 2] = [&"WARNING:", &message];
        self.log_parts(&parts);
    }

    /// Lines collected so far; always empty for stdout loggers.
    pub fn lines(&self) -> Vec<String> {
        match &self.sink {
            Sink::Stdout => Vec::new(),
            Sink::Buffer(lines) => lines.lock().map(|l| l.clone()).unwrap_or_default(),
        }
    }
}
