//! `tracing` subscriber setup.
//!
//! Logs go to stderr, or to a daily-rolling file when
//! `[logging] directory` is set. The interactive scan screen owns stdout,
//! so nothing here writes to it. `SCANSTATION_LOG`, then `RUST_LOG`,
//! override the configured level.
//!
//! While the scan screen redraws stdout in place, stderr output would
//! shift it. [`LoggingGuard::hold_stderr`] buffers stderr log lines until
//! the returned [`StderrHold`] is dropped.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::station_config::LoggingSettings;

pub const LOG_FILE_PREFIX: &str = "scanstation.log";
pub const ENV_LOG: &str = "SCANSTATION_LOG";

/// Directive used when no filter is set in the environment.
pub fn default_directive(settings: &LoggingSettings, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        settings.level.clone()
    }
}

pub fn build_filter(directive: &str) -> Result<EnvFilter> {
    for var in [ENV_LOG, EnvFilter::DEFAULT_ENV] {
        if let Ok(filter) = EnvFilter::try_from_env(var) {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(directive).with_context(|| format!("Invalid log level '{}'", directive))
}

fn fmt_layer<S, W>(json: bool, ansi: bool, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

#[derive(Debug, Default)]
struct HoldState {
    held: bool,
    buffer: Vec<u8>,
}

/// Stderr writer that can be paused. Paused output is kept in memory.
#[derive(Clone, Default)]
pub struct HeldStderr {
    state: Arc<Mutex<HoldState>>,
}

impl HeldStderr {
    fn lock(&self) -> MutexGuard<'_, HoldState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Buffer output until the returned hold is dropped.
    pub fn hold(&self) -> StderrHold {
        self.lock().held = true;
        StderrHold {
            stderr: self.clone(),
        }
    }
}

pub struct HeldStderrWriter {
    stderr: HeldStderr,
}

impl Write for HeldStderrWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.stderr.lock();
        if state.held {
            state.buffer.extend_from_slice(buf);
            Ok(buf.len())
        } else {
            io::stderr().write(buf)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for HeldStderr {
    type Writer = HeldStderrWriter;

    fn make_writer(&'a self) -> Self::Writer {
        HeldStderrWriter {
            stderr: self.clone(),
        }
    }
}

/// Releases a [`HeldStderr`] and writes out what it buffered.
pub struct StderrHold {
    stderr: HeldStderr,
}

impl Drop for StderrHold {
    fn drop(&mut self) {
        let buffered = {
            let mut state = self.stderr.lock();
            state.held = false;
            std::mem::take(&mut state.buffer)
        };
        if !buffered.is_empty() {
            let _ = io::stderr().write_all(&buffered);
        }
    }
}

/// Keeps the file writer alive until exit so buffered output is flushed.
#[derive(Default)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
    stderr: Option<HeldStderr>,
}

impl LoggingGuard {
    /// Pause stderr logging. `None` when logs go to a file.
    pub fn hold_stderr(&self) -> Option<StderrHold> {
        self.stderr.as_ref().map(HeldStderr::hold)
    }
}

/// Install the global subscriber. Keep the returned guard alive until exit.
pub fn init(settings: &LoggingSettings, verbose: bool, force_json: bool) -> Result<LoggingGuard> {
    let filter = build_filter(&default_directive(settings, verbose))?;
    let json = settings.json || force_json;

    let (writer, ansi, guard) = match &settings.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, file) = tracing_appender::non_blocking(appender);
            let guard = LoggingGuard {
                _file: Some(file),
                stderr: None,
            };
            (BoxMakeWriter::new(writer), false, guard)
        }
        None => {
            let stderr = HeldStderr::default();
            let guard = LoggingGuard {
                _file: None,
                stderr: Some(stderr.clone()),
            };
            (
                BoxMakeWriter::new(stderr),
                console::colors_enabled_stderr(),
                guard,
            )
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(json, ansi, writer))
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(guard)
}
