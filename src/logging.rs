//! Run logger setup.
//!
//! Installs a global tracing subscriber that mirrors to stdout and writes to a
//! per-run log file named after the moment logging started, e.g.
//! `log2024-05-01 09:30:12.log`. File lines use the fixed layout
//! `<timestamp> - <level> - <message>`.
//!
//! Setup is idempotent inside a process: later calls hand back the session
//! created by the first call. Two processes that start within the same second
//! resolve to the same file name and both append to it.

use std::{
    fmt as std_fmt,
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing::{Event, Subscriber};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{
        self, FmtContext, FormatEvent, FormatFields,
        format::Writer,
        time::{FormatTime, OffsetTime},
    },
    prelude::*,
    registry::LookupSpan,
};

use crate::app_dirs;

const LOG_FILE_PREFIX: &str = "log";

static LOG_SESSION: OnceLock<LogSession> = OnceLock::new();
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log directory could not be resolved or created.
    #[error("Failed to prepare log directory: {0}")]
    LogDir(#[from] app_dirs::AppDirError),
    /// Failed to format a timestamp for the log filename.
    #[error("Failed to format log filename time: {0}")]
    FormatTime(time::error::Format),
    /// Failed to create the log file for this run.
    #[error("Failed to create log file at {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to set the global tracing subscriber.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// The log file owned by the current run.
#[derive(Debug, Clone)]
pub struct LogSession {
    path: PathBuf,
}

impl LogSession {
    /// Full path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the log file.
    pub fn dir(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// Install the run logger, writing into `log_dir` or the default logs directory.
///
/// Returns the existing session when logging is already installed.
pub fn init(log_dir: Option<&Path>) -> Result<&'static LogSession, LoggingError> {
    if let Some(session) = LOG_SESSION.get() {
        return Ok(session);
    }

    let log_dir = match log_dir {
        Some(dir) => {
            app_dirs::ensure_dir(dir)?;
            dir.to_path_buf()
        }
        None => app_dirs::logs_dir()?,
    };
    let started_at = now_local_or_utc();
    let (log_path, log_file_name) = prepare_log_file(&log_dir, started_at)?;

    let file_appender = rolling::never(&log_dir, log_file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let timer = build_timer();
    let stdout_layer = fmt::layer()
        .with_timer(timer.clone())
        .with_writer(std::io::stdout);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .event_format(RunLogFormat::new(timer))
        .with_writer(file_writer);

    let subscriber = Registry::default()
        .with(build_env_filter())
        .with(stdout_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;
    let _ = LOG_GUARD.set(guard);

    let session = LOG_SESSION.get_or_init(|| LogSession { path: log_path });
    tracing::info!("Logging initialized; log file at {}", session.path.display());
    Ok(session)
}

/// Resolve the file for `started_at` inside `dir` and make sure it exists.
///
/// The file is opened in append mode, so a name collision reuses the file
/// instead of truncating it.
fn prepare_log_file(
    dir: &Path,
    started_at: OffsetDateTime,
) -> Result<(PathBuf, String), LoggingError> {
    let name = format_log_file_name(started_at)?;
    let path = dir.join(&name);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::CreateLogFile {
            path: path.clone(),
            source,
        })?;
    Ok((path, name))
}

fn format_log_file_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let stamp = now.format(NAME_FORMAT).map_err(LoggingError::FormatTime)?;
    let stamp = if cfg!(windows) {
        stamp.replace(':', "-")
    } else {
        stamp
    };
    Ok(format!("{LOG_FILE_PREFIX}{stamp}.log"))
}

fn build_timer() -> OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const DISPLAY_FORMAT: &[FormatItem<'static>] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second],[subsecond digits:3]"
    );
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, DISPLAY_FORMAT.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Event formatter producing `<timestamp> - <level> - <message>` lines.
#[derive(Debug, Clone)]
struct RunLogFormat<T> {
    timer: T,
}

impl<T> RunLogFormat<T> {
    fn new(timer: T) -> Self {
        Self { timer }
    }
}

impl<S, N, T> FormatEvent<S, N> for RunLogFormat<T>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
    T: FormatTime,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std_fmt::Result {
        self.timer.format_time(&mut writer)?;
        write!(writer, " - {} - ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
