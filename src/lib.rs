//! # LogSpool
//!
//! LogSpool is an in-process, asynchronous, time-windowed file logger.
//! Callers on any thread emit leveled records; a single background writer
//! stamps, rotates and appends them to `<dir>/<base>_<suffix>.log`, starting
//! a new file whenever the current minute, hour, day or week window ends.
//! Rotation is checked on the write path, so files only roll over when
//! there is traffic, and a retention sweep keeps at most a configured number
//! of historical files per naming pattern.
//!
//! Records are queued on a bounded channel. When the queue is full,
//! producers block until the writer catches up: records are never dropped.
//! Records from a single producer are written in the order they were
//! emitted.
//!
//! ## Example
//!
//! ```rust
//! use logspool::{infof, Granularity, Level, LoggerBuilder, TimeZone};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dir = tempfile::tempdir()?;
//!     let logger = LoggerBuilder::new(dir.path(), "app")
//!         .granularity(Granularity::Hour)
//!         .backup_count(24) // Keep one day of hourly files
//!         .min_level(Level::Info)
//!         .time_zone(TimeZone::UTC)
//!         .build()?;
//!
//!     infof!(logger, "listening on port {}", 8080);
//!     logger.warn(format_args!("cache is {}% full", 93));
//!
//!     // Wait until everything queued so far is on disk.
//!     logger.shutdown()?;
//!     Ok(())
//! }
//! ```
use {
    crate::{
        file::FileOptions,
        retention::RetentionSweeper,
        rotation::FileNaming,
        writer::{Command, Lifecycle, Writer, WriterContext},
    },
    chrono::FixedOffset,
    crossbeam_channel::{Sender, TrySendError},
    std::{
        fmt,
        panic::Location,
        path::{Path, PathBuf},
        sync::{Arc, Mutex, PoisonError},
        thread::{self, JoinHandle},
    },
};

mod clock;
mod error;
mod file;
mod level;
mod record;
mod retention;
mod rotation;
mod writer;

pub use {
    clock::{Clock, ManualClock, SystemClock},
    error::LoggerError,
    file::Compression,
    level::Level,
    record::LogRecord,
    rotation::{Granularity, RotationWindow, TimeZone},
};

/// Default number of records the queue holds before producers block.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Emit a [`Level::Debug`] record: `debugf!(logger, "format {}", args)`.
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(::std::format_args!($($arg)+))
    };
}

/// Emit a [`Level::Info`] record: `infof!(logger, "format {}", args)`.
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format_args!($($arg)+))
    };
}

/// Emit a [`Level::Warning`] record: `warnf!(logger, "format {}", args)`.
#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(::std::format_args!($($arg)+))
    };
}

/// Emit a [`Level::Error`] record: `errorf!(logger, "format {}", args)`.
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format_args!($($arg)+))
    };
}

/// Settings fixed when the logger is built.
#[derive(Clone)]
struct LoggerConfig {
    /// The directory where the log files are stored.
    directory: PathBuf,
    /// File name prefix; files are named `<base_name>_<suffix>.log`.
    base_name: String,
    /// Length of each file's window.
    granularity: Granularity,
    /// Historical files to keep. `None` keeps everything.
    backup_count: Option<usize>,
    /// Configured minimum severity.
    min_level: Level,
    /// Drop records below `min_level` before they are queued.
    filter_below_min_level: bool,
    /// Time zone for record timestamps and file suffixes.
    time_zone: TimeZone,
    /// Compression applied to files whose window has closed.
    compression: Option<Compression>,
    /// Unix permissions for created files.
    file_mode: Option<u32>,
    /// Bound of the record queue.
    queue_capacity: usize,
    /// Time source for rotation and record stamps.
    clock: Arc<dyn Clock>,
}

impl LoggerConfig {
    fn new<P: AsRef<Path>>(directory: P, base_name: &str) -> Self {
        LoggerConfig {
            directory: directory.as_ref().to_path_buf(),
            base_name: base_name.to_string(),
            granularity: Granularity::Day,
            backup_count: None,
            min_level: Level::Debug,
            filter_below_min_level: false,
            time_zone: TimeZone::Local,
            compression: None,
            file_mode: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            clock: Arc::new(SystemClock),
        }
    }
}

/// Provides a fluent interface for configuring [`Logger`] instances.
///
/// # Default Configuration
///
/// * Daily windows
/// * Local system time zone
/// * Keep all historical files
/// * No level filtering (see [`LoggerBuilder::filter_below_min_level`])
/// * Queue of [`DEFAULT_QUEUE_CAPACITY`] records
/// * No compression, standard file permissions
///
/// # Examples
///
/// ```rust
/// use logspool::{Compression, Granularity, LoggerBuilder, TimeZone};
///
/// let dir = tempfile::tempdir().unwrap();
/// let logger = LoggerBuilder::new(dir.path(), "app")
///     .granularity(Granularity::Minute)
///     .backup_count(60)
///     .time_zone(TimeZone::UTC)
///     .compression(Compression::Gzip) // Name format: app_2025-04-01_19-55.log.gz
///     .build()
///     .unwrap();
/// logger.shutdown().unwrap();
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
}

impl LoggerBuilder {
    /// Create a new logger builder.
    /// # Arguments
    /// * `directory` - The directory where the log files are stored.
    /// * `base_name` - The file name prefix.
    pub fn new<P: AsRef<Path>>(directory: P, base_name: &str) -> Self {
        LoggerBuilder {
            config: LoggerConfig::new(directory, base_name),
        }
    }

    /// Set the window length.
    pub fn granularity(self, granularity: Granularity) -> Self {
        Self {
            config: LoggerConfig {
                granularity,
                ..self.config
            },
        }
    }

    /// Set the maximum number of historical files to keep.
    ///
    /// The sweep runs just before a new window's file is opened, so the file
    /// being rotated out counts as historical: with `0` it is deleted too.
    pub fn backup_count(self, backup_count: usize) -> Self {
        Self {
            config: LoggerConfig {
                backup_count: Some(backup_count),
                ..self.config
            },
        }
    }

    /// Set the minimum level. On its own this does not filter anything; see
    /// [`LoggerBuilder::filter_below_min_level`].
    pub fn min_level(self, min_level: Level) -> Self {
        Self {
            config: LoggerConfig {
                min_level,
                ..self.config
            },
        }
    }

    /// Discard records below the minimum level instead of writing them.
    ///
    /// Off by default: every record is written regardless of the configured
    /// minimum level.
    pub fn filter_below_min_level(self, enabled: bool) -> Self {
        Self {
            config: LoggerConfig {
                filter_below_min_level: enabled,
                ..self.config
            },
        }
    }

    /// Set the time zone for timestamps and file names.
    pub fn time_zone(self, time_zone: TimeZone) -> Self {
        Self {
            config: LoggerConfig {
                time_zone,
                ..self.config
            },
        }
    }

    /// Compress each file once its window has closed.
    pub fn compression(self, compression: Compression) -> Self {
        Self {
            config: LoggerConfig {
                compression: Some(compression),
                ..self.config
            },
        }
    }

    /// Set the file permissions for log files (Unix-like systems only).
    /// This sets the file mode bits in octal notation like when using chmod.
    /// For example, 0o644 for rw-r--r-- permissions.
    pub fn file_mode(self, mode: u32) -> Self {
        Self {
            config: LoggerConfig {
                file_mode: Some(mode),
                ..self.config
            },
        }
    }

    /// Set how many records may wait in the queue before producers block.
    /// Values below one are raised to one.
    pub fn queue_capacity(self, queue_capacity: usize) -> Self {
        Self {
            config: LoggerConfig {
                queue_capacity: queue_capacity.max(1),
                ..self.config
            },
        }
    }

    /// Replace the system clock, e.g. with a [`ManualClock`] in tests.
    pub fn clock<C: Clock>(self, clock: C) -> Self {
        Self {
            config: LoggerConfig {
                clock: Arc::new(clock),
                ..self.config
            },
        }
    }

    /// Build the logger: open the file for the current window and start the
    /// writer thread.
    pub fn build(self) -> Result<Logger, LoggerError> {
        let config = self.config;
        let offset = config.time_zone.offset();
        let options = FileOptions {
            file_mode: config.file_mode,
            compression: config.compression,
        };
        let sweeper = RetentionSweeper::new(
            &config.directory,
            &config.base_name,
            config.granularity,
            config.compression,
            config.backup_count,
        )?;
        let writer = Writer::open(WriterContext {
            naming: FileNaming {
                directory: config.directory.clone(),
                base_name: config.base_name.clone(),
                offset,
            },
            granularity: config.granularity,
            options,
            sweeper,
            clock: Arc::clone(&config.clock),
        })?;

        let (sender, receiver) = crossbeam_channel::bounded(config.queue_capacity);
        let lifecycle = Arc::new(Lifecycle::new());
        let worker = {
            let lifecycle = Arc::clone(&lifecycle);
            thread::Builder::new()
                .name(format!("logspool-{}", config.base_name))
                .spawn(move || writer.run(receiver, &lifecycle))?
        };

        Ok(Logger {
            sender,
            lifecycle,
            worker: Mutex::new(Some(worker)),
            clock: config.clock,
            offset,
            min_level: config.min_level,
            filter_below_min_level: config.filter_below_min_level,
        })
    }
}

/// Build a logger from a granularity token.
///
/// `when` must be one of `"M"`, `"H"`, `"D"` or `"W"`; anything else fails
/// with [`LoggerError::InvalidGranularity`] before the file system is
/// touched. Timestamps and file names use the local time zone.
///
/// ```rust
/// use logspool::{init_logger, Level};
///
/// let dir = tempfile::tempdir().unwrap();
/// assert!(init_logger("Y", 7, Level::Info, dir.path(), "app").is_err());
///
/// let logger = init_logger("D", 7, Level::Info, dir.path(), "app").unwrap();
/// logger.shutdown().unwrap();
/// ```
pub fn init_logger<P: AsRef<Path>>(
    when: &str,
    backup_count: usize,
    min_level: Level,
    directory: P,
    base_name: &str,
) -> Result<Logger, LoggerError> {
    let granularity = when.parse::<Granularity>()?;
    LoggerBuilder::new(directory, base_name)
        .granularity(granularity)
        .backup_count(backup_count)
        .min_level(min_level)
        .time_zone(TimeZone::Local)
        .build()
}

/// Handle to a running logger.
///
/// The handle is `Send + Sync`; share it between threads with an `Arc`.
/// Dropping it shuts the logger down and waits for queued records to be
/// written.
pub struct Logger {
    sender: Sender<Command>,
    lifecycle: Arc<Lifecycle>,
    worker: Mutex<Option<JoinHandle<Result<(), LoggerError>>>>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    min_level: Level,
    filter_below_min_level: bool,
}

impl Logger {
    /// Queue a record at `level`, stamped with the caller's location.
    ///
    /// Blocks while the queue is full. Returns [`LoggerError::Closed`] once
    /// the logger has been closed and [`LoggerError::WriterStopped`] once
    /// the writer has stopped on an I/O error.
    #[track_caller]
    pub fn try_log(&self, level: Level, args: fmt::Arguments<'_>) -> Result<(), LoggerError> {
        self.check_open()?;
        if self.filter_below_min_level && level < self.min_level {
            return Ok(());
        }
        let record = LogRecord::new(level, self.clock.now(), &self.offset, args.to_string(), Location::caller());
        self.sender
            .send(Command::Write(record))
            .map_err(|_| self.stopped_error())
    }

    /// Queue a [`Level::Debug`] record.
    ///
    /// # Panics
    /// Panics if the logger has already been closed.
    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args)
    }

    /// Queue a [`Level::Info`] record.
    ///
    /// # Panics
    /// Panics if the logger has already been closed.
    #[track_caller]
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args)
    }

    /// Queue a [`Level::Warning`] record.
    ///
    /// # Panics
    /// Panics if the logger has already been closed.
    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warning, args)
    }

    /// Queue a [`Level::Error`] record.
    ///
    /// # Panics
    /// Panics if the logger has already been closed.
    #[track_caller]
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args)
    }

    /// Emitting on a closed logger is a programmer error. After a fatal
    /// writer error the record is discarded; the error itself is reported by
    /// [`Logger::shutdown`].
    #[track_caller]
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        match self.try_log(level, args) {
            Ok(()) | Err(LoggerError::WriterStopped) => {}
            Err(err) => panic!("log record emitted on a closed logger: {err}"),
        }
    }

    /// Ask the writer to close the current file and reopen the file for the
    /// current window, independent of expiry.
    pub fn rotate(&self) -> Result<(), LoggerError> {
        self.check_open()?;
        self.sender.send(Command::Rotate).map_err(|_| self.stopped_error())
    }

    /// Block until every record queued before this call has been written
    /// and synced to disk.
    pub fn flush(&self) -> Result<(), LoggerError> {
        self.check_open()?;
        let (ack, done) = crossbeam_channel::bounded(1);
        self.sender.send(Command::Flush(ack)).map_err(|_| self.stopped_error())?;
        done.recv().map_err(|_| self.stopped_error())
    }

    /// Stop accepting records and let the writer finish in the background.
    ///
    /// Does not block. Records queued before this call are still written.
    pub fn close(&self) {
        if self.lifecycle.begin_close() {
            // A full queue already keeps the writer awake; it notices the
            // closing state after its next record.
            if let Err(TrySendError::Disconnected(_)) = self.sender.try_send(Command::Shutdown) {
                tracing::debug!("log writer already stopped");
            }
        }
    }

    /// Close the logger and wait until every queued record is written and
    /// the file is closed.
    ///
    /// Returns the writer's fatal error, if it stopped on one. Calling it
    /// again returns `Ok(())`.
    pub fn shutdown(&self) -> Result<(), LoggerError> {
        self.close();
        let worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner).take();
        match worker {
            Some(worker) => worker.join().map_err(|_| LoggerError::WriterPanicked)?,
            None => Ok(()),
        }
    }

    /// Whether the logger still accepts records.
    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    /// Whether the writer stopped on a fatal I/O error.
    pub fn is_failed(&self) -> bool {
        self.lifecycle.is_failed()
    }

    fn check_open(&self) -> Result<(), LoggerError> {
        if self.lifecycle.is_active() {
            Ok(())
        } else {
            Err(self.stopped_error())
        }
    }

    fn stopped_error(&self) -> LoggerError {
        if self.lifecycle.is_failed() {
            LoggerError::WriterStopped
        } else {
            LoggerError::Closed
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .field("filter_below_min_level", &self.filter_below_min_level)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::error!(%err, "logger shut down with error");
        }
    }
}
