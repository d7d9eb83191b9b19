//! The single consumer that owns the output file and rotation state.

use {
    crate::{
        clock::Clock,
        error::LoggerError,
        file::{self, FileOptions, LogFile},
        record::LogRecord,
        retention::RetentionSweeper,
        rotation::{FileNaming, Granularity, RotationWindow},
    },
    crossbeam_channel::{Receiver, Sender},
    std::{
        path::PathBuf,
        sync::{
            atomic::{AtomicU8, Ordering},
            Arc,
        },
    },
};

/// Messages accepted by the writer, in queue order.
#[derive(Debug)]
pub(crate) enum Command {
    /// Append a record to the active file.
    Write(LogRecord),
    /// Close the active file and reopen the file for the current window.
    Rotate,
    /// Sync the active file, then acknowledge.
    Flush(Sender<()>),
    /// Wake the writer so it notices the logger is closing.
    Shutdown,
}

const ACTIVE: u8 = 0;
const CLOSING: u8 = 1;
const FAILED: u8 = 2;

/// Lifecycle shared between the handle and the writer:
/// active -> closing (owner asked to stop) or failed (fatal I/O error).
#[derive(Debug)]
pub(crate) struct Lifecycle(AtomicU8);

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Lifecycle(AtomicU8::new(ACTIVE))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst) == ACTIVE
    }

    pub(crate) fn is_failed(&self) -> bool {
        self.0.load(Ordering::SeqCst) == FAILED
    }

    /// Move from active to closing. Returns false if the logger had already
    /// left the active state.
    pub(crate) fn begin_close(&self) -> bool {
        self.0
            .compare_exchange(ACTIVE, CLOSING, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn fail(&self) {
        self.0.store(FAILED, Ordering::SeqCst);
    }
}

/// Everything the writer needs to name, open and retire files.
pub(crate) struct WriterContext {
    pub(crate) naming: FileNaming,
    pub(crate) granularity: Granularity,
    pub(crate) options: FileOptions,
    pub(crate) sweeper: RetentionSweeper,
    pub(crate) clock: Arc<dyn Clock>,
}

pub(crate) struct Writer {
    ctx: WriterContext,
    window: RotationWindow,
    file: LogFile,
}

impl Writer {
    /// Open the first window. Runs on the caller's thread so that an
    /// unusable directory is reported by the constructor.
    pub(crate) fn open(ctx: WriterContext) -> Result<Self, LoggerError> {
        let window = RotationWindow::starting_at(ctx.granularity, ctx.clock.now().timestamp());
        let file = LogFile::open(&ctx.naming.log_path(&window), &ctx.options)?;
        tracing::debug!(path = %file.path().display(), expiry = window.expiry(), "opened log file");
        Ok(Writer { ctx, window, file })
    }

    /// Drain `commands` until the logger closes, the handle is dropped or a
    /// fatal I/O error occurs, then close the active file.
    pub(crate) fn run(mut self, commands: Receiver<Command>, lifecycle: &Lifecycle) -> Result<(), LoggerError> {
        if let Err(err) = self.process(&commands, lifecycle) {
            // Mark failure while the receiver is still alive so producers see
            // a stopped writer rather than a closed logger.
            lifecycle.fail();
            tracing::error!(%err, "log writer stopped on fatal error");
            drop(commands);
            if let Err(close_err) = self.file.close() {
                tracing::error!(err = %close_err, "failed to close log file");
            }
            return Err(err);
        }
        drop(commands);

        let path = self.file.path().to_path_buf();
        let result = self.file.close().map(|_| ());
        match &result {
            Ok(()) => tracing::info!(path = %path.display(), "logger stopped"),
            Err(err) => tracing::error!(%err, "failed to close log file"),
        }
        result
    }

    fn process(&mut self, commands: &Receiver<Command>, lifecycle: &Lifecycle) -> Result<(), LoggerError> {
        while let Ok(command) = commands.recv() {
            self.handle(command)?;
            if !lifecycle.is_active() {
                while let Ok(command) = commands.try_recv() {
                    self.handle(command)?;
                }
                break;
            }
        }
        Ok(())
    }

    fn handle(&mut self, command: Command) -> Result<(), LoggerError> {
        match command {
            Command::Write(record) => self.write(&record),
            Command::Rotate => self.force_rotate(),
            Command::Flush(ack) => {
                self.file.sync()?;
                // The requester may have given up waiting.
                let _ = ack.send(());
                Ok(())
            }
            Command::Shutdown => Ok(()),
        }
    }

    pub(crate) fn write(&mut self, record: &LogRecord) -> Result<(), LoggerError> {
        let now = self.ctx.clock.now().timestamp();
        if self.window.is_expired(now) {
            self.rotate_window(now)?;
        }
        self.file.write_record(record)
    }

    /// The active window has ended: sweep old files, open the file for the
    /// window containing `now`, then retire the previous file.
    fn rotate_window(&mut self, now: i64) -> Result<(), LoggerError> {
        self.ctx.sweeper.sweep();

        let window = RotationWindow::starting_at(self.ctx.granularity, now);
        let file = LogFile::open(&self.ctx.naming.log_path(&window), &self.ctx.options)?;
        tracing::debug!(path = %file.path().display(), expiry = window.expiry(), "rotated log file");
        self.window = window;

        if let Some(old_path) = self.replace_file(file) {
            if let Err(err) = file::compress(&old_path, &self.ctx.options) {
                tracing::warn!(%err, "failed to compress rotated log file");
            }
        }
        Ok(())
    }

    /// Reopen on request. Crossing a window boundary is handled as a regular
    /// rotation; otherwise the same file is reopened for appending.
    fn force_rotate(&mut self) -> Result<(), LoggerError> {
        let now = self.ctx.clock.now().timestamp();
        if self.window.is_expired(now) {
            return self.rotate_window(now);
        }
        let file = LogFile::open(&self.ctx.naming.log_path(&self.window), &self.ctx.options)?;
        self.replace_file(file);
        Ok(())
    }

    /// Swap in `file` and close the previous handle. Close errors are logged;
    /// the path is returned only when the old file was closed cleanly.
    fn replace_file(&mut self, file: LogFile) -> Option<PathBuf> {
        let old = std::mem::replace(&mut self.file, file);
        match old.close() {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!(%err, "failed to close log file");
                None
            }
        }
    }

    #[cfg(test)]
    fn window(&self) -> RotationWindow {
        self.window
    }
}
