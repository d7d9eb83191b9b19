//! Ownership of the single open output file.

use {
    crate::{error::LoggerError, record::LogRecord},
    flate2::write::GzEncoder,
    std::{
        fs,
        io::{self, Write as _},
        path::{Path, PathBuf},
    },
};

#[cfg(unix)]
use std::{fs::Permissions, os::unix::fs::PermissionsExt};

/// Compression applied to a file once its window has closed.
///
/// The compressed copy keeps the original name with the algorithm's
/// extension appended (e.g. `app_2024-03-06.log.gz`) and the plain file is
/// removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Gzip, `.gz`.
    Gzip,
    /// XZ, `.xz`. Requires the `xz` feature.
    #[cfg(feature = "xz")]
    XZ,
}

impl Compression {
    pub(crate) fn extension(&self) -> &'static str {
        match self {
            Compression::Gzip => "gz",
            #[cfg(feature = "xz")]
            Compression::XZ => "xz",
        }
    }
}

/// Settings applied to every file the logger creates.
#[derive(Debug, Clone, Default)]
pub(crate) struct FileOptions {
    pub(crate) file_mode: Option<u32>,
    pub(crate) compression: Option<Compression>,
}

/// The open handle for the active window.
#[derive(Debug)]
pub(crate) struct LogFile {
    path: PathBuf,
    file: fs::File,
}

impl LogFile {
    /// Open `path` for appending, creating it and its parent directory when
    /// missing. Existing content is never truncated, so a restart within the
    /// same window keeps writing to the same file.
    pub(crate) fn open(path: &Path, options: &FileOptions) -> Result<Self, LoggerError> {
        let mut open_options = fs::OpenOptions::new();
        open_options.append(true).create(true);

        let mut open_res = open_options.open(path);
        if open_res.is_err() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|err| LoggerError::CreateDirectoryFailed(parent.to_path_buf(), err.to_string()))?;
                open_res = open_options.open(path);
            }
        }

        let file = open_res.map_err(|err| LoggerError::CreateFileFailed(path.to_path_buf(), err.to_string()))?;
        set_permissions(path, options.file_mode)?;

        Ok(LogFile {
            path: path.to_path_buf(),
            file,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record followed by a single line break.
    pub(crate) fn write_record(&mut self, record: &LogRecord) -> Result<(), LoggerError> {
        let line = format!("{record}\n");
        self.file
            .write_all(line.as_bytes())
            .map_err(|err| LoggerError::WriteFailed(self.path.clone(), err))
    }

    /// Push written records down to the storage device.
    pub(crate) fn sync(&mut self) -> Result<(), LoggerError> {
        self.file
            .flush()
            .and_then(|_| self.file.sync_data())
            .map_err(|err| LoggerError::WriteFailed(self.path.clone(), err))
    }

    /// Flush, sync and release the handle, returning the path it wrote to.
    pub(crate) fn close(mut self) -> Result<PathBuf, LoggerError> {
        self.file
            .flush()
            .and_then(|_| self.file.sync_all())
            .map_err(|err| LoggerError::CloseFailed(self.path.clone(), err))?;
        Ok(self.path)
    }
}

/// Compress a retired log file next to itself and remove the original.
/// A file the retention sweep already removed is skipped.
pub(crate) fn compress(log_path: &Path, options: &FileOptions) -> Result<(), LoggerError> {
    let compression = match &options.compression {
        Some(compression) => compression,
        None => return Ok(()),
    };
    if !log_path.exists() {
        return Ok(());
    }
    let compressed_path = PathBuf::from(format!("{}.{}", log_path.to_string_lossy(), compression.extension()));
    let map_err = |err: io::Error| LoggerError::CompressFailed(log_path.to_path_buf(), err);

    let infile = fs::File::open(log_path).map_err(map_err)?;
    let mut reader = io::BufReader::new(infile);
    let outfile = fs::File::create(&compressed_path).map_err(map_err)?;
    let writer = io::BufWriter::new(outfile);

    match compression {
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(writer, flate2::Compression::default());
            io::copy(&mut reader, &mut encoder).map_err(map_err)?;
            encoder.finish().and_then(|mut w| w.flush()).map_err(map_err)?;
        }
        #[cfg(feature = "xz")]
        Compression::XZ => {
            let mut writer = writer;
            lzma_rs::xz_compress(&mut reader, &mut writer).map_err(map_err)?;
            writer.flush().map_err(map_err)?;
        }
    }
    set_permissions(&compressed_path, options.file_mode)?;

    fs::remove_file(log_path).map_err(map_err)?;
    Ok(())
}

/// Apply the configured Unix mode to `path`. Ignored with a warning on other
/// platforms.
fn set_permissions(path: &Path, file_mode: Option<u32>) -> Result<(), LoggerError> {
    if let Some(mode) = file_mode {
        #[cfg(unix)]
        {
            fs::set_permissions(path, Permissions::from_mode(mode)).map_err(|err| {
                LoggerError::SetFilePermissionsError {
                    path: path.to_path_buf(),
                    error: err.to_string(),
                }
            })?
        }
        #[cfg(not(unix))]
        {
            tracing::warn!(path = %path.display(), mode, "file permissions are not supported on this platform");
        }
    }
    Ok(())
}
