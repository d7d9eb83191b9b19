use {
    crate::level::Level,
    chrono::{DateTime, FixedOffset, Utc},
    std::{fmt, panic::Location, path::Path},
};

/// Timestamp layout used at the start of every line.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single log entry, fixed at the moment it was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    level: Level,
    time: String,
    message: String,
    file: &'static str,
    line: u32,
}

impl LogRecord {
    /// Capture a record emitted at `location`, stamped with `now` rendered
    /// in `offset`.
    pub fn new(
        level: Level,
        now: DateTime<Utc>,
        offset: &FixedOffset,
        message: String,
        location: &'static Location<'static>,
    ) -> Self {
        LogRecord {
            level,
            time: now.with_timezone(offset).format(TIMESTAMP_FORMAT).to_string(),
            message,
            file: location.file(),
            line: location.line(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source file as reported by the compiler.
    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

/// The on-disk line, without the trailing newline:
/// `[<time>] <LEVEL> <message> <file-basename>.<line>`
impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = Path::new(self.file)
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_else(|| self.file.into());
        write!(f, "[{}] {} {} {}.{}", self.time, self.level, self.message, file, self.line)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, chrono::TimeZone as _};

    #[track_caller]
    fn here() -> &'static Location<'static> {
        Location::caller()
    }

    #[test]
    fn renders_line_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 13, 47, 12).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let location = here();
        let record = LogRecord::new(Level::Info, now, &utc, "hello world".to_string(), location);
        assert_eq!(
            record.to_string(),
            format!("[2024-03-05 13:47:12] INFO hello world record.rs.{}", location.line())
        );
    }

    #[test]
    fn timestamp_uses_offset() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 23, 0, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let record = LogRecord::new(Level::Error, now, &plus_two, "x".to_string(), here());
        assert_eq!(record.time(), "2024-03-06 01:00:00");
        assert_eq!(record.level(), Level::Error);
        assert!(record.file().ends_with("record.rs"));
    }
}
