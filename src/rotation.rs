//! Time windows, rotation state and file naming.

use {
    crate::error::LoggerError,
    chrono::{DateTime, FixedOffset, Local, Utc},
    std::{
        fmt,
        path::PathBuf,
        str::FromStr,
    },
};

/// Specifies the time zone used to render record timestamps and file
/// suffixes.
///
/// Window boundaries are always aligned on multiples of the window interval
/// counted from the Unix epoch; the time zone only affects how instants are
/// printed.
///
/// # Examples
/// ```
/// use logspool::TimeZone;
/// use chrono::FixedOffset;
///
/// let utc = TimeZone::UTC;
/// let local = TimeZone::Local;
/// let shanghai = TimeZone::Fix(FixedOffset::east_opt(8 * 3600).unwrap());
/// ```
#[derive(Debug, Clone)]
pub enum TimeZone {
    /// Render in UTC.
    UTC,
    /// Render in the system's local offset, sampled once when the logger is
    /// built. A process that runs across a daylight-saving change keeps the
    /// old offset for timestamps and file names until it builds a new logger.
    Local,
    /// Render in a fixed offset.
    Fix(FixedOffset),
}

impl TimeZone {
    pub(crate) fn offset(&self) -> FixedOffset {
        match self {
            TimeZone::UTC => Utc::now().fixed_offset().offset().to_owned(),
            TimeZone::Local => Local::now().offset().to_owned(),
            TimeZone::Fix(fixed_offset) => *fixed_offset,
        }
    }
}

/// How long each output file stays active before the logger rotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// One file per minute, named `<base>_YYYY-MM-DD_HH-mm.log`.
    Minute,
    /// One file per hour, named `<base>_YYYY-MM-DD_HH.log`.
    Hour,
    /// One file per day, named `<base>_YYYY-MM-DD.log`.
    Day,
    /// One file per week, named `<base>_YYYY-Www.log` with the ISO week of
    /// the window's end.
    Week,
}

impl Granularity {
    /// Window length in seconds.
    pub fn interval_secs(&self) -> i64 {
        match self {
            Granularity::Minute => 60,
            Granularity::Hour => 60 * 60,
            Granularity::Day => 60 * 60 * 24,
            Granularity::Week => 60 * 60 * 24 * 7,
        }
    }

    /// Single-letter configuration token.
    pub fn token(&self) -> &'static str {
        match self {
            Granularity::Minute => "M",
            Granularity::Hour => "H",
            Granularity::Day => "D",
            Granularity::Week => "W",
        }
    }

    fn suffix_format(&self) -> &'static str {
        match self {
            Granularity::Minute => "%Y-%m-%d_%H-%M",
            Granularity::Hour => "%Y-%m-%d_%H",
            Granularity::Day => "%Y-%m-%d",
            Granularity::Week => "%G-W%V",
        }
    }

    /// Regex fragment matching a rendered suffix. Every format is zero
    /// padded, so lexicographic order of the names is chronological order.
    pub(crate) fn suffix_pattern(&self) -> &'static str {
        match self {
            Granularity::Minute => r"\d{4}-\d{2}-\d{2}_\d{2}-\d{2}",
            Granularity::Hour => r"\d{4}-\d{2}-\d{2}_\d{2}",
            Granularity::Day => r"\d{4}-\d{2}-\d{2}",
            Granularity::Week => r"\d{4}-W\d{2}",
        }
    }
}

impl FromStr for Granularity {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Granularity::Minute),
            "H" => Ok(Granularity::Hour),
            "D" => Ok(Granularity::Day),
            "W" => Ok(Granularity::Week),
            other => Err(LoggerError::InvalidGranularity(other.to_string())),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The window the active output file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationWindow {
    granularity: Granularity,
    expiry: i64,
}

impl RotationWindow {
    /// Open the window containing `now` (seconds since the epoch).
    ///
    /// The expiry is the smallest interval-aligned boundary strictly greater
    /// than `now`.
    pub fn starting_at(granularity: Granularity, now: i64) -> Self {
        let interval = granularity.interval_secs();
        RotationWindow {
            granularity,
            expiry: now - now.rem_euclid(interval) + interval,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// End of the window in seconds since the epoch.
    pub fn expiry(&self) -> i64 {
        self.expiry
    }

    /// Whether a record processed at `now` must go to a new window.
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expiry
    }

    /// File name suffix for this window: the expiry instant rendered in
    /// `offset`.
    pub fn suffix(&self, offset: &FixedOffset) -> String {
        DateTime::<Utc>::from_timestamp(self.expiry, 0)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
            .with_timezone(offset)
            .format(self.granularity.suffix_format())
            .to_string()
    }
}

/// Where a logger's files live and how they are named.
#[derive(Debug, Clone)]
pub(crate) struct FileNaming {
    pub(crate) directory: PathBuf,
    pub(crate) base_name: String,
    pub(crate) offset: FixedOffset,
}

impl FileNaming {
    /// `<directory>/<base>_<suffix>.log`
    pub(crate) fn log_path(&self, window: &RotationWindow) -> PathBuf {
        self.directory
            .join(format!("{}_{}.log", self.base_name, window.suffix(&self.offset)))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, chrono::NaiveDate};

    fn epoch(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    #[test]
    fn granularity_tokens() {
        for (token, granularity) in [
            ("M", Granularity::Minute),
            ("H", Granularity::Hour),
            ("D", Granularity::Day),
            ("W", Granularity::Week),
        ] {
            assert_eq!(token.parse::<Granularity>().unwrap(), granularity);
            assert_eq!(granularity.token(), token);
        }
        for bad in ["", "m", "d", "Y", "DD", "day"] {
            assert!(matches!(
                bad.parse::<Granularity>(),
                Err(LoggerError::InvalidGranularity(_))
            ));
        }
    }

    #[test]
    fn intervals() {
        assert_eq!(Granularity::Minute.interval_secs(), 60);
        assert_eq!(Granularity::Hour.interval_secs(), 3600);
        assert_eq!(Granularity::Day.interval_secs(), 86400);
        assert_eq!(Granularity::Week.interval_secs(), 604800);
    }

    #[test]
    fn expiry_is_next_aligned_boundary() {
        let now = epoch(2024, 3, 5, 13, 47, 12);
        let window = RotationWindow::starting_at(Granularity::Hour, now);
        assert_eq!(window.expiry(), epoch(2024, 3, 5, 14, 0, 0));

        let window = RotationWindow::starting_at(Granularity::Day, now);
        assert_eq!(window.expiry(), epoch(2024, 3, 6, 0, 0, 0));

        let window = RotationWindow::starting_at(Granularity::Minute, now);
        assert_eq!(window.expiry(), epoch(2024, 3, 5, 13, 48, 0));
    }

    #[test]
    fn expiry_is_strictly_greater_on_a_boundary() {
        let boundary = epoch(2024, 3, 6, 0, 0, 0);
        let window = RotationWindow::starting_at(Granularity::Day, boundary);
        assert_eq!(window.expiry(), boundary + 86400);
    }

    #[test]
    fn expiry_check_is_inclusive() {
        let window = RotationWindow::starting_at(Granularity::Minute, 90);
        assert_eq!(window.expiry(), 120);
        assert!(!window.is_expired(119));
        assert!(window.is_expired(120));
        assert!(window.is_expired(500));
    }

    #[test]
    fn day_suffix_renders_the_expiry_date() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let window = RotationWindow::starting_at(Granularity::Day, epoch(2024, 3, 5, 10, 0, 0));
        assert_eq!(window.suffix(&utc), "2024-03-06");
        assert_eq!(window.suffix(&utc), window.suffix(&utc));
    }

    #[test]
    fn suffix_formats() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let now = epoch(2024, 3, 5, 13, 47, 12);
        assert_eq!(
            RotationWindow::starting_at(Granularity::Minute, now).suffix(&utc),
            "2024-03-05_13-48"
        );
        assert_eq!(
            RotationWindow::starting_at(Granularity::Hour, now).suffix(&utc),
            "2024-03-05_14"
        );
        // Weekly windows end on Thursdays at 00:00 UTC.
        assert_eq!(
            RotationWindow::starting_at(Granularity::Week, now).suffix(&utc),
            "2024-W10"
        );
    }

    #[test]
    fn suffix_uses_offset() {
        let plus_eight = FixedOffset::east_opt(8 * 3600).unwrap();
        let window = RotationWindow::starting_at(Granularity::Hour, epoch(2024, 3, 5, 20, 30, 0));
        assert_eq!(window.suffix(&plus_eight), "2024-03-06_05");
    }

    #[test]
    fn log_path_layout() {
        let naming = FileNaming {
            directory: PathBuf::from("/tmp/logs"),
            base_name: "app".to_string(),
            offset: FixedOffset::east_opt(0).unwrap(),
        };
        let window = RotationWindow::starting_at(Granularity::Day, epoch(2024, 3, 5, 10, 0, 0));
        assert_eq!(naming.log_path(&window), PathBuf::from("/tmp/logs/app_2024-03-06.log"));
    }
}
