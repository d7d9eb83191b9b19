use logspool::{errorf, Compression, Granularity, LoggerBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Hourly error log, compressed once each hour is over
    let error_logger = LoggerBuilder::new("./logs", "app-error")
        .granularity(Granularity::Hour)
        .compression(Compression::Gzip) // Will create files like: app-error_2025-04-01_19.log.gz
        .backup_count(24) // Keep one day of hourly error logs
        .file_mode(0o640) // Owner rw, group r, others none
        .build()?;

    for error_code in &[500, 502, 503, 504] {
        errorf!(
            error_logger,
            "Error {error_code}: Server encountered an internal error, please try again later"
        );
    }

    if let Err(err) = error_logger.shutdown() {
        eprintln!("logger failed: {err}");
        std::process::exit(err.exit_code());
    }
    Ok(())
}
