use logspool::{infof, Granularity, Level, LoggerBuilder, TimeZone};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = LoggerBuilder::new("./logs", "daily")
        .granularity(Granularity::Day)
        .time_zone(TimeZone::UTC) // Use UTC for consistent file names across regions
        .backup_count(7) // Keep one week of logs
        .min_level(Level::Info)
        .build()?;

    infof!(logger, "System startup - UTC timestamps will be used for file names");
    infof!(logger, "Configuration loaded successfully");
    infof!(logger, "Server listening on port {}", 8080);

    logger.shutdown()?;
    Ok(())
}
