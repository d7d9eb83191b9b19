use {
    logspool::{infof, Granularity, LoggerBuilder, TimeZone},
    tracing_subscriber::util::SubscriberInitExt,
};

/// Route the logger's own diagnostics (rotation, cleanup failures, shutdown)
/// to stderr through a tracing subscriber.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .finish()
        .try_init()?;

    let logger = LoggerBuilder::new("./logs", "tracing")
        .granularity(Granularity::Minute)
        .backup_count(3)
        .time_zone(TimeZone::Local)
        .build()?;

    infof!(logger, "This is an info message");
    logger.warn(format_args!("This is a warning message"));
    logger.error(format_args!("This is an error message"));
    logger.rotate()?;

    logger.shutdown()?;
    Ok(())
}
