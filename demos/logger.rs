use {
    logspool::{infof, init_logger, warnf, Level},
    std::{sync::Arc, thread, time::Duration},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = Arc::new(init_logger("M", 3, Level::Info, "./logs", "mylog")?);

    let workers: Vec<_> = (0..4)
        .map(|id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for n in 0..10 {
                    infof!(logger, "worker {id} step {n}");
                    thread::sleep(Duration::from_millis(50));
                }
                warnf!(logger, "worker {id} done");
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }

    logger.shutdown()?;
    Ok(())
}
