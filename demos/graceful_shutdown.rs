//! 优雅关闭示例：Ctrl-C 触发排空与关停，已入队日志不丢失

use asynclog_rs::{AsyncLoggerBuilder, Level, init_global_logger};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn main() -> Result<(), asynclog_rs::Error> {
    let logger = AsyncLoggerBuilder::new()
        .level(Level::Debug)
        .with_file_output("logs/graceful.log")
        .flush_interval(Duration::from_millis(200))
        .build()?;
    let logger = Arc::new(logger);
    init_global_logger(logger.clone())?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    let _ = ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    });

    asynclog_rs::info!("press Ctrl-C to stop");
    let mut iteration = 0u64;
    while running.load(Ordering::SeqCst) && iteration < 300 {
        asynclog_rs::debug!("heartbeat {iteration}");
        iteration += 1;
        std::thread::sleep(Duration::from_millis(100));
    }

    asynclog_rs::info!("shutting down after {iteration} heartbeats");
    logger.shutdown()?;
    println!("all enqueued records drained, bye");
    Ok(())
}
