//! 基本用法示例：构建日志器、写日志、查看统计、优雅关闭

use asynclog_rs::{AsyncLoggerBuilder, Level, init_global_logger};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<(), asynclog_rs::Error> {
    let logger = AsyncLoggerBuilder::new()
        .level(Level::Trace)
        .with_console_output()
        .queue_capacity(4096)
        .batch_size(128)
        .pool_initial_size(256)
        .flush_interval(Duration::from_millis(100))
        .build()?;
    let logger = Arc::new(logger);
    init_global_logger(logger.clone())?;

    asynclog_rs::info!("service started");
    asynclog_rs::debug!("debug detail: {}", 42);
    asynclog_rs::warn!("low disk space on {}", "/var");
    asynclog_rs::error!("request failed: {}", "timeout");

    for i in 0..1000 {
        asynclog_rs::trace!("tick {i}");
    }

    logger.flush(Some(Duration::from_secs(2)));

    if let Some(stats) = logger.stats() {
        println!(
            "enqueued={} processed={} dropped={} cache_hits={}",
            stats.enqueued, stats.processed, stats.dropped, stats.cache_hits
        );
    }

    logger.shutdown()?;
    Ok(())
}
