//! Builder模式集成测试
//!
//! 演示如何在实际应用中使用AsyncLoggerBuilder

use asynclog_rs::{AsyncLoggerBuilder, Level};
use std::env;
use std::fs;
use std::time::Duration;

#[test]
fn test_builder_integration() {
    // 测试默认配置
    let logger = AsyncLoggerBuilder::new()
        .build()
        .expect("Failed to create logger with default configuration");

    assert!(logger.log_str(
        Level::Info,
        "Integration test with default config",
        file!(),
        line!(),
    ));

    // 测试完整配置
    let full_config_logger = AsyncLoggerBuilder::new()
        .level(Level::Trace)
        .with_json_formatting()
        .with_console_output()
        .queue_capacity(2000)
        .batch_size(50)
        .pool_initial_size(64)
        .flush_interval(Duration::from_millis(100))
        .build()
        .expect("Failed to create logger with full configuration");

    assert!(full_config_logger.log_str(
        Level::Debug,
        "Integration test with full config",
        file!(),
        line!(),
    ));
    assert!(full_config_logger.log_str(Level::Trace, "Trace level message", file!(), line!()));

    // 确保所有日志都被处理
    assert!(full_config_logger.flush(Some(Duration::from_secs(2))));

    // 关闭日志器
    logger.shutdown().expect("Failed to shutdown logger");
    full_config_logger
        .shutdown()
        .expect("Failed to shutdown full config logger");
}

#[test]
fn test_builder_file_output_writes_lines() {
    let path = env::temp_dir().join(format!(
        "asynclog_builder_test_{}.log",
        std::process::id()
    ));
    let _ = fs::remove_file(&path);

    let logger = AsyncLoggerBuilder::new()
        .level(Level::Debug)
        .with_file_output(&path)
        .flush_interval(Duration::from_millis(50))
        .build()
        .expect("build file logger");

    assert!(logger.log_str(Level::Info, "file line one", file!(), line!()));
    assert!(logger.log_str(Level::Error, "file line two", file!(), line!()));
    assert!(logger.flush(Some(Duration::from_secs(2))));
    logger.shutdown().expect("shutdown file logger");

    let content = fs::read(&path).expect("read log file");
    let s = String::from_utf8_lossy(&content);
    assert!(s.contains("file line one"));
    assert!(s.contains("file line two"));
    assert!(s.contains("ERROR"));

    // 时间戳以当前年份开头
    let year = time::OffsetDateTime::now_utc().year();
    assert!(s.contains(&format!("{year}-")));

    let _ = fs::remove_file(&path);
}

#[test]
fn test_builder_stats_visible_through_facade() {
    let logger = AsyncLoggerBuilder::new()
        .with_simple_formatting()
        .sink(std::sync::Arc::new(asynclog_rs::MemorySink::new()))
        .queue_capacity(256)
        .batch_size(16)
        .flush_interval(Duration::from_millis(20))
        .build()
        .expect("build logger");

    for i in 0..40 {
        assert!(logger.log_str(Level::Info, &format!("stat {i}"), file!(), line!()));
    }
    assert!(logger.flush(Some(Duration::from_secs(2))));
    logger.shutdown().expect("shutdown");

    let stats = logger.stats().expect("async mode has stats");
    assert_eq!(stats.enqueued, 40);
    assert_eq!(stats.processed, 40);
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.allocations, 40);
    assert_eq!(stats.deallocations, 40);
}
