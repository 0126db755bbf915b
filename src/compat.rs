/*!
`log` 门面桥接。

让使用标准 `log` 宏的应用把记录转发进本库的异步管线。
*/

use std::sync::Arc;

use crate::error::Error;
use crate::level::Level;
use crate::logger::AsyncLogger;

/// 把 `log` crate 的记录转发到异步日志器的适配器
pub struct LogBridge {
    logger: Arc<AsyncLogger>,
}

impl LogBridge {
    /// 创建桥接
    pub fn new(logger: Arc<AsyncLogger>) -> Self {
        Self { logger }
    }
}

fn convert_level(level: log::Level) -> Level {
    match level {
        log::Level::Trace => Level::Trace,
        log::Level::Debug => Level::Debug,
        log::Level::Info => Level::Info,
        log::Level::Warn => Level::Warn,
        log::Level::Error => Level::Error,
    }
}

fn convert_filter(level: Level) -> log::LevelFilter {
    match level {
        Level::Trace => log::LevelFilter::Trace,
        Level::Debug => log::LevelFilter::Debug,
        Level::Info => log::LevelFilter::Info,
        Level::Warn => log::LevelFilter::Warn,
        // log 门面没有 critical，并入 error
        Level::Error | Level::Critical => log::LevelFilter::Error,
        Level::Off => log::LevelFilter::Off,
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.logger.should_log(convert_level(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = record.args().to_string();
        let _ = self.logger.log_str(
            convert_level(record.level()),
            &message,
            record.file().unwrap_or(""),
            record.line().unwrap_or(0),
        );
    }

    fn flush(&self) {
        let _ = self.logger.flush(None);
    }
}

/// 把桥接安装为 `log` 门面的全局记录器
///
/// 进程内只能安装一次；最大级别取自日志器当前级别。
pub fn init_log_bridge(logger: Arc<AsyncLogger>) -> Result<(), Error> {
    let max_level = convert_filter(logger.level());
    log::set_boxed_logger(Box::new(LogBridge::new(logger)))
        .map_err(|_| Error::AlreadyInitialized)?;
    log::set_max_level(max_level);
    Ok(())
}
