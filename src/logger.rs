/*!
日志门面。

`AsyncLogger` 是显式构造、按依赖注入使用的实例，可在测试中任意
多开；全局实例只是基于 `OnceLock` 的一次性便捷入口，核心管线对
它一无所知。

异步模式下，门面在调用线程上从对象池取记录、盖时间戳、入队；
格式化与写出都发生在管线的工作线程里。同步模式下直接在调用线程
上串行写出。
*/

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use crate::Level;
use crate::config::AsyncConfig;
use crate::error::Error;
use crate::format::Formatter;
use crate::record::Record;
use crate::sink::Sink;
use crate::stats::Stats;
use crate::worker::{AsyncLogQueue, LogHandler};

/// 时间戳文本格式，长度适配记录的时间缓冲区
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

fn format_now() -> String {
    chrono::Local::now().format(TIME_FORMAT).to_string()
}

/// 异步日志器门面
pub struct AsyncLogger {
    level: AtomicU8,
    formatter: Arc<dyn Formatter>,
    sink: Arc<dyn Sink>,
    core: Option<AsyncLogQueue>,
    sync_lock: Mutex<()>,
}

impl AsyncLogger {
    /// 创建新的异步日志器构建器
    pub fn builder() -> crate::builder::AsyncLoggerBuilder {
        crate::builder::AsyncLoggerBuilder::new()
    }

    /// 创建日志器
    ///
    /// `config.enabled` 为假时不启动后台管线，日志同步写出。
    pub fn new(
        level: Level,
        formatter: Arc<dyn Formatter>,
        sink: Arc<dyn Sink>,
        config: AsyncConfig,
    ) -> Result<Self, Error> {
        let core = if config.enabled {
            let formatter_c = formatter.clone();
            let sink_c = sink.clone();
            let handler: LogHandler = Arc::new(move |batch: &[Box<Record>]| {
                let mut lines = Vec::with_capacity(batch.len());
                for record in batch {
                    if let Ok(line) = formatter_c.format(record) {
                        lines.push(line);
                    }
                }
                let _ = sink_c.write_batch(&lines);
                let _ = sink_c.flush();
            });
            Some(AsyncLogQueue::new(&config, handler)?)
        } else {
            None
        };

        Ok(Self {
            level: AtomicU8::new(level as u8),
            formatter,
            sink,
            core,
            sync_lock: Mutex::new(()),
        })
    }

    /// 记录一条预先渲染好的消息
    ///
    /// 返回是否接收成功；被级别过滤的调用视为成功。异步模式下的
    /// 失败只可能是队列拒绝（满、超时或已停止），细节见统计。
    pub fn log_str(&self, level: Level, message: &str, file: &str, line: u32) -> bool {
        if !self.should_log(level) {
            return true;
        }
        match &self.core {
            Some(core) => {
                let mut record = core.acquire_record();
                record.set_level(level);
                record.set_message(message);
                record.set_file(file);
                record.set_line(line);
                record.set_time(&format_now());
                core.enqueue(record)
            }
            None => {
                let mut record = Record::new(level, message);
                record.set_file(file);
                record.set_line(line);
                record.set_time(&format_now());

                let _guard = self.sync_lock.lock().unwrap_or_else(|e| e.into_inner());
                match self.formatter.format(&record) {
                    Ok(bytes) => {
                        self.sink.write(&bytes).is_ok() && self.sink.flush().is_ok()
                    }
                    Err(_) => false,
                }
            }
        }
    }

    /// 记录跟踪级别日志
    pub fn trace(&self, message: &str) -> bool {
        self.log_str(Level::Trace, message, "", 0)
    }

    /// 记录调试级别日志
    pub fn debug(&self, message: &str) -> bool {
        self.log_str(Level::Debug, message, "", 0)
    }

    /// 记录信息级别日志
    pub fn info(&self, message: &str) -> bool {
        self.log_str(Level::Info, message, "", 0)
    }

    /// 记录警告级别日志
    pub fn warn(&self, message: &str) -> bool {
        self.log_str(Level::Warn, message, "", 0)
    }

    /// 记录错误级别日志
    pub fn error(&self, message: &str) -> bool {
        self.log_str(Level::Error, message, "", 0)
    }

    /// 记录严重级别日志
    pub fn critical(&self, message: &str) -> bool {
        self.log_str(Level::Critical, message, "", 0)
    }

    /// 检查是否应该记录指定级别的日志
    #[inline]
    pub fn should_log(&self, level: Level) -> bool {
        level != Level::Off && level >= self.level()
    }

    /// 获取当前日志级别
    pub fn level(&self) -> Level {
        Level::from_ordinal(self.level.load(Ordering::Relaxed)).unwrap_or(Level::Info)
    }

    /// 运行时调整日志级别
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// 是否运行在异步模式
    pub fn is_async(&self) -> bool {
        self.core.is_some()
    }

    /// 等待已入队日志处理完成
    ///
    /// 异步模式下返回是否在时限内排空（`None` 用默认超时）；
    /// 同步模式下只刷新输出目标。
    pub fn flush(&self, timeout: Option<Duration>) -> bool {
        match &self.core {
            Some(core) => core.flush(timeout),
            None => self.sink.flush().is_ok(),
        }
    }

    /// 优雅关闭：停止接收、排空队列、关闭输出目标
    pub fn shutdown(&self) -> Result<(), Error> {
        if let Some(core) = &self.core {
            core.stop();
        }
        self.sink.shutdown()?;
        Ok(())
    }

    /// 读取管线统计快照，同步模式下返回 `None`
    pub fn stats(&self) -> Option<Stats> {
        self.core.as_ref().map(AsyncLogQueue::stats)
    }

    /// 重置统计计数器
    pub fn reset_stats(&self) {
        if let Some(core) = &self.core {
            core.reset_stats();
        }
    }

    /// 访问底层管线，同步模式下返回 `None`
    pub fn core(&self) -> Option<&AsyncLogQueue> {
        self.core.as_ref()
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        if let Some(core) = &self.core {
            core.stop();
        }
        let _ = self.sink.shutdown();
    }
}

/// 全局日志器管理
pub struct GlobalLogger {
    logger: Mutex<Option<Arc<AsyncLogger>>>,
}

impl GlobalLogger {
    /// 创建新的全局日志器
    pub fn new() -> Self {
        Self {
            logger: Mutex::new(None),
        }
    }

    /// 初始化全局日志器
    pub fn init(&self, logger: Arc<AsyncLogger>) -> Result<(), Error> {
        let mut guard = self
            .logger
            .lock()
            .map_err(|_| Error::Concurrent("global logger lock poisoned"))?;

        // 在测试环境中允许重新初始化
        #[cfg(test)]
        {
            *guard = Some(logger);
            Ok(())
        }

        // 在生产环境中只允许初始化一次
        #[cfg(not(test))]
        {
            if guard.is_some() {
                return Err(Error::AlreadyInitialized);
            }

            *guard = Some(logger);
            Ok(())
        }
    }

    /// 获取全局日志器实例
    pub fn get(&self) -> Option<Arc<AsyncLogger>> {
        self.logger
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 记录一条预先渲染好的消息
    pub fn log_str(&self, level: Level, message: &str, file: &str, line: u32) -> Result<(), Error> {
        match self.get() {
            Some(logger) => {
                let _ = logger.log_str(level, message, file, line);
                Ok(())
            }
            None => Err(Error::NotInitialized),
        }
    }

    /// 刷新日志
    pub fn flush(&self) -> Result<bool, Error> {
        match self.get() {
            Some(logger) => Ok(logger.flush(None)),
            None => Err(Error::NotInitialized),
        }
    }

    /// 关闭日志器
    pub fn shutdown(&self) -> Result<(), Error> {
        match self.get() {
            Some(logger) => logger.shutdown(),
            None => Err(Error::NotInitialized),
        }
    }
}

impl Default for GlobalLogger {
    fn default() -> Self {
        Self::new()
    }
}

// 全局日志器实例 - 使用OnceLock确保线程安全
static GLOBAL_LOGGER: OnceLock<GlobalLogger> = OnceLock::new();

/// 初始化全局日志器
pub fn init_global_logger(logger: Arc<AsyncLogger>) -> Result<(), Error> {
    let global_logger = GLOBAL_LOGGER.get_or_init(GlobalLogger::new);
    global_logger.init(logger)
}

/// 获取全局日志器
pub fn global_logger() -> Option<&'static GlobalLogger> {
    GLOBAL_LOGGER.get()
}
