/*!
独立的Builder模块，用于构建AsyncLogger实例。

以流畅的方式配置级别、格式化器、输出目标和异步管线参数。
*/

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::Level;
use crate::config::AsyncConfig;
use crate::error::Error;
use crate::format::Formatter;
use crate::logger::AsyncLogger;
use crate::sink::Sink;

/// 构建器模式配置
#[derive(Clone)]
pub struct AsyncLoggerBuilder {
    level: Level,
    formatter: Option<Arc<dyn Formatter>>,
    sink: Option<Arc<dyn Sink>>,
    config: AsyncConfig,
}

impl Default for AsyncLoggerBuilder {
    fn default() -> Self {
        Self {
            level: Level::Info,
            formatter: None,
            sink: None,
            config: AsyncConfig::default(),
        }
    }
}

impl AsyncLoggerBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置日志级别
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// 设置格式化器
    pub fn formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// 设置输出目标
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 整体替换管线配置
    pub fn config(mut self, config: AsyncConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置队列容量
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_size = capacity;
        self
    }

    /// 设置单批最大抽取数
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.max_batch_size = size;
        self
    }

    /// 设置对象池预热数量
    pub fn pool_initial_size(mut self, size: usize) -> Self {
        self.config.pool_initial_size = size;
        self
    }

    /// 设置队列满时是否立即丢弃
    pub fn drop_on_overflow(mut self, drop: bool) -> Self {
        self.config.drop_on_overflow = drop;
        self
    }

    /// 设置刷新间隔
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = interval;
        self
    }

    /// 关闭异步管线，日志同步写出 (便捷方法)
    pub fn synchronous(mut self) -> Self {
        self.config.enabled = false;
        self
    }

    /// 设置为调试级别 (便捷方法)
    pub fn with_debug_level(mut self) -> Self {
        self.level = Level::Debug;
        self
    }

    /// 设置为跟踪级别 (便捷方法)
    pub fn with_trace_level(mut self) -> Self {
        self.level = Level::Trace;
        self
    }

    /// 使用JSON格式化器 (便捷方法)
    pub fn with_json_formatting(mut self) -> Self {
        self.formatter = Some(Arc::new(crate::format::JsonFormatter::new()));
        self
    }

    /// 使用简单格式化器 (便捷方法)
    pub fn with_simple_formatting(mut self) -> Self {
        self.formatter = Some(Arc::new(crate::format::SimpleFormatter::new()));
        self
    }

    /// 使用控制台输出 (便捷方法)
    pub fn with_console_output(mut self) -> Self {
        self.sink = Some(Arc::new(crate::sink::ConsoleSink::new()));
        self
    }

    /// 使用文件输出 (便捷方法)
    pub fn with_file_output<P: AsRef<Path>>(mut self, path: P) -> Self {
        match crate::sink::FileSink::new(path) {
            Ok(sink) => self.sink = Some(Arc::new(sink)),
            Err(_) => {
                // 如果文件创建失败，则回退到控制台输出
                self.sink = Some(Arc::new(crate::sink::ConsoleSink::new()));
            }
        }
        self
    }

    /// 构建AsyncLogger实例
    pub fn build(self) -> Result<AsyncLogger, Error> {
        let formatter = self
            .formatter
            .unwrap_or_else(|| Arc::new(crate::format::DefaultFormatter::new()));
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(crate::sink::ConsoleSink::new()));

        AsyncLogger::new(self.level, formatter, sink, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_creation() {
        let builder = AsyncLoggerBuilder::new();
        assert_eq!(builder.level, Level::Info);
    }

    #[test]
    fn test_builder_with_level() {
        let builder = AsyncLoggerBuilder::new().level(Level::Debug);
        assert_eq!(builder.level, Level::Debug);
    }

    #[test]
    fn test_builder_with_convenience_methods() {
        let builder = AsyncLoggerBuilder::new()
            .with_debug_level()
            .with_console_output()
            .with_simple_formatting();

        assert_eq!(builder.level, Level::Debug);
        assert!(builder.formatter.is_some());
        assert!(builder.sink.is_some());
    }

    #[test]
    fn test_builder_configuration_methods() {
        let builder = AsyncLoggerBuilder::new()
            .queue_capacity(2000)
            .batch_size(50)
            .pool_initial_size(128)
            .drop_on_overflow(true)
            .flush_interval(Duration::from_millis(200));

        assert_eq!(builder.config.queue_size, 2000);
        assert_eq!(builder.config.max_batch_size, 50);
        assert_eq!(builder.config.pool_initial_size, 128);
        assert!(builder.config.drop_on_overflow);
        assert_eq!(builder.config.flush_interval, Duration::from_millis(200));
    }

    #[test]
    fn test_builder_build() {
        let result = AsyncLoggerBuilder::new().level(Level::Info).build();
        assert!(result.is_ok());
        if let Ok(logger) = result {
            let _ = logger.shutdown();
        }
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = AsyncLoggerBuilder::new().queue_capacity(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_synchronous_mode() {
        let result = AsyncLoggerBuilder::new().synchronous().build();
        assert!(result.is_ok());
        if let Ok(logger) = result {
            assert!(!logger.is_async());
            let _ = logger.shutdown();
        }
    }

    #[test]
    fn test_builder_with_all_configurations() {
        let result = AsyncLoggerBuilder::new()
            .level(Level::Trace)
            .with_json_formatting()
            .with_console_output()
            .queue_capacity(2000)
            .batch_size(50)
            .flush_interval(Duration::from_millis(200))
            .build();

        assert!(result.is_ok());
        if let Ok(logger) = result {
            let _ = logger.shutdown();
        }
    }
}
