/*!
异步批处理日志库。

有界队列 + 单消费者批处理线程 + 两级记录对象池：应用线程只负责
填充记录并入队，格式化与写出由后台线程批量完成，对象池把记录
分配的开销摊平在持续负载下。

## 特性

- 有界背压：队列满时按策略立即丢弃或有界等待，生产者永不无限阻塞
- 批量消费：按批量大小与刷新间隔双触发，顺序交付不乱序
- 两级对象池：线程本地缓存无锁命中，全局空闲链表整批迁移
- 优雅关闭：停止时排空队列，已入队记录不会静默丢失
- 失败即数据：队列拒绝与丢弃以布尔值和计数器暴露，日志库绝不
  成为应用崩溃的原因

## 使用示例

```rust
use asynclog_rs::{AsyncLogger, AsyncConfig, Level, SimpleFormatter, MemorySink};
use std::sync::Arc;
use std::time::Duration;

let logger = AsyncLogger::new(
    Level::Info,
    Arc::new(SimpleFormatter::new()),
    Arc::new(MemorySink::new()),
    AsyncConfig::default(),
).unwrap();

logger.info("Hello, world!");
logger.flush(Some(Duration::from_secs(1)));
logger.shutdown().unwrap();
```
*/

#![warn(missing_docs)]

use std::sync::Arc;

pub mod builder;
pub mod compat;
pub mod config;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod macros;
pub mod pool;
pub mod queue;
pub mod record;
pub mod sink;
pub mod stats;
pub mod worker;

// 公共API导出
pub use crate::builder::AsyncLoggerBuilder;
pub use crate::compat::{LogBridge, init_log_bridge};
pub use crate::config::AsyncConfig;
pub use crate::error::Error;
pub use crate::format::{DefaultFormatter, Formatter, JsonFormatter, SimpleFormatter};
pub use crate::level::Level;
pub use crate::logger::{AsyncLogger, GlobalLogger, global_logger, init_global_logger};
pub use crate::pool::RecordPool;
pub use crate::queue::BoundedQueue;
pub use crate::record::Record;
pub use crate::sink::{CompositeSink, ConsoleSink, FileSink, MemorySink, NullSink, Sink};
pub use crate::stats::{PoolStats, QueueStats, Stats};
pub use crate::worker::{AsyncLogQueue, LogHandler, WorkerState};

/// 初始化全局日志器
///
/// # 示例
/// ```no_run
/// use asynclog_rs::{AsyncLoggerBuilder, Level, init};
/// use std::sync::Arc;
///
/// let logger = AsyncLoggerBuilder::new()
///     .level(Level::Debug)
///     .with_console_output()
///     .build()
///     .unwrap();
///
/// init(Arc::new(logger)).unwrap();
/// ```
pub fn init(logger: Arc<AsyncLogger>) -> Result<(), Error> {
    init_global_logger(logger)
}

/// 获取全局日志器实例
pub fn get_logger() -> Option<&'static GlobalLogger> {
    global_logger()
}
