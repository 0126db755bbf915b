/*!
错误处理模块。

核心管线的失败（队列满、入队被拒、池耗尽）以布尔值和计数器暴露，
不走错误类型；这里的 `Error` 只覆盖初始化、配置和 I/O 边界。
*/

use std::io;
use thiserror::Error;

/// 日志库的错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// 初始化错误，日志器已经被初始化
    #[error("logger already initialized")]
    AlreadyInitialized,

    /// 未初始化错误，日志器尚未初始化
    #[error("logger not initialized")]
    NotInitialized,

    /// I/O错误，如文件写入失败
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 队列错误，如工作线程无法启动
    #[error("queue error: {0}")]
    Queue(&'static str),

    /// 配置错误，如无效的配置值
    #[error("configuration error: {0}")]
    Config(&'static str),

    /// 并发错误，如全局锁中毒
    #[error("concurrency error: {0}")]
    Concurrent(&'static str),
}

/// 结果类型别名，简化错误处理
pub type Result<T> = std::result::Result<T, Error>;
