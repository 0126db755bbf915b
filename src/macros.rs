//! 日志宏模块
//!
//! 提供类似标准log crate的宏，与全局日志器集成

/// 记录日志的宏实现
///
/// 该宏具有惰性求值特性：只有当日志级别启用时，才会执行格式化操作，
/// 避免了不必要的字符串格式化开销。
#[macro_export]
macro_rules! log {
    ($lvl:expr, $($arg:tt)+) => ({
        let lvl = $lvl;
        if let Some(logger) = $crate::global_logger() {
            if logger.get().map_or(false, |l| l.should_log(lvl)) {
                let message = format!($($arg)+);
                let _ = logger.log_str(lvl, &message, file!(), line!());
            }
        }
    });
}

/// 记录严重级别日志
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => (
        $crate::log!($crate::Level::Critical, $($arg)+)
    );
}

/// 记录错误级别日志
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => (
        $crate::log!($crate::Level::Error, $($arg)+)
    );
}

/// 记录警告级别日志
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => (
        $crate::log!($crate::Level::Warn, $($arg)+)
    );
}

/// 记录信息级别日志
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => (
        $crate::log!($crate::Level::Info, $($arg)+)
    );
}

/// 记录调试级别日志
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => (
        $crate::log!($crate::Level::Debug, $($arg)+)
    );
}

/// 记录跟踪级别日志
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => (
        $crate::log!($crate::Level::Trace, $($arg)+)
    );
}
