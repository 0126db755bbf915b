/*!
异步管线配置。

配置由门面持有并在构造时一次性传入核心，核心不读取任何全局状态。
*/

use crate::error::Error;
use std::time::Duration;

/// 异步日志管线配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncConfig {
    /// 是否启用异步模式；关闭时门面直接同步写出
    pub enabled: bool,
    /// 队列容量上限
    pub queue_size: usize,
    /// 单次批量抽取的最大记录数
    pub max_batch_size: usize,
    /// 对象池预热的记录数
    pub pool_initial_size: usize,
    /// 队列满时是否立即丢弃（否则有界等待后丢弃）
    pub drop_on_overflow: bool,
    /// 自动刷新间隔
    pub flush_interval: Duration,
}

impl Default for AsyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_size: 10_000,
            max_batch_size: 100,
            pool_initial_size: 1_000,
            drop_on_overflow: false,
            flush_interval: Duration::from_millis(1000),
        }
    }
}

impl AsyncConfig {
    /// 校验配置，非法值返回 [`Error::Config`]
    pub fn validate(&self) -> Result<(), Error> {
        if self.queue_size == 0 {
            return Err(Error::Config("queue_size must be positive"));
        }
        if self.max_batch_size == 0 {
            return Err(Error::Config("max_batch_size must be positive"));
        }
        if self.max_batch_size > self.queue_size {
            return Err(Error::Config("max_batch_size must not exceed queue_size"));
        }
        if self.flush_interval.is_zero() {
            return Err(Error::Config("flush_interval must be positive"));
        }
        Ok(())
    }
}
