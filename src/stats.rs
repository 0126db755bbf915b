/*!
统计信息快照。

计数器本体在队列和对象池内部以原子变量维护，这里只定义
读取时的普通值快照。
*/

/// 队列统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// 成功入队总数
    pub enqueued: u64,
    /// 因队列满或等待超时被丢弃的总数
    pub dropped: u64,
    /// 已交给处理回调的总数
    pub processed: u64,
    /// 当前队列长度
    pub current_queue_size: usize,
}

/// 对象池统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// 获取记录的总次数
    pub allocations: u64,
    /// 归还记录的总次数
    pub deallocations: u64,
    /// 线程本地缓存命中次数
    pub cache_hits: u64,
    /// 当前在途（已获取未归还）的记录数
    pub current_pool_size: usize,
    /// 在途记录数的历史峰值
    pub peak_pool_size: usize,
}

/// 管线整体统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// 成功入队总数
    pub enqueued: u64,
    /// 被丢弃的总数
    pub dropped: u64,
    /// 已处理的总数
    pub processed: u64,
    /// 当前队列长度
    pub current_queue_size: usize,
    /// 获取记录的总次数
    pub allocations: u64,
    /// 归还记录的总次数
    pub deallocations: u64,
    /// 线程本地缓存命中次数
    pub cache_hits: u64,
    /// 当前在途记录数
    pub current_pool_size: usize,
    /// 在途记录数峰值
    pub peak_pool_size: usize,
}

impl Stats {
    /// 由队列与池的快照合成整体快照
    pub fn combine(queue: QueueStats, pool: PoolStats) -> Self {
        Self {
            enqueued: queue.enqueued,
            dropped: queue.dropped,
            processed: queue.processed,
            current_queue_size: queue.current_queue_size,
            allocations: pool.allocations,
            deallocations: pool.deallocations,
            cache_hits: pool.cache_hits,
            current_pool_size: pool.current_pool_size,
            peak_pool_size: pool.peak_pool_size,
        }
    }
}
