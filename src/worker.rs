/*!
批处理工作线程与关停协调。

单一后台线程按批抽取队列记录交给处理回调，批量与刷新间隔双触发；
停止时先把队列排空再退出，已成功入队的记录不会静默丢失。

队列中流动的是从对象池取出的 `Box<Record>` 所有权值：生产者通过
[`AsyncLogQueue::acquire_record`] 获取，处理完的批次由工作线程
统一归还，池的统计因此端到端成立。
*/

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::AsyncConfig;
use crate::error::Error;
use crate::pool::RecordPool;
use crate::queue::BoundedQueue;
use crate::record::Record;
use crate::stats::Stats;

/// 日志批处理回调
///
/// 回调只借用批次；记录的归还由工作线程负责。
pub type LogHandler = Arc<dyn Fn(&[Box<Record>]) + Send + Sync>;

/// `flush` 未指定超时时的默认等待时长
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// 工作线程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// 正常运行
    Running = 0,
    /// 已请求停止，正在排空
    Stopping = 1,
    /// 工作线程已退出
    Stopped = 2,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Running,
            1 => WorkerState::Stopping,
            _ => WorkerState::Stopped,
        }
    }
}

/// 异步日志管线：有界队列 + 对象池 + 单消费者工作线程
///
/// 每个实例独立持有全部状态，可在测试中任意多开；溢出策略与刷新
/// 间隔都是实例级旋钮。
pub struct AsyncLogQueue {
    queue: Arc<BoundedQueue>,
    pool: Arc<RecordPool>,
    flush_interval_ms: Arc<AtomicU64>,
    state: Arc<AtomicU8>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct WorkerCtx {
    queue: Arc<BoundedQueue>,
    pool: Arc<RecordPool>,
    handler: LogHandler,
    flush_interval_ms: Arc<AtomicU64>,
    state: Arc<AtomicU8>,
}

impl AsyncLogQueue {
    /// 按配置创建管线并启动工作线程
    pub fn new(config: &AsyncConfig, handler: LogHandler) -> Result<Self, Error> {
        config.validate()?;

        let queue = Arc::new(BoundedQueue::new(
            config.queue_size,
            config.max_batch_size,
            config.drop_on_overflow,
        ));
        let pool = Arc::new(RecordPool::with_initial_size(config.pool_initial_size));
        let flush_interval_ms = Arc::new(AtomicU64::new(config.flush_interval.as_millis() as u64));
        let state = Arc::new(AtomicU8::new(WorkerState::Running as u8));

        let ctx = WorkerCtx {
            queue: queue.clone(),
            pool: pool.clone(),
            handler,
            flush_interval_ms: flush_interval_ms.clone(),
            state: state.clone(),
        };
        let handle = thread::Builder::new()
            .name("asynclog-worker".to_string())
            .spawn(move || run_worker(ctx))?;

        Ok(Self {
            queue,
            pool,
            flush_interval_ms,
            state,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// 从对象池获取一条重置后的记录
    #[inline]
    pub fn acquire_record(&self) -> Box<Record> {
        self.pool.acquire()
    }

    /// 把记录归还对象池；入队失败时由调用方使用
    #[inline]
    pub fn release_record(&self, record: Box<Record>) {
        self.pool.release(record);
    }

    /// 入队一条记录
    ///
    /// 队列满且超时、策略丢弃或已停止时返回 `false`，被拒绝的记录
    /// 自动归还对象池。
    pub fn enqueue(&self, record: Box<Record>) -> bool {
        match self.queue.enqueue(record) {
            Ok(()) => true,
            Err(rejected) => {
                self.pool.release(rejected);
                false
            }
        }
    }

    /// 等待队列被观察为空或超时，返回是否在时限内排空
    ///
    /// `None` 使用 [`DEFAULT_FLUSH_TIMEOUT`]。
    pub fn flush(&self, timeout: Option<Duration>) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.queue
            .wait_empty(timeout.unwrap_or(DEFAULT_FLUSH_TIMEOUT))
    }

    /// 停止接收新记录、排空队列并等待工作线程退出，幂等
    pub fn stop(&self) {
        let running = WorkerState::Running as u8;
        let stopping = WorkerState::Stopping as u8;
        if self
            .state
            .compare_exchange(running, stopping, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        self.queue.stop();
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// 当前队列长度
    pub fn size(&self) -> usize {
        self.queue.size()
    }

    /// 队列是否已满
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// 是否已请求停止
    pub fn is_stopped(&self) -> bool {
        self.queue.is_stopped()
    }

    /// 工作线程状态
    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// 读取队列与池的整体统计快照
    pub fn stats(&self) -> Stats {
        Stats::combine(self.queue.stats(), self.pool.stats())
    }

    /// 重置统计计数器
    pub fn reset_stats(&self) {
        self.queue.reset_stats();
        self.pool.reset_stats();
    }

    /// 切换溢出策略
    pub fn set_drop_on_overflow(&self, drop: bool) {
        self.queue.set_drop_on_overflow(drop);
    }

    /// 调整自动刷新间隔，零值被忽略
    pub fn set_flush_interval(&self, interval: Duration) {
        let ms = interval.as_millis() as u64;
        if ms > 0 {
            self.flush_interval_ms.store(ms, Ordering::Relaxed);
        }
    }

    /// 当前自动刷新间隔
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms.load(Ordering::Relaxed))
    }
}

impl Drop for AsyncLogQueue {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(ctx: WorkerCtx) {
    let mut last_flush = Instant::now();
    while !ctx.queue.is_stopped() {
        let interval = Duration::from_millis(ctx.flush_interval_ms.load(Ordering::Relaxed));

        let batch = ctx.queue.dequeue_batch();
        if !batch.is_empty() {
            deliver(&ctx, batch);
            last_flush = Instant::now();
        } else if last_flush.elapsed() >= interval && !ctx.queue.is_empty() {
            // 刷新间隔已到且队列非空：强制补一轮抽取，
            // 覆盖入队信号丢失或批量始终凑不满的情况
            let forced = ctx.queue.dequeue_batch();
            if !forced.is_empty() {
                deliver(&ctx, forced);
            }
            last_flush = Instant::now();
        }

        if ctx.queue.is_empty() && !ctx.queue.is_stopped() {
            ctx.queue.wait_not_empty(interval);
        }
    }

    // 最终排空：停止前已入队的记录必须全部交付
    loop {
        let batch = ctx.queue.dequeue_batch();
        if batch.is_empty() {
            break;
        }
        deliver(&ctx, batch);
    }
    ctx.state
        .store(WorkerState::Stopped as u8, Ordering::Release);
}

/// 把一批记录交给回调并归还对象池
///
/// 回调崩溃只上报到备用通道，绝不终止工作线程。
fn deliver(ctx: &WorkerCtx, batch: Vec<Box<Record>>) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (ctx.handler)(&batch)));
    match outcome {
        Ok(()) => ctx.queue.note_processed(batch.len()),
        Err(_) => {
            eprintln!(
                "asynclog: log handler panicked, {} records affected",
                batch.len()
            );
        }
    }
    ctx.queue.note_batch_done(batch.len());
    ctx.pool.release_batch(batch);
}
