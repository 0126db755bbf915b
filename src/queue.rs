/*!
互斥锁保护的有界记录队列。

入队在队列满时按策略立即丢弃，或有界等待后丢弃；任何路径都不会
无限阻塞生产者。消费侧按批非阻塞抽取，配合条件变量的有界等待。
*/

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::record::Record;
use crate::stats::QueueStats;

/// 队列满且策略为等待时，入队的最长等待时间
pub const ENQUEUE_WAIT: Duration = Duration::from_millis(100);

/// 有界 FIFO 记录队列
///
/// 长度永不超过容量：入队要么在越界前被拒绝，要么在有界等待内
/// 等到空间。记录按值移动进出，队列持有期间是唯一所有者。
pub struct BoundedQueue {
    buf: Mutex<VecDeque<Box<Record>>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    max_batch_size: usize,
    drop_on_overflow: AtomicBool,
    stopped: AtomicBool,
    /// 已抽取但处理回调尚未返回的记录数；flush 连这部分一起等
    in_flight: AtomicUsize,
    enqueued: AtomicU64,
    dropped: AtomicU64,
    processed: AtomicU64,
}

impl BoundedQueue {
    /// 创建队列
    pub fn new(capacity: usize, max_batch_size: usize, drop_on_overflow: bool) -> Self {
        Self {
            buf: Mutex::new(VecDeque::with_capacity(capacity)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            max_batch_size,
            drop_on_overflow: AtomicBool::new(drop_on_overflow),
            stopped: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            enqueued: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            processed: AtomicU64::new(0),
        }
    }

    /// 入队一条记录
    ///
    /// 成功返回 `Ok(())`；队列已停止、立即丢弃或等待超时后仍满时
    /// 把记录原样还给调用方，由其决定归还对象池还是丢弃。
    pub fn enqueue(&self, record: Box<Record>) -> Result<(), Box<Record>> {
        if self.is_stopped() {
            return Err(record);
        }
        let mut buf = self.lock_buf();
        if buf.len() >= self.capacity {
            if self.drop_on_overflow.load(Ordering::Relaxed) {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return Err(record);
            }
            // 有界等待队列腾出空间，绝不无限阻塞生产者
            let (guard, _) = self
                .not_full
                .wait_timeout_while(buf, ENQUEUE_WAIT, |b| {
                    b.len() >= self.capacity && !self.is_stopped()
                })
                .unwrap_or_else(|e| e.into_inner());
            buf = guard;
            if buf.len() >= self.capacity || self.is_stopped() {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return Err(record);
            }
        }
        buf.push_back(record);
        self.enqueued.fetch_add(1, Ordering::Relaxed);
        drop(buf);
        self.not_empty.notify_one();
        Ok(())
    }

    /// 按 FIFO 顺序非阻塞抽取一批记录，最多 `max_batch_size` 条
    ///
    /// 消费者处理完批次后必须调用 [`note_batch_done`]，否则 flush
    /// 会一直把这批记录当作未完成。
    ///
    /// [`note_batch_done`]: BoundedQueue::note_batch_done
    pub fn dequeue_batch(&self) -> Vec<Box<Record>> {
        let mut buf = self.lock_buf();
        let take = buf.len().min(self.max_batch_size);
        let batch: Vec<Box<Record>> = buf.drain(..take).collect();
        // 在队列锁内登记在途数，flush 的判空不会看到中间状态
        self.in_flight.fetch_add(batch.len(), Ordering::Relaxed);
        drop(buf);
        if !batch.is_empty() {
            // 腾出了空间：唤醒等空间的生产者
            self.not_full.notify_all();
        }
        batch
    }

    /// 消费者处理完一批记录后登记完成，唤醒等排空的 flush 调用方
    pub fn note_batch_done(&self, n: usize) {
        let _buf = self.lock_buf();
        self.in_flight.fetch_sub(n, Ordering::Relaxed);
        self.not_full.notify_all();
    }

    /// 有界等待队列非空；用于工作线程的空闲等待
    pub fn wait_not_empty(&self, timeout: Duration) {
        let buf = self.lock_buf();
        if buf.is_empty() && !self.is_stopped() {
            let _ = self
                .not_empty
                .wait_timeout_while(buf, timeout, |b| b.is_empty() && !self.is_stopped())
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// 唤醒消费者并等待队列排空（含在途批次处理完成）或停止，
    /// 返回是否在时限内排空
    pub fn wait_empty(&self, timeout: Duration) -> bool {
        let buf = self.lock_buf();
        self.not_empty.notify_one();
        let (buf, _) = self
            .not_full
            .wait_timeout_while(buf, timeout, |b| {
                (!b.is_empty() || self.in_flight.load(Ordering::Relaxed) > 0)
                    && !self.is_stopped()
            })
            .unwrap_or_else(|e| e.into_inner());
        (buf.is_empty() && self.in_flight.load(Ordering::Relaxed) == 0) || self.is_stopped()
    }

    /// 置停止标志并唤醒所有等待者，幂等
    pub fn stop(&self) {
        // 持锁置标志，保证不会有等待者漏掉唤醒
        let _buf = self.lock_buf();
        self.stopped.store(true, Ordering::SeqCst);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// 当前队列长度
    pub fn size(&self) -> usize {
        self.lock_buf().len()
    }

    /// 队列是否已满
    pub fn is_full(&self) -> bool {
        self.lock_buf().len() >= self.capacity
    }

    /// 队列是否为空
    pub fn is_empty(&self) -> bool {
        self.lock_buf().is_empty()
    }

    /// 是否已请求停止
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// 队列容量
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 单批最大抽取数
    #[inline]
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// 切换溢出策略
    pub fn set_drop_on_overflow(&self, drop: bool) {
        self.drop_on_overflow.store(drop, Ordering::Relaxed);
    }

    /// 记录一批已交给处理回调的数量
    pub fn note_processed(&self, n: usize) {
        self.processed.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// 读取统计快照
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            current_queue_size: self.size(),
        }
    }

    /// 重置统计计数器
    pub fn reset_stats(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.processed.store(0, Ordering::Relaxed);
    }

    fn lock_buf(&self) -> MutexGuard<'_, VecDeque<Box<Record>>> {
        self.buf.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    fn record(message: &str) -> Box<Record> {
        Box::new(Record::new(Level::Info, message))
    }

    #[test]
    fn test_enqueue_dequeue_fifo() {
        let queue = BoundedQueue::new(8, 4, false);
        for i in 0..6 {
            assert!(queue.enqueue(record(&format!("m{i}"))).is_ok());
        }
        assert_eq!(queue.size(), 6);

        let first = queue.dequeue_batch();
        let second = queue.dequeue_batch();
        assert_eq!(first.len(), 4);
        assert_eq!(second.len(), 2);

        let order: Vec<String> = first
            .iter()
            .chain(second.iter())
            .map(|r| r.message().into_owned())
            .collect();
        assert_eq!(order, ["m0", "m1", "m2", "m3", "m4", "m5"]);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        // 容量 4、等待策略：A-D 入队成功，E 有界等待后失败
        let queue = BoundedQueue::new(4, 2, false);
        for message in ["A", "B", "C", "D"] {
            assert!(queue.enqueue(record(message)).is_ok());
        }

        let started = Instant::now();
        let rejected = queue.enqueue(record("E"));
        assert!(rejected.is_err());
        assert!(started.elapsed() >= Duration::from_millis(80));
        assert_eq!(queue.size(), 4);
        assert_eq!(queue.stats().dropped, 1);

        // 腾出两个位置后入队恢复
        let drained = queue.dequeue_batch();
        assert_eq!(drained.len(), 2);
        assert!(queue.enqueue(record("E2")).is_ok());
        assert_eq!(queue.size(), 3);
    }

    #[test]
    fn test_drop_on_overflow_fails_immediately() {
        let queue = BoundedQueue::new(2, 10, true);
        assert!(queue.enqueue(record("A")).is_ok());
        assert!(queue.enqueue(record("B")).is_ok());

        let started = Instant::now();
        let rejected = queue.enqueue(record("C"));
        assert!(rejected.is_err());
        // 立即返回，没有等待
        assert!(started.elapsed() < ENQUEUE_WAIT);

        let stats = queue.stats();
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.enqueued, 2);
        assert_eq!(queue.size(), 2);
    }

    #[test]
    fn test_blocked_enqueue_succeeds_when_drained() {
        let queue = Arc::new(BoundedQueue::new(2, 2, false));
        assert!(queue.enqueue(record("A")).is_ok());
        assert!(queue.enqueue(record("B")).is_ok());

        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                queue.dequeue_batch()
            })
        };

        // 满队列上的入队应在消费者腾出空间后成功
        assert!(queue.enqueue(record("C")).is_ok());
        let drained = consumer.join().unwrap_or_default();
        assert_eq!(drained.len(), 2);
        assert_eq!(queue.stats().dropped, 0);
    }

    #[test]
    fn test_enqueue_after_stop_returns_record() {
        let queue = BoundedQueue::new(4, 2, false);
        queue.stop();
        assert!(queue.is_stopped());

        let rejected = queue.enqueue(record("late"));
        assert!(rejected.is_err());
        // 停止后的拒绝不计入 dropped
        assert_eq!(queue.stats().dropped, 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let queue = BoundedQueue::new(4, 2, false);
        queue.stop();
        queue.stop();
        assert!(queue.is_stopped());
    }

    #[test]
    fn test_wait_empty_observes_drain() {
        let queue = Arc::new(BoundedQueue::new(16, 16, false));
        for i in 0..10 {
            assert!(queue.enqueue(record(&format!("m{i}"))).is_ok());
        }

        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                loop {
                    let batch = queue.dequeue_batch();
                    if batch.is_empty() {
                        break;
                    }
                    queue.note_batch_done(batch.len());
                }
            })
        };

        assert!(queue.wait_empty(Duration::from_secs(2)));
        let _ = consumer.join();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wait_empty_times_out_without_consumer() {
        let queue = BoundedQueue::new(4, 2, false);
        assert!(queue.enqueue(record("stuck")).is_ok());
        assert!(!queue.wait_empty(Duration::from_millis(50)));
    }

    #[test]
    fn test_per_producer_order_is_preserved() {
        let queue = Arc::new(BoundedQueue::new(1024, 64, false));
        let mut handles = Vec::new();
        for producer in 0..4 {
            let queue = queue.clone();
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    let _ = queue.enqueue(record(&format!("p{producer}-{i:03}")));
                }
            }));
        }
        for handle in handles {
            let _ = handle.join();
        }

        let mut seen: Vec<String> = Vec::new();
        loop {
            let batch = queue.dequeue_batch();
            if batch.is_empty() {
                break;
            }
            seen.extend(batch.iter().map(|r| r.message().into_owned()));
        }
        assert_eq!(seen.len(), 400);

        // 跨线程顺序不作保证，单个生产者内部的相对顺序必须保持
        for producer in 0..4 {
            let prefix = format!("p{producer}-");
            let own: Vec<&String> = seen.iter().filter(|m| m.starts_with(&prefix)).collect();
            assert_eq!(own.len(), 100);
            assert!(own.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
