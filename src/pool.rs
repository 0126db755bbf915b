/*!
两级记录对象池。

第一级是严格线程私有的缓存，获取与归还在拥有线程内不加任何锁；
第二级是互斥锁保护的全局空闲链表。两级之间整批迁移，单次加锁
搬运一批记录，把锁竞争摊薄到每批一次。

空闲链表持有的是 `Box<Record>` 所有权值而不是裸指针，重复归还
和归还后使用在类型层面不可表达。池销毁后仍留在其他线程缓存里的
记录在对应线程退出时释放。
*/

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::record::Record;
use crate::stats::PoolStats;

/// 线程本地缓存的容量上限
pub const LOCAL_CACHE_CAPACITY: usize = 32;
/// 两级之间单次迁移的批量大小
pub const TRANSFER_BATCH_SIZE: usize = 8;

/// 池实例编号分配器；线程本地缓存按编号区分不同池
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static LOCAL_CACHES: RefCell<HashMap<u64, Vec<Box<Record>>>> =
        RefCell::new(HashMap::new());
}

/// 两级记录对象池
///
/// `acquire` 永不失败：两级都为空时退化为新分配。每个获取到的
/// 记录都处于重置后的空状态。统计计数器全部为原子操作，不阻塞
/// 热路径。
pub struct RecordPool {
    id: u64,
    free_list: Mutex<Vec<Box<Record>>>,
    allocations: AtomicU64,
    deallocations: AtomicU64,
    cache_hits: AtomicU64,
    outstanding: AtomicUsize,
    peak_outstanding: AtomicUsize,
}

impl RecordPool {
    /// 创建空池
    pub fn new() -> Self {
        Self::with_initial_size(0)
    }

    /// 创建并预热 `initial_size` 条记录进全局空闲链表
    pub fn with_initial_size(initial_size: usize) -> Self {
        let mut free_list = Vec::with_capacity(initial_size);
        for _ in 0..initial_size {
            free_list.push(Box::new(Record::default()));
        }
        Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            free_list: Mutex::new(free_list),
            allocations: AtomicU64::new(0),
            deallocations: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            outstanding: AtomicUsize::new(0),
            peak_outstanding: AtomicUsize::new(0),
        }
    }

    /// 获取一条重置后的记录
    ///
    /// 优先级：线程本地缓存（无锁）→ 全局链表（单次加锁整批取回，
    /// 留一条，其余进本地缓存）→ 新分配。
    pub fn acquire(&self) -> Box<Record> {
        let record = self.take_one();
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.note_outstanding(1);
        record
    }

    /// 归还一条记录
    ///
    /// 记录先重置再进本地缓存；缓存已满时先把整个缓存单次加锁
    /// 迁回全局链表。
    pub fn release(&self, mut record: Box<Record>) {
        record.reset();
        self.deallocations.fetch_add(1, Ordering::Relaxed);
        self.outstanding.fetch_sub(1, Ordering::Relaxed);
        LOCAL_CACHES.with(|caches| {
            let mut caches = caches.borrow_mut();
            let cache = caches.entry(self.id).or_default();
            if cache.len() >= LOCAL_CACHE_CAPACITY {
                let mut full = std::mem::take(cache);
                let mut free = self.lock_free_list();
                free.append(&mut full);
            }
            cache.push(record);
        });
    }

    /// 一次获取 `n` 条重置后的记录
    ///
    /// 与逐条 `acquire` 同策略，但本地缓存整段取走、全局链表只
    /// 加一次锁，缺口由新分配补齐。
    pub fn acquire_batch(&self, n: usize) -> Vec<Box<Record>> {
        let mut batch = Vec::with_capacity(n);
        LOCAL_CACHES.with(|caches| {
            let mut caches = caches.borrow_mut();
            if let Some(cache) = caches.get_mut(&self.id) {
                let take = cache.len().min(n);
                if take > 0 {
                    batch.extend(cache.drain(cache.len() - take..));
                    self.cache_hits.fetch_add(take as u64, Ordering::Relaxed);
                }
            }
        });
        if batch.len() < n {
            let mut free = self.lock_free_list();
            let take = free.len().min(n - batch.len());
            let split_at = free.len() - take;
            batch.extend(free.split_off(split_at));
        }
        while batch.len() < n {
            batch.push(Box::new(Record::default()));
        }
        self.allocations.fetch_add(n as u64, Ordering::Relaxed);
        self.note_outstanding(n);
        batch
    }

    /// 一次归还一批记录
    ///
    /// 本地缓存填到容量为止，溢出部分单次加锁迁入全局链表。
    pub fn release_batch(&self, mut records: Vec<Box<Record>>) {
        let n = records.len();
        if n == 0 {
            return;
        }
        for record in records.iter_mut() {
            record.reset();
        }
        self.deallocations.fetch_add(n as u64, Ordering::Relaxed);
        self.outstanding.fetch_sub(n, Ordering::Relaxed);
        LOCAL_CACHES.with(|caches| {
            let mut caches = caches.borrow_mut();
            let cache = caches.entry(self.id).or_default();
            let room = LOCAL_CACHE_CAPACITY.saturating_sub(cache.len());
            let overflow = if records.len() > room {
                records.split_off(room)
            } else {
                Vec::new()
            };
            cache.append(&mut records);
            if !overflow.is_empty() {
                let mut free = self.lock_free_list();
                free.extend(overflow);
            }
        });
    }

    /// 当前线程本地缓存中属于本池的记录数
    pub fn local_cache_size(&self) -> usize {
        LOCAL_CACHES.with(|caches| {
            caches
                .borrow()
                .get(&self.id)
                .map(Vec::len)
                .unwrap_or_default()
        })
    }

    /// 全局空闲链表中的记录数
    pub fn global_free_size(&self) -> usize {
        self.lock_free_list().len()
    }

    /// 读取统计快照
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            deallocations: self.deallocations.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            current_pool_size: self.outstanding.load(Ordering::Relaxed),
            peak_pool_size: self.peak_outstanding.load(Ordering::Relaxed),
        }
    }

    /// 重置单调计数器；峰值回落到当前在途数
    pub fn reset_stats(&self) {
        self.allocations.store(0, Ordering::Relaxed);
        self.deallocations.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.peak_outstanding
            .store(self.outstanding.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    fn take_one(&self) -> Box<Record> {
        // 快路径：线程本地缓存，拥有线程独占，无锁
        let local = LOCAL_CACHES.with(|caches| {
            caches
                .borrow_mut()
                .get_mut(&self.id)
                .and_then(Vec::pop)
        });
        if let Some(record) = local {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return record;
        }

        // 慢路径：全局链表单次加锁整批取回
        let mut refill = {
            let mut free = self.lock_free_list();
            let take = free.len().min(TRANSFER_BATCH_SIZE);
            let split_at = free.len() - take;
            free.split_off(split_at)
        };
        if let Some(record) = refill.pop() {
            if !refill.is_empty() {
                // 本地缓存此刻为空，批量不会超过容量
                LOCAL_CACHES.with(|caches| {
                    let mut caches = caches.borrow_mut();
                    caches.entry(self.id).or_default().append(&mut refill);
                });
            }
            return record;
        }

        // 两级都空：退化为新分配，池永不失败
        Box::new(Record::default())
    }

    fn note_outstanding(&self, n: usize) {
        let now = self.outstanding.fetch_add(n, Ordering::Relaxed) + n;
        self.peak_outstanding.fetch_max(now, Ordering::Relaxed);
    }

    fn lock_free_list(&self) -> std::sync::MutexGuard<'_, Vec<Box<Record>>> {
        self.free_list.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for RecordPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RecordPool {
    fn drop(&mut self) {
        // 清掉当前线程缓存里属于本池的记录；其他线程的缓存条目
        // 在各自线程退出时释放
        let _ = LOCAL_CACHES.try_with(|caches| {
            if let Ok(mut caches) = caches.try_borrow_mut() {
                caches.remove(&self.id);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_acquire_from_empty_pool_allocates() {
        let pool = RecordPool::new();
        let record = pool.acquire();
        assert!(record.is_empty());

        let stats = pool.stats();
        assert_eq!(stats.allocations, 1);
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.current_pool_size, 1);
        assert_eq!(stats.peak_pool_size, 1);
        pool.release(record);
    }

    #[test]
    fn test_interleaved_reuse_hits_local_cache() {
        // 池从零预热开始，交替获取/归还十次：
        // 首次为新分配，其余九次命中本地缓存
        let pool = RecordPool::new();
        for _ in 0..10 {
            let record = pool.acquire();
            pool.release(record);
        }

        let stats = pool.stats();
        assert_eq!(stats.allocations, 10);
        assert_eq!(stats.deallocations, 10);
        assert_eq!(stats.cache_hits, 9);
        assert_eq!(stats.current_pool_size, 0);
        assert_eq!(stats.peak_pool_size, 1);
    }

    #[test]
    fn test_released_record_is_reset() {
        let pool = RecordPool::new();
        let mut record = pool.acquire();
        record.set_message("to be recycled");
        record.set_line(9);
        pool.release(record);

        let reused = pool.acquire();
        assert!(reused.is_empty());
        pool.release(reused);
    }

    #[test]
    fn test_prewarm_feeds_global_list() {
        let pool = RecordPool::with_initial_size(16);
        assert_eq!(pool.global_free_size(), 16);

        // 慢路径整批取回：留一条，其余进本地缓存
        let record = pool.acquire();
        assert_eq!(pool.local_cache_size(), TRANSFER_BATCH_SIZE - 1);
        assert_eq!(pool.global_free_size(), 16 - TRANSFER_BATCH_SIZE);
        pool.release(record);
    }

    #[test]
    fn test_full_local_cache_migrates_to_global() {
        let pool = RecordPool::new();
        let records: Vec<_> = (0..LOCAL_CACHE_CAPACITY + 1).map(|_| pool.acquire()).collect();
        for record in records {
            pool.release(record);
        }

        // 第 33 次归还触发整批迁移：本地只剩刚归还的一条
        assert_eq!(pool.local_cache_size(), 1);
        assert_eq!(pool.global_free_size(), LOCAL_CACHE_CAPACITY);
    }

    #[test]
    fn test_conservation_across_tiers() {
        let pool = RecordPool::new();
        let mut held: Vec<_> = (0..50).map(|_| pool.acquire()).collect();
        let stats = pool.stats();
        assert_eq!(stats.current_pool_size, 50);
        assert_eq!(stats.peak_pool_size, 50);

        // 归还 40 条，继续持有 10 条
        let returned = held.split_off(10);
        pool.release_batch(returned);

        let stats = pool.stats();
        assert_eq!(stats.current_pool_size, 10);
        // 本地缓存 + 全局空闲 + 在途 == 历史创建总数
        assert_eq!(
            pool.local_cache_size() + pool.global_free_size() + stats.current_pool_size,
            50
        );

        pool.release_batch(held);
        assert_eq!(pool.stats().current_pool_size, 0);
    }

    #[test]
    fn test_batch_acquire_release_roundtrip() {
        let pool = RecordPool::with_initial_size(4);
        let batch = pool.acquire_batch(10);
        assert_eq!(batch.len(), 10);
        assert!(batch.iter().all(|r| r.is_empty()));

        let stats = pool.stats();
        assert_eq!(stats.allocations, 10);
        assert_eq!(stats.current_pool_size, 10);

        pool.release_batch(batch);
        let stats = pool.stats();
        assert_eq!(stats.deallocations, 10);
        assert_eq!(stats.current_pool_size, 0);
        // 预热的 4 条也在这 10 条里，空闲总数等于历史创建总数
        assert_eq!(pool.local_cache_size() + pool.global_free_size(), 10);
    }

    #[test]
    fn test_batch_release_overflow_goes_global() {
        let pool = RecordPool::new();
        let batch = pool.acquire_batch(LOCAL_CACHE_CAPACITY + 8);
        pool.release_batch(batch);

        assert_eq!(pool.local_cache_size(), LOCAL_CACHE_CAPACITY);
        assert_eq!(pool.global_free_size(), 8);
    }

    #[test]
    fn test_reset_stats_keeps_outstanding() {
        let pool = RecordPool::new();
        let record = pool.acquire();
        pool.reset_stats();

        let stats = pool.stats();
        assert_eq!(stats.allocations, 0);
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.current_pool_size, 1);
        assert_eq!(stats.peak_pool_size, 1);
        pool.release(record);
    }

    #[test]
    fn test_cross_thread_acquire_release() {
        let pool = Arc::new(RecordPool::with_initial_size(8));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let pool = pool.clone();
            handles.push(thread::spawn(move || {
                for i in 0..1000 {
                    let mut record = pool.acquire();
                    record.set_message("cross thread");
                    record.set_line(i);
                    pool.release(record);
                }
            }));
        }
        for handle in handles {
            let _ = handle.join();
        }

        let stats = pool.stats();
        assert_eq!(stats.allocations, 4000);
        assert_eq!(stats.deallocations, 4000);
        assert_eq!(stats.current_pool_size, 0);
    }

    #[test]
    fn test_independent_pools_do_not_share_caches() {
        let a = RecordPool::new();
        let b = RecordPool::new();

        let record = a.acquire();
        a.release(record);
        assert_eq!(a.local_cache_size(), 1);
        assert_eq!(b.local_cache_size(), 0);
    }
}
