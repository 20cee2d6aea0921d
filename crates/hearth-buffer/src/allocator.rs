//! 池化工厂：配置校验、Arena 编组与轮转派发。
//!
//! # 使用方式（How）
//! - 进程内通常只建一个工厂实例，所有连接/任务共享；
//! - 每次 `new_buffer` 以原子自增序号对 Arena 数取模，把分配压力均匀摊到
//!   各 Arena；缓冲不与线程绑定，任何线程都可以释放任何缓冲。

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use hearth_core::{PoolError, Result};

use crate::arena::{ArenaStats, PoolArena};
use crate::pooled::PooledByteBuf;
use crate::size_class::{MAX_CHUNK_SIZE, MIN_PAGE_SIZE, SizePolicy};

/// 池化分配器配置。所有字段都有可直接投产的默认值，
/// 在构造工厂时一次性校验。
///
/// # 契约说明（What）
/// - `page_size`：伙伴树叶子大小，2 的幂且 `≥ 4096`；
/// - `max_order`：伙伴树深度，`page_size << max_order` 即 Chunk 大小，
///   上限 1 GiB；
/// - `arena_count`：Arena 个数，`≥ 1`；默认取
///   `max(4, 可用并行度)`（`no_std` 下固定为 4）。
#[derive(Clone, Debug)]
pub struct PooledAllocatorConfig {
    /// 伙伴树叶子（页）大小。默认 4096。
    pub page_size: usize,
    /// 伙伴树深度。默认 11（Chunk 为 8 MiB）。
    pub max_order: u32,
    /// Arena 个数。默认 `max(4, 可用并行度)`。
    pub arena_count: usize,
}

impl Default for PooledAllocatorConfig {
    fn default() -> Self {
        Self {
            page_size: 4096,
            max_order: 11,
            arena_count: default_arena_count(),
        }
    }
}

impl PooledAllocatorConfig {
    /// 校验配置约束，违规返回 [`alloc.config`](hearth_core::error::codes::CONFIG)。
    pub fn validate(&self) -> Result<()> {
        if self.page_size < MIN_PAGE_SIZE {
            return Err(PoolError::config("page_size 不得小于 4096"));
        }
        if !self.page_size.is_power_of_two() {
            return Err(PoolError::config("page_size 必须是 2 的幂"));
        }
        if self.max_order > 30 {
            return Err(PoolError::config("max_order 不得超过 30"));
        }
        let chunk_size = (self.page_size as u128) << self.max_order;
        if chunk_size > MAX_CHUNK_SIZE as u128 {
            return Err(PoolError::config("page_size << max_order 不得超过 1 GiB"));
        }
        if self.arena_count == 0 {
            return Err(PoolError::config("arena_count 不得为 0"));
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
fn default_arena_count() -> usize {
    std::thread::available_parallelism().map_or(4, |cores| cores.get().max(4))
}

#[cfg(not(feature = "std"))]
fn default_arena_count() -> usize {
    4
}

/// 池化缓冲工厂。
///
/// # 并发契约（What）
/// - `new_buffer` 可被任意多线程并发调用；Arena 选择只依赖一次
///   `fetch_add`，无锁；
/// - 工厂本身可被 `Arc` 共享，也可克隆句柄（内部 Arena 以 `Arc` 计数）。
pub struct PooledByteBufAllocator {
    arenas: Vec<Arc<PoolArena>>,
    seq: AtomicUsize,
}

impl PooledByteBufAllocator {
    /// 以默认配置构建工厂。
    pub fn new() -> Self {
        Self::with_config(PooledAllocatorConfig::default()).expect("默认配置恒满足校验")
    }

    /// 以显式配置构建工厂。
    pub fn with_config(config: PooledAllocatorConfig) -> Result<Self> {
        config.validate()?;
        let policy = SizePolicy::new(config.page_size, config.max_order);
        let arenas = (0..config.arena_count)
            .map(|_| Arc::new(PoolArena::new(policy)))
            .collect();
        Ok(Self {
            arenas,
            seq: AtomicUsize::new(0),
        })
    }

    /// 分配 `length` 字节、容量上限取 `usize::MAX` 的池化缓冲。
    pub fn new_buffer(&self, length: usize) -> Result<PooledByteBuf> {
        self.new_buffer_with_max(length, usize::MAX)
    }

    /// 分配 `length` 字节、容量上限为 `max_capacity` 的池化缓冲。
    ///
    /// # 契约（What）
    /// - `max_capacity < length` 返回非法参数错误；
    /// - 成功时 `capacity() == length`，读写指针归零，引用计数为 1。
    pub fn new_buffer_with_max(
        &self,
        length: usize,
        max_capacity: usize,
    ) -> Result<PooledByteBuf> {
        if max_capacity < length {
            return Err(PoolError::invalid_argument(
                "max_capacity 不得小于初始长度",
            ));
        }
        let arena = self.next_arena();
        let seat = arena.allocate(length);
        Ok(PooledByteBuf::new(Arc::clone(arena), seat, length, max_capacity))
    }

    /// Arena 个数。
    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    /// 聚合全部 Arena 的观测快照。
    pub fn stats(&self) -> ArenaStats {
        let mut merged = ArenaStats::default();
        for arena in &self.arenas {
            merged.merge(&arena.stats());
        }
        merged
    }

    fn next_arena(&self) -> &Arc<PoolArena> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        &self.arenas[seq % self.arenas.len()]
    }
}

impl Default for PooledByteBufAllocator {
    fn default() -> Self {
        Self::new()
    }
}
