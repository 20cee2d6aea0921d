//! Arena：规格路由、Chunk 列表与 Subpage 规格池的汇合点。
//!
//! # 模块角色（Why）
//! - 工厂按轮转把缓冲请求散列到多个 Arena，以降低锁竞争；每个 Arena 独立
//!   持有自己的 Chunk 列表与规格池，Arena 之间互不共享可变状态；
//! - 分配的三条路径在此分流：Tiny/Small 先查规格池的现成 Subpage，未命中
//!   连同 Normal 一起走 Chunk 列表（必要时新建 Chunk），Huge 绕过池直接
//!   申请一次性区段。
//!
//! # 并发契约（What）
//! - `inner`（池头、Chunk 列表、树状态、位图）由一把自旋互斥锁整体保护，
//!   持锁区间只有池头查看、Chunk 链遍历或一次树下降，均为短临界区；
//! - `metrics` 为锁外的宽松原子计数，快照一致性以“单调不减”为准；
//! - 缓冲释放可以发生在任意线程：释放路径只携带 `(Chunk 槽位, 句柄)`，
//!   不依赖分配线程的任何局部状态。
//!
//! # 结构选型（Trade-offs）
//! - Subpage 规格池以“向量栈 + 成员反向索引”实现：入池是 push，常规出池是
//!   pop（取栈顶分配、恰好在栈顶满员），中途销毁是 `swap_remove` 加一次
//!   反向索引修补——三种操作都是 O(1)，且没有环形链表的裸指针；
//! - 池化 Chunk 从不回收：`Vec<PoolChunk>` 的下标因此成为稳定的 Chunk
//!   标识，句柄无需携带代际信息。

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use spin::Mutex;

use crate::chunk::{
    BITMAP_IDX_MASK, PoolChunk, handle_bitmap_part, handle_mem_map_idx, subpage_handle,
};
use crate::region::RawRegion;
use crate::size_class::{SizeClass, SizePolicy, TINY_CLASS_COUNT, TINY_LIMIT};
use crate::subpage::SubpageFree;

/// 缓冲在池中的“席位”：读写所需的全部定位信息。
///
/// `region`/`offset`/`max_length` 足以完成无锁的字节访问；`chunk` 与
/// `handle` 则在释放、迁移时交还 Arena。`chunk` 为 `None` 表示一次性
/// Huge 区段——释放即丢弃 `Arc`，不经过池。
pub(crate) struct Seat {
    pub(crate) region: Arc<RawRegion>,
    pub(crate) chunk: Option<usize>,
    pub(crate) handle: u64,
    pub(crate) offset: usize,
    pub(crate) max_length: usize,
}

/// 规格池成员：以 `(Chunk 槽位, 页下标)` 指名一个 Subpage。
#[derive(Clone, Copy)]
struct SubpageRef {
    chunk: usize,
    page: usize,
}

/// 单个规格的 Subpage 池（向量栈）。
#[derive(Default)]
struct SubpagePool {
    members: Vec<SubpageRef>,
}

struct ArenaInner {
    tiny_pools: Vec<SubpagePool>,
    small_pools: Vec<SubpagePool>,
    chunks: Vec<PoolChunk>,
}

/// 一个独立的分配域。
pub(crate) struct PoolArena {
    policy: SizePolicy,
    inner: Mutex<ArenaInner>,
    metrics: ArenaMetrics,
}

impl PoolArena {
    pub(crate) fn new(policy: SizePolicy) -> Self {
        let tiny_pools = (0..TINY_CLASS_COUNT).map(|_| SubpagePool::default()).collect();
        let small_pools = (0..policy.small_class_count())
            .map(|_| SubpagePool::default())
            .collect();
        Self {
            policy,
            inner: Mutex::new(ArenaInner {
                tiny_pools,
                small_pools,
                chunks: Vec::new(),
            }),
            metrics: ArenaMetrics::default(),
        }
    }

    /// 为 `req` 字节分配一个席位；席位的逻辑容量由调用方自行记录。
    pub(crate) fn allocate(&self, req: usize) -> Seat {
        let norm = self.policy.normalize(req);
        let class = self.policy.classify(norm);
        if class == SizeClass::Huge {
            #[cfg(feature = "tracing")]
            tracing::trace!(len = norm, "分配一次性 Huge 区段");
            self.metrics.record_alloc(SizeClass::Huge);
            return Seat {
                region: Arc::new(RawRegion::zeroed(norm)),
                chunk: None,
                handle: 0,
                offset: 0,
                max_length: norm,
            };
        }

        let mut inner = self.inner.lock();
        let (chunk_id, handle) = inner.allocate_pooled(&self.policy, norm);
        let chunk = &inner.chunks[chunk_id];
        let (offset, max_length) = chunk.resolve(handle);
        let seat = Seat {
            region: Arc::clone(chunk.region()),
            chunk: Some(chunk_id),
            handle,
            offset,
            max_length,
        };
        drop(inner);
        self.metrics.record_alloc(class);
        seat
    }

    /// 归还席位。池化席位回到树/位图，一次性席位随 `Arc` 一同释放。
    pub(crate) fn free(&self, seat: Seat) {
        let Seat {
            chunk,
            handle,
            max_length,
            ..
        } = seat;
        let Some(chunk_id) = chunk else {
            self.metrics.record_dealloc(SizeClass::Huge);
            return;
        };
        let class = if handle_bitmap_part(handle) != 0 {
            if max_length < TINY_LIMIT {
                SizeClass::Tiny
            } else {
                SizeClass::Small
            }
        } else {
            SizeClass::Normal
        };
        self.inner.lock().free_pooled(chunk_id, handle);
        self.metrics.record_dealloc(class);
    }

    /// 观测快照；计数来自锁外宽松原子，Chunk 维度在锁内取得。
    pub(crate) fn stats(&self) -> ArenaStats {
        let (chunk_count, free_bytes) = {
            let inner = self.inner.lock();
            (
                inner.chunks.len(),
                inner.chunks.iter().map(PoolChunk::free_bytes).sum(),
            )
        };
        self.metrics.snapshot(chunk_count, free_bytes)
    }
}

impl ArenaInner {
    /// Tiny/Small/Normal 的池化分配；总能成功（必要时新建 Chunk）。
    fn allocate_pooled(&mut self, policy: &SizePolicy, norm: usize) -> (usize, u64) {
        if policy.is_subpage(norm) {
            if let Some(hit) = self.allocate_from_pool(norm) {
                return hit;
            }
        }
        for chunk_id in (0..self.chunks.len()).rev() {
            if let Some(handle) = Self::allocate_in_chunk(
                &mut self.chunks,
                &mut self.tiny_pools,
                &mut self.small_pools,
                policy,
                chunk_id,
                norm,
            ) {
                return (chunk_id, handle);
            }
        }

        let chunk_id = self.chunks.len();
        self.chunks.push(PoolChunk::new(*policy));
        #[cfg(feature = "tracing")]
        tracing::trace!(
            chunk_size = policy.chunk_size(),
            chunk_count = self.chunks.len(),
            "现有 Chunk 均无法容纳，新建池化 Chunk"
        );
        let handle = Self::allocate_in_chunk(
            &mut self.chunks,
            &mut self.tiny_pools,
            &mut self.small_pools,
            policy,
            chunk_id,
            norm,
        )
        .expect("全新 Chunk 必能满足不超过 chunk_size 的规格");
        (chunk_id, handle)
    }

    /// 规格池快路径：取栈顶 Subpage 分配一个元素。
    fn allocate_from_pool(&mut self, norm: usize) -> Option<(usize, u64)> {
        let ArenaInner {
            tiny_pools,
            small_pools,
            chunks,
        } = self;
        let pool = pool_for(tiny_pools, small_pools, norm);
        let SubpageRef {
            chunk: chunk_id,
            page,
        } = *pool.members.last()?;
        let (handle, now_full) = {
            let subpage = chunks[chunk_id].subpage_mut(page);
            debug_assert_eq!(subpage.elem_size(), norm, "池成员规格必须与池一致");
            let bit = subpage.allocate()?;
            (
                subpage_handle(subpage.mem_map_idx(), bit),
                subpage.num_avail() == 0,
            )
        };
        if now_full {
            // 满员成员恰在栈顶，弹出即可。
            pool.members.pop();
            chunks[chunk_id].subpage_mut(page).set_pool_pos(None);
        }
        Some((chunk_id, handle))
    }

    /// 在指定 Chunk 上分配；Subpage 路径顺带维护池成员关系。
    fn allocate_in_chunk(
        chunks: &mut [PoolChunk],
        tiny_pools: &mut [SubpagePool],
        small_pools: &mut [SubpagePool],
        policy: &SizePolicy,
        chunk_id: usize,
        norm: usize,
    ) -> Option<u64> {
        let chunk = &mut chunks[chunk_id];
        if !policy.is_subpage(norm) {
            return chunk.allocate_run(norm);
        }
        let handle = chunk.allocate_subpage(norm)?;
        let page = chunk.subpage_idx(handle_mem_map_idx(handle));
        let has_room = chunk
            .subpage(page)
            .is_some_and(|subpage| subpage.num_avail() > 0);
        if has_room {
            let pool = pool_for(tiny_pools, small_pools, norm);
            let pos = pool.members.len();
            pool.members.push(SubpageRef {
                chunk: chunk_id,
                page,
            });
            chunk.subpage_mut(page).set_pool_pos(Some(pos));
        }
        Some(handle)
    }

    /// 归还一个池化句柄。
    fn free_pooled(&mut self, chunk_id: usize, handle: u64) {
        let ArenaInner {
            tiny_pools,
            small_pools,
            chunks,
        } = self;
        let mem_map_idx = handle_mem_map_idx(handle);
        let bitmap_part = handle_bitmap_part(handle);
        if bitmap_part != 0 {
            let bit = bitmap_part & BITMAP_IDX_MASK;
            let page = chunks[chunk_id].subpage_idx(mem_map_idx);
            let (elem_size, pool_pos) = {
                let subpage = chunks[chunk_id]
                    .subpage(page)
                    .expect("Subpage 句柄指向的叶子必有 Subpage");
                (subpage.elem_size(), subpage.pool_pos())
            };
            let pool = pool_for(tiny_pools, small_pools, elem_size);
            let last_in_pool = pool_pos.is_some() && pool.members.len() == 1;
            match chunks[chunk_id].subpage_mut(page).free(bit, last_in_pool) {
                SubpageFree::KeepInPool { relink: true } => {
                    debug_assert!(pool_pos.is_none(), "曾满员的 Subpage 不应在池中");
                    let pos = pool.members.len();
                    pool.members.push(SubpageRef {
                        chunk: chunk_id,
                        page,
                    });
                    chunks[chunk_id].subpage_mut(page).set_pool_pos(Some(pos));
                    return;
                }
                SubpageFree::KeepInPool { relink: false } => return,
                SubpageFree::Destroy => {
                    let pos = pool_pos.expect("待销毁的 Subpage 必在池中");
                    pool.members.swap_remove(pos);
                    if pos < pool.members.len() {
                        let moved = pool.members[pos];
                        chunks[moved.chunk]
                            .subpage_mut(moved.page)
                            .set_pool_pos(Some(pos));
                    }
                    chunks[chunk_id].subpage_mut(page).set_pool_pos(None);
                    // 落空的 Subpage 连同叶子一起归还伙伴树。
                }
            }
        }
        chunks[chunk_id].free_run(mem_map_idx);
    }
}

fn pool_for<'a>(
    tiny_pools: &'a mut [SubpagePool],
    small_pools: &'a mut [SubpagePool],
    elem_size: usize,
) -> &'a mut SubpagePool {
    if elem_size < TINY_LIMIT {
        &mut tiny_pools[SizePolicy::tiny_idx(elem_size)]
    } else {
        &mut small_pools[SizePolicy::small_idx(elem_size)]
    }
}

/// 按规格分级的分配/释放计数，锁外宽松原子。
#[derive(Default)]
struct ArenaMetrics {
    alloc_tiny: AtomicU64,
    alloc_small: AtomicU64,
    alloc_normal: AtomicU64,
    alloc_huge: AtomicU64,
    dealloc_tiny: AtomicU64,
    dealloc_small: AtomicU64,
    dealloc_normal: AtomicU64,
    dealloc_huge: AtomicU64,
}

impl ArenaMetrics {
    fn record_alloc(&self, class: SizeClass) {
        self.counter_for(class, true).fetch_add(1, Ordering::Relaxed);
    }

    fn record_dealloc(&self, class: SizeClass) {
        self.counter_for(class, false).fetch_add(1, Ordering::Relaxed);
    }

    fn counter_for(&self, class: SizeClass, alloc: bool) -> &AtomicU64 {
        match (class, alloc) {
            (SizeClass::Tiny, true) => &self.alloc_tiny,
            (SizeClass::Small, true) => &self.alloc_small,
            (SizeClass::Normal, true) => &self.alloc_normal,
            (SizeClass::Huge, true) => &self.alloc_huge,
            (SizeClass::Tiny, false) => &self.dealloc_tiny,
            (SizeClass::Small, false) => &self.dealloc_small,
            (SizeClass::Normal, false) => &self.dealloc_normal,
            (SizeClass::Huge, false) => &self.dealloc_huge,
        }
    }

    fn snapshot(&self, chunk_count: usize, free_bytes: usize) -> ArenaStats {
        ArenaStats {
            alloc_tiny: self.alloc_tiny.load(Ordering::Relaxed),
            alloc_small: self.alloc_small.load(Ordering::Relaxed),
            alloc_normal: self.alloc_normal.load(Ordering::Relaxed),
            alloc_huge: self.alloc_huge.load(Ordering::Relaxed),
            dealloc_tiny: self.dealloc_tiny.load(Ordering::Relaxed),
            dealloc_small: self.dealloc_small.load(Ordering::Relaxed),
            dealloc_normal: self.dealloc_normal.load(Ordering::Relaxed),
            dealloc_huge: self.dealloc_huge.load(Ordering::Relaxed),
            chunk_count,
            free_bytes,
        }
    }
}

/// Arena 观测快照。
///
/// 计数字段单调不减；`chunk_count` / `free_bytes` 在锁内取得，反映快照
/// 时刻池化 Chunk 的持有量与剩余容量。
#[derive(Clone, Copy, Debug, Default)]
pub struct ArenaStats {
    /// Tiny 规格的累计分配次数。
    pub alloc_tiny: u64,
    /// Small 规格的累计分配次数。
    pub alloc_small: u64,
    /// Normal 规格的累计分配次数。
    pub alloc_normal: u64,
    /// Huge 一次性区段的累计分配次数。
    pub alloc_huge: u64,
    /// Tiny 规格的累计释放次数。
    pub dealloc_tiny: u64,
    /// Small 规格的累计释放次数。
    pub dealloc_small: u64,
    /// Normal 规格的累计释放次数。
    pub dealloc_normal: u64,
    /// Huge 一次性区段的累计释放次数。
    pub dealloc_huge: u64,
    /// 当前持有的池化 Chunk 数。
    pub chunk_count: usize,
    /// 池化 Chunk 的剩余可分配字节总和。
    pub free_bytes: usize,
}

impl ArenaStats {
    /// 累计分配总数。
    pub fn total_allocations(&self) -> u64 {
        self.alloc_tiny + self.alloc_small + self.alloc_normal + self.alloc_huge
    }

    /// 累计释放总数。
    pub fn total_deallocations(&self) -> u64 {
        self.dealloc_tiny + self.dealloc_small + self.dealloc_normal + self.dealloc_huge
    }

    /// 当前存活的分配数（分配减释放）。
    pub fn active_allocations(&self) -> u64 {
        self.total_allocations() - self.total_deallocations()
    }

    /// 把另一个快照累加进来，供工厂聚合多个 Arena。
    pub fn merge(&mut self, other: &ArenaStats) {
        self.alloc_tiny += other.alloc_tiny;
        self.alloc_small += other.alloc_small;
        self.alloc_normal += other.alloc_normal;
        self.alloc_huge += other.alloc_huge;
        self.dealloc_tiny += other.dealloc_tiny;
        self.dealloc_small += other.dealloc_small;
        self.dealloc_normal += other.dealloc_normal;
        self.dealloc_huge += other.dealloc_huge;
        self.chunk_count += other.chunk_count;
        self.free_bytes += other.free_bytes;
    }
}
