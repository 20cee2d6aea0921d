#![cfg_attr(not(feature = "std"), no_std)]
#![doc = "hearth-buffer: 面向 `ByteBuf` 契约的池化分配器实现。"]
#![doc = ""]
#![doc = "== 模块定位（Why） =="]
#![doc = "高并发 IO 应用的瓶颈之一是“每次请求都向全局分配器索要临时字节数组”"]
#![doc = "带来的分配压力与碎片化。本 crate 预先分配大块 Chunk，用伙伴树切分出"]
#![doc = "页级区段、用位图 Subpage 切分页内等长元素，释放时原路归还并复用。"]
#![doc = ""]
#![doc = "== 架构速览（How） =="]
#![doc = "`PooledByteBufAllocator`（工厂，轮转选取 Arena）→ `PoolArena`（规格化请求，"]
#![doc = "路由到 Subpage 池 / Chunk 列表 / 一次性大块）→ `PoolChunk`（伙伴树）→"]
#![doc = "`PoolSubpage`（页内位图）。产出的 `PooledByteBuf` 持有 `(Chunk 槽位, 句柄,"]
#![doc = "偏移, 物理上限)` 四元组席位，读写直达背衬数组，不经过 Arena 锁。"]
#![doc = ""]
#![doc = "== 并发模型 =="]
#![doc = "每个 Arena 一把自旋互斥锁，保护池头、Chunk 列表与树状态；缓冲的字节读写"]
#![doc = "由席位的互斥区段保证与其它缓冲不相交，因而无需加锁。单个缓冲上的并发"]
#![doc = "访问由调用方（以及 `&mut self` 借用规则）串行化。"]

extern crate alloc;

mod allocator;
mod arena;
mod chunk;
mod pooled;
mod region;
mod size_class;
mod stream;
mod subpage;
mod unpooled;

pub use allocator::{PooledAllocatorConfig, PooledByteBufAllocator};
pub use arena::ArenaStats;
pub use pooled::PooledByteBuf;
pub use size_class::SizeClass;
pub use stream::ByteBufStream;
pub use unpooled::{HeapByteBuf, UnpooledByteBufAllocator};

pub use hearth_core::{ByteBuf, PoolError, RefCount, Result};
