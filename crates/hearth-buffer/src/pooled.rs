//! 池化缓冲视图：把 Arena 席位包装成 `ByteBuf`。
//!
//! # 角色定位（Why）
//! - 席位只是 `(区段, 偏移, 物理上限)` 的几何描述；本类型在其上叠加
//!   读写指针、逻辑容量与引用计数，构成调用方可见的缓冲对象；
//! - `max_length`（席位物理上限）≥ `capacity`（逻辑容量）的预留设计让
//!   常见的小步扩容无需搬迁：容量在物理上限内只改一个字段。
//!
//! # 容量策略（How）
//! - 扩容：目标不超过 `max_length` 时原地放大；否则经 Arena 迁移到新席位
//!   并整块复制有效内容；
//! - 缩容：目标仍占物理上限的多数（大于一半，且对小席位而言没有跨出一个
//!   规格档位）时原地收缩并钳制读写指针；否则迁移到更小的席位，把碎片
//!   还给池。
//!
//! # 生命周期（What）
//! - 最后一次 `release` 把席位交还 Arena 并进入“已释放”状态，此后除
//!   `ref_count` 外的操作一律拒绝；
//! - 即使调用方遗漏 `release` 直接丢弃对象，`Drop` 也会把仍存活的席位归还
//!   池，保证 Chunk 容量不被泄漏的缓冲蚕食。

use alloc::sync::Arc;

use hearth_core::{ByteBuf, PoolError, RefCount, Result};

use crate::arena::{PoolArena, Seat};
use crate::region::RawRegion;

/// 由 [`crate::PooledByteBufAllocator`] 产出的池化缓冲。
pub struct PooledByteBuf {
    arena: Arc<PoolArena>,
    seat: Option<Seat>,
    capacity: usize,
    reader: usize,
    writer: usize,
    max_capacity: usize,
    refs: RefCount,
}

impl PooledByteBuf {
    pub(crate) fn new(
        arena: Arc<PoolArena>,
        seat: Seat,
        capacity: usize,
        max_capacity: usize,
    ) -> Self {
        debug_assert!(capacity <= seat.max_length);
        Self {
            arena,
            seat: Some(seat),
            capacity,
            reader: 0,
            writer: 0,
            max_capacity,
            refs: RefCount::new(),
        }
    }

    /// 席位物理上限；逻辑容量可以在其内原地增长。
    pub fn max_length(&self) -> usize {
        self.seat.as_ref().map_or(0, |seat| seat.max_length)
    }

    fn live_seat(&self, op: &'static str) -> Result<&Seat> {
        if self.refs.count() == 0 {
            return Err(PoolError::released(op));
        }
        self.seat.as_ref().ok_or_else(|| PoolError::released(op))
    }

    /// 迁移到容量为 `new_capacity` 的新席位并复制有效内容。
    fn reallocate(&mut self, new_capacity: usize, free_old: bool) -> Result<()> {
        let old_capacity = self.capacity;
        if new_capacity == old_capacity {
            return Ok(());
        }
        let new_seat = self.arena.allocate(new_capacity);
        let old_seat = self
            .seat
            .take()
            .ok_or_else(|| PoolError::released("reallocate"))?;

        let copy_len = old_capacity.min(new_capacity);
        if copy_len > 0 {
            // SAFETY: 新旧席位此刻同时存活，分配器保证两者区间不相交；
            // 双方区间均在各自区段界内。
            unsafe {
                RawRegion::copy_between(
                    &old_seat.region,
                    old_seat.offset,
                    &new_seat.region,
                    new_seat.offset,
                    copy_len,
                );
            }
        }
        self.seat = Some(new_seat);
        self.capacity = new_capacity;
        self.reader = self.reader.min(new_capacity);
        self.writer = self.writer.min(new_capacity);
        if free_old {
            self.arena.free(old_seat);
        }
        Ok(())
    }
}

impl ByteBuf for PooledByteBuf {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    fn reader_index(&self) -> usize {
        self.reader
    }

    fn writer_index(&self) -> usize {
        self.writer
    }

    fn set_index(&mut self, reader: usize, writer: usize) -> Result<()> {
        self.live_seat("set_index")?;
        if reader > writer || writer > self.capacity {
            return Err(PoolError::invalid_argument(
                "set_index 要求 reader ≤ writer ≤ capacity",
            ));
        }
        self.reader = reader;
        self.writer = writer;
        Ok(())
    }

    fn set_capacity(&mut self, new_capacity: usize) -> Result<()> {
        let max_length = self.live_seat("set_capacity")?.max_length;
        if new_capacity > self.max_capacity {
            return Err(PoolError::invalid_argument(
                "set_capacity 超过 max_capacity",
            ));
        }
        let old_capacity = self.capacity;
        if new_capacity == old_capacity {
            return Ok(());
        }
        if new_capacity > old_capacity {
            if new_capacity <= max_length {
                // 物理席位足够：原地放大。
                self.capacity = new_capacity;
                return Ok(());
            }
        } else if new_capacity > max_length / 2
            && (max_length > 512 || new_capacity > max_length - 16)
        {
            // 仍占物理上限多数：原地收缩，指针钳回新容量。
            self.capacity = new_capacity;
            self.reader = self.reader.min(new_capacity);
            self.writer = self.writer.min(new_capacity);
            return Ok(());
        }
        self.reallocate(new_capacity, true)
    }

    fn base_offset(&self) -> usize {
        self.seat.as_ref().map_or(0, |seat| seat.offset)
    }

    fn base_len(&self) -> usize {
        self.seat.as_ref().map_or(0, |seat| seat.region.len())
    }

    fn readable_slice(&self) -> &[u8] {
        match self.live_seat("readable_slice") {
            // SAFETY: 区间 [reader, writer) ⊆ [0, capacity) ⊆ 席位区间，
            // 席位区间与其它缓冲不相交；写访问要求 `&mut self`，与本次
            // 共享借用互斥。
            Ok(seat) => unsafe {
                seat.region
                    .slice(seat.offset + self.reader, self.writer - self.reader)
            },
            Err(_) => &[],
        }
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()> {
        let seat = self.live_seat("get_bytes")?;
        let end = index
            .checked_add(dst.len())
            .filter(|end| *end <= self.capacity)
            .ok_or_else(|| PoolError::invalid_argument("get_bytes 越过 capacity"))?;
        debug_assert!(end <= seat.max_length);
        // SAFETY: 同 readable_slice 的席位不相交论证。
        let src = unsafe { seat.region.slice(seat.offset + index, dst.len()) };
        dst.copy_from_slice(src);
        Ok(())
    }

    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()> {
        let seat = self.live_seat("set_bytes")?;
        index
            .checked_add(src.len())
            .filter(|end| *end <= self.capacity)
            .ok_or_else(|| PoolError::invalid_argument("set_bytes 越过 capacity"))?;
        // SAFETY: `&mut self` 排除了本缓冲上的并发访问；席位区间与其它
        // 缓冲不相交。
        let dst = unsafe { seat.region.slice_mut(seat.offset + index, src.len()) };
        dst.copy_from_slice(src);
        Ok(())
    }

    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        self.live_seat("read_bytes")?;
        if dst.len() > self.readable_bytes() {
            return Err(PoolError::invalid_argument("read_bytes 可读字节不足"));
        }
        let reader = self.reader;
        self.get_bytes(reader, dst)?;
        self.reader += dst.len();
        Ok(())
    }

    fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.live_seat("write_bytes")?;
        if src.is_empty() {
            return Ok(());
        }
        self.ensure_writable(src.len())?;
        let writer = self.writer;
        self.set_bytes(writer, src)?;
        self.writer += src.len();
        Ok(())
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        self.live_seat("skip")?;
        if len > self.readable_bytes() {
            return Err(PoolError::invalid_argument("skip 越过写指针"));
        }
        self.reader += len;
        Ok(())
    }

    fn ensure_writable(&mut self, len: usize) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        self.live_seat("ensure_writable")?;
        let target = self
            .writer
            .checked_add(len)
            .ok_or_else(|| PoolError::invalid_argument("目标容量溢出"))?;
        if target <= self.capacity {
            return Ok(());
        }
        if target > self.max_capacity {
            return Err(PoolError::invalid_argument(
                "写入需求超过 max_capacity",
            ));
        }
        self.set_capacity(target)
    }

    fn ref_count(&self) -> u32 {
        self.refs.count()
    }

    fn retain_by(&self, n: u32) -> Result<()> {
        self.refs.retain_by(n)
    }

    fn release_by(&mut self, n: u32) -> Result<bool> {
        if !self.refs.release_by(n)? {
            return Ok(false);
        }
        // 归零：一次性地把席位交还 Arena。
        if let Some(seat) = self.seat.take() {
            self.arena.free(seat);
        }
        Ok(true)
    }
}

impl Drop for PooledByteBuf {
    fn drop(&mut self) {
        // 调用方遗漏 release 的兜底：仍存活的席位在对象销毁时归还池，
        // 避免 Chunk 容量随泄漏的缓冲一起消失。
        if let Some(seat) = self.seat.take() {
            self.arena.free(seat);
        }
    }
}

impl PartialEq for PooledByteBuf {
    fn eq(&self, other: &Self) -> bool {
        self.content_equals(other)
    }
}

impl core::fmt::Debug for PooledByteBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PooledByteBuf")
            .field("capacity", &self.capacity)
            .field("max_capacity", &self.max_capacity)
            .field("reader_index", &self.reader)
            .field("writer_index", &self.writer)
            .field("max_length", &self.max_length())
            .field("ref_count", &self.refs.count())
            .finish()
    }
}
