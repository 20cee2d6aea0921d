//! 非池化堆缓冲：同一 `ByteBuf` 契约的直通实现。
//!
//! # 角色定位（Why）
//! - 低频、长寿命或容量不可预估的缓冲不值得占用池容量；本模块提供与池化
//!   缓冲完全同契约的 `Vec` 背衬实现，调用方可以逐对象选择来源；
//! - 也作为基准参照：契约测试在两种实现上各跑一遍，互为对照。
//!
//! # 容量模型（How）
//! - `capacity == 背衬数组长度`，没有“物理上限预留”一说：扩容按目标值
//!   倍增（封顶 `max_capacity`）后整体搬迁，缩容从不发生；
//! - 释放即丢弃背衬数组，交还全局分配器。

use alloc::vec;
use alloc::vec::Vec;

use hearth_core::{ByteBuf, PoolError, RefCount, Result};

/// 由 [`UnpooledByteBufAllocator`] 产出的堆缓冲。
pub struct HeapByteBuf {
    data: Vec<u8>,
    reader: usize,
    writer: usize,
    max_capacity: usize,
    refs: RefCount,
}

impl HeapByteBuf {
    fn new(length: usize, max_capacity: usize) -> Self {
        Self {
            data: vec![0; length],
            reader: 0,
            writer: 0,
            max_capacity,
            refs: RefCount::new(),
        }
    }

    fn ensure_live(&self, op: &'static str) -> Result<()> {
        if self.refs.count() == 0 {
            Err(PoolError::released(op))
        } else {
            Ok(())
        }
    }
}

impl ByteBuf for HeapByteBuf {
    fn capacity(&self) -> usize {
        self.data.len()
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
        self.ensure_live("set_index")?;
        if reader > writer || writer > self.capacity() {
            return Err(PoolError::invalid_argument(
                "set_index 要求 reader ≤ writer ≤ capacity",
            ));
        }
        self.reader = reader;
        self.writer = writer;
        Ok(())
    }

    /// 只增不减：目标不超过现有容量时原样返回；扩容按目标值倍增以摊平
    /// 连续小步增长的搬迁成本，封顶 `max_capacity`。
    fn set_capacity(&mut self, new_capacity: usize) -> Result<()> {
        self.ensure_live("set_capacity")?;
        if new_capacity > self.max_capacity {
            return Err(PoolError::invalid_argument(
                "set_capacity 超过 max_capacity",
            ));
        }
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        let grown = new_capacity
            .saturating_mul(2)
            .min(self.max_capacity)
            .max(new_capacity);
        self.data.resize(grown, 0);
        Ok(())
    }

    fn base_offset(&self) -> usize {
        0
    }

    fn base_len(&self) -> usize {
        self.data.len()
    }

    fn readable_slice(&self) -> &[u8] {
        if self.refs.count() == 0 {
            &[]
        } else {
            &self.data[self.reader..self.writer]
        }
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()> {
        self.ensure_live("get_bytes")?;
        let end = index
            .checked_add(dst.len())
            .filter(|end| *end <= self.capacity())
            .ok_or_else(|| PoolError::invalid_argument("get_bytes 越过 capacity"))?;
        dst.copy_from_slice(&self.data[index..end]);
        Ok(())
    }

    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()> {
        self.ensure_live("set_bytes")?;
        let end = index
            .checked_add(src.len())
            .filter(|end| *end <= self.capacity())
            .ok_or_else(|| PoolError::invalid_argument("set_bytes 越过 capacity"))?;
        self.data[index..end].copy_from_slice(src);
        Ok(())
    }

    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        self.ensure_live("read_bytes")?;
        if dst.len() > self.readable_bytes() {
            return Err(PoolError::invalid_argument("read_bytes 可读字节不足"));
        }
        let reader = self.reader;
        self.get_bytes(reader, dst)?;
        self.reader += dst.len();
        Ok(())
    }

    fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.ensure_live("write_bytes")?;
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
        self.ensure_live("skip")?;
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
        self.ensure_live("ensure_writable")?;
        let target = self
            .writer
            .checked_add(len)
            .ok_or_else(|| PoolError::invalid_argument("目标容量溢出"))?;
        if target <= self.capacity() {
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
        // 归零：背衬数组交还全局分配器。
        self.data = Vec::new();
        self.reader = 0;
        self.writer = 0;
        Ok(true)
    }
}

impl PartialEq for HeapByteBuf {
    fn eq(&self, other: &Self) -> bool {
        self.content_equals(other)
    }
}

impl core::fmt::Debug for HeapByteBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HeapByteBuf")
            .field("capacity", &self.capacity())
            .field("max_capacity", &self.max_capacity)
            .field("reader_index", &self.reader)
            .field("writer_index", &self.writer)
            .field("ref_count", &self.refs.count())
            .finish()
    }
}

/// 非池化工厂：每次请求都向全局分配器索要新的背衬数组。
///
/// 与池化工厂共享同一套参数校验与缓冲契约，便于在部署早期先以直通模式
/// 运行、再无缝切换到池化。
#[derive(Clone, Copy, Debug, Default)]
pub struct UnpooledByteBufAllocator;

impl UnpooledByteBufAllocator {
    /// 创建工厂实例；无任何共享状态。
    pub fn new() -> Self {
        Self
    }

    /// 分配 `length` 字节、容量上限取 `usize::MAX` 的缓冲。
    pub fn new_buffer(&self, length: usize) -> Result<HeapByteBuf> {
        self.new_buffer_with_max(length, usize::MAX)
    }

    /// 分配 `length` 字节、容量上限为 `max_capacity` 的缓冲。
    pub fn new_buffer_with_max(&self, length: usize, max_capacity: usize) -> Result<HeapByteBuf> {
        if max_capacity < length {
            return Err(PoolError::invalid_argument(
                "max_capacity 不得小于初始长度",
            ));
        }
        Ok(HeapByteBuf::new(length, max_capacity))
    }
}
