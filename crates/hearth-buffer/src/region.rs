//! 共享可变字节区段：Chunk 背衬数组与一次性大块的统一载体。
//!
//! # 设计初衷（Why）
//! - 缓冲的字节读写必须绕开 Arena 锁（热路径只做 memcpy），但同一个 Chunk 的
//!   背衬数组被多个缓冲席位共享，`&mut` 独占借用无法表达“按区段互斥”；
//! - 因此以 `UnsafeCell` 承载背衬数组，把互斥责任上移到分配器：伙伴树与
//!   Subpage 位图保证任意两个存活席位的 `[offset, offset + max_length)`
//!   区间互不相交。
//!
//! # 契约说明（What）
//! - 所有 `unsafe` 访问器的调用方必须保证：区间落在 `[0, len)` 内，且在借用
//!   存续期间没有其它执行流访问与之重叠的区间；
//! - 单个缓冲内部的并发由 `ByteBuf` 写方法的 `&mut self` 借用规则串行化，
//!   跨缓冲的不相交由分配器不变量保证——两者合起来即满足上述前置条件。
//!
//! # 风险提示（Trade-offs）
//! - 这是本 crate 唯一的 `unsafe` 边界；任何改动分配器几何（`run_offset`、
//!   `max_length` 计算）的提交都必须同步重审这里的前置条件。

use alloc::boxed::Box;
use alloc::vec;
use core::cell::UnsafeCell;

/// 固定长度的共享字节区段。创建后长度不变；内容零初始化。
pub(crate) struct RawRegion {
    cell: UnsafeCell<Box<[u8]>>,
    len: usize,
}

// SAFETY: 区段本身不做任何别名控制，线程安全性由上述“席位区间互不相交 +
// 单席位访问串行化”的外部不变量提供；在该前提下跨线程共享引用是安全的。
unsafe impl Send for RawRegion {}
unsafe impl Sync for RawRegion {}

impl RawRegion {
    /// 分配 `len` 字节的零初始化区段。
    pub(crate) fn zeroed(len: usize) -> Self {
        Self {
            cell: UnsafeCell::new(vec![0u8; len].into_boxed_slice()),
            len,
        }
    }

    /// 区段总长度。
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// 借用 `[offset, offset + len)` 的只读视图。
    ///
    /// # Safety
    /// 区间必须在界内，且借用存续期间无任何执行流写入与之重叠的区间。
    pub(crate) unsafe fn slice(&self, offset: usize, len: usize) -> &[u8] {
        debug_assert!(offset.checked_add(len).is_some_and(|end| end <= self.len));
        unsafe {
            let base = (*self.cell.get()).as_ptr();
            core::slice::from_raw_parts(base.add(offset), len)
        }
    }

    /// 借用 `[offset, offset + len)` 的可写视图。
    ///
    /// # Safety
    /// 区间必须在界内，且借用存续期间无任何执行流读写与之重叠的区间。
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn slice_mut(&self, offset: usize, len: usize) -> &mut [u8] {
        debug_assert!(offset.checked_add(len).is_some_and(|end| end <= self.len));
        unsafe {
            let base = (*self.cell.get()).as_mut_ptr();
            core::slice::from_raw_parts_mut(base.add(offset), len)
        }
    }

    /// 跨区段（或同区段不同区间）批量复制 `len` 字节。
    ///
    /// # Safety
    /// 两个区间均须在各自界内；当 `src` 与 `dst` 为同一区段时，区间不得重叠
    /// （分配器在迁移席位时先分配新席位再释放旧席位，天然满足）。
    pub(crate) unsafe fn copy_between(
        src: &RawRegion,
        src_offset: usize,
        dst: &RawRegion,
        dst_offset: usize,
        len: usize,
    ) {
        debug_assert!(src_offset.checked_add(len).is_some_and(|end| end <= src.len));
        debug_assert!(dst_offset.checked_add(len).is_some_and(|end| end <= dst.len));
        unsafe {
            let from = (*src.cell.get()).as_ptr().add(src_offset);
            let to = (*dst.cell.get()).as_mut_ptr().add(dst_offset);
            core::ptr::copy_nonoverlapping(from, to, len);
        }
    }
}
