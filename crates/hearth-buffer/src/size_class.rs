//! 请求规格化与尺寸分级。
//!
//! # 模块定位（Why）
//! - 池化复用依赖“把任意请求长度折叠到有限个规格”：规格越少，空闲席位的
//!   命中率越高；规格粒度越细，内部碎片越小。本模块固化这组折衷；
//! - 分级结果同时决定分配路径：Tiny/Small 走页内 Subpage 池，Normal 走伙伴
//!   树区段，Huge 绕过池直接申请一次性区段。
//!
//! # 分级定义（What）
//! - **Tiny**：规格化后 `< 512`，对齐到 16 的倍数，共 32 个规格；
//! - **Small**：`512 ≤ n < page_size`，规格化为 2 的幂，共 `page_shifts - 9` 个规格；
//! - **Normal**：`page_size ≤ n ≤ chunk_size`，规格化为 2 的幂；
//! - **Huge**：`n > chunk_size`，长度原样保留，不进池。

/// Tiny 规格上限（不含）。
pub(crate) const TINY_LIMIT: usize = 512;

/// Tiny 规格个数：`512 / 16`。
pub(crate) const TINY_CLASS_COUNT: usize = 32;

/// 页大小下限；同时是配置校验的硬约束。
pub(crate) const MIN_PAGE_SIZE: usize = 4096;

/// Chunk 大小上限（1 GiB）。
pub(crate) const MAX_CHUNK_SIZE: usize = 1 << 30;

/// Subpage 元素的最小规格；零长度请求也会被提升到该规格。
pub(crate) const MIN_ELEM_SIZE: usize = 16;

/// 请求长度所属的尺寸分级。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeClass {
    /// 规格化后小于 512 字节，由页内 Subpage 池服务。
    Tiny,
    /// 不小于 512 且小于一页，由页内 Subpage 池服务。
    Small,
    /// 一页到整个 Chunk 之间，由伙伴树区段服务。
    Normal,
    /// 超过 Chunk 大小，由一次性区段服务，不进池。
    Huge,
}

/// 尺寸策略：一组分配器实例内全局一致的几何参数。
///
/// # 契约说明（What）
/// - 构造前置条件（由 [`crate::PooledAllocatorConfig::validate`] 保证）：
///   `page_size` 为 2 的幂且 `≥ 4096`，`page_size << max_order ≤ 1 GiB`；
/// - 所有方法对满足前置条件的输入是全函数，不产生错误。
#[derive(Clone, Copy, Debug)]
pub(crate) struct SizePolicy {
    page_size: usize,
    page_shifts: u32,
    max_order: u32,
    chunk_size: usize,
}

impl SizePolicy {
    /// 由已校验的配置参数构造。
    pub(crate) fn new(page_size: usize, max_order: u32) -> Self {
        debug_assert!(page_size.is_power_of_two() && page_size >= MIN_PAGE_SIZE);
        debug_assert!(page_size << max_order <= MAX_CHUNK_SIZE);
        Self {
            page_size,
            page_shifts: log2(page_size),
            max_order,
            chunk_size: page_size << max_order,
        }
    }

    pub(crate) fn page_size(&self) -> usize {
        self.page_size
    }

    pub(crate) fn max_order(&self) -> u32 {
        self.max_order
    }

    pub(crate) fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Small 规格个数：`page_shifts - 9`。
    pub(crate) fn small_class_count(&self) -> usize {
        (self.page_shifts - 9) as usize
    }

    /// 把请求长度折叠到所属规格。
    ///
    /// # 逻辑解析（How）
    /// - Huge（`req ≥ chunk_size`）原样保留——该路径不进池，规格化只会放大
    ///   一次性分配的浪费；
    /// - Tiny 对齐到 16 的倍数并抬升到下限 16（零长度请求同样占用一个最小
    ///   元素，否则 Subpage 无法表示它的席位）；
    /// - 其余取下一个 2 的幂。`req < chunk_size ≤ 2^30` 保证
    ///   `next_power_of_two` 不会溢出。
    pub(crate) fn normalize(&self, req: usize) -> usize {
        if req >= self.chunk_size {
            return req;
        }
        if req >= TINY_LIMIT {
            return req.next_power_of_two();
        }
        ((req + 15) & !15).max(MIN_ELEM_SIZE)
    }

    /// 判定规格化长度的分级。
    pub(crate) fn classify(&self, norm: usize) -> SizeClass {
        if norm > self.chunk_size {
            SizeClass::Huge
        } else if norm >= self.page_size {
            SizeClass::Normal
        } else if norm >= TINY_LIMIT {
            SizeClass::Small
        } else {
            SizeClass::Tiny
        }
    }

    /// 规格是否由页内 Subpage 服务（即小于一页）。
    pub(crate) fn is_subpage(&self, norm: usize) -> bool {
        norm & !(self.page_size - 1) == 0
    }

    /// Tiny 池下标：`norm / 16`。
    pub(crate) fn tiny_idx(norm: usize) -> usize {
        norm >> 4
    }

    /// Small 池下标：512 → 0，1024 → 1，以 2 的幂逐级递增。
    pub(crate) fn small_idx(norm: usize) -> usize {
        let mut idx = 0;
        let mut size = norm >> 10;
        while size != 0 {
            size >>= 1;
            idx += 1;
        }
        idx
    }

    /// Normal 规格对应的伙伴树深度：规格越大，深度越浅。
    pub(crate) fn run_depth(&self, norm: usize) -> u32 {
        self.max_order - (log2(norm) - self.page_shifts)
    }
}

/// 2 的幂的以 2 为底对数（向下取整）。
pub(crate) fn log2(value: usize) -> u32 {
    debug_assert!(value > 0);
    usize::BITS - 1 - value.leading_zeros()
}
