//! 伙伴树 Chunk：在一块连续区段上管理 `2^max_order` 个页。
//!
//! # 设计初衷（Why）
//! - 页级及以上的分配需要既能合并又能二分的空闲管理；伙伴算法以完全二叉树
//!   表达“区段 → 左右半区”的递归切分，分配与释放都只触碰一条根到叶的
//!   路径，复杂度 O(max_order)；
//! - 树以两个扁平数组编码（下标 1 为根，`i` 的子节点为 `2i`、`2i+1`），
//!   避免指针结构的缓存开销。
//!
//! # 数据结构（How）
//! - `depth_map[i]`：节点 `i` 的固定深度（根为 0）；
//! - `memory_map[i]`：以 `i` 为根的子树还能满足的最浅分配深度。初始等于
//!   `depth_map[i]`；节点整体被占用后置为 `unusable = max_order + 1`；
//!   内部节点维护 `min(左, 右)`；
//! - `subpages[page]`：每个叶子至多一个 [`PoolSubpage`]，叶子树下标与
//!   `subpages` 下标以 `id ^ 2^max_order` 互换；
//! - 不变量：树在静止时对所有内部节点满足
//!   `memory_map[i] == min(memory_map[2i], memory_map[2i+1])`，且
//!   `depth_map[i] ≤ memory_map[i] ≤ unusable`。
//!
//! # 句柄编码（What）
//! - 区段句柄：低 32 位为树下标，高 32 位为 0；
//! - Subpage 句柄：`(1 << 62) | (bitmap_idx << 32) | 树下标`，高半部低 30 位
//!   才是真实位下标；
//! - 分配失败（树无法容纳）返回 `None`——这是常态值而非错误，Arena 据此
//!   创建新 Chunk。

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::region::RawRegion;
use crate::size_class::{SizePolicy, log2};
use crate::subpage::PoolSubpage;

/// Subpage 句柄的标记位。
pub(crate) const SUBPAGE_HANDLE_FLAG: u64 = 1 << 62;

/// 句柄高半部中位下标的有效掩码（低 30 位）。
pub(crate) const BITMAP_IDX_MASK: u32 = 0x3FFF_FFFF;

/// 组装区段句柄。
pub(crate) fn run_handle(mem_map_idx: u32) -> u64 {
    u64::from(mem_map_idx)
}

/// 组装 Subpage 句柄。
pub(crate) fn subpage_handle(mem_map_idx: u32, bitmap_idx: u32) -> u64 {
    SUBPAGE_HANDLE_FLAG | (u64::from(bitmap_idx) << 32) | u64::from(mem_map_idx)
}

/// 句柄的树下标部分。
pub(crate) fn handle_mem_map_idx(handle: u64) -> u32 {
    handle as u32
}

/// 句柄的高半部（含标记位）；非 0 表示 Subpage 句柄。
pub(crate) fn handle_bitmap_part(handle: u64) -> u32 {
    (handle >> 32) as u32
}

/// 一块池化（或一次性）的伙伴树区段。
pub(crate) struct PoolChunk {
    region: Arc<RawRegion>,
    memory_map: Box<[u8]>,
    depth_map: Box<[u8]>,
    subpages: Box<[Option<PoolSubpage>]>,
    policy: SizePolicy,
    log2_chunk_size: u32,
    unusable: u8,
    free_bytes: usize,
}

impl PoolChunk {
    /// 创建一个满容量的池化 Chunk；背衬区段零初始化。
    pub(crate) fn new(policy: SizePolicy) -> Self {
        let max_order = policy.max_order();
        let node_count = 2usize << max_order;
        let mut depth_map = Vec::with_capacity(node_count);
        depth_map.push(0u8); // 下标 0 不使用
        for id in 1..node_count {
            depth_map.push(log2(id) as u8);
        }
        let memory_map = depth_map.clone().into_boxed_slice();
        let leaf_count = 1usize << max_order;
        let mut subpages = Vec::with_capacity(leaf_count);
        subpages.resize_with(leaf_count, || None);

        Self {
            region: Arc::new(RawRegion::zeroed(policy.chunk_size())),
            memory_map,
            depth_map: depth_map.into_boxed_slice(),
            subpages: subpages.into_boxed_slice(),
            policy,
            log2_chunk_size: log2(policy.chunk_size()),
            unusable: (max_order + 1) as u8,
            free_bytes: policy.chunk_size(),
        }
    }

    pub(crate) fn region(&self) -> &Arc<RawRegion> {
        &self.region
    }

    pub(crate) fn free_bytes(&self) -> usize {
        self.free_bytes
    }

    /// 分配一个 Normal 规格的区段。
    pub(crate) fn allocate_run(&mut self, norm: usize) -> Option<u64> {
        let depth = self.policy.run_depth(norm);
        let id = self.allocate_node(depth)?;
        self.free_bytes -= self.run_length(id);
        Some(run_handle(id))
    }

    /// 在一个新叶子上创建（或复用）Subpage 并分配首个元素。
    ///
    /// 返回句柄；调用方（Arena）负责把仍有空位的 Subpage 挂入规格池。
    pub(crate) fn allocate_subpage(&mut self, elem_size: usize) -> Option<u64> {
        let id = self.allocate_node(self.policy.max_order())?;
        self.free_bytes -= self.policy.page_size();

        let page = self.subpage_idx(id);
        let page_size = self.policy.page_size();
        match &mut self.subpages[page] {
            Some(existing) => existing.init(elem_size),
            slot => *slot = Some(PoolSubpage::new(id, page_size, elem_size)),
        }
        let bitmap_idx = self
            .subpage_mut(page)
            .allocate()
            .expect("刚初始化的 Subpage 必有空位");
        Some(subpage_handle(id, bitmap_idx))
    }

    /// 释放一个区段句柄对应的伙伴节点（Subpage 句柄的叶子释放也走这里）。
    pub(crate) fn free_run(&mut self, mem_map_idx: u32) {
        self.free_bytes += self.run_length(mem_map_idx);
        self.memory_map[mem_map_idx as usize] = self.depth_map[mem_map_idx as usize];
        self.update_parents_free(mem_map_idx);
    }

    /// 深度优先下降，在深度 `d` 摘取一个空闲节点；树无法容纳返回 `None`。
    fn allocate_node(&mut self, d: u32) -> Option<u32> {
        if u32::from(self.memory_map[1]) > d {
            return None;
        }
        let mut id: u32 = 1;
        // 继续下降的两种情形：当前节点还没到深度 d，或者它的 memory_map 值
        // 小于 d（说明空闲容量在更深处）。优先走左子，左子满足不了换兄弟。
        while u32::from(self.memory_map[id as usize]) < d || id < (1 << d) {
            id <<= 1;
            if u32::from(self.memory_map[id as usize]) > d {
                id ^= 1;
            }
        }
        debug_assert_eq!(u32::from(self.memory_map[id as usize]), d);
        debug_assert_eq!(u32::from(self.depth_map[id as usize]), d);
        self.memory_map[id as usize] = self.unusable;
        self.update_parents_alloc(id);
        Some(id)
    }

    /// 分配后向上维护 `min(左, 右)`。
    fn update_parents_alloc(&mut self, mut id: u32) {
        while id > 1 {
            let parent = id >> 1;
            let merged = self.memory_map[id as usize].min(self.memory_map[(id ^ 1) as usize]);
            self.memory_map[parent as usize] = merged;
            id = parent;
        }
    }

    /// 释放后向上合并：两个伙伴都回到原始深度时父节点重新整块可用。
    fn update_parents_free(&mut self, mut id: u32) {
        let mut log_child = self.depth_map[id as usize];
        while id > 1 {
            let parent = id >> 1;
            let val1 = self.memory_map[id as usize];
            let val2 = self.memory_map[(id ^ 1) as usize];
            if val1 == log_child && val2 == log_child {
                self.memory_map[parent as usize] = log_child - 1;
            } else {
                self.memory_map[parent as usize] = val1.min(val2);
            }
            log_child -= 1;
            id = parent;
        }
    }

    /// 节点 `id` 管辖的字节数。
    pub(crate) fn run_length(&self, id: u32) -> usize {
        1 << (self.log2_chunk_size - u32::from(self.depth_map[id as usize]))
    }

    /// 节点 `id` 管辖区间在区段内的起始偏移。
    pub(crate) fn run_offset(&self, id: u32) -> usize {
        let shift = id ^ (1 << u32::from(self.depth_map[id as usize]));
        shift as usize * self.run_length(id)
    }

    /// 叶子树下标与 `subpages` 数组下标互换。
    pub(crate) fn subpage_idx(&self, id: u32) -> usize {
        (id ^ (1u32 << self.policy.max_order())) as usize
    }

    pub(crate) fn subpage(&self, page: usize) -> Option<&PoolSubpage> {
        self.subpages[page].as_ref()
    }

    pub(crate) fn subpage_mut(&mut self, page: usize) -> &mut PoolSubpage {
        self.subpages[page]
            .as_mut()
            .expect("句柄指向的叶子必有 Subpage")
    }

    /// 把句柄解析为席位几何：`(偏移, 物理上限)`。
    pub(crate) fn resolve(&self, handle: u64) -> (usize, usize) {
        let id = handle_mem_map_idx(handle);
        let bitmap_part = handle_bitmap_part(handle);
        if bitmap_part == 0 {
            (self.run_offset(id), self.run_length(id))
        } else {
            let bitmap_idx = (bitmap_part & BITMAP_IDX_MASK) as usize;
            let subpage = self.subpages[self.subpage_idx(id)]
                .as_ref()
                .expect("Subpage 句柄指向的叶子必有 Subpage");
            let elem_size = subpage.elem_size();
            (self.run_offset(id) + bitmap_idx * elem_size, elem_size)
        }
    }

    #[cfg(test)]
    pub(crate) fn memory_map_value(&self, id: u32) -> u8 {
        self.memory_map[id as usize]
    }

    #[cfg(test)]
    pub(crate) fn assert_tree_invariants(&self) {
        let max_order = self.policy.max_order();
        for id in 1..(1usize << max_order) {
            let node = self.memory_map[id];
            let left = self.memory_map[2 * id];
            let right = self.memory_map[2 * id + 1];
            assert!(node >= self.depth_map[id], "memory_map 不得低于固有深度");
            assert!(node <= self.unusable);
            if node != self.unusable {
                assert_eq!(node, left.min(right), "内部节点必须等于子节点最小值");
            }
        }
    }
}
