//! 页内位图分配器：把一个叶子页切分为等长元素。
//!
//! # 设计初衷（Why）
//! - 小于一页的请求若直接占用伙伴树叶子，内部碎片最高可达 `page_size - 16`；
//!   Subpage 把叶子页按元素规格均分，以 `page_size / elem_size` 位的位图管理
//!   占用，使 Tiny/Small 请求的碎片收敛到一个规格档位之内；
//! - Subpage 的池化成员关系（挂在 Arena 的规格池里）让“找一个还有空位的
//!   Subpage”是 O(1) 的栈顶查看。
//!
//! # 结构设计（How）
//! - `bitmap` 每位对应一个元素，置位表示已分配；`next_avail` 缓存最近可用位
//!   （初始化后指向 0，释放到曾满页时指向刚归还的位），未命中缓存时顺序扫描
//!   第一个有空位的字；
//! - 成员关系由 `pool_pos` 反向索引维护：Arena 把 Subpage 引用存进规格池的
//!   向量栈，O(1) 入池出池（见 `arena` 模块），本类型只记录自己的位置；
//! - 叶子可能被释放又复用：`init` 负责把旧对象重置为新的元素规格。
//!
//! # 生命周期（What）
//! - 首次在叶子上分配小规格时创建并入池；
//! - 完全空闲且所在池还有其它成员时销毁（`do_not_destroy = false`，调用方
//!   随之释放叶子）；若它是池中唯一成员则保留，避免同规格请求反复
//!   创建/销毁同一个叶子。

use alloc::vec::Vec;

/// `free` 的结果：指示调用方如何维护池成员关系与叶子归属。
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SubpageFree {
    /// Subpage 继续存活。`relink = true` 表示它此前已满、刚恢复空位，
    /// 调用方需要把它重新挂回规格池。
    KeepInPool { relink: bool },
    /// Subpage 完全空闲且池中另有成员：调用方应将其移出池并释放所在叶子。
    Destroy,
}

/// 绑定在一个伙伴树叶子上的位图分配器。
pub(crate) struct PoolSubpage {
    mem_map_idx: u32,
    page_size: usize,
    elem_size: usize,
    max_num_elems: u32,
    num_avail: u32,
    next_avail: Option<u32>,
    bitmap: Vec<u64>,
    do_not_destroy: bool,
    pool_pos: Option<usize>,
}

impl PoolSubpage {
    /// 在叶子 `mem_map_idx` 上创建并初始化。
    pub(crate) fn new(mem_map_idx: u32, page_size: usize, elem_size: usize) -> Self {
        let mut subpage = Self {
            mem_map_idx,
            page_size,
            elem_size: 0,
            max_num_elems: 0,
            num_avail: 0,
            next_avail: None,
            bitmap: Vec::new(),
            do_not_destroy: false,
            pool_pos: None,
        };
        subpage.init(elem_size);
        subpage
    }

    /// （重新）按元素规格初始化；叶子被释放后复用时走同一路径。
    pub(crate) fn init(&mut self, elem_size: usize) {
        debug_assert!(elem_size >= 16 && elem_size <= self.page_size);
        self.elem_size = elem_size;
        self.max_num_elems = (self.page_size / elem_size) as u32;
        self.num_avail = self.max_num_elems;
        self.next_avail = Some(0);
        self.do_not_destroy = true;
        self.pool_pos = None;
        let words = (self.max_num_elems as usize).div_ceil(64);
        self.bitmap.clear();
        self.bitmap.resize(words, 0);
    }

    /// 分配一个元素，返回位图下标；无空位或已进入销毁流程返回 `None`。
    pub(crate) fn allocate(&mut self) -> Option<u32> {
        if self.num_avail == 0 || !self.do_not_destroy {
            return None;
        }
        let bit = match self.next_avail.take() {
            Some(cached) => cached,
            None => self.find_next_avail()?,
        };
        debug_assert!(!self.is_set(bit), "缓存/扫描给出的位必须空闲");
        self.bitmap[(bit / 64) as usize] |= 1u64 << (bit % 64);
        self.num_avail -= 1;
        Some(bit)
    }

    /// 归还位 `bit`。`last_in_pool` 为“本 Subpage 是其规格池唯一成员”。
    pub(crate) fn free(&mut self, bit: u32, last_in_pool: bool) -> SubpageFree {
        debug_assert!(self.is_set(bit), "重复释放同一元素");
        self.bitmap[(bit / 64) as usize] ^= 1u64 << (bit % 64);

        let was_full = self.num_avail == 0;
        self.num_avail += 1;
        if was_full {
            // 曾满页：刚归还的位即最近可用位，并需要重新入池。
            self.next_avail = Some(bit);
            return SubpageFree::KeepInPool { relink: true };
        }
        if self.num_avail < self.max_num_elems {
            return SubpageFree::KeepInPool { relink: false };
        }
        // 完全空闲：唯一成员保留在池中，否则交还叶子。
        if last_in_pool {
            SubpageFree::KeepInPool { relink: false }
        } else {
            self.do_not_destroy = false;
            SubpageFree::Destroy
        }
    }

    /// 顺序扫描第一个空闲位。
    fn find_next_avail(&self) -> Option<u32> {
        for (word_idx, &word) in self.bitmap.iter().enumerate() {
            if word != u64::MAX {
                let bit = (word_idx as u32) * 64 + (!word).trailing_zeros();
                if bit < self.max_num_elems {
                    return Some(bit);
                }
            }
        }
        None
    }

    fn is_set(&self, bit: u32) -> bool {
        self.bitmap[(bit / 64) as usize] & (1u64 << (bit % 64)) != 0
    }

    pub(crate) fn mem_map_idx(&self) -> u32 {
        self.mem_map_idx
    }

    pub(crate) fn elem_size(&self) -> usize {
        self.elem_size
    }

    pub(crate) fn num_avail(&self) -> u32 {
        self.num_avail
    }

    #[cfg(test)]
    pub(crate) fn max_num_elems(&self) -> u32 {
        self.max_num_elems
    }

    #[cfg(test)]
    pub(crate) fn do_not_destroy(&self) -> bool {
        self.do_not_destroy
    }

    pub(crate) fn pool_pos(&self) -> Option<usize> {
        self.pool_pos
    }

    pub(crate) fn set_pool_pos(&mut self, pos: Option<usize>) {
        self.pool_pos = pos;
    }
}
