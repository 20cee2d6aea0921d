//! 缓冲引用计数原语。
//!
//! # 模块定位（Why）
//! - 池化缓冲与堆缓冲共用同一套 retain/release 语义：任何缓冲初始计数为 1，
//!   最后一次 release 触发一次且仅一次的释放钩子；
//! - 计数更新必须是跨线程安全的 CAS 序列——缓冲可能在任意线程被 retain，
//!   与创建它的线程无关。
//!
//! # 逻辑解析（How）
//! - 计数器在常规构建下使用 [`core::sync::atomic`]，在 `--cfg loom` 下切换为
//!   loom 的模型原子，使释放路径可以被穷举调度验证；
//! - retain 使用 `Relaxed` CAS（只需原子性，不建立先行关系）；release 的
//!   成功路径使用 `Release`，归零后补一个 `Acquire` fence，保证释放钩子
//!   能看到所有先前写入——这是经典的引用计数折叠序。

#[cfg(loom)]
use loom::sync::atomic::{AtomicU32, Ordering, fence};

#[cfg(not(loom))]
use core::sync::atomic::{AtomicU32, Ordering, fence};

use crate::{PoolError, Result};

/// 原子引用计数，所有缓冲实现内嵌本类型以获得一致的生命周期语义。
///
/// # 契约说明（What）
/// - **初始状态**：计数为 1；
/// - **retain**：`retain_by(n)` 在计数为 0（已释放）或 `count + n` 溢出时
///   返回 [`buffer.ref_count`](crate::error::codes::REF_COUNT) 错误；
/// - **release**：`release_by(n)` 在计数为 0 或 `n > count` 时返回同类错误；
///   将计数首次降为 0 的调用得到 `Ok(true)`，其余得到 `Ok(false)`——
///   调用方据此执行一次性的释放钩子。
///
/// # 设计取舍（Trade-offs）
/// - 选择 `u32`：与主流实现的 31 位有效计数对齐，溢出检查由
///   `checked_add` 显式表达而非环绕。
#[derive(Debug)]
pub struct RefCount {
    count: AtomicU32,
}

impl RefCount {
    /// 以初始计数 1 构造。
    #[cfg(not(loom))]
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(1),
        }
    }

    /// loom 模型下的构造器（loom 原子不支持 `const` 构造）。
    #[cfg(loom)]
    pub fn new() -> Self {
        Self {
            count: AtomicU32::new(1),
        }
    }

    /// 当前计数快照；已释放返回 0。
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    /// 计数加 `n`。
    pub fn retain_by(&self, n: u32) -> Result<()> {
        if n == 0 {
            return Err(PoolError::invalid_argument("retain 增量必须为正"));
        }
        let mut current = self.count.load(Ordering::Relaxed);
        loop {
            if current == 0 {
                return Err(PoolError::ref_count("对已释放的缓冲执行 retain"));
            }
            let next = current
                .checked_add(n)
                .ok_or_else(|| PoolError::ref_count("retain 导致引用计数溢出"))?;
            match self.count.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(()),
                Err(observed) => current = observed,
            }
        }
    }

    /// 计数减 `n`；首次降为 0 返回 `Ok(true)`。
    pub fn release_by(&self, n: u32) -> Result<bool> {
        if n == 0 {
            return Err(PoolError::invalid_argument("release 减量必须为正"));
        }
        let mut current = self.count.load(Ordering::Relaxed);
        loop {
            if current == 0 {
                return Err(PoolError::ref_count("对已释放的缓冲执行 release"));
            }
            if n > current {
                return Err(PoolError::ref_count("release 减量超过当前引用计数"));
            }
            let next = current - n;
            match self.count.compare_exchange_weak(
                current,
                next,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    if next == 0 {
                        // 与其它线程的 Release 递减同步，释放钩子可见全部先前写入。
                        fence(Ordering::Acquire);
                        return Ok(true);
                    }
                    return Ok(false);
                }
                Err(observed) => current = observed,
            }
        }
    }
}

#[cfg(not(loom))]
impl Default for RefCount {
    fn default() -> Self {
        Self::new()
    }
}
