//! `hearth` 跨层共享的稳定错误域。
//!
//! # 模块定位（Why）
//! - 分配器、缓冲视图与流适配器在不同层次产生的故障需要合流为统一的错误码，
//!   以便调用方（以及日志、指标系统）执行精确的自动化处置；
//! - 框架仍需兼容 `no_std + alloc` 场景，因此错误根因链基于 [`core::error::Error`]
//!   而非 `std`。
//!
//! # 逻辑解析（How）
//! - [`PoolError`] 以 `&'static str` 错误码承载稳定语义，`message` 面向排障人员；
//! - [`codes`] 模块集中备案全部码值，遵循 `<领域>.<语义>` 命名约定；
//! - 高频构造路径（非法参数、已释放访问等）提供具名快捷构造器，
//!   保证同类故障在整个工作区内携带一致的码值。

use alloc::borrow::Cow;
use core::fmt;

/// `hearth` 统一的 `Result` 别名，默认错误类型为 [`PoolError`]。
pub type Result<T, E = PoolError> = core::result::Result<T, E>;

/// 稳定错误码集合。
///
/// # 契约说明（What）
/// - **使用前提**：错误码应由实现者封装进 [`PoolError`]，并确保在日志与断言
///   中携带完整上下文；
/// - **返回承诺**：调用方收到这些错误码后，可据此区分“调用方参数错误”
///   （可立即修复）与“生命周期违规”（通常意味着上层存在释放顺序缺陷）。
///
/// # 设计取舍（Trade-offs）
/// - 码值粒度保持适中：按故障处置方式分组，而非按触发位置枚举，
///   避免实现细节泄漏进公开 API。
pub mod codes {
    /// 非法参数：负向容量语义、越界索引、读写指针违反不变量等。
    pub const INVALID_ARGUMENT: &str = "alloc.invalid_argument";
    /// 分配器构造配置违反约束（页大小、树深、Arena 数量）。
    pub const CONFIG: &str = "alloc.config";
    /// 在引用计数已归零的缓冲上继续执行操作。
    pub const BUFFER_RELEASED: &str = "buffer.released";
    /// 引用计数操作本身违规：对 0 retain、计数溢出、释放超过当前计数。
    pub const REF_COUNT: &str = "buffer.ref_count";
    /// 流适配器不支持的操作（定位、seek 等）。
    pub const NOT_SUPPORTED: &str = "stream.not_supported";
}

/// `PoolError` 是 `hearth` 工作区内所有可观察错误的最终形态。
///
/// # 设计背景（Why）
/// - 核心分配路径不做任何本地恢复（满链路向调用方冒泡），因此错误必须在
///   构造点就完成分类，调用方只依赖 [`code`](Self::code) 做分支；
/// - 错误码为 `'static` 字符串，承载稳定语义并可直接进入日志聚合。
///
/// # 契约说明（What）
/// - **前置条件**：构造时必须使用 [`codes`] 模块备案的码值，或遵循
///   `<领域>.<语义>` 约定的自定义码值；
/// - **后置条件**：返回的 `PoolError` 拥有独立所有权，可跨线程传递
///   （`Send + Sync + 'static`）。
///
/// # 设计取舍（Trade-offs）
/// - `message` 采用 `Cow<'static, str>`：静态描述零分配，动态描述只在
///   真正出错的冷路径上产生一次堆分配。
#[derive(Debug)]
pub struct PoolError {
    code: &'static str,
    message: Cow<'static, str>,
}

impl PoolError {
    /// 构造核心错误。
    ///
    /// # 契约定义（What）
    /// - `code`：遵循 `<领域>.<语义>` 约定的稳定错误码；
    /// - `message`：面向排障人员的自然语言描述，可为 `&'static str`
    ///   或堆分配字符串。
    pub fn new(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 返回人类可读描述。
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 非法参数的快捷构造器。
    pub fn invalid_argument(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(codes::INVALID_ARGUMENT, message)
    }

    /// 配置违规的快捷构造器。
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(codes::CONFIG, message)
    }

    /// 已释放缓冲访问的快捷构造器，`op` 为被拒绝的操作名。
    pub fn released(op: &'static str) -> Self {
        Self::new(
            codes::BUFFER_RELEASED,
            alloc::format!("缓冲引用计数已归零，拒绝执行 {op}"),
        )
    }

    /// 引用计数违规的快捷构造器。
    pub fn ref_count(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(codes::REF_COUNT, message)
    }

    /// 不支持操作的快捷构造器，`op` 为被拒绝的操作名。
    pub fn not_supported(op: &'static str) -> Self {
        Self::new(
            codes::NOT_SUPPORTED,
            alloc::format!("流适配器不支持 {op} 操作"),
        )
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl core::error::Error for PoolError {}
