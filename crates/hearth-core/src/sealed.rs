//! 内部 sealed 模块用于控制外部扩展边界。
//!
//! # 设计背景（Why）
//! - `hearth-core` 向外暴露可实现的 `ByteBuf` 契约，需要在 SemVer 框架下保持
//!   未来为其增加默认方法或强化约束的空间。
//!
//! # 逻辑解析（How）
//! - 定义私有模块级 Trait `Sealed`，并对所有类型提供 blanket 实现；
//! - 公开契约通过 `: crate::sealed::Sealed` 间接依赖该标记。当前不限制实现者，
//!   若未来收紧 blanket 条件，无需修改公开 Trait 的签名。
//!
//! # 契约说明（What）
//! - `Sealed` 无需调用方显式实现；任意类型默认满足该约束。

pub(crate) trait Sealed {}

impl<T: ?Sized> Sealed for T {}
