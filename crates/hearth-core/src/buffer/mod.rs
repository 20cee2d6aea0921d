//! 缓冲契约命名空间：`ByteBuf` 读写契约、引用计数原语与 `bytes` 生态桥接。
//!
//! # 模块定位（Why）
//! - 将“缓冲长什么样”（契约）与“缓冲从哪来”（池化策略）解耦：
//!   本模块只回答前者，后者由实现 crate 落地；
//! - 对象安全是硬约束：流水线组件以 `Box<dyn ByteBuf>` 在线程间传递缓冲，
//!   因此契约内不出现泛型方法。

mod bridge;
mod byte_buf;
mod ref_count;

pub use byte_buf::ByteBuf;
pub use ref_count::RefCount;
