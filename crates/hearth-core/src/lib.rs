#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![doc = "hearth-core: 池化字节缓冲框架的对象安全核心契约。"]
#![doc = ""]
#![doc = "本 crate 只定义契约与共享原语（`ByteBuf` 读写契约、`RefCount` 引用计数、"]
#![doc = "`PoolError` 稳定错误域），不落地任何分配策略；具体的 Arena/Chunk/Subpage"]
#![doc = "实现位于 `hearth-buffer`。这样拆分保证调用方可以只依赖契约编程，"]
#![doc = "实现侧则能够在不破坏公开 API 的前提下演进内存布局。"]
#![doc = ""]
#![doc = "== 内存分配依赖 =="]
#![doc = "`hearth-core` 定位于 `no_std + alloc` 场景：契约中的 `Box<dyn ByteBuf>`、"]
#![doc = "错误消息的 `Cow<'static, str>` 均依赖 [`alloc`]。纯 `no_std`（无分配器）"]
#![doc = "环境暂不支持。"]

extern crate alloc;

mod sealed;

pub mod buffer;
pub mod error;

pub use buffer::{ByteBuf, RefCount};
pub use error::{PoolError, Result};
