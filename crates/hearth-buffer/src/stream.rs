//! 流适配器：以字节流视角消费/追加一个 `ByteBuf`。
//!
//! # 角色定位（Why）
//! - 不少序列化接口以“流”为输入输出边界；适配器把缓冲的双指针模型映射为
//!   流语义：读取从 `reader_index` 消费并推进，写入在 `writer_index` 追加，
//!   流长度即 `writer_index`；
//! - 适配器持有缓冲的一份引用计数：销毁时恰好释放一次，调用方若需在流
//!   结束后继续使用缓冲，应改用 [`ByteBufStream::into_inner`] 拆回。
//!
//! # 契约说明（What）
//! - 不支持随机定位：`seek`/`position` 返回
//!   [`stream.not_supported`](hearth_core::error::codes::NOT_SUPPORTED)；
//! - `set_len` 直通 `set_capacity`，受缓冲的 `max_capacity` 约束；
//! - `std` 环境下实现 [`std::io::Read`]/[`std::io::Write`]；由于写入直达
//!   内存，`io::Write::flush` 是天然的空操作。

use alloc::boxed::Box;

use hearth_core::{ByteBuf, PoolError, Result};

/// 包装 `Box<dyn ByteBuf>` 的字节流。
pub struct ByteBufStream {
    buf: Option<Box<dyn ByteBuf>>,
}

impl ByteBufStream {
    /// 接管缓冲的一份引用，构造流。
    pub fn new(buf: Box<dyn ByteBuf>) -> Self {
        Self { buf: Some(buf) }
    }

    fn inner(&self) -> &dyn ByteBuf {
        self.buf.as_deref().expect("流存续期间缓冲必在")
    }

    fn inner_mut(&mut self) -> &mut dyn ByteBuf {
        self.buf.as_deref_mut().expect("流存续期间缓冲必在")
    }

    /// 流长度：等于缓冲的写指针。
    pub fn len(&self) -> usize {
        self.inner().writer_index()
    }

    /// 流是否为空（尚无任何写入）。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 剩余可读字节数。
    pub fn remaining(&self) -> usize {
        self.inner().readable_bytes()
    }

    /// 读取至多 `dst.len()` 字节，返回实际读取数；流耗尽返回 0。
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let n = dst.len().min(self.remaining());
        if n > 0 {
            self.inner_mut().read_bytes(&mut dst[..n])?;
        }
        Ok(n)
    }

    /// 在流尾追加 `src` 全部字节，必要时自动扩容。
    pub fn write(&mut self, src: &[u8]) -> Result<()> {
        self.inner_mut().write_bytes(src)
    }

    /// 调整流的底层容量（直通 `set_capacity`）。
    pub fn set_len(&mut self, len: usize) -> Result<()> {
        self.inner_mut().set_capacity(len)
    }

    /// 随机定位不受支持。
    pub fn seek(&mut self, _position: u64) -> Result<u64> {
        Err(PoolError::not_supported("seek"))
    }

    /// 位置查询不受支持。
    pub fn position(&self) -> Result<u64> {
        Err(PoolError::not_supported("position"))
    }

    /// 拆回内部缓冲；流被消耗且不再触发释放。
    pub fn into_inner(mut self) -> Box<dyn ByteBuf> {
        self.buf.take().expect("流存续期间缓冲必在")
    }
}

impl Drop for ByteBufStream {
    fn drop(&mut self) {
        // 恰好释放一次；释放失败（例如调用方已手动释放）不在 Drop 中冒泡。
        if let Some(mut buf) = self.buf.take() {
            let _ = buf.release();
        }
    }
}

#[cfg(feature = "std")]
impl std::io::Read for ByteBufStream {
    fn read(&mut self, dst: &mut [u8]) -> std::io::Result<usize> {
        ByteBufStream::read(self, dst).map_err(std::io::Error::other)
    }
}

#[cfg(feature = "std")]
impl std::io::Write for ByteBufStream {
    fn write(&mut self, src: &[u8]) -> std::io::Result<usize> {
        ByteBufStream::write(self, src)
            .map(|()| src.len())
            .map_err(std::io::Error::other)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        // 写入直达内存，无缓冲层可刷。
        Ok(())
    }
}
