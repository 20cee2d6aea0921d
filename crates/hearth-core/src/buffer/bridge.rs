//! `bytes` 生态桥接：让 `dyn ByteBuf` 直接充当 [`bytes::Buf`] 消费端。
//!
//! # 设计初衷（Why）
//! - 大量编解码与 IO 库以 `bytes::Buf` 为输入边界；桥接后，池化缓冲无需
//!   先扁平化为 `Vec<u8>` 即可交给这些库消费；
//! - 桥接只覆盖读取侧：写入侧的扩容策略与 `max_capacity` 约束无法映射进
//!   `bytes::BufMut` 的无错误签名，强行桥接会把容量违规变成热路径 panic。
//!
//! # 契约说明（What）
//! - `remaining`/`chunk` 直接转发可读区间；
//! - `advance` 遵循 `bytes::Buf` 的契约：越过可读末尾属于调用方错误，
//!   以 panic 终止（与上游 trait 的文档一致）。

use bytes::Buf;

use super::ByteBuf;

impl Buf for dyn ByteBuf {
    fn remaining(&self) -> usize {
        self.readable_bytes()
    }

    fn chunk(&self) -> &[u8] {
        self.readable_slice()
    }

    fn advance(&mut self, cnt: usize) {
        if cnt == 0 {
            return;
        }
        if let Err(err) = self.skip(cnt) {
            panic!("ByteBuf::skip 违反 bytes::Buf 契约: {err}");
        }
    }
}
