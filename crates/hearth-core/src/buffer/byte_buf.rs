use crate::{Result, sealed::Sealed};

/// `ByteBuf` 定义对象安全的双指针字节缓冲契约。
///
/// # 设计背景（Why）
/// - **对标实践**：综合 Netty `ByteBuf`、Tokio `bytes::Buf/BufMut`、.NET
///   `IByteBuffer` 的读写模型，采用 `reader_index`/`writer_index` 双指针而非
///   单游标，使同一缓冲可以交替读写而无需显式 `flip`；
/// - **框架定位**：池化分配器产出的缓冲与一次性堆缓冲都实现本契约，
///   调用方以 `Box<dyn ByteBuf>` 编程，无需感知底层是 Arena 席位还是 `Vec`；
/// - **生命周期**：缓冲携带引用计数，最后一次 `release` 将底层内存交还来源
///   （池化实现归还 Arena，堆实现交还全局分配器）。
///
/// # 逻辑解析（How）
/// - 绝对访问（`get_*`/`set_*`）以 `capacity` 为边界、不移动指针；
///   顺序访问（`read_*`/`write_*`）分别推进 `reader_index`/`writer_index`，
///   写入前通过 [`ensure_writable`](Self::ensure_writable) 自动扩容；
/// - 多字节访问器统一为大端字节序，并以显式的字节数组转换实现
///   （`{to,from}_be_bytes`），在任何宿主字节序上结果一致；
/// - 默认方法全部建立在少量必需方法之上，实现者只需落地存储原语。
///
/// # 契约说明（What）
/// - **不变量**：任何对外可观察时刻满足
///   `reader_index ≤ writer_index ≤ capacity ≤ max_capacity`；
/// - **前置条件**：单个缓冲上的并发读写由调用方串行化（写方法要求
///   `&mut self`，Rust 借用规则即约束）；不同缓冲之间互不干扰；
/// - **后置条件**：引用计数归零后，除 `ref_count` 外的操作一律返回
///   [`buffer.released`](crate::error::codes::BUFFER_RELEASED)。
///
/// # 设计考量（Trade-offs & Gotchas）
/// - **对象安全权衡**：放弃泛型化零成本抽象，换取跨组件动态调度能力，
///   与 Netty 的 `ByteBuf` 取舍一致；
/// - **切片参数**：批量接口以 `&[u8]`/`&mut [u8]` 表达“目标区间”，
///   调用方通过切片下标表达次级偏移，避免 `(dst, dst_index, length)`
///   三元组在 Rust 中的冗余；
/// - **错误语义**：越界与指针违规统一返回
///   [`alloc.invalid_argument`](crate::error::codes::INVALID_ARGUMENT)，
///   实现不得 panic。
pub trait ByteBuf: Send + Sync + 'static + Sealed {
    /// 当前逻辑容量（可读写区间上界）。
    fn capacity(&self) -> usize;

    /// 容量上限；[`set_capacity`](Self::set_capacity) 与自动扩容不得越过。
    fn max_capacity(&self) -> usize;

    /// 读指针。
    fn reader_index(&self) -> usize;

    /// 写指针。
    fn writer_index(&self) -> usize;

    /// 同时设置读写指针。
    ///
    /// # 契约（What）
    /// - **前置条件**：`reader ≤ writer ≤ capacity`，否则返回非法参数错误
    ///   且指针保持原值。
    fn set_index(&mut self, reader: usize, writer: usize) -> Result<()>;

    /// 调整逻辑容量。
    ///
    /// 扩容与缩容策略由实现决定（池化实现优先在既有物理席位内变更，
    /// 必要时迁移到新席位；堆实现按倍增增长、从不缩容），但都必须遵守：
    /// `new_capacity > max_capacity` 返回非法参数错误；成功后
    /// `capacity() == new_capacity`，读写指针被钳制在新容量之内。
    fn set_capacity(&mut self, new_capacity: usize) -> Result<()>;

    /// 本缓冲在底层存储中的起始偏移。
    ///
    /// 池化实现返回席位在 Chunk 背衬数组中的字节偏移，堆实现恒为 0。
    /// 主要供回收策略的观测断言使用（例如“两次分配复用同一页”）。
    fn base_offset(&self) -> usize;

    /// 底层存储的总长度（池化实现为 Chunk 大小，堆实现等于 `capacity`）。
    fn base_len(&self) -> usize;

    /// 借用当前可读区间 `[reader_index, writer_index)`。
    ///
    /// 引用计数归零后返回空切片；该方法是等值比较、哈希与
    /// `bytes::Buf` 桥接的基础。
    fn readable_slice(&self) -> &[u8];

    /// 绝对批量读取：将 `[index, index + dst.len())` 复制进 `dst`，不移动指针。
    ///
    /// 越界（`index + dst.len() > capacity`）返回非法参数错误。
    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()>;

    /// 绝对批量写入：将 `src` 复制到 `[index, index + src.len())`，不移动指针。
    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()>;

    /// 顺序读取 `dst.len()` 字节并推进读指针；可读字节不足返回非法参数错误。
    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()>;

    /// 顺序写入 `src` 并推进写指针；必要时先经
    /// [`ensure_writable`](Self::ensure_writable) 扩容。
    fn write_bytes(&mut self, src: &[u8]) -> Result<()>;

    /// 跳过 `len` 个可读字节。
    fn skip(&mut self, len: usize) -> Result<()>;

    /// 确保至少还有 `len` 字节可写空间。
    ///
    /// # 契约（What）
    /// - `len == 0` 恒成功且无副作用；
    /// - 目标容量为 `writer_index + len`；超过 `max_capacity` 返回非法参数
    ///   错误，否则增长到恰好满足目标。
    fn ensure_writable(&mut self, len: usize) -> Result<()>;

    /// 当前引用计数；已释放的缓冲返回 0。
    fn ref_count(&self) -> u32;

    /// 引用计数加 `n`；对已归零的缓冲 retain 或计数溢出返回
    /// [`buffer.ref_count`](crate::error::codes::REF_COUNT) 错误。
    fn retain_by(&self, n: u32) -> Result<()>;

    /// 引用计数减 `n`；减到 0 时执行一次性释放钩子并返回 `Ok(true)`。
    ///
    /// `n` 超过当前计数或缓冲已释放均返回
    /// [`buffer.ref_count`](crate::error::codes::REF_COUNT) 错误。
    fn release_by(&mut self, n: u32) -> Result<bool>;

    // ---- 指针派生量 ----

    /// 可读字节数。
    fn readable_bytes(&self) -> usize {
        self.writer_index() - self.reader_index()
    }

    /// 可写字节数（不含自动扩容空间）。
    fn writable_bytes(&self) -> usize {
        self.capacity() - self.writer_index()
    }

    /// 是否有可读字节。
    fn is_readable(&self) -> bool {
        self.readable_bytes() > 0
    }

    /// 是否有可写字节。
    fn is_writable(&self) -> bool {
        self.writable_bytes() > 0
    }

    /// 引用计数加一。
    fn retain(&self) -> Result<()> {
        self.retain_by(1)
    }

    /// 引用计数减一；减到 0 时释放并返回 `Ok(true)`。
    fn release(&mut self) -> Result<bool> {
        self.release_by(1)
    }

    // ---- 绝对定宽访问器（大端，不移动指针）----

    /// 读取单字节布尔值：非 0 即 `true`。
    fn get_bool(&self, index: usize) -> Result<bool> {
        Ok(self.get_u8(index)? != 0)
    }

    /// 读取无符号单字节。
    fn get_u8(&self, index: usize) -> Result<u8> {
        let mut raw = [0u8; 1];
        self.get_bytes(index, &mut raw)?;
        Ok(raw[0])
    }

    /// 读取有符号单字节。
    fn get_i8(&self, index: usize) -> Result<i8> {
        Ok(self.get_u8(index)? as i8)
    }

    /// 读取大端 16 位有符号整数。
    fn get_i16(&self, index: usize) -> Result<i16> {
        let mut raw = [0u8; 2];
        self.get_bytes(index, &mut raw)?;
        Ok(i16::from_be_bytes(raw))
    }

    /// 读取大端 16 位无符号整数；同时充当 16 位字符（UTF-16 码元）访问器。
    fn get_u16(&self, index: usize) -> Result<u16> {
        let mut raw = [0u8; 2];
        self.get_bytes(index, &mut raw)?;
        Ok(u16::from_be_bytes(raw))
    }

    /// 读取大端 32 位有符号整数。
    fn get_i32(&self, index: usize) -> Result<i32> {
        let mut raw = [0u8; 4];
        self.get_bytes(index, &mut raw)?;
        Ok(i32::from_be_bytes(raw))
    }

    /// 读取大端 64 位有符号整数。
    fn get_i64(&self, index: usize) -> Result<i64> {
        let mut raw = [0u8; 8];
        self.get_bytes(index, &mut raw)?;
        Ok(i64::from_be_bytes(raw))
    }

    /// 读取 IEEE-754 单精度浮点：按大端 32 位整数取位模式后重建。
    fn get_f32(&self, index: usize) -> Result<f32> {
        let mut raw = [0u8; 4];
        self.get_bytes(index, &mut raw)?;
        Ok(f32::from_bits(u32::from_be_bytes(raw)))
    }

    /// 读取 IEEE-754 双精度浮点。
    fn get_f64(&self, index: usize) -> Result<f64> {
        let mut raw = [0u8; 8];
        self.get_bytes(index, &mut raw)?;
        Ok(f64::from_bits(u64::from_be_bytes(raw)))
    }

    /// 写入单字节布尔值（`true` 写 1）。
    fn set_bool(&mut self, index: usize, value: bool) -> Result<()> {
        self.set_u8(index, u8::from(value))
    }

    /// 写入无符号单字节。
    fn set_u8(&mut self, index: usize, value: u8) -> Result<()> {
        self.set_bytes(index, &[value])
    }

    /// 写入有符号单字节。
    fn set_i8(&mut self, index: usize, value: i8) -> Result<()> {
        self.set_u8(index, value as u8)
    }

    /// 写入大端 16 位有符号整数。
    fn set_i16(&mut self, index: usize, value: i16) -> Result<()> {
        self.set_bytes(index, &value.to_be_bytes())
    }

    /// 写入大端 16 位无符号整数（16 位字符）。
    fn set_u16(&mut self, index: usize, value: u16) -> Result<()> {
        self.set_bytes(index, &value.to_be_bytes())
    }

    /// 写入大端 32 位有符号整数。
    fn set_i32(&mut self, index: usize, value: i32) -> Result<()> {
        self.set_bytes(index, &value.to_be_bytes())
    }

    /// 写入大端 64 位有符号整数。
    fn set_i64(&mut self, index: usize, value: i64) -> Result<()> {
        self.set_bytes(index, &value.to_be_bytes())
    }

    /// 写入 IEEE-754 单精度浮点的大端位模式。
    fn set_f32(&mut self, index: usize, value: f32) -> Result<()> {
        self.set_bytes(index, &value.to_bits().to_be_bytes())
    }

    /// 写入 IEEE-754 双精度浮点的大端位模式。
    fn set_f64(&mut self, index: usize, value: f64) -> Result<()> {
        self.set_bytes(index, &value.to_bits().to_be_bytes())
    }

    // ---- 顺序定宽访问器（推进读/写指针）----

    /// 顺序读取布尔值。
    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// 顺序读取无符号单字节。
    fn read_u8(&mut self) -> Result<u8> {
        let mut raw = [0u8; 1];
        self.read_bytes(&mut raw)?;
        Ok(raw[0])
    }

    /// 顺序读取有符号单字节。
    fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// 顺序读取大端 16 位有符号整数。
    fn read_i16(&mut self) -> Result<i16> {
        let mut raw = [0u8; 2];
        self.read_bytes(&mut raw)?;
        Ok(i16::from_be_bytes(raw))
    }

    /// 顺序读取大端 16 位无符号整数（16 位字符）。
    fn read_u16(&mut self) -> Result<u16> {
        let mut raw = [0u8; 2];
        self.read_bytes(&mut raw)?;
        Ok(u16::from_be_bytes(raw))
    }

    /// 顺序读取大端 32 位有符号整数。
    fn read_i32(&mut self) -> Result<i32> {
        let mut raw = [0u8; 4];
        self.read_bytes(&mut raw)?;
        Ok(i32::from_be_bytes(raw))
    }

    /// 顺序读取大端 64 位有符号整数。
    fn read_i64(&mut self) -> Result<i64> {
        let mut raw = [0u8; 8];
        self.read_bytes(&mut raw)?;
        Ok(i64::from_be_bytes(raw))
    }

    /// 顺序读取单精度浮点。
    fn read_f32(&mut self) -> Result<f32> {
        let mut raw = [0u8; 4];
        self.read_bytes(&mut raw)?;
        Ok(f32::from_bits(u32::from_be_bytes(raw)))
    }

    /// 顺序读取双精度浮点。
    fn read_f64(&mut self) -> Result<f64> {
        let mut raw = [0u8; 8];
        self.read_bytes(&mut raw)?;
        Ok(f64::from_bits(u64::from_be_bytes(raw)))
    }

    /// 顺序写入布尔值。
    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_bytes(&[u8::from(value)])
    }

    /// 顺序写入无符号单字节。
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    /// 顺序写入有符号单字节。
    fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_bytes(&[value as u8])
    }

    /// 顺序写入大端 16 位有符号整数。
    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// 顺序写入大端 16 位无符号整数（16 位字符）。
    fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// 顺序写入大端 32 位有符号整数。
    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// 顺序写入大端 64 位有符号整数。
    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// 顺序写入单精度浮点的位模式。
    fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write_bytes(&value.to_bits().to_be_bytes())
    }

    /// 顺序写入双精度浮点的位模式。
    fn write_f64(&mut self, value: f64) -> Result<()> {
        self.write_bytes(&value.to_bits().to_be_bytes())
    }

    // ---- 内容等值与哈希 ----

    /// 判断两个缓冲的可读区间是否字节级相等。
    ///
    /// # 逻辑解析（How）
    /// - 先比较可读长度，再按 8 字节步长批量比较，尾部逐字节收尾；
    ///   与底层实现（池化/堆）无关，只看内容。
    fn content_equals(&self, other: &dyn ByteBuf) -> bool {
        let lhs = self.readable_slice();
        let rhs = other.readable_slice();
        if lhs.len() != rhs.len() {
            return false;
        }
        let mut lhs_words = lhs.chunks_exact(8);
        let mut rhs_words = rhs.chunks_exact(8);
        for (l, r) in (&mut lhs_words).zip(&mut rhs_words) {
            if l != r {
                return false;
            }
        }
        lhs_words.remainder() == rhs_words.remainder()
    }

    /// 计算可读区间的内容哈希。
    ///
    /// # 契约说明（What）
    /// - 以 `h = 1` 起步，按大端 4 字节字折叠 `h = 31*h + word`（环绕算术），
    ///   尾部字节以 `h = 31*h + byte` 收尾；结果为 0 时返回 1，
    ///   保证“已哈希”状态可与哨兵值区分；
    /// - 内容相等的缓冲哈希必然相等，与读写指针的绝对位置无关。
    fn content_hash(&self) -> i32 {
        let readable = self.readable_slice();
        let mut hash: i32 = 1;
        let mut words = readable.chunks_exact(4);
        for word in &mut words {
            let value = i32::from_be_bytes([word[0], word[1], word[2], word[3]]);
            hash = hash.wrapping_mul(31).wrapping_add(value);
        }
        for &byte in words.remainder() {
            hash = hash.wrapping_mul(31).wrapping_add(i32::from(byte));
        }
        if hash == 0 { 1 } else { hash }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::PoolError;
    use crate::buffer::RefCount;

    /// `Vec` 背衬的最小实现，用来在不引入池化细节的前提下验证默认方法。
    struct VecByteBuf {
        data: Vec<u8>,
        reader: usize,
        writer: usize,
        max_capacity: usize,
        refs: RefCount,
    }

    impl VecByteBuf {
        fn with_capacity(capacity: usize) -> Self {
            Self {
                data: vec![0; capacity],
                reader: 0,
                writer: 0,
                max_capacity: usize::MAX,
                refs: RefCount::new(),
            }
        }

        fn ensure_live(&self, op: &'static str) -> Result<()> {
            if self.refs.count() == 0 {
                Err(PoolError::released(op))
            } else {
                Ok(())
            }
        }
    }

    impl ByteBuf for VecByteBuf {
        fn capacity(&self) -> usize {
            self.data.len()
        }

        fn max_capacity(&self) -> usize {
            self.max_capacity
        }

        fn reader_index(&self) -> usize {
            self.reader
        }

        fn writer_index(&self) -> usize {
            self.writer
        }

        fn set_index(&mut self, reader: usize, writer: usize) -> Result<()> {
            if reader > writer || writer > self.capacity() {
                return Err(PoolError::invalid_argument("set_index 违反指针不变量"));
            }
            self.reader = reader;
            self.writer = writer;
            Ok(())
        }

        fn set_capacity(&mut self, new_capacity: usize) -> Result<()> {
            if new_capacity > self.max_capacity {
                return Err(PoolError::invalid_argument("capacity 超过 max_capacity"));
            }
            self.data.resize(new_capacity, 0);
            self.reader = self.reader.min(new_capacity);
            self.writer = self.writer.min(new_capacity);
            Ok(())
        }

        fn base_offset(&self) -> usize {
            0
        }

        fn base_len(&self) -> usize {
            self.data.len()
        }

        fn readable_slice(&self) -> &[u8] {
            if self.refs.count() == 0 {
                &[]
            } else {
                &self.data[self.reader..self.writer]
            }
        }

        fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<()> {
            self.ensure_live("get_bytes")?;
            let end = index
                .checked_add(dst.len())
                .filter(|end| *end <= self.capacity())
                .ok_or_else(|| PoolError::invalid_argument("get_bytes 越界"))?;
            dst.copy_from_slice(&self.data[index..end]);
            Ok(())
        }

        fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<()> {
            self.ensure_live("set_bytes")?;
            let end = index
                .checked_add(src.len())
                .filter(|end| *end <= self.capacity())
                .ok_or_else(|| PoolError::invalid_argument("set_bytes 越界"))?;
            self.data[index..end].copy_from_slice(src);
            Ok(())
        }

        fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
            if dst.len() > self.readable_bytes() {
                return Err(PoolError::invalid_argument("read_bytes 可读字节不足"));
            }
            let reader = self.reader;
            self.get_bytes(reader, dst)?;
            self.reader += dst.len();
            Ok(())
        }

        fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
            if src.is_empty() {
                return Ok(());
            }
            self.ensure_writable(src.len())?;
            let writer = self.writer;
            self.set_bytes(writer, src)?;
            self.writer += src.len();
            Ok(())
        }

        fn skip(&mut self, len: usize) -> Result<()> {
            if len > self.readable_bytes() {
                return Err(PoolError::invalid_argument("skip 越过写指针"));
            }
            self.reader += len;
            Ok(())
        }

        fn ensure_writable(&mut self, len: usize) -> Result<()> {
            if len == 0 {
                return Ok(());
            }
            self.ensure_live("ensure_writable")?;
            let target = self.writer + len;
            if target <= self.capacity() {
                return Ok(());
            }
            self.set_capacity(target)
        }

        fn ref_count(&self) -> u32 {
            self.refs.count()
        }

        fn retain_by(&self, n: u32) -> Result<()> {
            self.refs.retain_by(n)
        }

        fn release_by(&mut self, n: u32) -> Result<bool> {
            self.refs.release_by(n)
        }
    }

    /// 定宽访问器必须按大端序落盘：手工核对各类型的字节布局。
    #[test]
    fn typed_accessors_are_big_endian() {
        let mut buf = VecByteBuf::with_capacity(32);
        buf.set_i32(0, 0x0102_0304).expect("set_i32 失败");
        let mut raw = [0u8; 4];
        buf.get_bytes(0, &mut raw).expect("get_bytes 失败");
        assert_eq!(raw, [0x01, 0x02, 0x03, 0x04], "i32 应按大端序存储");

        buf.set_i16(4, -2).expect("set_i16 失败");
        let mut raw = [0u8; 2];
        buf.get_bytes(4, &mut raw).expect("get_bytes 失败");
        assert_eq!(raw, [0xFF, 0xFE], "负数补码也应按大端序存储");

        buf.set_u16(6, 0xABCD).expect("set_u16 失败");
        assert_eq!(buf.get_u16(6).expect("get_u16 失败"), 0xABCD);
    }

    /// 绝对 set 后绝对 get 必须取回原值，覆盖全部定宽类型。
    #[test]
    fn absolute_round_trips_preserve_values() {
        let mut buf = VecByteBuf::with_capacity(64);
        buf.set_bool(0, true).expect("set_bool");
        buf.set_i8(1, -5).expect("set_i8");
        buf.set_i16(2, -12345).expect("set_i16");
        buf.set_i32(4, 0x7FFF_FFFF).expect("set_i32");
        buf.set_i64(8, -0x0123_4567_89AB_CDEF).expect("set_i64");
        buf.set_f32(16, 3.5f32).expect("set_f32");
        buf.set_f64(24, -2.25f64).expect("set_f64");

        assert!(buf.get_bool(0).expect("get_bool"));
        assert_eq!(buf.get_i8(1).expect("get_i8"), -5);
        assert_eq!(buf.get_i16(2).expect("get_i16"), -12345);
        assert_eq!(buf.get_i32(4).expect("get_i32"), 0x7FFF_FFFF);
        assert_eq!(buf.get_i64(8).expect("get_i64"), -0x0123_4567_89AB_CDEF);
        assert_eq!(buf.get_f32(16).expect("get_f32").to_bits(), 3.5f32.to_bits());
        assert_eq!(
            buf.get_f64(24).expect("get_f64").to_bits(),
            (-2.25f64).to_bits()
        );
    }

    /// 顺序写读完成后读写指针必须汇合，且值逐一对应。
    #[test]
    fn sequential_round_trip_converges_indices() {
        let mut buf = VecByteBuf::with_capacity(8);
        buf.write_bool(true).expect("write_bool");
        buf.write_i16(512).expect("write_i16");
        buf.write_i32(-77).expect("write_i32");
        buf.write_f64(1.5).expect("write_f64");

        assert!(buf.read_bool().expect("read_bool"));
        assert_eq!(buf.read_i16().expect("read_i16"), 512);
        assert_eq!(buf.read_i32().expect("read_i32"), -77);
        assert_eq!(buf.read_f64().expect("read_f64").to_bits(), 1.5f64.to_bits());
        assert_eq!(
            buf.reader_index(),
            buf.writer_index(),
            "全部读出后读写指针应汇合"
        );
    }

    /// 内容等值只看可读区间：长度不同立即不等，指针位置不影响结果。
    #[test]
    fn content_equality_ignores_backing_details() {
        let mut lhs = VecByteBuf::with_capacity(16);
        let mut rhs = VecByteBuf::with_capacity(64);
        lhs.write_bytes(b"hearth").expect("写入 lhs");
        rhs.write_bytes(b"hearth").expect("写入 rhs");
        assert!(lhs.content_equals(&rhs), "相同内容应相等");
        assert_eq!(lhs.content_hash(), rhs.content_hash(), "相等内容哈希一致");

        rhs.write_u8(b'!').expect("追加一字节");
        assert!(!lhs.content_equals(&rhs), "长度不同应立即不等");
    }

    /// 哈希折叠遇 0 时必须回退为 1，保证结果永不为 0。
    #[test]
    fn content_hash_never_returns_zero() {
        let empty = VecByteBuf::with_capacity(4);
        assert_eq!(empty.content_hash(), 1, "空区间的初始哈希即为 1");
    }

    /// 零长度写入是免检无副作用的空操作。
    #[test]
    fn zero_length_write_is_a_free_noop() {
        let mut buf = VecByteBuf::with_capacity(0);
        buf.write_bytes(&[]).expect("零长度写入不应失败");
        assert_eq!(buf.writer_index(), 0);
        assert_eq!(buf.capacity(), 0, "零长度写入不应触发扩容");
    }
}
