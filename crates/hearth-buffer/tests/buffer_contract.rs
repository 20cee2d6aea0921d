//! `buffer_contract` 集成测试：验证两种缓冲实现共同遵守 `ByteBuf` 契约。
//!
//! # 测试目标（Why）
//! - 池化与堆缓冲必须行为同构：调用方可以把任意一种交给编解码层；
//! - 引用计数门禁、容量策略与指针不变量是契约的硬边界，破坏任何一条都会
//!   在上层表现为内存越权或静默截断。

use hearth_buffer::{
    ByteBuf, PooledAllocatorConfig, PooledByteBufAllocator, UnpooledByteBufAllocator,
};

fn single_arena() -> PooledByteBufAllocator {
    PooledByteBufAllocator::with_config(PooledAllocatorConfig {
        page_size: 4096,
        max_order: 11,
        arena_count: 1,
    })
    .expect("测试配置应通过校验")
}

/// 顺序写读全类型一遍：值逐一对应，结束后读写指针汇合。
#[test]
fn sequential_typed_round_trip_on_pooled_buffer() {
    let allocator = single_arena();
    let mut buf = allocator.new_buffer(64).expect("分配失败");

    buf.write_bool(true).expect("write_bool");
    buf.write_u8(0xA5).expect("write_u8");
    buf.write_i8(-7).expect("write_i8");
    buf.write_i16(-30000).expect("write_i16");
    buf.write_u16(0xCAFE).expect("write_u16");
    buf.write_i32(0x1234_5678).expect("write_i32");
    buf.write_i64(-0x0102_0304_0506_0708).expect("write_i64");
    buf.write_f32(3.25).expect("write_f32");
    buf.write_f64(-1024.5).expect("write_f64");

    assert!(buf.read_bool().expect("read_bool"));
    assert_eq!(buf.read_u8().expect("read_u8"), 0xA5);
    assert_eq!(buf.read_i8().expect("read_i8"), -7);
    assert_eq!(buf.read_i16().expect("read_i16"), -30000);
    assert_eq!(buf.read_u16().expect("read_u16"), 0xCAFE);
    assert_eq!(buf.read_i32().expect("read_i32"), 0x1234_5678);
    assert_eq!(buf.read_i64().expect("read_i64"), -0x0102_0304_0506_0708);
    assert_eq!(buf.read_f32().expect("read_f32").to_bits(), 3.25f32.to_bits());
    assert_eq!(
        buf.read_f64().expect("read_f64").to_bits(),
        (-1024.5f64).to_bits()
    );
    assert_eq!(buf.reader_index(), buf.writer_index());
}

/// 绝对访问不移动指针，且在池化偏移下仍然按缓冲内坐标寻址。
#[test]
fn absolute_accessors_leave_indices_untouched() {
    let allocator = single_arena();
    // 先占一个席位，让第二个缓冲拿到非零 base_offset。
    let _pad = allocator.new_buffer(16).expect("占位分配失败");
    let mut buf = allocator.new_buffer(32).expect("分配失败");
    assert_ne!(buf.base_offset(), 0, "测试前提：席位偏移非零");

    buf.set_i32(4, 0x0BAD_F00D).expect("set_i32");
    assert_eq!(buf.get_i32(4).expect("get_i32"), 0x0BAD_F00D);
    assert_eq!(buf.reader_index(), 0);
    assert_eq!(buf.writer_index(), 0);
    assert_eq!(
        buf.get_i32(29).unwrap_err().code(),
        "alloc.invalid_argument",
        "越过 capacity 的绝对访问必须拒绝"
    );
}

/// 引用计数门禁：归零后任何数据访问返回 `buffer.released`。
#[test]
fn released_buffer_rejects_all_access() {
    let allocator = single_arena();
    let mut buf = allocator.new_buffer(1).expect("分配失败");
    assert!(buf.release().expect("释放失败"));
    assert_eq!(buf.ref_count(), 0);

    assert_eq!(buf.get_u16(0).unwrap_err().code(), "buffer.released");
    assert_eq!(buf.write_bytes(&[1]).unwrap_err().code(), "buffer.released");
    assert_eq!(buf.set_index(0, 0).unwrap_err().code(), "buffer.released");
    assert_eq!(buf.set_capacity(8).unwrap_err().code(), "buffer.released");
    assert_eq!(buf.readable_slice(), &[] as &[u8]);

    assert_eq!(buf.retain().unwrap_err().code(), "buffer.ref_count");
    assert_eq!(buf.release().unwrap_err().code(), "buffer.ref_count");
}

/// retain/release 的净零往返：中间的 release 不触发释放。
#[test]
fn retain_release_round_trip_keeps_buffer_alive() {
    let allocator = single_arena();
    let mut buf = allocator.new_buffer(8).expect("分配失败");
    buf.retain().expect("retain 失败");
    assert_eq!(buf.ref_count(), 2);
    assert!(!buf.release().expect("第一次 release"), "计数未归零");
    buf.write_u8(7).expect("缓冲仍应可用");
    assert!(buf.release().expect("第二次 release"), "此时才真正释放");
}

/// 池化容量策略：物理上限内原地伸缩，越界才迁移席位。
#[test]
fn pooled_set_capacity_follows_in_place_policy() {
    let allocator = single_arena();
    let mut buf = allocator.new_buffer(100).expect("分配失败");
    assert_eq!(buf.max_length(), 112, "100 应规格化为 112");
    let offset = buf.base_offset();

    // 物理上限内放大：席位不动。
    buf.set_capacity(112).expect("原地扩容失败");
    assert_eq!(buf.base_offset(), offset);
    assert_eq!(buf.capacity(), 112);

    // 超出物理上限：迁移席位并保留内容。
    buf.set_index(0, 0).expect("复位指针");
    buf.write_bytes(b"keepsake").expect("写入样本");
    buf.set_capacity(4096).expect("迁移扩容失败");
    assert_eq!(buf.capacity(), 4096);
    assert_eq!(buf.max_length(), 4096);
    let mut out = [0u8; 8];
    buf.get_bytes(0, &mut out).expect("读取样本");
    assert_eq!(&out, b"keepsake", "迁移必须整块复制有效内容");

    // 缩回物理上限的少数派：迁移到小席位，指针被钳制。
    buf.set_index(0, 4096).expect("填满写指针");
    buf.set_capacity(64).expect("缩容失败");
    assert_eq!(buf.capacity(), 64);
    assert_eq!(buf.writer_index(), 64, "写指针必须钳回新容量");
    assert!(buf.max_length() < 4096, "缩容应把大席位还给池");
}

/// 小席位的原地缩容：仍占上限多数时不迁移。
#[test]
fn small_seat_shrinks_in_place_when_majority_retained() {
    let allocator = single_arena();
    let mut buf = allocator.new_buffer(512).expect("分配失败");
    let offset = buf.base_offset();
    buf.set_capacity(500).expect("缩容失败");
    assert_eq!(buf.capacity(), 500);
    assert_eq!(buf.base_offset(), offset, "500 > 512 - 16，应原地收缩");
}

/// `set_index` 的指针不变量：两侧越界都必须拒绝。
#[test]
fn set_index_enforces_reader_writer_invariant() {
    let allocator = single_arena();
    let mut buf = allocator.new_buffer(16).expect("分配失败");
    buf.set_index(4, 12).expect("合法区间");
    assert_eq!(buf.reader_index(), 4);
    assert_eq!(buf.writer_index(), 12);

    assert_eq!(
        buf.set_index(8, 4).unwrap_err().code(),
        "alloc.invalid_argument",
        "reader 超过 writer"
    );
    assert_eq!(
        buf.set_index(0, 17).unwrap_err().code(),
        "alloc.invalid_argument",
        "writer 超过 capacity"
    );
    assert_eq!(buf.reader_index(), 4, "失败不得改动指针");
}

/// 内容等值与哈希跨实现一致：池化与堆缓冲互相比较。
#[test]
fn equality_and_hash_are_implementation_agnostic() {
    let pooled_alloc = single_arena();
    let heap_alloc = UnpooledByteBufAllocator::new();

    let mut pooled = pooled_alloc.new_buffer(64).expect("池化分配失败");
    let mut heap = heap_alloc.new_buffer(16).expect("堆分配失败");
    pooled.write_bytes(b"identical-bytes").expect("写池化");
    heap.write_bytes(b"identical-bytes").expect("写堆");

    assert!(pooled.content_equals(&heap), "内容相同应判等");
    assert_eq!(pooled.content_hash(), heap.content_hash());

    heap.write_u8(b'!').expect("追加一字节");
    assert!(!pooled.content_equals(&heap));

    // 跳过已读前缀后按剩余区间比较。
    let mut other = heap_alloc.new_buffer(16).expect("堆分配失败");
    other.write_bytes(b"bytes").expect("写入后缀");
    pooled.skip(10).expect("跳过前缀");
    assert!(pooled.content_equals(&other), "等值只看可读区间");
}

/// `set_capacity` 等值调用是免检无副作用的空操作。
#[test]
fn set_capacity_to_same_value_is_a_noop() {
    let allocator = single_arena();
    let mut buf = allocator.new_buffer(256).expect("分配失败");
    let offset = buf.base_offset();
    buf.set_capacity(256).expect("等值 set_capacity 不应失败");
    assert_eq!(buf.base_offset(), offset);
    assert_eq!(buf.capacity(), 256);
}

/// `bytes::Buf` 桥接：`dyn ByteBuf` 可直接被 Buf 消费端读取。
#[test]
fn bytes_buf_bridge_consumes_readable_region() {
    use bytes::Buf;

    let allocator = single_arena();
    let mut buf = allocator.new_buffer(32).expect("分配失败");
    buf.write_bytes(b"bridge").expect("写入失败");

    let erased: &mut dyn ByteBuf = &mut buf;
    assert_eq!(Buf::remaining(erased), 6);
    assert_eq!(Buf::chunk(erased), b"bridge");
    Buf::advance(erased, 4);
    assert_eq!(Buf::chunk(erased), b"ge");
}
