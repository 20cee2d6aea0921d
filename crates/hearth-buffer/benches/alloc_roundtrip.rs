use criterion::{Criterion, black_box};
use std::{env, time::Duration};

use hearth_buffer::{
    ByteBuf, PooledAllocatorConfig, PooledByteBufAllocator, UnpooledByteBufAllocator,
};

/// 基准：分配 → 写入 1 KiB → 读出 → 释放 的完整往返。
///
/// # 设计背景（Why）
/// - 池化的收益体现在“第二次及以后”的分配；基准以同一工厂反复往返，
///   观测稳定态的分配成本与复用命中；
/// - 同时给出非池化对照组，回归时可直接对比两条曲线的相对位置。
///
/// # 逻辑解析（How）
/// - 每轮迭代完成一次完整生命周期：`new_buffer`、两次 512 B 写入、
///   整块读出、`release`；
/// - Tiny 档位（64 B）单列，覆盖 Subpage 位图路径。
fn bench_pooled_roundtrip(c: &mut Criterion) {
    let allocator = PooledByteBufAllocator::with_config(PooledAllocatorConfig {
        page_size: 4096,
        max_order: 11,
        arena_count: 1,
    })
    .expect("基准配置应通过校验");

    c.bench_function("pooled_roundtrip_1k", |b| {
        b.iter(|| {
            let mut buf = allocator.new_buffer(1024).expect("分配失败");
            buf.write_bytes(&[0u8; 512]).expect("写入前半");
            buf.write_bytes(&[1u8; 512]).expect("写入后半");
            let mut sink = [0u8; 1024];
            buf.read_bytes(&mut sink).expect("读出");
            assert!(buf.release().expect("释放"));
            black_box(sink)
        });
    });

    c.bench_function("pooled_roundtrip_tiny", |b| {
        b.iter(|| {
            let mut buf = allocator.new_buffer(64).expect("分配失败");
            buf.write_bytes(&[7u8; 64]).expect("写入");
            let mut sink = [0u8; 64];
            buf.read_bytes(&mut sink).expect("读出");
            assert!(buf.release().expect("释放"));
            black_box(sink)
        });
    });
}

fn bench_unpooled_roundtrip(c: &mut Criterion) {
    let allocator = UnpooledByteBufAllocator::new();

    c.bench_function("unpooled_roundtrip_1k", |b| {
        b.iter(|| {
            let mut buf = allocator.new_buffer(1024).expect("分配失败");
            buf.write_bytes(&[0u8; 512]).expect("写入前半");
            buf.write_bytes(&[1u8; 512]).expect("写入后半");
            let mut sink = [0u8; 1024];
            buf.read_bytes(&mut sink).expect("读出");
            assert!(buf.release().expect("释放"));
            black_box(sink)
        });
    });
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_pooled_roundtrip(&mut criterion);
    bench_unpooled_roundtrip(&mut criterion);
    criterion.final_summary();
}
