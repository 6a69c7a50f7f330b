// Run with:  cargo bench --bench dirty_scan

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use t547_framebuffer::dirty::compute_dirty_rect;
use t547_framebuffer::{BufferKind, PackedBuffer, HEIGHT, WIDTH};

fn dirty_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("dirty_scan");
    group.throughput(Throughput::Elements((WIDTH * HEIGHT) as u64));

    let previous = PackedBuffer::try_new(WIDTH, HEIGHT, BufferKind::Previous).unwrap();

    group.bench_function("unchanged", |b| {
        let current = previous.clone();
        b.iter(|| black_box(compute_dirty_rect(black_box(&current), black_box(&previous))));
    });

    group.bench_function("single_pixel", |b| {
        let mut current = previous.clone();
        current.set_gray(480, 270, 0);
        b.iter(|| black_box(compute_dirty_rect(black_box(&current), black_box(&previous))));
    });

    group.bench_function("all_changed", |b| {
        let mut current = previous.clone();
        current.fill_gray(0);
        b.iter(|| black_box(compute_dirty_rect(black_box(&current), black_box(&previous))));
    });

    group.finish();
}

criterion_group!(benches, dirty_scan);
criterion_main!(benches);
