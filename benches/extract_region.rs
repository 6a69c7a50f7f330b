// Run with:  cargo bench --bench extract_region

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use t547_framebuffer::region::extract_region;
use t547_framebuffer::{BufferKind, PackedBuffer, Rect, HEIGHT, WIDTH};

fn extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_region");

    let mut current = PackedBuffer::try_new(WIDTH, HEIGHT, BufferKind::Current).unwrap();
    for x in (0..WIDTH).step_by(3) {
        current.set_gray(x, x % HEIGHT, 0x40);
    }

    for (name, area) in [
        ("small_even", Rect::new(90, 40, 22, 21)),
        ("small_odd", Rect::new(91, 41, 21, 21)),
        ("full_screen", Rect::full_screen()),
    ] {
        group.throughput(Throughput::Elements(area.area() as u64));
        group.bench_function(name, |b| {
            b.iter(|| black_box(extract_region(black_box(&current), black_box(area)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, extract);
criterion_main!(benches);
