//! Criterion benchmarks for the screen topology.
//!
//! `valid_virtual_coordinate` runs once per mouse-move, so the containment
//! scan is measured against topologies of increasing size.
//!
//! Run with:
//! ```bash
//! cargo bench --package spanlink-core --bench topology_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spanlink_core::domain::screen::DEFAULT_DPI;
use spanlink_core::domain::topology::ScreenTopology;

fn chained_topology(screens: usize) -> ScreenTopology {
    let mut topo = ScreenTopology::new();
    for i in 0..screens {
        let client = format!("client-{}", i / 2);
        topo.add_screen(
            i as i32 * 1920,
            0,
            1920,
            1080,
            DEFAULT_DPI,
            &client,
            (i as i32 % 2) * 1920,
            0,
        )
        .expect("chained screens never overlap");
    }
    topo
}

fn bench_containment_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("valid_virtual_coordinate");
    for size in [2usize, 8, 32] {
        let topo = chained_topology(size);
        // Probe the last screen so the linear scan does full work.
        let x = (size as i32 - 1) * 1920 + 960;
        group.bench_with_input(BenchmarkId::from_parameter(size), &topo, |b, topo| {
            b.iter(|| topo.valid_virtual_coordinate(black_box(x), black_box(540)));
        });
    }
    group.finish();
}

fn bench_add_screen_overlap_scan(c: &mut Criterion) {
    c.bench_function("add_screen_32_existing", |b| {
        b.iter_batched(
            || chained_topology(32),
            |mut topo| {
                topo.add_screen(
                    black_box(32 * 1920),
                    0,
                    1920,
                    1080,
                    DEFAULT_DPI,
                    "new-client",
                    0,
                    0,
                )
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_containment_lookup, bench_add_screen_overlap_scan);
criterion_main!(benches);
