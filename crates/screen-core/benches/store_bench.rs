//! Criterion benchmarks for [`ScreenStore`] lookups and scan reconciliation.
//!
//! Coordinate lookups run on every pointer motion that crosses a screen
//! boundary, so they must stay cheap even with many screens attached.
//!
//! Run with:
//! ```bash
//! cargo bench --package screen-core --bench store_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use screen_core::{
    commit_plan, group_outputs, plan_scan, Area, DefaultMergePolicy, OutputDescriptor, Screen,
    ScreenStore,
};

// ── Fixture builders ──────────────────────────────────────────────────────────

/// `n` 1920×1080 outputs side by side starting at the origin.
fn row_of_outputs(n: usize) -> Vec<OutputDescriptor> {
    (0..n)
        .map(|i| {
            OutputDescriptor::connected(
                i as u32 + 1,
                format!("DP-{}", i + 1),
                Area::new(1920 * i as i32, 0, 1920, 1080),
            )
        })
        .collect()
}

fn store_with_n_screens(n: usize) -> ScreenStore {
    let mut store = ScreenStore::new();
    for output in row_of_outputs(n) {
        let id = store.allocate_id();
        store.add(Screen::native(id, vec![output]));
    }
    store
}

// ── Benchmarks: lookups ───────────────────────────────────────────────────────

fn bench_by_coordinate_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("by_coordinate_scaling");

    for &count in &[1usize, 4, 8, 16] {
        let store = store_with_n_screens(count);
        // Worst case: the point lies in the last screen of the linear scan.
        let x = 1920 * (count as i32 - 1) + 960;

        group.bench_with_input(BenchmarkId::new("screens", count), &x, |b, &x| {
            b.iter(|| store.by_coordinate(black_box(x), black_box(540)))
        });
    }

    group.finish();
}

fn bench_by_area_overlap(c: &mut Criterion) {
    let store = store_with_n_screens(8);
    let mut group = c.benchmark_group("by_area_overlap");

    group.bench_function("straddling_two_screens", |b| {
        let window = Area::new(1920 * 3 - 400, 100, 800, 600);
        b.iter(|| store.by_area_overlap(black_box(&window)))
    });

    group.finish();
}

// ── Benchmarks: scan ──────────────────────────────────────────────────────────

fn bench_rescan_unchanged_topology(c: &mut Criterion) {
    let outputs = row_of_outputs(8);
    let mut store = ScreenStore::new();
    let groups = group_outputs(&outputs, &DefaultMergePolicy);
    if let Ok(plan) = plan_scan(&store, groups) {
        commit_plan(&mut store, plan);
    }

    c.bench_function("rescan_unchanged_8_outputs", |b| {
        b.iter(|| {
            let groups = group_outputs(black_box(&outputs), &DefaultMergePolicy);
            plan_scan(&store, groups)
        })
    });
}

criterion_group!(
    benches,
    bench_by_coordinate_scaling,
    bench_by_area_overlap,
    bench_rescan_unchanged_topology
);
criterion_main!(benches);
