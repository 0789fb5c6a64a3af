use criterion::{black_box, criterion_group, criterion_main, Criterion};
use schelling_city::core::config::SimulationConfig;
use schelling_city::core::types::NEIGHBOUR_RADIUS;
use schelling_city::detection::{Detection, DetectionFrame};
use schelling_city::simulation::SegregationEngine;
use schelling_city::spatial::SparseHashGrid;
use schelling_city::world::Layout;

fn config() -> SimulationConfig {
    SimulationConfig {
        seed: Some(1),
        ..Default::default()
    }
}

fn bench_step(c: &mut Criterion) {
    let layout = Layout::grid(40, 40, 1.0);
    let mut engine = SegregationEngine::new(config(), &layout);
    engine.seed_random_cells();

    c.bench_function("step_40x40", |b| {
        b.iter(|| black_box(engine.step(black_box(0.5))))
    });
}

fn bench_init(c: &mut Criterion) {
    let layout = Layout::grid(40, 40, 1.0);

    c.bench_function("init_40x40_brute_force", |b| {
        b.iter(|| SegregationEngine::new(config(), black_box(&layout)))
    });
    c.bench_function("init_40x40_sparse_grid", |b| {
        b.iter(|| {
            SegregationEngine::with_index(config(), black_box(&layout), SparseHashGrid::new(NEIGHBOUR_RADIUS))
        })
    });
}

fn bench_refresh_schools(c: &mut Criterion) {
    let layout = Layout::grid(40, 40, 1.0);
    let mut engine = SegregationEngine::new(config(), &layout);
    let frame = DetectionFrame {
        image_width: 640,
        image_height: 480,
        detections: (0..8)
            .map(|i| Detection {
                label: ["red", "green", "blue"][i % 3].to_string(),
                bbox: [i as i32 * 80, 100, i as i32 * 80 + 40, 140],
                angle_deg: 0,
            })
            .collect(),
    };

    c.bench_function("refresh_schools_8", |b| {
        b.iter(|| engine.refresh_schools(black_box(Some(&frame))))
    });
}

criterion_group!(benches, bench_step, bench_init, bench_refresh_schools);
criterion_main!(benches);
