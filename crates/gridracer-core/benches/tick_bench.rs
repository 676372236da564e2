use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use gridracer_core::car::MlpPolicy;
use gridracer_core::track::{Track, TrackGeometry, TrackLayout};
use gridracer_core::{Population, PopulationConfig};
use std::time::Duration;

/// Ring track: a two-cell wide corridor around a solid block
fn ring_track(rows: usize, cols: usize) -> Track {
    let layout = (0..rows)
        .map(|row| {
            (0..cols)
                .map(|col| {
                    let border = row == 0 || col == 0 || row == rows - 1 || col == cols - 1;
                    let inner = row > 2 && row < rows - 3 && col > 2 && col < cols - 3;
                    u32::from(!border && !inner)
                })
                .collect()
        })
        .collect();
    Track::from_layout(&TrackLayout::new(layout, Some([1, 1])), TrackGeometry::default())
        .expect("valid bench track")
}

fn bench_population_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("population_tick");
    group.sample_size(30);
    group.measurement_time(Duration::from_secs(10));

    let steps = 256;
    for &size in &[50_usize, 200, 1000] {
        group.bench_function(format!("steps{}_cars{}", steps, size), |b| {
            b.iter_batched(
                || {
                    let config = PopulationConfig {
                        size,
                        seed: 0xBEEF,
                        ..Default::default()
                    };
                    Population::new(config, ring_track(27, 19), MlpPolicy::new(5, &[5]))
                        .expect("population")
                },
                |mut population| {
                    for _ in 0..steps {
                        population.step_tick().expect("tick");
                    }
                    population
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_population_ticks);
criterion_main!(benches);
