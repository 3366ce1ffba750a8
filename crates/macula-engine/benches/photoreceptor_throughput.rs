// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Photoreceptor Throughput Microbenchmarks
//!
//! Purpose:
//! - Track the hot paths of a run: receptive-field lookup, per-photon
//!   absorption and the parallel end-of-run flush.
//!
//! Notes:
//! - Fixed seeds and a reduced macula keep runtime low and inputs stable.
//! - No I/O.

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use macula_engine::{IntegrationMethod, IntegrationParameters, Simulation, SimulationParameters};
use macula_retina::{
    ConeLattice, Footprint, GradedConeParameters, LatticeParameters, Photon,
    PhotonSourceParameters, PoissonPhotonSource, Point2,
};

/// Macula scaled down by `scale` (1.0 = full 2750 µm radius)
fn scaled_lattice(scale: f64) -> Arc<ConeLattice> {
    let mut params = LatticeParameters::default();
    params.foveola.outer_radius_um *= scale;
    params.fovea.outer_radius_um *= scale;
    params.parafovea.outer_radius_um *= scale;
    Arc::new(ConeLattice::build(&params).expect("valid lattice parameters"))
}

fn ambient_photons(radius_um: f64, count: usize) -> Vec<Photon> {
    PoissonPhotonSource::new(PhotonSourceParameters {
        rate_per_ms: 200.0,
        footprint: Footprint::UniformDisk {
            center: Point2::ORIGIN,
            radius_um,
        },
        seed: 7,
        max_events: Some(count as u64),
        ..Default::default()
    })
    .expect("valid source parameters")
    .collect()
}

fn bench_receptive_field_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("receptive_field_lookup");
    group.sample_size(20);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(1));

    let lattice = scaled_lattice(0.05);
    let photons = ambient_photons(0.05 * 2750.0, 10_000);
    group.throughput(Throughput::Elements(photons.len() as u64));

    group.bench_function("cones_at_into_10k", |b| {
        let mut hits = Vec::new();
        b.iter(|| {
            let mut total = 0usize;
            for photon in &photons {
                lattice.cones_at_into(black_box(photon.position), &mut hits);
                total += hits.len();
            }
            black_box(total)
        });
    });

    group.finish();
}

fn bench_simulation_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_run");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(3));

    let lattice = scaled_lattice(0.05);
    let photons = ambient_photons(0.05 * 2750.0, 5_000);
    let end_time_ms = photons.last().map_or(1.0, |p| p.arrival_ms.ceil());
    group.throughput(Throughput::Elements(photons.len() as u64));

    for method in [IntegrationMethod::RungeKutta4, IntegrationMethod::ExponentialEuler] {
        group.bench_with_input(
            BenchmarkId::new("ambient_5k", format!("{:?}", method)),
            &method,
            |b, &method| {
                b.iter(|| {
                    let report = Simulation::graded(
                        Arc::clone(&lattice),
                        GradedConeParameters::default(),
                        IntegrationParameters {
                            method,
                            step_ms: 0.1,
                        },
                        SimulationParameters {
                            end_time_ms,
                            reporting_interval_ms: 1.0,
                        },
                    )
                    .expect("valid simulation parameters")
                    .run(black_box(photons.iter().copied()))
                    .expect("run completes");
                    black_box(report.stats.samples_recorded)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_receptive_field_lookup, bench_simulation_run);
criterion_main!(benches);
