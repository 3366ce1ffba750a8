// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Single-Cone Flash Response
//!
//! One L cone, no ambient light, one 560 nm photon on the cone centre at
//! t = 10 ms. With an exponential stimulus kernel (τ_s) and no adaptation the
//! response has a closed form:
//!
//! ```text
//! ΔV(t) = a·τ_V·τ_s/(τ_V − τ_s) · (exp(−t/τ_V) − exp(−t/τ_s)),   t = time since absorption
//! ```

use std::sync::Arc;

use macula_engine::{
    IntegrationMethod, IntegrationParameters, Simulation, SimulationParameters, SimulationReport,
    Termination,
};
use macula_retina::{
    ConeId, ConeLattice, ConeType, GradedConeParameters, LatticeParameters, Photon, Point2,
    ReceptiveField, ScriptedPhotonSource, StimulusKernel,
};

const FLASH_MS: f64 = 10.0;

fn single_cone_lattice() -> Arc<ConeLattice> {
    // 10 µm pitch: only the centre point falls inside a 2 µm macula
    let params = LatticeParameters::uniform(
        [1.0, 1.5, 2.0],
        2.0 / (3.0_f64.sqrt() * 100.0) * 1.0e6,
        ConeType::L,
        ReceptiveField::Fixed { radius_um: 1.0 },
    );
    let lattice = ConeLattice::build(&params).unwrap();
    assert_eq!(lattice.len(), 1);
    Arc::new(lattice)
}

fn flash() -> ScriptedPhotonSource {
    ScriptedPhotonSource::new(vec![Photon::new(560.0, Point2::ORIGIN, FLASH_MS)]).unwrap()
}

fn run(cone_params: GradedConeParameters, method: IntegrationMethod) -> SimulationReport {
    Simulation::graded(
        single_cone_lattice(),
        cone_params,
        IntegrationParameters {
            method,
            step_ms: 0.05,
        },
        SimulationParameters {
            end_time_ms: 100.0,
            reporting_interval_ms: 1.0,
        },
    )
    .unwrap()
    .run(flash())
    .unwrap()
}

#[test]
fn test_flash_response_rises_then_decays() {
    let params = GradedConeParameters::default();
    let report = run(params, IntegrationMethod::RungeKutta4);
    assert_eq!(report.termination, Termination::SourceExhausted);
    assert_eq!(report.stats.absorptions, 1);

    let trace = report.trace(ConeId(0)).unwrap();
    assert_eq!(trace.len(), 101);
    assert!(trace.is_complete());

    // Flat before the flash; the sample at the flash time already carries the
    // stimulus but V has not moved yet
    for sample in trace.samples().iter().filter(|s| s.time_ms <= FLASH_MS) {
        assert_eq!(sample.potential_mv, params.v_rest_mv);
    }
    let baseline = trace.sample_at(0.0).unwrap().release;

    // Sharp rise right after the flash
    let after = trace.sample_at(FLASH_MS + 1.0).unwrap();
    assert!(after.potential_mv > params.v_rest_mv + 0.3);

    // Peak shortly after, then decay back toward rest
    let peak = trace
        .samples()
        .iter()
        .max_by(|a, b| a.potential_mv.total_cmp(&b.potential_mv))
        .unwrap();
    assert!(peak.time_ms > FLASH_MS && peak.time_ms < 30.0, "peak at {}", peak.time_ms);
    assert!(peak.potential_mv - params.v_rest_mv > 1.0);

    let end = trace.last().unwrap();
    assert_eq!(end.time_ms, 100.0);
    assert!((end.potential_mv - params.v_rest_mv).abs() < 0.1);

    // Release follows: transient increase, then back near baseline
    let peak_release = trace.peak_release().unwrap();
    assert!(peak_release.release > baseline);
    assert!(peak_release.time_ms > FLASH_MS);
    assert!((end.release - baseline).abs() < 0.1 * (peak_release.release - baseline));
}

#[test]
fn test_flash_response_matches_closed_form_without_adaptation() {
    let params = GradedConeParameters {
        adaptation_gain: 0.0,
        adaptation_feedback: 0.0,
        kernel: StimulusKernel::Exponential { tau_ms: 5.0 },
        ..Default::default()
    };
    let a = params.stimulus_amplitude;
    let (tau_v, tau_s) = (params.tau_v_ms, params.kernel.tau_ms());
    let closed_form = |t: f64| {
        a * tau_v * tau_s / (tau_v - tau_s) * ((-t / tau_v).exp() - (-t / tau_s).exp())
    };

    for (method, tolerance) in [
        (IntegrationMethod::RungeKutta4, 1e-6),
        (IntegrationMethod::ExponentialEuler, 3e-2),
    ] {
        let report = run(params, method);
        let trace = report.trace(ConeId(0)).unwrap();
        for sample in trace.samples().iter().filter(|s| s.time_ms >= FLASH_MS) {
            let expected = params.v_rest_mv + closed_form(sample.time_ms - FLASH_MS);
            assert!(
                (sample.potential_mv - expected).abs() < tolerance,
                "{:?} at t={}: {} vs {}",
                method,
                sample.time_ms,
                sample.potential_mv,
                expected
            );
        }
    }
}

#[test]
fn test_pure_leak_decays_monotonically() {
    let params = GradedConeParameters {
        adaptation_gain: 0.0,
        adaptation_feedback: 0.0,
        ..Default::default()
    };
    let report = run(params, IntegrationMethod::RungeKutta4);
    let trace = report.trace(ConeId(0)).unwrap();

    // Past the stimulus tail the cone only leaks: monotone toward V_rest, rate 1/τ_V
    let tail: Vec<f64> = trace
        .samples()
        .iter()
        .filter(|s| s.time_ms >= 60.0)
        .map(|s| s.potential_mv - params.v_rest_mv)
        .collect();
    assert!(tail.iter().all(|dv| *dv > 0.0));
    assert!(tail.windows(2).all(|w| w[1] < w[0]));

    let ratio = tail[10] / tail[0];
    let expected = (-10.0 / params.tau_v_ms).exp();
    assert!((ratio - expected).abs() < 0.01, "ratio {} vs {}", ratio, expected);
}

#[test]
fn test_photon_off_the_receptive_field_is_ignored() {
    let source =
        ScriptedPhotonSource::new(vec![Photon::new(560.0, Point2::new(1.5, 0.0), FLASH_MS)])
            .unwrap();
    let report = Simulation::graded(
        single_cone_lattice(),
        GradedConeParameters::default(),
        IntegrationParameters::default(),
        SimulationParameters::default(),
    )
    .unwrap()
    .run(source)
    .unwrap();

    assert_eq!(report.stats.photons_unabsorbed, 1);
    let trace = report.trace(ConeId(0)).unwrap();
    let rest = trace.samples()[0].potential_mv;
    assert!(trace.samples().iter().all(|s| s.potential_mv == rest));
}
