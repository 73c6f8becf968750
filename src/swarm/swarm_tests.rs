use std::borrow::Cow;
use std::f64::consts::TAU;
use std::fs;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assert_fields_eq;
use crate::swarm::{
    bounded_positions, max_radius, min_radius, sample_initial_state, seeded_rng, swarm_center,
    write_points, FrameWriter, Swarm, SwarmSystem, WorkerContext,
};
use crate::utils::{BoundaryPolicy, KernelKind, SwarmConfig, SwarmError};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(n: usize, kernel: KernelKind) -> SwarmConfig {
    SwarmConfig::new(Some(n), Some(1.0), Some(-0.1), Some(0.5), Some(kernel)).with_seed(42)
}

fn initial_state(swarm: &mut Swarm) -> Vec<f64> {
    let mut state = vec![0.0; swarm.dimension()];
    swarm.init(&mut state).unwrap();
    state
}

fn field(swarm: &Swarm, state: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; state.len()];
    swarm.force_field(0.0, state, &mut out).unwrap();
    out
}

#[test]
fn test_worker_context() {
    assert!(matches!(WorkerContext::new(0), Err(SwarmError::InvalidConfig(_))));

    let serial = WorkerContext::new(1).unwrap();
    assert!(!serial.is_parallel());
    assert_eq!(serial.threads(), 1);

    let pool = WorkerContext::new(3).unwrap();
    assert!(pool.is_parallel());
    assert_eq!(pool.install(rayon::current_num_threads), 3);
}

#[test]
fn test_initial_state_lies_in_unit_disk() {
    let state = sample_initial_state(500, &mut StdRng::seed_from_u64(3));
    assert_eq!(state.len(), 1500);
    for p in state.chunks(3) {
        assert!(p[0] * p[0] + p[1] * p[1] <= 1.0);
        assert!((0.0..TAU).contains(&p[2]));
    }
}

#[test]
fn test_seeded_init_is_reproducible() {
    let mut a = Swarm::new(config(64, KernelKind::Exact)).unwrap();
    let mut b = Swarm::new(config(64, KernelKind::Approximate)).unwrap();
    assert_eq!(initial_state(&mut a), initial_state(&mut b));

    let from_rng = sample_initial_state(64, &mut seeded_rng(Some(42)));
    assert_eq!(initial_state(&mut a), from_rng);
}

#[test]
fn test_new_rejects_invalid_config() {
    let bad = SwarmConfig { theta: -1.0, ..config(8, KernelKind::Exact) };
    assert!(matches!(Swarm::new(bad), Err(SwarmError::InvalidConfig(_))));
}

#[test]
fn test_force_field_checks_dimensions() {
    let swarm = Swarm::new(config(4, KernelKind::Exact)).unwrap();
    let mut out = vec![0.0; 12];
    assert!(matches!(
        swarm.force_field(0.0, &[0.0; 9], &mut out),
        Err(SwarmError::InvalidConfig(_))
    ));
}

#[test]
fn test_threaded_exact_matches_serial() {
    init_logger();
    let mut serial = Swarm::new(config(128, KernelKind::Exact)).unwrap();
    let threaded = Swarm::new(config(128, KernelKind::Exact).with_threads(4)).unwrap();
    let state = initial_state(&mut serial);
    assert_fields_eq(&field(&serial, &state), &field(&threaded, &state), 1e-9, "threaded exact");
}

#[test]
fn test_threaded_approximate_matches_serial() {
    let mut serial = Swarm::new(config(128, KernelKind::Approximate)).unwrap();
    let threaded = Swarm::new(config(128, KernelKind::Approximate).with_threads(4)).unwrap();
    let state = initial_state(&mut serial);
    assert_eq!(field(&serial, &state), field(&threaded, &state));
}

#[test]
fn test_tiny_theta_reproduces_exact_field() {
    let mut exact = Swarm::new(config(100, KernelKind::Exact)).unwrap();
    let approximate = Swarm::new(SwarmConfig { theta: 1e-12, ..config(100, KernelKind::Approximate) }).unwrap();
    let state = initial_state(&mut exact);
    assert_fields_eq(&field(&exact, &state), &field(&approximate, &state), 1e-9, "tiny theta");
}

fn drifted_state() -> Vec<f64> {
    vec![0.1, 0.2, 0.0, -0.3, 0.5, 1.0, 2.5, -0.4, 2.0, 0.6, -0.7, 3.0]
}

#[test]
fn test_reject_policy_reports_drifting_entity() {
    init_logger();
    let swarm = Swarm::new(config(4, KernelKind::Approximate)).unwrap();
    let mut out = vec![0.0; 12];
    match swarm.force_field(0.0, &drifted_state(), &mut out) {
        Err(SwarmError::OutOfBounds { entity, x, .. }) => {
            assert_eq!(entity, Some(2));
            assert_eq!(x, 2.5);
        }
        other => panic!("expected OutOfBounds, got {:?}", other),
    }
}

#[test]
fn test_clamp_policy_keeps_drifting_entity() {
    init_logger();
    let swarm = Swarm::new(
        config(4, KernelKind::Approximate).with_boundary_policy(BoundaryPolicy::Clamp),
    )
    .unwrap();
    let velocity = field(&swarm, &drifted_state());
    assert!(velocity.iter().all(|v| v.is_finite()));
}

#[test]
fn test_exact_kernel_ignores_root_region() {
    let swarm = Swarm::new(config(4, KernelKind::Exact)).unwrap();
    let velocity = field(&swarm, &drifted_state());
    assert!(velocity.iter().all(|v| v.is_finite()));
}

#[test]
fn test_bounded_positions() {
    let reject = config(4, KernelKind::Approximate);
    let clamp = reject.with_boundary_policy(BoundaryPolicy::Clamp);
    let inside = vec![0.1, 0.2, 0.0, -0.3, 0.5, 1.0];
    let drifted = drifted_state();

    assert!(matches!(bounded_positions(&inside, &clamp).unwrap(), Cow::Borrowed(_)));
    assert!(matches!(bounded_positions(&drifted, &reject).unwrap(), Cow::Borrowed(_)));

    let clamped = bounded_positions(&drifted, &clamp).unwrap();
    assert!(matches!(clamped, Cow::Owned(_)));
    assert!(clamped[6] < 2.0 && clamped[6] > 1.99);
    assert_eq!(clamped[7], -0.4);
    assert_eq!(clamped[8], 2.0);
    assert_eq!(&clamped[..6], &drifted[..6]);
}

#[test]
fn test_radius_diagnostics() {
    let state = [2.0, 0.0, 0.0, -2.0, 0.0, 1.0, 0.0, 0.5, 2.0, 0.0, -0.5, 3.0];
    let (cx, cy) = swarm_center(&state);
    assert_relative_eq!(cx, 0.0, epsilon = 1e-12);
    assert_relative_eq!(cy, 0.0, epsilon = 1e-12);
    assert_relative_eq!(min_radius(&state), 0.5, epsilon = 1e-12);
    assert_relative_eq!(max_radius(&state), 2.0, epsilon = 1e-12);

    let swarm = Swarm::new(config(4, KernelKind::Exact)).unwrap();
    assert_relative_eq!(swarm.min_radius(&state), 0.5, epsilon = 1e-12);
    assert_relative_eq!(swarm.max_radius(&state), 2.0, epsilon = 1e-12);
}

#[test]
fn test_frames_are_written_under_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut swarm = Swarm::new(config(5, KernelKind::Exact))
        .unwrap()
        .with_frames(dir.path().join("frames"))
        .unwrap();
    let state = initial_state(&mut swarm);
    swarm.record_frame(0.0, &state).unwrap();
    swarm.record_frame(0.5, &state).unwrap();

    let first = fs::read_to_string(dir.path().join("frames").join("fr.0")).unwrap();
    let mut lines = first.lines();
    assert_eq!(lines.next(), Some("# Time: 0"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 5);
    for (row, p) in rows.iter().zip(state.chunks(3)) {
        let values: Vec<f64> = row.split(' ').map(|v| v.parse().unwrap()).collect();
        assert_eq!(values, p.to_vec());
    }

    let second = fs::read_to_string(dir.path().join("frames").join("fr.1")).unwrap();
    assert!(second.starts_with("# Time: 0.5\n"));
}

#[test]
fn test_record_frame_without_writer_is_noop() {
    let mut swarm = Swarm::new(config(3, KernelKind::Exact)).unwrap();
    assert!(swarm.record_frame(0.0, &[0.0; 9]).is_ok());
}

#[test]
fn test_frame_writer_counts_frames() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = FrameWriter::new(dir.path()).unwrap();
    assert_eq!(writer.frames_written(), 0);
    let path = writer.write_frame(1.0, &[0.0, 0.0, 0.0]).unwrap();
    assert_eq!(path, dir.path().join("fr.0"));
    assert_eq!(writer.frames_written(), 1);
    assert_eq!(writer.dir(), dir.path());
}

#[test]
fn test_write_points_is_comma_separated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.csv");
    write_points(&path, &[0.5, -0.25, 1.0, 0.0, 1.0, 2.0]).unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "0.5,-0.25,1\n0,1,2\n");
}

#[test]
fn test_written_phases_are_wrapped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("final.csv");
    write_points(&path, &[0.0, 0.0, TAU + 1.0, 0.0, 0.0, -1.0]).unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    let phases: Vec<f64> = contents
        .lines()
        .map(|row| row.rsplit(',').next().unwrap().parse().unwrap())
        .collect();
    assert_relative_eq!(phases[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(phases[1], TAU - 1.0, epsilon = 1e-12);
}
