//! Runs a swarm from random initial conditions and writes its first and last states.
//!
//! ```text
//! RUST_LOG=info cargo run --release --example swarm_simulation -- [out_dir] [threads]
//! ```

use std::env;
use std::path::PathBuf;

use log::info;
use rs_swarm::solvers::Rk4;
use rs_swarm::swarm::{write_points, Swarm, SwarmSystem};
use rs_swarm::utils::{BoundaryPolicy, SwarmConfig, SwarmError};

const DT: f64 = 0.1;
const T_END: f64 = 10.0;
const FRAME_EVERY: usize = 10;

fn main() -> Result<(), SwarmError> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "swarm_output".to_string()));
    let threads = args.next().and_then(|t| t.parse().ok()).unwrap_or(4);

    let config = SwarmConfig::default()
        .with_threads(threads)
        .with_boundary_policy(BoundaryPolicy::Clamp);
    let mut swarm = Swarm::new(config)?.with_frames(out_dir.join("frames"))?;

    let mut state = vec![0.0; swarm.dimension()];
    swarm.init(&mut state)?;
    write_points(out_dir.join("init.csv"), &state)?;
    swarm.record_frame(0.0, &state)?;

    let mut rk4 = Rk4::new(DT)?;
    rk4.integrate(&mut swarm, &mut state, 0.0, T_END, |swarm, step, t, state| {
        if step % FRAME_EVERY == 0 {
            info!(
                "t = {:.1}: radius in [{:.4}, {:.4}]",
                t,
                swarm.min_radius(state),
                swarm.max_radius(state)
            );
            swarm.record_frame(t, state)?;
        }
        Ok(())
    })?;

    write_points(out_dir.join("final.csv"), &state)?;
    info!("wrote results to {}", out_dir.display());
    Ok(())
}
