//! Fixed-step classic Runge-Kutta integration of a [`SwarmSystem`].
//!
//! # Example
//!
//! ```
//! use rs_swarm::solvers::Rk4;
//! use rs_swarm::swarm::{Swarm, SwarmSystem};
//! use rs_swarm::utils::{KernelKind, SwarmConfig};
//!
//! let config = SwarmConfig::new(Some(32), None, None, None, Some(KernelKind::Exact)).with_seed(1);
//! let mut swarm = Swarm::new(config).unwrap();
//! let mut state = vec![0.0; swarm.dimension()];
//! swarm.init(&mut state).unwrap();
//!
//! let mut rk4 = Rk4::new(0.1).unwrap();
//! let steps = rk4.integrate(&mut swarm, &mut state, 0.0, 1.0, |_, _, _, _| Ok(())).unwrap();
//! assert_eq!(steps, 10);
//! ```

use log::{debug, error};

use crate::swarm::SwarmSystem;
use crate::utils::SwarmError;

/// Fraction of a step below which the remaining interval is treated as done.
const STEP_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct Rk4 {
    dt: f64,
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    scratch: Vec<f64>,
}

impl Rk4 {
    pub fn new(dt: f64) -> Result<Self, SwarmError> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(SwarmError::InvalidConfig(format!("time step must be positive, got {}", dt)));
        }
        Ok(Self {
            dt,
            k1: Vec::new(),
            k2: Vec::new(),
            k3: Vec::new(),
            k4: Vec::new(),
            scratch: Vec::new(),
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    fn resize(&mut self, dim: usize) {
        for buf in [&mut self.k1, &mut self.k2, &mut self.k3, &mut self.k4, &mut self.scratch] {
            buf.resize(dim, 0.0);
        }
    }

    /// Advances `state` from `t` by `h`.
    pub fn step<S: SwarmSystem + ?Sized>(
        &mut self,
        system: &S,
        t: f64,
        h: f64,
        state: &mut [f64],
    ) -> Result<(), SwarmError> {
        if state.len() != system.dimension() {
            return Err(SwarmError::InvalidConfig(format!(
                "state has {} scalars, the system expects {}",
                state.len(),
                system.dimension()
            )));
        }
        self.resize(state.len());
        let half = 0.5 * h;

        system.force_field(t, state, &mut self.k1)?;

        offset(&mut self.scratch, state, &self.k1, half);
        system.force_field(t + half, &self.scratch, &mut self.k2)?;

        offset(&mut self.scratch, state, &self.k2, half);
        system.force_field(t + half, &self.scratch, &mut self.k3)?;

        offset(&mut self.scratch, state, &self.k3, h);
        system.force_field(t + h, &self.scratch, &mut self.k4)?;

        let sixth = h / 6.0;
        for (i, y) in state.iter_mut().enumerate() {
            *y += sixth * (self.k1[i] + 2.0 * self.k2[i] + 2.0 * self.k3[i] + self.k4[i]);
        }
        Ok(())
    }

    /// Integrates from `t0` to `t1`, calling `observer(system, step, t, state)` after every step.
    ///
    /// The final step is shortened to land on `t1`. Returns the number of
    /// steps taken. A failing force field is logged with the step number and
    /// time before the error is returned.
    pub fn integrate<S, F>(
        &mut self,
        system: &mut S,
        state: &mut [f64],
        t0: f64,
        t1: f64,
        mut observer: F,
    ) -> Result<usize, SwarmError>
    where
        S: SwarmSystem + ?Sized,
        F: FnMut(&mut S, usize, f64, &[f64]) -> Result<(), SwarmError>,
    {
        if !(t1 >= t0) {
            return Err(SwarmError::InvalidConfig(format!(
                "cannot integrate backwards from {} to {}",
                t0, t1
            )));
        }
        let mut t = t0;
        let mut steps = 0;
        while t1 - t > STEP_TOLERANCE * self.dt {
            let h = self.dt.min(t1 - t);
            if let Err(e) = self.step(&*system, t, h, state) {
                error!("step {} at t = {} failed: {}", steps, t, e);
                return Err(e);
            }
            steps += 1;
            t = t0 + steps as f64 * self.dt;
            if t > t1 {
                t = t1;
            }
            observer(system, steps, t, state)?;
        }
        debug!("integrated {} steps from t = {} to t = {}", steps, t0, t);
        Ok(steps)
    }
}

/// `out = base + scale * slope`
fn offset(out: &mut [f64], base: &[f64], slope: &[f64], scale: f64) {
    for ((o, b), s) in out.iter_mut().zip(base).zip(slope) {
        *o = b + scale * s;
    }
}
