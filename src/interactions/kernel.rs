use crate::models::{Point, STRIDE};
use crate::utils::{SwarmConfig, SwarmError, MIN_SEPARATION, NATURAL_FREQUENCY};

/// Constants of the velocity law.
///
/// `j` scales the phase-dependent attraction, `k` drives phase
/// synchronisation, `n` normalises by swarm size and `omega` is the natural
/// frequency added to every phase rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionParams {
    pub j: f64,
    pub k: f64,
    pub n: usize,
    pub omega: f64,
    pub min_separation: f64,
}

impl InteractionParams {
    pub fn new(j: f64, k: f64, n: usize) -> Self {
        Self {
            j,
            k,
            n,
            omega: NATURAL_FREQUENCY,
            min_separation: MIN_SEPARATION,
        }
    }

    pub fn from_config(config: &SwarmConfig) -> Self {
        Self {
            j: config.j,
            k: config.k,
            n: config.n,
            omega: config.omega,
            min_separation: config.min_separation,
        }
    }
}

/// Velocity and phase-rate contribution of one source on one receiver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Contribution {
    pub vx: f64,
    pub vy: f64,
    pub vphase: f64,
}

impl Contribution {
    #[inline]
    pub fn scaled(self, mass: f64) -> Self {
        Self {
            vx: self.vx * mass,
            vy: self.vy * mass,
            vphase: self.vphase * mass,
        }
    }
}

impl std::ops::AddAssign for Contribution {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.vx += rhs.vx;
        self.vy += rhs.vy;
        self.vphase += rhs.vphase;
    }
}

/// Contribution of a unit-mass source at `(sx, sy, sphase)` on `receiver`.
///
/// ```text
/// a  = ((1 + J cos dθ) / r - 1 / r²) / N
/// vx = a dx,  vy = a dy,  vθ = K sin(dθ) / (N r)
/// ```
///
/// Separations below `params.min_separation` are clamped to it, so the
/// result is always finite.
///
/// # Examples
///
/// ```
/// use rs_swarm::interactions::{pairwise, InteractionParams};
/// use rs_swarm::models::Point;
///
/// let params = InteractionParams::new(0.0, 0.0, 2);
/// let receiver = Point::new(0.0, 0.0, 0.0);
///
/// // Beyond unit separation the source attracts...
/// assert!(pairwise(&params, receiver, 2.0, 0.0, 0.0).vx > 0.0);
/// // ...inside it repels.
/// assert!(pairwise(&params, receiver, 0.5, 0.0, 0.0).vx < 0.0);
/// ```
#[inline]
pub fn pairwise(params: &InteractionParams, receiver: Point, sx: f64, sy: f64, sphase: f64) -> Contribution {
    let inv_n = 1.0 / params.n as f64;
    let dx = sx - receiver.x;
    let dy = sy - receiver.y;
    let dth = sphase - receiver.phase;
    let min_sq = params.min_separation * params.min_separation;
    let r_sq = (dx * dx + dy * dy).max(min_sq);
    let inv_r_sq = 1.0 / r_sq;
    let inv_r = inv_r_sq.sqrt();
    let a = inv_n * ((1.0 + params.j * dth.cos()) * inv_r - inv_r_sq);
    Contribution {
        vx: a * dx,
        vy: a * dy,
        vphase: params.k * inv_n * dth.sin() * inv_r,
    }
}

/// Sets every entity to zero velocity and the natural phase rate.
pub fn reset_velocity_field(out: &mut [f64], omega: f64) {
    for slot in out.chunks_exact_mut(STRIDE) {
        slot[0] = 0.0;
        slot[1] = 0.0;
        slot[2] = omega;
    }
}

pub(crate) fn check_layout(state: &[f64], out: &[f64]) -> Result<(), SwarmError> {
    if state.len() % STRIDE != 0 {
        return Err(SwarmError::InvalidConfig(format!(
            "state length {} is not a multiple of {}",
            state.len(),
            STRIDE
        )));
    }
    if state.len() != out.len() {
        return Err(SwarmError::InvalidConfig(format!(
            "state has {} scalars but the output buffer has {}",
            state.len(),
            out.len()
        )));
    }
    Ok(())
}
