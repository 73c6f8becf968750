//! Flat state layout shared by the kernels, the exchange layer and the integrator.
//!
//! Entity `i` occupies scalars `3i` (x), `3i + 1` (y) and `3i + 2` (phase).
//! The order of entities is their identity for the whole run.

use crate::models::Point;

/// Number of scalars stored per entity.
pub const STRIDE: usize = 3;

/// Read-only view over a flat `[x0, y0, phase0, x1, ...]` buffer.
///
/// # Examples
///
/// ```
/// use rs_swarm::models::SwarmState;
///
/// let raw = [0.0, 1.0, 0.5, -1.0, 0.0, 2.0];
/// let state = SwarmState::new(&raw);
/// assert_eq!(state.len(), 2);
/// assert_eq!(state.point(1).x, -1.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SwarmState<'a> {
    data: &'a [f64],
}

impl<'a> SwarmState<'a> {
    /// Wraps a buffer whose length is a multiple of three.
    ///
    /// Trailing scalars that do not form a whole entity are ignored.
    pub fn new(data: &'a [f64]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len() / STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn point(&self, i: usize) -> Point {
        let base = STRIDE * i;
        Point::new(self.data[base], self.data[base + 1], self.data[base + 2])
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + 'a {
        self.data
            .chunks_exact(STRIDE)
            .map(|c| Point::new(c[0], c[1], c[2]))
    }

    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }

    /// Mean position of all entities.
    pub fn center(&self) -> (f64, f64) {
        let n = self.len() as f64;
        let (sx, sy) = self
            .points()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        (sx / n, sy / n)
    }
}

/// Flattens points into the state layout.
pub fn flatten_points(points: &[Point]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y, p.phase]).collect()
}
