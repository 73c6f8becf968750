/// One oscillator: a position in the plane and a phase angle.
///
/// The phase is an angle modulo 2π. Only aggregation math treats it as
/// circular; equality checks compare the raw values.
///
/// # Examples
///
/// ```
/// use rs_swarm::models::Point;
///
/// let p = Point::new(0.5, -0.25, 1.0);
/// assert_eq!(p.x, 0.5);
/// assert_eq!(p.y, -0.25);
/// assert_eq!(p.phase, 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub phase: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, phase: f64) -> Self {
        Self { x, y, phase }
    }

    /// Squared planar distance to `(x, y)`.
    #[inline]
    pub fn distance_sq_to(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }

    /// True when the planar coordinates are exactly `(x, y)`.
    #[inline]
    pub fn is_at(&self, x: f64, y: f64) -> bool {
        self.x == x && self.y == y
    }
}

/// Axis-aligned square region used as a quadtree node boundary.
///
/// Each `Quad` has a center position (cx, cy) and a half-size, which is half
/// the length of one side of the square.
///
/// # Examples
///
/// ```
/// use rs_swarm::models::Quad;
///
/// let quad = Quad { cx: 0.0, cy: 0.0, half_size: 2.0 };
/// assert!(quad.contains(1.0, 1.0));
/// assert!(!quad.contains(2.0, 0.0)); // boundary is exclusive
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub cx: f64,        // center x-coordinate
    pub cy: f64,        // center y-coordinate
    pub half_size: f64, // half the length of one side
}

impl Quad {
    pub fn new(cx: f64, cy: f64, half_size: f64) -> Self {
        Self { cx, cy, half_size }
    }

    /// Returns true if the point (x, y) is strictly inside this quad.
    ///
    /// Both bounds are exclusive on both axes, so a point lying exactly on an
    /// edge belongs to no quad at all.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x > self.cx - self.half_size
            && x < self.cx + self.half_size
            && y > self.cy - self.half_size
            && y < self.cy + self.half_size
    }

    /// Subdivides the quad into four smaller quads (NW, NE, SW, SE).
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_swarm::models::Quad;
    ///
    /// let quad = Quad { cx: 0.0, cy: 0.0, half_size: 2.0 };
    /// let (nw, ne, sw, se) = quad.subdivide();
    ///
    /// assert_eq!((nw.cx, nw.cy), (-1.0, 1.0));
    /// assert_eq!((ne.cx, ne.cy), (1.0, 1.0));
    /// assert_eq!((sw.cx, sw.cy), (-1.0, -1.0));
    /// assert_eq!((se.cx, se.cy), (1.0, -1.0));
    /// assert_eq!(nw.half_size, 1.0);
    /// ```
    pub fn subdivide(&self) -> (Quad, Quad, Quad, Quad) {
        let hs = self.half_size / 2.0;
        (
            Quad { cx: self.cx - hs, cy: self.cy + hs, half_size: hs }, // NW
            Quad { cx: self.cx + hs, cy: self.cy + hs, half_size: hs }, // NE
            Quad { cx: self.cx - hs, cy: self.cy - hs, half_size: hs }, // SW
            Quad { cx: self.cx + hs, cy: self.cy - hs, half_size: hs }, // SE
        )
    }

    /// Quadrant slot (NW = 0, NE = 1, SW = 2, SE = 3) for a point, by comparison with the center.
    ///
    /// Points on the center lines are assigned a slot here; whether the child
    /// actually contains them is decided by [`Quad::contains`].
    pub fn quadrant_index(&self, x: f64, y: f64) -> usize {
        let is_east = x >= self.cx;
        let is_north = y >= self.cy;
        match (is_north, is_east) {
            (true, false) => 0,  // NW
            (true, true) => 1,   // NE
            (false, false) => 2, // SW
            (false, true) => 3,  // SE
        }
    }

    /// Pulls `(x, y)` strictly inside the quad, `margin` away from the edges.
    pub fn clamp_inside(&self, x: f64, y: f64, margin: f64) -> (f64, f64) {
        let lo_x = self.cx - self.half_size + margin;
        let hi_x = self.cx + self.half_size - margin;
        let lo_y = self.cy - self.half_size + margin;
        let hi_y = self.cy + self.half_size - margin;
        (x.clamp(lo_x, hi_x), y.clamp(lo_y, hi_y))
    }

    /// Side length of the square.
    #[inline]
    pub fn width(&self) -> f64 {
        2.0 * self.half_size
    }
}
