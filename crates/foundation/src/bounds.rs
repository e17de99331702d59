/// Axis-aligned rectangle in image pixel space.
///
/// `min` is the (x, y) corner closest to the image origin, `max` the far
/// corner. Rectangles are not normalized on construction: a caller may hand in
/// an inverted rectangle and it is clamped per-coordinate as given.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    pub fn from_extents(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Aabb2 {
            min: [xmin, ymin],
            max: [xmax, ymax],
        }
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// Returns `(xmin, ymin, xmax, ymax)`.
    pub fn to_extents(&self) -> (f64, f64, f64, f64) {
        (self.min[0], self.min[1], self.max[0], self.max[1])
    }

    pub fn contains(&self, other: &Aabb2) -> bool {
        other.min[0] >= self.min[0]
            && other.min[1] >= self.min[1]
            && other.max[0] <= self.max[0]
            && other.max[1] <= self.max[1]
    }
}

/// Known size of the raw (undecimated) image, in pixels.
///
/// Zero until the server has reported the extent of a loaded image.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RawExtent {
    pub nx: u64,
    pub ny: u64,
}

impl RawExtent {
    pub fn new(nx: u64, ny: u64) -> Self {
        RawExtent { nx, ny }
    }

    pub fn is_known(&self) -> bool {
        self.nx > 0 && self.ny > 0
    }

    pub fn as_rect(&self) -> Aabb2 {
        Aabb2::from_extents(0.0, 0.0, self.nx as f64, self.ny as f64)
    }
}

fn clamp(v: f64, hi: f64) -> f64 {
    // NaN collapses to the lower edge.
    if v.is_nan() { 0.0 } else { v.max(0.0).min(hi) }
}

/// Clamp a requested view rectangle to `[0, nx] x [0, ny]`.
///
/// Never fails: anything outside the extent is pulled onto its edge. Before an
/// image is loaded the extent is zero and every rectangle collapses to the
/// origin.
pub fn sanitize(rect: Aabb2, extent: RawExtent) -> Aabb2 {
    let nx = extent.nx as f64;
    let ny = extent.ny as f64;
    Aabb2 {
        min: [clamp(rect.min[0], nx), clamp(rect.min[1], ny)],
        max: [clamp(rect.max[0], nx), clamp(rect.max[1], ny)],
    }
}
