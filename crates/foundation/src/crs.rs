//! Planar coordinate reference system for pixel-space maps.
//!
//! The viewer shows a raw image rather than the globe, so map coordinates are
//! image pixel coordinates: `lng` is the column (x) and `lat` is the row (y).
//! The projection is an affine transform `p' = a * p + b` per axis, identity
//! by default.

use crate::bounds::Aabb2;

/// Geographic-style point as the map widget reports it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Corner pair in map coordinates, `[[lat1, lng1], [lat2, lng2]]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLngBounds {
    pub corner1: LatLng,
    pub corner2: LatLng,
}

impl LatLngBounds {
    pub fn new(corner1: LatLng, corner2: LatLng) -> Self {
        Self { corner1, corner2 }
    }

    pub fn south(&self) -> f64 {
        self.corner1.lat.min(self.corner2.lat)
    }

    pub fn north(&self) -> f64 {
        self.corner1.lat.max(self.corner2.lat)
    }

    pub fn west(&self) -> f64 {
        self.corner1.lng.min(self.corner2.lng)
    }

    pub fn east(&self) -> f64 {
        self.corner1.lng.max(self.corner2.lng)
    }

    pub fn to_array(&self) -> [[f64; 2]; 2] {
        [
            [self.corner1.lat, self.corner1.lng],
            [self.corner2.lat, self.corner2.lng],
        ]
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlanarCrs {
    pub scale_x: f64,
    pub offset_x: f64,
    pub scale_y: f64,
    pub offset_y: f64,
}

impl Default for PlanarCrs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PlanarCrs {
    pub const IDENTITY: PlanarCrs = PlanarCrs {
        scale_x: 1.0,
        offset_x: 0.0,
        scale_y: 1.0,
        offset_y: 0.0,
    };

    /// Leaflet `L.Transformation(a, b, c, d)` coefficients.
    pub fn transformation(&self) -> [f64; 4] {
        [self.scale_x, self.offset_x, self.scale_y, self.offset_y]
    }

    pub fn project(&self, p: LatLng) -> [f64; 2] {
        [
            self.scale_x * p.lng + self.offset_x,
            self.scale_y * p.lat + self.offset_y,
        ]
    }

    pub fn unproject(&self, xy: [f64; 2]) -> LatLng {
        LatLng {
            lng: (xy[0] - self.offset_x) / self.scale_x,
            lat: (xy[1] - self.offset_y) / self.scale_y,
        }
    }

    /// Pixel rectangle covered by map bounds (west, south) .. (east, north).
    pub fn bounds_to_pixels(&self, b: &LatLngBounds) -> Aabb2 {
        let a = self.project(LatLng::new(b.south(), b.west()));
        let c = self.project(LatLng::new(b.north(), b.east()));
        Aabb2::from_extents(a[0].min(c[0]), a[1].min(c[1]), a[0].max(c[0]), a[1].max(c[1]))
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: -8.0,
            max: 24.0,
        }
    }
}

impl ZoomLimits {
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.max(self.min).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_uses_pixels_as_map_coordinates() {
        let crs = PlanarCrs::default();
        assert_eq!(crs.project(LatLng::new(20.0, 10.0)), [10.0, 20.0]);
        assert_eq!(crs.unproject([10.0, 20.0]), LatLng::new(20.0, 10.0));
        assert_eq!(crs.transformation(), [1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn bounds_map_west_south_to_min() {
        let b = LatLngBounds::new(LatLng::new(80.0, 100.0), LatLng::new(-5.0, -10.0));
        let px = PlanarCrs::default().bounds_to_pixels(&b);
        assert_eq!(px.to_extents(), (-10.0, -5.0, 100.0, 80.0));
    }

    #[test]
    fn zoom_limits_default_and_clamp() {
        let z = ZoomLimits::default();
        assert_eq!(z.clamp(-20.0), -8.0);
        assert_eq!(z.clamp(30.0), 24.0);
        assert_eq!(z.clamp(3.5), 3.5);
    }
}
