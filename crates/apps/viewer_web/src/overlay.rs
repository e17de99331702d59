use foundation::LatLngBounds;
use streaming::RasterBlob;

use crate::controller::MapHost;

/// Keeps at most one image overlay on the map.
///
/// The viewport is fitted to the first overlay only; later refreshes leave the
/// user's pan/zoom alone.
#[derive(Debug)]
pub struct OverlayManager<O> {
    current: Option<O>,
    bounds: Option<LatLngBounds>,
    fitted: bool,
}

impl<O> Default for OverlayManager<O> {
    fn default() -> Self {
        Self {
            current: None,
            bounds: None,
            fitted: false,
        }
    }
}

impl<O> OverlayManager<O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_overlay(&self) -> bool {
        self.current.is_some()
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.bounds
    }

    pub fn refresh<H>(
        &mut self,
        host: &mut H,
        image: &RasterBlob,
        bounds: LatLngBounds,
    ) -> Result<(), H::Error>
    where
        H: MapHost<Overlay = O>,
    {
        if let Some(prev) = self.current.take() {
            host.remove_overlay(prev);
            self.bounds = None;
        }
        let overlay = host.add_overlay(image, &bounds)?;
        self.current = Some(overlay);
        self.bounds = Some(bounds);

        if !self.fitted {
            host.fit_bounds(&bounds);
            self.fitted = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::OverlayManager;
    use crate::testing::{HostCall, RecordingHost};
    use foundation::{LatLng, LatLngBounds};
    use streaming::{PNG_CONTENT_TYPE, decode_chunked};

    fn bounds(n: f64) -> LatLngBounds {
        LatLngBounds::new(LatLng::new(0.0, 0.0), LatLng::new(n, n))
    }

    #[test]
    fn replaces_previous_overlay_before_attaching() {
        let mut host = RecordingHost::default();
        let mut mgr = OverlayManager::new();
        let img = decode_chunked("iVBORw==", PNG_CONTENT_TYPE, 512).expect("decode");

        mgr.refresh(&mut host, &img, bounds(10.0)).expect("refresh");
        mgr.refresh(&mut host, &img, bounds(20.0)).expect("refresh");
        mgr.refresh(&mut host, &img, bounds(30.0)).expect("refresh");

        assert_eq!(
            host.calls,
            vec![
                HostCall::Add(0),
                HostCall::Fit,
                HostCall::Remove(0),
                HostCall::Add(1),
                HostCall::Remove(1),
                HostCall::Add(2),
            ]
        );
        assert_eq!(mgr.bounds(), Some(bounds(30.0)));
    }

    #[test]
    fn failed_first_attach_still_fits_on_next_success() {
        let mut host = RecordingHost::default();
        let mut mgr: OverlayManager<u32> = OverlayManager::new();
        let img = decode_chunked("iVBORw==", PNG_CONTENT_TYPE, 512).expect("decode");

        host.fail_next_add = true;
        assert!(mgr.refresh(&mut host, &img, bounds(10.0)).is_err());
        assert!(!mgr.has_overlay());
        assert_eq!(host.fit_count(), 0);

        mgr.refresh(&mut host, &img, bounds(10.0)).expect("refresh");
        assert_eq!(host.fit_count(), 1);
    }
}
