use base64::Engine as _;
use foundation::LatLngBounds;
use streaming::RasterBlob;

use crate::controller::MapHost;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Add(u32),
    Remove(u32),
    Fit,
    Decimation(u32),
}

/// Records every side effect instead of drawing anything.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
    pub errors: Vec<String>,
    pub fail_next_add: bool,
    next_id: u32,
}

impl RecordingHost {
    pub fn fit_count(&self) -> usize {
        self.calls.iter().filter(|c| **c == HostCall::Fit).count()
    }

    pub fn add_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::Add(_)))
            .count()
    }
}

impl MapHost for RecordingHost {
    type Overlay = u32;
    type Error = String;

    fn add_overlay(&mut self, image: &RasterBlob, _bounds: &LatLngBounds) -> Result<u32, String> {
        if std::mem::take(&mut self.fail_next_add) {
            return Err("image rejected".to_string());
        }
        assert_eq!(image.content_type(), "image/png");
        let id = self.next_id;
        self.next_id += 1;
        self.calls.push(HostCall::Add(id));
        Ok(id)
    }

    fn remove_overlay(&mut self, overlay: u32) {
        self.calls.push(HostCall::Remove(overlay));
    }

    fn fit_bounds(&mut self, _bounds: &LatLngBounds) {
        self.calls.push(HostCall::Fit);
    }

    fn set_decimation(&mut self, decimation: u32) {
        self.calls.push(HostCall::Decimation(decimation));
    }

    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// A `get_frame` body with a tiny PNG header as the raster.
pub fn frame_json(decimation: u32) -> String {
    let raster = base64::engine::general_purpose::STANDARD.encode(b"\x89PNG\r\n\x1a\n");
    serde_json::json!({
        "output_value": {
            "raster": raster,
            "extent": "[[0, 0], [80, 100]]",
            "decimation": decimation,
        }
    })
    .to_string()
}
