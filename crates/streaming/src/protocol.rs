//! Wire format for the image server endpoints.
//!
//! Three same-origin POST endpoints, each taking an
//! `application/x-www-form-urlencoded` body and answering with JSON:
//! - `update_image_path` selects the image and reports its raw size
//! - `update_image_content` sets the crop window for subsequent frames
//! - `get_frame` returns the current decimated frame as base64 PNG

use foundation::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Endpoint {
    UpdateImagePath,
    UpdateImageContent,
    GetFrame,
}

impl Endpoint {
    pub fn default_path(&self) -> &'static str {
        match self {
            Self::UpdateImagePath => "update_image_path",
            Self::UpdateImageContent => "update_image_content",
            Self::GetFrame => "get_frame",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    Json(String),
    Form(String),
    Extent(String),
    Status(u16),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::Json(msg) => write!(f, "malformed JSON response: {msg}"),
            ProtocolError::Form(msg) => write!(f, "form encoding failed: {msg}"),
            ProtocolError::Extent(msg) => write!(f, "malformed frame extent: {msg}"),
            ProtocolError::Status(code) => write!(f, "server answered HTTP {code}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Body of `update_image_path`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathRequest {
    pub image_path: String,
    /// Viewport width in pixels.
    pub tnx: u32,
    /// Viewport height in pixels.
    pub tny: u32,
}

/// Body of `update_image_content`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropRequest {
    pub tnx: u32,
    pub tny: u32,
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Path(PathRequest),
    Crop(CropRequest),
    Frame,
}

impl RequestBody {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Path(_) => Endpoint::UpdateImagePath,
            Self::Crop(_) => Endpoint::UpdateImageContent,
            Self::Frame => Endpoint::GetFrame,
        }
    }

    /// Form-encode the body. `get_frame` posts an empty form.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let encoded = match self {
            Self::Path(p) => serde_urlencoded::to_string(p),
            Self::Crop(c) => serde_urlencoded::to_string(c),
            Self::Frame => Ok(String::new()),
        };
        encoded.map_err(|e| ProtocolError::Form(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PathResponse {
    pub nx: u64,
    pub ny: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrameResponse {
    pub output_value: FrameOutput,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrameOutput {
    /// Base64 PNG.
    pub raster: String,
    /// JSON text of `[[lat1, lng1], [lat2, lng2]]`.
    pub extent: String,
    pub decimation: u32,
}

impl FrameOutput {
    pub fn bounds(&self) -> Result<LatLngBounds, ProtocolError> {
        let corners: [[f64; 2]; 2] = serde_json::from_str(&self.extent)
            .map_err(|e| ProtocolError::Extent(e.to_string()))?;
        Ok(LatLngBounds::new(
            LatLng::new(corners[0][0], corners[0][1]),
            LatLng::new(corners[1][0], corners[1][1]),
        ))
    }
}

pub fn parse_path_response(text: &str) -> Result<PathResponse, ProtocolError> {
    serde_json::from_str(text).map_err(|e| ProtocolError::Json(e.to_string()))
}

/// The crop acknowledgement carries nothing the client uses, but it must
/// still be JSON.
pub fn parse_content_response(text: &str) -> Result<serde_json::Value, ProtocolError> {
    serde_json::from_str(text).map_err(|e| ProtocolError::Json(e.to_string()))
}

pub fn parse_frame_response(text: &str) -> Result<FrameResponse, ProtocolError> {
    serde_json::from_str(text).map_err(|e| ProtocolError::Json(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn path_request_is_form_encoded() {
        let body = RequestBody::Path(PathRequest {
            image_path: "/data/sicd 01.nitf".to_string(),
            tnx: 800,
            tny: 600,
        });
        assert_eq!(body.endpoint(), Endpoint::UpdateImagePath);
        assert_eq!(
            body.encode().expect("encode"),
            "image_path=%2Fdata%2Fsicd+01.nitf&tnx=800&tny=600"
        );
    }

    #[test]
    fn crop_request_keeps_field_order() {
        let body = RequestBody::Crop(CropRequest {
            tnx: 640,
            tny: 480,
            minx: 0.0,
            miny: 10.5,
            maxx: 100.0,
            maxy: 80.25,
        });
        let encoded = body.encode().expect("encode");
        let pairs: Vec<(String, f64)> = serde_urlencoded::from_str(&encoded).expect("decode");
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["tnx", "tny", "minx", "miny", "maxx", "maxy"]);
        assert_eq!(pairs[3].1, 10.5);
        assert_eq!(pairs[5].1, 80.25);
    }

    #[test]
    fn frame_request_is_empty() {
        assert_eq!(RequestBody::Frame.encode().expect("encode"), "");
        assert_eq!(RequestBody::Frame.endpoint().default_path(), "get_frame");
    }

    #[test]
    fn parses_path_response() {
        let r = parse_path_response(r#"{"nx": 4096, "ny": 2048}"#).expect("parse");
        assert_eq!(r, PathResponse { nx: 4096, ny: 2048 });
    }

    #[test]
    fn parses_frame_response_and_extent() {
        let text = r#"{"output_value": {"raster": "iVBORw0KGgo=", "extent": "[[0, 0], [80, 100]]", "decimation": 4}}"#;
        let r = parse_frame_response(text).expect("parse");
        assert_eq!(r.output_value.decimation, 4);
        let b = r.output_value.bounds().expect("bounds");
        assert_eq!(b.to_array(), [[0.0, 0.0], [80.0, 100.0]]);
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = parse_frame_response("<html>oops</html>").unwrap_err();
        assert!(matches!(err, ProtocolError::Json(_)));
        assert!(parse_content_response("{}").is_ok());
    }

    #[test]
    fn malformed_extent_is_reported() {
        let out = FrameOutput {
            raster: String::new(),
            extent: "[[0, 0]]".to_string(),
            decimation: 1,
        };
        assert!(matches!(out.bounds(), Err(ProtocolError::Extent(_))));
    }
}
