use foundation::{PlanarCrs, ZoomLimits};
use serde::{Deserialize, Serialize};
use streaming::{CSRF_HEADER, DEFAULT_CHUNK_SIZE, Endpoint, ResponseOrdering};

/// Page-level settings, handed over by the host page as JSON.
///
/// Every field has a default so the page only needs to send what differs,
/// typically just the CSRF token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub map_element_id: String,
    pub path_input_id: String,
    pub load_button_id: String,
    pub decimation_field_id: String,

    /// Prefix for endpoint URLs. Empty means relative to the page.
    pub endpoint_base: String,
    pub update_image_path_url: String,
    pub update_image_content_url: String,
    pub get_frame_url: String,

    pub csrf_header: String,
    /// When empty, the token is read from the page's `csrfmiddlewaretoken` input.
    pub csrf_token: String,

    pub min_zoom: f64,
    pub max_zoom: f64,

    /// Bytes per part when turning a decoded raster into a blob.
    pub raster_chunk_size: usize,
    pub response_ordering: ResponseOrdering,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let zoom = ZoomLimits::default();
        Self {
            map_element_id: "map".to_string(),
            path_input_id: "image_path".to_string(),
            load_button_id: "load_image".to_string(),
            decimation_field_id: "decimation".to_string(),
            endpoint_base: String::new(),
            update_image_path_url: Endpoint::UpdateImagePath.default_path().to_string(),
            update_image_content_url: Endpoint::UpdateImageContent.default_path().to_string(),
            get_frame_url: Endpoint::GetFrame.default_path().to_string(),
            csrf_header: CSRF_HEADER.to_string(),
            csrf_token: String::new(),
            min_zoom: zoom.min,
            max_zoom: zoom.max,
            raster_chunk_size: DEFAULT_CHUNK_SIZE,
            response_ordering: ResponseOrdering::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(text)
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        let path = match endpoint {
            Endpoint::UpdateImagePath => &self.update_image_path_url,
            Endpoint::UpdateImageContent => &self.update_image_content_url,
            Endpoint::GetFrame => &self.get_frame_url,
        };
        if self.endpoint_base.is_empty() {
            path.clone()
        } else {
            format!(
                "{}/{}",
                self.endpoint_base.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        }
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min: self.min_zoom,
            max: self.max_zoom,
        }
    }

    pub fn crs(&self) -> PlanarCrs {
        PlanarCrs::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ViewerConfig::from_json(r#"{"csrf_token": "abc"}"#).expect("config");
        assert_eq!(cfg.csrf_token, "abc");
        assert_eq!(cfg.csrf_header, "X-CSRFToken");
        assert_eq!(cfg.min_zoom, -8.0);
        assert_eq!(cfg.max_zoom, 24.0);
        assert_eq!(cfg.raster_chunk_size, 512);
        assert_eq!(cfg.response_ordering, ResponseOrdering::DiscardStale);
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(ViewerConfig::from_json("  ").expect("config"), ViewerConfig::default());
    }

    #[test]
    fn ordering_parses_snake_case() {
        let cfg = ViewerConfig::from_json(r#"{"response_ordering": "arrival_order"}"#)
            .expect("config");
        assert_eq!(cfg.response_ordering, ResponseOrdering::ArrivalOrder);
    }

    #[test]
    fn endpoint_urls_are_relative_by_default() {
        let cfg = ViewerConfig::default();
        assert_eq!(cfg.endpoint_url(Endpoint::GetFrame), "get_frame");

        let cfg = ViewerConfig {
            endpoint_base: "/viewer/".to_string(),
            ..ViewerConfig::default()
        };
        assert_eq!(
            cfg.endpoint_url(Endpoint::UpdateImagePath),
            "/viewer/update_image_path"
        );
    }
}
