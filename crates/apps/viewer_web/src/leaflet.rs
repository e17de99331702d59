//! Leaflet map widget bindings and the browser-side `MapHost`.

use foundation::{LatLng, LatLngBounds, PlanarCrs, ZoomLimits};
use streaming::RasterBlob;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlInputElement, Url};

use crate::controller::{MapHost, ViewportSize};

// Leaflet (and optionally Leaflet.draw) are loaded by the page as globals.
#[wasm_bindgen(inline_js = "
export function sv_create_map(elementId, minZoom, maxZoom, a, b, c, d) {
    const crs = L.extend({}, L.CRS.Simple, {
        transformation: new L.Transformation(a, b, c, d),
    });
    const map = L.map(elementId, { crs, minZoom, maxZoom, center: [0, 0], zoom: 0 });

    // Toolbar shell only: every drawing and editing tool is switched off.
    const drawn = new L.FeatureGroup();
    map.addLayer(drawn);
    if (L.Control && L.Control.Draw) {
        map.addControl(new L.Control.Draw({
            draw: {
                polyline: false,
                polygon: false,
                rectangle: false,
                circle: false,
                marker: false,
                circlemarker: false,
            },
            edit: { featureGroup: drawn, edit: false, remove: false },
        }));
    }
    return map;
}

export function sv_on_moveend(map, cb) {
    map.on('moveend', () => cb());
}

export function sv_map_bounds(map) {
    const b = map.getBounds();
    return new Float64Array([b.getSouth(), b.getWest(), b.getNorth(), b.getEast()]);
}

export function sv_map_size(map) {
    const s = map.getSize();
    return new Uint32Array([Math.max(0, Math.round(s.x)), Math.max(0, Math.round(s.y))]);
}

export function sv_add_image_overlay(map, url, b) {
    return L.imageOverlay(url, [[b[0], b[1]], [b[2], b[3]]]).addTo(map);
}

export function sv_remove_layer(map, layer) {
    map.removeLayer(layer);
}

export function sv_fit_bounds(map, b) {
    map.fitBounds([[b[0], b[1]], [b[2], b[3]]]);
}
")]
extern "C" {
    pub type LeafletMap;
    pub type LeafletLayer;

    #[wasm_bindgen(catch)]
    fn sv_create_map(
        element_id: &str,
        min_zoom: f64,
        max_zoom: f64,
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    ) -> Result<LeafletMap, JsValue>;

    fn sv_on_moveend(map: &LeafletMap, cb: &js_sys::Function);
    fn sv_map_bounds(map: &LeafletMap) -> js_sys::Float64Array;
    fn sv_map_size(map: &LeafletMap) -> js_sys::Uint32Array;

    #[wasm_bindgen(catch)]
    fn sv_add_image_overlay(map: &LeafletMap, url: &str, bounds: &[f64]) -> Result<LeafletLayer, JsValue>;

    fn sv_remove_layer(map: &LeafletMap, layer: &LeafletLayer);
    fn sv_fit_bounds(map: &LeafletMap, bounds: &[f64]);
}

fn flat_bounds(b: &LatLngBounds) -> [f64; 4] {
    let [[lat1, lng1], [lat2, lng2]] = b.to_array();
    [lat1, lng1, lat2, lng2]
}

/// Image layer on the map plus the object URL backing it.
pub struct LeafletOverlay {
    layer: LeafletLayer,
    url: String,
}

pub struct LeafletHost {
    map: LeafletMap,
    decimation_field: Option<web_sys::Element>,
}

impl LeafletHost {
    pub fn new(
        element_id: &str,
        crs: PlanarCrs,
        zoom: ZoomLimits,
        decimation_field: Option<web_sys::Element>,
    ) -> Result<Self, JsValue> {
        let [a, b, c, d] = crs.transformation();
        let map = sv_create_map(element_id, zoom.min, zoom.max, a, b, c, d)?;
        Ok(Self {
            map,
            decimation_field,
        })
    }

    /// Register `cb` for every pan/zoom end. The closure lives for the page.
    pub fn on_moveend(&self, cb: impl FnMut() + 'static) {
        let closure = Closure::<dyn FnMut()>::new(cb);
        sv_on_moveend(&self.map, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn viewport_size(&self) -> ViewportSize {
        let v = sv_map_size(&self.map).to_vec();
        ViewportSize::new(
            v.first().copied().unwrap_or(0),
            v.get(1).copied().unwrap_or(0),
        )
    }

    pub fn view_bounds(&self) -> Option<LatLngBounds> {
        let v = sv_map_bounds(&self.map).to_vec();
        if v.len() != 4 {
            return None;
        }
        Some(LatLngBounds::new(
            LatLng::new(v[0], v[1]),
            LatLng::new(v[2], v[3]),
        ))
    }
}

fn blob_url(image: &RasterBlob) -> Result<String, JsValue> {
    let parts = js_sys::Array::new();
    for chunk in image.chunks() {
        parts.push(&js_sys::Uint8Array::from(chunk.as_slice()));
    }
    let opts = BlobPropertyBag::new();
    opts.set_type(image.content_type());
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;
    Url::create_object_url_with_blob(&blob)
}

impl MapHost for LeafletHost {
    type Overlay = LeafletOverlay;
    type Error = JsValue;

    fn add_overlay(
        &mut self,
        image: &RasterBlob,
        bounds: &LatLngBounds,
    ) -> Result<LeafletOverlay, JsValue> {
        let url = blob_url(image)?;
        match sv_add_image_overlay(&self.map, &url, &flat_bounds(bounds)) {
            Ok(layer) => Ok(LeafletOverlay { layer, url }),
            Err(err) => {
                let _ = Url::revoke_object_url(&url);
                Err(err)
            }
        }
    }

    fn remove_overlay(&mut self, overlay: LeafletOverlay) {
        sv_remove_layer(&self.map, &overlay.layer);
        let _ = Url::revoke_object_url(&overlay.url);
    }

    fn fit_bounds(&mut self, bounds: &LatLngBounds) {
        sv_fit_bounds(&self.map, &flat_bounds(bounds));
    }

    fn set_decimation(&mut self, decimation: u32) {
        let Some(field) = &self.decimation_field else {
            return;
        };
        let text = decimation.to_string();
        if let Some(input) = field.dyn_ref::<HtmlInputElement>() {
            input.set_value(&text);
        } else {
            field.set_text_content(Some(&text));
        }
    }

    fn report_error(&mut self, message: &str) {
        web_sys::console::error_1(&JsValue::from_str(message));
    }
}
