//! View state machine driving the three server calls.
//!
//! The controller never touches the network or the DOM. Operations hand back
//! an [`OutboundRequest`] for the transport to send, and the transport feeds
//! the response text back through [`ViewController::handle_response`]. Map and
//! page side effects go through a [`MapHost`].

use foundation::{Aabb2, LatLngBounds, PlanarCrs, RawExtent, sanitize};
use streaming::{
    CropRequest, Endpoint, PathRequest, ProtocolError, RasterBlob, RequestBody, RequestSequencer,
    Ticket, decode_chunked, parse_content_response, parse_frame_response, parse_path_response,
    PNG_CONTENT_TYPE,
};
use tracing::{debug, warn};

use crate::config::ViewerConfig;
use crate::overlay::OverlayManager;

/// Map widget and page fields the controller writes to.
pub trait MapHost {
    type Overlay;
    type Error: std::fmt::Debug;

    fn add_overlay(
        &mut self,
        image: &RasterBlob,
        bounds: &LatLngBounds,
    ) -> Result<Self::Overlay, Self::Error>;

    /// Detach an overlay and release whatever backs its image.
    fn remove_overlay(&mut self, overlay: Self::Overlay);

    fn fit_bounds(&mut self, bounds: &LatLngBounds);

    fn set_decimation(&mut self, decimation: u32);

    fn report_error(&mut self, message: &str);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// No image path accepted yet.
    #[default]
    Unloaded,
    /// Raw extent known, nothing drawn.
    Loaded,
    /// An overlay is on the map.
    Displaying,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub phase: Phase,
    pub decimation: u32,
    pub extent: RawExtent,
}

/// Viewport size in CSS pixels, as the map reports it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub ticket: Ticket,
    pub body: RequestBody,
}

impl OutboundRequest {
    pub fn endpoint(&self) -> Endpoint {
        self.ticket.endpoint
    }

    pub fn form(&self) -> Result<String, ProtocolError> {
        self.body.encode()
    }
}

#[derive(Debug)]
pub struct ViewController<O> {
    state: ViewState,
    overlay: OverlayManager<O>,
    sequencer: RequestSequencer,
    crs: PlanarCrs,
    chunk_size: usize,
}

impl<O> ViewController<O> {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            state: ViewState::default(),
            overlay: OverlayManager::new(),
            sequencer: RequestSequencer::new(config.response_ordering),
            crs: config.crs(),
            chunk_size: config.raster_chunk_size,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn overlay(&self) -> &OverlayManager<O> {
        &self.overlay
    }

    fn issue(&mut self, body: RequestBody) -> OutboundRequest {
        let ticket = self.sequencer.issue(body.endpoint());
        debug!(seq = ticket.seq, endpoint = ?ticket.endpoint, "issuing request");
        OutboundRequest { ticket, body }
    }

    pub fn load_path(&mut self, path: &str, viewport: ViewportSize) -> OutboundRequest {
        self.issue(RequestBody::Path(PathRequest {
            image_path: path.to_string(),
            tnx: viewport.width,
            tny: viewport.height,
        }))
    }

    /// Request a new crop window, clamped to the raw image.
    pub fn crop_content(&mut self, viewport: ViewportSize, rect: Aabb2) -> OutboundRequest {
        let (minx, miny, maxx, maxy) = sanitize(rect, self.state.extent).to_extents();
        self.issue(RequestBody::Crop(CropRequest {
            tnx: viewport.width,
            tny: viewport.height,
            minx,
            miny,
            maxx,
            maxy,
        }))
    }

    pub fn fetch_frame(&mut self) -> OutboundRequest {
        self.issue(RequestBody::Frame)
    }

    /// Pan/zoom ended. Nothing to crop until an image is loaded.
    pub fn on_map_moved(
        &mut self,
        viewport: ViewportSize,
        bounds: &LatLngBounds,
    ) -> Option<OutboundRequest> {
        if self.state.phase == Phase::Unloaded {
            return None;
        }
        let rect = self.crs.bounds_to_pixels(bounds);
        Some(self.crop_content(viewport, rect))
    }

    /// Apply a response and return the follow-up request, if any.
    ///
    /// Failures are reported to the host and leave the state untouched.
    pub fn handle_response<H>(
        &mut self,
        host: &mut H,
        ticket: Ticket,
        response: Result<String, ProtocolError>,
    ) -> Option<OutboundRequest>
    where
        H: MapHost<Overlay = O>,
    {
        let text = match response {
            Ok(text) => text,
            Err(err) => {
                host.report_error(&format!("{}: {err}", ticket.endpoint.default_path()));
                return None;
            }
        };

        match ticket.endpoint {
            Endpoint::UpdateImagePath => self.on_path_loaded(host, ticket, &text),
            Endpoint::UpdateImageContent => self.on_content_updated(host, ticket, &text),
            Endpoint::GetFrame => {
                self.on_frame(host, ticket, &text);
                None
            }
        }
    }

    fn on_path_loaded<H: MapHost>(
        &mut self,
        host: &mut H,
        ticket: Ticket,
        text: &str,
    ) -> Option<OutboundRequest> {
        let resp = match parse_path_response(text) {
            Ok(r) => r,
            Err(err) => {
                host.report_error(&format!("update_image_path: {err}"));
                return None;
            }
        };
        if !self.sequencer.accept(ticket) {
            debug!(seq = ticket.seq, "dropping superseded path response");
            return None;
        }

        self.state.extent = RawExtent::new(resp.nx, resp.ny);
        if self.state.phase == Phase::Unloaded {
            self.state.phase = Phase::Loaded;
        }
        Some(self.fetch_frame())
    }

    fn on_content_updated<H: MapHost>(
        &mut self,
        host: &mut H,
        ticket: Ticket,
        text: &str,
    ) -> Option<OutboundRequest> {
        if let Err(err) = parse_content_response(text) {
            host.report_error(&format!("update_image_content: {err}"));
            return None;
        }
        if !self.sequencer.accept(ticket) {
            debug!(seq = ticket.seq, "dropping superseded crop acknowledgement");
            return None;
        }
        Some(self.fetch_frame())
    }

    fn on_frame<H>(&mut self, host: &mut H, ticket: Ticket, text: &str)
    where
        H: MapHost<Overlay = O>,
    {
        let frame = match parse_frame_response(text) {
            Ok(r) => r.output_value,
            Err(err) => {
                host.report_error(&format!("get_frame: {err}"));
                return;
            }
        };
        let bounds = match frame.bounds() {
            Ok(b) => b,
            Err(err) => {
                host.report_error(&format!("get_frame: {err}"));
                return;
            }
        };
        let image = match decode_chunked(&frame.raster, PNG_CONTENT_TYPE, self.chunk_size) {
            Ok(blob) => blob,
            Err(err) => {
                host.report_error(&format!("get_frame: {err}"));
                return;
            }
        };
        if !self.sequencer.accept(ticket) {
            debug!(seq = ticket.seq, "dropping stale frame");
            return;
        }

        if let Err(err) = self.overlay.refresh(host, &image, bounds) {
            warn!(?err, "overlay refresh failed");
            host.report_error(&format!("get_frame: could not show overlay: {err:?}"));
            return;
        }
        self.state.decimation = frame.decimation;
        self.state.phase = Phase::Displaying;
        host.set_decimation(frame.decimation);
    }
}
