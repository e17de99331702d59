pub mod config;
pub mod controller;
pub mod overlay;

#[cfg(target_arch = "wasm32")]
mod leaflet;
#[cfg(target_arch = "wasm32")]
mod transport;

#[cfg(test)]
mod testing;

pub use config::ViewerConfig;
pub use controller::{MapHost, OutboundRequest, Phase, ViewController, ViewState, ViewportSize};
pub use overlay::OverlayManager;

#[cfg(target_arch = "wasm32")]
pub use web::*;

#[cfg(target_arch = "wasm32")]
mod web {
    use console_error_panic_hook::set_once;
    use std::cell::RefCell;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Document, HtmlInputElement};

    use crate::config::ViewerConfig;
    use crate::controller::{OutboundRequest, ViewController};
    use crate::leaflet::{LeafletHost, LeafletOverlay};
    use crate::transport::FormTransport;

    struct Viewer {
        controller: ViewController<LeafletOverlay>,
        host: LeafletHost,
        transport: FormTransport,
        path_input_id: String,
    }

    thread_local! {
        static VIEWER: RefCell<Option<Viewer>> = const { RefCell::new(None) };
    }

    fn with_viewer<R>(f: impl FnOnce(&mut Viewer) -> R) -> Option<R> {
        VIEWER.with(|cell| cell.borrow_mut().as_mut().map(f))
    }

    fn log(msg: &str) {
        web_sys::console::log_1(&JsValue::from_str(msg));
    }

    fn document() -> Result<Document, JsValue> {
        web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))
    }

    /// Token rendered into the page by the server's CSRF middleware.
    fn page_csrf_token(doc: &Document) -> String {
        doc.query_selector("input[name=csrfmiddlewaretoken]")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        set_once();
        Ok(())
    }

    /// Build the map and wire the load button. `config_json` may be empty.
    #[wasm_bindgen]
    pub fn start_viewer(config_json: &str) -> Result<(), JsValue> {
        let config =
            ViewerConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let doc = document()?;

        let csrf_token = if config.csrf_token.is_empty() {
            page_csrf_token(&doc)
        } else {
            config.csrf_token.clone()
        };
        if csrf_token.is_empty() {
            log("no CSRF token found; requests will likely be rejected");
        }

        let host = LeafletHost::new(
            &config.map_element_id,
            config.crs(),
            config.zoom_limits(),
            doc.get_element_by_id(&config.decimation_field_id),
        )?;
        // fitBounds may fire moveend while the viewer is borrowed; defer the work.
        host.on_moveend(|| spawn_local(async { map_moved() }));

        if let Some(button) = doc.get_element_by_id(&config.load_button_id) {
            let on_click = Closure::<dyn FnMut(web_sys::Event)>::new(|ev: web_sys::Event| {
                ev.prevent_default();
                load_from_form();
            });
            button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
            on_click.forget();
        }

        let viewer = Viewer {
            controller: ViewController::new(&config),
            host,
            transport: FormTransport::new(config.clone(), csrf_token),
            path_input_id: config.path_input_id.clone(),
        };
        VIEWER.with(|cell| *cell.borrow_mut() = Some(viewer));
        log("viewer ready");
        Ok(())
    }

    /// Ask the server to open `path` and show its first frame.
    #[wasm_bindgen]
    pub fn load_image_path(path: &str) {
        let req = with_viewer(|v| {
            let viewport = v.host.viewport_size();
            v.controller.load_path(path, viewport)
        });
        if let Some(req) = req {
            dispatch(req);
        }
    }

    #[wasm_bindgen]
    pub fn fetch_frame() {
        if let Some(req) = with_viewer(|v| v.controller.fetch_frame()) {
            dispatch(req);
        }
    }

    #[wasm_bindgen]
    pub fn current_decimation() -> u32 {
        with_viewer(|v| v.controller.state().decimation).unwrap_or(0)
    }

    fn load_from_form() {
        let input_id = match with_viewer(|v| v.path_input_id.clone()) {
            Some(id) => id,
            None => return,
        };
        let path = document()
            .ok()
            .and_then(|doc| doc.get_element_by_id(&input_id))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default();
        if path.trim().is_empty() {
            log("no image path given");
            return;
        }
        load_image_path(path.trim());
    }

    fn map_moved() {
        let req = with_viewer(|v| {
            let bounds = v.host.view_bounds()?;
            let viewport = v.host.viewport_size();
            v.controller.on_map_moved(viewport, &bounds)
        })
        .flatten();
        if let Some(req) = req {
            dispatch(req);
        }
    }

    fn dispatch(req: OutboundRequest) {
        let Some(transport) = with_viewer(|v| v.transport.clone()) else {
            return;
        };
        spawn_local(async move {
            let response = match transport.send(&req).await {
                Ok(r) => r,
                Err(err) => {
                    web_sys::console::error_1(&JsValue::from_str(&format!(
                        "{} request failed: {:?}",
                        req.endpoint().default_path(),
                        err
                    )));
                    return;
                }
            };
            let next = with_viewer(|v| {
                let Viewer {
                    controller, host, ..
                } = v;
                controller.handle_response(host, req.ticket, response)
            })
            .flatten();
            if let Some(next) = next {
                dispatch(next);
            }
        });
    }
}
