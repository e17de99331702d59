use gloo_net::http::Request;
use streaming::{FORM_CONTENT_TYPE, ProtocolError};
use wasm_bindgen::JsValue;

use crate::config::ViewerConfig;
use crate::controller::OutboundRequest;

/// Same-origin form POSTs carrying the CSRF header.
#[derive(Debug, Clone)]
pub struct FormTransport {
    config: ViewerConfig,
    csrf_token: String,
}

impl FormTransport {
    pub fn new(config: ViewerConfig, csrf_token: String) -> Self {
        Self { config, csrf_token }
    }

    /// Send `req` and return the response text.
    ///
    /// The outer error is a network failure, which never reaches the
    /// controller. The inner result is what the controller gets to see.
    pub async fn send(
        &self,
        req: &OutboundRequest,
    ) -> Result<Result<String, ProtocolError>, JsValue> {
        let form = match req.form() {
            Ok(f) => f,
            Err(err) => return Ok(Err(err)),
        };
        let url = self.config.endpoint_url(req.endpoint());
        let resp = Request::post(&url)
            .header(&self.config.csrf_header, &self.csrf_token)
            .header("Content-Type", FORM_CONTENT_TYPE)
            .body(form)
            .map_err(|e| JsValue::from_str(&e.to_string()))?
            .send()
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        if !resp.ok() {
            return Ok(Err(ProtocolError::Status(resp.status())));
        }
        let text = resp
            .text()
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Ok(text))
    }
}
