//! Fixtures shared by the unit tests: tiny in-memory images and a transport
//! that answers from a closure instead of the network.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{DynamicImage, Rgb, RgbImage};
use serde_json::{json, Value};

use crate::error::Result;
use crate::imaging::{encode_png_base64, Logo};
use crate::transport::{HttpTransport, TransportResponse};

pub(crate) fn sample_image(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    let mut image = RgbImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        *pixel = Rgb([rgb[0], rgb[1].wrapping_add(x as u8), rgb[2].wrapping_add(y as u8)]);
    }
    DynamicImage::ImageRgb8(image)
}

pub(crate) fn sample_logo() -> Logo {
    Logo::from_image(sample_image(8, 8, [26, 26, 46]))
}

pub(crate) fn png_base64(width: u32, height: u32) -> String {
    encode_png_base64(&sample_image(width, height, [7, 37, 87])).unwrap_or_default()
}

/// A 200 reply in the camelCase JSON shape carrying one PNG.
pub(crate) fn image_reply(width: u32, height: u32) -> TransportResponse {
    TransportResponse {
        status: 200,
        body: json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": png_base64(width, height) } },
            ]}}]
        })
        .to_string(),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub provider: &'static str,
    pub url: String,
    pub api_key: String,
    pub payload: Value,
    pub timeout: Duration,
}

type Responder = dyn Fn(usize, &Value) -> Result<TransportResponse> + Send + Sync;

#[derive(Clone)]
pub(crate) struct ScriptedTransport {
    responder: Arc<Responder>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedTransport {
    pub(crate) fn new(
        responder: impl Fn(usize, &Value) -> Result<TransportResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl HttpTransport for ScriptedTransport {
    fn post_json(
        &self,
        provider: &'static str,
        url: &str,
        api_key: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<TransportResponse> {
        let index = {
            let mut calls = self.calls.lock().unwrap_or_else(|err| err.into_inner());
            calls.push(RecordedCall {
                provider,
                url: url.to_string(),
                api_key: api_key.to_string(),
                payload: payload.clone(),
                timeout,
            });
            calls.len() - 1
        };
        (self.responder)(index, payload)
    }
}
