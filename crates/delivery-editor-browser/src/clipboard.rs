//! Browser clipboard implementation.
//!
//! Implements `ClipboardPlatform` with the async Clipboard API. The write is
//! started immediately and settles on the microtask queue; the completion
//! callback reports the outcome.

use delivery_editor_core::{ClipboardDone, ClipboardPlatform, PlatformError};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// Clipboard backed by `navigator.clipboard`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserClipboard;

impl ClipboardPlatform for BrowserClipboard {
    fn write_text(&self, text: &str, done: ClipboardDone) {
        let Some(window) = web_sys::window() else {
            done(Err(PlatformError::from("no window")));
            return;
        };
        let promise = window.navigator().clipboard().write_text(text);
        let len = text.len();

        wasm_bindgen_futures::spawn_local(async move {
            let result = JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|e| PlatformError::from(js_error_message(&e)));
            if result.is_ok() {
                tracing::debug!(target: "delivery::clipboard", len, "wrote clipboard");
            }
            done(result);
        });
    }
}

/// Best-effort message out of a rejected promise value.
fn js_error_message(value: &wasm_bindgen::JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}
