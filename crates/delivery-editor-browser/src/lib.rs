//! Browser DOM layer for the delivery-note editor.
//!
//! This crate binds a `NoteEditor` session to a contenteditable element and
//! its line-number gutter. It assumes a `wasm32-unknown-unknown` target
//! environment.
//!
//! # Architecture
//!
//! - `clipboard`: async Clipboard API behind `ClipboardPlatform`
//! - `dom_sync`: rendering, and DOM position <-> document offset mapping
//! - `events`: input type parsing and the mounted surface's listeners
//!
//! # Re-exports
//!
//! This crate re-exports `delivery-editor-core` for convenience, so consumers
//! only need to depend on `delivery-editor-browser`.

// Re-export core crate
pub use delivery_editor_core;
pub use delivery_editor_core::*;

pub mod clipboard;
pub mod dom_sync;
pub mod events;

pub use clipboard::BrowserClipboard;
pub use events::{NoteSurface, parse_browser_input_type};

/// Install the panic hook and route `tracing` to the browser console.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();

    INIT.call_once(|| {
        console_error_panic_hook::set_once();

        let level = if cfg!(debug_assertions) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        let config = tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(level)
            .build();
        tracing_wasm::set_as_global_default_with_config(config);
    });
}
