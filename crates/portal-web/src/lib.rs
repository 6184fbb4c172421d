//! Portal Web - WebGPU-powered browser build of the portal scene
//!
//! This crate provides the wasm entry point: panic and log hooks, the
//! embedded default configuration and its URL overrides.

mod app;
mod url_params;

use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    let overrides = url_params::UrlOverrides::from_browser();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(overrides.log_level.unwrap_or(tracing::Level::WARN))
            .build()
    );

    // Run the Bevy app
    app::run(overrides);
}
