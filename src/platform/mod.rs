//! Platform bindings
//!
//! The simulation is platform-free; this layer adapts it to a host.
//! - `web` (wasm32): a `wasm-bindgen` session for a JavaScript renderer

#[cfg(target_arch = "wasm32")]
pub mod web;
