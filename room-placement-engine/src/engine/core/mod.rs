//! Core application setup.
//!
//! Builds the headless engine app for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with logging, transform propagation, placement
/// integrity and the frontend RPC bridge.
pub mod app_setup;
