// Library target exists solely for the integration tests under tests/.
// The binary entry point is main.rs; this file re-declares the module tree so
// the test harness can import types via `badasseugi::worksheet::*` etc.
// Most code is only exercised through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

// Public: used directly by integration tests
pub mod export;
pub mod gateway;
pub mod render;
pub mod store;
pub mod worksheet;

// Private: required transitively (won't compile without them)
mod app;
mod config;
mod event;
mod ui;
