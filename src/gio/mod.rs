//! GIO bridge: exposes `/v1/chat/completions` inside the rollup machine and
//! tunnels each body to the coordinator's generic-I/O endpoint.

pub mod server;
pub mod types;

pub use server::{BridgeState, router, run_bridge, serve_with_listener};
pub use types::{GioRequest, GioResponse};
