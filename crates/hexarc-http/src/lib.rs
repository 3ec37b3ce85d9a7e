//! `hexarc-http` - HTTP adapter for hexarc services
//!
//! This crate binds hexarc port models to HTTP using axum. The caller
//! supplies a router factory; the adapter owns the socket, a `/healthz`
//! route, graceful draining on undeploy, and the bound-address
//! announcement on the deployment group's event bus.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod adapter;
mod health;

pub use adapter::{HttpAdapter, BOUND_ADDRESS};
