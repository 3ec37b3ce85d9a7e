//! `hexarc` - Utilities for instantiating services with the Hexagonal
//! Architecture pattern
//!
//! This library provides the building blocks for structuring a service as a
//! set of ports (technology-agnostic interfaces), models (business logic
//! implementing the ports) and adapters (technology bindings exposing the
//! ports), and for deploying such services as groups of cooperating tasks.
//!
//! A [`Service`] is declared by binding each port model to its adapters; a
//! [`DeploymentGroup`] deploys services, wiring every adapter to a shared
//! [`EventBus`] and tracking per-service lifecycle state. The [`store`]
//! module supplies a ready-made persistence port for schemaless JSON
//! documents.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod bus;
pub mod config;
pub mod deployment;
pub mod error;
pub mod logging;
pub mod service;
pub mod store;

pub use bus::{Event, EventBus, Subscription};
pub use config::Config;
pub use deployment::{DeploymentConfig, DeploymentGroup, ServiceHandle, ServiceState};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use service::{Adapter, AdapterContext, PortBinding, Service, ServiceBuilder};
pub use store::{
    Document, DocumentId, DocumentStore, Filter, MemoryStore, SqliteStore, StoreStats,
};
