//! Error types for hexarc.
//!
//! This module defines all error types used throughout the hexarc crates,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for hexarc operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Deployment Errors ===
    /// An adapter failed to start while deploying a service.
    #[error("failed to start adapter '{adapter}' on port '{port}' of service '{service}': {message}")]
    AdapterStart {
        /// Name of the service being deployed.
        service: String,
        /// Name of the port the adapter is bound to.
        port: String,
        /// Name of the adapter.
        adapter: String,
        /// Description of what went wrong.
        message: String,
    },

    /// An adapter failed to stop while undeploying a service.
    #[error("failed to stop adapter '{adapter}' on port '{port}' of service '{service}': {message}")]
    AdapterStop {
        /// Name of the service being undeployed.
        service: String,
        /// Name of the port the adapter is bound to.
        port: String,
        /// Name of the adapter.
        adapter: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A service with the same name is already deployed in the group.
    #[error("service '{service}' is already deployed")]
    AlreadyDeployed {
        /// Name of the conflicting service.
        service: String,
    },

    /// No service with the given name is deployed in the group.
    #[error("service '{service}' is not deployed")]
    ServiceNotFound {
        /// Name of the missing service.
        service: String,
    },

    /// A service entered the failed state.
    #[error("service '{service}' failed: {message}")]
    ServiceFailed {
        /// Name of the failed service.
        service: String,
        /// Description of the failure.
        message: String,
    },

    /// A service did not become ready within the configured window.
    #[error("service '{service}' not ready after {waited_ms}ms")]
    ReadyTimeout {
        /// Name of the service that was waited on.
        service: String,
        /// How long was waited, in milliseconds.
        waited_ms: u64,
    },

    /// A service was built without any port bindings.
    #[error("service '{service}' declares no ports")]
    EmptyService {
        /// Name of the empty service.
        service: String,
    },

    /// A service declares two port bindings with the same name.
    #[error("service '{service}' declares port '{port}' more than once")]
    DuplicatePort {
        /// Name of the service.
        service: String,
        /// Name of the duplicated port.
        port: String,
    },

    // === Event Bus Errors ===
    /// The bus address has no live publisher side left.
    #[error("event bus address '{address}' is closed")]
    BusClosed {
        /// The bus address.
        address: String,
    },

    /// A slow subscriber missed events on a bus address.
    #[error("subscriber lagged on event bus address '{address}', skipped {skipped} events")]
    BusLagged {
        /// The bus address.
        address: String,
        /// How many events were dropped for this subscriber.
        skipped: u64,
    },

    // === Storage Errors ===
    /// Failed to open or create the document database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// Inserting a document whose id is already present.
    #[error("document '{id}' already exists")]
    DocumentExists {
        /// The conflicting document id.
        id: String,
    },

    /// A document with the given id is not in the store.
    #[error("document '{id}' not found")]
    DocumentNotFound {
        /// The missing document id.
        id: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for hexarc operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an adapter start error.
    #[must_use]
    pub fn adapter_start(
        service: impl Into<String>,
        port: impl Into<String>,
        adapter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::AdapterStart {
            service: service.into(),
            port: port.into(),
            adapter: adapter.into(),
            message: message.into(),
        }
    }

    /// Create an adapter stop error.
    #[must_use]
    pub fn adapter_stop(
        service: impl Into<String>,
        port: impl Into<String>,
        adapter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::AdapterStop {
            service: service.into(),
            port: port.into(),
            adapter: adapter.into(),
            message: message.into(),
        }
    }

    /// Create a service not found error.
    #[must_use]
    pub fn service_not_found(service: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service: service.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means a service or document was not found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ServiceNotFound { .. } | Self::DocumentNotFound { .. }
        )
    }

    /// Check if this error is a recoverable subscriber lag.
    ///
    /// A lagged subscriber can keep receiving; only the skipped events are
    /// lost.
    #[must_use]
    pub fn is_lagged(&self) -> bool {
        matches!(self, Self::BusLagged { .. })
    }
}
