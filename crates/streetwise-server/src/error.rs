//! Error types for the server binary.

/// Top-level error for the server binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration or catalog loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: streetwise_core::ConfigError,
    },

    /// A service operation failed during startup.
    #[error("service error: {source}")]
    Service {
        /// The underlying service error.
        #[from]
        source: streetwise_core::ServiceError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
