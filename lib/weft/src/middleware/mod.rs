//! Tower middleware for [`ServiceTransport`](crate::ServiceTransport) stacks.
//!
//! Layers wrap the service a transport sends through. They are applied in
//! reverse order: the last layer added is the first to see a request.
//!
//! # Example
//!
//! ```ignore
//! use weft::ServiceTransport;
//! use weft::middleware::{LoggingLayer, ServiceBuilder};
//!
//! let service = ServiceBuilder::new()
//!     .layer(LoggingLayer::debug())
//!     .service(http_client);
//! let transport = ServiceTransport::new(service, "https://api.example.com")?;
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
