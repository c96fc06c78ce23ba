//! Prelude module for convenient imports.
//!
//! ```ignore
//! use weft::prelude::*;
//! ```

pub use weft_core::prelude::*;

pub use crate::{ServiceTransport, TransportConfig, weave};
