//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, header inspection)
//!     → proxy.rs (decode payload, forward upstream) | health.rs
//!     → error.rs (map failures to JSON envelopes)
//!     → cors.rs headers → Send to client
//! ```

pub mod cors;
pub mod error;
pub mod health;
pub mod proxy;
pub mod request;
pub mod server;

pub use error::{HttpError, ProxyError};
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, PROXY_PREFIX};
