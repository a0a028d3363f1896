// CORS middleware
use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

use crate::http::request::X_REQUEST_ID;

/// Permissive cross-origin policy: any origin, any request header,
/// the proxy's own methods. No credentials.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([X_REQUEST_ID])
        .allow_credentials(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_creation() {
        let _layer = cors_layer();
    }
}
