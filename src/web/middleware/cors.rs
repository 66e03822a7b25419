//! CORS for browser clients of the file API.

use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Methods the file routes answer to.
const FILE_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::DELETE];

/// Build the CORS layer.
///
/// Configured origins are echoed back with credentials allowed, so browsers
/// may send Basic auth. Without usable origins any origin may call the API,
/// but credentials are not forwarded. `Content-Disposition` is exposed so
/// scripts can read the download filename.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    let layer = CorsLayer::new()
        .allow_methods(FILE_METHODS)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([CONTENT_DISPOSITION]);

    if allowed.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_origin(AllowOrigin::list(allowed))
            .allow_credentials(true)
    }
}
