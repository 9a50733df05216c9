use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::features::papers::handlers;
use crate::features::papers::services::PaperService;
use crate::modules::storage::LocalStorage;

/// Room for the text fields and multipart framing around the PDF itself
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Request body limit for uploads of PDFs up to `max_file_size` bytes
fn upload_body_limit(max_file_size: usize) -> usize {
    max_file_size.saturating_add(MULTIPART_OVERHEAD)
}

/// Create routes for the papers feature
///
/// Note: This feature is public (no authentication required)
pub fn routes(service: Arc<PaperService>) -> Router {
    let upload_limit = upload_body_limit(service.max_file_size());

    Router::new()
        .route(
            "/api/papers",
            post(handlers::upload_paper)
                .layer(DefaultBodyLimit::max(upload_limit))
                .get(handlers::list_papers),
        )
        .route("/api/papers/{id}", get(handlers::get_paper))
        .route("/api/papers/{id}/view", post(handlers::record_view))
        .route("/api/papers/{id}/download", post(handlers::record_download))
        .with_state(service)
}

/// Serve stored PDFs under the storage's public path
pub fn blob_routes(storage: &LocalStorage) -> Router {
    Router::new().nest_service(storage.public_path(), ServeDir::new(storage.upload_dir()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::create_test_app;
    use axum_test::TestServer;

    #[test]
    fn test_upload_body_limit_adds_overhead() {
        assert_eq!(upload_body_limit(16), 16 + MULTIPART_OVERHEAD);
    }

    #[test]
    fn test_upload_body_limit_saturates() {
        assert_eq!(upload_body_limit(usize::MAX), usize::MAX);
        assert_eq!(upload_body_limit(usize::MAX - 1), usize::MAX);
    }

    #[tokio::test]
    async fn test_routes_build_with_huge_max_file_size() {
        let app = create_test_app(usize::MAX);
        let server = TestServer::new(app.router.clone()).unwrap();

        server.get("/api/papers").await.assert_status_ok();
    }
}
