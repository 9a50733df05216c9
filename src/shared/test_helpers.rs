#[cfg(test)]
use crate::core::config::StorageConfig;
#[cfg(test)]
use crate::features::papers::{
    repositories::InMemoryPaperRepository,
    routes::{blob_routes, routes},
    PaperService,
};
#[cfg(test)]
use crate::modules::storage::LocalStorage;
#[cfg(test)]
use axum::Router;
#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use tempfile::TempDir;

/// Papers router wired to an in-memory catalog and a temp upload dir
#[cfg(test)]
pub struct TestApp {
    pub router: Router,
    pub repository: Arc<InMemoryPaperRepository>,
    pub storage: Arc<LocalStorage>,
    _upload_root: TempDir,
}

#[cfg(test)]
pub fn create_test_app(max_file_size: usize) -> TestApp {
    let upload_root = TempDir::new().expect("failed to create temp upload dir");
    let storage = Arc::new(LocalStorage::new(StorageConfig {
        upload_dir: upload_root.path().join("uploads"),
        public_path: "/uploads".to_string(),
        max_file_size,
    }));
    let repository = Arc::new(InMemoryPaperRepository::new());
    let service = Arc::new(PaperService::new(
        repository.clone(),
        Arc::clone(&storage),
    ));

    let router = Router::new()
        .merge(routes(service))
        .merge(blob_routes(&storage));

    TestApp {
        router,
        repository,
        storage,
        _upload_root: upload_root,
    }
}
