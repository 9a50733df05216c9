use std::sync::Arc;

use chrono::{Datelike, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::papers::dtos::{
    is_mime_type_allowed, CreatePaperDto, PaperResponseDto, UploadedFile, ALLOWED_MIME_TYPES,
    MIN_EXAM_YEAR,
};
use crate::features::papers::models::{NewPaper, PaperFilter};
use crate::features::papers::repositories::PaperRepository;
use crate::modules::storage::LocalStorage;

/// Service for paper catalog, ingestion and counter operations
pub struct PaperService {
    repository: Arc<dyn PaperRepository>,
    storage: Arc<LocalStorage>,
}

/// Reject exam years outside `MIN_EXAM_YEAR..=current_year`
fn validate_year(year: i32, current_year: i32) -> Result<()> {
    if (MIN_EXAM_YEAR..=current_year).contains(&year) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "year must be between {} and {}",
            MIN_EXAM_YEAR, current_year
        )))
    }
}

/// Reject empty, oversized or non-PDF uploads
fn validate_file(file: &UploadedFile, max_file_size: usize) -> Result<()> {
    if file.data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    if file.data.len() > max_file_size {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            max_file_size,
            max_file_size / 1024 / 1024
        )));
    }

    if !is_mime_type_allowed(&file.content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            file.content_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    Ok(())
}

impl PaperService {
    pub fn new(repository: Arc<dyn PaperRepository>, storage: Arc<LocalStorage>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.storage.max_file_size()
    }

    /// List papers, most viewed first
    pub async fn list_papers(&self, filter: PaperFilter) -> Result<Vec<PaperResponseDto>> {
        let papers = self.repository.list(&filter).await?;
        papers.into_iter().map(PaperResponseDto::try_from).collect()
    }

    pub async fn get_paper(&self, id: Uuid) -> Result<PaperResponseDto> {
        self.repository.find_by_id(id).await?.try_into()
    }

    /// Store an uploaded PDF and record its catalog entry
    ///
    /// All validation happens before anything is written. The blob is
    /// written first; if the row insert then fails the blob is removed
    /// again so no orphan is left behind (best effort, a crash between
    /// the two steps can still leave one).
    pub async fn upload_paper(
        &self,
        file: UploadedFile,
        metadata: CreatePaperDto,
    ) -> Result<PaperResponseDto> {
        metadata
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validate_year(metadata.year, Utc::now().year())?;
        validate_file(&file, self.storage.max_file_size())?;

        let file_key = self.storage.generate_key(&file.file_name);
        self.storage.upload(&file_key, &file.data).await?;
        debug!("Paper blob stored: {}", file_key);

        let new_paper = NewPaper {
            id: Uuid::now_v7(),
            title: metadata.title,
            subject_code: metadata.subject_code,
            exam_type: metadata.exam_type,
            semester: metadata.semester,
            year: metadata.year,
            file_path: self.storage.get_file_url(&file_key),
        };

        let paper = match self.repository.create(new_paper).await {
            Ok(paper) => paper,
            Err(e) => {
                match self.storage.delete(&file_key).await {
                    Ok(()) => debug!("Removed blob {} after failed insert", file_key),
                    Err(cleanup) => warn!(
                        "Orphaned blob {} left after failed insert: {}",
                        file_key, cleanup
                    ),
                }
                return Err(e);
            }
        };

        info!(
            "Paper created: id={}, subject_code={}, exam_type={}, file_path={}, size={}",
            paper.id,
            paper.subject_code,
            paper.exam_type,
            paper.file_path,
            file.data.len()
        );

        paper.try_into()
    }

    /// Count one preview of a paper
    pub async fn record_view(&self, id: Uuid) -> Result<PaperResponseDto> {
        let paper = self.repository.increment_views(id).await?;
        debug!("Paper viewed: id={}, views={}", paper.id, paper.views);
        paper.try_into()
    }

    /// Count one download of a paper
    pub async fn record_download(&self, id: Uuid) -> Result<PaperResponseDto> {
        let paper = self.repository.increment_downloads(id).await?;
        info!(
            "Paper downloaded: id={}, downloads={}",
            paper.id, paper.downloads
        );
        paper.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StorageConfig;
    use crate::features::papers::models::{ExamType, Semester};
    use crate::features::papers::repositories::InMemoryPaperRepository;
    use fake::faker::lorem::en::Words;
    use fake::Fake;
    use futures::future::join_all;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        repository: Arc<InMemoryPaperRepository>,
        storage: Arc<LocalStorage>,
        service: Arc<PaperService>,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(StorageConfig {
            upload_dir: tmp.path().join("uploads"),
            public_path: "/uploads".to_string(),
            max_file_size: 1024 * 1024,
        }));
        let repository = Arc::new(InMemoryPaperRepository::new());
        let service = Arc::new(PaperService::new(repository.clone(), storage.clone()));

        Fixture {
            _tmp: tmp,
            repository,
            storage,
            service,
        }
    }

    fn pdf(bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: "exam.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: bytes.to_vec(),
        }
    }

    fn metadata(title: &str, subject_code: &str) -> CreatePaperDto {
        CreatePaperDto {
            title: title.to_string(),
            subject_code: subject_code.to_string(),
            exam_type: ExamType::Cat,
            semester: Semester::Fall,
            year: 2023,
        }
    }

    fn stored_blob_count(storage: &LocalStorage) -> usize {
        std::fs::read_dir(storage.upload_dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    fn key_of(file_path: &str) -> &str {
        file_path.trim_start_matches("/uploads/")
    }

    #[test]
    fn test_validate_year_bounds() {
        assert!(validate_year(2000, 2026).is_ok());
        assert!(validate_year(2026, 2026).is_ok());
        assert!(validate_year(1999, 2026).is_err());
        assert!(validate_year(2027, 2026).is_err());
    }

    #[test]
    fn test_validate_file() {
        assert!(validate_file(&pdf(b"%PDF-1.7"), 16).is_ok());
        assert!(validate_file(&pdf(b""), 16).is_err());
        assert!(validate_file(&pdf(&[0u8; 17]), 16).is_err());

        let png = UploadedFile {
            content_type: "image/png".to_string(),
            ..pdf(b"\x89PNG")
        };
        assert!(validate_file(&png, 16).is_err());
    }

    #[tokio::test]
    async fn test_upload_stores_blob_and_row() {
        let f = fixture();
        let content = b"%PDF-1.4 data structures".to_vec();

        let paper = f
            .service
            .upload_paper(pdf(&content), metadata("Data Structures", "CSE2001"))
            .await
            .unwrap();

        assert_eq!(paper.views, 0);
        assert_eq!(paper.downloads, 0);
        assert_eq!(paper.subject_code, "CSE2001");
        assert!(paper.file_path.starts_with("/uploads/"));
        assert!(paper.file_path.ends_with("-exam.pdf"));

        let blob_path = f.storage.path_for(key_of(&paper.file_path)).unwrap();
        assert_eq!(std::fs::read(blob_path).unwrap(), content);
        assert_eq!(f.repository.len(), 1);
    }

    #[tokio::test]
    async fn test_identical_filenames_do_not_collide() {
        let f = fixture();

        let a = f
            .service
            .upload_paper(pdf(b"%PDF-a"), metadata("A", "CSE1001"))
            .await
            .unwrap();
        let b = f
            .service
            .upload_paper(pdf(b"%PDF-b"), metadata("B", "CSE1002"))
            .await
            .unwrap();

        assert_ne!(a.file_path, b.file_path);
        assert_eq!(stored_blob_count(&f.storage), 2);
    }

    #[tokio::test]
    async fn test_invalid_upload_writes_nothing() {
        let f = fixture();

        let mut future_year = metadata("Networks", "CSE3001");
        future_year.year = Utc::now().year() + 1;
        let err = f
            .service
            .upload_paper(pdf(b"%PDF"), future_year)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = f
            .service
            .upload_paper(pdf(b"%PDF"), metadata("", "CSE3001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let not_pdf = UploadedFile {
            content_type: "text/plain".to_string(),
            ..pdf(b"hello")
        };
        let err = f
            .service
            .upload_paper(not_pdf, metadata("Networks", "CSE3001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        assert!(f.repository.is_empty());
        assert_eq!(stored_blob_count(&f.storage), 0);
    }

    #[tokio::test]
    async fn test_failed_insert_removes_blob() {
        let f = fixture();
        f.repository.fail_inserts();

        let err = f
            .service
            .upload_paper(pdf(b"%PDF"), metadata("Compilers", "CSE4001"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(stored_blob_count(&f.storage), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_creates_no_row() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("uploads");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let storage = Arc::new(LocalStorage::new(StorageConfig {
            upload_dir: blocker,
            public_path: "/uploads".to_string(),
            max_file_size: 1024,
        }));
        let repository = Arc::new(InMemoryPaperRepository::new());
        let service = PaperService::new(repository.clone(), storage);

        let err = service
            .upload_paper(pdf(b"%PDF"), metadata("Databases", "CSE2004"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert!(repository.is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_by_views_then_insertion() {
        let f = fixture();
        let mut ids = Vec::new();
        for code in ["CSE1001", "CSE1002", "CSE1003"] {
            let title: String = Words(2..4).fake::<Vec<String>>().join(" ");
            let paper = f
                .service
                .upload_paper(pdf(b"%PDF"), metadata(&title, code))
                .await
                .unwrap();
            ids.push(paper.id);
        }

        f.service.record_view(ids[2]).await.unwrap();

        let listed: Vec<Uuid> = f
            .service
            .list_papers(PaperFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(listed, vec![ids[2], ids[0], ids[1]]);
    }

    #[tokio::test]
    async fn test_list_empty_catalog() {
        let f = fixture();
        let papers = f.service.list_papers(PaperFilter::default()).await.unwrap();
        assert!(papers.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let f = fixture();
        f.service
            .upload_paper(pdf(b"%PDF"), metadata("Data Structures", "CSE2001"))
            .await
            .unwrap();
        let mut fat = metadata("Operating Systems", "CSE2005");
        fat.exam_type = ExamType::Fat;
        fat.semester = Semester::Winter;
        f.service.upload_paper(pdf(b"%PDF"), fat).await.unwrap();

        let by_search = f
            .service
            .list_papers(PaperFilter {
                search: Some("data".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].subject_code, "CSE2001");

        let by_code = f
            .service
            .list_papers(PaperFilter {
                search: Some("cse2005".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_code.len(), 1);

        let fats = f
            .service
            .list_papers(PaperFilter {
                exam_type: Some(ExamType::Fat),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(fats.len(), 1);
        assert_eq!(fats[0].semester, Semester::Winter);
    }

    #[tokio::test]
    async fn test_concurrent_downloads_are_not_lost() {
        let f = fixture();
        let paper = f
            .service
            .upload_paper(pdf(b"%PDF"), metadata("Algorithms", "CSE3002"))
            .await
            .unwrap();

        let tasks = (0..50).map(|_| {
            let service = Arc::clone(&f.service);
            let id = paper.id;
            tokio::spawn(async move { service.record_download(id).await })
        });
        for result in join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let reloaded = f.service.get_paper(paper.id).await.unwrap();
        assert_eq!(reloaded.downloads, 50);
        assert_eq!(reloaded.views, 0);
    }

    #[tokio::test]
    async fn test_counters_on_unknown_paper() {
        let f = fixture();
        let missing = Uuid::now_v7();

        assert!(matches!(
            f.service.record_view(missing).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.service.record_download(missing).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.service.get_paper(missing).await,
            Err(AppError::NotFound(_))
        ));
    }
}
