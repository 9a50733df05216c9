use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::papers::models::{NewPaper, Paper, PaperFilter};
use crate::features::papers::repositories::PaperRepository;

/// In-process catalog used by service and handler tests.
///
/// Rows are kept in insertion order; every operation holds the lock for
/// its whole read-modify-write, so increments are atomic like the SQL
/// `UPDATE ... SET c = c + 1`.
#[derive(Default)]
pub struct InMemoryPaperRepository {
    papers: Mutex<Vec<Paper>>,
    fail_inserts: AtomicBool,
}

impl InMemoryPaperRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `create` fail with a database error
    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.papers.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.lock().unwrap().is_empty()
    }

    fn update<F>(&self, id: Uuid, apply: F) -> Result<Paper>
    where
        F: FnOnce(&mut Paper),
    {
        let mut papers = self.papers.lock().unwrap();
        let paper = papers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Paper '{}' not found", id)))?;
        apply(paper);
        Ok(paper.clone())
    }
}

fn matches_filter(paper: &Paper, filter: &PaperFilter) -> bool {
    let search_ok = filter.search.as_ref().map_or(true, |needle| {
        let needle = needle.to_lowercase();
        paper.title.to_lowercase().contains(&needle)
            || paper.subject_code.to_lowercase().contains(&needle)
    });
    let exam_type_ok = filter
        .exam_type
        .map_or(true, |t| paper.exam_type == t.as_str());
    let semester_ok = filter
        .semester
        .map_or(true, |s| paper.semester == s.as_str());

    search_ok && exam_type_ok && semester_ok
}

#[async_trait]
impl PaperRepository for InMemoryPaperRepository {
    async fn list(&self, filter: &PaperFilter) -> Result<Vec<Paper>> {
        let papers = self.papers.lock().unwrap();
        let mut matching: Vec<Paper> = papers
            .iter()
            .filter(|p| matches_filter(p, filter))
            .cloned()
            .collect();
        // Stable sort keeps insertion order among equal view counts
        matching.sort_by(|a, b| b.views.cmp(&a.views));
        Ok(matching)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Paper> {
        self.papers
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Paper '{}' not found", id)))
    }

    async fn create(&self, paper: NewPaper) -> Result<Paper> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let row = Paper {
            id: paper.id,
            title: paper.title,
            subject_code: paper.subject_code,
            exam_type: paper.exam_type.as_str().to_string(),
            semester: paper.semester.as_str().to_string(),
            year: paper.year,
            file_path: paper.file_path,
            views: 0,
            downloads: 0,
            created_at: Utc::now(),
        };
        self.papers.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn increment_views(&self, id: Uuid) -> Result<Paper> {
        self.update(id, |p| p.views += 1)
    }

    async fn increment_downloads(&self, id: Uuid) -> Result<Paper> {
        self.update(id, |p| p.downloads += 1)
    }
}
