use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::papers::models::{NewPaper, Paper, PaperFilter};

/// Storage-side operations on the paper catalog
#[async_trait]
pub trait PaperRepository: Send + Sync {
    /// All matching papers, most viewed first, ties in insertion order
    async fn list(&self, filter: &PaperFilter) -> Result<Vec<Paper>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Paper>;

    /// Insert a paper with zeroed counters
    async fn create(&self, paper: NewPaper) -> Result<Paper>;

    /// Atomically add one to `views` and return the updated row
    async fn increment_views(&self, id: Uuid) -> Result<Paper>;

    /// Atomically add one to `downloads` and return the updated row
    async fn increment_downloads(&self, id: Uuid) -> Result<Paper>;
}

const PAPER_COLUMNS: &str =
    "id, title, subject_code, exam_type, semester, year, file_path, views, downloads, created_at";

/// Escape LIKE wildcards so user input matches literally
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn paper_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Paper '{}' not found", id))
}

/// PostgreSQL implementation backed by the `papers` table
pub struct PgPaperRepository {
    pool: PgPool,
}

impl PgPaperRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaperRepository for PgPaperRepository {
    async fn list(&self, filter: &PaperFilter) -> Result<Vec<Paper>> {
        let query = format!(
            r#"
            SELECT {PAPER_COLUMNS}
            FROM papers
            WHERE ($1::text IS NULL OR title ILIKE $1 OR subject_code ILIKE $1)
              AND ($2::text IS NULL OR exam_type = $2)
              AND ($3::text IS NULL OR semester = $3)
            ORDER BY views DESC, created_at ASC, id ASC
            "#
        );

        sqlx::query_as::<_, Paper>(&query)
            .bind(filter.search.as_deref().map(like_pattern))
            .bind(filter.exam_type.map(|t| t.as_str()))
            .bind(filter.semester.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list papers: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Paper> {
        let query = format!("SELECT {PAPER_COLUMNS} FROM papers WHERE id = $1");

        sqlx::query_as::<_, Paper>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| paper_not_found(id))
    }

    async fn create(&self, paper: NewPaper) -> Result<Paper> {
        let query = format!(
            r#"
            INSERT INTO papers (id, title, subject_code, exam_type, semester, year, file_path, views, downloads)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0)
            RETURNING {PAPER_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Paper>(&query)
            .bind(paper.id)
            .bind(&paper.title)
            .bind(&paper.subject_code)
            .bind(paper.exam_type.as_str())
            .bind(paper.semester.as_str())
            .bind(paper.year)
            .bind(&paper.file_path)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn increment_views(&self, id: Uuid) -> Result<Paper> {
        let query = format!(
            "UPDATE papers SET views = views + 1 WHERE id = $1 RETURNING {PAPER_COLUMNS}"
        );

        sqlx::query_as::<_, Paper>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| paper_not_found(id))
    }

    async fn increment_downloads(&self, id: Uuid) -> Result<Paper> {
        let query = format!(
            "UPDATE papers SET downloads = downloads + 1 WHERE id = $1 RETURNING {PAPER_COLUMNS}"
        );

        sqlx::query_as::<_, Paper>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| paper_not_found(id))
    }
}
