use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::papers::models::{ExamType, Paper, PaperFilter, Semester};

/// Earliest exam year accepted by the archive
pub const MIN_EXAM_YEAR: i32 = 2000;

/// Allowed MIME types for paper uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &["application/pdf"];

/// Check if a declared content type is an allowed PDF type
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_MIME_TYPES.contains(&essence.as_str())
}

/// Upload paper request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct UploadPaperDto {
    /// The PDF to upload
    #[schema(format = Binary, content_media_type = "application/pdf")]
    pub file: String,
    #[schema(example = "Data Structures")]
    pub title: String,
    #[schema(example = "CSE2001")]
    pub subject_code: String,
    #[schema(example = "CAT")]
    pub exam_type: String,
    #[schema(example = "Fall")]
    pub semester: String,
    #[schema(example = 2023)]
    pub year: i32,
}

/// PDF part of an upload, as received
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Validated paper metadata from an upload form
#[derive(Debug, Clone, Validate)]
pub struct CreatePaperDto {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 32, message = "subjectCode must be 1-32 characters"))]
    pub subject_code: String,
    pub exam_type: ExamType,
    pub semester: Semester,
    #[validate(range(min = 2000, message = "year must be 2000 or later"))]
    pub year: i32,
}

/// Raw multipart fields collected by the upload handler
#[derive(Debug, Default)]
pub struct UploadPaperForm {
    pub file: Option<UploadedFile>,
    pub title: Option<String>,
    pub subject_code: Option<String>,
    pub exam_type: Option<String>,
    pub semester: Option<String>,
    pub year: Option<String>,
}

/// Trimmed, non-blank value of an optional text field
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl UploadPaperForm {
    /// Check that every required field is present and parse the typed ones.
    ///
    /// All missing fields are reported together.
    pub fn into_parts(self) -> Result<(UploadedFile, CreatePaperDto), AppError> {
        let title = present(self.title);
        let subject_code = present(self.subject_code);
        let exam_type = present(self.exam_type);
        let semester = present(self.semester);
        let year = present(self.year);

        let mut missing = Vec::new();
        if self.file.is_none() {
            missing.push("file");
        }
        if title.is_none() {
            missing.push("title");
        }
        if subject_code.is_none() {
            missing.push("subjectCode");
        }
        if exam_type.is_none() {
            missing.push("examType");
        }
        if semester.is_none() {
            missing.push("semester");
        }
        if year.is_none() {
            missing.push("year");
        }

        let (
            Some(file),
            Some(title),
            Some(subject_code),
            Some(exam_type),
            Some(semester),
            Some(year),
        ) = (self.file, title, subject_code, exam_type, semester, year)
        else {
            return Err(AppError::BadRequest(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        let year = year
            .parse::<i32>()
            .map_err(|_| AppError::BadRequest(format!("year must be an integer (got '{}')", year)))?;
        let exam_type = exam_type.parse::<ExamType>().map_err(AppError::BadRequest)?;
        let semester = semester.parse::<Semester>().map_err(AppError::BadRequest)?;

        Ok((
            file,
            CreatePaperDto {
                title,
                subject_code,
                exam_type,
                semester,
                year,
            },
        ))
    }
}

/// Response DTO for a paper
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaperResponseDto {
    pub id: Uuid,
    #[schema(example = "Data Structures")]
    pub title: String,
    #[schema(example = "CSE2001")]
    pub subject_code: String,
    pub exam_type: ExamType,
    pub semester: Semester,
    #[schema(example = 2023)]
    pub year: i32,
    /// URL path the PDF is served under
    #[schema(example = "/uploads/0190c2a4-7f3e-7c1a-9d2b-1a2b3c4d5e6f-cse2001.pdf")]
    pub file_path: String,
    pub views: i64,
    pub downloads: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Paper> for PaperResponseDto {
    type Error = AppError;

    fn try_from(paper: Paper) -> Result<Self, Self::Error> {
        let exam_type = paper.exam_type.parse::<ExamType>().map_err(|e| {
            AppError::Internal(format!("Paper {} has invalid exam type: {}", paper.id, e))
        })?;
        let semester = paper.semester.parse::<Semester>().map_err(|e| {
            AppError::Internal(format!("Paper {} has invalid semester: {}", paper.id, e))
        })?;

        Ok(Self {
            id: paper.id,
            title: paper.title,
            subject_code: paper.subject_code,
            exam_type,
            semester,
            year: paper.year,
            file_path: paper.file_path,
            views: paper.views,
            downloads: paper.downloads,
            created_at: paper.created_at,
        })
    }
}

/// Query params for listing papers
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPapersQuery {
    /// Case-insensitive search on title or subject code
    pub q: Option<String>,
    /// Only papers of this exam type (CAT or FAT, any case)
    #[serde(default, deserialize_with = "optional_from_str")]
    pub exam_type: Option<ExamType>,
    /// Only papers from this semester (Fall, Winter or Summer, any case)
    #[serde(default, deserialize_with = "optional_from_str")]
    pub semester: Option<Semester>,
}

/// Parse an optional query value through `FromStr`, so filters accept the
/// same spellings as the upload form. A blank value means no filter.
fn optional_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match present(Option::<String>::deserialize(deserializer)?) {
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl From<ListPapersQuery> for PaperFilter {
    fn from(query: ListPapersQuery) -> Self {
        Self {
            search: present(query.q),
            exam_type: query.exam_type,
            semester: query.semester,
        }
    }
}
