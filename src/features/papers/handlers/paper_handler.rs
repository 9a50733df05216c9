use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppPath, AppQuery};
use crate::features::papers::dtos::{
    ListPapersQuery, PaperResponseDto, UploadPaperDto, UploadPaperForm, UploadedFile,
};
use crate::features::papers::services::PaperService;
use crate::shared::types::{ApiResponse, Meta};

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

/// Read the upload form, keeping the last value of repeated fields
async fn read_upload_form(mut multipart: Multipart) -> Result<UploadPaperForm> {
    let mut form = UploadPaperForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;

                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            "title" => form.title = Some(field.text().await.map_err(multipart_error)?),
            "subjectCode" | "subject_code" => {
                form.subject_code = Some(field.text().await.map_err(multipart_error)?)
            }
            "examType" | "exam_type" => {
                form.exam_type = Some(field.text().await.map_err(multipart_error)?)
            }
            "semester" => form.semester = Some(field.text().await.map_err(multipart_error)?),
            "year" => form.year = Some(field.text().await.map_err(multipart_error)?),
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    Ok(form)
}

/// List papers
///
/// Returns every paper ordered by views (most viewed first). Papers with
/// equal views keep their upload order.
#[utoipa::path(
    get,
    path = "/api/papers",
    tag = "papers",
    params(ListPapersQuery),
    responses(
        (status = 200, description = "Papers, most viewed first", body = ApiResponse<Vec<PaperResponseDto>>),
        (status = 400, description = "Invalid filter"),
        (status = 500, description = "Database error")
    )
)]
pub async fn list_papers(
    State(service): State<Arc<PaperService>>,
    AppQuery(query): AppQuery<ListPapersQuery>,
) -> Result<Json<ApiResponse<Vec<PaperResponseDto>>>> {
    let papers = service.list_papers(query.into()).await?;
    let total = papers.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(papers),
        None,
        Some(Meta { total }),
    )))
}

/// Upload a paper
///
/// Accepts multipart/form-data with:
/// - `file`: the PDF (required, `application/pdf`)
/// - `title`, `subjectCode`, `examType` (CAT/FAT), `semester`
///   (Fall/Winter/Summer), `year` (required)
#[utoipa::path(
    post,
    path = "/api/papers",
    tag = "papers",
    request_body(
        content = UploadPaperDto,
        content_type = "multipart/form-data",
        description = "PDF plus paper metadata",
    ),
    responses(
        (status = 201, description = "Paper uploaded", body = ApiResponse<PaperResponseDto>),
        (status = 400, description = "Missing or invalid field"),
        (status = 413, description = "File too large"),
        (status = 500, description = "Storage or database error")
    )
)]
pub async fn upload_paper(
    State(service): State<Arc<PaperService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<PaperResponseDto>>)> {
    let (file, metadata) = read_upload_form(multipart).await?.into_parts()?;

    let paper = service.upload_paper(file, metadata).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(paper), None, None)),
    ))
}

/// Get a paper by id
#[utoipa::path(
    get,
    path = "/api/papers/{id}",
    tag = "papers",
    params(
        ("id" = Uuid, Path, description = "Paper id")
    ),
    responses(
        (status = 200, description = "Paper found", body = ApiResponse<PaperResponseDto>),
        (status = 404, description = "Paper not found")
    )
)]
pub async fn get_paper(
    State(service): State<Arc<PaperService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<PaperResponseDto>>> {
    let paper = service.get_paper(id).await?;
    Ok(Json(ApiResponse::success(Some(paper), None, None)))
}

/// Record a preview of a paper
#[utoipa::path(
    post,
    path = "/api/papers/{id}/view",
    tag = "papers",
    params(
        ("id" = Uuid, Path, description = "Paper id")
    ),
    responses(
        (status = 200, description = "View counted", body = ApiResponse<PaperResponseDto>),
        (status = 404, description = "Paper not found"),
        (status = 500, description = "Database error")
    )
)]
pub async fn record_view(
    State(service): State<Arc<PaperService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<PaperResponseDto>>> {
    let paper = service.record_view(id).await?;
    Ok(Json(ApiResponse::success(Some(paper), None, None)))
}

/// Record a download of a paper
#[utoipa::path(
    post,
    path = "/api/papers/{id}/download",
    tag = "papers",
    params(
        ("id" = Uuid, Path, description = "Paper id")
    ),
    responses(
        (status = 200, description = "Download counted", body = ApiResponse<PaperResponseDto>),
        (status = 404, description = "Paper not found"),
        (status = 500, description = "Database error")
    )
)]
pub async fn record_download(
    State(service): State<Arc<PaperService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<PaperResponseDto>>> {
    let paper = service.record_download(id).await?;
    Ok(Json(ApiResponse::success(Some(paper), None, None)))
}
