use utoipa::{Modify, OpenApi};

use crate::features::papers::{dtos as papers_dtos, handlers as papers_handlers, models as papers_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Papers
        papers_handlers::list_papers,
        papers_handlers::upload_paper,
        papers_handlers::get_paper,
        papers_handlers::record_view,
        papers_handlers::record_download,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Papers
            papers_models::ExamType,
            papers_models::Semester,
            papers_dtos::UploadPaperDto,
            papers_dtos::PaperResponseDto,
            ApiResponse<papers_dtos::PaperResponseDto>,
            ApiResponse<Vec<papers_dtos::PaperResponseDto>>,
        )
    ),
    tags(
        (name = "papers", description = "Exam paper catalog, uploads and view/download counters"),
    ),
    info(
        title = "Paper Archive API",
        version = "0.1.0",
        description = "API documentation for the exam paper archive",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
