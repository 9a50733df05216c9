//! Exam paper archive: catalog, ingestion and counters.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/papers` | List papers, most viewed first |
//! | POST | `/api/papers` | Upload a PDF with its metadata (multipart) |
//! | GET | `/api/papers/{id}` | Get one paper |
//! | POST | `/api/papers/{id}/view` | Count a preview |
//! | POST | `/api/papers/{id}/download` | Count a download |
//! | GET | `/uploads/{key}` | Stored PDF bytes |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgPaperRepository;
pub use services::PaperService;
