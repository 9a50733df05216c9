#[cfg(test)]
mod memory;
mod paper_repository;

#[cfg(test)]
pub use memory::InMemoryPaperRepository;
pub use paper_repository::{PaperRepository, PgPaperRepository};
