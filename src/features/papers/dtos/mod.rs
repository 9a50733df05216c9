mod paper_dto;

pub use paper_dto::*;
