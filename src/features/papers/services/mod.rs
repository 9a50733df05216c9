mod paper_service;

pub use paper_service::PaperService;
