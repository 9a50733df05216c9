mod paper_handler;

pub use paper_handler::*;
