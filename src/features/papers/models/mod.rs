mod paper;

pub use paper::{ExamType, NewPaper, Paper, PaperFilter, Semester};
