use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Database model for an exam paper
#[derive(Debug, Clone, FromRow)]
pub struct Paper {
    pub id: Uuid,
    pub title: String,
    pub subject_code: String,
    pub exam_type: String,
    pub semester: String,
    pub year: i32,
    pub file_path: String,
    pub views: i64,
    pub downloads: i64,
    pub created_at: DateTime<Utc>,
}

/// Row to insert; counters always start at zero
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub id: Uuid,
    pub title: String,
    pub subject_code: String,
    pub exam_type: ExamType,
    pub semester: Semester,
    pub year: i32,
    pub file_path: String,
}

/// Optional narrowing of the catalog listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperFilter {
    /// Case-insensitive substring of title or subject code
    pub search: Option<String>,
    pub exam_type: Option<ExamType>,
    pub semester: Option<Semester>,
}

/// Continuous assessment test or final assessment test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ExamType {
    #[serde(rename = "CAT", alias = "cat")]
    Cat,
    #[serde(rename = "FAT", alias = "fat")]
    Fat,
}

impl ExamType {
    pub const ALL: [ExamType; 2] = [ExamType::Cat, ExamType::Fat];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Cat => "CAT",
            ExamType::Fat => "FAT",
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        ExamType::ALL
            .into_iter()
            .find(|exam_type| exam_type.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                let allowed: Vec<&str> = ExamType::ALL.iter().map(|e| e.as_str()).collect();
                format!(
                    "examType must be one of {} (got '{}')",
                    allowed.join(", "),
                    value
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Semester {
    #[serde(alias = "fall")]
    Fall,
    #[serde(alias = "winter")]
    Winter,
    #[serde(alias = "summer")]
    Summer,
}

impl Semester {
    pub const ALL: [Semester; 3] = [Semester::Fall, Semester::Winter, Semester::Summer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::Fall => "Fall",
            Semester::Winter => "Winter",
            Semester::Summer => "Summer",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Semester {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Semester::ALL
            .into_iter()
            .find(|semester| semester.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                let allowed: Vec<&str> = Semester::ALL.iter().map(|s| s.as_str()).collect();
                format!(
                    "semester must be one of {} (got '{}')",
                    allowed.join(", "),
                    value
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exam_type_parse_is_case_insensitive() {
        assert_eq!("CAT".parse::<ExamType>(), Ok(ExamType::Cat));
        assert_eq!(" fat ".parse::<ExamType>(), Ok(ExamType::Fat));
        assert!("midterm".parse::<ExamType>().is_err());
        assert!("".parse::<ExamType>().is_err());
    }

    #[test]
    fn test_semester_parse_is_case_insensitive() {
        assert_eq!("Fall".parse::<Semester>(), Ok(Semester::Fall));
        assert_eq!("WINTER".parse::<Semester>(), Ok(Semester::Winter));
        assert_eq!("summer".parse::<Semester>(), Ok(Semester::Summer));
        assert_eq!(
            "spring".parse::<Semester>(),
            Err("semester must be one of Fall, Winter, Summer (got 'spring')".to_string())
        );
    }

    #[test]
    fn test_db_representation_round_trips() {
        for exam_type in ExamType::ALL {
            assert_eq!(exam_type.as_str().parse::<ExamType>(), Ok(exam_type));
        }
        for semester in Semester::ALL {
            assert_eq!(semester.as_str().parse::<Semester>(), Ok(semester));
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_value(ExamType::Fat).unwrap(), "FAT");
        assert_eq!(serde_json::to_value(Semester::Winter).unwrap(), "Winter");
        assert_eq!(
            serde_json::from_str::<ExamType>("\"cat\"").unwrap(),
            ExamType::Cat
        );
    }
}
