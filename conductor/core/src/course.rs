//! Course Records
//!
//! The course service returns each course as a free-form JSON object. The
//! Conductor never interprets those fields; it carries them through the
//! session log untouched. [`CourseCard`] is the read-only view a surface
//! derives when it wants to draw a card.

use serde::{Deserialize, Serialize};

/// Maximum number of industry domains shown on a card
const MAX_DOMAINS: usize = 3;
/// Maximum number of skills shown on a card
const MAX_SKILLS: usize = 4;

/// An opaque course record as returned by the course service
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseRecord(pub serde_json::Map<String, serde_json::Value>);

impl CourseRecord {
    /// Look up a string field
    ///
    /// Non-string values and empty strings read as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Number of fields in the record
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for CourseRecord {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

/// Difficulty bucket used to pick a badge style
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelTier {
    /// Beginner or basic courses
    Beginner,
    /// Intermediate courses
    Intermediate,
    /// Advanced courses
    Advanced,
    /// No recognisable level
    Unrated,
}

impl LevelTier {
    /// Classify a free-text course level
    pub fn classify(level: &str) -> Self {
        let level = level.to_lowercase();
        if level.contains("beginner") || level.contains("basic") {
            Self::Beginner
        } else if level.contains("advanced") {
            Self::Advanced
        } else if level.contains("intermediate") {
            Self::Intermediate
        } else {
            Self::Unrated
        }
    }
}

/// Display model for a single course card
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseCard {
    /// Course title
    pub name: String,
    /// Owning department
    pub department: Option<String>,
    /// Course type (certification, workshop, ...)
    pub course_type: Option<String>,
    /// Learning pathway blurb
    pub pathway: Option<String>,
    /// Level as written by the service
    pub level: Option<String>,
    /// Level bucket for badge styling
    pub tier: LevelTier,
    /// Up to three industry domains
    pub domains: Vec<String>,
    /// Up to four skills
    pub skills: Vec<String>,
    /// Job role the course skills for
    pub job_role: Option<String>,
}

impl CourseCard {
    /// Derive a card from a service record
    pub fn from_record(record: &CourseRecord) -> Self {
        let level = record.get_str("Course Level").map(String::from);
        let tier = level
            .as_deref()
            .map_or(LevelTier::Unrated, LevelTier::classify);

        let job_role = record
            .get_str("Job role to skill")
            .or_else(|| record.get_str("job role to skill"))
            .filter(|role| !is_nan(role))
            .map(String::from);

        Self {
            name: record
                .get_str("Course Name")
                .unwrap_or("Unknown Course")
                .to_string(),
            department: record.get_str("Department").map(String::from),
            course_type: record.get_str("Course type").map(String::from),
            pathway: record.get_str("Course Pathway").map(String::from),
            level,
            tier,
            domains: split_list(record.get_str("Industry Domain"), MAX_DOMAINS),
            skills: split_list(record.get_str("Skills"), MAX_SKILLS),
            job_role,
        }
    }
}

/// Split a comma-separated field, dropping blanks and spreadsheet "nan" cells
fn split_list(raw: Option<&str>, limit: usize) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty() && !is_nan(item))
            .take(limit)
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn is_nan(value: &str) -> bool {
    value.eq_ignore_ascii_case("nan")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(value: serde_json::Value) -> CourseRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_card() {
        let card = CourseCard::from_record(&record(serde_json::json!({
            "Course Name": "Applied Machine Learning",
            "Department": "Computer Science",
            "Skills": "Python, NumPy, nan, , Pandas, scikit-learn, PyTorch",
            "Industry Domain": "Tech, Finance, Health, Retail",
            "Course type": "Certification",
            "Course Pathway": "Data Science Track",
            "Course Level": "Intermediate",
            "Job role to skill": "ML Engineer",
        })));

        assert_eq!(card.name, "Applied Machine Learning");
        assert_eq!(card.department.as_deref(), Some("Computer Science"));
        assert_eq!(card.course_type.as_deref(), Some("Certification"));
        assert_eq!(card.pathway.as_deref(), Some("Data Science Track"));
        assert_eq!(card.tier, LevelTier::Intermediate);
        assert_eq!(card.domains, vec!["Tech", "Finance", "Health"]);
        assert_eq!(
            card.skills,
            vec!["Python", "NumPy", "Pandas", "scikit-learn"]
        );
        assert_eq!(card.job_role.as_deref(), Some("ML Engineer"));
    }

    #[test]
    fn test_sparse_card_defaults() {
        let card = CourseCard::from_record(&record(serde_json::json!({
            "Course Level": 3,
            "job role to skill": "NaN",
        })));

        assert_eq!(card.name, "Unknown Course");
        assert_eq!(card.level, None);
        assert_eq!(card.tier, LevelTier::Unrated);
        assert!(card.domains.is_empty());
        assert!(card.skills.is_empty());
        assert_eq!(card.job_role, None);
    }

    #[test]
    fn test_lowercase_job_role_key() {
        let card = CourseCard::from_record(&record(serde_json::json!({
            "job role to skill": "Data Analyst",
        })));
        assert_eq!(card.job_role.as_deref(), Some("Data Analyst"));
    }

    #[test]
    fn test_level_tiers() {
        assert_eq!(LevelTier::classify("Basic"), LevelTier::Beginner);
        assert_eq!(LevelTier::classify("BEGINNER friendly"), LevelTier::Beginner);
        assert_eq!(LevelTier::classify("Advanced"), LevelTier::Advanced);
        assert_eq!(LevelTier::classify("Intermediate"), LevelTier::Intermediate);
        assert_eq!(LevelTier::classify("Expert"), LevelTier::Unrated);
    }

    #[test]
    fn test_record_round_trips_unknown_fields() {
        let value = serde_json::json!({"Course Name": "Go", "rating": 4.5});
        let rec = record(value.clone());
        assert_eq!(rec.len(), 2);
        assert_eq!(serde_json::to_value(&rec).unwrap(), value);
    }
}
