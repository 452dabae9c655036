use serde::{Deserialize, Serialize};

/// Course metadata captured on the Course Information stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseInfo {
    pub title: String,
    pub course_code: String,
    pub description: String,
    pub target_audience: String,
    pub duration: String,
    pub version: String,
    pub instructional_level: String,
    pub audience_skill_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl CourseInfo {
    /// Checks every field and reports all problems at once.
    pub fn validate(&self) -> Vec<FieldError> {
        let rules: [(&'static str, &str, usize, &str); 8] = [
            ("title", self.title.as_str(), 3, "Title must be at least 3 characters"),
            ("courseCode", self.course_code.as_str(), 1, "Course code is required"),
            ("description", self.description.as_str(), 10, "Description must be at least 10 characters"),
            ("targetAudience", self.target_audience.as_str(), 3, "Target audience is required"),
            ("duration", self.duration.as_str(), 1, "Duration is required"),
            ("version", self.version.as_str(), 1, "Version is required"),
            ("instructionalLevel", self.instructional_level.as_str(), 1, "Instructional level is required"),
            ("audienceSkillLevel", self.audience_skill_level.as_str(), 1, "Audience skill level is required"),
        ];

        rules
            .iter()
            .filter(|(_, value, min, _)| value.trim().chars().count() < *min)
            .map(|(field, _, _, message)| FieldError::new(*field, *message))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security_course() -> CourseInfo {
        CourseInfo {
            title: "AWS Security Fundamentals".to_string(),
            course_code: "SEC-101".to_string(),
            description: "A comprehensive course on AWS security best practices".to_string(),
            target_audience: "IT Security Professionals".to_string(),
            duration: "2 Days".to_string(),
            version: "1.0".to_string(),
            instructional_level: "200 (Intermediate)".to_string(),
            audience_skill_level: "Intermediate".to_string(),
        }
    }

    #[test]
    fn test_valid_course() {
        assert!(security_course().validate().is_empty());
        assert!(security_course().is_valid());
    }

    #[test]
    fn test_reports_every_failing_field() {
        let course = CourseInfo {
            title: "AW".to_string(),
            description: "Too short".to_string(),
            ..security_course()
        };
        let errors = course.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "description"]);
        assert_eq!(errors[0].message, "Title must be at least 3 characters");
    }

    #[test]
    fn test_whitespace_does_not_count() {
        let course = CourseInfo {
            course_code: "   ".to_string(),
            ..security_course()
        };
        let errors = course.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "courseCode");
    }

    #[test]
    fn test_empty_course_fails_everything() {
        assert_eq!(CourseInfo::default().validate().len(), 8);
    }

    #[test]
    fn test_course_deserialization() {
        let json = r#"{"title": "Intro to S3", "courseCode": "S3-201"}"#;
        let course: CourseInfo = serde_json::from_str(json).unwrap();
        assert_eq!(course.course_code, "S3-201");
        assert!(course.description.is_empty());
        assert!(!course.is_valid());
    }
}
