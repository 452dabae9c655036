use serde::{Deserialize, Serialize};

/// Display names of the default course authoring pipeline, in order.
pub const AUTHORING_STAGES: &[&str] = &[
    "Course Information",
    "PRD",
    "Design Workshop",
    "DDD",
    "Content Development",
    "Lab Design",
    "Visual Design",
    "Review",
    "Publish",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

impl Stage {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            completed: false,
        }
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

/// Builds stages numbered from 1 in the order the names are given.
pub fn pipeline_from_names<I, S>(names: I) -> Vec<Stage>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .zip(1u32..)
        .map(|(name, id)| Stage::new(id, name))
        .collect()
}

pub fn authoring_pipeline() -> Vec<Stage> {
    pipeline_from_names(AUTHORING_STAGES.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authoring_pipeline() {
        let stages = authoring_pipeline();
        assert_eq!(stages.len(), 9);
        assert_eq!(stages[0], Stage::new(1, "Course Information"));
        assert_eq!(stages[2].name, "Design Workshop");
        assert_eq!(stages[8], Stage::new(9, "Publish"));
        assert!(stages.iter().all(|s| !s.completed));
    }

    #[test]
    fn test_pipeline_from_names_numbers_from_one() {
        let stages = pipeline_from_names(vec!["Draft", "Review"]);
        let ids: Vec<u32> = stages.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(stages[1].name, "Review");
    }

    #[test]
    fn test_stage_serialization() {
        let stage = Stage::new(3, "Design Workshop").completed();
        let json = serde_json::to_string(&stage).unwrap();
        assert_eq!(json, r#"{"id":3,"name":"Design Workshop","completed":true}"#);

        let parsed: Stage = serde_json::from_str(r#"{"id":2,"name":"PRD"}"#).unwrap();
        assert_eq!(parsed, Stage::new(2, "PRD"));
    }
}
