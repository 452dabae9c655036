use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use workflow::{Stage, WorkflowState};

use crate::course::CourseInfo;
use crate::dashboard::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProjectStatus {
    pub fn of(state: &WorkflowState) -> Self {
        if state.is_terminal() {
            ProjectStatus::Completed
        } else if state.completed_count() == 0 && state.current_stage_id() == 1 {
            ProjectStatus::NotStarted
        } else {
            ProjectStatus::InProgress
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "not-started",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "Not Started",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
        }
    }
}

/// A stored authoring project. Only the completed prefix length and the
/// current stage are kept; the full workflow state is rebuilt on open and
/// the status is always derived from it, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(flatten)]
    pub course: CourseInfo,
    pub current_stage: u32,
    #[serde(default)]
    pub completed_stages: u32,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: impl Into<String>, course: CourseInfo, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            course,
            current_stage: 1,
            completed_stages: 0,
            updated_at,
        }
    }

    pub fn at_stage(mut self, current_stage: u32, completed_stages: u32) -> Self {
        self.current_stage = current_stage;
        self.completed_stages = completed_stages;
        self
    }

    fn workflow(&self, pipeline: &[Stage]) -> Result<WorkflowState, CatalogError> {
        let stages = pipeline
            .iter()
            .cloned()
            .map(|mut stage| {
                stage.completed = stage.id <= self.completed_stages;
                stage
            })
            .collect();

        Ok(WorkflowState::initialize(stages, self.current_stage)?)
    }

    /// Builds the workflow state for the project view over `pipeline`.
    pub fn open(&self, pipeline: &[Stage]) -> Result<WorkflowState, CatalogError> {
        let state = self.workflow(pipeline)?;
        info!(
            project = %self.id,
            stage = state.current_stage_id(),
            completed = state.completed_count(),
            "opened project"
        );
        Ok(state)
    }

    /// Status of the stored progress over `pipeline`. Fails when the record
    /// does not form a valid workflow on that pipeline.
    pub fn status(&self, pipeline: &[Stage]) -> Result<ProjectStatus, CatalogError> {
        Ok(ProjectStatus::of(&self.workflow(pipeline)?))
    }

    /// Stores the progress of an open workflow back on the record.
    pub fn record(&mut self, state: &WorkflowState, now: DateTime<Utc>) {
        self.current_stage = state.current_stage_id();
        self.completed_stages = state.completed_count() as u32;
        self.updated_at = now;
        info!(
            project = %self.id,
            stage = self.current_stage,
            status = ProjectStatus::of(state).as_str(),
            "recorded project progress"
        );
    }
}
