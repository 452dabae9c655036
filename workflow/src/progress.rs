use serde::{Deserialize, Serialize};

use crate::engine::WorkflowState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Current,
    Completed,
    Available,
    Locked,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Current => "current",
            StageStatus::Completed => "completed",
            StageStatus::Available => "available",
            StageStatus::Locked => "locked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageView {
    pub id: u32,
    pub name: String,
    pub status: StageStatus,
}

/// What a progress bar and its Previous / Next Stage buttons need to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub stages: Vec<StageView>,
    pub current_stage_id: u32,
    pub completed: usize,
    pub total: usize,
    pub percent_complete: u8,
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub finished: bool,
}

impl WorkflowState {
    pub fn stage_status(&self, id: u32) -> Option<StageStatus> {
        let stage = self.stage(id)?;
        let status = if id == self.current_stage_id() {
            StageStatus::Current
        } else if stage.completed {
            StageStatus::Completed
        } else if self.can_jump_to(id) {
            StageStatus::Available
        } else {
            StageStatus::Locked
        };
        Some(status)
    }

    pub fn progress(&self) -> ProgressView {
        ProgressView::from(self)
    }
}

impl From<&WorkflowState> for ProgressView {
    fn from(state: &WorkflowState) -> Self {
        let stages = state
            .stages()
            .iter()
            .map(|stage| StageView {
                id: stage.id,
                name: stage.name.clone(),
                status: state
                    .stage_status(stage.id)
                    .unwrap_or(StageStatus::Locked),
            })
            .collect();

        let completed = state.completed_count();
        let total = state.stages().len();

        Self {
            stages,
            current_stage_id: state.current_stage_id(),
            completed,
            total,
            percent_complete: (completed * 100 / total) as u8,
            previous_enabled: state.can_retreat(),
            next_enabled: state.can_advance(),
            finished: state.is_terminal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{authoring_pipeline, pipeline_from_names};

    #[test]
    fn test_fresh_pipeline_view() {
        let state = WorkflowState::initialize(authoring_pipeline(), 1).unwrap();
        let view = state.progress();

        assert_eq!(view.total, 9);
        assert_eq!(view.completed, 0);
        assert_eq!(view.percent_complete, 0);
        assert!(!view.previous_enabled);
        assert!(view.next_enabled);
        assert_eq!(view.stages[0].status, StageStatus::Current);
        assert!(view.stages[1..].iter().all(|s| s.status == StageStatus::Locked));
    }

    #[test]
    fn test_statuses_after_revisit() {
        let state = WorkflowState::initialize(authoring_pipeline(), 1)
            .unwrap()
            .advance()
            .unwrap()
            .advance()
            .unwrap()
            .jump_to(1)
            .unwrap();

        assert_eq!(state.stage_status(1), Some(StageStatus::Current));
        assert_eq!(state.stage_status(2), Some(StageStatus::Completed));
        assert_eq!(state.stage_status(3), Some(StageStatus::Available));
        assert_eq!(state.stage_status(4), Some(StageStatus::Locked));
        assert_eq!(state.stage_status(10), None);
    }

    #[test]
    fn test_current_takes_precedence_over_completed() {
        let mut stages = authoring_pipeline();
        stages[0].completed = true;
        let state = WorkflowState::initialize(stages, 1).unwrap();
        assert_eq!(state.stage_status(1), Some(StageStatus::Current));
        assert_eq!(state.stage_status(2), Some(StageStatus::Available));
    }

    #[test]
    fn test_finished_view() {
        let state = WorkflowState::initialize(pipeline_from_names(["A", "B"]), 1)
            .unwrap()
            .advance()
            .unwrap()
            .finish()
            .unwrap();
        let view = ProgressView::from(&state);

        assert!(view.finished);
        assert_eq!(view.percent_complete, 100);
        assert!(view.previous_enabled);
        assert!(!view.next_enabled);
    }

    #[test]
    fn test_view_serialization() {
        let state = WorkflowState::initialize(pipeline_from_names(["A", "B", "C"]), 1)
            .unwrap()
            .advance()
            .unwrap();
        let json = serde_json::to_value(state.progress()).unwrap();

        assert_eq!(json["currentStageId"], 2);
        assert_eq!(json["percentComplete"], 33);
        assert_eq!(json["stages"][0]["status"], "completed");
        assert_eq!(json["stages"][1]["status"], "current");
        assert_eq!(StageStatus::Available.as_str(), "available");
    }
}
