use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Invalid stage sequence: {0}")]
    InvalidStageSequence(String),

    #[error("No stage after stage {current}")]
    NoNextStage { current: u32 },

    #[error("Already at the first stage")]
    NoPreviousStage,

    #[error("Stage {target} is locked until the stage before it is completed")]
    StageLocked { target: u32 },

    #[error("Unknown stage: {0}")]
    UnknownStage(u32),

    #[error("Stage {current} is not the final stage ({last})")]
    NotAtFinalStage { current: u32, last: u32 },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl WorkflowError {
    /// Stable code for callers that branch on the failure rather than display it.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::InvalidStageSequence(_) => "invalid_stage_sequence",
            WorkflowError::NoNextStage { .. } => "no_next_stage",
            WorkflowError::NoPreviousStage => "no_previous_stage",
            WorkflowError::StageLocked { .. } => "stage_locked",
            WorkflowError::UnknownStage(_) => "unknown_stage",
            WorkflowError::NotAtFinalStage { .. } => "not_at_final_stage",
            WorkflowError::SerializationError(_) => "serialization_error",
        }
    }
}

/// Stage progression for one open project.
///
/// Every value upholds the same invariants: stage ids run 1..=N in order,
/// the current stage exists, and completed stages form an unbroken prefix.
/// Transitions never mutate; they hand back a new state or an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawWorkflowState")]
pub struct WorkflowState {
    stages: Vec<Stage>,
    current_stage_id: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWorkflowState {
    stages: Vec<Stage>,
    current_stage_id: u32,
}

impl TryFrom<RawWorkflowState> for WorkflowState {
    type Error = WorkflowError;

    fn try_from(raw: RawWorkflowState) -> Result<Self, Self::Error> {
        WorkflowState::initialize(raw.stages, raw.current_stage_id)
    }
}

impl WorkflowState {
    pub fn initialize(stages: Vec<Stage>, start_stage_id: u32) -> Result<Self, WorkflowError> {
        if stages.is_empty() {
            return Err(WorkflowError::InvalidStageSequence(
                "pipeline has no stages".to_string(),
            ));
        }

        for (expected, stage) in (1u32..).zip(&stages) {
            if stage.id != expected {
                return Err(WorkflowError::InvalidStageSequence(format!(
                    "expected stage id {}, found {}",
                    expected, stage.id
                )));
            }
        }

        // Completed stages must be a prefix of the pipeline
        if let Some(open) = stages.iter().find(|s| !s.completed) {
            if let Some(done) = stages.iter().find(|s| s.completed && s.id > open.id) {
                return Err(WorkflowError::InvalidStageSequence(format!(
                    "stage {} is completed but stage {} is not",
                    done.id, open.id
                )));
            }
        }

        let last = stages.len() as u32;
        if start_stage_id == 0 || start_stage_id > last {
            return Err(WorkflowError::InvalidStageSequence(format!(
                "start stage {} is not in the pipeline (1..={})",
                start_stage_id, last
            )));
        }

        if start_stage_id > 1 && !stages[start_stage_id as usize - 2].completed {
            return Err(WorkflowError::StageLocked {
                target: start_stage_id,
            });
        }

        Ok(Self {
            stages,
            current_stage_id: start_stage_id,
        })
    }

    // Queries
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn current_stage_id(&self) -> u32 {
        self.current_stage_id
    }

    pub fn current_stage(&self) -> &Stage {
        &self.stages[Self::slot(self.current_stage_id)]
    }

    pub fn stage(&self, id: u32) -> Option<&Stage> {
        if id == 0 {
            return None;
        }
        self.stages.get(Self::slot(id))
    }

    pub fn last_stage_id(&self) -> u32 {
        self.stages.len() as u32
    }

    pub fn completed_count(&self) -> usize {
        self.stages.iter().filter(|s| s.completed).count()
    }

    pub fn is_terminal(&self) -> bool {
        self.current_stage_id == self.last_stage_id() && self.current_stage().completed
    }

    pub fn can_advance(&self) -> bool {
        self.current_stage_id < self.last_stage_id()
    }

    pub fn can_retreat(&self) -> bool {
        self.current_stage_id > 1
    }

    pub fn can_jump_to(&self, target: u32) -> bool {
        if self.stage(target).is_none() {
            return false;
        }
        target <= self.current_stage_id || self.stages[Self::slot(target) - 1].completed
    }

    // Transitions
    pub fn advance(&self) -> Result<Self, WorkflowError> {
        if !self.can_advance() {
            debug!(current = self.current_stage_id, "advance rejected at final stage");
            return Err(WorkflowError::NoNextStage {
                current: self.current_stage_id,
            });
        }

        let mut stages = self.stages.clone();
        stages[Self::slot(self.current_stage_id)].completed = true;
        let next = self.current_stage_id + 1;

        debug!(from = self.current_stage_id, to = next, "advanced workflow stage");
        Ok(Self {
            stages,
            current_stage_id: next,
        })
    }

    pub fn retreat(&self) -> Result<Self, WorkflowError> {
        if !self.can_retreat() {
            debug!("retreat rejected at first stage");
            return Err(WorkflowError::NoPreviousStage);
        }

        let previous = self.current_stage_id - 1;
        debug!(from = self.current_stage_id, to = previous, "retreated workflow stage");
        Ok(Self {
            stages: self.stages.clone(),
            current_stage_id: previous,
        })
    }

    pub fn jump_to(&self, target: u32) -> Result<Self, WorkflowError> {
        if self.stage(target).is_none() {
            debug!(stage = target, "jump rejected, unknown stage");
            return Err(WorkflowError::UnknownStage(target));
        }
        if !self.can_jump_to(target) {
            debug!(from = self.current_stage_id, stage = target, "jump rejected, stage locked");
            return Err(WorkflowError::StageLocked { target });
        }

        debug!(from = self.current_stage_id, to = target, "jumped to workflow stage");
        Ok(Self {
            stages: self.stages.clone(),
            current_stage_id: target,
        })
    }

    /// Marks the final stage completed, reaching the terminal state.
    /// Repeating it at the terminal state is a no-op.
    pub fn finish(&self) -> Result<Self, WorkflowError> {
        let last = self.last_stage_id();
        if self.current_stage_id != last {
            return Err(WorkflowError::NotAtFinalStage {
                current: self.current_stage_id,
                last,
            });
        }

        let mut stages = self.stages.clone();
        stages[Self::slot(last)].completed = true;

        debug!(stage = last, "finished workflow");
        Ok(Self {
            stages,
            current_stage_id: last,
        })
    }

    // Serialization
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, WorkflowError> {
        serde_json::from_str(json)
            .map_err(|e| WorkflowError::SerializationError(e.to_string()))
    }

    fn slot(id: u32) -> usize {
        id as usize - 1
    }
}
