mod stage;
mod engine;
mod progress;

pub use stage::{authoring_pipeline, pipeline_from_names, Stage, AUTHORING_STAGES};
pub use engine::{WorkflowError, WorkflowState};
pub use progress::{ProgressView, StageStatus, StageView};
