use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use workflow::{Stage, WorkflowError, WorkflowState};

use crate::course::CourseInfo;
use crate::project::{Project, ProjectStatus};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Duplicate project id: {0}")]
    DuplicateProject(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Failed to access catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CatalogError {
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::ProjectNotFound(_) => "project_not_found",
            CatalogError::DuplicateProject(_) => "duplicate_project",
            CatalogError::Workflow(e) => e.kind(),
            CatalogError::Io { .. } => "io_error",
            CatalogError::SerializationError(_) => "serialization_error",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub not_started: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary<'a> {
    #[serde(flatten)]
    pub project: &'a Project,
    pub status: ProjectStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard<'a> {
    pub stats: DashboardStats,
    pub projects: Vec<ProjectSummary<'a>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    projects: Vec<Project>,
}

impl Catalog {
    pub fn new(projects: Vec<Project>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for project in &projects {
            if !seen.insert(project.id.as_str()) {
                return Err(CatalogError::DuplicateProject(project.id.clone()));
            }
        }
        Ok(Self { projects })
    }

    /// The two demo projects shown on a fresh dashboard.
    pub fn sample() -> Self {
        let security = CourseInfo {
            title: "AWS Security Fundamentals".to_string(),
            course_code: "SEC-101".to_string(),
            description: "A comprehensive course on AWS security best practices".to_string(),
            target_audience: "IT Security Professionals".to_string(),
            duration: "2 Days".to_string(),
            version: "1.0".to_string(),
            instructional_level: "200 (Intermediate)".to_string(),
            audience_skill_level: "Intermediate".to_string(),
        };
        let storage = CourseInfo {
            title: "Introduction to Amazon S3".to_string(),
            course_code: "S3-201".to_string(),
            ..CourseInfo::default()
        };

        Self {
            projects: vec![
                Project::new("example-project", security, utc(2023, 10, 15, 14, 30))
                    .at_stage(3, 2),
                Project::new("example-project-2", storage, utc(2023, 10, 14, 10, 15)),
            ],
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let parsed: Catalog = serde_json::from_str(json)
            .map_err(|e| CatalogError::SerializationError(e.to_string()))?;
        Self::new(parsed.projects)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&content)?;
        debug!(path = %path.display(), projects = catalog.projects.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        fs::write(path, self.to_json()).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Result<&Project, CatalogError> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::ProjectNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Project, CatalogError> {
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::ProjectNotFound(id.to_string()))
    }

    pub fn open(&self, id: &str, pipeline: &[Stage]) -> Result<WorkflowState, CatalogError> {
        self.get(id)?.open(pipeline)
    }

    /// Projects, most recently updated first.
    pub fn recent(&self) -> Vec<&Project> {
        let mut projects: Vec<&Project> = self.projects.iter().collect();
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        projects
    }

    /// Counts projects by the status their progress has on `pipeline`.
    pub fn stats(&self, pipeline: &[Stage]) -> Result<DashboardStats, CatalogError> {
        let mut stats = DashboardStats {
            total: self.projects.len(),
            ..DashboardStats::default()
        };
        for project in &self.projects {
            match project.status(pipeline)? {
                ProjectStatus::NotStarted => stats.not_started += 1,
                ProjectStatus::InProgress => stats.in_progress += 1,
                ProjectStatus::Completed => stats.completed += 1,
            }
        }
        Ok(stats)
    }

    pub fn dashboard(&self, pipeline: &[Stage]) -> Result<Dashboard<'_>, CatalogError> {
        let projects = self
            .recent()
            .into_iter()
            .map(|project| {
                Ok(ProjectSummary {
                    project,
                    status: project.status(pipeline)?,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(Dashboard {
            stats: self.stats(pipeline)?,
            projects,
        })
    }
}

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}
