mod course;
mod project;
mod dashboard;

pub use course::{CourseInfo, FieldError};
pub use project::{Project, ProjectStatus};
pub use dashboard::{Catalog, CatalogError, Dashboard, DashboardStats, ProjectSummary};
