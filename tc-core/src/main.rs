mod config;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use catalog::{Catalog, CourseInfo, Project};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use workflow::{ProgressView, WorkflowError, WorkflowState};

use crate::config::{Config, LogConfig, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(name = "tc-core")]
#[command(about = "TrainCraft core CLI - project catalog, stage navigation, course validation")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Project catalog JSON file (overrides the config file)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dashboard stats and projects
    Projects,
    /// Open a project and write its workflow state file
    Open {
        project_id: String,
        /// Where to write the workflow state
        #[arg(long)]
        out: PathBuf,
    },
    /// Show the progress of a workflow state file
    Show {
        #[arg(long)]
        state: PathBuf,
    },
    /// Complete the current stage and move to the next one
    Advance {
        #[arg(long)]
        state: PathBuf,
    },
    /// Move back one stage
    Retreat {
        #[arg(long)]
        state: PathBuf,
    },
    /// Move directly to an unlocked stage
    Jump {
        target: u32,
        #[arg(long)]
        state: PathBuf,
    },
    /// Complete the final stage
    Finish {
        #[arg(long)]
        state: PathBuf,
    },
    /// Record a workflow state file back into the catalog file
    Save {
        project_id: String,
        #[arg(long)]
        state: PathBuf,
    },
    /// Validate a course information JSON file
    ValidateCourse {
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Advance,
    Retreat,
    Jump(u32),
    Finish,
}

impl Transition {
    fn apply(self, state: &WorkflowState) -> Result<WorkflowState, WorkflowError> {
        match self {
            Transition::Advance => state.advance(),
            Transition::Retreat => state.retreat(),
            Transition::Jump(target) => state.jump_to(target),
            Transition::Finish => state.finish(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorReport {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

impl From<&WorkflowError> for ErrorReport {
    fn from(err: &WorkflowError) -> Self {
        Self {
            error: ErrorBody {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ValidationResult {
    valid: bool,
    errors: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if cli.catalog.is_some() {
        config.catalog = cli.catalog.clone();
    }
    init_logging(&config.log);

    match cli.command {
        Commands::Projects => {
            let catalog = load_catalog(&config)?;
            let dashboard = catalog.dashboard(&config.pipeline())?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        Commands::Open { project_id, out } => {
            let view = open_project(&config, &project_id, &out)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Commands::Show { state } => {
            let view = read_state(&state)?.progress();
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Commands::Advance { state } => run_transition(&state, Transition::Advance)?,
        Commands::Retreat { state } => run_transition(&state, Transition::Retreat)?,
        Commands::Jump { target, state } => run_transition(&state, Transition::Jump(target))?,
        Commands::Finish { state } => run_transition(&state, Transition::Finish)?,
        Commands::Save { project_id, state } => {
            let project = save_project(&config, &project_id, &state)?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        Commands::ValidateCourse { file } => {
            let result = validate_course(&file)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A second init (tests) keeps the first subscriber
    let _ = if log.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn run_transition(path: &Path, step: Transition) -> Result<()> {
    match transition(path, step)? {
        Ok(view) => println!("{}", serde_json::to_string_pretty(&view)?),
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&ErrorReport::from(&err))?);
            std::process::exit(1);
        }
    }
    Ok(())
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    match &config.catalog {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog: {}", path.display())),
        None => Ok(Catalog::sample()),
    }
}

fn read_state(path: &Path) -> Result<WorkflowState> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    WorkflowState::from_json(&content)
        .with_context(|| format!("Invalid state file: {}", path.display()))
}

fn write_state(path: &Path, state: &WorkflowState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write state file: {}", path.display()))
}

fn open_project(config: &Config, project_id: &str, out: &Path) -> Result<ProgressView> {
    let catalog = load_catalog(config)?;
    let state = catalog.open(project_id, &config.pipeline())?;
    write_state(out, &state)?;
    Ok(state.progress())
}

/// Applies one step to a state file. A rejected step is returned as the
/// inner error and leaves the file untouched.
fn transition(path: &Path, step: Transition) -> Result<Result<ProgressView, WorkflowError>> {
    let state = read_state(path)?;
    match step.apply(&state) {
        Ok(next) => {
            write_state(path, &next)?;
            info!(
                state = %path.display(),
                stage = next.current_stage_id(),
                "workflow state updated"
            );
            Ok(Ok(next.progress()))
        }
        Err(err) => Ok(Err(err)),
    }
}

fn save_project(config: &Config, project_id: &str, state_path: &Path) -> Result<Project> {
    let Some(catalog_path) = &config.catalog else {
        bail!("saving requires a catalog file (--catalog or `catalog` in the config)");
    };

    let mut catalog = load_catalog(config)?;
    let state = read_state(state_path)?;
    let project = catalog.get_mut(project_id)?;
    project.record(&state, Utc::now());
    let project = project.clone();

    catalog
        .save(catalog_path)
        .with_context(|| format!("Failed to save catalog: {}", catalog_path.display()))?;
    Ok(project)
}

fn validate_course(file: &Path) -> Result<ValidationResult> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let course: CourseInfo = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            return Ok(ValidationResult {
                valid: false,
                errors: vec![format!("Invalid JSON: {}", e)],
            });
        }
    };

    let errors: Vec<String> = course
        .validate()
        .into_iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect();

    Ok(ValidationResult {
        valid: errors.is_empty(),
        errors,
    })
}
