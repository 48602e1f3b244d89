use std::fmt;

use chrono::{DateTime, Local};
use sae_model::{Assignment, RejectedRecord};
use sae_redcap::ImportOutcome;

/// How a project's numbering cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectStatus {
    /// No completed SAE reports.
    NoReports,
    /// Every completed report already has a well-formed number.
    UpToDate,
    /// Numbers computed but not written (dry run).
    Planned,
    /// Numbers written back.
    Imported,
    /// The cycle stopped; nothing was written.
    Failed(String),
}

impl ProjectStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::NoReports => "no reports",
            Self::UpToDate => "up to date",
            Self::Planned => "planned",
            Self::Imported => "imported",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(message) => write!(f, "failed: {message}"),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectResult {
    pub key: String,
    pub status: ProjectStatus,
    pub fetched: usize,
    pub participants: usize,
    pub already_numbered: usize,
    pub assignments: Vec<Assignment>,
    pub rejections: Vec<RejectedRecord>,
    pub import: Option<ImportOutcome>,
}

impl ProjectResult {
    pub fn new(key: impl Into<String>, status: ProjectStatus) -> Self {
        Self {
            key: key.into(),
            status,
            fetched: 0,
            participants: 0,
            already_numbered: 0,
            assignments: Vec::new(),
            rejections: Vec::new(),
            import: None,
        }
    }

    pub fn failed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(key, ProjectStatus::Failed(message.into()))
    }

    pub fn has_errors(&self) -> bool {
        matches!(self.status, ProjectStatus::Failed(_))
            || !self.rejections.is_empty()
            || self.import.is_some_and(|outcome| outcome.is_partial())
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub dry_run: bool,
    pub projects: Vec<ProjectResult>,
    pub plan_csv: Option<std::path::PathBuf>,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        self.projects.iter().any(ProjectResult::has_errors)
    }
}
