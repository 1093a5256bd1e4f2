use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// The four tools the pipeline runs, in their fixed roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Black,
    Isort,
    Flake8,
    Mypy,
}

impl Tool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Black => "black",
            Tool::Isort => "isort",
            Tool::Flake8 => "flake8",
            Tool::Mypy => "mypy",
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Tool::Black => "formatter",
            Tool::Isort => "import sorter",
            Tool::Flake8 => "style checker",
            Tool::Mypy => "type checker",
        }
    }
}

/// What a step's non-zero exit means for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    Fatal,
    Advisory,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Fatal => "fatal",
            Policy::Advisory => "advisory",
        }
    }

    pub fn is_fatal(self) -> bool {
        matches!(self, Policy::Fatal)
    }
}

/// One pipeline step: which tool, and how to react if it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub tool: Tool,
    pub policy: Policy,
}

/// Mirrors the `report.json` structure written after a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub target: String,
    /// "pass" iff no correctness gate failed; advisory findings never flip it.
    pub outcome: String,
    /// Executed steps only — steps skipped by a gate failure do not appear.
    pub steps: Vec<StepResult>,
    pub summary: Summary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub tool: Tool,
    pub policy: Policy,
    pub status: String,
    pub log: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

/// Input to the lint pipeline.
pub struct PipelineInput {
    pub config: Config,
    pub target_dir: PathBuf,
}

/// Events emitted by the pipeline orchestrator.
#[derive(Debug)]
pub enum PipelineEvent {
    StepStarted(Step),
    Log { step: Step, line: String },
    StepFinished { step: Step, success: bool },
    Completed(RunReport),
    Aborted(String),
}
