use std::path::PathBuf;
use thiserror::Error;

/// Conditions that stop a stage outright; everything else is logged and skipped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0} is not set. Please set it in your environment variables.")]
    MissingCredential(&'static str),
    #[error("required input file not found: {}", .0.display())]
    MissingInput(PathBuf),
}
