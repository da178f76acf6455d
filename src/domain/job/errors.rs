//! Job Context - Errors

use thiserror::Error;

use super::JobStatus;

#[derive(Debug, Error, PartialEq)]
pub enum JobError {
    #[error("Text is required")]
    EmptyText,

    #[error("Invalid output format: {0}. Must be 'mp3' or 'wav'")]
    InvalidFormat(String),

    #[error("Invalid job status: {0}")]
    InvalidStatus(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Progress cannot go from {current} to {requested}")]
    ProgressRegression { current: u8, requested: u8 },

    #[error("Progress {0} is out of range for an unfinished job")]
    ProgressOutOfRange(u8),
}
