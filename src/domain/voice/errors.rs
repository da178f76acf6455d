//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum VoiceError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    SettingOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
