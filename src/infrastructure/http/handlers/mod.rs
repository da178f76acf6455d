//! HTTP Handlers

mod health;
mod jobs;
mod openapi;
mod providers;
mod tts;

pub use health::*;
pub use jobs::*;
pub use openapi::*;
pub use providers::*;
pub use tts::*;
