//! ElevenLabs Provider 实现

mod client;
mod provider;
mod voices;

pub use client::{ElevenLabsConfig, DEFAULT_BASE_URL, DEFAULT_MODEL_ID};
pub use provider::ElevenLabsProvider;
pub use voices::{resolve_voice_id, DEFAULT_VOICE_ID, VOICE_ALIASES};
