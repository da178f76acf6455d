//! TTS Adapter - TTS Provider 实现

mod elevenlabs;
mod factory;
mod fake_tts_provider;
mod http_tts_provider;
mod response;

pub use elevenlabs::*;
pub use factory::build_provider_registry;
pub use fake_tts_provider::{FakeTtsProvider, FakeTtsProviderConfig};
pub use http_tts_provider::{HttpTtsProvider, HttpTtsProviderConfig};
