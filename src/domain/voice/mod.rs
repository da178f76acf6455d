//! Voice Context - 音色与音色参数

mod errors;
mod value_objects;

pub use errors::VoiceError;
pub use value_objects::{Voice, VoiceSettings};
