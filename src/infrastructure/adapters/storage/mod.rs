//! Storage Adapter - 音频结果存储

mod file_storage;
mod sweeper;

pub use file_storage::FileAudioStorage;
pub use sweeper::spawn_expiration_sweeper;
