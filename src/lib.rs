//! Vocalis - 文本转语音服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Job Context: 合成任务及其状态机
//! - Voice Context: 音色与音色参数
//!
//! 应用层 (application/):
//! - Ports: 端口定义（JobQueue, TtsProvider, AudioStorage）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//! - ProviderRegistry: 按名称选择 Provider
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Memory: 有界内存任务队列
//! - Worker: 合成 worker pool
//! - Runtime: worker 与过期清理的启动和关闭
//! - Adapters: TTS Provider（ElevenLabs, HTTP, Fake）, 文件音频存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
