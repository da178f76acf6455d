//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（JobQueue、TtsProvider、AudioStorage）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - provider_registry: 按名称选择 TTS Provider
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod provider_registry;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::{DeleteJobHandler, SubmitJobHandler, SynthesizeConfig, SynthesizeHandler},
    DeleteJobCommand, SubmitJobCommand, SubmitJobResponse, SynthesizeCommand, SynthesizeResponse,
};

pub use error::ApplicationError;

pub use ports::{
    // Audio storage
    AudioStorageError,
    AudioStoragePort,
    StoredAudio,
    // Job queue
    JobQueuePort,
    QueueError,
    QueueStats,
    // TTS provider
    ActiveJobCounter,
    AudioStream,
    ProviderStatus,
    SynthesisRequest,
    SynthesisResult,
    TtsError,
    TtsProviderPort,
};

pub use provider_registry::ProviderRegistry;

pub use queries::{
    handlers::{
        GetJobResultHandler, GetJobStatusHandler, HealthHandler, HealthReport, HealthStatus,
        JobResult, ListJobsHandler, ListProvidersHandler, ListVoicesHandler, ProviderInfo,
        ProviderList, VoiceList,
    },
    GetJobResultQuery, GetJobStatusQuery, HealthQuery, ListJobsQuery, ListProvidersQuery,
    ListVoicesQuery,
};
