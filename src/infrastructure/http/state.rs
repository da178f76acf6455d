//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    // Command handlers
    DeleteJobHandler, SubmitJobHandler, SynthesizeConfig, SynthesizeHandler,
    // Query handlers
    GetJobResultHandler, GetJobStatusHandler, HealthHandler, ListJobsHandler,
    ListProvidersHandler, ListVoicesHandler,
    // Ports
    AudioStoragePort, JobQueuePort, ProviderRegistry,
};

/// 请求处理相关设置
#[derive(Debug, Clone)]
pub struct StateSettings {
    pub default_voice_id: String,
    pub max_sync_text_length: usize,
    pub sync_timeout: Duration,
    /// 结果保留时长，需与 Worker 和清理任务一致
    pub retention: Duration,
}

/// 应用状态
pub struct AppState {
    // ========== Command Handlers ==========
    pub synthesize_handler: SynthesizeHandler,
    pub submit_job_handler: SubmitJobHandler,
    pub delete_job_handler: DeleteJobHandler,

    // ========== Query Handlers ==========
    pub get_job_status_handler: GetJobStatusHandler,
    pub get_job_result_handler: GetJobResultHandler,
    pub list_jobs_handler: ListJobsHandler,
    pub health_handler: HealthHandler,
    pub list_providers_handler: ListProvidersHandler,
    pub list_voices_handler: ListVoicesHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        queue: Arc<dyn JobQueuePort>,
        providers: Arc<ProviderRegistry>,
        storage: Arc<dyn AudioStoragePort>,
        settings: StateSettings,
    ) -> Self {
        Self {
            // Command handlers
            synthesize_handler: SynthesizeHandler::new(
                providers.clone(),
                SynthesizeConfig {
                    default_voice_id: settings.default_voice_id.clone(),
                    max_text_length: settings.max_sync_text_length,
                    timeout: settings.sync_timeout,
                },
            ),
            submit_job_handler: SubmitJobHandler::new(
                queue.clone(),
                providers.clone(),
                settings.default_voice_id,
            ),
            delete_job_handler: DeleteJobHandler::new(queue.clone(), storage.clone()),

            // Query handlers
            get_job_status_handler: GetJobStatusHandler::new(queue.clone()),
            get_job_result_handler: GetJobResultHandler::new(
                queue.clone(),
                storage,
                settings.retention,
            ),
            list_jobs_handler: ListJobsHandler::new(queue.clone()),
            health_handler: HealthHandler::new(queue, providers.clone()),
            list_providers_handler: ListProvidersHandler::new(providers.clone()),
            list_voices_handler: ListVoicesHandler::new(providers),
        }
    }
}
