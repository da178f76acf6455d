//! Job Query Handlers

use std::sync::Arc;
use std::time::Duration;

use crate::application::error::ApplicationError;
use crate::application::ports::{AudioStorageError, AudioStoragePort, JobQueuePort, StoredAudio};
use crate::application::queries::{GetJobResultQuery, GetJobStatusQuery, ListJobsQuery};
use crate::domain::{Job, JobStatus};

// ============================================================================
// Response DTOs
// ============================================================================

/// 任务结果
#[derive(Debug)]
pub struct JobResult {
    pub job_id: String,
    pub audio: StoredAudio,
}

impl JobResult {
    /// 下载文件名 `<job_id>.<ext>`
    pub fn filename(&self) -> String {
        format!("{}.{}", self.job_id, self.audio.format.extension())
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetJobStatus Handler
pub struct GetJobStatusHandler {
    queue: Arc<dyn JobQueuePort>,
}

impl GetJobStatusHandler {
    pub fn new(queue: Arc<dyn JobQueuePort>) -> Self {
        Self { queue }
    }

    pub fn handle(&self, query: GetJobStatusQuery) -> Result<Job, ApplicationError> {
        Ok(self.queue.get_job(&query.job_id)?)
    }
}

/// GetJobResult Handler
///
/// 判定顺序：不存在 → 未完成 → 已过期 → 读取存储（文件已被清理同样视为过期）
pub struct GetJobResultHandler {
    queue: Arc<dyn JobQueuePort>,
    storage: Arc<dyn AudioStoragePort>,
    retention: Duration,
}

impl GetJobResultHandler {
    pub fn new(
        queue: Arc<dyn JobQueuePort>,
        storage: Arc<dyn AudioStoragePort>,
        retention: Duration,
    ) -> Self {
        Self {
            queue,
            storage,
            retention,
        }
    }

    fn expired(&self) -> ApplicationError {
        ApplicationError::Expired {
            retention_hours: self.retention.as_secs() / 3600,
        }
    }

    pub async fn handle(&self, query: GetJobResultQuery) -> Result<JobResult, ApplicationError> {
        let job = self.queue.get_job(&query.job_id)?;

        if job.status() != JobStatus::Completed {
            return Err(ApplicationError::NotYetComplete {
                status: job.status(),
            });
        }

        if job.is_expired() {
            return Err(self.expired());
        }

        let audio = match self.storage.retrieve(job.id()).await {
            Ok(audio) => audio,
            Err(AudioStorageError::NotFound(_)) => {
                tracing::debug!(job_id = %job.id(), "Result audio already swept");
                return Err(self.expired());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(JobResult {
            job_id: job.id().to_string(),
            audio,
        })
    }
}

/// ListJobs Handler
pub struct ListJobsHandler {
    queue: Arc<dyn JobQueuePort>,
}

impl ListJobsHandler {
    pub fn new(queue: Arc<dyn JobQueuePort>) -> Self {
        Self { queue }
    }

    pub fn handle(&self, query: ListJobsQuery) -> Vec<Job> {
        self.queue.list_jobs(query.status)
    }
}
