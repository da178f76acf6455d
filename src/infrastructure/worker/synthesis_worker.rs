//! Synthesis Worker Pool - Background Job Processor
//!
//! 固定数量的 worker 从队列领取任务，依次执行：
//! processing → 预估耗时 → 调用 Provider → 读取音频 → 存储 → completed。
//! 每个检查点都会写回注册表，读取方可观察到单调递增的进度。

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;

use crate::application::ports::{AudioStoragePort, JobQueuePort, QueueError, SynthesisRequest};
use crate::application::provider_registry::ProviderRegistry;
use crate::domain::{estimate_synthesis_duration, Job};

/// 进度检查点
const PROGRESS_ESTIMATED: u8 = 10;
const PROGRESS_SYNTHESIZING: u8 = 30;
const PROGRESS_SYNTHESIZED: u8 = 70;
const PROGRESS_DRAINED: u8 = 90;

/// Worker Pool 配置
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// worker 数量，即同时处理的最大任务数
    pub worker_count: usize,
    /// 结果保留时长（expires_at = completed_at + retention）
    pub retention: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            retention: Duration::from_secs(24 * 3600),
        }
    }
}

/// 流水线中断原因
enum Interrupt {
    /// 任务失败，记录错误信息并标记为 failed
    Failed(String),
    /// 无法写回注册表（任务已删除或状态冲突），放弃本次处理
    Abandoned(QueueError),
}

/// 单个任务的处理上下文，所有 worker 共享
struct Pipeline {
    queue: Arc<dyn JobQueuePort>,
    providers: Arc<ProviderRegistry>,
    storage: Arc<dyn AudioStoragePort>,
    retention: chrono::Duration,
}

impl Pipeline {
    async fn run_worker(self: Arc<Self>, worker_id: usize) {
        tracing::info!(worker_id = worker_id, "Worker started");

        while let Some(job) = self.queue.dequeue().await {
            self.process(worker_id, job).await;
        }

        tracing::info!(worker_id = worker_id, "Worker stopped");
    }

    async fn process(&self, worker_id: usize, mut job: Job) {
        let job_id = job.id().to_string();
        tracing::info!(
            worker_id = worker_id,
            job_id = %job_id,
            provider = %job.provider_name(),
            text_length = job.text_len(),
            "Processing job"
        );

        match self.execute(&mut job).await {
            Ok(()) => {
                tracing::info!(
                    worker_id = worker_id,
                    job_id = %job_id,
                    location = job.result_location().unwrap_or_default(),
                    "Job completed"
                );
            }
            Err(Interrupt::Failed(message)) => {
                tracing::error!(
                    worker_id = worker_id,
                    job_id = %job_id,
                    progress = job.progress(),
                    error = %message,
                    "Job failed"
                );
                if let Err(e) = job.fail(message) {
                    tracing::error!(job_id = %job_id, error = %e, "Failed to mark job as failed");
                    return;
                }
                if let Err(e) = self.queue.update_job(&job) {
                    tracing::error!(job_id = %job_id, error = %e, "Failed to persist job failure");
                }
            }
            Err(Interrupt::Abandoned(e)) => {
                tracing::error!(
                    worker_id = worker_id,
                    job_id = %job_id,
                    error = %e,
                    "Failed to update job, abandoning"
                );
            }
        }
    }

    async fn execute(&self, job: &mut Job) -> Result<(), Interrupt> {
        job.start_processing()
            .map_err(|e| Interrupt::Failed(e.to_string()))?;
        self.persist(job)?;

        let eta = Utc::now() + estimate_synthesis_duration(job.text_len());
        self.checkpoint(job, PROGRESS_ESTIMATED, Some(eta))?;
        self.checkpoint(job, PROGRESS_SYNTHESIZING, Some(eta))?;

        let provider = self.providers.get(job.provider_name()).ok_or_else(|| {
            Interrupt::Failed(format!("provider not registered: {}", job.provider_name()))
        })?;

        let request = SynthesisRequest {
            text: job.text().to_string(),
            voice_id: job.voice_id().to_string(),
            output_format: job.output_format(),
            settings: job.voice_settings().copied(),
        };
        let mut result = provider
            .synthesize(request)
            .await
            .map_err(|e| Interrupt::Failed(e.to_string()))?;

        self.checkpoint(job, PROGRESS_SYNTHESIZED, Some(eta))?;

        let mut audio = Vec::new();
        result
            .audio
            .read_to_end(&mut audio)
            .await
            .map_err(|e| Interrupt::Failed(e.to_string()))?;

        self.checkpoint(job, PROGRESS_DRAINED, None)?;

        let location = self
            .storage
            .store(job.id(), &audio, job.output_format())
            .await
            .map_err(|e| Interrupt::Failed(format!("failed to store audio: {}", e)))?;

        job.complete(location, self.retention)
            .map_err(|e| Interrupt::Failed(e.to_string()))?;
        self.persist(job)
    }

    fn checkpoint(
        &self,
        job: &mut Job,
        progress: u8,
        estimated_completion_at: Option<chrono::DateTime<Utc>>,
    ) -> Result<(), Interrupt> {
        job.update_progress(progress, estimated_completion_at)
            .map_err(|e| Interrupt::Failed(e.to_string()))?;
        self.persist(job)
    }

    fn persist(&self, job: &Job) -> Result<(), Interrupt> {
        self.queue.update_job(job).map_err(Interrupt::Abandoned)
    }
}

/// Worker Pool
///
/// 关闭时先关闭队列，再等待所有 worker 处理完剩余任务后退出
pub struct WorkerPool {
    config: WorkerPoolConfig,
    pipeline: Arc<Pipeline>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(
        config: WorkerPoolConfig,
        queue: Arc<dyn JobQueuePort>,
        providers: Arc<ProviderRegistry>,
        storage: Arc<dyn AudioStoragePort>,
    ) -> Self {
        let retention = chrono::Duration::from_std(config.retention)
            .unwrap_or_else(|_| chrono::Duration::days(36_500));

        Self {
            config,
            pipeline: Arc::new(Pipeline {
                queue,
                providers,
                storage,
                retention,
            }),
            handles: Vec::new(),
        }
    }

    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    /// 启动 worker，重复调用无效果
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let worker_count = self.config.worker_count.max(1);
        self.handles = (0..worker_count)
            .map(|worker_id| tokio::spawn(self.pipeline.clone().run_worker(worker_id)))
            .collect();

        tracing::info!(
            worker_count = worker_count,
            retention_secs = self.config.retention.as_secs(),
            "Worker pool started"
        );
    }

    /// 关闭队列并等待所有 worker 退出
    ///
    /// 已入队的任务会被处理完；调用方可用 `tokio::time::timeout` 限制等待时间
    pub async fn shutdown(&mut self) {
        self.pipeline.queue.close();

        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Worker task panicked");
            }
        }

        tracing::info!("Worker pool stopped");
    }
}
