//! Job Runtime - 任务生命周期编排
//!
//! 启动 worker pool 与过期清理任务，二者使用同一个保留时长；
//! 关闭顺序：关闭队列 → 等待 worker 处理完剩余任务（有超时）→ 停止清理任务。

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{AudioStoragePort, JobQueuePort};
use crate::application::provider_registry::ProviderRegistry;
use crate::infrastructure::adapters::spawn_expiration_sweeper;
use crate::infrastructure::worker::{WorkerPool, WorkerPoolConfig};

/// 运行时配置
#[derive(Debug, Clone)]
pub struct JobRuntimeConfig {
    pub worker_count: usize,
    /// 结果保留时长
    pub retention: Duration,
    /// 过期清理间隔
    pub sweep_interval: Duration,
}

/// 任务运行时
pub struct JobRuntime {
    retention: Duration,
    workers: WorkerPool,
    sweeper: JoinHandle<()>,
    sweeper_shutdown: CancellationToken,
}

impl JobRuntime {
    /// 启动 worker 与过期清理
    pub fn start(
        config: JobRuntimeConfig,
        queue: Arc<dyn JobQueuePort>,
        providers: Arc<ProviderRegistry>,
        storage: Arc<dyn AudioStoragePort>,
    ) -> Self {
        let retention = config.retention;

        let mut workers = WorkerPool::new(
            WorkerPoolConfig {
                worker_count: config.worker_count,
                retention,
            },
            queue,
            providers,
            storage.clone(),
        );
        workers.start();

        let sweeper_shutdown = CancellationToken::new();
        let sweeper = spawn_expiration_sweeper(
            storage,
            retention,
            config.sweep_interval,
            sweeper_shutdown.clone(),
        );

        Self {
            retention,
            workers,
            sweeper,
            sweeper_shutdown,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// 关闭运行时，返回 worker 是否在超时前全部退出
    pub async fn shutdown(mut self, timeout: Duration) -> bool {
        tracing::info!(timeout_secs = timeout.as_secs(), "Shutting down job runtime");

        let drained = tokio::time::timeout(timeout, self.workers.shutdown())
            .await
            .is_ok();
        if !drained {
            tracing::warn!(
                timeout_secs = timeout.as_secs(),
                "Workers did not finish before shutdown timeout"
            );
        }

        self.sweeper_shutdown.cancel();
        if let Err(e) = self.sweeper.await {
            tracing::error!(error = %e, "Expiration sweeper panicked");
        }

        tracing::info!(drained = drained, "Job runtime stopped");
        drained
    }
}
