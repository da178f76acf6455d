//! 过期音频定时清理

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::application::ports::AudioStoragePort;

/// 启动定时清理任务，每个 interval 删除早于 retention 的音频
///
/// 首次清理在一个 interval 之后；单次清理失败只记录日志，不终止任务
pub fn spawn_expiration_sweeper(
    storage: Arc<dyn AudioStoragePort>,
    retention: Duration,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tracing::info!(
        retention_secs = retention.as_secs(),
        interval_secs = interval.as_secs(),
        "Expiration sweeper started"
    );

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = storage.sweep_expired(retention).await {
                        tracing::error!(error = %e, "Expired audio sweep failed");
                    }
                }
            }
        }

        tracing::info!("Expiration sweeper stopped");
    })
}
