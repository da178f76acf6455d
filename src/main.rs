//! Vocalis - 文本转语音服务
//!
//! 启动顺序：配置 → 日志 → Provider → 存储与队列 → worker 与过期清理 → HTTP
//! 关闭顺序：停止 HTTP → 关闭队列并等待 worker → 停止过期清理

use std::sync::Arc;

use vocalis::config::{load_config, print_config, LogConfig};
use vocalis::infrastructure::adapters::{build_provider_registry, FileAudioStorage};
use vocalis::infrastructure::http::{AppState, HttpServer, StateSettings};
use vocalis::infrastructure::memory::InMemoryJobQueue;
use vocalis::infrastructure::runtime::{JobRuntime, JobRuntimeConfig};

/// 初始化日志，`RUST_LOG` 优先于配置中的日志级别
fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},vocalis={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// 等待 ctrl-c 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Received shutdown signal");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);
    print_config(&config);

    // TTS Providers
    let providers = Arc::new(
        build_provider_registry(&config.providers, &config.tts.default_provider)
            .map_err(|e| anyhow::anyhow!("Failed to create TTS providers: {}", e))?,
    );

    // 结果存储与任务队列
    let storage = Arc::new(FileAudioStorage::new(&config.storage.audio_dir).await?);
    let queue = InMemoryJobQueue::new(config.queue.capacity).arc();

    // worker 与过期清理使用同一保留时长
    let retention = config.retention();
    let runtime = JobRuntime::start(
        JobRuntimeConfig {
            worker_count: config.queue.worker_count,
            retention,
            sweep_interval: config.storage.sweep_interval(),
        },
        queue.clone(),
        providers.clone(),
        storage.clone(),
    );

    let state = AppState::new(
        queue,
        providers,
        storage,
        StateSettings {
            default_voice_id: config.tts.default_voice_id.clone(),
            max_sync_text_length: config.tts.max_sync_text_length,
            sync_timeout: config.tts.sync_timeout(),
            retention,
        },
    );

    let server = HttpServer::new(config.server.addr(), state);
    let served = server.run_with_shutdown(shutdown_signal()).await;

    // HTTP 退出后（包括启动失败）仍然关闭队列并等待 worker
    let drained = runtime.shutdown(config.server.shutdown_timeout()).await;
    if !drained {
        tracing::warn!("Some jobs were still in flight at shutdown");
    }

    served?;
    tracing::info!("Server shutdown complete");

    Ok(())
}
