//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "VOCALIS";

/// 未在配置中设置 API Key 时读取的环境变量
const ELEVENLABS_API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOCALIS_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOCALIS_SERVER__PORT=8080`
/// - `VOCALIS_QUEUE__WORKER_COUNT=8`
/// - `VOCALIS_STORAGE__RETENTION_HOURS=48`
/// - `VOCALIS_PROVIDERS__ELEVENLABS__API_KEY=...`（或 `ELEVENLABS_API_KEY`）
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 配置文件（默认值由 serde default 提供）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 2. 环境变量（最高优先级）
    // 例如: VOCALIS_QUEUE__CAPACITY=200
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let mut app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    if app_config.providers.elevenlabs.api_key.is_empty() {
        if let Ok(key) = std::env::var(ELEVENLABS_API_KEY_ENV) {
            app_config.providers.elevenlabs.api_key = key;
        }
    }

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.queue.worker_count == 0 {
        return Err(ConfigError::ValidationError(
            "Worker count must be greater than 0".to_string(),
        ));
    }

    if config.queue.capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Queue capacity must be greater than 0".to_string(),
        ));
    }

    if config.storage.retention_hours == 0 {
        return Err(ConfigError::ValidationError(
            "Retention hours must be greater than 0".to_string(),
        ));
    }

    if config.storage.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Sweep interval cannot be 0".to_string(),
        ));
    }

    let default_provider = config.tts.default_provider.as_str();
    if !config.providers.is_enabled(default_provider) {
        return Err(ConfigError::ValidationError(format!(
            "Default provider '{}' is not enabled",
            default_provider
        )));
    }

    // worker 数超过 Provider 并发上限时 Provider 可能限流，只提示不拒绝
    if let Some(max_concurrent) = config.providers.max_concurrent(default_provider) {
        if config.queue.worker_count > max_concurrent {
            tracing::warn!(
                worker_count = config.queue.worker_count,
                provider = %default_provider,
                max_concurrent = max_concurrent,
                "Worker count exceeds default provider concurrency limit"
            );
        }
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Default Provider: {}", config.tts.default_provider);
    tracing::info!("Default Voice: {}", config.tts.default_voice_id);
    tracing::info!("Max Sync Text Length: {}", config.tts.max_sync_text_length);
    tracing::info!("Sync Timeout: {}s", config.tts.sync_timeout_secs);
    tracing::info!(
        "ElevenLabs: enabled={}, api_key_set={}",
        config.providers.elevenlabs.enabled,
        !config.providers.elevenlabs.api_key.is_empty()
    );
    if config.providers.http.enabled {
        tracing::info!("HTTP TTS URL: {}", config.providers.http.url);
    }
    if config.providers.fake.enabled {
        tracing::info!("Fake Provider Latency: {}ms", config.providers.fake.latency_ms);
    }
    tracing::info!("Workers: {}", config.queue.worker_count);
    tracing::info!("Queue Capacity: {}", config.queue.capacity);
    tracing::info!("Audio Directory: {:?}", config.storage.audio_dir);
    tracing::info!("Retention: {}h", config.storage.retention_hours);
    tracing::info!("Sweep Interval: {}s", config.storage.sweep_interval_secs);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
