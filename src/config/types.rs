//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 合成默认值与同步路径限制
    #[serde(default)]
    pub tts: TtsConfig,

    /// 各 TTS Provider 配置
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// 任务队列配置
    #[serde(default)]
    pub queue: QueueConfig,

    /// 结果存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 结果保留时长，worker 与过期清理共用
    pub fn retention(&self) -> Duration {
        self.storage.retention()
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 关闭时等待 worker 处理剩余任务的最长时间（秒）
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// 合成配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// 未指定 provider 时使用的 Provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// 未指定音色时使用的音色 ID
    #[serde(default = "default_voice_id")]
    pub default_voice_id: String,

    /// 同步合成最大字符数
    #[serde(default = "default_max_sync_text_length")]
    pub max_sync_text_length: usize,

    /// 同步合成超时（秒）
    #[serde(default = "default_sync_timeout")]
    pub sync_timeout_secs: u64,
}

fn default_provider() -> String {
    "elevenlabs".to_string()
}

fn default_voice_id() -> String {
    "pNInz6obpgDQGcFmaJgB".to_string()
}

fn default_max_sync_text_length() -> usize {
    5000
}

fn default_sync_timeout() -> u64 {
    30
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_voice_id: default_voice_id(),
            max_sync_text_length: default_max_sync_text_length(),
            sync_timeout_secs: default_sync_timeout(),
        }
    }
}

impl TtsConfig {
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }
}

/// Provider 配置集合
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub elevenlabs: ElevenLabsProviderConfig,

    #[serde(default)]
    pub http: HttpProviderConfig,

    #[serde(default)]
    pub fake: FakeProviderConfig,
}

impl ProvidersConfig {
    /// 指定名称的 Provider 是否启用
    pub fn is_enabled(&self, name: &str) -> bool {
        match name {
            "elevenlabs" => self.elevenlabs.enabled,
            "http" => self.http.enabled,
            "fake" => self.fake.enabled,
            _ => false,
        }
    }

    /// 指定名称的 Provider 声明的并发上限
    pub fn max_concurrent(&self, name: &str) -> Option<usize> {
        match name {
            "elevenlabs" => Some(self.elevenlabs.max_concurrent),
            "http" => Some(self.http.max_concurrent),
            "fake" => Some(self.fake.max_concurrent),
            _ => None,
        }
    }
}

/// ElevenLabs 配置
#[derive(Debug, Clone, Deserialize)]
pub struct ElevenLabsProviderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API Key（也可通过 ELEVENLABS_API_KEY 设置）
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_elevenlabs_url")]
    pub base_url: String,

    #[serde(default = "default_elevenlabs_model")]
    pub model_id: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_elevenlabs_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_true() -> bool {
    true
}

fn default_elevenlabs_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_elevenlabs_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_provider_timeout() -> u64 {
    120
}

fn default_elevenlabs_max_concurrent() -> usize {
    4
}

impl Default for ElevenLabsProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            base_url: default_elevenlabs_url(),
            model_id: default_elevenlabs_model(),
            timeout_secs: default_provider_timeout(),
            max_concurrent: default_elevenlabs_max_concurrent(),
        }
    }
}

/// 自托管 HTTP TTS 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpProviderConfig {
    #[serde(default)]
    pub enabled: bool,

    /// TTS 服务基础 URL
    #[serde(default = "default_http_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_http_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_http_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_http_max_concurrent() -> usize {
    2
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_http_url(),
            timeout_secs: default_provider_timeout(),
            max_concurrent: default_http_max_concurrent(),
        }
    }
}

/// Fake Provider 配置（本地开发用）
#[derive(Debug, Clone, Deserialize)]
pub struct FakeProviderConfig {
    #[serde(default)]
    pub enabled: bool,

    /// 模拟合成延迟（毫秒）
    #[serde(default = "default_fake_latency")]
    pub latency_ms: u64,

    #[serde(default = "default_fake_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_fake_latency() -> u64 {
    200
}

fn default_fake_max_concurrent() -> usize {
    4
}

impl Default for FakeProviderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            latency_ms: default_fake_latency(),
            max_concurrent: default_fake_max_concurrent(),
        }
    }
}

/// 任务队列配置
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// worker 数量
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// 等待处理的任务上限
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_worker_count() -> usize {
    4
}

fn default_capacity() -> usize {
    100
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            capacity: default_capacity(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 音频存储目录
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    /// 结果保留时长（小时）
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,

    /// 过期清理间隔（秒）
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("./audio_cache")
}

fn default_retention_hours() -> u64 {
    24
}

fn default_sweep_interval() -> u64 {
    3600 // 1 小时
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            retention_hours: default_retention_hours(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl StorageConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_hours.saturating_mul(3600))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
