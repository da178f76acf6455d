//! Provider Query Handlers

use futures_util::future::join_all;
use serde::Serialize;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{JobQueuePort, ProviderStatus, QueueStats};
use crate::application::provider_registry::ProviderRegistry;
use crate::application::queries::{HealthQuery, ListProvidersQuery, ListVoicesQuery};
use crate::domain::Voice;

// ============================================================================
// Response DTOs
// ============================================================================

/// 整体健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// 健康检查报告
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: &'static str,
    pub providers: Vec<ProviderStatus>,
    pub queue: QueueStats,
}

/// Provider 信息
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProviderInfo {
    pub name: String,
    pub max_concurrent: usize,
    pub is_default: bool,
    pub is_available: bool,
}

/// Provider 列表
#[derive(Debug, Clone, Serialize)]
pub struct ProviderList {
    pub providers: Vec<ProviderInfo>,
    pub default_provider: Option<String>,
}

/// 音色列表，Provider 查询失败时 voices 为空且 voices_available 为 false
#[derive(Debug, Clone, Serialize)]
pub struct VoiceList {
    pub provider: String,
    pub voices: Vec<Voice>,
    pub voices_available: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health Handler
///
/// 任一 Provider 不可用时整体为 degraded
pub struct HealthHandler {
    queue: Arc<dyn JobQueuePort>,
    providers: Arc<ProviderRegistry>,
}

impl HealthHandler {
    pub fn new(queue: Arc<dyn JobQueuePort>, providers: Arc<ProviderRegistry>) -> Self {
        Self { queue, providers }
    }

    pub async fn handle(&self, _query: HealthQuery) -> HealthReport {
        let all = self.providers.all();
        let providers: Vec<ProviderStatus> =
            join_all(all.iter().map(|provider| provider.status())).await;

        let status = if providers.iter().all(|p| p.available) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION"),
            providers,
            queue: self.queue.stats(),
        }
    }
}

/// ListProviders Handler
pub struct ListProvidersHandler {
    providers: Arc<ProviderRegistry>,
}

impl ListProvidersHandler {
    pub fn new(providers: Arc<ProviderRegistry>) -> Self {
        Self { providers }
    }

    pub async fn handle(&self, _query: ListProvidersQuery) -> ProviderList {
        let default_name = self.providers.default_name();
        let all = self.providers.all();
        let availability = join_all(all.iter().map(|provider| provider.is_available())).await;

        let providers = all
            .iter()
            .zip(availability)
            .map(|(provider, is_available)| ProviderInfo {
                name: provider.name().to_string(),
                max_concurrent: provider.max_concurrent(),
                is_default: default_name == Some(provider.name()),
                is_available,
            })
            .collect();

        ProviderList {
            providers,
            default_provider: default_name.map(str::to_string),
        }
    }
}

/// ListVoices Handler
pub struct ListVoicesHandler {
    providers: Arc<ProviderRegistry>,
}

impl ListVoicesHandler {
    pub fn new(providers: Arc<ProviderRegistry>) -> Self {
        Self { providers }
    }

    pub async fn handle(&self, query: ListVoicesQuery) -> Result<VoiceList, ApplicationError> {
        let provider = self
            .providers
            .resolve(query.provider.as_deref())
            .ok_or_else(|| match query.provider.as_deref() {
                Some(name) if !name.trim().is_empty() => {
                    ApplicationError::validation(format!("Unknown provider: {}", name))
                }
                _ => ApplicationError::ProviderUnavailable(
                    "no TTS provider configured".to_string(),
                ),
            })?;

        let (voices, voices_available) = match provider.list_voices().await {
            Ok(voices) => (voices, true),
            Err(e) => {
                tracing::warn!(
                    provider = %provider.name(),
                    error = %e,
                    "Failed to list voices"
                );
                (Vec::new(), false)
            }
        };

        Ok(VoiceList {
            provider: provider.name().to_string(),
            voices,
            voices_available,
        })
    }
}
