//! Provider Queries

/// 服务健康检查
#[derive(Debug, Clone, Default)]
pub struct HealthQuery;

/// 列出所有 Provider
#[derive(Debug, Clone, Default)]
pub struct ListProvidersQuery;

/// 列出音色，provider 省略时使用默认 Provider
#[derive(Debug, Clone, Default)]
pub struct ListVoicesQuery {
    pub provider: Option<String>,
}
