//! Provider Registry - 按名称选择 TTS Provider
//!
//! 所有 Provider 通过 `TtsProviderPort` 动态分发，新增后端只需注册

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::ports::TtsProviderPort;

/// Provider 注册表
///
/// 第一个注册的 Provider 默认为 default，可通过 `set_default` 修改
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn TtsProviderPort>>,
    default_name: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册 Provider，同名覆盖
    pub fn register(&mut self, provider: Arc<dyn TtsProviderPort>) -> &mut Self {
        let name = provider.name().to_string();
        if self.default_name.is_none() {
            self.default_name = Some(name.clone());
        }
        tracing::info!(
            provider = %name,
            max_concurrent = provider.max_concurrent(),
            "Provider registered"
        );
        self.providers.insert(name, provider);
        self
    }

    /// 设置默认 Provider，名称未注册时返回 false
    pub fn set_default(&mut self, name: &str) -> bool {
        if self.providers.contains_key(name) {
            self.default_name = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TtsProviderPort>> {
        self.providers.get(name).cloned()
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    pub fn default_provider(&self) -> Option<Arc<dyn TtsProviderPort>> {
        self.default_name().and_then(|name| self.get(name))
    }

    /// 按名称解析，未指定时使用默认 Provider
    pub fn resolve(&self, name: Option<&str>) -> Option<Arc<dyn TtsProviderPort>> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => self.get(name),
            None => self.default_provider(),
        }
    }

    /// 所有 Provider（按名称排序）
    pub fn all(&self) -> Vec<Arc<dyn TtsProviderPort>> {
        self.providers.values().cloned().collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::{FakeTtsProvider, FakeTtsProviderConfig};

    fn fake(name: &str) -> Arc<dyn TtsProviderPort> {
        Arc::new(FakeTtsProvider::new(FakeTtsProviderConfig {
            name: name.to_string(),
            ..Default::default()
        }))
    }

    #[test]
    fn test_first_registered_is_default() {
        let mut registry = ProviderRegistry::new();
        registry.register(fake("alpha")).register(fake("beta"));

        assert_eq!(registry.default_name(), Some("alpha"));
        assert_eq!(registry.resolve(None).unwrap().name(), "alpha");
        assert_eq!(registry.resolve(Some("")).unwrap().name(), "alpha");
        assert_eq!(registry.resolve(Some("beta")).unwrap().name(), "beta");
        assert!(registry.resolve(Some("gamma")).is_none());
    }

    #[test]
    fn test_set_default() {
        let mut registry = ProviderRegistry::new();
        registry.register(fake("alpha")).register(fake("beta"));

        assert!(registry.set_default("beta"));
        assert_eq!(registry.default_provider().unwrap().name(), "beta");
        assert!(!registry.set_default("missing"));
        assert_eq!(registry.default_name(), Some("beta"));
    }

    #[test]
    fn test_all_sorted_by_name() {
        let mut registry = ProviderRegistry::new();
        registry.register(fake("zeta")).register(fake("alpha"));
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
        assert_eq!(registry.all().len(), 2);
    }
}
