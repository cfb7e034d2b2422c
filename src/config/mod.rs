use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{missing_settings, InitResult};

/// Maps a platform key to its settings payload (credentials, log level,
/// feature flags, `strict_parameters`).
///
/// How settings are loaded is out of scope; hosts bring their own
/// implementation (settings store, config file, remote config). The registry
/// calls `resolve` once per adapter during registration, and a missing
/// payload is an init failure that disables that adapter only.
pub trait ConfigResolver: Send + Sync {
    fn resolve(&self, platform_key: &str) -> InitResult<Map<String, Value>>;
}

/// In-memory resolver for hosts with static configuration and for tests.
#[derive(Clone, Debug, Default)]
pub struct StaticConfigResolver {
    platforms: HashMap<String, Map<String, Value>>,
}

impl StaticConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(
        mut self,
        key: impl Into<String>,
        settings: Map<String, Value>,
    ) -> Self {
        self.platforms.insert(key.into(), settings);
        self
    }
}

impl ConfigResolver for StaticConfigResolver {
    fn resolve(&self, platform_key: &str) -> InitResult<Map<String, Value>> {
        self.platforms
            .get(platform_key)
            .cloned()
            .ok_or_else(|| missing_settings(format!("no settings for platform `{platform_key}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_registered_platform() {
        let mut settings = Map::new();
        settings.insert("api_key".into(), json!("k-123"));
        let resolver = StaticConfigResolver::new().with_platform("flurry", settings);

        let resolved = resolver.resolve("flurry").unwrap();
        assert_eq!(resolved.get("api_key"), Some(&json!("k-123")));
    }

    #[test]
    fn unknown_platform_is_missing_settings() {
        let resolver = StaticConfigResolver::new();
        let err = resolver.resolve("nope").unwrap_err();
        assert_eq!(err.code_str(), "platform/missing-settings");
    }
}
