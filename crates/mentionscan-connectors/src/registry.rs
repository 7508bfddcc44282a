//! Connector lookup keyed by platform identifier.

use std::collections::HashMap;
use std::sync::Arc;

use mentionscan_core::Platform;

use crate::connector::PlatformConnector;

/// Closed set of available connectors, one per platform.
///
/// Replaces per-platform string branching: the orchestrator resolves each
/// requested platform here and dispatches through the
/// [`PlatformConnector`] capability. Registering a second connector for the
/// same platform replaces the first.
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: HashMap<Platform, Arc<dyn PlatformConnector>>,
}

impl ConnectorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector under its own [`PlatformConnector::platform`] key.
    pub fn register(&mut self, connector: Arc<dyn PlatformConnector>) {
        self.connectors.insert(connector.platform(), connector);
    }

    /// Builder-style [`ConnectorRegistry::register`].
    #[must_use]
    pub fn with(mut self, connector: Arc<dyn PlatformConnector>) -> Self {
        self.register(connector);
        self
    }

    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<Arc<dyn PlatformConnector>> {
        self.connectors.get(&platform).map(Arc::clone)
    }

    #[must_use]
    pub fn contains(&self, platform: Platform) -> bool {
        self.connectors.contains_key(&platform)
    }

    /// Registered platforms in canonical identifier order.
    #[must_use]
    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.connectors.keys().copied().collect();
        platforms.sort_unstable();
        platforms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use mentionscan_core::{FilterSpec, Mention};

    use super::*;
    use crate::error::ConnectorError;

    struct NoopConnector(Platform);

    #[async_trait]
    impl PlatformConnector for NoopConnector {
        fn platform(&self) -> Platform {
            self.0
        }

        async fn search(
            &self,
            _keywords: &[String],
            _filters: &FilterSpec,
            _timeout: Duration,
        ) -> Result<Vec<Mention>, ConnectorError> {
            Ok(vec![])
        }
    }

    #[test]
    fn registers_and_resolves_by_platform() {
        let registry = ConnectorRegistry::new()
            .with(Arc::new(NoopConnector(Platform::Reddit)))
            .with(Arc::new(NoopConnector(Platform::Mastodon)));
        assert!(registry.contains(Platform::Reddit));
        assert!(registry.get(Platform::Mastodon).is_some());
        assert!(registry.get(Platform::Twitter).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn platforms_are_sorted_canonically() {
        let registry = ConnectorRegistry::new()
            .with(Arc::new(NoopConnector(Platform::Twitter)))
            .with(Arc::new(NoopConnector(Platform::Hackernews)))
            .with(Arc::new(NoopConnector(Platform::Reddit)));
        assert_eq!(
            registry.platforms(),
            vec![Platform::Hackernews, Platform::Reddit, Platform::Twitter]
        );
    }

    #[test]
    fn reregistering_replaces_the_connector() {
        let mut registry = ConnectorRegistry::new();
        registry.register(Arc::new(NoopConnector(Platform::Reddit)));
        registry.register(Arc::new(NoopConnector(Platform::Reddit)));
        assert_eq!(registry.len(), 1);
    }
}
