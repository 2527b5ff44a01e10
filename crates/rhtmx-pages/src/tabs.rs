//! Tab index: the menu view of the registry
//!
//! Lists pages marked `tab` whose access is currently granted, in registry
//! order. Recomputed on every call.

use std::future::IntoFuture;

use serde::Serialize;
use tracing::Instrument;

use crate::access::{AccessEvaluator, StateHandle};
use crate::config::PagesConfig;
use crate::pattern::{PathNormalizer, RoutePattern};
use crate::registry::{PageRole, Registry};

/// One menu entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tab<C> {
    /// The page's `label` setting, else its registry key
    pub key: String,
    pub label: String,
    pub component: C,
    /// Where the tab navigates
    pub pattern: RoutePattern,
    pub title: Option<String>,
}

/// Builds tab lists from a registry
#[derive(Debug, Clone)]
pub struct TabIndex {
    normalizer: PathNormalizer,
    evaluator: AccessEvaluator,
    alias_root: String,
}

impl TabIndex {
    pub fn new(normalizer: PathNormalizer, evaluator: AccessEvaluator) -> Self {
        Self {
            normalizer,
            evaluator,
            alias_root: PagesConfig::default().alias_root(),
        }
    }

    pub fn from_config(config: &PagesConfig) -> Self {
        Self {
            normalizer: PathNormalizer::from_config(config),
            evaluator: AccessEvaluator::from_config(config),
            alias_root: config.alias_root(),
        }
    }

    /// Tabs visible under `state`
    ///
    /// Predicates run one after another in registry order; the call suspends
    /// while any of them does. Error aliases are listed like any page and
    /// point at their alias route. Layouts are never listed.
    pub async fn list<C: Clone>(&self, registry: &Registry<C>, state: &StateHandle) -> Vec<Tab<C>> {
        let mut tabs = Vec::new();

        for page in registry.iter().filter(|page| page.settings.tab) {
            let key_path = self.normalizer.key_path(&page.key);
            let pattern = match PageRole::classify(&page.settings, &key_path) {
                PageRole::Layout => continue,
                PageRole::ErrorAlias(error_type) => {
                    RoutePattern::literal(&format!("{}/{}", self.alias_root, error_type))
                }
                PageRole::Normal => self
                    .normalizer
                    .pattern_for(&key_path, page.settings.label.as_deref()),
            };

            let span = tracing::debug_span!("access", page = %page.key);
            let evaluation = {
                let _entered = span.enter();
                self.evaluator.evaluate(page.settings.access.as_ref(), state)
            };

            if !evaluation.into_future().instrument(span).await.is_granted() {
                continue;
            }

            let label = page.settings.label.clone().unwrap_or_else(|| page.key.clone());
            tabs.push(Tab {
                key: label.clone(),
                label,
                component: page.component.clone(),
                pattern,
                title: page.settings.title.clone(),
            });
        }

        tabs
    }
}

impl Default for TabIndex {
    fn default() -> Self {
        Self::from_config(&PagesConfig::default())
    }
}

/// Lists tabs with the default configuration
pub async fn list_tabs<C: Clone>(registry: &Registry<C>, state: &StateHandle) -> Vec<Tab<C>> {
    TabIndex::default().list(registry, state).await
}
