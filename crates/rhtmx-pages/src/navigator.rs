//! Navigation driver over a compiled table
//!
//! Adds what the table alone does not: a navigation identity so stale
//! results are dropped, an optional bound on access evaluation, and hot
//! swapping of the compiled table.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::access::StateHandle;
use crate::config::PagesConfig;
use crate::path::normalize_target;
use crate::pattern::{Params, RoutePattern};
use crate::table::{Element, Navigation, Placeholder, Rendering, RouteTable};

/// Result of [`Navigator::navigate`]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<C> {
    /// Latest navigation; safe to mount
    Committed(Navigation<C>),
    /// A newer navigation started while this one was evaluating access
    Superseded { id: u64, path: String },
}

impl<C> Outcome<C> {
    pub fn committed(self) -> Option<Navigation<C>> {
        match self {
            Outcome::Committed(navigation) => Some(navigation),
            Outcome::Superseded { .. } => None,
        }
    }
}

/// Owns the current route table and the host's state accessor
pub struct Navigator<C> {
    table: RwLock<Arc<RouteTable<C>>>,
    state: StateHandle,
    generation: AtomicU64,
    timeout: Option<Duration>,
}

impl<C: Clone + Send + Sync + 'static> Navigator<C> {
    pub fn new(table: RouteTable<C>, state: StateHandle) -> Self {
        Self {
            table: RwLock::new(Arc::new(table)),
            state,
            generation: AtomicU64::new(0),
            timeout: None,
        }
    }

    pub fn from_config(table: RouteTable<C>, state: StateHandle, config: &PagesConfig) -> Self {
        Self::new(table, state).with_timeout(config.evaluation_timeout())
    }

    /// Bounds every access evaluation; a timed-out check is a denial
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Snapshot of the current table
    pub async fn table(&self) -> Arc<RouteTable<C>> {
        Arc::clone(&*self.table.read().await)
    }

    /// Swaps in a freshly compiled table
    ///
    /// Navigations already in flight finish against the table they started
    /// with.
    pub async fn reload(&self, table: RouteTable<C>) {
        *self.table.write().await = Arc::new(table);
        tracing::debug!("route table reloaded");
    }

    /// Identity of the most recent navigation
    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Resolves and renders `target`
    ///
    /// The result is [`Outcome::Superseded`] when another navigation started
    /// before this one's access check resolved.
    pub async fn navigate(&self, target: &str) -> Outcome<C> {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let table = self.table().await;

        let navigation = match table.resolve(target) {
            Some(resolution) => {
                let element = match resolution.entry.render(&self.state) {
                    Rendering::Ready(element) => element,
                    Rendering::Pending(pending) => match self.timeout {
                        None => pending.await,
                        Some(limit) => match tokio::time::timeout(limit, pending).await {
                            Ok(element) => element,
                            Err(_) => {
                                tracing::debug!(
                                    path = %resolution.path,
                                    timeout_ms = limit.as_millis() as u64,
                                    "access evaluation timed out, denying"
                                );
                                resolution.entry.denied_element()
                            }
                        },
                    },
                };

                Navigation {
                    path: resolution.path,
                    pattern: resolution.entry.pattern().clone(),
                    params: resolution.params,
                    element,
                }
            }
            None => Navigation {
                path: normalize_target(target).into_owned(),
                pattern: RoutePattern::fallback(),
                params: Params::new(),
                element: Element::Placeholder(Placeholder::NotFound),
            },
        };

        let latest = self.current();
        if latest != id {
            tracing::debug!(id, latest, path = %navigation.path, "navigation superseded, discarding");
            return Outcome::Superseded {
                id,
                path: navigation.path,
            };
        }

        Outcome::Committed(navigation)
    }
}
