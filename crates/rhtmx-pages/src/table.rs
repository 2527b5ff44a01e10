//! Compiled route table
//!
//! Produced by [`RouteCompiler`](crate::compiler::RouteCompiler) and read-only
//! afterwards. Every entry carries its own render thunk: page entries
//! evaluate access when rendered, alias entries and the synthesized
//! redirect or placeholder render unconditionally.

use std::collections::BTreeMap;
use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde::Serialize;
use tracing::Instrument;

use crate::access::{AccessEvaluator, AccessSpec, Evaluation, StateHandle, Verdict};
use crate::path::normalize_target;
use crate::pattern::{Params, RoutePattern};

/// Role of a table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Normal,
    Error,
    Fallback,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RouteKind::Normal => "normal",
            RouteKind::Error => "error",
            RouteKind::Fallback => "fallback",
        })
    }
}

/// Built-in textual pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Placeholder {
    Unauthorized,
    NotFound,
}

impl Placeholder {
    pub fn text(&self) -> &'static str {
        match self {
            Placeholder::Unauthorized => "Unauthorized",
            Placeholder::NotFound => "Not Found",
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// What the mounting layer should show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Element<C> {
    /// A registered component wrapped by its layouts (outermost first)
    Page {
        key: String,
        component: C,
        layouts: Vec<C>,
        title: Option<String>,
    },
    Redirect {
        to: String,
    },
    Placeholder(Placeholder),
}

impl<C> Element<C> {
    /// Registry key of the rendered page, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Element::Page { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn component(&self) -> Option<&C> {
        match self {
            Element::Page { component, .. } => Some(component),
            _ => None,
        }
    }
}

impl<C> fmt::Display for Element<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Page { key, .. } => write!(f, "page {}", key),
            Element::Redirect { to } => write!(f, "redirect {}", to),
            Element::Placeholder(placeholder) => write!(f, "placeholder \"{}\"", placeholder),
        }
    }
}

/// A page resolved at compile time: component plus its layout chain
#[derive(Debug, Clone)]
pub struct PageView<C> {
    pub key: String,
    pub component: C,
    pub layouts: Vec<C>,
    pub title: Option<String>,
}

impl<C: Clone> PageView<C> {
    pub fn element(&self) -> Element<C> {
        Element::Page {
            key: self.key.clone(),
            component: self.component.clone(),
            layouts: self.layouts.clone(),
            title: self.title.clone(),
        }
    }
}

/// Render thunk of one entry
#[derive(Debug, Clone)]
pub(crate) enum Target<C> {
    /// Access checked on every render
    Gated {
        page: Arc<PageView<C>>,
        access: Option<AccessSpec>,
        evaluator: AccessEvaluator,
        denied: Element<C>,
    },
    /// Rendered as is
    Fixed(Element<C>),
}

/// Output of a render thunk, ready now or suspended on an access predicate
pub enum Rendering<C> {
    Ready(Element<C>),
    Pending(BoxFuture<'static, Element<C>>),
}

impl<C> Rendering<C> {
    pub fn now(&self) -> Option<&Element<C>> {
        match self {
            Rendering::Ready(element) => Some(element),
            Rendering::Pending(_) => None,
        }
    }
}

impl<C: Send + 'static> IntoFuture for Rendering<C> {
    type Output = Element<C>;
    type IntoFuture = BoxFuture<'static, Element<C>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Rendering::Ready(element) => future::ready(element).boxed(),
            Rendering::Pending(pending) => pending,
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for Rendering<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendering::Ready(element) => f.debug_tuple("Ready").field(element).finish(),
            Rendering::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// One compiled route
#[derive(Debug, Clone)]
pub struct RouteEntry<C> {
    pub(crate) pattern: RoutePattern,
    pub(crate) kind: RouteKind,
    pub(crate) key: Option<String>,
    pub(crate) target: Target<C>,
}

impl<C> RouteEntry<C> {
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    /// Registry key behind the entry (`None` for a synthesized fallback)
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_gated(&self) -> bool {
        matches!(self.target, Target::Gated { .. })
    }
}

impl<C: Clone + Send + Sync + 'static> RouteEntry<C> {
    /// Runs the entry's thunk against the current state
    ///
    /// Access is evaluated on every call. The protected component is only
    /// ever produced after the verdict is known.
    pub fn render(&self, state: &StateHandle) -> Rendering<C> {
        let (page, access, evaluator, denied) = match &self.target {
            Target::Fixed(element) => return Rendering::Ready(element.clone()),
            Target::Gated {
                page,
                access,
                evaluator,
                denied,
            } => (page, access, evaluator, denied),
        };

        let span = tracing::debug_span!("access", page = %page.key);

        let evaluation = {
            let _entered = span.enter();
            evaluator.evaluate(access.as_ref(), state)
        };

        match evaluation {
            Evaluation::Ready(verdict) => Rendering::Ready(choose(verdict, page, denied)),
            Evaluation::Pending(pending) => {
                let page = Arc::clone(page);
                let denied = denied.clone();
                Rendering::Pending(
                    async move { choose(pending.await, &page, &denied) }
                        .instrument(span)
                        .boxed(),
                )
            }
        }
    }

    /// What the entry renders when access is denied (or times out)
    pub fn denied_element(&self) -> Element<C> {
        match &self.target {
            Target::Gated { denied, .. } => denied.clone(),
            Target::Fixed(element) => element.clone(),
        }
    }
}

fn choose<C: Clone>(verdict: Verdict, page: &PageView<C>, denied: &Element<C>) -> Element<C> {
    if verdict.is_granted() {
        page.element()
    } else {
        denied.clone()
    }
}

/// A path matched against the table
#[derive(Debug)]
pub struct Resolution<'t, C> {
    pub path: String,
    pub entry: &'t RouteEntry<C>,
    pub params: Params,
}

/// Result of a completed navigation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Navigation<C> {
    pub path: String,
    pub pattern: RoutePattern,
    pub params: Params,
    pub element: Element<C>,
}

/// Ordered compiled routes plus error aliases
///
/// Entries keep compilation order: aliases, then normal routes in
/// registration order, then the single fallback entry. Matching uses a
/// separate specificity order.
#[derive(Debug, Clone)]
pub struct RouteTable<C> {
    pub(crate) entries: Vec<RouteEntry<C>>,
    pub(crate) error_aliases: BTreeMap<String, Arc<PageView<C>>>,
    pub(crate) has_root: bool,
    pub(crate) match_order: Vec<usize>,
    pub(crate) case_insensitive: bool,
}

impl<C> RouteTable<C> {
    pub(crate) fn new(
        entries: Vec<RouteEntry<C>>,
        error_aliases: BTreeMap<String, Arc<PageView<C>>>,
        has_root: bool,
        case_insensitive: bool,
    ) -> Self {
        let mut match_order: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.kind != RouteKind::Fallback)
            .map(|(index, _)| index)
            .collect();

        // Stable: equal specificity keeps compilation order
        match_order.sort_by_key(|&index| entries[index].pattern.specificity());

        Self {
            entries,
            error_aliases,
            has_root,
            match_order,
            case_insensitive,
        }
    }

    pub fn entries(&self) -> &[RouteEntry<C>] {
        &self.entries
    }

    pub fn has_root(&self) -> bool {
        self.has_root
    }

    pub fn error_alias(&self, error_type: &str) -> Option<&PageView<C>> {
        self.error_aliases.get(error_type).map(Arc::as_ref)
    }

    /// Alias keys in sorted order
    pub fn error_types(&self) -> impl Iterator<Item = &str> {
        self.error_aliases.keys().map(String::as_str)
    }

    /// The wildcard entry
    pub fn fallback(&self) -> Option<&RouteEntry<C>> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.kind == RouteKind::Fallback)
    }

    /// Entries in the order they are tried by [`resolve`](Self::resolve)
    pub fn match_order(&self) -> impl Iterator<Item = &RouteEntry<C>> {
        self.match_order.iter().map(|&index| &self.entries[index])
    }

    /// Finds the entry for a navigation target
    ///
    /// The target is normalized first. Entries are tried static before
    /// parameter before catch-all; unmatched paths land on the fallback.
    /// Returns `None` only for a table built without a fallback.
    pub fn resolve(&self, target: &str) -> Option<Resolution<'_, C>> {
        let path = normalize_target(target);

        let matched = self.match_order().find_map(|entry| {
            entry
                .pattern
                .matches(&path, self.case_insensitive)
                .map(|params| (entry, params))
        });

        let (entry, params) = match matched {
            Some(found) => found,
            None => (self.fallback()?, Params::new()),
        };

        Some(Resolution {
            path: path.into_owned(),
            entry,
            params,
        })
    }

    /// Structural description of the table
    pub fn summary(&self) -> TableSummary {
        TableSummary {
            entries: self
                .entries
                .iter()
                .map(|entry| EntrySummary {
                    pattern: entry.pattern.to_string(),
                    kind: entry.kind,
                    key: entry.key.clone(),
                    gated: entry.is_gated(),
                })
                .collect(),
            error_aliases: self
                .error_aliases
                .iter()
                .map(|(error_type, page)| (error_type.clone(), page.key.clone()))
                .collect(),
            has_root: self.has_root,
        }
    }
}

impl<C: Clone + Send + Sync + 'static> RouteTable<C> {
    /// Resolves and renders `target` against the given state
    pub async fn navigate(&self, target: &str, state: &StateHandle) -> Navigation<C> {
        match self.resolve(target) {
            Some(resolution) => {
                let element = resolution.entry.render(state).await;
                Navigation {
                    path: resolution.path,
                    pattern: resolution.entry.pattern.clone(),
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
        }
    }
}

/// Serializable view of a [`RouteTable`], equal for equal compilations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub entries: Vec<EntrySummary>,
    pub error_aliases: BTreeMap<String, String>,
    pub has_root: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub pattern: String,
    pub kind: RouteKind,
    pub key: Option<String>,
    pub gated: bool,
}
