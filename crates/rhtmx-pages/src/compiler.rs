//! Registry to route table compilation
//!
//! Two passes over the registry:
//!
//! 1. **Aliases**: every error-alias page is placed under the reserved alias
//!    space (`/__error/<type>`) and recorded by type. Last one wins.
//! 2. **Normal routes**: every other routable page gets a gated entry whose
//!    denial target is the `401` alias from pass 1 (or the built-in
//!    "Unauthorized" placeholder). A page normalizing to the root catch-all
//!    becomes a not-found candidate instead of a route, gated the same way.
//!
//! The wildcard fallback is synthesized last: `404` alias, then the root
//! catch-all page, then a redirect to `/` when a root page exists, then the
//! "Not Found" placeholder.
//!
//! Compilation never fails. Ambiguities resolve by registration order.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::access::AccessEvaluator;
use crate::config::PagesConfig;
use crate::path::FolderHierarchy;
use crate::pattern::{KeyPath, PathNormalizer, RoutePattern};
use crate::registry::{PageDescriptor, PageRole, Registry, NOT_FOUND, UNAUTHORIZED};
use crate::table::{Element, PageView, Placeholder, RouteEntry, RouteKind, RouteTable, Target};

/// A registry entry with its key split and its role decided
struct Classified<'r, C> {
    page: &'r PageDescriptor<C>,
    key: KeyPath,
    role: PageRole,
}

/// Compiles a [`Registry`] into a [`RouteTable`]
///
/// # Examples
///
/// ```
/// use rhtmx_pages::compiler::RouteCompiler;
/// use rhtmx_pages::registry::{PageSettings, Registry};
///
/// let mut registry = Registry::new();
/// registry.register("pages/index.rsx", "Home", PageSettings::new().allow());
/// registry.register("pages/_401.rsx", "Denied", PageSettings::new().with_error_type("401"));
///
/// let table = RouteCompiler::new().compile(&registry);
/// assert!(table.has_root());
/// assert_eq!(table.error_alias("401").unwrap().component, "Denied");
/// ```
#[derive(Debug, Clone)]
pub struct RouteCompiler {
    normalizer: PathNormalizer,
    evaluator: AccessEvaluator,
    alias_root: String,
    case_insensitive: bool,
}

impl RouteCompiler {
    pub fn new() -> Self {
        Self::from_config(&PagesConfig::default())
    }

    pub fn from_config(config: &PagesConfig) -> Self {
        Self {
            normalizer: PathNormalizer::from_config(config),
            evaluator: AccessEvaluator::from_config(config),
            alias_root: config.alias_root(),
            case_insensitive: config.case_insensitive,
        }
    }

    pub fn with_normalizer(mut self, normalizer: PathNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_evaluator(mut self, evaluator: AccessEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn normalizer(&self) -> &PathNormalizer {
        &self.normalizer
    }

    /// Pattern of the alias for `error_type` in the reserved space
    pub fn alias_pattern(&self, error_type: &str) -> RoutePattern {
        RoutePattern::literal(&format!("{}/{}", self.alias_root, error_type))
    }

    pub fn compile<C: Clone>(&self, registry: &Registry<C>) -> RouteTable<C> {
        let pages: Vec<Classified<'_, C>> = registry
            .iter()
            .map(|page| {
                let key = self.normalizer.key_path(&page.key);
                let role = PageRole::classify(&page.settings, &key);
                Classified { page, key, role }
            })
            .collect();

        let layouts = collect_layouts(&pages);
        let mut entries: Vec<RouteEntry<C>> = Vec::new();

        // Pass 1: aliases
        let mut error_aliases: BTreeMap<String, Arc<PageView<C>>> = BTreeMap::new();
        for classified in &pages {
            let PageRole::ErrorAlias(error_type) = &classified.role else {
                continue;
            };

            let view = Arc::new(page_view(classified, &layouts));
            let entry = RouteEntry {
                pattern: self.alias_pattern(error_type),
                kind: RouteKind::Error,
                key: Some(classified.page.key.clone()),
                target: Target::Fixed(view.element()),
            };

            if let Some(previous) = error_aliases.insert(error_type.clone(), view) {
                tracing::debug!(
                    error_type = %error_type,
                    superseded = %previous.key,
                    by = %classified.page.key,
                    "error alias registered again, later page wins"
                );
            }
            push_last_wins(&mut entries, entry);
        }

        let denied = error_aliases
            .get(UNAUTHORIZED)
            .map(|alias| alias.element())
            .unwrap_or(Element::Placeholder(Placeholder::Unauthorized));

        // Pass 2: normal routes
        let mut catch_all: Option<(String, Target<C>)> = None;
        for classified in &pages {
            if classified.role != PageRole::Normal {
                continue;
            }

            let settings = &classified.page.settings;
            let pattern = self
                .normalizer
                .pattern_for(&classified.key, settings.label.as_deref());
            let key = classified.page.key.clone();
            let target = Target::Gated {
                page: Arc::new(page_view(classified, &layouts)),
                access: settings.access.clone(),
                evaluator: self.evaluator,
                denied: denied.clone(),
            };

            if pattern.is_root_catch_all() {
                if let Some((previous, _)) = catch_all.replace((key, target)) {
                    tracing::debug!(
                        superseded = %previous,
                        by = %classified.page.key,
                        "root catch-all registered again, later page wins"
                    );
                }
                continue;
            }

            push_last_wins(
                &mut entries,
                RouteEntry {
                    pattern,
                    kind: RouteKind::Normal,
                    key: Some(key),
                    target,
                },
            );
        }

        let has_root = entries
            .iter()
            .any(|entry| entry.kind == RouteKind::Normal && entry.pattern.is_root());

        entries.push(fallback_entry(
            error_aliases.get(NOT_FOUND).cloned(),
            catch_all,
            has_root,
        ));

        RouteTable::new(entries, error_aliases, has_root, self.case_insensitive)
    }
}

impl Default for RouteCompiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiles `registry` with the default configuration
pub fn compile<C: Clone>(registry: &Registry<C>) -> RouteTable<C> {
    RouteCompiler::new().compile(registry)
}

/// Layout component per folder (`/`, `/admin`, ...); last one per folder wins
fn collect_layouts<C: Clone>(pages: &[Classified<'_, C>]) -> BTreeMap<String, (String, C)> {
    let mut layouts = BTreeMap::new();

    for classified in pages.iter().filter(|c| c.role == PageRole::Layout) {
        let layout = (classified.page.key.clone(), classified.page.component.clone());
        if let Some((previous, _)) = layouts.insert(classified.key.folder(), layout) {
            tracing::debug!(
                superseded = %previous,
                by = %classified.page.key,
                "layout registered again for folder, later page wins"
            );
        }
    }

    layouts
}

/// Resolves the layout chain of a page, outermost first
fn page_view<C: Clone>(
    classified: &Classified<'_, C>,
    layouts: &BTreeMap<String, (String, C)>,
) -> PageView<C> {
    let folder = classified.key.page_folder();
    let mut chain: Vec<C> = FolderHierarchy::new(&folder)
        .filter_map(|folder| layouts.get(folder).map(|(_, layout)| layout.clone()))
        .collect();
    chain.reverse();

    PageView {
        key: classified.page.key.clone(),
        component: classified.page.component.clone(),
        layouts: chain,
        title: classified.page.settings.title.clone(),
    }
}

/// Appends `entry`, dropping an earlier entry that matches the same paths
fn push_last_wins<C>(entries: &mut Vec<RouteEntry<C>>, entry: RouteEntry<C>) {
    if let Some(position) = entries
        .iter()
        .position(|existing| existing.pattern.same_shape(&entry.pattern))
    {
        let previous = entries.remove(position);
        tracing::debug!(
            pattern = %entry.pattern,
            superseded = previous.key.as_deref().unwrap_or_default(),
            by = entry.key.as_deref().unwrap_or_default(),
            root = entry.pattern.is_root(),
            "pattern registered again, later page wins"
        );
    }

    entries.push(entry);
}

/// The wildcard entry
///
/// A `404` alias renders as is. A root catch-all page keeps its access check
/// and denial target like any normal route.
fn fallback_entry<C: Clone>(
    not_found_alias: Option<Arc<PageView<C>>>,
    catch_all: Option<(String, Target<C>)>,
    has_root: bool,
) -> RouteEntry<C> {
    let (key, target) = match (not_found_alias, catch_all) {
        (Some(alias), ignored) => {
            if let Some((page, _)) = ignored {
                tracing::debug!(
                    alias = %alias.key,
                    ignored = %page,
                    "explicit 404 alias takes precedence over root catch-all page"
                );
            }
            (Some(alias.key.clone()), Target::Fixed(alias.element()))
        }
        (None, Some((page, target))) => (Some(page), target),
        (None, None) if has_root => (None, Target::Fixed(Element::Redirect { to: "/".to_string() })),
        (None, None) => (None, Target::Fixed(Element::Placeholder(Placeholder::NotFound))),
    };

    RouteEntry {
        pattern: RoutePattern::fallback(),
        kind: RouteKind::Fallback,
        key,
        target,
    }
}
