//! # RHTMX Pages
//!
//! Compiles a registry of page modules into a route table with per-page
//! access control, layout wrapping and deterministic fallbacks:
//! - Static routes (`/about`)
//! - Dynamic parameters (`/blog/:slug` from `blog/[slug]`)
//! - Catch-all routes (`/docs/*rest` from `docs/[...rest]`)
//! - Error aliases (`_401`, `_404`, `error_type = "..."`) under `/__error/<type>`
//! - Nested `_layout` pages
//!
//! ## Access
//!
//! Each page's `access` is a boolean, a synchronous predicate or an
//! asynchronous predicate over a read-only [`StateAccessor`]. Missing
//! configuration and failing predicates deny. Access is checked on every
//! render, never cached.
//!
//! ## Precedence
//!
//! Nothing in compilation fails. Duplicate keys, patterns, root pages and
//! alias types are all resolved by registration order: the later one wins.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use rhtmx_pages::{compile, Element, EmptyState, PageSettings, Registry, StateHandle};
//!
//! let mut registry = Registry::new();
//! registry.register("pages/index.rsx", "Home", PageSettings::new().allow());
//! registry.register("pages/admin.rsx", "Admin", PageSettings::new().deny());
//! registry.register("pages/_401.rsx", "Denied", PageSettings::new().with_error_type("401"));
//!
//! let table = compile(&registry);
//! let state: StateHandle = Arc::new(EmptyState);
//!
//! let admin = table.resolve("/admin").unwrap().entry.render(&state);
//! assert_eq!(admin.now().and_then(Element::component), Some(&"Denied"));
//!
//! let unknown = table.resolve("/unknown").unwrap().entry.render(&state);
//! assert_eq!(unknown.now(), Some(&Element::Redirect { to: "/".to_string() }));
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod access;
pub mod compiler;
pub mod config;
pub mod error;
pub mod manifest;
pub mod navigator;
pub mod path;
pub mod pattern;
pub mod registry;
pub mod table;
pub mod tabs;

// ============================================================================
// Re-exports
// ============================================================================

pub use access::{
    AccessEvaluationError, AccessEvaluator, AccessSpec, Denial, EmptyState, Evaluation,
    StateAccessor, StateHandle, Verdict,
};
pub use compiler::{compile, RouteCompiler};
pub use config::{AccessDefault, PagesConfig};
pub use error::{ConfigError, ManifestError};
pub use manifest::{AccessRule, Manifest, PageEntry};
pub use navigator::{Navigator, Outcome};
pub use path::{normalize_target, FolderHierarchy};
pub use pattern::{normalize, Params, PathNormalizer, RoutePattern, Segment};
pub use registry::{PageDescriptor, PageRole, PageSettings, Registry};
pub use table::{
    Element, EntrySummary, Navigation, PageView, Placeholder, Rendering, Resolution, RouteEntry,
    RouteKind, RouteTable, TableSummary,
};
pub use tabs::{list_tabs, Tab, TabIndex};
