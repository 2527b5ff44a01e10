//! Integration tests for rhtmx-pages
//!
//! Cover the compiled table end to end:
//! - Access gating (literal, sync, async, failing predicates)
//! - Error aliases and the fallback chain
//! - Root contention and idempotence
//! - Dynamic segments and layouts
//! - Tabs and manifests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use rhtmx_pages::*;
use serde_json::{json, Value};

fn empty() -> StateHandle {
    Arc::new(EmptyState)
}

fn state(pairs: &[(&str, Value)]) -> StateHandle {
    let map: HashMap<String, Value> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    Arc::new(map)
}

async fn rendered(table: &RouteTable<&'static str>, path: &str, state: &StateHandle) -> Element<&'static str> {
    table.navigate(path, state).await.element
}

// ============================================================================
// Scenario
// ============================================================================

fn scenario() -> Registry<&'static str> {
    let mut registry = Registry::new();
    registry.register("index", "Index", PageSettings::new().allow());
    registry.register("admin", "Admin", PageSettings::new().deny());
    registry.register("_401", "Unauthorized401", PageSettings::new().with_error_type("401"));
    registry
}

#[tokio::test]
async fn test_scenario_admin_renders_401_alias() {
    let table = compile(&scenario());
    let element = rendered(&table, "admin", &empty()).await;
    assert_eq!(element.component(), Some(&"Unauthorized401"));
}

#[tokio::test]
async fn test_scenario_root_renders_index() {
    let table = compile(&scenario());
    let element = rendered(&table, "/", &empty()).await;
    assert_eq!(element.component(), Some(&"Index"));
}

#[tokio::test]
async fn test_scenario_unknown_redirects_to_root() {
    let table = compile(&scenario());
    let navigation = table.navigate("/unknown", &empty()).await;
    assert_eq!(navigation.element, Element::Redirect { to: "/".to_string() });
    assert_eq!(navigation.pattern, RoutePattern::fallback());
}

// ============================================================================
// Access gating
// ============================================================================

#[tokio::test]
async fn test_granted_page_renders_component_for_every_matching_path() {
    let mut registry = Registry::new();
    registry.register("pages/blog/[slug].rsx", "Post", PageSettings::new().allow());
    let table = compile(&registry);

    for path in ["/blog/a", "/blog/hello-world/", "blog/%F0%9F%A6%80"] {
        let navigation = table.navigate(path, &empty()).await;
        assert_eq!(navigation.element.component(), Some(&"Post"), "path {}", path);
        assert!(navigation.params.contains_key("slug"));
    }
}

#[tokio::test]
async fn test_denied_without_alias_renders_placeholder() {
    let mut registry = Registry::new();
    registry.register("pages/secret.rsx", "Secret", PageSettings::new().deny());
    registry.register("pages/unset.rsx", "Unset", PageSettings::new());
    let table = compile(&registry);

    for path in ["/secret", "/unset"] {
        let element = rendered(&table, path, &empty()).await;
        assert_eq!(element, Element::Placeholder(Placeholder::Unauthorized));
        assert_eq!(
            match element {
                Element::Placeholder(placeholder) => placeholder.text(),
                _ => "",
            },
            "Unauthorized"
        );
    }
}

#[tokio::test]
async fn test_default_allow_policy() {
    let mut registry = Registry::new();
    registry.register("pages/open.rsx", "Open", PageSettings::new());

    let config = PagesConfig {
        default_access: AccessDefault::Allow,
        ..PagesConfig::default()
    };
    let table = RouteCompiler::from_config(&config).compile(&registry);

    assert_eq!(rendered(&table, "/open", &empty()).await.component(), Some(&"Open"));
}

#[tokio::test]
async fn test_access_reevaluated_on_every_navigation() {
    let mut registry = Registry::new();
    registry.register(
        "pages/dashboard.rsx",
        "Dashboard",
        PageSettings::new().with_access(AccessSpec::predicate(|state: &dyn StateAccessor| {
            Ok(state.is_truthy("user"))
        })),
    );
    let table = compile(&registry);

    let logged_out = state(&[("user", Value::Null)]);
    let logged_in = state(&[("user", json!("ana"))]);

    assert_eq!(
        rendered(&table, "/dashboard", &logged_out).await,
        Element::Placeholder(Placeholder::Unauthorized)
    );
    assert_eq!(
        rendered(&table, "/dashboard", &logged_in).await.component(),
        Some(&"Dashboard")
    );
    assert_eq!(
        rendered(&table, "/dashboard", &logged_out).await,
        Element::Placeholder(Placeholder::Unauthorized)
    );
}

#[tokio::test]
async fn test_failing_predicates_deny() {
    let mut registry = Registry::new();
    registry.register(
        "pages/err.rsx",
        "Err",
        PageSettings::new().with_access(AccessSpec::predicate(|_: &dyn StateAccessor| {
            anyhow::bail!("permission service unavailable")
        })),
    );
    registry.register(
        "pages/rejected.rsx",
        "Rejected",
        PageSettings::new().with_access(AccessSpec::asynchronous(|_| async {
            Err(anyhow::anyhow!("session lookup failed"))
        })),
    );
    let table = compile(&registry);

    for path in ["/err", "/rejected"] {
        assert_eq!(
            rendered(&table, path, &empty()).await,
            Element::Placeholder(Placeholder::Unauthorized)
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_async_grant_never_renders_before_resolution() {
    let resolved = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&resolved);

    let mut registry = Registry::new();
    registry.register(
        "pages/vault.rsx",
        "Vault",
        PageSettings::new().with_access(AccessSpec::asynchronous(move |_| {
            let flag = Arc::clone(&flag);
            async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(true)
            }
        })),
    );
    let table = compile(&registry);

    let rendering = table.resolve("/vault").unwrap().entry.render(&empty());
    assert!(rendering.now().is_none());
    assert!(!resolved.load(Ordering::SeqCst));

    let element = rendering.await;
    assert!(resolved.load(Ordering::SeqCst));
    assert_eq!(element.component(), Some(&"Vault"));
}

// ============================================================================
// Fallback chain
// ============================================================================

#[tokio::test]
async fn test_fallback_prefers_404_alias() {
    let mut registry = scenario();
    registry.register("pages/_404.rsx", "Missing", PageSettings::new());
    let table = compile(&registry);

    assert_eq!(
        rendered(&table, "/nowhere/at/all", &empty()).await.component(),
        Some(&"Missing")
    );
}

#[tokio::test]
async fn test_fallback_without_root_is_not_found_placeholder() {
    let mut registry = Registry::new();
    registry.register("pages/about.rsx", "About", PageSettings::new().allow());
    let table = compile(&registry);

    assert!(!table.has_root());
    assert_eq!(
        rendered(&table, "/nowhere", &empty()).await,
        Element::Placeholder(Placeholder::NotFound)
    );
    assert_eq!(Placeholder::NotFound.to_string(), "Not Found");
}

#[tokio::test]
async fn test_alias_pages_are_not_gated() {
    let mut registry = Registry::new();
    registry.register(
        "pages/_401.rsx",
        "Denied",
        PageSettings::new().deny().with_error_type("401"),
    );
    let table = compile(&registry);

    assert_eq!(
        rendered(&table, "/__error/401", &empty()).await.component(),
        Some(&"Denied")
    );
}

#[tokio::test]
async fn test_root_catch_all_page_is_access_gated() {
    let mut registry = Registry::new();
    registry.register("pages/index.rsx", "Index", PageSettings::new().allow());
    registry.register("pages/[...all].rsx", "CatchAll", PageSettings::new().deny());
    registry.register("pages/[...other].rsx", "Unset", PageSettings::new());
    let table = compile(&registry);

    assert_eq!(
        rendered(&table, "/anything/here", &empty()).await,
        Element::Placeholder(Placeholder::Unauthorized)
    );

    let mut granted = Registry::new();
    granted.register(
        "pages/[...all].rsx",
        "CatchAll",
        PageSettings::new().with_access(AccessSpec::predicate(|state: &dyn StateAccessor| {
            Ok(state.is_truthy("user"))
        })),
    );
    granted.register("pages/_401.rsx", "Denied", PageSettings::new().with_error_type("401"));
    let table = compile(&granted);

    assert_eq!(rendered(&table, "/x", &empty()).await.component(), Some(&"Denied"));
    assert_eq!(
        rendered(&table, "/x", &state(&[("user", json!("ana"))])).await.component(),
        Some(&"CatchAll")
    );
}

// ============================================================================
// Precedence
// ============================================================================

#[tokio::test]
async fn test_root_contention_later_wins() {
    let mut registry = Registry::new();
    registry.register("pages/index.rsx", "First", PageSettings::new().allow());
    registry.register("pages/home.rsx", "Second", PageSettings::new().allow().with_label("/"));
    let table = compile(&registry);

    let roots: Vec<_> = table
        .entries()
        .iter()
        .filter(|entry| entry.kind() == RouteKind::Normal && entry.pattern().is_root())
        .collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(rendered(&table, "/", &empty()).await.component(), Some(&"Second"));
}

#[tokio::test]
async fn test_normal_page_in_alias_space_keeps_aliases_intact() {
    let mut registry = Registry::new();
    registry.register("pages/_401.rsx", "Denied", PageSettings::new().with_error_type("401"));
    registry.register("pages/__error/401.rsx", "Squatter", PageSettings::new().allow());
    registry.register("pages/admin.rsx", "Admin", PageSettings::new().deny());
    let table = compile(&registry);

    let entries: Vec<(String, RouteKind, Option<&str>)> = table
        .entries()
        .iter()
        .map(|entry| (entry.pattern().to_string(), entry.kind(), entry.key()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("/__error/401".to_string(), RouteKind::Normal, Some("pages/__error/401.rsx")),
            ("/admin".to_string(), RouteKind::Normal, Some("pages/admin.rsx")),
            ("/*".to_string(), RouteKind::Fallback, None),
        ]
    );

    assert_eq!(table.error_alias("401").unwrap().key, "pages/_401.rsx");
    assert_eq!(rendered(&table, "/admin", &empty()).await.component(), Some(&"Denied"));
    assert_eq!(
        rendered(&table, "/__error/401", &empty()).await.component(),
        Some(&"Squatter")
    );
}

#[test]
fn test_compilation_is_idempotent() {
    let mut registry = scenario();
    registry.register("pages/_layout.rsx", "Shell", PageSettings::new());
    registry.register("pages/docs/[...rest].rsx", "Docs", PageSettings::new().allow());
    registry.register("pages/_404.rsx", "Missing", PageSettings::new());

    let first = compile(&registry).summary();
    let second = compile(&registry).summary();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_summary_shape() {
    let summary = compile(&scenario()).summary();

    assert!(summary.has_root);
    assert_eq!(summary.error_aliases.get("401").map(String::as_str), Some("_401"));
    let kinds: Vec<(String, RouteKind)> = summary
        .entries
        .iter()
        .map(|entry| (entry.pattern.clone(), entry.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("/__error/401".to_string(), RouteKind::Error),
            ("/".to_string(), RouteKind::Normal),
            ("/admin".to_string(), RouteKind::Normal),
            ("/*".to_string(), RouteKind::Fallback),
        ]
    );
}

// ============================================================================
// Dynamic segments & layouts
// ============================================================================

#[tokio::test]
async fn test_dynamic_segments() {
    let mut registry = Registry::new();
    registry.register("pages/blog/[slug].rsx", "Post", PageSettings::new().allow());
    registry.register("pages/docs/[...rest].rsx", "Docs", PageSettings::new().allow());
    let table = compile(&registry);

    let post = table.navigate("/blog/rust", &empty()).await;
    assert_eq!(post.pattern.to_string(), "/blog/:slug");
    assert_eq!(post.params["slug"], "rust");

    let docs = table.navigate("/docs", &empty()).await;
    assert_eq!(docs.params["rest"], "");
    let docs = table.navigate("/docs/guide/install", &empty()).await;
    assert_eq!(docs.params["rest"], "guide/install");

    let nested = table.navigate("/blog/rust/comments", &empty()).await;
    assert_eq!(nested.element, Element::Placeholder(Placeholder::NotFound));
}

#[tokio::test]
async fn test_layout_chain_in_rendered_element() {
    let mut registry = Registry::new();
    registry.register("pages/_layout.rsx", "Root", PageSettings::new());
    registry.register("pages/settings/_layout.rsx", "Settings", PageSettings::new());
    registry.register(
        "pages/settings/profile.rsx",
        "Profile",
        PageSettings::new().allow().with_title("Profile"),
    );
    let table = compile(&registry);

    match rendered(&table, "/settings/profile", &empty()).await {
        Element::Page {
            component,
            layouts,
            title,
            ..
        } => {
            assert_eq!(component, "Profile");
            assert_eq!(layouts, vec!["Root", "Settings"]);
            assert_eq!(title.as_deref(), Some("Profile"));
        }
        other => panic!("expected page, got {:?}", other),
    }
}

// ============================================================================
// Tabs & manifest
// ============================================================================

#[tokio::test]
async fn test_tabs_follow_state() {
    let mut registry = Registry::new();
    registry.register("pages/home.rsx", "Home", PageSettings::new().allow().as_tab());
    registry.register(
        "pages/admin.rsx",
        "Admin",
        PageSettings::new()
            .as_tab()
            .with_label("Admin")
            .with_access(AccessSpec::predicate(|state: &dyn StateAccessor| {
                Ok(state.get("role") == Some(json!("admin")))
            })),
    );

    let guest: Vec<String> = list_tabs(&registry, &empty())
        .await
        .into_iter()
        .map(|tab| tab.label)
        .collect();
    assert_eq!(guest, vec!["pages/home.rsx"]);

    let admin: Vec<String> = list_tabs(&registry, &state(&[("role", json!("admin"))]))
        .await
        .into_iter()
        .map(|tab| tab.label)
        .collect();
    assert_eq!(admin, vec!["pages/home.rsx", "Admin"]);
}

#[tokio::test]
async fn test_manifest_compiles_to_table() {
    let manifest = Manifest::parse(
        r#"
        [routing]
        pages_root = "src/pages"
        extensions = ["jsx"]

        [[page]]
        key = "src/pages/index.jsx"
        component = "Home"
        settings = { access = true }

        [[page]]
        key = "src/pages/admin.jsx"
        component = "Admin"
        settings = { access = { state = "role", equals = "admin" } }

        [[page]]
        key = "src/pages/_401.jsx"
        component = "Denied"
        settings = { error_type = "401" }
        "#,
    )
    .unwrap();

    let table = RouteCompiler::from_config(&manifest.config).compile(&manifest.registry());

    let guest = table.navigate("/admin", &empty()).await;
    assert_eq!(guest.element.component().map(String::as_str), Some("Denied"));

    let admin = table.navigate("/admin", &state(&[("role", json!("admin"))])).await;
    assert_eq!(admin.element.component().map(String::as_str), Some("Admin"));
}
