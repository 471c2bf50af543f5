//! End-to-end rendering through factories, nested views and mixed engines.

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::json;
use stratum::prelude::*;
use stratum::{ViewData, ViewLogger};

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn engine() -> Arc<dyn TemplateEngine> {
    Arc::new(DelegatingEngine::new(
        EngineResolver::new()
            .with_engine(Arc::new(MiniJinjaEngine::new()))
            .with_engine(Arc::new(StringEngine::new())),
    ))
}

/// Engine that fails every render.
struct BrokenEngine;

impl TemplateEngine for BrokenEngine {
    fn render(&self, template: &str, _data: &serde_json::Value) -> Result<String, RenderError> {
        Err(RenderError::TemplateError(format!("{} is broken", template)))
    }

    fn supports(&self, _template: &str, _kind: Option<&str>) -> bool {
        true
    }

    fn name(&self) -> &str {
        "broken"
    }
}

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn test_nested_view_renders_inside_parent() {
    let factory = ViewFactory::new(engine());
    let child = factory.create(fixture("foobar.html"), [("{{title}}", "Foo")].into());
    let parent = factory.create(fixture("foobar.html"), Context::new());
    parent.with([("{{title}}", child)].into());

    assert_eq!(parent.render(Context::new()).unwrap(), "<h1><h1>Foo</h1></h1>");
}

#[test]
fn test_two_children_under_one_slot() {
    let factory = ViewFactory::new(engine());
    let page = factory.create("[:slot]", Context::new());
    let b = factory.create("B", Context::new());
    let c = factory.create("C", Context::new());

    page.nest(b.clone(), ":slot").nest(c.clone(), ":slot");

    assert_eq!(page.render(Context::new()).unwrap(), "[BC]");

    let slot = page.get(":slot").unwrap();
    let node = slot.as_view().unwrap();
    assert!(node.is_collection());
    let mut view = node.borrow_mut();
    let members = view.as_collection_mut().unwrap().members();
    assert_eq!(members.len(), 2);
    assert!(members[0].ptr_eq(&b));
    assert!(members[1].ptr_eq(&c));
}

#[test]
fn test_default_slot_and_wrap() {
    let factory = ViewFactory::new(engine());
    let layout = factory.create("<body>content</body>", Context::new());
    let article = factory.create("article", Context::new());

    let wrapped = article.wrap(layout.clone(), DEFAULT_SLOT);
    assert!(wrapped.ptr_eq(&layout));
    assert_eq!(wrapped.render(Context::new()).unwrap(), "<body>article</body>");
}

#[test]
fn test_mixed_engines_nest() {
    let factory = ViewFactory::new(engine());
    factory.assign("site", "stratum");

    let footer = factory.create(fixture("footer.j2"), [("year", 2024)].into());
    let list = factory.create(fixture("list.twig"), Context::from(json!({"items": ["a", "b"]})));
    let page = factory.create("<main>{{list}}</main>{{footer}}", Context::new());
    page.nest(list, "{{list}}").nest(footer, "{{footer}}");

    assert_eq!(
        page.render(Context::new()).unwrap(),
        "<main><ul><li>a</li><li>b</li></ul></main><footer>2024 stratum</footer>"
    );
}

// ============================================================================
// Data layers
// ============================================================================

#[test]
fn test_lookup_layers_merge() {
    let factory = ViewFactory::new(engine());
    factory.share([("x", 3), ("y", 3), ("z", 3)].into());

    let view = factory.create("t", [("x", 1)].into());
    view.borrow_mut().inherit([("x", 2), ("y", 2)].into());

    let copy = view.borrow().get_array_copy();
    assert_eq!(copy.to_json(), json!({"x": 1, "y": 2, "z": 3}));
    assert!(matches!(copy, ViewData::Map(_)));
}

#[test]
fn test_context_reaches_grandchildren_one_level_at_a_time() {
    let factory = ViewFactory::new(engine());
    let leaf = factory.create("(:lang)", Context::new());
    let middle = factory.create("[:leaf]", Context::new());
    let root = factory.create(":middle", [(":lang", "en")].into());

    middle.nest(leaf, ":leaf");
    root.nest(middle, ":middle");

    assert_eq!(root.render(Context::new()).unwrap(), "[(en)]");
}

#[test]
fn test_inherit_never_copies_views() {
    let mut parent = View::new("t");
    let child = View::new("c").into_node();
    parent.inherit(Context::from_iter([
        ("a", Slot::from(1)),
        ("child", Slot::from(child)),
    ]));

    assert!(parent.inherited().has("a"));
    assert!(!parent.inherited().has("child"));
}

#[test]
fn test_to_array_round_trip() {
    let factory = ViewFactory::new(engine());
    let child = factory.create("child.html", [("n", 1)].into());
    let view = factory.create("page.html", [("a", "b")].into());
    view.set("c", child);

    assert_eq!(
        view.to_array(),
        json!({"a": "b", "c": {"n": 1, "_template": "child.html"}, "_template": "page.html"})
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_failing_child_renders_empty() {
    let factory = ViewFactory::new(engine());
    let broken = View::new("widget")
        .with_engine(Arc::new(BrokenEngine))
        .with_exception_bag(Rc::clone(factory.exception_bag()))
        .into_node();
    let fine = factory.create("ok", Context::new());

    let page = factory.create("[:a|:b]", Context::new());
    page.set(":a", broken);
    page.set(":b", fine);

    assert_eq!(page.render(Context::new()).unwrap(), "[|ok]");

    let mut exceptions = factory.exception_bag().borrow_mut();
    assert_eq!(exceptions.count(), 1);
    assert_eq!(exceptions.pop().unwrap().to_string(), "template error: widget is broken");
}

#[test]
fn test_self_nested_collection_member_blanks_only_itself() {
    let factory = ViewFactory::new(engine());
    let page = factory.create("[:s]", Context::new());
    let a = factory.create("A", Context::new());
    let c = factory.create("C", Context::new());

    page.nest(a, ":s").nest(page.clone(), ":s").nest(c, ":s");

    assert_eq!(page.render(Context::new()).unwrap(), "[AC]");

    let exceptions = factory.exception_bag().borrow();
    assert_eq!(exceptions.count(), 1);
    assert!(matches!(exceptions.all()[0], RenderError::Recursion(_)));
}

#[test]
fn test_backend_error_is_captured() {
    let factory = ViewFactory::new(engine());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.j2");
    std::fs::write(&path, "{% for %}").unwrap();

    let view = factory.create(path.to_string_lossy().into_owned(), Context::new());
    assert_eq!(view.render(Context::new()).unwrap(), "");
    assert_eq!(factory.exception_bag().borrow().count(), 1);
}

#[test]
fn test_unresolved_template_propagates() {
    let only_jinja: Arc<dyn TemplateEngine> = Arc::new(DelegatingEngine::new(
        EngineResolver::new().with_engine(Arc::new(MiniJinjaEngine::new())),
    ));
    let factory = ViewFactory::new(only_jinja);

    let child = factory.create("partial.html", Context::new());
    let page = factory.create("page.twig", Context::new());
    page.nest(child, "content");

    let err = page.render(Context::new()).unwrap_err();
    assert!(err.is_unresolved());
    assert_eq!(
        err.to_string(),
        "could not resolve engine for template \"partial.html\""
    );
    assert!(factory.exception_bag().borrow().is_empty());
}

// ============================================================================
// Logging
// ============================================================================

#[test]
fn test_loggable_factory_records_every_render() {
    let logger = ViewLogger::new().with_stopwatch(Stopwatch::new()).shared();
    let factory = LoggableViewFactory::new(engine(), logger.clone());
    factory.assign("site", "stratum");

    let child = factory.create(fixture("foobar.html"), [("{{title}}", "Foo")].into());
    let page = factory.create(fixture("foobar.html"), Context::new());
    page.nest(child, "{{title}}");

    assert_eq!(page.render(Context::new()).unwrap(), "<h1><h1>Foo</h1></h1>");

    let logger = logger.borrow();
    assert_eq!(logger.views().len(), 2);
    assert!(logger.views().iter().all(|r| r.time.is_some()));
    assert!(logger.views().iter().all(|r| r.engine.as_deref() == Some("delegating")));

    let profile = logger.profile(&factory.shared_bag().borrow());
    assert_eq!(profile.views[0].id, page.id());
    assert_eq!(profile.globals.get("site"), Some(&json!("stratum")));
    assert!(profile.views[0].summary().starts_with("LoggableView \""));
}
