//! End-to-end pipeline runs against a small component set.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use diagnostics::{Kind, Level};
use runtime::{render_to_string, Component, ComponentStyle, HydrateOptions, Registry, Render, RenderError};
use vdom::VNode;

#[derive(Default)]
struct Greeting {
    name: String,
}

impl Component for Greeting {
    fn attribute_changed(&mut self, name: &str, _old: Option<&str>, new: Option<&str>) {
        if name == "name" {
            self.name = new.unwrap_or_default().to_string();
        }
    }

    fn render(&mut self) -> Result<Render, RenderError> {
        Ok(Render::Ready(vec![VNode::element("p")
            .attr("class", "greeting")
            .child(VNode::text(format!("Hello {}", self.name)))]))
    }

    fn styles(&self) -> Option<ComponentStyle> {
        Some(ComponentStyle {
            scope_id: "sc-greeting".to_string(),
            css: ".greeting { color: teal }".to_string(),
        })
    }
}

/// Wraps its light content in a card with a named slot.
struct Card;

impl Component for Card {
    fn render(&mut self) -> Result<Render, RenderError> {
        Ok(Render::Ready(vec![
            VNode::element("header").child(VNode::slot(Some("top"))),
            VNode::element("section").child(VNode::slot(None)),
        ]))
    }
}

/// Resolves after a fixed number of polls, modeling an async render.
struct Slow {
    polls: u32,
}

impl Component for Slow {
    fn render(&mut self) -> Result<Render, RenderError> {
        if self.polls > 0 {
            self.polls -= 1;
            return Ok(Render::Pending);
        }
        Ok(Render::Ready(vec![VNode::text("finally")]))
    }
}

struct NeverReady;

impl Component for NeverReady {
    fn render(&mut self) -> Result<Render, RenderError> {
        Ok(Render::Pending)
    }
}

struct Broken;

impl Component for Broken {
    fn render(&mut self) -> Result<Render, RenderError> {
        Err(RenderError::new("boom"))
    }
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register("x-greeting", Greeting::default);
    registry.register("x-card", || Card);
    registry.register("x-slow", || Slow { polls: 3 });
    registry.register("x-never", || NeverReady);
    registry.register("x-broken", || Broken);
    registry
}

#[test]
fn hydrates_renders_and_annotates() {
    let outcome = render_to_string(
        "<x-greeting name=\"Ada\"></x-greeting>",
        &registry(),
        &HydrateOptions::default(),
    );
    let html = outcome.html.expect("pipeline produces html");
    assert_eq!(outcome.components, vec!["x-greeting"]);
    assert!(html.contains("<x-greeting name=\"Ada\" s-id=\"0\">"));
    assert!(html.contains("Hello Ada"));
    assert!(html.contains("c-id=\"0.0.0.0\""));
    assert!(html.contains("<template shadowrootmode=\"open\">"));
    // Scoped styles attach once and survive pruning (".greeting" is used).
    assert!(html.contains("sty-id=\"sc-greeting\""));
    assert!(html.contains(".greeting"));
}

#[test]
fn slot_content_projects_across_the_component_boundary() {
    let outcome = render_to_string(
        "<x-card><b slot=\"top\">T</b><i>body</i></x-card>",
        &registry(),
        &HydrateOptions::default(),
    );
    let html = outcome.html.unwrap();
    assert!(html.contains(
        "<header c-id=\"0.0.0.0\"><!--s.0.1.1.0.top-->\
         <b slot=\"top\" c-id=\"0.2.1.1\"><!--t.0.3.2.0-->T</b></header>"
    ));
    assert!(html.contains("<!--s.0.5.1.0-->"));
    // Original-location markers remain in the light DOM.
    assert!(html.contains("<!--o.0."));
}

#[test]
fn nested_hosts_render_in_document_order() {
    struct Outer;
    impl Component for Outer {
        fn render(&mut self) -> Result<Render, RenderError> {
            Ok(Render::Ready(vec![
                VNode::element("x-greeting").attr("name", "inner")
            ]))
        }
    }
    let mut registry = registry();
    registry.register("x-outer", || Outer);

    let outcome = render_to_string(
        "<x-outer></x-outer>",
        &registry,
        &HydrateOptions::default(),
    );
    assert_eq!(outcome.components, vec!["x-outer", "x-greeting"]);
    let html = outcome.html.unwrap();
    assert!(html.contains("Hello inner"));
}

#[test]
fn pending_renders_resolve_by_repolling() {
    let outcome = render_to_string("<x-slow></x-slow>", &registry(), &HydrateOptions::default());
    assert_eq!(outcome.components, vec!["x-slow"]);
    assert!(outcome.html.unwrap().contains("finally"));
}

#[test]
fn render_errors_are_contained_to_their_component() {
    let outcome = render_to_string(
        "<x-broken></x-broken><x-greeting name=\"Bo\"></x-greeting>",
        &registry(),
        &HydrateOptions::default(),
    );
    assert_eq!(outcome.components, vec!["x-greeting"]);
    let html = outcome.html.unwrap();
    assert!(html.contains("Hello Bo"));
    // The broken host is untouched: no shadow template under it.
    assert!(html.contains("<x-broken s-id=") || html.contains("<x-broken>"));
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.level == Level::Error
            && d.kind == Kind::Runtime
            && d.message_text.contains("boom")));
}

#[test]
fn budget_exhaustion_finalizes_partial_output_with_breadcrumbs() {
    let outcome = render_to_string(
        "<x-greeting name=\"Zo\"></x-greeting><x-never></x-never>",
        &registry(),
        &HydrateOptions {
            budget: Duration::from_millis(50),
            ..HydrateOptions::default()
        },
    );
    let html = outcome.html.expect("partial output is still produced");
    assert!(html.contains("Hello Zo"));
    let timeout = outcome
        .diagnostics
        .iter()
        .find(|d| d.header == "hydration budget exhausted")
        .expect("timeout diagnostic");
    assert!(timeout.message_text.contains("html > body > x-never"));
}

#[test]
fn catastrophic_input_yields_no_output() {
    let outcome = render_to_string("   ", &registry(), &HydrateOptions::default());
    assert!(outcome.html.is_none());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].kind, Kind::Build);
    assert_eq!(outcome.diagnostics[0].level, Level::Error);
    let json = serde_json::to_string(&outcome.diagnostics).expect("diagnostics serialize");
    assert!(json.contains("\"build\""));
}

#[test]
fn unused_styles_are_pruned_conservatively() {
    let html = "<style>.used, .unused { color: red } .gone { top: 0 }</style>\
                <div class=\"used\"></div>";
    let outcome = render_to_string(html, &registry(), &HydrateOptions::default());
    let html = outcome.html.unwrap();
    assert!(html.contains(".used, .unused"));
    assert!(!html.contains(".gone"));
}

#[test]
fn malformed_html_still_hydrates_with_diagnostics() {
    let outcome = render_to_string(
        "<div><x-greeting name=\"Ed\"></x-greeting><b><i></b></i>",
        &registry(),
        &HydrateOptions::default(),
    );
    assert!(outcome.html.unwrap().contains("Hello Ed"));
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.kind == Kind::Build && d.level == Level::Warn));
}

#[test]
fn shared_registry_state_is_not_required() {
    // Factories may close over shared state; the registry itself stays
    // immutable during hydration.
    let counter = Rc::new(Cell::new(0u32));
    struct Counting {
        counter: Rc<Cell<u32>>,
    }
    impl Component for Counting {
        fn render(&mut self) -> Result<Render, RenderError> {
            self.counter.set(self.counter.get() + 1);
            Ok(Render::Ready(vec![VNode::text("n")]))
        }
    }
    let mut registry = Registry::new();
    let shared = Rc::clone(&counter);
    registry.register("x-count", move || Counting {
        counter: Rc::clone(&shared),
    });
    let outcome = render_to_string(
        "<x-count></x-count><x-count></x-count>",
        &registry,
        &HydrateOptions::default(),
    );
    assert_eq!(outcome.components.len(), 2);
    assert_eq!(counter.get(), 2);
}
