//! sprig: a server-side component hydration engine.
//!
//! One pass takes arbitrary HTML text, renders registered components against
//! the parsed tree, annotates the result with hydration markers, prunes
//! unused stylesheet rules, and serializes back to HTML. The pieces are
//! usable on their own; this crate re-exports the whole pipeline surface.

pub use css::{parse_css, remove_unused_styles, Stylesheet};
pub use diagnostics::{Diagnostic, Diagnostics, Kind, Level, Pos};
pub use dom::{
    parse_document, parse_fragment, query_selector, query_selector_all, serialize_node_to_html,
    Document, NodeId, ParseOptions, ParseOutcome, ParseSession, SerializeOptions,
};
pub use hydrate::{
    client_hydrate, client_hydrate_html, insert_vdom_annotations, HydratedHost, HydratedKind,
};
pub use runtime::{
    hydrate_document, render_to_string, Component, ComponentStyle, HydrateOptions, HydrateOutcome,
    Registry, Render, RenderError,
};
pub use vdom::{attach_styles, patch, render_host, HostState, VKind, VNode};

#[cfg(test)]
mod tests {
    use super::{render_to_string, HydrateOptions, Registry};

    #[test]
    fn pipeline_runs_with_an_empty_registry() {
        let outcome = render_to_string(
            "<!DOCTYPE html><style>.unused{a:b}</style><p class=\"x\">hi</p>",
            &Registry::new(),
            &HydrateOptions::default(),
        );
        let html = outcome.html.expect("html output");
        assert!(html.contains("<p class=\"x\">hi</p>"));
        assert!(!html.contains(".unused"));
        assert!(outcome.components.is_empty());
    }
}
