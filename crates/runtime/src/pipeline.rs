//! Orchestrator: one full `parse → render components → annotate → prune CSS
//! → serialize` pass.
//!
//! Hosts hydrate strictly sequentially in document order; a host discovered
//! inside an earlier host's rendered output is picked up on the next scan.
//! The wall-clock budget is the only condition that aborts the pipeline:
//! everything hydrated so far is force-finalized and the still-pending hosts
//! are named in a diagnostic as ancestor-chain breadcrumbs.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use css::remove_unused_styles;
use diagnostics::{Diagnostic, Diagnostics, Kind, Pos};
use dom::{
    parse_document, serialize_node_to_html, Document, NodeId, ParseError, ParseOptions,
    SerializeOptions,
};
use hydrate::insert_vdom_annotations;
use vdom::{attach_styles, render_host, HostState};

use crate::component::{Registry, Render};

/// Pipeline configuration.
#[derive(Debug)]
pub struct HydrateOptions {
    /// Wall-clock budget for the whole hydration pass.
    pub budget: Duration,
    pub parse: ParseOptions,
    pub serialize: SerializeOptions,
    /// Drop stylesheet rules whose selectors cannot match the final tree.
    pub prune_css: bool,
    /// Hosts annotated with a host id only (no per-node re-attachment data).
    pub static_components: Vec<String>,
}

impl Default for HydrateOptions {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(15),
            parse: ParseOptions::default(),
            serialize: SerializeOptions {
                serialize_shadow_roots: true,
                ..SerializeOptions::default()
            },
            prune_css: true,
            static_components: Vec::new(),
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug)]
pub struct HydrateOutcome {
    /// Serialized document; `None` only for catastrophic input failures.
    pub html: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// Tag names hydrated, in processing order.
    pub components: Vec<String>,
}

/// Hydrate `input` and serialize the annotated result.
pub fn render_to_string(input: &str, registry: &Registry, opts: &HydrateOptions) -> HydrateOutcome {
    let mut diags = Diagnostics::new();
    if input.trim().is_empty() {
        diags.push(Diagnostic::error(
            Kind::Build,
            "invalid hydrate input",
            "expected non-empty html text or an already-parsed document",
        ));
        return HydrateOutcome {
            html: None,
            diagnostics: diags.into_records(),
            components: Vec::new(),
        };
    }

    let outcome = parse_document(input, &opts.parse);
    let mut doc = outcome.document;
    let root = outcome.root;
    for err in &outcome.errors {
        diags.push(parse_diagnostic(input, err));
    }

    let components = hydrate_document(&mut doc, root, registry, opts, &mut diags);
    if opts.prune_css {
        remove_unused_styles(&mut doc, root, &mut diags);
    }
    let html = serialize_node_to_html(&doc, root, &opts.serialize);
    HydrateOutcome {
        html: Some(html),
        diagnostics: diags.into_records(),
        components,
    }
}

/// Hydrate an already-built document in place (the non-string input path).
/// Returns the hydrated tag names in processing order.
pub fn hydrate_document(
    doc: &mut Document,
    root: NodeId,
    registry: &Registry,
    opts: &HydrateOptions,
    diags: &mut Diagnostics,
) -> Vec<String> {
    let deadline = Instant::now() + opts.budget;
    let mut processed: HashSet<NodeId> = HashSet::new();
    let mut states: Vec<HostState> = Vec::new();
    let mut hydrated = Vec::new();

    while let Some(host) = next_host(doc, root, registry, &processed) {
        processed.insert(host);
        let Some(tag) = doc.element(host).map(|el| el.name.clone()) else {
            continue;
        };
        match hydrate_host(doc, host, &tag, registry, deadline, diags) {
            HostStep::Hydrated(state) => {
                states.push(state);
                hydrated.push(tag);
            }
            HostStep::Failed => {}
            HostStep::OutOfBudget => {
                report_timeout(doc, root, host, registry, &processed, diags);
                break;
            }
        }
    }

    let state_refs: Vec<&HostState> = states.iter().collect();
    insert_vdom_annotations(doc, &state_refs, &opts.static_components);
    log::debug!("hydrated {} component host(s)", hydrated.len());
    hydrated
}

enum HostStep {
    Hydrated(HostState),
    /// Render raised an error; the subtree is left in its prior state.
    Failed,
    OutOfBudget,
}

fn hydrate_host(
    doc: &mut Document,
    host: NodeId,
    tag: &str,
    registry: &Registry,
    deadline: Instant,
    diags: &mut Diagnostics,
) -> HostStep {
    let Some(mut component) = registry.create(tag) else {
        return HostStep::Failed;
    };
    let attrs: Vec<(String, String)> = doc
        .element(host)
        .map(|el| {
            el.attrs
                .iter()
                .map(|a| (a.name.clone(), a.value.clone()))
                .collect()
        })
        .unwrap_or_default();
    for (name, value) in &attrs {
        component.attribute_changed(name, None, Some(value));
    }

    // Cooperative re-poll loop: `Pending` is the pipeline's only suspension
    // point, bounded by the wall-clock deadline.
    let vnodes = loop {
        if Instant::now() >= deadline {
            return HostStep::OutOfBudget;
        }
        match component.render() {
            Ok(Render::Ready(vnodes)) => break vnodes,
            Ok(Render::Pending) => continue,
            Err(err) => {
                diags.push(Diagnostic::error(
                    Kind::Runtime,
                    "component render failed",
                    format!("<{tag}>: {err}"),
                ));
                return HostStep::Failed;
            }
        }
    };

    let mut state = HostState::new(doc, host);
    render_host(doc, &mut state, vnodes);
    if let Some(style) = component.styles() {
        attach_styles(doc, &style.scope_id, &style.css);
    }
    HostStep::Hydrated(state)
}

/// First registered, not-yet-processed host in document order. Rendered
/// subtrees are part of the walk, so hosts created by an earlier render are
/// discovered here.
fn next_host(
    doc: &Document,
    root: NodeId,
    registry: &Registry,
    processed: &HashSet<NodeId>,
) -> Option<NodeId> {
    let mut found = None;
    doc.walk(root, &mut |id| {
        if found.is_some() || processed.contains(&id) {
            return;
        }
        if doc.element(id).is_some_and(|el| registry.contains(&el.name)) {
            found = Some(id);
        }
    });
    found
}

fn report_timeout(
    doc: &Document,
    root: NodeId,
    pending: NodeId,
    registry: &Registry,
    processed: &HashSet<NodeId>,
    diags: &mut Diagnostics,
) {
    let mut chains = vec![ancestor_breadcrumb(doc, pending)];
    // Everything not reached yet was also still pending at the cutoff.
    doc.walk(root, &mut |id| {
        if id != pending
            && !processed.contains(&id)
            && doc.element(id).is_some_and(|el| registry.contains(&el.name))
        {
            chains.push(ancestor_breadcrumb(doc, id));
        }
    });
    diags.push(Diagnostic::error(
        Kind::Runtime,
        "hydration budget exhausted",
        format!("still pending: {}", chains.join(", ")),
    ));
}

/// Human-readable ancestor chain, e.g. `html > body > x-app > x-widget`.
fn ancestor_breadcrumb(doc: &Document, node: NodeId) -> String {
    let mut names = Vec::new();
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        if let Some(el) = doc.element(current) {
            names.push(el.name.clone());
        }
        cursor = doc.parent(current);
    }
    names.reverse();
    names.join(" > ")
}

fn parse_diagnostic(input: &str, err: &ParseError) -> Diagnostic {
    Diagnostic::warn(
        Kind::Build,
        "html parse",
        format!("{:?}", err.code),
    )
    .at(pos_of_offset(input, err.position))
}

fn pos_of_offset(input: &str, offset: usize) -> Pos {
    let clamped = offset.min(input.len());
    let mut line = 1;
    let mut column = 1;
    for (index, c) in input.char_indices() {
        if index >= clamped {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    Pos::new(line, column)
}
