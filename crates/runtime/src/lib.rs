//! Component runtime: the `Component` contract, the tag registry, and the
//! orchestrator driving one full hydration pass end to end.

pub mod component;
pub mod pipeline;

pub use component::{Component, ComponentStyle, Registry, Render, RenderError};
pub use pipeline::{hydrate_document, render_to_string, HydrateOptions, HydrateOutcome};
