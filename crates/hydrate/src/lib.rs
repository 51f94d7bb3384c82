//! Hydration protocol: annotate a rendered tree with machine-readable
//! host/node markers, and decode serialized markup back into a structural
//! map of one component's boundary.
//!
//! The writer and decoder share one marker grammar ([`markers`]); ids are
//! stable for exactly one serialize→decode round trip.

pub mod annotate;
pub mod decode;
pub mod markers;

pub use annotate::{insert_vdom_annotations, AnnotatedHost};
pub use decode::{
    client_hydrate, client_hydrate_html, HydratedHost, HydratedKind, HydratedNode,
    OriginalLocationRef,
};
pub use markers::{Marker, NodeRef, HOST_ID_ATTR, NODE_ID_ATTR};
