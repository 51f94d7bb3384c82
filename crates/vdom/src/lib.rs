//! Virtual-DOM engine: declarative render output reconciled against live
//! document nodes with keyed diffing, slot projection across component
//! boundaries, and scoped style attachment.

pub mod host;
pub mod patch;
pub mod styles;
pub mod vnode;

pub use host::{render_host, unmount_host, HostState, Relocation};
pub use patch::{mount, mount_list, patch, patch_list, update_element};
pub use styles::{attach_styles, STYLE_SCOPE_ATTR};
pub use vnode::{VKind, VNode};
