//! Marker grammar shared by the annotation writer and the client decoder.
//!
//! Markers ride in-band in serialized HTML:
//! - elements: `c-id="host.node.depth.index"`, hosts additionally `s-id="host"`
//! - text anchors: a preceding comment `t.host.node.depth.index`
//! - slot placeholders: comment `s.host.node.depth.index[.name]`
//! - original locations: comment `o.host.node[.c]`, `.c` flagging content
//!   whose owner is itself nested inside another component's shadow boundary

/// Host element attribute carrying the host id.
pub const HOST_ID_ATTR: &str = "s-id";
/// Element attribute carrying the full node identifier.
pub const NODE_ID_ATTR: &str = "c-id";

/// Identifier minted for one annotated node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeRef {
    pub host_id: u32,
    pub node_id: u32,
    pub depth: u32,
    pub index: u32,
}

impl NodeRef {
    pub fn encode(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.host_id, self.node_id, self.depth, self.index
        )
    }

    /// Accepts the full `host.node.depth.index` form and the short
    /// `host.node` form (depth/index default to zero).
    pub fn parse(text: &str) -> Option<NodeRef> {
        let parts: Vec<&str> = text.split('.').collect();
        let (host_id, node_id, depth, index) = match parts.as_slice() {
            [h, n] => (h.parse().ok()?, n.parse().ok()?, 0, 0),
            [h, n, d, i] => (
                h.parse().ok()?,
                n.parse().ok()?,
                d.parse().ok()?,
                i.parse().ok()?,
            ),
            _ => return None,
        };
        Some(NodeRef {
            host_id,
            node_id,
            depth,
            index,
        })
    }
}

/// A decoded comment marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Marker {
    /// `t.`: anchors the text node that follows the comment.
    TextAnchor(NodeRef),
    /// `s.`: slot placeholder with an optional slot name.
    Slot(NodeRef, Option<String>),
    /// `o.`: original location of relocated content.
    OriginalLocation {
        host_id: u32,
        node_id: u32,
        nested: bool,
    },
}

impl Marker {
    pub fn encode(&self) -> String {
        match self {
            Marker::TextAnchor(node) => format!("t.{}", node.encode()),
            Marker::Slot(node, name) => match name {
                Some(name) => format!("s.{}.{}", node.encode(), name),
                None => format!("s.{}", node.encode()),
            },
            Marker::OriginalLocation { host_id, node_id, nested } => {
                if *nested {
                    format!("o.{host_id}.{node_id}.c")
                } else {
                    format!("o.{host_id}.{node_id}")
                }
            }
        }
    }

    /// Decode a comment body. Non-marker comments return `None`.
    pub fn parse(text: &str) -> Option<Marker> {
        let (kind, rest) = text.split_once('.')?;
        match kind {
            "t" => Some(Marker::TextAnchor(NodeRef::parse(rest)?)),
            "s" => {
                // Two or four numeric segments, then an optional slot name.
                let segments: Vec<&str> = rest.splitn(5, '.').collect();
                match segments.as_slice() {
                    [_, _] | [_, _, _, _] => Some(Marker::Slot(NodeRef::parse(rest)?, None)),
                    [h, n, name] if name.parse::<u32>().is_err() => Some(Marker::Slot(
                        NodeRef::parse(&format!("{h}.{n}"))?,
                        Some((*name).to_string()),
                    )),
                    [h, n, d, i, name] => Some(Marker::Slot(
                        NodeRef::parse(&format!("{h}.{n}.{d}.{i}"))?,
                        Some((*name).to_string()),
                    )),
                    _ => None,
                }
            }
            "o" => {
                let (ids, nested) = match rest.strip_suffix(".c") {
                    Some(ids) => (ids, true),
                    None => (rest, false),
                };
                let (h, n) = ids.split_once('.')?;
                Some(Marker::OriginalLocation {
                    host_id: h.parse().ok()?,
                    node_id: n.parse().ok()?,
                    nested,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Marker, NodeRef};

    #[test]
    fn node_refs_round_trip_both_forms() {
        let full = NodeRef {
            host_id: 2,
            node_id: 17,
            depth: 3,
            index: 1,
        };
        assert_eq!(NodeRef::parse(&full.encode()), Some(full));
        assert_eq!(
            NodeRef::parse("4.9"),
            Some(NodeRef {
                host_id: 4,
                node_id: 9,
                depth: 0,
                index: 0
            })
        );
        assert_eq!(NodeRef::parse("4"), None);
        assert_eq!(NodeRef::parse("a.b"), None);
    }

    #[test]
    fn markers_round_trip() {
        let node = NodeRef {
            host_id: 0,
            node_id: 5,
            depth: 1,
            index: 0,
        };
        for marker in [
            Marker::TextAnchor(node),
            Marker::Slot(node, None),
            Marker::Slot(node, Some("start".to_string())),
            Marker::OriginalLocation {
                host_id: 0,
                node_id: 5,
                nested: false,
            },
            Marker::OriginalLocation {
                host_id: 0,
                node_id: 5,
                nested: true,
            },
        ] {
            assert_eq!(Marker::parse(&marker.encode()), Some(marker.clone()));
        }
    }

    #[test]
    fn short_slot_form_carries_a_name() {
        assert_eq!(
            Marker::parse("s.0.5.start"),
            Some(Marker::Slot(
                NodeRef {
                    host_id: 0,
                    node_id: 5,
                    depth: 0,
                    index: 0
                },
                Some("start".to_string())
            ))
        );
    }

    #[test]
    fn ordinary_comments_are_not_markers() {
        assert_eq!(Marker::parse("just a note"), None);
        assert_eq!(Marker::parse(""), None);
        assert_eq!(Marker::parse("x.1.2"), None);
    }
}
