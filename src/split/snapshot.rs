//! Pre-split state of a target.
//!
//! Revert is structural: every original node keeps its id, payload, and
//! child list, so ignored subtrees come back with their identity intact.
//! The serialized markup is kept as well; it backs `original_html` and is
//! the fallback when the structural restore fails (for example because the
//! host freed an original node while split).

use crate::dom::{Document, NodeData, NodeId};
use crate::error::Result;

const ARIA_LABEL: &str = "aria-label";
const ARIA_HIDDEN: &str = "aria-hidden";

#[derive(Clone, Debug)]
struct NodeRecord {
    id: NodeId,
    data: NodeData,
    children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub(crate) struct TargetSnapshot {
    pub(crate) target: NodeId,
    pub(crate) html: String,
    aria_label: Option<String>,
    aria_hidden: Option<String>,
    /// Last observed rendered width.
    pub(crate) width: f32,
    children: Vec<NodeId>,
    nodes: Vec<NodeRecord>,
}

impl TargetSnapshot {
    pub(crate) fn capture(doc: &Document, target: NodeId) -> Self {
        let nodes = doc
            .descendants(target)
            .into_iter()
            .filter_map(|id| {
                doc.node(id).map(|node| NodeRecord {
                    id,
                    data: node.data().clone(),
                    children: node.children().to_vec(),
                })
            })
            .collect();
        Self {
            target,
            html: doc.inner_html(target),
            aria_label: doc.attribute(target, ARIA_LABEL).map(str::to_string),
            aria_hidden: doc.attribute(target, ARIA_HIDDEN).map(str::to_string),
            width: 0.0,
            children: doc.children(target).to_vec(),
            nodes,
        }
    }

    /// Re-link every original node exactly as captured.
    pub(crate) fn restore(&self, doc: &mut Document) -> Result<()> {
        doc.restore_node(self.target, None, self.children.clone())?;
        for record in &self.nodes {
            doc.restore_node(record.id, Some(record.data.clone()), record.children.clone())?;
        }
        self.restore_aria(doc)
    }

    /// Rebuild the target's content from the captured markup.
    pub(crate) fn restore_markup(&self, doc: &mut Document) -> Result<()> {
        doc.set_inner_html(self.target, &self.html)?;
        self.restore_aria(doc)
    }

    fn restore_aria(&self, doc: &mut Document) -> Result<()> {
        for (name, value) in [
            (ARIA_LABEL, &self.aria_label),
            (ARIA_HIDDEN, &self.aria_hidden),
        ] {
            match value {
                Some(value) => doc.set_attribute(self.target, name, value)?,
                None => doc.remove_attribute(self.target, name)?,
            }
        }
        Ok(())
    }
}
