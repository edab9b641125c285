//! Visual line detection and line wrapping.

use super::factory::WrapperKind;
use super::process::Pass;
use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::layout::Layout;

/// Group consecutive elements by rendered top edge.
///
/// An element within [`LINE_TOLERANCE`](crate::geometry::LINE_TOLERANCE) of
/// the running top joins the current line; anything further starts a new one.
pub fn detect_lines<L: Layout + ?Sized>(
    doc: &Document,
    layout: &mut L,
    elements: &[NodeId],
) -> Vec<Vec<NodeId>> {
    let mut lines: Vec<Vec<NodeId>> = Vec::new();
    let mut current: Vec<NodeId> = Vec::new();
    let mut top = None;

    for &element in elements {
        let rect = layout.bounding_rect(doc, element);
        match top {
            Some(line_top) if rect.same_line(line_top) => {}
            _ => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                top = Some(rect.top());
            }
        }
        current.push(element);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

impl<L: Layout + ?Sized> Pass<'_, L> {
    /// Wrap the element children of `target` into line containers and drop
    /// the now redundant `br` elements.
    pub(crate) fn wrap_lines(&mut self, target: NodeId) -> Result<()> {
        let members = self.doc.element_children(target);
        let groups = detect_lines(self.doc, self.layout, &members);
        let align = self.layout.text_align(self.doc, target);
        for group in groups {
            self.wrap_line(target, &group, &align)?;
        }

        for node in self.doc.descendants(target) {
            if self.doc.tag(node) == Some("br") {
                self.doc.remove(node)?;
            }
        }
        Ok(())
    }

    /// Move the run from the first to the last member, including the text
    /// between them, into a new line wrapper.
    fn wrap_line(&mut self, target: NodeId, members: &[NodeId], align: &str) -> Result<()> {
        let (Some(&first), Some(&last)) = (members.first(), members.last()) else {
            return Ok(());
        };
        let siblings = self.doc.child_nodes(target);
        let position = |id: NodeId| siblings.iter().position(|&n| n == id);
        let (Some(start), Some(end)) = (position(first), position(last)) else {
            return Err(Error::dom(format!("line member {first} left {target}")));
        };

        let line = self.make(WrapperKind::Line, "")?;
        self.doc.set_style_property(line, "text-align", align)?;
        self.doc.insert_before(target, line, Some(first))?;
        for &node in &siblings[start..=end] {
            self.doc.append_child(line, node)?;
        }
        self.doc.normalize(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use std::collections::HashMap;

    /// Fixed boxes keyed by node.
    struct Boxes(HashMap<NodeId, Rect>);

    impl Layout for Boxes {
        fn bounding_rect(&mut self, _: &Document, node: NodeId) -> Rect {
            self.0.get(&node).copied().unwrap_or_default()
        }
    }

    fn ids(n: u32) -> Vec<NodeId> {
        (100..100 + n).map(NodeId::from_raw).collect()
    }

    #[test]
    fn test_groups_by_top_with_tolerance() {
        let doc = Document::new();
        let nodes = ids(5);
        let tops = [0.0, 0.5, 20.0, 20.9, 40.0];
        let mut boxes = Boxes(
            nodes
                .iter()
                .zip(tops)
                .map(|(&id, top)| (id, Rect::new(0.0, top, 10.0, 20.0)))
                .collect(),
        );
        let lines = detect_lines(&doc, &mut boxes, &nodes);
        assert_eq!(
            lines,
            vec![
                vec![nodes[0], nodes[1]],
                vec![nodes[2], nodes[3]],
                vec![nodes[4]]
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let doc = Document::new();
        let mut boxes = Boxes(HashMap::new());
        assert!(detect_lines(&doc, &mut boxes, &[]).is_empty());
    }
}
