//! Which section is current, and which subtrees are open.
//!
//! Selection lives in an explicit value owned by whoever shows the document, so it can be
//! driven and inspected without a terminal. Selecting is always a wholesale replace; expansion
//! is tracked per section id and is independent of selection.

use crate::section::{Section, SectionStore};
use crate::tree::{find_path, TreeNode};
use std::collections::HashSet;

#[derive(Clone, Debug, Default)]
/// Current section plus per-node expand/collapse state for one document.
pub struct Selection {
    selected: Option<Section>,
    expanded: HashSet<String>,
    expandable: HashSet<String>,
}

#[derive(Clone, Copy, Debug)]
/// One line of the section outline as it should currently be drawn.
pub struct VisibleRow<'a> {
    /// Node shown on this row.
    pub node: &'a TreeNode,
    /// Nesting depth, 0 for roots.
    pub depth: usize,
    /// Whether the node's subsections are shown below it.
    pub expanded: bool,
    /// Whether this is the final sibling under its parent.
    pub is_last: bool,
}

impl Selection {
    #[must_use]
    /// Starts with nothing explicitly selected and every node that has children expanded.
    pub fn new(forest: &[TreeNode]) -> Self {
        let mut expandable = HashSet::new();
        let mut stack: Vec<&TreeNode> = forest.iter().collect();
        while let Some(node) = stack.pop() {
            if node.has_children() {
                expandable.insert(node.section.id.clone());
            }
            stack.extend(node.children.iter());
        }

        Self {
            selected: None,
            expanded: expandable.clone(),
            expandable,
        }
    }

    /// Replaces the selection; expansion state is untouched.
    pub fn select(&mut self, section: Section) {
        self.selected = Some(section);
    }

    /// Selects the section with `id` from the store, reporting whether it was found.
    ///
    /// An unknown id leaves the previous selection in place.
    pub fn select_id(&mut self, store: &SectionStore, id: &str) -> bool {
        match store.get(id) {
            Some(section) => {
                self.select(section.clone());
                true
            }
            None => false,
        }
    }

    /// Drops the explicit selection so the default applies again.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    #[must_use]
    /// The explicitly selected section, if any.
    pub fn selected(&self) -> Option<&Section> {
        self.selected.as_ref()
    }

    #[must_use]
    /// Section to display: the explicit selection, else the first section in backend order.
    pub fn current_section<'a>(&'a self, store: &'a SectionStore) -> Option<&'a Section> {
        self.selected.as_ref().or_else(|| store.first())
    }

    #[must_use]
    /// Whether `id` is the section being displayed.
    pub fn is_current(&self, store: &SectionStore, id: &str) -> bool {
        self.current_section(store).is_some_and(|s| s.id == id)
    }

    /// Flips expansion of `id`, returning whether anything changed.
    ///
    /// Nodes without children have no expand control, so toggling them does nothing.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.expandable.contains(id) {
            return false;
        }
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
        true
    }

    #[must_use]
    /// Whether the subsections of `id` are shown.
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Expands every ancestor of `id` so the section is visible in the outline.
    pub fn reveal(&mut self, forest: &[TreeNode], id: &str) {
        if let Some(mut path) = find_path(forest, id) {
            path.pop();
            self.expanded.extend(path);
        }
    }

    #[must_use]
    /// Outline rows in pre-order, skipping the subsections of collapsed nodes.
    pub fn visible_rows<'a>(&self, forest: &'a [TreeNode]) -> Vec<VisibleRow<'a>> {
        let mut rows = Vec::new();
        let mut stack: Vec<(&TreeNode, usize, bool)> = Vec::new();
        push_siblings(&mut stack, forest, 0);

        while let Some((node, depth, is_last)) = stack.pop() {
            let expanded = node.has_children() && self.is_expanded(&node.section.id);
            rows.push(VisibleRow {
                node,
                depth,
                expanded,
                is_last,
            });
            if expanded {
                push_siblings(&mut stack, &node.children, depth + 1);
            }
        }
        rows
    }
}

fn push_siblings<'a>(
    stack: &mut Vec<(&'a TreeNode, usize, bool)>,
    nodes: &'a [TreeNode],
    depth: usize,
) {
    let last = nodes.len().saturating_sub(1);
    stack.extend(
        nodes
            .iter()
            .enumerate()
            .rev()
            .map(|(i, node)| (node, depth, i == last)),
    );
}

#[cfg(test)]
#[path = "tests/selection.rs"]
mod tests;
