//! Flat-to-tree reconstruction of a document's section hierarchy.
//!
//! The backend hands over sections as a flat list where each record names its parent by id.
//! Nothing about that list is trusted: parents may be missing, self-referential, duplicated or
//! even form loops. The build is an explicit two-pass construction over an id-indexed map, and
//! every traversal is iterative, so it terminates in O(n) regardless of the wiring.

use crate::section::Section;
use std::collections::HashMap;
use tracing::debug;

#[derive(Clone, Debug, PartialEq)]
/// One section together with its nested subsections in document order.
pub struct TreeNode {
    /// The wrapped section.
    pub section: Section,
    /// Direct subsections, in the order they appeared in the flat input.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    #[must_use]
    /// Number of nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            total += 1;
            stack.extend(node.children.iter());
        }
        total
    }

    #[must_use]
    /// Whether the node has any subsections, and therefore an expand control.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

impl Drop for TreeNode {
    // Unlinks descendants onto a heap stack so deep chains are freed without recursion.
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Walk {
    Unseen,
    OnPath,
    Done,
}

/// Builds the section forest from the backend's flat list.
///
/// Every input section yields exactly one node: a section whose parent is absent, unknown, or
/// itself becomes a root, and a loop between sections is broken by promoting its earliest
/// member (in input order) to a root. When ids repeat, the first occurrence owns the id for
/// parent resolution. Roots and children keep the input order.
#[must_use]
pub fn build_tree(sections: &[Section]) -> Vec<TreeNode> {
    // Pass one: id -> index of the node built for it.
    let mut index_by_id: HashMap<&str, usize> = HashMap::with_capacity(sections.len());
    for (i, section) in sections.iter().enumerate() {
        if index_by_id.contains_key(section.id.as_str()) {
            debug!(id = %section.id, "duplicate section id, keeping first for parent lookup");
        } else {
            index_by_id.insert(section.id.as_str(), i);
        }
    }

    let mut parents: Vec<Option<usize>> = sections
        .iter()
        .enumerate()
        .map(|(i, section)| {
            let parent_id = section.parent_id.as_deref()?;
            if parent_id == section.id {
                debug!(id = %section.id, "section names itself as parent, treating as root");
                return None;
            }
            match index_by_id.get(parent_id) {
                Some(&parent) if parent != i => Some(parent),
                Some(_) => None,
                None => {
                    debug!(id = %section.id, parent_id, "dangling parent, treating as root");
                    None
                }
            }
        })
        .collect();

    break_cycles(&mut parents);

    // Pass two: attach in input order.
    let mut child_lists: Vec<Vec<usize>> = vec![Vec::new(); sections.len()];
    let mut roots = Vec::new();
    for (i, parent) in parents.iter().enumerate() {
        match parent {
            Some(parent) => child_lists[*parent].push(i),
            None => roots.push(i),
        }
    }

    assemble(sections, &roots, &child_lists)
}

/// Walks each parent chain once, cutting any loop at its lowest input index.
fn break_cycles(parents: &mut [Option<usize>]) {
    let mut state = vec![Walk::Unseen; parents.len()];
    let mut path = Vec::new();

    for start in 0..parents.len() {
        if state[start] != Walk::Unseen {
            continue;
        }
        path.clear();
        let mut cursor = Some(start);
        while let Some(i) = cursor {
            match state[i] {
                Walk::Done => break,
                Walk::OnPath => {
                    let loop_start = path.iter().position(|&p| p == i).unwrap_or(0);
                    if let Some(&earliest) = path[loop_start..].iter().min() {
                        debug!(index = earliest, "parent loop detected, promoting to root");
                        parents[earliest] = None;
                    }
                    break;
                }
                Walk::Unseen => {
                    state[i] = Walk::OnPath;
                    path.push(i);
                    cursor = parents[i];
                }
            }
        }
        for &i in &path {
            state[i] = Walk::Done;
        }
    }
}

/// Turns index-based child lists into owned nodes, bottom-up, without recursion.
fn assemble(sections: &[Section], roots: &[usize], child_lists: &[Vec<usize>]) -> Vec<TreeNode> {
    let mut post_order = Vec::with_capacity(sections.len());
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&i| (i, false)).collect();
    while let Some((i, expanded)) = stack.pop() {
        if expanded {
            post_order.push(i);
        } else {
            stack.push((i, true));
            stack.extend(child_lists[i].iter().rev().map(|&c| (c, false)));
        }
    }

    let mut built: Vec<Option<TreeNode>> = vec![None; sections.len()];
    for i in post_order {
        let children = child_lists[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[i] = Some(TreeNode {
            section: sections[i].clone(),
            children,
        });
    }

    roots.iter().filter_map(|&r| built[r].take()).collect()
}

#[must_use]
/// Total number of nodes across a forest.
pub fn count_nodes(forest: &[TreeNode]) -> usize {
    forest.iter().map(TreeNode::count).sum()
}

#[must_use]
/// Ids from a root down to the section with `id`, inclusive, or `None` if absent.
pub fn find_path(forest: &[TreeNode], id: &str) -> Option<Vec<String>> {
    let mut stack: Vec<(&TreeNode, usize)> = forest.iter().rev().map(|n| (n, 0)).collect();
    let mut path: Vec<&str> = Vec::new();
    while let Some((node, depth)) = stack.pop() {
        path.truncate(depth);
        path.push(node.section.id.as_str());
        if node.section.id == id {
            return Some(path.into_iter().map(str::to_string).collect());
        }
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }
    None
}

#[cfg(test)]
#[path = "tests/tree.rs"]
mod tests;
