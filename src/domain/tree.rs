//! WBS hierarchy
//!
//! The tree is never stored: parent/child links are recomputed from codes
//! whenever a view needs them. A node's parent is the element whose code is
//! the child's code with the last segment removed.

use std::collections::HashMap;

use super::code::{parent_code, sort_key};
use super::element::WorkBreakdownElement;

/// A parent -> child link inferred from codes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentEdge<'a> {
    pub parent: &'a WorkBreakdownElement,
    pub child: &'a WorkBreakdownElement,
}

/// Elements in hierarchical code order
#[derive(Debug, Clone)]
pub struct Hierarchy<'a> {
    ordered: Vec<&'a WorkBreakdownElement>,
}

impl<'a> Hierarchy<'a> {
    /// Orders elements by code; equal codes keep their input order
    pub fn new(elements: impl IntoIterator<Item = &'a WorkBreakdownElement>) -> Self {
        let mut ordered: Vec<_> = elements.into_iter().collect();
        ordered.sort_by_cached_key(|e| sort_key(&e.code));
        Self { ordered }
    }

    /// Elements in code order
    pub fn ordered(&self) -> &[&'a WorkBreakdownElement] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Finds the parent of an element by code lookup
    pub fn parent_of(&self, child: &WorkBreakdownElement) -> Option<&'a WorkBreakdownElement> {
        let wanted = parent_code(&child.code)?;
        self.by_code().get(wanted).copied()
    }

    /// All parent -> child edges, in child code order
    ///
    /// Children whose parent code matches no element get no edge. When codes
    /// repeat, the last element carrying a code is the one found.
    pub fn parent_edges(&self) -> Vec<ParentEdge<'a>> {
        let by_code = self.by_code();

        self.ordered
            .iter()
            .filter_map(|child| {
                let parent = *by_code.get(parent_code(&child.code)?)?;
                if std::ptr::eq(parent, *child) {
                    return None;
                }
                Some(ParentEdge { parent, child })
            })
            .collect()
    }

    /// Elements with no resolvable parent
    pub fn roots(&self) -> Vec<&'a WorkBreakdownElement> {
        let by_code = self.by_code();

        self.ordered
            .iter()
            .filter(|e| {
                parent_code(&e.code)
                    .and_then(|code| by_code.get(code))
                    .is_none()
            })
            .copied()
            .collect()
    }

    fn by_code(&self) -> HashMap<&'a str, &'a WorkBreakdownElement> {
        let mut map = HashMap::new();
        for element in &self.ordered {
            if !element.code.is_empty() {
                map.insert(element.code.as_str(), *element);
            }
        }
        map
    }
}
