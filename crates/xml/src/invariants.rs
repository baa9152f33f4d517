//! Structural checks over finished xast trees.

use crate::position::Position;
use crate::types::{Node, Root};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Invariant {
    /// `start <= end` by offset and by `(line, column)`.
    StartNotAfterEnd,
    /// A child lies within its parent's span.
    ChildWithinParent,
    /// Each sibling starts at or after the previous sibling's end.
    SiblingsDoNotOverlap,
}

impl Invariant {
    pub const fn label(self) -> &'static str {
        match self {
            Self::StartNotAfterEnd => "start not after end",
            Self::ChildWithinParent => "child within parent",
            Self::SiblingsDoNotOverlap => "siblings do not overlap",
        }
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// First violation found by [`check_tree`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvariantViolation {
    pub invariant: Invariant,
    /// Child indices from the root down to the offending node.
    pub path: Vec<usize>,
    pub detail: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violated at {:?}: {}", self.invariant, self.path, self.detail)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check every node of `root`; returns the first violation found.
pub fn check_tree(root: &Root) -> Result<(), InvariantViolation> {
    let mut pending: Vec<(&[Node], Vec<usize>, Option<&Position>)> =
        vec![(root.children.as_slice(), Vec::new(), None)];

    while let Some((siblings, parent_path, parent)) = pending.pop() {
        let mut previous: Option<&Position> = None;
        for (index, node) in siblings.iter().enumerate() {
            let position = node.position();
            let violation = |invariant, detail: String| {
                let mut path = parent_path.clone();
                path.push(index);
                Err(InvariantViolation {
                    invariant,
                    path,
                    detail,
                })
            };

            if position.end.offset < position.start.offset
                || !position.start.precedes_or_equals(&position.end)
            {
                return violation(
                    Invariant::StartNotAfterEnd,
                    format!("{} {position:?}", node.kind()),
                );
            }
            if let Some(parent) = parent
                && (position.start.offset < parent.start.offset
                    || position.end.offset > parent.end.offset)
            {
                return violation(
                    Invariant::ChildWithinParent,
                    format!("{} {position:?} in {parent:?}", node.kind()),
                );
            }
            if let Some(previous) = previous
                && previous.end.offset > position.start.offset
            {
                return violation(
                    Invariant::SiblingsDoNotOverlap,
                    format!("{} {position:?} after {previous:?}", node.kind()),
                );
            }
            previous = Some(position);

            if let Some(children) = node.children()
                && !children.is_empty()
            {
                let mut path = parent_path.clone();
                path.push(index);
                pending.push((children, path, Some(position)));
            }
        }
    }
    Ok(())
}
