//! Path-based identifiers for rendered node instances.
//!
//! A child's id is its parent's id followed by `/`, a side marker and the
//! node label: `Eletronicos/L:Alimentos/R:Esportes`. Every descendant of a
//! node therefore starts with `"<id>/"`, which turns subtree queries into
//! range scans over an ordered map.

use std::fmt;

use serde::Serialize;

use crate::domain::arena::Side;

const SEPARATOR: char = '/';

/// Where a node is being rendered: at the root slot or under a parent.
#[derive(Debug, Clone, Copy)]
pub enum Placement<'a> {
    Root,
    Under(&'a VisibleId, Side),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct VisibleId(String);

impl VisibleId {
    pub fn new(placement: Placement<'_>, label: &str) -> Self {
        match placement {
            Placement::Root => Self(label.to_string()),
            Placement::Under(parent, side) => Self(format!(
                "{}{}{}:{}",
                parent.0,
                SEPARATOR,
                side.marker(),
                label
            )),
        }
    }

    /// Wrap an id string received from outside (e.g. a click target).
    pub fn parse(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower bound shared by every descendant id.
    pub fn descendant_prefix(&self) -> String {
        format!("{}{}", self.0, SEPARATOR)
    }

    pub fn is_descendant_of(&self, ancestor: &VisibleId) -> bool {
        self.0.len() > ancestor.0.len() + 1
            && self.0.starts_with(&ancestor.0)
            && self.0[ancestor.0.len()..].starts_with(SEPARATOR)
    }
}

impl fmt::Display for VisibleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_parent_when_building_child_ids_then_sides_are_distinct() {
        let root = VisibleId::new(Placement::Root, "A");
        let left = VisibleId::new(Placement::Under(&root, Side::Left), "B");
        let right = VisibleId::new(Placement::Under(&root, Side::Right), "B");

        assert_eq!(left.as_str(), "A/L:B");
        assert_eq!(right.as_str(), "A/R:B");
        assert_ne!(left, right);
    }

    #[test]
    fn given_nested_ids_when_checking_descendants_then_uses_path_prefix() {
        let root = VisibleId::new(Placement::Root, "A");
        let child = VisibleId::new(Placement::Under(&root, Side::Left), "B");
        let grandchild = VisibleId::new(Placement::Under(&child, Side::Right), "C");
        let lookalike = VisibleId::parse("AB");

        assert!(child.is_descendant_of(&root));
        assert!(grandchild.is_descendant_of(&root));
        assert!(grandchild.is_descendant_of(&child));
        assert!(!root.is_descendant_of(&root));
        assert!(!child.is_descendant_of(&grandchild));
        assert!(!lookalike.is_descendant_of(&root));
    }
}
