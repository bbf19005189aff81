//! Text rendering of category trees and of the currently visible view.

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::application::services::TreeLayoutEngine;
use crate::domain::{CategoryArena, NodeData, Placement, VisibleId};
use crate::infrastructure::traits::RenderSurface;

const EMPTY_TREE: &str = "(empty tree)";

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

fn describe(data: &NodeData) -> String {
    format!("{} ({} products)", data.label, data.product_count())
}

// Whole tree, every node
impl TreeNodeConvert for CategoryArena {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build(arena: &CategoryArena, idx: Index) -> Option<Tree<String>> {
            let node = arena.get_node(idx)?;
            let leaves: Vec<_> = node
                .children()
                .filter_map(|(side, child)| {
                    build(arena, child).map(|t| {
                        let root = format!("{} {}", side.marker(), t.root);
                        Tree::new(root).with_leaves(t.leaves)
                    })
                })
                .collect();
            Some(Tree::new(describe(&node.data)).with_leaves(leaves))
        }

        self.root()
            .and_then(|root| build(self, root))
            .unwrap_or_else(|| Tree::new(EMPTY_TREE.to_string()))
    }
}

// Only what is rendered; [+] collapsed, [-] expanded
impl<S: RenderSurface> TreeNodeConvert for TreeLayoutEngine<S> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build<S: RenderSurface>(
            engine: &TreeLayoutEngine<S>,
            id: &VisibleId,
        ) -> Option<Tree<String>> {
            let record = engine.record(id)?;
            let node = engine.arena().get_node(record.source)?;
            let marker = match (record.interactive, engine.is_expanded(id)) {
                (false, _) => "   ",
                (true, false) => "[+]",
                (true, true) => "[-]",
            };
            let leaves: Vec<_> = node
                .children()
                .filter_map(|(side, child)| {
                    let child_node = engine.arena().get_node(child)?;
                    let child_id =
                        VisibleId::new(Placement::Under(id, side), &child_node.data.label);
                    build(engine, &child_id)
                })
                .collect();
            let label = format!("{} {} <{}>", marker, describe(&node.data), id);
            Some(Tree::new(label).with_leaves(leaves))
        }

        self.records()
            .iter()
            .find(|(_, record)| record.depth == 0)
            .and_then(|(id, _)| build(self, id))
            .unwrap_or_else(|| Tree::new(EMPTY_TREE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample_tree;

    #[test]
    fn given_sample_arena_when_converting_then_lists_every_node_with_side() {
        let arena = CategoryArena::from_tree(&sample_tree());
        let text = arena.to_tree_string().to_string();

        assert!(text.starts_with("Eletronicos (2 products)"));
        assert!(text.contains("L Alimentos (1 products)"));
        assert!(text.contains("R Esportes (1 products)"));
        assert!(text.contains("L Livros (1 products)"));
    }

    #[test]
    fn given_empty_arena_when_converting_then_shows_placeholder() {
        let arena = CategoryArena::new();
        assert_eq!(arena.to_tree_string().root, EMPTY_TREE);
    }
}
