//! Tree layout engine
//!
//! Draws a category tree into a [`RenderSurface`] one level at a time. Only the
//! root is drawn initially; clicking an interactive node toggles its children.
//! Rendered nodes are keyed by path-based [`VisibleId`]s, so collapsing a node
//! is a range scan over everything below its id.

use std::collections::{BTreeMap, BTreeSet};

use generational_arena::Index;
use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

use crate::application::ApplicationResult;
use crate::domain::{
    connector_between, CategoryArena, CategoryTree, Connector, DomainError, LayoutMetrics,
    NodeData, Placement, Point, Side, ToggleRequest, UiEvent, VisibleId,
};
use crate::infrastructure::traits::{ElementHandle, ElementKind, RenderSurface};

const EXPANDED_CLASS: &str = "expanded";
const VISIBLE_CLASS: &str = "visible";

/// One rendered node instance.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualNodeRecord {
    pub element: ElementHandle,
    /// Source node in the engine's arena
    pub source: Index,
    pub position: Point,
    pub depth: usize,
    pub interactive: bool,
}

/// A rendered line from a parent to one of its children.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorRecord {
    pub element: ElementHandle,
    pub child: VisibleId,
    pub geometry: Connector,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Nothing to draw; the surface shows its empty state
    Empty,
    Rendered { root: VisibleId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Number of node records added, including re-expanded descendants
    Expanded { added: usize },
    /// Number of descendant node records removed
    Collapsed { removed: usize },
    /// Leaf nodes do not toggle
    Ignored,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotNode {
    pub id: VisibleId,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub depth: usize,
    pub interactive: bool,
    pub expanded: bool,
    pub products: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotConnector {
    pub parent: VisibleId,
    pub child: VisibleId,
    pub length: f64,
    pub angle_deg: f64,
}

/// Serializable view of what is currently drawn.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub empty: bool,
    pub nodes: Vec<SnapshotNode>,
    pub connectors: Vec<SnapshotConnector>,
}

/// Expand/collapse layout engine for one rendering session.
pub struct TreeLayoutEngine<S: RenderSurface> {
    arena: CategoryArena,
    metrics: LayoutMetrics,
    surface: S,
    expanded: BTreeSet<VisibleId>,
    records: BTreeMap<VisibleId, VisualNodeRecord>,
    /// Connectors grouped by the id of the parent they start from
    connectors: BTreeMap<VisibleId, Vec<ConnectorRecord>>,
}

impl<S: RenderSurface> TreeLayoutEngine<S> {
    /// Create an engine for `tree`. Nothing is drawn until [`Self::render_root`].
    pub fn new(tree: &CategoryTree, metrics: LayoutMetrics, surface: S) -> ApplicationResult<Self> {
        metrics.validate()?;
        Ok(Self {
            arena: CategoryArena::from_tree(tree),
            metrics,
            surface,
            expanded: BTreeSet::new(),
            records: BTreeMap::new(),
            connectors: BTreeMap::new(),
        })
    }

    /// Reset the view and draw the root at the canonical origin.
    ///
    /// Clears all records, connectors and expansion state first.
    #[instrument(level = "debug", skip(self))]
    pub fn render_root(&mut self) -> ApplicationResult<RenderOutcome> {
        self.surface.clear();
        self.records.clear();
        self.connectors.clear();
        self.expanded.clear();

        let Some(root) = self.arena.root() else {
            debug!("render_root: no root, showing empty state");
            self.surface.show_empty_state();
            return Ok(RenderOutcome::Empty);
        };

        let origin = self.metrics.root_origin;
        let id = self.render_node(root, 0, origin, Placement::Root)?;
        Ok(RenderOutcome::Rendered { root: id })
    }

    /// Draw a single node and, if its id is in the expansion state, its children.
    ///
    /// Rendering an id that already has a record replaces that record and
    /// tears down everything drawn below it.
    #[instrument(level = "trace", skip(self, placement))]
    pub fn render_node(
        &mut self,
        node: Index,
        depth: usize,
        position: Point,
        placement: Placement<'_>,
    ) -> ApplicationResult<VisibleId> {
        let position = position.ensure_finite("node position")?;
        let source = self
            .arena
            .get_node(node)
            .ok_or_else(|| DomainError::DanglingNode(format!("{node:?}")))?;
        let id = VisibleId::new(placement, &source.data.label);
        let interactive = source.has_children();
        let text = node_text(&source.data);
        let expanded = self.expanded.contains(&id);

        let element = self.surface.create_element(ElementKind::Node);
        self.surface.set_attribute(element, "id", id.as_str());
        self.surface.add_class(element, "tree-node");
        self.surface.add_class(element, &format!("level-{depth}"));
        self.surface.set_style(element, "left", "50%");
        self.surface.set_style(element, "top", "50%");
        self.surface
            .set_style(element, "transform", &translate(position.x, position.y));
        self.surface.set_text(element, &text);
        if interactive {
            self.surface.set_style(element, "cursor", "pointer");
            self.surface.listen(
                element,
                UiEvent::Toggle(ToggleRequest {
                    id: id.clone(),
                    node,
                    depth,
                    position,
                }),
            );
        } else {
            self.surface.set_style(element, "cursor", "default");
        }
        if expanded {
            self.surface.add_class(element, EXPANDED_CLASS);
        }
        self.surface.append(element);
        self.surface
            .defer_class(element, VISIBLE_CLASS, self.metrics.reveal.node_delay(depth));

        let record = VisualNodeRecord {
            element,
            source: node,
            position,
            depth,
            interactive,
        };
        if let Some(stale) = self.records.insert(id.clone(), record) {
            warn!("render_node: replacing existing record for {}", id);
            self.surface.remove(stale.element);
            let removed = self.remove_descendants(&id);
            trace!("dropped {} stale descendants of {}", removed, id);
        }
        trace!("rendered {} at ({}, {}) depth {}", id, position.x, position.y, depth);

        if expanded {
            self.render_children(&id, node, depth, position)?;
        }
        Ok(id)
    }

    /// Draw the immediate children of a rendered node plus their connectors.
    ///
    /// Returns the number of children drawn (0, 1 or 2).
    #[instrument(level = "trace", skip(self))]
    pub fn render_children(
        &mut self,
        parent_id: &VisibleId,
        parent: Index,
        depth: usize,
        parent_position: Point,
    ) -> ApplicationResult<usize> {
        let children: Vec<(Side, Index)> = self
            .arena
            .get_node(parent)
            .ok_or_else(|| DomainError::DanglingNode(parent_id.to_string()))?
            .children()
            .collect();

        for &(side, child) in &children {
            let position = self.metrics.child_position(parent_position, side);
            let child_id =
                self.render_node(child, depth + 1, position, Placement::Under(parent_id, side))?;
            self.draw_connector(parent_id, child_id, parent_position, position);
        }
        Ok(children.len())
    }

    /// Expand a collapsed node by one level, or collapse an expanded one
    /// removing its whole rendered subtree.
    ///
    /// Collapsing keeps descendants' expansion state, so re-expanding restores
    /// any deeper levels that were open before.
    #[instrument(level = "debug", skip(self), fields(id = %request.id))]
    pub fn toggle_expansion(
        &mut self,
        request: &ToggleRequest,
    ) -> ApplicationResult<ToggleOutcome> {
        let record = self
            .records
            .get(&request.id)
            .ok_or_else(|| DomainError::UnknownVisibleNode(request.id.to_string()))?;
        if !record.interactive {
            trace!("toggle ignored for leaf {}", request.id);
            return Ok(ToggleOutcome::Ignored);
        }
        // the record is authoritative, the payload only names the node
        let (element, source, depth, position) =
            (record.element, record.source, record.depth, record.position);

        if self.expanded.remove(&request.id) {
            self.surface.remove_class(element, EXPANDED_CLASS);
            let removed = self.remove_descendants(&request.id);
            debug!("collapsed {}: removed {} nodes", request.id, removed);
            Ok(ToggleOutcome::Collapsed { removed })
        } else {
            self.expanded.insert(request.id.clone());
            self.surface.add_class(element, EXPANDED_CLASS);
            let before = self.records.len();
            self.render_children(&request.id, source, depth, position)?;
            let added = self.records.len() - before;
            debug!("expanded {}: added {} nodes", request.id, added);
            Ok(ToggleOutcome::Expanded { added })
        }
    }

    /// Dispatch a payload handed back by the surface.
    pub fn handle_event(&mut self, event: &UiEvent) -> ApplicationResult<ToggleOutcome> {
        match event {
            UiEvent::Toggle(request) => self.toggle_expansion(request),
        }
    }

    /// Build the toggle payload for a rendered node from its record.
    pub fn request_for(&self, id: &VisibleId) -> Option<ToggleRequest> {
        self.records.get(id).map(|r| ToggleRequest {
            id: id.clone(),
            node: r.source,
            depth: r.depth,
            position: r.position,
        })
    }

    fn draw_connector(&mut self, parent_id: &VisibleId, child: VisibleId, from: Point, to: Point) {
        let geometry = connector_between(from, to, self.metrics.connector_nudge);

        let element = self.surface.create_element(ElementKind::Connector);
        self.surface.add_class(element, "tree-line");
        self.surface.set_attribute(element, "data-parent", parent_id.as_str());
        self.surface.set_attribute(element, "data-child", child.as_str());
        self.surface
            .set_style(element, "width", &format!("{}px", geometry.length));
        self.surface.set_style(
            element,
            "height",
            &format!("{}px", self.metrics.connector_thickness),
        );
        self.surface.set_style(element, "left", "50%");
        self.surface.set_style(element, "top", "50%");
        self.surface.set_style(
            element,
            "transform",
            &format!(
                "{} rotate({}deg)",
                translate(geometry.anchor.x, geometry.anchor.y),
                geometry.angle_deg
            ),
        );
        self.surface.set_style(element, "transform-origin", "0 0");
        self.surface
            .set_style(element, "background", &self.metrics.connector_color);
        self.surface.append(element);
        self.surface
            .defer_class(element, VISIBLE_CLASS, self.metrics.reveal.connector_delay());

        self.connectors
            .entry(parent_id.clone())
            .or_default()
            .push(ConnectorRecord {
                element,
                child,
                geometry,
            });
    }

    /// Remove every record below `id` and every connector starting at `id` or
    /// below it. Returns the number of node records removed.
    fn remove_descendants(&mut self, id: &VisibleId) -> usize {
        let prefix = id.descendant_prefix();
        let doomed: Vec<VisibleId> = self
            .records
            .range(VisibleId::parse(prefix)..)
            .take_while(|(key, _)| key.is_descendant_of(id))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            if let Some(record) = self.records.remove(key) {
                self.surface.remove(record.element);
            }
        }
        for owner in std::iter::once(id).chain(doomed.iter()) {
            if let Some(lines) = self.connectors.remove(owner) {
                for line in lines {
                    self.surface.remove(line.element);
                }
            }
        }
        doomed.len()
    }

    pub fn records(&self) -> &BTreeMap<VisibleId, VisualNodeRecord> {
        &self.records
    }

    pub fn record(&self, id: &VisibleId) -> Option<&VisualNodeRecord> {
        self.records.get(id)
    }

    pub fn visible_count(&self) -> usize {
        self.records.len()
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.values().map(Vec::len).sum()
    }

    pub fn connectors(&self) -> impl Iterator<Item = (&VisibleId, &ConnectorRecord)> + '_ {
        self.connectors
            .iter()
            .flat_map(|(parent, lines)| lines.iter().map(move |line| (parent, line)))
    }

    pub fn is_expanded(&self, id: &VisibleId) -> bool {
        self.expanded.contains(id)
    }

    pub fn expanded(&self) -> impl Iterator<Item = &VisibleId> + '_ {
        self.expanded.iter()
    }

    pub fn arena(&self) -> &CategoryArena {
        &self.arena
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Serializable copy of the current view.
    pub fn snapshot(&self) -> ViewSnapshot {
        let nodes = self
            .records
            .iter()
            .filter_map(|(id, record)| {
                let node = self.arena.get_node(record.source)?;
                Some(SnapshotNode {
                    id: id.clone(),
                    label: node.data.label.clone(),
                    x: record.position.x,
                    y: record.position.y,
                    depth: record.depth,
                    interactive: record.interactive,
                    expanded: self.expanded.contains(id),
                    products: node.data.product_count(),
                })
            })
            .collect();
        let connectors = self
            .connectors()
            .map(|(parent, line)| SnapshotConnector {
                parent: parent.clone(),
                child: line.child.clone(),
                length: line.geometry.length,
                angle_deg: line.geometry.angle_deg,
            })
            .collect();
        ViewSnapshot {
            empty: self.records.is_empty(),
            nodes,
            connectors,
        }
    }
}

fn translate(x: f64, y: f64) -> String {
    format!("translate(calc(-50% + {x}px), calc(-50% + {y}px))")
}

fn node_text(data: &NodeData) -> String {
    format!(
        "height {}\n{}\nBF {} | {} products",
        data.height,
        data.label,
        data.balance_factor,
        data.product_count()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TreeNode;
    use crate::infrastructure::scene::SceneSurface;

    fn engine(tree: CategoryTree) -> TreeLayoutEngine<SceneSurface> {
        TreeLayoutEngine::new(&tree, LayoutMetrics::default(), SceneSurface::new()).unwrap()
    }

    #[test]
    fn given_root_when_rendering_then_node_element_carries_layout_styles() {
        let mut engine = engine(CategoryTree::new(
            TreeNode::leaf("A").with_left(TreeNode::leaf("B")),
        ));
        engine.render_root().unwrap();

        let record = engine.record(&VisibleId::parse("A")).unwrap();
        let element = engine.surface().element(record.element).unwrap();
        assert_eq!(
            element.style("transform"),
            Some("translate(calc(-50% + 0px), calc(-50% + -150px))")
        );
        assert_eq!(element.style("cursor"), Some("pointer"));
        assert!(element.has_class("tree-node"));
        assert!(element.has_class("level-0"));
        assert!(element.text.contains("\nA\n"));
    }

    #[test]
    fn given_expanded_node_when_drawing_connector_then_anchor_is_nudged() {
        let mut engine = engine(CategoryTree::new(
            TreeNode::leaf("A").with_right(TreeNode::leaf("B")),
        ));
        engine.render_root().unwrap();
        let request = engine.request_for(&VisibleId::parse("A")).unwrap();
        engine.toggle_expansion(&request).unwrap();

        let (parent, line) = engine.connectors().next().unwrap();
        assert_eq!(parent.as_str(), "A");
        assert_eq!(line.child.as_str(), "A/R:B");
        assert_eq!(line.geometry.anchor, Point::new(0.0, -70.0));
        let element = engine.surface().element(line.element).unwrap();
        assert_eq!(element.attribute("data-parent"), Some("A"));
        assert_eq!(element.style("transform-origin"), Some("0 0"));
        assert_eq!(element.style("height"), Some("2px"));
    }

    #[test]
    fn given_non_finite_position_when_rendering_node_then_rejects() {
        let mut engine = engine(CategoryTree::new(TreeNode::leaf("A")));
        let root = engine.arena().root().unwrap();
        let err = engine
            .render_node(root, 0, Point::new(f64::INFINITY, 0.0), Placement::Root)
            .unwrap_err();
        assert!(err.to_string().contains("non-finite"));
        assert_eq!(engine.visible_count(), 0);
    }
}
