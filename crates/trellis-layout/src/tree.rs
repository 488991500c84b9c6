// crates/trellis-layout/src/tree.rs

use std::fmt;

use bitflags::bitflags;
use serde::Serialize;
use tracing::trace;
use trellis_core::{PropertyId, PropertyValue, Style};

use crate::cache::{CacheStats, LayoutCache};
use crate::{LayoutConfig, LayoutError, LayoutResult, Result};

/// Generational handle to a node in a [`LayoutTree`]. Handles to removed
/// nodes stay invalid even after their slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        const DIRTY = 0x01;
        const HAS_NEW_LAYOUT = 0x02;
        /// Leaf sized by the measure provider.
        const MEASURED = 0x04;
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) style: Style,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) flags: NodeFlags,
    /// Rounded result, what callers read.
    pub(crate) layout: LayoutResult,
    /// Fractional result written by the layout pass.
    pub(crate) unrounded: LayoutResult,
    pub(crate) cache: LayoutCache,
}

impl Node {
    fn new(style: Style) -> Self {
        Self {
            style,
            children: Vec::new(),
            parent: None,
            flags: NodeFlags::DIRTY | NodeFlags::HAS_NEW_LAYOUT,
            layout: LayoutResult::default(),
            unrounded: LayoutResult::default(),
            cache: LayoutCache::new(),
        }
    }

    pub(crate) fn is_measured(&self) -> bool {
        self.flags.contains(NodeFlags::MEASURED)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of layout nodes. Owns every node, its style and its results.
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    pub(crate) config: LayoutConfig,
    pub(crate) stats: CacheStats,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Replacing the config invalidates every computed layout.
    pub fn set_config(&mut self, config: LayoutConfig) {
        if self.config == config {
            return;
        }
        self.config = config;
        for node in self.slots.iter_mut().filter_map(|slot| slot.node.as_mut()) {
            node.flags.insert(NodeFlags::DIRTY);
            node.cache.clear();
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    pub fn new_node(&mut self) -> NodeId {
        self.new_node_with_style(Style::default())
    }

    pub fn new_node_with_style(&mut self, style: Style) -> NodeId {
        let node = Node::new(style);
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, node: Some(node) });
                NodeId::new(index, 0)
            }
        };
        trace!("Created node {}", id);
        id
    }

    /// Detaches `id` from its parent and frees it with its whole subtree.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        if let Some(parent) = self.node(id)?.parent {
            self.remove_child(parent, id)?;
        }

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                pending.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
            }
        }
        trace!("Removed node {} and its subtree", id);
        Ok(())
    }

    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        let parent_node = self.node(parent)?;
        if parent_node.is_measured() {
            return Err(LayoutError::MeasuredNodeWithChildren(parent));
        }
        let len = parent_node.children.len();

        let child_node = self.node(child)?;
        if let Some(existing) = child_node.parent {
            return Err(LayoutError::AlreadyHasParent { child, parent: existing });
        }
        if self.is_ancestor_or_self(child, parent)? {
            return Err(LayoutError::Cycle { parent, child });
        }
        if index > len {
            return Err(LayoutError::ChildIndexOutOfBounds { index, len });
        }

        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.mark_dirty(parent)
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.child_count(parent)?;
        self.insert_child(parent, child, index)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self
            .node(parent)?
            .children
            .iter()
            .position(|&existing| existing == child)
            .ok_or(LayoutError::NotAChild { parent, child })?;
        self.remove_child_at(parent, index).map(|_| ())
    }

    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        let parent_node = self.node_mut(parent)?;
        let len = parent_node.children.len();
        if index >= len {
            return Err(LayoutError::ChildIndexOutOfBounds { index, len });
        }
        let child = parent_node.children.remove(index);
        if let Ok(child_node) = self.node_mut(child) {
            child_node.parent = None;
        }
        self.mark_dirty(parent)?;
        Ok(child)
    }

    pub fn child_count(&self, parent: NodeId) -> Result<usize> {
        Ok(self.node(parent)?.children.len())
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Result<NodeId> {
        let children = &self.node(parent)?.children;
        children
            .get(index)
            .copied()
            .ok_or(LayoutError::ChildIndexOutOfBounds { index, len: children.len() })
    }

    pub fn children(&self, parent: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(parent)?.children)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn style(&self, id: NodeId) -> Result<&Style> {
        Ok(&self.node(id)?.style)
    }

    /// Replaces the style; the node is dirtied only if something changed.
    pub fn set_style(&mut self, id: NodeId, style: Style) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.style == style {
            return Ok(());
        }
        node.style = style;
        self.mark_dirty(id)
    }

    /// Edits the style in place through a closure.
    pub fn update_style<F>(&mut self, id: NodeId, update: F) -> Result<()>
    where
        F: FnOnce(&mut Style),
    {
        let mut style = self.node(id)?.style.clone();
        update(&mut style);
        self.set_style(id, style)
    }

    pub fn property(&self, id: NodeId, property: PropertyId) -> Result<PropertyValue> {
        Ok(self.node(id)?.style.get(property))
    }

    pub fn set_property(&mut self, id: NodeId, property: PropertyId, value: PropertyValue) -> Result<()> {
        let mut style = self.node(id)?.style.clone();
        style.set(property, value)?;
        self.set_style(id, style)
    }

    /// Registers (or unregisters) `id` as a leaf sized by the measure provider.
    pub fn set_measured(&mut self, id: NodeId, measured: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        if measured && !node.children.is_empty() {
            return Err(LayoutError::MeasuredNodeWithChildren(id));
        }
        if node.is_measured() == measured {
            return Ok(());
        }
        node.flags.set(NodeFlags::MEASURED, measured);
        self.mark_dirty(id)
    }

    pub fn is_measured(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.is_measured())
    }

    /// Flags the node and its ancestors for recomputation and drops their
    /// cached results. Stops at the first ancestor that is already dirty.
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id)?;
        node.flags.insert(NodeFlags::DIRTY);
        node.cache.clear();

        let mut current = node.parent;
        while let Some(ancestor) = current {
            let node = self.node_mut(ancestor)?;
            if node.flags.contains(NodeFlags::DIRTY) {
                break;
            }
            node.flags.insert(NodeFlags::DIRTY);
            node.cache.clear();
            current = node.parent;
        }
        Ok(())
    }

    pub fn is_dirty(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.flags.contains(NodeFlags::DIRTY))
    }

    /// The rounded layout computed by the last successful pass.
    pub fn layout(&self, id: NodeId) -> Result<&LayoutResult> {
        Ok(&self.node(id)?.layout)
    }

    /// The fractional layout before pixel-grid rounding.
    pub fn unrounded_layout(&self, id: NodeId) -> Result<&LayoutResult> {
        Ok(&self.node(id)?.unrounded)
    }

    /// Whether the layout changed since [`LayoutTree::mark_layout_seen`].
    pub fn has_new_layout(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.flags.contains(NodeFlags::HAS_NEW_LAYOUT))
    }

    pub fn mark_layout_seen(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.flags.remove(NodeFlags::HAS_NEW_LAYOUT);
        Ok(())
    }

    /// Cache counters from the most recent layout pass.
    pub fn last_pass_stats(&self) -> CacheStats {
        self.stats
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(LayoutError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(LayoutError::NodeNotFound(id))
    }

    /// True when `ancestor` is `id` or lies on the path from `id` to its root.
    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> Result<bool> {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return Ok(true);
            }
            current = self.node(node)?.parent;
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{FlexDirection, StyleValue};

    #[test]
    fn test_new_nodes_start_dirty() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        assert!(tree.is_dirty(node).unwrap());
        assert_eq!(tree.style(node).unwrap(), &Style::default());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_insert_and_remove_children() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let a = tree.new_node();
        let b = tree.new_node();
        let c = tree.new_node();

        tree.add_child(root, a).unwrap();
        tree.add_child(root, c).unwrap();
        tree.insert_child(root, b, 1).unwrap();
        assert_eq!(tree.children(root).unwrap(), &[a, b, c]);
        assert_eq!(tree.parent(b).unwrap(), Some(root));
        assert_eq!(tree.child_at(root, 2).unwrap(), c);

        tree.remove_child(root, a).unwrap();
        assert_eq!(tree.parent(a).unwrap(), None);
        assert_eq!(tree.remove_child_at(root, 1).unwrap(), c);
        assert_eq!(tree.child_count(root).unwrap(), 1);
    }

    #[test]
    fn test_structural_errors() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let child = tree.new_node();
        let grandchild = tree.new_node();
        tree.add_child(root, child).unwrap();
        tree.add_child(child, grandchild).unwrap();

        assert!(matches!(
            tree.add_child(root, grandchild),
            Err(LayoutError::AlreadyHasParent { .. })
        ));
        assert!(matches!(tree.add_child(grandchild, root), Err(LayoutError::Cycle { .. })));
        assert!(matches!(tree.add_child(root, root), Err(LayoutError::Cycle { .. })));

        let loose = tree.new_node();
        assert!(matches!(
            tree.insert_child(root, loose, 5),
            Err(LayoutError::ChildIndexOutOfBounds { index: 5, len: 1 })
        ));
        assert!(matches!(tree.remove_child(root, loose), Err(LayoutError::NotAChild { .. })));
        assert!(matches!(
            tree.set_measured(child, true),
            Err(LayoutError::MeasuredNodeWithChildren(_))
        ));

        tree.set_measured(loose, true).unwrap();
        let other = tree.new_node();
        assert!(matches!(
            tree.add_child(loose, other),
            Err(LayoutError::MeasuredNodeWithChildren(_))
        ));
    }

    #[test]
    fn test_removed_ids_go_stale() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let child = tree.new_node();
        let grandchild = tree.new_node();
        tree.add_child(root, child).unwrap();
        tree.add_child(child, grandchild).unwrap();

        tree.remove_node(child).unwrap();
        assert_eq!(tree.child_count(root).unwrap(), 0);
        assert!(matches!(tree.style(child), Err(LayoutError::NodeNotFound(_))));
        assert!(!tree.contains(grandchild));

        let reused = tree.new_node();
        assert_ne!(reused, child);
        assert!([child.index(), grandchild.index()].contains(&reused.index()));
        assert_eq!(reused.generation(), 1);
        assert!(!tree.contains(child));
        assert_eq!(tree.len(), 2);
    }

    fn clean(tree: &mut LayoutTree, ids: &[NodeId]) {
        for &id in ids {
            tree.node_mut(id).unwrap().flags.remove(NodeFlags::DIRTY);
        }
    }

    #[test]
    fn test_mark_dirty_propagates_to_root() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let child = tree.new_node();
        let leaf = tree.new_node();
        tree.add_child(root, child).unwrap();
        tree.add_child(child, leaf).unwrap();
        clean(&mut tree, &[root, child, leaf]);

        tree.update_style(leaf, |style| style.width = StyleValue::Point(10.0)).unwrap();
        assert!(tree.is_dirty(leaf).unwrap());
        assert!(tree.is_dirty(child).unwrap());
        assert!(tree.is_dirty(root).unwrap());
    }

    #[test]
    fn test_unchanged_style_does_not_dirty() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        clean(&mut tree, &[node]);

        tree.set_style(node, Style::default()).unwrap();
        assert!(!tree.is_dirty(node).unwrap());

        tree.set_property(node, PropertyId::FlexDirection, PropertyValue::FlexDirection(FlexDirection::Row))
            .unwrap();
        assert!(tree.is_dirty(node).unwrap());
        assert_eq!(
            tree.property(node, PropertyId::FlexDirection).unwrap(),
            PropertyValue::FlexDirection(FlexDirection::Row)
        );
    }

    #[test]
    fn test_set_property_type_mismatch() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        let result = tree.set_property(node, PropertyId::Width, PropertyValue::Float(Some(3.0)));
        assert!(matches!(result, Err(LayoutError::Style(_))));
    }
}
