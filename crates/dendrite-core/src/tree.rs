//! The arena-backed mind-map tree.
//!
//! Nodes live in an arena owned by [`NodeTree`] and are addressed by opaque
//! [`NodeId`] handles. Children lists hold owning handles; the parent field
//! is a non-owning back-reference, never used to free memory, which keeps the
//! structure cycle-free without reference counting.
//!
//! Structural mutation (`add_child`, `reattach`, `remove`) is the surface for
//! the hosting application's node management; the layout engine only ever
//! writes `position` and `size` on existing nodes.
//!
//! # Overview
//!
//! - [`NodeTree`] - The arena and the structural mutation API
//! - [`Node`] - One node: id, content, geometry, expand state
//! - [`NodeId`] - Opaque arena handle
//! - [`NodeRecord`] - Plain nested record form for exchange with collaborators
//! - [`TreeError`] - Structural mutation failures
//!
//! # Handle Stability
//!
//! Handles stay valid for the lifetime of their node. Removing a subtree
//! invalidates the handles of the removed nodes; a stale handle may later
//! address a different node, so collaborators must drop handles of nodes
//! they removed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    content::NodeContent,
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

/// Opaque handle addressing a node inside a [`NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Errors from structural tree mutation.
///
/// Layout itself never fails; these cover only the node-management surface.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The handle does not address a live node in this tree.
    #[error("unknown node handle {0:?}")]
    UnknownHandle(NodeId),

    /// A node with this id already exists in the tree.
    #[error("node id {0} already exists in this tree")]
    DuplicateId(Id),

    /// Attaching here would make a node its own ancestor.
    #[error("reattaching {0} under one of its descendants would create a cycle")]
    WouldCycle(Id),

    /// The root cannot be reattached or removed.
    #[error("the root node cannot be moved or removed")]
    RootImmovable,
}

/// One mind-map node.
///
/// `position` is the top-left corner of the node's box and is meaningful
/// only after at least one layout pass; unlaid nodes sit at `(0, 0)`.
/// The growth side (left or right of the root) is inferred from `x` relative
/// to the root and never stored.
#[derive(Debug, Clone)]
pub struct Node {
    id: Id,
    content: NodeContent,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    position: Point,
    size: Size,
    expanded: bool,
    expanded_left: bool,
    expanded_right: bool,
}

impl Node {
    fn new(id: Id, content: NodeContent, parent: Option<NodeId>) -> Self {
        Self {
            id,
            content,
            parent,
            children: Vec::new(),
            position: Point::default(),
            size: Size::default(),
            expanded: true,
            expanded_left: true,
            expanded_right: true,
        }
    }

    /// Returns this node's identifier.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns this node's content.
    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    /// Replaces this node's content.
    ///
    /// Sizes go stale until the next measuring layout pass (or an explicit
    /// size recalculation).
    pub fn set_content(&mut self, content: NodeContent) {
        self.content = content;
    }

    /// Returns the parent handle, or `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the ordered children handles.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the top-left position of this node's box.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Sets the top-left position. Normally written by the layout engine.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Returns the size of this node's box (content plus decorations).
    pub fn size(&self) -> Size {
        self.size
    }

    /// Sets the box size. Normally written by the layout engine, or by hosts
    /// that measured content themselves before a positions-only pass.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Returns the box occupied by this node.
    pub fn bounds(&self) -> Bounds {
        self.position.to_bounds(self.size)
    }

    /// Whether this node's subtree is expanded.
    ///
    /// Collapsing hides all descendants on this node's growth side. The root
    /// is governed by [`expanded_left`](Self::expanded_left) and
    /// [`expanded_right`](Self::expanded_right) instead.
    pub fn expanded(&self) -> bool {
        self.expanded
    }

    /// Sets the expand state of this node's subtree.
    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    /// Whether the root's left side is expanded. Root-only; ignored elsewhere.
    pub fn expanded_left(&self) -> bool {
        self.expanded_left
    }

    /// Sets the root's left-side expand state.
    pub fn set_expanded_left(&mut self, expanded: bool) {
        self.expanded_left = expanded;
    }

    /// Whether the root's right side is expanded. Root-only; ignored elsewhere.
    pub fn expanded_right(&self) -> bool {
        self.expanded_right
    }

    /// Sets the root's right-side expand state.
    pub fn set_expanded_right(&mut self, expanded: bool) {
        self.expanded_right = expanded;
    }
}

/// The arena of nodes making up one mind map.
///
/// A tree always has a root; every other node has exactly one parent.
///
/// # Examples
///
/// ```
/// # use dendrite_core::{content::NodeContent, tree::NodeTree};
/// let mut tree = NodeTree::new("root", NodeContent::plain_text("Central topic"));
/// let first = tree
///     .add_child(tree.root(), "first", NodeContent::plain_text("First branch"))
///     .expect("fresh id");
///
/// assert_eq!(tree.node(first).parent(), Some(tree.root()));
/// assert_eq!(tree.node_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct NodeTree {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    ids: IndexMap<Id, NodeId>,
    root: NodeId,
}

impl NodeTree {
    /// Creates a tree containing only a root node.
    pub fn new(id: impl Into<Id>, content: NodeContent) -> Self {
        let id = id.into();
        let root = NodeId(0);
        let mut ids = IndexMap::new();
        ids.insert(id, root);
        Self {
            slots: vec![Some(Node::new(id, content, None))],
            free: Vec::new(),
            ids,
            root,
        }
    }

    /// Returns the root handle.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the number of live nodes.
    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Returns the node for a handle, or `None` if the handle is stale.
    pub fn get(&self, node: NodeId) -> Option<&Node> {
        self.slots.get(node.0)?.as_ref()
    }

    /// Returns the node for a handle mutably, or `None` if the handle is stale.
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(node.0)?.as_mut()
    }

    /// Returns the node for a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not address a live node.
    pub fn node(&self, node: NodeId) -> &Node {
        self.get(node).expect("Node must exist")
    }

    /// Returns the node for a handle mutably.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not address a live node.
    pub fn node_mut(&mut self, node: NodeId) -> &mut Node {
        self.get_mut(node).expect("Node must exist")
    }

    /// Looks a node up by its identifier.
    pub fn node_by_id(&self, id: impl Into<Id>) -> Option<NodeId> {
        self.ids.get(&id.into()).copied()
    }

    /// Appends a new child under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownHandle`] for a stale parent handle and
    /// [`TreeError::DuplicateId`] if the id is already in use.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        id: impl Into<Id>,
        content: NodeContent,
    ) -> Result<NodeId, TreeError> {
        let index = self.get(parent).map(|node| node.children().len());
        self.add_child_at(parent, index.unwrap_or(0), id, content)
    }

    /// Inserts a new child under `parent` at the given index.
    ///
    /// The index is clamped to the current child count. Inserting among a
    /// root's children can silently move later siblings across the left/right
    /// split, since sides are assigned by index.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownHandle`] for a stale parent handle and
    /// [`TreeError::DuplicateId`] if the id is already in use.
    pub fn add_child_at(
        &mut self,
        parent: NodeId,
        index: usize,
        id: impl Into<Id>,
        content: NodeContent,
    ) -> Result<NodeId, TreeError> {
        let id = id.into();
        if self.get(parent).is_none() {
            return Err(TreeError::UnknownHandle(parent));
        }
        if self.ids.contains_key(&id) {
            return Err(TreeError::DuplicateId(id));
        }

        let child = self.alloc(Node::new(id, content, Some(parent)));
        self.ids.insert(id, child);
        let siblings = &mut self.node_mut_internal(parent).children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        Ok(child)
    }

    /// Moves a subtree under a new parent at the given child index.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::RootImmovable`] for the root,
    /// [`TreeError::UnknownHandle`] for stale handles, and
    /// [`TreeError::WouldCycle`] if `new_parent` lies inside the moved
    /// subtree.
    pub fn reattach(
        &mut self,
        node: NodeId,
        new_parent: NodeId,
        index: usize,
    ) -> Result<(), TreeError> {
        if node == self.root {
            return Err(TreeError::RootImmovable);
        }
        let node_id = self
            .get(node)
            .map(Node::id)
            .ok_or(TreeError::UnknownHandle(node))?;
        if self.get(new_parent).is_none() {
            return Err(TreeError::UnknownHandle(new_parent));
        }
        if new_parent == node || self.is_ancestor(node, new_parent) {
            return Err(TreeError::WouldCycle(node_id));
        }

        let old_parent = self
            .node_mut_internal(node)
            .parent
            .expect("non-root node has a parent");
        let siblings = &mut self.node_mut_internal(old_parent).children;
        siblings.retain(|&child| child != node);

        let new_siblings = &mut self.node_mut_internal(new_parent).children;
        let index = index.min(new_siblings.len());
        new_siblings.insert(index, node);
        self.node_mut_internal(node).parent = Some(new_parent);
        Ok(())
    }

    /// Removes a node and its whole subtree, returning the number of nodes
    /// removed. All their handles become stale.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::RootImmovable`] for the root and
    /// [`TreeError::UnknownHandle`] for a stale handle.
    pub fn remove(&mut self, node: NodeId) -> Result<usize, TreeError> {
        if node == self.root {
            return Err(TreeError::RootImmovable);
        }
        let parent = self
            .get(node)
            .and_then(Node::parent)
            .ok_or(TreeError::UnknownHandle(node))?;
        self.node_mut_internal(parent)
            .children
            .retain(|&child| child != node);

        let doomed = self.post_order(node);
        let removed = doomed.len();
        for handle in doomed {
            let freed = self.slots[handle.0].take().expect("Node must exist");
            self.ids.swap_remove(&freed.id);
            self.free.push(handle.0);
        }
        Ok(removed)
    }

    /// Returns whether `ancestor` lies on `node`'s ancestor chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.get(node).and_then(Node::parent);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.get(handle).and_then(Node::parent);
        }
        false
    }

    /// Returns the handles of `from` and all its descendants in post order
    /// (children before parents).
    pub fn post_order(&self, from: NodeId) -> Vec<NodeId> {
        let mut ordered = Vec::new();
        self.collect_post_order(from, &mut ordered);
        ordered
    }

    fn collect_post_order(&self, node: NodeId, ordered: &mut Vec<NodeId>) {
        if let Some(current) = self.get(node) {
            for &child in current.children() {
                self.collect_post_order(child, ordered);
            }
            ordered.push(node);
        }
    }

    /// Converts the whole tree into its plain nested record form.
    pub fn to_record(&self) -> NodeRecord {
        self.record_of(self.root)
    }

    fn record_of(&self, node: NodeId) -> NodeRecord {
        let current = self.node(node);
        NodeRecord {
            id: current.id().to_string(),
            content: current.content().clone(),
            children: current
                .children()
                .iter()
                .map(|&child| self.record_of(child))
                .collect(),
            x: current.position().x(),
            y: current.position().y(),
            width: current.size().width(),
            height: current.size().height(),
            expanded: current.expanded(),
            expanded_left: current.expanded_left(),
            expanded_right: current.expanded_right(),
        }
    }

    /// Builds a tree from its plain nested record form.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DuplicateId`] if two records share an id.
    pub fn from_record(record: &NodeRecord) -> Result<Self, TreeError> {
        let mut tree = Self::new(record.id.as_str(), record.content.clone());
        let root = tree.root();
        Self::apply_record_fields(tree.node_mut(root), record);
        for child in &record.children {
            tree.insert_record(root, child)?;
        }
        Ok(tree)
    }

    fn insert_record(&mut self, parent: NodeId, record: &NodeRecord) -> Result<(), TreeError> {
        let node = self.add_child(parent, record.id.as_str(), record.content.clone())?;
        Self::apply_record_fields(self.node_mut(node), record);
        for child in &record.children {
            self.insert_record(node, child)?;
        }
        Ok(())
    }

    fn apply_record_fields(node: &mut Node, record: &NodeRecord) {
        node.set_position(Point::new(record.x, record.y));
        node.set_size(Size::new(record.width, record.height));
        node.set_expanded(record.expanded);
        node.set_expanded_left(record.expanded_left);
        node.set_expanded_right(record.expanded_right);
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn node_mut_internal(&mut self, node: NodeId) -> &mut Node {
        self.slots[node.0].as_mut().expect("Node must exist")
    }
}

fn default_true() -> bool {
    true
}

/// Plain nested record form of a node and its subtree.
///
/// This is the exchange format between the tree and external collaborators
/// (persistence, clipboard, plugins): id, content, children, and the
/// persisted position/size/expand flags, with nothing arena-specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// The node's identifier.
    pub id: String,
    /// The node's content.
    #[serde(default)]
    pub content: NodeContent,
    /// Child records in sibling order.
    #[serde(default)]
    pub children: Vec<NodeRecord>,
    /// Persisted x of the top-left corner.
    #[serde(default)]
    pub x: f32,
    /// Persisted y of the top-left corner.
    #[serde(default)]
    pub y: f32,
    /// Persisted box width.
    #[serde(default)]
    pub width: f32,
    /// Persisted box height.
    #[serde(default)]
    pub height: f32,
    /// Subtree expand state.
    #[serde(default = "default_true")]
    pub expanded: bool,
    /// Root-only left-side expand state.
    #[serde(default = "default_true")]
    pub expanded_left: bool,
    /// Root-only right-side expand state.
    #[serde(default = "default_true")]
    pub expanded_right: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(text: &str) -> NodeContent {
        NodeContent::plain_text(text)
    }

    fn sample_tree() -> NodeTree {
        let mut tree = NodeTree::new("root", leaf("Central"));
        let a = tree.add_child(tree.root(), "a", leaf("A")).unwrap();
        let b = tree.add_child(tree.root(), "b", leaf("B")).unwrap();
        tree.add_child(a, "a1", leaf("A1")).unwrap();
        tree.add_child(a, "a2", leaf("A2")).unwrap();
        tree.add_child(b, "b1", leaf("B1")).unwrap();
        tree
    }

    #[test]
    fn test_new_tree_has_only_root() {
        let tree = NodeTree::new("root", leaf("Central"));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.node(tree.root()).id(), "root");
        assert!(tree.node(tree.root()).parent().is_none());
        assert!(tree.node(tree.root()).position().is_zero());
    }

    #[test]
    fn test_add_child_preserves_order() {
        let tree = sample_tree();
        let root_children: Vec<_> = tree
            .node(tree.root())
            .children()
            .iter()
            .map(|&child| tree.node(child).id())
            .collect();
        assert_eq!(root_children.len(), 2);
        assert_eq!(root_children[0], "a");
        assert_eq!(root_children[1], "b");
    }

    #[test]
    fn test_add_child_at_inserts_at_index() {
        let mut tree = sample_tree();
        tree.add_child_at(tree.root(), 1, "mid", leaf("Mid"))
            .unwrap();
        let ids: Vec<_> = tree
            .node(tree.root())
            .children()
            .iter()
            .map(|&child| tree.node(child).id())
            .collect();
        assert_eq!(ids[1], "mid");

        // Out-of-range index clamps to the end.
        tree.add_child_at(tree.root(), 99, "tail", leaf("Tail"))
            .unwrap();
        let last = *tree.node(tree.root()).children().last().unwrap();
        assert_eq!(tree.node(last).id(), "tail");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut tree = sample_tree();
        let result = tree.add_child(tree.root(), "a", leaf("again"));
        assert!(matches!(result, Err(TreeError::DuplicateId(_))));
    }

    #[test]
    fn test_node_by_id_lookup() {
        let tree = sample_tree();
        let a1 = tree.node_by_id("a1").expect("a1 exists");
        assert_eq!(tree.node(a1).id(), "a1");
        assert!(tree.node_by_id("missing").is_none());
    }

    #[test]
    fn test_reattach_moves_subtree() {
        let mut tree = sample_tree();
        let a = tree.node_by_id("a").unwrap();
        let b = tree.node_by_id("b").unwrap();
        let a1 = tree.node_by_id("a1").unwrap();

        tree.reattach(a1, b, 0).unwrap();
        assert_eq!(tree.node(a1).parent(), Some(b));
        assert_eq!(tree.node(b).children()[0], a1);
        assert_eq!(tree.node(a).children().len(), 1);
    }

    #[test]
    fn test_reattach_rejects_cycles() {
        let mut tree = sample_tree();
        let a = tree.node_by_id("a").unwrap();
        let a1 = tree.node_by_id("a1").unwrap();

        assert!(matches!(
            tree.reattach(a, a1, 0),
            Err(TreeError::WouldCycle(_))
        ));
        assert!(matches!(
            tree.reattach(a, a, 0),
            Err(TreeError::WouldCycle(_))
        ));
        assert!(matches!(
            tree.reattach(tree.root(), a, 0),
            Err(TreeError::RootImmovable)
        ));
    }

    #[test]
    fn test_remove_subtree() {
        let mut tree = sample_tree();
        let a = tree.node_by_id("a").unwrap();

        let removed = tree.remove(a).unwrap();
        assert_eq!(removed, 3); // a, a1, a2
        assert_eq!(tree.node_count(), 3);
        assert!(tree.node_by_id("a").is_none());
        assert!(tree.node_by_id("a1").is_none());
        assert_eq!(tree.node(tree.root()).children().len(), 1);
    }

    #[test]
    fn test_removed_slots_are_reused() {
        let mut tree = sample_tree();
        let count_before = tree.node_count();
        let b1 = tree.node_by_id("b1").unwrap();
        tree.remove(b1).unwrap();

        let b = tree.node_by_id("b").unwrap();
        tree.add_child(b, "b2", leaf("B2")).unwrap();
        assert_eq!(tree.node_count(), count_before);
        assert_eq!(tree.slots.len(), count_before);
    }

    #[test]
    fn test_remove_root_rejected() {
        let mut tree = sample_tree();
        assert!(matches!(
            tree.remove(tree.root()),
            Err(TreeError::RootImmovable)
        ));
    }

    #[test]
    fn test_post_order_children_before_parents() {
        let tree = sample_tree();
        let order: Vec<_> = tree
            .post_order(tree.root())
            .into_iter()
            .map(|node| tree.node(node).id().to_string())
            .collect();
        assert_eq!(order, vec!["a1", "a2", "a", "b1", "b", "root"]);
    }

    #[test]
    fn test_is_ancestor() {
        let tree = sample_tree();
        let a = tree.node_by_id("a").unwrap();
        let a1 = tree.node_by_id("a1").unwrap();
        let b = tree.node_by_id("b").unwrap();

        assert!(tree.is_ancestor(tree.root(), a1));
        assert!(tree.is_ancestor(a, a1));
        assert!(!tree.is_ancestor(b, a1));
        assert!(!tree.is_ancestor(a1, a));
    }

    #[test]
    fn test_expand_flags_default_true() {
        let tree = sample_tree();
        let root = tree.node(tree.root());
        assert!(root.expanded());
        assert!(root.expanded_left());
        assert!(root.expanded_right());
    }

    #[test]
    fn test_record_roundtrip() {
        let mut tree = sample_tree();
        let a = tree.node_by_id("a").unwrap();
        tree.node_mut(a).set_position(Point::new(120.0, -40.0));
        tree.node_mut(a).set_size(Size::new(80.0, 32.0));
        tree.node_mut(a).set_expanded(false);

        let record = tree.to_record();
        let restored = NodeTree::from_record(&record).expect("valid record");

        assert_eq!(restored.node_count(), tree.node_count());
        let restored_a = restored.node_by_id("a").unwrap();
        assert_eq!(restored.node(restored_a).position(), Point::new(120.0, -40.0));
        assert_eq!(restored.node(restored_a).size(), Size::new(80.0, 32.0));
        assert!(!restored.node(restored_a).expanded());
        assert_eq!(restored.to_record(), record);
    }

    #[test]
    fn test_record_json_defaults() {
        let json = r#"{"id": "solo", "content": {"body": {"PlainText": "hi"}}}"#;
        let record: NodeRecord = serde_json::from_str(json).expect("minimal record");
        assert!(record.expanded);
        assert!(record.children.is_empty());
        assert_eq!(record.width, 0.0);

        let tree = NodeTree::from_record(&record).expect("valid record");
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_record_duplicate_id_rejected() {
        let record = NodeRecord {
            id: "dup".to_string(),
            content: NodeContent::default(),
            children: vec![NodeRecord {
                id: "dup".to_string(),
                content: NodeContent::default(),
                children: vec![],
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
                expanded: true,
                expanded_left: true,
                expanded_right: true,
            }],
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            expanded: true,
            expanded_left: true,
            expanded_right: true,
        };
        assert!(matches!(
            NodeTree::from_record(&record),
            Err(TreeError::DuplicateId(_))
        ));
    }
}
