use crate::geometry::{self, Vec2, Wedge};
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

/// Position of an item in its tree, e.g. `/0/2` for the third child of the first child
/// of the root. The root itself is `/`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ItemPath(String);

crate::impl_string_newtype!(ItemPath);

impl ItemPath {
    pub fn root() -> Self {
        Self::new("/")
    }

    pub fn child(&self, index: usize) -> Self {
        if self.0 == "/" {
            Self(format!("/{index}"))
        } else {
            Self(format!("{}/{index}", self.0))
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct NodeId(usize);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, StrumDisplay,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Root,
    Submenu,
    Leaf,
}

/// Menu definition as handed over by the application for one show cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    /// Inferred from `children` when absent.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    /// Fixed direction relative to the parent. Free items are spread around it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    pub fn root(name: impl Into<String>, children: Vec<MenuItem>) -> Self {
        Self::with_kind(name, ItemKind::Root, children)
    }

    pub fn submenu(name: impl Into<String>, children: Vec<MenuItem>) -> Self {
        Self::with_kind(name, ItemKind::Submenu, children)
    }

    pub fn leaf(name: impl Into<String>) -> Self {
        Self::with_kind(name, ItemKind::Leaf, Vec::new())
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }

    fn with_kind(name: impl Into<String>, kind: ItemKind, children: Vec<MenuItem>) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind),
            angle: None,
            children,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Item {0} is a leaf but has children")]
    LeafWithChildren(ItemPath),
    #[error("Item {0} is declared as root but is not the top item")]
    NestedRoot(ItemPath),
}

/// Direction of an item from its parent and the wedge in which it is hovered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub angle: f64,
    pub wedge: Wedge,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub path: ItemPath,
    pub name: String,
    pub kind: ItemKind,
    pub children: Vec<NodeId>,
    /// Absent only for the root.
    pub layout: Option<Layout>,
    /// The wedge among this node's children which leads back to its parent.
    pub parent_wedge: Option<Wedge>,
    fixed_angle: Option<f64>,
}

impl Node {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == ItemKind::Leaf
    }

    pub fn angle(&self) -> Option<f64> {
        self.layout.map(|layout| layout.angle)
    }
}

/// Rough placement of an item relative to its parent, for label alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn from_direction(direction: Vec2) -> Self {
        if direction.x < -0.2 {
            Self::Left
        } else if direction.x > 0.2 {
            Self::Right
        } else if direction.y < 0.0 {
            Self::Top
        } else {
            Self::Bottom
        }
    }
}

/// Static per-node information a renderer needs to create the node once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLayout {
    pub id: NodeId,
    pub level: usize,
    pub kind: ItemKind,
    pub angle: Option<f64>,
    pub direction: Option<Vec2>,
    pub sibling_count: usize,
    pub parent_angle: Option<f64>,
    pub side: Option<Side>,
}

/// Arena holding the items of one shown menu. Nodes are stored in depth-first order,
/// so the root is always [`MenuTree::ROOT`].
#[derive(Debug, Clone)]
pub struct MenuTree {
    nodes: Vec<Node>,
}

impl MenuTree {
    pub const ROOT: NodeId = NodeId(0);

    /// Flattens `root`, assigns paths and then the angles and wedges of every node.
    pub fn build(root: MenuItem) -> Result<Self, TreeError> {
        let mut tree = Self { nodes: Vec::new() };
        tree.insert(root, ItemPath::root(), true)?;
        tree.assign_angles(Self::ROOT);
        Ok(tree)
    }

    fn insert(&mut self, item: MenuItem, path: ItemPath, top: bool) -> Result<NodeId, TreeError> {
        let kind = match (item.kind, top) {
            (_, true) => ItemKind::Root,
            (Some(ItemKind::Root), false) => return Err(TreeError::NestedRoot(path)),
            (Some(kind), false) => kind,
            (None, false) if item.children.is_empty() => ItemKind::Leaf,
            (None, false) => ItemKind::Submenu,
        };

        if kind == ItemKind::Leaf && !item.children.is_empty() {
            return Err(TreeError::LeafWithChildren(path));
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            path: path.clone(),
            name: item.name,
            kind,
            children: Vec::new(),
            layout: None,
            parent_wedge: None,
            fixed_angle: item.angle,
        });

        let children = item
            .children
            .into_iter()
            .enumerate()
            .map(|(index, child)| self.insert(child, path.child(index), false))
            .collect::<Result<Vec<_>, _>>()?;
        self.nodes[id.0].children = children;

        Ok(id)
    }

    fn assign_angles(&mut self, id: NodeId) {
        let node = &self.nodes[id.0];
        if node.children.is_empty() {
            return;
        }

        let parent_angle = node
            .angle()
            .map(|angle| geometry::normalize_angle(angle + 180.0));
        let children = node.children.clone();
        let fixed: Vec<_> = children
            .iter()
            .map(|child| self.nodes[child.0].fixed_angle)
            .collect();

        let angles = geometry::compute_item_angles(&fixed, parent_angle);
        let wedges = geometry::compute_item_wedges(&angles, parent_angle);
        self.nodes[id.0].parent_wedge = wedges.parent;

        for ((child, angle), wedge) in children.iter().zip(angles).zip(wedges.items) {
            self.nodes[child.0].layout = Some(Layout { angle, wedge });
            self.assign_angles(*child);
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Layout of a non-root node.
    ///
    /// # Panics
    ///
    /// Panics for the root, which has no direction.
    pub fn layout(&self, id: NodeId) -> &Layout {
        self.nodes[id.0]
            .layout
            .as_ref()
            .expect("every non-root item is laid out when the tree is built")
    }

    pub fn root(&self) -> &Node {
        self.node(Self::ROOT)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.path.as_str() == path)
            .map(NodeId)
    }

    /// Breadth-first node layouts. With `children_below`, every level is listed before
    /// the level above it so that children end up underneath their parents.
    pub fn node_layouts(&self, children_below: bool) -> Vec<NodeLayout> {
        let mut layouts = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([(Self::ROOT, None::<NodeId>, 0)]);

        while let Some((id, parent, level)) = queue.pop_front() {
            let node = self.node(id);
            let angle = node.angle();
            let direction = angle.map(|angle| Vec2::from_angle(angle, 1.0));

            layouts.push(NodeLayout {
                id,
                level,
                kind: node.kind,
                angle,
                direction,
                sibling_count: parent.map_or(0, |p| self.node(p).children.len()),
                parent_angle: parent
                    .filter(|_| level > 1)
                    .and_then(|p| self.node(p).angle()),
                side: direction.map(Side::from_direction),
            });

            queue.extend(node.children.iter().map(|&child| (child, Some(id), level + 1)));
        }

        if children_below {
            layouts.reverse();
        }
        layouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MenuItem {
        MenuItem::root(
            "Root",
            vec![
                MenuItem::leaf("Copy"),
                MenuItem::submenu(
                    "Window",
                    vec![MenuItem::leaf("Close"), MenuItem::leaf("Maximize")],
                ),
                MenuItem::leaf("Paste"),
            ],
        )
    }

    #[test]
    fn test_paths() {
        let tree = MenuTree::build(sample()).unwrap();
        let paths: Vec<_> = tree.ids().map(|id| tree.node(id).path.to_string()).collect();
        assert_eq!(paths, vec!["/", "/0", "/1", "/1/0", "/1/1", "/2"]);
        assert_eq!(tree.find("/1/1"), Some(NodeId(4)));
        assert_eq!(tree.find("/7"), None);
    }

    #[test]
    fn test_angles_are_assigned_recursively() {
        let tree = MenuTree::build(sample()).unwrap();
        assert!(tree.root().layout.is_none());
        assert!(tree.root().parent_wedge.is_none());

        let window = tree.find("/1").unwrap();
        assert_eq!(tree.layout(window).angle, 120.0);

        // The submenu keeps a gap towards the root at 300°.
        let gap = tree.node(window).parent_wedge.unwrap();
        assert!(gap.contains(300.0));
        for &child in &tree.node(window).children {
            assert!(!tree.layout(child).wedge.contains(300.0));
        }
    }

    #[test]
    fn test_kind_inference_and_validation() {
        let item = MenuItem {
            name: "Root".into(),
            kind: None,
            angle: None,
            children: vec![MenuItem {
                name: "Inferred".into(),
                children: vec![MenuItem::leaf("Leaf")],
                ..Default::default()
            }],
        };
        let tree = MenuTree::build(item).unwrap();
        assert_eq!(tree.root().kind, ItemKind::Root);
        assert_eq!(tree.node(NodeId(1)).kind, ItemKind::Submenu);
        assert_eq!(tree.node(NodeId(2)).kind, ItemKind::Leaf);

        let broken = MenuItem::root(
            "Root",
            vec![MenuItem {
                children: vec![MenuItem::leaf("x")],
                ..MenuItem::leaf("Leaf")
            }],
        );
        assert_eq!(
            MenuTree::build(broken).unwrap_err(),
            TreeError::LeafWithChildren(ItemPath::new("/0"))
        );

        let nested = MenuItem::root("Root", vec![MenuItem::root("Again", vec![])]);
        assert!(matches!(
            MenuTree::build(nested),
            Err(TreeError::NestedRoot(_))
        ));
    }

    #[test]
    fn test_fixed_angle_from_definition() {
        let item = MenuItem::root(
            "Root",
            vec![MenuItem::leaf("a"), MenuItem::leaf("b").with_angle(180.0)],
        );
        let tree = MenuTree::build(item).unwrap();
        assert_eq!(tree.layout(NodeId(2)).angle, 180.0);
        assert_eq!(tree.layout(NodeId(1)).angle, 0.0);
    }

    #[test]
    fn test_deserialize_definition() {
        let json = r#"{
            "name": "Root",
            "children": [
                { "name": "Open", "type": "leaf" },
                { "name": "More", "angle": 90, "children": [{ "name": "Deep" }] }
            ]
        }"#;
        let item: MenuItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.children[1].angle, Some(90.0));

        let tree = MenuTree::build(item).unwrap();
        assert_eq!(tree.node(NodeId(2)).kind, ItemKind::Submenu);
        assert_eq!(tree.node(NodeId(3)).name, "Deep");
    }

    #[test]
    fn test_node_layouts() {
        let tree = MenuTree::build(sample()).unwrap();
        let layouts = tree.node_layouts(false);

        let levels: Vec<_> = layouts.iter().map(|l| l.level).collect();
        assert_eq!(levels, vec![0, 1, 1, 1, 2, 2]);
        assert_eq!(layouts[0].side, None);
        assert_eq!(layouts[1].side, Some(Side::Top));
        assert_eq!(layouts[1].sibling_count, 3);
        assert_eq!(layouts[1].parent_angle, None);
        assert_eq!(layouts[4].parent_angle, Some(120.0));

        let below = tree.node_layouts(true);
        assert_eq!(below.first().map(|l| l.level), Some(2));
        assert_eq!(below.last().map(|l| l.id), Some(MenuTree::ROOT));
    }
}
