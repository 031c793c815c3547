use crate::index::NodeIndex;

/// Node of the red-black tree
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node<K, V, Ix> {
    /// Left child, `None` for a leaf
    pub left: Option<NodeIndex<Ix>>,
    /// Right child, `None` for a leaf
    pub right: Option<NodeIndex<Ix>>,
    /// Parent, `None` for the root
    pub parent: Option<NodeIndex<Ix>>,
    /// Color of the node
    pub color: Color,

    /// Key of the node
    pub key: K,
    /// Value of the node
    pub value: V,
}

impl<K, V, Ix> Node<K, V, Ix> {
    /// A freshly inserted node: red, no children.
    pub fn new(key: K, value: V, parent: Option<NodeIndex<Ix>>) -> Self {
        Node {
            left: None,
            right: None,
            parent,
            color: Color::Red,
            key,
            value,
        }
    }
}

// Convenient getter/setter methods
impl<K, V, Ix> Node<K, V, Ix>
where
    Ix: Copy,
{
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn left(&self) -> Option<NodeIndex<Ix>> {
        self.left
    }

    pub fn right(&self) -> Option<NodeIndex<Ix>> {
        self.right
    }

    pub fn parent(&self) -> Option<NodeIndex<Ix>> {
        self.parent
    }

    pub fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }

    pub fn replace_value(value: V) -> impl FnOnce(&mut Node<K, V, Ix>) -> V {
        move |node: &mut Node<K, V, Ix>| std::mem::replace(&mut node.value, value)
    }

    pub fn set_color(color: Color) -> impl FnOnce(&mut Node<K, V, Ix>) {
        move |node: &mut Node<K, V, Ix>| {
            node.color = color;
        }
    }

    pub fn set_left(left: Option<NodeIndex<Ix>>) -> impl FnOnce(&mut Node<K, V, Ix>) {
        move |node: &mut Node<K, V, Ix>| {
            node.left = left;
        }
    }

    pub fn set_right(right: Option<NodeIndex<Ix>>) -> impl FnOnce(&mut Node<K, V, Ix>) {
        move |node: &mut Node<K, V, Ix>| {
            node.right = right;
        }
    }

    pub fn set_parent(parent: Option<NodeIndex<Ix>>) -> impl FnOnce(&mut Node<K, V, Ix>) {
        move |node: &mut Node<K, V, Ix>| {
            node.parent = parent;
        }
    }
}

/// The color of the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// Red node
    Red,
    /// Black node, also the color of every absent child
    Black,
}
