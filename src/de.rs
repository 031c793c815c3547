//! Deserialization of the node arena.
//!
//! A serialized arena is only trusted after its links and colors describe a valid
//! red-black tree; anything else is rejected with a deserializer error.

use crate::index::{IndexType, NodeIndex};
use crate::node::Node;
use crate::treemap::RbTreeMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// The arena as read from the input, before any link is followed.
#[derive(Deserialize)]
struct RawRbTreeMap<K, V, Ix> {
    nodes: Vec<Node<K, V, Ix>>,
    root: Option<NodeIndex<Ix>>,
}

/// Why a deserialized arena is not a red-black tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Corruption {
    TooManyNodes(usize),
    DanglingRoot(usize),
    DanglingLink(usize),
    RootHasParent,
    RedRoot,
    BrokenLink(usize),
    Revisited(usize),
    Unreachable(usize),
    RedChildOfRed(usize),
    BlackHeight(usize),
    Unordered(usize),
}

impl fmt::Display for Corruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid tree: ")?;
        match *self {
            Corruption::TooManyNodes(n) => write!(f, "{n} nodes do not fit the index type"),
            Corruption::DanglingRoot(i) => write!(f, "root {i} is out of bounds"),
            Corruption::DanglingLink(i) => write!(f, "node {i} links out of bounds"),
            Corruption::RootHasParent => f.write_str("root has a parent"),
            Corruption::RedRoot => f.write_str("root is red"),
            Corruption::BrokenLink(i) => write!(f, "node {i} does not point back at its parent"),
            Corruption::Revisited(i) => write!(f, "node {i} is reachable more than once"),
            Corruption::Unreachable(n) => write!(f, "{n} nodes are not reachable from the root"),
            Corruption::RedChildOfRed(i) => write!(f, "red node {i} has a red parent"),
            Corruption::BlackHeight(i) => write!(f, "paths below node {i} differ in black height"),
            Corruption::Unordered(i) => write!(f, "node {i} is out of key order"),
        }
    }
}

impl<K, V, Ix> RawRbTreeMap<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Check the arena with a single walk down from the root.
    fn validate(self) -> Result<RbTreeMap<K, V, Ix>, Corruption> {
        let nodes = &self.nodes;
        let len = nodes.len();
        let max = <Ix as IndexType>::max().index();
        if max != !0 && len > max {
            return Err(Corruption::TooManyNodes(len));
        }
        let in_bounds = |x: Option<NodeIndex<Ix>>| x.map_or(true, |x| x.index() < len);
        for (i, node) in nodes.iter().enumerate() {
            if ![node.left, node.right, node.parent].into_iter().all(&in_bounds) {
                return Err(Corruption::DanglingLink(i));
            }
        }

        let Some(root) = self.root else {
            if len != 0 {
                return Err(Corruption::Unreachable(len));
            }
            return Ok(RbTreeMap::with_capacity(0));
        };
        if root.index() >= len {
            return Err(Corruption::DanglingRoot(root.index()));
        }
        if nodes[root.index()].parent.is_some() {
            return Err(Corruption::RootHasParent);
        }
        if nodes[root.index()].is_red() {
            return Err(Corruption::RedRoot);
        }

        let mut visited = vec![false; len];
        visited[root.index()] = true;
        let mut reached = 1;
        let mut black_height = None;
        // (node, exclusive lower bound, exclusive upper bound, black nodes from the root)
        let mut stack = vec![(root, None, None, 1_usize)];
        while let Some((x, lo, hi, blacks)) = stack.pop() {
            let node = &nodes[x.index()];
            let above_lo = lo.map_or(true, |lo: NodeIndex<Ix>| nodes[lo.index()].key < node.key);
            let below_hi = hi.map_or(true, |hi: NodeIndex<Ix>| node.key < nodes[hi.index()].key);
            if !above_lo || !below_hi {
                return Err(Corruption::Unordered(x.index()));
            }
            for (child, lo, hi) in [(node.left, lo, Some(x)), (node.right, Some(x), hi)] {
                let Some(c) = child else {
                    match black_height {
                        None => black_height = Some(blacks),
                        Some(h) if h != blacks => return Err(Corruption::BlackHeight(x.index())),
                        Some(_) => {}
                    }
                    continue;
                };
                let child_node = &nodes[c.index()];
                if child_node.parent != Some(x) {
                    return Err(Corruption::BrokenLink(c.index()));
                }
                if visited[c.index()] {
                    return Err(Corruption::Revisited(c.index()));
                }
                visited[c.index()] = true;
                reached += 1;
                if node.is_red() && child_node.is_red() {
                    return Err(Corruption::RedChildOfRed(c.index()));
                }
                stack.push((c, lo, hi, blacks + usize::from(!child_node.is_red())));
            }
        }
        if reached != len {
            return Err(Corruption::Unreachable(len - reached));
        }

        Ok(RbTreeMap {
            nodes: self.nodes,
            root: self.root,
        })
    }
}

impl<'de, K, V, Ix> Deserialize<'de> for RbTreeMap<K, V, Ix>
where
    K: Ord + Deserialize<'de>,
    V: Deserialize<'de>,
    Ix: IndexType + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawRbTreeMap::deserialize(deserializer)?
            .validate()
            .map_err(D::Error::custom)
    }
}
