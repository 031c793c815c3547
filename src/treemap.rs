use crate::entry::{Entry, OccupiedEntry, VacantEntry};
use crate::index::{DefaultIx, IndexType, NodeIndex};
use crate::node::{Color, Node};
use std::borrow::Borrow;
use std::cmp::Ordering;

/// An ordered key-value map, backed by a red-black tree.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RbTreeMap<K, V, Ix = DefaultIx> {
    /// Vector that stores nodes
    pub(crate) nodes: Vec<Node<K, V, Ix>>,
    /// Root of the tree, `None` when the map is empty
    pub(crate) root: Option<NodeIndex<Ix>>,
}

/// Outcome of descending the tree towards a key.
pub(crate) enum Slot<Ix> {
    /// A node with the key exists.
    Occupied(NodeIndex<Ix>),
    /// The key would be attached below `parent` on the `side` it compared to.
    Vacant {
        parent: Option<NodeIndex<Ix>>,
        side: Ordering,
    },
}

impl<K, V, Ix> RbTreeMap<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Creates a new `RbTreeMap` with estimated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RbTreeMap {
            nodes: Vec::with_capacity(capacity),
            root: None,
        }
    }

    /// Insert a key-value pair into the map.
    /// If the key exists, overwrite the value in place and return the previous one.
    ///
    /// # Panics
    ///
    /// This method panics when the tree is at the maximum number of nodes for its index
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// assert_eq!(map.put("a", 1), None);
    /// assert_eq!(map.put("a", 2), Some(1));
    /// assert_eq!(map.put("a", 3), Some(2));
    /// assert_eq!(map.len(), 1);
    /// ```
    #[inline]
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match self.search_slot(&key) {
            Slot::Occupied(node_idx) => Some(self.node_mut(node_idx, Node::replace_value(value))),
            Slot::Vacant { parent, side } => {
                let _ignore = self.insert_at(parent, side, key, value);
                None
            }
        }
    }

    /// Remove a key from the map, returning the value at the key if the key exists
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put(1, "one");
    /// map.put(2, "two");
    /// assert_eq!(map.remove(&3), None);
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.remove(&2), Some("two"));
    /// assert_eq!(map.len(), 1);
    /// ```
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Remove a key from the map, returning the stored key and value if the key exists
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put(String::from("k"), 7);
    /// assert_eq!(map.remove_entry("k"), Some((String::from("k"), 7)));
    /// assert_eq!(map.remove_entry("k"), None);
    /// ```
    #[inline]
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).map(|node_idx| self.remove_at(node_idx))
    }

    /// Return reference to the value corresponding to the key.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put(1, 10);
    /// map.put(7, 70);
    /// assert_eq!(map.get(&1), Some(&10));
    /// assert_eq!(map.get(&7), Some(&70));
    /// assert_eq!(map.get(&5), None);
    /// ```
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).map(|idx| self.node_ref(idx, Node::value))
    }

    /// Return a mutable reference to the value corresponding to the key.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put(3, 0);
    /// if let Some(v) = map.get_mut(&3) {
    ///     *v += 1;
    /// }
    /// assert_eq!(map.get(&3), Some(&1));
    /// ```
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).map(|idx| self.node_mut(idx, Node::value_mut))
    }

    /// Return `true` if the map holds a value for the key.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put("a", 1);
    /// assert!(map.contains_key("a"));
    /// assert!(!map.contains_key("b"));
    /// ```
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).is_some()
    }

    /// Get the given key's corresponding entry in the map for in-place manipulation.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::{Entry, RbTreeMap};
    ///
    /// let mut map = RbTreeMap::new();
    ///
    /// assert!(matches!(map.entry("x"), Entry::Vacant(_)));
    /// map.entry("x").or_insert(0);
    /// assert!(matches!(map.entry("x"), Entry::Occupied(_)));
    /// map.entry("x").and_modify(|v| *v += 1);
    /// assert_eq!(map.get("x"), Some(&1));
    /// ```
    #[inline]
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, Ix> {
        match self.search_slot(&key) {
            Slot::Occupied(node_idx) => Entry::Occupied(OccupiedEntry {
                map_ref: self,
                node_idx,
            }),
            Slot::Vacant { parent, side } => Entry::Vacant(VacantEntry {
                map_ref: self,
                key,
                parent,
                side,
            }),
        }
    }

    /// Remove all elements from the map
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::RbTreeMap;
    ///
    /// let mut map: RbTreeMap<_, _> = (0..10).map(|k| (k, k)).collect();
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.get(&3), None);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Return the number of elements in the map.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put(1, "a");
    /// map.put(2, "b");
    /// map.put(1, "c");
    /// assert_eq!(map.len(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return `true` if the map contains no elements.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::RbTreeMap;
    ///
    /// let mut map = RbTreeMap::new();
    /// assert!(map.is_empty());
    /// map.put(1, "a");
    /// assert!(!map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

impl<K, V> RbTreeMap<K, V>
where
    K: Ord,
{
    /// Create an empty `RbTreeMap`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }
}

impl<K, V> Default for RbTreeMap<K, V>
where
    K: Ord,
{
    #[inline]
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<K, V, Ix> Extend<(K, V)> for RbTreeMap<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    #[inline]
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            let _ignore = self.put(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RbTreeMap<K, V>
where
    K: Ord,
{
    #[inline]
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, Ix> RbTreeMap<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Search for the node holding exactly the given key.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<NodeIndex<Ix>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut x = self.root;
        while let Some(xi) = x {
            x = match key.cmp(self.node_ref(xi, Node::key).borrow()) {
                Ordering::Less => self.node_ref(xi, Node::left),
                Ordering::Greater => self.node_ref(xi, Node::right),
                Ordering::Equal => return Some(xi),
            };
        }
        None
    }

    /// Descend towards `key`, remembering the last real node visited.
    pub(crate) fn search_slot(&self, key: &K) -> Slot<Ix> {
        let mut parent = None;
        let mut side = Ordering::Equal;
        let mut x = self.root;
        while let Some(xi) = x {
            parent = Some(xi);
            side = key.cmp(self.node_ref(xi, Node::key));
            x = match side {
                Ordering::Less => self.node_ref(xi, Node::left),
                Ordering::Greater => self.node_ref(xi, Node::right),
                Ordering::Equal => return Slot::Occupied(xi),
            };
        }
        Slot::Vacant { parent, side }
    }

    /// Attach a new red node below `parent` and rebalance.
    ///
    /// Node indices are never moved by an insertion, so the returned index stays
    /// valid until the next removal.
    pub(crate) fn insert_at(
        &mut self,
        parent: Option<NodeIndex<Ix>>,
        side: Ordering,
        key: K,
        value: V,
    ) -> NodeIndex<Ix> {
        let z = NodeIndex::new(self.nodes.len());
        // check for max capacity, except if we use usize
        assert!(
            <Ix as IndexType>::max().index() == !0 || NodeIndex::end() != z,
            "Reached maximum number of nodes"
        );
        self.nodes.push(Node::new(key, value, parent));
        match parent {
            None => self.root = Some(z),
            Some(p) if side == Ordering::Less => self.node_mut(p, Node::set_left(Some(z))),
            Some(p) => self.node_mut(p, Node::set_right(Some(z))),
        }
        self.insert_fixup(z);
        z
    }

    /// Unlink a node, rebalance, and reclaim its arena slot.
    pub(crate) fn remove_at(&mut self, z: NodeIndex<Ix>) -> (K, V) {
        self.remove_inner(z);
        // Swap the node with the last node stored in the vector and update indices
        let node = self.nodes.swap_remove(z.index());
        let old = NodeIndex::<Ix>::new(self.nodes.len());
        self.update_idx(old, z);
        (node.key, node.value)
    }

    /// Remove a node from the tree, leaving its slot in the arena unreferenced.
    fn remove_inner(&mut self, z: NodeIndex<Ix>) {
        let mut y_orig_color = self.node_ref(z, Node::color);
        let x;
        let x_parent;
        match (self.node_ref(z, Node::left), self.node_ref(z, Node::right)) {
            (None, z_right) => {
                x = z_right;
                x_parent = self.node_ref(z, Node::parent);
                self.transplant(z, x);
            }
            (z_left @ Some(_), None) => {
                x = z_left;
                x_parent = self.node_ref(z, Node::parent);
                self.transplant(z, x);
            }
            (Some(z_left), Some(z_right)) => {
                let y = self.tree_minimum(z_right);
                y_orig_color = self.node_ref(y, Node::color);
                x = self.node_ref(y, Node::right);
                if self.node_ref(y, Node::parent) == Some(z) {
                    x_parent = Some(y);
                } else {
                    x_parent = self.node_ref(y, Node::parent);
                    self.transplant(y, x);
                    self.node_mut(y, Node::set_right(Some(z_right)));
                    self.node_mut(z_right, Node::set_parent(Some(y)));
                }
                self.transplant(z, Some(y));
                self.node_mut(y, Node::set_left(Some(z_left)));
                self.node_mut(z_left, Node::set_parent(Some(y)));
                self.node_mut(y, Node::set_color(self.node_ref(z, Node::color)));
            }
        }

        if matches!(y_orig_color, Color::Black) {
            self.remove_fixup(x, x_parent);
        }
    }

    /// Restore red-black tree properties after an insert.
    fn insert_fixup(&mut self, mut z: NodeIndex<Ix>) {
        while let Some(mut p) = self.node_ref(z, Node::parent).filter(|&p| self.is_red(Some(p))) {
            // a red node is never the root, so the grandparent exists
            let Some(g) = self.node_ref(p, Node::parent) else {
                break;
            };
            if self.node_ref(g, Node::left) == Some(p) {
                let y = self.node_ref(g, Node::right);
                if self.is_red(y) {
                    self.node_mut(p, Node::set_color(Color::Black));
                    self.set_color(y, Color::Black);
                    self.node_mut(g, Node::set_color(Color::Red));
                    z = g;
                } else {
                    if self.node_ref(p, Node::right) == Some(z) {
                        self.left_rotate(p);
                        std::mem::swap(&mut z, &mut p);
                    }
                    self.node_mut(p, Node::set_color(Color::Black));
                    self.node_mut(g, Node::set_color(Color::Red));
                    self.right_rotate(g);
                }
            } else {
                let y = self.node_ref(g, Node::left);
                if self.is_red(y) {
                    self.node_mut(p, Node::set_color(Color::Black));
                    self.set_color(y, Color::Black);
                    self.node_mut(g, Node::set_color(Color::Red));
                    z = g;
                } else {
                    if self.node_ref(p, Node::left) == Some(z) {
                        self.right_rotate(p);
                        std::mem::swap(&mut z, &mut p);
                    }
                    self.node_mut(p, Node::set_color(Color::Black));
                    self.node_mut(g, Node::set_color(Color::Red));
                    self.left_rotate(g);
                }
            }
        }
        self.set_color(self.root, Color::Black);
    }

    /// Restore red-black tree properties after a remove.
    ///
    /// `x` carries the extra black and may be absent, so its parent is tracked
    /// alongside it instead of being read from `x`.
    fn remove_fixup(&mut self, mut x: Option<NodeIndex<Ix>>, mut parent: Option<NodeIndex<Ix>>) {
        while x != self.root && self.is_black(x) {
            let Some(p) = parent else {
                break;
            };
            if self.node_ref(p, Node::left) == x {
                let Some(mut w) = self.node_ref(p, Node::right) else {
                    break;
                };
                if self.node_ref(w, Node::is_red) {
                    self.node_mut(w, Node::set_color(Color::Black));
                    self.node_mut(p, Node::set_color(Color::Red));
                    self.left_rotate(p);
                    let Some(sibling) = self.node_ref(p, Node::right) else {
                        break;
                    };
                    w = sibling;
                }
                let w_left = self.node_ref(w, Node::left);
                let w_right = self.node_ref(w, Node::right);
                if self.is_black(w_left) && self.is_black(w_right) {
                    self.node_mut(w, Node::set_color(Color::Red));
                    x = Some(p);
                    parent = self.node_ref(p, Node::parent);
                } else {
                    if self.is_black(w_right) {
                        self.set_color(w_left, Color::Black);
                        self.node_mut(w, Node::set_color(Color::Red));
                        self.right_rotate(w);
                        let Some(sibling) = self.node_ref(p, Node::right) else {
                            break;
                        };
                        w = sibling;
                    }
                    self.node_mut(w, Node::set_color(self.node_ref(p, Node::color)));
                    self.node_mut(p, Node::set_color(Color::Black));
                    self.set_color(self.node_ref(w, Node::right), Color::Black);
                    self.left_rotate(p);
                    x = self.root;
                    parent = None;
                }
            } else {
                let Some(mut w) = self.node_ref(p, Node::left) else {
                    break;
                };
                if self.node_ref(w, Node::is_red) {
                    self.node_mut(w, Node::set_color(Color::Black));
                    self.node_mut(p, Node::set_color(Color::Red));
                    self.right_rotate(p);
                    let Some(sibling) = self.node_ref(p, Node::left) else {
                        break;
                    };
                    w = sibling;
                }
                let w_left = self.node_ref(w, Node::left);
                let w_right = self.node_ref(w, Node::right);
                if self.is_black(w_right) && self.is_black(w_left) {
                    self.node_mut(w, Node::set_color(Color::Red));
                    x = Some(p);
                    parent = self.node_ref(p, Node::parent);
                } else {
                    if self.is_black(w_left) {
                        self.set_color(w_right, Color::Black);
                        self.node_mut(w, Node::set_color(Color::Red));
                        self.left_rotate(w);
                        let Some(sibling) = self.node_ref(p, Node::left) else {
                            break;
                        };
                        w = sibling;
                    }
                    self.node_mut(w, Node::set_color(self.node_ref(p, Node::color)));
                    self.node_mut(p, Node::set_color(Color::Black));
                    self.set_color(self.node_ref(w, Node::left), Color::Black);
                    self.right_rotate(p);
                    x = self.root;
                    parent = None;
                }
            }
        }
        self.set_color(x, Color::Black);
    }

    /// Binary tree left rotate.
    pub(crate) fn left_rotate(&mut self, x: NodeIndex<Ix>) {
        let Some(y) = self.node_ref(x, Node::right) else {
            return;
        };
        let y_left = self.node_ref(y, Node::left);
        self.node_mut(x, Node::set_right(y_left));
        if let Some(b) = y_left {
            self.node_mut(b, Node::set_parent(Some(x)));
        }

        self.replace_parent(x, y);
        self.node_mut(y, Node::set_left(Some(x)));
    }

    /// Binary tree right rotate.
    pub(crate) fn right_rotate(&mut self, x: NodeIndex<Ix>) {
        let Some(y) = self.node_ref(x, Node::left) else {
            return;
        };
        let y_right = self.node_ref(y, Node::right);
        self.node_mut(x, Node::set_left(y_right));
        if let Some(b) = y_right {
            self.node_mut(b, Node::set_parent(Some(x)));
        }

        self.replace_parent(x, y);
        self.node_mut(y, Node::set_right(Some(x)));
    }

    /// Replace parent during a rotation.
    fn replace_parent(&mut self, x: NodeIndex<Ix>, y: NodeIndex<Ix>) {
        let x_parent = self.node_ref(x, Node::parent);
        self.node_mut(y, Node::set_parent(x_parent));
        match x_parent {
            None => self.root = Some(y),
            Some(p) if self.node_ref(p, Node::left) == Some(x) => {
                self.node_mut(p, Node::set_left(Some(y)));
            }
            Some(p) => self.node_mut(p, Node::set_right(Some(y))),
        }
        self.node_mut(x, Node::set_parent(Some(y)));
    }

    /// Find the node with the minimum key.
    fn tree_minimum(&self, mut x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        while let Some(left) = self.node_ref(x, Node::left) {
            x = left;
        }
        x
    }

    /// Replace one subtree as a child of its parent with another subtree.
    fn transplant(&mut self, u: NodeIndex<Ix>, v: Option<NodeIndex<Ix>>) {
        let u_parent = self.node_ref(u, Node::parent);
        match u_parent {
            None => self.root = v,
            Some(p) if self.node_ref(p, Node::left) == Some(u) => {
                self.node_mut(p, Node::set_left(v));
            }
            Some(p) => self.node_mut(p, Node::set_right(v)),
        }
        if let Some(v) = v {
            self.node_mut(v, Node::set_parent(u_parent));
        }
    }

    /// Repoint every link to the node that `swap_remove` moved from `old` to `new`.
    fn update_idx(&mut self, old: NodeIndex<Ix>, new: NodeIndex<Ix>) {
        if self.nodes.get(new.index()).is_none() {
            return;
        }
        if self.root == Some(old) {
            self.root = Some(new);
        }
        match self.node_ref(new, Node::parent) {
            Some(p) if self.node_ref(p, Node::left) == Some(old) => {
                self.node_mut(p, Node::set_left(Some(new)));
            }
            Some(p) => self.node_mut(p, Node::set_right(Some(new))),
            None => {}
        }
        if let Some(left) = self.node_ref(new, Node::left) {
            self.node_mut(left, Node::set_parent(Some(new)));
        }
        if let Some(right) = self.node_ref(new, Node::right) {
            self.node_mut(right, Node::set_parent(Some(new)));
        }
    }
}

// Convenient methods for reference or mutate nodes and possibly absent links
impl<'a, K, V, Ix> RbTreeMap<K, V, Ix>
where
    Ix: IndexType,
{
    pub(crate) fn node_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<K, V, Ix>) -> R,
    {
        op(&self.nodes[node.index()])
    }

    pub(crate) fn node_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<K, V, Ix>) -> R,
    {
        op(&mut self.nodes[node.index()])
    }

    /// Color of a link; an absent node is black.
    pub(crate) fn color(&self, node: Option<NodeIndex<Ix>>) -> Color {
        node.map_or(Color::Black, |n| self.nodes[n.index()].color)
    }

    fn is_red(&self, node: Option<NodeIndex<Ix>>) -> bool {
        matches!(self.color(node), Color::Red)
    }

    fn is_black(&self, node: Option<NodeIndex<Ix>>) -> bool {
        matches!(self.color(node), Color::Black)
    }

    /// Recolor a link, absent nodes stay black.
    fn set_color(&mut self, node: Option<NodeIndex<Ix>>, color: Color) {
        if let Some(n) = node {
            self.nodes[n.index()].color = color;
        }
    }
}
