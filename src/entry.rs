use crate::index::{IndexType, NodeIndex};
use crate::node::Node;
use crate::treemap::RbTreeMap;
use std::cmp::Ordering;

/// A view into a single entry in a map, which may either be vacant or occupied.
#[derive(Debug)]
pub enum Entry<'a, K, V, Ix>
where
    K: Ord,
{
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, Ix>),
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, Ix>),
}

/// A view into an occupied entry in a `RbTreeMap`.
/// It is part of the [`Entry`] enum.
#[derive(Debug)]
pub struct OccupiedEntry<'a, K, V, Ix>
where
    K: Ord,
{
    /// Reference to the map
    pub(crate) map_ref: &'a mut RbTreeMap<K, V, Ix>,
    /// The entry node
    pub(crate) node_idx: NodeIndex<Ix>,
}

/// A view into a vacant entry in a `RbTreeMap`.
/// It is part of the [`Entry`] enum.
#[derive(Debug)]
pub struct VacantEntry<'a, K, V, Ix>
where
    K: Ord,
{
    /// Mutable reference to the map
    pub(crate) map_ref: &'a mut RbTreeMap<K, V, Ix>,
    /// The key of this entry
    pub(crate) key: K,
    /// Node the new node will hang from, `None` for an empty map
    pub(crate) parent: Option<NodeIndex<Ix>>,
    /// Which child of `parent` the new node becomes
    pub(crate) side: Ordering,
}

impl<'a, K, V, Ix> Entry<'a, K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Ensures a value is in the entry by inserting the default if empty, and returns
    /// a mutable reference to the value in the entry.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::{Entry, RbTreeMap};
    ///
    /// let mut map = RbTreeMap::new();
    /// assert!(matches!(map.entry(1), Entry::Vacant(_)));
    /// map.entry(1).or_insert(3);
    /// assert!(matches!(map.entry(1), Entry::Occupied(_)));
    /// assert_eq!(map.get(&1), Some(&3));
    /// ```
    #[inline]
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Ensures a value is in the entry by inserting the result of `default` if empty.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::RbTreeMap;
    ///
    /// let mut map: RbTreeMap<&str, String> = RbTreeMap::new();
    /// map.entry("greeting").or_insert_with(|| "hello".to_owned());
    /// assert_eq!(map.get("greeting").map(String::as_str), Some("hello"));
    /// ```
    #[inline]
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Ensures a value is in the entry by inserting `V::default()` if empty.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::RbTreeMap;
    ///
    /// let mut counts: RbTreeMap<char, usize> = RbTreeMap::new();
    /// for c in "abracadabra".chars() {
    ///     *counts.entry(c).or_default() += 1;
    /// }
    /// assert_eq!(counts.get(&'a'), Some(&5));
    /// assert_eq!(counts.get(&'r'), Some(&2));
    /// ```
    #[inline]
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts into the map.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::{Entry, RbTreeMap};
    ///
    /// let mut map = RbTreeMap::new();
    ///
    /// map.put(6, 3);
    /// assert!(matches!(map.entry(6), Entry::Occupied(_)));
    /// map.entry(6).and_modify(|v| *v += 1);
    /// assert_eq!(map.get(&6), Some(&4));
    /// ```
    #[inline]
    #[must_use]
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Self::Occupied(entry)
            }
            Entry::Vacant(entry) => Self::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::RbTreeMap;
    ///
    /// let mut map: RbTreeMap<&str, i32> = RbTreeMap::new();
    /// assert_eq!(map.entry("poneyland").key(), &"poneyland");
    /// ```
    #[inline]
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, Ix> OccupiedEntry<'a, K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Gets a reference to the key in the entry.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::{Entry, RbTreeMap};
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put("k", 1);
    /// if let Entry::Occupied(entry) = map.entry("k") {
    ///     assert_eq!(entry.key(), &"k");
    /// }
    /// ```
    #[inline]
    pub fn key(&self) -> &K {
        self.map_ref.node_ref(self.node_idx, Node::key)
    }

    /// Gets a reference to the value in the entry.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::{Entry, RbTreeMap};
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put("k", 1);
    /// if let Entry::Occupied(entry) = map.entry("k") {
    ///     assert_eq!(entry.get(), &1);
    /// }
    /// ```
    #[inline]
    pub fn get(&self) -> &V {
        self.map_ref.node_ref(self.node_idx, Node::value)
    }

    /// Gets a mutable reference to the value in the entry.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::{Entry, RbTreeMap};
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put("k", 1);
    /// if let Entry::Occupied(mut entry) = map.entry("k") {
    ///     *entry.get_mut() += 10;
    ///     assert_eq!(entry.get(), &11);
    /// }
    /// assert_eq!(map.get("k"), Some(&11));
    /// ```
    #[inline]
    pub fn get_mut(&mut self) -> &mut V {
        self.map_ref.node_mut(self.node_idx, Node::value_mut)
    }

    /// Converts the entry into a mutable reference bound to the map's lifetime.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::{Entry, RbTreeMap};
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put("k", 1);
    /// if let Entry::Occupied(entry) = map.entry("k") {
    ///     *entry.into_mut() *= 5;
    /// }
    /// assert_eq!(map.get("k"), Some(&5));
    /// ```
    #[inline]
    pub fn into_mut(self) -> &'a mut V {
        self.map_ref.node_mut(self.node_idx, Node::value_mut)
    }

    /// Sets the value of the entry, returning the old value.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::{Entry, RbTreeMap};
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put("k", 1);
    /// if let Entry::Occupied(mut entry) = map.entry("k") {
    ///     assert_eq!(entry.insert(2), 1);
    /// }
    /// assert_eq!(map.get("k"), Some(&2));
    /// ```
    #[inline]
    pub fn insert(&mut self, value: V) -> V {
        self.map_ref.node_mut(self.node_idx, Node::replace_value(value))
    }

    /// Takes the value out of the map.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::{Entry, RbTreeMap};
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put("k", 1);
    /// if let Entry::Occupied(entry) = map.entry("k") {
    ///     assert_eq!(entry.remove(), 1);
    /// }
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Takes the key and value out of the map.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::{Entry, RbTreeMap};
    ///
    /// let mut map = RbTreeMap::new();
    /// map.put("k", 1);
    /// map.put("j", 2);
    /// if let Entry::Occupied(entry) = map.entry("k") {
    ///     assert_eq!(entry.remove_entry(), ("k", 1));
    /// }
    /// assert_eq!(map.len(), 1);
    /// assert!(!map.contains_key("k"));
    /// ```
    #[inline]
    pub fn remove_entry(self) -> (K, V) {
        self.map_ref.remove_at(self.node_idx)
    }
}

impl<'a, K, V, Ix> VacantEntry<'a, K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Gets a reference to the key that would be used when inserting.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::{Entry, RbTreeMap};
    ///
    /// let mut map: RbTreeMap<&str, i32> = RbTreeMap::new();
    /// if let Entry::Vacant(entry) = map.entry("k") {
    ///     assert_eq!(entry.key(), &"k");
    /// }
    /// ```
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    ///
    /// # Example
    /// ```rust
    /// use rb_tree_map::{Entry, RbTreeMap};
    ///
    /// let mut map: RbTreeMap<String, i32> = RbTreeMap::new();
    /// if let Entry::Vacant(entry) = map.entry("k".to_owned()) {
    ///     assert_eq!(entry.into_key(), "k");
    /// }
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value at the position found when the entry was created.
    ///
    /// # Panics
    ///
    /// This method panics when the tree is at the maximum number of nodes for its index
    #[inline]
    pub fn insert(self, value: V) -> &'a mut V {
        let node_idx = self.map_ref.insert_at(self.parent, self.side, self.key, value);
        self.map_ref.node_mut(node_idx, Node::value_mut)
    }
}
