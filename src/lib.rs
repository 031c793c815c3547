//! `rb_tree_map` is an ordered key-value map based on a red-black tree.
//!
//! It fully implements the insertion and deletion functionality of a red-black tree,
//! ensuring that every lookup, insertion and removal takes O(logN) time in the worst
//! case, whatever the order the keys arrive in.
//!
//! Nodes live in an arena and refer to each other by index instead of by pointer.
//! Absent children and the parent of the root are plain `None` links whose color is
//! black by definition, so no shared leaf node is ever mutated. This keeps the map
//! free of `unsafe` aliasing and lets it be `Send` and `Sync` whenever its keys and
//! values are.
//!
//! The map holds at most one value per key: putting an existing key replaces its
//! value in place.
//!
//! # Example
//!
//! ```rust
//! use rb_tree_map::RbTreeMap;
//!
//! let mut map = RbTreeMap::new();
//! map.put("b", 2);
//! map.put("a", 1);
//! assert_eq!(map.get("a"), Some(&1));
//! assert_eq!(map.remove("b"), Some(2));
//! assert_eq!(map.get("b"), None);
//! ```

#[cfg(feature = "serde")]
mod de;
mod entry;
#[cfg(feature = "graphviz")]
mod graphviz;
mod index;
mod node;
mod treemap;

#[cfg(test)]
mod tests;

pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use index::{DefaultIx, IndexType, NodeIndex};
pub use treemap::RbTreeMap;
