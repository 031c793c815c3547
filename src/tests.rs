use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;

use crate::index::{IndexType, NodeIndex};
use crate::node::{Color, Node};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use super::*;

struct KeyGenerator {
    rng: StdRng,
    unique: HashSet<i32>,
    limit: i32,
}

impl KeyGenerator {
    fn new(seed: [u8; 32]) -> Self {
        const LIMIT: i32 = 100_000;
        Self {
            rng: SeedableRng::from_seed(seed),
            unique: HashSet::new(),
            limit: LIMIT,
        }
    }

    fn next(&mut self) -> i32 {
        self.rng.gen_range(0..self.limit)
    }

    fn next_unique(&mut self) -> i32 {
        let mut key = self.next();
        while self.unique.contains(&key) {
            key = self.next();
        }
        self.unique.insert(key);
        key
    }
}

impl<K, V, Ix> RbTreeMap<K, V, Ix>
where
    K: Ord + Display,
    Ix: IndexType,
{
    /// 1. Every node is either red or black.
    /// 2. The root is black.
    /// 3. Every leaf (NIL) is black.
    /// 4. If a node is red, then both its children are black.
    /// 5. For each node, all simple paths from the node to descendant leaves contain the
    /// same number of black nodes.
    fn check_rb_properties(&self) {
        assert_eq!(self.color(self.root), Color::Black);
        if let Some(root) = self.root {
            assert_eq!(self.node_ref(root, Node::parent), None);
        }
        self.check_children_color(self.root);
        let _ignore = self.check_black_height(self.root);
        self.check_links(self.root);
        self.check_order();
        self.check_height_bound();
        assert_eq!(self.keys().len(), self.len());
    }

    fn check_children_color(&self, x: Option<NodeIndex<Ix>>) {
        let Some(x) = x else {
            return;
        };
        self.check_children_color(self.node_ref(x, Node::left));
        self.check_children_color(self.node_ref(x, Node::right));
        if self.node_ref(x, Node::is_red) {
            assert_eq!(self.color(self.node_ref(x, Node::left)), Color::Black);
            assert_eq!(self.color(self.node_ref(x, Node::right)), Color::Black);
        }
    }

    fn check_black_height(&self, x: Option<NodeIndex<Ix>>) -> usize {
        let Some(x) = x else {
            return 0;
        };
        let lefth = self.check_black_height(self.node_ref(x, Node::left));
        let righth = self.check_black_height(self.node_ref(x, Node::right));
        assert_eq!(lefth, righth);
        if self.node_ref(x, Node::is_red) {
            return lefth;
        }
        lefth + 1
    }

    /// Every child points back at its parent.
    fn check_links(&self, x: Option<NodeIndex<Ix>>) {
        let Some(x) = x else {
            return;
        };
        for child in [self.node_ref(x, Node::left), self.node_ref(x, Node::right)] {
            if let Some(c) = child {
                assert_eq!(self.node_ref(c, Node::parent), Some(x));
                self.check_links(child);
            }
        }
    }

    fn check_order(&self) {
        let keys = self.keys();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    fn check_height_bound(&self) {
        let bound = 2.0 * ((self.len() + 1) as f64).log2();
        assert!(self.height(self.root) as f64 <= bound);
    }

    fn height(&self, x: Option<NodeIndex<Ix>>) -> usize {
        x.map_or(0, |x| {
            let l = self.height(self.node_ref(x, Node::left));
            let r = self.height(self.node_ref(x, Node::right));
            l.max(r) + 1
        })
    }

    /// Keys in order
    fn keys(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut stack = vec![];
        let mut x = self.root;
        loop {
            while let Some(xi) = x {
                stack.push(xi);
                x = self.node_ref(xi, Node::left);
            }
            let Some(xi) = stack.pop() else {
                break;
            };
            keys.push(self.node_ref(xi, Node::key));
            x = self.node_ref(xi, Node::right);
        }
        keys
    }

    /// Render the tree as `(left key+color right)`, `.` for an absent child.
    fn shape(&self) -> String {
        self.shape_inner(self.root)
    }

    fn shape_inner(&self, x: Option<NodeIndex<Ix>>) -> String {
        let Some(x) = x else {
            return ".".to_owned();
        };
        let color = if self.node_ref(x, Node::is_red) { 'R' } else { 'B' };
        let (left, right) = (self.node_ref(x, Node::left), self.node_ref(x, Node::right));
        let key = self.node_ref(x, Node::key);
        if left.is_none() && right.is_none() {
            return format!("{key}{color}");
        }
        format!(
            "({} {key}{color} {})",
            self.shape_inner(left),
            self.shape_inner(right)
        )
    }
}

fn with_map_and_generator<V>(test_fn: impl Fn(RbTreeMap<i32, V>, KeyGenerator)) {
    let seeds = vec![[0; 32], [1; 32], [2; 32]];
    for seed in seeds {
        let gen = KeyGenerator::new(seed);
        let map = RbTreeMap::new();
        test_fn(map, gen);
    }
}

const LETTERS: [&str; 12] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L"];

#[test]
fn red_black_tree_properties_is_satisfied() {
    with_map_and_generator(|mut map, mut gen| {
        let keys: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for k in keys {
            let _ignore = map.put(k, ());
        }
        map.check_rb_properties();
    });
}

#[test]
fn map_len_will_update() {
    with_map_and_generator(|mut map, mut gen| {
        let keys: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(100)
            .collect();
        for k in keys.clone() {
            let _ignore = map.put(k, ());
        }
        assert_eq!(map.len(), 100);
        for k in keys {
            let _ignore = map.remove(&k);
        }
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
    });
}

#[test]
fn every_operation_keeps_invariants_and_matches_btree_map() {
    with_map_and_generator(|mut map, mut gen| {
        let mut model = BTreeMap::new();
        for step in 0..2000 {
            let key = gen.next() % 500;
            if gen.rng.gen_bool(0.6) {
                assert_eq!(map.put(key, step), model.insert(key, step));
            } else {
                assert_eq!(map.remove(&key), model.remove(&key));
            }
            map.check_rb_properties();
            assert_eq!(map.len(), model.len());
        }
        for (k, v) in &model {
            assert_eq!(map.get(k), Some(v));
        }
        let keys: Vec<_> = map.keys().into_iter().copied().collect();
        let expect: Vec<_> = model.keys().copied().collect();
        assert_eq!(keys, expect);
    });
}

#[test]
fn remove_keeps_other_values() {
    with_map_and_generator(|mut map, mut gen| {
        let mut keys: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(500)
            .collect();
        for k in keys.clone() {
            let _ignore = map.put(k, k * 2);
        }
        keys.shuffle(&mut gen.rng);
        let (removed, kept) = keys.split_at(300);
        for k in removed {
            assert_eq!(map.remove(k), Some(k * 2));
            assert_eq!(map.get(k), None);
            map.check_rb_properties();
        }
        for k in kept {
            assert_eq!(map.get(k), Some(&(k * 2)));
        }
        assert_eq!(map.len(), 200);
        assert_eq!(map.nodes.len(), 200);
    });
}

#[test]
fn remove_non_exist_key_will_do_nothing() {
    with_map_and_generator(|mut map, mut gen| {
        let keys: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for k in keys {
            let _ignore = map.put(k, ());
        }
        let before = map.shape();
        let to_remove: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for k in to_remove {
            assert_eq!(map.remove(&k), None);
        }
        assert_eq!(map.len(), 1000);
        assert_eq!(map.shape(), before);
    });
}

#[test]
fn put_existing_key_overwrites_in_place() {
    let mut map = RbTreeMap::new();
    for (i, k) in LETTERS.iter().enumerate() {
        assert_eq!(map.put(*k, i), None);
    }
    let before = map.shape();
    assert_eq!(map.put("F", 100), Some(5));
    assert_eq!(map.put("F", 200), Some(100));
    assert_eq!(map.get("F"), Some(&200));
    assert_eq!(map.len(), 12);
    assert_eq!(map.shape(), before);
}

#[test]
fn letters_removed_in_order_keep_invariants() {
    let mut map = RbTreeMap::new();
    for (i, k) in LETTERS.iter().enumerate() {
        map.put(*k, i + 1);
        map.check_rb_properties();
    }
    assert_eq!(map.shape(), "((AB BB CB) DB ((EB FR GB) HB (IB JR (. KB LR))))");

    let expected_shapes = [
        ("D", "((AB BB CB) EB ((. FB GR) HB (IB JR (. KB LR))))"),
        ("E", "((AB BB CB) FB (GB HB (IB JR (. KB LR))))"),
        ("F", "((AB BB CB) GB ((. HB IR) JB (. KB LR)))"),
        ("G", "((AB BB CB) HB (IB JB (. KB LR)))"),
        ("H", "((AB BB CB) IB (JB KB LB))"),
        ("I", "((AB BR CB) JB (. KB LR))"),
        ("J", "((AB BR CB) KB LB)"),
        ("K", "(AB BB (CR LB .))"),
        ("L", "(AB BB CB)"),
    ];
    for (step, (key, shape)) in expected_shapes.iter().enumerate() {
        let value = LETTERS.iter().position(|k| k == key).map(|i| i + 1);
        assert_eq!(map.remove(*key), value);
        assert_eq!(map.get(*key), None);
        assert_eq!(map.shape(), *shape, "#{}: removing {}", step, key);
        map.check_rb_properties();
        for (i, k) in LETTERS.iter().enumerate() {
            if i < 3 || i > step + 3 {
                assert_eq!(map.get(*k), Some(&(i + 1)));
            }
        }
    }
    assert_eq!(map.keys(), vec![&"A", &"B", &"C"]);
    assert_eq!(map.len(), 3);
}

#[test]
fn remove_only_key_empties_the_tree() {
    let mut map = RbTreeMap::new();
    map.put(42, "answer");
    assert_eq!(map.remove(&42), Some("answer"));
    assert_eq!(map.root, None);
    assert!(map.nodes.is_empty());
    assert!(map.is_empty());
    assert_eq!(map.get(&42), None);
    assert_eq!(map.remove(&42), None);
}

#[test]
fn descending_inserts_stay_balanced() {
    let mut map = RbTreeMap::new();
    for k in (1..=10).rev() {
        map.put(k, k);
        map.check_rb_properties();
    }
    assert_eq!(map.shape(), "((((1R 2B .) 3R 4B) 5B 6B) 7B (8B 9B 10B))");

    let mut map = RbTreeMap::new();
    for k in (0..4096).rev() {
        map.put(k, ());
    }
    map.check_rb_properties();
    assert!(map.height(map.root) <= 24);
}

#[test]
fn ascending_inserts_stay_balanced() {
    let mut map = RbTreeMap::new();
    for k in 0..4096 {
        map.put(k, ());
    }
    map.check_rb_properties();
    for k in (0..4096).step_by(2) {
        map.remove(&k);
    }
    map.check_rb_properties();
    assert_eq!(map.len(), 2048);
}

#[test]
fn rotations_preserve_order() {
    let mut map = RbTreeMap::new();
    map.put(2, ());
    map.put(1, ());
    map.put(3, ());
    assert_eq!(map.shape(), "(1R 2B 3R)");

    let Some(root) = map.root else {
        panic!("tree should not be empty");
    };
    map.left_rotate(root);
    assert_eq!(map.shape(), "((1R 2B .) 3R .)");
    assert_eq!(map.node_ref(root, Node::parent), map.root);
    map.check_links(map.root);
    map.check_order();

    let Some(root) = map.root else {
        panic!("tree should not be empty");
    };
    map.right_rotate(root);
    assert_eq!(map.shape(), "(1R 2B 3R)");
    map.check_links(map.root);
    map.check_order();

    // rotating towards an absent child does nothing
    let Some(leaf) = map.search(&1) else {
        panic!("key 1 should be present");
    };
    map.left_rotate(leaf);
    map.right_rotate(leaf);
    assert_eq!(map.shape(), "(1R 2B 3R)");
}

#[test]
fn entry_inserts_at_remembered_slot() {
    let mut map = RbTreeMap::new();
    for k in (0..200).map(|k| (k * 37) % 200) {
        *map.entry(k).or_insert(0) += 1;
        map.check_rb_properties();
    }
    for k in 0..200 {
        *map.entry(k).or_default() += 1;
    }
    assert!((0..200).all(|k| map.get(&k) == Some(&2)));

    match map.entry(7) {
        Entry::Occupied(mut entry) => {
            assert_eq!(entry.key(), &7);
            assert_eq!(entry.insert(10), 2);
            assert_eq!(entry.remove_entry(), (7, 10));
        }
        Entry::Vacant(_) => panic!("key 7 should be occupied"),
    }
    map.check_rb_properties();
    match map.entry(7) {
        Entry::Vacant(entry) => assert_eq!(entry.into_key(), 7),
        Entry::Occupied(_) => panic!("key 7 should be vacant"),
    }
    assert_eq!(map.len(), 199);
}

#[test]
fn lookups_accept_borrowed_keys() {
    let mut map: RbTreeMap<String, usize> = ["pear", "apple", "fig"]
        .into_iter()
        .map(|s| (s.to_owned(), s.len()))
        .collect();
    assert!(map.contains_key("fig"));
    assert!(!map.contains_key("kiwi"));
    if let Some(v) = map.get_mut("apple") {
        *v *= 10;
    }
    assert_eq!(map.get("apple"), Some(&50));
    assert_eq!(map.remove_entry("pear"), Some(("pear".to_owned(), 4)));
    map.check_rb_properties();
}

#[test]
fn extend_keeps_last_value() {
    let mut map = RbTreeMap::new();
    map.extend([(1, 'a'), (2, 'b'), (1, 'c')]);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&1), Some(&'c'));
}

#[test]
fn small_index_reuses_removed_slots() {
    let mut map = RbTreeMap::<i32, i32, u8>::with_capacity(255);
    for k in 0..255 {
        map.put(k, k);
    }
    for k in 0..10 {
        map.remove(&k);
    }
    for k in 300..310 {
        map.put(k, k);
    }
    assert_eq!(map.len(), 255);
    map.check_rb_properties();
}

#[test]
#[should_panic(expected = "Reached maximum number of nodes")]
fn small_index_overflow_should_panic() {
    let mut map = RbTreeMap::<i32, (), u8>::with_capacity(0);
    for k in 0..256 {
        map.put(k, ());
    }
}

#[test]
fn rb_tree_map_clear_is_ok() {
    let mut map = RbTreeMap::new();
    map.put(1, 1);
    map.put(2, 2);
    map.put(6, 3);
    assert_eq!(map.len(), 3);
    map.clear();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
    assert!(map.nodes.is_empty());
    assert_eq!(map.get(&1), None);
    map.put(5, 5);
    map.check_rb_properties();
}

#[test]
fn map_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RbTreeMap<String, Vec<u8>>>();
}

#[cfg(feature = "graphviz")]
#[test]
fn rb_tree_map_draw_is_ok() {
    let mut map = RbTreeMap::new();
    for (i, k) in LETTERS.iter().enumerate() {
        map.put(*k, i);
    }
    let path = std::env::temp_dir().join("rb_tree_map_draw_is_ok.dot");
    map.draw(&path).unwrap();
    let dot = std::fs::read_to_string(&path).unwrap();
    assert!(dot.starts_with("digraph {"));
    assert!(dot.contains("label=\"\\\"D\\\": 3\", fillcolor=black"));
    assert_eq!(dot.matches("fillcolor=red").count(), 3);

    map.draw_without_value(&path).unwrap();
    let dot = std::fs::read_to_string(&path).unwrap();
    assert!(dot.contains("label=\"\\\"F\\\"\", fillcolor=red"));
    let _ = std::fs::remove_file(&path);
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_rb_tree_map() {
    use serde_json::{json, Value};

    let mut map = RbTreeMap::<i32, i32>::new();
    map.put(1, 10);
    map.put(3, 20);
    map.put(2, 15);

    let serialized = serde_json::to_string(&map).unwrap();
    let expected = json!({
        "nodes": [
            {
                "left": null,
                "right": null,
                "parent": 2,
                "color": "Red",
                "key": 1,
                "value": 10
            },
            {
                "left": null,
                "right": null,
                "parent": 2,
                "color": "Red",
                "key": 3,
                "value": 20
            },
            {
                "left": 0,
                "right": 1,
                "parent": null,
                "color": "Black",
                "key": 2,
                "value": 15
            }
        ],
        "root": 2
    });
    let actual: Value = serde_json::from_str(&serialized).unwrap();
    assert_eq!(expected, actual);

    // the last node moves into the freed slot
    map.remove(&1);
    let expected = json!({
        "nodes": [
            {
                "left": null,
                "right": 1,
                "parent": null,
                "color": "Black",
                "key": 2,
                "value": 15
            },
            {
                "left": null,
                "right": null,
                "parent": 0,
                "color": "Red",
                "key": 3,
                "value": 20
            }
        ],
        "root": 0
    });
    let actual: Value = serde_json::to_value(&map).unwrap();
    assert_eq!(expected, actual);

    let deserialized: RbTreeMap<i32, i32> = serde_json::from_value(actual).unwrap();
    deserialized.check_rb_properties();
    assert_eq!(deserialized.get(&2), Some(&15));
    assert_eq!(deserialized.get(&3), Some(&20));
    assert_eq!(deserialized.get(&1), None);
}

#[cfg(feature = "serde")]
fn serde_node(
    left: Option<usize>,
    right: Option<usize>,
    parent: Option<usize>,
    color: &str,
    key: i32,
) -> serde_json::Value {
    serde_json::json!({
        "left": left,
        "right": right,
        "parent": parent,
        "color": color,
        "key": key,
        "value": key * 10
    })
}

#[cfg(feature = "serde")]
fn deserialize_err(nodes: Vec<serde_json::Value>, root: Option<usize>) -> String {
    let value = serde_json::json!({ "nodes": nodes, "root": root });
    serde_json::from_value::<RbTreeMap<i32, i32>>(value)
        .unwrap_err()
        .to_string()
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_rejects_dangling_root() {
    let err = serde_json::from_str::<RbTreeMap<i32, i32>>(r#"{"nodes":[],"root":5}"#).unwrap_err();
    assert!(err.to_string().contains("root 5 is out of bounds"), "{err}");

    let err = deserialize_err(vec![serde_node(None, None, None, "Black", 1)], None);
    assert!(err.contains("1 nodes are not reachable"), "{err}");

    let map: RbTreeMap<i32, i32> = serde_json::from_str(r#"{"nodes":[],"root":null}"#).unwrap();
    assert!(map.is_empty());
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_rejects_red_root() {
    let err = serde_json::from_str::<RbTreeMap<i32, i32>>(
        r#"{"nodes":[{"left":null,"right":null,"parent":null,"color":"Red","key":1,"value":1}],"root":0}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("root is red"), "{err}");

    let err = deserialize_err(vec![serde_node(None, None, Some(0), "Black", 1)], Some(0));
    assert!(err.contains("root has a parent"), "{err}");
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_rejects_broken_links() {
    let err = deserialize_err(
        vec![
            serde_node(Some(7), None, Some(2), "Red", 1),
            serde_node(None, None, Some(2), "Red", 3),
            serde_node(Some(0), Some(1), None, "Black", 2),
        ],
        Some(2),
    );
    assert!(err.contains("node 0 links out of bounds"), "{err}");

    let err = deserialize_err(
        vec![
            serde_node(None, None, None, "Red", 1),
            serde_node(None, None, Some(2), "Red", 3),
            serde_node(Some(0), Some(1), None, "Black", 2),
        ],
        Some(2),
    );
    assert!(err.contains("node 0 does not point back at its parent"), "{err}");

    let err = deserialize_err(
        vec![
            serde_node(None, None, Some(2), "Red", 1),
            serde_node(None, None, None, "Red", 3),
            serde_node(Some(0), Some(0), None, "Black", 2),
        ],
        Some(2),
    );
    assert!(err.contains("node 0 is reachable more than once"), "{err}");

    let err = deserialize_err(
        vec![
            serde_node(None, None, Some(2), "Red", 1),
            serde_node(None, None, Some(2), "Red", 3),
            serde_node(Some(0), Some(1), None, "Black", 2),
            serde_node(None, None, None, "Black", 9),
        ],
        Some(2),
    );
    assert!(err.contains("1 nodes are not reachable"), "{err}");
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_rejects_broken_balance() {
    let err = deserialize_err(
        vec![
            serde_node(None, None, Some(2), "Red", 3),
            serde_node(None, None, Some(2), "Red", 1),
            serde_node(Some(0), Some(1), None, "Black", 2),
        ],
        Some(2),
    );
    assert!(err.contains("out of key order"), "{err}");

    let err = deserialize_err(
        vec![
            serde_node(None, None, Some(2), "Black", 1),
            serde_node(None, None, Some(2), "Red", 3),
            serde_node(Some(0), Some(1), None, "Black", 2),
        ],
        Some(2),
    );
    assert!(err.contains("differ in black height"), "{err}");

    let err = deserialize_err(
        vec![
            serde_node(Some(3), None, Some(2), "Red", 1),
            serde_node(None, None, Some(2), "Red", 3),
            serde_node(Some(0), Some(1), None, "Black", 2),
            serde_node(None, None, Some(0), "Red", 0),
        ],
        Some(2),
    );
    assert!(err.contains("red node 3 has a red parent"), "{err}");
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_deserialized_map_stays_balanced() {
    let mut map = RbTreeMap::<i32, i32>::new();
    for k in 0..64 {
        map.put(k, k * 10);
    }
    for k in (0..64).step_by(3) {
        map.remove(&k);
    }
    let value = serde_json::to_value(&map).unwrap();
    let mut restored: RbTreeMap<i32, i32> = serde_json::from_value(value).unwrap();
    restored.check_rb_properties();
    for k in 64..96 {
        restored.put(k, k * 10);
        restored.remove(&(k - 60));
    }
    restored.check_rb_properties();
    assert_eq!(restored.get(&95), Some(&950));
    assert_eq!(restored.get(&4), None);
}
