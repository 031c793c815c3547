use rb_tree_map::RbTreeMap;

const LETTERS: [&str; 12] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L"];

fn main() {
    let mut map = RbTreeMap::new();
    for (i, letter) in LETTERS.iter().enumerate() {
        map.put(*letter, i + 1);
    }
    assert_eq!(map.len(), 12);

    for letter in &LETTERS[3..] {
        let value = map.remove(*letter);
        println!("removed {letter} -> {value:?}, {} left", map.len());
        assert_eq!(map.get(*letter), None);
    }

    for (i, letter) in LETTERS[..3].iter().enumerate() {
        assert_eq!(map.get(*letter), Some(&(i + 1)));
    }
    assert_eq!(map.len(), 3);
}
