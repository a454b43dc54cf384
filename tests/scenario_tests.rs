//! End-to-end scenarios across the four containers

use std::collections::BTreeMap;

use seqmap::containers::flat_map;
use seqmap::{FlatMap, FlatMultimap, FlatMultiset, FlatSet, NodeHandle};

fn map_of(pairs: &[(i32, i32)]) -> FlatMap<i32, i32> {
    pairs.iter().copied().collect()
}

fn pairs_of(map: &FlatMap<i32, i32>) -> Vec<(i32, i32)> {
    map.iter().map(|(k, v)| (*k, *v)).collect()
}

#[test]
fn duplicate_insert_leaves_map_unchanged() {
    let mut map = map_of(&[(0, 1), (2, 3), (4, 5), (6, 7)]);

    let (pos, inserted) = map.insert(2, 5).unwrap();
    assert_eq!((pos, inserted), (1, false));
    assert_eq!(map.len(), 4);
    assert_eq!(map.get(&2), Some(&3));
}

#[test]
fn defaulting_access_inserts_at_sorted_position() {
    let mut map = map_of(&[(0, 1), (2, 3), (4, 5), (6, 7)]);

    let value = map.get_or_default(3).unwrap();
    assert_eq!(*value, 0);
    assert_eq!(map.len(), 5);
    assert_eq!(map.find(&3), Some(2));
    assert_eq!(
        pairs_of(&map),
        vec![(0, 1), (2, 3), (3, 0), (4, 5), (6, 7)]
    );
}

#[test]
fn conditional_erase_compacts_in_order() {
    let mut map = map_of(&[(0, 1), (2, 3), (4, 5), (6, 7)]);

    let removed = flat_map::erase_if(&mut map, |(k, _)| *k < 4);
    assert_eq!(removed, 2);
    assert_eq!(pairs_of(&map), vec![(4, 5), (6, 7)]);
}

#[test]
fn node_extraction_and_reinsertion() {
    let mut map = map_of(&[(0, 1), (2, 3), (4, 5), (6, 7)]);

    let node = map.extract(&2);
    assert_eq!(node.as_ref(), Some(&(2, 3)));
    assert_eq!(map.len(), 3);
    assert!(!map.contains_key(&2));

    let absent = map.extract(&5);
    assert!(absent.is_empty());
    assert_eq!(map.len(), 3);

    let (pos, inserted, spent) = map.insert_node(node).unwrap();
    assert_eq!((pos, inserted), (1, true));
    assert!(spent.is_empty());
    assert_eq!(map.len(), 4);
}

#[test]
fn rejected_node_keeps_its_element() {
    let mut map = map_of(&[(0, 1), (2, 3)]);

    let (pos, inserted, node) = map.insert_node(NodeHandle::new((2, 99))).unwrap();
    assert_eq!((pos, inserted), (1, false));
    assert_eq!(node.into_inner(), Some((2, 99)));
    assert_eq!(map.get(&2), Some(&3));
}

#[test]
fn merging_multimap_into_map_keeps_first_of_each_run() {
    let mut map = map_of(&[(0, 1), (4, 5)]);
    let mut source: FlatMultimap<i32, i32> =
        [(2, 10), (2, 20), (4, 40)].into_iter().collect();

    map.merge_multimap(&mut source).unwrap();

    // first pair of the key-2 run moved, the second stayed; key 4 was
    // already present so its pair stayed too
    assert_eq!(pairs_of(&map), vec![(0, 1), (2, 10), (4, 5)]);
    let left: Vec<(i32, i32)> = source.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(left, vec![(2, 20), (4, 40)]);
}

#[test]
fn merging_between_flat_maps_moves_only_new_keys() {
    let mut dest = map_of(&[(1, 1), (3, 3)]);
    let mut source = map_of(&[(2, 2), (3, 33), (4, 4)]);

    dest.merge(&mut source).unwrap();

    assert_eq!(pairs_of(&dest), vec![(1, 1), (2, 2), (3, 3), (4, 4)]);
    assert_eq!(pairs_of(&source), vec![(3, 33)]);
}

#[test]
fn merge_interoperates_with_std_btreemap() {
    let mut map = map_of(&[(1, 1)]);
    let mut source = BTreeMap::from([(1, 10), (2, 20)]);

    map.merge_btree(&mut source).unwrap();

    assert_eq!(pairs_of(&map), vec![(1, 1), (2, 20)]);
    assert_eq!(source, BTreeMap::from([(1, 10)]));
}

#[test]
fn hinted_insert_matches_plain_insert() {
    let pairs = [(5, 0), (1, 0), (9, 0), (3, 0), (7, 0)];

    let mut plain: FlatMap<i32, i32> = FlatMap::new();
    for (k, v) in pairs {
        plain.insert(k, v).unwrap();
    }

    // deliberately useless hints
    let mut hinted: FlatMap<i32, i32> = FlatMap::new();
    for (i, (k, v)) in pairs.into_iter().enumerate() {
        hinted.insert_hint(i % 2, k, v).unwrap();
    }

    assert_eq!(plain, hinted);
}

#[test]
fn sequential_hints_build_sorted_maps() {
    let mut map: FlatMap<i32, i32> = FlatMap::new();
    for k in 0..100 {
        // for ascending keys the current length is always the right slot
        let (pos, inserted) = map.insert_hint(map.len(), k, k * 2).unwrap();
        assert!(inserted);
        assert_eq!(pos, k as usize);
    }
    assert_eq!(map.len(), 100);
    assert!(map.keys().copied().eq(0..100));
}

#[test]
fn multimap_runs_preserve_insertion_order() {
    let mut mm: FlatMultimap<i32, &str> = FlatMultimap::new();
    mm.insert(1, "a").unwrap();
    mm.insert(2, "x").unwrap();
    mm.insert(1, "b").unwrap();
    mm.insert(1, "c").unwrap();

    let ones: Vec<&str> = mm.get_all(&1).map(|(_, v)| *v).collect();
    assert_eq!(ones, vec!["a", "b", "c"]);
    assert_eq!(mm.remove_all(&1), 3);
    assert_eq!(mm.len(), 1);
}

#[test]
fn set_and_multiset_share_semantics_with_maps() {
    let mut set: FlatSet<i32> = [4, 2, 2, 0].into_iter().collect();
    assert_eq!(set.len(), 3); // unique: second 2 dropped

    let mut multi: FlatMultiset<i32> = [4, 2, 2, 0].into_iter().collect();
    assert_eq!(multi.len(), 4);
    assert_eq!(multi.count(&2), 2);

    multi.merge_set(&mut set).unwrap();
    assert!(set.is_empty());
    assert_eq!(multi.count(&2), 3);
}

#[test]
fn columns_can_round_trip_through_user_code() {
    let mut map = map_of(&[(1, 10), (2, 20), (3, 30)]);

    let (mut keys, mut values) = map.extract_columns();
    assert!(map.is_empty());
    assert_eq!(keys, vec![1, 2, 3]);

    // user-side columnar edit that keeps both invariants intact
    keys.push(4);
    values.push(40);
    map.replace_columns(keys, values).unwrap();

    assert_eq!(map.len(), 4);
    assert_eq!(map.get(&4), Some(&40));
}

#[test]
fn vecdeque_backed_map_behaves_like_vec_backed() {
    use std::collections::VecDeque;

    let mut map: FlatMap<i32, i32, seqmap::NaturalOrder, VecDeque<i32>, Vec<i32>> =
        FlatMap::with_comparator(seqmap::NaturalOrder);
    for (k, v) in [(3, 30), (1, 10), (2, 20)] {
        map.insert(k, v).unwrap();
    }
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(map.get(&2), Some(&20));
    assert_eq!(map.remove(&1), Some(10));
    assert_eq!(map.len(), 2);
}
