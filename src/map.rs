use std::borrow::Borrow;

use crate::error::Result;

/// The operations every tree map in this crate supports.
///
/// Insertion either updates the value of an existing key in place or adds a
/// new key; nothing is ever removed.
pub trait OrderedMap<K: Ord, V> {
    /// Associate `value` with `key`, returning the value it replaced.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized;

    fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Every key, strictly ascending. Each call starts a fresh traversal.
    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a
    where
        K: 'a;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Longest root-to-leaf path, in nodes.
    fn height(&self) -> usize;

    /// Recompute the tree's invariants from scratch. Never fails on a map
    /// that was only changed through its public API.
    fn verify(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AvlTreeMap, BasicBstMap, RedBlackTreeMap};

    const DATA: [(&str, &str); 16] = [
        ("Minnesota", "Minneapolis"),
        ("Texas", "Dallas"),
        ("Oregon", "Seattle"),
        ("New Jersey", "Newark"),
        ("Pennsylvania", "Philadelphia"),
        ("Massachusetts", "Springfield"),
        ("Arizona", "Tuscon"),
        ("Michigan", "Ann Arbor"),
        ("Ohio", "Cincinatti"),
        ("New York", "Buffalo"),
        ("Florida", "Orlando"),
        ("Colorado", "Boulder"),
        ("Alabama", "Jackson"),
        ("Kentucky", "Louisville"),
        ("Kansas", "Wichita"),
        ("Alaska", "Vasilia"),
    ];

    const OTHER: [&str; 3] = ["Wisconsin", "Oklahoma", "Washington"];

    fn populate<M: OrderedMap<String, String>>(map: &mut M) {
        for (state, city) in DATA {
            assert_eq!(map.insert(state.to_string(), city.to_string()), None);
        }
        map.verify().unwrap();
    }

    fn expected_city(state: &str, replaced: bool) -> &'static str {
        if replaced && state == "Alaska" {
            return "Barrows";
        }
        DATA.iter()
            .find(|(s, _)| *s == state)
            .map(|(_, c)| *c)
            .unwrap()
    }

    fn check_iteration<M: OrderedMap<String, String>>(map: &M, replaced: bool) {
        let keys: Vec<&String> = map.keys().collect();
        let mut expected: Vec<&str> = DATA.iter().map(|(s, _)| *s).collect();
        expected.sort_unstable();
        assert_eq!(keys, expected);
        for key in keys {
            assert_eq!(
                map.get(key.as_str()).map(String::as_str),
                Some(expected_city(key, replaced))
            );
        }
    }

    macro_rules! conformance_suite {
        ($name:ident, $map:ty) => {
            mod $name {
                use super::*;

                fn fresh() -> $map {
                    <$map>::default()
                }

                #[test]
                fn empty_contains_key() {
                    let map = fresh();
                    for (state, _) in DATA {
                        assert!(!map.contains_key(state));
                    }
                    for state in OTHER {
                        assert!(!map.contains_key(state));
                    }
                    assert!(OrderedMap::is_empty(&map));
                }

                #[test]
                fn put_contains_key() {
                    let mut map = fresh();
                    populate(&mut map);
                    for (state, _) in DATA {
                        assert!(map.contains_key(state));
                    }
                    for state in OTHER {
                        assert!(!map.contains_key(state));
                    }
                    assert_eq!(OrderedMap::len(&map), DATA.len());
                }

                #[test]
                fn empty_get() {
                    let map = fresh();
                    for (state, _) in DATA {
                        assert_eq!(map.get(state), None);
                    }
                }

                #[test]
                fn put_get() {
                    let mut map = fresh();
                    populate(&mut map);
                    for (state, city) in DATA {
                        assert_eq!(map.get(state).map(String::as_str), Some(city));
                    }
                    for state in OTHER {
                        assert_eq!(map.get(state), None);
                    }
                }

                #[test]
                fn put_replace() {
                    let mut map = fresh();
                    populate(&mut map);
                    let old = map.insert("Alaska".to_string(), "Barrows".to_string());
                    assert_eq!(old.as_deref(), Some("Vasilia"));
                    assert!(map.contains_key("Alaska"));
                    for (state, _) in DATA {
                        assert_eq!(
                            map.get(state).map(String::as_str),
                            Some(expected_city(state, true))
                        );
                    }
                    assert_eq!(OrderedMap::len(&map), DATA.len());
                    map.verify().unwrap();
                }

                #[test]
                fn empty_iterator() {
                    let map = fresh();
                    assert_eq!(OrderedMap::keys(&map).count(), 0);
                }

                #[test]
                fn populated_iterator() {
                    let mut map = fresh();
                    populate(&mut map);
                    check_iteration(&map, false);
                }

                #[test]
                fn replaced_iterator() {
                    let mut map = fresh();
                    populate(&mut map);
                    map.insert("Alaska".to_string(), "Barrows".to_string());
                    check_iteration(&map, true);
                }

                #[test]
                fn replace_then_get_missing() {
                    let mut map: $map = <$map>::default();
                    map.insert("X".to_string(), "1".to_string());
                    map.insert("X".to_string(), "2".to_string());
                    assert_eq!(map.get("X").map(String::as_str), Some("2"));
                    assert!(!map.contains_key("Y"));
                    assert_eq!(OrderedMap::len(&map), 1);
                }
            }
        };
    }

    conformance_suite!(avl, AvlTreeMap<String, String>);
    conformance_suite!(red_black, RedBlackTreeMap<String, String>);
    conformance_suite!(basic, BasicBstMap<String, String>);
}
