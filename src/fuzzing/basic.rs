//! The trie behaves like an ordered map, and its shape depends only on its content.

use std::collections::BTreeMap;

use super::*;

/// Apply `ops` to both the trie and a `BTreeMap`. Returns `None` as soon as they disagree or the
/// trie is malformed.
fn replay<K: TestKey>(ops: &[Op<K>]) -> Option<(PrefixTrie<K, i32>, BTreeMap<K, i32>)> {
    let mut trie = PrefixTrie::new();
    let mut model = BTreeMap::new();
    for op in ops {
        let agree = match *op {
            Op::Insert(k, v) => trie.insert(k, v) == model.insert(k, v),
            Op::Remove(k) => trie.remove(&k) == model.remove(&k),
        };
        if !agree || trie.len() != model.len() || !trie.is_well_formed() {
            return None;
        }
    }
    Some((trie, model))
}

#[generic_tests::define]
mod t {
    use super::*;

    #[test]
    fn ordered_like_btreemap<K: TestKey>() {
        check(|ops: Vec<Op<K>>| match replay(&ops) {
            Some((trie, model)) => trie.iter().eq(model.iter()) && trie.into_iter().eq(model),
            None => false,
        })
    }

    #[test]
    fn exact_lookups<K: TestKey>() {
        check(|(ops, query): (Vec<Op<K>>, K)| {
            let Some((mut trie, mut model)) = replay(&ops) else {
                return false;
            };
            trie.get(&query) == model.get(&query)
                && trie.contains_key(&query) == model.contains_key(&query)
                && trie.get_key_value(&query) == model.get_key_value(&query)
                && trie.get_mut(&query) == model.get_mut(&query)
        })
    }

    #[test]
    fn longest_prefix_match<K: TestKey>() {
        check(|(trie, query): (PrefixTrie<K, i32>, K)| {
            let want = trie
                .iter()
                .filter(|(p, _)| p.contains(&query))
                .max_by_key(|(p, _)| p.prefix_len());
            trie.get_lpm(&query) == want
        })
    }

    #[test]
    fn shape_independent_of_history<K: TestKey>() {
        check(|ops: Vec<Op<K>>| {
            let Some((trie, model)) = replay(&ops) else {
                return false;
            };
            // built from the remaining entries alone, the trie prints the same tree.
            let fresh: PrefixTrie<K, i32> = model.into_iter().collect();
            trie == fresh && format!("{trie:?}") == format!("{fresh:?}")
        })
    }

    #[test]
    fn remove_everything<K: TestKey>() {
        check(|(mut trie, start): (PrefixTrie<K, i32>, usize)| {
            let mut keys: Vec<K> = trie.keys().copied().collect();
            if !keys.is_empty() {
                let n = keys.len();
                keys.rotate_left(start % n);
            }
            for k in keys {
                if trie.remove(&k).is_none() || !trie.is_well_formed() {
                    return false;
                }
            }
            trie.is_empty() && trie.iter().next().is_none() && trie == PrefixTrie::new()
        })
    }

    #[instantiate_tests(<Net4>)]
    mod net4 {}

    #[instantiate_tests(<Net6>)]
    mod net6 {}
}
