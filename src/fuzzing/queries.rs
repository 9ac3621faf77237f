//! The range queries agree with a linear scan over all entries.

use itertools::Itertools;

use super::*;

/// Entries matching `f`, from the least to the most specific network.
fn by_specificity<K: Prefix, F: Fn(&K) -> bool>(
    trie: &PrefixTrie<K, i32>,
    f: F,
) -> Vec<(&K, &i32)> {
    select(trie, f)
        .into_iter()
        .sorted_by_key(|(p, _)| p.prefix_len())
        .collect_vec()
}

#[generic_tests::define]
mod t {
    use super::*;

    #[test]
    fn contains<K: TestKey>() {
        check(|(trie, net, noise): (PrefixTrie<K, i32>, K, u128)| {
            let host = K::from_addr(addr_in(&net, noise));
            let want = trie.keys().any(|p| p.contains(&host));
            trie.contains(addr_in(&net, noise)) == want
        })
    }

    #[test]
    fn containing_networks<K: TestKey>() {
        check(|(trie, net, noise): (PrefixTrie<K, i32>, K, u128)| {
            let addr = addr_in(&net, noise);
            let host = K::from_addr(addr);
            let want = by_specificity(&trie, |p| p.contains(&host));
            trie.containing_networks(addr).eq(want)
        })
    }

    #[test]
    fn covered_networks<K: TestKey>() {
        check(|(trie, query): (PrefixTrie<K, i32>, K)| {
            let want = select(&trie, |p| query.contains(p));
            trie.covered_networks(&query).eq(want)
        })
    }

    #[test]
    fn covering_networks<K: TestKey>() {
        check(|(trie, query): (PrefixTrie<K, i32>, K)| {
            let want = by_specificity(&trie, |p| p.contains(&query));
            trie.covering_networks(&query).eq(want)
        })
    }

    #[test]
    fn host_query_covered_by_containing<K: TestKey>() {
        check(|(trie, net, noise): (PrefixTrie<K, i32>, K, u128)| {
            // a network of full length is covered by the networks that contain its address.
            let addr = addr_in(&net, noise);
            trie.covering_networks(&K::from_addr(addr))
                .eq(trie.containing_networks(addr))
        })
    }

    #[test]
    fn insert_then_remove_restores<K: TestKey>() {
        check(|(trie, (key, value), query): (PrefixTrie<K, i32>, (K, i32), K)| {
            if trie.contains_key(&key) {
                return true;
            }
            let mut modified = trie.clone();
            modified.insert(key, value);
            modified.remove(&key);
            modified.is_well_formed()
                && modified == trie
                && modified
                    .covered_networks(&query)
                    .eq(trie.covered_networks(&query))
                && modified
                    .covering_networks(&query)
                    .eq(trie.covering_networks(&query))
        })
    }

    #[instantiate_tests(<Net4>)]
    mod net4 {}

    #[instantiate_tests(<Net6>)]
    mod net6 {}
}
