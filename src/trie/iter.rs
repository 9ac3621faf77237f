//! Iterators over the entries of a [`PrefixTrie`].

use crate::*;

use super::{Direction, Node};

/// Pre-order walk over the subtrees below a set of nodes, left (bit `0`) before right.
#[derive(Clone)]
struct Walk {
    pending: Vec<usize>,
}

impl Walk {
    fn new(start: Option<usize>) -> Self {
        Self {
            pending: start.into_iter().collect(),
        }
    }

    /// Index of the next node that carries a value.
    fn next_entry<P, T>(&mut self, table: &[Node<P, T>]) -> Option<usize> {
        while let Some(idx) = self.pending.pop() {
            let node = &table[idx];
            self.pending.extend(node.right);
            self.pending.extend(node.left);
            if node.value.is_some() {
                return Some(idx);
            }
        }
        None
    }
}

/// Entries of a [`PrefixTrie`] in lexicographic order: every network is followed by the networks
/// it covers. Returned by [`PrefixTrie::iter`] and [`PrefixTrie::covered_networks`].
#[derive(Clone)]
pub struct Iter<'a, P, T> {
    map: &'a PrefixTrie<P, T>,
    walk: Walk,
}

impl<'a, P, T> Iter<'a, P, T> {
    /// Iterate over the subtree rooted at `start`, or over nothing.
    pub(super) fn below(map: &'a PrefixTrie<P, T>, start: Option<usize>) -> Self {
        Self {
            map,
            walk: Walk::new(start),
        }
    }
}

impl<'a, P, T> Iterator for Iter<'a, P, T> {
    type Item = (&'a P, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let map = self.map;
        let idx = self.walk.next_entry(&map.table)?;
        map.table[idx].prefix_value()
    }
}

/// Networks of a [`PrefixTrie`] in lexicographic order.
#[derive(Clone)]
pub struct Keys<'a, P, T>(Iter<'a, P, T>);

impl<'a, P, T> Iterator for Keys<'a, P, T> {
    type Item = &'a P;

    fn next(&mut self) -> Option<&'a P> {
        self.0.next().map(|(p, _)| p)
    }
}

/// Values of a [`PrefixTrie`], in lexicographic order of their networks.
#[derive(Clone)]
pub struct Values<'a, P, T>(Iter<'a, P, T>);

impl<'a, P, T> Iterator for Values<'a, P, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.0.next().map(|(_, v)| v)
    }
}

/// Owned entries of a [`PrefixTrie`] in lexicographic order.
#[derive(Clone)]
pub struct IntoIter<P, T> {
    map: PrefixTrie<P, T>,
    walk: Walk,
}

impl<P: Prefix, T> Iterator for IntoIter<P, T> {
    type Item = (P, T);

    fn next(&mut self) -> Option<(P, T)> {
        let idx = self.walk.next_entry(&self.map.table)?;
        let node = &mut self.map.table[idx];
        // every node is visited once, so its prefix can be taken.
        let prefix = std::mem::replace(&mut node.prefix, P::zero());
        node.value.take().map(|v| (prefix, v))
    }
}

impl<P: Prefix, T> IntoIterator for PrefixTrie<P, T> {
    type Item = (P, T);
    type IntoIter = IntoIter<P, T>;

    fn into_iter(self) -> IntoIter<P, T> {
        IntoIter {
            map: self,
            walk: Walk::new(Some(0)),
        }
    }
}

impl<'a, P, T> IntoIterator for &'a PrefixTrie<P, T> {
    type Item = (&'a P, &'a T);
    type IntoIter = Iter<'a, P, T>;

    fn into_iter(self) -> Iter<'a, P, T> {
        Iter::below(self, Some(0))
    }
}

impl<P, T> PrefixTrie<P, T> {
    /// Iterate over all entries in lexicographic order, i.e., sorted by network address and then
    /// by prefix length. A network always comes before the networks it covers.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let pt: PrefixTrie<ipnet::Ipv4Net, &str> = [
    ///     ("172.16.4.0/24".parse::<ipnet::Ipv4Net>()?, "lab"),
    ///     ("172.16.0.0/12".parse::<ipnet::Ipv4Net>()?, "site"),
    ///     ("172.16.0.0/22".parse::<ipnet::Ipv4Net>()?, "office"),
    ///     ("172.16.0.0/24".parse::<ipnet::Ipv4Net>()?, "printers"),
    /// ]
    /// .into_iter()
    /// .collect();
    /// assert_eq!(
    ///     pt.values().copied().collect::<Vec<_>>(),
    ///     vec!["site", "office", "printers", "lab"],
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, P, T> {
        self.into_iter()
    }

    /// Iterate over all stored networks in lexicographic order.
    pub fn keys(&self) -> Keys<'_, P, T> {
        Keys(self.iter())
    }

    /// Iterate over all values, in lexicographic order of their networks.
    pub fn values(&self) -> Values<'_, P, T> {
        Values(self.iter())
    }
}

impl<P: Prefix, T> FromIterator<(P, T)> for PrefixTrie<P, T> {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<P: Prefix, T> Extend<(P, T)> for PrefixTrie<P, T> {
    /// Insert all entries. Later values replace earlier ones for the same network.
    fn extend<I: IntoIterator<Item = (P, T)>>(&mut self, iter: I) {
        for (prefix, value) in iter {
            self.insert(prefix, value);
        }
    }
}

/// An iterator that yields all entries of a [`PrefixTrie`] that cover a given prefix (including
/// the prefix itself if present), ordered from the least to the most specific network. See
/// [`PrefixTrie::covering_networks`] and [`PrefixTrie::containing_networks`].
#[derive(Clone)]
pub struct Covering<'a, P, T> {
    pub(super) map: &'a PrefixTrie<P, T>,
    pub(super) idx: Option<usize>,
    pub(super) prefix: P,
}

impl<'a, P, T> Iterator for Covering<'a, P, T>
where
    P: Prefix,
{
    type Item = (&'a P, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        // the root node covers everything.
        let mut idx = match self.idx {
            Some(idx) => idx,
            None => {
                self.idx = Some(0);
                if let Some(entry) = self.map.table[0].prefix_value() {
                    return Some(entry);
                }
                0
            }
        };

        loop {
            let Direction::Enter { next, .. } = self.map.get_direction(idx, &self.prefix) else {
                return None;
            };
            idx = next;
            self.idx = Some(next);
            if let Some(entry) = self.map.table[next].prefix_value() {
                return Some(entry);
            }
        }
    }
}
