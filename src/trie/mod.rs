//! Implementation of the path-compressed prefix trie.

use tracing::trace;

use crate::{to_right, Prefix};

mod iter;

pub use iter::*;

/// Path-compressed binary trie that maps network prefixes to values.
///
/// Nodes live in an arena and refer to their children by index. The root (index 0) always holds
/// the prefix of length zero. A node that carries no value always has two children, except for the
/// root.
///
/// Mutations take `&mut self` and queries take `&self`: queries may run concurrently with each
/// other, but never concurrently with a mutation.
#[derive(Clone)]
pub struct PrefixTrie<P, T> {
    pub(crate) table: Vec<Node<P, T>>,
    free: Vec<usize>,
    count: usize,
}

impl<P, T> Default for PrefixTrie<P, T>
where
    P: Prefix,
{
    fn default() -> Self {
        Self {
            table: vec![Node::new(P::zero(), None)],
            free: Vec::new(),
            count: 0,
        }
    }
}

impl<P, T> PrefixTrie<P, T>
where
    P: Prefix,
{
    /// Create an empty prefix trie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of networks stored in `self`.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pt: PrefixTrie<Ipv4Net, _> = PrefixTrie::new();
    /// pt.insert("192.168.1.0/24".parse()?, 1);
    /// pt.insert("192.168.1.0/25".parse()?, 2);
    /// pt.insert("192.168.1.0/25".parse()?, 3);
    /// assert_eq!(pt.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the trie contains no networks.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get the value of an element by matching exactly on the prefix.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pt: PrefixTrie<Ipv4Net, _> = PrefixTrie::new();
    /// pt.insert("192.168.1.0/24".parse()?, 1);
    /// assert_eq!(pt.get(&"192.168.1.0/24".parse()?), Some(&1));
    /// assert_eq!(pt.get(&"192.168.2.0/24".parse()?), None);
    /// assert_eq!(pt.get(&"192.168.0.0/23".parse()?), None);
    /// assert_eq!(pt.get(&"192.168.1.128/25".parse()?), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn get(&self, prefix: &P) -> Option<&T> {
        self.find(prefix).and_then(|idx| self.table[idx].value.as_ref())
    }

    /// Get a mutable reference to a value of an element by matching exactly on the prefix.
    pub fn get_mut(&mut self, prefix: &P) -> Option<&mut T> {
        let idx = self.find(prefix)?;
        self.table[idx].value.as_mut()
    }

    /// Get the stored prefix and the value of an element by matching exactly on the prefix.
    pub fn get_key_value(&self, prefix: &P) -> Option<(&P, &T)> {
        self.find(prefix)
            .and_then(|idx| self.table[idx].prefix_value())
    }

    /// Check if exactly this prefix is present in the trie.
    pub fn contains_key(&self, prefix: &P) -> bool {
        self.get(prefix).is_some()
    }

    /// Get the most specific network that contains `prefix` (longest prefix match).
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pt: PrefixTrie<Ipv4Net, _> = PrefixTrie::new();
    /// pt.insert("192.168.1.0/24".parse()?, 1);
    /// pt.insert("192.168.0.0/23".parse()?, 2);
    /// assert_eq!(pt.get_lpm(&"192.168.1.1/32".parse()?), Some((&"192.168.1.0/24".parse()?, &1)));
    /// assert_eq!(pt.get_lpm(&"192.168.0.0/24".parse()?), Some((&"192.168.0.0/23".parse()?, &2)));
    /// assert_eq!(pt.get_lpm(&"192.168.2.0/24".parse()?), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn get_lpm(&self, prefix: &P) -> Option<(&P, &T)> {
        let mut idx = 0;
        let mut best_match: Option<(&P, &T)> = None;
        loop {
            best_match = self.table[idx].prefix_value().or(best_match);
            match self.get_direction(idx, prefix) {
                Direction::Enter { next, .. } => idx = next,
                _ => return best_match,
            }
        }
    }

    /// Insert a network into the trie, returning the value that was previously stored for exactly
    /// that network. Inserting the same network twice keeps only the latest value. Host bits of
    /// `prefix` are discarded.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pt: PrefixTrie<Ipv4Net, _> = PrefixTrie::new();
    /// assert_eq!(pt.insert("192.168.0.0/23".parse()?, 1), None);
    /// assert_eq!(pt.insert("192.168.1.0/24".parse()?, 2), None);
    /// assert_eq!(pt.insert("192.168.1.1/24".parse()?, 3), Some(2));
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert(&mut self, prefix: P, value: T) -> Option<T> {
        let prefix = prefix.normalize();
        let mut idx = 0;
        loop {
            match self.get_direction_for_insert(idx, &prefix) {
                DirectionForInsert::Enter { next, .. } => idx = next,
                DirectionForInsert::Reached => {
                    let old = self.table[idx].value.replace(value);
                    if old.is_none() {
                        self.count += 1;
                    }
                    return old;
                }
                DirectionForInsert::NewLeaf { right } => {
                    let len = prefix.prefix_len();
                    let new = self.new_node(prefix, Some(value));
                    self.set_child(idx, new, right);
                    trace!(parent = idx, node = new, len, "insert: new leaf");
                    self.count += 1;
                    return None;
                }
                DirectionForInsert::NewChild { right, child_right } => {
                    let len = prefix.prefix_len();
                    let new = self.new_node(prefix, Some(value));
                    // `NewChild` is only returned if that child exists.
                    if let Some(child) = self.set_child(idx, new, right) {
                        self.set_child(new, child, child_right);
                    }
                    trace!(parent = idx, node = new, len, "insert: splice supernet");
                    self.count += 1;
                    return None;
                }
                DirectionForInsert::NewBranch {
                    branch_prefix,
                    right,
                    prefix_right,
                } => {
                    let branch_len = branch_prefix.prefix_len();
                    let branch = self.new_node(branch_prefix, None);
                    let new = self.new_node(prefix, Some(value));
                    if let Some(child) = self.set_child(idx, branch, right) {
                        self.set_child(branch, child, !prefix_right);
                    }
                    self.set_child(branch, new, prefix_right);
                    trace!(parent = idx, branch, node = new, branch_len, "insert: new branch");
                    self.count += 1;
                    return None;
                }
            }
        }
    }

    /// Removes a network from the trie, returning its value if the network was present. Only the
    /// exact network is removed; more specific networks stay in the trie. Afterwards, the tree
    /// has the same shape as if the network was never inserted.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pt: PrefixTrie<Ipv4Net, _> = PrefixTrie::new();
    /// let prefix = "192.168.1.0/24".parse()?;
    /// pt.insert(prefix, 1);
    /// pt.insert("192.168.1.0/25".parse()?, 2);
    /// assert_eq!(pt.remove(&prefix), Some(1));
    /// assert_eq!(pt.remove(&prefix), None);
    /// assert_eq!(pt.get(&"192.168.1.0/25".parse()?), Some(&2));
    /// # Ok(())
    /// # }
    /// ```
    pub fn remove(&mut self, prefix: &P) -> Option<T> {
        // the last two steps on the path from the root, as (node, side taken).
        let mut steps: [Option<(usize, bool)>; 2] = [None, None];
        let mut idx = 0;
        loop {
            match self.get_direction(idx, prefix) {
                Direction::Enter { next, right } => {
                    steps = [steps[1], Some((idx, right))];
                    idx = next;
                }
                Direction::Reached => break,
                Direction::Missing => return None,
            }
        }
        let [grandparent, parent] = steps;
        let value = self.remove_node(idx, parent, grandparent)?;
        self.count -= 1;
        Some(value)
    }

    /// Check whether any network in the trie contains the address `addr`.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # use ipnet::Ipv4Net;
    /// # use std::net::Ipv4Addr;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pt: PrefixTrie<Ipv4Net, _> = PrefixTrie::new();
    /// pt.insert("192.168.0.0/24".parse()?, ());
    /// assert!(pt.contains("192.168.0.255".parse::<Ipv4Addr>()?));
    /// assert!(!pt.contains("192.168.1.0".parse::<Ipv4Addr>()?));
    /// # Ok(())
    /// # }
    /// ```
    pub fn contains(&self, addr: impl Into<P::R>) -> bool {
        let addr = P::from_addr(addr.into());
        let mut idx = 0;
        loop {
            if self.table[idx].value.is_some() {
                return true;
            }
            match self.get_direction(idx, &addr) {
                Direction::Enter { next, .. } => idx = next,
                _ => return false,
            }
        }
    }

    /// Iterate over all networks that contain the address `addr`. The iterator yields the least
    /// specific network first, and the most specific one last.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # use ipnet::Ipv4Net;
    /// # use std::net::Ipv4Addr;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pt: PrefixTrie<Ipv4Net, _> = PrefixTrie::new();
    /// pt.insert("192.168.0.0/24".parse()?, 1);
    /// pt.insert("192.168.0.0/25".parse()?, 2);
    /// pt.insert("192.168.0.128/25".parse()?, 3);
    /// assert_eq!(
    ///     pt.containing_networks("192.168.0.1".parse::<Ipv4Addr>()?).collect::<Vec<_>>(),
    ///     vec![(&"192.168.0.0/24".parse()?, &1), (&"192.168.0.0/25".parse()?, &2)],
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn containing_networks(&self, addr: impl Into<P::R>) -> Covering<'_, P, T> {
        Covering {
            map: self,
            idx: None,
            prefix: P::from_addr(addr.into()),
        }
    }

    /// Iterate over all networks that are equal to or more specific than `prefix`, i.e., that are
    /// covered by it. `prefix` itself does not need to be present in the trie. The iterator yields
    /// elements in lexicographic order.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pt: PrefixTrie<Ipv4Net, _> = PrefixTrie::new();
    /// pt.insert("0.0.0.0/0".parse()?, 0);
    /// pt.insert("192.168.0.0/24".parse()?, 1);
    /// pt.insert("192.168.1.1/32".parse()?, 2);
    /// pt.insert("10.1.0.0/16".parse()?, 3);
    /// assert_eq!(
    ///     pt.covered_networks(&"192.168.0.0/16".parse()?).collect::<Vec<_>>(),
    ///     vec![(&"192.168.0.0/24".parse()?, &1), (&"192.168.1.1/32".parse()?, &2)],
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn covered_networks(&self, prefix: &P) -> Iter<'_, P, T> {
        // find the node with the shortest prefix that is contained within `prefix`.
        let mut idx = 0;
        let start = loop {
            match self.get_direction_for_insert(idx, prefix) {
                DirectionForInsert::Reached => break Some(idx),
                DirectionForInsert::Enter { next, .. } => idx = next,
                // `prefix` would sit above this child, so the child's subtree is covered.
                DirectionForInsert::NewChild { right, .. } => break self.get_child(idx, right),
                DirectionForInsert::NewLeaf { .. } | DirectionForInsert::NewBranch { .. } => {
                    break None
                }
            }
        };
        Iter::below(self, start)
    }

    /// Iterate over all networks that are equal to or less specific than `prefix`, i.e., that
    /// cover it. The iterator yields the least specific network first, and `prefix` itself (if
    /// present) last.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pt: PrefixTrie<Ipv4Net, _> = PrefixTrie::new();
    /// pt.insert("10.0.0.0/8".parse()?, 0);
    /// pt.insert("10.1.0.0/16".parse()?, 1);
    /// pt.insert("10.1.1.0/24".parse()?, 2);
    /// pt.insert("10.1.2.0/24".parse()?, 3); // disjoint networks are not covering
    /// pt.insert("10.1.1.0/25".parse()?, 4); // more specific networks are not covering
    /// assert_eq!(
    ///     pt.covering_networks(&"10.1.1.0/24".parse()?).map(|(_, v)| *v).collect::<Vec<_>>(),
    ///     vec![0, 1, 2],
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn covering_networks(&self, prefix: &P) -> Covering<'_, P, T> {
        Covering {
            map: self,
            idx: None,
            prefix: prefix.normalize(),
        }
    }

    /// Remove all networks from the trie, but keep the allocated memory.
    pub fn clear(&mut self) {
        self.table.clear();
        self.free.clear();
        self.count = 0;
        self.table.push(Node::new(P::zero(), None));
    }
}

/// Private function implementations
impl<P, T> PrefixTrie<P, T>
where
    P: Prefix,
{
    /// Find the node whose prefix is exactly `prefix`.
    fn find(&self, prefix: &P) -> Option<usize> {
        let mut idx = 0;
        loop {
            match self.get_direction(idx, prefix) {
                Direction::Reached => return Some(idx),
                Direction::Enter { next, .. } => idx = next,
                Direction::Missing => return None,
            }
        }
    }

    /// Get the child of a node, either to the left or the right
    #[inline(always)]
    pub(crate) fn get_child(&self, idx: usize, right: bool) -> Option<usize> {
        if right {
            self.table[idx].right
        } else {
            self.table[idx].left
        }
    }

    /// set the child of a node (either to the left or the right), and return the index of the old child.
    #[inline(always)]
    fn set_child(&mut self, idx: usize, child: usize, right: bool) -> Option<usize> {
        if right {
            self.table[idx].right.replace(child)
        } else {
            self.table[idx].left.replace(child)
        }
    }

    /// remove a child from a node (just the reference).
    #[inline(always)]
    fn clear_child(&mut self, idx: usize, right: bool) -> Option<usize> {
        if right {
            self.table[idx].right.take()
        } else {
            self.table[idx].left.take()
        }
    }

    /// insert a new node into the table and return its index.
    #[inline(always)]
    fn new_node(&mut self, prefix: P, value: Option<T>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.table[idx] = Node::new(prefix, value);
            idx
        } else {
            self.table.push(Node::new(prefix, value));
            self.table.len() - 1
        }
    }

    /// Release a node that is no longer referenced by its parent.
    #[inline(always)]
    fn free_node(&mut self, idx: usize) {
        let node = &mut self.table[idx];
        node.value = None;
        node.left = None;
        node.right = None;
        self.free.push(idx);
    }

    /// Take the value of `idx` and restore path compression around it. `parent` is the parent of
    /// `idx` together with the side on which `idx` hangs (`None` for the root), and `grandparent`
    /// the same for the parent.
    fn remove_node(
        &mut self,
        idx: usize,
        parent: Option<(usize, bool)>,
        grandparent: Option<(usize, bool)>,
    ) -> Option<T> {
        let value = self.table[idx].value.take()?;
        // the root is never removed, it only loses its value.
        let Some((par, side)) = parent else {
            return Some(value);
        };

        match (self.table[idx].left, self.table[idx].right) {
            (Some(_), Some(_)) => {
                // still needed as a branch.
                trace!(node = idx, "remove: keep branch");
            }
            (Some(child), None) | (None, Some(child)) => {
                self.set_child(par, child, side);
                self.free_node(idx);
                trace!(node = idx, parent = par, "remove: splice out");
            }
            (None, None) => {
                self.clear_child(par, side);
                self.free_node(idx);
                trace!(node = idx, parent = par, "remove: unlink leaf");
                // a branch without a value (other than the root) is left with a single child,
                // which takes its place.
                if let Some((grp, par_side)) = grandparent {
                    if self.table[par].value.is_none() {
                        let sibling = self.clear_child(par, !side);
                        match sibling {
                            Some(sibling) => self.set_child(grp, sibling, par_side),
                            None => self.clear_child(grp, par_side),
                        };
                        self.free_node(par);
                        trace!(node = par, parent = grp, "remove: collapse branch");
                    }
                }
            }
        }
        Some(value)
    }

    /// Get the directions from some node `idx` to get to `prefix`.
    #[inline(always)]
    pub(crate) fn get_direction(&self, cur: usize, prefix: &P) -> Direction {
        let cur_p = &self.table[cur].prefix;
        if cur_p.eq(prefix) {
            Direction::Reached
        } else {
            let right = to_right(cur_p, prefix);
            match self.get_child(cur, right) {
                Some(child) if self.table[child].prefix.contains(prefix) => {
                    Direction::Enter { next: child, right }
                }
                _ => Direction::Missing,
            }
        }
    }

    /// Like [`Self::get_direction`], but also tells how to extend the tree at `cur` if `prefix`
    /// is not present. All cases follow from the number of bits `prefix` shares with the child
    /// on its side.
    #[inline(always)]
    fn get_direction_for_insert(&self, cur: usize, prefix: &P) -> DirectionForInsert<P> {
        let node_p = &self.table[cur].prefix;
        if node_p.eq(prefix) {
            return DirectionForInsert::Reached;
        }
        let right = to_right(node_p, prefix);
        let Some(child) = self.get_child(cur, right) else {
            return DirectionForInsert::NewLeaf { right };
        };
        let child_p = &self.table[child].prefix;
        let common = child_p.common_prefix_len(prefix);
        if common == child_p.prefix_len() {
            DirectionForInsert::Enter { next: child, right }
        } else if common == prefix.prefix_len() {
            DirectionForInsert::NewChild {
                right,
                child_right: child_p.is_bit_set(common),
            }
        } else {
            DirectionForInsert::NewBranch {
                branch_prefix: prefix.longest_common_prefix(child_p),
                right,
                prefix_right: prefix.is_bit_set(common),
            }
        }
    }
}

#[cfg(test)]
impl<P, T> PrefixTrie<P, T>
where
    P: Prefix,
{
    /// Check the structure of the tree. Every child must be more specific than its parent, and be
    /// placed on the side given by its first bit after the parent's prefix. Nodes without a value
    /// (except the root) need two children. Every slot in the table is either reachable or free.
    pub(crate) fn is_well_formed(&self) -> bool {
        if self.table[0].prefix.prefix_len() != 0 {
            return false;
        }
        let mut nodes = vec![0];
        let mut reachable = 0;
        let mut values = 0;
        while let Some(idx) = nodes.pop() {
            reachable += 1;
            let node = &self.table[idx];
            values += usize::from(node.value.is_some());
            let mut num_children = 0;
            for (child, right) in [(node.left, false), (node.right, true)] {
                let Some(child) = child else { continue };
                let child_p = &self.table[child].prefix;
                if child_p.prefix_len() <= node.prefix.prefix_len()
                    || !node.prefix.contains(child_p)
                    || to_right(&node.prefix, child_p) != right
                {
                    return false;
                }
                num_children += 1;
                nodes.push(child);
            }
            if idx != 0 && node.value.is_none() && num_children < 2 {
                return false;
            }
        }
        values == self.count && reachable + self.free.len() == self.table.len()
    }
}

impl<P, T> PartialEq for PrefixTrie<P, T>
where
    P: Prefix + PartialEq,
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<P, T> Eq for PrefixTrie<P, T>
where
    P: Prefix + Eq,
    T: Eq,
{
}

/// A compressed path segment of the trie. `left` and `right` are indexed by the bit right after
/// `prefix`.
#[derive(Clone)]
pub(crate) struct Node<P, T> {
    pub(crate) prefix: P,
    pub(crate) value: Option<T>,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
}

impl<P, T> Node<P, T> {
    fn new(prefix: P, value: Option<T>) -> Self {
        Self {
            prefix,
            value,
            left: None,
            right: None,
        }
    }

    /// get the tuple of prefix and value.
    pub(crate) fn prefix_value(&self) -> Option<(&P, &T)> {
        self.value.as_ref().map(|v| (&self.prefix, v))
    }
}

/// Next step when searching for a network.
pub(crate) enum Direction {
    /// The current node holds the network.
    Reached,
    /// Descend into `next`, the child on side `right`.
    Enter { next: usize, right: bool },
    /// The network is not in the trie.
    Missing,
}

/// Next step when inserting a network, and how to extend the tree if it is missing.
enum DirectionForInsert<P> {
    Reached,
    Enter { next: usize, right: bool },
    /// No child on side `right`; attach the network as a leaf.
    NewLeaf { right: bool },
    /// The child on side `right` is more specific than the network. The network takes its place
    /// and adopts it on side `child_right`.
    NewChild { right: bool, child_right: bool },
    /// The network and the child on side `right` diverge. A value-less node `branch_prefix` takes
    /// the child's place, with the network on side `prefix_right` and the old child on the other.
    NewBranch {
        branch_prefix: P,
        right: bool,
        prefix_right: bool,
    },
}
