//! Formatting implementation for the PrefixTrie

use std::fmt::{Debug, Display, Formatter, Result};

use super::*;

impl<P: Debug, T: Debug> Debug for PrefixTrie<P, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        DebugPrefixTrie(self, 0).fmt(f)
    }
}

struct DebugPrefixTrie<'a, P, T>(&'a PrefixTrie<P, T>, usize);

impl<P: Debug, T: Debug> Debug for DebugPrefixTrie<'_, P, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let map = self.0;
        let idx = self.1;
        let node = &map.table[idx];
        match (node.value.as_ref(), node.left, node.right) {
            (None, None, None) => node.prefix.fmt(f),
            (None, None, Some(child)) | (None, Some(child), None) => f
                .debug_map()
                .entry(&node.prefix, &Self(map, child))
                .finish(),
            (None, Some(left), Some(right)) => f
                .debug_map()
                .entry(&node.prefix, &(Self(map, left), Self(map, right)))
                .finish(),
            (Some(v), None, None) => f.debug_map().entry(&node.prefix, v).finish(),
            (Some(v), None, Some(child)) | (Some(v), Some(child), None) => f
                .debug_map()
                .entry(&node.prefix, &(v, Self(map, child)))
                .finish(),
            (Some(v), Some(left), Some(right)) => f
                .debug_map()
                .entry(&node.prefix, &(v, Self(map, left), Self(map, right)))
                .finish(),
        }
    }
}

/// Prints the shape of the tree, one node per line. Each child is indented by `| ` per level and
/// labelled with its branch bit, and nodes that carry a value are marked with `*`:
///
/// ```text
/// 0.0.0.0/0
/// | 1--> 192.168.0.0/23
/// | | 0--> 192.168.0.0/24 *
/// | | 1--> 192.168.1.0/24 *
/// | | | 0--> 192.168.1.0/30 *
/// ```
impl<P: Display, T> Display for PrefixTrie<P, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        // (node, depth, branch bit)
        let mut stack = vec![(0usize, 0usize, None::<bool>)];
        let mut first = true;
        while let Some((idx, depth, bit)) = stack.pop() {
            let node = &self.table[idx];
            if !first {
                writeln!(f)?;
            }
            first = false;
            for _ in 0..depth {
                f.write_str("| ")?;
            }
            if let Some(bit) = bit {
                write!(f, "{}--> ", u8::from(bit))?;
            }
            write!(f, "{}", node.prefix)?;
            if node.value.is_some() {
                f.write_str(" *")?;
            }
            if let Some(right) = node.right {
                stack.push((right, depth + 1, Some(true)));
            }
            if let Some(left) = node.left {
                stack.push((left, depth + 1, Some(false)));
            }
        }
        Ok(())
    }
}
