//! This crate answers which CIDR networks contain an IP address, which ones cover a network, and
//! which ones are covered by a network. It is the lookup infrastructure of firewalls, routers,
//! access control lists, or geo/ASN databases.
//!
//! The crate offers two layers:
//!
//! - [`PrefixTrie`] is a path-compressed binary trie for a single address family. It is generic
//!   over the key type, which can be any [`Prefix`]: `ipnet::Ipv4Net`, `ipnet::Ipv6Net`, any tuple
//!   `(R, u8)` where `R` is an unsigned primitive integer, and (with the feature `ipnetwork`) the
//!   networks of the `ipnetwork` crate.
//! - [`Ranger`] stores [`Network`]s of both IPv4 and IPv6 by dispatching into one trie per family.
//!
//! # Description of the Tree
//!
//! The tree is structured as follows: Each node consists of a prefix, a container for a potential
//! value (`Option`), and two optional children. Adding a new child, or traversing into the tree is
//! done as follows: we look at the most significant bit that is **not** part of the prefix
//! itself. If it is not set, then we take the left branch, and otherwise, we take the right one.
//!
//! A node without a value always has exactly two children (except for the root, which always
//! holds the prefix of length zero). Chains of nodes that would only have a single child are
//! collapsed into a single edge. [`PrefixTrie::remove`] restores this after every removal, so the
//! shape of the tree only depends on the networks it contains.
//!
//! # Queries
//!
//! | Operation                                  | Yields                                      |
//! |--------------------------------------------|---------------------------------------------|
//! | [`contains`](PrefixTrie::contains)         | whether any network contains an address     |
//! | [`containing_networks`](PrefixTrie::containing_networks) | all networks containing an address, least specific first |
//! | [`covering_networks`](PrefixTrie::covering_networks) | all networks equal to or wider than a network, least specific first |
//! | [`covered_networks`](PrefixTrie::covered_networks) | all networks equal to or narrower than a network, lexicographic |
//!
//! All operations only walk a single path from the root, which is at most as deep as the key is
//! wide (32 bits for IPv4, 128 bits for IPv6). `covered_networks` additionally walks the subtree
//! below that path, which only contains matching networks.
//!
//! ```
//! # use prefix_ranger::*;
//! # use ipnet::Ipv4Net;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pt: PrefixTrie<Ipv4Net, _> = PrefixTrie::new();
//! pt.insert("192.168.0.0/16".parse()?, 1);
//! pt.insert("192.168.0.0/24".parse()?, 2);
//! assert_eq!(
//!     pt.covering_networks(&"192.168.0.128/25".parse()?).map(|(_, v)| *v).collect::<Vec<_>>(),
//!     vec![1, 2],
//! );
//! assert_eq!(pt.covered_networks(&"192.168.0.128/25".parse()?).count(), 0);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Mutating operations take `&mut self`, and queries take `&self`. Multiple queries can therefore
//! run in parallel, but never at the same time as an insertion or removal. Wrap the trie or the
//! ranger in a lock if it needs to be modified while being shared.
//!
//! # Logging
//!
//! Structural changes of the tree are reported as `tracing` events at the `trace` level, and
//! rejected address families at the `debug` level. The crate never installs a subscriber.

#![allow(clippy::collapsible_else_if)]
#![deny(missing_docs)]

mod addr;
mod error;
mod fmt;
mod network;
mod prefix;
#[cfg(test)]
mod fuzzing;

pub mod ranger;
pub mod trie;

pub use addr::{next_addr, previous_addr, IpVersion};
pub use error::Error;
pub use network::Network;
pub use prefix::Prefix;
pub use ranger::Ranger;
pub use trie::PrefixTrie;

#[inline(always)]
pub(crate) fn to_right<P: Prefix>(branch_p: &P, child_p: &P) -> bool {
    child_p.is_bit_set(branch_p.prefix_len())
}
