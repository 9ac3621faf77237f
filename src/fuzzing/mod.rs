//! Randomized tests (quickcheck). Every property runs for a 32 bit key and for an `Ipv6Net` key,
//! with prefix lengths spread over the whole width.

use std::fmt::{self, Debug};
use std::net::Ipv4Addr;

use ipnet::Ipv6Net;
use num_traits::NumCast;
use quickcheck::{Arbitrary, Gen, QuickCheck};

use crate::prefix::mask_from_prefix_len;
use crate::*;

mod basic;
mod queries;

const CASES: u64 = if cfg!(miri) { 10 } else { 2000 };
const GEN_SIZE: usize = 100;

/// Run `property` on random inputs. `QUICKCHECK_TESTS` overrides the number of cases.
fn check<A: Arbitrary + Debug>(property: fn(A) -> bool) {
    let cases = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|n| n.parse().ok())
        .unwrap_or(CASES);
    QuickCheck::new()
        .tests(cases)
        .max_tests(cases)
        .gen(Gen::new(GEN_SIZE))
        .quickcheck(property)
}

/// A key type the properties are instantiated for.
trait TestKey: Prefix + Arbitrary + Debug + Copy + Ord {}

impl<K: Prefix + Arbitrary + Debug + Copy + Ord> TestKey for K {}

/// A mutation of the trie.
#[derive(Debug, Clone)]
enum Op<K> {
    Insert(K, i32),
    Remove(K),
}

impl<K: Arbitrary> Arbitrary for Op<K> {
    fn arbitrary(g: &mut Gen) -> Self {
        let key = K::arbitrary(g);
        // one in three operations is a removal.
        if u8::arbitrary(g) % 3 == 0 {
            Op::Remove(key)
        } else {
            Op::Insert(key, i32::arbitrary(g))
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self.clone() {
            Op::Insert(key, value) => Box::new(key.shrink().map(move |k| Op::Insert(k, value))),
            Op::Remove(key) => Box::new(key.shrink().map(Op::Remove)),
        }
    }
}

impl<P: Prefix + Arbitrary, T: Arbitrary> Arbitrary for PrefixTrie<P, T> {
    fn arbitrary(g: &mut Gen) -> Self {
        Vec::<(P, T)>::arbitrary(g).into_iter().collect()
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let entries: Vec<(P, T)> = self.clone().into_iter().collect();
        Box::new(entries.shrink().map(|e| e.into_iter().collect()))
    }
}

/// Address bits that start with one of a few fixed patterns, so that random networks share long
/// prefixes and nest into each other.
fn draw_bits(g: &mut Gen) -> u128 {
    let pattern = *g
        .choose(&[0, u128::MAX, 0xc0a8 << 112, 0x2001_0db8 << 96])
        .unwrap_or(&0);
    let keep = <u32 as From<u8>>::from(u8::arbitrary(g) % 129);
    pattern ^ u128::arbitrary(g).checked_shr(keep).unwrap_or(0)
}

/// Shorter lengths to try when shrinking a network of length `len`.
fn shorter(len: u8) -> impl Iterator<Item = u8> {
    [len / 2, len.saturating_sub(1)]
        .into_iter()
        .filter(move |l| *l < len)
}

/// An address inside `net`, with the host bits taken from `noise`.
fn addr_in<K: Prefix>(net: &K, noise: u128) -> K::R {
    let noise = noise >> (128 - <u32 as From<u8>>::from(K::num_bits()));
    let noise = <K::R as NumCast>::from(noise).unwrap();
    net.mask() | (noise & !mask_from_prefix_len::<K::R>(net.prefix_len()))
}

/// Entries of `map` selected by `f`, in iteration order.
fn select<K: Prefix, F: Fn(&K) -> bool>(map: &PrefixTrie<K, i32>, f: F) -> Vec<(&K, &i32)> {
    map.iter().filter(|(p, _)| f(*p)).collect()
}

/// 32 bit key.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
struct Net4(u32, u8);

impl Debug for Net4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", Ipv4Addr::from(self.0), self.1)
    }
}

impl Prefix for Net4 {
    type R = u32;

    fn repr(&self) -> u32 {
        self.0
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }

    fn from_repr_len(repr: u32, len: u8) -> Self {
        let (repr, len) = <(u32, u8)>::from_repr_len(repr, len);
        Self(repr, len)
    }
}

impl Arbitrary for Net4 {
    fn arbitrary(g: &mut Gen) -> Self {
        let bits = (draw_bits(g) >> 96) as u32;
        Self::from_repr_len(bits, u8::arbitrary(g) % 33)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let repr = self.0;
        Box::new(shorter(self.1).map(move |len| Self::from_repr_len(repr, len)))
    }
}

/// IPv6 key.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
struct Net6(Ipv6Net);

impl Debug for Net6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Prefix for Net6 {
    type R = u128;

    fn repr(&self) -> u128 {
        Prefix::repr(&self.0)
    }

    fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    fn from_repr_len(repr: u128, len: u8) -> Self {
        Self(Ipv6Net::from_repr_len(repr, len))
    }

    fn mask(&self) -> u128 {
        Prefix::mask(&self.0)
    }
}

impl Arbitrary for Net6 {
    fn arbitrary(g: &mut Gen) -> Self {
        let bits = draw_bits(g);
        Self::from_repr_len(bits, u8::arbitrary(g) % 129)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let repr = Prefix::repr(self);
        Box::new(shorter(self.prefix_len()).map(move |len| Self::from_repr_len(repr, len)))
    }
}
