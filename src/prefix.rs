//! The binary key model: the generic type `Prefix`.

use ipnet::{Ipv4Net, Ipv6Net};
#[cfg(feature = "ipnetwork")]
use ipnetwork::{Ipv4Network, Ipv6Network};
use num_traits::{One, PrimInt, Unsigned, Zero};

/// A network key: a fixed-width bit string of which only the leading `prefix_len` bits are
/// significant.
///
/// Bit `0` is the most significant bit of [`Prefix::R`]. The width of `R` is the width of the
/// address family, i.e., `u32` for IPv4 and `u128` for IPv6. Two keys that differ only in bits
/// beyond their length denote the same network.
pub trait Prefix: Sized {
    /// Unsigned integer holding the address bits.
    type R: Unsigned + PrimInt;

    /// The address bits, possibly including host bits beyond [`Prefix::prefix_len`].
    fn repr(&self) -> Self::R;

    /// Number of significant leading bits.
    fn prefix_len(&self) -> u8;

    /// Build a key from address bits and a length. Lengths above the width are clamped, and host
    /// bits may be dropped.
    fn from_repr_len(repr: Self::R, len: u8) -> Self;

    /// Width of the address family in bits.
    fn num_bits() -> u8 {
        Self::R::zero().count_zeros() as u8
    }

    /// The key of full width that matches the single address `addr`.
    fn from_addr(addr: Self::R) -> Self {
        Self::from_repr_len(addr, Self::num_bits())
    }

    /// The network address: [`Prefix::repr`] with all host bits cleared. Types that never store
    /// host bits may override this.
    fn mask(&self) -> Self::R {
        self.repr() & mask_from_prefix_len(self.prefix_len())
    }

    /// The same network without host bits.
    fn normalize(&self) -> Self {
        Self::from_repr_len(self.mask(), self.prefix_len())
    }

    /// The network of length zero, which contains every address of the family.
    fn zero() -> Self {
        Self::from_repr_len(Self::R::zero(), 0)
    }

    /// Number of leading network bits shared by `self` and `other`. Never exceeds the shorter
    /// of both lengths.
    fn common_prefix_len(&self, other: &Self) -> u8 {
        let differ = (self.mask() ^ other.mask()).leading_zeros() as u8;
        differ.min(self.prefix_len()).min(other.prefix_len())
    }

    /// The most specific network that contains both `self` and `other`.
    fn longest_common_prefix(&self, other: &Self) -> Self {
        let len = self.common_prefix_len(other);
        Self::from_repr_len(self.repr() & mask_from_prefix_len(len), len)
    }

    /// Whether every address of `other` is also in `self`. A network contains itself.
    fn contains(&self, other: &Self) -> bool {
        self.prefix_len() <= other.prefix_len()
            && self.common_prefix_len(other) == self.prefix_len()
    }

    /// Value of network bit `bit`. Bits at or beyond the prefix length are host bits and always
    /// read as unset.
    fn is_bit_set(&self, bit: u8) -> bool {
        if bit >= self.prefix_len().min(Self::num_bits()) {
            return false;
        }
        let shift = (Self::num_bits() - 1 - bit) as usize;
        (self.repr() >> shift) & Self::R::one() == Self::R::one()
    }

    /// Network equality: same length and same network bits. Host bits are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.prefix_len() == other.prefix_len() && self.mask() == other.mask()
    }
}

/// Netmask of length `len`, i.e., the `len` most significant bits set.
pub(crate) fn mask_from_prefix_len<R: PrimInt>(len: u8) -> R {
    let width = R::zero().count_zeros();
    match u32::from(len) {
        0 => R::zero(),
        l if l >= width => !R::zero(),
        l => !(!R::zero() >> l as usize),
    }
}

impl Prefix for Ipv4Net {
    type R = u32;

    fn repr(&self) -> u32 {
        self.addr().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }

    fn from_repr_len(repr: u32, len: u8) -> Self {
        // `Ipv4Net::new` only fails for lengths above 32.
        Ipv4Net::new(repr.into(), len.min(32))
            .map(|net| net.trunc())
            .unwrap_or_default()
    }

    fn mask(&self) -> u32 {
        self.network().into()
    }

    fn zero() -> Self {
        Ipv4Net::default()
    }
}

impl Prefix for Ipv6Net {
    type R = u128;

    fn repr(&self) -> u128 {
        self.addr().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }

    fn from_repr_len(repr: u128, len: u8) -> Self {
        Ipv6Net::new(repr.into(), len.min(128))
            .map(|net| net.trunc())
            .unwrap_or_default()
    }

    fn mask(&self) -> u128 {
        self.network().into()
    }

    fn zero() -> Self {
        Ipv6Net::default()
    }
}

#[cfg(feature = "ipnetwork")]
impl Prefix for Ipv4Network {
    type R = u32;

    fn repr(&self) -> u32 {
        self.ip().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }

    fn from_repr_len(repr: u32, len: u8) -> Self {
        let len = len.min(32);
        let network = repr & mask_from_prefix_len::<u32>(len);
        // the length is clamped to the width, so this never fails.
        Ipv4Network::new(network.into(), len).unwrap()
    }

    fn mask(&self) -> u32 {
        self.network().into()
    }
}

#[cfg(feature = "ipnetwork")]
impl Prefix for Ipv6Network {
    type R = u128;

    fn repr(&self) -> u128 {
        self.ip().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }

    fn from_repr_len(repr: u128, len: u8) -> Self {
        let len = len.min(128);
        let network = repr & mask_from_prefix_len::<u128>(len);
        Ipv6Network::new(network.into(), len).unwrap()
    }

    fn mask(&self) -> u128 {
        self.network().into()
    }
}

/// Raw keys: an integer of the family width and a length.
impl<R> Prefix for (R, u8)
where
    R: Unsigned + PrimInt,
{
    type R = R;

    fn repr(&self) -> R {
        self.0
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }

    fn from_repr_len(repr: R, len: u8) -> Self {
        let len = len.min(Self::num_bits());
        (repr & mask_from_prefix_len(len), len)
    }
}
