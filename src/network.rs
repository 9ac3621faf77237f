//! The normalized network identity that is used as the key of a [`Ranger`](crate::Ranger).

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use either::Either;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};

use crate::{Error, IpVersion};

/// A network prefix of either address family, e.g., `192.168.0.0/24` or `2001:db8::/32`.
///
/// The bits beyond the prefix length are always zero: any construction truncates the host part.
/// Hence, two networks are equal if and only if they have the same family, the same prefix length
/// and the same leading `prefix_len` bits.
///
/// ```
/// # use prefix_ranger::*;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let a: Network = "192.168.0.1/24".parse()?;
/// let b: Network = "192.168.0.0/24".parse()?;
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "192.168.0.0/24");
/// assert_eq!(a.version(), IpVersion::V4);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Network(IpNet);

impl Network {
    /// Create a new network from an address and a prefix length. Host bits of `addr` are
    /// discarded. Fails with [`Error::InvalidPrefixLen`] if `len` exceeds the width of the family.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let net = Network::new("10.1.2.3".parse()?, 8)?;
    /// assert_eq!(net, "10.0.0.0/8".parse()?);
    /// assert!(Network::new("10.1.2.3".parse()?, 33).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(addr: IpAddr, len: u8) -> Result<Self, Error> {
        let version = IpVersion::of(&addr);
        IpNet::new(addr, len)
            .map(Self::from)
            .map_err(|_| Error::InvalidPrefixLen { version, len })
    }

    /// The address family of the network.
    pub fn version(&self) -> IpVersion {
        match self.0 {
            IpNet::V4(_) => IpVersion::V4,
            IpNet::V6(_) => IpVersion::V6,
        }
    }

    /// The first address of the network.
    pub fn addr(&self) -> IpAddr {
        self.0.addr()
    }

    /// The last address of the network.
    pub fn broadcast(&self) -> IpAddr {
        self.0.broadcast()
    }

    /// The number of significant bits.
    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Check whether `addr` lies within this network. Addresses of the other family are never
    /// contained.
    pub fn contains_addr(&self, addr: &IpAddr) -> bool {
        self.0.contains(addr)
    }

    /// Check whether `other` is equal to or more specific than `self`. Networks of different
    /// families never cover each other.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let wide: Network = "192.168.0.0/15".parse()?;
    /// assert!(wide.covers(&"192.168.0.0/16".parse()?));
    /// assert!(wide.covers(&wide));
    /// assert!(!wide.covers(&"192.170.0.0/16".parse()?));
    /// # Ok(())
    /// # }
    /// ```
    pub fn covers(&self, other: &Network) -> bool {
        self.0.contains(&other.0)
    }

    /// The underlying `ipnet` network.
    pub fn as_ipnet(&self) -> IpNet {
        self.0
    }

    /// Split the network by family, as it is used to dispatch into the per-family tries.
    pub(crate) fn split(&self) -> Either<Ipv4Net, Ipv6Net> {
        match self.0 {
            IpNet::V4(net) => Either::Left(net),
            IpNet::V6(net) => Either::Right(net),
        }
    }
}

impl From<IpNet> for Network {
    fn from(net: IpNet) -> Self {
        Self(net.trunc())
    }
}

impl From<Ipv4Net> for Network {
    fn from(net: Ipv4Net) -> Self {
        Self(IpNet::V4(net.trunc()))
    }
}

impl From<Ipv6Net> for Network {
    fn from(net: Ipv6Net) -> Self {
        Self(IpNet::V6(net.trunc()))
    }
}

/// The host network of a single address, i.e., `/32` for IPv4 and `/128` for IPv6.
impl From<IpAddr> for Network {
    fn from(addr: IpAddr) -> Self {
        Self(addr.into())
    }
}

impl From<Network> for IpNet {
    fn from(net: Network) -> Self {
        net.0
    }
}

/// Parses either CIDR notation (`10.0.0.0/8`) or a single address (`10.0.0.1`, as a host network).
impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<IpNet>() {
            Ok(net) => Ok(net.into()),
            Err(e) => s.parse::<IpAddr>().map(Self::from).map_err(|_| Error::Parse(e)),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
