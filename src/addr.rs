//! Address families and the linear order of addresses within a family.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// The address family of an address or a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IpVersion {
    /// 32-bit addresses
    V4,
    /// 128-bit addresses
    V6,
}

impl IpVersion {
    /// Width of an address of this family in bits.
    pub fn num_bits(&self) -> u8 {
        match self {
            IpVersion::V4 => 32,
            IpVersion::V6 => 128,
        }
    }

    /// Get the family of an address.
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("IPv4"),
            IpVersion::V6 => f.write_str("IPv6"),
        }
    }
}

/// Get the address that directly follows `addr`. Returns `None` for the last address of the
/// family (`255.255.255.255` or `ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff`); the address space does
/// not wrap around.
///
/// ```
/// # use prefix_ranger::*;
/// # use std::net::IpAddr;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// assert_eq!(next_addr("192.168.0.255".parse()?), Some("192.168.1.0".parse()?));
/// assert_eq!(next_addr("::ffff".parse()?), Some("::1:0".parse()?));
/// assert_eq!(next_addr("255.255.255.255".parse()?), None);
/// # Ok(())
/// # }
/// ```
pub fn next_addr(addr: IpAddr) -> Option<IpAddr> {
    match addr {
        IpAddr::V4(a) => u32::from(a).checked_add(1).map(|x| Ipv4Addr::from(x).into()),
        IpAddr::V6(a) => u128::from(a).checked_add(1).map(|x| Ipv6Addr::from(x).into()),
    }
}

/// Get the address that directly precedes `addr`. Returns `None` for the first address of the
/// family (`0.0.0.0` or `::`).
///
/// ```
/// # use prefix_ranger::*;
/// # use std::net::IpAddr;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// assert_eq!(previous_addr("192.168.1.0".parse()?), Some("192.168.0.255".parse()?));
/// assert_eq!(previous_addr("::".parse()?), None);
/// # Ok(())
/// # }
/// ```
pub fn previous_addr(addr: IpAddr) -> Option<IpAddr> {
    match addr {
        IpAddr::V4(a) => u32::from(a).checked_sub(1).map(|x| Ipv4Addr::from(x).into()),
        IpAddr::V6(a) => u128::from(a).checked_sub(1).map(|x| Ipv6Addr::from(x).into()),
    }
}
