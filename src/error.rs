//! Errors returned by the [`Ranger`](crate::Ranger) and by [`Network`](crate::Network)
//! construction.

use thiserror::Error;

use crate::IpVersion;

/// Errors of this crate. Absence of a network is never an error; it is reported as `None` or as an
/// empty iterator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The address or network belongs to a family that is not served by the ranger.
    #[error("{found} address does not match the address family of the ranger")]
    InvalidAddress {
        /// Family of the rejected address or network
        found: IpVersion,
    },

    /// The prefix length exceeds the width of the address family.
    #[error("invalid prefix length {len} for {version} (at most {max})", max = .version.num_bits())]
    InvalidPrefixLen {
        /// Family of the network
        version: IpVersion,
        /// The rejected prefix length
        len: u8,
    },

    /// The text is neither a network in CIDR notation nor an address.
    #[error("cannot parse network: {0}")]
    Parse(#[from] ipnet::AddrParseError),
}
