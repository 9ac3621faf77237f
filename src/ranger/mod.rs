//! The [`Ranger`], a facade that serves networks of both address families by dispatching into one
//! [`PrefixTrie`] per family.
//!
//! The ranger always returns owned [`Network`]s: the per-family tries store `Ipv4Net` and
//! `Ipv6Net` keys, which are converted on the way out. Both are `Copy`, so this is cheap.

use std::net::IpAddr;

use either::{Either, Left, Right};
use ipnet::{Ipv4Net, Ipv6Net};
use tracing::debug;

use crate::{Error, IpVersion, Network, PrefixTrie};

#[cfg(test)]
mod test;

/// Run `$body` on the trie of the family of `$key`, with `$t` bound to the trie and `$p` to the
/// family-specific key.
macro_rules! fork {
    ($key:expr, $v4:expr, $v6:expr, |$t:ident, $p:ident| $body:expr) => {
        match $key {
            Left($p) => {
                let $t = $v4;
                $body
            }
            Right($p) => {
                let $t = $v6;
                $body
            }
        }
    };
}

/// Like `fork!`, but `$body` is an iterator over `(&P, &T)`, which is turned into an iterator over
/// `(Network, &T)`.
macro_rules! fork_iter {
    ($key:expr, $v4:expr, $v6:expr, |$t:ident, $p:ident| $body:expr) => {
        match $key {
            Left($p) => {
                let $t = $v4;
                Left($body.map(|(p, v)| (Network::from(*p), v)))
            }
            Right($p) => {
                let $t = $v6;
                Right($body.map(|(p, v)| (Network::from(*p), v)))
            }
        }
    };
}

/// Stores networks of both address families and answers which of them contain an address, cover
/// a network, or are covered by a network.
///
/// Every operation is dispatched on the family of its argument. A ranger created with
/// [`Ranger::with_version`] serves only one family and rejects the other one with
/// [`Error::InvalidAddress`].
///
/// ```
/// # use prefix_ranger::*;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut ranger = Ranger::new();
/// ranger.insert("10.0.0.0/8".parse()?, "private")?;
/// ranger.insert("10.1.0.0/16".parse()?, "office")?;
/// ranger.insert("2001:db8::/32".parse()?, "documentation")?;
///
/// assert!(ranger.contains("10.1.2.3".parse()?)?);
/// assert!(!ranger.contains("11.0.0.1".parse()?)?);
/// assert_eq!(
///     ranger.containing_networks("10.1.2.3".parse()?)?.map(|(_, v)| *v).collect::<Vec<_>>(),
///     vec!["private", "office"],
/// );
/// assert_eq!(
///     ranger.covered_networks(&"2000::/3".parse()?)?.collect::<Vec<_>>(),
///     vec![("2001:db8::/32".parse()?, &"documentation")],
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Ranger<T> {
    v4: Option<PrefixTrie<Ipv4Net, T>>,
    v6: Option<PrefixTrie<Ipv6Net, T>>,
}

impl<T> Default for Ranger<T> {
    fn default() -> Self {
        Self {
            v4: Some(PrefixTrie::new()),
            v6: Some(PrefixTrie::new()),
        }
    }
}

impl<T> Ranger<T> {
    /// Create an empty ranger serving both IPv4 and IPv6.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ranger that only serves the given address family.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut ranger = Ranger::with_version(IpVersion::V4);
    /// assert_eq!(ranger.insert("10.0.0.0/8".parse()?, 1), Ok(None));
    /// assert_eq!(
    ///     ranger.insert("2001:db8::/32".parse()?, 2),
    ///     Err(Error::InvalidAddress { found: IpVersion::V6 }),
    /// );
    /// assert!(ranger.contains("::1".parse()?).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_version(version: IpVersion) -> Self {
        match version {
            IpVersion::V4 => Self {
                v4: Some(PrefixTrie::new()),
                v6: None,
            },
            IpVersion::V6 => Self {
                v4: None,
                v6: Some(PrefixTrie::new()),
            },
        }
    }

    /// Check whether the ranger serves the given address family.
    pub fn supports(&self, version: IpVersion) -> bool {
        match version {
            IpVersion::V4 => self.v4.is_some(),
            IpVersion::V6 => self.v6.is_some(),
        }
    }

    /// The trie holding all IPv4 networks, if IPv4 is served.
    pub fn ipv4(&self) -> Option<&PrefixTrie<Ipv4Net, T>> {
        self.v4.as_ref()
    }

    /// The trie holding all IPv6 networks, if IPv6 is served.
    pub fn ipv6(&self) -> Option<&PrefixTrie<Ipv6Net, T>> {
        self.v6.as_ref()
    }

    /// Returns the number of networks of both families.
    pub fn len(&self) -> usize {
        self.v4.as_ref().map(PrefixTrie::len).unwrap_or_default()
            + self.v6.as_ref().map(PrefixTrie::len).unwrap_or_default()
    }

    /// Returns `true` if the ranger contains no networks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all networks, first all IPv4 networks and then all IPv6 networks, each in
    /// lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (Network, &T)> + '_ {
        let v4 = self.v4.iter().flat_map(|t| t.iter()).map(|(p, v)| (Network::from(*p), v));
        let v6 = self.v6.iter().flat_map(|t| t.iter()).map(|(p, v)| (Network::from(*p), v));
        v4.chain(v6)
    }

    /// Insert a network, returning the value previously stored for exactly that network.
    pub fn insert(&mut self, network: Network, value: T) -> Result<Option<T>, Error> {
        Ok(fork!(network.split(), self.v4_mut()?, self.v6_mut()?, |t, p| t.insert(p, value)))
    }

    /// Remove exactly the given network, returning its value. Removing a network that is not
    /// present is not an error, and returns `Ok(None)`.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut ranger = Ranger::new();
    /// ranger.insert("10.0.0.0/8".parse()?, 1)?;
    /// assert_eq!(ranger.remove(&"10.0.0.0/9".parse()?)?, None);
    /// assert_eq!(ranger.remove(&"10.0.0.0/8".parse()?)?, Some(1));
    /// assert!(ranger.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn remove(&mut self, network: &Network) -> Result<Option<T>, Error> {
        Ok(fork!(network.split(), self.v4_mut()?, self.v6_mut()?, |t, p| t.remove(&p)))
    }

    /// Get the value of exactly the given network.
    pub fn get(&self, network: &Network) -> Result<Option<&T>, Error> {
        Ok(fork!(network.split(), self.v4()?, self.v6()?, |t, p| t.get(&p)))
    }

    /// Check whether any network contains the address `addr`.
    pub fn contains(&self, addr: IpAddr) -> Result<bool, Error> {
        Ok(fork!(split_addr(addr), self.v4()?, self.v6()?, |t, a| t.contains(a)))
    }

    /// Iterate over all networks that contain the address `addr`, least specific first.
    pub fn containing_networks(
        &self,
        addr: IpAddr,
    ) -> Result<impl Iterator<Item = (Network, &T)> + '_, Error> {
        Ok(fork_iter!(split_addr(addr), self.v4()?, self.v6()?, |t, a| t
            .containing_networks(a)))
    }

    /// Iterate over all networks that are equal to or more specific than `network`, in
    /// lexicographic order.
    pub fn covered_networks(
        &self,
        network: &Network,
    ) -> Result<impl Iterator<Item = (Network, &T)> + '_, Error> {
        Ok(fork_iter!(network.split(), self.v4()?, self.v6()?, |t, p| t
            .covered_networks(&p)))
    }

    /// Iterate over all networks that are equal to or less specific than `network`, least
    /// specific first.
    ///
    /// ```
    /// # use prefix_ranger::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut ranger = Ranger::new();
    /// ranger.insert("0.0.0.0/0".parse()?, 0)?;
    /// ranger.insert("192.168.1.1/32".parse()?, 1)?;
    /// assert_eq!(
    ///     ranger.covering_networks(&"192.168.0.0/16".parse()?)?.collect::<Vec<_>>(),
    ///     vec![("0.0.0.0/0".parse()?, &0)],
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn covering_networks(
        &self,
        network: &Network,
    ) -> Result<impl Iterator<Item = (Network, &T)> + '_, Error> {
        Ok(fork_iter!(network.split(), self.v4()?, self.v6()?, |t, p| t
            .covering_networks(&p)))
    }

    fn v4(&self) -> Result<&PrefixTrie<Ipv4Net, T>, Error> {
        self.v4.as_ref().ok_or_else(|| rejected(IpVersion::V4))
    }

    fn v6(&self) -> Result<&PrefixTrie<Ipv6Net, T>, Error> {
        self.v6.as_ref().ok_or_else(|| rejected(IpVersion::V6))
    }

    fn v4_mut(&mut self) -> Result<&mut PrefixTrie<Ipv4Net, T>, Error> {
        self.v4.as_mut().ok_or_else(|| rejected(IpVersion::V4))
    }

    fn v6_mut(&mut self) -> Result<&mut PrefixTrie<Ipv6Net, T>, Error> {
        self.v6.as_mut().ok_or_else(|| rejected(IpVersion::V6))
    }
}

fn rejected(found: IpVersion) -> Error {
    debug!(%found, "ranger does not serve this address family");
    Error::InvalidAddress { found }
}

fn split_addr(addr: IpAddr) -> Either<std::net::Ipv4Addr, std::net::Ipv6Addr> {
    match addr {
        IpAddr::V4(a) => Left(a),
        IpAddr::V6(a) => Right(a),
    }
}

impl<T: PartialEq> PartialEq for Ranger<T> {
    fn eq(&self, other: &Self) -> bool {
        self.v4 == other.v4 && self.v6 == other.v6
    }
}

impl<T: Eq> Eq for Ranger<T> {}

impl<T: std::fmt::Debug> std::fmt::Debug for Ranger<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<(Network, T)> for Ranger<T> {
    /// Collect networks of both families into a ranger that serves both families.
    fn from_iter<I: IntoIterator<Item = (Network, T)>>(iter: I) -> Self {
        let mut v4 = PrefixTrie::new();
        let mut v6 = PrefixTrie::new();
        for (network, value) in iter {
            match network.split() {
                Left(net) => v4.insert(net, value),
                Right(net) => v6.insert(net, value),
            };
        }
        Self {
            v4: Some(v4),
            v6: Some(v6),
        }
    }
}
