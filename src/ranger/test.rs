use std::net::IpAddr;

use pretty_assertions::assert_eq;

use super::*;
use crate::{next_addr, previous_addr};

fn net(s: &str) -> Network {
    s.parse().unwrap()
}

fn addr(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn ranger(networks: &[&str]) -> Ranger<usize> {
    networks
        .iter()
        .enumerate()
        .map(|(i, n)| (net(n), i))
        .collect()
}

fn keys<'a>(iter: impl Iterator<Item = (Network, &'a usize)>) -> Vec<Network> {
    iter.map(|(n, _)| n).collect()
}

fn nets(networks: &[&str]) -> Vec<Network> {
    networks.iter().map(|n| net(n)).collect()
}

#[test]
fn dispatch_by_family() {
    let r = ranger(&["192.168.0.0/24", "2001:db8::/32", "0.0.0.0/0", "::/0"]);
    assert_eq!(r.len(), 4);
    assert_eq!(r.ipv4().map(PrefixTrie::len), Some(2));
    assert_eq!(r.ipv6().map(PrefixTrie::len), Some(2));
    assert_eq!(
        keys(r.iter()),
        nets(&["0.0.0.0/0", "192.168.0.0/24", "::/0", "2001:db8::/32"])
    );

    assert_eq!(
        keys(r.containing_networks(addr("192.168.0.1")).unwrap()),
        nets(&["0.0.0.0/0", "192.168.0.0/24"])
    );
    assert_eq!(
        keys(r.containing_networks(addr("2001:db8::1")).unwrap()),
        nets(&["::/0", "2001:db8::/32"])
    );
    // the IPv4 default route does not cover IPv6.
    assert_eq!(
        keys(r.covering_networks(&net("2001:db8:1::/48")).unwrap()),
        nets(&["::/0", "2001:db8::/32"])
    );
    assert_eq!(
        keys(r.covered_networks(&net("0.0.0.0/0")).unwrap()),
        nets(&["0.0.0.0/0", "192.168.0.0/24"])
    );
}

#[test]
fn insert_get_remove() {
    let mut r = Ranger::new();
    assert!(r.is_empty());
    assert_eq!(r.insert(net("10.0.0.0/8"), 1), Ok(None));
    assert_eq!(r.insert(net("10.0.0.1/8"), 2), Ok(Some(1)));
    assert_eq!(r.insert(net("fd00::/8"), 3), Ok(None));
    assert_eq!(r.len(), 2);

    assert_eq!(r.get(&net("10.0.0.0/8")), Ok(Some(&2)));
    assert_eq!(r.get(&net("10.0.0.0/9")), Ok(None));
    assert_eq!(r.get(&net("fd00::/8")), Ok(Some(&3)));

    assert_eq!(r.remove(&net("fd00::/9")), Ok(None));
    assert_eq!(r.remove(&net("fd00::/8")), Ok(Some(3)));
    assert_eq!(r.remove(&net("10.0.0.0/8")), Ok(Some(2)));
    assert!(r.is_empty());
    assert_eq!(r, Ranger::new());
}

#[test]
fn contains_across_families() {
    let r = ranger(&["192.168.0.0/24", "128.168.0.0/24", "a::1/128"]);
    for (start, end) in [
        ("192.168.0.0", "192.168.0.255"),
        ("128.168.0.0", "128.168.0.255"),
    ] {
        let (start, end) = (addr(start), addr(end));
        let mut cur = start;
        loop {
            assert!(r.contains(cur).unwrap(), "{cur} is not contained");
            if cur == end {
                break;
            }
            cur = next_addr(cur).unwrap();
        }
        assert!(!r.contains(previous_addr(start).unwrap()).unwrap());
        assert!(!r.contains(next_addr(end).unwrap()).unwrap());
    }
    assert!(r.contains(addr("a::1")).unwrap());
    assert!(!r.contains(addr("a::2")).unwrap());
    assert!(!r.contains(addr("::ffff:192.168.0.1")).unwrap());
}

#[test]
fn single_family() {
    let mut r = Ranger::with_version(IpVersion::V6);
    assert!(r.supports(IpVersion::V6));
    assert!(!r.supports(IpVersion::V4));
    assert!(r.ipv4().is_none());

    let rejected = Error::InvalidAddress {
        found: IpVersion::V4,
    };
    assert_eq!(r.insert(net("10.0.0.0/8"), 1).unwrap_err(), rejected);
    assert_eq!(r.remove(&net("10.0.0.0/8")).unwrap_err(), rejected);
    assert_eq!(r.get(&net("10.0.0.0/8")).unwrap_err(), rejected);
    assert_eq!(r.contains(addr("10.0.0.1")).unwrap_err(), rejected);
    assert!(r.containing_networks(addr("10.0.0.1")).is_err());
    assert!(r.covered_networks(&net("10.0.0.0/8")).is_err());
    assert!(r.covering_networks(&net("10.0.0.0/8")).is_err());

    assert_eq!(r.insert(net("2001:db8::/32"), 2), Ok(None));
    assert_eq!(r.len(), 1);
    assert_eq!(r.contains(addr("2001:db8::1")), Ok(true));
}

#[test]
fn rejected_family_message() {
    let err = Ranger::<()>::with_version(IpVersion::V4)
        .contains(addr("::1"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "IPv6 address does not match the address family of the ranger"
    );
}

#[test]
fn covered_and_covering() {
    let r = ranger(&[
        "0.0.0.0/0",
        "192.168.0.0/24",
        "192.168.1.1/32",
        "10.1.0.0/16",
        "10.1.1.0/24",
    ]);
    assert_eq!(
        keys(r.covered_networks(&net("192.168.0.0/16")).unwrap()),
        nets(&["192.168.0.0/24", "192.168.1.1/32"])
    );
    assert_eq!(
        keys(r.covering_networks(&net("192.168.0.0/16")).unwrap()),
        nets(&["0.0.0.0/0"])
    );
    assert_eq!(
        keys(r.covering_networks(&net("10.1.1.128/25")).unwrap()),
        nets(&["0.0.0.0/0", "10.1.0.0/16", "10.1.1.0/24"])
    );
    assert_eq!(
        keys(r.covered_networks(&net("10.0.0.0/8")).unwrap()),
        nets(&["10.1.0.0/16", "10.1.1.0/24"])
    );
}

#[test]
fn values_follow_networks() {
    let r = ranger(&["10.0.0.0/8", "10.1.0.0/16"]);
    assert_eq!(
        r.containing_networks(addr("10.1.2.3"))
            .unwrap()
            .collect::<Vec<_>>(),
        vec![(net("10.0.0.0/8"), &0), (net("10.1.0.0/16"), &1)]
    );
}

#[test]
fn debug() {
    let r = ranger(&["10.0.0.0/8", "::1/128"]);
    assert_eq!(format!("{r:?}"), "{10.0.0.0/8: 0, ::1/128: 1}");
}

#[test]
fn collect_mixed_families() {
    let r: Ranger<&str> = [
        (net("10.0.0.0/8"), "a"),
        (net("2001:db8::/32"), "b"),
        (net("10.0.0.9/8"), "c"),
        (net("10.1.0.0/16"), "d"),
    ]
    .into_iter()
    .collect();
    assert!(r.supports(IpVersion::V4) && r.supports(IpVersion::V6));
    assert_eq!(r.len(), 3);
    assert_eq!(r.ipv4().map(PrefixTrie::len), Some(2));
    assert_eq!(r.ipv6().map(PrefixTrie::len), Some(1));
    // the later value for the same network wins.
    assert_eq!(r.get(&net("10.0.0.0/8")), Ok(Some(&"c")));
    assert_eq!(r.get(&net("2001:db8::/32")), Ok(Some(&"b")));

    let mut inserted = Ranger::new();
    for (n, v) in [("10.0.0.0/8", "c"), ("2001:db8::/32", "b"), ("10.1.0.0/16", "d")] {
        inserted.insert(net(n), v).unwrap();
    }
    assert_eq!(r, inserted);
}
