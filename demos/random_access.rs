use std::net::{IpAddr, Ipv4Addr};

use prefix_ranger::*;

use rand::prelude::*;

fn main() -> Result<(), Error> {
    let mut ranger = Ranger::<u32>::with_version(IpVersion::V4);

    let mut rng = thread_rng();
    let mut hits = 0usize;

    for _ in 0..1_000_000 {
        let addr = IpAddr::V4(Ipv4Addr::new(rng.gen(), rng.gen(), 0, 0));
        let network = Network::new(addr, rng.gen_range(1..=16))?;

        if rng.gen_bool(0.5) {
            let value: u32 = rng.gen::<u8>() as u32;
            ranger.insert(network, value)?;
        } else if rng.gen_bool(0.2) {
            ranger.remove(&network)?;
        } else if ranger.contains(addr)? {
            hits += ranger.covering_networks(&network)?.count();
        }
    }

    println!("{} networks, {hits} covering matches", ranger.len());
    Ok(())
}
