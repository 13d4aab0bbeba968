//! Network address anonymization for session and security entries.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Strip the host part of an IP address.
///
/// IPv4 keeps the first three octets, IPv6 keeps the first 48 bits.
/// Input that is not an IP address is returned unchanged.
pub fn anonymize_address(address: &str) -> String {
    match address.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => {
            let [a, b, c, _] = v4.octets();
            Ipv4Addr::new(a, b, c, 0).to_string()
        }
        Ok(IpAddr::V6(v6)) => {
            let mut octets = v6.octets();
            octets[6..].fill(0);
            Ipv6Addr::from(octets).to_string()
        }
        Err(_) => address.to_string(),
    }
}
