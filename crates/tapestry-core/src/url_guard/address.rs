//! Classification of resolved socket addresses.
//!
//! The literal denylist only sees what the URL spells out. These checks run on
//! the addresses a hostname actually resolves to, right before connecting.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// True if `addr` points at loopback, private, link-local, unique-local,
/// shared (CGNAT), broadcast, or unspecified space. IPv4-mapped IPv6
/// addresses are judged by their IPv4 form.
pub fn is_internal_addr(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_internal_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_internal_v4(v4),
            None => is_internal_v6(v6),
        },
    }
}

fn is_internal_v4(v4: Ipv4Addr) -> bool {
    let [a, b, _, _] = v4.octets();
    v4.is_loopback()
        || v4.is_private()
        || v4.is_link_local()
        || v4.is_unspecified()
        || v4.is_broadcast()
        // 100.64.0.0/10
        || (a == 100 && (b & 0xc0) == 64)
        // 0.0.0.0/8
        || a == 0
}

fn is_internal_v6(v6: Ipv6Addr) -> bool {
    let first = v6.segments()[0];
    v6.is_loopback()
        || v6.is_unspecified()
        // fc00::/7
        || (first & 0xfe00) == 0xfc00
        // fe80::/10
        || (first & 0xffc0) == 0xfe80
}
