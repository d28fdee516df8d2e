//! Address arithmetic over both IP families.
//!
//! IPv4 addresses are treated as big-endian `u32` values and wrap modulo
//! 2^32. IPv6 addresses are treated as big-endian `u128` values and never
//! wrap: [`add_delta`] clamps at the ends of the address space, while
//! [`checked_add_delta`] reports leaving the space as `None`.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::IpNet;

/// Adds a signed offset to an address, keeping its family.
///
/// IPv4 results wrap modulo 2^32. IPv6 results that would leave the 128-bit
/// space are clamped to `::` or `ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff`;
/// a clamped value is not the real sum. Use [`checked_add_delta`] when the
/// caller needs to know that happened.
///
/// ```
/// use std::net::IpAddr;
/// use leasealloc::address::{add_delta, checked_add_delta};
///
/// let top: IpAddr = "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff".parse().unwrap();
/// assert_eq!(add_delta(top, 1), top);
/// assert_eq!(checked_add_delta(top, 1), None);
/// ```
///
/// ```
/// use std::net::IpAddr;
/// use leasealloc::address::add_delta;
///
/// let ip: IpAddr = "192.168.1.1".parse().unwrap();
/// assert_eq!(add_delta(ip, 255), "192.168.2.0".parse::<IpAddr>().unwrap());
/// ```
pub fn add_delta(address: IpAddr, delta: i64) -> IpAddr {
    match address {
        IpAddr::V4(v4) => IpAddr::V4(ipv4_add(v4, delta)),
        IpAddr::V6(v6) => IpAddr::V6(ipv6_add(v6, delta)),
    }
}

/// Like [`add_delta`], but returns `None` if the result falls outside the
/// family's address space instead of wrapping or clamping.
pub fn checked_add_delta(address: IpAddr, delta: i64) -> Option<IpAddr> {
    match address {
        IpAddr::V4(v4) => {
            let value = i64::from(u32::from(v4)).checked_add(delta)?;
            u32::try_from(value).ok().map(|v| IpAddr::V4(Ipv4Addr::from(v)))
        }
        IpAddr::V6(v6) => u128::from(v6)
            .checked_add_signed(i128::from(delta))
            .map(|v| IpAddr::V6(Ipv6Addr::from(v))),
    }
}

fn ipv4_add(address: Ipv4Addr, delta: i64) -> Ipv4Addr {
    // Truncating the delta is exact modulo 2^32.
    Ipv4Addr::from(u32::from(address).wrapping_add(delta as u32))
}

fn ipv6_add(address: Ipv6Addr, delta: i64) -> Ipv6Addr {
    let value = u128::from(address);
    let sum = value.checked_add_signed(i128::from(delta)).unwrap_or(if delta < 0 {
        u128::MIN
    } else {
        u128::MAX
    });
    Ipv6Addr::from(sum)
}

/// Number of addresses an allocator can hand out from `network`.
///
/// The base address itself is never assigned since the forward probe starts
/// one past it. Saturates at `u128::MAX` for a `::/0` network.
pub fn host_capacity(network: &IpNet) -> u128 {
    let host_bits = u32::from(network.max_prefix_len() - network.prefix_len());
    let size = 1u128.checked_shl(host_bits).unwrap_or(0);
    if size == 0 { u128::MAX } else { size - 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(text: &str) -> IpAddr {
        text.parse().unwrap()
    }

    #[test]
    fn test_ipv4_add() {
        let cases = [
            ("192.168.1.1", 1, "192.168.1.2"),
            ("192.168.1.1", 11, "192.168.1.12"),
            ("192.168.1.1", 255, "192.168.2.0"),
            ("192.168.1.1", 256, "192.168.2.1"),
            ("192.168.2.0", -1, "192.168.1.255"),
        ];
        for (start, delta, want) in cases {
            assert_eq!(add_delta(ip(start), delta), ip(want), "{} + {}", start, delta);
        }
    }

    #[test]
    fn test_ipv4_wraps() {
        assert_eq!(add_delta(ip("255.255.255.255"), 1), ip("0.0.0.0"));
        assert_eq!(add_delta(ip("0.0.0.0"), -1), ip("255.255.255.255"));
        assert_eq!(add_delta(ip("10.0.0.1"), 1 << 32), ip("10.0.0.1"));
    }

    #[test]
    fn test_ipv6_add() {
        assert_eq!(add_delta(ip("::1"), 1), ip("::2"));
        assert_eq!(add_delta(ip("fd00::ffff"), 1), ip("fd00::1:0"));
        assert_eq!(add_delta(ip("fd00::1:0"), -1), ip("fd00::ffff"));
        assert_eq!(
            add_delta(ip("::ffff:ffff:ffff:ffff"), 1),
            ip("0:0:0:1::")
        );
    }

    #[test]
    fn test_ipv6_does_not_wrap() {
        let max = ip("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff");
        assert_eq!(add_delta(max, 1), max);
        assert_eq!(add_delta(ip("::"), -1), ip("::"));
    }

    #[test]
    fn test_checked_add_delta() {
        assert_eq!(checked_add_delta(ip("10.0.0.1"), 1), Some(ip("10.0.0.2")));
        assert_eq!(checked_add_delta(ip("255.255.255.255"), 1), None);
        assert_eq!(checked_add_delta(ip("0.0.0.0"), -1), None);
        assert_eq!(checked_add_delta(ip("::1"), 1), Some(ip("::2")));
        assert_eq!(
            checked_add_delta(ip("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"), 1),
            None
        );
        assert_eq!(checked_add_delta(ip("::"), -1), None);
    }

    #[test]
    fn test_host_capacity() {
        assert_eq!(host_capacity(&"127.0.0.0/30".parse().unwrap()), 3);
        assert_eq!(host_capacity(&"192.168.1.0/24".parse().unwrap()), 255);
        assert_eq!(host_capacity(&"10.0.0.1/32".parse().unwrap()), 0);
        assert_eq!(host_capacity(&"0.0.0.0/0".parse().unwrap()), u32::MAX as u128);
        assert_eq!(host_capacity(&"fd00::/120".parse().unwrap()), 255);
        assert_eq!(host_capacity(&"::/0".parse().unwrap()), u128::MAX);
    }
}
