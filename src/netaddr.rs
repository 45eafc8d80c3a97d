/*
 *  netaddr.rs
 *
 *  mpdoled - moOde now-playing monitor
 *  (c) 2025-26 mpdoled contributors
 *
 *  Host address discovery for the idle screen
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::net::IpAddr;
use std::time::{Duration, Instant};

use local_ip_address::{list_afinet_netifas, local_ip};
use log::debug;

/// Anything that can tell us the host's address, as raw text.
///
/// The text may carry a byte-literal artifact; the layout engine cleans it.
pub trait HostAddressSource {
    fn raw_address(&mut self) -> String;
}

/// Walks the IPv4 interfaces of this machine.
#[derive(Debug, Default)]
pub struct InterfaceAddressSource;

impl HostAddressSource for InterfaceAddressSource {
    fn raw_address(&mut self) -> String {
        let interfaces = match list_afinet_netifas() {
            Ok(list) => list,
            Err(e) => {
                debug!("interface listing failed: {}", e);
                Vec::new()
            }
        };
        if let Some(ip) = pick_address(&interfaces) {
            return ip.to_string();
        }
        match local_ip() {
            Ok(ip) => ip.to_string(),
            Err(e) => {
                debug!("no routed local address: {}", e);
                String::new()
            }
        }
    }
}

fn is_wired(name: &str) -> bool {
    name.starts_with("eth") || name.starts_with("en")
}

fn is_wireless(name: &str) -> bool {
    name.starts_with("wlan") || name.starts_with("wl")
}

/// Wired first, then wireless. Loopback and IPv6 never qualify.
pub fn pick_address(interfaces: &[(String, IpAddr)]) -> Option<IpAddr> {
    let usable = |ip: &IpAddr| ip.is_ipv4() && !ip.is_loopback();
    interfaces
        .iter()
        .find(|(name, ip)| is_wired(name) && usable(ip))
        .or_else(|| interfaces.iter().find(|(name, ip)| is_wireless(name) && usable(ip)))
        .map(|(_, ip)| *ip)
}

/// Holds the last answer of an inner source for `ttl`.
pub struct CachedAddress<S> {
    inner: S,
    ttl: Duration,
    cached: Option<(Instant, String)>,
}

impl<S: HostAddressSource> CachedAddress<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self { inner, ttl, cached: None }
    }
}

impl<S: HostAddressSource> HostAddressSource for CachedAddress<S> {
    fn raw_address(&mut self) -> String {
        if let Some((at, addr)) = &self.cached {
            if at.elapsed() < self.ttl {
                return addr.clone();
            }
        }
        let fresh = self.inner.raw_address();
        self.cached = Some((Instant::now(), fresh.clone()));
        fresh
    }
}

/// Fixed address, for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAddress(pub String);

impl HostAddressSource for StaticAddress {
    fn raw_address(&mut self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn test_wired_beats_wireless() {
        let list = vec![
            ("lo".to_string(), v4(127, 0, 0, 1)),
            ("wlan0".to_string(), v4(192, 168, 1, 40)),
            ("eth0".to_string(), v4(192, 168, 1, 20)),
        ];
        assert_eq!(pick_address(&list), Some(v4(192, 168, 1, 20)));
    }

    #[test]
    fn test_wireless_when_no_wire() {
        let list = vec![
            ("lo".to_string(), v4(127, 0, 0, 1)),
            ("wlp2s0".to_string(), v4(10, 0, 0, 7)),
        ];
        assert_eq!(pick_address(&list), Some(v4(10, 0, 0, 7)));
    }

    #[test]
    fn test_loopback_only_yields_nothing() {
        let list = vec![("lo".to_string(), v4(127, 0, 0, 1)), ("docker0".to_string(), v4(172, 17, 0, 1))];
        assert_eq!(pick_address(&list), None);
    }

    struct Counting(u32);

    impl HostAddressSource for Counting {
        fn raw_address(&mut self) -> String {
            self.0 += 1;
            format!("10.0.0.{}", self.0)
        }
    }

    #[test]
    fn test_cache_holds_within_ttl() {
        let mut cached = CachedAddress::new(Counting(0), Duration::from_secs(3600));
        assert_eq!(cached.raw_address(), "10.0.0.1");
        assert_eq!(cached.raw_address(), "10.0.0.1");
    }

    #[test]
    fn test_zero_ttl_always_refreshes() {
        let mut cached = CachedAddress::new(Counting(0), Duration::ZERO);
        assert_eq!(cached.raw_address(), "10.0.0.1");
        assert_eq!(cached.raw_address(), "10.0.0.2");
    }
}
