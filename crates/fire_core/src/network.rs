//! LAN address discovery for the status report

use std::net::{IpAddr, Ipv4Addr};

/// Best IPv4 address for other machines on the LAN to reach us at
///
/// Falls back to loopback when no interface can be read.
pub fn lan_ipv4() -> Ipv4Addr {
    let candidates: Vec<IpAddr> = match local_ip_address::list_afinet_netifas() {
        Ok(interfaces) => interfaces.into_iter().map(|(_, ip)| ip).collect(),
        Err(e) => {
            tracing::debug!("Cannot enumerate network interfaces: {}", e);
            Vec::new()
        }
    };

    pick_lan_ipv4(&candidates)
}

/// Prefer a `192.168.*` address, then any non-loopback IPv4, then loopback
pub fn pick_lan_ipv4(candidates: &[IpAddr]) -> Ipv4Addr {
    let v4: Vec<Ipv4Addr> = candidates
        .iter()
        .filter_map(|ip| match ip {
            IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(*v4),
            _ => None,
        })
        .collect();

    v4.iter()
        .find(|ip| matches!(ip.octets(), [192, 168, _, _]))
        .or_else(|| v4.first())
        .copied()
        .unwrap_or(Ipv4Addr::LOCALHOST)
}

/// `ip:port`, taking the port from the listen address
pub fn reachable_address(ip: &str, listen_addr: &str) -> String {
    match listen_addr.rsplit_once(':') {
        Some((_, port)) if !port.is_empty() => format!("{ip}:{port}"),
        _ => ip.to_string(),
    }
}
