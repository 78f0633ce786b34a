//! Local address discovery for the startup banner.

use std::net::{IpAddr, UdpSocket};

/// Public address used only to pick the outbound interface. No packet is sent.
const PROBE_ADDR: &str = "8.8.8.8:80";

/// Best guess at this host's LAN address.
///
/// "Connecting" a UDP socket only selects a route, so this works offline
/// as long as a default route exists. Returns `None` otherwise.
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(PROBE_ADDR).ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

/// Host to print in URLs: the discovered LAN address, or `fallback`.
pub fn display_host(fallback: &str) -> String {
    match local_ip() {
        Some(ip) if !ip.is_unspecified() => ip.to_string(),
        _ => fallback.to_string(),
    }
}
