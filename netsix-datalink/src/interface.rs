//! Network interface discovery

use netsix_core::{Error, LinkAddr, Result};
use netsix_packet::addrs::is_link_local;
use std::fmt;
use std::net::Ipv6Addr;

/// Network interface
#[derive(Debug, Clone)]
pub struct NetInterface {
    /// Interface name (e.g., "eth0", "en0")
    pub name: String,
    /// Interface index
    pub index: u32,
    /// Link-layer address
    pub link_addr: LinkAddr,
    /// MTU (Maximum Transmission Unit)
    pub mtu: u32,
    /// Is interface up?
    pub is_up: bool,
}

impl NetInterface {
    /// Look an interface up by name
    pub fn by_name(name: &str) -> Result<Self> {
        pnet_datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == name)
            .map(Self::from_pnet)
            .ok_or_else(|| Error::interface(format!("interface {} not found", name)))
    }

    /// List all interfaces on the host
    pub fn list_all() -> Vec<Self> {
        pnet_datalink::interfaces()
            .into_iter()
            .map(Self::from_pnet)
            .collect()
    }

    fn from_pnet(iface: pnet_datalink::NetworkInterface) -> Self {
        let link_addr = iface
            .mac
            .map(|mac| LinkAddr::new([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]))
            .unwrap_or_else(LinkAddr::zero);
        let is_up = iface.is_up();
        NetInterface {
            name: iface.name,
            index: iface.index,
            link_addr,
            mtu: 1500, // pnet does not expose the real MTU
            is_up,
        }
    }

    /// IPv6 addresses currently assigned to this interface
    pub fn ipv6_addrs(&self) -> Vec<Ipv6Addr> {
        match pnet_datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == self.name)
        {
            Some(iface) => iface
                .ips
                .into_iter()
                .filter_map(|net| match net {
                    ipnetwork::IpNetwork::V6(v6) => Some(v6.ip()),
                    ipnetwork::IpNetwork::V4(_) => None,
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// The interface's link-local address, if one is assigned
    pub fn link_local_addr(&self) -> Option<Ipv6Addr> {
        self.ipv6_addrs().into_iter().find(|addr| is_link_local(*addr))
    }
}

impl fmt::Display for NetInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}), MTU: {}", self.name, self.link_addr, self.mtu)
    }
}
