//! Ethernet link endpoint
//!
//! Bridges the engine onto a pnet datalink channel: every outgoing
//! packet picks up its IPv6 header and Ethernet framing here.

use crate::interface::NetInterface;
use netsix_core::{Error, LinkAddr, LinkEndpoint, PacketParams, RecvBuffer, Result, Route};
use netsix_packet::addrs::ethernet_multicast;
use netsix_packet::ethernet::{EtherType, EthernetFrame};
use netsix_packet::ipv6::{Ipv6HeaderBuilder, IPV6_HEADER_SIZE, MAX_PAYLOAD_SIZE};
use pnet_datalink::{Channel, DataLinkSender};
use std::sync::Mutex;
use tracing::trace;

/// Build the on-wire frame for one IPv6 packet
fn serialize_frame(
    source_link: LinkAddr,
    route: &Route,
    params: PacketParams,
    header: &[u8],
    payload: &RecvBuffer,
) -> Result<Vec<u8>> {
    let destination_link = match route.remote_link_addr {
        Some(addr) => addr,
        // Multicast destinations map to a link address without any
        // resolution exchange (RFC 2464 §7).
        None if route.remote_addr.is_multicast() => ethernet_multicast(route.remote_addr),
        None => {
            return Err(Error::transmit(format!(
                "no link address for {}",
                route.remote_addr
            )))
        }
    };

    let length = header.len() + payload.len();
    if length > MAX_PAYLOAD_SIZE as usize {
        return Err(Error::transmit("payload exceeds the IPv6 maximum"));
    }

    let ip_header = Ipv6HeaderBuilder::new(
        route.local_addr,
        route.remote_addr,
        params.protocol,
        length as u16,
    )
    .with_hop_limit(params.hop_limit)
    .with_traffic_class(params.traffic_class)
    .build();

    let mut ip_packet = Vec::with_capacity(IPV6_HEADER_SIZE + length);
    ip_packet.extend_from_slice(&ip_header);
    ip_packet.extend_from_slice(header);
    for segment in payload.segments() {
        ip_packet.extend_from_slice(segment);
    }

    let frame = EthernetFrame::new(destination_link, source_link, EtherType::IPv6, ip_packet);
    Ok(frame.to_bytes())
}

/// A send-only Ethernet attachment to one host interface
pub struct EthernetLink {
    interface: NetInterface,
    sender: Mutex<Box<dyn DataLinkSender>>,
}

impl EthernetLink {
    /// Open a datalink channel on `interface`
    pub fn open(interface: NetInterface) -> Result<Self> {
        let pnet_iface = pnet_datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == interface.name)
            .ok_or_else(|| Error::interface(format!("interface {} not found", interface.name)))?;

        let (tx, _rx) = match pnet_datalink::channel(&pnet_iface, Default::default()) {
            Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => return Err(Error::interface("unsupported channel type")),
            Err(err) => return Err(Error::interface(format!("failed to open channel: {}", err))),
        };

        Ok(EthernetLink {
            interface,
            sender: Mutex::new(tx),
        })
    }

    /// Look the interface up by name and open it
    pub fn open_by_name(name: &str) -> Result<Self> {
        Self::open(NetInterface::by_name(name)?)
    }

    /// The interface this link sends on
    pub fn interface(&self) -> &NetInterface {
        &self.interface
    }
}

impl LinkEndpoint for EthernetLink {
    fn link_address(&self) -> LinkAddr {
        self.interface.link_addr
    }

    fn max_header_length(&self) -> usize {
        EthernetFrame::HEADER_SIZE + IPV6_HEADER_SIZE
    }

    fn write_packet(
        &self,
        route: &Route,
        params: PacketParams,
        header: &[u8],
        payload: &RecvBuffer,
    ) -> Result<()> {
        let frame = serialize_frame(self.interface.link_addr, route, params, header, payload)?;

        let mut sender = self.sender.lock().unwrap();
        match sender.send_to(&frame, None) {
            Some(Ok(())) => {
                trace!(remote = %route.remote_addr, len = frame.len(), "frame sent");
                Ok(())
            }
            Some(Err(err)) => Err(err.into()),
            None => Err(Error::transmit("datalink sender closed")),
        }
    }
}
