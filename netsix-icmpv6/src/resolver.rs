//! Link address resolution over Neighbor Discovery

use netsix_core::{
    LinkAddr, LinkAddressResolver, LinkEndpoint, PacketParams, RecvBuffer, Result, Route,
};
use netsix_packet::addrs::{ethernet_multicast, solicited_node_multicast};
use netsix_packet::checksum::icmpv6_checksum;
use netsix_packet::icmpv6::set_checksum;
use netsix_packet::ndp::{NeighborSolicitBuilder, NDP_HOP_LIMIT};
use std::net::Ipv6Addr;
use tracing::trace;

/// Resolves IPv6 addresses to link addresses with Neighbor Discovery
///
/// Stateless: it emits one solicitation per request and answers
/// multicast lookups without touching the wire. Retry, backoff, and
/// cache policy stay with the neighbor table that calls it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NdpResolver;

impl NdpResolver {
    pub fn new() -> Self {
        NdpResolver
    }
}

impl LinkAddressResolver for NdpResolver {
    fn request_link_address(
        &self,
        target_addr: Ipv6Addr,
        local_addr: Ipv6Addr,
        known_link_addr: Option<LinkAddr>,
        link: &dyn LinkEndpoint,
    ) -> Result<()> {
        let snaddr = solicited_node_multicast(target_addr);
        // A stale cached link address still narrows the solicitation to
        // one receiver; without it the solicited-node group is used.
        let remote_link_addr = known_link_addr.unwrap_or_else(|| ethernet_multicast(snaddr));
        let route = Route::new(local_addr, link.link_address(), snaddr)
            .with_remote_link_addr(remote_link_addr);

        let mut message = NeighborSolicitBuilder::new(target_addr)
            .with_source_link_addr(link.link_address())
            .build();
        let checksum = icmpv6_checksum(
            &message,
            &route.local_addr,
            &route.remote_addr,
            &RecvBuffer::default(),
        );
        set_checksum(&mut message, checksum);

        trace!(%target_addr, "soliciting link address");
        link.write_packet(
            &route,
            PacketParams::icmpv6(NDP_HOP_LIMIT),
            &message,
            &RecvBuffer::default(),
        )
    }

    fn resolve_static_address(&self, addr: Ipv6Addr) -> Option<LinkAddr> {
        if addr.is_multicast() {
            Some(ethernet_multicast(addr))
        } else {
            None
        }
    }
}
