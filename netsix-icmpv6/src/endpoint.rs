//! ICMPv6 endpoint: message dispatch, error-to-transport control
//! delivery, and echo replies
//!
//! The endpoint receives ICMPv6 datagrams the IPv6 layer has already
//! demultiplexed, validates them, and either answers on the wire, feeds
//! the neighbor state machines, or hands control information up to the
//! transport layer. Every invalid inbound message is recovered locally
//! as a silent drop plus a counter increment; nothing propagates back
//! to the caller.

use crate::stats::Icmpv6Stats;
use netsix_core::types::ip_proto;
use netsix_core::{
    ControlKind, LinkEndpoint, NicId, NudController, PacketParams, RecvBuffer, Route,
    StackContext, TransportDispatcher,
};
use netsix_packet::checksum::{icmpv6_checksum, verify_icmpv6_checksum};
use netsix_packet::icmpv6::{
    dst_unreachable, set_checksum, Icmpv6Message, Icmpv6Type, DST_UNREACHABLE_MIN_SIZE,
    ECHO_MIN_SIZE, ICMPV6_MIN_SIZE, PACKET_TOO_BIG_MIN_SIZE,
};
use netsix_packet::ipv6::{
    FragmentHeader, Ipv6Header, FRAGMENT_HEADER_SIZE, IPV6_HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
use netsix_packet::ndp::NDP_HOP_LIMIT;
use std::net::Ipv6Addr;
use std::sync::Arc;
use tracing::{debug, trace};

/// Admissibility gate shared by all NDP message types: hop limit 255,
/// code zero, and no fragment header on the enclosing packet
/// (RFC 4861 and RFC 6980 §5).
fn is_ndp_valid(hop_limit: u8, code: u8, has_fragment_header: bool) -> bool {
    !has_fragment_header && hop_limit == NDP_HOP_LIMIT && code == 0
}

/// Usable payload MTU from a Packet Too Big message: the advertised
/// link MTU minus the fixed IPv6 header, capped at the maximum payload
/// size.
fn payload_mtu(link_mtu: u32) -> u32 {
    link_mtu.saturating_sub(IPV6_HEADER_SIZE as u32).min(MAX_PAYLOAD_SIZE)
}

/// One interface's ICMPv6 endpoint
///
/// Owns no shared state: address ownership, neighbor reachability,
/// transport demux, and the wire all live behind collaborator handles.
/// Handlers may run concurrently; the endpoint itself takes no locks.
pub struct Icmpv6Endpoint {
    pub(crate) nic: NicId,
    pub(crate) local_addr: Ipv6Addr,
    pub(crate) stack: Arc<dyn StackContext>,
    pub(crate) nud: Arc<dyn NudController>,
    pub(crate) transport: Arc<dyn TransportDispatcher>,
    pub(crate) link: Arc<dyn LinkEndpoint>,
    pub(crate) stats: Arc<Icmpv6Stats>,
}

impl Icmpv6Endpoint {
    /// Create an endpoint for `nic`, bound to `local_addr`
    pub fn new(
        nic: NicId,
        local_addr: Ipv6Addr,
        stack: Arc<dyn StackContext>,
        nud: Arc<dyn NudController>,
        transport: Arc<dyn TransportDispatcher>,
        link: Arc<dyn LinkEndpoint>,
        stats: Arc<Icmpv6Stats>,
    ) -> Self {
        Icmpv6Endpoint {
            nic,
            local_addr,
            stack,
            nud,
            transport,
            link,
            stats,
        }
    }

    /// Interface this endpoint serves
    pub fn nic(&self) -> NicId {
        self.nic
    }

    /// Unicast address this endpoint is bound to
    pub fn local_addr(&self) -> Ipv6Addr {
        self.local_addr
    }

    /// Statistics block shared with the surrounding stack
    pub fn stats(&self) -> &Icmpv6Stats {
        &self.stats
    }

    /// Process one inbound ICMPv6 datagram
    ///
    /// `data` starts at the ICMPv6 header; the message header and any
    /// fixed body must lie in the first segment. `hop_limit` and
    /// `has_fragment_header` describe the enclosing IPv6 packet.
    pub fn handle_packet(
        &self,
        route: &Route,
        hop_limit: u8,
        mut data: RecvBuffer,
        has_fragment_header: bool,
    ) {
        let received = &self.stats.received;

        // The checksum covers the first segment as the message plus all
        // segments after it as payload.
        let rest = {
            let mut rest = data.clone();
            rest.remove_first();
            rest
        };

        let first = data.first();
        if first.len() < ICMPV6_MIN_SIZE {
            received.invalid.increment();
            return;
        }
        if !verify_icmpv6_checksum(first, &route.remote_addr, &route.local_addr, &rest) {
            debug!(remote = %route.remote_addr, "ICMPv6 checksum mismatch");
            received.invalid.increment();
            return;
        }

        let msg = match Icmpv6Message::parse(first) {
            Ok(msg) => msg,
            Err(_) => {
                received.invalid.increment();
                return;
            }
        };
        let ndp_valid = is_ndp_valid(hop_limit, msg.code(), has_fragment_header);

        match Icmpv6Type::from_u8(msg.msg_type()) {
            Some(Icmpv6Type::PacketTooBig) => {
                received.packet_too_big.increment();
                if first.len() < PACKET_TOO_BIG_MIN_SIZE {
                    received.invalid.increment();
                    return;
                }
                let mtu = payload_mtu(msg.mtu());
                data.trim_front(PACKET_TOO_BIG_MIN_SIZE);
                self.handle_control(ControlKind::PacketTooBig, mtu, data);
            }
            Some(Icmpv6Type::DestinationUnreachable) => {
                received.dst_unreachable.increment();
                if first.len() < DST_UNREACHABLE_MIN_SIZE {
                    received.invalid.increment();
                    return;
                }
                let code = msg.code();
                data.trim_front(DST_UNREACHABLE_MIN_SIZE);
                // Other codes are counted and otherwise ignored.
                if code == dst_unreachable::PORT_UNREACHABLE {
                    self.handle_control(ControlKind::PortUnreachable, 0, data);
                }
            }
            Some(Icmpv6Type::TimeExceeded) => {
                received.time_exceeded.increment();
            }
            Some(Icmpv6Type::ParameterProblem) => {
                received.param_problem.increment();
            }
            Some(Icmpv6Type::EchoRequest) => {
                received.echo_request.increment();
                if first.len() < ECHO_MIN_SIZE {
                    received.invalid.increment();
                    return;
                }
                let mut reply_header = [0u8; ECHO_MIN_SIZE];
                reply_header.copy_from_slice(&first[..ECHO_MIN_SIZE]);
                data.trim_front(ECHO_MIN_SIZE);
                self.send_echo_reply(route, reply_header, data);
            }
            Some(Icmpv6Type::EchoReply) => {
                received.echo_reply.increment();
                if first.len() < ECHO_MIN_SIZE {
                    received.invalid.increment();
                    return;
                }
                self.transport
                    .deliver_transport_packet(route, ip_proto::ICMPV6, data);
            }
            Some(Icmpv6Type::NeighborSolicitation) => {
                received.neighbor_solicit.increment();
                self.handle_neighbor_solicit(route, msg.body(), ndp_valid);
            }
            Some(Icmpv6Type::NeighborAdvertisement) => {
                received.neighbor_advert.increment();
                self.handle_neighbor_advert(msg.body(), ndp_valid);
            }
            Some(Icmpv6Type::RouterSolicitation) => {
                received.router_solicit.increment();
                self.handle_router_solicit(route, msg.body(), ndp_valid);
            }
            Some(Icmpv6Type::RouterAdvertisement) => {
                received.router_advert.increment();
                self.handle_router_advert(route, msg.body(), ndp_valid);
            }
            Some(Icmpv6Type::Redirect) => {
                received.redirect.increment();
                // Validation of the redirect itself is deferred to the
                // routing layer.
                if !ndp_valid {
                    received.invalid.increment();
                }
            }
            None => {
                trace!(msg_type = msg.msg_type(), "unhandled ICMPv6 type");
                received.invalid.increment();
            }
        }
    }

    /// Answer an Echo Request: same identifier, sequence, and payload,
    /// sent with the route's default hop limit
    fn send_echo_reply(&self, route: &Route, mut reply_header: [u8; ECHO_MIN_SIZE], payload: RecvBuffer) {
        reply_header[0] = Icmpv6Type::EchoReply.to_u8();
        let checksum = icmpv6_checksum(
            &reply_header,
            &route.local_addr,
            &route.remote_addr,
            &payload,
        );
        set_checksum(&mut reply_header, checksum);

        let params = PacketParams::icmpv6(route.default_ttl);
        match self.link.write_packet(route, params, &reply_header, &payload) {
            Ok(()) => {
                trace!(remote = %route.remote_addr, "sent echo reply");
                self.stats.sent.echo_reply.increment();
            }
            Err(err) => {
                debug!(%err, "echo reply transmit failed");
                self.stats.sent.dropped.increment();
            }
        }
    }

    /// Map an ICMPv6 error back to the transport endpoint that sent the
    /// packet embedded in it
    ///
    /// `data` starts at the embedded packet's IPv6 header. The walk
    /// stops silently when the embedded packet is not ours, is too
    /// short to identify, or is a non-first fragment.
    fn handle_control(&self, kind: ControlKind, extra: u32, mut data: RecvBuffer) {
        let (source, destination, next_header) = {
            let first = data.first();
            let iph = match Ipv6Header::parse(first) {
                Ok(iph) => iph,
                Err(_) => return,
            };
            (iph.source(), iph.destination(), iph.next_header())
        };

        // Errors map to a transport endpoint only for packets this
        // endpoint sourced.
        if source != self.local_addr {
            return;
        }
        data.trim_front(IPV6_HEADER_SIZE);

        let mut protocol = next_header;
        if protocol == ip_proto::FRAGMENT {
            let (fragment_proto, offset) = {
                let first = data.first();
                let fragment = match FragmentHeader::parse(first) {
                    Ok(fragment) => fragment,
                    Err(_) => return,
                };
                (fragment.next_header(), fragment.fragment_offset())
            };
            // Only the first fragment carries the transport header.
            if offset != 0 {
                return;
            }
            data.trim_front(FRAGMENT_HEADER_SIZE);
            protocol = fragment_proto;
        }

        trace!(?kind, %destination, "delivering control packet");
        self.transport
            .deliver_control_packet(self.local_addr, destination, protocol, kind, extra, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;
    use bytes::Bytes;
    use netsix_packet::ipv6::Ipv6HeaderBuilder;

    fn embedded_ipv6(src: Ipv6Addr, dst: Ipv6Addr, next_header: u8, payload: &[u8]) -> Vec<u8> {
        let header = Ipv6HeaderBuilder::new(src, dst, next_header, payload.len() as u16).build();
        let mut packet = header.to_vec();
        packet.extend_from_slice(payload);
        packet
    }

    #[test]
    fn test_ndp_gate() {
        assert!(is_ndp_valid(255, 0, false));
        assert!(!is_ndp_valid(254, 0, false));
        assert!(!is_ndp_valid(255, 1, false));
        assert!(!is_ndp_valid(255, 0, true));
    }

    #[test]
    fn test_payload_mtu() {
        assert_eq!(payload_mtu(1500), 1460);
        assert_eq!(payload_mtu(40), 0);
        assert_eq!(payload_mtu(20), 0);
        assert_eq!(payload_mtu(1_000_000), 65535);
    }

    #[test]
    fn test_short_message_dropped() {
        let te = TestEndpoint::new();
        let route = te.route();
        te.deliver_raw(&route, 255, RecvBuffer::from(vec![128u8, 0, 0]), false);

        assert_eq!(te.stats.received.invalid.get(), 1);
        assert_eq!(te.stats.received.echo_request.get(), 0);
        assert!(te.link.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_checksum_mismatch_dropped() {
        let te = TestEndpoint::new();
        let route = te.route();
        let mut message = vec![128u8, 0, 0, 0, 0x12, 0x34, 0, 7];
        let checksum = icmpv6_checksum(
            &message,
            &route.remote_addr,
            &route.local_addr,
            &RecvBuffer::default(),
        );
        set_checksum(&mut message, checksum ^ 0x00ff);
        te.deliver_raw(&route, 64, RecvBuffer::from(message), false);

        // Dropped before any type-specific interpretation.
        assert_eq!(te.stats.received.invalid.get(), 1);
        assert_eq!(te.stats.received.echo_request.get(), 0);
        assert!(te.link.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_type_invalid() {
        let te = TestEndpoint::new();
        let route = te.route();
        te.deliver(&route, vec![100u8, 0, 0, 0, 0, 0, 0, 0]);

        assert_eq!(te.stats.received.invalid.get(), 1);
    }

    #[test]
    fn test_echo_request_reply() {
        let te = TestEndpoint::new();
        let route = te.route();
        let mut message = vec![128u8, 0, 0, 0, 0x12, 0x34, 0x00, 0x07];
        message.extend_from_slice(b"ping");
        te.deliver(&route, message);

        assert_eq!(te.stats.received.echo_request.get(), 1);
        assert_eq!(te.stats.sent.echo_reply.get(), 1);

        let sent = te.link.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let reply = &sent[0];
        assert_eq!(reply.header[0], 129);
        assert_eq!(&reply.header[4..8], &[0x12, 0x34, 0x00, 0x07]);
        assert_eq!(reply.payload, b"ping");
        assert_eq!(reply.params.protocol, ip_proto::ICMPV6);
        assert_eq!(reply.params.hop_limit, route.default_ttl);

        let payload = RecvBuffer::from(reply.payload.clone());
        assert!(verify_icmpv6_checksum(
            &reply.header,
            &route.local_addr,
            &route.remote_addr,
            &payload,
        ));
    }

    #[test]
    fn test_echo_request_transmit_failure() {
        let te = TestEndpoint::new();
        te.link.fail.store(true, std::sync::atomic::Ordering::Relaxed);
        let route = te.route();
        te.deliver(&route, vec![128u8, 0, 0, 0, 0, 1, 0, 1]);

        assert_eq!(te.stats.sent.dropped.get(), 1);
        assert_eq!(te.stats.sent.echo_reply.get(), 0);
    }

    #[test]
    fn test_echo_checksum_spans_segments() {
        let te = TestEndpoint::new();
        let route = te.route();
        let mut first = vec![128u8, 0, 0, 0, 0x12, 0x34, 0, 0x07];
        first.extend_from_slice(b"pi");
        let rest = RecvBuffer::new(vec![Bytes::from_static(b"ng")]);
        let checksum = icmpv6_checksum(&first, &route.remote_addr, &route.local_addr, &rest);
        set_checksum(&mut first, checksum);
        let data = RecvBuffer::new(vec![Bytes::from(first), Bytes::from_static(b"ng")]);
        te.deliver_raw(&route, 64, data, false);

        assert_eq!(te.stats.received.invalid.get(), 0);
        assert_eq!(te.stats.sent.echo_reply.get(), 1);
        let sent = te.link.sent.lock().unwrap();
        assert_eq!(sent[0].payload, b"ping");
    }

    #[test]
    fn test_echo_reply_delivered_to_transport() {
        let te = TestEndpoint::new();
        let route = te.route();
        let message = checksummed(
            vec![129u8, 0, 0, 0, 0xab, 0xcd, 0, 1, 42],
            &route,
            &RecvBuffer::default(),
        );
        te.deliver_raw(&route, 64, RecvBuffer::from(message.clone()), false);

        assert_eq!(te.stats.received.echo_reply.get(), 1);
        let packets = te.transport.packets.lock().unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].0, route);
        assert_eq!(packets[0].1, ip_proto::ICMPV6);
        assert_eq!(packets[0].2, message);
    }

    #[test]
    fn test_packet_too_big_control() {
        let te = TestEndpoint::new();
        let route = te.route();
        let peer: Ipv6Addr = "2001:db8::9".parse().unwrap();
        let mut message = vec![2u8, 0, 0, 0, 0x00, 0x00, 0x05, 0xdc];
        message.extend_from_slice(&embedded_ipv6(local_addr(), peer, ip_proto::UDP, &[1, 2, 3, 4]));
        te.deliver(&route, message);

        assert_eq!(te.stats.received.packet_too_big.get(), 1);
        let controls = te.transport.controls.lock().unwrap();
        assert_eq!(controls.len(), 1);
        let (local, remote, protocol, kind, extra, data) = &controls[0];
        assert_eq!(*local, local_addr());
        assert_eq!(*remote, peer);
        assert_eq!(*protocol, ip_proto::UDP);
        assert_eq!(*kind, ControlKind::PacketTooBig);
        assert_eq!(*extra, 1460);
        assert_eq!(*data, vec![1u8, 2, 3, 4]);
    }

    #[test]
    fn test_packet_too_big_mtu_clamped() {
        let te = TestEndpoint::new();
        let route = te.route();
        let peer: Ipv6Addr = "2001:db8::9".parse().unwrap();
        let embedded = embedded_ipv6(local_addr(), peer, ip_proto::UDP, &[0]);

        let mut small = vec![2u8, 0, 0, 0, 0x00, 0x00, 0x00, 20];
        small.extend_from_slice(&embedded);
        te.deliver(&route, small);

        let mut huge = vec![2u8, 0, 0, 0, 0xff, 0xff, 0xff, 0xff];
        huge.extend_from_slice(&embedded);
        te.deliver(&route, huge);

        let controls = te.transport.controls.lock().unwrap();
        assert_eq!(controls.len(), 2);
        assert_eq!(controls[0].4, 0);
        assert_eq!(controls[1].4, 65535);
    }

    #[test]
    fn test_port_unreachable_control() {
        let te = TestEndpoint::new();
        let route = te.route();
        let peer: Ipv6Addr = "2001:db8::9".parse().unwrap();
        let mut message = vec![1u8, 4, 0, 0, 0, 0, 0, 0];
        message.extend_from_slice(&embedded_ipv6(local_addr(), peer, ip_proto::TCP, &[9, 9]));
        te.deliver(&route, message);

        assert_eq!(te.stats.received.dst_unreachable.get(), 1);
        let controls = te.transport.controls.lock().unwrap();
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].2, ip_proto::TCP);
        assert_eq!(controls[0].3, ControlKind::PortUnreachable);
        assert_eq!(controls[0].4, 0);
    }

    #[test]
    fn test_dst_unreachable_other_code_ignored() {
        let te = TestEndpoint::new();
        let route = te.route();
        let peer: Ipv6Addr = "2001:db8::9".parse().unwrap();
        let mut message = vec![1u8, 0, 0, 0, 0, 0, 0, 0];
        message.extend_from_slice(&embedded_ipv6(local_addr(), peer, ip_proto::TCP, &[]));
        te.deliver(&route, message);

        assert_eq!(te.stats.received.dst_unreachable.get(), 1);
        assert_eq!(te.stats.received.invalid.get(), 0);
        assert!(te.transport.controls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_control_ignores_foreign_source() {
        let te = TestEndpoint::new();
        let route = te.route();
        let peer: Ipv6Addr = "2001:db8::9".parse().unwrap();
        let foreign: Ipv6Addr = "fe80::99".parse().unwrap();
        let mut message = vec![2u8, 0, 0, 0, 0x00, 0x00, 0x05, 0xdc];
        message.extend_from_slice(&embedded_ipv6(foreign, peer, ip_proto::UDP, &[1]));
        te.deliver(&route, message);

        assert_eq!(te.stats.received.packet_too_big.get(), 1);
        assert!(te.transport.controls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_control_walks_fragment_header() {
        let te = TestEndpoint::new();
        let route = te.route();
        let peer: Ipv6Addr = "2001:db8::9".parse().unwrap();
        // Embedded first fragment of a TCP packet.
        let mut inner = vec![ip_proto::TCP, 0, 0x00, 0x00, 0, 0, 0, 1];
        inner.extend_from_slice(&[7, 7, 7]);
        let mut message = vec![2u8, 0, 0, 0, 0x00, 0x00, 0x05, 0xdc];
        message.extend_from_slice(&embedded_ipv6(
            local_addr(),
            peer,
            ip_proto::FRAGMENT,
            &inner,
        ));
        te.deliver(&route, message);

        let controls = te.transport.controls.lock().unwrap();
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].2, ip_proto::TCP);
        assert_eq!(controls[0].5, vec![7u8, 7, 7]);
    }

    #[test]
    fn test_control_drops_non_first_fragment() {
        let te = TestEndpoint::new();
        let route = te.route();
        let peer: Ipv6Addr = "2001:db8::9".parse().unwrap();
        // Fragment offset 11: no transport header to map.
        let inner = vec![ip_proto::TCP, 0, 0x00, 0x59, 0, 0, 0, 1];
        let mut message = vec![2u8, 0, 0, 0, 0x00, 0x00, 0x05, 0xdc];
        message.extend_from_slice(&embedded_ipv6(
            local_addr(),
            peer,
            ip_proto::FRAGMENT,
            &inner,
        ));
        te.deliver(&route, message);

        assert!(te.transport.controls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_time_exceeded_counted_only() {
        let te = TestEndpoint::new();
        let route = te.route();
        te.deliver(&route, vec![3u8, 0, 0, 0, 0, 0, 0, 0]);

        assert_eq!(te.stats.received.time_exceeded.get(), 1);
        assert_eq!(te.stats.received.invalid.get(), 0);
        assert!(te.transport.controls.lock().unwrap().is_empty());
        assert!(te.link.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_param_problem_counted_only() {
        let te = TestEndpoint::new();
        let route = te.route();
        te.deliver(&route, vec![4u8, 0, 0, 0, 0, 0, 0, 0]);

        assert_eq!(te.stats.received.param_problem.get(), 1);
        assert_eq!(te.stats.received.invalid.get(), 0);
    }

    #[test]
    fn test_redirect_gate_checked() {
        let te = TestEndpoint::new();
        let route = te.route();
        te.deliver_at(&route, 64, vec![137u8, 0, 0, 0, 0, 0, 0, 0]);

        assert_eq!(te.stats.received.redirect.get(), 1);
        assert_eq!(te.stats.received.invalid.get(), 1);

        te.deliver(&route, vec![137u8, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(te.stats.received.redirect.get(), 2);
        assert_eq!(te.stats.received.invalid.get(), 1);
    }
}
