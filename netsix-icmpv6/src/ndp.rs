//! Neighbor Discovery handlers: solicitations, advertisements, and the
//! duplicate address detection bridge
//!
//! All handlers assume the dispatcher has already verified the checksum
//! and evaluated the NDP admissibility gate; they receive the message
//! body after the four-byte ICMPv6 header.

use crate::endpoint::Icmpv6Endpoint;
use netsix_core::types::ethertypes;
use netsix_core::{PacketParams, ReachabilityConfirmation, RecvBuffer, Route, TentativeStatus};
use netsix_packet::addrs::{is_link_local, ALL_NODES};
use netsix_packet::checksum::icmpv6_checksum;
use netsix_packet::icmpv6::set_checksum;
use netsix_packet::ndp::{
    NdpOption, NeighborAdvert, NeighborAdvertBuilder, NeighborSolicit, RouterAdvert,
    RouterSolicit, LINK_LAYER_OPTION_SIZE, NDP_HOP_LIMIT, NEIGHBOR_ADVERT_BODY_SIZE,
    NEIGHBOR_SOLICIT_BODY_SIZE, ROUTER_ADVERT_BODY_SIZE, ROUTER_SOLICIT_BODY_SIZE,
};
use std::net::Ipv6Addr;
use tracing::{debug, trace};

impl Icmpv6Endpoint {
    /// Duplicate address detection intercept for inbound NS/NA targets
    ///
    /// Returns false when processing must stop: the interface is unknown
    /// or the target is one of our tentative addresses. A tentative hit
    /// reports a duplicate only when `report_duplicate` is set.
    fn dad_check(&self, target: Ipv6Addr, report_duplicate: bool) -> bool {
        match self.stack.is_addr_tentative(self.nic, target) {
            TentativeStatus::UnknownNic => false,
            TentativeStatus::Tentative => {
                if report_duplicate {
                    debug!(%target, "duplicate tentative address detected");
                    self.stack.dup_tentative_addr_detected(self.nic, target);
                }
                false
            }
            TentativeStatus::NotTentative => true,
        }
    }

    pub(crate) fn handle_neighbor_solicit(&self, route: &Route, body: &[u8], ndp_valid: bool) {
        let received = &self.stats.received;
        if body.len() < NEIGHBOR_SOLICIT_BODY_SIZE || !ndp_valid {
            received.invalid.increment();
            return;
        }
        let ns = match NeighborSolicit::parse(body) {
            Ok(ns) => ns,
            Err(_) => {
                received.invalid.increment();
                return;
            }
        };
        let target = ns.target();
        let unspecified_source = route.remote_addr.is_unspecified();

        // A solicitation for a tentative address reports a duplicate only
        // when it comes from the unspecified address: that is another node
        // running DAD on the same address (RFC 4862 §5.4.3).
        if !self.dad_check(target, unspecified_source) {
            return;
        }

        if self.stack.check_local_address(self.nic, target).is_none() {
            // Not one of ours; answering for foreign targets is a proxy
            // feature this endpoint does not have.
            return;
        }

        let mut source_link_addr = None;
        for option in ns.options() {
            match option {
                Err(err) => {
                    debug!(%err, "dropping neighbor solicitation");
                    received.invalid.increment();
                    return;
                }
                Ok(NdpOption::SourceLinkAddr(addr)) => {
                    if source_link_addr.is_some() {
                        received.invalid.increment();
                        return;
                    }
                    source_link_addr = Some(addr);
                }
                Ok(_) => {}
            }
        }

        match source_link_addr {
            Some(addr) => {
                // The unspecified address cannot enter the neighbor
                // cache (RFC 4861 §4.3).
                if unspecified_source {
                    received.invalid.increment();
                    return;
                }
                self.nud
                    .handle_probe(route.remote_addr, route.local_addr, ethertypes::IPV6, addr);
            }
            None => {
                // A multicast solicitation from a specified source must
                // carry the sender's link address (RFC 4861 §7.1.1).
                if route.local_addr.is_multicast() && !unspecified_source {
                    received.invalid.increment();
                    return;
                }
            }
        }

        // Reply as the solicited target. DAD solicitations are answered
        // on the all-nodes group since the soliciting node has no source
        // address to reply to yet.
        let mut reply = route.reply().local_addr(target);
        let solicited = if unspecified_source {
            reply = reply.remote_addr(ALL_NODES);
            false
        } else {
            true
        };
        if let Some(addr) = source_link_addr {
            reply = reply.remote_link_addr(addr);
        }
        let reply_route = reply.build();

        let mut message = NeighborAdvertBuilder::new(target)
            .with_solicited(solicited)
            .with_override(true)
            .with_target_link_addr(self.link.link_address())
            .build();
        let checksum = icmpv6_checksum(
            &message,
            &reply_route.local_addr,
            &reply_route.remote_addr,
            &RecvBuffer::default(),
        );
        set_checksum(&mut message, checksum);

        let params = PacketParams::icmpv6(NDP_HOP_LIMIT);
        match self
            .link
            .write_packet(&reply_route, params, &message, &RecvBuffer::default())
        {
            Ok(()) => {
                trace!(%target, solicited, "sent neighbor advertisement");
                self.stats.sent.neighbor_advert.increment();
            }
            Err(err) => {
                debug!(%err, "neighbor advertisement transmit failed");
                self.stats.sent.dropped.increment();
            }
        }
    }

    pub(crate) fn handle_neighbor_advert(&self, body: &[u8], ndp_valid: bool) {
        let received = &self.stats.received;
        if body.len() < NEIGHBOR_ADVERT_BODY_SIZE + LINK_LAYER_OPTION_SIZE || !ndp_valid {
            received.invalid.increment();
            return;
        }
        let na = match NeighborAdvert::parse(body) {
            Ok(na) => na,
            Err(_) => {
                received.invalid.increment();
                return;
            }
        };

        // Validate the whole option area before acting on any part of the
        // message, the duplicate address check included.
        let mut options = Vec::new();
        for option in na.options() {
            match option {
                Err(err) => {
                    debug!(%err, "dropping neighbor advertisement");
                    received.invalid.increment();
                    return;
                }
                Ok(option) => options.push(option),
            }
        }

        let target = na.target();
        if !self.dad_check(target, true) {
            return;
        }

        // A target that is assigned here but no longer tentative gets no
        // special treatment; the advertisement is processed like any
        // other neighbor's.
        let flags = ReachabilityConfirmation {
            solicited: na.solicited_flag(),
            override_flag: na.override_flag(),
            is_router: na.router_flag(),
        };
        for option in options {
            if let NdpOption::TargetLinkAddr(addr) = option {
                self.nud.handle_confirmation(target, addr, flags);
            }
        }
    }

    pub(crate) fn handle_router_solicit(&self, route: &Route, body: &[u8], ndp_valid: bool) {
        let received = &self.stats.received;
        if !ndp_valid {
            received.invalid.increment();
            return;
        }
        // Only a forwarding node is a router someone may solicit.
        if !self.stack.forwarding() {
            received.invalid.increment();
            return;
        }
        if body.len() < ROUTER_SOLICIT_BODY_SIZE {
            received.invalid.increment();
            return;
        }
        let rs = match RouterSolicit::parse(body) {
            Ok(rs) => rs,
            Err(_) => {
                received.invalid.increment();
                return;
            }
        };

        for option in rs.options() {
            match option {
                Err(err) => {
                    debug!(%err, "dropping router solicitation");
                    received.invalid.increment();
                    return;
                }
                Ok(NdpOption::SourceLinkAddr(addr)) => {
                    // The option must be absent when the source is
                    // unspecified (RFC 4861 §6.1.1).
                    if route.remote_addr.is_unspecified() {
                        return;
                    }
                    self.nud
                        .handle_probe(route.remote_addr, route.local_addr, ethertypes::IPV6, addr);
                }
                Ok(_) => {}
            }
        }
    }

    pub(crate) fn handle_router_advert(&self, route: &Route, body: &[u8], ndp_valid: bool) {
        let received = &self.stats.received;
        if body.len() < ROUTER_ADVERT_BODY_SIZE || !ndp_valid {
            received.invalid.increment();
            return;
        }
        // Advertisements come from a neighboring router's link-local
        // address (RFC 4861 §6.1.2).
        let router_addr = route.remote_addr;
        if !is_link_local(router_addr) {
            received.invalid.increment();
            return;
        }
        let ra = match RouterAdvert::parse(body) {
            Ok(ra) => ra,
            Err(_) => {
                received.invalid.increment();
                return;
            }
        };

        // Validate every option before the advertisement takes effect; a
        // malformed tail must not leave half the message applied.
        let mut options = Vec::new();
        for option in ra.options() {
            match option {
                Err(err) => {
                    debug!(%err, "dropping router advertisement");
                    received.invalid.increment();
                    return;
                }
                Ok(option) => options.push(option),
            }
        }

        trace!(%router_addr, "router advertisement");
        self.stack.handle_ndp_ra(self.nic, router_addr, body);

        for option in options {
            if let NdpOption::SourceLinkAddr(addr) = option {
                self.nud
                    .handle_probe(router_addr, route.local_addr, ethertypes::IPV6, addr);
            }
        }
    }
}
