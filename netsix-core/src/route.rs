//! Reply routing context

use crate::types::{ip_proto, LinkAddr};
use std::net::Ipv6Addr;

/// Default hop limit for replies that do not pin their own
pub const DEFAULT_TTL: u8 = 64;

/// Default traffic class for generated packets
pub const DEFAULT_TRAFFIC_CLASS: u8 = 0;

/// Addressing context for one received packet and any reply to it
///
/// The surrounding stack builds a route when it demultiplexes a packet:
/// `local_addr` is the packet's destination, `remote_addr` its source. A
/// handler that needs different reply addressing derives a new value through
/// [`Route::reply`] instead of mutating the route it was handed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Local IPv6 address for this exchange
    pub local_addr: Ipv6Addr,
    /// Link address of the local interface
    pub local_link_addr: LinkAddr,
    /// Remote IPv6 address
    pub remote_addr: Ipv6Addr,
    /// Remote link address, when already resolved
    pub remote_link_addr: Option<LinkAddr>,
    /// Hop limit for replies that do not pin their own
    pub default_ttl: u8,
}

impl Route {
    /// Create a route with an unresolved remote link address and the
    /// default hop limit
    pub fn new(local_addr: Ipv6Addr, local_link_addr: LinkAddr, remote_addr: Ipv6Addr) -> Self {
        Route {
            local_addr,
            local_link_addr,
            remote_addr,
            remote_link_addr: None,
            default_ttl: DEFAULT_TTL,
        }
    }

    /// Set the resolved remote link address
    pub fn with_remote_link_addr(mut self, addr: LinkAddr) -> Self {
        self.remote_link_addr = Some(addr);
        self
    }

    /// Set the default hop limit
    pub fn with_default_ttl(mut self, ttl: u8) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Start building a reply route based on this one
    pub fn reply(&self) -> ReplyRouteBuilder<'_> {
        ReplyRouteBuilder {
            base: self,
            local_addr: None,
            remote_addr: None,
            remote_link_addr: None,
        }
    }
}

/// Builder for a reply route derived from a received packet's route
///
/// Unset fields fall back to the base route; the base itself is never
/// modified. The built value lives only for the handler invocation that
/// created it.
#[derive(Debug)]
pub struct ReplyRouteBuilder<'a> {
    base: &'a Route,
    local_addr: Option<Ipv6Addr>,
    remote_addr: Option<Ipv6Addr>,
    remote_link_addr: Option<LinkAddr>,
}

impl ReplyRouteBuilder<'_> {
    /// Override the local address of the reply
    pub fn local_addr(mut self, addr: Ipv6Addr) -> Self {
        self.local_addr = Some(addr);
        self
    }

    /// Override the remote address of the reply
    pub fn remote_addr(mut self, addr: Ipv6Addr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Override the remote link address of the reply
    pub fn remote_link_addr(mut self, addr: LinkAddr) -> Self {
        self.remote_link_addr = Some(addr);
        self
    }

    /// Produce the reply route
    pub fn build(self) -> Route {
        Route {
            local_addr: self.local_addr.unwrap_or(self.base.local_addr),
            local_link_addr: self.base.local_link_addr,
            remote_addr: self.remote_addr.unwrap_or(self.base.remote_addr),
            remote_link_addr: self.remote_link_addr.or(self.base.remote_link_addr),
            default_ttl: self.base.default_ttl,
        }
    }
}

/// Per-packet transmission parameters handed to the link endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketParams {
    /// Transport protocol number carried in the IPv6 next-header field
    pub protocol: u8,
    /// Hop limit
    pub hop_limit: u8,
    /// Traffic class
    pub traffic_class: u8,
}

impl PacketParams {
    /// Parameters for an ICMPv6 packet with the given hop limit
    pub fn icmpv6(hop_limit: u8) -> Self {
        PacketParams {
            protocol: ip_proto::ICMPV6,
            hop_limit,
            traffic_class: DEFAULT_TRAFFIC_CLASS,
        }
    }
}
