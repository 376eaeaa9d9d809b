//! Collaborator interfaces between protocol engines and the surrounding stack
//!
//! Protocol engines own no shared state. The neighbor cache, the address
//! table, transport demux, and the wire all live behind these traits,
//! implemented by the surrounding stack with whatever locking it needs.
//! Every trait is `Send + Sync` because packet handlers run concurrently.

use crate::buffer::RecvBuffer;
use crate::error::Result;
use crate::route::{PacketParams, Route};
use crate::types::{LinkAddr, NicId};
use std::net::Ipv6Addr;

/// Tentative status of an address on an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TentativeStatus {
    /// The address is assigned and still undergoing duplicate address
    /// detection
    Tentative,
    /// The address is not tentative on the interface; it may or may not be
    /// assigned at all
    NotTentative,
    /// The interface is not known to the stack
    UnknownNic,
}

/// Flags carried by a reachability confirmation, taken from a Neighbor
/// Advertisement's R/S/O bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReachabilityConfirmation {
    /// The advertisement answers a solicitation of ours
    pub solicited: bool,
    /// The advertised link address should replace a cached one
    pub override_flag: bool,
    /// The advertising neighbor is a router
    pub is_router: bool,
}

/// Control information extracted from an ICMPv6 error message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Packet Too Big; the extra value carries the usable payload MTU
    PacketTooBig,
    /// Destination Unreachable with the port-unreachable code
    PortUnreachable,
}

/// Address-ownership and router-configuration view of the stack
pub trait StackContext: Send + Sync {
    /// Query the tentative status of `addr` on `nic`
    fn is_addr_tentative(&self, nic: NicId, addr: Ipv6Addr) -> TentativeStatus;

    /// Report that duplicate address detection failed for a tentative
    /// address: another node is using or probing it
    fn dup_tentative_addr_detected(&self, nic: NicId, addr: Ipv6Addr);

    /// Find the interface owning `addr`, preferring `nic`; `None` when no
    /// interface owns the address
    fn check_local_address(&self, nic: NicId, addr: Ipv6Addr) -> Option<NicId>;

    /// Hand the body of a validated Router Advertisement (options included)
    /// to the router-configuration layer
    fn handle_ndp_ra(&self, nic: NicId, router_addr: Ipv6Addr, ra_body: &[u8]);

    /// Whether this node is configured to forward packets
    fn forwarding(&self) -> bool;
}

/// Bridge into the neighbor unreachability detection state machine
pub trait NudController: Send + Sync {
    /// Feed a reachability probe learned from an inbound NDP message
    fn handle_probe(&self, remote: Ipv6Addr, local: Ipv6Addr, protocol: u16, link_addr: LinkAddr);

    /// Feed a reachability confirmation for `target`
    fn handle_confirmation(
        &self,
        target: Ipv6Addr,
        link_addr: LinkAddr,
        flags: ReachabilityConfirmation,
    );
}

/// Upward delivery into the transport layer
pub trait TransportDispatcher: Send + Sync {
    /// Deliver a received transport packet to its endpoint
    fn deliver_transport_packet(&self, route: &Route, protocol: u8, data: RecvBuffer);

    /// Deliver control information from an ICMPv6 error message to the
    /// transport endpoint identified by the embedded packet's addresses;
    /// `data` holds what remains of the embedded packet
    fn deliver_control_packet(
        &self,
        local: Ipv6Addr,
        remote: Ipv6Addr,
        protocol: u8,
        kind: ControlKind,
        extra: u32,
        data: RecvBuffer,
    );
}

/// Outgoing side of a network interface
pub trait LinkEndpoint: Send + Sync {
    /// Link address of the interface
    fn link_address(&self) -> LinkAddr;

    /// Bytes of header the endpoint prepends below the network payload
    fn max_header_length(&self) -> usize;

    /// Enqueue one network-layer packet
    ///
    /// The implementation encapsulates `header` followed by `payload` in the
    /// IPv6 and link headers described by `params` and `route`. The enqueue
    /// is synchronous and bounded: it either succeeds or fails immediately,
    /// and nothing is retried.
    fn write_packet(
        &self,
        route: &Route,
        params: PacketParams,
        header: &[u8],
        payload: &RecvBuffer,
    ) -> Result<()>;
}

/// Address-resolution surface a network protocol offers the stack's
/// neighbor-resolution path
pub trait LinkAddressResolver: Send + Sync {
    /// Solicit the link address of `target_addr` on the wire
    ///
    /// Unlike passive packet processing, a failed transmission here is
    /// returned to the caller, which owns retry policy.
    fn request_link_address(
        &self,
        target_addr: Ipv6Addr,
        local_addr: Ipv6Addr,
        known_link_addr: Option<LinkAddr>,
        link: &dyn LinkEndpoint,
    ) -> Result<()>;

    /// Resolve an address whose link-layer mapping is fixed, with no wire
    /// exchange; `None` when the address has no static mapping
    fn resolve_static_address(&self, addr: Ipv6Addr) -> Option<LinkAddr>;
}
