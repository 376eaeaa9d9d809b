//! Neighbor Discovery message layer (RFC 4861)
//!
//! Zero-copy views over the NDP message bodies that follow the common
//! ICMPv6 header, an option walker that surfaces malformed options as
//! errors, and builders for the solicitations and advertisements this
//! stack originates.

use crate::icmpv6::Icmpv6Type;
use bytes::{BufMut, BytesMut};
use netsix_core::{Error, LinkAddr, Result};
use std::net::Ipv6Addr;

/// Hop limit required on every NDP message
pub const NDP_HOP_LIMIT: u8 = 255;

/// Fixed portion of a Neighbor Solicitation body (reserved + target)
pub const NEIGHBOR_SOLICIT_BODY_SIZE: usize = 20;

/// Fixed portion of a Neighbor Advertisement body (flags + reserved + target)
pub const NEIGHBOR_ADVERT_BODY_SIZE: usize = 20;

/// Fixed portion of a Router Solicitation body (reserved)
pub const ROUTER_SOLICIT_BODY_SIZE: usize = 4;

/// Fixed portion of a Router Advertisement body
pub const ROUTER_ADVERT_BODY_SIZE: usize = 12;

/// Size of a serialized link-layer address option on Ethernet
pub const LINK_LAYER_OPTION_SIZE: usize = 8;

/// NDP option type values
pub mod option_types {
    /// Source Link-Layer Address option
    pub const SOURCE_LINK_ADDR: u8 = 1;
    /// Target Link-Layer Address option
    pub const TARGET_LINK_ADDR: u8 = 2;
}

fn addr_from(slice: &[u8]) -> Ipv6Addr {
    let mut octets = [0u8; 16];
    octets.copy_from_slice(slice);
    Ipv6Addr::from(octets)
}

fn link_addr_from(slice: &[u8]) -> LinkAddr {
    let mut octets = [0u8; 6];
    octets.copy_from_slice(slice);
    LinkAddr(octets)
}

/// An NDP option recognized by this stack
///
/// Option types outside this set are skipped by the iterator without
/// error, as RFC 4861 requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NdpOption {
    /// Link-layer address of the sender
    SourceLinkAddr(LinkAddr),
    /// Link-layer address of the advertised target
    TargetLinkAddr(LinkAddr),
}

/// Walks the options area of an NDP message
///
/// Yields `Err` exactly once for a malformed option (zero length, or a
/// header or body that extends past the options area) and then fuses;
/// a caller seeing an error must treat the whole message as invalid.
#[derive(Debug, Clone)]
pub struct NdpOptionIter<'a> {
    buffer: &'a [u8],
    failed: bool,
}

impl<'a> NdpOptionIter<'a> {
    /// Create an iterator over a message's options area
    pub fn new(options: &'a [u8]) -> Self {
        NdpOptionIter {
            buffer: options,
            failed: false,
        }
    }

    fn fail(&mut self, what: &str) -> Option<Result<NdpOption>> {
        self.failed = true;
        Some(Err(Error::malformed_option(what)))
    }
}

impl<'a> Iterator for NdpOptionIter<'a> {
    type Item = Result<NdpOption>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if self.buffer.is_empty() {
                return None;
            }
            if self.buffer.len() < 2 {
                return self.fail("option header extends past the options area");
            }
            let opt_type = self.buffer[0];
            let opt_len = self.buffer[1] as usize * 8;
            if opt_len == 0 {
                return self.fail("option length is zero");
            }
            if opt_len > self.buffer.len() {
                return self.fail("option body extends past the options area");
            }
            let body = &self.buffer[2..opt_len];
            self.buffer = &self.buffer[opt_len..];

            // A valid length implies at least 6 body bytes, enough for a MAC.
            match opt_type {
                option_types::SOURCE_LINK_ADDR => {
                    return Some(Ok(NdpOption::SourceLinkAddr(link_addr_from(&body[..6]))));
                }
                option_types::TARGET_LINK_ADDR => {
                    return Some(Ok(NdpOption::TargetLinkAddr(link_addr_from(&body[..6]))));
                }
                _ => continue,
            }
        }
    }
}

/// Borrowed view of a Neighbor Solicitation body
#[derive(Debug, Clone, Copy)]
pub struct NeighborSolicit<'a> {
    body: &'a [u8],
}

impl<'a> NeighborSolicit<'a> {
    /// Wrap the body that follows the common ICMPv6 header
    pub fn parse(body: &'a [u8]) -> Result<Self> {
        if body.len() < NEIGHBOR_SOLICIT_BODY_SIZE {
            return Err(Error::truncated("neighbor solicitation"));
        }
        Ok(NeighborSolicit { body })
    }

    /// Address whose link-layer address is being solicited
    pub fn target(&self) -> Ipv6Addr {
        addr_from(&self.body[4..20])
    }

    /// Iterate the options area
    pub fn options(&self) -> NdpOptionIter<'a> {
        NdpOptionIter::new(&self.body[NEIGHBOR_SOLICIT_BODY_SIZE..])
    }
}

/// Borrowed view of a Neighbor Advertisement body
#[derive(Debug, Clone, Copy)]
pub struct NeighborAdvert<'a> {
    body: &'a [u8],
}

impl<'a> NeighborAdvert<'a> {
    /// Wrap the body that follows the common ICMPv6 header
    pub fn parse(body: &'a [u8]) -> Result<Self> {
        if body.len() < NEIGHBOR_ADVERT_BODY_SIZE {
            return Err(Error::truncated("neighbor advertisement"));
        }
        Ok(NeighborAdvert { body })
    }

    /// Router flag: the sender is a router
    pub fn router_flag(&self) -> bool {
        self.body[0] & 0x80 != 0
    }

    /// Solicited flag: sent in response to a solicitation
    pub fn solicited_flag(&self) -> bool {
        self.body[0] & 0x40 != 0
    }

    /// Override flag: the advertisement should replace a cached entry
    pub fn override_flag(&self) -> bool {
        self.body[0] & 0x20 != 0
    }

    /// Address the advertisement is about
    pub fn target(&self) -> Ipv6Addr {
        addr_from(&self.body[4..20])
    }

    /// Iterate the options area
    pub fn options(&self) -> NdpOptionIter<'a> {
        NdpOptionIter::new(&self.body[NEIGHBOR_ADVERT_BODY_SIZE..])
    }
}

/// Borrowed view of a Router Solicitation body
#[derive(Debug, Clone, Copy)]
pub struct RouterSolicit<'a> {
    body: &'a [u8],
}

impl<'a> RouterSolicit<'a> {
    /// Wrap the body that follows the common ICMPv6 header
    pub fn parse(body: &'a [u8]) -> Result<Self> {
        if body.len() < ROUTER_SOLICIT_BODY_SIZE {
            return Err(Error::truncated("router solicitation"));
        }
        Ok(RouterSolicit { body })
    }

    /// Iterate the options area
    pub fn options(&self) -> NdpOptionIter<'a> {
        NdpOptionIter::new(&self.body[ROUTER_SOLICIT_BODY_SIZE..])
    }
}

/// Borrowed view of a Router Advertisement body
#[derive(Debug, Clone, Copy)]
pub struct RouterAdvert<'a> {
    body: &'a [u8],
}

impl<'a> RouterAdvert<'a> {
    /// Wrap the body that follows the common ICMPv6 header
    pub fn parse(body: &'a [u8]) -> Result<Self> {
        if body.len() < ROUTER_ADVERT_BODY_SIZE {
            return Err(Error::truncated("router advertisement"));
        }
        Ok(RouterAdvert { body })
    }

    /// Default hop limit routers suggest for outgoing packets; 0 means unspecified
    pub fn current_hop_limit(&self) -> u8 {
        self.body[0]
    }

    /// Managed address configuration flag
    pub fn managed_flag(&self) -> bool {
        self.body[1] & 0x80 != 0
    }

    /// Other configuration flag
    pub fn other_conf_flag(&self) -> bool {
        self.body[1] & 0x40 != 0
    }

    /// Seconds the sender is usable as a default router; 0 means not a default router
    pub fn router_lifetime(&self) -> u16 {
        u16::from_be_bytes([self.body[2], self.body[3]])
    }

    /// Milliseconds a neighbor stays reachable after confirmation; 0 means unspecified
    pub fn reachable_time(&self) -> u32 {
        u32::from_be_bytes([self.body[4], self.body[5], self.body[6], self.body[7]])
    }

    /// Milliseconds between retransmitted solicitations; 0 means unspecified
    pub fn retrans_timer(&self) -> u32 {
        u32::from_be_bytes([self.body[8], self.body[9], self.body[10], self.body[11]])
    }

    /// Iterate the options area
    pub fn options(&self) -> NdpOptionIter<'a> {
        NdpOptionIter::new(&self.body[ROUTER_ADVERT_BODY_SIZE..])
    }
}

fn put_link_layer_option(buffer: &mut BytesMut, opt_type: u8, addr: LinkAddr) {
    buffer.put_u8(opt_type);
    buffer.put_u8(1);
    buffer.put_slice(addr.as_bytes());
}

/// Neighbor Solicitation builder
///
/// Produces a complete ICMPv6 message with the checksum field zeroed;
/// the caller computes the checksum once source and destination
/// addresses are known and patches it in with
/// [`set_checksum`](crate::icmpv6::set_checksum).
///
/// # Example
///
/// ```
/// use netsix_core::LinkAddr;
/// use netsix_packet::ndp::{NeighborSolicit, NeighborSolicitBuilder};
///
/// let target = "2001:db8::1".parse().unwrap();
/// let message = NeighborSolicitBuilder::new(target)
///     .with_source_link_addr(LinkAddr::new([0x02, 0, 0, 0, 0, 1]))
///     .build();
///
/// assert_eq!(message.len(), 32);
/// let ns = NeighborSolicit::parse(&message[4..]).unwrap();
/// assert_eq!(ns.target(), target);
/// ```
#[derive(Debug, Clone)]
pub struct NeighborSolicitBuilder {
    target: Ipv6Addr,
    source_link_addr: Option<LinkAddr>,
}

impl NeighborSolicitBuilder {
    /// Create a builder for a solicitation of `target`
    pub fn new(target: Ipv6Addr) -> Self {
        NeighborSolicitBuilder {
            target,
            source_link_addr: None,
        }
    }

    /// Attach a Source Link-Layer Address option
    pub fn with_source_link_addr(mut self, addr: LinkAddr) -> Self {
        self.source_link_addr = Some(addr);
        self
    }

    /// Serialize the full ICMPv6 message with a zeroed checksum
    pub fn build(&self) -> Vec<u8> {
        let mut size = 4 + NEIGHBOR_SOLICIT_BODY_SIZE;
        if self.source_link_addr.is_some() {
            size += LINK_LAYER_OPTION_SIZE;
        }

        let mut buffer = BytesMut::with_capacity(size);
        buffer.put_u8(Icmpv6Type::NeighborSolicitation.to_u8());
        buffer.put_u8(0);
        buffer.put_u16(0);
        buffer.put_u32(0);
        buffer.put_slice(&self.target.octets());
        if let Some(addr) = self.source_link_addr {
            put_link_layer_option(&mut buffer, option_types::SOURCE_LINK_ADDR, addr);
        }
        buffer.to_vec()
    }
}

/// Neighbor Advertisement builder
///
/// Produces a complete ICMPv6 message with the checksum field zeroed,
/// like [`NeighborSolicitBuilder`].
#[derive(Debug, Clone)]
pub struct NeighborAdvertBuilder {
    target: Ipv6Addr,
    router: bool,
    solicited: bool,
    override_entry: bool,
    target_link_addr: Option<LinkAddr>,
}

impl NeighborAdvertBuilder {
    /// Create a builder for an advertisement of `target` with all flags clear
    pub fn new(target: Ipv6Addr) -> Self {
        NeighborAdvertBuilder {
            target,
            router: false,
            solicited: false,
            override_entry: false,
            target_link_addr: None,
        }
    }

    /// Set the router flag
    pub fn with_router(mut self, router: bool) -> Self {
        self.router = router;
        self
    }

    /// Set the solicited flag
    pub fn with_solicited(mut self, solicited: bool) -> Self {
        self.solicited = solicited;
        self
    }

    /// Set the override flag
    pub fn with_override(mut self, override_entry: bool) -> Self {
        self.override_entry = override_entry;
        self
    }

    /// Attach a Target Link-Layer Address option
    pub fn with_target_link_addr(mut self, addr: LinkAddr) -> Self {
        self.target_link_addr = Some(addr);
        self
    }

    /// Serialize the full ICMPv6 message with a zeroed checksum
    pub fn build(&self) -> Vec<u8> {
        let mut size = 4 + NEIGHBOR_ADVERT_BODY_SIZE;
        if self.target_link_addr.is_some() {
            size += LINK_LAYER_OPTION_SIZE;
        }

        let mut flags = 0u8;
        if self.router {
            flags |= 0x80;
        }
        if self.solicited {
            flags |= 0x40;
        }
        if self.override_entry {
            flags |= 0x20;
        }

        let mut buffer = BytesMut::with_capacity(size);
        buffer.put_u8(Icmpv6Type::NeighborAdvertisement.to_u8());
        buffer.put_u8(0);
        buffer.put_u16(0);
        buffer.put_u8(flags);
        buffer.put_slice(&[0, 0, 0]);
        buffer.put_slice(&self.target.octets());
        if let Some(addr) = self.target_link_addr {
            put_link_layer_option(&mut buffer, option_types::TARGET_LINK_ADDR, addr);
        }
        buffer.to_vec()
    }
}
