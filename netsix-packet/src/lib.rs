//! Packet construction and parsing library for Netsix
//!
//! This crate provides the wire formats a user-space IPv6 endpoint needs,
//! from layer 2 (Ethernet) through ICMPv6 and Neighbor Discovery. It
//! includes support for:
//!
//! - **Ethernet II frames** with common EtherTypes
//! - **IPv6 headers** and the fragment extension header
//! - **ICMPv6 messages** (RFC 4443) with pseudo-header checksums
//! - **Neighbor Discovery** messages and options (RFC 4861)
//! - **Well-known IPv6 addresses** and multicast address mapping
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`ethernet`] - Ethernet II frame construction and parsing
//! - [`ipv6`] - IPv6 fixed header and fragment header
//! - [`icmpv6`] - ICMPv6 common header and message types
//! - [`ndp`] - Neighbor Discovery views, options, and builders
//! - [`checksum`] - Internet checksum and the ICMPv6 pseudo-header sum
//! - [`addrs`] - Well-known addresses and multicast derivation
//!
//! Inbound parsing is zero-copy: the view types borrow the received
//! bytes and decode fields on access. Outbound messages are produced by
//! builders that leave the checksum field zeroed for the caller to
//! patch once both IPv6 addresses are known.
//!
//! # Quick Start
//!
//! ## Parsing an ICMPv6 message
//!
//! ```rust
//! use netsix_packet::icmpv6::{Icmpv6Message, Icmpv6Type};
//!
//! let bytes = [0x80, 0x00, 0x00, 0x00, 0x12, 0x34, 0x00, 0x07];
//! let message = Icmpv6Message::parse(&bytes).unwrap();
//!
//! assert_eq!(Icmpv6Type::from_u8(message.msg_type()), Some(Icmpv6Type::EchoRequest));
//! assert_eq!(message.echo_ident(), 0x1234);
//! assert_eq!(message.echo_sequence(), 7);
//! ```
//!
//! ## Building a Neighbor Solicitation
//!
//! ```rust
//! use netsix_core::{LinkAddr, RecvBuffer};
//! use netsix_packet::addrs::solicited_node_multicast;
//! use netsix_packet::checksum::{icmpv6_checksum, verify_icmpv6_checksum};
//! use netsix_packet::icmpv6::set_checksum;
//! use netsix_packet::ndp::NeighborSolicitBuilder;
//!
//! let target: std::net::Ipv6Addr = "2001:db8::1".parse().unwrap();
//! let source: std::net::Ipv6Addr = "fe80::1".parse().unwrap();
//! let destination = solicited_node_multicast(target);
//!
//! let mut message = NeighborSolicitBuilder::new(target)
//!     .with_source_link_addr(LinkAddr::new([0x02, 0, 0, 0, 0, 1]))
//!     .build();
//!
//! let payload = RecvBuffer::default();
//! let checksum = icmpv6_checksum(&message, &source, &destination, &payload);
//! set_checksum(&mut message, checksum);
//!
//! assert!(verify_icmpv6_checksum(&message, &source, &destination, &payload));
//! ```
//!
//! # Features
//!
//! - **Type Safety**: Newtype patterns for link-layer addresses and EtherTypes
//! - **Zero Unsafe**: Pure Rust implementation with no unsafe code
//! - **Zero-Copy Parsing**: Views decode fields without allocating
//! - **Checksum Support**: Incremental one's-complement sums over segmented payloads
//! - **Well Tested**: Hand-checked checksum vectors and parse/build roundtrips

pub mod addrs;
pub mod checksum;
pub mod ethernet;
pub mod icmpv6;
pub mod ipv6;
pub mod ndp;

// Re-export commonly used types for convenience
pub use addrs::{ethernet_multicast, is_link_local, solicited_node_multicast, ALL_NODES, ALL_ROUTERS};
pub use checksum::{icmpv6_checksum, internet_checksum, verify_icmpv6_checksum, Checksummer};
pub use ethernet::{EtherType, EthernetFrame};
pub use icmpv6::{set_checksum, Icmpv6Message, Icmpv6Type};
pub use ipv6::{FragmentHeader, Ipv6Header, Ipv6HeaderBuilder};
pub use ndp::{
    NdpOption, NdpOptionIter, NeighborAdvert, NeighborAdvertBuilder, NeighborSolicit,
    NeighborSolicitBuilder, RouterAdvert, RouterSolicit,
};
