//! Netsix Datalink Layer
//!
//! Host integration for the netsix stack: interface discovery and an
//! Ethernet [`LinkEndpoint`](netsix_core::LinkEndpoint) implementation
//! that frames outgoing IPv6 packets onto a pnet datalink channel.

pub mod ethernet;
pub mod interface;

pub use ethernet::EthernetLink;
pub use interface::NetInterface;
