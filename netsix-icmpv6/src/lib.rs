//! Netsix ICMPv6 Engine
//!
//! This crate implements ICMPv6 message handling for a Netsix IPv6
//! endpoint: informational messages (echo), error-to-transport control
//! delivery, and the Neighbor Discovery Protocol (neighbor and router
//! solicitations and advertisements, duplicate address detection, link
//! address resolution).
//!
//! The engine is synchronous and lock-free. Everything stateful it
//! needs (address ownership, neighbor reachability, transport demux,
//! the wire) is reached through the collaborator traits defined in
//! `netsix-core`.

pub mod endpoint;
mod ndp;
pub mod resolver;
pub mod stats;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use endpoint::Icmpv6Endpoint;
pub use resolver::NdpResolver;
pub use stats::{Icmpv6ReceivedStats, Icmpv6SentStats, Icmpv6Stats};
